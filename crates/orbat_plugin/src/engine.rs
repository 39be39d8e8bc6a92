//! The owning controller.
//!
//! One [`OrbatEngine`] instance wires the pieces together around a single
//! renderer: tree and registry built at load, the scheduler advanced from
//! the host's render loop, the declutter pass run between transitions, and
//! the command surface (level keys, layer/label toggles, pointer clicks,
//! camera notifications) funneled into the LOD machine. Everything happens
//! inside [`OrbatEngine::advance`] or synchronously inside a command call;
//! there are no threads and no host timers, only the camera debounce
//! deadline polled each tick.

use glam::DVec2;
use tracing::{debug, info};

use crate::actor::registry::ActorRegistry;
use crate::actor::{Actor, ActorKey};
use crate::anim::scheduler::AnimationScheduler;
use crate::cluster::pass::{run_pass, ClusterOverlay, ClusterStats};
use crate::cluster::proxy::ProxyPool;
use crate::config::EngineConfig;
use crate::debounce::Debounce;
use crate::interact::{resolve_click, ClickAction, PointerButton};
use crate::lod::machine::{
    request_branch_collapse, request_branch_expand, request_level, EngineState,
};
use crate::orbat::echelon::Level;
use crate::orbat::load::LoadError;
use crate::orbat::tree::OrbatTree;
use crate::outline;
use crate::renderer::SceneRenderer;

pub struct OrbatEngine<R: SceneRenderer> {
    renderer: R,
    tree: OrbatTree,
    registry: ActorRegistry,
    scheduler: AnimationScheduler,
    state: EngineState,
    overlay: ClusterOverlay,
    pool: ProxyPool,
    camera_debounce: Debounce,
    cfg: EngineConfig,
    cluster_stats: ClusterStats,
}

impl<R: SceneRenderer> OrbatEngine<R> {
    /// Parses and indexes the unit document and builds the marker set.
    ///
    /// Fetching the document is the host's business; a fetch or parse
    /// failure surfaces here and nothing is rendered.
    pub fn load(mut renderer: R, json: &str, cfg: EngineConfig) -> Result<Self, LoadError> {
        let tree = OrbatTree::from_json(json, cfg.marker_height_bias_m)?;
        let registry = ActorRegistry::build(&tree, &mut renderer, cfg.default_level);
        info!(
            units = tree.len(),
            actors = registry.len(),
            level = cfg.default_level.0,
            "orbat engine loaded"
        );
        Ok(Self {
            renderer,
            tree,
            registry,
            scheduler: AnimationScheduler::new(cfg.arc_ratio, cfg.pop_bulge),
            state: EngineState::new(cfg.default_level),
            overlay: ClusterOverlay::new(),
            pool: ProxyPool::new(),
            camera_debounce: Debounce::new(cfg.camera_debounce_secs),
            cfg,
            cluster_stats: ClusterStats::default(),
        })
    }

    /// One cooperative tick. `now` is the host clock in seconds; any
    /// monotonic clock works as long as it is the same one the commands see.
    pub fn advance(&mut self, now: f64) {
        if self.camera_debounce.fire(now) {
            self.relevel_from_camera(now);
            self.state.cluster_dirty = true;
        }

        let outcome = self.scheduler.advance(now, &mut self.registry);
        if outcome.became_idle {
            self.state.animating = false;
            self.state.cluster_dirty = true;
        }

        if !self.state.animating && self.state.cluster_dirty {
            self.cluster_stats = run_pass(
                &self.tree,
                &mut self.registry,
                &mut self.pool,
                &mut self.overlay,
                &mut self.renderer,
                self.cfg.cluster_cell_px,
            );
            self.state.cluster_dirty = false;
        }

        self.registry.flush(&mut self.renderer);
    }

    /// Explicit level selection (the numeric keys). Clears the manual
    /// override whether or not a transition results.
    pub fn select_level(&mut self, level: Level, now: f64) -> bool {
        self.state.manual_override = false;
        self.request_level_inner(level, now)
    }

    fn request_level_inner(&mut self, level: Level, now: f64) -> bool {
        if self.state.animating || level == self.state.level {
            return false;
        }
        self.clear_overlay();
        request_level(
            &mut self.state,
            &self.tree,
            &mut self.registry,
            &mut self.scheduler,
            level,
            &self.cfg,
            now,
        )
    }

    /// Routes a pointer click, returning whether the event was consumed.
    pub fn handle_click(&mut self, point: DVec2, button: PointerButton, now: f64) -> bool {
        let outcome = resolve_click(
            &self.tree,
            &self.registry,
            &self.pool,
            &self.renderer,
            point,
            button,
        );
        if !outcome.handled {
            return false;
        }
        if outcome.via_proxy {
            // The real actor set has to be live before the animation starts.
            self.clear_overlay();
        }
        match outcome.action {
            Some(ClickAction::ExpandBranch(unit)) => {
                self.clear_overlay();
                request_branch_expand(
                    &mut self.state,
                    &self.tree,
                    &mut self.registry,
                    &mut self.scheduler,
                    unit,
                    &self.cfg,
                    now,
                );
            }
            Some(ClickAction::CollapseBranch(unit)) => {
                self.clear_overlay();
                request_branch_collapse(
                    &mut self.state,
                    &self.tree,
                    &mut self.registry,
                    &mut self.scheduler,
                    unit,
                    &self.cfg,
                    now,
                );
            }
            None => {}
        }
        true
    }

    /// Call on every camera-change notification. Work is coalesced behind
    /// the configured quiet period and happens in a later [`advance`].
    ///
    /// [`advance`]: OrbatEngine::advance
    pub fn note_camera_changed(&mut self, now: f64) {
        self.camera_debounce.poke(now);
    }

    fn relevel_from_camera(&mut self, now: f64) {
        if !self.state.auto_level || self.state.manual_override {
            return;
        }
        let distance = self.renderer.camera_distance();
        let target = self.cfg.bands.level_for(distance);
        if target != self.state.level {
            debug!(distance, target = target.0, "camera re-level");
            self.request_level_inner(target, now);
        }
    }

    pub fn set_layer_visible(&mut self, visible: bool) {
        self.registry.set_layer_visible(visible);
        if !visible {
            self.clear_overlay();
        }
        self.state.cluster_dirty = true;
    }

    pub fn set_labels_visible(&mut self, visible: bool) {
        self.registry.set_labels_visible(visible);
        self.pool.set_labels_shown(&mut self.renderer, visible);
    }

    /// Master switch for camera-driven leveling.
    pub fn set_auto_leveling(&mut self, enabled: bool) {
        self.state.auto_level = enabled;
        if !enabled {
            self.camera_debounce.cancel();
        }
    }

    fn clear_overlay(&mut self) {
        if self.overlay.is_active() || self.pool.active_count() > 0 {
            self
                .overlay
                .restore(&mut self.registry, &mut self.pool, &mut self.renderer);
            self.state.cluster_dirty = true;
        }
    }

    // Queries for hosts and tests.

    pub fn displayed_level(&self) -> Level {
        self.state.level
    }

    pub fn is_animating(&self) -> bool {
        self.state.animating
    }

    pub fn manual_override(&self) -> bool {
        self.state.manual_override
    }

    pub fn tree(&self) -> &OrbatTree {
        &self.tree
    }

    pub fn actor(&self, key: ActorKey) -> Option<&Actor> {
        self.registry.actor(key)
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn cluster_stats(&self) -> ClusterStats {
        self.cluster_stats
    }

    pub fn active_proxies(&self) -> usize {
        self.pool.active_count()
    }

    /// Smooth blob outline around an active proxy's members, in screen
    /// space, for hosts that draw grouped units as a shape. `None` for
    /// parked slots.
    pub fn proxy_outline(&self, slot: usize) -> Option<Vec<Vec<DVec2>>> {
        let slot = self.pool.slot(slot)?;
        slot
            .is_active()
            .then(|| outline::compute(slot.members_screen(), &self.cfg.outline))
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
