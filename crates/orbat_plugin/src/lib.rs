//! orbat_plugin - Renderer-independent unit-hierarchy LOD and decluttering
//!
//! This crate drives the display of a large military unit hierarchy (an
//! ORBAT, order of battle) over a 3D map: one echelon of the tree is shown
//! at a time, merge/unmerge transitions animate between echelons, and a
//! screen-space declutter pass folds crowded markers into labeled proxy
//! markers. The scene graph itself stays on the host side behind the
//! [`SceneRenderer`] trait, so the engine runs against any renderer,
//! including the mock used by its own tests.
//!
//! # Features
//!
//! - **LOD state machine**: one globally displayed echelon, animated
//!   collapse/expand between levels, multi-level jumps, manual per-branch
//!   overrides
//! - **Animation scheduler**: single time-sliced queue of flights with
//!   arced paths, split billboard/label fade windows and pop scaling
//! - **Proximity clustering**: pixel-grid bucketing of shown markers with
//!   pooled proxy markers and exact restore between passes
//! - **Camera-driven leveling**: debounced distance bands select the level
//!   as the operator zooms
//!
//! # Example
//!
//! ```ignore
//! use orbat_plugin::{EngineConfig, OrbatEngine, PointerButton};
//!
//! let mut engine = OrbatEngine::load(renderer, &orbat_json, EngineConfig::default())?;
//!
//! // Host render loop:
//! engine.advance(now_secs);
//!
//! // Host input handlers:
//! if engine.handle_click(cursor, PointerButton::Left, now_secs) {
//!     return; // consumed, don't place a waypoint
//! }
//! ```

pub mod constants;

pub mod orbat;
pub use orbat::echelon::{Echelon, Level};
pub use orbat::load::LoadError;
pub use orbat::tree::{OrbatTree, UnitId};

pub mod renderer;
pub use renderer::{MarkerDesc, MarkerIcon, MarkerId, SceneRenderer};

pub mod actor;
pub use actor::registry::ActorRegistry;
pub use actor::{Actor, ActorKey, ActorKind};

pub mod anim;
pub use anim::scheduler::{AnimationScheduler, Flight};

pub mod lod;
pub use lod::leveling::LevelBands;
pub use lod::machine::EngineState;

pub mod cluster;
pub use cluster::pass::ClusterStats;
pub use cluster::proxy::ProxyPool;

pub mod config;
pub use config::EngineConfig;

pub mod debounce;

pub mod interact;
pub use interact::{ClickAction, ClickOutcome, PointerButton};

pub mod outline;
pub use outline::OutlineConfig;

pub mod engine;
pub use engine::OrbatEngine;

#[cfg(test)]
pub mod test_utils;
