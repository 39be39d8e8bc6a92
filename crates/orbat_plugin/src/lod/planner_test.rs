use super::*;
use crate::orbat::echelon::Echelon;
use crate::test_utils::{battalion_tree, brigade_tree, fast_config};

/// Uniform steady state at `level`: primaries shown there, everything one
/// step above exploded.
fn uniform_view(tree: &OrbatTree, level: Level) -> VisibilityView {
    let shown = tree.units_at(level).map(|u| u.id);
    let exploded: Vec<_> = match level.up() {
        Some(above) => tree.units_at(above).map(|u| u.id).collect(),
        None => Vec::new(),
    };
    VisibilityView::synthetic(shown, exploded)
}

fn flights_for(plan: &TransitionPlan, key: ActorKey) -> Vec<&Flight> {
    plan.flights.iter().filter(|f| f.key == key).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn merge_one_level_travels_children_and_delays_arrivals() {
    let tree = battalion_tree();
    let cfg = fast_config();
    let view = uniform_view(&tree, Level(2));
    let plan = plan_level_change(&tree, &view, Level(2), Level(3), &cfg, 0.0).unwrap();

    assert!(plan.hide_now.is_empty());
    assert_eq!(plan.flights.len(), 9 + 3 + 9 + 3);

    // Every platoon travels into its own company while fading out.
    for unit in tree.units_at(Level(2)) {
        let flights = flights_for(&plan, ActorKey::primary(unit.id));
        assert_eq!(flights.len(), 1);
        let flight = flights[0];
        let company = tree.unit(unit.parent.unwrap());
        assert_eq!(flight.to, company.home);
        assert!(close(flight.start, 0.0));
        assert_eq!(flight.done, Completion::HideAndRehome);
        assert!(matches!(&flight.fade, Some(f) if f.dir == FadeDir::Out));
    }

    // Companies settle in place after the travel window, with a pop.
    for unit in tree.units_at(Level(3)) {
        let flights = flights_for(&plan, ActorKey::primary(unit.id));
        assert_eq!(flights.len(), 1);
        let flight = flights[0];
        assert_eq!(flight.from, flight.to);
        assert!(flight.pop);
        assert!(close(flight.start, cfg.travel_secs));
        // Their exploded state ends in the same settle window.
        let persons = flights_for(&plan, ActorKey::commander(unit.id));
        assert_eq!(persons.len(), 1);
        assert!(close(persons[0].start, cfg.travel_secs));
        assert!(matches!(&persons[0].fade, Some(f) if f.dir == FadeDir::Out));
    }

    // The battalion's people appear last.
    let bn_commander = flights_for(&plan, ActorKey::commander(tree.root()));
    assert_eq!(bn_commander.len(), 1);
    assert!(close(bn_commander[0].start, cfg.staff_delay(true)));
    assert!(matches!(&bn_commander[0].fade, Some(f) if f.dir == FadeDir::In));
}

#[test]
fn unmerge_one_level_pops_the_parent_and_travels_children_out() {
    let tree = battalion_tree();
    let cfg = fast_config();
    let view = uniform_view(&tree, Level::COARSEST);
    let plan =
        plan_level_change(&tree, &view, Level::COARSEST, Level(3), &cfg, 5.0).unwrap();

    assert_eq!(plan.flights.len(), 1 + 3 + 3);

    let bn = flights_for(&plan, ActorKey::primary(tree.root()));
    assert!(bn[0].pop, "vacating level pops out in place");
    assert_eq!(bn[0].from, bn[0].to);
    assert_eq!(bn[0].done, Completion::HideAndRehome);

    let bn_home = tree.unit(tree.root()).home;
    for unit in tree.units_at(Level(3)) {
        let flight = flights_for(&plan, ActorKey::primary(unit.id))[0];
        assert_eq!(flight.from, bn_home);
        assert_eq!(flight.to, unit.home);
        assert!(close(flight.start, 5.0), "children travel in the main window");
        assert!(matches!(&flight.fade, Some(f) if f.dir == FadeDir::In));
    }

    // The battalion becomes the exploded level, delayed into the travel fade.
    let commander = flights_for(&plan, ActorKey::commander(tree.root()));
    assert!(close(commander[0].start, 5.0 + cfg.staff_delay(false)));
    assert!(matches!(&commander[0].fade, Some(f) if f.dir == FadeDir::In));
}

#[test]
fn multi_level_jump_normalizes_skipped_levels_without_animation() {
    let tree = brigade_tree();
    let cfg = fast_config();
    let view = uniform_view(&tree, Level(0));
    let plan =
        plan_level_change(&tree, &view, Level(0), Level::COARSEST, &cfg, 0.0).unwrap();

    let individuals = tree.units_at(Level(0)).count();
    let battalions = tree.units_at(Level::COARSEST).count();
    assert_eq!(individuals, 64);
    assert_eq!(battalions, 4);
    // No exploded level above battalion: the top echelons are outside the
    // LOD system, so only travels and arrivals are scheduled.
    assert_eq!(plan.flights.len(), individuals + battalions);

    let skipped: usize = (1..=3)
        .map(|l| tree.units_at(Level(l)).count())
        .sum();
    assert_eq!(plan.hide_now.len(), skipped);

    // Spot-check one travel target: an individual flies all the way to its
    // battalion, past the levels in between.
    let soldier = tree.get("u-0-0-0-0-0-0").unwrap();
    let battalion = tree.ancestor_at(soldier, Level::COARSEST).unwrap();
    let flight = flights_for(&plan, ActorKey::primary(soldier))[0];
    assert_eq!(flight.to, tree.unit(battalion).home);
}

#[test]
fn strayed_branches_are_left_alone_when_already_at_target() {
    let tree = battalion_tree();
    let cfg = fast_config();
    let co0 = tree.get("co-0").unwrap();
    let co1 = tree.get("co-1").unwrap();
    let co2 = tree.get("co-2").unwrap();

    // Global level is platoon, but co-0 was manually collapsed back.
    let shown: Vec<_> = std::iter::once(co0)
        .chain(
            tree
                .units_at(Level(2))
                .filter(|u| u.parent != Some(co0))
                .map(|u| u.id),
        )
        .collect();
    let view = VisibilityView::synthetic(shown, [co1, co2]);
    let plan = plan_level_change(&tree, &view, Level(2), Level(3), &cfg, 0.0).unwrap();

    // The stray branch already matches the target: no flight touches it.
    assert!(flights_for(&plan, ActorKey::primary(co0)).is_empty());
    assert!(flights_for(&plan, ActorKey::commander(co0)).is_empty());

    // Six platoons travel, two companies arrive, their people fade out,
    // the battalion's people fade in.
    assert_eq!(plan.flights.len(), 6 + 2 + 6 + 3);
}

#[test]
fn stray_above_target_pops_out_while_its_children_travel_from_it() {
    let tree = battalion_tree();
    let cfg = fast_config();
    let co0 = tree.get("co-0").unwrap();

    // Global level is platoon, but co-0's branch was manually collapsed one
    // step further: now the operator asks for platoon again via a jump from
    // company. Current=3, target=2, with co-0 already shown as a stray.
    let shown: Vec<_> = std::iter::once(co0)
        .chain(
            tree
                .units_at(Level(2))
                .filter(|u| u.parent != Some(co0))
                .map(|u| u.id),
        )
        .collect();
    let view =
        VisibilityView::synthetic(shown, [tree.get("co-1").unwrap(), tree.get("co-2").unwrap()]);
    let plan = plan_level_change(&tree, &view, Level(3), Level(2), &cfg, 0.0).unwrap();

    // co-0 pops out in place; its platoons travel out of it.
    let stray = flights_for(&plan, ActorKey::primary(co0))[0];
    assert!(stray.pop);
    assert_eq!(stray.from, stray.to);

    for platoon in &tree.unit(co0).children {
        let flight = flights_for(&plan, ActorKey::primary(*platoon))[0];
        assert_eq!(flight.from, tree.unit(co0).home);
        assert_eq!(flight.to, tree.unit(*platoon).home);
    }
}

#[test]
fn branch_expand_pops_the_parent_and_reveals_its_children() {
    let tree = battalion_tree();
    let cfg = fast_config();
    let view = uniform_view(&tree, Level::COARSEST);
    let plan = plan_branch_expand(&tree, &view, tree.root(), &cfg, 1.0).unwrap();

    assert_eq!(plan.flights.len(), 1 + 3 + 3);
    let parent = flights_for(&plan, ActorKey::primary(tree.root()))[0];
    assert!(parent.pop);
    assert_eq!(parent.done, Completion::HideAndRehome);

    for child in &tree.unit(tree.root()).children {
        let flight = flights_for(&plan, ActorKey::primary(*child))[0];
        assert_eq!(flight.from, tree.unit(tree.root()).home);
        assert_eq!(flight.to, tree.unit(*child).home);
    }

    let commander = flights_for(&plan, ActorKey::commander(tree.root()))[0];
    assert!(close(commander.start, 1.0 + cfg.staff_delay(false)));
}

#[test]
fn branch_expand_rejects_leaves_and_hidden_units() {
    let tree = battalion_tree();
    let cfg = fast_config();
    let platoon = tree.get("co-0-plt-0").unwrap();

    let view = VisibilityView::synthetic([platoon], []);
    assert!(plan_branch_expand(&tree, &view, platoon, &cfg, 0.0).is_none());

    let view = uniform_view(&tree, Level::COARSEST);
    let hidden_company = tree.get("co-1").unwrap();
    assert!(plan_branch_expand(&tree, &view, hidden_company, &cfg, 0.0).is_none());
}

#[test]
fn branch_collapse_gathers_the_whole_visible_subtree() {
    let tree = battalion_tree();
    let cfg = fast_config();
    let co0 = tree.get("co-0").unwrap();

    // Battalion expanded, then co-0 expanded again: its platoons are the
    // deepest visible layer.
    let shown: Vec<_> = [tree.get("co-1").unwrap(), tree.get("co-2").unwrap()]
        .into_iter()
        .chain(tree.unit(co0).children.iter().copied())
        .collect();
    let view = VisibilityView::synthetic(shown, [tree.root(), co0]);
    let plan = plan_branch_collapse(&tree, &view, tree.root(), &cfg, 0.0).unwrap();

    // 5 travels (2 companies + 3 platoons), straight to the battalion.
    let bn_home = tree.unit(tree.root()).home;
    let travels: Vec<_> = plan
        .flights
        .iter()
        .filter(|f| f.from != f.to)
        .collect();
    assert_eq!(travels.len(), 5);
    for flight in &travels {
        assert_eq!(flight.to, bn_home);
        assert_eq!(flight.done, Completion::HideAndRehome);
    }

    // co-0's people drop immediately, the battalion's own people only once
    // the subtree has landed, and the battalion pops back in last.
    let co0_commander = flights_for(&plan, ActorKey::commander(co0))[0];
    assert!(close(co0_commander.start, 0.0));
    let bn_commander = flights_for(&plan, ActorKey::commander(tree.root()))[0];
    assert!(close(bn_commander.start, cfg.travel_secs));
    let bn_primary = flights_for(&plan, ActorKey::primary(tree.root()))[0];
    assert!(bn_primary.pop);
    assert!(close(bn_primary.start, cfg.travel_secs));
    assert_eq!(plan.flights.len(), 5 + 3 + 3 + 1);
}

#[test]
fn branch_collapse_rejects_shown_or_empty_targets() {
    let tree = battalion_tree();
    let cfg = fast_config();

    // Already collapsed: the unit itself is shown.
    let view = uniform_view(&tree, Level::COARSEST);
    assert!(plan_branch_collapse(&tree, &view, tree.root(), &cfg, 0.0).is_none());

    // Nothing shown anywhere below.
    let view = VisibilityView::synthetic([], []);
    assert!(plan_branch_collapse(&tree, &view, tree.root(), &cfg, 0.0).is_none());
}

#[test]
fn level_changes_to_the_current_level_plan_nothing() {
    let tree = battalion_tree();
    let cfg = fast_config();
    let view = uniform_view(&tree, Level::COARSEST);
    assert!(
        plan_level_change(&tree, &view, Level::COARSEST, Level::COARSEST, &cfg, 0.0).is_none()
    );
}

#[test]
fn echelons_above_the_ladder_never_enter_a_plan() {
    let tree = brigade_tree();
    let cfg = fast_config();
    let view = uniform_view(&tree, Level::COARSEST);
    let plan = plan_level_change(&tree, &view, Level::COARSEST, Level(3), &cfg, 0.0).unwrap();

    for flight in &plan.flights {
        let echelon = tree.unit(flight.key.unit).echelon;
        assert!(
            echelon <= Echelon::Battalion,
            "{echelon:?} must stay out of transitions"
        );
    }
}
