use crate::parking_plan;
use approx::assert_relative_eq;
use maneuver_editor::linalg::Vector3;
use maneuver_editor::md::{
    FlightPlan, Gizmo, ManeuverEditor, ManeuverPlan, NodeId, PageDirection, PlanError, SyncOutcome,
};
use rstest::*;

#[fixture]
fn planned() -> (FlightPlan, NodeId) {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
    let mut plan = parking_plan(0.0);
    let id = plan.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    (plan, id)
}

#[rstest]
fn edits_are_pushed_once(planned: (FlightPlan, NodeId)) {
    let (mut plan, id) = planned;
    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    assert_eq!(editor.update_node(&mut plan), Ok(SyncOutcome::Idle));

    editor.set_prograde_text("150");
    editor.set_ut_text("720");
    assert!(editor.is_dirty());
    assert_eq!(editor.update_node(&mut plan), Ok(SyncOutcome::Pushed));
    assert!(!editor.is_dirty());
    let live = plan.maneuver(id).unwrap();
    assert_eq!(live.dv, Vector3::new(0.0, 0.0, 150.0));
    assert_eq!(live.ut, 720.0);
    assert_eq!(editor.observed(), editor.state());

    assert_eq!(editor.update_node(&mut plan), Ok(SyncOutcome::Idle));
}

#[rstest]
fn external_changes_win(planned: (FlightPlan, NodeId)) {
    let (mut plan, id) = planned;
    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    editor.set_radial_text("12");
    plan.apply(id, Vector3::new(0.0, 7.0, 90.0), 650.0).unwrap();

    assert_eq!(editor.update_node(&mut plan), Ok(SyncOutcome::Pulled));
    assert!(!editor.is_dirty());
    assert_eq!(editor.state().dv, Vector3::new(0.0, 7.0, 90.0));
    assert_eq!(editor.current_ut(), 650.0);
    assert_eq!(editor.radial_field().text, "0");
    assert_eq!(editor.normal_field().text, "7");
    assert_eq!(editor.time_field().text, "650");
    // The local radial edit never reached the plan
    assert_eq!(plan.maneuver(id).unwrap().dv[0], 0.0);
}

#[rstest]
fn gizmo_mirrors_pushed_values(planned: (FlightPlan, NodeId)) {
    let (mut plan, id) = planned;
    plan.attach_gizmo(id).unwrap();
    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    editor.add_ut(30.0);
    editor.update_node(&mut plan).unwrap();
    assert_eq!(
        plan.maneuver(id).unwrap().gizmo,
        Some(Gizmo {
            dv: Vector3::new(0.0, 0.0, 100.0),
            ut: 630.0
        })
    );
}

#[rstest]
fn prograde_keeps_burn_direction(planned: (FlightPlan, NodeId)) {
    let (plan, id) = planned;
    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    editor.add_prograde(&plan, 10.0).unwrap();
    let dv = editor.state().dv;
    assert!(dv[0].abs() < 1e-6);
    assert!(dv[1].abs() < 1e-6);
    assert_relative_eq!(dv[2], 110.0, epsilon = 1e-6);
    assert_eq!(editor.prograde_field().text, format!("{}", dv[2]));
}

#[rstest]
fn normal_and_radial_turn_the_velocity(planned: (FlightPlan, NodeId)) {
    let (plan, id) = planned;
    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    editor.add_normal(&plan, 1.0).unwrap();
    let dv = editor.state().dv;
    assert_relative_eq!(dv[1], 1.0, epsilon = 1e-3);
    assert!(dv[0].abs() < 1e-6);
    // Turning does not add speed along the velocity
    assert_relative_eq!(dv[2], 100.0, epsilon = 1e-3);

    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    editor.add_radial(&plan, -1.0).unwrap();
    let dv = editor.state().dv;
    assert_relative_eq!(dv[0], -1.0, epsilon = 1e-3);
    assert!(dv[1].abs() < 1e-6);
    assert!(editor.is_dirty());
}

#[rstest]
fn apsides_shortcuts(planned: (FlightPlan, NodeId)) {
    let (mut plan, id) = planned;
    // Put the maneuver after a first burn which makes the orbit eccentric
    plan.insert(60.0, Vector3::new(0.0, 0.0, 200.0)).unwrap();
    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    let patch = plan.maneuver(id).unwrap().patch.clone();
    let period = patch.period().unwrap();

    editor.set_to_apoapsis(&plan);
    let apo = editor.current_ut();
    assert_relative_eq!(apo, 60.0 + period / 2.0, max_relative = 1e-9);
    assert_relative_eq!(patch.position_at(apo).norm(), patch.apoapsis_m().unwrap(), max_relative = 1e-9);

    editor.set_to_periapsis(&plan);
    let peri = editor.current_ut();
    assert!(peri > 60.0 - 1e-6 && peri < 60.0 + period + 1e-6);
    assert_relative_eq!(patch.position_at(peri).norm(), patch.periapsis_m(), max_relative = 1e-9);
}

#[test]
fn paging_carries_memory() {
    let mut plan = parking_plan(0.0);
    let first = plan.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    let second = plan.insert(1_200.0, Vector3::new(0.0, 0.0, 10.0)).unwrap();
    let third = plan.insert(1_800.0, Vector3::new(0.0, 0.0, 1.0)).unwrap();

    let mut editor = ManeuverEditor::attach(&plan, first).unwrap();
    editor.memorize();
    editor.page(&plan, PageDirection::Previous);
    assert_eq!(editor.pending_page(), Some(third));
    editor.page(&plan, PageDirection::Next);
    assert_eq!(editor.pending_page(), Some(second));

    let editor = editor.next_state(&plan);
    assert_eq!(editor.node(), Some(second));
    assert_eq!(editor.current_ut(), 1_200.0);
    assert_eq!(editor.memory().unwrap().ut, 600.0);
    assert!(editor.pending_page().is_none());

    // Without a pending page, the editor stays on its maneuver
    let editor = editor.next_state(&plan);
    assert_eq!(editor.node(), Some(second));
}

#[rstest]
fn single_maneuver_does_not_page(planned: (FlightPlan, NodeId)) {
    let (plan, id) = planned;
    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    editor.page(&plan, PageDirection::Next);
    assert!(editor.pending_page().is_none());
}

/// Plan whose maneuver burns in all three directions, so the burn is not along the velocity
fn mixed_burn() -> (FlightPlan, NodeId) {
    let mut plan = parking_plan(0.0);
    let id = plan.insert(600.0, Vector3::new(40.0, 30.0, 100.0)).unwrap();
    (plan, id)
}

#[test]
fn prograde_on_mixed_burn_keeps_direction() {
    let (mut plan, id) = mixed_burn();
    let before = plan.maneuver(id).unwrap().next_patch.velocity_at(600.0);

    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    editor.add_prograde(&plan, 10.0).unwrap();
    assert_eq!(editor.update_node(&mut plan), Ok(SyncOutcome::Pushed));

    let after = plan.maneuver(id).unwrap().next_patch.velocity_at(600.0);
    assert!(before.angle(&after) < 1e-9);
    assert_relative_eq!(after.norm() - before.norm(), 10.0, epsilon = 1e-6);
    // Not a plain change of the prograde component
    assert!((editor.state().radial() - 40.0).abs() > 1e-6);
}

#[rstest]
#[case::normal(true)]
#[case::radial(false)]
fn turning_mixed_burn_keeps_speed(#[case] normal: bool) {
    let (mut plan, id) = mixed_burn();
    let before = plan.maneuver(id).unwrap().next_patch.velocity_at(600.0);

    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    if normal {
        editor.add_normal(&plan, 5.0).unwrap();
    } else {
        editor.add_radial(&plan, 5.0).unwrap();
    }
    assert_eq!(editor.update_node(&mut plan), Ok(SyncOutcome::Pushed));

    let after = plan.maneuver(id).unwrap().next_patch.velocity_at(600.0);
    assert_relative_eq!(after.norm(), before.norm(), epsilon = 1e-6);
    assert_relative_eq!((after - before).norm(), 5.0, epsilon = 1e-2);
}

#[rstest]
fn rejected_push_restores_live_values(planned: (FlightPlan, NodeId)) {
    let (mut plan, id) = planned;
    plan.attach_gizmo(id).unwrap();
    let mut editor = ManeuverEditor::attach(&plan, id).unwrap();
    editor.add_ut(f64::INFINITY);
    assert!(editor.is_dirty());

    assert_eq!(
        editor.update_node(&mut plan),
        Err(PlanError::InvalidTime { ut: f64::INFINITY })
    );
    assert!(!editor.is_dirty());
    assert_eq!(editor.current_ut(), 600.0);
    assert_eq!(editor.time_field().text, "600");
    // The manipulator never shows the rejected values
    assert_eq!(
        plan.maneuver(id).unwrap().gizmo,
        Some(Gizmo {
            dv: Vector3::new(0.0, 0.0, 100.0),
            ut: 600.0
        })
    );
    assert_eq!(editor.update_node(&mut plan), Ok(SyncOutcome::Idle));
}
