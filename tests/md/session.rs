use crate::parking_plan;
use approx::assert_relative_eq;
use maneuver_editor::io::EditorOptions;
use maneuver_editor::linalg::Vector3;
use maneuver_editor::md::{Command, ManeuverEditor, ManeuverPlan, OrbitInfo, Session, SyncOutcome};

#[test]
fn tick_follows_the_plan() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
    let mut plan = parking_plan(0.0);
    let mut session = Session::default();
    assert_eq!(session.tick(&mut plan), Ok(SyncOutcome::Idle));
    assert!(!session.editor().is_attached());

    let first = plan.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    let second = plan.insert(1_200.0, Vector3::new(0.0, 0.0, 10.0)).unwrap();
    session.tick(&mut plan).unwrap();
    assert_eq!(session.editor().node(), Some(first));

    session.execute(&mut plan, Command::IncrementPrograde).unwrap();
    assert_eq!(session.tick(&mut plan), Ok(SyncOutcome::Pushed));
    assert_relative_eq!(plan.maneuver(first).unwrap().dv[2], 101.0, epsilon = 1e-6);

    plan.apply(first, Vector3::new(0.0, 0.0, 80.0), 600.0).unwrap();
    assert_eq!(session.tick(&mut plan), Ok(SyncOutcome::Pulled));
    assert_eq!(session.editor().state().prograde(), 80.0);

    session.execute(&mut plan, Command::PageNext).unwrap();
    session.tick(&mut plan).unwrap();
    assert_eq!(session.editor().node(), Some(second));

    plan.remove(second).unwrap();
    session.tick(&mut plan).unwrap();
    assert_eq!(session.editor().node(), Some(first));

    plan.remove(first).unwrap();
    session.tick(&mut plan).unwrap();
    assert!(!session.editor().is_attached());
}

#[test]
fn increments_and_time_commands() {
    let mut plan = parking_plan(0.0);
    plan.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    let mut session = Session::new(EditorOptions::default());
    session.tick(&mut plan).unwrap();

    session.execute(&mut plan, Command::SetIncrement(10.0)).unwrap();
    session.execute(&mut plan, Command::IncrementTime).unwrap();
    assert_eq!(session.editor().current_ut(), 610.0);
    session.execute(&mut plan, Command::UpIncrement).unwrap();
    assert_eq!(session.options.increment, 1.0);
    session.execute(&mut plan, Command::DownIncrement).unwrap();
    assert_eq!(session.options.increment, 10.0);
    session.execute(&mut plan, Command::DecrementTime).unwrap();
    assert_eq!(session.editor().current_ut(), 600.0);

    session.execute(&mut plan, Command::ForwardKilo).unwrap();
    assert_eq!(session.editor().current_ut(), 1_600.0);
    session.execute(&mut plan, Command::BackKilo).unwrap();
    assert_eq!(session.editor().current_ut(), 600.0);
    // Would land in the past
    session.execute(&mut plan, Command::BackKilo).unwrap();
    assert_eq!(session.editor().current_ut(), 600.0);

    let period = plan.maneuvers()[0].patch.period().unwrap();
    session.execute(&mut plan, Command::PreviousOrbit).unwrap();
    assert_eq!(session.editor().current_ut(), 600.0);
    session.execute(&mut plan, Command::NextOrbit).unwrap();
    assert_relative_eq!(session.editor().current_ut(), 600.0 + period, epsilon = 1e-9);

    session.execute(&mut plan, Command::PageConics).unwrap();
    assert_eq!(session.options.conics_mode, 4);
}

#[test]
fn time_cannot_go_to_the_past() {
    let mut plan = parking_plan(0.0);
    plan.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    plan.set_now(599.5);
    let mut session = Session::default();
    session.tick(&mut plan).unwrap();
    assert!(!session.can_decrement_ut(&plan));
    session.execute(&mut plan, Command::DecrementTime).unwrap();
    assert_eq!(session.editor().current_ut(), 600.0);
    assert!(!session.editor().is_dirty());
}

#[test]
fn node_commands() {
    let mut plan = parking_plan(10.0);
    plan.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    let mut session = Session::default();
    session.tick(&mut plan).unwrap();
    assert!(session.can_set_an(&plan));
    assert!(session.can_set_dn(&plan));

    let period = plan.vessel_orbit().period().unwrap();
    session.execute(&mut plan, Command::DescendingNode).unwrap();
    assert_relative_eq!(session.editor().current_ut(), period / 2.0, max_relative = 1e-6);

    session.execute(&mut plan, Command::Apoapsis).unwrap();
    assert!(session.editor().current_ut() >= 0.0);

    // An equatorial orbit has no node with the equator
    let mut flat = parking_plan(0.0);
    flat.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    let mut session = Session::default();
    session.tick(&mut flat).unwrap();
    assert!(!session.can_set_an(&flat));
    session.execute(&mut flat, Command::AscendingNode).unwrap();
    assert_eq!(session.editor().current_ut(), 600.0);
}

#[test]
fn no_apoapsis_on_escape() {
    let mut plan = parking_plan(0.0);
    plan.insert(600.0, Vector3::new(0.0, 0.0, 1_500.0)).unwrap();
    let coasting = plan.insert(700.0, Vector3::new(0.0, 0.0, 1.0)).unwrap();
    let mut session = Session::default();
    *session.editor_mut() = ManeuverEditor::attach(&plan, coasting).unwrap();
    assert!(!session.can_set_apoapsis(&plan));
    assert!(!session.can_shift_orbit(&plan, true));
    session.execute(&mut plan, Command::Apoapsis).unwrap();
    session.execute(&mut plan, Command::NextOrbit).unwrap();
    assert_eq!(session.editor().current_ut(), 700.0);
}

#[test]
fn memory_merge_and_gizmo() {
    let mut plan = parking_plan(0.0);
    let first = plan.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    let second = plan.insert(1_200.0, Vector3::new(0.0, 0.0, 10.0)).unwrap();
    let mut session = Session::default();
    session.tick(&mut plan).unwrap();

    session.execute(&mut plan, Command::Memorize).unwrap();
    session.execute(&mut plan, Command::IncrementRadial).unwrap();
    session.execute(&mut plan, Command::Recall).unwrap();
    assert_eq!(session.editor().state().radial(), 0.0);
    session.execute(&mut plan, Command::ClearMemory).unwrap();
    assert!(session.editor().memory().is_none());

    session.execute(&mut plan, Command::AttachGizmo).unwrap();
    assert!(plan.maneuver(first).unwrap().gizmo.is_some());

    session.execute(&mut plan, Command::MergeDown(first)).unwrap();
    assert_eq!(plan.maneuvers().len(), 2);
    session.execute(&mut plan, Command::MergeDown(second)).unwrap();
    assert_eq!(plan.maneuvers().len(), 1);
    assert!(plan.maneuver(second).is_none());
}

#[test]
fn labels() {
    let mut plan = parking_plan(0.0);
    plan.insert(600.0, Vector3::new(0.0, 0.0, 100.0)).unwrap();
    let mut session = Session::default();
    assert!(session.node_label(&plan).is_none());
    session.tick(&mut plan).unwrap();

    assert_eq!(session.node_label(&plan).unwrap(), "Editing Node 1");
    assert_eq!(session.time_label(), "Year 1 Day 1 0:10:00");
    assert_eq!(session.total_dv_label(), "100 m/s");
    assert_eq!(session.ejection_angle_label(&plan), "n/a");
    assert_eq!(session.ejection_inclination_label(&plan), "n/a");
    assert_eq!(session.clock_label(&plan).unwrap(), "T- 10 m 0 s");
    plan.set_now(700.0);
    assert_eq!(session.clock_label(&plan).unwrap(), "T+ 1 m 40 s");

    match session.orbit_info(&plan).unwrap() {
        OrbitInfo::Projected {
            apoapsis_altitude_m,
            periapsis_altitude_m,
        } => {
            assert_relative_eq!(periapsis_altitude_m, 100_000.0, max_relative = 1e-6);
            assert!(apoapsis_altitude_m.unwrap() > 100_000.0);
        }
        other => panic!("expected projected apsides, got {other:?}"),
    }
    let info = session.orbit_info_label(&plan).unwrap();
    assert!(info.starts_with("Ap ") && info.contains(" km, Pe "), "{info}");

    let trip = session.trip(&plan);
    assert_eq!(trip.legs.len(), 1);
    assert_relative_eq!(trip.total_dv_m_s, 100.0, epsilon = 1e-9);
}

#[test]
fn escape_labels() {
    let mut plan = parking_plan(0.0);
    plan.insert(600.0, Vector3::new(0.0, 0.0, 1_500.0)).unwrap();
    let mut session = Session::default();
    session.tick(&mut plan).unwrap();
    let angle = session.ejection_angle_label(&plan);
    assert!(angle.contains("° from "), "{angle}");
    assert_eq!(session.ejection_inclination_label(&plan), "0° north");
    let info = session.orbit_info_label(&plan).unwrap();
    assert!(info.starts_with("Ap n/a, Pe "), "{info}");
}
