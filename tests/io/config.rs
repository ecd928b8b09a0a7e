use crate::{data_path, parking_plan};
use maneuver_editor::io::{Calendar, ConfigRepr, EditorOptions, NodeList, RelativityMode};
use maneuver_editor::linalg::Vector3;
use maneuver_editor::md::{ManeuverPlan, NodeSnapshot};
use std::fs;

#[test]
fn load_editor_options() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
    let opts = EditorOptions::load(data_path("editor_options.yaml")).unwrap();
    assert_eq!(opts.increment, 10.0);
    assert_eq!(opts.ut_increment(), 100.0);
    assert!(!opts.show_conics);
    assert!(opts.show_trip);
    // Not in the file
    assert!(!opts.show_conics_always);
    assert!(!opts.show_ut_controls);
    assert_eq!(opts.relativity_mode(), RelativityMode::LocalAtSoiEntry);
    assert_eq!(opts.calendar, Calendar::Earth);

    let reloaded = EditorOptions::loads(&opts.dumps().unwrap()).unwrap();
    assert_eq!(reloaded, opts);
}

#[test]
fn missing_file() {
    assert!(EditorOptions::load(data_path("does_not_exist.yaml")).is_err());
    assert!(EditorOptions::loads("increment: [1, 2]").is_err());
}

#[test]
fn many_options() {
    let all = EditorOptions::loads_many("- increment: 0.1\n- show_clock: true\n").unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].increment, 0.1);
    assert!(all[1].show_clock);
    assert_eq!(all[1].increment, 1.0);
}

#[test]
fn restore_saved_nodes() {
    let saved = NodeList::load(data_path("nodes.yaml")).unwrap();
    assert_eq!(saved.nodes.len(), 3);
    assert_eq!(saved.nodes[1], NodeSnapshot::from_parts(Vector3::new(12.0, -3.5, 40.0), 2400.0));

    let mut plan = parking_plan(0.0);
    plan.set_now(120.0);
    // The first node is not in the future anymore
    assert_eq!(saved.restore_into(&mut plan), Ok(2));
    assert_eq!(plan.maneuvers().len(), 2);
    assert_eq!(plan.maneuvers()[0].ut, 2400.0);
    assert_eq!(plan.maneuvers()[1].dv, Vector3::new(0.0, 25.0, 0.0));

    // Only restored into an empty plan
    assert_eq!(saved.restore_into(&mut plan), Ok(0));
    assert_eq!(plan.maneuvers().len(), 2);
}

#[test]
fn capture_and_reload() {
    let mut plan = parking_plan(0.0);
    plan.insert(900.0, Vector3::new(1.0, 2.0, 3.0)).unwrap();
    plan.insert(300.0, Vector3::new(0.0, 0.0, 50.0)).unwrap();
    let captured = NodeList::capture(&plan);
    assert_eq!(captured.nodes[0].ut, 300.0);

    let yaml = captured.dumps().unwrap();
    let reloaded = NodeList::loads(&yaml).unwrap();
    assert_eq!(reloaded, captured);

    let mut fresh = parking_plan(0.0);
    assert_eq!(reloaded.restore_into(&mut fresh), Ok(2));
    for (restored, original) in fresh.maneuvers().iter().zip(plan.maneuvers()) {
        assert_eq!(restored.dv, original.dv);
        assert_eq!(restored.ut, original.ut);
    }
}

#[test]
fn save_and_load_nodes() {
    let mut plan = parking_plan(0.0);
    plan.insert(1_200.0, Vector3::new(-4.0, 0.5, 80.0)).unwrap();
    let captured = NodeList::capture(&plan);

    let path = std::env::temp_dir().join(format!("maneuver_editor_nodes_{}.yaml", std::process::id()));
    captured.save(&path).unwrap();
    let loaded = NodeList::load(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(loaded, captured);

    // Unwritable destination
    let missing_dir = std::env::temp_dir().join("maneuver_editor_missing").join("nodes.yaml");
    assert!(captured.save(missing_dir).is_err());
}
