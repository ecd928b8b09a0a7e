use crate::{kerbin, parking_orbit, parking_plan};
use approx::assert_relative_eq;
use maneuver_editor::cosmic::geometry::*;
use maneuver_editor::cosmic::Orbit;
use maneuver_editor::linalg::Vector3;
use maneuver_editor::md::{FlightPlan, ManeuverPlan};
use rstest::*;

/// Equatorial parking orbit with a small prograde burn after ten minutes
fn small_burn_plan() -> FlightPlan {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
    let mut plan = parking_plan(0.0);
    plan.insert(600.0, Vector3::new(0.0, 0.0, 10.0)).unwrap();
    plan
}

#[rstest]
#[case(5.0, true)]
#[case(0.0001, false)]
fn target_nodes_need_inclination(#[case] target_inc_deg: f64, #[case] expected: bool) {
    let mut plan = small_burn_plan();
    let target = Orbit::circular(2_000_000.0, target_inc_deg, 0.0, 0.0, 0.0, kerbin());
    plan.set_target(Some(target));
    let maneuver = &plan.maneuvers()[0];
    let target = plan.target_orbit();
    let now = plan.now_ut();
    assert_eq!(has_ascending_node(maneuver, target, now), expected);
    assert_eq!(has_descending_node(maneuver, target, now), expected);
}

#[test]
fn target_nodes_are_on_the_line_of_nodes() {
    let orbit = parking_orbit(0.0, 0.0);
    let target = Orbit::circular(2_000_000.0, 5.0, 60.0, 0.0, 0.0, kerbin());
    let an = target_an_ut(&orbit, &target, 0.0).unwrap();
    let dn = target_dn_ut(&orbit, &target, 0.0).unwrap();
    let period = orbit.period().unwrap();
    assert!(an >= 0.0 && an < period);
    assert!(dn >= 0.0 && dn < period);
    assert_relative_eq!((an - dn).abs(), period / 2.0, max_relative = 1e-9);
    // Both nodes lie in the target plane
    let h = target.hvec().normalize();
    assert!(orbit.position_at(an).dot(&h).abs() < 1e-3);
    assert!(orbit.position_at(dn).dot(&h).abs() < 1e-3);
}

#[test]
fn equatorial_nodes_without_target() {
    let plan = {
        let mut plan = FlightPlan::new(parking_orbit(20.0, 10.0));
        plan.insert(100.0, Vector3::new(0.0, 0.0, 5.0)).unwrap();
        plan
    };
    let maneuver = &plan.maneuvers()[0];
    assert!(has_ascending_node(maneuver, None, 0.0));
    assert!(has_descending_node(maneuver, None, 0.0));

    let flat = small_burn_plan();
    let maneuver = &flat.maneuvers()[0];
    assert!(!has_ascending_node(maneuver, None, 0.0));
    assert!(!has_descending_node(maneuver, None, 0.0));
}

#[test]
fn ejection_on_escape_only() {
    let mut plan = parking_plan(0.0);
    let escape = plan.insert(600.0, Vector3::new(0.0, 0.0, 1_500.0)).unwrap();
    let maneuver = plan.maneuver(escape).unwrap();
    let angle = ejection_angle(&maneuver.patch, maneuver).unwrap();
    assert!((-180.0..=180.0).contains(&angle));
    // Equatorial departure from an equatorial planet
    assert!(ejection_inclination(&maneuver.patch, maneuver).unwrap().abs() < 1e-6);

    let bound = small_burn_plan();
    let maneuver = &bound.maneuvers()[0];
    assert!(ejection_angle(&maneuver.patch, maneuver).is_none());
    assert!(ejection_inclination(&maneuver.patch, maneuver).is_none());
}

#[rstest]
#[case::behind_retrograde(600.0, -159.714)]
#[case::ahead_of_retrograde(1_200.0, -49.428)]
#[case::from_prograde(1_500.0, 174.285)]
fn ejection_angle_reference_side(#[case] ut: f64, #[case] expected_deg: f64) {
    let mut plan = parking_plan(0.0);
    let escape = plan.insert(ut, Vector3::new(0.0, 0.0, 1_500.0)).unwrap();
    let maneuver = plan.maneuver(escape).unwrap();
    let angle = ejection_angle(&maneuver.patch, maneuver).unwrap();
    assert_relative_eq!(angle, expected_deg, epsilon = 1e-3);
}
