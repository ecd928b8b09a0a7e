/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{xzy, Orbit, PatchTransition};
use crate::linalg::{Rotation3, Vector3};
use crate::md::Maneuver;

/// Below this relative inclination, in degrees, two planes are considered coplanar and have no line of nodes.
pub const NODE_INCLINATION_THRESHOLD_DEG: f64 = 0.001;

/// Normalizes an angle in degrees to [0, 360).
pub fn angle360(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed angle in degrees between two native normal vectors, negative when the second plane lies "south".
fn signed_plane_angle(normal: &Vector3<f64>, other: &Vector3<f64>) -> f64 {
    let normal = xzy(normal).normalize();
    let other = xzy(other).normalize();
    let angle = normal.angle(&other).to_degrees();
    if normal.cross(&other).dot(&xzy(&normal)) > 0.0 {
        -angle
    } else {
        angle
    }
}

/// Returns the signed inclination of `other` relative to `orbit`, in degrees within [-180, 180].
pub fn relative_inclination(orbit: &Orbit, other: &Orbit) -> f64 {
    signed_plane_angle(&orbit.hvec(), &other.hvec())
}

/// Returns the signed inclination of the body's equatorial plane relative to `orbit`, in degrees.
pub fn equatorial_inclination(orbit: &Orbit) -> f64 {
    signed_plane_angle(&orbit.hvec(), &Vector3::z())
}

fn node_ut(orbit: &Orbit, direction: &Vector3<f64>, now: f64) -> Option<f64> {
    let ta = orbit.true_anomaly_of(direction);
    orbit.ut_for_true_anomaly(ta, now.max(orbit.start_ut))
}

fn equatorial_node_ut(orbit: &Orbit, longitude_deg: f64, now: f64) -> Option<f64> {
    if equatorial_inclination(orbit).abs() < NODE_INCLINATION_THRESHOLD_DEG {
        return None;
    }
    let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), longitude_deg.to_radians());
    node_ut(orbit, &(rot * Vector3::x()), now)
}

/// Time of the next crossing of the equator going north, `None` if the orbit is equatorial
pub fn equatorial_an_ut(orbit: &Orbit, now: f64) -> Option<f64> {
    equatorial_node_ut(orbit, orbit.raan_deg(), now)
}

/// Time of the next crossing of the equator going south, `None` if the orbit is equatorial
pub fn equatorial_dn_ut(orbit: &Orbit, now: f64) -> Option<f64> {
    equatorial_node_ut(orbit, angle360(orbit.raan_deg() + 180.0), now)
}

fn target_node_ut(orbit: &Orbit, target: &Orbit, ascending: bool, now: f64) -> Option<f64> {
    if relative_inclination(orbit, target).abs() < NODE_INCLINATION_THRESHOLD_DEG {
        return None;
    }
    let direction = if ascending {
        target.hvec().cross(&orbit.hvec())
    } else {
        orbit.hvec().cross(&target.hvec())
    };
    node_ut(orbit, &direction.try_normalize(f64::EPSILON)?, now)
}

/// Time of the next ascending node of `orbit` relative to the plane of `target`, `None` if they are coplanar
pub fn target_an_ut(orbit: &Orbit, target: &Orbit, now: f64) -> Option<f64> {
    target_node_ut(orbit, target, true, now)
}

/// Time of the next descending node of `orbit` relative to the plane of `target`, `None` if they are coplanar
pub fn target_dn_ut(orbit: &Orbit, target: &Orbit, now: f64) -> Option<f64> {
    target_node_ut(orbit, target, false, now)
}

/// Returns whether a maneuver on `orbit` could be placed at `ut`: not in the past, and before the segment ends.
pub fn is_time_inside_patch(orbit: &Orbit, ut: f64, now: f64) -> bool {
    ut >= now && (orbit.is_closed() || ut <= orbit.end_ut)
}

/// Returns the ejection angle of the maneuver in degrees, if its resulting trajectory escapes the body.
///
/// Positive results are measured from the parent body's prograde, negative results from its retrograde.
pub fn ejection_angle(orbit: &Orbit, maneuver: &Maneuver) -> Option<f64> {
    if maneuver.next_patch.end_transition != PatchTransition::Escape {
        return None;
    }
    let body_orbit = orbit.body.orbit.as_ref()?;
    let prograde = body_orbit.velocity_at(maneuver.ut);
    let position = orbit.position_at(maneuver.ut);
    let eangle = angle360((prograde[1].atan2(prograde[0]) - position[1].atan2(position[0])).to_degrees());
    if eangle > 180.0 {
        Some(180.0 - eangle)
    } else {
        Some(eangle)
    }
}

/// Returns the inclination of the escape trajectory relative to the parent body's orbit, in degrees.
pub fn ejection_inclination(orbit: &Orbit, maneuver: &Maneuver) -> Option<f64> {
    if maneuver.next_patch.end_transition != PatchTransition::Escape {
        return None;
    }
    let body_orbit = orbit.body.orbit.as_ref()?;
    let after_escape = maneuver.next_patch.next_patch.as_ref()?;
    Some(relative_inclination(body_orbit, after_escape))
}

fn has_node(maneuver: &Maneuver, target: Option<&Orbit>, now: f64, ascending: bool) -> bool {
    let patch = &maneuver.patch;
    let ut = match (target, ascending) {
        (Some(target), true) => target_an_ut(patch, target, now),
        (Some(target), false) => target_dn_ut(patch, target, now),
        (None, true) => equatorial_an_ut(patch, now),
        (None, false) => equatorial_dn_ut(patch, now),
    };
    ut.is_some_and(|ut| is_time_inside_patch(patch, ut, now))
}

/// Returns whether the maneuver's segment has a reachable ascending node, relative to the target or the equator.
pub fn has_ascending_node(maneuver: &Maneuver, target: Option<&Orbit>, now: f64) -> bool {
    has_node(maneuver, target, now, true)
}

/// Returns whether the maneuver's segment has a reachable descending node, relative to the target or the equator.
pub fn has_descending_node(maneuver: &Maneuver, target: Option<&Orbit>, now: f64) -> bool {
    has_node(maneuver, target, now, false)
}

pub fn has_apoapsis(orbit: &Orbit) -> bool {
    orbit.is_closed()
}
