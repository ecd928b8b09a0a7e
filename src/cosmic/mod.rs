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

use crate::linalg::Vector3;
use snafu::Snafu;
use std::fmt;

mod orbit;
pub use orbit::{Orbit, ECC_EPSILON};

/// Local maneuver frame (radial, normal, prograde) at a given time.
pub mod frame;
pub use frame::NodeFrame;

/// Scalar and time quantities derived from orbit geometry (nodes, ejection, inclination).
pub mod geometry;

/// A celestial body which orbits may be defined around.
#[derive(Clone, Debug)]
pub struct Body {
    pub name: String,
    /// Gravitational parameter in m^3/s^2
    pub mu_m3_s2: f64,
    /// Equatorial radius in meters, used for altitudes
    pub radius_m: f64,
    /// Sphere of influence radius in meters, infinite for the root body
    pub soi_m: f64,
    /// Orbit of this body around its parent, `None` for the root body
    pub orbit: Option<Orbit>,
}

impl Body {
    /// Initializes the root body of a system: it has an infinite sphere of influence and no parent.
    pub fn root(name: &str, mu_m3_s2: f64, radius_m: f64) -> Self {
        Self {
            name: name.to_string(),
            mu_m3_s2,
            radius_m,
            soi_m: f64::INFINITY,
            orbit: None,
        }
    }

    /// Initializes a body orbiting the body of the provided orbit.
    pub fn orbiting(name: &str, mu_m3_s2: f64, radius_m: f64, soi_m: f64, orbit: Orbit) -> Self {
        Self {
            name: name.to_string(),
            mu_m3_s2,
            radius_m,
            soi_m,
            orbit: Some(orbit),
        }
    }

    /// Returns whether this body is the root of its system (i.e. it has no parent)
    pub fn is_root(&self) -> bool {
        self.orbit.is_none()
    }
}

impl PartialEq for Body {
    /// Two bodies are the same if they have the same name
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How an orbit segment of a flight plan ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PatchTransition {
    /// The segment never ends: closed orbit that stays in the sphere of influence.
    Final,
    /// The segment leaves the sphere of influence of its body.
    Escape,
    /// The segment enters the sphere of influence of a child body.
    Encounter,
    /// The segment ends on a planned maneuver.
    Maneuver,
}

/// Errors raised by orbit and frame computations.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AstroError {
    #[snafu(display("parabolic orbits have ill-defined Keplerian orbital elements"))]
    ParabolicEccentricity,
    #[snafu(display(
        "true anomaly value ({ta_deg} deg) physically impossible for a hyperbolic orbit of eccentricity {ecc}"
    ))]
    HyperbolicTrueAnomaly { ta_deg: f64, ecc: f64 },
    #[snafu(display("cannot build a unit vector for {what}: degenerate geometry"))]
    DegenerateFrame { what: &'static str },
}

/// Swaps the second and third components of a vector.
///
/// The propagation engine reports vectors in its native (x, y, z) order whereas all the local frame
/// math is done in (x, z, y) order. The swap is its own inverse.
pub fn xzy(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v[0], v[2], v[1])
}
