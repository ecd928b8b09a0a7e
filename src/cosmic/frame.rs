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

use super::{xzy, AstroError, DegenerateFrameSnafu, Orbit};
use crate::linalg::Vector3;
use snafu::OptionExt;

const NORM_EPSILON: f64 = 1e-12;

/// Returns the prograde unit vector of the orbit at the provided time, in swapped coordinates.
pub fn prograde(orbit: &Orbit, ut: f64) -> Result<Vector3<f64>, AstroError> {
    xzy(&orbit.velocity_at(ut))
        .try_normalize(NORM_EPSILON)
        .context(DegenerateFrameSnafu { what: "prograde" })
}

/// Returns the radial-out unit vector of the orbit at the provided time, in swapped coordinates.
///
/// This is the position direction with its prograde component removed, so that the frame stays orthonormal
/// on eccentric orbits where the position and velocity are not perpendicular.
pub fn radial_plus(orbit: &Orbit, ut: f64) -> Result<Vector3<f64>, AstroError> {
    let (radius, velocity) = orbit.state_at(ut);
    let pro = xzy(&velocity)
        .try_normalize(NORM_EPSILON)
        .context(DegenerateFrameSnafu { what: "prograde" })?;
    let r_hat = xzy(&radius)
        .try_normalize(NORM_EPSILON)
        .context(DegenerateFrameSnafu { what: "radial" })?;
    (r_hat - pro * r_hat.dot(&pro))
        .try_normalize(NORM_EPSILON)
        .context(DegenerateFrameSnafu { what: "radial" })
}

/// Returns the orbit normal unit vector, in swapped coordinates. It is constant along a segment.
pub fn normal_plus(orbit: &Orbit) -> Result<Vector3<f64>, AstroError> {
    xzy(&orbit.hvec())
        .try_normalize(NORM_EPSILON)
        .context(DegenerateFrameSnafu { what: "normal" })
}

/// Converts a swapped-coordinates vector into (radial, normal, prograde) components.
pub fn dv_to_local(orbit: &Orbit, ut: f64, world: &Vector3<f64>) -> Result<Vector3<f64>, AstroError> {
    Ok(NodeFrame::at(orbit, ut)?.to_local(world))
}

/// Converts (radial, normal, prograde) components into a swapped-coordinates vector.
pub fn local_to_world(orbit: &Orbit, ut: f64, local: &Vector3<f64>) -> Result<Vector3<f64>, AstroError> {
    Ok(NodeFrame::at(orbit, ut)?.to_world(local))
}

/// The maneuver frame of an orbit at one time, for converting several vectors without rebuilding the basis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NodeFrame {
    pub radial: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub prograde: Vector3<f64>,
}

impl NodeFrame {
    pub fn at(orbit: &Orbit, ut: f64) -> Result<Self, AstroError> {
        Ok(Self {
            radial: radial_plus(orbit, ut)?,
            normal: normal_plus(orbit)?,
            prograde: prograde(orbit, ut)?,
        })
    }

    /// Projects a swapped-coordinates vector onto this frame: x = radial, y = normal, z = prograde
    pub fn to_local(&self, world: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            self.radial.dot(world),
            self.normal.dot(world),
            self.prograde.dot(world),
        )
    }

    pub fn to_world(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.radial * local[0] + self.normal * local[1] + self.prograde * local[2]
    }
}
