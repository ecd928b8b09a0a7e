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

use super::Maneuver;
use crate::linalg::Vector3;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// An editable copy of a maneuver: its delta-v in the maneuver frame and its execution time.
///
/// The delta-v components are x = radial, y = normal, z = prograde, in m/s. The time is in seconds of universal time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub dv: Vector3<f64>,
    pub ut: f64,
}

impl NodeSnapshot {
    pub fn from_parts(dv: Vector3<f64>, ut: f64) -> Self {
        Self { dv, ut }
    }

    /// Copies the current values of the live maneuver.
    pub fn from_live(maneuver: &Maneuver) -> Self {
        Self::from_parts(maneuver.dv, maneuver.ut)
    }

    /// Overwrites this snapshot with the current values of the live maneuver.
    pub fn update(&mut self, maneuver: &Maneuver) {
        self.dv = maneuver.dv;
        self.ut = maneuver.ut;
    }

    /// Returns whether the live maneuver still holds exactly the values of this snapshot (no tolerance).
    #[allow(clippy::float_cmp)]
    pub fn matches(&self, maneuver: &Maneuver) -> bool {
        self.dv[0] == maneuver.dv[0]
            && self.dv[1] == maneuver.dv[1]
            && self.dv[2] == maneuver.dv[2]
            && self.ut == maneuver.ut
    }

    /// Total delta-v of this snapshot in m/s
    pub fn magnitude(&self) -> f64 {
        self.dv.norm()
    }

    pub fn radial(&self) -> f64 {
        self.dv[0]
    }

    pub fn normal(&self) -> f64 {
        self.dv[1]
    }

    pub fn prograde(&self) -> f64 {
        self.dv[2]
    }
}

impl fmt::Display for NodeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "@ {:.3} s\tprograde = {:.3} m/s\tnormal = {:.3} m/s\tradial = {:.3} m/s",
            self.ut,
            self.prograde(),
            self.normal(),
            self.radial()
        )
    }
}
