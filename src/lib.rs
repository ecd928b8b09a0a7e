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

/*! # maneuver-editor

Precise editing of planned maneuver nodes on top of a patched-conic propagation engine.

A maneuver is a velocity change (delta-v) applied at a specific time. The engine owns the live maneuvers and keeps
recomputing the trajectory; the [`md::ManeuverEditor`] keeps an editable copy of one of them, expressed in the
prograde, normal and radial directions, and synchronizes both sides every tick without losing either side's changes.
*/

/// Provides the celestial bodies, the two-body orbits, the maneuver frame and the orbit geometry queries.
pub mod cosmic;

mod errors;
/// Functions which may fail return an error, nothing panics.
pub use self::errors::EditorError;

/// Editor options, persistence of the maneuver nodes, and human readable formatting.
pub mod io;

/// All of the maneuver design tools: the plan seam, the editor state machine, and the per-tick session.
pub mod md;

#[macro_use]
extern crate log;
extern crate nalgebra as na;

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::geometry::Rotation3;
}

/// Re-export some useful things
pub use self::cosmic::{Body, Orbit};
pub use self::md::{FlightPlan, ManeuverEditor, ManeuverPlan, Session};
