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

mod snapshot;
pub use snapshot::NodeSnapshot;

mod plan;
pub use plan::{
    merge_node_down, next_encounter, FlightPlan, Gizmo, Maneuver, ManeuverPlan, NodeId, PlanError,
    TripLeg, TripSummary,
};

/// The maneuver edit state machine
pub mod editor;
pub use editor::{ManeuverEditor, NumericField, PageDirection, SyncOutcome};

/// Per-tick driver of the editor and operator commands
pub mod session;
pub use session::{Command, OrbitInfo, Session};
