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

use super::ConfigRepr;
use crate::md::{ManeuverPlan, NodeSnapshot, PlanError};
use serde_derive::{Deserialize, Serialize};

/// The maneuvers of a plan, as saved with the vessel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeList {
    pub nodes: Vec<NodeSnapshot>,
}

impl ConfigRepr for NodeList {}

impl NodeList {
    /// Captures the maneuvers of the plan, in order.
    pub fn capture<P: ManeuverPlan + ?Sized>(plan: &P) -> Self {
        Self {
            nodes: plan.maneuvers().iter().map(NodeSnapshot::from_live).collect(),
        }
    }

    /// Recreates the saved maneuvers which are still in the future, only if the plan has none.
    /// Returns the number of maneuvers created.
    pub fn restore_into<P: ManeuverPlan + ?Sized>(&self, plan: &mut P) -> Result<usize, PlanError> {
        if !plan.maneuvers().is_empty() {
            info!("plan already has maneuvers, saved nodes not restored");
            return Ok(0);
        }
        let now = plan.now_ut();
        let mut restored = 0;
        for node in &self.nodes {
            if node.ut > now {
                plan.insert(node.ut, node.dv)?;
                restored += 1;
            } else {
                debug!("skipping past node {node}");
            }
        }
        info!("restored {restored} of {} saved nodes", self.nodes.len());
        Ok(restored)
    }
}
