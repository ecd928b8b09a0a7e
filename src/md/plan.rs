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

use crate::cosmic::frame::{dv_to_local, NodeFrame};
use crate::cosmic::{xzy, AstroError, Orbit, PatchTransition};
use crate::linalg::Vector3;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;
use std::sync::Arc;

/// Stable handle to a maneuver of a plan. Handles are never reused within a plan.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PlanError {
    #[snafu(display("no maneuver {id} in the plan"))]
    NodeNotFound { id: NodeId },
    #[snafu(display("cannot place a maneuver at {ut} s"))]
    InvalidTime { ut: f64 },
    #[snafu(display("maneuver frame unavailable: {source}"))]
    EngineFrame { source: AstroError },
}

/// Mirror of a maneuver held by the visual manipulator, when one is attached.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gizmo {
    pub dv: Vector3<f64>,
    pub ut: f64,
}

/// A live maneuver, as owned and solved by the engine.
#[derive(Clone, Debug)]
pub struct Maneuver {
    pub id: NodeId,
    /// Delta-v in m/s: x = radial, y = normal, z = prograde
    pub dv: Vector3<f64>,
    pub ut: f64,
    /// Segment the maneuver lies on, before the burn
    pub patch: Arc<Orbit>,
    /// Segment resulting from the burn
    pub next_patch: Arc<Orbit>,
    pub gizmo: Option<Gizmo>,
}

impl Maneuver {
    /// Total delta-v in m/s
    pub fn dv_magnitude(&self) -> f64 {
        self.dv.norm()
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "maneuver {} @ {:.3} s: {:.3} m/s (R = {:.3}, N = {:.3}, P = {:.3})",
            self.id,
            self.ut,
            self.dv_magnitude(),
            self.dv[0],
            self.dv[1],
            self.dv[2]
        )
    }
}

/// The interface to the propagation engine which owns the maneuvers and solves the trajectory.
///
/// Maneuvers are returned ordered by execution time. Every mutation re-solves the trajectory before returning.
pub trait ManeuverPlan {
    /// Current universal time of the simulation, in seconds
    fn now_ut(&self) -> f64;

    fn maneuvers(&self) -> &[Maneuver];

    fn maneuver(&self, id: NodeId) -> Option<&Maneuver> {
        self.maneuvers().iter().find(|m| m.id == id)
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.maneuvers().iter().position(|m| m.id == id)
    }

    /// All the segments of the planned trajectory, in order, each ending on its transition
    fn flight_plan(&self) -> Vec<Arc<Orbit>>;

    fn vessel_orbit(&self) -> &Orbit;

    /// Orbit of the selected target, if any
    fn target_orbit(&self) -> Option<&Orbit> {
        None
    }

    /// Sets the delta-v and time of a maneuver and solves the trajectory
    fn apply(&mut self, id: NodeId, dv: Vector3<f64>, ut: f64) -> Result<(), PlanError>;

    /// Mirrors the delta-v and time on the manipulator of this maneuver, if it has one
    fn update_gizmo(&mut self, id: NodeId, dv: Vector3<f64>, ut: f64) -> Result<(), PlanError>;

    fn attach_gizmo(&mut self, id: NodeId) -> Result<(), PlanError>;

    fn remove(&mut self, id: NodeId) -> Result<(), PlanError>;

    /// Adds a new maneuver and returns its handle
    fn insert(&mut self, ut: f64, dv: Vector3<f64>) -> Result<NodeId, PlanError>;
}

/// A patched-conic flight plan: the vessel's orbit and the maneuvers planned along it.
///
/// Segments are two-body conics. A segment which leaves the sphere of influence of its body continues around the
/// parent body. Encounters with other bodies are not searched.
#[derive(Clone, Debug)]
pub struct FlightPlan {
    now_ut: f64,
    vessel: Arc<Orbit>,
    nodes: Vec<Maneuver>,
    target: Option<Orbit>,
    next_id: u64,
}

impl FlightPlan {
    /// Initializes a plan without maneuvers. The current time is the epoch of the vessel orbit.
    pub fn new(vessel: Orbit) -> Self {
        let now_ut = vessel.epoch_ut;
        Self {
            now_ut,
            vessel: Arc::new(bounded(vessel)),
            nodes: Vec::new(),
            target: None,
            next_id: 0,
        }
    }

    /// Advances the simulation clock
    pub fn set_now(&mut self, ut: f64) {
        self.now_ut = ut;
    }

    pub fn set_target(&mut self, target: Option<Orbit>) {
        self.target = target;
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Maneuver, PlanError> {
        self.nodes
            .iter_mut()
            .find(|m| m.id == id)
            .context(NodeNotFoundSnafu { id })
    }

    /// Orders the maneuvers by time and recomputes every segment after the vessel's orbit.
    fn solve(&mut self) -> Result<(), PlanError> {
        self.nodes.sort_by(|a, b| a.ut.total_cmp(&b.ut));
        let mut patch = self.vessel.clone();
        for node in self.nodes.iter_mut() {
            while patch.end_transition == PatchTransition::Escape && node.ut > patch.end_ut {
                match patch.next_patch.clone() {
                    Some(next) => patch = next,
                    None => break,
                }
            }
            let frame = NodeFrame::at(&patch, node.ut).context(EngineFrameSnafu)?;
            let burn = xzy(&frame.to_world(&node.dv));
            let next = Arc::new(bounded(patch.with_dv(node.ut, &burn)));
            node.patch = patch;
            node.next_patch = next.clone();
            patch = next;
        }
        Ok(())
    }

    /// Solves the plan again once a rejected change has been undone.
    fn resolve_after(&mut self, rejected: &PlanError) {
        warn!("change rejected ({rejected}), restoring previous plan");
        if let Err(e) = self.solve() {
            error!("previous plan cannot be solved either: {e}");
        }
    }
}

/// Sets the end of a segment on its sphere of influence exit, and builds the segment around the parent body.
fn bounded(mut orbit: Orbit) -> Orbit {
    orbit.start_ut = orbit.epoch_ut;
    let parent = orbit.body.orbit.clone();
    if let (Some(exit_ut), Some(parent)) = (orbit.soi_exit_ut(), parent) {
        let (radius, velocity) = orbit.state_at(exit_ut);
        let (body_radius, body_velocity) = parent.state_at(exit_ut);
        let escaped = Orbit::cartesian(
            body_radius + radius,
            body_velocity + velocity,
            exit_ut,
            parent.body.clone(),
        );
        debug!("segment around {} escapes at {exit_ut:.3} s", orbit.body);
        orbit.end_ut = exit_ut;
        orbit.end_transition = PatchTransition::Escape;
        orbit.next_patch = Some(Arc::new(bounded(escaped)));
    } else {
        orbit.end_ut = f64::INFINITY;
        orbit.end_transition = PatchTransition::Final;
        orbit.next_patch = None;
    }
    orbit
}

impl ManeuverPlan for FlightPlan {
    fn now_ut(&self) -> f64 {
        self.now_ut
    }

    fn maneuvers(&self) -> &[Maneuver] {
        &self.nodes
    }

    fn flight_plan(&self) -> Vec<Arc<Orbit>> {
        let mut patches = Vec::new();
        let mut current = Some(self.vessel.clone());
        for node in &self.nodes {
            while let Some(segment) = current.take() {
                if Arc::ptr_eq(&segment, &node.patch) {
                    let mut cut = (*segment).clone();
                    cut.end_ut = node.ut;
                    cut.end_transition = PatchTransition::Maneuver;
                    cut.next_patch = Some(node.next_patch.clone());
                    patches.push(Arc::new(cut));
                    break;
                }
                current = segment.next_patch.clone();
                patches.push(segment);
            }
            current = Some(node.next_patch.clone());
        }
        while let Some(segment) = current.take() {
            current = segment.next_patch.clone();
            patches.push(segment);
        }
        patches
    }

    fn vessel_orbit(&self) -> &Orbit {
        &self.vessel
    }

    fn target_orbit(&self) -> Option<&Orbit> {
        self.target.as_ref()
    }

    fn apply(&mut self, id: NodeId, dv: Vector3<f64>, ut: f64) -> Result<(), PlanError> {
        ensure!(ut.is_finite(), InvalidTimeSnafu { ut });
        let node = self.node_mut(id)?;
        let previous = (node.dv, node.ut);
        node.dv = dv;
        node.ut = ut;
        if let Err(e) = self.solve() {
            let node = self.node_mut(id)?;
            (node.dv, node.ut) = previous;
            self.resolve_after(&e);
            return Err(e);
        }
        Ok(())
    }

    fn update_gizmo(&mut self, id: NodeId, dv: Vector3<f64>, ut: f64) -> Result<(), PlanError> {
        if let Some(gizmo) = self.node_mut(id)?.gizmo.as_mut() {
            gizmo.dv = dv;
            gizmo.ut = ut;
        }
        Ok(())
    }

    fn attach_gizmo(&mut self, id: NodeId) -> Result<(), PlanError> {
        let node = self.node_mut(id)?;
        node.gizmo = Some(Gizmo {
            dv: node.dv,
            ut: node.ut,
        });
        Ok(())
    }

    fn remove(&mut self, id: NodeId) -> Result<(), PlanError> {
        let idx = self.index_of(id).context(NodeNotFoundSnafu { id })?;
        self.nodes.remove(idx);
        self.solve()
    }

    fn insert(&mut self, ut: f64, dv: Vector3<f64>) -> Result<NodeId, PlanError> {
        ensure!(ut.is_finite() && ut >= self.now_ut, InvalidTimeSnafu { ut });
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(Maneuver {
            id,
            dv,
            ut,
            patch: self.vessel.clone(),
            next_patch: self.vessel.clone(),
            gizmo: None,
        });
        if let Err(e) = self.solve() {
            self.nodes.retain(|m| m.id != id);
            self.resolve_after(&e);
            return Err(e);
        }
        Ok(id)
    }
}

/// Folds a maneuver into the maneuver right before it, then removes it.
///
/// The preceding maneuver's delta-v is changed so that, at its own time, its resulting velocity is the velocity the
/// merged maneuver's resulting orbit has at that time. Returns `Ok(false)` and leaves the plan untouched when the
/// maneuver is the first one.
pub fn merge_node_down<P: ManeuverPlan + ?Sized>(plan: &mut P, id: NodeId) -> Result<bool, PlanError> {
    let idx = plan.index_of(id).context(NodeNotFoundSnafu { id })?;
    if idx == 0 {
        return Ok(false);
    }
    let (into_id, into_ut, merged_dv) = {
        let maneuvers = plan.maneuvers();
        let into = &maneuvers[idx - 1];
        let this = &maneuvers[idx];
        let initial = into.next_patch.velocity_at(into.ut);
        let target = this.next_patch.velocity_at(into.ut);
        let diff = xzy(&(target - initial));
        let local = dv_to_local(&into.patch, into.ut, &diff).context(EngineFrameSnafu)?;
        (into.id, into.ut, into.dv + local)
    };
    info!("merging maneuver {id} into {into_id}: {:.3} m/s", merged_dv.norm());
    plan.apply(into_id, merged_dv, into_ut)?;
    plan.remove(id)?;
    Ok(true)
}

/// Returns the first segment, starting from the segment of the maneuver, which orbits another body than the
/// maneuver's and which is not the root body.
pub fn next_encounter(patches: &[Arc<Orbit>], maneuver: &Maneuver) -> Option<Arc<Orbit>> {
    let body = &maneuver.patch.body;
    let start = patches
        .iter()
        .position(|p| p.start_ut <= maneuver.ut && maneuver.ut <= p.end_ut)
        .unwrap_or(0);
    patches[start..]
        .iter()
        .find(|p| p.body != *body && !p.body.is_root())
        .cloned()
}

/// One maneuver of a trip summary.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TripLeg {
    pub id: NodeId,
    /// One-based position of the maneuver in the plan
    pub number: usize,
    pub dv_m_s: f64,
    /// Seconds until the maneuver, negative once it is past
    pub time_until_s: f64,
    /// Whether this maneuver can be merged into the previous one
    pub mergeable: bool,
}

/// Delta-v budget and timing of every maneuver of a plan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripSummary {
    pub legs: Vec<TripLeg>,
    pub total_dv_m_s: f64,
}

impl TripSummary {
    pub fn from_plan<P: ManeuverPlan + ?Sized>(plan: &P) -> Self {
        let now = plan.now_ut();
        let legs: Vec<TripLeg> = plan
            .maneuvers()
            .iter()
            .enumerate()
            .map(|(idx, m)| TripLeg {
                id: m.id,
                number: idx + 1,
                dv_m_s: m.dv_magnitude(),
                time_until_s: m.ut - now,
                mergeable: idx > 0,
            })
            .collect();
        let total_dv_m_s = legs.iter().map(|leg| leg.dv_m_s).sum();
        Self { legs, total_dv_m_s }
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}
