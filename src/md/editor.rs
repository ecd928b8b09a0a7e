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

use super::plan::{next_encounter, EngineFrameSnafu, NodeNotFoundSnafu};
use super::{Maneuver, ManeuverPlan, NodeId, NodeSnapshot, PlanError};
use crate::cosmic::frame::{self, dv_to_local};
use crate::cosmic::{xzy, AstroError, DegenerateFrameSnafu};
use crate::linalg::{Rotation3, Unit, Vector3};
use snafu::prelude::*;

/// Text of an editable number, and whether its last committed parse succeeded.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericField {
    pub text: String,
    pub valid: bool,
}

impl NumericField {
    fn of(value: f64) -> Self {
        Self {
            text: format!("{value}"),
            valid: true,
        }
    }
}

impl Default for NumericField {
    fn default() -> Self {
        Self {
            text: String::new(),
            valid: true,
        }
    }
}

/// Result of one synchronization between the editor and the live maneuver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing to do
    Idle,
    /// Local edits were written to the live maneuver
    Pushed,
    /// The live maneuver was changed elsewhere: local edits were discarded and replaced by its values
    Pulled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Component {
    Radial,
    Normal,
    Prograde,
    Time,
}

/// Editor of a single live maneuver.
///
/// The editor keeps two snapshots: the values being edited, and the values of the live maneuver as last observed.
/// Each tick, [`ManeuverEditor::update_node`] compares the live maneuver with the observed snapshot. If the live
/// maneuver did not change, pending edits are written to it. If it did, the engine or another tool changed it and
/// its values replace the local edits.
///
/// An editor without a maneuver (unattached) ignores every edit.
#[derive(Clone, Debug, Default)]
pub struct ManeuverEditor {
    node: Option<NodeId>,
    next_node: Option<NodeId>,
    state: NodeSnapshot,
    observed: NodeSnapshot,
    dirty: bool,
    encounter: bool,
    radial: NumericField,
    normal: NumericField,
    prograde: NumericField,
    time: NumericField,
    memory: Option<NodeSnapshot>,
}

impl ManeuverEditor {
    pub fn unattached() -> Self {
        Self::default()
    }

    /// Builds an editor around the provided maneuver of the plan
    pub fn attach<P: ManeuverPlan + ?Sized>(plan: &P, id: NodeId) -> Result<Self, PlanError> {
        let live = plan.maneuver(id).context(NodeNotFoundSnafu { id })?;
        let mut me = Self {
            node: Some(id),
            state: NodeSnapshot::from_live(live),
            observed: NodeSnapshot::from_live(live),
            encounter: next_encounter(&plan.flight_plan(), live).is_some(),
            ..Default::default()
        };
        me.rebuild_text();
        debug!("editing {live}");
        Ok(me)
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_attached(&self) -> bool {
        self.node.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn has_encounter(&self) -> bool {
        self.encounter
    }

    /// Values being edited
    pub fn state(&self) -> &NodeSnapshot {
        &self.state
    }

    /// Values of the live maneuver at the last synchronization
    pub fn observed(&self) -> &NodeSnapshot {
        &self.observed
    }

    pub fn current_ut(&self) -> f64 {
        self.state.ut
    }

    pub fn current_magnitude(&self) -> f64 {
        self.state.magnitude()
    }

    pub fn radial_field(&self) -> &NumericField {
        &self.radial
    }

    pub fn normal_field(&self) -> &NumericField {
        &self.normal
    }

    pub fn prograde_field(&self) -> &NumericField {
        &self.prograde
    }

    pub fn time_field(&self) -> &NumericField {
        &self.time
    }

    pub fn memory(&self) -> Option<&NodeSnapshot> {
        self.memory.as_ref()
    }

    /// Maneuver selected by paging, which replaces this editor on the next call to `next_state`
    pub fn pending_page(&self) -> Option<NodeId> {
        self.next_node
    }

    /// Returns the live maneuver this editor is attached to, if it is still in the plan.
    pub fn live<'a, P: ManeuverPlan + ?Sized>(&self, plan: &'a P) -> Option<&'a Maneuver> {
        self.node.and_then(|id| plan.maneuver(id))
    }

    fn rebuild_text(&mut self) {
        self.radial = NumericField::of(self.state.dv[0]);
        self.normal = NumericField::of(self.state.dv[1]);
        self.prograde = NumericField::of(self.state.dv[2]);
        self.time = NumericField::of(self.state.ut);
    }

    /// Synchronizes the editor and the live maneuver. Call once per tick.
    pub fn update_node<P: ManeuverPlan + ?Sized>(&mut self, plan: &mut P) -> Result<SyncOutcome, PlanError> {
        let id = match self.node {
            Some(id) => id,
            None => return Ok(SyncOutcome::Idle),
        };
        let live = plan.maneuver(id).context(NodeNotFoundSnafu { id })?;
        if !self.observed.matches(live) {
            debug!("maneuver {id} changed outside of the editor, discarding local edits");
            self.observed.update(live);
            self.state.update(live);
            self.dirty = false;
            self.rebuild_text();
            return Ok(SyncOutcome::Pulled);
        }
        if !self.dirty {
            return Ok(SyncOutcome::Idle);
        }
        if let Err(e) = plan.apply(id, self.state.dv, self.state.ut) {
            warn!("maneuver {id} rejected {}: {e}", self.state);
            if let Some(live) = plan.maneuver(id) {
                self.observed.update(live);
                self.state.update(live);
            }
            self.dirty = false;
            self.rebuild_text();
            return Err(e);
        }
        plan.update_gizmo(id, self.state.dv, self.state.ut)?;
        let live = plan.maneuver(id).context(NodeNotFoundSnafu { id })?;
        self.observed.update(live);
        self.dirty = false;
        debug!("pushed {} to maneuver {id}", self.state);
        Ok(SyncOutcome::Pushed)
    }

    fn commit(&mut self, component: Component, value: f64) {
        let slot = match component {
            Component::Radial => &mut self.state.dv[0],
            Component::Normal => &mut self.state.dv[1],
            Component::Prograde => &mut self.state.dv[2],
            Component::Time => &mut self.state.ut,
        };
        if *slot != value {
            *slot = value;
            self.dirty = true;
            *self.field_mut(component) = NumericField::of(value);
        }
    }

    fn field_mut(&mut self, component: Component) -> &mut NumericField {
        match component {
            Component::Radial => &mut self.radial,
            Component::Normal => &mut self.normal,
            Component::Prograde => &mut self.prograde,
            Component::Time => &mut self.time,
        }
    }

    fn set_text(&mut self, component: Component, text: &str) {
        if self.node.is_none() {
            return;
        }
        let field = self.field_mut(component);
        if field.text == text {
            return;
        }
        field.text = text.to_string();
        if text.ends_with('.') {
            // Still typing
            field.valid = true;
            return;
        }
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => {
                field.valid = true;
                self.commit(component, value);
            }
            _ => field.valid = false,
        }
    }

    pub fn set_prograde_text(&mut self, text: &str) {
        self.set_text(Component::Prograde, text)
    }

    pub fn set_normal_text(&mut self, text: &str) {
        self.set_text(Component::Normal, text)
    }

    pub fn set_radial_text(&mut self, text: &str) {
        self.set_text(Component::Radial, text)
    }

    pub fn set_ut_text(&mut self, text: &str) {
        self.set_text(Component::Time, text)
    }

    /// Adds a local delta-v (radial, normal, prograde) to the edited values, if it changes them.
    fn add_local(&mut self, local: Vector3<f64>) {
        let dv = self.state.dv + local;
        if dv != self.state.dv {
            self.state.dv = dv;
            self.dirty = true;
            self.radial = NumericField::of(dv[0]);
            self.normal = NumericField::of(dv[1]);
            self.prograde = NumericField::of(dv[2]);
        }
    }

    /// Converts a change of the post-burn velocity (swapped coordinates) into the pre-burn maneuver frame.
    fn to_local(maneuver: &Maneuver, ut: f64, world: &Vector3<f64>) -> Result<Vector3<f64>, PlanError> {
        dv_to_local(&maneuver.patch, ut, world).context(EngineFrameSnafu)
    }

    /// Adds `d` m/s along the prograde direction of the resulting orbit, so that the burn keeps its direction.
    pub fn add_prograde<P: ManeuverPlan + ?Sized>(&mut self, plan: &P, d: f64) -> Result<(), PlanError> {
        let maneuver = match self.live(plan) {
            Some(maneuver) => maneuver,
            None => return Ok(()),
        };
        let ut = self.state.ut;
        let prograde = frame::prograde(&maneuver.next_patch, ut).context(EngineFrameSnafu)?;
        let local = Self::to_local(maneuver, ut, &(prograde * d))?;
        self.add_local(local);
        Ok(())
    }

    /// Turns the resulting velocity out of its orbit plane by an arc of `d` m/s.
    pub fn add_normal<P: ManeuverPlan + ?Sized>(&mut self, plan: &P, d: f64) -> Result<(), PlanError> {
        let maneuver = match self.live(plan) {
            Some(maneuver) => maneuver,
            None => return Ok(()),
        };
        let ut = self.state.ut;
        let (radius, velocity) = maneuver.next_patch.state_at(ut);
        let velocity = xzy(&velocity);
        let r_hat = Unit::try_new(-xzy(&radius), f64::EPSILON)
            .context(DegenerateFrameSnafu { what: "radial" })
            .context(EngineFrameSnafu)?;
        let v_perp = velocity - *r_hat * r_hat.dot(&velocity);
        if v_perp.norm() <= f64::EPSILON {
            return Err(PlanError::EngineFrame {
                source: AstroError::DegenerateFrame { what: "normal" },
            });
        }
        let rot = Rotation3::from_axis_angle(&r_hat, d / v_perp.norm());
        let local = Self::to_local(maneuver, ut, &(rot * velocity - velocity))?;
        self.add_local(local);
        Ok(())
    }

    /// Turns the resulting velocity within its orbit plane, towards radial out, by an arc of `d` m/s.
    pub fn add_radial<P: ManeuverPlan + ?Sized>(&mut self, plan: &P, d: f64) -> Result<(), PlanError> {
        let maneuver = match self.live(plan) {
            Some(maneuver) => maneuver,
            None => return Ok(()),
        };
        let ut = self.state.ut;
        let velocity = xzy(&maneuver.next_patch.velocity_at(ut));
        let normal = frame::normal_plus(&maneuver.next_patch).context(EngineFrameSnafu)?;
        let rot = Rotation3::from_axis_angle(&Unit::new_unchecked(normal), d / velocity.norm());
        let local = Self::to_local(maneuver, ut, &(rot * velocity - velocity))?;
        self.add_local(local);
        Ok(())
    }

    pub fn add_ut(&mut self, d: f64) {
        if self.node.is_none() {
            return;
        }
        self.set_ut(self.state.ut + d);
    }

    pub fn set_ut(&mut self, ut: f64) {
        if self.node.is_none() {
            return;
        }
        self.state.ut = ut;
        self.time = NumericField::of(ut);
        self.dirty = true;
    }

    /// Moves the maneuver to the next periapsis of its segment
    pub fn set_to_periapsis<P: ManeuverPlan + ?Sized>(&mut self, plan: &P) {
        let now = plan.now_ut();
        if let Some(dt) = self.live(plan).map(|m| m.patch.time_to_periapsis(now)) {
            self.set_ut(now + dt);
        }
    }

    /// Moves the maneuver to the next apoapsis of its segment, if it has one
    pub fn set_to_apoapsis<P: ManeuverPlan + ?Sized>(&mut self, plan: &P) {
        let now = plan.now_ut();
        match self.live(plan).map(|m| m.patch.time_to_apoapsis(now)) {
            Some(Some(dt)) => self.set_ut(now + dt),
            Some(None) => warn!("segment of maneuver has no apoapsis"),
            None => {}
        }
    }

    /// Remembers the edited values
    pub fn memorize(&mut self) {
        if self.node.is_some() {
            self.memory = Some(self.state);
        }
    }

    /// Restores the remembered values, component by component
    pub fn recall(&mut self) {
        if self.node.is_none() {
            return;
        }
        if let Some(memory) = self.memory {
            self.commit(Component::Radial, memory.dv[0]);
            self.commit(Component::Normal, memory.dv[1]);
            self.commit(Component::Prograde, memory.dv[2]);
            self.commit(Component::Time, memory.ut);
        }
    }

    pub fn clear_memory(&mut self) {
        self.memory = None;
    }

    /// Selects the previous or next maneuver of the plan, wrapping around. Takes effect on `next_state`.
    pub fn page<P: ManeuverPlan + ?Sized>(&mut self, plan: &P, direction: PageDirection) {
        let maneuvers = plan.maneuvers();
        let count = maneuvers.len();
        if count < 2 {
            return;
        }
        let idx = match self.node.and_then(|id| plan.index_of(id)) {
            Some(idx) => idx,
            None => return,
        };
        let target = match direction {
            PageDirection::Previous if idx > 0 => idx - 1,
            PageDirection::Previous => count - 1,
            PageDirection::Next if idx < count - 1 => idx + 1,
            PageDirection::Next => 0,
        };
        self.next_node = Some(maneuvers[target].id);
    }

    /// Returns the editor to use from now on: a fresh editor on the paged maneuver, or this one.
    ///
    /// The memorized values follow the operator to the new maneuver.
    pub fn next_state<P: ManeuverPlan + ?Sized>(mut self, plan: &P) -> Self {
        if let Some(next) = self.next_node.take() {
            match Self::attach(plan, next) {
                Ok(mut fresh) => {
                    fresh.memory = self.memory;
                    return fresh;
                }
                Err(e) => warn!("cannot page to maneuver {next}: {e}"),
            }
        }
        if let Some(live) = self.live(plan) {
            self.encounter = next_encounter(&plan.flight_plan(), live).is_some();
        }
        self
    }
}
