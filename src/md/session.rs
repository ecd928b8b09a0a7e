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

use super::{
    merge_node_down, next_encounter, ManeuverEditor, ManeuverPlan, NodeId, PageDirection, PlanError,
    SyncOutcome, TripSummary,
};
use crate::cosmic::geometry::{
    ejection_angle, ejection_inclination, equatorial_an_ut, equatorial_dn_ut, has_apoapsis,
    has_ascending_node, has_descending_node, is_time_inside_patch, target_an_ut, target_dn_ut,
};
use crate::io::display::{format_decimal, format_meters, human_duration, human_time};
use crate::io::EditorOptions;
use std::mem;

/// Time step of the coarse time commands, in seconds
pub const KILO_STEP_S: f64 = 1000.0;

/// An operator command, as issued by a button or a key binding.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    IncrementPrograde,
    DecrementPrograde,
    IncrementNormal,
    DecrementNormal,
    IncrementRadial,
    DecrementRadial,
    IncrementTime,
    DecrementTime,
    /// Selects one of the allowed increments
    SetIncrement(f64),
    UpIncrement,
    DownIncrement,
    PagePrevious,
    PageNext,
    PageConics,
    Memorize,
    Recall,
    ClearMemory,
    Periapsis,
    Apoapsis,
    AscendingNode,
    DescendingNode,
    NextOrbit,
    PreviousOrbit,
    ForwardKilo,
    BackKilo,
    /// Folds the provided maneuver into the one before it
    MergeDown(NodeId),
    AttachGizmo,
}

/// What the orbit information panel shows for the edited maneuver.
#[derive(Clone, Debug, PartialEq)]
pub enum OrbitInfo {
    /// The trajectory enters the sphere of influence of another body
    Encounter {
        body: String,
        periapsis_altitude_m: f64,
    },
    /// Apsides of the orbit resulting from the maneuver
    Projected {
        apoapsis_altitude_m: Option<f64>,
        periapsis_altitude_m: f64,
    },
}

/// Keeps an editor attached to a maneuver of the plan, and runs the operator commands on it.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub options: EditorOptions,
    editor: ManeuverEditor,
}

impl Session {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            options,
            editor: ManeuverEditor::unattached(),
        }
    }

    pub fn editor(&self) -> &ManeuverEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ManeuverEditor {
        &mut self.editor
    }

    /// Runs one tick: attaches to the first maneuver if the edited one is gone, otherwise synchronizes and pages.
    pub fn tick<P: ManeuverPlan + ?Sized>(&mut self, plan: &mut P) -> Result<SyncOutcome, PlanError> {
        let first = match plan.maneuvers().first() {
            Some(first) => first.id,
            None => {
                if self.editor.is_attached() {
                    debug!("no maneuvers left, detaching editor");
                    self.editor = ManeuverEditor::unattached();
                }
                return Ok(SyncOutcome::Idle);
            }
        };
        match self.editor.node() {
            Some(id) if plan.maneuver(id).is_some() => {
                let outcome = self.editor.update_node(plan)?;
                self.editor = mem::take(&mut self.editor).next_state(&*plan);
                Ok(outcome)
            }
            _ => {
                self.editor = ManeuverEditor::attach(&*plan, first)?;
                Ok(SyncOutcome::Idle)
            }
        }
    }

    /// Runs an operator command. Commands whose control would be disabled are ignored with a warning.
    pub fn execute<P: ManeuverPlan + ?Sized>(&mut self, plan: &mut P, command: Command) -> Result<(), PlanError> {
        let step = self.options.increment;
        match command {
            Command::IncrementPrograde => self.editor.add_prograde(&*plan, step)?,
            Command::DecrementPrograde => self.editor.add_prograde(&*plan, -step)?,
            Command::IncrementNormal => self.editor.add_normal(&*plan, step)?,
            Command::DecrementNormal => self.editor.add_normal(&*plan, -step)?,
            Command::IncrementRadial => self.editor.add_radial(&*plan, step)?,
            Command::DecrementRadial => self.editor.add_radial(&*plan, -step)?,
            Command::IncrementTime => self.editor.add_ut(self.options.ut_increment()),
            Command::DecrementTime => {
                if self.can_decrement_ut(&*plan) {
                    self.editor.add_ut(-self.options.ut_increment());
                } else {
                    warn!("cannot move the maneuver before the start of its segment or into the past");
                }
            }
            Command::SetIncrement(increment) => self.options.increment = increment,
            Command::UpIncrement => self.options.up_increment(),
            Command::DownIncrement => self.options.down_increment(),
            Command::PagePrevious => self.editor.page(&*plan, PageDirection::Previous),
            Command::PageNext => self.editor.page(&*plan, PageDirection::Next),
            Command::PageConics => self.options.page_conics_mode(),
            Command::Memorize => self.editor.memorize(),
            Command::Recall => self.editor.recall(),
            Command::ClearMemory => self.editor.clear_memory(),
            Command::Periapsis => self.editor.set_to_periapsis(&*plan),
            Command::Apoapsis => {
                if self.can_set_apoapsis(&*plan) {
                    self.editor.set_to_apoapsis(&*plan);
                } else {
                    warn!("segment of maneuver is not closed, no apoapsis");
                }
            }
            Command::AscendingNode => match self.ascending_node_ut(&*plan) {
                Some(ut) if self.can_set_an(&*plan) => self.editor.set_ut(ut),
                _ => warn!("no reachable ascending node"),
            },
            Command::DescendingNode => match self.descending_node_ut(&*plan) {
                Some(ut) if self.can_set_dn(&*plan) => self.editor.set_ut(ut),
                _ => warn!("no reachable descending node"),
            },
            Command::NextOrbit | Command::PreviousOrbit => {
                let forward = command == Command::NextOrbit;
                match self.period(&*plan) {
                    Some(period) if self.can_shift_orbit(&*plan, forward) => {
                        self.editor.add_ut(if forward { period } else { -period })
                    }
                    _ => warn!("cannot shift maneuver by one orbit"),
                }
            }
            Command::ForwardKilo => self.editor.add_ut(KILO_STEP_S),
            Command::BackKilo => {
                if self.can_step_back_kilo(&*plan) {
                    self.editor.add_ut(-KILO_STEP_S);
                } else {
                    warn!("cannot move the maneuver {KILO_STEP_S} s earlier");
                }
            }
            Command::MergeDown(id) => {
                if !merge_node_down(plan, id)? {
                    warn!("maneuver {id} is the first one, nothing to merge into");
                }
            }
            Command::AttachGizmo => {
                if let Some(id) = self.editor.node() {
                    plan.attach_gizmo(id)?;
                }
            }
        }
        Ok(())
    }

    fn period<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> Option<f64> {
        self.editor.live(plan).and_then(|m| m.patch.period())
    }

    /// Returns whether the edited time may be moved to the provided time
    fn can_move_to<P: ManeuverPlan + ?Sized>(&self, plan: &P, ut: f64) -> bool {
        self.editor
            .live(plan)
            .is_some_and(|m| is_time_inside_patch(&m.patch, ut, plan.now_ut()))
    }

    pub fn can_decrement_ut<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> bool {
        self.can_move_to(plan, self.editor.current_ut() - self.options.ut_increment())
    }

    pub fn can_shift_orbit<P: ManeuverPlan + ?Sized>(&self, plan: &P, forward: bool) -> bool {
        match self.period(plan) {
            Some(period) => {
                let shift = if forward { period } else { -period };
                self.can_move_to(plan, self.editor.current_ut() + shift)
            }
            None => false,
        }
    }

    pub fn can_step_back_kilo<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> bool {
        self.can_move_to(plan, self.editor.current_ut() - KILO_STEP_S)
    }

    pub fn can_set_an<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> bool {
        self.editor
            .live(plan)
            .is_some_and(|m| has_ascending_node(m, plan.target_orbit(), plan.now_ut()))
    }

    pub fn can_set_dn<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> bool {
        self.editor
            .live(plan)
            .is_some_and(|m| has_descending_node(m, plan.target_orbit(), plan.now_ut()))
    }

    pub fn can_set_apoapsis<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> bool {
        self.editor.live(plan).is_some_and(|m| has_apoapsis(&m.patch))
    }

    /// Time of the ascending node relative to the target, or to the equator without a target
    pub fn ascending_node_ut<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> Option<f64> {
        let patch = &self.editor.live(plan)?.patch;
        match plan.target_orbit() {
            Some(target) => target_an_ut(patch, target, plan.now_ut()),
            None => equatorial_an_ut(patch, plan.now_ut()),
        }
    }

    /// Time of the descending node relative to the target, or to the equator without a target
    pub fn descending_node_ut<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> Option<f64> {
        let patch = &self.editor.live(plan)?.patch;
        match plan.target_orbit() {
            Some(target) => target_dn_ut(patch, target, plan.now_ut()),
            None => equatorial_dn_ut(patch, plan.now_ut()),
        }
    }

    /// "Editing Node N", with N counted from one
    pub fn node_label<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> Option<String> {
        let idx = self.editor.node().and_then(|id| plan.index_of(id))?;
        Some(format!("Editing Node {}", idx + 1))
    }

    pub fn time_label(&self) -> String {
        human_time(self.editor.current_ut(), self.options.calendar)
    }

    pub fn total_dv_label(&self) -> String {
        format!("{} m/s", format_decimal(self.editor.current_magnitude()))
    }

    pub fn ejection_angle_label<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> String {
        let angle = self
            .editor
            .live(plan)
            .and_then(|m| ejection_angle(&m.patch, m));
        match angle {
            Some(angle) => format!(
                "{}° from {}",
                format_decimal(angle.abs()),
                if angle >= 0.0 { "prograde" } else { "retrograde" }
            ),
            None => "n/a".to_string(),
        }
    }

    pub fn ejection_inclination_label<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> String {
        let inclination = self
            .editor
            .live(plan)
            .and_then(|m| ejection_inclination(&m.patch, m));
        match inclination {
            Some(inc) => format!(
                "{}° {}",
                format_decimal(inc.abs()),
                if inc >= 0.0 { "north" } else { "south" }
            ),
            None => "n/a".to_string(),
        }
    }

    /// Next encounter of the edited maneuver's trajectory if any, or the apsides of its resulting orbit.
    pub fn orbit_info<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> Option<OrbitInfo> {
        let live = self.editor.live(plan)?;
        let patches = plan.flight_plan();
        if self.editor.has_encounter() {
            if let Some(encounter) = next_encounter(&patches, live) {
                return Some(OrbitInfo::Encounter {
                    body: encounter.body.name.clone(),
                    periapsis_altitude_m: encounter.periapsis_altitude_m(),
                });
            }
        }
        if patches.len() > 1 {
            Some(OrbitInfo::Projected {
                apoapsis_altitude_m: live.next_patch.apoapsis_altitude_m(),
                periapsis_altitude_m: live.next_patch.periapsis_altitude_m(),
            })
        } else {
            None
        }
    }

    pub fn orbit_info_label<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> Option<String> {
        let label = match self.orbit_info(plan)? {
            OrbitInfo::Encounter {
                body,
                periapsis_altitude_m,
            } => format!("{body} Pe {}", format_meters(periapsis_altitude_m)),
            OrbitInfo::Projected {
                apoapsis_altitude_m,
                periapsis_altitude_m,
            } => format!(
                "Ap {}, Pe {}",
                apoapsis_altitude_m.map_or_else(|| "n/a".to_string(), format_meters),
                format_meters(periapsis_altitude_m)
            ),
        };
        Some(label)
    }

    /// Countdown to the first maneuver of the plan, "T- ..." before it and "T+ ..." after it
    pub fn clock_label<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> Option<String> {
        let first = plan.maneuvers().first()?;
        let next = plan.now_ut() - first.ut;
        let sign = if next < 0.0 { "T-" } else { "T+" };
        Some(format!(
            "{sign} {}",
            human_duration(next, self.options.calendar)
        ))
    }

    pub fn trip<P: ManeuverPlan + ?Sized>(&self, plan: &P) -> TripSummary {
        TripSummary::from_plan(plan)
    }
}
