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
use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Allowed steps of the increment buttons, in m/s (or seconds for time steps)
pub const INCREMENTS: [f64; 5] = [0.01, 0.1, 1.0, 10.0, 100.0];

/// Day and year lengths used to display times.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Calendar {
    /// Six hour days, 426 day years
    #[default]
    Kerbin,
    /// 24 hour days, 365 day years
    Earth,
}

impl Calendar {
    pub fn hours_per_day(&self) -> f64 {
        match self {
            Self::Kerbin => 6.0,
            Self::Earth => 24.0,
        }
    }

    pub fn days_per_year(&self) -> f64 {
        match self {
            Self::Kerbin => 426.0,
            Self::Earth => 365.0,
        }
    }

    pub fn day_s(&self) -> f64 {
        self.hours_per_day() * 3600.0
    }

    pub fn year_s(&self) -> f64 {
        self.days_per_year() * self.day_s()
    }
}

/// How the patched conics of the flight plan are drawn, relative to which body and when.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativityMode {
    LocalToBodies,
    LocalAtSoiEntry,
    LocalAtSoiExit,
    Relative,
    Dynamic,
}

impl RelativityMode {
    /// Converts a conics mode index (0 to 4), anything else is the default `Relative` mode.
    pub fn from_index(mode: u8) -> Self {
        match mode {
            0 => Self::LocalToBodies,
            1 => Self::LocalAtSoiEntry,
            2 => Self::LocalAtSoiExit,
            4 => Self::Dynamic,
            _ => Self::Relative,
        }
    }
}

fn default_increment() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_conics_mode() -> u8 {
    3
}

/// Operator preferences of the editor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct EditorOptions {
    /// Step of the increment commands, one of `INCREMENTS`
    #[builder(default = 1.0)]
    #[serde(default = "default_increment")]
    pub increment: f64,
    /// Multiplies the time steps by ten
    #[builder(default)]
    #[serde(default)]
    pub large_ut_increment: bool,
    #[builder(default = true)]
    #[serde(default = "default_true")]
    pub show_maneuver_pager: bool,
    #[builder(default = true)]
    #[serde(default = "default_true")]
    pub show_conics: bool,
    #[builder(default)]
    #[serde(default)]
    pub show_conics_always: bool,
    #[builder(default)]
    #[serde(default)]
    pub show_clock: bool,
    #[builder(default)]
    #[serde(default)]
    pub show_trip: bool,
    #[builder(default)]
    #[serde(default)]
    pub show_ut_controls: bool,
    #[builder(default = true)]
    #[serde(default = "default_true")]
    pub show_ejection_angle: bool,
    #[builder(default)]
    #[serde(default)]
    pub show_orbit_info: bool,
    /// Patched conics drawing mode, from 0 to 4
    #[builder(default = 3)]
    #[serde(default = "default_conics_mode")]
    pub conics_mode: u8,
    #[builder(default)]
    #[serde(default)]
    pub calendar: Calendar,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ConfigRepr for EditorOptions {}

impl EditorOptions {
    fn increment_index(&self) -> Option<usize> {
        INCREMENTS.iter().position(|step| *step == self.increment)
    }

    /// Moves to the next larger increment, 100 wraps to 0.01. Any other value resets to 1.
    pub fn down_increment(&mut self) {
        self.increment = match self.increment_index() {
            Some(idx) => INCREMENTS[(idx + 1) % INCREMENTS.len()],
            None => 1.0,
        };
    }

    /// Moves to the next smaller increment, 0.01 wraps to 100. Any other value resets to 1.
    pub fn up_increment(&mut self) {
        self.increment = match self.increment_index() {
            Some(idx) => INCREMENTS[(idx + INCREMENTS.len() - 1) % INCREMENTS.len()],
            None => 1.0,
        };
    }

    /// Step of the time commands, in seconds
    pub fn ut_increment(&self) -> f64 {
        if self.large_ut_increment {
            self.increment * 10.0
        } else {
            self.increment
        }
    }

    pub fn page_conics_mode(&mut self) {
        self.conics_mode = if self.conics_mode >= 4 {
            0
        } else {
            self.conics_mode + 1
        };
        debug!("conics mode {:?}", self.relativity_mode());
    }

    pub fn relativity_mode(&self) -> RelativityMode {
        RelativityMode::from_index(self.conics_mode)
    }
}
