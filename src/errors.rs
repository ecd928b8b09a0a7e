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

use crate::cosmic::AstroError;
use crate::io::ConfigError;
use crate::md::PlanError;
use snafu::Snafu;

/// Top level error, wrapping the errors of each module.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EditorError {
    #[snafu(display("maneuver plan error: {source}"))]
    Plan { source: PlanError },
    #[snafu(display("orbit computation error: {source}"))]
    Astro { source: AstroError },
    #[snafu(display("configuration error: {source}"))]
    Config { source: ConfigError },
}

impl From<PlanError> for EditorError {
    fn from(source: PlanError) -> Self {
        Self::Plan { source }
    }
}

impl From<AstroError> for EditorError {
    fn from(source: AstroError) -> Self {
        Self::Astro { source }
    }
}

impl From<ConfigError> for EditorError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}
