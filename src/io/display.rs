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

use super::Calendar;

/// Formats a number with at most two decimals, without trailing zeros.
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Formats a universal time as "Year Y Day D H:MM:SS", where years and days are counted from one.
pub fn human_time(ut: f64, calendar: Calendar) -> String {
    let ut = ut.max(0.0);
    let secs = (ut % 60.0).floor() as i64;
    let mins = ((ut / 60.0) % 60.0).floor() as i64;
    let hours = ((ut / 3600.0) % calendar.hours_per_day()).floor() as i64;
    let day = ((ut / calendar.day_s()) % calendar.days_per_year()).floor() as i64 + 1;
    let year = (ut / calendar.year_s()).floor() as i64 + 1;
    format!("Year {year} Day {day} {hours}:{mins:02}:{secs:02}")
}

/// Formats the magnitude of a duration with only the units it needs, e.g. "2 d 1 h 0 m 12 s".
pub fn human_duration(dt: f64, calendar: Calendar) -> String {
    let dt = dt.abs();
    let mut out = format!("{} s", (dt % 60.0).floor() as i64);
    if dt / 60.0 > 1.0 {
        out = format!("{} m {out}", ((dt / 60.0) % 60.0).floor() as i64);
    }
    if dt / 3600.0 > 1.0 {
        out = format!(
            "{} h {out}",
            ((dt / 3600.0) % calendar.hours_per_day()).floor() as i64
        );
    }
    if dt / calendar.day_s() > 1.0 {
        out = format!(
            "{} d {out}",
            ((dt / calendar.day_s()) % calendar.days_per_year()).floor() as i64
        );
    }
    if dt / calendar.year_s() > 1.0 {
        out = format!("{} y {out}", (dt / calendar.year_s()).floor() as i64);
    }
    out
}

/// Formats a distance in meters, switching to km, Mm and Gm once the value reaches 100 000 of the current unit.
pub fn format_meters(meters: f64) -> String {
    let mut value = meters;
    let mut prefix = "";
    for next in ["k", "M", "G"] {
        if (value.abs() / 1000.0) < 100.0 {
            break;
        }
        value /= 1000.0;
        prefix = next;
    }
    format!("{} {prefix}m", format_decimal(value))
}
