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

use super::{AstroError, Body, PatchTransition};
use crate::linalg::Vector3;
use std::f64::consts::{PI, TAU};
use std::f64::EPSILON;
use std::fmt;
use std::sync::Arc;

/// If an orbit has an eccentricity below the following value, it is considered circular and the periapsis
/// direction falls back to the line of nodes.
pub const ECC_EPSILON: f64 = 1e-11;
const KEPLER_MAX_ITER: usize = 64;
const KEPLER_TOL: f64 = 1e-14;

/// Orbit defines one two-body segment ("patch") of a trajectory.
///
/// The state is stored in Cartesian coordinates at `epoch_ut`, in the engine's native right-handed frame
/// centered on `body`, in meters and meters per second. Every other quantity is derived on request.
/// A patch is valid from `start_ut` until `end_ut`, where it ends with `end_transition`. Escape transitions
/// carry the next patch, expressed around the parent body.
#[derive(Clone, Debug)]
pub struct Orbit {
    /// in m
    pub radius_m: Vector3<f64>,
    /// in m/s
    pub velocity_m_s: Vector3<f64>,
    /// Universal time of the Cartesian state, in seconds
    pub epoch_ut: f64,
    pub body: Arc<Body>,
    pub start_ut: f64,
    pub end_ut: f64,
    pub end_transition: PatchTransition,
    pub next_patch: Option<Arc<Orbit>>,
}

impl Orbit {
    /// Creates a new unbounded Orbit around the provided body from its Cartesian state at the provided time.
    ///
    /// **Units:** m, m/s, s
    pub fn cartesian(
        radius_m: Vector3<f64>,
        velocity_m_s: Vector3<f64>,
        epoch_ut: f64,
        body: Arc<Body>,
    ) -> Self {
        Self {
            radius_m,
            velocity_m_s,
            epoch_ut,
            body,
            start_ut: epoch_ut,
            end_ut: f64::INFINITY,
            end_transition: PatchTransition::Final,
            next_patch: None,
        }
    }

    /// Creates a new Orbit around the provided body from the Keplerian orbital elements.
    ///
    /// **Units:** m, none, degrees, degrees, degrees, degrees, s
    ///
    /// The conversion itself comes from GMAT's StateConversionUtil::ComputeKeplToCart.
    #[allow(clippy::too_many_arguments)]
    pub fn keplerian(
        sma_m: f64,
        ecc: f64,
        inc_deg: f64,
        raan_deg: f64,
        aop_deg: f64,
        ta_deg: f64,
        epoch_ut: f64,
        body: Arc<Body>,
    ) -> Result<Self, AstroError> {
        let ecc = if ecc < 0.0 {
            warn!("eccentricity cannot be negative: sign of eccentricity changed");
            -ecc
        } else {
            ecc
        };
        if (1.0 - ecc).abs() < EPSILON {
            return Err(AstroError::ParabolicEccentricity);
        }
        let sma = if (ecc > 1.0 && sma_m > 0.0) || (ecc < 1.0 && sma_m < 0.0) {
            warn!("eccentricity and SMA sign disagree: sign of SMA changed");
            -sma_m
        } else {
            sma_m
        };
        if ecc > 1.0 {
            let ta = ta_deg.rem_euclid(360.0);
            let ta = if ta > 180.0 { 360.0 - ta } else { ta };
            if ta >= (-1.0 / ecc).acos().to_degrees() {
                return Err(AstroError::HyperbolicTrueAnomaly { ta_deg, ecc });
            }
        }

        let inc = inc_deg.to_radians();
        let raan = raan_deg.to_radians();
        let aop = aop_deg.to_radians();
        let ta = ta_deg.to_radians();
        let p = sma * (1.0 - ecc.powi(2));
        let radius = p / (1.0 + ecc * ta.cos());
        let (sin_aop_ta, cos_aop_ta) = (aop + ta).sin_cos();
        let (sin_inc, cos_inc) = inc.sin_cos();
        let (sin_raan, cos_raan) = raan.sin_cos();
        let (sin_aop, cos_aop) = aop.sin_cos();
        let x = radius * (cos_aop_ta * cos_raan - cos_inc * sin_aop_ta * sin_raan);
        let y = radius * (cos_aop_ta * sin_raan + cos_inc * sin_aop_ta * cos_raan);
        let z = radius * sin_aop_ta * sin_inc;
        let sqrt_gm_p = (body.mu_m3_s2 / p).sqrt();
        let cos_ta_ecc = ta.cos() + ecc;
        let sin_ta = ta.sin();

        let vx = sqrt_gm_p * cos_ta_ecc * (-sin_aop * cos_raan - cos_inc * sin_raan * cos_aop)
            - sqrt_gm_p * sin_ta * (cos_aop * cos_raan - cos_inc * sin_raan * sin_aop);
        let vy = sqrt_gm_p * cos_ta_ecc * (-sin_aop * sin_raan + cos_inc * cos_raan * cos_aop)
            - sqrt_gm_p * sin_ta * (cos_aop * sin_raan + cos_inc * cos_raan * sin_aop);
        let vz = sqrt_gm_p * (cos_ta_ecc * sin_inc * cos_aop - sin_ta * sin_inc * sin_aop);

        Ok(Self::cartesian(
            Vector3::new(x, y, z),
            Vector3::new(vx, vy, vz),
            epoch_ut,
            body,
        ))
    }

    /// Creates a circular orbit of the provided radius. The argument of latitude is measured from the ascending node.
    pub fn circular(
        radius_m: f64,
        inc_deg: f64,
        raan_deg: f64,
        aol_deg: f64,
        epoch_ut: f64,
        body: Arc<Body>,
    ) -> Self {
        let (sin_u, cos_u) = aol_deg.to_radians().sin_cos();
        let (sin_inc, cos_inc) = inc_deg.to_radians().sin_cos();
        let (sin_raan, cos_raan) = raan_deg.to_radians().sin_cos();
        let node = Vector3::new(cos_raan, sin_raan, 0.0);
        let in_plane = Vector3::new(-sin_raan * cos_inc, cos_raan * cos_inc, sin_inc);
        let speed = (body.mu_m3_s2 / radius_m).sqrt();
        Self::cartesian(
            radius_m * (cos_u * node + sin_u * in_plane),
            speed * (-sin_u * node + cos_u * in_plane),
            epoch_ut,
            body,
        )
    }

    /// Copies this orbit after applying the provided native delta-v (in m/s) at the provided time.
    /// The copy starts at that time and is unbounded.
    pub fn with_dv(&self, ut: f64, dv_m_s: &Vector3<f64>) -> Self {
        let (radius, velocity) = self.state_at(ut);
        Self::cartesian(radius, velocity + dv_m_s, ut, self.body.clone())
    }

    /// Gravitational parameter of the central body
    pub fn mu(&self) -> f64 {
        self.body.mu_m3_s2
    }

    /// Returns the orbital momentum vector
    pub fn hvec(&self) -> Vector3<f64> {
        self.radius_m.cross(&self.velocity_m_s)
    }

    pub fn hmag(&self) -> f64 {
        self.hvec().norm()
    }

    /// Returns the eccentricity vector (no unit)
    pub fn evec(&self) -> Vector3<f64> {
        let r = self.radius_m;
        let v = self.velocity_m_s;
        ((v.norm_squared() - self.mu() / r.norm()) * r - r.dot(&v) * v) / self.mu()
    }

    /// Returns the eccentricity (no unit)
    pub fn ecc(&self) -> f64 {
        self.evec().norm()
    }

    /// Returns the specific mechanical energy in m^2/s^2
    pub fn energy(&self) -> f64 {
        self.velocity_m_s.norm_squared() / 2.0 - self.mu() / self.radius_m.norm()
    }

    /// Returns the semi-major axis in meters, negative for hyperbolic orbits
    pub fn sma_m(&self) -> f64 {
        -self.mu() / (2.0 * self.energy())
    }

    /// Returns the semi parameter (or semilatus rectum) in meters
    pub fn semi_parameter_m(&self) -> f64 {
        self.hmag().powi(2) / self.mu()
    }

    /// Returns whether this orbit is bound to its body (elliptical)
    pub fn is_elliptic(&self) -> bool {
        self.ecc() < 1.0
    }

    /// Returns the inclination in degrees
    pub fn inc_deg(&self) -> f64 {
        (self.hvec()[2] / self.hmag()).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Returns the direction of the ascending node on the equator (not normalized), zero for equatorial orbits
    pub fn an_vector(&self) -> Vector3<f64> {
        Vector3::z().cross(&self.hvec())
    }

    /// Returns the longitude of the ascending node in degrees, zero for equatorial orbits
    pub fn raan_deg(&self) -> f64 {
        let n = self.an_vector();
        if n.norm() <= EPSILON * self.hmag() {
            return 0.0;
        }
        n[1].atan2(n[0]).to_degrees().rem_euclid(360.0)
    }

    /// Returns the mean motion in radians per second
    pub fn mean_motion(&self) -> f64 {
        (self.mu() / self.sma_m().abs().powi(3)).sqrt()
    }

    /// Returns the period in seconds, `None` for open orbits
    pub fn period(&self) -> Option<f64> {
        if self.is_elliptic() {
            Some(TAU / self.mean_motion())
        } else {
            None
        }
    }

    /// Returns the radius of periapsis in meters
    pub fn periapsis_m(&self) -> f64 {
        self.semi_parameter_m() / (1.0 + self.ecc())
    }

    /// Returns the radius of apoapsis in meters, `None` for open orbits
    pub fn apoapsis_m(&self) -> Option<f64> {
        if self.is_elliptic() {
            Some(self.semi_parameter_m() / (1.0 - self.ecc()))
        } else {
            None
        }
    }

    /// Returns the altitude of periapsis above the body's equatorial radius, in meters
    pub fn periapsis_altitude_m(&self) -> f64 {
        self.periapsis_m() - self.body.radius_m
    }

    /// Returns the altitude of apoapsis above the body's equatorial radius, in meters
    pub fn apoapsis_altitude_m(&self) -> Option<f64> {
        self.apoapsis_m().map(|ra| ra - self.body.radius_m)
    }

    /// Returns whether this segment is the last, unbounded one of its trajectory
    pub fn is_closed(&self) -> bool {
        self.end_transition == PatchTransition::Final
    }

    /// Perifocal basis (P, Q): P points to periapsis (or the ascending node, or +X, for circular orbits).
    fn perifocal(&self) -> (Vector3<f64>, Vector3<f64>) {
        let w_hat = self.hvec() / self.hmag();
        let evec = self.evec();
        let p_hat = if evec.norm() > ECC_EPSILON {
            evec.normalize()
        } else {
            let node = self.an_vector();
            if node.norm() > EPSILON * self.hmag() {
                node.normalize()
            } else {
                let x = Vector3::x();
                (x - w_hat * w_hat.dot(&x)).normalize()
            }
        };
        (p_hat, w_hat.cross(&p_hat))
    }

    /// Returns the true anomaly in radians of the projection of the provided native direction onto the orbit plane.
    pub fn true_anomaly_of(&self, direction: &Vector3<f64>) -> f64 {
        let (p_hat, q_hat) = self.perifocal();
        direction.dot(&q_hat).atan2(direction.dot(&p_hat))
    }

    /// Returns the true anomaly at the epoch of the Cartesian state, in radians
    pub fn ta_rad(&self) -> f64 {
        self.true_anomaly_of(&self.radius_m)
    }

    /// Converts a true anomaly to a mean anomaly, `None` if the true anomaly is beyond the asymptotes of a hyperbola.
    fn mean_anomaly_of_ta(&self, ta: f64) -> Option<f64> {
        let ecc = self.ecc();
        if ecc < 1.0 {
            let ea = 2.0
                * ((1.0 - ecc).sqrt() * (ta / 2.0).sin()).atan2((1.0 + ecc).sqrt() * (ta / 2.0).cos());
            Some(ea - ecc * ea.sin())
        } else {
            let ta = (ta + PI).rem_euclid(TAU) - PI;
            if ta.abs() >= (-1.0 / ecc).acos() {
                return None;
            }
            let ha = 2.0 * (((ecc - 1.0) / (ecc + 1.0)).sqrt() * (ta / 2.0).tan()).atanh();
            Some(ecc * ha.sinh() - ha)
        }
    }

    /// Converts a mean anomaly to a true anomaly by solving Kepler's equation.
    fn ta_of_mean_anomaly(&self, ma: f64) -> f64 {
        let ecc = self.ecc();
        if ecc < 1.0 {
            let ma = (ma + PI).rem_euclid(TAU) - PI;
            let mut ea = if ecc < 0.8 { ma } else { PI.copysign(ma) };
            for _ in 0..KEPLER_MAX_ITER {
                let delta = (ea - ecc * ea.sin() - ma) / (1.0 - ecc * ea.cos());
                ea -= delta;
                if delta.abs() < KEPLER_TOL {
                    break;
                }
            }
            2.0 * ((1.0 + ecc).sqrt() * (ea / 2.0).sin()).atan2((1.0 - ecc).sqrt() * (ea / 2.0).cos())
        } else {
            let mut ha = (2.0 * ma.abs() / ecc + 1.8).ln() * ma.signum();
            for _ in 0..KEPLER_MAX_ITER {
                let delta = (ecc * ha.sinh() - ha - ma) / (ecc * ha.cosh() - 1.0);
                ha -= delta;
                if delta.abs() < KEPLER_TOL * (1.0 + ha.abs()) {
                    break;
                }
            }
            2.0 * (((ecc + 1.0) / (ecc - 1.0)).sqrt() * (ha / 2.0).tanh()).atan()
        }
    }

    /// Universal time of the periapsis passage the mean anomaly is counted from.
    fn periapsis_ut(&self) -> f64 {
        // The epoch state is always reachable, so its mean anomaly exists.
        let ma0 = self.mean_anomaly_of_ta(self.ta_rad()).unwrap_or(0.0);
        self.epoch_ut - ma0 / self.mean_motion()
    }

    fn state_at_ta(&self, ta: f64) -> (Vector3<f64>, Vector3<f64>) {
        let (p_hat, q_hat) = self.perifocal();
        let ecc = self.ecc();
        let p = self.semi_parameter_m();
        let (sin_ta, cos_ta) = ta.sin_cos();
        let radius = p / (1.0 + ecc * cos_ta);
        let sqrt_gm_p = (self.mu() / p).sqrt();
        (
            radius * (cos_ta * p_hat + sin_ta * q_hat),
            sqrt_gm_p * (-sin_ta * p_hat + (ecc + cos_ta) * q_hat),
        )
    }

    /// Returns the native position and velocity at the provided time
    pub fn state_at(&self, ut: f64) -> (Vector3<f64>, Vector3<f64>) {
        if ut == self.epoch_ut {
            return (self.radius_m, self.velocity_m_s);
        }
        let ma = self.mean_motion() * (ut - self.periapsis_ut());
        self.state_at_ta(self.ta_of_mean_anomaly(ma))
    }

    /// Returns the native position relative to the body at the provided time, in meters
    pub fn position_at(&self, ut: f64) -> Vector3<f64> {
        self.state_at(ut).0
    }

    /// Returns the native velocity relative to the body at the provided time, in m/s
    pub fn velocity_at(&self, ut: f64) -> Vector3<f64> {
        self.state_at(ut).1
    }

    /// Returns the first time, at or after `after_ut`, at which this orbit reaches the provided true anomaly.
    ///
    /// Open orbits pass each true anomaly at most once, so the single passage is returned regardless of
    /// `after_ut`. Returns `None` if the true anomaly is never reached (beyond the asymptotes of a hyperbola).
    pub fn ut_for_true_anomaly(&self, ta: f64, after_ut: f64) -> Option<f64> {
        let ma = self.mean_anomaly_of_ta(ta)?;
        let ut = self.periapsis_ut() + ma / self.mean_motion();
        match self.period() {
            Some(period) => {
                let mut next = ut + ((after_ut - ut) / period).ceil() * period;
                if next < after_ut {
                    next += period;
                }
                Some(next)
            }
            None => Some(ut),
        }
    }

    /// Seconds from `now` until the next periapsis passage on this segment
    pub fn time_to_periapsis(&self, now: f64) -> f64 {
        let from = now.max(self.start_ut);
        match self.ut_for_true_anomaly(0.0, from) {
            Some(ut) => ut - now,
            None => self.periapsis_ut() - now,
        }
    }

    /// Seconds from `now` until the next apoapsis passage on this segment, `None` for open orbits
    pub fn time_to_apoapsis(&self, now: f64) -> Option<f64> {
        if !self.is_elliptic() {
            return None;
        }
        self.ut_for_true_anomaly(PI, now.max(self.start_ut))
            .map(|ut| ut - now)
    }

    /// Returns the time at which this segment leaves the sphere of influence of its body, if it ever does.
    pub fn soi_exit_ut(&self) -> Option<f64> {
        if self.body.is_root() || !self.body.soi_m.is_finite() {
            return None;
        }
        let soi = self.body.soi_m;
        if let Some(ra) = self.apoapsis_m() {
            if ra <= soi {
                return None;
            }
        }
        if self.position_at(self.start_ut).norm() >= soi {
            return Some(self.start_ut);
        }
        let ecc = self.ecc();
        let cos_ta = ((self.semi_parameter_m() / soi - 1.0) / ecc).clamp(-1.0, 1.0);
        self.ut_for_true_anomaly(cos_ta.acos(), self.start_ut)
    }
}

impl fmt::Display for Orbit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] @ {:.3} s\tsma = {:.3} km\tecc = {:.6}\tinc = {:.6} deg\traan = {:.6} deg\tta = {:.6} deg",
            self.body,
            self.epoch_ut,
            self.sma_m() / 1e3,
            self.ecc(),
            self.inc_deg(),
            self.raan_deg(),
            self.ta_rad().to_degrees()
        )
    }
}
