//! Geodesic distance between two coordinate pairs.
//!
//! Distances are computed on the WGS-84 ellipsoid with Vincenty's inverse
//! formula and reported in statute miles. Values stay at full precision inside
//! the domain; [`Miles::rounded`] exists for presentation only.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Coordinates;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
const METRES_PER_MILE: f64 = 1_609.344;
/// Mean earth radius used when the ellipsoidal solution fails to converge.
const MEAN_RADIUS_MILES: f64 = 6_371.009 / 1.609_344;
const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// A non-negative distance in statute miles.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Miles(f64);

impl Miles {
    /// Zero miles.
    pub const ZERO: Self = Self(0.0);

    /// Wrap a raw mile value. Negative or non-finite inputs are rejected.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value >= 0.0).then_some(Self(value))
    }

    /// Full-precision value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Value rounded to two decimal places for display.
    ///
    /// # Examples
    /// ```
    /// use freight::domain::Miles;
    ///
    /// let miles = Miles::new(30.4237).expect("finite");
    /// assert_eq!(miles.rounded(), 30.42);
    /// ```
    pub fn rounded(self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }
}

impl fmt::Display for Miles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} mi", self.0)
    }
}

/// Distance between `a` and `b`.
///
/// The result is symmetric bit-for-bit: both argument orders evaluate the
/// same canonical ordering of the points.
///
/// # Examples
/// ```
/// use freight::domain::{Coordinates, distance};
///
/// let adjuntas = Coordinates::new(18.18027, -66.75266).expect("valid");
/// let aguada = Coordinates::new(18.36075, -67.17541).expect("valid");
///
/// assert_eq!(distance(adjuntas, adjuntas).get(), 0.0);
/// assert_eq!(distance(adjuntas, aguada).rounded(), 30.42);
/// assert_eq!(distance(adjuntas, aguada), distance(aguada, adjuntas));
/// ```
pub fn distance(a: Coordinates, b: Coordinates) -> Miles {
    let (first, second) = match canonical_order(a, b) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };
    let miles = vincenty_metres(first, second)
        .map(|metres| metres / METRES_PER_MILE)
        .unwrap_or_else(|| great_circle_miles(first, second));
    Miles(miles.max(0.0))
}

fn canonical_order(a: Coordinates, b: Coordinates) -> Ordering {
    a.latitude()
        .total_cmp(&b.latitude())
        .then_with(|| a.longitude().total_cmp(&b.longitude()))
}

/// Vincenty inverse solution; `None` when the iteration does not converge
/// (nearly antipodal points).
fn vincenty_metres(a: Coordinates, b: Coordinates) -> Option<f64> {
    let l = (b.longitude() - a.longitude()).to_radians();
    let u1 = ((1.0 - WGS84_F) * a.latitude().to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * b.latitude().to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos_sq_alpha == 0.
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < CONVERGENCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let big_a =
                1.0 + u_sq / 16_384.0 * (4_096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1_024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(WGS84_B * big_a * (sigma - delta_sigma));
        }
    }
    None
}

fn great_circle_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude() - a.longitude()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_RADIUS_MILES * h.sqrt().min(1.0).asin()
}
