//! Lambert-93 to WGS84 coordinate conversion
//!
//! Reference tables store positions in Lambert-93 (EPSG:2154), the French
//! national grid. Web maps need geographic longitude/latitude (EPSG:4326).
//! RGF93, the datum under Lambert-93, agrees with WGS84 to well under a
//! metre, so only the inverse projection is applied and no datum shift.

use crate::constants::lambert93::{C, E, LAMBDA0, LATITUDE_EPSILON, MAX_ITERATIONS, N, XS, YS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    #[error("non-finite projected coordinates ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    #[error("projected coordinates ({x}, {y}) have no geographic equivalent")]
    Degenerate { x: f64, y: f64 },
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Whether the point lies within -180..180 / -90..90
    pub fn is_within_bounds(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// Inverse Lambert-93 projection
///
/// Stateless; exists so callers can hold a transformer value the same way
/// they would hold a configured one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lambert93;

impl Lambert93 {
    pub fn new() -> Self {
        Self
    }

    /// Convert a Lambert-93 easting/northing (metres) to WGS84 degrees
    pub fn to_wgs84(&self, x: f64, y: f64) -> Result<GeoPoint, ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }

        let dx = x - XS;
        let dy = y - YS;
        let radius = dx.hypot(dy);
        // The cone apex maps to the pole, where longitude is undefined
        if radius == 0.0 {
            return Err(ProjectionError::Degenerate { x, y });
        }

        let gamma = dx.atan2(-dy);

        let longitude = LAMBDA0 + gamma / N;
        let isometric_latitude = -(radius / C).ln() / N;
        let latitude = latitude_from_isometric(isometric_latitude);

        let point = GeoPoint {
            longitude: longitude.to_degrees(),
            latitude: latitude.to_degrees(),
        };

        if !point.longitude.is_finite() || !point.latitude.is_finite() {
            return Err(ProjectionError::Degenerate { x, y });
        }

        Ok(point)
    }
}

/// Convert a Lambert-93 pair with the default transformer
pub fn project(x: f64, y: f64) -> Result<GeoPoint, ProjectionError> {
    Lambert93.to_wgs84(x, y)
}

/// Invert the isometric latitude on the GRS80 ellipsoid
fn latitude_from_isometric(isometric: f64) -> f64 {
    let exp_l = isometric.exp();
    let mut phi = 2.0 * exp_l.atan() - std::f64::consts::FRAC_PI_2;

    for _ in 0..MAX_ITERATIONS {
        let e_sin = E * phi.sin();
        let next = 2.0 * (((1.0 + e_sin) / (1.0 - e_sin)).powf(E / 2.0) * exp_l).atan()
            - std::f64::consts::FRAC_PI_2;

        if (next - phi).abs() < LATITUDE_EPSILON {
            return next;
        }
        phi = next;
    }

    phi
}
