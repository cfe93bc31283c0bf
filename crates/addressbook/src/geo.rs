//! Geographic coordinates and great-circle distance.
//!
//! Distances are computed with the Haversine formula on a sphere of
//! radius [`EARTH_RADIUS_KM`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius used by [`distance_km`], in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A (latitude, longitude) pair in degrees.
///
/// Constructed only through [`Coordinate::new`], so every value in
/// circulation is within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = Error;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if either component is out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        validate_latitude(latitude)?;
        validate_longitude(longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a coordinate from two optional columns.
    ///
    /// Returns `None` unless both halves are present and in range.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::new(lat, lon).ok(),
            _ => None,
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Check that a latitude is finite and within [-90, 90].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when it is not.
pub fn validate_latitude(latitude: f64) -> Result<()> {
    check_range("latitude", latitude, LATITUDE_RANGE)
}

/// Check that a longitude is finite and within [-180, 180].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when it is not.
pub fn validate_longitude(longitude: f64) -> Result<()> {
    check_range("longitude", longitude, LONGITUDE_RANGE)
}

fn check_range(field: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "{field} must be within [{min}, {max}], got {value}"
        )))
    }
}

/// Great-circle distance between two coordinates in kilometers.
///
/// Inputs are trusted; range checks happen when a [`Coordinate`] is built.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // Rounding can push h just outside [0, 1] near the poles and antimeridian.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
