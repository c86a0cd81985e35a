use super::SpatialError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Miles spanned by one degree of latitude on the mean-radius sphere.
pub const MILES_PER_DEGREE: f64 = EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0;

/// WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting out-of-range values and the `(0, 0)`
    /// placeholder that spreadsheets emit for blank geocodes.
    pub fn new(lat: f64, lon: f64) -> Result<Self, SpatialError> {
        let candidate = Self { lat, lon };
        if candidate.is_valid() {
            Ok(candidate)
        } else {
            Err(SpatialError::InvalidCoordinate { lat, lon })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
            && !self.is_placeholder()
    }

    pub fn is_placeholder(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }

    pub fn distance_miles(&self, other: &Coordinate) -> f64 {
        haversine_miles(*self, *other)
    }
}

/// Great-circle distance between two points.
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}
