//! Spatial primitives backing the parcel screening joins: coordinates and
//! great-circle distance, polygon containment, and GeoJSON-backed zone layers.

mod coordinate;
mod geojson;
mod layer;
mod polygon;

pub use coordinate::{haversine_miles, Coordinate, EARTH_RADIUS_MILES, MILES_PER_DEGREE};
pub use layer::{NearestZone, ZoneFeature, ZoneLayer, DEFAULT_LABEL_KEYS};
pub use polygon::{BoundingBox, MultiPolygon, Polygon, Ring};

#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    #[error("coordinate ({lat}, {lon}) is outside the valid WGS84 range")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("ring needs at least three distinct vertices, found {points}")]
    DegenerateRing { points: usize },
    #[error("geometry contains no polygons")]
    EmptyGeometry,
    #[error("feature {feature} has a position with fewer than two ordinates")]
    InvalidPosition { feature: usize },
    #[error("expected a GeoJSON FeatureCollection, found '{0}'")]
    NotFeatureCollection(String),
    #[error("failed to read GeoJSON: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}
