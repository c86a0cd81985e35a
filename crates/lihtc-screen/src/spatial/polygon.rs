use super::coordinate::{Coordinate, MILES_PER_DEGREE};
use super::SpatialError;

/// Perpendicular slack (in degrees) within which a point counts as lying on an edge.
const EDGE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    fn from_points<'a>(points: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        for point in iter {
            bbox.min_lat = bbox.min_lat.min(point.lat);
            bbox.max_lat = bbox.max_lat.max(point.lat);
            bbox.min_lon = bbox.min_lon.min(point.lon);
            bbox.max_lon = bbox.max_lon.max(point.lon);
        }
        Some(bbox)
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        point.lat >= self.min_lat - EDGE_TOLERANCE
            && point.lat <= self.max_lat + EDGE_TOLERANCE
            && point.lon >= self.min_lon - EDGE_TOLERANCE
            && point.lon <= self.max_lon + EDGE_TOLERANCE
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingHit {
    Inside,
    Boundary,
    Outside,
}

/// Closed linear ring. The closing vertex is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Coordinate>,
    bbox: BoundingBox,
}

impl Ring {
    pub fn new(mut points: Vec<Coordinate>) -> Result<Self, SpatialError> {
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return Err(SpatialError::DegenerateRing {
                points: points.len(),
            });
        }
        let bbox = BoundingBox::from_points(&points).ok_or(SpatialError::DegenerateRing {
            points: points.len(),
        })?;
        Ok(Self { points, bbox })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    fn edges(&self) -> impl Iterator<Item = (&Coordinate, &Coordinate)> {
        let next = self.points.iter().cycle().skip(1);
        self.points.iter().zip(next)
    }

    fn hit(&self, point: &Coordinate) -> RingHit {
        if !self.bbox.contains(point) {
            return RingHit::Outside;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if on_segment(point, a, b) {
                return RingHit::Boundary;
            }
            if (a.lat > point.lat) != (b.lat > point.lat) {
                let crossing = a.lon + (point.lat - a.lat) * (b.lon - a.lon) / (b.lat - a.lat);
                if point.lon < crossing {
                    inside = !inside;
                }
            }
        }

        if inside {
            RingHit::Inside
        } else {
            RingHit::Outside
        }
    }

    fn distance_miles(&self, point: &Coordinate) -> f64 {
        let scale_lon = point.lat.to_radians().cos() * MILES_PER_DEGREE;
        let project = |c: &Coordinate| {
            (
                (c.lon - point.lon) * scale_lon,
                (c.lat - point.lat) * MILES_PER_DEGREE,
            )
        };

        self.edges()
            .map(|(a, b)| origin_to_segment(project(a), project(b)))
            .fold(f64::INFINITY, f64::min)
    }
}

fn on_segment(point: &Coordinate, a: &Coordinate, b: &Coordinate) -> bool {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return (point.lon - a.lon).abs() <= EDGE_TOLERANCE
            && (point.lat - a.lat).abs() <= EDGE_TOLERANCE;
    }

    let cross = (point.lon - a.lon) * dy - (point.lat - a.lat) * dx;
    if (cross / length).abs() > EDGE_TOLERANCE {
        return false;
    }

    point.lon >= a.lon.min(b.lon) - EDGE_TOLERANCE
        && point.lon <= a.lon.max(b.lon) + EDGE_TOLERANCE
        && point.lat >= a.lat.min(b.lat) - EDGE_TOLERANCE
        && point.lat <= a.lat.max(b.lat) + EDGE_TOLERANCE
}

fn origin_to_segment(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (-(a.0 * dx + a.1 * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (x, y) = (a.0 + t * dx, a.1 + t * dy);
    (x * x + y * y).sqrt()
}

/// Polygon with one exterior ring and any number of holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    pub fn bbox(&self) -> BoundingBox {
        self.exterior.bbox
    }

    /// Boundary points (including hole boundaries) count as inside.
    pub fn contains(&self, point: &Coordinate) -> bool {
        match self.exterior.hit(point) {
            RingHit::Outside => false,
            RingHit::Boundary => true,
            RingHit::Inside => self
                .holes
                .iter()
                .all(|hole| hole.hit(point) != RingHit::Inside),
        }
    }

    /// Zero when the point is contained, otherwise the approximate distance
    /// to the nearest edge.
    pub fn distance_miles(&self, point: &Coordinate) -> f64 {
        if self.contains(point) {
            return 0.0;
        }
        std::iter::once(&self.exterior)
            .chain(self.holes.iter())
            .map(|ring| ring.distance_miles(point))
            .fold(f64::INFINITY, f64::min)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
    bbox: BoundingBox,
}

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Result<Self, SpatialError> {
        let bbox = polygons
            .iter()
            .map(Polygon::bbox)
            .reduce(|acc, next| acc.union(&next))
            .ok_or(SpatialError::EmptyGeometry)?;
        Ok(Self { polygons, bbox })
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        self.bbox.contains(point) && self.polygons.iter().any(|p| p.contains(point))
    }

    pub fn distance_miles(&self, point: &Coordinate) -> f64 {
        self.polygons
            .iter()
            .map(|polygon| polygon.distance_miles(point))
            .fold(f64::INFINITY, f64::min)
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        let bbox = polygon.bbox();
        Self {
            polygons: vec![polygon],
            bbox,
        }
    }
}
