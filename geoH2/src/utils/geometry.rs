use serde::{Deserialize, Serialize};

/// Longitude/latitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Planar distance in degrees
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let dx = self.lon - other.lon;
        let dy = self.lat - other.lat;
        (dx * dx + dy * dy).sqrt()
    }

    /// Planar distance scaled to kilometres by a fixed degrees->km factor
    pub fn distance_km(&self, other: &GeoPoint, degrees_to_km: f64) -> f64 {
        self.distance_to(other) * degrees_to_km
    }
}

/// Site footprint. Only its centroid is used by the costing stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(GeoPoint),
    /// Exterior ring; the closing vertex may or may not repeat the first one
    Polygon(Vec<GeoPoint>),
}

impl Geometry {
    pub fn centroid(&self) -> Option<GeoPoint> {
        match self {
            Geometry::Point(point) => Some(*point),
            Geometry::Polygon(ring) => polygon_centroid(ring),
        }
    }
}

/// Area-weighted centroid of a ring (shoelace formula). Degenerate rings with zero
/// area fall back to the mean of their distinct vertices.
pub fn polygon_centroid(ring: &[GeoPoint]) -> Option<GeoPoint> {
    let mut points: Vec<GeoPoint> = ring.to_vec();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.is_empty() {
        return None;
    }

    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut j = points.len() - 1;

    for i in 0..points.len() {
        let (xi, yi) = (points[i].lon, points[i].lat);
        let (xj, yj) = (points[j].lon, points[j].lat);
        let cross = xj * yi - xi * yj;
        twice_area += cross;
        cx += (xj + xi) * cross;
        cy += (yj + yi) * cross;
        j = i;
    }

    if twice_area.abs() < f64::EPSILON {
        let n = points.len() as f64;
        let lon = points.iter().map(|p| p.lon).sum::<f64>() / n;
        let lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
        return Some(GeoPoint::new(lon, lat));
    }

    Some(GeoPoint::new(cx / (3.0 * twice_area), cy / (3.0 * twice_area)))
}
