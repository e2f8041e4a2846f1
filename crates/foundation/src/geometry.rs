//! Measurement geometry over geocentric (ECEF) positions.
//!
//! Areas use a planar shoelace sum on an equirectangular-style projection of the
//! geodetic coordinates. This is accurate for small polygons only and is not a
//! geodesic area.

use crate::math::{Geodetic, Vec3, WGS84_A, ecef_to_geodetic};

/// Planet radius used by the planar area projection (meters).
pub const PLANAR_AREA_RADIUS_M: f64 = WGS84_A;

/// Euclidean distance in the frame's native units.
pub fn segment_distance(a: Vec3, b: Vec3) -> f64 {
    a.distance(b)
}

pub fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5, (a.z + b.z) * 0.5)
}

/// Distances of each consecutive segment along `points`.
pub fn segment_distances(points: &[Vec3]) -> Vec<f64> {
    points
        .windows(2)
        .map(|w| segment_distance(w[0], w[1]))
        .collect()
}

/// Sum of consecutive segment distances. Zero for fewer than two points.
pub fn polyline_length(points: &[Vec3]) -> f64 {
    segment_distances(points).iter().sum()
}

/// Area of the ring through ECEF `points` in square meters (see module docs).
///
/// Returns 0 for fewer than three points.
pub fn polygon_area(points: &[Vec3]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let geodetic: Vec<Geodetic> = points.iter().map(|p| ecef_to_geodetic((*p).into())).collect();
    planar_polygon_area(&geodetic)
}

/// Shoelace area of geodetic vertices projected with
/// `x = lon * R`, `y = lat * R * cos(lat)`.
pub fn planar_polygon_area(points: &[Geodetic]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let projected: Vec<(f64, f64)> = points
        .iter()
        .map(|g| {
            let x = g.lon_rad * PLANAR_AREA_RADIUS_M;
            let y = g.lat_rad * PLANAR_AREA_RADIUS_M * g.lat_rad.cos();
            (x, y)
        })
        .collect();

    let n = projected.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        let (xi, yi) = projected[i];
        let (xj, yj) = projected[(i + 1) % n];
        twice_area += xi * yj - xj * yi;
    }
    twice_area.abs() / 2.0
}

/// Vertex average of `points`.
///
/// This is not the area-weighted centroid; label placement relies on the
/// vertex average, which only matches the true centroid for regular shapes.
pub fn polygon_centroid(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
    Some(Vec3::new(sum.x / n, sum.y / n, sum.z / n))
}

/// Copy of `points` whose last vertex equals the first.
pub fn close_ring(points: &[Vec3]) -> Vec<Vec3> {
    let mut ring = points.to_vec();
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if first != last {
            ring.push(*first);
        }
    }
    ring
}
