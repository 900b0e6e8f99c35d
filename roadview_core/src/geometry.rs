//! Planar geometry used by the renderer and the hit-test engine.
//!
//! Everything here is a pure function over world-space points. Map
//! features carry an optional elevation; it is ignored by every test in
//! this module.

use nalgebra::{Point2, Rotation2, Vector2};

/// A point in the world plane (meters).
pub type Point = Point2<f64>;

/// Anything that has a position in the world plane.
pub trait Planar {
    fn xy(&self) -> Point;
}

impl Planar for Point {
    fn xy(&self) -> Point {
        *self
    }
}

/// Distance from `p` to the closed segment `a`-`b`.
///
/// Degenerate segments (`a == b`) fall back to point distance.
pub fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    (p - projection).norm()
}

/// Minimum distance from `p` to any segment of `points`.
///
/// Returns `None` for polylines with fewer than two points.
pub fn distance_to_polyline<P: Planar>(p: &Point, points: &[P]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let distance = points
        .windows(2)
        .map(|w| distance_to_segment(p, &w[0].xy(), &w[1].xy()))
        .fold(f64::INFINITY, f64::min);
    Some(distance)
}

/// Even-odd ray casting test.
///
/// Polygons with fewer than three vertices contain nothing. Points exactly
/// on an edge may land on either side.
pub fn point_in_polygon<P: Planar>(p: &Point, polygon: &[P]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i].xy();
        let pj = polygon[j].xy();
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Expresses `p` in the frame of an object at `center` rotated by `heading`.
pub fn to_local_frame(p: &Point, center: &Point, heading: f64) -> Vector2<f64> {
    Rotation2::new(-heading) * (p - center)
}

/// Maps a local-frame offset back into the world.
pub fn to_world_frame(local: Vector2<f64>, center: &Point, heading: f64) -> Point {
    center + Rotation2::new(heading) * local
}

/// Oriented-box containment with a relative tolerance margin.
///
/// The box is `length` long along `heading` and `width` wide across it.
/// `margin` scales both half extents (1.0 = exact box).
pub fn point_in_oriented_box(
    p: &Point,
    center: &Point,
    heading: f64,
    length: f64,
    width: f64,
    margin: f64,
) -> bool {
    let local = to_local_frame(p, center, heading);
    local.x.abs() <= (length / 2.0) * margin && local.y.abs() <= (width / 2.0) * margin
}

/// Corners of an oriented box, counter-clockwise starting at rear-right.
pub fn box_corners(center: &Point, heading: f64, length: f64, width: f64) -> [Point; 4] {
    let hl = length / 2.0;
    let hw = width / 2.0;
    [
        to_world_frame(Vector2::new(-hl, -hw), center, heading),
        to_world_frame(Vector2::new(hl, -hw), center, heading),
        to_world_frame(Vector2::new(hl, hw), center, heading),
        to_world_frame(Vector2::new(-hl, hw), center, heading),
    ]
}

/// Offsets a polyline sideways by `distance` (positive = left of travel).
///
/// Interior vertices use a miter join; the miter is limited so that sharp
/// turns do not shoot off to infinity.
pub fn offset_polyline<P: Planar>(points: &[P], distance: f64) -> Vec<Point> {
    let pts: Vec<Point> = points.iter().map(Planar::xy).collect();
    if pts.len() < 2 {
        return pts;
    }

    let normals: Vec<Option<Vector2<f64>>> = pts
        .windows(2)
        .map(|w| segment_normal(&w[0], &w[1]))
        .collect();

    pts.iter()
        .enumerate()
        .map(|(i, p)| {
            let before = if i > 0 { normals[i - 1] } else { None };
            let after = normals.get(i).copied().flatten();
            let normal = match (before, after) {
                (Some(a), Some(b)) => {
                    let sum = a + b;
                    let len = sum.norm();
                    if len < 1e-9 {
                        b
                    } else {
                        let miter = sum / len;
                        miter / miter.dot(&b).max(0.25)
                    }
                }
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => Vector2::zeros(),
            };
            p + normal * distance
        })
        .collect()
}

fn segment_normal(a: &Point, b: &Point) -> Option<Vector2<f64>> {
    let d = b - a;
    let len = d.norm();
    if len <= f64::EPSILON {
        return None;
    }
    Some(Vector2::new(-d.y, d.x) / len)
}
