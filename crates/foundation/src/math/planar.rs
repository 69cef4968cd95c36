//! Planar polygon helpers for lon/lat geometry treated as flat coordinates.
//!
//! Rings may or may not repeat their first vertex at the end; both forms give
//! the same area and centroid.

use super::Vec2;

/// A polygon as a list of rings; the first ring is the exterior.
pub type Rings = Vec<Vec<Vec2>>;

/// Shoelace signed area; positive for counter-clockwise rings.
pub fn ring_signed_area(ring: &[Vec2]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        acc += a.cross(b);
    }
    acc * 0.5
}

/// Area of a polygon: exterior minus holes.
pub fn polygon_area(rings: &[Vec<Vec2>]) -> f64 {
    let Some((outer, holes)) = rings.split_first() else {
        return 0.0;
    };
    let holes: f64 = holes.iter().map(|h| ring_signed_area(h).abs()).sum();
    (ring_signed_area(outer).abs() - holes).max(0.0)
}

/// Area-weighted centroid of a ring; falls back to the vertex mean for
/// degenerate (zero-area) rings.
pub fn ring_centroid(ring: &[Vec2]) -> Option<Vec2> {
    if ring.is_empty() {
        return None;
    }
    let area = ring_signed_area(ring);
    if area.abs() < f64::EPSILON {
        let n = ring.len() as f64;
        let sum = ring.iter().fold(Vec2::new(0.0, 0.0), |acc, p| acc + *p);
        return Some(sum * (1.0 / n));
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        let f = a.cross(b);
        cx += (a.x + b.x) * f;
        cy += (a.y + b.y) * f;
    }
    let k = 1.0 / (6.0 * area);
    Some(Vec2::new(cx * k, cy * k))
}

/// Index of the part with the largest area.
pub fn largest_part(parts: &[Rings]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, part) in parts.iter().enumerate() {
        let area = polygon_area(part);
        if best.map(|(_, ba)| area > ba).unwrap_or(true) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::{largest_part, polygon_area, ring_centroid, ring_signed_area};
    use crate::math::Vec2;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Vec2> {
        vec![
            Vec2::new(x0, y0),
            Vec2::new(x0 + size, y0),
            Vec2::new(x0 + size, y0 + size),
            Vec2::new(x0, y0 + size),
            Vec2::new(x0, y0),
        ]
    }

    #[test]
    fn square_area_and_orientation() {
        let ring = square(0.0, 0.0, 2.0);
        assert_close(ring_signed_area(&ring), 4.0, 1e-12);
        let mut cw = ring.clone();
        cw.reverse();
        assert_close(ring_signed_area(&cw), -4.0, 1e-12);
    }

    #[test]
    fn holes_are_subtracted() {
        let rings = vec![square(0.0, 0.0, 4.0), square(1.0, 1.0, 1.0)];
        assert_close(polygon_area(&rings), 15.0, 1e-12);
    }

    #[test]
    fn centroid_of_offset_square() {
        let c = ring_centroid(&square(2.0, 3.0, 2.0)).unwrap();
        assert_close(c.x, 3.0, 1e-12);
        assert_close(c.y, 4.0, 1e-12);
    }

    #[test]
    fn largest_part_wins() {
        let parts = vec![
            vec![square(0.0, 0.0, 1.0)],
            vec![square(5.0, 5.0, 3.0)],
            vec![square(10.0, 10.0, 2.0)],
        ];
        assert_eq!(largest_part(&parts), Some(1));
        assert_eq!(largest_part(&[]), None);
    }
}
