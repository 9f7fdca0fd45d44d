//! Geometry operations used for label placement.

use super::geometry::{Point, Polygon};

/// The geometry-processing collaborator.
///
/// Offsets follow the usual planar convention: positive distances move to
/// the left of the line's direction in a y-up coordinate system.
pub trait GeometryProcessor {
    fn centroid(&self, polygon: &Polygon) -> Option<Point>;

    /// Point at `fraction` (0..=1) of the line's length.
    fn interpolate(&self, line: &[Point], fraction: f64) -> Option<Point>;

    fn simplify(&self, line: &[Point], tolerance: f64) -> Vec<Point>;

    fn offset_curve(&self, line: &[Point], distance: f64) -> Vec<Point>;
}

/// In-process planar implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeometry;

/// Miter joins longer than this many offset distances are cut back.
const MITER_LIMIT: f64 = 4.0;

impl GeometryProcessor for PlanarGeometry {
    fn centroid(&self, polygon: &Polygon) -> Option<Point> {
        let (a, x, y) = ring_moments(&polygon.exterior);
        let s = a.signum();
        let (mut area, mut cx, mut cy) = (a.abs(), x * s, y * s);
        // Holes subtract whatever their winding
        for hole in &polygon.interiors {
            let (a, x, y) = ring_moments(hole);
            let s = a.signum();
            area -= a.abs();
            cx -= x * s;
            cy -= y * s;
        }
        if area > f64::EPSILON {
            return Some(Point::new(cx / (3.0 * area), cy / (3.0 * area)));
        }
        let n = polygon.exterior.len();
        (n > 0).then(|| {
            let (sx, sy) = polygon
                .exterior
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            Point::new(sx / n as f64, sy / n as f64)
        })
    }

    fn interpolate(&self, line: &[Point], fraction: f64) -> Option<Point> {
        let first = *line.first()?;
        let total: f64 = line.windows(2).map(|w| w[0].distance(&w[1])).sum();
        if total <= 0.0 {
            return Some(first);
        }
        let mut remaining = total * fraction.clamp(0.0, 1.0);
        for w in line.windows(2) {
            let len = w[0].distance(&w[1]);
            if remaining <= len && len > 0.0 {
                let t = remaining / len;
                return Some(Point::new(
                    w[0].x + (w[1].x - w[0].x) * t,
                    w[0].y + (w[1].y - w[0].y) * t,
                ));
            }
            remaining -= len;
        }
        line.last().copied()
    }

    /// Douglas-Peucker; the end points are always kept.
    fn simplify(&self, line: &[Point], tolerance: f64) -> Vec<Point> {
        if line.len() < 3 || tolerance <= 0.0 {
            return line.to_vec();
        }
        let mut keep = vec![false; line.len()];
        keep[0] = true;
        keep[line.len() - 1] = true;
        let mut stack = vec![(0, line.len() - 1)];
        while let Some((start, end)) = stack.pop() {
            let mut farthest = (0.0, start);
            for i in start + 1..end {
                let d = segment_distance(&line[i], &line[start], &line[end]);
                if d > farthest.0 {
                    farthest = (d, i);
                }
            }
            if farthest.0 > tolerance {
                keep[farthest.1] = true;
                stack.push((start, farthest.1));
                stack.push((farthest.1, end));
            }
        }
        line.iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(*p))
            .collect()
    }

    fn offset_curve(&self, line: &[Point], distance: f64) -> Vec<Point> {
        if line.len() < 2 || distance == 0.0 {
            return line.to_vec();
        }
        let normals: Vec<(f64, f64)> = line
            .windows(2)
            .map(|w| left_normal(&w[0], &w[1]))
            .collect();
        let mut out = Vec::with_capacity(line.len());
        for (i, p) in line.iter().enumerate() {
            let (nx, ny) = if i == 0 {
                normals[0]
            } else if i == line.len() - 1 {
                normals[i - 1]
            } else {
                let (a, b) = (normals[i - 1], normals[i]);
                let (mx, my) = (a.0 + b.0, a.1 + b.1);
                let len = mx.hypot(my);
                if len < 1e-9 {
                    a
                } else {
                    // Miter: the bisector stretched to keep the offset distance
                    let (mx, my) = (mx / len, my / len);
                    let scale = (1.0 / (mx * a.0 + my * a.1)).min(MITER_LIMIT);
                    (mx * scale, my * scale)
                }
            };
            out.push(Point::new(p.x + nx * distance, p.y + ny * distance));
        }
        out
    }
}

/// Twice the signed area, and the unscaled first moments, of a ring.
fn ring_moments(ring: &[Point]) -> (f64, f64, f64) {
    let (mut a, mut x, mut y) = (0.0, 0.0, 0.0);
    for (i, p) in ring.iter().enumerate() {
        let q = &ring[(i + 1) % ring.len()];
        let cross = p.x * q.y - q.x * p.y;
        a += cross;
        x += (p.x + q.x) * cross;
        y += (p.y + q.y) * cross;
    }
    (a / 2.0, x / 2.0, y / 2.0)
}

fn left_normal(a: &Point, b: &Point) -> (f64, f64) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = dx.hypot(dy);
    if len == 0.0 {
        (0.0, 0.0)
    } else {
        (-dy / len, dx / len)
    }
}

fn segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + dx * t, a.y + dy * t))
}
