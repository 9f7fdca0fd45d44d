//! Outlines of the well-known point marks.

use super::symbolizer::MarkShape;
use std::f32::consts::PI;

/// Closed sub-paths of `shape` drawn `size` pixels wide, centred on the
/// origin. Circles are drawn as ellipses and have no outline here.
pub(crate) fn mark_outline(shape: MarkShape, size: f32) -> Vec<Vec<(f32, f32)>> {
    let r = size / 2.0;
    match shape {
        MarkShape::Square => vec![vec![(-r, -r), (r, -r), (r, r), (-r, r)]],
        MarkShape::Circle => Vec::new(),
        MarkShape::Triangle => vec![polar(3, |_| r, -PI / 2.0)],
        MarkShape::Star => vec![polar(10, |i| if i % 2 == 0 { r } else { r * 0.382 }, -PI / 2.0)],
        MarkShape::Cross => cross(r),
        MarkShape::X => {
            let (s, c) = (PI / 4.0).sin_cos();
            cross(r)
                .into_iter()
                .map(|ring| {
                    ring.into_iter()
                        .map(|(x, y)| (x * c - y * s, x * s + y * c))
                        .collect()
                })
                .collect()
        }
    }
}

fn polar(count: usize, radius: impl Fn(usize) -> f32, start: f32) -> Vec<(f32, f32)> {
    (0..count)
        .map(|i| {
            let angle = start + i as f32 * 2.0 * PI / count as f32;
            let r = radius(i);
            (r * angle.cos(), r * angle.sin())
        })
        .collect()
}

/// Two bars with the same winding, so they union under non-zero filling.
fn cross(r: f32) -> Vec<Vec<(f32, f32)>> {
    let t = r * 0.2;
    vec![
        vec![(-r, -t), (r, -t), (r, t), (-r, t)],
        vec![(-t, -r), (t, -r), (t, r), (-t, r)],
    ]
}
