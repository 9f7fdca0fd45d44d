//! Shaded relief masks.
//!
//! A mask holds one brightness coefficient per canvas pixel. Valid cells
//! are in `[1/255, 1]`; zero marks cells without elevation, which leave the
//! underlying color untouched.

use crate::config::ReliefConfig;
use crate::error::{RenderError, RenderResult};
use crate::storage::ElevationGrid;
use rastyle_canvas::pixel::ALPHA_THRESHOLD;

const MIN_SHADE: f32 = 1.0 / 255.0;

/// Horn hillshade of `grid`, lit from `light`, with `z_factor` vertical
/// exaggeration.
pub fn hillshade(grid: &ElevationGrid, z_factor: f64, light: &ReliefConfig) -> RenderResult<Vec<f32>> {
    let (w, h) = (grid.width as usize, grid.height as usize);
    if w == 0 || h == 0 || grid.values.len() != w * h {
        return Err(RenderError::StorageQueryFailure(format!(
            "elevation grid {}x{} holds {} values",
            grid.width,
            grid.height,
            grid.values.len()
        )));
    }
    if !(grid.x_res > 0.0 && grid.y_res > 0.0) {
        return Err(RenderError::StorageQueryFailure(format!(
            "elevation resolution {} x {}",
            grid.x_res, grid.y_res
        )));
    }

    let zenith = (90.0 - light.altitude).to_radians();
    let azimuth = ((360.0 - light.azimuth + 90.0).rem_euclid(360.0)).to_radians();
    let (cos_zenith, sin_zenith) = (zenith.cos(), zenith.sin());
    let is_valid = |v: f32| !v.is_nan() && grid.no_data != Some(v);

    let mut shade = vec![0.0f32; w * h];
    for row in 0..h {
        for col in 0..w {
            let center = grid.values[row * w + col];
            if !is_valid(center) {
                continue;
            }
            // Edge cells and no-data neighbours reuse the centre value
            let at = |dr: isize, dc: isize| -> f64 {
                let r = (row as isize + dr).clamp(0, h as isize - 1) as usize;
                let c = (col as isize + dc).clamp(0, w as isize - 1) as usize;
                let v = grid.values[r * w + c];
                if is_valid(v) {
                    v as f64
                } else {
                    center as f64
                }
            };
            let (a, b, c) = (at(-1, -1), at(-1, 0), at(-1, 1));
            let (d, f) = (at(0, -1), at(0, 1));
            let (g, hh, i) = (at(1, -1), at(1, 0), at(1, 1));

            let dzdx = ((c + 2.0 * f + i) - (a + 2.0 * d + g)) / (8.0 * grid.x_res);
            let dzdy = ((g + 2.0 * hh + i) - (a + 2.0 * b + c)) / (8.0 * grid.y_res);
            let slope = (z_factor * (dzdx * dzdx + dzdy * dzdy).sqrt()).atan();
            let aspect = dzdy.atan2(-dzdx);
            let value = cos_zenith * slope.cos() + sin_zenith * slope.sin() * (azimuth - aspect).cos();
            shade[row * w + col] = (value as f32).clamp(MIN_SHADE, 1.0);
        }
    }
    Ok(shade)
}

/// Bilinear resample of a mask; cells whose nearest source is empty stay
/// empty and empty neighbours are left out of the blend.
pub fn rescale_mask(values: &[f32], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Vec<f32> {
    if src_w == dst_w && src_h == dst_h {
        return values.to_vec();
    }
    let (sw, sh) = (src_w as usize, src_h as usize);
    let mut out = vec![0.0f32; dst_w as usize * dst_h as usize];
    if sw == 0 || sh == 0 || values.len() != sw * sh {
        return out;
    }
    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;
    for y in 0..dst_h as usize {
        let fy = ((y as f32 + 0.5) * y_ratio - 0.5).clamp(0.0, (sh - 1) as f32);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(sh - 1);
        let ty = fy - y0 as f32;
        for x in 0..dst_w as usize {
            let fx = ((x as f32 + 0.5) * x_ratio - 0.5).clamp(0.0, (sw - 1) as f32);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(sw - 1);
            let tx = fx - x0 as f32;

            let nearest = values[fy.round() as usize * sw + fx.round() as usize];
            if nearest <= 0.0 {
                continue;
            }
            let taps = [
                (values[y0 * sw + x0], (1.0 - tx) * (1.0 - ty)),
                (values[y0 * sw + x1], tx * (1.0 - ty)),
                (values[y1 * sw + x0], (1.0 - tx) * ty),
                (values[y1 * sw + x1], tx * ty),
            ];
            let (sum, weight) = taps
                .iter()
                .filter(|(v, _)| *v > 0.0)
                .fold((0.0, 0.0), |(s, w), (v, wt)| (s + v * wt, w + wt));
            out[y * dst_w as usize + x] = if weight > 0.0 { sum / weight } else { nearest };
        }
    }
    out
}

/// Combine a further relief layer into an existing mask.
pub(crate) fn merge_masks(acc: &mut [f32], mask: &[f32]) {
    for (a, m) in acc.iter_mut().zip(mask) {
        *a *= *m;
    }
}

/// Darken opaque pixels by their mask coefficient.
pub(crate) fn apply_relief(rgb: &mut [u8], alpha: &[u8], mask: &[f32]) {
    for ((px, a), m) in rgb.chunks_exact_mut(3).zip(alpha).zip(mask) {
        if *a < ALPHA_THRESHOLD || *m <= 0.0 {
            continue;
        }
        for channel in px.iter_mut() {
            *channel = (*channel as f32 * m).round().clamp(0.0, 255.0) as u8;
        }
    }
}
