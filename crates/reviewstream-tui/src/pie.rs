//! Pie geometry for the braille canvas.
//!
//! The canvas has no filled-arc primitive, so slices are drawn as point
//! clouds: the unit disk is sampled on a square grid and every sample lands
//! in the slice whose angular range covers it. Angles run clockwise from
//! 12 o'clock.

use std::f64::consts::TAU;

use reviewstream_core::chart::SliceDatum;

/// Start and end angle of each slice, in radians.
pub fn slice_angles(slices: &[SliceDatum]) -> Vec<(f64, f64)> {
    let mut start = 0.0;
    slices
        .iter()
        .map(|slice| {
            let end = start + slice.share * TAU;
            let range = (start, end);
            start = end;
            range
        })
        .collect()
}

/// Samples the unit disk on a `resolution` x `resolution` grid and buckets
/// the samples per slice. The result is parallel to `slices`.
pub fn slice_points(slices: &[SliceDatum], resolution: usize) -> Vec<Vec<(f64, f64)>> {
    let mut buckets = vec![Vec::new(); slices.len()];
    if slices.is_empty() || resolution == 0 {
        return buckets;
    }

    let angles = slice_angles(slices);
    let last = angles.len() - 1;
    let step = 2.0 / resolution as f64;

    for row in 0..resolution {
        let y = -1.0 + step * (row as f64 + 0.5);
        for col in 0..resolution {
            let x = -1.0 + step * (col as f64 + 0.5);
            if x.mul_add(x, y * y) > 1.0 {
                continue;
            }
            let angle = clockwise_angle(x, y);
            // Rounding can leave the final end a hair under TAU.
            let index = angles
                .iter()
                .position(|&(_, end)| angle < end)
                .unwrap_or(last);
            buckets[index].push((x, y));
        }
    }

    buckets
}

/// Canvas bounds that keep the pie round in a cell area of `width` x
/// `height`. Terminal cells are roughly twice as tall as they are wide.
pub fn canvas_bounds(width: u16, height: u16) -> ([f64; 2], [f64; 2]) {
    if width == 0 || height == 0 {
        return ([-1.0, 1.0], [-1.0, 1.0]);
    }
    let ratio = f64::from(width) / (2.0 * f64::from(height));
    if ratio >= 1.0 {
        ([-ratio, ratio], [-1.0, 1.0])
    } else {
        ([-1.0, 1.0], [-1.0 / ratio, 1.0 / ratio])
    }
}

fn clockwise_angle(x: f64, y: f64) -> f64 {
    let angle = x.atan2(y);
    if angle < 0.0 { angle + TAU } else { angle }
}
