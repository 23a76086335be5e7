// SPDX-License-Identifier: GPL-3.0-or-later

//! Noise-floor normalization of a frequency × time matrix.
//!
//! The floor of each frequency bin is its minimum over time, smoothed across neighbouring bins
//! with a sliding minimum followed by a sliding mean. Both windows cover `[i - 10, i + 10)`,
//! clamped to the matrix.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::util::window;

pub const HALF_WIDTH: usize = 10;

/// Per-row baseline of a frequency-row × time-column matrix.
///
/// Rows without any samples have an infinite minimum, callers should not pass empty matrices.
pub fn noise_floor(matrix: ArrayView2<f64>) -> Array1<f64> {
    let minima = matrix.map_axis(Axis(1), |row| {
        row.iter().cloned().fold(f64::INFINITY, f64::min)
    });
    let n = minima.len();

    let smoothed = Array1::from_shape_fn(n, |i| {
        minima
            .slice(ndarray::s![window(i, HALF_WIDTH, n)])
            .iter()
            .cloned()
            .fold(f64::INFINITY, f64::min)
    });

    Array1::from_shape_fn(n, |i| {
        let range = window(i, HALF_WIDTH, n);
        let len = range.len() as f64;
        smoothed.slice(ndarray::s![range]).sum() / len
    })
}

/// Subtracts the noise floor from every row and multiplies by `scale`.
pub fn normalize(mut matrix: Array2<f64>, scale: f64) -> Array2<f64> {
    if matrix.is_empty() {
        return matrix;
    }
    let floor = noise_floor(matrix.view());
    log::debug!(
        "Noise floor ranges from {} to {}",
        floor.iter().cloned().fold(f64::INFINITY, f64::min),
        floor.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    );
    for (mut row, &offset) in matrix.outer_iter_mut().zip(floor.iter()) {
        row.mapv_inplace(|v| (v - offset) * scale);
    }
    matrix
}
