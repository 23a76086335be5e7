use std::ops::Range;

use ndarray::ArrayView2;

pub fn minmax(arr: ArrayView2<f64>) -> (f64, f64) {
    if arr.is_empty() {
        (f64::NAN, f64::NAN)
    } else {
        arr.iter()
            .cloned()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), val| {
                (min.min(val), max.max(val))
            })
    }
}

/// `[i - half_width, i + half_width)` clamped to `[0, len)`.
pub fn window(i: usize, half_width: usize, len: usize) -> Range<usize> {
    i.saturating_sub(half_width)..(i + half_width).min(len)
}
