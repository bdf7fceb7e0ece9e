//! Fourier basis terms for periodic components.

use std::f64::consts::PI;

/// Sine/cosine pairs `sin(2πkt/P), cos(2πkt/P)` for `k = 1..=order`.
///
/// `t` and `period` must share a unit. Returns `2 * order` values.
pub fn fourier_terms(t: f64, period: f64, order: usize) -> Vec<f64> {
    let mut terms = Vec::with_capacity(order * 2);
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * t / period;
        terms.push(angle.sin());
        terms.push(angle.cos());
    }
    terms
}
