//! Standard normal density and distribution function helpers.
//!
//! `ln_cdf` stays finite far into the lower tail, where `cdf` underflows.

use std::f64::consts::SQRT_2;

use statrs::consts::{LN_SQRT_2PI, SQRT_2PI};
use statrs::function::erf::erfc;

/// Below this argument `ln_cdf` switches to the asymptotic tail expansion.
const LOWER_TAIL: f64 = -30.0;

#[inline]
pub fn pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / SQRT_2PI
}

#[inline]
pub fn ln_pdf(x: f64) -> f64 {
    -0.5 * x * x - LN_SQRT_2PI
}

/// Φ(x).
#[inline]
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// ln Φ(x).
pub fn ln_cdf(x: f64) -> f64 {
    if x > LOWER_TAIL {
        return cdf(x).ln();
    }
    // Mills-ratio expansion: Φ(x) ≈ φ(x)/|x| · (1 − 1/x² + 3/x⁴ − 15/x⁶).
    let x2 = x * x;
    let series = 1.0 - 1.0 / x2 + 3.0 / (x2 * x2) - 15.0 / (x2 * x2 * x2);
    ln_pdf(x) - (-x).ln() + series.ln()
}

/// ln(1 − Φ(x)).
#[inline]
pub fn ln_sf(x: f64) -> f64 {
    ln_cdf(-x)
}
