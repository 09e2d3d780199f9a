use std::fmt;

use crate::zernike::{optical_zernike, optical_zernike_listing};

/// Weighted sum of optical Zernike polynomials.
///
/// Only the first [`OPTICAL_ZERNIKE_TERMS`](crate::zernike::OPTICAL_ZERNIKE_TERMS)
/// terms are defined; any coefficient beyond them makes the sum `NaN`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZernikeExpansion {
    /// Coefficients in waves, in optical Zernike order.
    pub coefficients: Vec<f64>,
}

impl ZernikeExpansion {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Value in waves at `(u, v)` on the unit disk.
    pub fn evaluate(&self, u: f64, v: f64) -> f64 {
        zernike_sum(&self.coefficients, u, v)
    }
}

/// `Σ c[i]·Z_i(u, v)` over the leading coefficients; `NaN` off the unit disk.
pub(crate) fn zernike_sum(coefficients: &[f64], u: f64, v: f64) -> f64 {
    if u * u + v * v > 1.0 {
        return f64::NAN;
    }
    coefficients
        .iter()
        .enumerate()
        .map(|(i, &c)| optical_zernike(c, i, u, v))
        .sum()
}

impl fmt::Display for ZernikeExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", optical_zernike_listing(&self.coefficients))
    }
}
