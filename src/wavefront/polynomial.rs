use std::fmt;

/// Monomials of the polynomial expansion, in coefficient order.
pub const POLYNOMIAL_TERMS: [&str; 15] = [
    "1", "x", "y", "x^2", "xy", "y^2", "x^3", "x^2y", "xy^2", "y^3", "x^4", "x^3y", "x^2y^2",
    "xy^3", "y^4",
];

/// Power series in `x`, `y` up to fourth order.
///
/// Terms past index 14 evaluate to `NaN`, making the whole sum undefined.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolynomialExpansion {
    /// Coefficients in waves, ordered as [`POLYNOMIAL_TERMS`].
    pub coefficients: Vec<f64>,
}

impl PolynomialExpansion {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Value in waves at `(u, v)` on the unit disk.
    pub fn evaluate(&self, u: f64, v: f64) -> f64 {
        if u * u + v * v > 1.0 {
            return f64::NAN;
        }
        self.coefficients
            .iter()
            .enumerate()
            .map(|(i, &c)| c * monomial(i, u, v))
            .sum()
    }
}

/// Monomial `i` at `(x, y)`, `NaN` when `i` is out of range.
pub fn monomial(i: usize, x: f64, y: f64) -> f64 {
    match i {
        0 => 1.0,
        1 => x,
        2 => y,
        3 => x * x,
        4 => x * y,
        5 => y * y,
        6 => x * x * x,
        7 => x * x * y,
        8 => x * y * y,
        9 => y * y * y,
        10 => x * x * x * x,
        11 => x * x * x * y,
        12 => x * x * y * y,
        13 => x * y * y * y,
        14 => y * y * y * y,
        _ => f64::NAN,
    }
}

impl fmt::Display for PolynomialExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.coefficients.iter().enumerate() {
            let name = POLYNOMIAL_TERMS.get(i).copied().unwrap_or("?");
            writeln!(f, "{:<24} {:13.6e}", format!("{name}:"), c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() {
        let p = PolynomialExpansion::new(vec![1.0, 0.0, 2.0, 0.0, 3.0]);
        assert!((p.evaluate(0.5, 0.25) - (1.0 + 0.5 + 3.0 * 0.125)).abs() < 1e-12);
    }

    #[test]
    fn test_term_out_of_range_is_nan() {
        assert!(monomial(15, 0.1, 0.1).is_nan());
        let p = PolynomialExpansion::new(vec![0.0; 16]);
        assert!(p.evaluate(0.1, 0.1).is_nan());
    }
}
