use std::fmt;

/// Display names of the six Kingslake coefficients.
pub const KINGSLAKE_NAMES: [&str; 6] = [
    "A (spherical)",
    "B (coma)",
    "C (astigmatism)",
    "D (defocus)",
    "E (x-tilt)",
    "F (y-tilt)",
];

/// Classical six-term aberration polynomial.
///
/// `W = a·r⁴ + b·y·r² + c·(x² + 3y²) + d·r² + e·x + f·y`, in waves.
#[derive(Debug, Clone, PartialEq)]
pub struct KingslakeAberrations {
    pub coefficients: [f64; 6],
}

impl KingslakeAberrations {
    pub fn new(coefficients: [f64; 6]) -> Self {
        Self { coefficients }
    }

    pub fn evaluate(&self, u: f64, v: f64) -> f64 {
        let rsq = u * u + v * v;
        if rsq > 1.0 {
            return f64::NAN;
        }
        let c = &self.coefficients;
        c[0] * rsq * rsq
            + c[1] * v * rsq
            + c[2] * (u * u + 3.0 * v * v)
            + c[3] * rsq
            + c[4] * u
            + c[5] * v
    }
}

impl fmt::Display for KingslakeAberrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, c) in KINGSLAKE_NAMES.iter().zip(self.coefficients.iter()) {
            writeln!(f, "{:<24} {:13.6e}", format!("{name}:"), c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms() {
        let k = KingslakeAberrations::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((k.evaluate(0.5, 0.5) - 0.25).abs() < 1e-12);
        let k = KingslakeAberrations::new([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        assert!((k.evaluate(0.5, 0.5) - 1.0).abs() < 1e-12);
        let k = KingslakeAberrations::new([0.0, 0.0, 0.0, 0.0, 2.0, -1.0]);
        assert!((k.evaluate(0.25, 0.5) - 0.0).abs() < 1e-12);
    }
}
