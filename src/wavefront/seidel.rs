use std::fmt;

/// Display names of the six Seidel coefficients, in storage order.
pub const SEIDEL_NAMES: [&str; 6] = [
    "Defocus",
    "Spherical Aberration",
    "Coma",
    "Astigmatism",
    "Field Curvature",
    "Distortion",
];

/// Seidel aberrations at a fixed field angle.
///
/// Coefficients are in waves, stored as
/// `[defocus, spherical, coma, astigmatism, field curvature, distortion]`;
/// the field angle is in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct SeidelAberrations {
    pub coefficients: [f64; 6],
    pub field_angle: f64,
}

impl SeidelAberrations {
    pub fn new(coefficients: [f64; 6], field_angle: f64) -> Self {
        Self {
            coefficients,
            field_angle,
        }
    }

    /// Value in waves at `(u, v)` on the unit disk.
    pub fn evaluate(&self, u: f64, v: f64) -> f64 {
        seidel_sum(&self.coefficients, self.field_angle, u, v)
    }
}

/// Seidel polynomial for a coefficient slice of length six.
pub(crate) fn seidel_sum(c: &[f64], theta: f64, u: f64, v: f64) -> f64 {
    let rsq = u * u + v * v;
    if rsq > 1.0 {
        return f64::NAN;
    }
    0.5 * c[0] * rsq
        + 0.125 * c[1] * rsq * rsq
        + 0.5 * c[2] * v * rsq * theta
        + 0.5 * c[3] * v * v * theta * theta
        + 0.25 * (c[3] + c[4]) * rsq * theta * theta
        + 0.5 * c[5] * v * theta * theta * theta
}

impl fmt::Display for SeidelAberrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, c) in SEIDEL_NAMES.iter().zip(self.coefficients.iter()) {
            writeln!(f, "{:<24} {:13.6e}", format!("{name}:"), c)?;
        }
        writeln!(f, "{:<24} {:13.6e}", "Field Angle:", self.field_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_axis_only_defocus_and_spherical() {
        let s = SeidelAberrations::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 0.0);
        let (u, v) = (0.6, 0.0);
        let rsq: f64 = 0.36;
        assert!((s.evaluate(u, v) - (0.5 * rsq + 0.25 * rsq * rsq)).abs() < 1e-12);
    }

    #[test]
    fn test_field_terms() {
        let theta = 0.2;
        let s = SeidelAberrations::new([0.0, 0.0, 1.0, 0.0, 0.0, 0.0], theta);
        // Coma: 0.5·v·r²·θ
        assert!((s.evaluate(0.0, 0.5) - 0.5 * 0.5 * 0.25 * theta).abs() < 1e-12);
        let s = SeidelAberrations::new([0.0, 0.0, 0.0, 0.0, 0.0, 1.0], theta);
        assert!((s.evaluate(0.3, 0.5) - 0.5 * 0.5 * theta.powi(3)).abs() < 1e-12);
        assert!(s.evaluate(0.9, 0.9).is_nan());
    }
}
