//! Radial and Zernike polynomials over the unit disk.
//!
//! Radial polynomials follow Born & Wolf:
//!
//! ```text
//! R(n,m,r) = Σ_{s=0}^{(n-m)/2} (-1)^s (n-s)! / (s! ((n+m)/2-s)! ((n-m)/2-s)!) · r^(n-2s)
//! ```
//!
//! Orders up to `n = 8` are evaluated from hand-expanded polynomials in `r²`;
//! higher orders fall back to the factorial summation.
//!
//! The "optical" Zernike set orders the first 49 terms the way they are
//! usually quoted for optical testing (piston, tilts, defocus, astigmatism,
//! coma, spherical, ...). Illegal arguments give `NaN`, never a panic.

use num_complex::Complex64;

/// Angular dependence of an optical Zernike term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Angular {
    /// Radius only.
    None,
    /// Multiplied by `cos(mθ)`.
    Cos,
    /// Multiplied by `sin(mθ)`.
    Sin,
}

/// Number of optical Zernike terms supported by [`optical_zernike`].
pub const OPTICAL_ZERNIKE_TERMS: usize = 49;

/// `(n, m, angular)` for each optical Zernike index.
const OPTICAL_ZERNIKE_ORDERS: [(u32, u32, Angular); OPTICAL_ZERNIKE_TERMS] = [
    (0, 0, Angular::None),
    (1, 1, Angular::Cos),
    (1, 1, Angular::Sin),
    (2, 0, Angular::None),
    (2, 2, Angular::Cos),
    (2, 2, Angular::Sin),
    (3, 1, Angular::Cos),
    (3, 1, Angular::Sin),
    (4, 0, Angular::None),
    (3, 3, Angular::Cos),
    (3, 3, Angular::Sin),
    (4, 2, Angular::Cos),
    (4, 2, Angular::Sin),
    (5, 1, Angular::Cos),
    (5, 1, Angular::Sin),
    (6, 0, Angular::None),
    (4, 4, Angular::Cos),
    (4, 4, Angular::Sin),
    (5, 3, Angular::Cos),
    (5, 3, Angular::Sin),
    (6, 2, Angular::Cos),
    (6, 2, Angular::Sin),
    (7, 1, Angular::Cos),
    (7, 1, Angular::Sin),
    (8, 0, Angular::None),
    (5, 5, Angular::Cos),
    (5, 5, Angular::Sin),
    (6, 4, Angular::Cos),
    (6, 4, Angular::Sin),
    (7, 3, Angular::Cos),
    (7, 3, Angular::Sin),
    (8, 2, Angular::Cos),
    (8, 2, Angular::Sin),
    (9, 1, Angular::Cos),
    (9, 1, Angular::Sin),
    (10, 0, Angular::None),
    (6, 6, Angular::Cos),
    (6, 6, Angular::Sin),
    (7, 5, Angular::Cos),
    (7, 5, Angular::Sin),
    (8, 4, Angular::Cos),
    (8, 4, Angular::Sin),
    (9, 3, Angular::Cos),
    (9, 3, Angular::Sin),
    (10, 2, Angular::Cos),
    (10, 2, Angular::Sin),
    (11, 1, Angular::Cos),
    (11, 1, Angular::Sin),
    (12, 0, Angular::None),
];

/// Names of the first 36 optical Zernike terms.
pub const ZERNIKE_NAMES: [&str; 36] = [
    "Piston",
    "X-tilt",
    "Y-tilt",
    "Defocus",
    "X-astigmatism",
    "Y-astigmatism",
    "X-coma",
    "Y-coma",
    "Primary spherical",
    "X-trefoil",
    "Y-trefoil",
    "Secondary X-astigmatism",
    "Secondary Y-astigmatism",
    "Secondary X-coma",
    "Secondary Y-coma",
    "Secondary spherical",
    "X-tetrafoil",
    "Y-tetrafoil",
    "Secondary X-trefoil",
    "Secondary Y-trefoil",
    "Tertiary X-astigmatism",
    "Tertiary Y-astigmatism",
    "Tertiary X-coma",
    "Tertiary Y-coma",
    "Tertiary spherical",
    "X-pentafoil",
    "Y-pentafoil",
    "Secondary X-tetrafoil",
    "Secondary Y-tetrafoil",
    "Tertiary X-trefoil",
    "Tertiary Y-trefoil",
    "Quaternary X-astigmatism",
    "Quaternary Y-astigmatism",
    "Quaternary X-coma",
    "Quaternary Y-coma",
    "Quaternary spherical",
];

/// `true` when `(n, m, r)` is a legal argument set for a radial polynomial.
fn is_legal(n: i32, m: i32, r: f64) -> bool {
    n >= 0 && m <= n && (n - m) % 2 == 0 && r.abs() <= 1.0
}

/// Radial polynomial `R(n, |m|, r)`.
///
/// Returns `NaN` if `n < 0`, `|m| > n`, `n` and `m` differ in parity, or
/// `|r| > 1`.
pub fn radial(n: i32, m: i32, r: f64) -> f64 {
    let m = m.abs();
    if !is_legal(n, m, r) {
        return f64::NAN;
    }
    let r2 = r * r;
    match (n, m) {
        (0, _) => 1.0,
        (1, _) => r,
        (2, 0) => 2.0 * r2 - 1.0,
        (2, _) => r2,
        (3, 1) => r * (3.0 * r2 - 2.0),
        (3, _) => r * r2,
        (4, 0) => 1.0 + r2 * (6.0 * r2 - 6.0),
        (4, 2) => r2 * (4.0 * r2 - 3.0),
        (4, _) => r2 * r2,
        (5, 1) => r * (3.0 + r2 * (10.0 * r2 - 12.0)),
        (5, 3) => r2 * r * (5.0 * r2 - 4.0),
        (5, _) => r * r2 * r2,
        (6, 0) => r2 * (12.0 + r2 * (20.0 * r2 - 30.0)) - 1.0,
        (6, 2) => r2 * (6.0 + r2 * (15.0 * r2 - 20.0)),
        (6, 4) => r2 * r2 * (6.0 * r2 - 5.0),
        (6, _) => r2 * r2 * r2,
        (7, 1) => r * (r2 * (r2 * (35.0 * r2 - 60.0) + 30.0) - 4.0),
        (7, 3) => r * r2 * (r2 * (21.0 * r2 - 30.0) + 10.0),
        (7, 5) => r2 * r2 * r * (7.0 * r2 - 6.0),
        (7, _) => r * r2 * r2 * r2,
        (8, 0) => 1.0 - r2 * (20.0 - r2 * (90.0 - r2 * (140.0 - 70.0 * r2))),
        (8, 2) => r2 * (r2 * (r2 * (56.0 * r2 - 105.0) + 60.0) - 10.0),
        (8, 4) => r2 * r2 * (15.0 - r2 * (42.0 - 28.0 * r2)),
        (8, 6) => r2 * r2 * r2 * (8.0 * r2 - 7.0),
        (8, _) => r2 * r2 * r2 * r2,
        _ => factorial_sum(n, m, r),
    }
}

/// Radial polynomial from the general factorial summation, for any legal order.
///
/// Same contract as [`radial`]; mainly useful to cross-check the closed forms.
pub fn radial_factorial(n: i32, m: i32, r: f64) -> f64 {
    let m = m.abs();
    if !is_legal(n, m, r) {
        return f64::NAN;
    }
    factorial_sum(n, m, r)
}

/// Element-wise [`radial`] over a sequence of radii.
pub fn radial_many(n: i32, m: i32, r: &[f64]) -> Vec<f64> {
    r.iter().map(|&r| radial(n, m, r)).collect()
}

fn factorial(k: i32) -> f64 {
    (2..=k).fold(1.0, |acc, i| acc * i as f64)
}

fn factorial_sum(n: i32, m: i32, r: f64) -> f64 {
    (0..=(n - m) / 2)
        .map(|s| {
            let sign = if s % 2 == 0 { 1.0 } else { -1.0 };
            let top = sign * factorial(n - s);
            let bottom =
                factorial(s) * factorial((n + m) / 2 - s) * factorial((n - m) / 2 - s);
            top / bottom * r.powi(n - 2 * s)
        })
        .sum()
}

/// Complex Zernike polynomial `V(n, l, x, y) = R(n, |l|, r) · exp(i l θ)`.
///
/// Both components are `NaN` for illegal arguments or points off the unit disk.
pub fn zernike(n: i32, l: i32, x: f64, y: f64) -> Complex64 {
    let r = x.hypot(y);
    let rad = radial(n, l, r);
    if rad.is_nan() {
        Complex64::new(f64::NAN, f64::NAN)
    } else if l == 0 {
        Complex64::new(rad, 0.0)
    } else {
        let theta = l as f64 * y.atan2(x);
        Complex64::new(rad * theta.cos(), rad * theta.sin())
    }
}

/// Radial order, angular frequency and angular dependence of optical Zernike `index`.
pub fn optical_zernike_index(index: usize) -> Option<(u32, u32, Angular)> {
    OPTICAL_ZERNIKE_ORDERS.get(index).copied()
}

/// Optical Zernike term `index` (0..=48) weighted by `v` at normalised `(x, y)`.
///
/// Returns `NaN` if `x² + y² > 1` or `index > 48`, and exactly `0.0` when
/// `v == 0` without evaluating anything else.
pub fn optical_zernike(v: f64, index: usize, x: f64, y: f64) -> f64 {
    let rsq = x * x + y * y;
    if rsq > 1.0 || index >= OPTICAL_ZERNIKE_TERMS {
        return f64::NAN;
    }
    if v == 0.0 {
        return 0.0;
    }

    // Terms with no angular dependence, or with only cos θ / sin θ which
    // fold into x / y.
    match index {
        0 => return v,
        1 => return v * x,
        2 => return v * y,
        3 => return v * (2.0 * rsq - 1.0),
        6 => return v * x * (3.0 * rsq - 2.0),
        7 => return v * y * (3.0 * rsq - 2.0),
        8 => return v * (6.0 * rsq * (rsq - 1.0) + 1.0),
        13 => return v * x * (3.0 + rsq * (10.0 * rsq - 12.0)),
        14 => return v * y * (3.0 + rsq * (10.0 * rsq - 12.0)),
        15 => return v * (rsq * (12.0 + rsq * (20.0 * rsq - 30.0)) - 1.0),
        22 => return v * x * (rsq * (30.0 + rsq * (35.0 * rsq - 60.0)) - 4.0),
        23 => return v * y * (rsq * (30.0 + rsq * (35.0 * rsq - 60.0)) - 4.0),
        24 => return v * (1.0 + rsq * (-20.0 + rsq * (90.0 + rsq * (-140.0 + 70.0 * rsq)))),
        33 => return v * x * k9_1(rsq),
        34 => return v * y * k9_1(rsq),
        35 => {
            return v
                * (-1.0
                    + rsq
                        * (30.0
                            + rsq * (-210.0 + rsq * (560.0 + rsq * (-630.0 + 252.0 * rsq)))))
        }
        46 => return v * x * k11_1(rsq),
        47 => return v * y * k11_1(rsq),
        48 => {
            return v
                * (1.0
                    + rsq
                        * (-42.0
                            + rsq
                                * (420.0
                                    + rsq
                                        * (-1680.0
                                            + rsq
                                                * (3150.0
                                                    + rsq * (-2772.0 + 924.0 * rsq))))))
        }
        _ => {}
    }

    let (n, m, angular) = OPTICAL_ZERNIKE_ORDERS[index];
    let r = rsq.sqrt();
    let theta = m as f64 * y.atan2(x);
    let rad = radial(n as i32, m as i32, r);
    match angular {
        Angular::Cos => v * rad * theta.cos(),
        Angular::Sin => v * rad * theta.sin(),
        Angular::None => v * rad,
    }
}

/// `R(9,1,r) / r` as a polynomial in `r²`.
fn k9_1(rsq: f64) -> f64 {
    5.0 + rsq * (-60.0 + rsq * (210.0 + rsq * (-280.0 + 126.0 * rsq)))
}

/// `R(11,1,r) / r` as a polynomial in `r²`.
fn k11_1(rsq: f64) -> f64 {
    -6.0 + rsq * (105.0 + rsq * (-560.0 + rsq * (1260.0 + rsq * (-1260.0 + 462.0 * rsq))))
}

/// Human-readable name of optical Zernike `index`, optionally with its value.
///
/// Indices past the name table get a generated `"Zernike component {i}"` label.
pub fn optical_zernike_name(index: usize, value: Option<f64>) -> String {
    let name = match ZERNIKE_NAMES.get(index) {
        Some(name) => name.to_string(),
        None => format!("Zernike component {index}"),
    };
    match value {
        Some(v) => format!("{:<24} {:13.6e}", format!("{name}:"), v),
        None => name,
    }
}

/// One named line per coefficient.
pub fn optical_zernike_listing(values: &[f64]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| optical_zernike_name(i, Some(v)) + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal_orders(max_n: i32) -> Vec<(i32, i32)> {
        let mut orders = Vec::new();
        for n in 0..=max_n {
            for m in (n % 2..=n).step_by(2) {
                orders.push((n, m));
            }
        }
        orders
    }

    #[test]
    fn test_closed_form_matches_factorial_sum() {
        for (n, m) in legal_orders(8) {
            for k in -20..=20 {
                let r = k as f64 / 20.0;
                let fast = radial(n, m, r);
                let slow = radial_factorial(n, m, r);
                assert!(
                    (fast - slow).abs() < 1e-12,
                    "R({n},{m},{r}): closed form {fast}, summation {slow}"
                );
            }
        }
    }

    #[test]
    fn test_radial_parity() {
        for (n, m) in legal_orders(12) {
            for k in 1..=10 {
                let r = k as f64 / 10.0;
                // Every power in R(n,m,r) has the parity of n.
                let parity = if n % 2 == 0 { 1.0 } else { -1.0 };
                let pos = radial(n, m, r);
                let neg = radial(n, m, -r);
                assert!(
                    (neg - parity * pos).abs() < 1e-10,
                    "R({n},{m},±{r}): {pos} vs {neg}"
                );
            }
        }
    }

    #[test]
    fn test_radial_values() {
        assert!((radial(2, 0, 0.5) + 0.5).abs() < 1e-15);
        for k in -10..=10 {
            assert_eq!(radial(0, 0, k as f64 / 10.0), 1.0);
        }
        // Every radial polynomial is 1 at the rim.
        for (n, m) in legal_orders(12) {
            assert!((radial(n, m, 1.0) - 1.0).abs() < 1e-9, "R({n},{m},1)");
        }
        // Symmetric in m
        assert_eq!(radial(4, -2, 0.3), radial(4, 2, 0.3));
    }

    #[test]
    fn test_radial_illegal_is_nan() {
        assert!(radial(-1, 0, 0.5).is_nan());
        assert!(radial(2, 4, 0.5).is_nan());
        assert!(radial(3, 0, 0.5).is_nan());
        assert!(radial(2, 0, 1.5).is_nan());
        assert!(radial_factorial(2, 0, -1.01).is_nan());
    }

    #[test]
    fn test_radial_many() {
        let r = [0.0, 0.5, 1.0];
        let out = radial_many(2, 0, &r);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], -1.0);
        assert_eq!(out[1], -0.5);
        assert_eq!(out[2], 1.0);
        assert!(radial_many(2, 0, &[2.0])[0].is_nan());
    }

    #[test]
    fn test_optical_zernike_matches_radial_form() {
        for index in 0..OPTICAL_ZERNIKE_TERMS {
            let (n, m, angular) = optical_zernike_index(index).unwrap();
            for &(x, y) in &[(0.3, 0.4), (-0.5, 0.2), (0.1, -0.7), (-0.6, -0.6), (0.0, 1.0)] {
                let r = f64::hypot(x, y);
                let theta = m as f64 * f64::atan2(y, x);
                let rad = radial_factorial(n as i32, m as i32, r);
                let expected = match angular {
                    Angular::None => rad,
                    Angular::Cos => rad * theta.cos(),
                    Angular::Sin => rad * theta.sin(),
                };
                let got = optical_zernike(1.0, index, x, y);
                assert!(
                    (got - expected).abs() < 1e-9,
                    "Z{index} at ({x},{y}): got {got}, expected {expected}"
                );
                assert!((optical_zernike(2.5, index, x, y) - 2.5 * got).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_optical_zernike_zero_weight() {
        for index in 0..OPTICAL_ZERNIKE_TERMS {
            assert_eq!(optical_zernike(0.0, index, 0.2, -0.3), 0.0);
        }
    }

    #[test]
    fn test_optical_zernike_out_of_range() {
        assert!(optical_zernike(1.0, 3, 0.9, 0.9).is_nan());
        assert!(optical_zernike(0.0, 3, 0.9, 0.9).is_nan());
        assert!(optical_zernike(1.0, 49, 0.1, 0.1).is_nan());
    }

    #[test]
    fn test_complex_zernike() {
        let z = zernike(2, 2, 0.0, 0.5);
        // R(2,2,0.5) = 0.25, angle 2·90° = 180°
        assert!((z.re + 0.25).abs() < 1e-12);
        assert!(z.im.abs() < 1e-12);
        let z0 = zernike(2, 0, 0.5, 0.0);
        assert_eq!(z0.im, 0.0);
        assert!((z0.re + 0.5).abs() < 1e-12);
        assert!(zernike(2, 2, 1.0, 1.0).re.is_nan());
    }

    #[test]
    fn test_complex_zernike_illegal_rotationally_symmetric() {
        // Odd n with l = 0, and a point off the disk.
        for z in [zernike(3, 0, 0.2, 0.1), zernike(2, 0, 1.0, 1.0)] {
            assert!(z.re.is_nan() && z.im.is_nan(), "{z}");
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(optical_zernike_name(3, None), "Defocus");
        assert_eq!(optical_zernike_name(40, None), "Zernike component 40");
        let line = optical_zernike_name(8, Some(0.5));
        assert!(line.starts_with("Primary spherical:"));
        assert!(line.contains("5.000000e-1"));
        let listing = optical_zernike_listing(&[1.0, 2.0, 3.0]);
        assert_eq!(listing.lines().count(), 3);
        assert!(listing.lines().nth(2).unwrap().starts_with("Y-tilt:"));
    }
}
