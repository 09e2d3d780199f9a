//! Analytic wavefronts over a masked pupil.
//!
//! A [`WaveFront`] couples a pupil [`Mask`] with one of four analytic
//! aberration models, selected by [`WaveFrontKind`]. Coefficients are in
//! waves; [`WaveFront::value`] returns phase in radians.
//!
//! # Supported models
//!
//! - [`WaveFrontKind::Zernike`]: optical Zernike expansion, up to 49 terms
//! - [`WaveFrontKind::Seidel`]: the five Seidel aberrations plus defocus at a field angle
//! - [`WaveFrontKind::Polynomial`]: power series in `x`, `y` up to fourth order
//! - [`WaveFrontKind::Kingslake`]: six-term classical aberration polynomial
//!
//! Evaluation outside the mask yields `NaN`, so rasterised images and
//! integrals can skip undefined cells.

pub mod diffraction;
pub mod expansion;
pub mod file;
pub mod interferometer;
pub mod kingslake;
pub mod polynomial;
pub mod seidel;

use std::f64::consts::TAU;
use std::fmt;

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::mask::Mask;

pub use diffraction::{ideal_otf, psf_sections, Otf, OtfAxis};
pub use expansion::ZernikeExpansion;
pub use interferometer::Interferometer;
pub use kingslake::KingslakeAberrations;
pub use polynomial::PolynomialExpansion;
pub use seidel::SeidelAberrations;

/// Aberration model carried by a [`WaveFront`].
#[derive(Debug, Clone, PartialEq)]
pub enum WaveFrontKind {
    Zernike(ZernikeExpansion),
    Seidel(SeidelAberrations),
    Polynomial(PolynomialExpansion),
    Kingslake(KingslakeAberrations),
}

impl WaveFrontKind {
    /// Model value in waves at normalised pupil coordinates.
    pub fn evaluate(&self, u: f64, v: f64) -> f64 {
        match self {
            WaveFrontKind::Zernike(z) => z.evaluate(u, v),
            WaveFrontKind::Seidel(s) => s.evaluate(u, v),
            WaveFrontKind::Polynomial(p) => p.evaluate(u, v),
            WaveFrontKind::Kingslake(k) => k.evaluate(u, v),
        }
    }

    /// Coefficients in storage order.
    pub fn coefficients(&self) -> &[f64] {
        match self {
            WaveFrontKind::Zernike(z) => &z.coefficients,
            WaveFrontKind::Seidel(s) => &s.coefficients,
            WaveFrontKind::Polynomial(p) => &p.coefficients,
            WaveFrontKind::Kingslake(k) => &k.coefficients,
        }
    }

    /// Tag used by the wavefront text format.
    pub fn tag(&self) -> &'static str {
        match self {
            WaveFrontKind::Zernike(_) => "zernike",
            WaveFrontKind::Seidel(_) => "seidel",
            WaveFrontKind::Polynomial(_) => "poly",
            WaveFrontKind::Kingslake(_) => "kingslake",
        }
    }
}

impl fmt::Display for WaveFrontKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveFrontKind::Zernike(z) => z.fmt(f),
            WaveFrontKind::Seidel(s) => s.fmt(f),
            WaveFrontKind::Polynomial(p) => p.fmt(f),
            WaveFrontKind::Kingslake(k) => k.fmt(f),
        }
    }
}

/// Analytic wavefront over a circular or annular pupil.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveFront {
    radius: f64,
    mask: Mask,
    kind: WaveFrontKind,
}

/// Horizontal and vertical cuts through the centre of a wavefront.
#[derive(Debug, Clone)]
pub struct Sections {
    /// Sample positions along each cut (mm).
    pub position: Vec<f64>,
    /// Phase along `y = 0`.
    pub horizontal: Vec<f64>,
    /// Phase along `x = 0`.
    pub vertical: Vec<f64>,
}

impl WaveFront {
    /// Wavefront of `radius` over a full circular pupil.
    pub fn new(radius: f64, kind: WaveFrontKind) -> Self {
        Self {
            radius,
            mask: Mask::circular(radius),
            kind,
        }
    }

    /// Wavefront over an explicit mask; the radius is taken from the mask.
    pub fn with_mask(mask: Mask, kind: WaveFrontKind) -> Self {
        Self {
            radius: mask.radius(),
            mask,
            kind,
        }
    }

    pub fn zernike(radius: f64, coefficients: Vec<f64>) -> Self {
        Self::new(radius, WaveFrontKind::Zernike(ZernikeExpansion::new(coefficients)))
    }

    pub fn seidel(radius: f64, coefficients: [f64; 6], field_angle: f64) -> Self {
        Self::new(
            radius,
            WaveFrontKind::Seidel(SeidelAberrations::new(coefficients, field_angle)),
        )
    }

    pub fn polynomial(radius: f64, coefficients: Vec<f64>) -> Self {
        Self::new(
            radius,
            WaveFrontKind::Polynomial(PolynomialExpansion::new(coefficients)),
        )
    }

    pub fn kingslake(radius: f64, coefficients: [f64; 6]) -> Self {
        Self::new(
            radius,
            WaveFrontKind::Kingslake(KingslakeAberrations::new(coefficients)),
        )
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn kind(&self) -> &WaveFrontKind {
        &self.kind
    }

    pub fn coefficients(&self) -> &[f64] {
        self.kind.coefficients()
    }

    /// Phase in radians at `(x, y)` in pupil coordinates (mm).
    ///
    /// `NaN` outside the mask.
    pub fn value(&self, x: f64, y: f64) -> f64 {
        if !self.mask.inside(x, y) {
            return f64::NAN;
        }
        let (u, v) = normalise(x, y, self.radius);
        TAU * self.kind.evaluate(u, v)
    }

    /// `exp(i·phase)` at `(x, y)`, with both components `NaN` outside the mask.
    pub fn complex_field(&self, x: f64, y: f64) -> Complex64 {
        let phase = self.value(x, y);
        if phase.is_nan() {
            Complex64::new(f64::NAN, f64::NAN)
        } else {
            Complex64::new(phase.cos(), phase.sin())
        }
    }

    /// Phase sampled on a `size × size` grid spanning the pupil.
    ///
    /// Row index runs along `x`, column index along `y`; cells outside the
    /// mask are `NaN`.
    pub fn image(&self, size: usize) -> DMatrix<f64> {
        let centre = (size / 2).max(1) as f64;
        let scale = self.radius / centre;
        DMatrix::from_fn(size, size, |i, j| {
            let x = (i as f64 - centre) * scale;
            let y = (j as f64 - centre) * scale;
            self.value(x, y)
        })
    }

    /// Phase profiles along both axes with `samples` points across the diameter.
    pub fn sections(&self, samples: usize) -> Sections {
        let position = linspace(-self.radius, self.radius, samples);
        let horizontal = position.iter().map(|&p| self.value(p, 0.0)).collect();
        let vertical = position.iter().map(|&p| self.value(0.0, p)).collect();
        Sections {
            position,
            horizontal,
            vertical,
        }
    }
}

impl fmt::Display for WaveFront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} wavefront r: {:5.3}", self.kind.tag(), self.radius)?;
        write!(f, "{}", self.kind)
    }
}

/// Pupil point scaled to the unit disk.
///
/// Points that land just outside the unit circle through rounding (rim
/// samples at exactly `radius`) are pulled back onto it.
pub(crate) fn normalise(x: f64, y: f64, radius: f64) -> (f64, f64) {
    const RIM: f64 = 1.0 - 4.0 * f64::EPSILON;
    let u = x / radius;
    let v = y / radius;
    let rsq = u * u + v * v;
    if rsq > 1.0 && rsq < 1.0 + 1e-9 {
        let scale = RIM / rsq.sqrt();
        (u * scale, v * scale)
    } else {
        (u, v)
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}
