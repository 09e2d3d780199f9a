//! Diffraction PSF and OTF of a wavefront.
//!
//! The PSF is the magnitude of the 2D discrete Fourier transform of the
//! complex pupil field, recentred so zero frequency sits at the grid centre.
//! The OTF is computed by direct real-space integration of the pupil
//! autocorrelation along one axis, which is slow but has no sampling
//! subtleties beyond the integration grid.

use std::f64::consts::FRAC_2_PI;

use nalgebra::DMatrix;
use num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::debug;

use super::{linspace, WaveFront};

/// Direction of the shift used for the OTF integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtfAxis {
    /// Shift along `x`.
    Horizontal,
    /// Shift along `y`.
    Vertical,
}

/// Sampled optical transfer function.
#[derive(Debug, Clone)]
pub struct Otf {
    /// Pupil shift in mm, from 0 to the pupil diameter.
    pub shift: Vec<f64>,
    /// Normalised OTF value, 1 at zero shift.
    pub value: Vec<f64>,
}

impl WaveFront {
    /// Diffraction PSF on a `size × size` grid.
    ///
    /// Cells outside the pupil contribute zero field. With `log_compress`
    /// each magnitude `m` is replaced by `ln(1 + m)`.
    pub fn psf(&self, size: usize, log_compress: bool) -> DMatrix<f64> {
        let mut field = self.image(size).map(|phase| {
            if phase.is_nan() {
                Complex64::new(0.0, 0.0)
            } else {
                Complex64::from_polar(1.0, phase)
            }
        });
        fft2(&mut field);
        let magnitude = fftshift(&field).map(|c| c.norm());
        if log_compress {
            magnitude.map(f64::ln_1p)
        } else {
            magnitude
        }
    }

    /// OTF along `axis` at `size` shifts spanning `[0, 2·radius]`.
    ///
    /// Each value integrates `cos(φ(p) − φ(p + s))` over a
    /// `grid_samples × grid_samples` grid across the pupil, counting only
    /// points where both phases are defined. A pupil with no defined points
    /// yields `NaN` throughout.
    pub fn otf(&self, size: usize, axis: OtfAxis, grid_samples: usize) -> Otf {
        let shift = linspace(0.0, 2.0 * self.radius, size);
        let grid = linspace(-self.radius, self.radius, grid_samples);

        let mut value: Vec<f64> = shift
            .iter()
            .map(|&s| {
                let (dx, dy) = match axis {
                    OtfAxis::Horizontal => (s, 0.0),
                    OtfAxis::Vertical => (0.0, s),
                };
                let mut sum = 0.0;
                for &x in &grid {
                    for &y in &grid {
                        let a = self.value(x, y);
                        let b = self.value(x + dx, y + dy);
                        if a.is_finite() && b.is_finite() {
                            sum += (a - b).cos();
                        }
                    }
                }
                sum
            })
            .collect();

        let norm = value.first().copied().unwrap_or(f64::NAN);
        for v in value.iter_mut() {
            *v /= norm;
        }
        debug!(
            "OTF over {} shifts with {}² integration grid, norm {}",
            size, grid_samples, norm
        );
        Otf { shift, value }
    }

    /// Diffraction-limited OTF sampled at the same shifts as [`WaveFront::otf`].
    pub fn ideal_otf(&self, size: usize) -> Otf {
        let s_max = 2.0 * self.radius;
        let shift = linspace(0.0, s_max, size);
        let value = shift.iter().map(|&s| ideal_otf(s, s_max)).collect();
        Otf { shift, value }
    }
}

/// OTF of an unaberrated circular pupil of diameter `s_max` at shift `s`.
///
/// Zero for `s ≥ s_max`.
pub fn ideal_otf(s: f64, s_max: f64) -> f64 {
    let t = (s / s_max).abs();
    if t.is_nan() {
        return f64::NAN;
    }
    if t >= 1.0 {
        return 0.0;
    }
    FRAC_2_PI * (t.acos() - t * (1.0 - t * t).sqrt())
}

/// Horizontal (`x`, varying row index) and vertical (`y`, varying column
/// index) cuts through the centre of a PSF grid.
pub fn psf_sections(psf: &DMatrix<f64>) -> (Vec<f64>, Vec<f64>) {
    let (rows, cols) = psf.shape();
    if rows == 0 || cols == 0 {
        return (Vec::new(), Vec::new());
    }
    let horizontal = psf.column(cols / 2).iter().copied().collect();
    let vertical = psf.row(rows / 2).iter().copied().collect();
    (horizontal, vertical)
}

/// In-place forward 2D FFT: columns first (contiguous in column-major
/// storage), then rows through a gather buffer.
pub fn fft2(data: &mut DMatrix<Complex64>) {
    let (rows, cols) = data.shape();
    if rows == 0 || cols == 0 {
        return;
    }
    let mut planner = FftPlanner::<f64>::new();

    let column_fft = planner.plan_fft_forward(rows);
    for column in data.as_mut_slice().chunks_exact_mut(rows) {
        column_fft.process(column);
    }

    let row_fft = planner.plan_fft_forward(cols);
    let mut buffer = vec![Complex64::new(0.0, 0.0); cols];
    for i in 0..rows {
        for (j, b) in buffer.iter_mut().enumerate() {
            *b = data[(i, j)];
        }
        row_fft.process(&mut buffer);
        for (j, b) in buffer.iter().enumerate() {
            data[(i, j)] = *b;
        }
    }
}

/// Move the zero-frequency cell to `(rows / 2, cols / 2)`.
pub fn fftshift<T: nalgebra::Scalar + Copy>(data: &DMatrix<T>) -> DMatrix<T> {
    let (rows, cols) = data.shape();
    DMatrix::from_fn(rows, cols, |i, j| {
        data[((i + rows - rows / 2) % rows, (j + cols - cols / 2) % cols)]
    })
}
