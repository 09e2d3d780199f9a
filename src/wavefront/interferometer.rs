use std::f64::consts::TAU;

use nalgebra::DMatrix;

use super::WaveFront;

/// Twyman-Green interferogram synthesis with reference-beam tilt.
///
/// Tilts are in fringes across the pupil radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interferometer {
    pub xtilt: f64,
    pub ytilt: f64,
}

impl Default for Interferometer {
    fn default() -> Self {
        Self {
            xtilt: 3.0,
            ytilt: 0.0,
        }
    }
}

impl Interferometer {
    pub fn new(xtilt: f64, ytilt: f64) -> Self {
        Self { xtilt, ytilt }
    }

    /// Fringe intensity `1 + cos(2π(x·xtilt + y·ytilt) + φ)` for a phase grid.
    ///
    /// Grid coordinates are normalised to `[-1, 1)` about the centre cell;
    /// undefined phase cells give zero intensity.
    pub fn fringes(&self, phase: &DMatrix<f64>) -> DMatrix<f64> {
        let (rows, cols) = phase.shape();
        let xc = (rows as f64 / 2.0).max(0.5);
        let yc = (cols as f64 / 2.0).max(0.5);
        DMatrix::from_fn(rows, cols, |i, j| {
            let p = phase[(i, j)];
            if p.is_finite() {
                let x = (i as f64 - xc) / xc;
                let y = (j as f64 - yc) / yc;
                1.0 + (TAU * (x * self.xtilt + y * self.ytilt) + p).cos()
            } else {
                0.0
            }
        })
    }

    /// Interferogram of `wavefront` rasterised on a `size × size` grid.
    pub fn interferogram(&self, wavefront: &WaveFront, size: usize) -> DMatrix<f64> {
        self.fringes(&wavefront.image(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untilted_flat_wavefront_is_bright() {
        let wf = WaveFront::zernike(1.0, vec![0.0]);
        let im = Interferometer::new(0.0, 0.0).interferogram(&wf, 8);
        assert_eq!(im[(4, 4)], 2.0);
        assert_eq!(im[(0, 0)], 0.0);
    }

    #[test]
    fn test_half_wave_gives_dark_fringe() {
        let phase = DMatrix::from_element(4, 4, std::f64::consts::PI);
        let im = Interferometer::new(0.0, 0.0).fringes(&phase);
        assert!(im.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_tilt_fringe_count() {
        let phase = DMatrix::from_element(40, 1, 0.0);
        let im = Interferometer::default().fringes(&phase);
        // Three fringes across the radius: bright at x = 0, ±1/3, ±2/3.
        assert!((im[(20, 0)] - 2.0).abs() < 1e-12);
        assert!(im[(23, 0)] < 0.1);
    }
}
