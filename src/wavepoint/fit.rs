//! Least-squares fitting of analytic wavefronts to wave points.
//!
//! The set is zero-meaned, converted to phase, and fitted with a
//! Levenberg-Marquardt solver starting from all-zero coefficients. Every
//! supported model is linear in its coefficients, but the solver only sees
//! a black-box model function, so the same code serves any evaluator.

use std::f64::consts::TAU;

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::wavefront::expansion::zernike_sum;
use crate::wavefront::seidel::seidel_sum;
use crate::wavefront::{normalise, WaveFront};

use super::WavePointSet;

/// Configuration for wavefront fitting.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Maximum Levenberg-Marquardt iterations. Default 100.
    pub max_iterations: u32,
    /// Relative reduction of the squared residual below which the fit is
    /// considered converged. Default 1e-12.
    pub tolerance: f64,
    /// Initial damping factor. Default 1e-3.
    pub initial_damping: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-12,
            initial_damping: 1e-3,
        }
    }
}

/// Result of a wavefront fit.
#[derive(Debug, Clone)]
pub struct WaveFrontFitResult {
    /// The fitted wavefront, with radius equal to the set's maximum radius.
    pub model: WaveFront,
    /// One-sigma uncertainty of each coefficient, in waves. `NaN` when the
    /// fit has no spare degrees of freedom or the normal matrix is singular.
    pub standard_errors: Vec<f64>,
    /// RMS phase residual in radians.
    pub rms_residual: f64,
    /// Solver iterations performed.
    pub iterations: u32,
    /// `false` if the iteration budget ran out first or the residual was
    /// not finite.
    pub converged: bool,
}

/// Number of Zernike terms fitted for `order`: 4 → 9, 6 → 16, 8 → 25.
pub fn zernike_fit_terms(order: u32) -> Result<usize> {
    match order {
        4 | 6 | 8 => {
            let k = order as usize / 2 + 1;
            Ok(k * k)
        }
        _ => Err(Error::UnsupportedFitOrder(order)),
    }
}

impl WavePointSet {
    /// Fit a Zernike wavefront of `order` 4, 6 or 8 with default settings.
    pub fn fit_zernike(&mut self, order: u32) -> Result<WaveFrontFitResult> {
        self.fit_zernike_with(order, &FitConfig::default())
    }

    /// Fit a Zernike wavefront of `order` 4, 6 or 8.
    ///
    /// Zero-means the set's path lengths before fitting.
    pub fn fit_zernike_with(&mut self, order: u32, config: &FitConfig) -> Result<WaveFrontFitResult> {
        let terms = zernike_fit_terms(order)?;
        self.check_points(terms)?;

        let (positions, observed) = self.prepare();
        let solution = levenberg_marquardt(
            &positions,
            &observed,
            terms,
            |c, u, v| TAU * zernike_sum(c, u, v),
            config,
        );
        debug!(
            "Zernike order {} fit: {} points, {} iterations, rms {:.3e} rad",
            order,
            observed.len(),
            solution.iterations,
            solution.rms
        );
        let model = WaveFront::zernike(self.max_radius, solution.params.as_slice().to_vec());
        Ok(solution.into_result(model))
    }

    /// Fit Seidel aberrations at a fixed `field_angle` with default settings.
    pub fn fit_seidel(&mut self, field_angle: f64) -> Result<WaveFrontFitResult> {
        self.fit_seidel_with(field_angle, &FitConfig::default())
    }

    /// Fit the six Seidel coefficients, holding `field_angle` fixed.
    ///
    /// At a single field angle defocus and field curvature both scale with
    /// `r²`, so only their combination is determined and their standard
    /// errors are not meaningful. On axis the field-dependent coefficients
    /// stay at zero and all standard errors are `NaN`.
    pub fn fit_seidel_with(
        &mut self,
        field_angle: f64,
        config: &FitConfig,
    ) -> Result<WaveFrontFitResult> {
        const TERMS: usize = 6;
        self.check_points(TERMS)?;

        let (positions, observed) = self.prepare();
        let solution = levenberg_marquardt(
            &positions,
            &observed,
            TERMS,
            |c, u, v| TAU * seidel_sum(c, field_angle, u, v),
            config,
        );
        debug!(
            "Seidel fit at field {:.4}: {} points, {} iterations, rms {:.3e} rad",
            field_angle,
            observed.len(),
            solution.iterations,
            solution.rms
        );
        let mut coefficients = [0.0; TERMS];
        coefficients.copy_from_slice(solution.params.as_slice());
        let model = WaveFront::seidel(self.max_radius, coefficients, field_angle);
        Ok(solution.into_result(model))
    }

    /// Points with a non-finite path (outside a model's mask, say) are not
    /// fitted, so only finite ones count.
    fn check_points(&self, parameters: usize) -> Result<()> {
        let points = self.finite_len();
        if points < parameters {
            return Err(Error::TooFewPoints { points, parameters });
        }
        Ok(())
    }

    /// Zero-mean the set, then return normalised positions and phases of
    /// the points with a finite path.
    fn prepare(&mut self) -> (Vec<(f64, f64)>, DVector<f64>) {
        self.zero_mean();
        let (positions, phases): (Vec<_>, Vec<_>) = self
            .iter()
            .filter(|p| p.path_length.is_finite())
            .map(|p| {
                (
                    normalise(p.position.x, p.position.y, self.max_radius),
                    p.phase(),
                )
            })
            .unzip();
        (positions, DVector::from_vec(phases))
    }
}

// ── Levenberg-Marquardt core ────────────────────────────────────────────────

struct Solution {
    params: DVector<f64>,
    standard_errors: Vec<f64>,
    rms: f64,
    iterations: u32,
    converged: bool,
}

impl Solution {
    fn into_result(self, model: WaveFront) -> WaveFrontFitResult {
        WaveFrontFitResult {
            model,
            standard_errors: self.standard_errors,
            rms_residual: self.rms,
            iterations: self.iterations,
            converged: self.converged,
        }
    }
}

/// Damping beyond which no step can reduce the residual any further.
const MAX_DAMPING: f64 = 1e16;

fn levenberg_marquardt<F>(
    positions: &[(f64, f64)],
    observed: &DVector<f64>,
    n_params: usize,
    model: F,
    config: &FitConfig,
) -> Solution
where
    F: Fn(&[f64], f64, f64) -> f64,
{
    let n = observed.len();
    let evaluate = |params: &DVector<f64>| -> DVector<f64> {
        DVector::from_iterator(
            n,
            positions
                .iter()
                .map(|&(u, v)| model(params.as_slice(), u, v)),
        )
    };
    let jacobian = |params: &DVector<f64>| -> DMatrix<f64> {
        let mut jac = DMatrix::zeros(n, n_params);
        let mut probe = params.clone();
        for j in 0..n_params {
            let h = 1e-6 * params[j].abs().max(1.0);
            probe[j] = params[j] + h;
            let plus = evaluate(&probe);
            probe[j] = params[j] - h;
            let minus = evaluate(&probe);
            probe[j] = params[j];
            jac.set_column(j, &((plus - minus) / (2.0 * h)));
        }
        jac
    };

    let mut params = DVector::zeros(n_params);
    let mut residual = observed - evaluate(&params);
    let mut ssr = residual.norm_squared();
    let mut jac = jacobian(&params);
    let mut damping = config.initial_damping;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        if !ssr.is_finite() {
            warn!("Non-finite residual, abandoning fit after {} iterations", iterations);
            break;
        }
        if ssr == 0.0 {
            converged = true;
            break;
        }
        iterations += 1;

        let jt = jac.transpose();
        let jtj = &jt * &jac;
        let jtr = &jt * &residual;
        let mut normal = jtj.clone();
        for k in 0..n_params {
            normal[(k, k)] += damping * jtj[(k, k)].max(f64::EPSILON);
        }
        let step = match solve(normal, &jtr) {
            Some(step) => step,
            None => break,
        };

        let trial = &params + &step;
        let trial_residual = observed - evaluate(&trial);
        let trial_ssr = trial_residual.norm_squared();

        if trial_ssr < ssr {
            let reduction = (ssr - trial_ssr) / ssr;
            params = trial;
            residual = trial_residual;
            ssr = trial_ssr;
            jac = jacobian(&params);
            damping = (damping / 10.0).max(f64::EPSILON);
            if reduction < config.tolerance
                || step.norm() <= config.tolerance * (params.norm() + config.tolerance)
            {
                converged = true;
                break;
            }
        } else {
            damping *= 10.0;
            if damping > MAX_DAMPING {
                converged = true;
                break;
            }
        }
    }

    let standard_errors = standard_errors(&jac, ssr, n, n_params);
    Solution {
        params,
        standard_errors,
        rms: (ssr / n.max(1) as f64).sqrt(),
        iterations,
        converged,
    }
}

/// Solve `a·x = b`, falling back to SVD when `a` is not positive definite.
fn solve(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = a.clone().cholesky() {
        return Some(chol.solve(b));
    }
    a.svd(true, true).solve(b, 1e-14).ok()
}

/// `sqrt(diag((JᵀJ)⁻¹)·SSR/(n − p))`, or `NaN` where undefined.
fn standard_errors(jac: &DMatrix<f64>, ssr: f64, n: usize, p: usize) -> Vec<f64> {
    if n <= p {
        return vec![f64::NAN; p];
    }
    let variance = ssr / (n - p) as f64;
    let jtj = jac.transpose() * jac;
    match jtj.cholesky().map(|c| c.inverse()) {
        Some(cov) => (0..p).map(|k| (cov[(k, k)] * variance).sqrt()).collect(),
        None => vec![f64::NAN; p],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavepoint::WavePoint;
    use crate::Vector2;

    #[test]
    fn test_terms_per_order() {
        assert_eq!(zernike_fit_terms(4), Ok(9));
        assert_eq!(zernike_fit_terms(6), Ok(16));
        assert_eq!(zernike_fit_terms(8), Ok(25));
        assert_eq!(zernike_fit_terms(5), Err(Error::UnsupportedFitOrder(5)));
    }

    #[test]
    fn test_unsupported_order_leaves_set_untouched() {
        let mut set = WavePointSet::grid(1.0, 5, 0.55);
        for p in set.points.iter_mut() {
            p.path_length = 1.0;
        }
        let before = set.clone();
        assert_eq!(
            set.fit_zernike(5).unwrap_err(),
            Error::UnsupportedFitOrder(5)
        );
        assert_eq!(set, before);
    }

    #[test]
    fn test_too_few_points() {
        let mut set = WavePointSet::new();
        for k in 0..5 {
            set.add(WavePoint::new(Vector2::new(0.1 * k as f64, 0.0), 0.0, 0.55));
        }
        assert_eq!(
            set.fit_zernike(4).unwrap_err(),
            Error::TooFewPoints {
                points: 5,
                parameters: 9
            }
        );
        assert!(matches!(
            set.fit_seidel(0.1),
            Err(Error::TooFewPoints { parameters: 6, .. })
        ));
    }

    #[test]
    fn test_exact_zernike_recovery() {
        let truth = vec![0.0, 0.12, -0.05, 0.3, 0.02, -0.07, 0.04, 0.01, -0.15];
        let wf = WaveFront::zernike(4.0, truth.clone());
        let mut set = WavePointSet::grid(4.0, 15, 0.633);
        set.set_with_wavefront(&wf);

        let result = set.fit_zernike(4).unwrap();
        assert!(result.converged);
        assert_eq!(result.model.radius(), 4.0);
        // Piston is absorbed by zero-meaning; compare the shape terms.
        for (k, (a, b)) in result.model.coefficients().iter().zip(truth.iter()).enumerate().skip(1) {
            assert!((a - b).abs() < 1e-6, "term {k}: {a} vs {b}");
        }
        assert!(result.rms_residual < 1e-8);
        assert!(result.standard_errors.iter().all(|s| s.is_finite() && *s < 1e-6));
    }

    #[test]
    fn test_non_finite_points_are_not_fitted() {
        let truth = vec![0.0, 0.12, -0.05, 0.3, 0.02, -0.07, 0.04, 0.01, -0.15];
        let wf = WaveFront::zernike(4.0, truth.clone());
        let mut set = WavePointSet::grid(4.0, 15, 0.633);
        set.set_with_wavefront(&wf);

        // On the rim by `norm()` but just outside the mask by `x² + y²`.
        let mut rim = WavePoint::new(Vector2::new(4.0, 6e-8), 0.0, 0.633);
        assert!(rim.position.norm() <= 4.0);
        rim.set_with_wavefront(&wf);
        assert!(rim.path_length.is_nan());
        set.add(rim);
        set.add(WavePoint::new(Vector2::new(1.0, 1.0), f64::NAN, 0.633));

        let result = set.fit_zernike(4).unwrap();
        assert!(result.converged);
        assert!(result.rms_residual.is_finite() && result.rms_residual < 1e-8);
        for (k, (a, b)) in result.model.coefficients().iter().zip(truth.iter()).enumerate().skip(1) {
            assert!((a - b).abs() < 1e-6, "term {k}: {a} vs {b}");
        }
    }

    #[test]
    fn test_only_non_finite_points() {
        let mut set = WavePointSet::new();
        for k in 0..12 {
            set.add(WavePoint::new(Vector2::new(0.1 * k as f64, 0.0), f64::NAN, 0.55));
        }
        assert_eq!(
            set.fit_zernike(4).unwrap_err(),
            Error::TooFewPoints {
                points: 0,
                parameters: 9
            }
        );
    }

    #[test]
    fn test_seidel_odd_terms_recovered() {
        let truth = [0.4, -0.3, 0.25, 0.1, -0.2, 0.05];
        let theta = 0.3;
        let wf = WaveFront::seidel(2.0, truth, theta);
        let mut set = WavePointSet::grid(2.0, 17, 0.55);
        set.set_with_wavefront(&wf);
        let data_rms = {
            let phases = set.phase_values();
            (phases.iter().map(|p| p * p).sum::<f64>() / phases.len() as f64).sqrt()
        };

        let result = set.fit_seidel(theta).unwrap();
        // Coma and distortion are odd in y and unaffected by zero-meaning.
        let c = result.model.coefficients();
        assert!((c[2] - truth[2]).abs() < 1e-6, "coma {}", c[2]);
        assert!((c[5] - truth[5]).abs() < 1e-6, "distortion {}", c[5]);
        assert!(result.rms_residual < data_rms);
        assert_eq!(result.model.radius(), 2.0);
    }

    #[test]
    fn test_seidel_on_axis() {
        let wf = WaveFront::seidel(1.0, [0.5, 0.2, 0.0, 0.0, 0.0, 0.0], 0.0);
        let mut set = WavePointSet::grid(1.0, 13, 0.55);
        set.set_with_wavefront(&wf);
        let result = set.fit_seidel(0.0).unwrap();
        let c = result.model.coefficients();
        assert!(c[2..].iter().all(|&v| v == 0.0));
        assert!(result.standard_errors.iter().all(|s| s.is_nan()));
    }
}
