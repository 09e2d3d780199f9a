//! Axial search for the plane of smallest geometric PSF.
//!
//! A discrete hill-climb along the optical axis: keep stepping while the
//! spot area shrinks, reverse once when it grows, and only shrink the step
//! after a reversal has also failed. The search stops on the first accepted
//! move whose step is shorter than the wavelength.

use tracing::{debug, warn};

use crate::ray::{OpticalPlane, Ray};

use super::Psf;

/// Millimetres per micron.
const MM_PER_MICRON: f64 = 1.0e-3;

/// Configuration for the optimal-area search.
#[derive(Debug, Clone)]
pub struct OptimalAreaConfig {
    /// First axial step in mm; negative moves towards `-z`. Default -0.25.
    ///
    /// An absolute length, not scaled by the wavelength. A step of a
    /// quarter wavelength would already be below the stopping length, so
    /// the first accepted move would end the search.
    pub initial_step_mm: f64,
    /// Step multiplier applied after a failed reversal. Default 0.25.
    pub shrink_factor: f64,
    /// Maximum number of trial planes evaluated. Default 500.
    pub max_iterations: u32,
}

impl Default for OptimalAreaConfig {
    fn default() -> Self {
        Self {
            initial_step_mm: -0.25,
            shrink_factor: 0.25,
            max_iterations: 500,
        }
    }
}

/// Result of the optimal-area search.
#[derive(Debug, Clone)]
pub struct OptimalAreaResult {
    /// PSF in the best plane found.
    pub psf: Psf,
    /// The best plane found.
    pub plane: OpticalPlane,
    /// Trial planes evaluated.
    pub iterations: u32,
    /// `false` if the iteration budget ran out before the step fell below
    /// the wavelength.
    pub converged: bool,
}

/// What happened on the previous trial step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    /// The last trial was accepted, or the search has just started.
    Improving,
    /// The last failure flipped the step direction.
    Reversed,
    /// The last failure shrank the step.
    Shrinking,
}

/// Plane near `initial` that minimises the geometric PSF area of `pencil`.
///
/// `None` when the pencil has no valid rays.
pub fn optimal_area<R: Ray>(
    pencil: &[R],
    initial: &OpticalPlane,
    config: &OptimalAreaConfig,
) -> Option<OptimalAreaResult> {
    let wavelength = pencil.iter().find(|r| r.is_valid())?.wavelength();
    minimise_area(initial, wavelength * MM_PER_MICRON, config, |plane| {
        Psf::from_rays(pencil, plane)
    })
}

impl Psf {
    /// PSF in the plane of smallest area near `initial`, with default settings.
    pub fn optimal_area<R: Ray>(pencil: &[R], initial: &OpticalPlane) -> Option<Psf> {
        optimal_area(pencil, initial, &OptimalAreaConfig::default()).map(|r| r.psf)
    }
}

/// Search driver over an arbitrary plane-to-PSF evaluator.
///
/// `wavelength_mm` sets the termination step length.
pub fn minimise_area<F>(
    initial: &OpticalPlane,
    wavelength_mm: f64,
    config: &OptimalAreaConfig,
    mut evaluate: F,
) -> Option<OptimalAreaResult>
where
    F: FnMut(&OpticalPlane) -> Option<Psf>,
{
    let mut plane = *initial;
    let mut best = evaluate(&plane)?;
    let mut area = best.area();
    let mut delta = config.initial_step_mm;
    let mut state = SearchState::Improving;
    let mut iterations = 0;

    for iteration in 1..=config.max_iterations {
        iterations = iteration;
        let trial_plane = plane.shifted(delta);
        let trial = evaluate(&trial_plane)?;
        let trial_area = trial.area();

        if trial_area < area {
            plane = trial_plane;
            best = trial;
            area = trial_area;
            state = SearchState::Improving;
            debug!(
                "Optimal area: accepted z = {:.6} mm, area {:.4e} mm², step {:.3e}",
                plane.z(),
                area,
                delta
            );
            if delta.abs() < wavelength_mm {
                return Some(OptimalAreaResult {
                    psf: best,
                    plane,
                    iterations: iteration,
                    converged: true,
                });
            }
        } else {
            state = match state {
                SearchState::Improving | SearchState::Shrinking => {
                    delta = -delta;
                    SearchState::Reversed
                }
                SearchState::Reversed => {
                    delta *= config.shrink_factor;
                    SearchState::Shrinking
                }
            };
            if delta == 0.0 {
                break;
            }
        }
    }

    warn!(
        "Optimal area search stopped without converging at z = {:.6} mm (step {:.3e} mm)",
        plane.z(),
        delta
    );
    Some(OptimalAreaResult {
        psf: best,
        plane,
        iterations,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moments::Ellipse;
    use crate::Point3;

    /// PSF whose area is `(z − z0)² + floor`.
    fn parabolic(plane: &OpticalPlane, z0: f64, floor: f64) -> Psf {
        let r = (((plane.z() - z0).powi(2) + floor) / std::f64::consts::PI).sqrt();
        Psf::new(
            Point3::new(0.0, 0.0, plane.z()),
            Ellipse {
                major: r,
                minor: r,
                tilt: 0.0,
            },
            0.55,
        )
    }

    #[test]
    fn test_state_machine_sequence() {
        let mut trials = Vec::new();
        let result = minimise_area(
            &OpticalPlane::at(50.3),
            0.55e-3,
            &OptimalAreaConfig::default(),
            |plane| {
                trials.push(plane.z());
                Some(parabolic(plane, 50.0, 0.0))
            },
        )
        .unwrap();

        // Initial plane, then accept, reverse, shrink, reverse, accept, ...
        let expected = [
            50.3, 50.05, 49.8, 50.3, 50.1125, 49.9875, 49.925, 50.05, 50.003125,
        ];
        for (k, (got, want)) in trials.iter().zip(expected.iter()).enumerate() {
            assert!((got - want).abs() < 1e-9, "trial {k}: {got} vs {want}");
        }
        assert!(result.converged);
        assert!((result.plane.z() - 50.0).abs() < 0.55e-3);
    }

    #[test]
    fn test_flat_curve_hits_budget() {
        let config = OptimalAreaConfig {
            max_iterations: 20,
            ..Default::default()
        };
        let flat = parabolic(&OpticalPlane::at(0.0), 0.0, 1.0);
        let result =
            minimise_area(&OpticalPlane::at(0.0), 0.55e-3, &config, |_| Some(flat)).unwrap();
        assert!(!result.converged);
        assert_eq!(result.plane.z(), 0.0);
        assert_eq!(result.iterations, 20);
    }

    #[test]
    fn test_no_valid_rays() {
        let pencil: Vec<crate::ray::StraightRay> = Vec::new();
        assert!(optimal_area(&pencil, &OpticalPlane::at(0.0), &OptimalAreaConfig::default()).is_none());
    }
}
