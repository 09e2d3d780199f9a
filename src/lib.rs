//! # aberra
//!
//! Wavefront aberration analysis for traced ray pencils, written in Rust.
//!
//! Given the rays of a pencil leaving an optical system, `aberra` extracts the
//! wavefront at a reference plane, fits analytic aberration models to it, and
//! evaluates the resulting diffraction and geometric point-spread functions.
//!
//! ## Features
//!
//! - **Zernike polynomials**: radial polynomials with closed forms up to order 8,
//!   the 49-term "optical" Zernike set and its standard aberration names
//! - **Wavefront models**: Zernike, Seidel, polynomial and Kingslake models over
//!   circular or annular pupils, with a plain-text file format
//! - **Fitting**: Levenberg-Marquardt fits of Zernike (orders 4, 6, 8) and Seidel
//!   models to wave points, with per-coefficient standard errors
//! - **Diffraction**: FFT-based PSF and direct-integration OTF of a wavefront
//! - **Geometric PSF**: moment-based spot ellipse and an axial search for the
//!   plane of smallest spot
//!
//! ## Example
//!
//! ```no_run
//! use aberra::{OpticalPlane, Point3, StraightRay, WavePointSet};
//!
//! // A pencil converging on a point 100 mm behind the pupil
//! let focus = Point3::new(0.0, 0.0, 100.0);
//! let pencil: Vec<StraightRay> = (0..200)
//!     .map(|k| {
//!         let a = k as f64 * 2.399963;
//!         let r = 10.0 * ((k as f64 + 0.5) / 200.0).sqrt();
//!         StraightRay::towards(Point3::new(r * a.cos(), r * a.sin(), 0.0), focus, 0.55)
//!     })
//!     .collect();
//!
//! let mut points = WavePointSet::new();
//! points
//!     .set_with_rays(&pencil, &OpticalPlane::at(0.0), Some(&focus))
//!     .unwrap();
//! let fit = points.fit_zernike(4).unwrap();
//! println!("{}", fit.model);
//! ```
//!
//! ## Units
//!
//! Lengths and path lengths are in millimetres, wavelengths in microns,
//! wavefront coefficients in waves and phases in radians.
//!

pub mod analysis;
pub mod error;
pub mod mask;
pub mod moments;
pub mod psf;
pub mod ray;
pub mod wavefront;
pub mod wavepoint;
pub mod zernike;

pub use analysis::{AnalysisContext, ReferencePoint};
pub use error::{Error, Result};
pub use mask::Mask;
pub use moments::{Ellipse, Moments};
pub use psf::{
    optimal_area, spot_points, OptimalAreaConfig, OptimalAreaResult, Psf, SpotDiagram,
};
pub use ray::{OpticalPlane, Ray, StraightRay};
pub use wavefront::{
    ideal_otf, psf_sections, Interferometer, Otf, OtfAxis, Sections, WaveFront, WaveFrontKind,
};
pub use wavepoint::{FitConfig, WaveFrontFitResult, WavePoint, WavePointSet};

/// Wavelength (µm) assumed until a wave point supplies one.
pub const DEFAULT_WAVELENGTH: f64 = 0.55;

// Commonly used types
// All geometry is double precision: path differences of a fraction of a
// micron are taken between paths of hundreds of millimetres.
pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Point3 = nalgebra::Point3<f64>;
