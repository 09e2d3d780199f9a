//! Discrete wavefront samples extracted from ray pencils.
//!
//! A [`WavePoint`] is one ray's crossing of a reference plane: its position
//! in the plane, the optical path accumulated to get there, and its
//! wavelength. A [`WavePointSet`] collects the crossings of a whole pencil and
//! is the input to the fitting routines in [`fit`].

pub mod fit;

use std::f64::consts::TAU;

use tracing::debug;

use crate::error::{Error, Result};
use crate::ray::{OpticalPlane, Ray};
use crate::wavefront::WaveFront;
use crate::{Point3, Vector2, DEFAULT_WAVELENGTH};

pub use fit::{FitConfig, WaveFrontFitResult};

/// Microns per millimetre; path lengths are mm, wavelengths µm.
const MICRONS_PER_MM: f64 = 1000.0;

/// One sampled point of a wavefront.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavePoint {
    /// Position in the reference plane (mm).
    pub position: Vector2,
    /// Optical path length (mm).
    pub path_length: f64,
    /// Wavelength (µm).
    pub wavelength: f64,
}

impl WavePoint {
    pub fn new(position: Vector2, path_length: f64, wavelength: f64) -> Self {
        Self {
            position,
            path_length,
            wavelength,
        }
    }

    /// Phase in radians, `2π·path/λ` with the path converted to microns.
    pub fn phase(&self) -> f64 {
        TAU * self.path_length * MICRONS_PER_MM / self.wavelength
    }

    /// Wave point where `ray` crosses `plane`.
    ///
    /// With a `reference` point the path is extended to the sphere centred
    /// on that point and passing through the plane's axis point, so the
    /// result measures deviation from a perfect converging wave.
    pub fn from_ray<R: Ray + ?Sized>(
        ray: &R,
        plane: &OpticalPlane,
        reference: Option<&Point3>,
    ) -> Result<Self> {
        let position = ray.position();
        let director = ray.director();
        let wavelength = ray.wavelength();
        let point = ray.point_in_plane(plane);
        let mut distance = plane.distance(&position, &director);

        if let Some(reference) = reference {
            let offset = *reference - plane.point();
            let xc = point.x - offset.x;
            let yc = point.y - offset.y;
            let curvature = 1.0 / offset.z;
            let f = curvature * (xc * xc + yc * yc);
            let g = director.z - curvature * (xc * director.x + yc * director.y);
            let a = g * g - curvature * f;
            if a < 0.0 {
                return Err(Error::MissedReferenceSphere);
            }
            distance += f / (g + a.sqrt());
        }

        let path_length = ray.path_length() + distance * ray.refractive_index(wavelength);
        Ok(Self::new(point, path_length, wavelength))
    }

    /// Replace the path length with the one implied by `wavefront` at this
    /// position. Points outside the wavefront mask get a `NaN` path.
    pub fn set_with_wavefront(&mut self, wavefront: &WaveFront) {
        let phase = wavefront.value(self.position.x, self.position.y);
        self.path_length = phase * self.wavelength / (TAU * MICRONS_PER_MM);
    }
}

/// Ordered collection of wave points with a running maximum radius.
#[derive(Debug, Clone, PartialEq)]
pub struct WavePointSet {
    points: Vec<WavePoint>,
    max_radius: f64,
    wavelength: f64,
}

impl Default for WavePointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl WavePointSet {
    /// Empty set at the default wavelength.
    pub fn new() -> Self {
        Self::with_radius(0.0)
    }

    /// Empty set whose radius will never shrink below `radius`.
    pub fn with_radius(radius: f64) -> Self {
        Self {
            points: Vec::new(),
            max_radius: radius,
            wavelength: DEFAULT_WAVELENGTH,
        }
    }

    /// Regular square grid of zero-path points covering a pupil of `radius`,
    /// `samples` points across each axis and clipped to the circle.
    pub fn grid(radius: f64, samples: usize, wavelength: f64) -> Self {
        let mut set = Self::with_radius(radius);
        let axis = crate::wavefront::linspace(-radius, radius, samples);
        for &x in &axis {
            for &y in &axis {
                if x * x + y * y <= radius * radius {
                    set.add(WavePoint::new(Vector2::new(x, y), 0.0, wavelength));
                }
            }
        }
        set
    }

    /// Append a point, extending the radius and adopting its wavelength.
    pub fn add(&mut self, point: WavePoint) {
        self.max_radius = self.max_radius.max(point.position.norm());
        self.wavelength = point.wavelength;
        self.points.push(point);
    }

    /// Add one point per valid ray of `pencil` crossing `plane`.
    ///
    /// Fails on the first ray that misses the reference sphere; points
    /// added before the failure are kept.
    pub fn set_with_rays<R: Ray>(
        &mut self,
        pencil: &[R],
        plane: &OpticalPlane,
        reference: Option<&Point3>,
    ) -> Result<()> {
        let before = self.points.len();
        for ray in pencil.iter().filter(|r| r.is_valid()) {
            self.add(WavePoint::from_ray(ray, plane, reference)?);
        }
        debug!(
            "Added {} wave points from a pencil of {} rays, max radius {:.4} mm",
            self.points.len() - before,
            pencil.len(),
            self.max_radius
        );
        Ok(())
    }

    pub fn points(&self) -> &[WavePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WavePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest distance from the origin of any point added so far (mm).
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Wavelength of the most recently added point (µm).
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Subtract the mean finite path length from every point.
    ///
    /// Points with a non-finite path neither contribute to the mean nor
    /// change; a set with no finite path is left as it is.
    pub fn zero_mean(&mut self) {
        let (sum, n) = self
            .points
            .iter()
            .map(|p| p.path_length)
            .filter(|l| l.is_finite())
            .fold((0.0, 0usize), |(s, n), l| (s + l, n + 1));
        if n == 0 {
            return;
        }
        let mean = sum / n as f64;
        for p in self.points.iter_mut() {
            p.path_length -= mean;
        }
    }

    /// Number of points with a finite path length.
    pub fn finite_len(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.path_length.is_finite())
            .count()
    }

    /// Phase of every point, in order.
    pub fn phase_values(&self) -> Vec<f64> {
        self.points.iter().map(WavePoint::phase).collect()
    }

    /// Overwrite every point's path with the one implied by `wavefront`.
    pub fn set_with_wavefront(&mut self, wavefront: &WaveFront) {
        for p in self.points.iter_mut() {
            p.set_with_wavefront(wavefront);
        }
    }

    /// Variance of the path-length residual (mm²) between the points and
    /// `wavefront`. Points where the wavefront is undefined are skipped;
    /// `NaN` when none remain.
    pub fn least_squares_error(&self, wavefront: &WaveFront) -> f64 {
        let mut n = 0usize;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for p in &self.points {
            let mut model = *p;
            model.set_with_wavefront(wavefront);
            let residual = p.path_length - model.path_length;
            if residual.is_finite() {
                n += 1;
                sum += residual;
                sum_sq += residual * residual;
            }
        }
        if n == 0 {
            return f64::NAN;
        }
        let mean = sum / n as f64;
        sum_sq / n as f64 - mean * mean
    }
}

impl<'a> IntoIterator for &'a WavePointSet {
    type Item = &'a WavePoint;
    type IntoIter = std::slice::Iter<'a, WavePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
