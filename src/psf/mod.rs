//! Geometric point-spread function from ray pencils.
//!
//! The PSF of a pencil in a plane is summarised by the equivalent ellipse of
//! the ray intersection points, centred on their centroid.

pub mod optimal;
pub mod spot;

use std::f64::consts::{PI, TAU};
use std::fmt;

use crate::moments::{Ellipse, Moments};
use crate::ray::{OpticalPlane, Ray};
use crate::{Point3, Vector2};

pub use optimal::{optimal_area, OptimalAreaConfig, OptimalAreaResult};
pub use spot::{spot_points, SpotDiagram};

/// Elliptical geometric PSF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Psf {
    /// Centroid in global coordinates (mm).
    pub center: Point3,
    /// Total ray weight.
    pub intensity: f64,
    /// Semi-major axis (mm).
    pub major: f64,
    /// Semi-minor axis (mm), never larger than `major`.
    pub minor: f64,
    /// Angle of the major axis from `+x`, radians.
    pub tilt: f64,
    /// Wavelength (µm).
    pub wavelength: f64,
}

impl Psf {
    pub fn new(center: Point3, ellipse: Ellipse, wavelength: f64) -> Self {
        Self {
            center,
            intensity: 1.0,
            major: ellipse.major,
            minor: ellipse.minor,
            tilt: ellipse.tilt,
            wavelength,
        }
    }

    /// PSF of the valid rays of `pencil` in `plane`, each weighted by its
    /// intensity. The PSF's intensity is the total weight.
    ///
    /// `None` when no ray in the pencil is valid or the total weight is zero.
    pub fn from_rays<R: Ray>(pencil: &[R], plane: &OpticalPlane) -> Option<Self> {
        let mut moments = Moments::new();
        let mut wavelength = None;
        for ray in pencil.iter().filter(|r| r.is_valid()) {
            moments.add_point(&ray.point_in_plane(plane), ray.intensity());
            wavelength = Some(ray.wavelength());
        }
        let centroid = moments.centroid()?;
        let ellipse = moments.ellipse()?;
        let mut psf = Self::new(plane.source_point(&centroid), ellipse, wavelength?);
        psf.intensity = moments.mass();
        Some(psf)
    }

    pub fn ellipse(&self) -> Ellipse {
        Ellipse {
            major: self.major,
            minor: self.minor,
            tilt: self.tilt,
        }
    }

    /// `π·major·minor` (mm²).
    pub fn area(&self) -> f64 {
        PI * self.major * self.minor
    }

    pub fn eccentricity(&self) -> f64 {
        self.ellipse().eccentricity()
    }

    /// `n` points around the ellipse outline, in the PSF's plane relative
    /// to the global origin.
    pub fn outline(&self, n: usize) -> Vec<Vector2> {
        let ellipse = self.ellipse();
        let centre = Vector2::new(self.center.x, self.center.y);
        (0..n)
            .map(|k| centre + ellipse.point_at(TAU * k as f64 / n as f64))
            .collect()
    }
}

impl fmt::Display for Psf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PSF centre ({:.6}, {:.6}, {:.6}) a: {:.4e} b: {:.4e} tilt: {:.4} area: {:.4e} λ: {}",
            self.center.x,
            self.center.y,
            self.center.z,
            self.major,
            self.minor,
            self.tilt,
            self.area(),
            self.wavelength
        )
    }
}
