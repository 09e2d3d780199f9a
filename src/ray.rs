//! Ray pencil interface consumed by the wavefront and PSF analysis.
//!
//! Ray tracing itself lives outside this crate: anything that can report
//! a position, a direction, a wavelength and an accumulated optical path can
//! be analysed by implementing [`Ray`]. [`StraightRay`] is a minimal
//! implementation for rays in a homogeneous medium, used to build synthetic
//! pencils.
//!
//! # Coordinate conventions
//!
//! - Lengths are in millimetres, wavelengths in microns.
//! - Planes are flat and perpendicular to the optical (+Z) axis; points in a
//!   plane are expressed relative to the plane's reference point.

use nalgebra::Unit;

use crate::{Point3, Vector2, Vector3};

/// Flat plane perpendicular to the optical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticalPlane {
    point: Point3,
}

impl OpticalPlane {
    /// Plane through `point`.
    pub fn new(point: Point3) -> Self {
        Self { point }
    }

    /// Plane on the optical axis at axial position `z`.
    pub fn at(z: f64) -> Self {
        Self::new(Point3::new(0.0, 0.0, z))
    }

    /// Reference point of the plane.
    pub fn point(&self) -> Point3 {
        self.point
    }

    /// Axial position.
    pub fn z(&self) -> f64 {
        self.point.z
    }

    /// Same plane moved `delta` along the optical axis.
    pub fn shifted(&self, delta: f64) -> Self {
        Self::new(Point3::new(self.point.x, self.point.y, self.point.z + delta))
    }

    /// Distance along `direction` from `position` to the plane.
    ///
    /// Infinite or `NaN` for rays parallel to the plane.
    pub fn distance(&self, position: &Point3, direction: &Vector3) -> f64 {
        (self.point.z - position.z) / direction.z
    }

    /// Intersection of a straight line with the plane, in plane-local coordinates.
    pub fn intersect(&self, position: &Point3, direction: &Vector3) -> Vector2 {
        let t = self.distance(position, direction);
        let p = *position + *direction * t;
        Vector2::new(p.x - self.point.x, p.y - self.point.y)
    }

    /// Global 3D point of a plane-local 2D point.
    pub fn source_point(&self, local: &Vector2) -> Point3 {
        Point3::new(self.point.x + local.x, self.point.y + local.y, self.point.z)
    }
}

impl Default for OpticalPlane {
    fn default() -> Self {
        Self::at(0.0)
    }
}

/// A traced ray as seen by the analysis code.
///
/// Blocked or vignetted rays report `is_valid() == false` and are skipped
/// everywhere.
pub trait Ray {
    /// `false` once the ray has been blocked.
    fn is_valid(&self) -> bool;
    /// Current position (mm).
    fn position(&self) -> Point3;
    /// Unit propagation direction.
    fn director(&self) -> Vector3;
    /// Wavelength in microns.
    fn wavelength(&self) -> f64;
    /// Optical path accumulated so far (mm).
    fn path_length(&self) -> f64;
    /// Refractive index of the medium the ray is currently in.
    fn refractive_index(&self, wavelength: f64) -> f64;

    /// Weight of the ray; unity unless the tracer models intensity.
    fn intensity(&self) -> f64 {
        1.0
    }

    /// Intersection with `plane`, in the plane's local coordinates.
    fn point_in_plane(&self, plane: &OpticalPlane) -> Vector2 {
        plane.intersect(&self.position(), &self.director())
    }
}

/// Ray travelling in a straight line through a homogeneous medium.
#[derive(Debug, Clone, PartialEq)]
pub struct StraightRay {
    pub position: Point3,
    pub director: Unit<Vector3>,
    /// Wavelength in microns.
    pub wavelength: f64,
    /// Accumulated optical path (mm).
    pub path_length: f64,
    /// Refractive index of the surrounding medium.
    pub index: f64,
    /// Weight in geometric PSF moments.
    pub intensity: f64,
    pub valid: bool,
}

impl StraightRay {
    /// Ray in air (`n = 1`) starting with zero path length.
    pub fn new(position: Point3, direction: Vector3, wavelength: f64) -> Self {
        Self {
            position,
            director: Unit::new_normalize(direction),
            wavelength,
            path_length: 0.0,
            index: 1.0,
            intensity: 1.0,
            valid: true,
        }
    }

    /// Ray from `start` aimed at `target`.
    pub fn towards(start: Point3, target: Point3, wavelength: f64) -> Self {
        Self::new(start, target - start, wavelength)
    }

    /// Set the accumulated path length.
    pub fn with_path_length(mut self, path_length: f64) -> Self {
        self.path_length = path_length;
        self
    }

    /// Set the ray's weight.
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Set the medium's refractive index.
    pub fn with_index(mut self, index: f64) -> Self {
        self.index = index;
        self
    }

    /// Mark the ray as blocked.
    pub fn blocked(mut self) -> Self {
        self.valid = false;
        self
    }

    /// Move the ray `distance` along its direction, accumulating optical path.
    pub fn propagate(&mut self, distance: f64) {
        self.position += self.director.into_inner() * distance;
        self.path_length += distance * self.index;
    }

    /// Propagate the ray onto `plane`.
    pub fn propagate_to(&mut self, plane: &OpticalPlane) {
        let distance = plane.distance(&self.position, &self.director);
        self.propagate(distance);
    }
}

impl Ray for StraightRay {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn position(&self) -> Point3 {
        self.position
    }

    fn director(&self) -> Vector3 {
        self.director.into_inner()
    }

    fn wavelength(&self) -> f64 {
        self.wavelength
    }

    fn path_length(&self) -> f64 {
        self.path_length
    }

    fn refractive_index(&self, _wavelength: f64) -> f64 {
        self.index
    }

    fn intensity(&self) -> f64 {
        self.intensity
    }
}
