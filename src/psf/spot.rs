use crate::ray::{OpticalPlane, Ray};
use crate::Vector2;

use super::Psf;

/// Intersections of the valid rays of `pencil` with `plane`, in plane-local
/// coordinates.
pub fn spot_points<R: Ray>(pencil: &[R], plane: &OpticalPlane) -> Vec<Vector2> {
    pencil
        .iter()
        .filter(|r| r.is_valid())
        .map(|r| r.point_in_plane(plane))
        .collect()
}

/// Spot diagram data: ray intersections plus the fitted geometric PSF.
#[derive(Debug, Clone)]
pub struct SpotDiagram {
    pub plane: OpticalPlane,
    pub points: Vec<Vector2>,
    /// `None` when no ray reached the plane.
    pub psf: Option<Psf>,
}

impl SpotDiagram {
    pub fn new<R: Ray>(pencil: &[R], plane: &OpticalPlane) -> Self {
        Self {
            plane: *plane,
            points: spot_points(pencil, plane),
            psf: Psf::from_rays(pencil, plane),
        }
    }

    /// Largest distance of any spot point from the PSF centroid (mm).
    pub fn max_radius(&self) -> Option<f64> {
        let psf = self.psf.as_ref()?;
        let centre = Vector2::new(
            psf.center.x - self.plane.point().x,
            psf.center.y - self.plane.point().y,
        );
        self.points
            .iter()
            .map(|p| (p - centre).norm())
            .reduce(f64::max)
    }
}
