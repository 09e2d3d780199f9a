//! Pencil-level analyses driven by an explicit [`AnalysisContext`].
//!
//! The context carries the choices that select how a pencil is analysed: the
//! reference point for wavefront extraction, an axial offset for spot
//! diagrams, and the optimal-area search settings.

use tracing::debug;

use crate::error::{Error, Result};
use crate::psf::{optimal_area, OptimalAreaConfig, Psf, SpotDiagram};
use crate::ray::{OpticalPlane, Ray};
use crate::wavepoint::{FitConfig, WaveFrontFitResult, WavePointSet};
use crate::Point3;

/// Centre of the reference sphere used when extracting a wavefront.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferencePoint {
    /// A fixed point, typically the paraxial image point.
    Paraxial(Point3),
    /// Centroid of the geometric PSF in the image plane.
    PsfCentre,
    /// Centroid of the geometric PSF in the plane of smallest spot area.
    OptimalArea,
}

/// Settings shared by the pencil analyses.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub reference: ReferencePoint,
    /// Axial offset (mm) added to the analysis plane by [`AnalysisContext::spot_analysis`].
    pub plane_shift: f64,
    pub optimal_area: OptimalAreaConfig,
    pub fit: FitConfig,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            reference: ReferencePoint::PsfCentre,
            plane_shift: 0.0,
            optimal_area: OptimalAreaConfig::default(),
            fit: FitConfig::default(),
        }
    }
}

impl AnalysisContext {
    pub fn new(reference: ReferencePoint) -> Self {
        Self {
            reference,
            ..Default::default()
        }
    }

    /// Resolve the reference point for `pencil` imaged near `image_plane`.
    ///
    /// `None` when the reference depends on the pencil and it has no valid rays.
    pub fn reference_point<R: Ray>(&self, pencil: &[R], image_plane: &OpticalPlane) -> Option<Point3> {
        match self.reference {
            ReferencePoint::Paraxial(point) => Some(point),
            ReferencePoint::PsfCentre => Psf::from_rays(pencil, image_plane).map(|psf| psf.center),
            ReferencePoint::OptimalArea => {
                optimal_area(pencil, image_plane, &self.optimal_area).map(|r| r.psf.center)
            }
        }
    }

    /// Wave points of `pencil` in `pupil`, referenced to a sphere about the
    /// context's reference point.
    pub fn pupil_wavefront<R: Ray>(
        &self,
        pencil: &[R],
        pupil: &OpticalPlane,
        image_plane: &OpticalPlane,
    ) -> Result<WavePointSet> {
        let reference = self
            .reference_point(pencil, image_plane)
            .ok_or(Error::EmptyPencil)?;
        debug!(
            "Wavefront reference point ({:.6}, {:.6}, {:.6})",
            reference.x, reference.y, reference.z
        );
        let mut set = WavePointSet::new();
        set.set_with_rays(pencil, pupil, Some(&reference))?;
        Ok(set)
    }

    /// Extract the pupil wavefront and fit a Zernike expansion of `order`.
    pub fn fit_pupil_wavefront<R: Ray>(
        &self,
        pencil: &[R],
        pupil: &OpticalPlane,
        image_plane: &OpticalPlane,
        order: u32,
    ) -> Result<WaveFrontFitResult> {
        crate::wavepoint::fit::zernike_fit_terms(order)?;
        let mut set = self.pupil_wavefront(pencil, pupil, image_plane)?;
        set.fit_zernike_with(order, &self.fit)
    }

    /// Spot diagram of `pencil` in `plane` moved by the context's plane shift.
    pub fn spot_analysis<R: Ray>(&self, pencil: &[R], plane: &OpticalPlane) -> SpotDiagram {
        SpotDiagram::new(pencil, &plane.shifted(self.plane_shift))
    }
}
