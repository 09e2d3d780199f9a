//! Integration tests for the diffraction and geometric PSF paths.

use std::f64::consts::TAU;

use aberra::{
    optimal_area, psf_sections, AnalysisContext, OpticalPlane, OptimalAreaConfig, OtfAxis,
    Point3, Psf, StraightRay, WaveFront,
};

/// Pencil whose zone of height `h` focuses at `focal − k·h²` (undercorrected
/// spherical aberration), sampled on rings with a fixed number of azimuths.
fn spherical_pencil(focal: f64, k: f64) -> Vec<StraightRay> {
    let mut pencil = Vec::new();
    for ring in 1..=10 {
        let h = 0.5 * ring as f64;
        for az in 0..24 {
            let a = TAU * az as f64 / 24.0;
            let start = Point3::new(h * a.cos(), h * a.sin(), 0.0);
            let focus = Point3::new(0.0, 0.0, focal - k * h * h);
            pencil.push(StraightRay::towards(start, focus, 0.55));
        }
    }
    pencil
}

/// Axial position minimising the RMS spot radius of [`spherical_pencil`].
///
/// Each ray's radial offset is `h·(1 − z/f(h))`, so the mean square is
/// quadratic in `z` with minimum at `Σ h²/f / Σ h²/f²`.
fn rms_best_focus(focal: f64, k: f64) -> f64 {
    let (mut num, mut den) = (0.0, 0.0);
    for ring in 1..=10 {
        let h = 0.5 * ring as f64;
        let f = focal - k * h * h;
        num += h * h / f;
        den += h * h / (f * f);
    }
    num / den
}

#[test]
fn test_optimal_area_with_spherical_aberration() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let (focal, k) = (100.0, 0.02);
    let pencil = spherical_pencil(focal, k);
    let marginal = focal - k * 25.0;

    let result = optimal_area(
        &pencil,
        &OpticalPlane::at(focal + 0.5),
        &OptimalAreaConfig::default(),
    )
    .expect("pencil has valid rays");

    let z = result.plane.z();
    println!("{} after {} trials", result.psf, result.iterations);
    assert!(result.converged);
    assert!(z > marginal && z < focal, "best plane {z} outside caustic");

    let expected = rms_best_focus(focal, k);
    assert!((z - expected).abs() < 5e-3, "best plane {z}, expected {expected}");

    // The result is a local minimum of spot area.
    for dz in [-0.01, 0.01] {
        let nearby = Psf::from_rays(&pencil, &result.plane.shifted(dz)).unwrap();
        assert!(result.psf.area() <= nearby.area());
    }
    let paraxial = Psf::from_rays(&pencil, &OpticalPlane::at(focal)).unwrap();
    assert!(result.psf.area() < paraxial.area());
    // Rotational symmetry keeps the centroid on axis.
    assert!(result.psf.center.x.abs() < 1e-9 && result.psf.center.y.abs() < 1e-9);
    assert!((result.psf.major - result.psf.minor).abs() < 1e-6 * result.psf.major);
}

#[test]
fn test_spot_analysis_in_shifted_plane() {
    let pencil = spherical_pencil(50.0, 0.0);
    let ctx = AnalysisContext {
        plane_shift: -1.0,
        ..Default::default()
    };
    let spot = ctx.spot_analysis(&pencil, &OpticalPlane::at(50.0));
    assert_eq!(spot.points.len(), pencil.len());
    // One millimetre before a perfect focus the outermost ring (h = 5) has
    // radius 5 · 1/50.
    let max = spot.max_radius().unwrap();
    assert!((max - 0.1).abs() < 1e-9, "max radius {max}");
}

#[test]
fn test_defocus_lowers_diffraction_peak() {
    let size = 64;
    let flat = WaveFront::zernike(1.0, vec![0.0]).psf(size, false);
    let defocused = WaveFront::zernike(1.0, vec![0.0, 0.0, 0.0, 0.5]).psf(size, false);
    let centre = size / 2;

    assert!(defocused[(centre, centre)] < 0.5 * flat[(centre, centre)]);
    // Energy is conserved by the transform (Parseval).
    let energy = |m: &nalgebra::DMatrix<f64>| m.iter().map(|v| v * v).sum::<f64>();
    assert!((energy(&flat) - energy(&defocused)).abs() < 1e-6 * energy(&flat));

    // Rotationally symmetric wavefront: both sections agree.
    let (h, v) = psf_sections(&defocused);
    for (a, b) in h.iter().zip(v.iter()) {
        assert!((a - b).abs() < 1e-6 * flat[(centre, centre)]);
    }
}

#[test]
fn test_otf_degraded_by_aberration() {
    let flat = WaveFront::zernike(2.0, vec![0.0]);
    let aberrated = WaveFront::zernike(2.0, vec![0.0, 0.0, 0.0, 0.3, 0.0, 0.0, 0.0, 0.0, 0.2]);

    let ideal = flat.ideal_otf(9);
    let reference = flat.otf(9, OtfAxis::Vertical, 50);
    let otf = aberrated.otf(9, OtfAxis::Vertical, 50);

    assert_eq!(otf.shift, ideal.shift);
    assert!((otf.value[0] - 1.0).abs() < 1e-12);
    for k in 1..8 {
        assert!((reference.value[k] - ideal.value[k]).abs() < 0.05);
        assert!(
            otf.value[k] < reference.value[k],
            "shift {}: {} >= {}",
            otf.shift[k],
            otf.value[k],
            reference.value[k]
        );
    }
}
