//! Weighted second-order moments of 2D point sets and their equivalent ellipse.
//!
//! Sums are accumulated relative to the first point added, so spots that are
//! tiny compared to their distance from the origin keep full precision in
//! the central moments.

use std::f64::consts::PI;

use crate::Vector2;

/// Equivalent ellipse of a point distribution (second-moment approximation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Semi-major axis.
    pub major: f64,
    /// Semi-minor axis, `0 ≤ minor ≤ major`.
    pub minor: f64,
    /// Angle of the major axis from `+x`, radians.
    pub tilt: f64,
}

impl Ellipse {
    pub fn area(&self) -> f64 {
        PI * self.major * self.minor
    }

    /// `sqrt(1 − (minor/major)²)`; `NaN` for a degenerate ellipse.
    pub fn eccentricity(&self) -> f64 {
        let ratio = self.minor / self.major;
        (1.0 - ratio * ratio).sqrt()
    }

    /// Point on the outline at parametric angle `t`, relative to the centre.
    pub fn point_at(&self, t: f64) -> Vector2 {
        let (st, ct) = self.tilt.sin_cos();
        let a = self.major * t.cos();
        let b = self.minor * t.sin();
        Vector2::new(a * ct - b * st, a * st + b * ct)
    }
}

/// Running weighted moments up to second order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Moments {
    m00: f64,
    m10: f64,
    m01: f64,
    m20: f64,
    m11: f64,
    m02: f64,
    origin: Option<Vector2>,
    count: usize,
}

impl Moments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moments of unit-weight points.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vector2>,
    {
        let mut moments = Self::new();
        for p in points {
            moments.add_point(p, 1.0);
        }
        moments
    }

    /// Accumulate `p` with `weight`.
    pub fn add_point(&mut self, p: &Vector2, weight: f64) -> &mut Self {
        let origin = *self.origin.get_or_insert(*p);
        let dx = p.x - origin.x;
        let dy = p.y - origin.y;
        self.m00 += weight;
        self.m10 += weight * dx;
        self.m01 += weight * dy;
        self.m20 += weight * dx * dx;
        self.m11 += weight * dx * dy;
        self.m02 += weight * dy * dy;
        self.count += 1;
        self
    }

    /// Total weight.
    pub fn mass(&self) -> f64 {
        self.m00
    }

    /// Number of points added.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Weighted mean position; `None` when the total weight is zero.
    pub fn centroid(&self) -> Option<Vector2> {
        let origin = self.origin?;
        if self.m00 == 0.0 {
            return None;
        }
        Some(Vector2::new(
            origin.x + self.m10 / self.m00,
            origin.y + self.m01 / self.m00,
        ))
    }

    /// Central moments `(u20, u02, u11)` normalised by the total weight.
    fn central(&self) -> Option<(f64, f64, f64)> {
        if self.origin.is_none() || self.m00 == 0.0 {
            return None;
        }
        let xbar = self.m10 / self.m00;
        let ybar = self.m01 / self.m00;
        Some((
            self.m20 / self.m00 - xbar * xbar,
            self.m02 / self.m00 - ybar * ybar,
            self.m11 / self.m00 - xbar * ybar,
        ))
    }

    /// RMS distance of the points from the centroid.
    pub fn radius(&self) -> Option<f64> {
        self.central()
            .map(|(u20, u02, _)| (u20 + u02).max(0.0).sqrt())
    }

    /// Equivalent ellipse from the central second moments.
    pub fn ellipse(&self) -> Option<Ellipse> {
        let (u20, u02, u11) = self.central()?;
        let p = u20 + u02;
        let q = (4.0 * u11 * u11 + (u20 - u02) * (u20 - u02)).sqrt();
        Some(Ellipse {
            major: (p + q).max(0.0).sqrt(),
            minor: (p - q).max(0.0).sqrt(),
            tilt: 0.5 * (2.0 * u11).atan2(u20 - u02),
        })
    }

    /// Area of the equivalent ellipse.
    pub fn area(&self) -> Option<f64> {
        self.ellipse().map(|e| e.area())
    }

    pub fn eccentricity(&self) -> Option<f64> {
        self.ellipse().map(|e| e.eccentricity())
    }
}
