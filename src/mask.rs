//! Pupil masks defining where a wavefront is valid.

/// Circular or annular pupil mask in un-normalised coordinates.
///
/// Invariant: `0 ≤ inner_radius ≤ radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mask {
    radius: f64,
    inner_radius: f64,
}

impl Mask {
    /// Mask with an explicit inner radius, clamped into `[0, radius]`.
    pub fn new(radius: f64, inner_radius: f64) -> Self {
        let radius = radius.abs();
        Self {
            radius,
            inner_radius: inner_radius.abs().min(radius),
        }
    }

    /// Full circular aperture.
    pub fn circular(radius: f64) -> Self {
        Self::new(radius, 0.0)
    }

    /// Annular aperture with the obscuration given as a fraction of the outer radius.
    pub fn annular(radius: f64, inner_fraction: f64) -> Self {
        let radius = radius.abs();
        Self::new(radius, inner_fraction.abs().min(1.0) * radius)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    /// `true` when `inner² ≤ x² + y² ≤ radius²`.
    pub fn inside(&self, x: f64, y: f64) -> bool {
        let r2 = x * x + y * y;
        r2 <= self.radius * self.radius && r2 >= self.inner_radius * self.inner_radius
    }

    /// Same mask shape scaled to a new outer radius.
    pub fn with_radius(&self, radius: f64) -> Self {
        let fraction = if self.radius > 0.0 {
            self.inner_radius / self.radius
        } else {
            0.0
        };
        Self::annular(radius, fraction)
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::circular(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_inside() {
        let mask = Mask::new(2.0, 0.0);
        assert!(mask.inside(1.0, 1.0));
        assert!(!mask.inside(2.0, 2.0));
        assert!(mask.inside(2.0, 0.0));
        assert!(mask.inside(0.0, 0.0));
    }

    #[test]
    fn test_annular_inside() {
        let mask = Mask::annular(2.0, 0.25);
        assert_eq!(mask.inner_radius(), 0.5);
        assert!(!mask.inside(0.0, 0.0));
        assert!(!mask.inside(0.3, 0.3));
        assert!(mask.inside(0.5, 0.0));
        assert!(mask.inside(1.0, 1.0));
    }

    #[test]
    fn test_invariant_clamped() {
        let mask = Mask::new(1.0, 3.0);
        assert_eq!(mask.inner_radius(), 1.0);
        let mask = Mask::annular(1.0, 2.0);
        assert_eq!(mask.inner_radius(), 1.0);
    }

    #[test]
    fn test_with_radius_keeps_fraction() {
        let mask = Mask::annular(2.0, 0.5).with_radius(4.0);
        assert_eq!(mask.radius(), 4.0);
        assert_eq!(mask.inner_radius(), 2.0);
    }
}
