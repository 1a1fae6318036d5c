//! Thin layer over nalgebra's 3-vectors.

use nalgebra as na;

pub type Vector3d = na::Vector3<f64>;
pub type Point3d = na::Point3<f64>;

/// Machine epsilon for the numeric width the hull is computed in.
pub(crate) const DOUBLE_PREC: f64 = f64::EPSILON;

pub(crate) trait NormalizeFast {
    /// Scales to unit length unless the vector is already unit length to
    /// within `2 * DOUBLE_PREC` in its squared norm.
    fn normalize_fast(&mut self);
}

impl NormalizeFast for Vector3d {
    fn normalize_fast(&mut self) {
        let len_sqr = self.norm_squared();
        let err = len_sqr - 1.0;
        if err > 2.0 * DOUBLE_PREC || err < -(2.0 * DOUBLE_PREC) {
            *self /= len_sqr.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_fast_scales_long_vectors() {
        let mut v = Vector3d::new(3.0, 0.0, 4.0);
        v.normalize_fast();
        assert!((v.norm() - 1.0).abs() < 1e-15);
        assert!((v.x - 0.6).abs() < 1e-15);
    }

    #[test]
    fn normalize_fast_leaves_unit_vectors_alone() {
        // One ulp above 1.0; a full normalize would round it back down.
        let mut v = Vector3d::new(0.0, 1.0 + DOUBLE_PREC, 0.0);
        v.normalize_fast();
        assert_eq!(v.y, 1.0 + DOUBLE_PREC);
    }
}
