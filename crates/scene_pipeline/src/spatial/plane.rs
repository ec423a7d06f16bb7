//! Plane primitive

use crate::foundation::math::{Vec3, Vec4};

/// Plane satisfying `normal · x = constant`
///
/// Points on the side the normal faces have a positive signed distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vec3,
    /// Plane constant
    pub constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::z(),
            constant: 0.0,
        }
    }
}

impl Plane {
    /// Create a plane from a normal and constant, normalising both
    pub fn new(normal: Vec3, constant: f32) -> Self {
        let length = normal.norm();
        if length <= f32::EPSILON {
            log::error!("Plane::new: degenerate normal {normal:?}");
            return Self::default();
        }
        Self {
            normal: normal / length,
            constant: constant / length,
        }
    }

    /// Create a plane through `point` facing `normal`
    pub fn from_point_normal(point: &Vec3, normal: &Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            constant: normal.dot(point),
        }
    }

    /// Create a plane from `(a, b, c, d)` coefficients of `ax + by + cz + d = 0`
    pub fn from_coefficients(coefficients: &Vec4) -> Self {
        Self::new(coefficients.xyz(), -coefficients.w)
    }

    /// Signed distance from the plane to `point`
    pub fn distance_to(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.constant
    }

    /// Which side `point` is on: `1` in front, `-1` behind, `0` on the plane
    pub fn which_side(&self, point: &Vec3) -> i32 {
        let distance = self.distance_to(point);
        if distance > 0.0 {
            1
        } else if distance < 0.0 {
            -1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coefficients_are_normalised() {
        let plane = Plane::from_coefficients(&Vec4::new(0.0, 2.0, 0.0, -4.0));
        assert_relative_eq!(plane.normal, Vec3::y());
        assert_relative_eq!(plane.constant, 2.0);
        assert_relative_eq!(plane.distance_to(&Vec3::new(7.0, 5.0, 1.0)), 3.0);
    }

    #[test]
    fn test_which_side() {
        let plane = Plane::from_point_normal(&Vec3::new(0.0, 0.0, 1.0), &Vec3::z());
        assert_eq!(plane.which_side(&Vec3::new(0.0, 0.0, 3.0)), 1);
        assert_eq!(plane.which_side(&Vec3::new(0.0, 0.0, -3.0)), -1);
        assert_eq!(plane.which_side(&Vec3::new(5.0, 2.0, 1.0)), 0);
    }
}
