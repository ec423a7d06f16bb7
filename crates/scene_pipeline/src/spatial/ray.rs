//! Ray primitive

use crate::foundation::math::{Transform, Vec3};

/// Half-line with a normalised direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalising the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Express the ray in the local space of `transform`
    pub fn to_local(&self, transform: &Transform) -> Self {
        Self::new(
            transform.apply_inverse(&self.origin),
            transform.apply_inverse_direction(&self.direction),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_is_normalised() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 3.0, 4.0));
        assert_relative_eq!(ray.direction.norm(), 1.0);
        assert_relative_eq!(ray.point_at(5.0), Vec3::new(0.0, 3.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn test_to_local_removes_translation() {
        let transform = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));
        let ray = Ray::new(Vec3::new(10.0, -5.0, 0.0), Vec3::y());
        let local = ray.to_local(&transform);
        assert_relative_eq!(local.origin, Vec3::new(0.0, -5.0, 0.0));
        assert_relative_eq!(local.direction, Vec3::y());
    }
}
