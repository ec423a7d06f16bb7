//! Math utilities and types
//!
//! Provides the fundamental math types shared by culling, cameras and scene
//! objects. World axes follow the Blender convention used by the whole
//! pipeline:
//!
//! - `+X` is right
//! - `+Y` is forward
//! - `+Z` is up

use std::ops::Mul;

pub use nalgebra::{
    Matrix3, Matrix4,
    Quaternion, Rotation3,
    Unit, UnitQuaternion,
    Vector2, Vector3, Vector4,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Translation, rotation and scale of an entity
///
/// Applied to a point in the order scale, rotate, translate.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform from all three components
    pub fn from_parts(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Convert to a homogeneous transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Transform a point from local space into the space of this transform
    pub fn apply_forward(&self, point: &Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(point)
    }

    /// Transform a point back into local space
    pub fn apply_inverse(&self, point: &Vec3) -> Vec3 {
        (self.rotation.inverse() * (point - self.position)).component_div(&self.scale)
    }

    /// Transform a direction back into local space (translation ignored)
    pub fn apply_inverse_direction(&self, direction: &Vec3) -> Vec3 {
        (self.rotation.inverse() * direction).component_div(&self.scale)
    }

    /// Combine this transform with another, `self` being the parent
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            position: self.position + self.rotation * self.scale.component_mul(&other.position),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Get the inverse transform
    ///
    /// Exact for uniform scale; with non-uniform scale the rotation and scale
    /// no longer commute and the result is an approximation.
    pub fn inverse(&self) -> Self {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        let inv_rotation = self.rotation.inverse();
        let inv_position = -(inv_rotation * self.position).component_mul(&inv_scale);

        Self {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }

    /// Largest absolute scale component
    ///
    /// Used to grow bounding radii conservatively under non-uniform scale.
    pub fn norm(&self) -> f32 {
        self.scale.amax()
    }

    /// Local `+X` axis in world space
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::x()
    }

    /// Local `+Y` axis in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    /// Local `+Z` axis in world space
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }

    /// Orient the transform so that `+Y` points along `direction`
    ///
    /// Right is derived against world up; a direction parallel to world up
    /// falls back to world right.
    pub fn set_direction(&mut self, direction: &Vec3) {
        let forward = direction.normalize();
        let mut right = forward.cross(&Vec3::z());
        if right.norm_squared() < f32::EPSILON {
            right = Vec3::x();
        }
        self.rotation = basis_rotation(&right.normalize(), &forward);
    }

    /// Orient the transform from an explicit forward and right pair
    pub fn set_direction_and_right(&mut self, direction: &Vec3, right: &Vec3) {
        self.rotation = basis_rotation(&right.normalize(), &direction.normalize());
    }

    /// Apply an additional rotation on top of the current one
    pub fn add_rotation(&mut self, rotation: &Quat) {
        self.rotation = rotation * self.rotation;
    }
}

impl Mul for &Transform {
    type Output = Transform;

    fn mul(self, rhs: Self) -> Transform {
        self.combine(rhs)
    }
}

impl Mul for Transform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.combine(&rhs)
    }
}

/// Build a rotation whose columns are right, forward and up
pub fn basis_rotation(right: &Vec3, forward: &Vec3) -> Quat {
    let up = right.cross(forward).normalize();
    let forward = up.cross(right).normalize();
    let basis = Rotation3::from_basis_unchecked(&[*right, forward, up]);
    Quat::from_rotation_matrix(&basis)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Linear interpolation between vectors
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }

    /// Spherical angles to a unit direction (`theta` from `+Z`, `phi` around it)
    pub fn spherical_to_cartesian(theta: f32, phi: f32) -> Vec3 {
        Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
    }
}
