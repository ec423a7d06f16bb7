//! View frustum
//!
//! Six inward-facing planes. A point is inside when its signed distance to
//! every plane is non-negative. Planes come either from a view-projection
//! matrix (Gribb/Hartmann extraction) or from near/far/fov/aspect in camera
//! space, which can then be carried into world space with
//! [`Frustum::transform_by`].

use super::{BoundingVolume, Plane};
use crate::foundation::math::{Mat4, Quat, Transform, Vec3, Vec4};

/// Identifies one of the six frustum planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrustumPlane {
    /// Near clip plane
    Near,
    /// Far clip plane
    Far,
    /// Left side
    Left,
    /// Right side
    Right,
    /// Top side
    Top,
    /// Bottom side
    Bottom,
}

impl FrustumPlane {
    /// All planes in storage order
    pub const ALL: [Self; 6] = [
        Self::Near,
        Self::Far,
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
    ];

    fn index(self) -> usize {
        match self {
            Self::Near => 0,
            Self::Far => 1,
            Self::Left => 2,
            Self::Right => 3,
            Self::Top => 4,
            Self::Bottom => 5,
        }
    }
}

/// Convex view volume
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
    origin: Vec3,
    orientation: Quat,
    near: f32,
    far: f32,
    right_slope: f32,
    left_slope: f32,
    top_slope: f32,
    bottom_slope: f32,
}

impl Default for Frustum {
    fn default() -> Self {
        let mut frustum = Self {
            planes: [Plane::default(); 6],
            origin: Vec3::zeros(),
            orientation: Quat::identity(),
            near: 1.0,
            far: 1000.0,
            right_slope: 1.0,
            left_slope: -1.0,
            top_slope: 1.0,
            bottom_slope: -1.0,
        };
        frustum.rebuild_local_planes();
        frustum
    }
}

impl Frustum {
    /// Extract the planes of a view-projection matrix
    ///
    /// The matrix is expected to map the visible volume to `[-1, 1]` on all
    /// three clip axes.
    pub fn from_view_proj(view_proj: &Mat4) -> Self {
        let mut frustum = Self::default();
        frustum.update_with_view_proj(view_proj);
        frustum
    }

    /// Replace the planes with the ones of `view_proj`
    pub fn update_with_view_proj(&mut self, view_proj: &Mat4) {
        let row = |i: usize| -> Vec4 { view_proj.row(i).transpose() };
        let (x, y, z, w) = (row(0), row(1), row(2), row(3));
        self.planes[FrustumPlane::Left.index()] = Plane::from_coefficients(&(w + x));
        self.planes[FrustumPlane::Right.index()] = Plane::from_coefficients(&(w - x));
        self.planes[FrustumPlane::Top.index()] = Plane::from_coefficients(&(w - y));
        self.planes[FrustumPlane::Bottom.index()] = Plane::from_coefficients(&(w + y));
        self.planes[FrustumPlane::Near.index()] = Plane::from_coefficients(&(w + z));
        self.planes[FrustumPlane::Far.index()] = Plane::from_coefficients(&(w - z));
    }

    /// Build a camera-space frustum looking down `+Y` with `+Z` up
    pub fn set_data(&mut self, near: f32, far: f32, fov: f32, aspect_ratio: f32) {
        let tan_half = (fov * 0.5).tan();
        self.near = near;
        self.far = far;
        self.top_slope = tan_half;
        self.bottom_slope = -tan_half;
        self.right_slope = tan_half * aspect_ratio;
        self.left_slope = -self.right_slope;
        self.origin = Vec3::zeros();
        self.orientation = Quat::identity();
        self.rebuild_local_planes();
    }

    fn rebuild_local_planes(&mut self) {
        self.planes[FrustumPlane::Near.index()] = Plane::new(Vec3::y(), self.near);
        self.planes[FrustumPlane::Far.index()] = Plane::new(-Vec3::y(), -self.far);
        self.planes[FrustumPlane::Right.index()] = Plane::new(Vec3::new(-1.0, self.right_slope, 0.0), 0.0);
        self.planes[FrustumPlane::Left.index()] = Plane::new(Vec3::new(1.0, -self.left_slope, 0.0), 0.0);
        self.planes[FrustumPlane::Top.index()] = Plane::new(Vec3::new(0.0, self.top_slope, -1.0), 0.0);
        self.planes[FrustumPlane::Bottom.index()] = Plane::new(Vec3::new(0.0, -self.bottom_slope, 1.0), 0.0);
    }

    /// Carry the frustum through `transform`
    pub fn transform_by(&mut self, transform: &Transform) {
        for plane in &mut self.planes {
            let point_on_plane = transform.apply_forward(&(plane.normal * plane.constant));
            let normal = transform.rotation * plane.normal.component_div(&transform.scale);
            *plane = Plane::from_point_normal(&point_on_plane, &normal);
        }
        self.origin = transform.apply_forward(&self.origin);
        self.orientation = transform.rotation * self.orientation;
    }

    /// Copy of the frustum carried through `transform`
    pub fn transformed(&self, transform: &Transform) -> Self {
        let mut frustum = self.clone();
        frustum.transform_by(transform);
        frustum
    }

    /// Conservative visibility test
    ///
    /// True when any plane has the volume entirely behind it. Volumes near a
    /// corner that straddle two planes without touching the frustum are
    /// reported visible.
    pub fn is_culled(&self, volume: &BoundingVolume) -> bool {
        self.planes.iter().any(|plane| volume.which_side(plane) < 0)
    }

    /// Whether `point` is inside every plane
    pub fn contains(&self, point: &Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to(point) >= 0.0)
    }

    /// One of the six planes
    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which.index()]
    }

    /// All six planes in [`FrustumPlane::ALL`] order
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Apex of a frustum built with [`Self::set_data`]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Orientation of a frustum built with [`Self::set_data`]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Near and far distances
    pub fn near_far(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    /// Side slopes as `(left, right, bottom, top)`
    pub fn slopes(&self) -> (f32, f32, f32, f32) {
        (self.left_slope, self.right_slope, self.bottom_slope, self.top_slope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::deg_to_rad;

    fn local_frustum() -> Frustum {
        let mut frustum = Frustum::default();
        frustum.set_data(1.0, 100.0, deg_to_rad(90.0), 1.0);
        frustum
    }

    #[test]
    fn test_local_frustum_contains() {
        let frustum = local_frustum();
        assert!(frustum.contains(&Vec3::new(0.0, 10.0, 0.0)));
        assert!(frustum.contains(&Vec3::new(9.0, 10.0, -9.0)));
        assert!(!frustum.contains(&Vec3::new(11.0, 10.0, 0.0)));
        assert!(!frustum.contains(&Vec3::new(0.0, 0.5, 0.0)));
        assert!(!frustum.contains(&Vec3::new(0.0, 101.0, 0.0)));
    }

    #[test]
    fn test_inside_never_culled_outside_always_culled() {
        let frustum = local_frustum();
        assert!(!frustum.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 50.0, 0.0), 5.0)));
        assert!(!frustum.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 100.0, 0.0), 1.0)));
        assert!(frustum.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 200.0, 0.0), 1.0)));
        assert!(frustum.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, -10.0, 0.0), 1.0)));
        assert!(frustum.is_culled(&BoundingVolume::aabb(
            Vec3::new(40.0, 10.0, -1.0),
            Vec3::new(42.0, 12.0, 1.0),
        )));
    }

    #[test]
    fn test_transform_moves_frustum() {
        let transform = Transform::from_position_rotation(
            Vec3::new(0.0, 0.0, 50.0),
            Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2),
        );
        let frustum = local_frustum().transformed(&transform);
        // +Y rotated a quarter turn around Z looks down -X.
        assert!(frustum.contains(&Vec3::new(-10.0, 0.0, 50.0)));
        assert!(!frustum.contains(&Vec3::new(10.0, 0.0, 50.0)));
        assert!(!frustum.contains(&Vec3::new(-10.0, 0.0, 0.0)));
        assert!((frustum.origin() - Vec3::new(0.0, 0.0, 50.0)).norm() < 1e-5);
    }

    #[test]
    fn test_matrix_extraction_matches_planes() {
        // Orthographic box x,y in [-2, 2], z in [-3, 3].
        let ortho = Mat4::new_nonuniform_scaling(&Vec3::new(0.5, 0.5, 1.0 / 3.0));
        let frustum = Frustum::from_view_proj(&ortho);
        assert!(frustum.contains(&Vec3::new(1.9, -1.9, 2.9)));
        assert!(!frustum.contains(&Vec3::new(2.1, 0.0, 0.0)));
        let near = frustum.plane(FrustumPlane::Near);
        assert!((near.normal - Vec3::z()).norm() < 1e-6);
        assert!((near.constant + 3.0).abs() < 1e-6);
    }
}
