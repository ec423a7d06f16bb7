//! Axis aligned bounding volume
//!
//! The box keeps an enclosing sphere (center and half diagonal) in step with
//! every mutation so plane tests can use the same coarse sphere test as
//! [`super::BoundingSphere`].

use rand::Rng;

use super::bounding_volume::side_of_sphere;
use super::{Plane, Ray};
use crate::foundation::math::{utils, Transform, Vec3};

/// Axis aligned box with a derived enclosing radius
///
/// A freshly created or invalidated box has `min = +MAX` and `max = -MAX`
/// and contains nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
    center: Vec3,
    radius: f32,
    always_pass: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::invalid()
    }
}

impl BoundingBox {
    /// Empty box sentinel
    pub fn invalid() -> Self {
        Self {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(-f32::MAX),
            center: Vec3::zeros(),
            radius: 0.0,
            always_pass: false,
        }
    }

    /// Box spanning two corners, in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        let mut bounds = Self::invalid();
        bounds.min = a.inf(&b);
        bounds.max = a.sup(&b);
        bounds.update_derived();
        bounds
    }

    /// Box enclosing a sphere
    pub fn from_sphere(center: &Vec3, radius: f32) -> Self {
        let reach = Vec3::repeat(radius.max(0.0));
        Self::new(center - reach, center + reach)
    }

    /// Whether the box holds at least one point
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Reset to the empty sentinel, keeping the center
    pub fn invalidate(&mut self) {
        self.min = Vec3::repeat(f32::MAX);
        self.max = Vec3::repeat(-f32::MAX);
        self.radius = 0.0;
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Box center
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Half the box diagonal
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether plane tests always report the box in front
    pub fn always_pass(&self) -> bool {
        self.always_pass
    }

    /// Make plane tests always report the box in front
    pub fn set_always_pass(&mut self, always_pass: bool) {
        self.always_pass = always_pass;
    }

    fn update_derived(&mut self) {
        if self.is_valid() {
            self.center = (self.min + self.max) * 0.5;
            self.radius = (self.max - self.min).norm() * 0.5;
        }
    }

    /// Translate the box so it is centred on `center`
    ///
    /// An empty box collapses to the single point `center`.
    pub fn set_center(&mut self, center: Vec3) {
        if self.is_valid() {
            let delta = center - self.center;
            self.min += delta;
            self.max += delta;
        } else {
            self.min = center;
            self.max = center;
        }
        self.update_derived();
        self.center = center;
    }

    /// Rescale the box about its center so its half diagonal is `radius`
    ///
    /// Degenerate boxes become cubes.
    pub fn set_radius(&mut self, radius: f32) {
        let radius = radius.max(0.0);
        if !self.is_valid() {
            self.min = self.center;
            self.max = self.center;
        }
        let half = (self.max - self.min) * 0.5;
        let current = half.norm();
        let half = if current <= f32::EPSILON {
            Vec3::repeat(radius / 3.0_f32.sqrt())
        } else {
            half * (radius / current)
        };
        self.min = self.center - half;
        self.max = self.center + half;
        self.radius = radius;
    }

    /// Grow to include `point`
    pub fn merge_point(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
        self.update_derived();
    }

    /// Grow to include another box
    pub fn merge_box(&mut self, other: &Self) {
        if !other.is_valid() {
            return;
        }
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
        self.update_derived();
    }

    /// Grow to include the axis extremes of a sphere
    pub fn merge_sphere(&mut self, center: &Vec3, radius: f32) {
        let reach = Vec3::repeat(radius.max(0.0));
        self.merge_point(&(center - reach));
        self.merge_point(&(center + reach));
    }

    /// Fit the box to a point set
    pub fn compute_from_data(&mut self, points: &[Vec3]) {
        if points.is_empty() {
            log::warn!("BoundingBox::compute_from_data called with no points");
            return;
        }
        self.invalidate();
        for point in points {
            self.merge_point(point);
        }
    }

    /// Begin accumulating points
    pub fn start_compute_from_data(&mut self) {
        self.invalidate();
    }

    /// Accumulate a batch of points
    pub fn add_compute_data(&mut self, points: &[Vec3]) {
        for point in points {
            self.merge_point(point);
        }
    }

    /// Accumulate a single point
    pub fn add_compute_point(&mut self, point: Vec3) {
        self.merge_point(&point);
    }

    /// Finish accumulation; derived values are already current
    pub fn end_compute_from_data(&mut self) {
        if !self.is_valid() {
            log::warn!("BoundingBox::end_compute_from_data finished with no points");
        }
    }

    /// Write the box enclosing this one carried through `transform` into `out`
    pub fn transform_by(&self, transform: &Transform, out: &mut Self) {
        out.always_pass = self.always_pass;
        if !self.is_valid() {
            out.invalidate();
            out.center = transform.apply_forward(&self.center);
            return;
        }
        out.invalidate();
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.merge_point(&transform.apply_forward(&corner));
        }
    }

    /// Plane test on the enclosing sphere
    pub fn which_side(&self, plane: &Plane) -> i32 {
        if self.always_pass {
            return 1;
        }
        side_of_sphere(plane, &self.center, self.radius)
    }

    /// Slab test; distance to entry, `0` when the origin is inside
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if !self.is_valid() {
            return None;
        }
        let mut t_min = 0.0_f32;
        let mut t_max = f32::MAX;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            if direction.abs() < f32::EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction;
            let near = (self.min[axis] - origin) * inv;
            let far = (self.max[axis] - origin) * inv;
            let (near, far) = if near > far { (far, near) } else { (near, far) };
            t_min = t_min.max(near);
            t_max = t_max.min(far);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }

    /// Whether two boxes overlap
    pub fn intersects_box(&self, other: &Self) -> bool {
        self.is_valid()
            && other.is_valid()
            && (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    /// Whether the box overlaps a sphere
    pub fn intersects_sphere(&self, center: &Vec3, radius: f32) -> bool {
        if !self.is_valid() {
            return false;
        }
        let closest = center.sup(&self.min).inf(&self.max);
        (closest - center).norm_squared() <= radius * radius
    }

    /// Whether `point` lies inside or on the box
    pub fn contains(&self, point: &Vec3) -> bool {
        (0..3).all(|axis| self.min[axis] <= point[axis] && point[axis] <= self.max[axis])
    }

    /// Uniform point in the box, optionally pulled toward `near`
    ///
    /// The pulled point is clamped back into the box.
    pub fn random_pos_in_volume<R: Rng + ?Sized>(&self, rng: &mut R, near: Option<&Vec3>) -> Vec3 {
        if !self.is_valid() {
            return self.center;
        }
        let sample = Vec3::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
            rng.gen_range(self.min.z..=self.max.z),
        );
        match near {
            Some(near) => {
                let t = rng.gen_range(0.5..1.0);
                utils::lerp_vec3(&sample, near, t).sup(&self.min).inf(&self.max)
            }
            None => sample,
        }
    }
}
