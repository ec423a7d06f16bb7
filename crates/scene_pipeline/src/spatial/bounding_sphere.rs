//! Sphere bounding volume

use rand::Rng;

use super::bounding_volume::side_of_sphere;
use super::{Plane, Ray};
use crate::foundation::math::{utils, Transform, Vec3};

/// Bounding sphere; the radius is authoritative
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundingSphere {
    center: Vec3,
    radius: f32,
    always_pass: bool,
    pending: Vec<Vec3>,
}

impl BoundingSphere {
    /// Creates a sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            ..Default::default()
        }
    }

    /// Center of the sphere
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Move the sphere
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Radius of the sphere
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Resize the sphere; negative input clamps to zero
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    /// Whether plane tests always report the sphere in front
    pub fn always_pass(&self) -> bool {
        self.always_pass
    }

    /// Make plane tests always report the sphere in front
    pub fn set_always_pass(&mut self, always_pass: bool) {
        self.always_pass = always_pass;
    }

    /// Fit the sphere to a point set: centroid plus farthest distance
    pub fn compute_from_data(&mut self, points: &[Vec3]) {
        if points.is_empty() {
            log::warn!("BoundingSphere::compute_from_data called with no points");
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = points.len() as f32;
        let center = points.iter().sum::<Vec3>() / count;
        let radius = points
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0_f32, f32::max);
        self.center = center;
        self.radius = radius;
    }

    /// Begin accumulating points for [`Self::end_compute_from_data`]
    pub fn start_compute_from_data(&mut self) {
        self.pending.clear();
    }

    /// Accumulate a batch of points
    pub fn add_compute_data(&mut self, points: &[Vec3]) {
        self.pending.extend_from_slice(points);
    }

    /// Accumulate a single point
    pub fn add_compute_point(&mut self, point: Vec3) {
        self.pending.push(point);
    }

    /// Fit the sphere to everything accumulated since the last start
    pub fn end_compute_from_data(&mut self) {
        let points = std::mem::take(&mut self.pending);
        self.compute_from_data(&points);
    }

    /// Write this sphere carried through `transform` into `out`
    ///
    /// The radius grows by the largest scale component.
    pub fn transform_by(&self, transform: &Transform, out: &mut Self) {
        out.center = transform.apply_forward(&self.center);
        out.radius = self.radius * transform.norm();
        out.always_pass = self.always_pass;
    }

    /// `1` fully in front of `plane`, `-1` fully behind, `0` straddling
    pub fn which_side(&self, plane: &Plane) -> i32 {
        if self.always_pass {
            return 1;
        }
        side_of_sphere(plane, &self.center, self.radius)
    }

    /// Distance along `ray` to the first hit, `0` when the origin is inside
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let m = ray.origin - self.center;
        let b = m.dot(&ray.direction);
        let c = m.norm_squared() - self.radius * self.radius;
        if c > 0.0 && b > 0.0 {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        Some((-b - discriminant.sqrt()).max(0.0))
    }

    /// Whether this sphere overlaps the sphere at `center` with `radius`
    pub fn intersects_sphere(&self, center: &Vec3, radius: f32) -> bool {
        let reach = self.radius + radius;
        (center - self.center).norm_squared() < reach * reach
    }

    /// Grow to the smallest sphere enclosing both this one and the other
    pub fn merge_sphere(&mut self, center: &Vec3, radius: f32) {
        let offset = center - self.center;
        let distance = offset.norm();
        if distance + radius <= self.radius {
            return;
        }
        if distance + self.radius <= radius {
            self.center = *center;
            self.radius = radius;
            return;
        }
        let merged = (distance + self.radius + radius) * 0.5;
        self.center += offset / distance * (merged - self.radius);
        self.radius = merged;
    }

    /// Grow just enough to include `point`
    pub fn merge_point(&mut self, point: &Vec3) {
        self.merge_sphere(point, 0.0);
    }

    /// Whether `point` lies strictly inside
    pub fn contains(&self, point: &Vec3) -> bool {
        (point - self.center).norm_squared() < self.radius * self.radius
    }

    /// Uniformly distributed point inside the sphere
    ///
    /// With `near`, the sampled direction is pulled toward that point.
    pub fn random_pos_in_volume<R: Rng + ?Sized>(&self, rng: &mut R, near: Option<&Vec3>) -> Vec3 {
        let sample = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let mut direction = sample.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::x);
        if let Some(toward) = near.and_then(|p| (p - self.center).try_normalize(f32::EPSILON)) {
            let t = rng.gen_range(0.5..1.0);
            direction = utils::lerp_vec3(&direction, &toward, t)
                .try_normalize(f32::EPSILON)
                .unwrap_or(toward);
        }
        let distance = self.radius * rng.gen::<f32>().cbrt();
        self.center + direction * distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_compute_from_data() {
        let mut sphere = BoundingSphere::default();
        sphere.compute_from_data(&[Vec3::new(-1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)]);
        assert_relative_eq!(sphere.center(), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(sphere.radius(), 2.0);
    }

    #[test]
    fn test_streaming_matches_batch() {
        let points = [Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 2.0), Vec3::new(4.0, 0.0, 0.0)];
        let mut batch = BoundingSphere::default();
        batch.compute_from_data(&points);

        let mut streamed = BoundingSphere::default();
        streamed.start_compute_from_data();
        streamed.add_compute_data(&points[..2]);
        streamed.add_compute_point(points[2]);
        streamed.end_compute_from_data();

        assert_relative_eq!(streamed.center(), batch.center());
        assert_relative_eq!(streamed.radius(), batch.radius());
    }

    #[test]
    fn test_transform_uses_max_scale() {
        let sphere = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let transform = Transform::from_parts(
            Vec3::new(0.0, 0.0, 5.0),
            Quat::identity(),
            Vec3::new(1.0, 3.0, 2.0),
        );
        let mut out = BoundingSphere::default();
        sphere.transform_by(&transform, &mut out);
        assert_relative_eq!(out.center(), Vec3::new(1.0, 0.0, 5.0));
        assert_relative_eq!(out.radius(), 3.0);
    }

    #[test]
    fn test_tangent_plane_after_uniform_scale() {
        let sphere = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let transform = Transform::from_parts(
            Vec3::new(0.0, 0.0, 5.0),
            Quat::identity(),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let mut out = BoundingSphere::default();
        sphere.transform_by(&transform, &mut out);

        let front_tangent = Plane::from_point_normal(&Vec3::new(4.0, 0.0, 0.0), &Vec3::x());
        assert_eq!(out.which_side(&front_tangent), 0);
        let back_tangent = Plane::from_point_normal(&Vec3::new(0.0, 0.0, 0.0), &Vec3::x());
        assert_eq!(out.which_side(&back_tangent), 0);
        let clear = Plane::from_point_normal(&Vec3::new(-1.0, 0.0, 0.0), &Vec3::x());
        assert_eq!(out.which_side(&clear), 1);
        let behind = Plane::from_point_normal(&Vec3::new(10.0, 0.0, 0.0), &Vec3::x());
        assert_eq!(out.which_side(&behind), -1);
    }

    #[test]
    fn test_always_pass() {
        let mut sphere = BoundingSphere::new(Vec3::zeros(), 1.0);
        sphere.set_always_pass(true);
        let plane = Plane::from_point_normal(&Vec3::new(100.0, 0.0, 0.0), &Vec3::x());
        assert_eq!(sphere.which_side(&plane), 1);
    }

    #[test]
    fn test_ray_hit_and_miss() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 10.0, 0.0), 2.0);
        let hit = sphere.intersect_ray(&Ray::new(Vec3::zeros(), Vec3::y()));
        assert_relative_eq!(hit.unwrap(), 8.0, epsilon = 1e-5);
        assert!(sphere.intersect_ray(&Ray::new(Vec3::zeros(), -Vec3::y())).is_none());
        assert!(sphere.intersect_ray(&Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::y())).is_none());
        let inside = sphere.intersect_ray(&Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::x()));
        assert_eq!(inside, Some(0.0));
    }

    #[test]
    fn test_merge_keeps_both() {
        let mut a = BoundingSphere::new(Vec3::zeros(), 1.0);
        a.merge_sphere(&Vec3::new(4.0, 0.0, 0.0), 1.0);
        assert_relative_eq!(a.center(), Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(a.radius(), 3.0);

        let mut big = BoundingSphere::new(Vec3::zeros(), 10.0);
        big.merge_sphere(&Vec3::new(1.0, 0.0, 0.0), 1.0);
        assert_relative_eq!(big.radius(), 10.0);

        let mut small = BoundingSphere::new(Vec3::zeros(), 1.0);
        small.merge_point(&Vec3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(small.radius(), 2.0);
        assert_relative_eq!(small.center(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_random_positions_stay_inside() {
        let sphere = BoundingSphere::new(Vec3::new(1.0, 2.0, 3.0), 4.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = sphere.random_pos_in_volume(&mut rng, None);
            assert!((p - sphere.center()).norm() <= sphere.radius() + 1e-4);
        }
        let near = Vec3::new(100.0, 2.0, 3.0);
        for _ in 0..200 {
            let p = sphere.random_pos_in_volume(&mut rng, Some(&near));
            assert!((p - sphere.center()).norm() <= sphere.radius() + 1e-4);
            assert!(p.x >= sphere.center().x - 1e-4);
        }
    }
}
