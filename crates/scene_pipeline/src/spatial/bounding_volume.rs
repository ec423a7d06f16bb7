//! Bounding volume used for culling and picking
//!
//! Both variants expose a center and an enclosing radius so that frustum
//! tests can treat them alike; the box variant additionally answers exact
//! containment and slab ray queries.

use rand::Rng;

use super::{BoundingBox, BoundingSphere, Plane, Ray};
use crate::foundation::math::{Transform, Vec3};

/// Relative slack applied to plane tests so tangent volumes straddle
const SIDE_EPSILON: f32 = 1e-4;

/// Classify a sphere against a plane: `1` in front, `-1` behind, `0` straddling
pub(crate) fn side_of_sphere(plane: &Plane, center: &Vec3, radius: f32) -> i32 {
    let distance = plane.distance_to(center);
    let slack = SIDE_EPSILON * radius.max(1.0);
    if distance < -radius - slack {
        -1
    } else if distance > radius + slack {
        1
    } else {
        0
    }
}

/// Culling primitive
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingVolume {
    /// Sphere with authoritative radius
    Sphere(BoundingSphere),
    /// Axis aligned box; radius derived from the diagonal
    Aabb(BoundingBox),
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::Sphere(BoundingSphere::default())
    }
}

impl From<BoundingSphere> for BoundingVolume {
    fn from(sphere: BoundingSphere) -> Self {
        Self::Sphere(sphere)
    }
}

impl From<BoundingBox> for BoundingVolume {
    fn from(bounds: BoundingBox) -> Self {
        Self::Aabb(bounds)
    }
}

impl BoundingVolume {
    /// Sphere volume
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere(BoundingSphere::new(center, radius))
    }

    /// Box volume spanning two corners
    pub fn aabb(min: Vec3, max: Vec3) -> Self {
        Self::Aabb(BoundingBox::new(min, max))
    }

    /// Whether this is the sphere variant
    pub fn is_sphere(&self) -> bool {
        matches!(self, Self::Sphere(_))
    }

    /// Center of the volume
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Sphere(s) => s.center(),
            Self::Aabb(b) => b.center(),
        }
    }

    /// Move the volume so it is centred on `center`
    pub fn set_center(&mut self, center: Vec3) {
        match self {
            Self::Sphere(s) => s.set_center(center),
            Self::Aabb(b) => b.set_center(center),
        }
    }

    /// Enclosing radius
    pub fn radius(&self) -> f32 {
        match self {
            Self::Sphere(s) => s.radius(),
            Self::Aabb(b) => b.radius(),
        }
    }

    /// Resize so the enclosing radius is `radius`
    pub fn set_radius(&mut self, radius: f32) {
        match self {
            Self::Sphere(s) => s.set_radius(radius),
            Self::Aabb(b) => b.set_radius(radius),
        }
    }

    /// Whether plane tests always report the volume in front
    pub fn always_pass(&self) -> bool {
        match self {
            Self::Sphere(s) => s.always_pass(),
            Self::Aabb(b) => b.always_pass(),
        }
    }

    /// Make plane tests always report the volume in front
    pub fn set_always_pass(&mut self, always_pass: bool) {
        match self {
            Self::Sphere(s) => s.set_always_pass(always_pass),
            Self::Aabb(b) => b.set_always_pass(always_pass),
        }
    }

    /// Fit the volume to a point set
    pub fn compute_from_data(&mut self, points: &[Vec3]) {
        match self {
            Self::Sphere(s) => s.compute_from_data(points),
            Self::Aabb(b) => b.compute_from_data(points),
        }
    }

    /// Begin streaming accumulation
    pub fn start_compute_from_data(&mut self) {
        match self {
            Self::Sphere(s) => s.start_compute_from_data(),
            Self::Aabb(b) => b.start_compute_from_data(),
        }
    }

    /// Accumulate a batch of points
    pub fn add_compute_data(&mut self, points: &[Vec3]) {
        match self {
            Self::Sphere(s) => s.add_compute_data(points),
            Self::Aabb(b) => b.add_compute_data(points),
        }
    }

    /// Accumulate a single point
    pub fn add_compute_point(&mut self, point: Vec3) {
        match self {
            Self::Sphere(s) => s.add_compute_point(point),
            Self::Aabb(b) => b.add_compute_point(point),
        }
    }

    /// Finish streaming accumulation
    pub fn end_compute_from_data(&mut self) {
        match self {
            Self::Sphere(s) => s.end_compute_from_data(),
            Self::Aabb(b) => b.end_compute_from_data(),
        }
    }

    /// Write this volume carried through `transform` into `out`
    ///
    /// `out` takes the variant of `self`.
    pub fn transform_by(&self, transform: &Transform, out: &mut Self) {
        match (self, &mut *out) {
            (Self::Sphere(s), Self::Sphere(o)) => s.transform_by(transform, o),
            (Self::Aabb(b), Self::Aabb(o)) => b.transform_by(transform, o),
            _ => *out = self.transformed(transform),
        }
    }

    /// This volume carried through `transform`
    pub fn transformed(&self, transform: &Transform) -> Self {
        match self {
            Self::Sphere(s) => {
                let mut out = BoundingSphere::default();
                s.transform_by(transform, &mut out);
                Self::Sphere(out)
            }
            Self::Aabb(b) => {
                let mut out = BoundingBox::default();
                b.transform_by(transform, &mut out);
                Self::Aabb(out)
            }
        }
    }

    /// `1` fully in front of `plane`, `-1` fully behind, `0` straddling
    pub fn which_side(&self, plane: &Plane) -> i32 {
        match self {
            Self::Sphere(s) => s.which_side(plane),
            Self::Aabb(b) => b.which_side(plane),
        }
    }

    /// Distance along `ray` to the first hit
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        match self {
            Self::Sphere(s) => s.intersect_ray(ray),
            Self::Aabb(b) => b.intersect_ray(ray),
        }
    }

    /// Whether `ray` hits the volume
    pub fn test_intersection_ray(&self, ray: &Ray) -> bool {
        self.intersect_ray(ray).is_some()
    }

    /// Whether two volumes overlap
    pub fn test_intersection(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Aabb(a), Self::Aabb(b)) => a.intersects_box(b),
            (Self::Aabb(a), Self::Sphere(s)) | (Self::Sphere(s), Self::Aabb(a)) => {
                a.intersects_sphere(&s.center(), s.radius())
            }
            (Self::Sphere(a), Self::Sphere(b)) => a.intersects_sphere(&b.center(), b.radius()),
        }
    }

    /// Grow to enclose `other` as well
    pub fn merge(&mut self, other: &Self) {
        match (self, other) {
            (Self::Sphere(s), other) => s.merge_sphere(&other.center(), other.radius()),
            (Self::Aabb(a), Self::Aabb(b)) => a.merge_box(b),
            (Self::Aabb(a), Self::Sphere(s)) => a.merge_sphere(&s.center(), s.radius()),
        }
    }

    /// Grow to enclose `point`
    pub fn merge_point(&mut self, point: &Vec3) {
        match self {
            Self::Sphere(s) => s.merge_point(point),
            Self::Aabb(b) => b.merge_point(point),
        }
    }

    /// Whether `point` lies inside the volume
    pub fn contains(&self, point: &Vec3) -> bool {
        match self {
            Self::Sphere(s) => s.contains(point),
            Self::Aabb(b) => b.contains(point),
        }
    }

    /// Random point inside the volume, optionally biased toward `near`
    pub fn random_pos_in_volume<R: Rng + ?Sized>(&self, rng: &mut R, near: Option<&Vec3>) -> Vec3 {
        match self {
            Self::Sphere(s) => s.random_pos_in_volume(rng, near),
            Self::Aabb(b) => b.random_pos_in_volume(rng, near),
        }
    }

    /// Offset from `source` to the surface along the line toward the center,
    /// plus the outward normal at that point
    ///
    /// `None` when `source` sits on the center.
    pub fn surface_from(&self, source: &Vec3) -> Option<(Vec3, Vec3)> {
        let to_center = self.center() - source;
        let direction = to_center.try_normalize(f32::EPSILON)?;
        match self {
            Self::Sphere(s) => Some((direction * (to_center.norm() - s.radius()), -direction)),
            Self::Aabb(b) => {
                let distance = b.intersect_ray(&Ray::new(*source, direction))?;
                let half = ((b.max() - b.min()) * 0.5).map(|h| h.max(f32::EPSILON));
                let hit = (source + direction * distance - b.center()).component_div(&half);
                let axis = hit.iamax();
                let mut normal = Vec3::zeros();
                normal[axis] = hit[axis].signum();
                Some((direction * distance, normal))
            }
        }
    }

    /// Box enclosing this volume
    pub fn to_aabb(&self) -> BoundingBox {
        match self {
            Self::Sphere(s) => BoundingBox::from_sphere(&s.center(), s.radius()),
            Self::Aabb(b) => b.clone(),
        }
    }
}
