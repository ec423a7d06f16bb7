//! Spatial primitives for culling and picking
//!
//! Provides planes, rays, the two bounding volume variants and the view
//! frustum that cameras hand to the scene for visibility tests.

mod bounding_box;
mod bounding_sphere;
mod bounding_volume;
mod frustum;
mod plane;
mod ray;

pub use bounding_box::BoundingBox;
pub use bounding_sphere::BoundingSphere;
pub use bounding_volume::BoundingVolume;
pub use frustum::{Frustum, FrustumPlane};
pub use plane::Plane;
pub use ray::Ray;
