//! Scene registry and render orchestration
//!
//! Objects live in an [`ObjectStore`]; a [`Scene`] holds handles into it and
//! decides, per camera and frame, which of them are visible and in which
//! order they draw.
//!
//! ## Frame flow
//!
//! ```text
//! Scene::update        (lights, animations)
//!      ↓
//! Scene::pre_render    (visible set per camera, once per frame)
//!      ↓
//! Scene::render        (per pass: shadow | opaque -> sky -> transparent -> overlays)
//! ```
//!
//! Positioned objects may also be attached from other threads through a
//! [`SpatialRegistrar`]; everything else happens on the thread owning the
//! store.

mod error;
mod mesh_group;
mod object_store;
mod observer;
mod registry;
mod render_scene;
mod scene_object;
mod spatial_object;

#[cfg(test)]
mod tests;

pub use error::SceneError;
pub use mesh_group::MeshGroup;
pub use object_store::{ObjectHandle, ObjectStore, OverlayNode, ProxyNode, SceneNode, SpatialHandle, SpatialNode};
pub use observer::SceneObserver;
pub use registry::SpatialRegistrar;
pub use render_scene::{DirectionalLightSlot, Scene, SceneId, VisibleSet};
pub use scene_object::{ObjectFlags, SceneObject, SceneObjectType};
pub use spatial_object::SpatialObject;
