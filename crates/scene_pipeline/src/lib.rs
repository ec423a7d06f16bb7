//! # Scene Pipeline
//!
//! Scene visibility, culling and multi-pass render ordering for a real-time
//! 3D engine.
//!
//! ## Features
//!
//! - **Bounding volumes**: spheres and AABBs with plane, ray and frustum tests
//! - **Cameras**: lazily derived view/projection matrices, picking rays and an
//!   orbit controller
//! - **Scenes**: per-camera visible sets sorted for opaque, transparent and
//!   shadow passes
//! - **Mesh groups**: parent/child mesh hierarchies that only recompute dirty
//!   subtrees
//! - **Lighting**: two directional lights and a pool of point lights
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_pipeline::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = ObjectStore::new();
//!     let mut scene = Scene::new("main")?;
//!     let handle = store.insert_spatial(ProxyNode::new(SpatialObject::with_sphere(Vec3::new(0.0, 10.0, 0.0), 1.0)));
//!     scene.attach_spatial_object(&mut store, handle)?;
//!
//!     let camera = Camera::new();
//!     let param = RenderParam::new(RenderPass::Normal, &camera, &camera, 1);
//!     let mut out = RenderParamOut::default();
//!     scene.pre_render(&mut store, &param, &mut out);
//!     scene.render(&mut store, &param, &mut out);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod animation;
pub mod config;
pub mod foundation;
pub mod lighting;
pub mod render;
pub mod scene;
pub mod spatial;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        animation::Animation,
        config::{Config, PipelineConfig},
        foundation::{
            math::{Quat, Transform, Vec3},
            time::FrameClock,
        },
        lighting::{DirectionalLight, PointLight},
        render::{Camera, CameraId, MatrixKind, RenderParam, RenderParamOut, RenderPass, Renderable},
        scene::{
            MeshGroup, ObjectFlags, ObjectHandle, ObjectStore, ProxyNode, Scene, SceneError, SceneNode,
            SceneObjectType, SpatialHandle, SpatialNode, SpatialObject,
        },
        spatial::{BoundingVolume, Frustum, Ray},
    };
}
