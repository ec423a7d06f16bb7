//! Arena owning every scene object
//!
//! Scenes only keep handles into the store. A handle whose slot was removed,
//! or reused, fails lookup, which is how scenes notice that an object went
//! away.

use std::any::Any;

use slotmap::{new_key_type, SlotMap};

use super::scene_object::{SceneObject, SceneObjectType};
use super::spatial_object::SpatialObject;
use crate::render::{RenderParam, RenderParamOut, Renderable};

new_key_type! {
    /// Handle to a positioned object
    pub struct SpatialHandle;

    /// Handle to an object without spatial bounds (sky, overlays)
    pub struct ObjectHandle;
}

/// Object without a position that the scene still draws
///
/// `Send` so a whole [`ObjectStore`] can move to the thread that renders.
pub trait SceneNode: Renderable + Send {
    /// Shared header
    fn scene_object(&self) -> &SceneObject;

    /// Mutable header
    fn scene_object_mut(&mut self) -> &mut SceneObject;

    /// Per-tick update
    fn update(&mut self, _delta_time: f32) {}
}

/// Positioned object the scene culls and sorts
pub trait SpatialNode: Renderable + Send {
    /// Spatial state
    fn spatial(&self) -> &SpatialObject;

    /// Mutable spatial state
    fn spatial_mut(&mut self) -> &mut SpatialObject;

    /// Per-tick update; advances the attached animation by default
    fn update(&mut self, delta_time: f32) {
        self.spatial_mut().update_animation(delta_time);
    }

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Owner of all spatial and non-spatial objects
#[derive(Default)]
pub struct ObjectStore {
    spatials: SlotMap<SpatialHandle, Box<dyn SpatialNode>>,
    objects: SlotMap<ObjectHandle, Box<dyn SceneNode>>,
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("spatials", &self.spatials.len())
            .field("objects", &self.objects.len())
            .finish()
    }
}

impl ObjectStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a spatial object
    pub fn insert_spatial(&mut self, node: impl SpatialNode + 'static) -> SpatialHandle {
        self.spatials.insert(Box::new(node))
    }

    /// Take ownership of a boxed spatial object
    pub fn insert_spatial_boxed(&mut self, node: Box<dyn SpatialNode>) -> SpatialHandle {
        self.spatials.insert(node)
    }

    /// Destroy a spatial object; scenes prune the handle lazily
    pub fn remove_spatial(&mut self, handle: SpatialHandle) -> Option<Box<dyn SpatialNode>> {
        self.spatials.remove(handle)
    }

    /// Whether `handle` still refers to a live object
    pub fn contains_spatial(&self, handle: SpatialHandle) -> bool {
        self.spatials.contains_key(handle)
    }

    /// Look up a spatial object
    pub fn spatial(&self, handle: SpatialHandle) -> Option<&dyn SpatialNode> {
        self.spatials.get(handle).map(|node| &**node)
    }

    /// Look up a spatial object mutably
    pub fn spatial_mut(&mut self, handle: SpatialHandle) -> Option<&mut (dyn SpatialNode + 'static)> {
        self.spatials.get_mut(handle).map(|node| &mut **node)
    }

    /// Look up a spatial object as its concrete type
    pub fn spatial_as<T: SpatialNode + 'static>(&self, handle: SpatialHandle) -> Option<&T> {
        self.spatial(handle)?.as_any().downcast_ref::<T>()
    }

    /// Look up a spatial object mutably as its concrete type
    pub fn spatial_as_mut<T: SpatialNode + 'static>(&mut self, handle: SpatialHandle) -> Option<&mut T> {
        self.spatial_mut(handle)?.as_any_mut().downcast_mut::<T>()
    }

    /// Number of live spatial objects
    pub fn num_spatials(&self) -> usize {
        self.spatials.len()
    }

    /// Take ownership of a non-spatial object
    pub fn insert_object(&mut self, node: impl SceneNode + 'static) -> ObjectHandle {
        self.objects.insert(Box::new(node))
    }

    /// Destroy a non-spatial object
    pub fn remove_object(&mut self, handle: ObjectHandle) -> Option<Box<dyn SceneNode>> {
        self.objects.remove(handle)
    }

    /// Whether `handle` still refers to a live object
    pub fn contains_object(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(handle)
    }

    /// Look up a non-spatial object
    pub fn object(&self, handle: ObjectHandle) -> Option<&dyn SceneNode> {
        self.objects.get(handle).map(|node| &**node)
    }

    /// Look up a non-spatial object mutably
    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut (dyn SceneNode + 'static)> {
        self.objects.get_mut(handle).map(|node| &mut **node)
    }
}

/// Spatial object that only counts the calls it receives
///
/// Stands in for real meshes where only visibility and ordering matter.
#[derive(Debug, Default)]
pub struct ProxyNode {
    spatial: SpatialObject,
    /// `pre_render` calls received
    pub pre_render_calls: u32,
    /// `render` calls received
    pub render_calls: u32,
}

impl ProxyNode {
    /// Proxy wrapping `spatial`
    pub fn new(spatial: SpatialObject) -> Self {
        Self {
            spatial,
            pre_render_calls: 0,
            render_calls: 0,
        }
    }
}

impl Renderable for ProxyNode {
    fn pre_render(&mut self, _param: &RenderParam<'_>, out: &mut RenderParamOut) {
        self.pre_render_calls += 1;
        out.pre_rendered += 1;
    }

    fn render(&mut self, _param: &RenderParam<'_>, out: &mut RenderParamOut) {
        if self.spatial.header().is_visible() {
            self.render_calls += 1;
            out.rendered += 1;
        } else {
            out.skipped += 1;
        }
    }
}

impl SpatialNode for ProxyNode {
    fn spatial(&self) -> &SpatialObject {
        &self.spatial
    }

    fn spatial_mut(&mut self) -> &mut SpatialObject {
        &mut self.spatial
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Non-spatial counterpart of [`ProxyNode`], usable as sky or overlay
#[derive(Debug)]
pub struct OverlayNode {
    header: SceneObject,
    /// `pre_render` calls received
    pub pre_render_calls: u32,
    /// `render` calls received
    pub render_calls: u32,
}

impl OverlayNode {
    /// Node of the given kind
    pub fn new(object_type: SceneObjectType) -> Self {
        Self {
            header: SceneObject::new(object_type),
            pre_render_calls: 0,
            render_calls: 0,
        }
    }
}

impl Renderable for OverlayNode {
    fn pre_render(&mut self, _param: &RenderParam<'_>, out: &mut RenderParamOut) {
        self.pre_render_calls += 1;
        out.pre_rendered += 1;
    }

    fn render(&mut self, _param: &RenderParam<'_>, out: &mut RenderParamOut) {
        self.render_calls += 1;
        out.rendered += 1;
    }
}

impl SceneNode for OverlayNode {
    fn scene_object(&self) -> &SceneObject {
        &self.header
    }

    fn scene_object_mut(&mut self) -> &mut SceneObject {
        &mut self.header
    }
}
