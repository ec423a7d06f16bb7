//! Spatial object registry shared between a scene and its registrars
//!
//! Spawn and despawn logic may run on another thread than the one that
//! renders. It holds a [`SpatialRegistrar`], which only touches the handle
//! list under the lock. The scene membership recorded in each object header
//! is applied by the render thread the next time the scene walks its
//! objects, since only that thread owns the [`ObjectStore`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::error::SceneError;
use super::object_store::{ObjectStore, SpatialHandle};
use super::render_scene::SceneId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Attached(SpatialHandle),
    Detached(SpatialHandle),
}

#[derive(Debug, Default)]
pub(crate) struct SpatialRegistry {
    handles: Vec<SpatialHandle>,
    pending: Vec<Membership>,
}

impl SpatialRegistry {
    pub(crate) fn handles(&self) -> &[SpatialHandle] {
        &self.handles
    }

    pub(crate) fn take_handles(&mut self) -> Vec<SpatialHandle> {
        std::mem::take(&mut self.handles)
    }

    fn insert(&mut self, scene: SceneId, handle: SpatialHandle) -> Result<(), SceneError> {
        if self.handles.contains(&handle) {
            return Err(SceneError::AlreadyAttached(scene));
        }
        self.handles.push(handle);
        Ok(())
    }

    fn remove(&mut self, scene: SceneId, handle: SpatialHandle) -> Result<(), SceneError> {
        let position = self
            .handles
            .iter()
            .position(|h| *h == handle)
            .ok_or(SceneError::NotAttached(scene))?;
        self.handles.remove(position);
        Ok(())
    }

    /// Record queued membership changes in the object headers and drop
    /// handles whose objects left the store
    pub(crate) fn settle(&mut self, scene: SceneId, store: &mut ObjectStore) {
        for change in self.pending.drain(..) {
            match change {
                Membership::Attached(handle) => {
                    if let Some(node) = store.spatial_mut(handle) {
                        node.spatial_mut().header_mut().on_attached(scene);
                    }
                }
                Membership::Detached(handle) => {
                    if let Some(node) = store.spatial_mut(handle) {
                        node.spatial_mut().header_mut().on_detached(scene);
                    }
                }
            }
        }
        self.handles.retain(|h| store.contains_spatial(*h));
    }
}

pub(crate) fn lock_registry(registry: &Mutex<SpatialRegistry>) -> MutexGuard<'_, SpatialRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Attaches and detaches positioned objects from any thread
///
/// Cheap to clone. Handles registered here take part in the very next
/// visibility pass of the scene.
#[derive(Debug, Clone)]
pub struct SpatialRegistrar {
    scene: SceneId,
    registry: Arc<Mutex<SpatialRegistry>>,
}

impl SpatialRegistrar {
    pub(crate) fn new(scene: SceneId, registry: Arc<Mutex<SpatialRegistry>>) -> Self {
        Self { scene, registry }
    }

    /// Scene this registrar feeds
    pub fn scene_id(&self) -> SceneId {
        self.scene
    }

    /// Register a positioned object
    pub fn attach(&self, handle: SpatialHandle) -> Result<(), SceneError> {
        let mut registry = lock_registry(&self.registry);
        registry.insert(self.scene, handle)?;
        registry.pending.push(Membership::Attached(handle));
        Ok(())
    }

    /// Unregister a positioned object
    pub fn detach(&self, handle: SpatialHandle) -> Result<(), SceneError> {
        let mut registry = lock_registry(&self.registry);
        registry.remove(self.scene, handle)?;
        registry.pending.push(Membership::Detached(handle));
        Ok(())
    }

    /// Whether `handle` is registered
    pub fn contains(&self, handle: SpatialHandle) -> bool {
        lock_registry(&self.registry).handles.contains(&handle)
    }

    /// Number of registered handles, including ones not yet pruned
    pub fn len(&self) -> usize {
        lock_registry(&self.registry).handles.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        lock_registry(&self.registry).handles.is_empty()
    }
}

/// Render-thread side: attach with immediate header bookkeeping
pub(crate) fn attach_now(
    registry: &Mutex<SpatialRegistry>,
    scene: SceneId,
    store: &mut ObjectStore,
    handle: SpatialHandle,
) -> Result<(), SceneError> {
    let node = store.spatial_mut(handle).ok_or(SceneError::StaleHandle)?;
    lock_registry(registry).insert(scene, handle)?;
    node.spatial_mut().header_mut().on_attached(scene);
    Ok(())
}

/// Render-thread side: detach with immediate header bookkeeping
pub(crate) fn detach_now(
    registry: &Mutex<SpatialRegistry>,
    scene: SceneId,
    store: &mut ObjectStore,
    handle: SpatialHandle,
) -> Result<(), SceneError> {
    {
        let mut registry = lock_registry(registry);
        registry.settle(scene, store);
        registry.remove(scene, handle)?;
    }
    if let Some(node) = store.spatial_mut(handle) {
        node.spatial_mut().header_mut().on_detached(scene);
    }
    Ok(())
}
