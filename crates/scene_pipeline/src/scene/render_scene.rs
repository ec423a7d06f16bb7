//! Scene registry, per-camera visibility and render-pass orchestration
//!
//! A frame for one camera runs in two steps:
//!
//! 1. [`Scene::pre_render`] builds the visible set for the camera (at most
//!    once per frame) and lets every object in it prepare.
//! 2. [`Scene::render`] walks the list matching the render pass:
//!
//! ```text
//! Shadow : shadow list
//! Depth  : [opaques hook] opaque
//! other  : [opaques hook] opaque -> sky -> [transparents hook] -> transparent -> objects
//! ```
//!
//! Opaque and shadow lists are sorted front to back; the transparent list back
//! to front.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::error::SceneError;
use super::object_store::{ObjectHandle, ObjectStore, SpatialHandle};
use super::observer::SceneObserver;
use super::registry::{attach_now, detach_now, lock_registry, SpatialRegistrar, SpatialRegistry};
use super::scene_object::{ObjectFlags, SceneObjectType};
use crate::config::PipelineConfig;
use crate::foundation::collections::{ObserverTable, ObserverToken};
use crate::foundation::math::{Transform, Vec3};
use crate::lighting::{
    DirectionalLight, DirectionalLightInfo, PointLight, PointLightConstants, PointLightHandle, PointLightManager,
};
use crate::render::{Camera, CameraId, RenderParam, RenderParamOut, RenderPass};
use crate::spatial::BoundingVolume;

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(u64);

impl SceneId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

/// One of the two directional light slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionalLightSlot {
    /// Key light, also used for shadows
    Main,
    /// Fill light
    Secondary,
}

impl DirectionalLightSlot {
    fn index(self) -> usize {
        match self {
            Self::Main => 0,
            Self::Secondary => 1,
        }
    }
}

/// Objects one camera sees in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleSet {
    frame: u64,
    light_camera: Option<CameraId>,
    opaque: Vec<SpatialHandle>,
    transparent: Vec<SpatialHandle>,
    shadow: Vec<SpatialHandle>,
    pre_render: Vec<SpatialHandle>,
}

impl VisibleSet {
    /// Frame the set was built for
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Camera the shadow list was tested against
    pub fn light_camera(&self) -> Option<CameraId> {
        self.light_camera
    }

    /// Opaque objects, nearest first
    pub fn opaque(&self) -> &[SpatialHandle] {
        &self.opaque
    }

    /// Transparent objects, farthest first
    pub fn transparent(&self) -> &[SpatialHandle] {
        &self.transparent
    }

    /// Objects the light camera sees, nearest to the main camera first
    pub fn shadow(&self) -> &[SpatialHandle] {
        &self.shadow
    }

    /// Every object in any list, once
    pub fn pre_render(&self) -> &[SpatialHandle] {
        &self.pre_render
    }
}

fn sorted_handles(mut entries: Vec<(SpatialHandle, f32)>, farthest_first: bool) -> Vec<SpatialHandle> {
    if farthest_first {
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    } else {
        entries.sort_by(|a, b| a.1.total_cmp(&b.1));
    }
    entries.into_iter().map(|(handle, _)| handle).collect()
}

/// Registry of objects plus the lights that illuminate them
pub struct Scene {
    id: SceneId,
    name: String,
    spatial_objects: Arc<Mutex<SpatialRegistry>>,
    objects: Vec<ObjectHandle>,
    sky: Option<ObjectHandle>,
    sky_rendering: bool,
    skip_spatial_objects: bool,
    rtt: bool,
    fog_color: Vec3,
    wind_direction: Vec3,
    wind_velocity: f32,
    render_pass: RenderPass,
    visible_sets: HashMap<CameraId, VisibleSet>,
    last_pre_render_frame: HashMap<CameraId, u64>,
    observers: ObserverTable<dyn SceneObserver>,
    directional_lights: [DirectionalLight; 2],
    point_lights: PointLightManager,
    refresh_point_light: bool,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("spatial_objects", &self.num_spatial_objects())
            .field("objects", &self.objects.len())
            .field("sky", &self.sky)
            .field("visible_sets", &self.visible_sets.len())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Empty scene with default lighting
    pub fn new(name: &str) -> Result<Self, SceneError> {
        Self::with_config(name, &PipelineConfig::default())
    }

    /// Empty scene with lighting taken from `config`
    pub fn with_config(name: &str, config: &PipelineConfig) -> Result<Self, SceneError> {
        if name.trim().is_empty() {
            log::error!("Scene: refusing to create a scene without a name");
            return Err(SceneError::InvalidName);
        }
        let lighting = &config.lighting;
        let id = SceneId::next();
        log::debug!("Creating {id} '{name}'");
        Ok(Self {
            id,
            name: name.to_owned(),
            spatial_objects: Arc::default(),
            objects: Vec::new(),
            sky: None,
            sky_rendering: true,
            skip_spatial_objects: false,
            rtt: false,
            fog_color: Vec3::zeros(),
            wind_direction: Vec3::x(),
            wind_velocity: 0.0,
            render_pass: RenderPass::Normal,
            visible_sets: HashMap::new(),
            last_pre_render_frame: HashMap::new(),
            observers: ObserverTable::new(),
            directional_lights: [
                DirectionalLight::from_config(&lighting.directional[0]),
                DirectionalLight::from_config(&lighting.directional[1]),
            ],
            point_lights: PointLightManager::new(lighting.max_point_lights, lighting.max_lights_per_object),
            refresh_point_light: false,
        })
    }

    /// Stable identity
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Name given at creation
    pub fn name(&self) -> &str {
        &self.name
    }

    // ---- spatial registry -----------------------------------------------

    /// Register a positioned object owned by `store`
    ///
    /// Threads that do not own the store attach through [`Self::registrar`].
    pub fn attach_spatial_object(&self, store: &mut ObjectStore, handle: SpatialHandle) -> Result<(), SceneError> {
        attach_now(&self.spatial_objects, self.id, store, handle)
    }

    /// Unregister a positioned object
    pub fn detach_spatial_object(&self, store: &mut ObjectStore, handle: SpatialHandle) -> Result<(), SceneError> {
        detach_now(&self.spatial_objects, self.id, store, handle)
    }

    /// Handle for attaching and detaching positioned objects from other threads
    pub fn registrar(&self) -> SpatialRegistrar {
        SpatialRegistrar::new(self.id, Arc::clone(&self.spatial_objects))
    }

    /// Forget every positioned object
    pub fn clear_every_spatial_object(&self, store: &mut ObjectStore) {
        let handles = {
            let mut registry = lock_registry(&self.spatial_objects);
            registry.settle(self.id, store);
            registry.take_handles()
        };
        for handle in handles {
            if let Some(node) = store.spatial_mut(handle) {
                node.spatial_mut().header_mut().on_detached(self.id);
            }
        }
    }

    /// Number of registered positioned objects, including not yet pruned ones
    pub fn num_spatial_objects(&self) -> usize {
        lock_registry(&self.spatial_objects).handles().len()
    }

    /// Snapshot of the registered positioned objects
    pub fn spatial_objects(&self) -> Vec<SpatialHandle> {
        lock_registry(&self.spatial_objects).handles().to_vec()
    }

    /// Skip positioned objects in every walk
    pub fn set_skip_spatial_objects(&mut self, skip: bool) {
        self.skip_spatial_objects = skip;
    }

    /// Whether positioned objects are skipped
    pub fn skip_spatial_objects(&self) -> bool {
        self.skip_spatial_objects
    }

    /// Log the registered positioned objects by name or game type
    pub fn log_spatial_objects(&self, store: &ObjectStore) {
        let registry = lock_registry(&self.spatial_objects);
        let live: Vec<_> = registry.handles().iter().filter_map(|h| store.spatial(*h)).collect();
        log::info!("Scene '{}': {} spatial object(s)", self.name, live.len());
        for node in live {
            let header = node.spatial().header();
            if header.name().is_empty() {
                log::info!("  game type = {}", header.game_type());
            } else {
                log::info!("  name = {}", header.name());
            }
        }
    }

    // ---- non-spatial registry -------------------------------------------

    /// Register an object without bounds; sky objects are rejected
    pub fn attach_object(&mut self, store: &mut ObjectStore, handle: ObjectHandle) -> Result<(), SceneError> {
        let node = store.object_mut(handle).ok_or(SceneError::StaleHandle)?;
        if node.scene_object().object_type() == SceneObjectType::SkySphere {
            log::error!("Scene '{}': sky objects must be attached with attach_sky", self.name);
            return Err(SceneError::SkyAsObject);
        }
        if self.objects.contains(&handle) {
            return Err(SceneError::AlreadyAttached(self.id));
        }
        self.objects.push(handle);
        node.scene_object_mut().on_attached(self.id);
        Ok(())
    }

    /// Unregister an object without bounds
    pub fn detach_object(&mut self, store: &mut ObjectStore, handle: ObjectHandle) -> Result<(), SceneError> {
        self.objects.retain(|h| *h == handle || store.contains_object(*h));
        let position = self
            .objects
            .iter()
            .position(|h| *h == handle)
            .ok_or(SceneError::NotAttached(self.id))?;
        self.objects.remove(position);
        if let Some(node) = store.object_mut(handle) {
            node.scene_object_mut().on_detached(self.id);
        }
        Ok(())
    }

    /// Registered objects without bounds
    pub fn objects(&self) -> &[ObjectHandle] {
        &self.objects
    }

    // ---- sky ------------------------------------------------------------

    /// Install a sky, returning the one it replaced
    pub fn attach_sky(&mut self, store: &mut ObjectStore, handle: ObjectHandle) -> Result<Option<ObjectHandle>, SceneError> {
        if !store.contains_object(handle) {
            return Err(SceneError::StaleHandle);
        }
        let previous = self.detach_sky(store);
        if let Some(node) = store.object_mut(handle) {
            node.scene_object_mut().on_attached(self.id);
        }
        self.sky = Some(handle);
        Ok(previous)
    }

    /// Remove the sky
    pub fn detach_sky(&mut self, store: &mut ObjectStore) -> Option<ObjectHandle> {
        let previous = self.sky.take()?;
        if let Some(node) = store.object_mut(previous) {
            node.scene_object_mut().on_detached(self.id);
        }
        Some(previous)
    }

    /// Current sky
    pub fn sky(&self) -> Option<ObjectHandle> {
        self.sky
    }

    /// Whether the sky is drawn
    pub fn sky_rendering(&self) -> bool {
        self.sky_rendering
    }

    /// Enable or disable sky drawing
    pub fn set_sky_rendering(&mut self, render: bool) {
        self.sky_rendering = render;
    }

    /// Flip sky drawing
    pub fn toggle_sky_rendering(&mut self) {
        self.sky_rendering = !self.sky_rendering;
    }

    // ---- environment ----------------------------------------------------

    /// Fog colour
    pub fn fog_color(&self) -> Vec3 {
        self.fog_color
    }

    /// Set the fog colour
    pub fn set_fog_color(&mut self, color: Vec3) {
        self.fog_color = color;
    }

    /// Set wind direction and speed
    pub fn set_wind(&mut self, direction: Vec3, velocity: f32) {
        self.wind_direction = direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::x);
        self.wind_velocity = velocity;
    }

    /// Wind direction scaled by speed
    pub fn wind_vector(&self) -> Vec3 {
        self.wind_direction * self.wind_velocity
    }

    /// Whether the scene renders into an offscreen target
    pub fn is_rtt(&self) -> bool {
        self.rtt
    }

    /// Mark the scene as rendering into an offscreen target
    pub fn set_rtt(&mut self, rtt: bool) {
        self.rtt = rtt;
    }

    /// Pass of the most recent pre-render or render call
    pub fn render_pass(&self) -> RenderPass {
        self.render_pass
    }

    // ---- observers ------------------------------------------------------

    /// Register timing callbacks
    pub fn subscribe(&mut self, observer: Box<dyn SceneObserver>) -> ObserverToken {
        self.observers.subscribe(observer)
    }

    /// Remove timing callbacks
    pub fn unsubscribe(&mut self, token: ObserverToken) -> Option<Box<dyn SceneObserver>> {
        self.observers.unsubscribe(token)
    }

    // ---- visibility -----------------------------------------------------

    /// Visible set last built for `camera`
    pub fn visible_set(&self, camera: CameraId) -> Option<&VisibleSet> {
        self.visible_sets.get(&camera)
    }

    /// Opaque visible list last built for `camera`
    pub fn visible_spatial_list(&self, camera: CameraId) -> &[SpatialHandle] {
        self.visible_sets.get(&camera).map_or(&[][..], VisibleSet::opaque)
    }

    /// Number of cameras with a retained visible set
    pub fn num_visible_sets(&self) -> usize {
        self.visible_sets.len()
    }

    /// Drop everything cached for `camera`: its visible set, pre-render gate
    /// and the distance every registered object recorded to it
    pub fn forget_camera(&mut self, store: &mut ObjectStore, camera: CameraId) {
        self.visible_sets.remove(&camera);
        self.last_pre_render_frame.remove(&camera);
        let registry = lock_registry(&self.spatial_objects);
        for handle in registry.handles() {
            if let Some(node) = store.spatial_mut(*handle) {
                node.spatial_mut().forget_camera(camera);
            }
        }
        log::trace!("Scene '{}': forgot {camera}", self.name);
    }

    /// Forget cameras that built nothing in `frame` or the frame before it
    fn forget_stale_cameras(&mut self, store: &mut ObjectStore, frame: u64) {
        let is_stale = |last: u64| last.saturating_add(1) < frame;
        self.last_pre_render_frame.retain(|_, last| !is_stale(*last));
        let stale: Vec<CameraId> = self
            .visible_sets
            .iter()
            .filter(|(_, set)| is_stale(set.frame))
            .map(|(camera, _)| *camera)
            .collect();
        for camera in stale {
            self.forget_camera(store, camera);
        }
    }

    /// Sort registered objects into the lists `main` and `light` see in `frame`
    ///
    /// Runs at most once per camera and frame. A missing camera logs an error
    /// and leaves no visible set for the frame. Cameras that built nothing in
    /// this frame or the previous one are forgotten.
    pub fn make_visible_set(
        &mut self,
        store: &mut ObjectStore,
        main: Option<&Camera>,
        light: Option<&Camera>,
        frame: u64,
    ) {
        if self.skip_spatial_objects {
            return;
        }
        self.forget_stale_cameras(store, frame);
        let (Some(main), Some(light)) = (main, light) else {
            log::error!(
                "Scene '{}': visible set needs a {} camera",
                self.name,
                if main.is_none() { "main" } else { "light" }
            );
            if let Some(main) = main {
                self.visible_sets.remove(&main.id());
            }
            return;
        };
        if self
            .visible_sets
            .get(&main.id())
            .is_some_and(|set| set.frame == frame)
        {
            return;
        }

        let camera_position = main.position();
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        let mut shadow = Vec::new();
        let mut pre_render = Vec::new();
        {
            let mut registry = lock_registry(&self.spatial_objects);
            registry.settle(self.id, store);
            for &handle in registry.handles() {
                let Some(node) = store.spatial_mut(handle) else {
                    continue;
                };
                let spatial = node.spatial_mut();
                let header = spatial.header();
                if header.has_flag(ObjectFlags::IGNORE) {
                    continue;
                }
                let is_transparent = header.has_flag(ObjectFlags::TRANSPARENT);
                let bounds = spatial.world_bounding_volume();
                let main_visible = !main.is_culled(bounds);
                let light_visible = !light.is_culled(bounds);
                if !main_visible && !light_visible {
                    continue;
                }

                let distance = (spatial.position() - camera_position).norm();
                spatial.set_dist_to_cam(main.id(), distance);
                if main_visible {
                    if is_transparent {
                        transparent.push((handle, distance));
                    } else {
                        opaque.push((handle, distance));
                    }
                }
                if light_visible {
                    shadow.push((handle, distance));
                }
                pre_render.push(handle);
            }
        }

        let set = VisibleSet {
            frame,
            light_camera: Some(light.id()),
            opaque: sorted_handles(opaque, false),
            transparent: sorted_handles(transparent, true),
            shadow: sorted_handles(shadow, false),
            pre_render,
        };
        log::trace!(
            "Scene '{}' frame {frame}: {} opaque, {} transparent, {} shadow for {}",
            self.name,
            set.opaque.len(),
            set.transparent.len(),
            set.shadow.len(),
            main.id()
        );
        self.visible_sets.insert(main.id(), set);

        let (scene, camera) = (self.id, main.id());
        self.observers
            .for_each(|observer| observer.on_after_make_visible_set(scene, camera));
    }

    /// Let every object the camera sees prepare for this frame
    ///
    /// Runs at most once per camera and frame; later calls are no-ops.
    pub fn pre_render(&mut self, store: &mut ObjectStore, param: &RenderParam<'_>, out: &mut RenderParamOut) {
        self.render_pass = param.render_pass;
        let Some(camera) = param.camera else {
            log::error!("Scene '{}': pre_render without a camera", self.name);
            return;
        };
        if self.last_pre_render_frame.get(&camera.id()) == Some(&param.frame) {
            return;
        }
        self.forget_stale_cameras(store, param.frame);
        self.last_pre_render_frame.insert(camera.id(), param.frame);

        if !self.skip_spatial_objects {
            self.make_visible_set(store, param.camera, param.light_camera, param.frame);
            if let Some(set) = self.visible_sets.get(&camera.id()) {
                for handle in &set.pre_render {
                    if let Some(node) = store.spatial_mut(*handle) {
                        node.pre_render(param, out);
                    }
                }
            }
        }

        if self.sky_rendering {
            if let Some(sky) = self.sky {
                if let Some(node) = store.object_mut(sky) {
                    node.pre_render(param, out);
                }
            }
        }

        self.objects.retain(|h| store.contains_object(*h));
        for handle in &self.objects {
            if let Some(node) = store.object_mut(*handle) {
                node.pre_render(param, out);
            }
        }
    }

    /// Draw the lists the render pass in `param` calls for
    ///
    /// Uses the visible sets built by [`Self::pre_render`] for the same frame;
    /// a camera without one renders no positioned objects.
    pub fn render(&mut self, store: &mut ObjectStore, param: &RenderParam<'_>, out: &mut RenderParamOut) {
        self.render_pass = param.render_pass;
        let scene = self.id;
        let frame = param.frame;
        let main_set = param
            .camera
            .and_then(|camera| self.visible_sets.get(&camera.id()))
            .filter(|set| set.frame == frame);

        if !self.skip_spatial_objects {
            if param.render_pass == RenderPass::Shadow {
                let light = param.light_camera.map(Camera::id);
                // Sets sharing the light camera: the lowest main camera id wins
                let shadow_set = main_set.filter(|set| set.light_camera == light).or_else(|| {
                    self.visible_sets
                        .iter()
                        .filter(|(_, set)| set.frame == frame && light.is_some() && set.light_camera == light)
                        .min_by_key(|(camera, _)| **camera)
                        .map(|(_, set)| set)
                });
                match shadow_set {
                    Some(set) => {
                        for handle in &set.shadow {
                            if let Some(node) = store.spatial_mut(*handle) {
                                node.render(param, out);
                            }
                        }
                    }
                    None => log::debug!("Scene '{}': no shadow list for frame {frame}", self.name),
                }
            } else {
                self.observers
                    .for_each(|observer| observer.on_before_rendering_opaques(scene, param, out));
                if main_set.is_none() {
                    log::debug!("Scene '{}': no visible set for frame {frame}", self.name);
                }
                for handle in main_set.map_or(&[][..], VisibleSet::opaque) {
                    if let Some(node) = store.spatial_mut(*handle) {
                        node.render(param, out);
                    }
                }
            }
        }

        if matches!(param.render_pass, RenderPass::Shadow | RenderPass::Depth) {
            return;
        }

        if self.sky_rendering {
            if let Some(sky) = self.sky {
                if let Some(node) = store.object_mut(sky) {
                    node.render(param, out);
                }
            }
        }

        self.observers
            .for_each(|observer| observer.on_before_rendering_transparents(scene, param, out));

        if !self.skip_spatial_objects {
            for handle in main_set.map_or(&[][..], VisibleSet::transparent) {
                if let Some(node) = store.spatial_mut(*handle) {
                    node.render(param, out);
                }
            }
        }

        for handle in &self.objects {
            if let Some(node) = store.object_mut(*handle) {
                node.render(param, out);
            }
        }
    }

    // ---- per-tick -------------------------------------------------------

    /// Advance lights and objects by `delta_time`
    ///
    /// A pending point light refresh is consumed here.
    pub fn update(&mut self, store: &mut ObjectStore, delta_time: f32) {
        let rebuild_lights = std::mem::take(&mut self.refresh_point_light);
        for light in &mut self.directional_lights {
            light.update(delta_time);
        }
        self.point_lights.update(delta_time, rebuild_lights);

        let handles = {
            let mut registry = lock_registry(&self.spatial_objects);
            registry.settle(self.id, store);
            registry.handles().to_vec()
        };
        for handle in handles {
            if let Some(node) = store.spatial_mut(handle) {
                node.update(delta_time);
            }
        }

        self.objects.retain(|h| store.contains_object(*h));
        for handle in &self.objects {
            if let Some(node) = store.object_mut(*handle) {
                node.update(delta_time);
            }
        }
    }

    // ---- lighting -------------------------------------------------------

    /// One of the directional lights
    pub fn directional_light(&self, slot: DirectionalLightSlot) -> &DirectionalLight {
        &self.directional_lights[slot.index()]
    }

    /// One of the directional lights, mutably
    pub fn directional_light_mut(&mut self, slot: DirectionalLightSlot) -> &mut DirectionalLight {
        &mut self.directional_lights[slot.index()]
    }

    /// Direction of the main light
    pub fn main_light_direction(&self) -> Vec3 {
        self.directional_lights[0].direction()
    }

    /// Point a directional light along `direction`
    pub fn set_light_direction(&mut self, slot: DirectionalLightSlot, direction: &Vec3) {
        self.directional_lights[slot.index()].set_direction(direction);
    }

    /// Shader constants for a directional light
    pub fn directional_light_info(&self, slot: DirectionalLightSlot) -> DirectionalLightInfo {
        self.directional_lights[slot.index()].info()
    }

    /// Add a point light
    pub fn create_point_light(&mut self, light: PointLight) -> Result<PointLightHandle, SceneError> {
        self.refresh_point_light = true;
        self.point_lights.create_point_light(light)
    }

    /// Remove a point light
    pub fn remove_point_light(&mut self, handle: PointLightHandle) -> Option<PointLight> {
        self.refresh_point_light = true;
        self.point_lights.remove_point_light(handle)
    }

    /// Edit a point light; the light index is rebuilt on the next update
    pub fn point_light_mut(&mut self, handle: PointLightHandle) -> Option<&mut PointLight> {
        self.refresh_point_light = true;
        self.point_lights.get_mut(handle)
    }

    /// Point light manager
    pub fn point_light_manager(&self) -> &PointLightManager {
        &self.point_lights
    }

    /// Strongest point lights reaching `volume` placed by `transform`
    pub fn gather_point_light_data(&self, volume: &BoundingVolume, transform: &Transform) -> PointLightConstants {
        self.point_lights.gather_point_light_data(volume, transform)
    }

    /// Request a point light index rebuild on the next update
    pub fn refresh_point_light(&mut self) {
        self.refresh_point_light = true;
    }

    /// Whether a point light index rebuild is pending
    pub fn need_to_refresh_point_light(&self) -> bool {
        self.refresh_point_light
    }
}
