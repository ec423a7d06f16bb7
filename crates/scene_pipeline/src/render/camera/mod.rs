//! # Camera
//!
//! Owns a world transform plus projection parameters and derives the six
//! camera matrices, the world-space frustum and a per-pixel picking ray cache
//! from them.
//!
//! ## Lazy recomputation
//!
//! Transform setters raise a view flag and projection setters raise a
//! projection flag; nothing is recomputed until a query needs it.
//! [`Camera::refresh_transform`] then rebuilds:
//!
//! - `View` / `InverseView` only when the view flag is set
//! - `Proj` / `InverseProj` only when the projection flag is set
//! - `ViewProj` / `InverseViewProj`, the frustum and the ray cache when either
//!   flag was set
//!
//! ## Coordinate system
//!
//! World space is `+X` right, `+Y` forward, `+Z` up. With yz-swap enabled the
//! projection swaps y and z so the clip volume is built along the camera's
//! forward axis. Clip space spans `[-1, 1]` on every axis.
//!
//! ## Overriding camera
//!
//! A camera can redirect all of its transform, projection and query calls
//! to another camera (picture-in-picture, possession). Identity, name and
//! observer subscriptions stay with the original camera.

mod orbit;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{CameraConfig, OrbitConfig};
use crate::foundation::collections::{ObserverTable, ObserverToken};
use crate::foundation::math::{utils, Mat4, Quat, Transform, Vec3, Vec4};
use crate::render::input::InputInjector;
use crate::spatial::{BoundingVolume, Frustum, Ray};

pub use orbit::{orbit_transform, OrbitController, OrbitParams};

static NEXT_CAMERA_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a camera, used to key per-camera caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(u64);

impl std::fmt::Display for CameraId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "camera#{}", self.0)
    }
}

/// Matrices a camera derives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    /// World to camera
    View,
    /// Camera to world
    InverseView,
    /// Camera to clip
    Proj,
    /// Clip to camera
    InverseProj,
    /// World to clip
    ViewProj,
    /// Clip to world
    InverseViewProj,
}

/// Notified after a camera rebuilt its matrices
pub trait CameraObserver {
    /// The view matrix was rebuilt
    fn on_view_matrix_changed(&mut self, _camera: CameraId) {}

    /// The projection matrix was rebuilt
    fn on_proj_matrix_changed(&mut self, _camera: CameraId) {}
}

#[derive(Debug, Clone, PartialEq)]
struct Projection {
    fov: f32,
    width: u32,
    height: u32,
    near: f32,
    far: f32,
    orthogonal: bool,
    yz_swap: bool,
}

impl Projection {
    #[allow(clippy::cast_precision_loss)]
    fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    #[allow(clippy::cast_precision_loss)]
    fn matrix(&self) -> Mat4 {
        let proj = if self.orthogonal {
            let (w, h) = (self.width as f32, self.height as f32);
            orthogonal_matrix(-w * 0.5, h * 0.5, w * 0.5, -h * 0.5, self.near, self.far)
        } else {
            perspective_matrix(self.fov, self.aspect_ratio(), self.near, self.far)
        };
        if self.yz_swap {
            proj * yz_swap_matrix()
        } else {
            proj
        }
    }
}

#[rustfmt::skip]
fn perspective_matrix(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
    let focal = 1.0 / (fov * 0.5).tan();
    let depth = far - near;
    Mat4::new(
        focal / aspect_ratio, 0.0, 0.0, 0.0,
        0.0, focal, 0.0, 0.0,
        0.0, 0.0, (far + near) / depth, -2.0 * far * near / depth,
        0.0, 0.0, 1.0, 0.0,
    )
}

#[rustfmt::skip]
fn orthogonal_matrix(left: f32, top: f32, right: f32, bottom: f32, near: f32, far: f32) -> Mat4 {
    Mat4::new(
        2.0 / (right - left), 0.0, 0.0, -(right + left) / (right - left),
        0.0, 2.0 / (top - bottom), 0.0, -(top + bottom) / (top - bottom),
        0.0, 0.0, 2.0 / (far - near), -(far + near) / (far - near),
        0.0, 0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
fn yz_swap_matrix() -> Mat4 {
    Mat4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
fn view_matrix(transform: &Transform) -> Mat4 {
    let (right, forward, up) = (transform.right(), transform.forward(), transform.up());
    let eye = transform.position;
    Mat4::new(
        right.x, right.y, right.z, -right.dot(&eye),
        forward.x, forward.y, forward.z, -forward.dot(&eye),
        up.x, up.y, up.z, -up.dot(&eye),
        0.0, 0.0, 0.0, 1.0,
    )
}

fn invert_or_identity(matrix: &Mat4, what: &str) -> Mat4 {
    matrix.try_inverse().unwrap_or_else(|| {
        log::error!("Camera: {what} matrix is not invertible, using identity");
        Mat4::identity()
    })
}

fn unproject(inverse_view_proj: &Mat4, x: f32, y: f32, z: f32) -> Vec3 {
    let world = inverse_view_proj * Vec4::new(x, y, z, 1.0);
    world.xyz() / world.w
}

#[derive(Debug)]
struct Derived {
    view_dirty: bool,
    proj_dirty: bool,
    view: Mat4,
    inverse_view: Mat4,
    proj: Mat4,
    inverse_proj: Mat4,
    view_proj: Mat4,
    inverse_view_proj: Mat4,
    frustum: Frustum,
    local_frustum: Option<(u64, Frustum)>,
    ray_cache: HashMap<(i32, i32), Ray>,
    revision: u64,
}

impl Default for Derived {
    fn default() -> Self {
        Self {
            view_dirty: true,
            proj_dirty: true,
            view: Mat4::identity(),
            inverse_view: Mat4::identity(),
            proj: Mat4::identity(),
            inverse_proj: Mat4::identity(),
            view_proj: Mat4::identity(),
            inverse_view_proj: Mat4::identity(),
            frustum: Frustum::default(),
            local_frustum: None,
            ray_cache: HashMap::new(),
            revision: 0,
        }
    }
}

/// Camera with lazily derived matrices
#[derive(Debug)]
pub struct Camera {
    id: CameraId,
    name: String,
    transform: Transform,
    projection: Projection,
    derived: RefCell<Derived>,
    observers: RefCell<ObserverTable<dyn CameraObserver>>,
    orbit: OrbitController,
    main_camera: bool,
    current: bool,
    index: Option<usize>,
    overriding: Option<Rc<RefCell<Camera>>>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Camera with default projection at the origin looking down `+Y`
    pub fn new() -> Self {
        Self::from_config(&CameraConfig::default(), &OrbitConfig::default())
    }

    /// Camera built from configuration
    pub fn from_config(camera: &CameraConfig, orbit: &OrbitConfig) -> Self {
        let id = CameraId(NEXT_CAMERA_ID.fetch_add(1, Ordering::Relaxed));
        log::trace!("Creating {id}");
        Self {
            id,
            name: id.to_string(),
            transform: Transform::identity(),
            projection: Projection {
                fov: utils::deg_to_rad(camera.fov_degrees),
                width: camera.width,
                height: camera.height,
                near: camera.near,
                far: camera.far,
                orthogonal: camera.orthogonal,
                yz_swap: camera.yz_swap,
            },
            derived: RefCell::new(Derived::default()),
            observers: RefCell::new(ObserverTable::new()),
            orbit: OrbitController::new(orbit.clone()),
            main_camera: false,
            current: true,
            index: None,
            overriding: None,
        }
    }

    /// Perspective camera with the given vertical fov (radians) and clip range
    pub fn perspective(fov: f32, width: u32, height: u32, near: f32, far: f32) -> Self {
        let mut camera = Self::new();
        camera.projection.fov = fov;
        camera.projection.width = width;
        camera.projection.height = height;
        camera.projection.near = near;
        camera.projection.far = far;
        camera
    }

    fn redirect(&self, f: impl FnOnce(&mut Self)) -> bool {
        match &self.overriding {
            Some(other) => {
                f(&mut other.borrow_mut());
                true
            }
            None => false,
        }
    }

    fn redirect_ref<R>(&self, f: impl FnOnce(&Self) -> R) -> Option<R> {
        self.overriding.as_ref().map(|other| f(&other.borrow()))
    }

    fn mark_view_dirty(&mut self) {
        self.derived.get_mut().view_dirty = true;
    }

    fn mark_proj_dirty(&mut self) {
        self.derived.get_mut().proj_dirty = true;
    }

    // ---- identity -------------------------------------------------------

    /// Stable identity; never redirected
    pub fn id(&self) -> CameraId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the camera
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether this is the main camera of its renderer
    pub fn is_main_camera(&self) -> bool {
        self.main_camera
    }

    /// Flag this camera as the main camera
    pub fn set_main_camera(&mut self, main: bool) {
        self.main_camera = main;
    }

    /// Whether this camera is currently active; inactive cameras ignore input
    pub fn is_current(&self) -> bool {
        self.current
    }

    /// Activate or deactivate the camera
    pub fn set_current(&mut self, current: bool) {
        self.current = current;
    }

    /// Slot index assigned by the owner
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Assign a slot index
    pub fn set_index(&mut self, index: Option<usize>) {
        self.index = index;
    }

    // ---- overriding -----------------------------------------------------

    /// Camera every call is redirected to, if any
    pub fn overriding_camera(&self) -> Option<Rc<RefCell<Self>>> {
        self.overriding.clone()
    }

    /// Redirect calls to `camera`, or stop redirecting with `None`
    pub fn set_overriding_camera(&mut self, camera: Option<Rc<RefCell<Self>>>) {
        self.overriding = camera;
        self.mark_view_dirty();
        self.mark_proj_dirty();
    }

    // ---- transform ------------------------------------------------------

    /// World transform
    pub fn transform(&self) -> Transform {
        self.redirect_ref(Self::transform)
            .unwrap_or_else(|| self.transform.clone())
    }

    /// Replace the world transform
    pub fn set_transform(&mut self, transform: Transform) {
        if self.redirect(|c| c.set_transform(transform.clone())) {
            return;
        }
        self.transform = transform;
        self.mark_view_dirty();
    }

    /// Position and rotation in one call
    pub fn set_transformation(&mut self, position: Vec3, rotation: Quat) {
        if self.redirect(|c| c.set_transformation(position, rotation)) {
            return;
        }
        self.transform.position = position;
        self.transform.rotation = rotation;
        self.mark_view_dirty();
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.redirect_ref(Self::position)
            .unwrap_or(self.transform.position)
    }

    /// Move the camera
    pub fn set_position(&mut self, position: Vec3) {
        if self.redirect(|c| c.set_position(position)) {
            return;
        }
        self.transform.position = position;
        self.mark_view_dirty();
    }

    /// World rotation
    pub fn rotation(&self) -> Quat {
        self.redirect_ref(Self::rotation)
            .unwrap_or(self.transform.rotation)
    }

    /// Rotate the camera
    pub fn set_rotation(&mut self, rotation: Quat) {
        if self.redirect(|c| c.set_rotation(rotation)) {
            return;
        }
        self.transform.rotation = rotation;
        self.mark_view_dirty();
    }

    /// Viewing direction
    pub fn direction(&self) -> Vec3 {
        self.redirect_ref(Self::direction)
            .unwrap_or_else(|| self.transform.forward())
    }

    /// Look along `direction`, keeping world up
    pub fn set_direction(&mut self, direction: &Vec3) {
        if self.redirect(|c| c.set_direction(direction)) {
            return;
        }
        self.transform.set_direction(direction);
        self.mark_view_dirty();
    }

    /// Look along `direction` with an explicit right vector
    pub fn set_direction_and_right(&mut self, direction: &Vec3, right: &Vec3) {
        if self.redirect(|c| c.set_direction_and_right(direction, right)) {
            return;
        }
        self.transform.set_direction_and_right(direction, right);
        self.mark_view_dirty();
    }

    // ---- projection -----------------------------------------------------

    /// Vertical field of view in radians
    pub fn fov(&self) -> f32 {
        self.redirect_ref(Self::fov).unwrap_or(self.projection.fov)
    }

    /// Set the vertical field of view in radians
    pub fn set_fov(&mut self, fov: f32) {
        if self.redirect(|c| c.set_fov(fov)) {
            return;
        }
        self.projection.fov = fov;
        self.mark_proj_dirty();
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> (u32, u32) {
        self.redirect_ref(Self::viewport)
            .unwrap_or((self.projection.width, self.projection.height))
    }

    /// Resize the viewport
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if self.redirect(|c| c.set_viewport(width, height)) {
            return;
        }
        self.projection.width = width;
        self.projection.height = height;
        self.mark_proj_dirty();
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.redirect_ref(Self::aspect_ratio)
            .unwrap_or_else(|| self.projection.aspect_ratio())
    }

    /// Near and far clip distances
    pub fn near_far(&self) -> (f32, f32) {
        self.redirect_ref(Self::near_far)
            .unwrap_or((self.projection.near, self.projection.far))
    }

    /// Set the clip range
    pub fn set_near_far(&mut self, near: f32, far: f32) {
        if self.redirect(|c| c.set_near_far(near, far)) {
            return;
        }
        self.projection.near = near;
        self.projection.far = far;
        self.mark_proj_dirty();
    }

    /// Whether the projection is orthographic
    pub fn is_orthogonal(&self) -> bool {
        self.redirect_ref(Self::is_orthogonal)
            .unwrap_or(self.projection.orthogonal)
    }

    /// Switch between orthographic and perspective projection
    pub fn set_orthogonal(&mut self, orthogonal: bool) {
        if self.redirect(|c| c.set_orthogonal(orthogonal)) {
            return;
        }
        self.projection.orthogonal = orthogonal;
        self.mark_proj_dirty();
    }

    /// Whether the projection swaps y and z
    pub fn yz_swap(&self) -> bool {
        self.redirect_ref(Self::yz_swap)
            .unwrap_or(self.projection.yz_swap)
    }

    /// Enable or disable the y/z swap
    pub fn set_yz_swap(&mut self, enable: bool) {
        if self.redirect(|c| c.set_yz_swap(enable)) {
            return;
        }
        self.projection.yz_swap = enable;
        self.mark_proj_dirty();
    }

    // ---- derived state --------------------------------------------------

    /// Rebuild whatever the dirty flags require
    pub fn refresh_transform(&self) {
        if self.redirect_ref(Self::refresh_transform).is_some() {
            return;
        }

        let (view_changed, proj_changed) = {
            let mut guard = self.derived.borrow_mut();
            let derived = &mut *guard;
            let view_changed = std::mem::take(&mut derived.view_dirty);
            let proj_changed = std::mem::take(&mut derived.proj_dirty);

            if view_changed {
                derived.view = view_matrix(&self.transform);
                derived.inverse_view = self.transform.to_matrix();
            }
            if proj_changed {
                derived.proj = self.projection.matrix();
                derived.inverse_proj = invert_or_identity(&derived.proj, "projection");
            }
            if view_changed || proj_changed {
                derived.view_proj = derived.proj * derived.view;
                derived.inverse_view_proj = invert_or_identity(&derived.view_proj, "view-projection");
                derived.frustum.update_with_view_proj(&derived.view_proj);
                derived.local_frustum = None;
                derived.ray_cache.clear();
                derived.revision += 1;
            }
            (view_changed, proj_changed)
        };

        if view_changed || proj_changed {
            let id = self.id;
            self.observers.borrow_mut().for_each(|observer| {
                if view_changed {
                    observer.on_view_matrix_changed(id);
                }
                if proj_changed {
                    observer.on_proj_matrix_changed(id);
                }
            });
        }
    }

    /// Number of times the combined matrices were rebuilt
    pub fn revision(&self) -> u64 {
        if let Some(revision) = self.redirect_ref(Self::revision) {
            return revision;
        }
        self.derived.borrow().revision
    }

    /// One of the derived matrices
    pub fn matrix(&self, kind: MatrixKind) -> Mat4 {
        if let Some(matrix) = self.redirect_ref(|c| c.matrix(kind)) {
            return matrix;
        }
        self.refresh_transform();
        let derived = self.derived.borrow();
        match kind {
            MatrixKind::View => derived.view,
            MatrixKind::InverseView => derived.inverse_view,
            MatrixKind::Proj => derived.proj,
            MatrixKind::InverseProj => derived.inverse_proj,
            MatrixKind::ViewProj => derived.view_proj,
            MatrixKind::InverseViewProj => derived.inverse_view_proj,
        }
    }

    /// World space frustum of the current view-projection
    pub fn frustum(&self) -> Frustum {
        if let Some(frustum) = self.redirect_ref(Self::frustum) {
            return frustum;
        }
        self.refresh_transform();
        self.derived.borrow().frustum.clone()
    }

    /// Frustum built from near/far/fov/aspect and carried into world space
    ///
    /// Cached per frame number; any matrix rebuild drops the cache.
    pub fn local_frustum(&self, frame: u64) -> Frustum {
        if let Some(frustum) = self.redirect_ref(|c| c.local_frustum(frame)) {
            return frustum;
        }
        self.refresh_transform();
        if let Some((cached_frame, frustum)) = &self.derived.borrow().local_frustum {
            if *cached_frame == frame {
                return frustum.clone();
            }
        }
        let mut frustum = Frustum::default();
        frustum.set_data(
            self.projection.near,
            self.projection.far,
            self.projection.fov,
            self.projection.aspect_ratio(),
        );
        frustum.transform_by(&self.transform);
        self.derived.borrow_mut().local_frustum = Some((frame, frustum.clone()));
        frustum
    }

    /// Whether `volume` lies entirely outside the frustum
    pub fn is_culled(&self, volume: &BoundingVolume) -> bool {
        if let Some(culled) = self.redirect_ref(|c| c.is_culled(volume)) {
            return culled;
        }
        self.refresh_transform();
        self.derived.borrow().frustum.is_culled(volume)
    }

    /// Picking ray through pixel `(x, y)`, cached until the matrices change
    #[allow(clippy::cast_precision_loss)]
    pub fn screen_pos_to_ray(&self, x: i32, y: i32) -> Ray {
        if let Some(ray) = self.redirect_ref(|c| c.screen_pos_to_ray(x, y)) {
            return ray;
        }
        self.refresh_transform();
        if let Some(ray) = self.derived.borrow().ray_cache.get(&(x, y)) {
            return *ray;
        }

        let width = self.projection.width.max(1) as f32;
        let height = self.projection.height.max(1) as f32;
        let fx = 2.0 * x as f32 / width - 1.0;
        let fy = 1.0 - 2.0 * y as f32 / height;

        let mut derived = self.derived.borrow_mut();
        let origin = unproject(&derived.inverse_view_proj, fx, fy, -1.0);
        let target = unproject(&derived.inverse_view_proj, fx, fy, 0.0);
        let ray = Ray::new(origin, target - origin);
        derived.ray_cache.insert((x, y), ray);
        ray
    }

    /// Pixel that `world` projects to
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn world_to_screen(&self, world: &Vec3) -> (i32, i32) {
        if let Some(pixel) = self.redirect_ref(|c| c.world_to_screen(world)) {
            return pixel;
        }
        self.refresh_transform();
        let clip = self.derived.borrow().view_proj * Vec4::new(world.x, world.y, world.z, 1.0);
        let w = if clip.w.abs() < f32::EPSILON { f32::EPSILON } else { clip.w };
        let (x, y) = (clip.x / w, clip.y / w);
        (
            ((x * 0.5 + 0.5) * self.projection.width as f32).round() as i32,
            ((-y * 0.5 + 0.5) * self.projection.height as f32).round() as i32,
        )
    }

    // ---- observers ------------------------------------------------------

    /// Register for matrix rebuild notifications
    pub fn subscribe(&self, observer: Box<dyn CameraObserver>) -> ObserverToken {
        self.observers.borrow_mut().subscribe(observer)
    }

    /// Stop notifying the observer behind `token`
    pub fn unsubscribe(&self, token: ObserverToken) -> bool {
        self.observers.borrow_mut().unsubscribe(token).is_some()
    }

    // ---- orbit ----------------------------------------------------------

    /// Orbit controller state
    pub fn orbit(&self) -> &OrbitController {
        &self.orbit
    }

    /// Follow `target` in orbit mode, or stop with `None`
    pub fn set_target(&mut self, target: Option<Vec3>) {
        if self.redirect(|c| c.set_target(target)) {
            return;
        }
        self.orbit.set_target(target);
    }

    /// Jump to `distance` from the target
    pub fn set_distance_from_target(&mut self, distance: f32) {
        if self.redirect(|c| c.set_distance_from_target(distance)) {
            return;
        }
        self.orbit.set_distance(distance);
    }

    /// Distance used before any input arrives
    pub fn set_initial_dist_to_target(&mut self, distance: f32) {
        self.set_distance_from_target(distance);
    }

    /// Enable or disable orbit input
    pub fn set_enable_input(&mut self, enable: bool) {
        if self.redirect(|c| c.set_enable_input(enable)) {
            return;
        }
        self.orbit.set_enabled(enable);
    }

    /// Accumulate orbit input; ignored unless this camera is current
    pub fn consume_input(&mut self, injector: &mut dyn InputInjector) {
        if self.redirect(|c| c.consume_input(injector)) {
            return;
        }
        if self.current {
            self.orbit.consume_input(injector);
        }
    }

    /// Fold accumulated input into the camera transform for `frame`
    pub fn process_input_data(&mut self, frame: u64, delta_time: f32) {
        if self.redirect(|c| c.process_input_data(frame, delta_time)) {
            return;
        }
        if !self.current {
            return;
        }
        if let Some(transform) = self.orbit.process(frame, delta_time) {
            self.set_transform(transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::input::InputState;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn scenario_camera() -> Camera {
        Camera::perspective(utils::deg_to_rad(90.0), 800, 800, 1.0, 100.0)
    }

    struct CountingObserver {
        view: Rc<Cell<u32>>,
        proj: Rc<Cell<u32>>,
    }

    impl CameraObserver for CountingObserver {
        fn on_view_matrix_changed(&mut self, _camera: CameraId) {
            self.view.set(self.view.get() + 1);
        }

        fn on_proj_matrix_changed(&mut self, _camera: CameraId) {
            self.proj.set(self.proj.get() + 1);
        }
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Camera::new().id(), Camera::new().id());
    }

    #[test]
    fn test_frustum_scenario() {
        let camera = scenario_camera();
        assert!(!camera.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 10.0, 0.0), 1.0)));
        assert!(camera.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 200.0, 0.0), 1.0)));
        assert!(camera.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, -10.0, 0.0), 1.0)));
        assert!(camera.is_culled(&BoundingVolume::sphere(Vec3::new(30.0, 10.0, 0.0), 1.0)));
    }

    #[test]
    fn test_recompute_only_when_dirty() {
        let camera = scenario_camera();
        camera.matrix(MatrixKind::ViewProj);
        let revision = camera.revision();
        camera.matrix(MatrixKind::View);
        camera.frustum();
        assert_eq!(camera.revision(), revision);

        let mut camera = camera;
        camera.set_position(Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(camera.revision(), revision);
        camera.matrix(MatrixKind::ViewProj);
        assert_eq!(camera.revision(), revision + 1);
    }

    #[test]
    fn test_observers_see_which_matrix_changed() {
        let mut camera = scenario_camera();
        let view = Rc::new(Cell::new(0));
        let proj = Rc::new(Cell::new(0));
        camera.refresh_transform();
        let token = camera.subscribe(Box::new(CountingObserver { view: view.clone(), proj: proj.clone() }));

        camera.set_fov(utils::deg_to_rad(60.0));
        camera.refresh_transform();
        assert_eq!((view.get(), proj.get()), (0, 1));

        camera.set_position(Vec3::new(1.0, 0.0, 0.0));
        camera.refresh_transform();
        assert_eq!((view.get(), proj.get()), (1, 1));

        camera.refresh_transform();
        assert_eq!((view.get(), proj.get()), (1, 1));

        assert!(camera.unsubscribe(token));
        camera.set_position(Vec3::new(2.0, 0.0, 0.0));
        camera.refresh_transform();
        assert_eq!(view.get(), 1);
    }

    #[test]
    fn test_view_matrix_inverts_transform() {
        let mut camera = scenario_camera();
        camera.set_transformation(
            Vec3::new(3.0, -2.0, 5.0),
            Quat::from_axis_angle(&Vec3::z_axis(), 0.4),
        );
        let product = camera.matrix(MatrixKind::View) * camera.matrix(MatrixKind::InverseView);
        assert_relative_eq!(product, Mat4::identity(), epsilon = 1e-5);
        let product = camera.matrix(MatrixKind::ViewProj) * camera.matrix(MatrixKind::InverseViewProj);
        assert_relative_eq!(product, Mat4::identity(), epsilon = 1e-4);
    }

    #[test]
    fn test_center_ray_looks_forward() {
        let camera = scenario_camera();
        let ray = camera.screen_pos_to_ray(400, 400);
        assert_relative_eq!(ray.direction, Vec3::y(), epsilon = 1e-4);
        assert_relative_eq!(ray.origin, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_ray_cache_cleared_on_move() {
        let mut camera = scenario_camera();
        let before = camera.screen_pos_to_ray(400, 400);
        assert_eq!(camera.screen_pos_to_ray(400, 400), before);
        camera.set_position(Vec3::new(0.0, 0.0, 10.0));
        let after = camera.screen_pos_to_ray(400, 400);
        assert_relative_eq!(after.origin, Vec3::new(0.0, 1.0, 10.0), epsilon = 1e-4);
    }

    #[test]
    fn test_world_to_screen() {
        let camera = scenario_camera();
        assert_eq!(camera.world_to_screen(&Vec3::new(0.0, 10.0, 0.0)), (400, 400));
        let (x, y) = camera.world_to_screen(&Vec3::new(5.0, 10.0, 5.0));
        assert_eq!((x, y), (600, 200));
    }

    #[test]
    fn test_yz_swap_off_looks_down_z() {
        let mut camera = scenario_camera();
        camera.set_yz_swap(false);
        assert!(!camera.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 0.0, 10.0), 1.0)));
        assert!(camera.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 10.0, 0.0), 1.0)));
    }

    #[test]
    fn test_orthogonal_projection() {
        let mut camera = Camera::perspective(utils::deg_to_rad(90.0), 20, 10, 1.0, 50.0);
        camera.set_orthogonal(true);
        assert!(!camera.is_culled(&BoundingVolume::sphere(Vec3::new(8.0, 30.0, 0.0), 0.5)));
        assert!(camera.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 30.0, 7.0), 0.5)));
    }

    #[test]
    fn test_overriding_camera_redirects() {
        let substitute = Rc::new(RefCell::new(scenario_camera()));
        let mut camera = Camera::new();
        camera.set_overriding_camera(Some(substitute.clone()));

        camera.set_position(Vec3::new(0.0, 0.0, 7.0));
        assert_relative_eq!(substitute.borrow().position(), Vec3::new(0.0, 0.0, 7.0));
        assert_eq!(camera.transform().position, Vec3::new(0.0, 0.0, 7.0));
        assert_eq!(camera.near_far(), (1.0, 100.0));
        assert!(camera.is_culled(&BoundingVolume::sphere(Vec3::new(0.0, 200.0, 7.0), 1.0)));
        assert_ne!(camera.id(), substitute.borrow().id());

        camera.set_overriding_camera(None);
        assert_eq!(camera.position(), Vec3::zeros());
    }

    #[test]
    fn test_local_frustum_cached_per_frame() {
        let mut camera = scenario_camera();
        let first = camera.local_frustum(1);
        assert!(first.contains(&Vec3::new(0.0, 10.0, 0.0)));
        assert_eq!(camera.local_frustum(1), first);

        camera.set_position(Vec3::new(0.0, 0.0, 100.0));
        let moved = camera.local_frustum(1);
        assert!(moved.contains(&Vec3::new(0.0, 10.0, 100.0)));
        assert!(!moved.contains(&Vec3::new(0.0, 10.0, 0.0)));
    }

    #[test]
    fn test_orbit_input_moves_camera() {
        let mut camera = Camera::new();
        camera.set_target(Some(Vec3::new(0.0, 0.0, 0.0)));
        camera.process_input_data(1, 0.016);
        assert_relative_eq!(camera.position(), Vec3::new(0.0, -10.0, 0.0), epsilon = 1e-5);

        camera.consume_input(&mut InputState::scroll(1));
        camera.process_input_data(2, 1.0);
        assert_relative_eq!(camera.position(), Vec3::new(0.0, -8.5, 0.0), epsilon = 1e-4);

        camera.set_current(false);
        camera.consume_input(&mut InputState::scroll(1));
        camera.process_input_data(3, 1.0);
        assert_relative_eq!(camera.position(), Vec3::new(0.0, -8.5, 0.0), epsilon = 1e-4);
    }
}
