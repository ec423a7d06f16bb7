//! Scene scenario tests
//!
//! Shared fixtures: a camera at the origin looking down `+Y` and nodes that
//! write every call they receive into a shared journal.

mod lifecycle;
mod render_order;

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    ObjectFlags, ObjectHandle, ObjectStore, Scene, SceneId, SceneNode, SceneObject, SceneObjectType, SceneObserver,
    SpatialHandle, SpatialNode, SpatialObject,
};
use crate::foundation::logging;
use crate::foundation::math::{utils, Vec3};
use crate::render::{Camera, CameraId, RenderParam, RenderParamOut, Renderable};

pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    logging::init_for_tests();
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn entries(journal: &Journal) -> MutexGuard<'_, Vec<String>> {
    journal.lock().unwrap()
}

/// 90 degree fov, near 1, far 100
pub(crate) fn scenario_camera() -> Camera {
    Camera::perspective(utils::deg_to_rad(90.0), 800, 800, 1.0, 100.0)
}

pub(crate) struct RecordingNode {
    spatial: SpatialObject,
    journal: Journal,
}

impl Renderable for RecordingNode {
    fn pre_render(&mut self, _param: &RenderParam<'_>, out: &mut RenderParamOut) {
        entries(&self.journal).push(format!("pre:{}", self.spatial.header().name()));
        out.pre_rendered += 1;
    }

    fn render(&mut self, _param: &RenderParam<'_>, out: &mut RenderParamOut) {
        entries(&self.journal).push(self.spatial.header().name().to_owned());
        out.rendered += 1;
    }
}

impl SpatialNode for RecordingNode {
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

pub(crate) struct RecordingObject {
    header: SceneObject,
    journal: Journal,
}

impl Renderable for RecordingObject {
    fn pre_render(&mut self, _param: &RenderParam<'_>, _out: &mut RenderParamOut) {
        entries(&self.journal).push(format!("pre:{}", self.header.name()));
    }

    fn render(&mut self, _param: &RenderParam<'_>, out: &mut RenderParamOut) {
        entries(&self.journal).push(self.header.name().to_owned());
        out.rendered += 1;
    }
}

impl SceneNode for RecordingObject {
    fn scene_object(&self) -> &SceneObject {
        &self.header
    }

    fn scene_object_mut(&mut self) -> &mut SceneObject {
        &mut self.header
    }
}

/// Writes `<visible>`, `<opaques>` and `<transparents>` at each hook
pub(crate) struct RecordingObserver {
    pub journal: Journal,
}

impl SceneObserver for RecordingObserver {
    fn on_after_make_visible_set(&mut self, _scene: SceneId, _camera: CameraId) {
        entries(&self.journal).push("<visible>".to_owned());
    }

    fn on_before_rendering_opaques(&mut self, _scene: SceneId, _param: &RenderParam<'_>, _out: &mut RenderParamOut) {
        entries(&self.journal).push("<opaques>".to_owned());
    }

    fn on_before_rendering_transparents(
        &mut self,
        _scene: SceneId,
        _param: &RenderParam<'_>,
        _out: &mut RenderParamOut,
    ) {
        entries(&self.journal).push("<transparents>".to_owned());
    }
}

/// Insert a unit sphere named `name` at `position` and attach it to `scene`
pub(crate) fn spawn(
    store: &mut ObjectStore,
    scene: &Scene,
    journal: &Journal,
    name: &str,
    position: Vec3,
    flags: ObjectFlags,
) -> SpatialHandle {
    let mut spatial = SpatialObject::with_sphere(position, 1.0);
    spatial.header_mut().set_name(name);
    spatial.header_mut().set_flags(flags);
    let handle = store.insert_spatial(RecordingNode {
        spatial,
        journal: journal.clone(),
    });
    scene
        .attach_spatial_object(store, handle)
        .expect("fresh handle attaches");
    handle
}

/// Insert a non-spatial recording object
pub(crate) fn spawn_object(
    store: &mut ObjectStore,
    journal: &Journal,
    name: &str,
    object_type: SceneObjectType,
) -> ObjectHandle {
    let mut header = SceneObject::new(object_type);
    header.set_name(name);
    store.insert_object(RecordingObject {
        header,
        journal: journal.clone(),
    })
}

/// Journal entries with pre-render notes filtered out
pub(crate) fn rendered(journal: &Journal) -> Vec<String> {
    entries(journal)
        .iter()
        .filter(|entry| !entry.starts_with("pre:") && entry.as_str() != "<visible>")
        .cloned()
        .collect()
}
