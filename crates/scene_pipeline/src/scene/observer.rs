//! Hooks for injecting work at fixed points of a frame

use super::SceneId;
use crate::render::{CameraId, RenderParam, RenderParamOut};

/// Timing callbacks fired by [`super::Scene`]
///
/// All methods default to no-ops so observers implement only what they need.
pub trait SceneObserver: Send {
    /// A visible set for `camera` was just rebuilt
    fn on_after_make_visible_set(&mut self, _scene: SceneId, _camera: CameraId) {}

    /// About to draw the opaque list
    fn on_before_rendering_opaques(&mut self, _scene: SceneId, _param: &RenderParam<'_>, _out: &mut RenderParamOut) {}

    /// About to draw the transparent list
    fn on_before_rendering_transparents(
        &mut self,
        _scene: SceneId,
        _param: &RenderParam<'_>,
        _out: &mut RenderParamOut,
    ) {
    }
}
