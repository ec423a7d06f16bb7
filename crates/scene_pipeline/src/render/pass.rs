//! Render passes and the per-call parameters handed to renderable objects

use super::Camera;

/// Named stage of a frame
///
/// Each pass walks a different visible list; see
/// [`crate::scene::Scene::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderPass {
    /// Main colour pass: opaque, sky, transparent, then free objects
    #[default]
    Normal,
    /// Shadow map pass: only objects seen by the light camera
    Shadow,
    /// Depth pre-pass over opaque objects
    Depth,
    /// Occlusion mask for light shafts
    GodrayOcclusionPre,
    /// Depth without colour writes
    DepthOnly,
}

/// Inputs for one pre-render or render walk
#[derive(Debug, Clone, Copy)]
pub struct RenderParam<'a> {
    /// Pass being rendered
    pub render_pass: RenderPass,
    /// Main camera; `None` makes visibility computation a logged no-op
    pub camera: Option<&'a Camera>,
    /// Camera used for the shadow-visible list
    pub light_camera: Option<&'a Camera>,
    /// Current simulation frame
    pub frame: u64,
}

impl<'a> RenderParam<'a> {
    /// Parameters for `pass` seen from `camera` and `light_camera`
    pub fn new(render_pass: RenderPass, camera: &'a Camera, light_camera: &'a Camera, frame: u64) -> Self {
        Self {
            render_pass,
            camera: Some(camera),
            light_camera: Some(light_camera),
            frame,
        }
    }

    /// Same cameras and frame, different pass
    pub fn with_pass(&self, render_pass: RenderPass) -> Self {
        Self { render_pass, ..*self }
    }
}

/// Counters filled in while walking the scene
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderParamOut {
    /// Objects whose `pre_render` ran
    pub pre_rendered: u32,
    /// Objects whose `render` ran
    pub rendered: u32,
    /// Objects skipped by their own pass or distance logic
    pub skipped: u32,
}

/// Capability implemented by anything the scene can draw
///
/// GPU submission happens behind this trait; the scene only decides who is
/// called and in which order.
pub trait Renderable {
    /// Prepare per-frame state; called once per camera per frame
    fn pre_render(&mut self, param: &RenderParam<'_>, out: &mut RenderParamOut);

    /// Submit for the pass in `param`
    fn render(&mut self, param: &RenderParam<'_>, out: &mut RenderParamOut);

    /// Release per-frame state after all passes
    fn post_render(&mut self, _param: &RenderParam<'_>, _out: &mut RenderParamOut) {}
}
