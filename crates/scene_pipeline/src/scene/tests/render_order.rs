//! Pass dispatch and draw ordering

use super::{entries, journal, rendered, scenario_camera, spawn, spawn_object, Journal, RecordingObserver};
use crate::foundation::math::Vec3;
use crate::render::{Camera, RenderParam, RenderParamOut, RenderPass};
use crate::scene::{ObjectFlags, ObjectStore, ProxyNode, Scene, SceneObjectType, SpatialObject};

/// Opaque A, transparent C and D, a sky, one overlay and a recording observer
fn staged_scene(log: &Journal) -> (Scene, ObjectStore) {
    let mut store = ObjectStore::new();
    let mut scene = Scene::new("render order").unwrap();
    spawn(&mut store, &scene, log, "A", Vec3::new(0.0, 10.0, 0.0), ObjectFlags::empty());
    spawn(&mut store, &scene, log, "C", Vec3::new(0.0, 20.0, 0.0), ObjectFlags::TRANSPARENT);
    spawn(&mut store, &scene, log, "D", Vec3::new(0.0, 50.0, 0.0), ObjectFlags::TRANSPARENT);
    spawn(&mut store, &scene, log, "B", Vec3::new(0.0, 200.0, 0.0), ObjectFlags::empty());

    let sky = spawn_object(&mut store, log, "sky", SceneObjectType::SkySphere);
    scene.attach_sky(&mut store, sky).unwrap();
    let hud = spawn_object(&mut store, log, "hud", SceneObjectType::Overlay);
    scene.attach_object(&mut store, hud).unwrap();
    scene.subscribe(Box::new(RecordingObserver { journal: log.clone() }));
    (scene, store)
}

fn frame(scene: &mut Scene, store: &mut ObjectStore, camera: &Camera, pass: RenderPass, frame: u64) -> RenderParamOut {
    let param = RenderParam::new(pass, camera, camera, frame);
    let mut out = RenderParamOut::default();
    scene.pre_render(store, &param, &mut out);
    scene.render(store, &param, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_pass_order() {
        let log = journal();
        let (mut scene, mut store) = staged_scene(&log);
        let camera = scenario_camera();

        let out = frame(&mut scene, &mut store, &camera, RenderPass::Normal, 1);
        assert_eq!(
            rendered(&log),
            ["<opaques>", "A", "sky", "<transparents>", "D", "C", "hud"]
        );
        assert_eq!(out.rendered, 5);
        assert_eq!(scene.render_pass(), RenderPass::Normal);
    }

    #[test]
    fn test_shadow_pass_draws_shadow_list_only() {
        let log = journal();
        let (mut scene, mut store) = staged_scene(&log);
        let camera = scenario_camera();

        frame(&mut scene, &mut store, &camera, RenderPass::Shadow, 1);
        assert_eq!(rendered(&log), ["A", "C", "D"]);
    }

    #[test]
    fn test_depth_pass_stops_after_opaques() {
        let log = journal();
        let (mut scene, mut store) = staged_scene(&log);
        let camera = scenario_camera();

        frame(&mut scene, &mut store, &camera, RenderPass::Depth, 1);
        assert_eq!(rendered(&log), ["<opaques>", "A"]);
    }

    #[test]
    fn test_shadow_then_normal_share_one_visible_set() {
        let log = journal();
        let (mut scene, mut store) = staged_scene(&log);
        let camera = scenario_camera();

        frame(&mut scene, &mut store, &camera, RenderPass::Shadow, 7);
        frame(&mut scene, &mut store, &camera, RenderPass::Normal, 7);
        let seen = entries(&log);
        assert_eq!(seen.iter().filter(|e| e.as_str() == "<visible>").count(), 1);
        assert_eq!(seen.iter().filter(|e| e.as_str() == "pre:A").count(), 1);
        assert_eq!(seen.iter().filter(|e| e.as_str() == "pre:sky").count(), 1);
    }

    #[test]
    fn test_sky_rendering_toggle() {
        let log = journal();
        let (mut scene, mut store) = staged_scene(&log);
        let camera = scenario_camera();
        scene.toggle_sky_rendering();
        assert!(!scene.sky_rendering());

        frame(&mut scene, &mut store, &camera, RenderPass::Normal, 1);
        assert!(!entries(&log).iter().any(|e| e.contains("sky")));
    }

    #[test]
    fn test_render_without_visible_set_skips_spatial_lists() {
        let log = journal();
        let (mut scene, mut store) = staged_scene(&log);
        let camera = scenario_camera();
        let param = RenderParam::new(RenderPass::Normal, &camera, &camera, 1);
        let mut out = RenderParamOut::default();

        scene.render(&mut store, &param, &mut out);
        assert_eq!(rendered(&log), ["<opaques>", "sky", "<transparents>", "hud"]);
    }

    #[test]
    fn test_pre_render_once_per_camera_and_frame() {
        let mut store = ObjectStore::new();
        let mut scene = Scene::new("idempotent").unwrap();
        let handle = store.insert_spatial(ProxyNode::new(SpatialObject::with_sphere(Vec3::new(0.0, 10.0, 0.0), 1.0)));
        scene.attach_spatial_object(&mut store, handle).unwrap();

        let camera = scenario_camera();
        let other = scenario_camera();
        let mut out = RenderParamOut::default();
        let param = RenderParam::new(RenderPass::Normal, &camera, &camera, 1);
        scene.pre_render(&mut store, &param, &mut out);
        scene.pre_render(&mut store, &param, &mut out);
        assert_eq!(scene.visible_set(camera.id()).unwrap().pre_render(), &[handle]);
        assert_eq!(store.spatial_as::<ProxyNode>(handle).unwrap().pre_render_calls, 1);

        scene.pre_render(&mut store, &RenderParam::new(RenderPass::Normal, &other, &other, 1), &mut out);
        assert_eq!(store.spatial_as::<ProxyNode>(handle).unwrap().pre_render_calls, 2);

        scene.pre_render(&mut store, &RenderParam::new(RenderPass::Normal, &camera, &camera, 2), &mut out);
        assert_eq!(store.spatial_as::<ProxyNode>(handle).unwrap().pre_render_calls, 3);
        assert_eq!(out.pre_rendered, 3);
    }

    #[test]
    fn test_pre_render_without_camera_is_noop() {
        let log = journal();
        let (mut scene, mut store) = staged_scene(&log);
        let param = RenderParam {
            render_pass: RenderPass::Normal,
            camera: None,
            light_camera: None,
            frame: 1,
        };
        let mut out = RenderParamOut::default();
        scene.pre_render(&mut store, &param, &mut out);
        assert!(entries(&log).is_empty());
        assert_eq!(out, RenderParamOut::default());
    }

    #[test]
    fn test_shared_light_camera_uses_lowest_camera_id() {
        let log = journal();
        let mut store = ObjectStore::new();
        let mut scene = Scene::new("shared light").unwrap();
        spawn(&mut store, &scene, &log, "near", Vec3::new(0.0, 10.0, 0.0), ObjectFlags::empty());
        spawn(&mut store, &scene, &log, "far", Vec3::new(0.0, 30.0, 0.0), ObjectFlags::empty());

        let mut opposite = scenario_camera();
        opposite.set_position(Vec3::new(0.0, 60.0, 0.0));
        opposite.set_direction(&Vec3::new(0.0, -1.0, 0.0));
        let origin = scenario_camera();
        let light = scenario_camera();
        assert!(opposite.id() < origin.id());

        scene.make_visible_set(&mut store, Some(&origin), Some(&light), 1);
        scene.make_visible_set(&mut store, Some(&opposite), Some(&light), 1);
        assert_eq!(scene.num_visible_sets(), 2);

        let param = RenderParam::new(RenderPass::Shadow, &light, &light, 1);
        scene.render(&mut store, &param, &mut RenderParamOut::default());
        assert_eq!(rendered(&log), ["far", "near"]);
    }
}
