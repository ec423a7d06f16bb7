//! Attachment, per-tick updates and scene-owned lighting

use super::{journal, scenario_camera, spawn, spawn_object};
use crate::animation::testing::SpinAnimation;
use crate::config::PipelineConfig;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::lighting::PointLight;
use crate::render::{RenderParam, RenderParamOut, RenderPass};
use crate::scene::{
    DirectionalLightSlot, MeshGroup, ObjectFlags, ObjectStore, ProxyNode, Scene, SceneError, SceneNode,
    SceneObjectType, SpatialNode, SpatialObject,
};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scene_requires_name() {
        assert_eq!(Scene::new("").unwrap_err(), SceneError::InvalidName);
        assert_eq!(Scene::new("   ").unwrap_err(), SceneError::InvalidName);
        let scene = Scene::new("main").unwrap();
        assert_eq!(scene.name(), "main");
        assert_ne!(scene.id(), Scene::new("other").unwrap().id());
    }

    #[test]
    fn test_attach_and_detach_spatial() {
        let mut store = ObjectStore::new();
        let scene = Scene::new("attach").unwrap();
        let log = journal();
        let handle = spawn(&mut store, &scene, &log, "A", Vec3::zeros(), ObjectFlags::empty());

        assert!(store.spatial(handle).unwrap().spatial().header().is_attached(Some(scene.id())));
        assert_eq!(
            scene.attach_spatial_object(&mut store, handle),
            Err(SceneError::AlreadyAttached(scene.id()))
        );

        scene.detach_spatial_object(&mut store, handle).unwrap();
        assert!(!store.spatial(handle).unwrap().spatial().header().is_attached(Some(scene.id())));
        assert_eq!(
            scene.detach_spatial_object(&mut store, handle),
            Err(SceneError::NotAttached(scene.id()))
        );

        store.remove_spatial(handle);
        assert_eq!(scene.attach_spatial_object(&mut store, handle), Err(SceneError::StaleHandle));
    }

    #[test]
    fn test_clear_every_spatial_object() {
        let mut store = ObjectStore::new();
        let scene = Scene::new("clear").unwrap();
        let log = journal();
        let a = spawn(&mut store, &scene, &log, "A", Vec3::zeros(), ObjectFlags::empty());
        spawn(&mut store, &scene, &log, "B", Vec3::zeros(), ObjectFlags::empty());

        scene.clear_every_spatial_object(&mut store);
        assert_eq!(scene.num_spatial_objects(), 0);
        assert!(store.spatial(a).unwrap().spatial().header().scenes().is_empty());
    }

    #[test]
    fn test_sky_goes_through_sky_slot() {
        let mut store = ObjectStore::new();
        let mut scene = Scene::new("sky").unwrap();
        let log = journal();
        let sky = spawn_object(&mut store, &log, "sky", SceneObjectType::SkySphere);
        let other_sky = spawn_object(&mut store, &log, "night", SceneObjectType::SkySphere);

        assert_eq!(scene.attach_object(&mut store, sky), Err(SceneError::SkyAsObject));
        assert!(scene.objects().is_empty());

        assert_eq!(scene.attach_sky(&mut store, sky), Ok(None));
        assert_eq!(scene.attach_sky(&mut store, other_sky), Ok(Some(sky)));
        assert!(!store.object(sky).unwrap().scene_object().is_attached(None));
        assert_eq!(scene.detach_sky(&mut store), Some(other_sky));
        assert_eq!(scene.sky(), None);
    }

    #[test]
    fn test_attach_and_detach_object() {
        let mut store = ObjectStore::new();
        let mut scene = Scene::new("objects").unwrap();
        let log = journal();
        let hud = spawn_object(&mut store, &log, "hud", SceneObjectType::Overlay);

        scene.attach_object(&mut store, hud).unwrap();
        assert_eq!(scene.attach_object(&mut store, hud), Err(SceneError::AlreadyAttached(scene.id())));
        assert_eq!(scene.objects(), &[hud]);
        scene.detach_object(&mut store, hud).unwrap();
        assert!(scene.objects().is_empty());
    }

    #[test]
    fn test_update_consumes_point_light_refresh() {
        let mut store = ObjectStore::new();
        let mut scene = Scene::new("lights").unwrap();
        assert!(!scene.need_to_refresh_point_light());

        let handle = scene
            .create_point_light(PointLight::new(Vec3::new(2.0, 0.0, 0.0), 10.0, Vec3::repeat(1.0), 1.0, None, false))
            .unwrap();
        assert!(scene.need_to_refresh_point_light());
        scene.update(&mut store, 0.016);
        assert!(!scene.need_to_refresh_point_light());

        scene.point_light_mut(handle).unwrap().set_enabled(false);
        assert!(scene.need_to_refresh_point_light());
        scene.update(&mut store, 0.016);
        let constants = scene.gather_point_light_data(
            &crate::spatial::BoundingVolume::sphere(Vec3::zeros(), 1.0),
            &Transform::identity(),
        );
        assert_eq!(constants.count, 0);
    }

    #[test]
    fn test_point_light_limit_from_config() {
        let mut config = PipelineConfig::default();
        config.lighting.max_point_lights = 1;
        let mut scene = Scene::with_config("limited", &config).unwrap();
        let light = PointLight::new(Vec3::zeros(), 5.0, Vec3::repeat(1.0), 1.0, None, false);
        assert!(scene.create_point_light(light.clone()).is_ok());
        assert_eq!(scene.create_point_light(light), Err(SceneError::PointLightLimit(1)));
        assert_eq!(scene.point_light_manager().num_point_lights(), 1);
    }

    #[test]
    fn test_update_advances_animations_and_lights() {
        let mut store = ObjectStore::new();
        let mut scene = Scene::new("tick").unwrap();
        let mut spatial = SpatialObject::with_sphere(Vec3::new(0.0, 10.0, 0.0), 1.0);
        spatial.set_animation(Some(Box::new(SpinAnimation {
            angle_per_second: 1.0,
            ..Default::default()
        })));
        spatial.play_action("spin", true, false);
        let handle = store.insert_spatial(ProxyNode::new(spatial));
        scene.attach_spatial_object(&mut store, handle).unwrap();

        scene
            .directional_light_mut(DirectionalLightSlot::Main)
            .prepare_interpolation(0.0, 0.0, 2.0, Vec3::repeat(1.0), 1.0);
        scene.update(&mut store, 0.5);

        let animated = store.spatial(handle).unwrap().spatial().animated_location().clone();
        assert_relative_eq!(animated.rotation, Quat::from_axis_angle(&Vec3::z_axis(), 0.5), epsilon = 1e-5);
        assert!(scene.directional_light(DirectionalLightSlot::Main).is_interpolating());

        scene.update(&mut store, 0.5);
        assert_relative_eq!(scene.main_light_direction(), Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_environment_defaults() {
        let mut scene = Scene::new("environment").unwrap();
        assert_relative_eq!(scene.wind_vector(), Vec3::zeros());
        scene.set_wind(Vec3::new(0.0, 3.0, 0.0), 2.0);
        assert_relative_eq!(scene.wind_vector(), Vec3::new(0.0, 2.0, 0.0));
        assert!(!scene.is_rtt());
        scene.set_light_direction(DirectionalLightSlot::Secondary, &Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(
            scene.directional_light_info(DirectionalLightSlot::Secondary).direction_intensity.xyz(),
            Vec3::x()
        );
    }

    #[test]
    fn test_mesh_group_renders_through_scene() {
        let mut store = ObjectStore::new();
        let mut scene = Scene::new("mesh group").unwrap();
        let mut group = MeshGroup::new();
        group
            .add_mesh(
                Box::new(ProxyNode::new(SpatialObject::with_sphere(Vec3::zeros(), 1.0))),
                Transform::identity(),
                None,
            )
            .unwrap();
        group
            .add_mesh(
                Box::new(ProxyNode::new(SpatialObject::with_sphere(Vec3::zeros(), 1.0))),
                Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
                Some(0),
            )
            .unwrap();
        group.spatial_mut().set_position(Vec3::new(0.0, 10.0, 0.0));
        let handle = store.insert_spatial(group);
        scene.attach_spatial_object(&mut store, handle).unwrap();

        let camera = scenario_camera();
        let param = RenderParam::new(RenderPass::Normal, &camera, &camera, 1);
        let mut out = RenderParamOut::default();
        scene.pre_render(&mut store, &param, &mut out);
        scene.render(&mut store, &param, &mut out);
        assert_eq!((out.pre_rendered, out.rendered), (2, 2));

        let group = store.spatial_as::<MeshGroup>(handle).unwrap();
        let child = group.mesh_object(1).unwrap().spatial();
        assert_relative_eq!(child.position(), Vec3::new(0.0, 11.0, 0.0));
    }
}
