//! Orbit viewer
//!
//! Headless driver for the scene pipeline. Scatters proxy objects and a small
//! turret mesh group around the origin, orbits a camera around them with
//! synthetic mouse input and logs what each pass draws.
//!
//! ```text
//! orbit_viewer [config.toml|config.ron] [frames]
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_pipeline::config::{Config, ConfigError, PipelineConfig};
use scene_pipeline::foundation::math::{Quat, Transform, Vec3};
use scene_pipeline::lighting::PointLight;
use scene_pipeline::render::{Camera, InputState, RenderParam, RenderParamOut, RenderPass};
use scene_pipeline::scene::{
    MeshGroup, ObjectFlags, ObjectStore, ProxyNode, Scene, SceneError, SpatialHandle, SpatialNode, SpatialObject,
};
use scene_pipeline::spatial::BoundingVolume;

const DEFAULT_FRAMES: u64 = 240;
const FRAME_TIME: f32 = 1.0 / 60.0;
const OBJECT_COUNT: usize = 200;

#[derive(thiserror::Error, Debug)]
enum ViewerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Invalid frame count '{0}'")]
    InvalidFrames(String),
}

struct Viewer {
    config: PipelineConfig,
    store: ObjectStore,
    scene: Scene,
    camera: Camera,
    light_camera: Camera,
    turret: SpatialHandle,
}

impl Viewer {
    fn new(config: PipelineConfig) -> Result<Self, ViewerError> {
        log::info!("Creating orbit viewer scene...");
        let mut store = ObjectStore::new();
        let mut scene = Scene::with_config("orbit viewer", &config)?;

        let mut rng = StdRng::seed_from_u64(7);
        let field = BoundingVolume::aabb(Vec3::new(-60.0, -60.0, -5.0), Vec3::new(60.0, 60.0, 5.0));
        for index in 0..OBJECT_COUNT {
            let position = field.random_pos_in_volume(&mut rng, None);
            let mut spatial = SpatialObject::with_sphere(position, rng.gen_range(0.5..3.0));
            spatial.header_mut().set_name(format!("rock{index}"));
            if index % 5 == 0 {
                spatial.header_mut().modify_flag(ObjectFlags::TRANSPARENT, true);
            }
            let handle = store.insert_spatial(ProxyNode::new(spatial));
            scene.attach_spatial_object(&mut store, handle)?;
        }

        let turret = store.insert_spatial(Self::build_turret(&config)?);
        scene.attach_spatial_object(&mut store, turret)?;

        for index in 0..4_u8 {
            let angle = f32::from(index) * std::f32::consts::FRAC_PI_2;
            scene.create_point_light(PointLight::new(
                Vec3::new(angle.cos() * 20.0, angle.sin() * 20.0, 4.0),
                25.0,
                Vec3::new(1.0, 0.8, 0.6),
                1.5,
                None,
                false,
            ))?;
        }

        let mut camera = Camera::from_config(&config.camera, &config.orbit);
        camera.set_name("main");
        camera.set_main_camera(true);
        camera.set_target(Some(Vec3::zeros()));
        camera.set_enable_input(true);

        let mut light_camera = Camera::from_config(&config.camera, &config.orbit);
        light_camera.set_name("sun");
        light_camera.set_current(false);
        light_camera.set_position(Vec3::new(-40.0, -40.0, 60.0));
        light_camera.set_direction(&(Vec3::zeros() - Vec3::new(-40.0, -40.0, 60.0)));

        Ok(Self {
            config,
            store,
            scene,
            camera,
            light_camera,
            turret,
        })
    }

    /// Base, rotating head and barrel
    fn build_turret(config: &PipelineConfig) -> Result<MeshGroup, SceneError> {
        let part = |name: &str, radius: f32| -> Box<dyn SpatialNode> {
            let mut spatial = SpatialObject::with_sphere(Vec3::zeros(), radius);
            spatial.header_mut().set_name(name);
            Box::new(ProxyNode::new(spatial))
        };

        let mut turret = MeshGroup::with_config(config.mesh_group.clone());
        turret.spatial_mut().header_mut().set_name("turret");
        let base = turret.add_mesh(part("base", 2.0), Transform::identity(), None)?;
        let head = turret.add_mesh(part("head", 1.5), Transform::from_position(Vec3::new(0.0, 0.0, 2.0)), Some(base))?;
        turret.add_mesh(part("barrel", 1.0), Transform::from_position(Vec3::new(0.0, 2.0, 0.0)), Some(head))?;
        turret.spatial_mut().set_position(Vec3::new(0.0, 5.0, 0.0));
        Ok(turret)
    }

    fn frame(&mut self, frame: u64, delta_time: f32) -> (RenderParamOut, RenderParamOut) {
        let mut input = InputState::drag(4, 1);
        self.camera.consume_input(&mut input);
        self.camera.process_input_data(frame, delta_time);

        if let Some(turret) = self.store.spatial_as_mut::<MeshGroup>(self.turret) {
            let spin = Quat::from_axis_angle(&Vec3::z_axis(), delta_time);
            if let Err(err) = turret.add_mesh_rotation(1, &spin) {
                log::warn!("Turret rotation failed: {err}");
            }
        }
        self.scene.update(&mut self.store, delta_time);

        let shadow_param = RenderParam::new(RenderPass::Shadow, &self.camera, &self.light_camera, frame);
        let mut shadow = RenderParamOut::default();
        self.scene.pre_render(&mut self.store, &shadow_param, &mut shadow);
        self.scene.render(&mut self.store, &shadow_param, &mut shadow);

        let mut normal = RenderParamOut::default();
        let normal_param = shadow_param.with_pass(RenderPass::Normal);
        self.scene.pre_render(&mut self.store, &normal_param, &mut normal);
        self.scene.render(&mut self.store, &normal_param, &mut normal);
        (shadow, normal)
    }

    fn run(&mut self, frames: u64) {
        log::info!(
            "Running {frames} frames with {} objects (fov {}°)",
            self.scene.num_spatial_objects(),
            self.config.camera.fov_degrees
        );
        let mut clock = scene_pipeline::foundation::time::FrameClock::new();
        for _ in 0..frames {
            let frame = clock.tick(FRAME_TIME);
            let (shadow, normal) = self.frame(frame, clock.delta_time());
            if frame % 60 == 0 {
                let set = self.scene.visible_set(self.camera.id());
                log::info!(
                    "Frame {frame}: camera at {:.1?}, {} opaque / {} transparent / {} shadow visible, \
                     drew {} (shadow {}), skipped {}",
                    self.camera.position(),
                    set.map_or(0, |s| s.opaque().len()),
                    set.map_or(0, |s| s.transparent().len()),
                    set.map_or(0, |s| s.shadow().len()),
                    normal.rendered,
                    shadow.rendered,
                    normal.skipped
                );
            }
        }
        log::info!("Finished after {:.2}s of simulated time", clock.total_time());
    }
}

fn parse_args() -> Result<(PipelineConfig, u64), ViewerError> {
    let mut config = PipelineConfig::default();
    let mut frames = DEFAULT_FRAMES;
    for arg in std::env::args().skip(1) {
        if arg.ends_with(".toml") || arg.ends_with(".ron") {
            log::info!("Loading config from {arg}");
            config = PipelineConfig::load_from_file(&arg)?;
        } else {
            frames = arg.parse().map_err(|_| ViewerError::InvalidFrames(arg.clone()))?;
        }
    }
    Ok((config, frames))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let (config, frames) = parse_args()?;
    let mut viewer = Viewer::new(config)?;
    viewer.run(frames);
    Ok(())
}
