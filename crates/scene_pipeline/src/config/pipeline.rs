//! # Pipeline Configuration
//!
//! Groups the tunables of each subsystem into its own section so a config
//! file can override one area without restating the others:
//!
//! ```toml
//! [camera]
//! fov_degrees = 60.0
//!
//! [orbit]
//! max_distance = 120.0
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use super::Config;

/// # Pipeline Configuration
///
/// Root configuration consumed by [`crate::render::Camera::from_config`],
/// [`crate::scene::Scene::with_config`] and
/// [`crate::scene::MeshGroup::with_config`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Projection defaults for new cameras
    pub camera: CameraConfig,
    /// Orbit/follow camera behaviour
    pub orbit: OrbitConfig,
    /// Light limits and default directional lights
    pub lighting: LightingConfig,
    /// Mesh group render culling
    pub mesh_group: MeshGroupConfig,
}

impl Config for PipelineConfig {}

/// Camera projection defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Use an orthographic projection instead of a perspective one
    pub orthogonal: bool,
    /// Swap the y and z axes so camera space is (right, forward, up)
    pub yz_swap: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 0.5,
            far: 1500.0,
            width: 1600,
            height: 900,
            orthogonal: false,
            yz_swap: true,
        }
    }
}

/// Orbit/follow camera behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Distance to the target before any input
    pub initial_distance: f32,
    /// Closest allowed distance to the target
    pub min_distance: f32,
    /// Farthest allowed distance to the target
    pub max_distance: f32,
    /// Pitch stops this many degrees short of straight up or down
    pub pitch_margin_degrees: f32,
    /// Time for the smoothed values to reach a new target, in seconds
    pub smoothing_seconds: f32,
    /// Zoom speed grows with distance by this factor (never below 1x)
    pub wheel_distance_scale: f32,
    /// Zoom multiplier while shift is held
    pub fine_zoom_factor: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            initial_distance: 10.0,
            min_distance: 2.0,
            max_distance: 300.0,
            pitch_margin_degrees: 5.0,
            smoothing_seconds: 0.2,
            wheel_distance_scale: 0.05,
            fine_zoom_factor: 0.1,
        }
    }
}

/// Directional light defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLightConfig {
    /// Direction toward the light, normalised on use
    pub direction: [f32; 3],
    /// Diffuse colour
    pub diffuse: [f32; 3],
    /// Specular colour
    pub specular: [f32; 3],
    /// Intensity multiplier
    pub intensity: f32,
}

/// Light limits and default directional lights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Upper bound on live point lights per scene
    pub max_point_lights: usize,
    /// Point lights gathered for a single object
    pub max_lights_per_object: usize,
    /// Initial state of the two directional light slots
    pub directional: [DirectionalLightConfig; 2],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            max_point_lights: 20,
            max_lights_per_object: 3,
            directional: [
                DirectionalLightConfig {
                    direction: [-3.0, 1.0, 1.0],
                    diffuse: [1.0, 1.0, 1.0],
                    specular: [1.0, 1.0, 1.0],
                    intensity: 1.0,
                },
                DirectionalLightConfig {
                    direction: [3.0, 1.0, -1.0],
                    diffuse: [0.8, 0.4, 0.1],
                    specular: [0.0, 0.0, 0.0],
                    intensity: 1.0,
                },
            ],
        }
    }
}

/// Distance thresholds for skipping small mesh groups in the normal pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshGroupConfig {
    /// Enable distance based culling
    pub distance_cull: bool,
    /// `(distance, radius)` pairs: skip when farther than distance and smaller than radius
    pub cull_thresholds: Vec<(f32, f32)>,
}

impl Default for MeshGroupConfig {
    fn default() -> Self {
        Self {
            distance_cull: true,
            cull_thresholds: vec![(100.0, 5.0), (150.0, 10.0)],
        }
    }
}

impl MeshGroupConfig {
    /// Whether a group of `radius` at `distance` is too small to bother drawing
    pub fn should_cull(&self, distance: f32, radius: f32) -> bool {
        self.distance_cull
            && self
                .cull_thresholds
                .iter()
                .any(|&(max_distance, min_radius)| distance > max_distance && radius < min_radius)
    }
}
