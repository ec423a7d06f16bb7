//! Orbit/follow controller
//!
//! User input accumulates into yaw, pitch and distance deltas. Once per frame
//! the deltas are folded into clamped goal values, and the values actually
//! used for the camera glide from where they were toward the goal over the
//! configured smoothing window.

use crate::config::OrbitConfig;
use crate::foundation::math::{basis_rotation, constants, utils, Quat, Transform, Vec3};
use crate::render::input::{InputInjector, ModifierKey};

/// Spherical placement of the camera around its target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitParams {
    /// Rotation around world up, radians
    pub yaw: f32,
    /// Elevation, radians; positive places the camera below the target
    pub pitch: f32,
    /// Distance to the target
    pub distance: f32,
}

impl OrbitParams {
    fn lerp(&self, goal: &Self, t: f32) -> Self {
        Self {
            yaw: utils::lerp(self.yaw, goal.yaw, t),
            pitch: utils::lerp(self.pitch, goal.pitch, t),
            distance: utils::lerp(self.distance, goal.distance, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct PendingInput {
    d_yaw: f32,
    d_pitch: f32,
    d_dist: f32,
}

impl PendingInput {
    fn changed(&self) -> bool {
        self.d_yaw != 0.0 || self.d_pitch != 0.0 || self.d_dist != 0.0
    }
}

/// Camera placement around a followed point
#[derive(Debug, Clone)]
pub struct OrbitController {
    config: OrbitConfig,
    enabled: bool,
    target: Option<Vec3>,
    prev_target: Option<Vec3>,
    pending: PendingInput,
    start: OrbitParams,
    current: OrbitParams,
    goal: OrbitParams,
    elapsed: f32,
    last_frame: Option<u64>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(OrbitConfig::default())
    }
}

impl OrbitController {
    /// Controller with no target yet
    pub fn new(config: OrbitConfig) -> Self {
        let params = OrbitParams {
            distance: config.initial_distance,
            ..Default::default()
        };
        Self {
            config,
            enabled: true,
            target: None,
            prev_target: None,
            pending: PendingInput::default(),
            start: params,
            current: params,
            goal: params,
            elapsed: 0.0,
            last_frame: None,
        }
    }

    /// Point being followed
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// Follow `target`, or stop following with `None`
    pub fn set_target(&mut self, target: Option<Vec3>) {
        self.target = target;
    }

    /// Whether input is processed
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable input processing
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Values the camera is currently placed with
    pub fn current(&self) -> OrbitParams {
        self.current
    }

    /// Values the camera is gliding toward
    pub fn goal(&self) -> OrbitParams {
        self.goal
    }

    /// Jump to `distance` without smoothing
    pub fn set_distance(&mut self, distance: f32) {
        let distance = self.clamp_distance(distance);
        self.goal.distance = distance;
        self.current.distance = distance;
        self.start.distance = distance;
        self.prev_target = None;
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.max(self.config.min_distance).min(self.config.max_distance)
    }

    fn pitch_limit(&self) -> f32 {
        constants::HALF_PI - utils::deg_to_rad(self.config.pitch_margin_degrees)
    }

    /// Accumulate drag and wheel input
    ///
    /// Ignored while disabled, without a target, with the mouse already
    /// consumed, or while control is held.
    #[allow(clippy::cast_precision_loss)]
    pub fn consume_input(&mut self, injector: &mut dyn InputInjector) {
        if !self.enabled || self.target.is_none() {
            return;
        }
        if !injector.is_mouse_valid() || injector.is_key_down(ModifierKey::Control) {
            return;
        }

        let (dx, dy) = injector.delta_xy();
        if injector.is_left_button_down() {
            let sensitivity = injector.sensitivity();
            self.pending.d_yaw += dx as f32 * sensitivity;
            self.pending.d_pitch += -dy as f32 * sensitivity;
            injector.lock_mouse_pos(true);
            injector.invalidate_mouse();
        }

        let wheel = injector.wheel();
        if wheel != 0 {
            injector.pop_wheel();
            let fine = if injector.is_key_down(ModifierKey::Shift) {
                self.config.fine_zoom_factor
            } else {
                1.0
            };
            let step = injector.wheel_sensitivity()
                * injector.num_lines_wheel_scroll() as f32
                * (self.goal.distance * self.config.wheel_distance_scale).max(1.0);
            self.pending.d_dist += -(wheel as f32) * step * fine;
            injector.invalidate_mouse();
        }
    }

    /// Advance the controller for `frame`
    ///
    /// Runs at most once per frame number. Returns the new camera transform
    /// when the placement moved, `None` otherwise.
    pub fn process(&mut self, frame: u64, delta_time: f32) -> Option<Transform> {
        if !self.enabled {
            return None;
        }
        let target = self.target?;
        if self.last_frame == Some(frame) {
            return None;
        }
        self.last_frame = Some(frame);

        if self.pending.changed() {
            self.fold_pending();
        }

        let gliding = self.current != self.goal;
        if gliding {
            self.elapsed += delta_time;
            let t = if self.config.smoothing_seconds <= 0.0 {
                1.0
            } else {
                (self.elapsed / self.config.smoothing_seconds).min(1.0)
            };
            self.current = if t >= 1.0 { self.goal } else { self.start.lerp(&self.goal, t) };
        }

        let target_moved = self.prev_target != Some(target);
        if !gliding && !target_moved {
            return None;
        }
        self.prev_target = Some(target);
        Some(orbit_transform(&target, &self.current))
    }

    fn fold_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let limit = self.pitch_limit();
        let mut goal = self.goal;
        goal.distance = self.clamp_distance(goal.distance + pending.d_dist);
        goal.pitch = (goal.pitch + pending.d_pitch).max(-limit).min(limit);
        goal.yaw += pending.d_yaw;
        if goal.yaw > constants::TAU {
            goal.yaw -= constants::TAU;
            self.current.yaw -= constants::TAU;
        } else if goal.yaw < -constants::TAU {
            goal.yaw += constants::TAU;
            self.current.yaw += constants::TAU;
        }
        self.goal = goal;
        self.start = self.current;
        self.elapsed = 0.0;
    }
}

/// Camera transform placed around `target` by `params`
///
/// The camera sits on the `-Y` side of the target at zero yaw and pitch and
/// always looks at it.
pub fn orbit_transform(target: &Vec3, params: &OrbitParams) -> Transform {
    let pitch = Quat::from_axis_angle(&Vec3::x_axis(), params.pitch);
    let yaw = Quat::from_axis_angle(&Vec3::z_axis(), -params.yaw);
    let to_camera = yaw * (pitch * -Vec3::y());
    let forward = -to_camera;
    let right = forward.cross(&Vec3::z()).normalize();
    Transform::from_position_rotation(target + to_camera * params.distance, basis_rotation(&right, &forward))
}
