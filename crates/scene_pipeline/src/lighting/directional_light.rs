//! Directional light with spherical angle control and timed transitions

use crate::config::DirectionalLightConfig;
use crate::foundation::math::{constants, utils, Vec3, Vec4};

#[derive(Debug, Clone, PartialEq)]
struct Transition {
    from_theta: f32,
    from_phi: f32,
    from_intensity: f32,
    from_diffuse: Vec3,
    to_theta: f32,
    to_phi: f32,
    to_intensity: f32,
    to_diffuse: Vec3,
    duration: f32,
    elapsed: f32,
}

/// Light shader constants for one directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightInfo {
    /// Direction in xyz, intensity in w
    pub direction_intensity: Vec4,
    /// Diffuse colour, w = 1
    pub diffuse: Vec4,
    /// Specular colour, w = 1
    pub specular: Vec4,
}

/// Sun-like light
///
/// `theta` is measured from `+Z`, `phi` around `+Z` from `+X`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    direction: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    intensity: f32,
    theta: f32,
    phi: f32,
    transition: Option<Transition>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::z(),
            diffuse: Vec3::repeat(1.0),
            specular: Vec3::repeat(1.0),
            intensity: 1.0,
            theta: 0.0,
            phi: 0.0,
            transition: None,
        }
    }
}

impl DirectionalLight {
    /// Light built from configuration
    pub fn from_config(config: &DirectionalLightConfig) -> Self {
        let mut light = Self {
            diffuse: Vec3::from(config.diffuse),
            specular: Vec3::from(config.specular),
            intensity: config.intensity,
            ..Default::default()
        };
        light.set_direction(&Vec3::from(config.direction));
        light
    }

    /// Normalised direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point the light along `direction` and derive its angles
    pub fn set_direction(&mut self, direction: &Vec3) {
        let Some(direction) = direction.try_normalize(f32::EPSILON) else {
            log::warn!("DirectionalLight: ignoring zero direction");
            return;
        };
        self.direction = direction;
        self.theta = direction.z.clamp(-1.0, 1.0).acos();
        self.phi = direction.y.atan2(direction.x);
        if self.phi < 0.0 {
            self.phi += constants::TAU;
        }
    }

    /// Polar angle from `+Z`
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Azimuth around `+Z`
    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// Tilt by `radians`, wrapping past half a turn
    pub fn add_theta(&mut self, radians: f32) {
        if radians == 0.0 {
            return;
        }
        self.theta += radians;
        if self.theta > constants::PI {
            self.theta -= constants::PI;
        }
        self.direction = utils::spherical_to_cartesian(self.theta, self.phi);
    }

    /// Turn by `radians`, wrapping past a full turn
    pub fn add_phi(&mut self, radians: f32) {
        if radians == 0.0 {
            return;
        }
        self.phi += radians;
        if self.phi >= constants::TAU {
            self.phi -= constants::TAU;
        }
        self.direction = utils::spherical_to_cartesian(self.theta, self.phi);
    }

    /// Diffuse colour
    pub fn diffuse(&self) -> Vec3 {
        self.diffuse
    }

    /// Set the diffuse colour
    pub fn set_diffuse(&mut self, diffuse: Vec3) {
        self.diffuse = diffuse;
    }

    /// Specular colour
    pub fn specular(&self) -> Vec3 {
        self.specular
    }

    /// Set the specular colour
    pub fn set_specular(&mut self, specular: Vec3) {
        self.specular = specular;
    }

    /// Intensity multiplier
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Set the intensity multiplier
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    /// Start gliding toward new angles, intensity and colour over `duration` seconds
    pub fn prepare_interpolation(&mut self, theta: f32, phi: f32, intensity: f32, diffuse: Vec3, duration: f32) {
        self.transition = Some(Transition {
            from_theta: self.theta,
            from_phi: self.phi,
            from_intensity: self.intensity,
            from_diffuse: self.diffuse,
            to_theta: theta,
            to_phi: phi,
            to_intensity: intensity,
            to_diffuse: diffuse,
            duration,
            elapsed: 0.0,
        });
    }

    /// Whether a transition is running
    pub fn is_interpolating(&self) -> bool {
        self.transition.is_some()
    }

    /// Advance a running transition
    pub fn update(&mut self, delta_time: f32) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        transition.elapsed += delta_time;
        let finished = transition.elapsed >= transition.duration;
        let t = if finished || transition.duration <= 0.0 {
            1.0
        } else {
            transition.elapsed / transition.duration
        };

        self.theta = utils::lerp(transition.from_theta, transition.to_theta, t);
        self.phi = utils::lerp(transition.from_phi, transition.to_phi, t);
        self.intensity = utils::lerp(transition.from_intensity, transition.to_intensity, t);
        self.diffuse = utils::lerp_vec3(&transition.from_diffuse, &transition.to_diffuse, t);
        self.direction = utils::spherical_to_cartesian(self.theta, self.phi);
        if finished {
            self.transition = None;
        }
    }

    /// Copy every property, including a running transition, from `other`
    pub fn copy_light(&mut self, other: &Self) {
        self.clone_from(other);
    }

    /// Constants handed to shaders
    pub fn info(&self) -> DirectionalLightInfo {
        DirectionalLightInfo {
            direction_intensity: self.direction.push(self.intensity),
            diffuse: self.diffuse.push(1.0),
            specular: self.specular.push(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_round_trips_through_angles() {
        let mut light = DirectionalLight::default();
        light.set_direction(&Vec3::new(-3.0, 1.0, 1.0));
        assert!(light.phi() >= 0.0);
        let rebuilt = utils::spherical_to_cartesian(light.theta(), light.phi());
        assert_relative_eq!(rebuilt, Vec3::new(-3.0, 1.0, 1.0).normalize(), epsilon = 1e-5);
    }

    #[test]
    fn test_angle_wrapping() {
        let mut light = DirectionalLight::default();
        light.set_direction(&Vec3::x());
        light.add_phi(constants::TAU);
        assert_relative_eq!(light.phi(), 0.0, epsilon = 1e-5);
        light.add_theta(constants::PI);
        assert_relative_eq!(light.theta(), constants::HALF_PI, epsilon = 1e-5);
    }

    #[test]
    fn test_interpolation_finishes() {
        let mut light = DirectionalLight::default();
        light.set_direction(&Vec3::x());
        light.prepare_interpolation(0.0, 0.0, 3.0, Vec3::new(1.0, 0.0, 0.0), 2.0);

        light.update(1.0);
        assert!(light.is_interpolating());
        assert_relative_eq!(light.intensity(), 2.0);
        assert_relative_eq!(light.theta(), constants::HALF_PI * 0.5, epsilon = 1e-5);

        light.update(5.0);
        assert!(!light.is_interpolating());
        assert_relative_eq!(light.intensity(), 3.0);
        assert_relative_eq!(light.direction(), Vec3::z(), epsilon = 1e-5);
        assert_relative_eq!(light.diffuse(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_info_packs_intensity() {
        let light = DirectionalLight::from_config(&DirectionalLightConfig {
            direction: [0.0, 0.0, 2.0],
            diffuse: [0.5, 0.5, 0.5],
            specular: [0.0, 0.0, 0.0],
            intensity: 0.7,
        });
        let info = light.info();
        assert_relative_eq!(info.direction_intensity, Vec4::new(0.0, 0.0, 1.0, 0.7));
        assert_relative_eq!(info.specular, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }
}
