//! Point lights and the per-scene manager that picks the strongest few for
//! each object

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::{Transform, Vec3, Vec4};
use crate::scene::SceneError;
use crate::spatial::{BoundingVolume, Ray};

new_key_type! {
    /// Handle to a point light owned by a [`PointLightManager`]
    pub struct PointLightHandle;
}

/// Maximum point lights packed into [`PointLightConstants`]
pub const MAX_POINT_LIGHTS_PER_OBJECT: usize = 3;

/// Local light with a finite range and optional lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    position: Vec3,
    color: Vec3,
    intensity: f32,
    range: f32,
    lifetime: Option<f32>,
    alpha: f32,
    manual_deletion: bool,
    enabled: bool,
}

impl PointLight {
    /// Light at `position`; `lifetime` of `None` lives until removed
    pub fn new(position: Vec3, range: f32, color: Vec3, intensity: f32, lifetime: Option<f32>, manual_deletion: bool) -> Self {
        Self {
            position,
            color,
            intensity,
            range,
            lifetime,
            alpha: 1.0,
            manual_deletion,
            enabled: true,
        }
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the light
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Effective range, faded by alpha
    pub fn range(&self) -> f32 {
        self.range * self.alpha
    }

    /// Set the unfaded range
    pub fn set_range(&mut self, range: f32) {
        self.range = range;
    }

    /// Base colour
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Colour scaled by intensity and alpha
    pub fn color_powered(&self) -> Vec3 {
        self.color * self.intensity * self.alpha
    }

    /// Effective intensity, faded by alpha
    pub fn intensity(&self) -> f32 {
        self.intensity * self.alpha
    }

    /// Set colour and unfaded intensity
    pub fn set_color_and_intensity(&mut self, color: Vec3, intensity: f32) {
        self.color = color;
        self.intensity = intensity;
    }

    /// Fade factor in `[0, 1]`
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    /// Remaining lifetime in seconds
    pub fn lifetime(&self) -> Option<f32> {
        self.lifetime
    }

    /// Replace the remaining lifetime
    pub fn set_lifetime(&mut self, lifetime: Option<f32>) {
        self.lifetime = lifetime;
    }

    /// Whether an expired light waits for explicit removal
    pub fn manual_deletion(&self) -> bool {
        self.manual_deletion
    }

    /// Keep the light after it expires
    pub fn set_manual_deletion(&mut self, manual: bool) {
        self.manual_deletion = manual;
    }

    /// Whether the light contributes
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable; returns whether the state changed
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    fn age(&mut self, delta_time: f32) -> Option<f32> {
        let remaining = self.lifetime.as_mut()?;
        *remaining -= delta_time;
        Some(*remaining)
    }

    /// Score used to rank lights for an object `distance` away
    pub fn intensity_score_at(&self, distance: f32) -> f32 {
        let distance = distance.min(self.range);
        (self.range - distance) * self.intensity
    }
}

/// Point light data for one object, packed for shaders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightConstants {
    /// Position in xyz, range in w
    pub positions: [Vec4; MAX_POINT_LIGHTS_PER_OBJECT],
    /// Powered colour in xyz, light count in w
    pub colors: [Vec4; MAX_POINT_LIGHTS_PER_OBJECT],
    /// Number of valid entries
    pub count: usize,
}

impl Default for PointLightConstants {
    fn default() -> Self {
        Self {
            positions: [Vec4::zeros(); MAX_POINT_LIGHTS_PER_OBJECT],
            colors: [Vec4::zeros(); MAX_POINT_LIGHTS_PER_OBJECT],
            count: 0,
        }
    }
}

/// Owner of a scene's point lights
#[derive(Debug)]
pub struct PointLightManager {
    lights: SlotMap<PointLightHandle, PointLight>,
    enabled: Vec<PointLightHandle>,
    max_lights: usize,
    max_per_object: usize,
}

impl Default for PointLightManager {
    fn default() -> Self {
        Self::new(20, MAX_POINT_LIGHTS_PER_OBJECT)
    }
}

impl PointLightManager {
    /// Manager holding at most `max_lights`, gathering `max_per_object` per query
    pub fn new(max_lights: usize, max_per_object: usize) -> Self {
        Self {
            lights: SlotMap::with_key(),
            enabled: Vec::new(),
            max_lights,
            max_per_object: max_per_object.min(MAX_POINT_LIGHTS_PER_OBJECT),
        }
    }

    /// Add a light
    pub fn create_point_light(&mut self, light: PointLight) -> Result<PointLightHandle, SceneError> {
        if self.lights.len() >= self.max_lights {
            log::warn!("PointLightManager: limit of {} reached", self.max_lights);
            return Err(SceneError::PointLightLimit(self.max_lights));
        }
        let handle = self.lights.insert(light);
        self.rebuild();
        Ok(handle)
    }

    /// Remove a light
    pub fn remove_point_light(&mut self, handle: PointLightHandle) -> Option<PointLight> {
        let removed = self.lights.remove(handle);
        if removed.is_some() {
            self.rebuild();
        }
        removed
    }

    /// Look up a light
    pub fn get(&self, handle: PointLightHandle) -> Option<&PointLight> {
        self.lights.get(handle)
    }

    /// Look up a light mutably; call [`Self::rebuild`] after enabling or disabling
    pub fn get_mut(&mut self, handle: PointLightHandle) -> Option<&mut PointLight> {
        self.lights.get_mut(handle)
    }

    /// Number of live lights
    pub fn num_point_lights(&self) -> usize {
        self.lights.len()
    }

    /// Refresh the list of enabled lights
    pub fn rebuild(&mut self) {
        self.enabled = self
            .lights
            .iter()
            .filter(|(_, light)| light.enabled())
            .map(|(handle, _)| handle)
            .collect();
    }

    /// Age lights, dropping the ones that expired without manual deletion
    pub fn update(&mut self, delta_time: f32, rebuild: bool) {
        let before = self.lights.len();
        self.lights.retain(|_, light| match light.age(delta_time) {
            Some(remaining) => remaining > 0.0 || light.manual_deletion(),
            None => true,
        });
        let expired = before - self.lights.len();
        if expired > 0 {
            log::trace!("PointLightManager: {expired} light(s) expired");
        }
        if rebuild || expired > 0 {
            self.rebuild();
        }
    }

    /// Strongest lights reaching `volume` placed by `transform`
    ///
    /// A ray from each light toward the object's origin is intersected with
    /// the object space volume; lights whose hit distance is within range are
    /// ranked by [`PointLight::intensity_score_at`].
    #[allow(clippy::cast_precision_loss)]
    pub fn gather_point_light_data(&self, volume: &BoundingVolume, transform: &Transform) -> PointLightConstants {
        let mut gathered: Vec<(f32, &PointLight)> = self
            .enabled
            .iter()
            .filter_map(|handle| self.lights.get(*handle))
            .filter(|light| light.enabled())
            .filter_map(|light| {
                let to_object = transform.position - light.position();
                let distance = if to_object.norm_squared() <= f32::EPSILON {
                    0.0
                } else {
                    let ray = Ray::new(light.position(), to_object);
                    volume.intersect_ray(&ray.to_local(transform))?
                };
                (distance < light.range()).then(|| (light.intensity_score_at(distance), light))
            })
            .collect();
        gathered.sort_by(|a, b| b.0.total_cmp(&a.0));
        gathered.truncate(self.max_per_object);

        let mut constants = PointLightConstants::default();
        let count = gathered.len();
        for (slot, (_, light)) in gathered.into_iter().enumerate() {
            constants.positions[slot] = light.position().push(light.range());
            constants.colors[slot] = light.color_powered().push(count as f32);
        }
        constants.count = count;
        constants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn light_at(x: f32, range: f32, intensity: f32) -> PointLight {
        PointLight::new(Vec3::new(x, 0.0, 0.0), range, Vec3::repeat(1.0), intensity, None, false)
    }

    #[test]
    fn test_capacity() {
        let mut manager = PointLightManager::new(2, 3);
        assert!(manager.create_point_light(light_at(0.0, 1.0, 1.0)).is_ok());
        assert!(manager.create_point_light(light_at(0.0, 1.0, 1.0)).is_ok());
        assert_eq!(
            manager.create_point_light(light_at(0.0, 1.0, 1.0)),
            Err(SceneError::PointLightLimit(2))
        );
    }

    #[test]
    fn test_lifetime_expiry() {
        let mut manager = PointLightManager::default();
        let mut short = light_at(0.0, 5.0, 1.0);
        short.set_lifetime(Some(1.0));
        let mut kept = short.clone();
        kept.set_manual_deletion(true);
        let short = manager.create_point_light(short).unwrap();
        let kept = manager.create_point_light(kept).unwrap();
        let forever = manager.create_point_light(light_at(0.0, 5.0, 1.0)).unwrap();

        manager.update(0.5, false);
        assert_eq!(manager.num_point_lights(), 3);
        manager.update(0.6, false);
        assert!(manager.get(short).is_none());
        assert!(manager.get(kept).is_some());
        assert!(manager.get(forever).is_some());
    }

    #[test]
    fn test_gather_picks_strongest_in_range() {
        let mut manager = PointLightManager::default();
        manager.create_point_light(light_at(3.0, 10.0, 1.0)).unwrap();
        manager.create_point_light(light_at(6.0, 10.0, 1.0)).unwrap();
        manager.create_point_light(light_at(-2.0, 10.0, 0.5)).unwrap();
        manager.create_point_light(light_at(8.0, 10.0, 4.0)).unwrap();
        manager.create_point_light(light_at(50.0, 10.0, 100.0)).unwrap();

        let volume = BoundingVolume::sphere(Vec3::zeros(), 1.0);
        let constants = manager.gather_point_light_data(&volume, &Transform::identity());
        assert_eq!(constants.count, 3);
        // Scores: x=8 -> (10-7)*4 = 12, x=3 -> 8, x=6 -> 5, x=-2 -> 4.5.
        assert_relative_eq!(constants.positions[0], Vec4::new(8.0, 0.0, 0.0, 10.0));
        assert_relative_eq!(constants.positions[1], Vec4::new(3.0, 0.0, 0.0, 10.0));
        assert_relative_eq!(constants.positions[2], Vec4::new(6.0, 0.0, 0.0, 10.0));
        assert_relative_eq!(constants.colors[0].w, 3.0);
    }

    #[test]
    fn test_disabled_lights_skipped_after_rebuild() {
        let mut manager = PointLightManager::default();
        let handle = manager.create_point_light(light_at(2.0, 10.0, 1.0)).unwrap();
        manager.get_mut(handle).unwrap().set_enabled(false);
        manager.update(0.0, true);
        let constants = manager.gather_point_light_data(&BoundingVolume::sphere(Vec3::zeros(), 1.0), &Transform::identity());
        assert_eq!(constants.count, 0);
    }
}
