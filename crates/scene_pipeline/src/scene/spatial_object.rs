//! Positioned, bounded scene object
//!
//! The world bounding volume follows every position and scale change
//! immediately. Its center is the local center offset by the position and its
//! radius is the local radius times the largest scale component, which stays
//! conservative under non-uniform scale.

use std::collections::HashMap;

use super::scene_object::{SceneObject, SceneObjectType};
use crate::animation::Animation;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::CameraId;
use crate::spatial::{BoundingBox, BoundingVolume};

/// Scene object with a transform and bounds
pub struct SpatialObject {
    header: SceneObject,
    location: Transform,
    previous_position: Vec3,
    bounds: BoundingVolume,
    world_bounds: BoundingVolume,
    transform_changed: bool,
    dist_to_cam: HashMap<CameraId, f32>,
    animation: Option<Box<dyn Animation>>,
    animated_location: Transform,
}

impl std::fmt::Debug for SpatialObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialObject")
            .field("header", &self.header)
            .field("location", &self.location)
            .field("world_bounds", &self.world_bounds)
            .field("transform_changed", &self.transform_changed)
            .field("animated", &self.animation.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for SpatialObject {
    fn default() -> Self {
        Self::new(SceneObjectType::SpatialObject)
    }
}

impl SpatialObject {
    /// Object at the origin with a zero-radius sphere
    pub fn new(object_type: SceneObjectType) -> Self {
        Self {
            header: SceneObject::new(object_type),
            location: Transform::identity(),
            previous_position: Vec3::zeros(),
            bounds: BoundingVolume::default(),
            world_bounds: BoundingVolume::default(),
            transform_changed: true,
            dist_to_cam: HashMap::new(),
            animation: None,
            animated_location: Transform::identity(),
        }
    }

    /// Object at `position` bounded by a sphere of `radius` around it
    pub fn with_sphere(position: Vec3, radius: f32) -> Self {
        let mut object = Self::default();
        object.set_bounding_volume(BoundingVolume::sphere(Vec3::zeros(), radius));
        object.set_position(position);
        object
    }

    /// Name, flags and scene membership
    pub fn header(&self) -> &SceneObject {
        &self.header
    }

    /// Mutable header
    pub fn header_mut(&mut self) -> &mut SceneObject {
        &mut self.header
    }

    // ---- transform ------------------------------------------------------

    /// Local-to-world transform
    pub fn location(&self) -> &Transform {
        &self.location
    }

    /// Replace the whole transform
    pub fn set_location(&mut self, location: Transform) {
        self.previous_position = self.location.position;
        self.location = location;
        self.refresh_world_bounds();
        self.refresh_animated_location();
        self.transform_changed = true;
    }

    /// World position
    pub fn position(&self) -> Vec3 {
        self.location.position
    }

    /// Position before the last [`Self::set_position`]
    pub fn previous_position(&self) -> Vec3 {
        self.previous_position
    }

    /// Move the object
    pub fn set_position(&mut self, position: Vec3) {
        self.previous_position = self.location.position;
        self.location.position = position;
        self.world_bounds.set_center(self.bounds.center() + position);
        self.refresh_animated_location();
        self.transform_changed = true;
    }

    /// World rotation
    pub fn rotation(&self) -> Quat {
        self.location.rotation
    }

    /// Rotate the object
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.location.rotation = rotation;
        self.refresh_animated_location();
        self.transform_changed = true;
    }

    /// Per-axis scale
    pub fn scale(&self) -> Vec3 {
        self.location.scale
    }

    /// Scale the object; the world radius grows by the largest component
    pub fn set_scale(&mut self, scale: Vec3) {
        self.location.scale = scale;
        self.world_bounds.set_radius(self.bounds.radius() * scale.amax());
        self.refresh_animated_location();
        self.transform_changed = true;
    }

    /// Forward axis
    pub fn direction(&self) -> Vec3 {
        self.location.forward()
    }

    /// Face along `direction`
    pub fn set_direction(&mut self, direction: &Vec3) {
        self.location.set_direction(direction);
        self.refresh_animated_location();
        self.transform_changed = true;
    }

    /// Face along `direction` with an explicit right axis
    pub fn set_direction_and_right(&mut self, direction: &Vec3, right: &Vec3) {
        self.location.set_direction_and_right(direction, right);
        self.refresh_animated_location();
        self.transform_changed = true;
    }

    /// Whether the transform changed since the last [`Self::clear_transform_changed`]
    pub fn transform_changed(&self) -> bool {
        self.transform_changed
    }

    /// Mark the transform as processed
    pub fn clear_transform_changed(&mut self) {
        self.transform_changed = false;
    }

    /// Force consumers to reprocess the transform
    pub fn notify_transform_changed(&mut self) {
        self.transform_changed = true;
    }

    // ---- bounds ---------------------------------------------------------

    /// Bounds in object space
    pub fn bounding_volume(&self) -> &BoundingVolume {
        &self.bounds
    }

    /// Bounds in world space
    pub fn world_bounding_volume(&self) -> &BoundingVolume {
        &self.world_bounds
    }

    /// World radius
    pub fn radius(&self) -> f32 {
        self.world_bounds.radius()
    }

    /// Set the radius in both spaces
    pub fn set_radius(&mut self, radius: f32) {
        self.bounds.set_radius(radius);
        self.world_bounds.set_radius(radius);
    }

    /// Replace the object space bounds
    pub fn set_bounding_volume(&mut self, bounds: BoundingVolume) {
        self.bounds = bounds;
        self.refresh_world_bounds();
    }

    /// Grow the object space bounds to enclose `other`
    pub fn merge_bounding_volume(&mut self, other: &BoundingVolume) {
        self.bounds.merge(other);
        self.refresh_world_bounds();
    }

    /// Switch to a box volume enclosing the current bounds
    pub fn use_aabb_bounding_volume(&mut self) {
        if self.bounds.is_sphere() {
            let aabb: BoundingBox = self.bounds.to_aabb();
            self.bounds = aabb.into();
            self.refresh_world_bounds();
        }
    }

    fn refresh_world_bounds(&mut self) {
        self.world_bounds = self.bounds.clone();
        self.world_bounds.set_center(self.bounds.center() + self.location.position);
        self.world_bounds.set_radius(self.bounds.radius() * self.location.norm());
    }

    // ---- camera distance ------------------------------------------------

    /// Distance to `camera` recorded by the last visibility pass
    pub fn dist_to_cam(&self, camera: CameraId) -> Option<f32> {
        self.dist_to_cam.get(&camera).copied()
    }

    pub(crate) fn set_dist_to_cam(&mut self, camera: CameraId, distance: f32) {
        self.dist_to_cam.insert(camera, distance);
    }

    /// Number of cameras with a recorded distance
    pub fn num_camera_distances(&self) -> usize {
        self.dist_to_cam.len()
    }

    pub(crate) fn forget_camera(&mut self, camera: CameraId) {
        self.dist_to_cam.remove(&camera);
    }

    // ---- animation ------------------------------------------------------

    /// Attach an animation, resetting the animated transform
    pub fn set_animation(&mut self, animation: Option<Box<dyn Animation>>) {
        self.animation = animation;
        self.animated_location = self.location.clone();
    }

    /// Attached animation
    pub fn animation(&self) -> Option<&dyn Animation> {
        self.animation.as_deref()
    }

    /// Whether an animation is attached
    pub fn has_animation(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance the animation and refresh the animated transform if it moved
    ///
    /// Returns whether the animation produced a new result.
    pub fn update_animation(&mut self, delta_time: f32) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        animation.update(delta_time);
        if animation.changed() {
            self.animated_location = &self.location * animation.result();
            true
        } else {
            false
        }
    }

    fn refresh_animated_location(&mut self) {
        if let Some(animation) = self.animation.as_ref() {
            self.animated_location = &self.location * animation.result();
        }
    }

    /// Location combined with the animation result, or the plain location
    pub fn animated_location(&self) -> &Transform {
        if self.animation.is_some() {
            &self.animated_location
        } else {
            &self.location
        }
    }

    /// Start a named action on the attached animation
    pub fn play_action(&mut self, name: &str, immediate: bool, reverse: bool) -> bool {
        self.animation
            .as_mut()
            .is_some_and(|animation| animation.play_action(name, immediate, reverse))
    }

    /// Whether an action is playing
    pub fn is_playing_action(&self) -> bool {
        self.animation.as_ref().is_some_and(|animation| animation.is_playing())
    }

    /// Whether `name` finished; true without an animation
    pub fn is_action_done(&self, name: &str) -> bool {
        self.animation.as_ref().map_or(true, |animation| animation.is_action_done(name))
    }

    /// Stop the attached animation
    pub fn stop_animation(&mut self) {
        if let Some(animation) = self.animation.as_mut() {
            animation.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::testing::SpinAnimation;
    use crate::spatial::Plane;
    use approx::assert_relative_eq;

    #[test]
    fn test_world_bounds_follow_position() {
        let mut object = SpatialObject::default();
        object.set_bounding_volume(BoundingVolume::sphere(Vec3::new(0.0, 0.0, 1.0), 2.0));
        object.set_position(Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(object.world_bounding_volume().center(), Vec3::new(5.0, 0.0, 1.0));
        assert_eq!(object.previous_position(), Vec3::zeros());
        assert!(object.transform_changed());
        object.clear_transform_changed();
        assert!(!object.transform_changed());
    }

    #[test]
    fn test_non_uniform_scale_uses_largest_component() {
        let mut object = SpatialObject::with_sphere(Vec3::zeros(), 1.5);
        object.set_scale(Vec3::new(1.0, 3.0, 2.0));
        assert_relative_eq!(object.radius(), 4.5);
        assert_relative_eq!(object.bounding_volume().radius(), 1.5);
    }

    #[test]
    fn test_uniform_scale_tangent_plane() {
        let mut object = SpatialObject::with_sphere(Vec3::new(2.0, 0.0, 5.0), 1.0);
        object.set_scale(Vec3::new(2.0, 2.0, 2.0));
        let plane = Plane::from_point_normal(&Vec3::new(4.0, 0.0, 0.0), &Vec3::x());
        assert_eq!(object.world_bounding_volume().which_side(&plane), 0);
    }

    #[test]
    fn test_merge_and_aabb_switch() {
        let mut object = SpatialObject::with_sphere(Vec3::new(10.0, 0.0, 0.0), 1.0);
        object.merge_bounding_volume(&BoundingVolume::sphere(Vec3::new(4.0, 0.0, 0.0), 1.0));
        assert_relative_eq!(object.bounding_volume().center(), Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(object.world_bounding_volume().center(), Vec3::new(12.0, 0.0, 0.0), epsilon = 1e-5);

        object.use_aabb_bounding_volume();
        assert!(!object.bounding_volume().is_sphere());
        assert!(!object.world_bounding_volume().is_sphere());
    }

    #[test]
    fn test_animated_location() {
        let mut object = SpatialObject::with_sphere(Vec3::new(1.0, 0.0, 0.0), 1.0);
        assert_eq!(object.animated_location(), object.location());
        assert!(object.is_action_done("spin"));

        object.set_animation(Some(Box::new(SpinAnimation {
            angle_per_second: 1.0,
            ..Default::default()
        })));
        assert!(!object.update_animation(0.5));
        assert!(object.play_action("spin", true, false));
        assert!(object.is_playing_action());
        assert!(object.update_animation(0.5));

        let expected = Quat::from_axis_angle(&Vec3::z_axis(), 0.5);
        assert_relative_eq!(object.animated_location().rotation, expected, epsilon = 1e-5);
        assert_relative_eq!(object.animated_location().position, Vec3::new(1.0, 0.0, 0.0));

        object.stop_animation();
        assert!(object.is_action_done("spin"));
    }
}
