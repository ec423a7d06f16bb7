//! Animation capability attached to spatial objects
//!
//! Curve evaluation happens elsewhere; the scene only needs the resulting
//! local transform and whether it moved this frame.

use crate::foundation::math::Transform;

/// Keyframe player driving a local transform
pub trait Animation: Send {
    /// Advance playback by `delta_time` seconds
    fn update(&mut self, delta_time: f32);

    /// Whether the last [`Animation::update`] produced a new result
    fn changed(&self) -> bool;

    /// Current animated transform, relative to the owner's location
    fn result(&self) -> &Transform;

    /// Start the named action; returns false when it does not exist
    fn play_action(&mut self, name: &str, immediate: bool, reverse: bool) -> bool;

    /// Whether any action is playing
    fn is_playing(&self) -> bool;

    /// Whether the named action has finished
    fn is_action_done(&self, name: &str) -> bool;

    /// Stop playback, keeping the last result
    fn stop(&mut self) {}
}
