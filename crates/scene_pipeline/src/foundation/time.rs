//! Frame counting
//!
//! Every "once per frame" gate in the pipeline compares against an explicit
//! frame number handed down by the caller. [`FrameClock`] is the small helper
//! that produces those numbers.

/// Monotonic frame counter with the last step duration
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame: u64,
    delta_time: f32,
    total_time: f64,
}

impl FrameClock {
    /// Create a clock positioned at frame 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next frame and return its number
    pub fn tick(&mut self, delta_time: f32) -> u64 {
        self.frame += 1;
        self.delta_time = delta_time.max(0.0);
        self.total_time += f64::from(self.delta_time);
        self.frame
    }

    /// Current frame number
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Duration of the last step in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Accumulated time in seconds
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances_frame() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(0.016), 1);
        assert_eq!(clock.tick(0.016), 2);
        assert_eq!(clock.frame(), 2);
        assert!((clock.total_time() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn test_negative_delta_is_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(-1.0);
        assert_eq!(clock.delta_time(), 0.0);
    }
}
