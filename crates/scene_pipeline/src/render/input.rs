//! Normalised input consumed by the orbit camera

/// Modifier keys the camera reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    /// Control; suppresses camera input while held
    Control,
    /// Shift; switches wheel zoom to fine steps
    Shift,
}

/// Source of per-frame mouse and keyboard state
///
/// Implemented by the platform layer. The camera reads deltas and may consume
/// the wheel or invalidate the mouse so that later consumers ignore input it
/// already used.
pub trait InputInjector {
    /// Whether mouse data is still available this frame
    fn is_mouse_valid(&self) -> bool;

    /// Whether a modifier key is held
    fn is_key_down(&self, key: ModifierKey) -> bool;

    /// Mouse movement since the last frame, in pixels
    fn delta_xy(&self) -> (i32, i32);

    /// Whether the left button is held
    fn is_left_button_down(&self) -> bool;

    /// Radians per pixel of mouse movement
    fn sensitivity(&self) -> f32;

    /// Pending wheel clicks, positive away from the user
    fn wheel(&self) -> i32;

    /// Consume the pending wheel clicks
    fn pop_wheel(&mut self);

    /// Distance per wheel line
    fn wheel_sensitivity(&self) -> f32;

    /// Lines scrolled per wheel click
    fn num_lines_wheel_scroll(&self) -> u32;

    /// Pin the cursor while dragging
    fn lock_mouse_pos(&mut self, lock: bool);

    /// Mark mouse data as consumed
    fn invalidate_mouse(&mut self);
}

/// Plain snapshot of input state for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    /// Mouse data available
    pub mouse_valid: bool,
    /// Control held
    pub control: bool,
    /// Shift held
    pub shift: bool,
    /// Mouse delta in pixels
    pub delta: (i32, i32),
    /// Left button held
    pub left_button: bool,
    /// Radians per pixel
    pub sensitivity: f32,
    /// Pending wheel clicks
    pub wheel: i32,
    /// Distance per wheel line
    pub wheel_sensitivity: f32,
    /// Lines per wheel click
    pub wheel_lines: u32,
    /// Cursor pinned
    pub mouse_locked: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            mouse_valid: true,
            control: false,
            shift: false,
            delta: (0, 0),
            left_button: false,
            sensitivity: 0.005,
            wheel: 0,
            wheel_sensitivity: 0.5,
            wheel_lines: 3,
            mouse_locked: false,
        }
    }
}

impl InputState {
    /// Drag by `(dx, dy)` pixels with the left button held
    pub fn drag(dx: i32, dy: i32) -> Self {
        Self {
            delta: (dx, dy),
            left_button: true,
            ..Default::default()
        }
    }

    /// Scroll the wheel by `clicks`
    pub fn scroll(clicks: i32) -> Self {
        Self {
            wheel: clicks,
            ..Default::default()
        }
    }
}

impl InputInjector for InputState {
    fn is_mouse_valid(&self) -> bool {
        self.mouse_valid
    }

    fn is_key_down(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Control => self.control,
            ModifierKey::Shift => self.shift,
        }
    }

    fn delta_xy(&self) -> (i32, i32) {
        self.delta
    }

    fn is_left_button_down(&self) -> bool {
        self.left_button
    }

    fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    fn wheel(&self) -> i32 {
        self.wheel
    }

    fn pop_wheel(&mut self) {
        self.wheel = 0;
    }

    fn wheel_sensitivity(&self) -> f32 {
        self.wheel_sensitivity
    }

    fn num_lines_wheel_scroll(&self) -> u32 {
        self.wheel_lines
    }

    fn lock_mouse_pos(&mut self, lock: bool) {
        self.mouse_locked = lock;
    }

    fn invalidate_mouse(&mut self) {
        self.mouse_valid = false;
    }
}
