use foundation::math::Vec2;

/// Pointer events a measurement tool reacts to, in canvas pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ScreenEvent {
    LeftClick(Vec2),
    LeftDoubleClick(Vec2),
    RightClick(Vec2),
    MouseMove { end: Vec2 },
}

/// The renderer's built-in double-click behaviour (fly-to / track entity).
pub trait DefaultInputActions {
    /// Disables the default action and remembers it for [`Self::restore_default_double_click`].
    fn suppress_default_double_click(&mut self);

    /// Reinstates what was saved by the last suppression. No-op if nothing was saved.
    fn restore_default_double_click(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: &'static str,
    pub code: &'static str,
    pub key_code: u32,
}

impl KeyPress {
    pub const ESCAPE: KeyPress = KeyPress {
        key: "Escape",
        code: "Escape",
        key_code: 27,
    };
}

/// Target for synthesized keyboard events.
pub trait KeyboardSink {
    fn dispatch_key_down(&mut self, key: KeyPress);
}
