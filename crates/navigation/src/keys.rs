/// What a held key asks the camera to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FlightAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    PitchUp,
    PitchDown,
    YawLeft,
    YawRight,
    RollLeft,
    RollRight,
}

impl FlightAction {
    const COUNT: usize = 12;

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub key_code: u32,
    pub action: FlightAction,
    pub description: &'static str,
}

const fn bind(key_code: u32, action: FlightAction, description: &'static str) -> KeyBinding {
    KeyBinding {
        key_code,
        action,
        description,
    }
}

/// Globe fly-through: translation plus heading/pitch/roll keys.
pub const GLOBE_KEYS: &[KeyBinding] = &[
    bind(87, FlightAction::MoveForward, "W - move forward"),
    bind(83, FlightAction::MoveBackward, "S - move backward"),
    bind(65, FlightAction::MoveLeft, "A - move left"),
    bind(68, FlightAction::MoveRight, "D - move right"),
    bind(81, FlightAction::MoveDown, "Q - move down"),
    bind(69, FlightAction::MoveUp, "E - move up"),
    bind(73, FlightAction::PitchUp, "I - pitch up"),
    bind(75, FlightAction::PitchDown, "K - pitch down"),
    bind(74, FlightAction::YawLeft, "J - yaw left"),
    bind(76, FlightAction::YawRight, "L - yaw right"),
    bind(85, FlightAction::RollLeft, "U - roll left"),
    bind(79, FlightAction::RollRight, "O - roll right"),
];

/// Point-cloud fly-through: letters and arrow keys, translation only.
pub const POINT_CLOUD_KEYS: &[KeyBinding] = &[
    bind(87, FlightAction::MoveForward, "W - move forward"),
    bind(38, FlightAction::MoveForward, "Up - move forward"),
    bind(83, FlightAction::MoveBackward, "S - move backward"),
    bind(40, FlightAction::MoveBackward, "Down - move backward"),
    bind(65, FlightAction::MoveLeft, "A - move left"),
    bind(37, FlightAction::MoveLeft, "Left - move left"),
    bind(68, FlightAction::MoveRight, "D - move right"),
    bind(39, FlightAction::MoveRight, "Right - move right"),
    bind(67, FlightAction::MoveUp, "C - move up"),
    bind(69, FlightAction::MoveUp, "E - move up"),
    bind(90, FlightAction::MoveDown, "Z - move down"),
    bind(81, FlightAction::MoveDown, "Q - move down"),
];

pub fn action_for(bindings: &[KeyBinding], key_code: u32) -> Option<FlightAction> {
    bindings
        .iter()
        .find(|b| b.key_code == key_code)
        .map(|b| b.action)
}

/// Held flight actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    held: [bool; FlightAction::COUNT],
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, action: FlightAction, down: bool) {
        self.held[action.slot()] = down;
    }

    pub fn is_held(&self, action: FlightAction) -> bool {
        self.held[action.slot()]
    }

    pub fn any_held(&self) -> bool {
        self.held.iter().any(|h| *h)
    }

    pub fn clear(&mut self) {
        self.held = [false; FlightAction::COUNT];
    }
}
