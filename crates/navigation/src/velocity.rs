//! Keyboard-driven velocity integration shared by both fly-through controllers.

use serde::{Deserialize, Serialize};

use crate::keys::{FlightAction, KeyState};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightParams {
    /// Velocity bound per axis (units per frame).
    pub max_speed: f64,
    /// Velocity added per frame while a key is held.
    pub acceleration: f64,
    /// Factor applied per frame once the axis keys are released.
    pub damping: f64,
    /// Below this magnitude a released axis snaps to zero.
    pub stop_threshold: f64,
    /// Below this magnitude the camera is not moved.
    pub move_epsilon: f64,
}

impl Default for FlightParams {
    fn default() -> Self {
        Self {
            max_speed: 0.07,
            acceleration: 0.01,
            damping: 0.65,
            stop_threshold: 0.02,
            move_epsilon: 0.001,
        }
    }
}

impl FlightParams {
    /// Fixed step per frame: full speed while held, zero once released.
    pub fn fixed_step(speed: f64) -> Self {
        Self {
            max_speed: speed,
            acceleration: speed,
            damping: 0.0,
            stop_threshold: 0.0,
            move_epsilon: 0.0,
        }
    }
}

/// One frame of a single axis.
pub fn step_axis(v: f64, positive: bool, negative: bool, p: &FlightParams) -> f64 {
    let mut v = v;
    if !positive && !negative {
        v *= p.damping;
        if v.abs() < p.stop_threshold {
            v = 0.0;
        }
    }
    if positive {
        v = (v + p.acceleration).min(p.max_speed);
    }
    if negative {
        v = (v - p.acceleration).max(-p.max_speed);
    }
    v
}

/// Forward / right / up velocity in the camera's frame.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FlightVelocity {
    pub forward: f64,
    pub lateral: f64,
    pub vertical: f64,
}

impl FlightVelocity {
    pub fn step(&mut self, keys: &KeyState, p: &FlightParams) {
        use FlightAction::*;
        self.forward = step_axis(self.forward, keys.is_held(MoveForward), keys.is_held(MoveBackward), p);
        self.lateral = step_axis(self.lateral, keys.is_held(MoveRight), keys.is_held(MoveLeft), p);
        self.vertical = step_axis(self.vertical, keys.is_held(MoveUp), keys.is_held(MoveDown), p);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_zero(&self) -> bool {
        self.forward == 0.0 && self.lateral == 0.0 && self.vertical == 0.0
    }
}
