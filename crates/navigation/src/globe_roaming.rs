//! Direct keyboard fly-through for the globe camera.

use runtime::{RepeatingTask, Scheduler, TaskControl};
use scene::GlobeCamera;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use tracing::debug;

use crate::keys::{FlightAction, GLOBE_KEYS, KeyBinding, KeyState, action_for};
use crate::velocity::{FlightParams, FlightVelocity};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeRoamingConfig {
    /// Meters per frame.
    pub move_speed: f64,
    /// Degrees per frame.
    pub rotate_speed_deg: f64,
}

impl Default for GlobeRoamingConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.1,
            rotate_speed_deg: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct GlobeRoaming<K> {
    params: FlightParams,
    rotate_speed: f64,
    keys: KeyState,
    velocity: FlightVelocity,
    task: RepeatingTask<K>,
}

impl<K: Copy> GlobeRoaming<K> {
    pub fn new(config: GlobeRoamingConfig, task: RepeatingTask<K>) -> Self {
        Self {
            params: FlightParams::fixed_step(config.move_speed),
            rotate_speed: config.rotate_speed_deg.to_radians(),
            keys: KeyState::new(),
            velocity: FlightVelocity::default(),
            task,
        }
    }

    pub fn set_move_speed(&mut self, speed: f64) {
        self.params = FlightParams::fixed_step(speed);
    }

    pub fn move_speed(&self) -> f64 {
        self.params.max_speed
    }

    /// Radians per frame.
    pub fn set_rotate_speed(&mut self, radians: f64) {
        self.rotate_speed = radians;
    }

    pub fn rotate_speed(&self) -> f64 {
        self.rotate_speed
    }

    pub fn key_mappings(&self) -> &'static [KeyBinding] {
        GLOBE_KEYS
    }

    pub fn is_running(&self, scheduler: &Scheduler<K>) -> bool {
        self.task.is_running(scheduler)
    }

    pub fn start(&mut self, scheduler: &mut Scheduler<K>) {
        self.reset();
        self.task.start(scheduler);
        debug!("globe roaming started");
    }

    /// Cancels the frame task and forgets held keys and velocity.
    pub fn stop(&mut self, scheduler: &mut Scheduler<K>) {
        self.task.cancel(scheduler);
        self.reset();
        debug!("globe roaming stopped");
    }

    fn reset(&mut self) {
        self.keys.clear();
        self.velocity.reset();
    }

    /// Returns whether the key is bound. Ignored unless the task is running.
    pub fn key_down(&mut self, scheduler: &Scheduler<K>, key_code: u32) -> bool {
        self.set_key(scheduler, key_code, true)
    }

    pub fn key_up(&mut self, scheduler: &Scheduler<K>, key_code: u32) -> bool {
        self.set_key(scheduler, key_code, false)
    }

    fn set_key(&mut self, scheduler: &Scheduler<K>, key_code: u32, down: bool) -> bool {
        if !self.is_running(scheduler) {
            return false;
        }
        let Some(action) = action_for(GLOBE_KEYS, key_code) else {
            return false;
        };
        self.keys.set(action, down);
        true
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// One frame: translate along the camera axes, then apply held rotations.
    pub fn tick<G: GlobeCamera + ?Sized>(&mut self, camera: &mut G) -> TaskControl {
        self.velocity.step(&self.keys, &self.params);

        let v = self.velocity;
        if v.forward != 0.0 {
            let axis = camera.direction();
            camera.move_along(axis, v.forward);
        }
        if v.lateral != 0.0 {
            let axis = camera.right();
            camera.move_along(axis, v.lateral);
        }
        if v.vertical != 0.0 {
            let axis = camera.up();
            camera.move_along(axis, v.vertical);
        }

        let held = |a| self.keys.is_held(a);
        let step = self.rotate_speed;
        let yaw = step * (held(FlightAction::YawRight) as i32 - held(FlightAction::YawLeft) as i32) as f64;
        let pitch = step * (held(FlightAction::PitchUp) as i32 - held(FlightAction::PitchDown) as i32) as f64;
        let roll = step * (held(FlightAction::RollRight) as i32 - held(FlightAction::RollLeft) as i32) as f64;
        let rotating = [
            FlightAction::YawLeft,
            FlightAction::YawRight,
            FlightAction::PitchUp,
            FlightAction::PitchDown,
            FlightAction::RollLeft,
            FlightAction::RollRight,
        ]
        .into_iter()
        .any(held);

        if rotating {
            let mut hpr = camera.heading_pitch_roll();
            hpr.heading += yaw;
            hpr.pitch = (hpr.pitch + pitch).clamp(-FRAC_PI_2, FRAC_PI_2);
            hpr.roll += roll;
            camera.set_heading_pitch_roll(hpr);
        }
        TaskControl::Continue
    }
}
