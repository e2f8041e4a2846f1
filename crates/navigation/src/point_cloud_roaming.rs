//! Accelerating first-person fly-through for the point-cloud viewer.

use foundation::math::Vec3;
use runtime::{RepeatingTask, Scheduler, TaskControl};
use scene::{ControlsMode, NavigationControls, PointCloudCamera, PointCloudView};
use tracing::debug;

use crate::keys::{KeyBinding, KeyState, POINT_CLOUD_KEYS, action_for};
use crate::velocity::{FlightParams, FlightVelocity};

#[derive(Debug)]
pub struct PointCloudRoaming<K> {
    params: FlightParams,
    keys: KeyState,
    velocity: FlightVelocity,
    task: RepeatingTask<K>,
}

impl<K: Copy> PointCloudRoaming<K> {
    pub fn new(params: FlightParams, task: RepeatingTask<K>) -> Self {
        Self {
            params,
            keys: KeyState::new(),
            velocity: FlightVelocity::default(),
            task,
        }
    }

    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    pub fn velocity(&self) -> FlightVelocity {
        self.velocity
    }

    pub fn key_mappings(&self) -> &'static [KeyBinding] {
        POINT_CLOUD_KEYS
    }

    pub fn is_running(&self, scheduler: &Scheduler<K>) -> bool {
        self.task.is_running(scheduler)
    }

    /// Switches the viewer to first-person controls and starts the frame task.
    pub fn start<V: NavigationControls + ?Sized>(&mut self, viewer: &mut V, scheduler: &mut Scheduler<K>) {
        viewer.set_controls(ControlsMode::FirstPerson);
        self.keys.clear();
        self.velocity.reset();
        self.task.start(scheduler);
        debug!("point cloud roaming started");
    }

    /// Returns the viewer to earth controls.
    pub fn stop<V: NavigationControls + ?Sized>(&mut self, viewer: &mut V, scheduler: &mut Scheduler<K>) {
        viewer.set_controls(ControlsMode::Earth);
        self.keys.clear();
        self.velocity.reset();
        self.task.cancel(scheduler);
        debug!("point cloud roaming stopped");
    }

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
        match action_for(POINT_CLOUD_KEYS, key_code) {
            Some(action) => {
                self.keys.set(action, down);
                true
            }
            None => false,
        }
    }

    /// One frame of motion against the camera basis sampled at the start of the frame.
    pub fn tick<P: PointCloudCamera + PointCloudView + ?Sized>(&mut self, viewer: &mut P) -> TaskControl {
        self.velocity.step(&self.keys, &self.params);
        if self.velocity.is_zero() {
            return TaskControl::Continue;
        }

        let Some(m) = viewer.world_matrix() else {
            return TaskControl::Continue;
        };
        let eps = self.params.move_epsilon;
        let v = self.velocity;
        let mut offset = Vec3::ZERO;

        // Forward stays level: the backward axis with its height dropped.
        if v.forward.abs() > eps {
            let back = m.column3(2);
            if let Some(level) = Vec3::new(back.x, back.y, 0.0).normalize() {
                offset += level * -v.forward;
            }
        }
        if v.lateral.abs() > eps {
            offset += m.column3(0) * v.lateral;
        }
        if v.vertical.abs() > eps {
            offset += m.column3(1) * v.vertical;
        }

        if offset != Vec3::ZERO {
            viewer.set_view_position(viewer.view_position() + offset);
            viewer.set_view_direction(-m.column3(2));
        }
        TaskControl::Continue
    }
}
