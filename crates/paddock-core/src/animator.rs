//! Continuous presentation rotation

use std::f32::consts::TAU;

use glam::Quat;

use crate::stage::InstanceId;

/// Yaw added per tick, in radians
pub const DEFAULT_SPIN_STEP: f32 = 0.005;

/// Cancellable rotation task bound to a single presentation instance.
///
/// Each instance gets a fresh task starting at zero. Once cancelled a task
/// never yields another rotation.
#[derive(Debug)]
pub struct SpinTask {
    target: InstanceId,
    angle: f32,
    step: f32,
    cancelled: bool,
}

impl SpinTask {
    pub fn start(target: InstanceId, step: f32) -> Self {
        Self {
            target,
            angle: 0.0,
            step,
            cancelled: false,
        }
    }

    /// Advance by one step and return the new Y-axis orientation
    pub fn tick(&mut self) -> Option<Quat> {
        if self.cancelled {
            return None;
        }
        self.angle = (self.angle + self.step).rem_euclid(TAU);
        Some(self.rotation())
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn target(&self) -> InstanceId {
        self.target
    }

    /// Accumulated yaw in `[0, TAU)`
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }
}
