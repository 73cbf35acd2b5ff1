//! Differential drive mixing.

use alloc::{boxed::Box, vec::Vec};

#[cfg(target_os = "vexos")]
use micromath::F32Ext;

use crate::{hal::MotorController, Result};

pub const DEFAULT_DEADBAND: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    pub left: f32,
    pub right: f32,
}

/// Zeroes `value` inside the deadband and rescales the rest so the output still spans [-1, 1].
pub fn apply_deadband(value: f32, deadband: f32) -> f32 {
    if value.abs() <= deadband {
        return 0.0;
    }
    if value > 0.0 {
        (value - deadband) / (1.0 - deadband)
    } else {
        (value + deadband) / (1.0 - deadband)
    }
}

fn square_preserving_sign(value: f32) -> f32 {
    value * value.abs()
}

/// Arcade drive inverse kinematics.
///
/// `rotation` is clockwise positive. Outputs are scaled down together so neither side exceeds 1.
pub fn arcade_drive_ik(forward: f32, rotation: f32, square_inputs: bool) -> WheelSpeeds {
    let mut forward = forward.clamp(-1.0, 1.0);
    let mut rotation = rotation.clamp(-1.0, 1.0);

    if square_inputs {
        forward = square_preserving_sign(forward);
        rotation = square_preserving_sign(rotation);
    }

    let left = forward + rotation;
    let right = forward - rotation;

    let greater = forward.abs().max(rotation.abs());
    let lesser = forward.abs().min(rotation.abs());
    if greater == 0.0 {
        return WheelSpeeds::default();
    }
    let saturated = (greater + lesser) / greater;

    WheelSpeeds {
        left: left / saturated,
        right: right / saturated,
    }
}

/// Several motors driven as one. Inversion applies to every member.
#[derive(Debug)]
pub struct MotorControllerGroup {
    motors: Vec<Box<dyn MotorController>>,
    inverted: bool,
    output: f32,
}

impl MotorControllerGroup {
    pub fn new(motors: Vec<Box<dyn MotorController>>) -> Self {
        Self {
            motors,
            inverted: false,
            output: 0.0,
        }
    }

    pub fn set(&mut self, output: f32) -> Result {
        self.output = output;
        let signed = if self.inverted { -output } else { output };
        for motor in self.motors.iter_mut() {
            motor.set_output(signed)?;
        }
        Ok(())
    }

    /// The last output passed to [`set`](Self::set), before inversion.
    pub fn get(&self) -> f32 {
        self.output
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn stop(&mut self) -> Result {
        self.set(0.0)
    }
}

/// Two motor groups driven with arcade controls.
#[derive(Debug)]
pub struct DifferentialDrive {
    left: MotorControllerGroup,
    right: MotorControllerGroup,
    deadband: f32,
}

impl DifferentialDrive {
    pub fn new(left: MotorControllerGroup, right: MotorControllerGroup) -> Self {
        Self {
            left,
            right,
            deadband: DEFAULT_DEADBAND,
        }
    }

    pub fn set_deadband(&mut self, deadband: f32) {
        self.deadband = deadband;
    }

    pub fn arcade_drive(&mut self, forward: f32, rotation: f32, square_inputs: bool) -> Result {
        let forward = apply_deadband(forward, self.deadband);
        let rotation = apply_deadband(rotation, self.deadband);

        let speeds = arcade_drive_ik(forward, rotation, square_inputs);
        self.left.set(speeds.left)?;
        self.right.set(speeds.right)
    }

    pub fn stop(&mut self) -> Result {
        self.left.stop()?;
        self.right.stop()
    }

    pub fn left(&self) -> &MotorControllerGroup {
        &self.left
    }

    pub fn right(&self) -> &MotorControllerGroup {
        &self.right
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use approx::assert_relative_eq;

    use super::*;
    use crate::hal::sim::SimMotor;

    #[test]
    fn mixing_never_saturates() {
        let steps = 20;
        for i in 0..=steps {
            for j in 0..=steps {
                let forward = -1.0 + 2.0 * i as f32 / steps as f32;
                let rotation = -1.0 + 2.0 * j as f32 / steps as f32;
                for square in [false, true] {
                    let speeds = arcade_drive_ik(forward, rotation, square);
                    assert!(speeds.left.abs() <= 1.0 + 1e-6, "{forward} {rotation}");
                    assert!(speeds.right.abs() <= 1.0 + 1e-6, "{forward} {rotation}");
                }
            }
        }
    }

    #[test]
    fn mixing_directions() {
        let speeds = arcade_drive_ik(0.5, 0.0, false);
        assert_eq!(speeds, WheelSpeeds { left: 0.5, right: 0.5 });

        // Clockwise rotation drives the left side forward.
        let speeds = arcade_drive_ik(0.0, 0.5, false);
        assert_eq!(speeds, WheelSpeeds { left: 0.5, right: -0.5 });

        let speeds = arcade_drive_ik(1.0, 1.0, false);
        assert_relative_eq!(speeds.left, 1.0);
        assert_relative_eq!(speeds.right, 0.0);

        assert_eq!(arcade_drive_ik(3.0, 0.0, false).left, 1.0);
        assert_eq!(arcade_drive_ik(0.0, 0.0, true), WheelSpeeds::default());
    }

    #[test]
    fn deadband_rescales() {
        assert_eq!(apply_deadband(0.01, 0.02), 0.0);
        assert_eq!(apply_deadband(-0.02, 0.02), 0.0);
        assert_relative_eq!(apply_deadband(1.0, 0.02), 1.0);
        assert_relative_eq!(apply_deadband(-0.51, 0.02), -0.5, epsilon = 1e-6);
    }

    #[test]
    fn inverted_group_flips_every_motor() {
        let (front, back) = (SimMotor::default(), SimMotor::default());
        let mut group = MotorControllerGroup::new(vec![
            Box::new(front.clone()) as Box<dyn MotorController>,
            Box::new(back.clone()),
        ]);
        group.set_inverted(true);
        group.set(0.25).unwrap();

        assert_eq!(group.get(), 0.25);
        assert_eq!(front.output(), -0.25);
        assert_eq!(back.output(), -0.25);

        group.stop().unwrap();
        assert_eq!(front.output(), 0.0);
    }

    #[test]
    fn drive_ignores_stick_noise() {
        let (left, right) = (SimMotor::default(), SimMotor::default());
        let mut drive = DifferentialDrive::new(
            MotorControllerGroup::new(vec![Box::new(left.clone()) as Box<dyn MotorController>]),
            MotorControllerGroup::new(vec![Box::new(right.clone()) as Box<dyn MotorController>]),
        );

        drive.arcade_drive(0.015, -0.01, false).unwrap();
        assert_eq!(left.output(), 0.0);
        assert_eq!(right.output(), 0.0);

        drive.arcade_drive(1.0, 0.0, false).unwrap();
        assert_relative_eq!(left.output(), 1.0);
        assert_relative_eq!(drive.right().get(), 1.0);
    }
}
