use alloc::{boxed::Box, rc::Rc};

use pros::devices::Controller;
use robot_command::{
    hal::pros::{V5Controller, V5Encoder, V5Inertial, V5Motor, V5Switch},
    Result,
};

use crate::{
    constants::{arm, drive},
    robot::RobotHardware,
    subsystems::{ArmHardware, DriveHardware},
};

impl RobotHardware {
    /// The devices wired to the brain.
    pub fn v5() -> Result<Self> {
        let (left_top, left_bottom) = drive::LEFT_ENCODER_PORTS;
        let (right_top, right_bottom) = drive::RIGHT_ENCODER_PORTS;
        let (arm_top, arm_bottom) = arm::ENCODER_PORTS;

        Ok(Self {
            gamepad: Rc::new(V5Controller(Controller::Master)),
            drive: DriveHardware {
                front_left: Box::new(V5Motor::new(drive::FRONT_LEFT_MOTOR_PORT, false)?),
                back_left: Box::new(V5Motor::new(drive::BACK_LEFT_MOTOR_PORT, false)?),
                front_right: Box::new(V5Motor::new(drive::FRONT_RIGHT_MOTOR_PORT, false)?),
                back_right: Box::new(V5Motor::new(drive::BACK_RIGHT_MOTOR_PORT, false)?),
                gyro: Box::new(V5Inertial::new(drive::GYRO_PORT)),
                left_encoder: Box::new(V5Encoder::new(
                    left_top,
                    left_bottom,
                    drive::LEFT_ENCODER_REVERSED,
                )?),
                right_encoder: Box::new(V5Encoder::new(
                    right_top,
                    right_bottom,
                    drive::RIGHT_ENCODER_REVERSED,
                )?),
                sim: None,
            },
            arm: ArmHardware {
                left_motor: Box::new(V5Motor::new(arm::LEFT_MOTOR_PORT, false)?),
                right_motor: Box::new(V5Motor::new(
                    arm::RIGHT_MOTOR_PORT,
                    arm::RIGHT_MOTOR_REVERSED,
                )?),
                encoder: Box::new(V5Encoder::new(arm_top, arm_bottom, arm::ENCODER_REVERSED)?),
                upper_limit: Box::new(V5Switch::new(arm::UPPER_LIMIT_SWITCH_PORT)),
                lower_limit: Box::new(V5Switch::new(arm::LOWER_LIMIT_SWITCH_PORT)),
                sim: None,
            },
        })
    }
}
