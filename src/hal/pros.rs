//! V5 brain devices.

use alloc::string::ToString;
use core::fmt::Display;

use pros::{
    devices::{
        adi::{digital::AdiDigitalIn, encoder::AdiEncoder},
        controller::{Controller, ControllerButton, JoystickAxis as ProsAxis},
        smart::{imu::InertialSensor, motor::BrakeMode, Motor},
    },
    prelude::*,
};

use super::{Button, DigitalInput, Gamepad, Gyro, JoystickAxis, MotorController, QuadratureEncoder};
use crate::{DeviceSnafu, Result};

fn device_error(port: u8, err: impl Display) -> crate::Error {
    DeviceSnafu {
        port,
        message: err.to_string(),
    }
    .build()
}

#[derive(Debug)]
pub struct V5Motor {
    port: u8,
    motor: Motor,
    reversed: bool,
    output: f32,
}

impl V5Motor {
    pub fn new(port: u8, reversed: bool) -> Result<Self> {
        let motor = Motor::new(unsafe { SmartPort::new(port) }, BrakeMode::Brake)
            .map_err(|err| device_error(port, err))?;
        Ok(Self {
            port,
            motor,
            reversed,
            output: 0.0,
        })
    }
}

impl MotorController for V5Motor {
    fn set_output(&mut self, output: f32) -> Result {
        let output = output.clamp(-1.0, 1.0);
        let signed = if self.reversed { -output } else { output };
        self.motor
            .set_output(signed)
            .map_err(|err| device_error(self.port, err))?;
        self.output = output;
        Ok(())
    }

    fn output(&self) -> f32 {
        self.output
    }
}

#[derive(Debug)]
pub struct V5Inertial {
    port: u8,
    imu: InertialSensor,
}

impl V5Inertial {
    pub fn new(port: u8) -> Self {
        Self {
            port,
            imu: InertialSensor::new(unsafe { SmartPort::new(port) }),
        }
    }
}

impl Gyro for V5Inertial {
    fn yaw(&self) -> Result<f32> {
        self.imu
            .yaw()
            .map(|yaw| yaw as f32)
            .map_err(|err| device_error(self.port, err))
    }

    fn reset(&mut self) -> Result {
        self.imu
            .tare_yaw()
            .map_err(|err| device_error(self.port, err))
    }
}

#[derive(Debug)]
pub struct V5Encoder {
    port: u8,
    encoder: AdiEncoder,
}

impl V5Encoder {
    /// `top` and `bottom` are ADI ports 1-8 on the brain.
    pub fn new(top: u8, bottom: u8, reversed: bool) -> Result<Self> {
        let ports = unsafe { (AdiPort::new(top, None), AdiPort::new(bottom, None)) };
        let encoder =
            AdiEncoder::new(ports, reversed).map_err(|err| device_error(top, err))?;
        Ok(Self { port: top, encoder })
    }
}

impl QuadratureEncoder for V5Encoder {
    fn count(&self) -> Result<i32> {
        self.encoder
            .value()
            .map_err(|err| device_error(self.port, err))
    }

    fn reset(&mut self) -> Result {
        self.encoder
            .zero()
            .map_err(|err| device_error(self.port, err))
    }
}

#[derive(Debug)]
pub struct V5Switch {
    port: u8,
    input: AdiDigitalIn,
}

impl V5Switch {
    pub fn new(port: u8) -> Self {
        Self {
            port,
            input: AdiDigitalIn::new(unsafe { AdiPort::new(port, None) }),
        }
    }
}

impl DigitalInput for V5Switch {
    fn get(&self) -> Result<bool> {
        self.input
            .is_high()
            .map_err(|err| device_error(self.port, err))
    }
}

/// The V5 master controller. Reported on port 0 when a read fails.
#[derive(Debug, Clone, Copy)]
pub struct V5Controller(pub Controller);

impl Gamepad for V5Controller {
    fn axis(&self, axis: JoystickAxis) -> Result<f32> {
        let axis = match axis {
            JoystickAxis::LeftX => ProsAxis::LeftX,
            JoystickAxis::LeftY => ProsAxis::LeftY,
            JoystickAxis::RightX => ProsAxis::RightX,
            JoystickAxis::RightY => ProsAxis::RightY,
        };
        self.0
            .joystick_axis(axis)
            .map_err(|err| device_error(0, err))
    }

    fn button(&self, button: Button) -> Result<bool> {
        let button = match button {
            Button::A => ControllerButton::A,
            Button::B => ControllerButton::B,
            Button::X => ControllerButton::X,
            Button::Y => ControllerButton::Y,
            Button::Up => ControllerButton::Up,
            Button::Down => ControllerButton::Down,
            Button::Left => ControllerButton::Left,
            Button::Right => ControllerButton::Right,
            Button::L1 => ControllerButton::LeftTrigger1,
            Button::L2 => ControllerButton::LeftTrigger2,
            Button::R1 => ControllerButton::RightTrigger1,
            Button::R2 => ControllerButton::RightTrigger2,
        };
        self.0
            .button(button)
            .map_err(|err| device_error(0, err))
    }
}
