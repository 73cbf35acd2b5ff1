//! Simulated devices.
//!
//! Every device is a cheap handle over shared state. A subsystem owns one clone and the
//! simulation or the test keeps another to drive and inspect it.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use hashbrown::HashSet;

use super::{Button, DigitalInput, Gamepad, Gyro, JoystickAxis, MotorController, QuadratureEncoder};
use crate::Result;

#[derive(Debug, Clone, Default)]
pub struct SimMotor {
    output: Rc<Cell<f32>>,
}

impl MotorController for SimMotor {
    fn set_output(&mut self, output: f32) -> Result {
        self.output.set(output.clamp(-1.0, 1.0));
        Ok(())
    }

    fn output(&self) -> f32 {
        self.output.get()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimGyro {
    yaw: Rc<Cell<f32>>,
}

impl SimGyro {
    pub fn set_yaw(&self, degrees: f32) {
        self.yaw.set(degrees);
    }

    pub fn rotate(&self, degrees: f32) {
        self.yaw.set(self.yaw.get() + degrees);
    }
}

impl Gyro for SimGyro {
    fn yaw(&self) -> Result<f32> {
        Ok(self.yaw.get())
    }

    fn reset(&mut self) -> Result {
        self.yaw.set(0.0);
        Ok(())
    }
}

/// Counts are kept as a float so the simulation can move by fractions of a pulse.
#[derive(Debug, Clone, Default)]
pub struct SimEncoder {
    count: Rc<Cell<f32>>,
}

impl SimEncoder {
    pub fn set_count(&self, count: i32) {
        self.count.set(count as f32);
    }

    pub fn add_pulses(&self, pulses: f32) {
        self.count.set(self.count.get() + pulses);
    }
}

impl QuadratureEncoder for SimEncoder {
    fn count(&self) -> Result<i32> {
        Ok(self.count.get() as i32)
    }

    fn reset(&mut self) -> Result {
        self.count.set(0.0);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimDigitalInput {
    value: Rc<Cell<bool>>,
}

impl SimDigitalInput {
    pub fn set(&self, value: bool) {
        self.value.set(value);
    }
}

impl DigitalInput for SimDigitalInput {
    fn get(&self) -> Result<bool> {
        Ok(self.value.get())
    }
}

#[derive(Debug, Default)]
struct GamepadState {
    left_x: f32,
    left_y: f32,
    right_x: f32,
    right_y: f32,
    held: HashSet<Button>,
}

#[derive(Debug, Clone, Default)]
pub struct SimGamepad {
    state: Rc<RefCell<GamepadState>>,
}

impl SimGamepad {
    pub fn set_axis(&self, axis: JoystickAxis, value: f32) {
        let mut state = self.state.borrow_mut();
        let value = value.clamp(-1.0, 1.0);
        match axis {
            JoystickAxis::LeftX => state.left_x = value,
            JoystickAxis::LeftY => state.left_y = value,
            JoystickAxis::RightX => state.right_x = value,
            JoystickAxis::RightY => state.right_y = value,
        }
    }

    pub fn press(&self, button: Button) {
        self.state.borrow_mut().held.insert(button);
    }

    pub fn release(&self, button: Button) {
        self.state.borrow_mut().held.remove(&button);
    }
}

impl Gamepad for SimGamepad {
    fn axis(&self, axis: JoystickAxis) -> Result<f32> {
        let state = self.state.borrow();
        Ok(match axis {
            JoystickAxis::LeftX => state.left_x,
            JoystickAxis::LeftY => state.left_y,
            JoystickAxis::RightX => state.right_x,
            JoystickAxis::RightY => state.right_y,
        })
    }

    fn button(&self, button: Button) -> Result<bool> {
        Ok(self.state.borrow().held.contains(&button))
    }
}
