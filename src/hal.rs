//! Hardware seams. Subsystems own boxed devices so the same code drives the brain and the
//! simulator.

use alloc::boxed::Box;
use core::fmt::Debug;

use crate::Result;

#[cfg(target_os = "vexos")]
pub mod pros;
pub mod sim;

pub trait MotorController: Debug {
    /// Sets the output as a fraction of full power in [-1, 1].
    fn set_output(&mut self, output: f32) -> Result;
    /// The last output that was set.
    fn output(&self) -> f32;
}

pub trait Gyro: Debug {
    /// Raw yaw in degrees, as reported by the sensor.
    fn yaw(&self) -> Result<f32>;
    fn reset(&mut self) -> Result;
}

pub trait QuadratureEncoder: Debug {
    fn count(&self) -> Result<i32>;
    fn reset(&mut self) -> Result;
}

pub trait DigitalInput: Debug {
    fn get(&self) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoystickAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    Up,
    Down,
    Left,
    Right,
    L1,
    L2,
    R1,
    R2,
}

pub trait Gamepad {
    /// Axis position in [-1, 1]. Up and right are positive.
    fn axis(&self, axis: JoystickAxis) -> Result<f32>;
    fn button(&self, button: Button) -> Result<bool>;
}

/// A quadrature encoder scaled to a distance.
#[derive(Debug)]
pub struct Encoder {
    counter: Box<dyn QuadratureEncoder>,
    distance_per_pulse: f32,
}

impl Encoder {
    pub fn new(counter: Box<dyn QuadratureEncoder>, distance_per_pulse: f32) -> Self {
        Self {
            counter,
            distance_per_pulse,
        }
    }

    pub fn distance_per_pulse(&self) -> f32 {
        self.distance_per_pulse
    }

    pub fn distance(&self) -> Result<f32> {
        Ok(self.counter.count()? as f32 * self.distance_per_pulse)
    }

    pub fn reset(&mut self) -> Result {
        self.counter.reset()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{sim::SimEncoder, *};

    #[test]
    fn encoder_scales_counts() {
        let counter = SimEncoder::default();
        let mut encoder = Encoder::new(Box::new(counter.clone()), 0.25);

        counter.set_count(-40);
        assert_relative_eq!(encoder.distance().unwrap(), -10.0);

        encoder.reset().unwrap();
        assert_eq!(encoder.distance().unwrap(), 0.0);
    }
}
