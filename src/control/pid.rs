//! PID controller run once per robot cycle.
//!
//! Works in `no_std` and does not allocate memory.

#[cfg(target_os = "vexos")]
use micromath::F32Ext;

use crate::robot::ITERATION_PERIOD;

/// PID controller with a fixed loop period, tolerance checking and optional continuous input.
#[derive(Debug, Clone)]
pub struct PidController {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,
    /// Loop period in seconds
    period: f32,

    setpoint: f32,
    measurement: f32,

    position_error: f32,
    velocity_error: f32,
    previous_error: f32,
    total_error: f32,

    position_tolerance: f32,
    velocity_tolerance: f32,

    /// Integral anti-windup clamp, in output units
    minimum_integral: f32,
    maximum_integral: f32,

    /// Input range that wraps around, e.g. a heading in degrees
    continuous: Option<(f32, f32)>,

    have_setpoint: bool,
    have_measurement: bool,
}

impl PidController {
    /// Create a new PID controller running at [`ITERATION_PERIOD`].
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self::with_period(kp, ki, kd, ITERATION_PERIOD.as_secs_f32())
    }

    pub fn with_period(kp: f32, ki: f32, kd: f32, period: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            period,

            setpoint: 0.0,
            measurement: 0.0,

            position_error: 0.0,
            velocity_error: 0.0,
            previous_error: 0.0,
            total_error: 0.0,

            position_tolerance: 0.05,
            velocity_tolerance: f32::INFINITY,

            minimum_integral: -1.0,
            maximum_integral: 1.0,

            continuous: None,

            have_setpoint: false,
            have_measurement: false,
        }
    }

    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    pub fn set_setpoint(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
        self.have_setpoint = true;

        self.position_error = match self.continuous {
            Some((minimum, maximum)) => {
                let half_range = (maximum - minimum) / 2.0;
                input_modulus(self.setpoint - self.measurement, -half_range, half_range)
            }
            None => self.setpoint - self.measurement,
        };
        self.velocity_error = (self.position_error - self.previous_error) / self.period;
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn set_tolerance(&mut self, position_tolerance: f32) {
        self.set_tolerance_with_velocity(position_tolerance, f32::INFINITY);
    }

    pub fn set_tolerance_with_velocity(&mut self, position_tolerance: f32, velocity_tolerance: f32) {
        self.position_tolerance = position_tolerance;
        self.velocity_tolerance = velocity_tolerance;
    }

    /// Treats `minimum` and `maximum` as the same point, so the controller always takes the
    /// shorter way around.
    pub fn enable_continuous_input(&mut self, minimum: f32, maximum: f32) {
        self.continuous = Some((minimum, maximum));
    }

    pub fn disable_continuous_input(&mut self) {
        self.continuous = None;
    }

    pub fn is_continuous_input_enabled(&self) -> bool {
        self.continuous.is_some()
    }

    /// Set integral limits for anti-windup, in output units.
    pub fn set_integrator_range(&mut self, minimum: f32, maximum: f32) {
        self.minimum_integral = minimum;
        self.maximum_integral = maximum;
    }

    pub fn position_error(&self) -> f32 {
        self.position_error
    }

    pub fn velocity_error(&self) -> f32 {
        self.velocity_error
    }

    /// True once a measurement has been taken and the error is inside both tolerances.
    pub fn at_setpoint(&self) -> bool {
        self.have_measurement
            && self.have_setpoint
            && self.position_error.abs() < self.position_tolerance
            && self.velocity_error.abs() < self.velocity_tolerance
    }

    /// Returns the controller output for `measurement`.
    pub fn calculate(&mut self, measurement: f32) -> f32 {
        self.measurement = measurement;
        self.previous_error = self.position_error;
        self.have_measurement = true;

        self.position_error = match self.continuous {
            Some((minimum, maximum)) => {
                let half_range = (maximum - minimum) / 2.0;
                input_modulus(self.setpoint - measurement, -half_range, half_range)
            }
            None => self.setpoint - measurement,
        };
        self.velocity_error = (self.position_error - self.previous_error) / self.period;

        if self.ki != 0.0 {
            self.total_error = (self.total_error + self.position_error * self.period).clamp(
                self.minimum_integral / self.ki,
                self.maximum_integral / self.ki,
            );
        }

        self.kp * self.position_error + self.ki * self.total_error + self.kd * self.velocity_error
    }

    pub fn calculate_with_setpoint(&mut self, measurement: f32, setpoint: f32) -> f32 {
        self.set_setpoint(setpoint);
        self.calculate(measurement)
    }

    /// Clears the integrator and error history.
    pub fn reset(&mut self) {
        self.position_error = 0.0;
        self.previous_error = 0.0;
        self.total_error = 0.0;
        self.velocity_error = 0.0;
        self.have_measurement = false;
    }
}

/// Wraps `input` into `[minimum, maximum]`.
pub fn input_modulus(input: f32, minimum: f32, maximum: f32) -> f32 {
    let modulus = maximum - minimum;
    let mut input = input;

    let wraps = ((input - minimum) / modulus) as i32;
    input -= wraps as f32 * modulus;

    let wraps = ((input - maximum) / modulus) as i32;
    input -= wraps as f32 * modulus;

    input
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn proportional_output() {
        let mut pid = PidController::new(0.5, 0.0, 0.0);
        pid.set_setpoint(10.0);
        assert_relative_eq!(pid.calculate(4.0), 3.0);
    }

    #[test]
    fn continuous_input_takes_the_short_way() {
        let mut pid = PidController::new(1.0, 0.0, 0.0);
        pid.enable_continuous_input(-180.0, 180.0);
        pid.set_setpoint(170.0);
        assert_relative_eq!(pid.calculate(-170.0), -20.0, epsilon = 1e-4);

        pid.set_setpoint(-179.0);
        assert_relative_eq!(pid.calculate(179.0), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn at_setpoint_needs_a_measurement() {
        let mut pid = PidController::new(1.0, 0.0, 0.0);
        pid.set_tolerance(1.0);
        pid.set_setpoint(5.0);
        assert!(!pid.at_setpoint());

        pid.calculate(0.0);
        assert!(!pid.at_setpoint());

        pid.calculate(4.5);
        assert!(pid.at_setpoint());

        pid.reset();
        assert!(!pid.at_setpoint());
    }

    #[test]
    fn velocity_tolerance_blocks_fast_crossings() {
        let mut pid = PidController::new(1.0, 0.0, 0.0);
        pid.set_tolerance_with_velocity(1.0, 10.0);
        pid.set_setpoint(0.0);

        pid.calculate(-5.0);
        pid.calculate(0.5);
        assert!(!pid.at_setpoint());

        pid.calculate(0.4);
        assert!(pid.at_setpoint());
    }

    #[test]
    fn integrator_is_clamped() {
        let mut pid = PidController::with_period(0.0, 1.0, 0.0, 1.0);
        pid.set_integrator_range(-0.5, 0.5);
        pid.set_setpoint(10.0);
        for _ in 0..10 {
            pid.calculate(0.0);
        }
        assert_relative_eq!(pid.calculate(0.0), 0.5);
    }

    #[test]
    fn modulus_wraps_both_ways() {
        assert_relative_eq!(input_modulus(190.0, -180.0, 180.0), -170.0, epsilon = 1e-4);
        assert_relative_eq!(input_modulus(-190.0, -180.0, 180.0), 170.0, epsilon = 1e-4);
        assert_relative_eq!(input_modulus(45.0, -180.0, 180.0), 45.0);
    }
}
