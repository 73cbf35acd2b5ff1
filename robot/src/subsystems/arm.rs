use alloc::{boxed::Box, vec};

use log::warn;
use robot_command::{
    dashboard,
    drive::MotorControllerGroup,
    hal::{
        sim::{SimDigitalInput, SimEncoder, SimMotor},
        DigitalInput, Encoder, MotorController, QuadratureEncoder,
    },
    robot::ITERATION_PERIOD,
    subsystem::Subsystem,
    Result,
};

use crate::constants::arm::*;

#[derive(Debug)]
pub struct ArmHardware {
    pub left_motor: Box<dyn MotorController>,
    pub right_motor: Box<dyn MotorController>,
    pub encoder: Box<dyn QuadratureEncoder>,
    pub upper_limit: Box<dyn DigitalInput>,
    pub lower_limit: Box<dyn DigitalInput>,
    pub sim: Option<ArmSim>,
}

impl ArmHardware {
    pub fn simulated() -> Self {
        let sim = ArmSim::default();
        Self {
            left_motor: Box::new(SimMotor::default()),
            right_motor: Box::new(SimMotor::default()),
            encoder: Box::new(sim.encoder.clone()),
            upper_limit: Box::new(sim.upper_limit.clone()),
            lower_limit: Box::new(sim.lower_limit.clone()),
            sim: Some(sim),
        }
    }
}

/// An arm that moves at a speed proportional to its power and stops hard at either end.
#[derive(Debug, Clone, Default)]
pub struct ArmSim {
    pub encoder: SimEncoder,
    pub upper_limit: SimDigitalInput,
    pub lower_limit: SimDigitalInput,
}

impl ArmSim {
    pub fn position(&self) -> Result<f32> {
        Ok(self.encoder.count()? as f32 * DEGREES_PER_PULSE)
    }

    pub fn set_position(&self, degrees: f32) {
        self.encoder.set_count((degrees / DEGREES_PER_PULSE) as i32);
    }

    pub fn step(&self, power: f32, dt: f32) -> Result {
        let moved = power * SIM_MAX_SPEED_DEGREES_PER_SEC * dt;
        self.encoder.add_pulses(moved / DEGREES_PER_PULSE);

        let position = self.position()?;
        if position < SIM_LOWER_LIMIT_DEGREES {
            self.set_position(SIM_LOWER_LIMIT_DEGREES);
        } else if position > SIM_UPPER_LIMIT_DEGREES {
            self.set_position(SIM_UPPER_LIMIT_DEGREES);
        }

        let position = self.position()?;
        self.lower_limit.set(position <= SIM_LOWER_LIMIT_DEGREES);
        self.upper_limit.set(position >= SIM_UPPER_LIMIT_DEGREES);
        Ok(())
    }
}

#[derive(Debug)]
pub struct ArmSubsystem {
    motors: MotorControllerGroup,
    encoder: Encoder,
    upper_limit: Box<dyn DigitalInput>,
    lower_limit: Box<dyn DigitalInput>,
    limit_switches_installed: bool,
    limits_enabled: bool,
    sim: Option<ArmSim>,
}

impl ArmSubsystem {
    pub fn new(hardware: ArmHardware) -> Self {
        Self::with_limit_switches(hardware, LIMIT_SWITCHES_INSTALLED)
    }

    /// Builds the arm, reading the limit switches only if `installed`.
    pub fn with_limit_switches(hardware: ArmHardware, installed: bool) -> Self {
        Self {
            motors: MotorControllerGroup::new(vec![hardware.left_motor, hardware.right_motor]),
            encoder: Encoder::new(hardware.encoder, DEGREES_PER_PULSE),
            upper_limit: hardware.upper_limit,
            lower_limit: hardware.lower_limit,
            limit_switches_installed: installed,
            limits_enabled: installed,
            sim: hardware.sim,
        }
    }

    /// Sets the open-loop arm power. With limits enabled, power towards a tripped switch is
    /// dropped.
    pub fn set_power(&mut self, power: f32) -> Result {
        let blocked = self.limits_enabled
            && ((power > 0.0 && self.upper_limit_pressed()?)
                || (power < 0.0 && self.lower_limit_pressed()?));
        self.motors.set(if blocked { 0.0 } else { power })
    }

    pub fn power(&self) -> f32 {
        self.motors.get()
    }

    pub fn stop(&mut self) -> Result {
        self.motors.stop()
    }

    /// Always false while the switches are not installed.
    pub fn upper_limit_pressed(&self) -> Result<bool> {
        if !self.limit_switches_installed {
            return Ok(false);
        }
        self.upper_limit.get()
    }

    pub fn lower_limit_pressed(&self) -> Result<bool> {
        if !self.limit_switches_installed {
            return Ok(false);
        }
        self.lower_limit.get()
    }

    /// Has no effect while the switches are not installed.
    pub fn set_limits_enabled(&mut self, enabled: bool) {
        self.limits_enabled = self.limit_switches_installed && enabled;
    }

    pub fn limits_enabled(&self) -> bool {
        self.limits_enabled
    }

    /// Arm angle in degrees from the lowered position.
    pub fn position(&self) -> Result<f32> {
        self.encoder.distance()
    }

    pub fn reset_position(&mut self) -> Result {
        self.encoder.reset()
    }

    pub fn sim(&self) -> Option<&ArmSim> {
        self.sim.as_ref()
    }
}

impl Subsystem for ArmSubsystem {
    fn periodic(&mut self) {
        dashboard::put_number("Arm Speed", self.power() as f64);
        match self.upper_limit_pressed() {
            Ok(pressed) => dashboard::put_bool("Upper Limit Tripped?", pressed),
            Err(err) => warn!("could not read the upper arm limit: {err}"),
        }
    }

    fn sim_periodic(&mut self) {
        if let Some(sim) = &self.sim {
            if let Err(err) = sim.step(self.power(), ITERATION_PERIOD.as_secs_f32()) {
                warn!("arm simulation failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn simulated(installed: bool) -> (ArmSubsystem, ArmSim) {
        let hardware = ArmHardware::simulated();
        let sim = hardware.sim.clone().unwrap();
        (ArmSubsystem::with_limit_switches(hardware, installed), sim)
    }

    #[test]
    fn limits_report_released_without_switches() {
        let hardware = ArmHardware::simulated();
        let sim = hardware.sim.clone().unwrap();
        let mut arm = ArmSubsystem::new(hardware);
        sim.upper_limit.set(true);
        sim.lower_limit.set(true);

        assert!(!arm.upper_limit_pressed().unwrap());
        assert!(!arm.lower_limit_pressed().unwrap());

        arm.set_limits_enabled(true);
        assert!(!arm.limits_enabled());
    }

    #[test]
    fn power_is_open_loop() {
        let (mut arm, _) = simulated(false);
        arm.set_power(0.45).unwrap();
        assert_eq!(arm.power(), 0.45);

        arm.periodic();
        assert_eq!(dashboard::get_number("Arm Speed"), Some(0.45f32 as f64));
        assert_eq!(dashboard::get_bool("Upper Limit Tripped?"), Some(false));

        arm.stop().unwrap();
        assert_eq!(arm.power(), 0.0);
    }

    #[test]
    fn enabled_limits_block_power_past_the_switch() {
        let (mut arm, sim) = simulated(true);
        assert!(arm.limits_enabled());

        sim.upper_limit.set(true);
        arm.set_power(0.5).unwrap();
        assert_eq!(arm.power(), 0.0);
        arm.set_power(-0.5).unwrap();
        assert_eq!(arm.power(), -0.5);

        arm.set_limits_enabled(false);
        arm.set_power(0.5).unwrap();
        assert_eq!(arm.power(), 0.5);
    }

    #[test]
    fn simulation_moves_the_encoder() {
        let (mut arm, sim) = simulated(true);
        arm.set_power(1.0).unwrap();
        for _ in 0..50 {
            arm.sim_periodic();
        }
        assert_relative_eq!(arm.position().unwrap(), 90.0, epsilon = 0.5);

        for _ in 0..50 {
            arm.sim_periodic();
        }
        assert_relative_eq!(arm.position().unwrap(), SIM_UPPER_LIMIT_DEGREES, epsilon = 0.5);
        assert!(arm.upper_limit_pressed().unwrap());
        assert!(!sim.lower_limit.get().unwrap());

        arm.reset_position().unwrap();
        assert_eq!(arm.position().unwrap(), 0.0);
    }
}
