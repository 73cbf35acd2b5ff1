use alloc::{rc::Rc, vec, vec::Vec};
use core::cell::RefCell;

use robot_command::{command::Command, control::PidController, Result, SubsystemRef};

use crate::{constants::arm::*, subsystems::ArmSubsystem};

/// Lowers the arm at a fixed power until it reaches the lower limit switch.
pub struct LowerArm {
    arm: Rc<RefCell<ArmSubsystem>>,
    requirements: Vec<SubsystemRef>,
}

impl LowerArm {
    pub fn new(arm: Rc<RefCell<ArmSubsystem>>) -> Self {
        Self {
            requirements: vec![SubsystemRef::from(&arm)],
            arm,
        }
    }
}

impl Command for LowerArm {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn execute(&mut self) -> Result {
        self.arm.borrow_mut().set_power(LOWER_POWER)
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.arm.borrow_mut().stop()
    }

    fn is_finished(&self) -> Result<bool> {
        self.arm.borrow().lower_limit_pressed()
    }
}

/// Holds the arm at an angle with a PID loop on the arm encoder. Finishes once it is there.
pub struct ArmToPosition {
    arm: Rc<RefCell<ArmSubsystem>>,
    controller: PidController,
    requirements: Vec<SubsystemRef>,
}

impl ArmToPosition {
    pub fn new(arm: Rc<RefCell<ArmSubsystem>>, degrees: f32) -> Self {
        let mut controller = PidController::new(ROTATION_P, ROTATION_I, ROTATION_D);
        controller.set_tolerance(ROTATION_TOLERANCE_DEGREES);
        controller.set_setpoint(degrees);

        Self {
            requirements: vec![SubsystemRef::from(&arm)],
            arm,
            controller,
        }
    }

    /// Arm height for scoring in the lower hub.
    pub fn lower_hub(arm: Rc<RefCell<ArmSubsystem>>) -> Self {
        Self::new(arm, LOWER_HUB_HEIGHT_DEGREES)
    }

    /// Arm height for climbing the ramp.
    pub fn ramp(arm: Rc<RefCell<ArmSubsystem>>) -> Self {
        Self::new(arm, RAMP_HEIGHT_DEGREES)
    }

    pub fn target(&self) -> f32 {
        self.controller.setpoint()
    }
}

impl Command for ArmToPosition {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.controller.reset();
        Ok(())
    }

    fn execute(&mut self) -> Result {
        let position = self.arm.borrow().position()?;
        let power = self
            .controller
            .calculate(position)
            .clamp(-MAX_POWER, MAX_POWER);
        self.arm.borrow_mut().set_power(power)
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.arm.borrow_mut().stop()
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.controller.at_setpoint())
    }
}

#[cfg(test)]
mod tests {
    use robot_command::{
        command::{CommandExt, CommandRefExt},
        CommandRef, CommandScheduler,
    };

    use super::*;
    use crate::subsystems::{ArmHardware, ArmSim};

    fn simulated_arm(installed: bool) -> (Rc<RefCell<ArmSubsystem>>, ArmSim) {
        let hardware = ArmHardware::simulated();
        let sim = hardware.sim.clone().unwrap();
        let arm = CommandScheduler::register(ArmSubsystem::with_limit_switches(hardware, installed));
        (arm, sim)
    }

    fn run_until_done(command: &CommandRef, limit: u32) -> bool {
        for _ in 0..limit {
            CommandScheduler::run().unwrap();
            if !command.is_scheduled() {
                return true;
            }
        }
        false
    }

    #[test]
    fn lower_arm_stops_at_the_limit() {
        let (arm, sim) = simulated_arm(true);
        sim.set_position(30.0);

        let command = LowerArm::new(arm.clone()).into_ref();
        command.schedule().unwrap();
        CommandScheduler::run().unwrap();
        assert_eq!(arm.borrow().power(), LOWER_POWER);

        assert!(run_until_done(&command, 200));
        assert!(arm.borrow().lower_limit_pressed().unwrap());
        assert_eq!(arm.borrow().power(), 0.0);
    }

    #[test]
    fn lower_arm_keeps_going_without_switches() {
        let (arm, sim) = simulated_arm(false);
        sim.set_position(30.0);

        let command = LowerArm::new(arm.clone()).into_ref();
        command.schedule().unwrap();
        assert!(!run_until_done(&command, 200));

        command.cancel().unwrap();
        assert_eq!(arm.borrow().power(), 0.0);
    }

    #[test]
    fn arm_seeks_lower_hub_height() {
        let (arm, _) = simulated_arm(false);
        let command = ArmToPosition::lower_hub(arm.clone()).into_ref();
        command.schedule().unwrap();

        assert!(run_until_done(&command, 250));
        let position = arm.borrow().position().unwrap();
        assert!((position - LOWER_HUB_HEIGHT_DEGREES).abs() < ROTATION_TOLERANCE_DEGREES);
        assert_eq!(arm.borrow().power(), 0.0);
    }

    #[test]
    fn ramp_is_below_lower_hub() {
        let (arm, _) = simulated_arm(false);
        let ramp = ArmToPosition::ramp(arm.clone());
        let hub = ArmToPosition::lower_hub(arm);
        assert!(ramp.target() < hub.target());
    }
}
