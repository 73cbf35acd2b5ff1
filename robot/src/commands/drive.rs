use alloc::{boxed::Box, rc::Rc, vec, vec::Vec};
use core::{cell::RefCell, time::Duration};

use log::debug;
use robot_command::{
    command::Command, control::PidController, time::Timer, units::inches_to_metres, Result,
    SubsystemRef,
};

use crate::{constants::drive::*, subsystems::DriveSubsystem};

fn travelled_metres(drive: &RefCell<DriveSubsystem>) -> Result<f32> {
    Ok(inches_to_metres(drive.borrow().average_distance()?))
}

/// Teleop arcade drive fed by two input functions, read once per cycle. Never finishes.
pub struct DefaultDrive {
    drive: Rc<RefCell<DriveSubsystem>>,
    forward: Box<dyn Fn() -> Result<f32>>,
    rotation: Box<dyn Fn() -> Result<f32>>,
    requirements: Vec<SubsystemRef>,
}

impl DefaultDrive {
    pub fn new(
        drive: Rc<RefCell<DriveSubsystem>>,
        forward: impl Fn() -> Result<f32> + 'static,
        rotation: impl Fn() -> Result<f32> + 'static,
    ) -> Self {
        Self {
            requirements: vec![SubsystemRef::from(&drive)],
            drive,
            forward: Box::new(forward),
            rotation: Box::new(rotation),
        }
    }
}

impl Command for DefaultDrive {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn execute(&mut self) -> Result {
        let forward = (self.forward)()?;
        let rotation = (self.rotation)()?;
        self.drive.borrow_mut().arcade_drive(forward, rotation)
    }
}

/// Drives straight for a distance in metres, closing the loop on the wheel encoders.
pub struct DriveDistance {
    drive: Rc<RefCell<DriveSubsystem>>,
    controller: PidController,
    start: f32,
    requirements: Vec<SubsystemRef>,
}

impl DriveDistance {
    pub fn new(drive: Rc<RefCell<DriveSubsystem>>, metres: f32) -> Self {
        let mut controller = PidController::new(DISTANCE_P, DISTANCE_I, DISTANCE_D);
        controller.set_tolerance(DISTANCE_TOLERANCE_METRES);
        controller.set_setpoint(metres);

        Self {
            requirements: vec![SubsystemRef::from(&drive)],
            drive,
            controller,
            start: 0.0,
        }
    }
}

impl Command for DriveDistance {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.controller.reset();
        self.start = travelled_metres(&self.drive)?;
        debug!("driving {}m from {}m", self.controller.setpoint(), self.start);
        Ok(())
    }

    fn execute(&mut self) -> Result {
        let travelled = travelled_metres(&self.drive)? - self.start;
        let output = self
            .controller
            .calculate(travelled)
            .clamp(-DISTANCE_MAX_OUTPUT, DISTANCE_MAX_OUTPUT);
        self.drive.borrow_mut().arcade_drive(output, 0.0)
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.drive.borrow_mut().stop()
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.controller.at_setpoint())
    }
}

/// Drives at a fixed speed towards a distance in metres, stopping once it is within tolerance.
pub struct DriveDistanceSimple {
    drive: Rc<RefCell<DriveSubsystem>>,
    metres: f32,
    start: f32,
    requirements: Vec<SubsystemRef>,
}

impl DriveDistanceSimple {
    pub fn new(drive: Rc<RefCell<DriveSubsystem>>, metres: f32) -> Self {
        Self {
            requirements: vec![SubsystemRef::from(&drive)],
            drive,
            metres,
            start: 0.0,
        }
    }

    fn direction(&self) -> f32 {
        if self.metres < 0.0 {
            -1.0
        } else {
            1.0
        }
    }
}

impl Command for DriveDistanceSimple {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.start = travelled_metres(&self.drive)?;
        Ok(())
    }

    fn execute(&mut self) -> Result {
        self.drive
            .borrow_mut()
            .arcade_drive(self.direction() * AUTO_DRIVE_SPEED, 0.0)
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.drive.borrow_mut().stop()
    }

    fn is_finished(&self) -> Result<bool> {
        let travelled = travelled_metres(&self.drive)? - self.start;
        let remaining = (self.metres - travelled) * self.direction();
        Ok(remaining <= DISTANCE_TOLERANCE_METRES)
    }
}

/// Drives forward at a fixed power for a fixed time, whatever the distance covered.
pub struct TimedDrive {
    drive: Rc<RefCell<DriveSubsystem>>,
    timer: Timer,
    duration: Duration,
    speed: f32,
    requirements: Vec<SubsystemRef>,
}

impl TimedDrive {
    pub fn new(drive: Rc<RefCell<DriveSubsystem>>, duration: Duration, speed: f32) -> Self {
        Self {
            requirements: vec![SubsystemRef::from(&drive)],
            drive,
            timer: Timer::new(),
            duration,
            speed,
        }
    }
}

impl Command for TimedDrive {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.timer.stop();
        self.timer.reset();
        self.timer.start();
        Ok(())
    }

    fn execute(&mut self) -> Result {
        self.drive.borrow_mut().arcade_drive(self.speed, 0.0)
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.timer.stop();
        self.drive.borrow_mut().stop()
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.timer.has_elapsed(self.duration))
    }
}

/// Turns in place to a field heading in degrees, taking the shorter way around.
pub struct TurnToAngle {
    drive: Rc<RefCell<DriveSubsystem>>,
    controller: PidController,
    requirements: Vec<SubsystemRef>,
}

impl TurnToAngle {
    pub fn new(drive: Rc<RefCell<DriveSubsystem>>, degrees: f32) -> Self {
        let mut controller = PidController::new(TURN_P, TURN_I, TURN_D);
        controller.enable_continuous_input(-180.0, 180.0);
        controller.set_tolerance_with_velocity(
            TURN_TOLERANCE_DEGREES,
            TURN_RATE_TOLERANCE_DEGREES_PER_SEC,
        );
        controller.set_setpoint(degrees);

        Self {
            requirements: vec![SubsystemRef::from(&drive)],
            drive,
            controller,
        }
    }

    pub fn target(&self) -> f32 {
        self.controller.setpoint()
    }
}

impl Command for TurnToAngle {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.controller.reset();
        debug!("turning to {} degrees", self.target());
        Ok(())
    }

    fn execute(&mut self) -> Result {
        let heading = self.drive.borrow().heading()?;
        let output = self
            .controller
            .calculate(heading)
            .clamp(-TURN_MAX_OUTPUT, TURN_MAX_OUTPUT);
        // Heading is counter-clockwise positive, arcade rotation is clockwise positive.
        self.drive.borrow_mut().arcade_drive(0.0, -output)
    }

    fn end(&mut self, _interrupted: bool) -> Result {
        self.drive.borrow_mut().stop()
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.controller.at_setpoint())
    }
}
