use alloc::{boxed::Box, rc::Rc, vec};
use core::cell::RefCell;

use log::info;
use robot_command::{
    command::{
        button::Trigger, Command, CommandExt, CommandRefExt, FunctionalCommand,
        SequentialCommandGroup,
    },
    dashboard::SendableChooser,
    hal::{sim::SimGamepad, Gamepad},
    robot::ScheduledRobot,
    subsystem::Subsystem,
    units::feet_to_metres,
    CommandRef, CommandScheduler, NoAutonomousSelectedSnafu, Result, SetDefaultCommandSnafu,
};
use snafu::{OptionExt, ResultExt};

use crate::{
    commands::{DefaultDrive, DriveDistance, DriveDistanceSimple, TimedDrive, TurnToAngle},
    constants::{autonomous::*, drive::*, driver_station::*},
    subsystems::{ArmHardware, ArmSubsystem, DriveHardware, DriveSubsystem},
};

/// Everything the robot is built from.
pub struct RobotHardware {
    pub gamepad: Rc<dyn Gamepad>,
    pub drive: DriveHardware,
    pub arm: ArmHardware,
}

impl RobotHardware {
    pub fn simulated(gamepad: SimGamepad) -> Self {
        Self {
            gamepad: Rc::new(gamepad),
            drive: DriveHardware::simulated(),
            arm: ArmHardware::simulated(),
        }
    }
}

pub struct Robot {
    gamepad: Rc<dyn Gamepad>,
    drive: Rc<RefCell<DriveSubsystem>>,
    arm: Rc<RefCell<ArmSubsystem>>,
    chooser: SendableChooser<CommandRef>,
    autonomous_command: Option<CommandRef>,
}

impl Robot {
    pub fn new(hardware: RobotHardware) -> Result<Self> {
        let mut robot = Self {
            gamepad: hardware.gamepad,
            drive: DriveSubsystem::new(hardware.drive)?.register(),
            arm: ArmSubsystem::new(hardware.arm).register(),
            chooser: SendableChooser::new(),
            autonomous_command: None,
        };

        robot.configure_autonomous();
        robot.configure_button_bindings();
        robot.configure_default_commands()?;
        Ok(robot)
    }

    fn configure_autonomous(&mut self) {
        // TODO: raise the arm to the lower hub and lower it again before driving out of the tarmac.
        let competition = SequentialCommandGroup::new(vec![Box::new(DriveDistanceSimple::new(
            self.drive.clone(),
            feet_to_metres(COMPETITION_DRIVE_FEET),
        )) as Box<dyn Command>]);

        self.chooser.set_default_option("Competition", competition.into_ref());
        self.chooser.add_option(
            "Timed Auto",
            TimedDrive::new(self.drive.clone(), TIMED_DRIVE_DURATION, TIMED_DRIVE_SPEED).into_ref(),
        );
        self.chooser.add_option(
            "Distance Auto",
            DriveDistance::new(self.drive.clone(), DISTANCE_AUTO_METRES).into_ref(),
        );
        self.chooser.add_option(
            "Angle Auto",
            TurnToAngle::new(self.drive.clone(), ANGLE_AUTO_DEGREES).into_ref(),
        );
        self.chooser
            .add_option("Nothing", FunctionalCommand::instant(|| Ok(()), vec![]).into_ref());

        self.chooser.publish("Autonomous");
    }

    fn configure_button_bindings(&mut self) {
        let bindings = [
            (TURN_TO_ZERO_BUTTON, 0.0),
            (TURN_TO_NINETY_BUTTON, 90.0),
            (TURN_AROUND_BUTTON, 179.9),
            (TURN_TO_MINUS_NINETY_BUTTON, -90.0),
        ];

        for (button, degrees) in bindings {
            Trigger::button(self.gamepad.clone(), button).on_true(
                TurnToAngle::new(self.drive.clone(), degrees).with_timeout(TURN_TIMEOUT),
            );
        }
    }

    fn configure_default_commands(&mut self) -> Result {
        let forward = {
            let gamepad = self.gamepad.clone();
            move || -> Result<f32> {
                let speed = if gamepad.button(BOOST_BUTTON)? {
                    TELEOP_BOOST_DRIVE_SPEED
                } else {
                    TELEOP_DEFAULT_DRIVE_SPEED
                };
                Ok(gamepad.axis(DRIVE_STICK)? * speed)
            }
        };
        let rotation = {
            let gamepad = self.gamepad.clone();
            move || -> Result<f32> { Ok(gamepad.axis(TURN_STICK)? * TELEOP_TURN_SPEED) }
        };

        CommandScheduler::set_default_command(
            &self.drive,
            DefaultDrive::new(self.drive.clone(), forward, rotation),
        )
        .context(SetDefaultCommandSnafu)
    }

    /// The routine picked on the dashboard, or the competition routine if none was picked.
    pub fn autonomous_command(&self) -> Result<CommandRef> {
        self.chooser.selected().context(NoAutonomousSelectedSnafu)
    }

    pub fn drive(&self) -> &Rc<RefCell<DriveSubsystem>> {
        &self.drive
    }

    pub fn arm(&self) -> &Rc<RefCell<ArmSubsystem>> {
        &self.arm
    }

    fn cancel_autonomous(&mut self) -> Result {
        if let Some(command) = self.autonomous_command.take() {
            command.cancel()?;
        }
        Ok(())
    }
}

impl ScheduledRobot for Robot {
    fn periodic(&mut self) -> Result {
        CommandScheduler::run()
    }

    fn autonomous_init(&mut self) -> Result {
        let command = self.autonomous_command()?;
        info!("running autonomous routine {}", command.name());
        command.schedule()?;
        self.autonomous_command = Some(command);
        Ok(())
    }

    fn opcontrol_init(&mut self) -> Result {
        self.cancel_autonomous()
    }

    fn disabled_init(&mut self) -> Result {
        self.cancel_autonomous()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec::Vec};

    use approx::assert_relative_eq;
    use robot_command::{
        dashboard,
        hal::{Button, JoystickAxis},
        robot::{set_sim_mode, RobotLoop, RobotMode},
        units::inches_to_metres,
    };

    use super::*;

    fn simulated_robot() -> (RobotLoop<Robot>, SimGamepad) {
        let gamepad = SimGamepad::default();
        let robot = Robot::new(RobotHardware::simulated(gamepad.clone())).unwrap();
        (RobotLoop::new(robot), gamepad)
    }

    fn step(robot_loop: &mut RobotLoop<Robot>, cycles: u32) {
        for _ in 0..cycles {
            robot_loop.step().unwrap();
        }
    }

    #[test]
    fn chooser_is_published_with_competition_default() {
        let (robot_loop, _) = simulated_robot();

        let options = dashboard::get_string_array("Autonomous/options").unwrap();
        assert_eq!(
            options,
            ["Competition", "Timed Auto", "Distance Auto", "Angle Auto", "Nothing"]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        );
        assert_eq!(
            dashboard::get_string("Autonomous/default").as_deref(),
            Some("Competition")
        );
        assert_eq!(
            robot_loop.robot().autonomous_command().unwrap().name(),
            "SequentialCommandGroup"
        );
    }

    #[test]
    fn competition_autonomous_backs_out_of_the_tarmac() {
        let (mut robot_loop, _) = simulated_robot();
        set_sim_mode(RobotMode::Autonomous);

        step(&mut robot_loop, 1);
        let drive = robot_loop.robot().drive().clone();
        let (left, right) = drive.borrow().outputs();
        assert!(left < 0.0 && right < 0.0);

        step(&mut robot_loop, 749);
        let auto = robot_loop.robot().autonomous_command().unwrap();
        assert!(!auto.is_scheduled());

        let travelled = inches_to_metres(drive.borrow().average_distance().unwrap());
        assert_relative_eq!(travelled, feet_to_metres(-7.5), epsilon = 0.1);
        assert!(drive.borrow().pose().x < -2.0);
    }

    #[test]
    fn teleop_cancels_an_unfinished_autonomous() {
        let (mut robot_loop, _) = simulated_robot();
        dashboard::put_string("Autonomous/selected", "Timed Auto");
        let auto = robot_loop.robot().autonomous_command().unwrap();
        assert_eq!(auto.name(), "TimedDrive");

        set_sim_mode(RobotMode::Autonomous);
        step(&mut robot_loop, 50);
        assert!(auto.is_scheduled());

        set_sim_mode(RobotMode::Opcontrol);
        step(&mut robot_loop, 1);
        assert!(!auto.is_scheduled());

        let holder = CommandScheduler::requiring(robot_loop.robot().drive()).unwrap();
        assert_eq!(holder.name(), "DefaultDrive");
    }

    #[test]
    fn nothing_autonomous_leaves_the_robot_still() {
        let (mut robot_loop, _) = simulated_robot();
        dashboard::put_string("Autonomous/selected", "Nothing");

        set_sim_mode(RobotMode::Autonomous);
        step(&mut robot_loop, 25);

        let drive = robot_loop.robot().drive().clone();
        assert_eq!(drive.borrow().average_distance().unwrap(), 0.0);
    }

    #[test]
    fn boost_button_speeds_up_teleop() {
        let (mut robot_loop, gamepad) = simulated_robot();
        gamepad.set_axis(JoystickAxis::LeftY, 1.0);

        step(&mut robot_loop, 2);
        let (left, _) = robot_loop.robot().drive().borrow().outputs();
        assert_relative_eq!(left, (TELEOP_DEFAULT_DRIVE_SPEED - 0.02) / 0.98, epsilon = 1e-5);

        gamepad.press(Button::R1);
        step(&mut robot_loop, 1);
        let (left, right) = robot_loop.robot().drive().borrow().outputs();
        assert_relative_eq!(left, TELEOP_BOOST_DRIVE_SPEED);
        assert_relative_eq!(right, TELEOP_BOOST_DRIVE_SPEED);
    }

    #[test]
    fn button_turns_to_ninety_then_hands_back_to_teleop() {
        let (mut robot_loop, gamepad) = simulated_robot();
        step(&mut robot_loop, 1);

        gamepad.press(Button::A);
        step(&mut robot_loop, 1);
        let drive = robot_loop.robot().drive().clone();
        assert_eq!(
            CommandScheduler::requiring(&drive).unwrap().name(),
            "TurnToAngle"
        );

        gamepad.release(Button::A);
        step(&mut robot_loop, 250);
        assert_eq!(
            CommandScheduler::requiring(&drive).unwrap().name(),
            "DefaultDrive"
        );
        assert_relative_eq!(
            drive.borrow().heading().unwrap(),
            90.0,
            epsilon = TURN_TOLERANCE_DEGREES
        );
    }

    #[test]
    fn disabling_ends_autonomous() {
        let (mut robot_loop, _) = simulated_robot();
        set_sim_mode(RobotMode::Autonomous);
        step(&mut robot_loop, 10);
        let auto = robot_loop.robot().autonomous_command().unwrap();
        assert!(auto.is_scheduled());

        set_sim_mode(RobotMode::Disabled);
        step(&mut robot_loop, 1);
        assert!(!auto.is_scheduled());
        assert_eq!(robot_loop.robot().drive().borrow().outputs(), (0.0, 0.0));
        assert!(robot_loop.robot().arm().borrow().power() == 0.0);
    }
}
