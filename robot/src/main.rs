#![cfg_attr(target_os = "vexos", no_std)]
#![cfg_attr(target_os = "vexos", no_main)]

#[cfg(target_os = "vexos")]
mod brain {
    use competition_robot::{Robot, RobotHardware};
    use log::{error, LevelFilter};
    use pros::{prelude::*, task};
    use robot_command::{logger, robot::start_robot};

    /// Owns the robot task. PROS deletes the competition tasks on every mode change, so the
    /// scheduler lives in its own task and follows the competition mode itself.
    struct RobotBase {
        _robot_task: task::TaskHandle,
    }

    impl RobotBase {
        fn new() -> Self {
            logger::init(LevelFilter::Info).ok();

            let robot_task = task::spawn(|| {
                let result = RobotHardware::v5()
                    .and_then(Robot::new)
                    .and_then(start_robot);
                if let Err(err) = result {
                    error!("robot stopped: {err}");
                }
            });
            Self {
                _robot_task: robot_task,
            }
        }
    }

    impl SyncRobot for RobotBase {
        fn opcontrol(&mut self) -> pros::Result {
            Ok(())
        }

        fn auto(&mut self) -> pros::Result {
            Ok(())
        }

        fn disabled(&mut self) -> pros::Result {
            Ok(())
        }
    }

    sync_robot!(RobotBase, RobotBase::new());
}

/// Drives the simulated robot through a match: a moment disabled, the autonomous period, then a
/// few seconds of driver control with nobody on the sticks.
#[cfg(not(target_os = "vexos"))]
fn main() {
    use competition_robot::{constants::autonomous::PERIOD, Robot, RobotHardware};
    use log::{error, info, LevelFilter};
    use robot_command::{
        hal::sim::SimGamepad,
        logger,
        robot::{set_sim_mode, RobotLoop, RobotMode, ITERATION_PERIOD},
    };

    fn cycles(period: core::time::Duration) -> u32 {
        (period.as_millis() / ITERATION_PERIOD.as_millis()) as u32
    }

    fn simulate_match() -> robot_command::Result {
        let robot = Robot::new(RobotHardware::simulated(SimGamepad::default()))?;
        let mut robot_loop = RobotLoop::new(robot);

        let phases = [
            (RobotMode::Disabled, core::time::Duration::from_secs(1)),
            (RobotMode::Autonomous, PERIOD),
            (RobotMode::Opcontrol, core::time::Duration::from_secs(3)),
        ];
        for (mode, period) in phases {
            set_sim_mode(mode);
            for _ in 0..cycles(period) {
                robot_loop.step()?;
            }
        }

        let pose = robot_loop.robot().drive().borrow().pose();
        info!(
            "finished at x = {:.2} m, y = {:.2} m, heading {:.1} deg",
            pose.x,
            pose.y,
            pose.rotation.degrees()
        );
        Ok(())
    }

    logger::init(LevelFilter::Info).ok();
    if let Err(err) = simulate_match() {
        error!("simulation stopped: {err}");
        std::process::exit(1);
    }
}
