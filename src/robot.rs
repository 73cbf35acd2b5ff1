use core::time::Duration;

use log::info;

use crate::Result;

/// Returns true if the code is running on a real robot and not in simulation.
pub const fn is_real() -> bool {
    cfg!(target_os = "vexos")
}

/// Returns true if the code is running in simulation and not on a real robot.
pub const fn is_sim() -> bool {
    !is_real()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotMode {
    Disabled,
    Autonomous,
    Opcontrol,
}

#[cfg(target_os = "vexos")]
pub fn mode() -> RobotMode {
    use pros::devices::competition::{self, CompetitionMode};

    match competition::mode() {
        CompetitionMode::Disabled => RobotMode::Disabled,
        CompetitionMode::Autonomous => RobotMode::Autonomous,
        CompetitionMode::Opcontrol => RobotMode::Opcontrol,
    }
}

#[cfg(not(target_os = "vexos"))]
std::thread_local! {
    static SIM_MODE: core::cell::Cell<RobotMode> = const { core::cell::Cell::new(RobotMode::Opcontrol) };
}

#[cfg(not(target_os = "vexos"))]
pub fn mode() -> RobotMode {
    SIM_MODE.with(|mode| mode.get())
}

/// Overrides the competition mode seen by the simulated robot.
#[cfg(not(target_os = "vexos"))]
pub fn set_sim_mode(mode: RobotMode) {
    SIM_MODE.with(|current| current.set(mode));
}

pub fn is_disabled() -> bool {
    mode() == RobotMode::Disabled
}

pub trait ScheduledRobot {
    fn periodic(&mut self) -> Result {
        Ok(())
    }
    fn sim_periodic(&mut self) -> Result {
        Ok(())
    }
    fn disabled_init(&mut self) -> Result {
        Ok(())
    }
    fn disabled_periodic(&mut self) -> Result {
        Ok(())
    }
    fn autonomous_init(&mut self) -> Result {
        Ok(())
    }
    fn autonomous_periodic(&mut self) -> Result {
        Ok(())
    }
    fn opcontrol_init(&mut self) -> Result {
        Ok(())
    }
    fn opcontrol_periodic(&mut self) -> Result {
        Ok(())
    }
}

pub const ITERATION_PERIOD: Duration = Duration::from_millis(20);

/// One robot cycle at a time: mode transitions, mode hooks, then the periodic hooks.
pub struct RobotLoop<R> {
    robot: R,
    previous_mode: Option<RobotMode>,
}

impl<R: ScheduledRobot> RobotLoop<R> {
    pub fn new(robot: R) -> Self {
        Self {
            robot,
            previous_mode: None,
        }
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }

    pub fn step(&mut self) -> Result {
        let current_mode = mode();
        let entering = self.previous_mode != Some(current_mode);
        if entering {
            info!("entering {current_mode:?}");
        }

        match current_mode {
            RobotMode::Disabled => {
                if entering {
                    self.robot.disabled_init()?;
                }
                self.robot.disabled_periodic()?;
            }
            RobotMode::Autonomous => {
                if entering {
                    self.robot.autonomous_init()?;
                }
                self.robot.autonomous_periodic()?;
            }
            RobotMode::Opcontrol => {
                if entering {
                    self.robot.opcontrol_init()?;
                }
                self.robot.opcontrol_periodic()?;
            }
        }
        self.previous_mode = Some(current_mode);

        self.robot.periodic()?;
        if is_sim() {
            self.robot.sim_periodic()?;
        }

        Ok(())
    }
}

#[cfg(target_os = "vexos")]
pub fn start_robot(robot: impl ScheduledRobot) -> Result {
    use pros::core::task::Interval;

    let mut robot_loop = RobotLoop::new(robot);
    let mut interval = Interval::start();

    loop {
        robot_loop.step()?;
        interval.delay(ITERATION_PERIOD);
    }
}

#[cfg(not(target_os = "vexos"))]
pub fn start_robot(robot: impl ScheduledRobot) -> Result {
    let mut robot_loop = RobotLoop::new(robot);

    loop {
        robot_loop.step()?;
        std::thread::sleep(ITERATION_PERIOD);
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::*;

    #[derive(Default)]
    struct Transitions(Vec<&'static str>);

    impl ScheduledRobot for Transitions {
        fn disabled_init(&mut self) -> Result {
            self.0.push("disabled_init");
            Ok(())
        }
        fn autonomous_init(&mut self) -> Result {
            self.0.push("autonomous_init");
            Ok(())
        }
        fn autonomous_periodic(&mut self) -> Result {
            self.0.push("autonomous_periodic");
            Ok(())
        }
        fn opcontrol_init(&mut self) -> Result {
            self.0.push("opcontrol_init");
            Ok(())
        }
        fn periodic(&mut self) -> Result {
            self.0.push("periodic");
            Ok(())
        }
    }

    #[test]
    fn init_hooks_run_once_per_mode_change() {
        let mut robot_loop = RobotLoop::new(Transitions::default());

        set_sim_mode(RobotMode::Disabled);
        robot_loop.step().unwrap();
        set_sim_mode(RobotMode::Autonomous);
        robot_loop.step().unwrap();
        robot_loop.step().unwrap();
        set_sim_mode(RobotMode::Opcontrol);
        robot_loop.step().unwrap();

        assert_eq!(
            robot_loop.robot().0,
            vec![
                "disabled_init",
                "periodic",
                "autonomous_init",
                "autonomous_periodic",
                "periodic",
                "autonomous_periodic",
                "periodic",
                "opcontrol_init",
                "periodic",
            ]
        );
    }

    #[test]
    fn simulated_robot_starts_enabled() {
        assert_eq!(mode(), RobotMode::Opcontrol);
        assert!(!is_disabled());
        assert!(is_sim());
    }
}
