use alloc::boxed::Box;
use core::time::Duration;

use log::debug;

use super::{Command, InterruptionBehavior};
use crate::{time::Timer, Result, SubsystemRef};

/// Wraps a command so that it ends after a fixed amount of time even if it has not finished.
///
/// When the time bound cuts the inner command off, its end hook sees `interrupted = true`.
pub struct WithTimeout {
    command: Box<dyn Command>,
    timeout: Duration,
    timer: Timer,
}

impl WithTimeout {
    pub fn new(command: impl Command + 'static, timeout: Duration) -> Self {
        Self {
            command: Box::new(command),
            timeout,
            timer: Timer::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Command for WithTimeout {
    fn get_requirements(&self) -> &[SubsystemRef] {
        self.command.get_requirements()
    }

    fn initialize(&mut self) -> Result {
        self.timer.reset();
        self.timer.start();
        self.command.initialize()
    }

    fn execute(&mut self) -> Result {
        self.command.execute()
    }

    fn end(&mut self, interrupted: bool) -> Result {
        self.timer.stop();
        let timed_out = !interrupted && self.timer.has_elapsed(self.timeout);
        if timed_out {
            debug!(
                "{} timed out after {:?}",
                self.command.name(),
                self.timer.elapsed()
            );
        }
        self.command.end(interrupted || timed_out)
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.command.is_finished()? || self.timer.has_elapsed(self.timeout))
    }

    fn runs_when_disabled(&self) -> bool {
        self.command.runs_when_disabled()
    }

    fn get_interruption_behavior(&self) -> InterruptionBehavior {
        self.command.get_interruption_behavior()
    }

    fn name(&self) -> &'static str {
        self.command.name()
    }
}
