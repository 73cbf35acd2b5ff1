use alloc::{boxed::Box, vec::Vec};
use core::time::Duration;

use crate::{CommandRef, CommandScheduler, Result, SubsystemRef};

pub mod button;
pub mod group;
pub mod timeout;

pub use group::SequentialCommandGroup;
pub use timeout::WithTimeout;

/// An action the robot can perform. Runs when scheduled, until it is interrupted or it finishes.
pub trait Command {
    fn get_requirements(&self) -> &[SubsystemRef];

    /// The initial subroutine of a command. Called once when the command is initially scheduled.
    fn initialize(&mut self) -> Result {
        Ok(())
    }
    fn execute(&mut self) -> Result {
        Ok(())
    }
    /// Called exactly once when the command finishes or is interrupted.
    #[allow(unused_variables)]
    fn end(&mut self, interrupted: bool) -> Result {
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(false)
    }

    fn runs_when_disabled(&self) -> bool {
        false
    }

    fn get_interruption_behavior(&self) -> InterruptionBehavior {
        InterruptionBehavior::default()
    }

    fn name(&self) -> &'static str {
        let name = core::any::type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name)
    }
}

pub trait CommandRefExt {
    fn schedule(&self) -> Result;
    fn cancel(&self) -> Result;
    fn is_scheduled(&self) -> bool;
}

impl CommandRefExt for CommandRef {
    fn schedule(&self) -> Result {
        CommandScheduler::schedule(self.clone())
    }

    fn cancel(&self) -> Result {
        CommandScheduler::cancel(self)
    }

    fn is_scheduled(&self) -> bool {
        CommandScheduler::is_scheduled(self)
    }
}

/// Decorators available on every concrete command.
pub trait CommandExt: Command + Sized + 'static {
    /// Forcibly finishes the command once `timeout` has elapsed, whatever its own state.
    fn with_timeout(self, timeout: Duration) -> WithTimeout {
        WithTimeout::new(self, timeout)
    }

    /// Runs `next` after this command finishes.
    fn and_then(self, next: impl Command + 'static) -> SequentialCommandGroup {
        SequentialCommandGroup::new(alloc::vec![
            Box::new(self) as Box<dyn Command>,
            Box::new(next),
        ])
    }

    fn into_ref(self) -> CommandRef {
        CommandRef::new(self)
    }
}

impl<C: Command + Sized + 'static> CommandExt for C {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterruptionBehavior {
    #[default]
    CancelSelf,
    CancelIncoming,
}

pub struct FunctionalCommand {
    on_init: Box<dyn FnMut() -> Result>,
    on_execute: Box<dyn FnMut() -> Result>,
    on_end: Box<dyn FnMut(bool) -> Result>,
    is_finished: Box<dyn Fn() -> Result<bool>>,
    requirements: Vec<SubsystemRef>,
}

impl FunctionalCommand {
    pub fn new(
        on_init: impl FnMut() -> Result + 'static,
        on_execute: impl FnMut() -> Result + 'static,
        on_end: impl FnMut(bool) -> Result + 'static,
        is_finished: impl Fn() -> Result<bool> + 'static,
        requirements: Vec<SubsystemRef>,
    ) -> Self {
        Self {
            on_init: Box::new(on_init),
            on_execute: Box::new(on_execute),
            on_end: Box::new(on_end),
            is_finished: Box::new(is_finished),
            requirements,
        }
    }

    /// A command that runs `action` once when scheduled and finishes immediately.
    pub fn instant(action: impl FnMut() -> Result + 'static, requirements: Vec<SubsystemRef>) -> Self {
        Self::new(action, || Ok(()), |_| Ok(()), || Ok(true), requirements)
    }
}

impl Command for FunctionalCommand {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        (self.on_init)()
    }

    fn execute(&mut self) -> Result {
        (self.on_execute)()
    }

    fn end(&mut self, interrupted: bool) -> Result {
        (self.on_end)(interrupted)
    }

    fn is_finished(&self) -> Result<bool> {
        (self.is_finished)()
    }
}

#[macro_export]
macro_rules! run_once {
    ($on_init:block) => {
        $crate::command::FunctionalCommand::new(
            move || $on_init,
            || Ok(()),
            |_| Ok(()),
            || Ok(true),
            $crate::__private::vec![],
        )
    };
    ($on_init:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            move || $on_init,
            || Ok(()),
            |_| Ok(()),
            || Ok(true),
            $crate::__private::vec![$($requirement),+],
        )
    };
}

#[macro_export]
macro_rules! run {
    ($on_execute:block) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $on_execute,
            |_| Ok(()),
            || Ok(false),
            $crate::__private::vec![],
        )
    };
    ($on_execute:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $on_execute,
            |_| Ok(()),
            || Ok(false),
            $crate::__private::vec![$($requirement),+],
        )
    };
}

#[macro_export]
macro_rules! start_end {
    ($start:block, $end:block) => {
        $crate::command::FunctionalCommand::new(
            move || $start,
            || Ok(()),
            move |_| $end,
            || Ok(false),
            $crate::__private::vec![],
        )
    };
    ($start:block, $end:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            move || $start,
            || Ok(()),
            move |_| $end,
            || Ok(false),
            $crate::__private::vec![$($requirement),+],
        )
    };
}

#[macro_export]
macro_rules! run_end {
    ($execute:block, $end:block) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $execute,
            move |_| $end,
            || Ok(false),
            $crate::__private::vec![],
        )
    };
    ($execute:block, $end:block, $($requirement:expr),+ $(,)?) => {
        $crate::command::FunctionalCommand::new(
            || Ok(()),
            move || $execute,
            move |_| $end,
            || Ok(false),
            $crate::__private::vec![$($requirement),+],
        )
    };
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::*;
    use crate::CommandScheduler;

    #[test]
    fn instant_command_runs_once_and_finishes() {
        let count = Rc::new(Cell::new(0));
        let command = {
            let count = count.clone();
            FunctionalCommand::instant(
                move || {
                    count.set(count.get() + 1);
                    Ok(())
                },
                Vec::new(),
            )
            .into_ref()
        };

        command.schedule().unwrap();
        CommandScheduler::run().unwrap();
        CommandScheduler::run().unwrap();

        assert_eq!(count.get(), 1);
        assert!(!command.is_scheduled());
    }

    #[test]
    fn run_macro_never_finishes() {
        let count = Rc::new(Cell::new(0));
        let command = {
            let count = count.clone();
            crate::run!({
                count.set(count.get() + 1);
                Ok(())
            })
            .into_ref()
        };

        command.schedule().unwrap();
        for _ in 0..5 {
            CommandScheduler::run().unwrap();
        }

        assert_eq!(count.get(), 5);
        assert!(command.is_scheduled());
    }

    #[test]
    fn names_are_short_type_names() {
        let command = FunctionalCommand::instant(|| Ok(()), Vec::new());
        assert_eq!(command.name(), "FunctionalCommand");
    }
}
