use alloc::rc::Rc;
use core::{cell::RefCell, fmt::Debug};

use crate::{
    command::FunctionalCommand, run, run_end, run_once, start_end, CommandScheduler, Result,
    SubsystemRef,
};

/// A collection of robot parts and other hardware that act together as a whole.
pub trait Subsystem: Debug {
    /// This method will be called once per scheduler run
    fn periodic(&mut self) {}
    /// This method will be called once per scheduler run, but only during simulation
    fn sim_periodic(&mut self) {}

    fn register(self) -> Rc<RefCell<Self>>
    where
        Self: Sized + 'static,
    {
        CommandScheduler::register(self)
    }
}

pub trait SubsystemRefExt {
    fn run_once(&self, action: impl FnMut() -> Result + 'static) -> FunctionalCommand;
    fn run(&self, action: impl FnMut() -> Result + 'static) -> FunctionalCommand;
    fn start_end(
        &self,
        start: impl FnMut() -> Result + 'static,
        end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand;
    fn run_end(
        &self,
        run: impl FnMut() -> Result + 'static,
        end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand;
}

impl<T> SubsystemRefExt for Rc<RefCell<T>>
where
    T: Subsystem + 'static,
{
    fn run_once(&self, mut action: impl FnMut() -> Result + 'static) -> FunctionalCommand {
        run_once!({ action() }, SubsystemRef::from(self))
    }
    fn run(&self, mut action: impl FnMut() -> Result + 'static) -> FunctionalCommand {
        run!({ action() }, SubsystemRef::from(self))
    }
    fn start_end(
        &self,
        mut start: impl FnMut() -> Result + 'static,
        mut end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand {
        start_end!({ start() }, { end() }, SubsystemRef::from(self))
    }
    fn run_end(
        &self,
        mut run: impl FnMut() -> Result + 'static,
        mut end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand {
        run_end!({ run() }, { end() }, SubsystemRef::from(self))
    }
}

impl SubsystemRefExt for SubsystemRef {
    fn run_once(&self, mut action: impl FnMut() -> Result + 'static) -> FunctionalCommand {
        run_once!({ action() }, self.clone())
    }
    fn run(&self, mut action: impl FnMut() -> Result + 'static) -> FunctionalCommand {
        run!({ action() }, self.clone())
    }
    fn start_end(
        &self,
        mut start: impl FnMut() -> Result + 'static,
        mut end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand {
        start_end!({ start() }, { end() }, self.clone())
    }
    fn run_end(
        &self,
        mut run: impl FnMut() -> Result + 'static,
        mut end: impl FnMut() -> Result + 'static,
    ) -> FunctionalCommand {
        run_end!({ run() }, { end() }, self.clone())
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::command::{CommandExt, CommandRefExt};

    #[derive(Debug, Default)]
    struct Roller {
        spinning: bool,
    }

    impl Subsystem for Roller {}

    #[test]
    fn start_end_requires_subsystem_and_cleans_up() {
        let roller = Roller::default().register();
        let command = {
            let (start_roller, end_roller) = (roller.clone(), roller.clone());
            roller
                .start_end(
                    move || {
                        start_roller.borrow_mut().spinning = true;
                        Ok(())
                    },
                    move || {
                        end_roller.borrow_mut().spinning = false;
                        Ok(())
                    },
                )
                .into_ref()
        };

        command.schedule().unwrap();
        assert!(roller.borrow().spinning);
        assert_eq!(CommandScheduler::requiring(&roller), Some(command.clone()));

        command.cancel().unwrap();
        assert!(!roller.borrow().spinning);
        assert!(CommandScheduler::requiring(&roller).is_none());
    }

    #[test]
    fn run_once_finishes_after_one_cycle() {
        let roller = Roller::default().register();
        let calls = Rc::new(Cell::new(0));
        let command = {
            let calls = calls.clone();
            roller
                .run_once(move || {
                    calls.set(calls.get() + 1);
                    Ok(())
                })
                .into_ref()
        };

        command.schedule().unwrap();
        CommandScheduler::run().unwrap();

        assert_eq!(calls.get(), 1);
        assert!(!command.is_scheduled());
    }
}
