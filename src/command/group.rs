use alloc::{boxed::Box, vec::Vec};

use super::{Command, InterruptionBehavior};
use crate::{Result, SubsystemRef};

/// Runs a list of commands one after another.
///
/// The group requires everything its children require, for its whole lifetime.
pub struct SequentialCommandGroup {
    commands: Vec<Box<dyn Command>>,
    current: Option<usize>,
    requirements: Vec<SubsystemRef>,
}

impl SequentialCommandGroup {
    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        let mut group = Self {
            commands: Vec::new(),
            current: None,
            requirements: Vec::new(),
        };
        for command in commands {
            group.push(command);
        }
        group
    }

    pub fn add_command(mut self, command: impl Command + 'static) -> Self {
        self.push(Box::new(command));
        self
    }

    fn push(&mut self, command: Box<dyn Command>) {
        for requirement in command.get_requirements() {
            if !self.requirements.contains(requirement) {
                self.requirements.push(requirement.clone());
            }
        }
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for SequentialCommandGroup {
    fn get_requirements(&self) -> &[SubsystemRef] {
        &self.requirements
    }

    fn initialize(&mut self) -> Result {
        self.current = Some(0);
        if let Some(first) = self.commands.first_mut() {
            first.initialize()?;
        }
        Ok(())
    }

    fn execute(&mut self) -> Result {
        let Some(index) = self.current else {
            return Ok(());
        };
        let Some(command) = self.commands.get_mut(index) else {
            return Ok(());
        };

        command.execute()?;
        if command.is_finished()? {
            command.end(false)?;
            let next = index + 1;
            self.current = Some(next);
            if let Some(command) = self.commands.get_mut(next) {
                command.initialize()?;
            }
        }
        Ok(())
    }

    fn end(&mut self, interrupted: bool) -> Result {
        let current = self.current.take();
        if interrupted {
            if let Some(command) = current.and_then(|index| self.commands.get_mut(index)) {
                command.end(true)?;
            }
        }
        Ok(())
    }

    fn is_finished(&self) -> Result<bool> {
        Ok(self.current.is_some_and(|index| index >= self.commands.len()))
    }

    fn runs_when_disabled(&self) -> bool {
        self.commands.iter().all(|command| command.runs_when_disabled())
    }

    fn get_interruption_behavior(&self) -> InterruptionBehavior {
        if self
            .commands
            .iter()
            .any(|command| command.get_interruption_behavior() == InterruptionBehavior::CancelIncoming)
        {
            InterruptionBehavior::CancelIncoming
        } else {
            InterruptionBehavior::CancelSelf
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, rc::Rc, string::String, vec};
    use core::cell::RefCell;

    use super::*;
    use crate::{
        command::{CommandExt, CommandRefExt, FunctionalCommand},
        CommandScheduler,
    };

    type Journal = Rc<RefCell<Vec<String>>>;

    fn step(label: &'static str, journal: &Journal, executions: u32) -> FunctionalCommand {
        let runs = Rc::new(RefCell::new(0));
        let (init, execute, end) = (journal.clone(), journal.clone(), journal.clone());
        let counter = runs.clone();
        FunctionalCommand::new(
            move || {
                init.borrow_mut().push(format!("{label} init"));
                Ok(())
            },
            move || {
                *counter.borrow_mut() += 1;
                execute.borrow_mut().push(format!("{label} execute"));
                Ok(())
            },
            move |interrupted| {
                end.borrow_mut().push(format!("{label} end({interrupted})"));
                Ok(())
            },
            move || Ok(*runs.borrow() >= executions),
            vec![],
        )
    }

    #[test]
    fn runs_children_in_order() {
        let journal = Journal::default();
        let group = step("first", &journal, 1)
            .and_then(step("second", &journal, 2))
            .into_ref();

        group.schedule().unwrap();
        for _ in 0..4 {
            CommandScheduler::run().unwrap();
        }

        assert_eq!(
            *journal.borrow(),
            [
                "first init",
                "first execute",
                "first end(false)",
                "second init",
                "second execute",
                "second execute",
                "second end(false)",
            ]
        );
        assert!(!group.is_scheduled());
    }

    #[test]
    fn interruption_only_ends_running_child() {
        let journal = Journal::default();
        let group = SequentialCommandGroup::new(vec![
            Box::new(step("first", &journal, 1)),
            Box::new(step("second", &journal, 10)),
        ])
        .into_ref();

        group.schedule().unwrap();
        CommandScheduler::run().unwrap();
        CommandScheduler::run().unwrap();
        group.cancel().unwrap();

        assert_eq!(journal.borrow().last().map(String::as_str), Some("second end(true)"));
        assert_eq!(
            journal
                .borrow()
                .iter()
                .filter(|entry| entry.contains("end"))
                .count(),
            2
        );
    }

    #[test]
    fn empty_group_finishes_immediately() {
        let group = SequentialCommandGroup::new(Vec::new()).into_ref();
        group.schedule().unwrap();
        CommandScheduler::run().unwrap();
        assert!(!group.is_scheduled());
    }
}
