#![cfg_attr(target_os = "vexos", no_std)]

extern crate alloc;

use alloc::{rc::Rc, string::String, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    fmt::{self, Formatter},
    hash::Hash,
    ops::Deref,
};

use command::{Command, InterruptionBehavior};
use event::EventLoop;
use hashbrown::{HashMap, HashSet};
use log::{debug, trace};
use snafu::Snafu;
use subsystem::Subsystem;

/// Declares scheduler-owned state that lives for the duration of the robot task.
///
/// On the brain this is PROS task-local storage. On the host every thread gets its own copy,
/// which gives each unit test a fresh scheduler.
macro_rules! robot_local {
    (static $name:ident: $ty:ty = $init:expr;) => {
        #[cfg(target_os = "vexos")]
        pros::core::os_task_local! {
            static $name: $ty = $init;
        }
        #[cfg(not(target_os = "vexos"))]
        std::thread_local! {
            static $name: $ty = $init;
        }
    };
}

pub mod command;
pub mod control;
pub mod dashboard;
pub mod drive;
pub mod event;
pub mod geometry;
pub mod hal;
pub mod logger;
pub mod odometry;
pub mod robot;
pub mod subsystem;
pub mod time;
pub mod units;

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec;
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("device on port {port} failed: {message}"))]
    Device { port: u8, message: String },
    #[snafu(display("could not set the default command: {source}"))]
    SetDefaultCommand { source: SetDefaultCommandError },
    #[snafu(display("no autonomous routine has been registered"))]
    NoAutonomousSelected,
}

pub type Result<T = (), E = Error> = core::result::Result<T, E>;

#[derive(Clone)]
pub struct SubsystemRef(Rc<RefCell<dyn Subsystem>>);

impl SubsystemRef {
    fn address(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for SubsystemRef {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}
impl Eq for SubsystemRef {}

impl Hash for SubsystemRef {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl<S: Subsystem + 'static> From<Rc<RefCell<S>>> for SubsystemRef {
    fn from(subsystem: Rc<RefCell<S>>) -> Self {
        Self(subsystem)
    }
}

impl<S: Subsystem + 'static> From<&Rc<RefCell<S>>> for SubsystemRef {
    fn from(subsystem: &Rc<RefCell<S>>) -> Self {
        Self(subsystem.clone())
    }
}

impl Deref for SubsystemRef {
    type Target = Rc<RefCell<dyn Subsystem>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SubsystemRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(subsystem) => f.debug_tuple("SubsystemRef").field(&*subsystem).finish(),
            Err(_) => f.debug_tuple("SubsystemRef").field(&self.address()).finish(),
        }
    }
}

#[derive(Clone)]
pub struct CommandRef(Rc<RefCell<dyn Command>>);

impl CommandRef {
    pub fn new(command: impl Command + 'static) -> Self {
        Self(Rc::new(RefCell::new(command)))
    }

    fn address(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }

    pub fn name(&self) -> &'static str {
        self.0.borrow().name()
    }
}

impl PartialEq for CommandRef {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}
impl Eq for CommandRef {}

impl Hash for CommandRef {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl From<Rc<RefCell<dyn Command>>> for CommandRef {
    fn from(command: Rc<RefCell<dyn Command>>) -> Self {
        Self(command)
    }
}

impl<T: Command + 'static> From<T> for CommandRef {
    fn from(command: T) -> Self {
        Self::new(command)
    }
}

impl Deref for CommandRef {
    type Target = Rc<RefCell<dyn Command>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for CommandRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandRef").field(&self.address()).finish()
    }
}

#[derive(Debug, Snafu)]
pub enum SetDefaultCommandError {
    #[snafu(display("Default commands must require their subsystem."))]
    MustRequireSubsystem,
    #[snafu(display("Cannot set the default command on a subsystem that is not registered."))]
    NotRegistered,
}

#[derive(Default)]
struct CommandSchedulerState {
    subsystems: RefCell<HashMap<SubsystemRef, Option<CommandRef>>>,
    in_run_loop: Cell<bool>,
    to_schedule: RefCell<Vec<CommandRef>>,
    to_cancel: RefCell<Vec<CommandRef>>,
    scheduled_commands: RefCell<HashSet<CommandRef>>,
    requirements: RefCell<HashMap<SubsystemRef, CommandRef>>,
    button_loop: Rc<RefCell<EventLoop>>,
    ending_commands: RefCell<HashSet<CommandRef>>,
}

impl CommandSchedulerState {
    #[inline]
    fn is_scheduled(&self, command: &CommandRef) -> bool {
        self.scheduled_commands.borrow().contains(command)
    }

    fn requiring(&self, subsystem: &SubsystemRef) -> Option<CommandRef> {
        self.requirements.borrow().get(subsystem).cloned()
    }

    fn init_command(&self, command: CommandRef, requirements: HashSet<SubsystemRef>) -> Result {
        self.requirements
            .borrow_mut()
            .extend(requirements.into_iter().map(|r| (r, command.clone())));
        self.scheduled_commands.borrow_mut().insert(command.clone());

        let mut command = command.borrow_mut();
        debug!("initializing {}", command.name());
        command.initialize()
    }

    /// Runs the end hook of a scheduled command and releases everything it required.
    fn end_command(&self, command: &CommandRef, interrupted: bool) -> Result {
        if self.ending_commands.borrow().contains(command) {
            return Ok(());
        }

        self.ending_commands.borrow_mut().insert(command.clone());
        let result = {
            let mut command = command.borrow_mut();
            if interrupted {
                debug!("interrupting {}", command.name());
            } else {
                debug!("{} finished", command.name());
            }
            command.end(interrupted)
        };
        self.ending_commands.borrow_mut().remove(command);
        self.scheduled_commands.borrow_mut().remove(command);
        self.requirements
            .borrow_mut()
            .retain(|_, owner| *owner != *command);

        result
    }

    fn cancel(&self, command: &CommandRef) -> Result {
        if self.ending_commands.borrow().contains(command) {
            return Ok(());
        }

        if self.in_run_loop.get() {
            self.to_cancel.borrow_mut().push(command.clone());
            return Ok(());
        }

        if !self.is_scheduled(command) {
            return Ok(());
        }

        self.end_command(command, true)
    }

    fn schedule_now(&self, command: CommandRef) -> Result {
        if self.is_scheduled(&command) {
            return Ok(());
        }

        if robot::is_disabled() && !command.borrow().runs_when_disabled() {
            trace!("not scheduling {} while disabled", command.name());
            return Ok(());
        }

        let requirements = CommandScheduler::requirements_of(&*command.borrow());

        let mut requiring_commands = Vec::<CommandRef>::new();
        for requirement in &requirements {
            if let Some(requiring) = self.requiring(requirement) {
                if !requiring_commands.contains(&requiring) {
                    requiring_commands.push(requiring);
                }
            }
        }

        for requiring in &requiring_commands {
            if requiring.borrow().get_interruption_behavior() == InterruptionBehavior::CancelIncoming
            {
                debug!(
                    "{} refused to be interrupted by {}",
                    requiring.name(),
                    command.name()
                );
                return Ok(());
            }
        }

        for requiring in &requiring_commands {
            self.end_command(requiring, true)?;
        }

        self.init_command(command, requirements)
    }

    fn run_scheduled(&self) -> Result {
        let disabled = robot::is_disabled();

        let scheduled_commands = self
            .scheduled_commands
            .borrow()
            .iter()
            .cloned()
            .collect::<Vec<_>>();

        for command in scheduled_commands {
            if !self.is_scheduled(&command) {
                continue;
            }

            if disabled && !command.borrow().runs_when_disabled() {
                self.end_command(&command, true)?;
                continue;
            }

            let finished = {
                let mut command = command.borrow_mut();
                command.execute()?;
                command.is_finished()?
            };

            if finished {
                self.end_command(&command, false)?;
            }
        }

        Ok(())
    }
}

robot_local! {
    static STATE: CommandSchedulerState = CommandSchedulerState::default();
}

/// The cooperative scheduler that runs every active command once per robot cycle and keeps at
/// most one command in control of each subsystem.
pub struct CommandScheduler;

impl CommandScheduler {
    /// Register a subsystem with the scheduler.
    pub fn register<S: Subsystem + 'static>(subsystem: S) -> Rc<RefCell<S>> {
        let subsystem = Rc::new(RefCell::new(subsystem));
        STATE.with(|state| {
            state
                .subsystems
                .borrow_mut()
                .insert(SubsystemRef::from(&subsystem), None);
        });
        subsystem
    }

    /// Schedule a command to run.
    ///
    /// Any command currently holding one of its requirements is ended with `interrupted = true`
    /// before this command is initialized.
    pub fn schedule(command: impl Into<CommandRef>) -> Result {
        let command = command.into();
        STATE.with(|state| {
            if state.in_run_loop.get() {
                state.to_schedule.borrow_mut().push(command);
                return Ok(());
            }

            state.schedule_now(command)
        })
    }

    pub fn cancel(command: &CommandRef) -> Result {
        STATE.with(|state| state.cancel(command))
    }

    pub fn set_default_command<S>(
        subsystem: &Rc<RefCell<S>>,
        command: impl Command + 'static,
    ) -> Result<(), SetDefaultCommandError>
    where
        S: Subsystem + 'static,
    {
        STATE.with(|state| {
            let subsystem = SubsystemRef::from(subsystem);
            let mut subsystems = state.subsystems.borrow_mut();
            let slot = subsystems
                .get_mut(&subsystem)
                .ok_or(SetDefaultCommandError::NotRegistered)?;

            let requirements = CommandScheduler::requirements_of(&command);
            if !requirements.contains(&subsystem) {
                return Err(SetDefaultCommandError::MustRequireSubsystem);
            }

            slot.replace(CommandRef::new(command));
            Ok(())
        })
    }

    pub fn remove_default_command<S>(subsystem: &Rc<RefCell<S>>) -> Option<CommandRef>
    where
        S: Subsystem + 'static,
    {
        STATE.with(|state| {
            state
                .subsystems
                .borrow_mut()
                .get_mut(&SubsystemRef::from(subsystem))?
                .take()
        })
    }

    pub fn default_command<S>(subsystem: &Rc<RefCell<S>>) -> Option<CommandRef>
    where
        S: Subsystem + 'static,
    {
        STATE.with(|state| {
            state
                .subsystems
                .borrow()
                .get(&SubsystemRef::from(subsystem))
                .cloned()
                .flatten()
        })
    }

    /// The command currently holding `subsystem`, if any.
    pub fn requiring<S>(subsystem: &Rc<RefCell<S>>) -> Option<CommandRef>
    where
        S: Subsystem + 'static,
    {
        STATE.with(|state| state.requiring(&SubsystemRef::from(subsystem)))
    }

    /// Runs one scheduler cycle.
    pub fn run() -> Result {
        STATE.with(|state| {
            let subsystems = state.subsystems.borrow().keys().cloned().collect::<Vec<_>>();
            for subsystem in &subsystems {
                let mut subsystem = subsystem.borrow_mut();
                subsystem.periodic();
                if robot::is_sim() {
                    subsystem.sim_periodic();
                }
            }

            if robot::is_sim() {
                time::step_simulation(robot::ITERATION_PERIOD);
            }

            let button_loop = state.button_loop.clone();
            button_loop.borrow_mut().poll()?;

            state.in_run_loop.set(true);
            let result = state.run_scheduled();
            state.in_run_loop.set(false);
            result?;

            let to_schedule = state.to_schedule.take();
            for command in to_schedule {
                state.schedule_now(command)?;
            }

            let to_cancel = state.to_cancel.take();
            for command in to_cancel {
                state.cancel(&command)?;
            }

            // Add default commands for un-required registered subsystems.
            let idle_defaults = state
                .subsystems
                .borrow()
                .iter()
                .filter(|(subsystem, _)| !state.requirements.borrow().contains_key(*subsystem))
                .filter_map(|(_, command)| command.clone())
                .collect::<Vec<_>>();
            for default_command in idle_defaults {
                state.schedule_now(default_command)?;
            }

            Ok(())
        })
    }

    fn requirements_of(command: &dyn Command) -> HashSet<SubsystemRef> {
        command.get_requirements().iter().cloned().collect()
    }

    pub fn cancel_all() -> Result {
        STATE.with(|state| {
            let scheduled_commands = state
                .scheduled_commands
                .borrow()
                .iter()
                .cloned()
                .collect::<Vec<_>>();

            for command in scheduled_commands {
                state.cancel(&command)?;
            }

            Ok(())
        })
    }

    pub fn button_event_loop() -> Rc<RefCell<EventLoop>> {
        STATE.with(|state| state.button_loop.clone())
    }

    pub fn is_scheduled(command: &CommandRef) -> bool {
        STATE.with(|state| state.is_scheduled(command))
    }
}
