use alloc::rc::Rc;
use core::cell::RefCell;

use log::warn;

use super::CommandRefExt;
use crate::{
    event::EventLoop,
    hal::{Button, Gamepad},
    CommandRef, CommandScheduler,
};

/// Binds commands to a boolean condition polled once per scheduler cycle.
pub struct Trigger {
    event_loop: Rc<RefCell<EventLoop>>,
    condition: Rc<dyn Fn() -> bool>,
}

impl Trigger {
    pub fn new_with_loop(
        event_loop: Rc<RefCell<EventLoop>>,
        condition: impl Fn() -> bool + 'static,
    ) -> Self {
        Self {
            event_loop,
            condition: Rc::new(condition),
        }
    }

    pub fn new(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            event_loop: CommandScheduler::button_event_loop(),
            condition: Rc::new(condition),
        }
    }

    /// Schedules `command` on the cycle the condition becomes true.
    pub fn on_true(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                command.schedule()?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn on_false(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                command.schedule()?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn while_true(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                command.schedule()?;
            } else if pressed_last && !pressed {
                command.cancel()?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn while_false(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                command.schedule()?;
            } else if !pressed_last && pressed {
                command.cancel()?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn toggle_on_true(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                if command.is_scheduled() {
                    command.cancel()?;
                } else {
                    command.schedule()?;
                }
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn toggle_on_false(self, command: impl Into<CommandRef>) -> Self {
        let command = command.into();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                if command.is_scheduled() {
                    command.cancel()?;
                } else {
                    command.schedule()?;
                }
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn is_active(&self) -> bool {
        (self.condition)()
    }

    pub fn and(&self, other: &Self) -> Self {
        let condition = self.condition.clone();
        let other_condition = other.condition.clone();
        Self::new_with_loop(self.event_loop.clone(), move || {
            condition() && other_condition()
        })
    }

    pub fn or(&self, other: &Self) -> Self {
        let condition = self.condition.clone();
        let other_condition = other.condition.clone();
        Self::new_with_loop(self.event_loop.clone(), move || {
            condition() || other_condition()
        })
    }

    pub fn negate(&self) -> Self {
        let condition = self.condition.clone();
        Self::new_with_loop(self.event_loop.clone(), move || !condition())
    }

    /// A trigger that is active while `button` is held. A controller that cannot be read counts
    /// as released.
    pub fn button(gamepad: Rc<dyn Gamepad>, button: Button) -> Self {
        Self::new(move || {
            gamepad.button(button).unwrap_or_else(|err| {
                warn!("could not read button {button:?}: {err}");
                false
            })
        })
    }
}
