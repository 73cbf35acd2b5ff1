use alloc::{boxed::Box, rc::Rc, vec::Vec};
use core::cell::{Cell, RefCell};

use crate::{command::button::Trigger, Result};

#[derive(Default)]
pub struct EventLoop {
    events: Vec<Box<dyn FnMut() -> Result>>,
}

impl EventLoop {
    /// Add an event to run when the loop is polled.
    pub fn bind(&mut self, action: impl FnMut() -> Result + 'static) {
        self.events.push(Box::new(action));
    }

    /// Runs every bound event in the order they were bound, stopping at the first error.
    pub fn poll(&mut self) -> Result {
        for event in self.events.iter_mut() {
            event()?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

pub struct BooleanEvent {
    event_loop: Rc<RefCell<EventLoop>>,
    state: Rc<Cell<bool>>,
}

impl BooleanEvent {
    pub fn new(
        event_loop: Rc<RefCell<EventLoop>>,
        mut signal: impl FnMut() -> bool + 'static,
    ) -> Self {
        let state = Rc::new(Cell::new(signal()));
        event_loop.borrow_mut().bind({
            let state = state.clone();
            move || {
                state.set(signal());
                Ok(())
            }
        });
        Self { event_loop, state }
    }

    pub fn current_state(&self) -> bool {
        self.state.get()
    }

    pub fn if_high(&self, mut action: impl FnMut() -> Result + 'static) {
        let state = self.state.clone();
        self.event_loop.borrow_mut().bind(move || {
            if state.get() {
                action()?;
            }
            Ok(())
        });
    }

    pub fn rising(&self) -> Self {
        let mut previous = self.state.get();
        let state = self.state.clone();

        Self::new(self.event_loop.clone(), move || {
            let present = state.get();
            let is_rising = !previous && present;
            previous = present;
            is_rising
        })
    }

    pub fn falling(&self) -> Self {
        let mut previous = self.state.get();
        let state = self.state.clone();

        Self::new(self.event_loop.clone(), move || {
            let present = state.get();
            let is_falling = previous && !present;
            previous = present;
            is_falling
        })
    }

    pub fn negate(&self) -> Self {
        let state = self.state.clone();
        Self::new(self.event_loop.clone(), move || !state.get())
    }

    pub fn and(&self, other: &Self) -> Self {
        let state = self.state.clone();
        let other_state = other.state.clone();
        Self::new(self.event_loop.clone(), move || {
            state.get() && other_state.get()
        })
    }

    pub fn or(&self, other: &Self) -> Self {
        let state = self.state.clone();
        let other_state = other.state.clone();
        Self::new(self.event_loop.clone(), move || {
            state.get() || other_state.get()
        })
    }

    pub fn as_trigger(&self) -> Trigger {
        let state = self.state.clone();
        Trigger::new_with_loop(self.event_loop.clone(), move || state.get())
    }
}

impl From<BooleanEvent> for Trigger {
    fn from(event: BooleanEvent) -> Self {
        Self::new_with_loop(event.event_loop, move || event.state.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_edge_is_high_for_one_poll() {
        let event_loop = Rc::new(RefCell::new(EventLoop::default()));
        let input = Rc::new(Cell::new(false));
        let signal = {
            let input = input.clone();
            BooleanEvent::new(event_loop.clone(), move || input.get())
        };
        let rising = signal.rising();
        let falling = signal.falling();

        input.set(true);
        event_loop.borrow_mut().poll().unwrap();
        assert!(signal.current_state());
        assert!(rising.current_state());

        event_loop.borrow_mut().poll().unwrap();
        assert!(!rising.current_state());

        input.set(false);
        event_loop.borrow_mut().poll().unwrap();
        assert!(falling.current_state());
        assert!(signal.negate().current_state());
    }

    #[test]
    fn if_high_runs_while_high() {
        let event_loop = Rc::new(RefCell::new(EventLoop::default()));
        let input = Rc::new(Cell::new(true));
        let count = Rc::new(Cell::new(0));
        {
            let input = input.clone();
            let count = count.clone();
            BooleanEvent::new(event_loop.clone(), move || input.get()).if_high(move || {
                count.set(count.get() + 1);
                Ok(())
            });
        }

        event_loop.borrow_mut().poll().unwrap();
        event_loop.borrow_mut().poll().unwrap();
        input.set(false);
        event_loop.borrow_mut().poll().unwrap();

        assert_eq!(count.get(), 2);
        assert_eq!(event_loop.borrow().len(), 2);
    }
}
