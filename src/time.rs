//! Robot time.
//!
//! On the brain this is the PROS uptime clock. In simulation time only moves when the scheduler
//! runs, one [`ITERATION_PERIOD`](crate::robot::ITERATION_PERIOD) per cycle, which keeps
//! time-based commands deterministic.

use core::time::Duration;

#[cfg(target_os = "vexos")]
pub fn uptime() -> Duration {
    Duration::from_micros(unsafe { pros::sys::micros() })
}

#[cfg(target_os = "vexos")]
pub(crate) fn step_simulation(_period: Duration) {}

#[cfg(not(target_os = "vexos"))]
std::thread_local! {
    static SIM_TIME: core::cell::Cell<Duration> = const { core::cell::Cell::new(Duration::ZERO) };
}

#[cfg(not(target_os = "vexos"))]
pub fn uptime() -> Duration {
    SIM_TIME.with(|time| time.get())
}

#[cfg(not(target_os = "vexos"))]
pub(crate) fn step_simulation(period: Duration) {
    SIM_TIME.with(|time| time.set(time.get() + period));
}

/// A stopwatch over [`uptime`].
#[derive(Debug, Clone, Default)]
pub struct Timer {
    started_at: Option<Duration>,
    accumulated: Duration,
}

impl Timer {
    pub const fn new() -> Self {
        Self {
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    /// Starts counting. Has no effect on a running timer.
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(uptime());
        }
    }

    pub fn stop(&mut self) {
        self.accumulated = self.elapsed();
        self.started_at = None;
    }

    /// Zeroes the elapsed time without changing whether the timer is running.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        if self.started_at.is_some() {
            self.started_at = Some(uptime());
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        let running = self
            .started_at
            .map(|start| uptime().saturating_sub(start))
            .unwrap_or_default();
        self.accumulated + running
    }

    pub fn has_elapsed(&self, period: Duration) -> bool {
        self.elapsed() >= period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_accumulates_only_while_running() {
        let mut timer = Timer::new();
        step_simulation(Duration::from_millis(100));
        assert_eq!(timer.elapsed(), Duration::ZERO);

        timer.start();
        step_simulation(Duration::from_millis(250));
        assert_eq!(timer.elapsed(), Duration::from_millis(250));

        timer.stop();
        step_simulation(Duration::from_millis(500));
        assert_eq!(timer.elapsed(), Duration::from_millis(250));
        assert!(!timer.is_running());

        timer.start();
        step_simulation(Duration::from_millis(750));
        assert!(timer.has_elapsed(Duration::from_secs(1)));

        timer.reset();
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert!(timer.is_running());
    }
}
