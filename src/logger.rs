//! Console logger for the [`log`] facade.
//!
//! Install it once at startup:
//!
//! ```ignore
//! robot_command::logger::init(log::LevelFilter::Info).ok();
//! ```
//!
//! Each record is printed on its own line as `LEVEL [uptime] target - message`, for example
//! `INFO [12.340s] robot_command::robot - entering Autonomous`.

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::time::uptime;

pub struct RobotLogger;

static LOGGER: RobotLogger = RobotLogger;

impl log::Log for RobotLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let time = uptime().as_secs_f32();

        #[cfg(target_os = "vexos")]
        pros::core::println!(
            "{} [{:.3}s] {} - {}",
            record.level(),
            time,
            record.target(),
            record.args()
        );
        #[cfg(not(target_os = "vexos"))]
        std::println!(
            "{} [{:.3}s] {} - {}",
            record.level(),
            time,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Installs [`RobotLogger`] as the global logger. Fails if a logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
