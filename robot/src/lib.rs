#![cfg_attr(target_os = "vexos", no_std)]

extern crate alloc;

pub mod commands;
pub mod constants;
#[cfg(target_os = "vexos")]
pub mod hardware;
pub mod robot;
pub mod subsystems;

pub use robot::{Robot, RobotHardware};
