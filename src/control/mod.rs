//! Closed-loop control.

pub mod pid;

pub use pid::PidController;
