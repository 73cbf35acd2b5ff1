pub mod arm;
pub mod drive;

pub use arm::{ArmHardware, ArmSim, ArmSubsystem};
pub use drive::{DriveHardware, DriveSim, DriveSubsystem};
