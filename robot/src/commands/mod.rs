pub mod arm;
pub mod drive;

pub use arm::{ArmToPosition, LowerArm};
pub use drive::{DefaultDrive, DriveDistance, DriveDistanceSimple, TimedDrive, TurnToAngle};
