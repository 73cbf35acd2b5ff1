use alloc::{boxed::Box, vec};

use log::warn;
use robot_command::{
    dashboard,
    drive::{DifferentialDrive, MotorControllerGroup},
    geometry::{Pose2d, Rotation2d},
    hal::{
        sim::{SimEncoder, SimGyro, SimMotor},
        Encoder, Gyro, MotorController, QuadratureEncoder,
    },
    odometry::DifferentialDriveOdometry,
    robot::ITERATION_PERIOD,
    units::inches_to_metres,
    Result,
};

use crate::constants::drive::*;

/// Devices owned by the drive base.
#[derive(Debug)]
pub struct DriveHardware {
    pub front_left: Box<dyn MotorController>,
    pub back_left: Box<dyn MotorController>,
    pub front_right: Box<dyn MotorController>,
    pub back_right: Box<dyn MotorController>,
    pub gyro: Box<dyn Gyro>,
    pub left_encoder: Box<dyn QuadratureEncoder>,
    pub right_encoder: Box<dyn QuadratureEncoder>,
    pub sim: Option<DriveSim>,
}

impl DriveHardware {
    pub fn simulated() -> Self {
        let sim = DriveSim::default();
        Self {
            front_left: Box::new(SimMotor::default()),
            back_left: Box::new(SimMotor::default()),
            front_right: Box::new(SimMotor::default()),
            back_right: Box::new(SimMotor::default()),
            gyro: Box::new(sim.gyro.clone()),
            left_encoder: Box::new(sim.left_encoder.clone()),
            right_encoder: Box::new(sim.right_encoder.clone()),
            sim: Some(sim),
        }
    }
}

/// Kinematic model of the drive base: no inertia, no wheel slip.
#[derive(Debug, Clone, Default)]
pub struct DriveSim {
    pub gyro: SimGyro,
    pub left_encoder: SimEncoder,
    pub right_encoder: SimEncoder,
}

impl DriveSim {
    /// Moves each side by its output for `dt` seconds. Raw yaw is clockwise positive.
    pub fn step(&self, left_output: f32, right_output: f32, dt: f32) {
        let left_inches = left_output * SIM_MAX_SPEED_INCHES_PER_SEC * dt;
        let right_inches = right_output * SIM_MAX_SPEED_INCHES_PER_SEC * dt;

        self.left_encoder
            .add_pulses(left_inches / DISTANCE_PER_PULSE_INCHES);
        self.right_encoder
            .add_pulses(right_inches / DISTANCE_PER_PULSE_INCHES);

        let counter_clockwise = ((right_inches - left_inches) / TRACK_WIDTH_INCHES).to_degrees();
        self.gyro.rotate(-counter_clockwise);
    }
}

/// Wraps an angle into (-180, 180].
fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[derive(Debug)]
pub struct DriveSubsystem {
    drive: DifferentialDrive,
    gyro: Box<dyn Gyro>,
    left_encoder: Encoder,
    right_encoder: Encoder,
    odometry: DifferentialDriveOdometry,
    sim: Option<DriveSim>,
}

impl DriveSubsystem {
    pub fn new(hardware: DriveHardware) -> Result<Self> {
        let mut left = MotorControllerGroup::new(vec![hardware.front_left, hardware.back_left]);
        left.set_inverted(LEFT_MOTORS_INVERTED);
        let mut right = MotorControllerGroup::new(vec![hardware.front_right, hardware.back_right]);
        right.set_inverted(RIGHT_MOTORS_INVERTED);

        let mut drive = Self {
            drive: DifferentialDrive::new(left, right),
            gyro: hardware.gyro,
            left_encoder: Encoder::new(hardware.left_encoder, DISTANCE_PER_PULSE_INCHES),
            right_encoder: Encoder::new(hardware.right_encoder, DISTANCE_PER_PULSE_INCHES),
            odometry: DifferentialDriveOdometry::new(Rotation2d::ZERO, Pose2d::default()),
            sim: hardware.sim,
        };

        // Odometry integrates from zero, so the encoders are zeroed before it is built.
        drive.reset_encoders()?;
        drive.odometry = DifferentialDriveOdometry::new(
            Rotation2d::from_degrees(drive.heading()?),
            Pose2d::default(),
        );
        Ok(drive)
    }

    /// Arcade drive with `rotation` clockwise positive. Inputs are not squared.
    pub fn arcade_drive(&mut self, forward: f32, rotation: f32) -> Result {
        self.drive.arcade_drive(forward, rotation, false)
    }

    pub fn stop(&mut self) -> Result {
        self.drive.stop()
    }

    pub fn reset_heading(&mut self) -> Result {
        self.gyro.reset()
    }

    /// Heading in degrees, counter-clockwise positive, in (-180, 180].
    pub fn heading(&self) -> Result<f32> {
        Ok(wrap_degrees(-self.gyro.yaw()?))
    }

    /// Inches travelled by the left wheels since the encoders were last reset.
    pub fn left_wheel_distance(&self) -> Result<f32> {
        self.left_encoder.distance()
    }

    pub fn right_wheel_distance(&self) -> Result<f32> {
        self.right_encoder.distance()
    }

    /// Mean of both wheel distances in inches. Assumes the wheels do not skid.
    pub fn average_distance(&self) -> Result<f32> {
        Ok((self.left_wheel_distance()? + self.right_wheel_distance()?) / 2.0)
    }

    pub fn reset_encoders(&mut self) -> Result {
        self.left_encoder.reset()?;
        self.right_encoder.reset()
    }

    pub fn pose(&self) -> Pose2d {
        self.odometry.pose()
    }

    pub fn reset_pose(&mut self, pose: Pose2d) -> Result {
        self.reset_encoders()?;
        let heading = Rotation2d::from_degrees(self.heading()?);
        self.odometry.reset_position(pose, heading);
        Ok(())
    }

    /// Last outputs sent to the (left, right) sides.
    pub fn outputs(&self) -> (f32, f32) {
        (self.drive.left().get(), self.drive.right().get())
    }

    pub fn sim(&self) -> Option<&DriveSim> {
        self.sim.as_ref()
    }

    fn update_odometry(&mut self) -> Result<f32> {
        let heading = self.heading()?;
        let left = inches_to_metres(self.left_wheel_distance()?);
        let right = inches_to_metres(self.right_wheel_distance()?);
        self.odometry
            .update(Rotation2d::from_degrees(heading), left, right);
        Ok(heading)
    }
}

impl robot_command::subsystem::Subsystem for DriveSubsystem {
    fn periodic(&mut self) {
        match self.update_odometry() {
            Ok(heading) => {
                let pose = self.pose();
                dashboard::put_number("Heading", heading as f64);
                dashboard::put_number("Pose X", pose.x as f64);
                dashboard::put_number("Pose Y", pose.y as f64);
            }
            Err(err) => warn!("skipping odometry update: {err}"),
        }
    }

    fn sim_periodic(&mut self) {
        if let Some(sim) = &self.sim {
            let (left, right) = self.outputs();
            sim.step(left, right, ITERATION_PERIOD.as_secs_f32());
        }
    }
}
