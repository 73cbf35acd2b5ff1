use crate::geometry::{Pose2d, Rotation2d, Twist2d};

/// Dead-reckons the robot pose from the two wheel distances and an absolute gyro angle.
///
/// Distances are cumulative and in metres. They must read zero whenever the odometry is created
/// or reset, since only the change since the last update is integrated.
#[derive(Debug, Clone)]
pub struct DifferentialDriveOdometry {
    pose: Pose2d,
    gyro_offset: Rotation2d,
    previous_angle: Rotation2d,
    previous_left: f32,
    previous_right: f32,
}

impl DifferentialDriveOdometry {
    pub fn new(gyro_angle: Rotation2d, initial_pose: Pose2d) -> Self {
        Self {
            pose: initial_pose,
            gyro_offset: initial_pose.rotation - gyro_angle,
            previous_angle: initial_pose.rotation,
            previous_left: 0.0,
            previous_right: 0.0,
        }
    }

    /// Resets the tracked pose. The encoders must be zeroed alongside this.
    pub fn reset_position(&mut self, pose: Pose2d, gyro_angle: Rotation2d) {
        self.pose = pose;
        self.previous_angle = pose.rotation;
        self.gyro_offset = pose.rotation - gyro_angle;
        self.previous_left = 0.0;
        self.previous_right = 0.0;
    }

    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    pub fn update(&mut self, gyro_angle: Rotation2d, left_metres: f32, right_metres: f32) -> Pose2d {
        let delta_left = left_metres - self.previous_left;
        let delta_right = right_metres - self.previous_right;
        self.previous_left = left_metres;
        self.previous_right = right_metres;

        let angle = gyro_angle + self.gyro_offset;
        let twist = Twist2d {
            dx: (delta_left + delta_right) / 2.0,
            dy: 0.0,
            dtheta: (angle - self.previous_angle).radians(),
        };

        let moved = self.pose.exp(twist);
        self.pose = Pose2d::new(moved.x, moved.y, angle);
        self.previous_angle = angle;

        self.pose
    }
}
