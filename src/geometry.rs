//! Planar geometry for field poses. Angles are counter-clockwise positive.

use core::ops::{Add, Neg, Sub};

#[cfg(target_os = "vexos")]
use micromath::F32Ext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation2d {
    cos: f32,
    sin: f32,
}

impl Rotation2d {
    pub const ZERO: Self = Self { cos: 1.0, sin: 0.0 };

    pub fn from_radians(radians: f32) -> Self {
        Self {
            cos: radians.cos(),
            sin: radians.sin(),
        }
    }

    pub fn from_degrees(degrees: f32) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Angle in (-pi, pi].
    pub fn radians(&self) -> f32 {
        self.sin.atan2(self.cos)
    }

    /// Angle in (-180, 180].
    pub fn degrees(&self) -> f32 {
        self.radians().to_degrees()
    }

    pub fn cos(&self) -> f32 {
        self.cos
    }

    pub fn sin(&self) -> f32 {
        self.sin
    }

    pub fn rotate_by(&self, other: Self) -> Self {
        let cos = self.cos * other.cos - self.sin * other.sin;
        let sin = self.cos * other.sin + self.sin * other.cos;
        let magnitude = (cos * cos + sin * sin).sqrt();
        if magnitude > 1e-6 {
            Self {
                cos: cos / magnitude,
                sin: sin / magnitude,
            }
        } else {
            Self::ZERO
        }
    }
}

impl Default for Rotation2d {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Rotation2d {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.rotate_by(rhs)
    }
}

impl Neg for Rotation2d {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            cos: self.cos,
            sin: -self.sin,
        }
    }
}

impl Sub for Rotation2d {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.rotate_by(-rhs)
    }
}

/// A change in pose along an arc, expressed in the robot frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist2d {
    pub dx: f32,
    pub dy: f32,
    pub dtheta: f32,
}

/// Robot position in metres and heading on the field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2d {
    pub x: f32,
    pub y: f32,
    pub rotation: Rotation2d,
}

impl Pose2d {
    pub fn new(x: f32, y: f32, rotation: Rotation2d) -> Self {
        Self { x, y, rotation }
    }

    /// Applies `twist` as a constant-curvature arc starting from this pose.
    pub fn exp(&self, twist: Twist2d) -> Self {
        let Twist2d { dx, dy, dtheta } = twist;

        let (sin_theta, cos_theta) = (dtheta.sin(), dtheta.cos());
        let (s, c) = if dtheta.abs() < 1e-9 {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        } else {
            (sin_theta / dtheta, (1.0 - cos_theta) / dtheta)
        };

        // Displacement in the robot frame, then rotated into the field frame.
        let local_x = dx * s - dy * c;
        let local_y = dx * c + dy * s;
        let (cos, sin) = (self.rotation.cos(), self.rotation.sin());

        Self {
            x: self.x + local_x * cos - local_y * sin,
            y: self.y + local_x * sin + local_y * cos,
            rotation: self.rotation + Rotation2d { cos: cos_theta, sin: sin_theta },
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use core::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn rotations_wrap_into_half_open_range() {
        let angle = Rotation2d::from_degrees(170.0) + Rotation2d::from_degrees(20.0);
        assert_relative_eq!(angle.degrees(), -170.0, epsilon = 1e-3);

        let angle = Rotation2d::from_degrees(-90.0) - Rotation2d::from_degrees(90.0);
        assert_relative_eq!(angle.degrees().abs(), 180.0, epsilon = 1e-3);
    }

    #[test]
    fn straight_twist_moves_along_heading() {
        let pose = Pose2d::new(1.0, 0.0, Rotation2d::from_degrees(90.0));
        let moved = pose.exp(Twist2d { dx: 2.0, dy: 0.0, dtheta: 0.0 });

        assert_relative_eq!(moved.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(moved.rotation.degrees(), 90.0, epsilon = 1e-3);
    }

    #[test]
    fn quarter_circle_arc() {
        let moved = Pose2d::default().exp(Twist2d {
            dx: FRAC_PI_2,
            dy: 0.0,
            dtheta: FRAC_PI_2,
        });

        assert_relative_eq!(moved.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.rotation.degrees(), 90.0, epsilon = 1e-3);
    }
}
