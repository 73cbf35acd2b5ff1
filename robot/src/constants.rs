//! Ports, gains and tuning values, grouped by mechanism.

pub mod drive {
    use core::f32::consts::PI;

    pub const FRONT_LEFT_MOTOR_PORT: u8 = 1;
    pub const BACK_LEFT_MOTOR_PORT: u8 = 2;
    pub const FRONT_RIGHT_MOTOR_PORT: u8 = 3;
    pub const BACK_RIGHT_MOTOR_PORT: u8 = 4;

    /// The right side faces the other way, so it is inverted to drive forward on positive output.
    pub const LEFT_MOTORS_INVERTED: bool = false;
    pub const RIGHT_MOTORS_INVERTED: bool = true;

    pub const GYRO_PORT: u8 = 10;

    /// ADI ports (top, bottom).
    pub const LEFT_ENCODER_PORTS: (u8, u8) = (1, 2);
    pub const RIGHT_ENCODER_PORTS: (u8, u8) = (3, 4);
    pub const LEFT_ENCODER_REVERSED: bool = false;
    pub const RIGHT_ENCODER_REVERSED: bool = true;

    pub const WHEEL_DIAMETER_INCHES: f32 = 6.0;
    pub const ENCODER_COUNTS_PER_REVOLUTION: f32 = 360.0;
    pub const DISTANCE_PER_PULSE_INCHES: f32 =
        WHEEL_DIAMETER_INCHES * PI / ENCODER_COUNTS_PER_REVOLUTION;

    pub const TRACK_WIDTH_INCHES: f32 = 22.0;

    /// Top speed of the simulated drive base at full output.
    pub const SIM_MAX_SPEED_INCHES_PER_SEC: f32 = 120.0;

    pub const TELEOP_DEFAULT_DRIVE_SPEED: f32 = 0.7;
    pub const TELEOP_BOOST_DRIVE_SPEED: f32 = 1.0;
    pub const TELEOP_TURN_SPEED: f32 = 0.6;

    pub const AUTO_DRIVE_SPEED: f32 = 0.5;
    pub const DISTANCE_TOLERANCE_METRES: f32 = 0.05;

    pub const DISTANCE_P: f32 = 0.8;
    pub const DISTANCE_I: f32 = 0.0;
    pub const DISTANCE_D: f32 = 0.0;
    pub const DISTANCE_MAX_OUTPUT: f32 = 0.8;

    pub const TURN_P: f32 = 0.02;
    pub const TURN_I: f32 = 0.0;
    pub const TURN_D: f32 = 0.0;
    pub const TURN_MAX_OUTPUT: f32 = 0.6;
    pub const TURN_TOLERANCE_DEGREES: f32 = 2.0;
    pub const TURN_RATE_TOLERANCE_DEGREES_PER_SEC: f32 = 10.0;
}

pub mod arm {
    pub const LEFT_MOTOR_PORT: u8 = 5;
    pub const RIGHT_MOTOR_PORT: u8 = 6;
    pub const RIGHT_MOTOR_REVERSED: bool = true;

    pub const ENCODER_PORTS: (u8, u8) = (5, 6);
    pub const ENCODER_REVERSED: bool = false;
    pub const DEGREES_PER_PULSE: f32 = 0.25;

    pub const UPPER_LIMIT_SWITCH_PORT: u8 = 7;
    pub const LOWER_LIMIT_SWITCH_PORT: u8 = 8;

    /// The switches are not mounted on this revision of the arm. Their reads are ignored and both
    /// report released.
    pub const LIMIT_SWITCHES_INSTALLED: bool = false;

    pub const LOWER_POWER: f32 = -0.3;
    pub const MAX_POWER: f32 = 0.8;

    pub const ROTATION_P: f32 = 0.05;
    pub const ROTATION_I: f32 = 0.0;
    pub const ROTATION_D: f32 = 0.0;
    pub const ROTATION_TOLERANCE_DEGREES: f32 = 2.0;

    pub const LOWER_HUB_HEIGHT_DEGREES: f32 = 45.0;
    pub const RAMP_HEIGHT_DEGREES: f32 = 20.0;

    /// Mechanical travel of the simulated arm.
    pub const SIM_LOWER_LIMIT_DEGREES: f32 = 0.0;
    pub const SIM_UPPER_LIMIT_DEGREES: f32 = 110.0;
    pub const SIM_MAX_SPEED_DEGREES_PER_SEC: f32 = 90.0;
}

pub mod driver_station {
    use robot_command::hal::{Button, JoystickAxis};

    pub const DRIVE_STICK: JoystickAxis = JoystickAxis::LeftY;
    pub const TURN_STICK: JoystickAxis = JoystickAxis::RightX;
    pub const BOOST_BUTTON: Button = Button::R1;

    pub const TURN_TO_ZERO_BUTTON: Button = Button::X;
    pub const TURN_TO_NINETY_BUTTON: Button = Button::A;
    pub const TURN_AROUND_BUTTON: Button = Button::B;
    pub const TURN_TO_MINUS_NINETY_BUTTON: Button = Button::Y;
}

pub mod autonomous {
    use core::time::Duration;

    pub const TIMED_DRIVE_DURATION: Duration = Duration::from_secs(5);
    pub const TIMED_DRIVE_SPEED: f32 = 0.7;
    pub const DISTANCE_AUTO_METRES: f32 = 2.0;
    pub const ANGLE_AUTO_DEGREES: f32 = 90.0;
    pub const COMPETITION_DRIVE_FEET: f32 = -7.5;

    pub const TURN_TIMEOUT: Duration = Duration::from_secs(5);
    pub const PERIOD: Duration = Duration::from_secs(15);
}
