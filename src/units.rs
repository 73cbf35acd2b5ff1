/// Conversion factor used throughout the drive code. Not the exact SI value (39.3701).
pub const INCHES_PER_METRE: f32 = 39.37;

pub const INCHES_PER_FOOT: f32 = 12.0;

pub fn inches_to_metres(inches: f32) -> f32 {
    inches / INCHES_PER_METRE
}

pub fn metres_to_inches(metres: f32) -> f32 {
    metres * INCHES_PER_METRE
}

pub fn feet_to_metres(feet: f32) -> f32 {
    inches_to_metres(feet * INCHES_PER_FOOT)
}
