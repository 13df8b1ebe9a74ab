use vapor_native::{AnalogActionDataRaw, DigitalActionDataRaw, MotionDataRaw, SourceMode};

/// State of a button-like action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitalActionData {
    /// Whether the action is currently held.
    pub pressed: bool,
    /// Whether the action is bound and usable in the active action set.
    pub active: bool,
}

impl From<DigitalActionDataRaw> for DigitalActionData {
    fn from(raw: DigitalActionDataRaw) -> Self {
        Self {
            pressed: raw.state,
            active: raw.active,
        }
    }
}

/// State of a stick, trackpad or trigger action.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalogActionData {
    /// How the bound input is configured, which decides how to read
    /// `x` and `y`.
    pub mode: SourceMode,
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

impl From<AnalogActionDataRaw> for AnalogActionData {
    fn from(raw: AnalogActionDataRaw) -> Self {
        Self {
            mode: SourceMode::from_raw(raw.mode),
            x: raw.x,
            y: raw.y,
            active: raw.active,
        }
    }
}

/// Gyro and accelerometer readings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionData {
    /// Orientation quaternion as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub acceleration: [f32; 3],
    pub angular_velocity: [f32; 3],
}

impl From<MotionDataRaw> for MotionData {
    fn from(raw: MotionDataRaw) -> Self {
        Self {
            rotation: [raw.rot_quat_x, raw.rot_quat_y, raw.rot_quat_z, raw.rot_quat_w],
            acceleration: [raw.pos_accel_x, raw.pos_accel_y, raw.pos_accel_z],
            angular_velocity: [raw.rot_vel_x, raw.rot_vel_y, raw.rot_vel_z],
        }
    }
}
