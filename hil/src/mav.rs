//! Protocol enum values used by the bridge.

pub const MODE_FLAG_SAFETY_ARMED: u8 = 0x80;
pub const MODE_FLAG_HIL_ENABLED: u8 = 0x20;

pub const CMD_DO_SET_MODE: u16 = 176;

pub const TYPE_GENERIC: u8 = 0;
pub const AUTOPILOT_INVALID: u8 = 8;
pub const STATE_ACTIVE: u8 = 4;
pub const MAVLINK_VERSION: u8 = 3;

/// Every HIL_SENSOR field carries fresh data.
pub const SENSOR_FIELDS_ALL: u32 = (1 << 13) - 1;

pub const GPS_FIX_3D: u8 = 3;

pub const STANDARD_GRAVITY: f64 = 9.80665;
