use crate::{
    FieldDef,
    MessageDef,
    Primitive::{
        self,
        *,
    },
};

/// Ids of the built-in messages.
pub mod ids {
    pub const HEARTBEAT: u8 = 0;
    pub const SYSTEM_TIME: u8 = 2;
    pub const ATTITUDE: u8 = 30;
    pub const GLOBAL_POSITION_INT: u8 = 33;
    pub const SERVO_OUTPUT_RAW: u8 = 36;
    pub const MISSION_WRITE_PARTIAL_LIST: u8 = 38;
    pub const COMMAND_LONG: u8 = 76;
    pub const HIL_CONTROLS: u8 = 91;
    pub const HIL_RC_INPUTS_RAW: u8 = 92;
    pub const HIL_ACTUATOR_CONTROLS: u8 = 93;
    pub const HIL_SENSOR: u8 = 107;
    pub const HIL_GPS: u8 = 113;
    pub const HIL_STATE_QUATERNION: u8 = 115;
    pub const STATUSTEXT: u8 = 253;
}

#[inline]
fn f(name: &str, ty: Primitive) -> FieldDef {
    FieldDef::scalar(name, ty)
}

#[inline]
fn a(name: &str, ty: Primitive, len: u8) -> FieldDef {
    FieldDef::array(name, ty, len)
}

pub(crate) fn definitions() -> Vec<MessageDef> {
    vec![
        MessageDef::new(ids::HEARTBEAT, "HEARTBEAT", 50, vec![
            f("custom_mode", U32),
            f("type", U8),
            f("autopilot", U8),
            f("base_mode", U8),
            f("system_status", U8),
            f("mavlink_version", U8),
        ]),
        MessageDef::new(ids::SYSTEM_TIME, "SYSTEM_TIME", 137, vec![
            f("time_unix_usec", U64),
            f("time_boot_ms", U32),
        ]),
        MessageDef::new(ids::ATTITUDE, "ATTITUDE", 39, vec![
            f("time_boot_ms", U32),
            f("roll", F32),
            f("pitch", F32),
            f("yaw", F32),
            f("rollspeed", F32),
            f("pitchspeed", F32),
            f("yawspeed", F32),
        ]),
        MessageDef::new(ids::GLOBAL_POSITION_INT, "GLOBAL_POSITION_INT", 104, vec![
            f("time_boot_ms", U32),
            f("lat", I32),
            f("lon", I32),
            f("alt", I32),
            f("relative_alt", I32),
            f("vx", I16),
            f("vy", I16),
            f("vz", I16),
            f("hdg", U16),
        ]),
        MessageDef::new(ids::SERVO_OUTPUT_RAW, "SERVO_OUTPUT_RAW", 222, vec![
            f("time_usec", U32),
            f("servo1_raw", U16),
            f("servo2_raw", U16),
            f("servo3_raw", U16),
            f("servo4_raw", U16),
            f("servo5_raw", U16),
            f("servo6_raw", U16),
            f("servo7_raw", U16),
            f("servo8_raw", U16),
            f("port", U8),
        ]),
        MessageDef::new(ids::MISSION_WRITE_PARTIAL_LIST, "MISSION_WRITE_PARTIAL_LIST", 9, vec![
            f("start_index", I16),
            f("end_index", I16),
            f("target_system", U8),
            f("target_component", U8),
        ]),
        MessageDef::new(ids::COMMAND_LONG, "COMMAND_LONG", 152, vec![
            f("param1", F32),
            f("param2", F32),
            f("param3", F32),
            f("param4", F32),
            f("param5", F32),
            f("param6", F32),
            f("param7", F32),
            f("command", U16),
            f("target_system", U8),
            f("target_component", U8),
            f("confirmation", U8),
        ]),
        MessageDef::new(ids::HIL_CONTROLS, "HIL_CONTROLS", 63, vec![
            f("time_usec", U64),
            f("roll_ailerons", F32),
            f("pitch_elevator", F32),
            f("yaw_rudder", F32),
            f("throttle", F32),
            f("aux1", F32),
            f("aux2", F32),
            f("aux3", F32),
            f("aux4", F32),
            f("mode", U8),
            f("nav_mode", U8),
        ]),
        MessageDef::new(ids::HIL_RC_INPUTS_RAW, "HIL_RC_INPUTS_RAW", 54, vec![
            f("time_usec", U64),
            f("chan1_raw", U16),
            f("chan2_raw", U16),
            f("chan3_raw", U16),
            f("chan4_raw", U16),
            f("chan5_raw", U16),
            f("chan6_raw", U16),
            f("chan7_raw", U16),
            f("chan8_raw", U16),
            f("chan9_raw", U16),
            f("chan10_raw", U16),
            f("chan11_raw", U16),
            f("chan12_raw", U16),
            f("rssi", U8),
        ]),
        MessageDef::new(ids::HIL_ACTUATOR_CONTROLS, "HIL_ACTUATOR_CONTROLS", 47, vec![
            f("time_usec", U64),
            f("flags", U64),
            a("controls", F32, 16),
            f("mode", U8),
        ]),
        MessageDef::new(ids::HIL_SENSOR, "HIL_SENSOR", 108, vec![
            f("time_usec", U64),
            f("xacc", F32),
            f("yacc", F32),
            f("zacc", F32),
            f("xgyro", F32),
            f("ygyro", F32),
            f("zgyro", F32),
            f("xmag", F32),
            f("ymag", F32),
            f("zmag", F32),
            f("abs_pressure", F32),
            f("diff_pressure", F32),
            f("pressure_alt", F32),
            f("temperature", F32),
            f("fields_updated", U32),
        ]),
        MessageDef::new(ids::HIL_GPS, "HIL_GPS", 124, vec![
            f("time_usec", U64),
            f("lat", I32),
            f("lon", I32),
            f("alt", I32),
            f("eph", U16),
            f("epv", U16),
            f("vel", U16),
            f("vn", I16),
            f("ve", I16),
            f("vd", I16),
            f("cog", U16),
            f("fix_type", U8),
            f("satellites_visible", U8),
        ]),
        MessageDef::new(ids::HIL_STATE_QUATERNION, "HIL_STATE_QUATERNION", 4, vec![
            f("time_usec", U64),
            a("attitude_quaternion", F32, 4),
            f("rollspeed", F32),
            f("pitchspeed", F32),
            f("yawspeed", F32),
            f("lat", I32),
            f("lon", I32),
            f("alt", I32),
            f("vx", I16),
            f("vy", I16),
            f("vz", I16),
            f("ind_airspeed", U16),
            f("true_airspeed", U16),
            f("xacc", I16),
            f("yacc", I16),
            f("zacc", I16),
        ]),
        MessageDef::new(ids::STATUSTEXT, "STATUSTEXT", 83, vec![f("severity", U8), a("text", Char, 50)]),
    ]
}
