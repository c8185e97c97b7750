use std::{
    sync::Arc,
    time::Duration,
};

use hilrelay_message::{
    ids,
    Dictionary,
    DictionaryError,
    Header,
    Message,
    MessageDef,
    Value,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    channel::{
        ChannelConfig,
        ChannelSchedule,
        DelayLine,
    },
    mav,
    state::{
        ActuatorUpdate,
        GpsReading,
        VehicleState,
        MAX_CONTROLS,
    },
    GlobalPositionProjector,
    ProjectionError,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error("vehicle state does not provide {0}")]
    MissingState(&'static str),

    #[error("message {id}: field {field:?} missing or of the wrong type")]
    Field { id: u8, field: &'static str },
}

/// Outbound message channels, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Channel {
    Heartbeat,
    SystemTime,
    Sensor,
    Gps,
    State,
    RcInputs,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Heartbeat,
        Channel::SystemTime,
        Channel::Sensor,
        Channel::Gps,
        Channel::State,
        Channel::RcInputs,
    ];

    pub fn message_name(self) -> &'static str {
        match self {
            Channel::Heartbeat => "HEARTBEAT",
            Channel::SystemTime => "SYSTEM_TIME",
            Channel::Sensor => "HIL_SENSOR",
            Channel::Gps => "HIL_GPS",
            Channel::State => "HIL_STATE_QUATERNION",
            Channel::RcInputs => "HIL_RC_INPUTS_RAW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channels {
    pub heartbeat:   ChannelConfig,
    pub system_time: ChannelConfig,
    pub sensor:      ChannelConfig,
    pub gps:         ChannelConfig,
    pub state:       ChannelConfig,
    pub rc_inputs:   ChannelConfig,
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            heartbeat:   ChannelConfig::every(Duration::from_secs(1)),
            system_time: ChannelConfig::every(Duration::from_secs(1)),
            sensor:      ChannelConfig::default(),
            gps:         ChannelConfig {
                start_delay: Duration::from_millis(1000),
                latency: Duration::from_millis(200),
                ..Default::default()
            },
            state:       ChannelConfig::disabled(),
            rc_inputs:   ChannelConfig::disabled(),
        }
    }
}

impl Channels {
    pub fn get(&self, channel: Channel) -> &ChannelConfig {
        match channel {
            Channel::Heartbeat => &self.heartbeat,
            Channel::SystemTime => &self.system_time,
            Channel::Sensor => &self.sensor,
            Channel::Gps => &self.gps,
            Channel::State => &self.state,
            Channel::RcInputs => &self.rc_inputs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub system_id:             u8,
    pub component_id:          u8,
    /// Altitude of the local origin above mean sea level, m.
    pub reference_alt:         f64,
    pub channels:              Channels,
    /// Ask the autopilot to enter HIL mode when its heartbeat lacks the flag.
    pub request_hil_mode:      bool,
    pub mode_request_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            system_id:             1,
            component_id:          51,
            reference_alt:         488.,
            channels:              Channels::default(),
            request_hil_mode:      true,
            mode_request_interval: Duration::from_secs(1),
        }
    }
}

/// Translates between simulated vehicle state and HIL protocol messages.
#[derive(Debug)]
pub struct HilBridge {
    dictionary:        Arc<Dictionary>,
    projector:         GlobalPositionProjector,
    config:            BridgeConfig,
    header:            Header,
    schedules:         Vec<(Channel, ChannelSchedule)>,
    history:           DelayLine<VehicleState>,
    now:               Duration,
    last_mode_request: Option<Duration>,
}

const HIL_CONTROL_FIELDS: [&str; 8] = [
    "roll_ailerons",
    "pitch_elevator",
    "yaw_rudder",
    "throttle",
    "aux1",
    "aux2",
    "aux3",
    "aux4",
];

impl HilBridge {
    pub fn new(
        dictionary: Arc<Dictionary>,
        projector: GlobalPositionProjector,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        if !projector.is_initialized() {
            return Err(ProjectionError::NotInitialized.into());
        }

        for name in Channel::ALL
            .iter()
            .map(|c| c.message_name())
            .chain(["HIL_CONTROLS", "HIL_ACTUATOR_CONTROLS", "COMMAND_LONG"])
        {
            dictionary.by_name(name)?;
        }

        let schedules = Channel::ALL
            .iter()
            .map(|&c| (c, ChannelSchedule::new(*config.channels.get(c))))
            .collect::<Vec<_>>();

        let depth = schedules.iter().map(|(_, s)| s.config().latency).max().unwrap_or_default();

        Ok(Self {
            dictionary,
            projector,
            header: Header::new(config.system_id, config.component_id),
            schedules,
            history: DelayLine::new(depth),
            now: Duration::ZERO,
            last_mode_request: None,
            config,
        })
    }

    #[inline]
    pub fn header(&self) -> Header {
        self.header
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Messages due at `sim_time`, built from `state` (or the state each
    /// channel's latency calls for).
    pub fn produce_outbound(&mut self, state: &VehicleState, sim_time: Duration) -> Result<Vec<Message>, BridgeError> {
        self.now = sim_time;
        self.history.push(sim_time, state.clone());

        let due = self
            .schedules
            .iter_mut()
            .filter_map(|(channel, schedule)| schedule.due(sim_time).then(|| (*channel, schedule.config().latency)))
            .collect::<Vec<_>>();

        due.into_iter()
            .map(|(channel, latency)| {
                let sample = self.history.get(sim_time, latency).unwrap_or(state);
                self.build(channel, sample, sim_time)
            })
            .collect()
    }

    /// Decode an actuator control message. Anything else yields `None`.
    pub fn consume_inbound(&self, msg: &Message) -> Option<ActuatorUpdate> {
        let result = match msg.id {
            ids::HIL_CONTROLS => self.hil_controls(msg),
            ids::HIL_ACTUATOR_CONTROLS => self.hil_actuator_controls(msg),
            _ => return None,
        };

        match result {
            Ok(update) => Some(update),
            Err(e) => {
                tracing::warn!(error = %e, msg_id = msg.id, "dropping malformed control message");
                None
            },
        }
    }

    /// A `MAV_CMD_DO_SET_MODE` request when the autopilot heartbeat shows HIL
    /// mode is off; rate limited.
    pub fn mode_request(&mut self, msg: &Message) -> Option<Message> {
        if !self.config.request_hil_mode
            || msg.id != ids::HEARTBEAT
            || msg.header.system_id != self.header.system_id
            || msg.header.component_id == self.header.component_id
        {
            return None;
        }

        let def = self.dictionary.layout_for(ids::HEARTBEAT).ok()?;
        let autopilot = msg.get(def, "autopilot").and_then(Value::as_u64)?;
        let base_mode = msg.get(def, "base_mode").and_then(Value::as_u64)? as u8;

        if autopilot == mav::AUTOPILOT_INVALID as u64 || base_mode & mav::MODE_FLAG_HIL_ENABLED != 0 {
            return None;
        }

        if let Some(last) = self.last_mode_request {
            if self.now < last + self.config.mode_request_interval {
                return None;
            }
        }

        let request = self.message("COMMAND_LONG", &[
            ("param1", Value::F32((base_mode | mav::MODE_FLAG_HIL_ENABLED) as f32)),
            ("param2", Value::F32(0.)),
            ("param3", Value::F32(0.)),
            ("param4", Value::F32(0.)),
            ("param5", Value::F32(0.)),
            ("param6", Value::F32(0.)),
            ("param7", Value::F32(0.)),
            ("command", Value::U16(mav::CMD_DO_SET_MODE)),
            ("target_system", Value::U8(msg.header.system_id)),
            ("target_component", Value::U8(msg.header.component_id)),
            ("confirmation", Value::U8(0)),
        ]);

        match request {
            Ok(request) => {
                tracing::info!(base_mode, "requesting hil mode");
                self.last_mode_request = Some(self.now);
                Some(request)
            },
            Err(e) => {
                tracing::error!(error = %e, "building mode request");
                None
            },
        }
    }

    #[inline]
    fn message(&self, name: &str, fields: &[(&str, Value)]) -> Result<Message, BridgeError> {
        Ok(self.dictionary.build(name, self.header, fields)?)
    }

    fn build(&self, channel: Channel, state: &VehicleState, sim_time: Duration) -> Result<Message, BridgeError> {
        let time_usec = sim_time.as_micros() as u64;

        match channel {
            Channel::Heartbeat => self.message("HEARTBEAT", &[
                ("custom_mode", Value::U32(0)),
                ("type", Value::U8(mav::TYPE_GENERIC)),
                ("autopilot", Value::U8(mav::AUTOPILOT_INVALID)),
                ("base_mode", Value::U8(0)),
                ("system_status", Value::U8(mav::STATE_ACTIVE)),
                ("mavlink_version", Value::U8(mav::MAVLINK_VERSION)),
            ]),
            Channel::SystemTime => self.message("SYSTEM_TIME", &[
                ("time_unix_usec", Value::U64(chrono::Utc::now().timestamp_micros().max(0) as u64)),
                ("time_boot_ms", Value::U32(sim_time.as_millis() as u32)),
            ]),
            Channel::Sensor => self.hil_sensor(state, time_usec),
            Channel::Gps => self.hil_gps(&state.sensors.gps, time_usec),
            Channel::State => self.hil_state(state, time_usec),
            Channel::RcInputs => {
                let rc = state.sensors.rc.ok_or(BridgeError::MissingState("rc inputs"))?;

                let mut fields = vec![("time_usec", Value::U64(time_usec)), ("rssi", Value::U8(rc.rssi))];
                fields.extend(RC_CHANNEL_FIELDS.iter().zip(rc.channels).map(|(name, v)| (*name, Value::U16(v))));

                self.message("HIL_RC_INPUTS_RAW", &fields)
            },
        }
    }

    fn hil_sensor(&self, state: &VehicleState, time_usec: u64) -> Result<Message, BridgeError> {
        let s = &state.sensors;
        let f = |v: f64| Value::F32(v as f32);

        self.message("HIL_SENSOR", &[
            ("time_usec", Value::U64(time_usec)),
            ("xacc", f(s.accel.x)),
            ("yacc", f(s.accel.y)),
            ("zacc", f(s.accel.z)),
            ("xgyro", f(s.gyro.x)),
            ("ygyro", f(s.gyro.y)),
            ("zgyro", f(s.gyro.z)),
            ("xmag", f(s.mag.x)),
            ("ymag", f(s.mag.y)),
            ("zmag", f(s.mag.z)),
            ("abs_pressure", f(s.abs_pressure)),
            ("diff_pressure", f(s.diff_pressure)),
            ("pressure_alt", f(s.pressure_alt)),
            ("temperature", f(s.temperature)),
            ("fields_updated", Value::U32(mav::SENSOR_FIELDS_ALL)),
        ])
    }

    fn hil_gps(&self, gps: &GpsReading, time_usec: u64) -> Result<Message, BridgeError> {
        let (lat, lon) = self.projector.reproject(gps.position.x, gps.position.y)?;
        let alt = self.config.reference_alt - gps.position.z;

        let v = gps.velocity;
        let ground_speed = v.x.hypot(v.y);
        let cog = v.y.atan2(v.x).to_degrees().rem_euclid(360.);

        self.message("HIL_GPS", &[
            ("time_usec", Value::U64(time_usec)),
            ("lat", Value::I32((lat * 1e7).round() as i32)),
            ("lon", Value::I32((lon * 1e7).round() as i32)),
            ("alt", Value::I32((alt * 1e3).round() as i32)),
            ("eph", Value::U16((gps.eph * 100.).round() as u16)),
            ("epv", Value::U16((gps.epv * 100.).round() as u16)),
            ("vel", Value::U16((ground_speed * 100.).round() as u16)),
            ("vn", Value::I16((v.x * 100.).round() as i16)),
            ("ve", Value::I16((v.y * 100.).round() as i16)),
            ("vd", Value::I16((v.z * 100.).round() as i16)),
            ("cog", Value::U16((cog * 100.).round() as u16)),
            ("fix_type", Value::U8(gps.fix_type)),
            ("satellites_visible", Value::U8(gps.satellites)),
        ])
    }

    fn hil_state(&self, state: &VehicleState, time_usec: u64) -> Result<Message, BridgeError> {
        let (lat, lon) = self.projector.reproject(state.position.x, state.position.y)?;
        let alt = self.config.reference_alt - state.position.z;

        // stored as (i, j, k, w); the wire order is (w, x, y, z)
        let q = &state.attitude.quaternion().coords;
        let quaternion = [q[3], q[0], q[1], q[2]].iter().map(|&c| Value::F32(c as f32)).collect();

        let w = state.angular_velocity;
        let v = state.velocity;
        let speed = (v.norm() * 100.).round() as u16;
        let mg = |a: f64| Value::I16((a / mav::STANDARD_GRAVITY * 1e3).round() as i16);

        self.message("HIL_STATE_QUATERNION", &[
            ("time_usec", Value::U64(time_usec)),
            ("attitude_quaternion", Value::Array(quaternion)),
            ("rollspeed", Value::F32(w.x as f32)),
            ("pitchspeed", Value::F32(w.y as f32)),
            ("yawspeed", Value::F32(w.z as f32)),
            ("lat", Value::I32((lat * 1e7).round() as i32)),
            ("lon", Value::I32((lon * 1e7).round() as i32)),
            ("alt", Value::I32((alt * 1e3).round() as i32)),
            ("vx", Value::I16((v.x * 100.).round() as i16)),
            ("vy", Value::I16((v.y * 100.).round() as i16)),
            ("vz", Value::I16((v.z * 100.).round() as i16)),
            ("ind_airspeed", Value::U16(speed)),
            ("true_airspeed", Value::U16(speed)),
            ("xacc", mg(state.sensors.accel.x)),
            ("yacc", mg(state.sensors.accel.y)),
            ("zacc", mg(state.sensors.accel.z)),
        ])
    }

    fn field<'m>(msg: &'m Message, def: &MessageDef, name: &'static str) -> Result<&'m Value, BridgeError> {
        msg.get(def, name).ok_or(BridgeError::Field {
            id:    msg.id,
            field: name,
        })
    }

    fn scalar(msg: &Message, def: &MessageDef, name: &'static str) -> Result<f64, BridgeError> {
        Self::field(msg, def, name)?.as_f64().ok_or(BridgeError::Field {
            id:    msg.id,
            field: name,
        })
    }

    fn update(msg: &Message, def: &MessageDef, controls: [f32; MAX_CONTROLS], count: usize) -> Result<ActuatorUpdate, BridgeError> {
        let time_usec = Self::scalar(msg, def, "time_usec")? as u64;
        let mode = Self::scalar(msg, def, "mode")? as u8;

        Ok(ActuatorUpdate {
            time_usec,
            controls,
            count,
            mode,
            armed: mode & mav::MODE_FLAG_SAFETY_ARMED != 0,
        })
    }

    fn hil_controls(&self, msg: &Message) -> Result<ActuatorUpdate, BridgeError> {
        let def = self.dictionary.layout_for(msg.id)?;
        let mut controls = [0.; MAX_CONTROLS];

        for (dst, name) in controls.iter_mut().zip(HIL_CONTROL_FIELDS) {
            *dst = Self::scalar(msg, def, name)? as f32;
        }

        Self::update(msg, def, controls, HIL_CONTROL_FIELDS.len())
    }

    fn hil_actuator_controls(&self, msg: &Message) -> Result<ActuatorUpdate, BridgeError> {
        let def = self.dictionary.layout_for(msg.id)?;
        let values = Self::field(msg, def, "controls")?.as_array().ok_or(BridgeError::Field {
            id:    msg.id,
            field: "controls",
        })?;

        let mut controls = [0.; MAX_CONTROLS];
        let count = values.len().min(MAX_CONTROLS);

        for (dst, value) in controls.iter_mut().zip(values) {
            *dst = value.as_f64().ok_or(BridgeError::Field {
                id:    msg.id,
                field: "controls",
            })? as f32;
        }

        Self::update(msg, def, controls, count)
    }
}

const RC_CHANNEL_FIELDS: [&str; 12] = [
    "chan1_raw",
    "chan2_raw",
    "chan3_raw",
    "chan4_raw",
    "chan5_raw",
    "chan6_raw",
    "chan7_raw",
    "chan8_raw",
    "chan9_raw",
    "chan10_raw",
    "chan11_raw",
    "chan12_raw",
];

#[cfg(test)]
mod test {
    use nalgebra::Vector3;

    use super::*;
    use crate::state::RcReading;

    const LAT: f64 = 47.397742;
    const LON: f64 = 8.545594;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn bridge(config: BridgeConfig) -> HilBridge {
        HilBridge::new(Dictionary::common(), GlobalPositionProjector::at(LAT, LON), config).unwrap()
    }

    fn only(channel: Channel, config: ChannelConfig) -> BridgeConfig {
        let mut channels = Channels {
            heartbeat:   ChannelConfig::disabled(),
            system_time: ChannelConfig::disabled(),
            sensor:      ChannelConfig::disabled(),
            gps:         ChannelConfig::disabled(),
            state:       ChannelConfig::disabled(),
            rc_inputs:   ChannelConfig::disabled(),
        };

        *match channel {
            Channel::Heartbeat => &mut channels.heartbeat,
            Channel::SystemTime => &mut channels.system_time,
            Channel::Sensor => &mut channels.sensor,
            Channel::Gps => &mut channels.gps,
            Channel::State => &mut channels.state,
            Channel::RcInputs => &mut channels.rc_inputs,
        } = config;

        BridgeConfig {
            channels,
            ..Default::default()
        }
    }

    fn gps_fields(bridge: &HilBridge, msg: &Message) -> (f64, f64, f64) {
        let def = bridge.dictionary.layout_for(ids::HIL_GPS).unwrap();
        let get = |name| msg.get(def, name).and_then(Value::as_f64).unwrap();

        (get("lat") / 1e7, get("lon") / 1e7, get("alt") / 1e3)
    }

    #[test]
    fn requires_initialized_projector() {
        let result = HilBridge::new(Dictionary::common(), GlobalPositionProjector::new(), BridgeConfig::default());
        assert_eq!(result.err(), Some(BridgeError::Projection(ProjectionError::NotInitialized)));
    }

    #[test]
    fn default_outputs_encode() -> eyre::Result<()> {
        let dict = Dictionary::common();
        let mut config = BridgeConfig::default();
        config.channels.state = ChannelConfig::default();
        config.channels.gps.start_delay = Duration::ZERO;

        let mut bridge = bridge(config);
        let mut state = VehicleState::default();
        state.velocity = Vector3::new(1., -2., 0.5);

        let out = bridge.produce_outbound(&state, ms(0))?;
        let got = out.iter().map(|m| m.id).collect::<Vec<_>>();
        assert_eq!(got, vec![ids::HEARTBEAT, ids::SYSTEM_TIME, ids::HIL_SENSOR, ids::HIL_GPS, ids::HIL_STATE_QUATERNION]);

        for msg in &out {
            assert_eq!(msg.header, Header::new(1, 51));
            hilrelay_message::encode(&dict, msg)?;
        }

        Ok(())
    }

    #[test]
    fn gps_start_delay() -> eyre::Result<()> {
        let mut bridge = bridge(only(Channel::Gps, ChannelConfig {
            start_delay: ms(200),
            ..Default::default()
        }));
        let state = VehicleState::default();

        for tick in 0..20u64 {
            let at = ms(tick * 50);
            let gps = bridge.produce_outbound(&state, at)?.iter().filter(|m| m.id == ids::HIL_GPS).count();

            assert_eq!(gps, if at < ms(200) { 0 } else { 1 }, "at {:?}", at);
        }

        Ok(())
    }

    #[test]
    fn gps_fix_from_local_position() -> eyre::Result<()> {
        let mut bridge = bridge(only(Channel::Gps, ChannelConfig::default()));

        let mut state = VehicleState::default();
        state.sensors.gps.position = Vector3::new(100., 0., -10.);

        let out = bridge.produce_outbound(&state, ms(0))?;
        let (lat, lon, alt) = gps_fields(&bridge, &out[0]);
        let (expect_lat, expect_lon) = GlobalPositionProjector::at(LAT, LON).reproject(100., 0.)?;

        assert!(lat > LAT);
        assert!((lat - expect_lat).abs() < 1e-7);
        assert!((lon - expect_lon).abs() < 1e-7);
        assert!((alt - 498.).abs() < 1e-3);

        Ok(())
    }

    #[test]
    fn gps_ignores_true_position() -> eyre::Result<()> {
        let mut bridge = bridge(only(Channel::Gps, ChannelConfig::default()));

        let mut state = VehicleState::default();
        state.position = Vector3::new(-500., 300., -50.);

        let out = bridge.produce_outbound(&state, ms(0))?;
        let (lat, lon, _) = gps_fields(&bridge, &out[0]);

        assert!((lat - LAT).abs() < 1e-6);
        assert!((lon - LON).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn gps_latency() -> eyre::Result<()> {
        let mut bridge = bridge(only(Channel::Gps, ChannelConfig {
            latency: ms(100),
            ..Default::default()
        }));
        let projector = GlobalPositionProjector::at(LAT, LON);

        let mut last = None;
        for tick in 0..=6u64 {
            let mut state = VehicleState::default();
            state.sensors.gps.position.x = (tick * 10) as f64;

            last = bridge.produce_outbound(&state, ms(tick * 50))?.pop();
        }

        // at 300 ms the fix reflects the 200 ms sample, x = 40
        let (lat, _, _) = gps_fields(&bridge, &last.unwrap());
        let (expect, _) = projector.reproject(40., 0.)?;
        assert!((lat - expect).abs() < 1e-7);

        Ok(())
    }

    #[test]
    fn rc_inputs_require_state() -> eyre::Result<()> {
        let mut bridge = bridge(only(Channel::RcInputs, ChannelConfig::default()));
        let mut state = VehicleState::default();

        assert_eq!(bridge.produce_outbound(&state, ms(0)), Err(BridgeError::MissingState("rc inputs")));

        state.sensors.rc = Some(RcReading {
            channels: [1500; 12],
            rssi:     255,
        });
        let out = bridge.produce_outbound(&state, ms(2))?;
        assert_eq!(out[0].id, ids::HIL_RC_INPUTS_RAW);

        Ok(())
    }

    #[test]
    fn actuator_controls() -> eyre::Result<()> {
        let dict = Dictionary::common();
        let bridge = bridge(BridgeConfig::default());

        let controls = (0..16).map(|i| Value::F32(i as f32 / 16.)).collect();
        let msg = dict.build("HIL_ACTUATOR_CONTROLS", Header::new(1, 1), &[
            ("time_usec", Value::U64(1234)),
            ("flags", Value::U64(0)),
            ("controls", Value::Array(controls)),
            ("mode", Value::U8(mav::MODE_FLAG_SAFETY_ARMED | mav::MODE_FLAG_HIL_ENABLED)),
        ])?;

        let update = bridge.consume_inbound(&msg).unwrap();
        assert_eq!(update.count, 16);
        assert_eq!(update.time_usec, 1234);
        assert!((update.controls[8] - 0.5).abs() < 1e-6);
        assert!(update.armed);

        Ok(())
    }

    #[test]
    fn hil_controls() -> eyre::Result<()> {
        let dict = Dictionary::common();
        let bridge = bridge(BridgeConfig::default());

        let mut fields = vec![("time_usec", Value::U64(0)), ("mode", Value::U8(0)), ("nav_mode", Value::U8(0))];
        fields.extend(HIL_CONTROL_FIELDS.iter().enumerate().map(|(i, name)| (*name, Value::F32(i as f32 * 0.1))));

        let msg = dict.build("HIL_CONTROLS", Header::new(1, 1), &fields)?;
        let update = bridge.consume_inbound(&msg).unwrap();

        assert_eq!(update.count, 8);
        assert!((update.controls[3] - 0.3).abs() < 1e-6);
        assert!(!update.armed);

        Ok(())
    }

    #[test]
    fn ignores_other_and_malformed() {
        let bridge = bridge(BridgeConfig::default());

        let heartbeat = Message::new(ids::HEARTBEAT, Header::new(1, 1), vec![]);
        assert_eq!(bridge.consume_inbound(&heartbeat), None);

        let short = Message::new(ids::HIL_ACTUATOR_CONTROLS, Header::new(1, 1), vec![Value::U64(0)]);
        assert_eq!(bridge.consume_inbound(&short), None);
    }

    #[test]
    fn mode_request_rate_limited() -> eyre::Result<()> {
        let dict = Dictionary::common();
        let mut bridge = bridge(only(Channel::Sensor, ChannelConfig::default()));
        let state = VehicleState::default();

        let heartbeat = |base_mode: u8| {
            dict.build("HEARTBEAT", Header::new(1, 1), &[
                ("custom_mode", Value::U32(0)),
                ("type", Value::U8(2)),
                ("autopilot", Value::U8(12)),
                ("base_mode", Value::U8(base_mode)),
                ("system_status", Value::U8(3)),
                ("mavlink_version", Value::U8(3)),
            ])
        };

        bridge.produce_outbound(&state, ms(0))?;
        let request = bridge.mode_request(&heartbeat(0x51)?).unwrap();

        let def = dict.layout_for(ids::COMMAND_LONG)?;
        assert_eq!(request.get(def, "command"), Some(&Value::U16(mav::CMD_DO_SET_MODE)));
        assert_eq!(request.get(def, "param1"), Some(&Value::F32(0x71 as f32)));
        assert_eq!(request.get(def, "target_component"), Some(&Value::U8(1)));

        bridge.produce_outbound(&state, ms(500))?;
        assert_eq!(bridge.mode_request(&heartbeat(0x51)?), None);

        bridge.produce_outbound(&state, ms(1000))?;
        assert!(bridge.mode_request(&heartbeat(0x51)?).is_some());

        bridge.produce_outbound(&state, ms(3000))?;
        assert_eq!(bridge.mode_request(&heartbeat(0x71)?), None);

        Ok(())
    }
}
