use nalgebra::{
    UnitQuaternion,
    Vector3,
};

pub const MAX_CONTROLS: usize = 16;

/// Vehicle state produced by the physics step. Frames: position, velocity and
/// acceleration are local NED; rates and sensor vectors are body FRD.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    pub position:         Vector3<f64>,
    pub velocity:         Vector3<f64>,
    pub acceleration:     Vector3<f64>,
    pub attitude:         UnitQuaternion<f64>,
    pub angular_velocity: Vector3<f64>,
    pub sensors:          SensorReadings,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position:         Vector3::zeros(),
            velocity:         Vector3::zeros(),
            acceleration:     Vector3::zeros(),
            attitude:         UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
            sensors:          SensorReadings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReadings {
    /// Specific force, m/s².
    pub accel: Vector3<f64>,
    /// rad/s
    pub gyro: Vector3<f64>,
    /// gauss
    pub mag: Vector3<f64>,
    /// hPa
    pub abs_pressure: f64,
    /// hPa
    pub diff_pressure: f64,
    /// m
    pub pressure_alt: f64,
    /// °C
    pub temperature: f64,
    /// Reported as HIL_GPS in place of the true position, so it may carry
    /// noise or lag.
    pub gps: GpsReading,
    pub rc:  Option<RcReading>,
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            accel:         Vector3::new(0., 0., -crate::mav::STANDARD_GRAVITY),
            gyro:          Vector3::zeros(),
            mag:           Vector3::new(0.21, 0.0, 0.42),
            abs_pressure:  1013.25,
            diff_pressure: 0.,
            pressure_alt:  0.,
            temperature:   15.,
            gps:           GpsReading::default(),
            rc:            None,
        }
    }
}

/// GPS solution in local coordinates; the bridge converts it to a geodetic fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsReading {
    pub position:   Vector3<f64>,
    pub velocity:   Vector3<f64>,
    /// Horizontal dilution, m.
    pub eph:        f64,
    /// Vertical dilution, m.
    pub epv:        f64,
    pub fix_type:   u8,
    pub satellites: u8,
}

impl Default for GpsReading {
    fn default() -> Self {
        Self {
            position:   Vector3::zeros(),
            velocity:   Vector3::zeros(),
            eph:        1.,
            epv:        1.,
            fix_type:   crate::mav::GPS_FIX_3D,
            satellites: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RcReading {
    pub channels: [u16; 12],
    pub rssi:     u8,
}

/// Normalized actuator outputs from the autopilot, applied to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorInputs {
    pub controls: [f64; MAX_CONTROLS],
    pub mode:     u8,
    pub armed:    bool,
}

impl ActuatorInputs {
    pub fn apply(&mut self, update: &ActuatorUpdate) {
        for (dst, src) in self.controls.iter_mut().zip(update.controls.iter().take(update.count)) {
            *dst = *src as f64;
        }

        self.mode = update.mode;
        self.armed = update.armed;
    }
}

/// One inbound control message, decoded. Only the first `count` controls are
/// meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorUpdate {
    pub time_usec: u64,
    pub controls:  [f32; MAX_CONTROLS],
    pub count:     usize,
    pub mode:      u8,
    pub armed:     bool,
}

/// The vehicle/environment simulation consumed by the bridge.
pub trait VehicleModel: Send {
    fn step(&mut self, dt: std::time::Duration, inputs: &ActuatorInputs) -> VehicleState;
}
