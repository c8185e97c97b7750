//! A minimal vehicle for running the bridge without an external simulator.

use std::time::Duration;

use hil::{
    mav::STANDARD_GRAVITY,
    ActuatorInputs,
    SensorReadings,
    VehicleModel,
    VehicleState,
};
use nalgebra::{
    UnitQuaternion,
    Vector3,
};

const SEA_LEVEL_PRESSURE: f64 = 1013.25;
const SEA_LEVEL_TEMPERATURE: f64 = 15.;
const LAPSE_RATE: f64 = 0.0065;

/// Earth field near the default reference point, gauss, NED.
fn magnetic_field() -> Vector3<f64> {
    Vector3::new(0.21523, 0.00771, 0.42741)
}

/// Level point mass pushed up by the mean of the first four controls.
#[derive(Debug, Clone)]
pub struct PointMass {
    /// kg
    pub mass:          f64,
    /// N at full throttle.
    pub max_thrust:    f64,
    /// Linear drag coefficient, N per m/s.
    pub drag:          f64,
    /// Altitude of the local origin, m above mean sea level.
    pub reference_alt: f64,

    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

impl PointMass {
    pub fn new(reference_alt: f64) -> Self {
        Self {
            mass: 0.8,
            max_thrust: 4. * 4.,
            drag: 0.05,
            reference_alt,
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
        }
    }

    fn thrust(&self, inputs: &ActuatorInputs) -> f64 {
        if !inputs.armed {
            return 0.;
        }

        let mean = inputs.controls[..4].iter().sum::<f64>() / 4.;
        mean.clamp(0., 1.) * self.max_thrust
    }

    fn state(&self, acceleration: Vector3<f64>) -> VehicleState {
        let alt = self.reference_alt - self.position.z;
        let temperature = SEA_LEVEL_TEMPERATURE - LAPSE_RATE * alt;
        let abs_pressure = SEA_LEVEL_PRESSURE * (1. - 2.25577e-5 * alt).powf(5.25588);

        let mut sensors = SensorReadings {
            accel: acceleration - Vector3::new(0., 0., STANDARD_GRAVITY),
            gyro: Vector3::zeros(),
            mag: magnetic_field(),
            abs_pressure,
            pressure_alt: alt,
            temperature,
            ..Default::default()
        };

        sensors.gps.position = self.position;
        sensors.gps.velocity = self.velocity;

        VehicleState {
            position: self.position,
            velocity: self.velocity,
            acceleration,
            attitude: UnitQuaternion::identity(),
            angular_velocity: Vector3::zeros(),
            sensors,
        }
    }
}

impl VehicleModel for PointMass {
    fn step(&mut self, dt: Duration, inputs: &ActuatorInputs) -> VehicleState {
        let dt = dt.as_secs_f64();
        if dt <= 0. {
            return self.state(Vector3::zeros());
        }

        let force = Vector3::new(0., 0., self.mass * STANDARD_GRAVITY - self.thrust(inputs)) - self.velocity * self.drag;
        let before = self.velocity;

        self.velocity += force / self.mass * dt;
        self.position += self.velocity * dt;

        // ground contact: down is +z
        if self.position.z > 0. {
            self.position.z = 0.;
            self.velocity = Vector3::zeros();
        }

        self.state((self.velocity - before) / dt)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(vehicle: &mut PointMass, inputs: &ActuatorInputs, seconds: u64) -> VehicleState {
        let dt = Duration::from_millis(2);
        let mut state = vehicle.step(Duration::ZERO, inputs);

        for _ in 0..(seconds * 500) {
            state = vehicle.step(dt, inputs);
        }

        state
    }

    #[test]
    fn rests_on_ground() {
        let mut vehicle = PointMass::new(488.);
        let state = run(&mut vehicle, &ActuatorInputs::default(), 1);

        assert_eq!(state.position, Vector3::zeros());
        assert!((state.sensors.accel.z + STANDARD_GRAVITY).abs() < 1e-9);
        assert!((state.sensors.pressure_alt - 488.).abs() < 1e-9);
    }

    #[test]
    fn climbs_under_thrust() {
        let mut vehicle = PointMass::new(488.);
        let resting = vehicle.step(Duration::ZERO, &ActuatorInputs::default());

        let mut inputs = ActuatorInputs {
            armed: true,
            ..Default::default()
        };
        inputs.controls[..4].copy_from_slice(&[0.9; 4]);

        let state = run(&mut vehicle, &inputs, 2);

        assert!(state.position.z < -1.);
        assert!(state.velocity.z < 0.);
        assert!(state.sensors.abs_pressure < resting.sensors.abs_pressure);
        assert_eq!(state.sensors.gps.position, state.position);
    }

    #[test]
    fn disarmed_ignores_throttle() {
        let mut vehicle = PointMass::new(0.);

        let mut inputs = ActuatorInputs::default();
        inputs.controls[..4].copy_from_slice(&[1.; 4]);

        let state = run(&mut vehicle, &inputs, 1);
        assert_eq!(state.position.z, 0.);
    }
}
