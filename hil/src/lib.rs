//! Hardware-in-the-loop translation: simulated vehicle state to HIL telemetry,
//! autopilot actuator outputs back to the vehicle.

mod bridge;
mod channel;
pub mod mav;
mod projector;
mod scheduler;
mod state;

pub use bridge::{
    BridgeConfig,
    BridgeError,
    Channel,
    Channels,
    HilBridge,
};
pub use channel::{
    ChannelConfig,
    DelayLine,
};
pub use projector::{
    GlobalPositionProjector,
    ProjectionError,
    EARTH_RADIUS,
};
pub use scheduler::{
    Scheduler,
    SchedulerConfig,
    Tick,
};
pub use state::{
    ActuatorInputs,
    ActuatorUpdate,
    GpsReading,
    RcReading,
    SensorReadings,
    VehicleModel,
    VehicleState,
    MAX_CONTROLS,
};
