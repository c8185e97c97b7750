//! Actor runtime: ports, fan-out connections and the hub that drives the
//! simulation.

mod connection;
mod hub;
pub mod port;
mod router;
mod signals;

pub use connection::{
    Connection,
    Endpoint,
};
pub use hub::{
    ConnectionSetup,
    GetActuators,
    Hub,
    HubSetup,
    PortSetup,
};
pub use router::Router;
pub use signals::{
    Signal,
    Term,
};
