use std::{
    fmt,
    sync::Arc,
};

use fnv::FnvHashSet;
use message::Message;

use crate::port::{
    Port,
    PortError,
    PortId,
};

/// Where a message entered the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Endpoint {
    #[display(fmt = "port {}", _0)]
    Port(PortId),

    /// The HIL bridge inside the hub.
    #[display(fmt = "bridge")]
    Bridge,
}

/// A fan-out group: whatever one member sends, every other member receives,
/// except for suppressed message ids. The bridge may be a member alongside
/// the ports.
pub struct Connection {
    name:       String,
    ports:      Vec<Arc<dyn Port>>,
    suppressed: FnvHashSet<u8>,
    bridge:     bool,
}

impl Connection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:       name.into(),
            ports:      vec![],
            suppressed: FnvHashSet::default(),
            bridge:     false,
        }
    }

    /// Include the HIL bridge as a member.
    pub fn with_bridge(mut self) -> Self {
        self.bridge = true;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_port(&mut self, port: Arc<dyn Port>) {
        self.ports.push(port);
    }

    pub fn add_suppressed_message(&mut self, id: u8) {
        self.suppressed.insert(id);
    }

    #[inline]
    pub fn is_suppressed(&self, id: u8) -> bool {
        self.suppressed.contains(&id)
    }

    pub fn contains(&self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Port(id) => self.ports.iter().any(|p| p.id() == id),
            Endpoint::Bridge => self.bridge,
        }
    }

    /// Relay `message` from `from` to every other member. Returns whether the
    /// bridge is one of the recipients.
    pub fn on_message_received(&self, from: Endpoint, message: &Message) -> bool {
        if self.is_suppressed(message.id) {
            tracing::trace!(connection = %self.name, msg_id = message.id, "suppressed");
            return false;
        }

        for port in self.ports.iter().filter(|p| Endpoint::Port(p.id()) != from) {
            match port.send(message) {
                Ok(()) => {},
                Err(PortError::QueueFull) => {
                    tracing::debug!(connection = %self.name, port = port.name(), msg_id = message.id, "outbound queue full, dropping")
                },
                Err(e) => {
                    tracing::warn!(connection = %self.name, port = port.name(), error = %e, "send failed")
                },
            }
        }

        self.bridge && from != Endpoint::Bridge
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name)
            .field("ports", &self.ports.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("suppressed", &self.suppressed)
            .field("bridge", &self.bridge)
            .finish()
    }
}
