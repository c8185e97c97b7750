use message::Message;

use crate::{
    Connection,
    Endpoint,
};

/// The set of connections. A message is offered to every connection its
/// source belongs to; each relays it independently.
#[derive(Debug, Default)]
pub struct Router {
    connections: Vec<Connection>,
}

impl Router {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            connections,
        }
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    #[inline]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns whether the bridge should see the message.
    pub fn dispatch(&self, from: Endpoint, message: &Message) -> bool {
        let mut to_bridge = false;

        for connection in self.connections.iter().filter(|c| c.contains(from)) {
            to_bridge |= connection.on_message_received(from, message);
        }

        to_bridge
    }
}
