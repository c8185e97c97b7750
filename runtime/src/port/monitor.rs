use std::{
    fmt,
    sync::Arc,
};

use fnv::FnvHashSet;
use message::Message;

/// Receives inbound messages a [`Monitor`] lets through.
pub trait MonitorSink: Send + Sync {
    fn observe(&self, port: &str, message: &Message);
}

/// Logs observed messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMonitor;

impl MonitorSink for TracingMonitor {
    fn observe(&self, port: &str, message: &Message) {
        tracing::info!(port, msg_id = message.id, %message, "monitor");
    }
}

/// Pass-through tap on inbound traffic, filtered by message id. An empty
/// filter matches everything.
#[derive(Clone)]
pub struct Monitor {
    filter: FnvHashSet<u8>,
    sink:   Arc<dyn MonitorSink>,
}

impl Monitor {
    pub fn new(filter: impl IntoIterator<Item = u8>, sink: Arc<dyn MonitorSink>) -> Self {
        Self {
            filter: filter.into_iter().collect(),
            sink,
        }
    }

    pub fn tracing(filter: impl IntoIterator<Item = u8>) -> Self {
        Self::new(filter, Arc::new(TracingMonitor))
    }

    #[inline]
    pub fn matches(&self, id: u8) -> bool {
        self.filter.is_empty() || self.filter.contains(&id)
    }

    #[inline]
    pub fn observe(&self, port: &str, message: &Message) {
        if self.matches(message.id) {
            self.sink.observe(port, message);
        }
    }
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor").field("filter", &self.filter).finish_non_exhaustive()
    }
}
