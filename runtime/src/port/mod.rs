//! Transports. Each port is an actor owning one serial device or UDP socket;
//! the rest of the runtime only ever sees a [`Port`] handle.

use std::{
    fmt,
    io,
    sync::{
        atomic::{
            AtomicU64,
            Ordering,
        },
        Arc,
    },
    time::Duration,
};

use message::Message;
use tokio::sync::mpsc::{
    self,
    error::TrySendError,
};

mod actor;
mod config;
mod hook;
mod link;
mod monitor;
mod serial;
mod udp;

pub use self::{
    actor::PortActor,
    config::{
        PortConfig,
        SerialConfig,
        UdpConfig,
    },
    hook::{
        OpenHook,
        SendRaw,
        PX4_USB_HANDSHAKE,
    },
    link::{
        FrameSink,
        Link,
    },
    monitor::{
        Monitor,
        MonitorSink,
        TracingMonitor,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display(fmt = "#{}", _0)]
pub struct PortId(pub usize);

#[derive(thiserror::Error, Debug)]
pub enum PortError {
    #[error("opening {name}: {source}")]
    Open {
        name:   String,
        #[source]
        source: io::Error,
    },

    #[error("sending: {0}")]
    Send(#[source] io::Error),

    #[error("receiving: {0}")]
    Receive(#[source] io::Error),

    #[error(transparent)]
    Codec(#[from] hilrelay_codec::Error),

    #[error("write did not complete within {0:?}")]
    Timeout(Duration),

    #[error("outbound queue full")]
    QueueFull,

    #[error("port closed")]
    Closed,
}

/// Send side of a port as seen by connections.
pub trait Port: Send + Sync {
    fn id(&self) -> PortId;
    fn name(&self) -> &str;

    /// Queue `message` for transmission. Never blocks.
    fn send(&self, message: &Message) -> Result<(), PortError>;
}

#[derive(Debug, Default)]
pub struct PortStats {
    pub frames:           AtomicU64,
    pub malformed:        AtomicU64,
    pub sent:             AtomicU64,
    pub dropped_outbound: AtomicU64,
}

impl PortStats {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

impl fmt::Display for PortStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frames={} malformed={} sent={} dropped_outbound={}",
            Self::get(&self.frames),
            Self::get(&self.malformed),
            Self::get(&self.sent),
            Self::get(&self.dropped_outbound),
        )
    }
}

/// Handle to a running [`PortActor`]: a bounded queue into its writer task.
#[derive(Clone)]
pub struct PortHandle {
    id:    PortId,
    name:  Arc<str>,
    tx:    mpsc::Sender<Message>,
    stats: Arc<PortStats>,
}

impl PortHandle {
    pub(crate) fn new(id: PortId, name: Arc<str>, capacity: usize, stats: Arc<PortStats>) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));

        (
            Self {
                id,
                name,
                tx,
                stats,
            },
            rx,
        )
    }

    #[inline]
    pub fn stats(&self) -> &PortStats {
        &self.stats
    }
}

impl fmt::Debug for PortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortHandle").field("id", &self.id).field("name", &self.name).finish()
    }
}

impl Port for PortHandle {
    #[inline]
    fn id(&self) -> PortId {
        self.id
    }

    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, message: &Message) -> Result<(), PortError> {
        match self.tx.try_send(message.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                PortStats::bump(&self.stats.dropped_outbound);
                Err(PortError::QueueFull)
            },
            Err(TrySendError::Closed(_)) => Err(PortError::Closed),
        }
    }
}

/// A message read from a port, for the hub.
#[derive(Debug, Clone, actix::Message)]
#[rtype(result = "()")]
pub struct Inbound {
    pub port:    PortId,
    pub message: Message,
}

/// Sent by a port actor as it stops. `error` is set when a transport failure
/// caused the stop.
#[derive(Debug, actix::Message)]
#[rtype(result = "()")]
pub struct PortClosed {
    pub port:  PortId,
    pub name:  Arc<str>,
    pub error: Option<PortError>,
}

/// Ask a port actor to close its transport and stop.
#[derive(Debug, Clone, Copy, actix::Message)]
#[rtype(result = "()")]
pub struct Close;
