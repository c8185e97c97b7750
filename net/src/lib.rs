pub use datagram::{
    DatagramOps,
    DatagramReceiver,
    DatagramSender,
};
pub use peer::{
    Peer,
    PeerMode,
};

mod datagram;
mod peer;

/// Largest datagram a port expects to read.
pub const MAX_DATAGRAM: usize = 2048;
