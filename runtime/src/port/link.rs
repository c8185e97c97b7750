use std::sync::Arc;

use futures::stream::BoxStream;
use hilrelay_codec::Frame;
use message::Dictionary;

use super::{
    serial,
    udp,
    PortConfig,
    PortError,
};

/// Write half of an open transport. One call writes one whole frame.
#[async_trait::async_trait]
pub trait FrameSink: Send {
    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), PortError>;
}

/// An open transport: decoded inbound frames plus a sink for outbound ones.
pub struct Link {
    pub frames: BoxStream<'static, Result<Frame, PortError>>,
    pub sink:   Box<dyn FrameSink>,
}

impl Link {
    pub async fn open(config: &PortConfig, dictionary: Arc<Dictionary>) -> Result<Link, PortError> {
        match config {
            PortConfig::Serial(serial) => serial::open(serial, dictionary).await,
            PortConfig::Udp(udp) => udp::open(udp, dictionary).await,
        }
    }
}
