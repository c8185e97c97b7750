use bytes::Bytes;

use super::{
    FrameSink,
    PortError,
};

/// Starts the PX4 MAVLink instance on a NuttX USB console.
pub const PX4_USB_HANDSHAKE: &[u8] = b"\nsh /etc/init.d/rc.usb\n";

/// Runs once after a port's transport opens, before any traffic.
#[async_trait::async_trait]
pub trait OpenHook: Send + Sync {
    async fn on_open(&self, sink: &mut dyn FrameSink) -> Result<(), PortError>;
}

/// Writes fixed bytes on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRaw(pub Bytes);

impl SendRaw {
    pub fn px4_usb() -> Self {
        SendRaw(Bytes::from_static(PX4_USB_HANDSHAKE))
    }
}

#[async_trait::async_trait]
impl OpenHook for SendRaw {
    #[tracing::instrument(skip_all, fields(bytes = %hex::encode(&self.0)))]
    async fn on_open(&self, sink: &mut dyn FrameSink) -> Result<(), PortError> {
        tracing::debug!("sending open handshake");
        sink.write_frame(&self.0).await
    }
}
