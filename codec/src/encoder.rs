use std::sync::Arc;

use bytes::BytesMut;
use hilrelay_message::{
    Dictionary,
    Message,
};
use tokio_util::codec::Encoder;

use crate::Error;

/// Encodes messages for one port, stamping the port's own sequence counter.
///
/// The counter advances only when a frame is actually produced.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    dictionary: Arc<Dictionary>,
    sequence:   u8,
}

impl FrameEncoder {
    #[inline]
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            sequence: 0,
        }
    }

    /// Sequence number the next frame will carry.
    #[inline]
    pub fn sequence(&self) -> u8 {
        self.sequence
    }
}

impl Encoder<Message> for FrameEncoder {
    type Error = Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let item = item.with_sequence(self.sequence);
        hilrelay_message::encode_into(&self.dictionary, &item, dst)?;

        self.sequence = self.sequence.wrapping_add(1);
        Ok(())
    }
}
