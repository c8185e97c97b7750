use std::sync::Arc;

use bytes::{
    Buf,
    Bytes,
    BytesMut,
};
use hilrelay_message::{
    frame::{
        frame_len,
        HEADER_LEN,
        MAX_PAYLOAD_LEN,
        STX,
    },
    DecodeError,
    Dictionary,
    Message,
};
use tokio_util::codec::Decoder;

use crate::Error;

/// Parser position within the current candidate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    SeekStx,
    ReadHeader,
    ReadPayload { len: usize },
    ReadCrc { len: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Malformed {
    pub error: DecodeError,
    pub raw:   Bytes,
}

/// Output of the parser. Malformed frames are reported in-band so a corrupt
/// frame never terminates the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Valid(Message),
    Malformed(Malformed),
}

/// Incremental MAVLink v1 frame parser.
///
/// Usable as a [`Decoder`] under `FramedRead`, or directly through [`FrameStream::feed`]
/// for transports that deliver discrete buffers.
#[derive(Debug)]
pub struct FrameStream {
    dictionary:  Arc<Dictionary>,
    state:       State,
    max_payload: usize,
    pending:     BytesMut,
}

impl FrameStream {
    #[inline]
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self::with_max_payload(dictionary, MAX_PAYLOAD_LEN)
    }

    pub fn with_max_payload(dictionary: Arc<Dictionary>, max_payload: usize) -> Self {
        Self {
            dictionary,
            state: State::SeekStx,
            max_payload: max_payload.min(MAX_PAYLOAD_LEN),
            pending: BytesMut::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Append `bytes` and iterate the frames they complete. Frames are parsed
    /// lazily; unconsumed input stays buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Feed<'_> {
        self.pending.extend_from_slice(bytes);
        Feed {
            stream: self,
        }
    }

    /// End of input: report any buffered partial frame as truncated.
    pub fn finish(&mut self) -> Option<Frame> {
        let mut pending = std::mem::take(&mut self.pending);
        let result = self.flush(&mut pending);
        self.pending = pending;
        result
    }

    fn next_buffered(&mut self) -> Option<Frame> {
        let mut pending = std::mem::take(&mut self.pending);
        let result = self.step(&mut pending);
        self.pending = pending;
        result
    }

    fn step(&mut self, src: &mut BytesMut) -> Option<Frame> {
        loop {
            match self.state {
                State::SeekStx => match src.iter().position(|&b| b == STX) {
                    Some(idx) => {
                        if idx > 0 {
                            tracing::trace!(skipped = idx, "seeking start of frame");
                        }

                        src.advance(idx);
                        self.state = State::ReadHeader;
                    },
                    None => {
                        src.clear();
                        return None;
                    },
                },
                State::ReadHeader => {
                    if src.len() < HEADER_LEN {
                        return None;
                    }

                    let len = src[1] as usize;
                    if len > self.max_payload {
                        // only the start byte is discarded; it may have been payload
                        let raw = Bytes::copy_from_slice(&src[..HEADER_LEN]);
                        src.advance(1);
                        self.state = State::SeekStx;

                        return Some(Frame::Malformed(Malformed {
                            error: DecodeError::Oversized {
                                len,
                                max: self.max_payload,
                            },
                            raw,
                        }));
                    }

                    // a length that disagrees with a known layout marks a corrupt header;
                    // only the start byte is dropped
                    let id = src[5];
                    if let Ok(def) = self.dictionary.layout_for(id) {
                        let expected = def.payload_len();

                        if len != expected {
                            let raw = Bytes::copy_from_slice(&src[..HEADER_LEN]);
                            src.advance(1);
                            self.state = State::SeekStx;

                            return Some(Frame::Malformed(Malformed {
                                error: DecodeError::PayloadLength {
                                    id,
                                    expected,
                                    actual: len,
                                },
                                raw,
                            }));
                        }
                    }

                    self.state = State::ReadPayload {
                        len,
                    };
                },
                State::ReadPayload {
                    len,
                } => {
                    if src.len() < HEADER_LEN + len {
                        return None;
                    }

                    self.state = State::ReadCrc {
                        len,
                    };
                },
                State::ReadCrc {
                    len,
                } => {
                    let total = frame_len(len);
                    if src.len() < total {
                        return None;
                    }

                    let raw = src.split_to(total).freeze();
                    self.state = State::SeekStx;

                    return Some(self.emit(raw));
                },
            }
        }
    }

    fn emit(&self, raw: Bytes) -> Frame {
        match hilrelay_message::decode(&self.dictionary, &raw) {
            Ok(msg) => Frame::Valid(msg),
            Err(error) => {
                tracing::debug!(%error, raw = %hex::encode(&raw), "malformed frame");
                Frame::Malformed(Malformed {
                    error,
                    raw,
                })
            },
        }
    }

    fn flush(&mut self, src: &mut BytesMut) -> Option<Frame> {
        if let Some(frame) = self.step(src) {
            return Some(frame);
        }

        if self.state == State::SeekStx || src.is_empty() {
            return None;
        }

        let expected = match self.state {
            State::ReadPayload {
                len,
            }
            | State::ReadCrc {
                len,
            } => frame_len(len),
            _ => HEADER_LEN,
        };

        let raw = src.split().freeze();
        self.state = State::SeekStx;

        Some(Frame::Malformed(Malformed {
            error: DecodeError::TruncatedFrame {
                expected,
                actual: raw.len(),
            },
            raw,
        }))
    }
}

impl Decoder for FrameStream {
    type Error = Error;
    type Item = Frame;

    #[inline]
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.step(src))
    }

    #[inline]
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.flush(src))
    }
}

/// Frames completed by the input given to [`FrameStream::feed`].
pub struct Feed<'a> {
    stream: &'a mut FrameStream,
}

impl Iterator for Feed<'_> {
    type Item = Frame;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next_buffered()
    }
}
