pub use ::tokio_util::codec as tokio_codec;

mod encoder;
mod frame_stream;

pub use self::{
    encoder::FrameEncoder,
    frame_stream::{
        Feed,
        Frame,
        FrameStream,
        Malformed,
        State,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] hilrelay_message::EncodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
