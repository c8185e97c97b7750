//! Layout-driven MAVLink v1 messages: a dictionary of message layouts and one
//! generic codec that serializes any message the dictionary describes.

pub mod common;
pub mod crc;
mod dictionary;
mod error;
pub mod frame;
pub mod header;
mod layout;
mod message;
mod value;

pub use common::ids;
pub use dictionary::Dictionary;
pub use error::{
    DecodeError,
    DictionaryError,
    EncodeError,
};
pub use frame::{
    decode,
    encode,
    encode_into,
};
pub use header::Header;
pub use layout::{
    FieldDef,
    MessageDef,
    Primitive,
};
pub use message::Message;
pub use value::Value;
