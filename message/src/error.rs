#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected start byte 0xfe, found {0:#04x}")]
    MissingStx(u8),

    #[error("truncated frame: expected {expected} bytes, have {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    #[error("declared payload length {len} exceeds maximum {max}")]
    Oversized { len: usize, max: usize },

    #[error("unknown message id {0}")]
    UnknownMessageId(u8),

    #[error("crc mismatch for message {id}: frame carries {received:#06x}, computed {computed:#06x}")]
    CrcMismatch { id: u8, received: u16, computed: u16 },

    #[error("payload length mismatch for message {id}: expected {expected}, frame declares {actual}")]
    PayloadLength { id: u8, expected: usize, actual: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("unknown message id {0}")]
    UnknownMessageId(u8),

    #[error("unknown message {0:?}")]
    UnknownMessageName(String),

    #[error("duplicate definition for message id {0}")]
    DuplicateId(u8),

    #[error("{name}: declared crc_extra {declared} but layout yields {computed}")]
    CrcExtraMismatch { name: String, declared: u8, computed: u8 },

    #[error("{name}: payload of {len} bytes does not fit a frame")]
    PayloadTooLong { name: String, len: usize },

    #[error("{message}: missing field {field:?}")]
    MissingField { message: String, field: String },

    #[error("{message}: no field named {field:?}")]
    UnknownField { message: String, field: String },

    #[error("{message}: value for {field:?} does not match its declared type")]
    FieldType { message: String, field: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error("message {id}: expected {expected} fields, got {actual}")]
    FieldCount { id: u8, expected: usize, actual: usize },

    #[error("message {id}: value for {field:?} does not match its declared type")]
    FieldType { id: u8, field: String },
}
