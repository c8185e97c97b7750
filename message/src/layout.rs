use std::fmt::{
    Display,
    Formatter,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    crc::Crc16,
    Value,
};

/// Wire primitive of a single field element. Serialized with the C type names
/// used by MAVLink definition files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    #[serde(rename = "uint8_t")]
    U8,
    #[serde(rename = "int8_t")]
    I8,
    #[serde(rename = "uint16_t")]
    U16,
    #[serde(rename = "int16_t")]
    I16,
    #[serde(rename = "uint32_t")]
    U32,
    #[serde(rename = "int32_t")]
    I32,
    #[serde(rename = "uint64_t")]
    U64,
    #[serde(rename = "int64_t")]
    I64,
    #[serde(rename = "float")]
    F32,
    #[serde(rename = "double")]
    F64,
    #[serde(rename = "char")]
    Char,
}

impl Primitive {
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Primitive::U8 | Primitive::I8 | Primitive::Char => 1,
            Primitive::U16 | Primitive::I16 => 2,
            Primitive::U32 | Primitive::I32 | Primitive::F32 => 4,
            Primitive::U64 | Primitive::I64 | Primitive::F64 => 8,
        }
    }

    pub const fn c_type(self) -> &'static str {
        match self {
            Primitive::U8 => "uint8_t",
            Primitive::I8 => "int8_t",
            Primitive::U16 => "uint16_t",
            Primitive::I16 => "int16_t",
            Primitive::U32 => "uint32_t",
            Primitive::I32 => "int32_t",
            Primitive::U64 => "uint64_t",
            Primitive::I64 => "int64_t",
            Primitive::F32 => "float",
            Primitive::F64 => "double",
            Primitive::Char => "char",
        }
    }

    /// Byte-sized primitives are carried as [`Value::Bytes`] when they form an array.
    #[inline]
    pub const fn is_byte(self) -> bool {
        matches!(self, Primitive::U8 | Primitive::I8 | Primitive::Char)
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.c_type())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: Primitive,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_len: Option<u8>,
}

impl FieldDef {
    pub fn scalar(name: impl Into<String>, ty: Primitive) -> Self {
        Self {
            name: name.into(),
            ty,
            array_len: None,
        }
    }

    pub fn array(name: impl Into<String>, ty: Primitive, len: u8) -> Self {
        Self {
            name: name.into(),
            ty,
            array_len: Some(len),
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.array_len.map_or(1, usize::from)
    }

    /// Number of payload bytes this field occupies.
    #[inline]
    pub fn width(&self) -> usize {
        self.ty.size() * self.count()
    }

    /// Whether `value` has the shape this field serializes.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.array_len, value) {
            (None, value) => value.primitive() == Some(self.ty),
            (Some(len), Value::Bytes(bytes)) => self.ty.is_byte() && bytes.len() <= len as usize,
            (Some(len), Value::Array(values)) => {
                values.len() == len as usize && values.iter().all(|v| v.primitive() == Some(self.ty))
            },
            _ => false,
        }
    }
}

/// Layout of one message: fields in wire order (MAVLink v1 sorts them by
/// descending element size; definitions here are already in that order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDef {
    pub id:        u8,
    pub name:      String,
    pub crc_extra: u8,
    pub fields:    Vec<FieldDef>,
}

impl MessageDef {
    pub fn new(id: u8, name: impl Into<String>, crc_extra: u8, fields: Vec<FieldDef>) -> Self {
        Self {
            id,
            name: name.into(),
            crc_extra,
            fields,
        }
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.fields.iter().map(FieldDef::width).sum()
    }

    /// Fields with their byte offsets into the payload.
    pub fn offsets(&self) -> impl Iterator<Item = (usize, &FieldDef)> + '_ {
        self.fields.iter().scan(0, |offset, field| {
            let at = *offset;
            *offset += field.width();
            Some((at, field))
        })
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Derive the CRC seed from the message name and field signature.
    pub fn compute_crc_extra(&self) -> u8 {
        let mut crc = Crc16::new();

        crc.update(self.name.as_bytes());
        crc.update(b" ");

        for field in &self.fields {
            crc.update(field.ty.c_type().as_bytes());
            crc.update(b" ");
            crc.update(field.name.as_bytes());
            crc.update(b" ");

            if let Some(len) = field.array_len {
                crc.update(&[len]);
            }
        }

        let crc = crc.finish();
        ((crc & 0xff) ^ (crc >> 8)) as u8
    }
}
