use bytes::{
    Buf,
    BufMut,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    FieldDef,
    Primitive,
};

/// A decoded field value. Byte-sized arrays (`char[N]`, `uint8_t[N]`) are carried
/// as raw bytes; other arrays element by element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    #[from(ignore)]
    Char(u8),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
}

impl Value {
    /// Primitive of a scalar value; `None` for arrays.
    pub fn primitive(&self) -> Option<Primitive> {
        Some(match self {
            Value::U8(_) => Primitive::U8,
            Value::I8(_) => Primitive::I8,
            Value::U16(_) => Primitive::U16,
            Value::I16(_) => Primitive::I16,
            Value::U32(_) => Primitive::U32,
            Value::I32(_) => Primitive::I32,
            Value::U64(_) => Primitive::U64,
            Value::I64(_) => Primitive::I64,
            Value::F32(_) => Primitive::F32,
            Value::F64(_) => Primitive::F64,
            Value::Char(_) => Primitive::Char,
            Value::Bytes(_) | Value::Array(_) => return None,
        })
    }

    /// Numeric view of a scalar, widening as needed.
    pub fn as_f64(&self) -> Option<f64> {
        Some(match *self {
            Value::U8(v) | Value::Char(v) => v as f64,
            Value::I8(v) => v as f64,
            Value::U16(v) => v as f64,
            Value::I16(v) => v as f64,
            Value::U32(v) => v as f64,
            Value::I32(v) => v as f64,
            Value::U64(v) => v as f64,
            Value::I64(v) => v as f64,
            Value::F32(v) => v as f64,
            Value::F64(v) => v,
            Value::Bytes(_) | Value::Array(_) => return None,
        })
    }

    /// Unsigned integer view; `None` for signed, float and array values.
    pub fn as_u64(&self) -> Option<u64> {
        Some(match *self {
            Value::U8(v) | Value::Char(v) => v as u64,
            Value::U16(v) => v as u64,
            Value::U32(v) => v as u64,
            Value::U64(v) => v,
            _ => return None,
        })
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text of a char array, up to the first NUL.
    pub fn as_text(&self) -> Option<String> {
        let bytes = self.as_bytes()?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());

        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Build a char array value from text; the encoder pads it with NULs.
    pub fn text(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }

    /// Read one field. The caller guarantees `buf` holds at least `field.width()` bytes.
    pub(crate) fn read(field: &FieldDef, buf: &mut impl Buf) -> Value {
        match field.array_len {
            None => Self::read_scalar(field.ty, buf),
            Some(len) if field.ty.is_byte() => {
                let mut bytes = vec![0; len as usize];
                buf.copy_to_slice(&mut bytes);
                Value::Bytes(bytes)
            },
            Some(len) => {
                let mut values = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    values.push(Self::read_scalar(field.ty, buf));
                }
                Value::Array(values)
            },
        }
    }

    fn read_scalar(ty: Primitive, buf: &mut impl Buf) -> Value {
        match ty {
            Primitive::U8 => Value::U8(buf.get_u8()),
            Primitive::I8 => Value::I8(buf.get_i8()),
            Primitive::U16 => Value::U16(buf.get_u16_le()),
            Primitive::I16 => Value::I16(buf.get_i16_le()),
            Primitive::U32 => Value::U32(buf.get_u32_le()),
            Primitive::I32 => Value::I32(buf.get_i32_le()),
            Primitive::U64 => Value::U64(buf.get_u64_le()),
            Primitive::I64 => Value::I64(buf.get_i64_le()),
            Primitive::F32 => Value::F32(buf.get_f32_le()),
            Primitive::F64 => Value::F64(buf.get_f64_le()),
            Primitive::Char => Value::Char(buf.get_u8()),
        }
    }

    /// Write one field. The caller has checked [`FieldDef::accepts`].
    pub(crate) fn write(&self, field: &FieldDef, buf: &mut impl BufMut) {
        match self {
            Value::Bytes(bytes) => {
                buf.put_slice(bytes);
                buf.put_bytes(0, field.width() - bytes.len());
            },
            Value::Array(values) => {
                for v in values {
                    v.write(field, buf);
                }
            },
            Value::U8(v) | Value::Char(v) => buf.put_u8(*v),
            Value::I8(v) => buf.put_i8(*v),
            Value::U16(v) => buf.put_u16_le(*v),
            Value::I16(v) => buf.put_i16_le(*v),
            Value::U32(v) => buf.put_u32_le(*v),
            Value::I32(v) => buf.put_i32_le(*v),
            Value::U64(v) => buf.put_u64_le(*v),
            Value::I64(v) => buf.put_i64_le(*v),
            Value::F32(v) => buf.put_f32_le(*v),
            Value::F64(v) => buf.put_f64_le(*v),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn text_stops_at_nul() {
        let value = Value::Bytes(b"armed\0\0garbage".to_vec());
        assert_eq!(value.as_text().as_deref(), Some("armed"));
    }

    #[test]
    fn char_arrays_pad_with_nul() {
        let field = FieldDef::array("text", Primitive::Char, 6);
        let mut buf: Vec<u8> = Vec::new();

        Value::text("hi").write(&field, &mut buf);
        assert_eq!(buf, b"hi\0\0\0\0".to_vec());

        let read = Value::read(&field, &mut buf.as_slice());
        assert_eq!(read.as_text().as_deref(), Some("hi"));
    }

    #[test]
    fn little_endian() {
        let field = FieldDef::scalar("x", Primitive::I32);
        let mut buf: Vec<u8> = Vec::new();

        Value::I32(-2).write(&field, &mut buf);
        assert_eq!(buf, vec![0xfe, 0xff, 0xff, 0xff]);
    }
}
