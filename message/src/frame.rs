//! MAVLink v1 frame layout:
//!
//! ```text
//! STX(0xfe) | len | seq | sysid | compid | msgid | payload[len] | crc_lo | crc_hi
//! ```
//!
//! The checksum covers `len` through the end of the payload, followed by the
//! message's `crc_extra` seed byte.

use bytes::{
    BufMut,
    BytesMut,
};

use crate::{
    crc::frame_crc,
    DecodeError,
    Dictionary,
    EncodeError,
    Header,
    Message,
    Value,
};

pub const STX: u8 = 0xfe;
pub const HEADER_LEN: usize = 6;
pub const CRC_LEN: usize = 2;
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN + CRC_LEN;

/// Total frame length for a declared payload length.
#[inline]
pub const fn frame_len(payload_len: usize) -> usize {
    HEADER_LEN + payload_len + CRC_LEN
}

/// Encode `msg` into a fresh buffer.
pub fn encode(dict: &Dictionary, msg: &Message) -> Result<BytesMut, EncodeError> {
    let mut out = BytesMut::new();
    encode_into(dict, msg, &mut out)?;
    Ok(out)
}

/// Append the frame for `msg` to `dst`. On error nothing is written.
pub fn encode_into(dict: &Dictionary, msg: &Message, dst: &mut BytesMut) -> Result<(), EncodeError> {
    let def = dict.layout_for(msg.id)?;

    if msg.fields.len() != def.fields.len() {
        return Err(EncodeError::FieldCount {
            id:       msg.id,
            expected: def.fields.len(),
            actual:   msg.fields.len(),
        });
    }

    if let Some(field) = def.fields.iter().zip(&msg.fields).find_map(|(f, v)| (!f.accepts(v)).then_some(f)) {
        return Err(EncodeError::FieldType {
            id:    msg.id,
            field: field.name.clone(),
        });
    }

    let payload_len = def.payload_len();
    let start = dst.len();
    dst.reserve(frame_len(payload_len));

    dst.put_u8(STX);
    dst.put_u8(payload_len as u8);
    dst.put_u8(msg.header.sequence);
    dst.put_u8(msg.header.system_id);
    dst.put_u8(msg.header.component_id);
    dst.put_u8(msg.id);

    for (field, value) in def.fields.iter().zip(&msg.fields) {
        value.write(field, dst);
    }

    let crc = frame_crc(&dst[start + 1..], def.crc_extra);
    dst.put_u16_le(crc);

    Ok(())
}

/// Decode one complete frame. Trailing bytes beyond the declared length are
/// ignored.
pub fn decode(dict: &Dictionary, frame: &[u8]) -> Result<Message, DecodeError> {
    match frame.first() {
        None => {
            return Err(DecodeError::TruncatedFrame {
                expected: HEADER_LEN,
                actual:   0,
            })
        },
        Some(&b) if b != STX => return Err(DecodeError::MissingStx(b)),
        _ => {},
    }

    if frame.len() < HEADER_LEN {
        return Err(DecodeError::TruncatedFrame {
            expected: HEADER_LEN,
            actual:   frame.len(),
        });
    }

    let payload_len = frame[1] as usize;
    let total = frame_len(payload_len);
    if frame.len() < total {
        return Err(DecodeError::TruncatedFrame {
            expected: total,
            actual:   frame.len(),
        });
    }

    let id = frame[5];
    let def = dict.layout_for(id).map_err(|_| DecodeError::UnknownMessageId(id))?;

    let covered = &frame[1..HEADER_LEN + payload_len];
    let received = u16::from_le_bytes([frame[total - 2], frame[total - 1]]);
    let computed = frame_crc(covered, def.crc_extra);

    if received != computed {
        return Err(DecodeError::CrcMismatch {
            id,
            received,
            computed,
        });
    }

    if payload_len != def.payload_len() {
        return Err(DecodeError::PayloadLength {
            id,
            expected: def.payload_len(),
            actual: payload_len,
        });
    }

    let mut payload = &frame[HEADER_LEN..HEADER_LEN + payload_len];
    let fields = def.fields.iter().map(|field| Value::read(field, &mut payload)).collect();

    Ok(Message::new(
        id,
        Header {
            sequence:     frame[2],
            system_id:    frame[3],
            component_id: frame[4],
        },
        fields,
    ))
}

#[cfg(test)]
pub mod test {
    use proptest::{
        collection::vec,
        prelude::*,
    };

    use super::*;
    use crate::{
        common,
        header::test::header,
        FieldDef,
        Primitive,
    };

    const HEARTBEAT: [u8; 17] = [254, 9, 7, 1, 1, 0, 0, 0, 0, 0, 2, 12, 81, 4, 3, 6, 199];
    const PARTIAL_LIST: [u8; 14] = [254, 6, 0, 255, 0, 38, 1, 0, 5, 0, 1, 1, 95, 116];

    fn heartbeat() -> Message {
        Message::new(
            common::ids::HEARTBEAT,
            Header {
                sequence:     7,
                system_id:    1,
                component_id: 1,
            },
            vec![Value::U32(0), Value::U8(2), Value::U8(12), Value::U8(0x51), Value::U8(4), Value::U8(3)],
        )
    }

    fn scalar(ty: Primitive) -> BoxedStrategy<Value> {
        match ty {
            Primitive::U8 => any::<u8>().prop_map(Value::U8).boxed(),
            Primitive::I8 => any::<i8>().prop_map(Value::I8).boxed(),
            Primitive::U16 => any::<u16>().prop_map(Value::U16).boxed(),
            Primitive::I16 => any::<i16>().prop_map(Value::I16).boxed(),
            Primitive::U32 => any::<u32>().prop_map(Value::U32).boxed(),
            Primitive::I32 => any::<i32>().prop_map(Value::I32).boxed(),
            Primitive::U64 => any::<u64>().prop_map(Value::U64).boxed(),
            Primitive::I64 => any::<i64>().prop_map(Value::I64).boxed(),
            Primitive::F32 => (-1e9f32..1e9).prop_map(Value::F32).boxed(),
            Primitive::F64 => (-1e12f64..1e12).prop_map(Value::F64).boxed(),
            Primitive::Char => any::<u8>().prop_map(Value::Char).boxed(),
        }
    }

    fn field(def: &FieldDef) -> BoxedStrategy<Value> {
        match def.array_len {
            None => scalar(def.ty),
            Some(n) if def.ty.is_byte() => vec(any::<u8>(), n as usize).prop_map(Value::Bytes).boxed(),
            Some(n) => vec(scalar(def.ty), n as usize).prop_map(Value::Array).boxed(),
        }
    }

    /// Any message of the built-in dictionary with in-domain field values.
    pub fn message() -> impl Strategy<Value = Message> {
        proptest::sample::select(common::definitions())
            .prop_flat_map(|def| {
                let fields = def.fields.iter().map(field).collect::<Vec<_>>();
                (Just(def.id), header(), fields)
            })
            .prop_map(|(id, header, fields)| Message::new(id, header, fields))
    }

    #[test]
    fn golden_heartbeat() -> eyre::Result<()> {
        let dict = Dictionary::common();

        assert_eq!(&encode(&dict, &heartbeat())?[..], &HEARTBEAT);
        assert_eq!(decode(&dict, &HEARTBEAT)?, heartbeat());

        Ok(())
    }

    #[test]
    fn golden_partial_list() -> eyre::Result<()> {
        let dict = Dictionary::common();
        let msg = dict.build("MISSION_WRITE_PARTIAL_LIST", Header::new(255, 0), &[
            ("start_index", Value::I16(1)),
            ("end_index", Value::I16(5)),
            ("target_system", Value::U8(1)),
            ("target_component", Value::U8(1)),
        ])?;

        assert_eq!(&encode(&dict, &msg)?[..], &PARTIAL_LIST);
        assert_eq!(decode(&dict, &PARTIAL_LIST)?, msg);

        Ok(())
    }

    #[test]
    fn unknown_id_writes_nothing() {
        let dict = Dictionary::common();
        let mut out = BytesMut::from(&b"prefix"[..]);

        let msg = Message::new(200, Header::default(), vec![]);
        let result = encode_into(&dict, &msg, &mut out);

        assert_eq!(result, Err(EncodeError::Dictionary(crate::DictionaryError::UnknownMessageId(200))));
        assert_eq!(&out[..], b"prefix");
    }

    #[test]
    fn mistyped_field_writes_nothing() {
        let dict = Dictionary::common();
        let mut out = BytesMut::new();

        let mut msg = heartbeat();
        msg.fields[0] = Value::F32(1.);

        assert!(matches!(encode_into(&dict, &msg, &mut out), Err(EncodeError::FieldType { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn truncated() {
        let dict = Dictionary::common();

        assert_eq!(decode(&dict, &HEARTBEAT[..10]), Err(DecodeError::TruncatedFrame {
            expected: 17,
            actual:   10,
        }));
        assert_eq!(decode(&dict, &HEARTBEAT[..3]), Err(DecodeError::TruncatedFrame {
            expected: HEADER_LEN,
            actual:   3,
        }));
    }

    #[test]
    fn unknown_id() {
        let dict = Dictionary::common();
        let mut frame = HEARTBEAT;
        frame[5] = 200;

        assert_eq!(decode(&dict, &frame), Err(DecodeError::UnknownMessageId(200)));
    }

    #[test]
    fn missing_stx() {
        let dict = Dictionary::common();
        assert_eq!(decode(&dict, &HEARTBEAT[1..]), Err(DecodeError::MissingStx(9)));
    }

    #[test]
    fn every_covered_flip_is_rejected() {
        let dict = Dictionary::common();

        for byte in (2..5).chain(6..HEARTBEAT.len()) {
            for bit in 0..8 {
                let mut frame = HEARTBEAT;
                frame[byte] ^= 1 << bit;

                let result = decode(&dict, &frame);
                assert!(
                    matches!(result, Err(DecodeError::CrcMismatch { id: 0, .. })),
                    "flip of byte {} bit {} gave {:?}",
                    byte,
                    bit,
                    result
                );
            }
        }
    }

    #[test]
    fn length_flip() {
        let dict = Dictionary::common();

        for bit in 0..8 {
            let mut frame = HEARTBEAT;
            frame[1] ^= 1 << bit;
            let len = frame[1] as usize;

            let result = decode(&dict, &frame);

            if len < 9 {
                assert!(matches!(result, Err(DecodeError::CrcMismatch { id: 0, .. })), "len {} gave {:?}", len, result);
            } else {
                assert_eq!(result, Err(DecodeError::TruncatedFrame {
                    expected: frame_len(len),
                    actual:   HEARTBEAT.len(),
                }));
            }
        }
    }

    #[test]
    fn id_flip() {
        let dict = Dictionary::common();

        for bit in 0..8 {
            let mut frame = HEARTBEAT;
            frame[5] ^= 1 << bit;
            let id = frame[5];

            let result = decode(&dict, &frame);

            if dict.layout_for(id).is_ok() {
                assert!(matches!(result, Err(DecodeError::CrcMismatch { id: 2, .. })), "id {} gave {:?}", id, result);
            } else {
                assert_eq!(result, Err(DecodeError::UnknownMessageId(id)));
            }
        }
    }

    proptest! {
        #[test]
        fn round_trip(msg in message()) {
            let dict = Dictionary::common();
            let frame = encode(&dict, &msg).unwrap();

            prop_assert_eq!(frame.len(), frame_len(dict.layout_for(msg.id).unwrap().payload_len()));
            prop_assert_eq!(decode(&dict, &frame).unwrap(), msg);
        }

        #[test]
        fn bit_flip_is_crc_mismatch(msg in message(), pos in any::<prop::sample::Index>(), bit in 0..8u8) {
            let dict = Dictionary::common();
            let mut frame = encode(&dict, &msg).unwrap().to_vec();

            // len and msgid change how the frame is read; see length_flip and id_flip
            let positions = (2..5).chain(HEADER_LEN..frame.len()).collect::<Vec<_>>();
            let at = *pos.get(&positions);
            frame[at] ^= 1 << bit;

            let is_crc_mismatch = matches!(decode(&dict, &frame), Err(DecodeError::CrcMismatch { .. }));
            prop_assert!(is_crc_mismatch);
        }
    }
}
