use std::sync::Arc;

use fnv::FnvHashMap;
use once_cell::sync::Lazy;

use crate::{
    common,
    frame::MAX_PAYLOAD_LEN,
    DictionaryError,
    Header,
    Message,
    MessageDef,
    Value,
};

/// Read-only lookup of message layouts by id and name.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    by_id:   FnvHashMap<u8, MessageDef>,
    by_name: FnvHashMap<String, u8>,
}

static COMMON: Lazy<Arc<Dictionary>> = Lazy::new(|| {
    Arc::new(Dictionary::from_defs(common::definitions()).expect("built-in message definitions are consistent"))
});

impl Dictionary {
    /// The built-in set of messages used by the bridge and ground control.
    #[inline]
    pub fn common() -> Arc<Dictionary> {
        COMMON.clone()
    }

    /// Validate and index a set of definitions.
    pub fn from_defs(defs: impl IntoIterator<Item = MessageDef>) -> Result<Self, DictionaryError> {
        let mut dict = Dictionary::default();

        for def in defs {
            let computed = def.compute_crc_extra();
            if computed != def.crc_extra {
                return Err(DictionaryError::CrcExtraMismatch {
                    name: def.name,
                    declared: def.crc_extra,
                    computed,
                });
            }

            let len = def.payload_len();
            if len > MAX_PAYLOAD_LEN {
                return Err(DictionaryError::PayloadTooLong {
                    name: def.name,
                    len,
                });
            }

            if dict.by_id.contains_key(&def.id) {
                return Err(DictionaryError::DuplicateId(def.id));
            }

            dict.by_name.insert(def.name.clone(), def.id);
            dict.by_id.insert(def.id, def);
        }

        Ok(dict)
    }

    #[inline]
    pub fn layout_for(&self, id: u8) -> Result<&MessageDef, DictionaryError> {
        self.by_id.get(&id).ok_or(DictionaryError::UnknownMessageId(id))
    }

    #[inline]
    pub fn crc_extra_for(&self, id: u8) -> Option<u8> {
        self.by_id.get(&id).map(|def| def.crc_extra)
    }

    #[inline]
    pub fn id_of(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Result<&MessageDef, DictionaryError> {
        self.id_of(name)
            .and_then(|id| self.by_id.get(&id))
            .ok_or_else(|| DictionaryError::UnknownMessageName(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Construct a message from named fields. Every field of the layout must be
    /// given exactly once with a value of its declared shape.
    pub fn build(&self, name: &str, header: Header, fields: &[(&str, Value)]) -> Result<Message, DictionaryError> {
        let def = self.by_name(name)?;
        let mut values: Vec<Option<Value>> = vec![None; def.fields.len()];

        for (field_name, value) in fields {
            let idx = def.field_index(field_name).ok_or_else(|| DictionaryError::UnknownField {
                message: def.name.clone(),
                field:   (*field_name).to_owned(),
            })?;

            if !def.fields[idx].accepts(value) {
                return Err(DictionaryError::FieldType {
                    message: def.name.clone(),
                    field:   (*field_name).to_owned(),
                });
            }

            values[idx] = Some(value.clone());
        }

        let fields = values
            .into_iter()
            .zip(&def.fields)
            .map(|(value, field)| {
                value.ok_or_else(|| DictionaryError::MissingField {
                    message: def.name.clone(),
                    field:   field.name.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Message::new(def.id, header, fields))
    }
}
