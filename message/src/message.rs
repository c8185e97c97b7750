use std::fmt::{
    Display,
    Formatter,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    Header,
    MessageDef,
    Value,
};

/// A message in dictionary layout order. Ports own the sequence number, so
/// locally built messages carry zero until a port stamps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id:     u8,
    pub header: Header,
    pub fields: Vec<Value>,
}

impl Message {
    #[inline]
    pub fn new(id: u8, header: Header, fields: Vec<Value>) -> Self {
        Self {
            id,
            header,
            fields,
        }
    }

    #[inline]
    pub fn with_sequence(mut self, sequence: u8) -> Self {
        self.header.sequence = sequence;
        self
    }

    /// Look up a field by name in `def`, which must be this message's layout.
    pub fn get(&self, def: &MessageDef, name: &str) -> Option<&Value> {
        debug_assert_eq!(def.id, self.id);
        def.field_index(name).and_then(|i| self.fields.get(i))
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "msg {} from {}", self.id, self.header)
    }
}
