use std::fmt::{
    Display,
    Formatter,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Per-frame routing header. The sequence is stamped by the sending port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Header {
    pub sequence:     u8,
    pub system_id:    u8,
    pub component_id: u8,
}

impl Header {
    #[inline]
    pub const fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            sequence: 0,
            system_id,
            component_id,
        }
    }
}

impl Display for Header {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} [seq {}]", self.system_id, self.component_id, self.sequence)
    }
}

#[cfg(test)]
pub mod test {
    use proptest::prelude::*;

    use super::*;

    pub fn header() -> impl Strategy<Value = Header> {
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(sequence, system_id, component_id)| Header {
            sequence,
            system_id,
            component_id,
        })
    }
}
