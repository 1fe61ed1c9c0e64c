//! Display helpers for key values.

use std::borrow::Cow;

use crate::structs::SmcValue;

impl std::fmt::Display for SmcValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  [{}]  ", self.key, self.data_type_str())?;
        if self.data_size == 0 {
            return write!(f, "no data");
        }
        write!(f, "(bytes")?;
        for b in self.valid_bytes() {
            write!(f, " {b:02x}")?;
        }
        write!(f, ")")
    }
}

impl SmcValue {
    /// Returns the meaningful portion of the byte data.
    ///
    /// The declared size may be smaller than the fixed 32-byte buffer; only
    /// that prefix carries data.
    pub fn valid_bytes(&self) -> &[u8] {
        let len = std::cmp::min(self.data_size as usize, self.bytes.len());
        &self.bytes[..len]
    }

    /// Returns the type tag as a string.
    ///
    /// Tags shorter than 4 characters keep their trailing space so all tags
    /// render at the same width.
    pub fn data_type_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data_type)
    }
}
