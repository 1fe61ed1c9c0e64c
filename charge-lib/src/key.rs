//! Four-character-code key names.
//!
//! SMC keys are 32-bit identifiers conventionally written as four ASCII
//! characters ("CH0B", "BCLM") packed big-endian, most significant byte
//! first.

use std::fmt;

/// Encodes a key name into its 32-bit code.
///
/// Reads at most the first 4 bytes of `name`, stopping early at the end of
/// the string or at a NUL byte, and packs them left-to-right with the first
/// character in the most significant position. Bytes past position 4 are
/// ignored.
pub fn encode_key(name: &str) -> u32 {
    let mut code = 0u32;
    for &b in name.as_bytes().iter().take(4) {
        if b == 0 {
            break;
        }
        code = (code << 8) | u32::from(b);
    }
    code
}

/// Decodes a 32-bit code back into its four characters.
///
/// Also used to render type tags, which share the four-character convention.
pub fn decode_key(code: u32) -> String {
    String::from_utf8_lossy(&code.to_be_bytes()).into_owned()
}

/// A SMC key identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SmcKey(u32);

impl SmcKey {
    /// Builds a key from its four name bytes.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Builds a key from an already-encoded code.
    pub const fn from_code(code: u32) -> Self {
        Self(code)
    }

    /// Builds a key from a name, via [`encode_key`].
    pub fn new(name: &str) -> Self {
        Self(encode_key(name))
    }

    /// The raw 32-bit code as it appears on the wire.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SmcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", decode_key(self.0))
    }
}

impl fmt::Debug for SmcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SmcKey({:?})", decode_key(self.0))
    }
}
