//! Value Module
//!
//! Read-only byte buffer handed out by the cache.

use std::fmt;

use bytes::Bytes;

// == Value ==
/// An immutable view over cached bytes.
///
/// Bytes are copied in on construction and copied out on every read, so a
/// caller can never mutate what the cache holds. Cloning a `Value` shares the
/// underlying buffer.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Value {
    bytes: Bytes,
}

impl Value {
    // == Constructor ==
    /// Creates a value from a copy of `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    // == Length ==
    /// Returns the number of bytes in the value.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the value holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // == Byte Copy ==
    /// Returns a fresh copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<Vec<u8>> for Value {
    /// Takes ownership of the buffer; the caller keeps no handle to it.
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(bytes),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("len", &self.len()).finish()
    }
}
