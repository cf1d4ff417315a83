//! LOB (Large Object) values
//!
//! A LOB column is returned either as a locator, whose content must be read
//! explicitly through the driver, or as content materialized during fetch.

use bytes::{Bytes, BytesMut};

use crate::constants::OracleType;
use crate::error::{Error, Result};

/// Result of reading LOB data
#[derive(Debug, Clone, PartialEq)]
pub enum LobData {
    /// String data (from CLOB/NCLOB)
    String(String),
    /// Binary data (from BLOB)
    Bytes(Bytes),
}

impl LobData {
    /// Get as string (for CLOB)
    pub fn as_string(&self) -> Option<&String> {
        match self {
            LobData::String(s) => Some(s),
            LobData::Bytes(_) => None,
        }
    }

    /// Get as bytes (for BLOB)
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            LobData::Bytes(b) => Some(b),
            LobData::String(_) => None,
        }
    }

    /// Check if this is string data
    pub fn is_string(&self) -> bool {
        matches!(self, LobData::String(_))
    }

    /// Length in characters for CLOB data, bytes for BLOB data
    pub fn len(&self) -> usize {
        match self {
            LobData::String(s) => s.chars().count(),
            LobData::Bytes(b) => b.len(),
        }
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accumulates the chunks of one LOB read
#[derive(Debug)]
pub enum LobBuffer {
    /// CLOB/NCLOB content
    String(String),
    /// BLOB content
    Bytes(BytesMut),
}

/// Largest allocation made up front from a locator's reported size
const MAX_PREALLOCATION: usize = 1 << 20;

impl LobBuffer {
    /// Empty buffer sized for the LOB behind `locator`
    pub fn for_locator(locator: &LobLocator) -> Self {
        let capacity = usize::try_from(locator.size())
            .unwrap_or(MAX_PREALLOCATION)
            .min(MAX_PREALLOCATION);
        if locator.is_blob() {
            LobBuffer::Bytes(BytesMut::with_capacity(capacity))
        } else {
            LobBuffer::String(String::with_capacity(capacity))
        }
    }

    /// Append one chunk, which must be of the same kind
    pub fn push(&mut self, chunk: LobData) -> Result<()> {
        match (self, chunk) {
            (LobBuffer::String(s), LobData::String(c)) => s.push_str(&c),
            (LobBuffer::Bytes(b), LobData::Bytes(c)) => b.extend_from_slice(&c),
            _ => {
                return Err(Error::Internal(
                    "mismatched LOB chunk kinds while streaming".to_string(),
                ))
            }
        }
        Ok(())
    }

    /// The accumulated content
    pub fn finish(self) -> LobData {
        match self {
            LobBuffer::String(s) => LobData::String(s),
            LobBuffer::Bytes(b) => LobData::Bytes(b.freeze()),
        }
    }
}

/// LOB locator - holds the reference to a LOB stored in the database
#[derive(Debug, Clone, PartialEq)]
pub struct LobLocator {
    /// Opaque locator bytes issued by the driver
    pub(crate) locator: Bytes,
    /// Size of the LOB in bytes (for BLOB) or characters (for CLOB)
    pub(crate) size: u64,
    /// Chunk size for read operations
    pub(crate) chunk_size: u32,
    /// Oracle type (CLOB or BLOB)
    pub(crate) oracle_type: OracleType,
}

impl LobLocator {
    /// Create a new LOB locator from raw data
    pub fn new(
        locator: Bytes,
        size: u64,
        chunk_size: u32,
        oracle_type: OracleType,
    ) -> Self {
        Self {
            locator,
            size,
            chunk_size,
            oracle_type,
        }
    }

    /// Get the size of the LOB
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the chunk size for read operations
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Check if this is a BLOB
    pub fn is_blob(&self) -> bool {
        self.oracle_type == OracleType::Blob
    }

    /// Get the raw locator bytes
    pub fn locator_bytes(&self) -> &[u8] {
        &self.locator
    }
}

/// A LOB value that is either materialized content or a locator
#[derive(Debug, Clone, PartialEq)]
pub enum LobValue {
    /// LOB content delivered inline
    Inline(LobData),
    /// LOB locator for data that must be read separately
    Locator(LobLocator),
}

impl LobValue {
    /// Get the size of the LOB
    pub fn size(&self) -> u64 {
        match self {
            Self::Inline(data) => data.len() as u64,
            Self::Locator(loc) => loc.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_kinds() {
        let clob = LobLocator::new(Bytes::from_static(b"loc"), 14, 8060, OracleType::Clob);
        assert!(!clob.is_blob());
        assert_eq!(clob.chunk_size(), 8060);
        assert_eq!(clob.locator_bytes(), b"loc");

        let blob = LobLocator::new(Bytes::new(), 0, 8060, OracleType::Blob);
        assert!(blob.is_blob());
    }

    #[test]
    fn test_buffer_accumulates_chunks() {
        let blob = LobLocator::new(Bytes::new(), 4, 2, OracleType::Blob);
        let mut buffer = LobBuffer::for_locator(&blob);
        buffer.push(LobData::Bytes(Bytes::from_static(b"ab"))).unwrap();
        buffer.push(LobData::Bytes(Bytes::from_static(b"cd"))).unwrap();
        assert!(buffer.push(LobData::String("x".to_string())).is_err());
        assert_eq!(buffer.finish(), LobData::Bytes(Bytes::from_static(b"abcd")));

        let clob = LobLocator::new(Bytes::new(), u64::MAX, 2, OracleType::Clob);
        let mut buffer = LobBuffer::for_locator(&clob);
        buffer.push(LobData::String("ré".to_string())).unwrap();
        buffer.push(LobData::String("veil".to_string())).unwrap();
        assert_eq!(buffer.finish(), LobData::String("réveil".to_string()));
    }

    #[test]
    fn test_clob_length_in_characters() {
        let data = LobData::String("réveillé".to_string());
        assert_eq!(data.len(), 8);
        assert!(data.is_string());
    }

    #[test]
    fn test_lob_value_size() {
        let lob = LobValue::Locator(LobLocator::new(Bytes::new(), 5, 8060, OracleType::Blob));
        assert_eq!(lob.size(), 5);
        let inline = LobValue::Inline(LobData::String("abc".to_string()));
        assert_eq!(inline.size(), 3);
    }
}
