//! Oracle ROWID text encoding
//!
//! A physical ROWID identifies a row by data object number, relative file,
//! block and slot. Its external form is 18 characters in a base64 alphabet:
//! 6 for the object, 3 for the file, 6 for the block and 3 for the slot.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Base64 alphabet used for ROWID encoding
const BASE64_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Length of an encoded ROWID string
pub const MAX_ROWID_LENGTH: usize = 18;

/// Decoded Oracle ROWID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId {
    /// Data object number
    pub rba: u32,
    /// Relative file number
    pub partition_id: u16,
    /// Block number within the data file
    pub block_num: u32,
    /// Slot number (row number within the block)
    pub slot_num: u16,
}

impl RowId {
    /// Create a new ROWID
    pub fn new(rba: u32, partition_id: u16, block_num: u32, slot_num: u16) -> Self {
        Self {
            rba,
            partition_id,
            block_num,
            slot_num,
        }
    }

    /// Encode to the 18-character external form
    pub fn encode(&self) -> String {
        let mut buf = String::with_capacity(MAX_ROWID_LENGTH);
        push_base64(&mut buf, self.rba as u64, 6);
        push_base64(&mut buf, self.partition_id as u64, 3);
        push_base64(&mut buf, self.block_num as u64, 6);
        push_base64(&mut buf, self.slot_num as u64, 3);
        buf
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for RowId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_rowid_string(s)
    }
}

fn push_base64(buf: &mut String, value: u64, num_chars: usize) {
    for i in (0..num_chars).rev() {
        let idx = ((value >> (6 * i)) & 0x3f) as usize;
        buf.push(char::from(BASE64_ALPHABET[idx]));
    }
}

/// Parse the 18-character external form back to a RowId
pub fn parse_rowid_string(s: &str) -> Result<RowId> {
    if s.len() != MAX_ROWID_LENGTH {
        return Err(Error::DataConversionError(format!(
            "invalid ROWID string length: {}, expected {}",
            s.len(),
            MAX_ROWID_LENGTH
        )));
    }

    let bytes = s.as_bytes();
    Ok(RowId {
        rba: decode_base64(&bytes[0..6])? as u32,
        partition_id: decode_base64(&bytes[6..9])? as u16,
        block_num: decode_base64(&bytes[9..15])? as u32,
        slot_num: decode_base64(&bytes[15..18])? as u16,
    })
}

fn decode_base64(chars: &[u8]) -> Result<u64> {
    chars.iter().try_fold(0u64, |acc, &c| {
        let idx = match c {
            b'A'..=b'Z' => c - b'A',
            b'a'..=b'z' => c - b'a' + 26,
            b'0'..=b'9' => c - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            _ => {
                return Err(Error::DataConversionError(format!(
                    "invalid base64 character in ROWID: {}",
                    char::from(c)
                )))
            }
        };
        Ok((acc << 6) | idx as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rowid_encode_length() {
        let rowid = RowId::new(73_321, 4, 151, 0);
        let s = rowid.encode();
        assert_eq!(s.len(), 18);
        assert_eq!(s, rowid.to_string());
    }

    #[test]
    fn test_rowid_roundtrip() {
        let rowid = RowId::new(12345, 67, 89012, 345);
        let parsed: RowId = rowid.encode().parse().unwrap();
        assert_eq!(rowid, parsed);
    }

    #[test]
    fn test_known_encoding() {
        assert_eq!(RowId::new(1, 1, 1, 0).encode(), "AAAAABAABAAAAABAAA");
    }

    #[test]
    fn test_invalid_rowid() {
        assert!(parse_rowid_string("short").is_err());
        assert!(parse_rowid_string("AAAAABAABAAAAABAA!").is_err());
    }
}
