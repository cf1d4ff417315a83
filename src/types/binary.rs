//! Oracle BINARY_FLOAT and BINARY_DOUBLE encoding and decoding
//!
//! Oracle stores IEEE 754 values big-endian with the sign bit manipulated so
//! that the bytes sort in numeric order: positive values get the sign bit
//! set, negative values have every byte inverted. Infinities and NaN keep
//! their bit patterns through the transformation.

use crate::error::{Error, Result};

fn to_sortable<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    if bytes[0] & 0x80 == 0 {
        bytes[0] |= 0x80;
    } else {
        bytes.iter_mut().for_each(|b| *b = !*b);
    }
    bytes
}

fn from_sortable<const N: usize>(mut bytes: [u8; N]) -> [u8; N] {
    if bytes[0] & 0x80 != 0 {
        bytes[0] &= 0x7f;
    } else {
        bytes.iter_mut().for_each(|b| *b = !*b);
    }
    bytes
}

/// Encode an f32 to Oracle BINARY_FLOAT wire format (4 bytes)
pub fn encode_binary_float(value: f32) -> [u8; 4] {
    to_sortable(value.to_be_bytes())
}

/// Decode an Oracle BINARY_FLOAT from wire format (4 bytes)
pub fn decode_binary_float(data: &[u8]) -> Result<f32> {
    let bytes: [u8; 4] = data.try_into().map_err(|_| {
        Error::DataConversionError(format!("BINARY_FLOAT requires 4 bytes, got {}", data.len()))
    })?;
    Ok(f32::from_be_bytes(from_sortable(bytes)))
}

/// Encode an f64 to Oracle BINARY_DOUBLE wire format (8 bytes)
pub fn encode_binary_double(value: f64) -> [u8; 8] {
    to_sortable(value.to_be_bytes())
}

/// Decode an Oracle BINARY_DOUBLE from wire format (8 bytes)
pub fn decode_binary_double(data: &[u8]) -> Result<f64> {
    let bytes: [u8; 8] = data.try_into().map_err(|_| {
        Error::DataConversionError(format!("BINARY_DOUBLE requires 8 bytes, got {}", data.len()))
    })?;
    Ok(f64::from_be_bytes(from_sortable(bytes)))
}
