//! Oracle INTERVAL DAY TO SECOND encoding and decoding
//!
//! Wire format (11 bytes):
//! - Bytes 0-3: days as big-endian u32, offset by 0x80000000
//! - Byte 4: hours + 60
//! - Byte 5: minutes + 60
//! - Byte 6: seconds + 60
//! - Bytes 7-10: fractional seconds in nanoseconds, offset by 0x80000000
//!
//! Every component carries the sign of the whole interval.

use chrono::Duration;

use crate::error::{Error, Result};

const SIGN_OFFSET: i64 = 0x8000_0000;
const FIELD_OFFSET: i64 = 60;

/// Components of an interval, each carrying the interval's sign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalParts {
    /// Whole days
    pub days: i64,
    /// Hours (-23..=23)
    pub hours: i64,
    /// Minutes (-59..=59)
    pub minutes: i64,
    /// Seconds (-59..=59)
    pub seconds: i64,
    /// Nanoseconds (-999_999_999..=999_999_999)
    pub nanos: i64,
}

impl IntervalParts {
    /// Split a duration into day/hour/minute/second/nanosecond parts
    pub fn from_duration(value: &Duration) -> Self {
        let total_seconds = value.num_seconds();
        let nanos = (*value - Duration::seconds(total_seconds))
            .num_nanoseconds()
            .unwrap_or(0);
        Self {
            days: total_seconds / 86_400,
            hours: (total_seconds % 86_400) / 3_600,
            minutes: (total_seconds % 3_600) / 60,
            seconds: total_seconds % 60,
            nanos,
        }
    }

    /// Reassemble the duration
    pub fn to_duration(&self) -> Duration {
        Duration::days(self.days)
            + Duration::hours(self.hours)
            + Duration::minutes(self.minutes)
            + Duration::seconds(self.seconds)
            + Duration::nanoseconds(self.nanos)
    }

    /// Number of digits in the day component, as checked against a
    /// column's day precision
    pub fn day_digits(&self) -> u32 {
        let days = self.days.unsigned_abs();
        if days == 0 {
            1
        } else {
            days.ilog10() + 1
        }
    }
}

/// Encode a duration as Oracle INTERVAL DAY TO SECOND
pub fn encode_interval_ds(value: &Duration) -> Result<[u8; 11]> {
    let parts = IntervalParts::from_duration(value);
    let days = u32::try_from(parts.days + SIGN_OFFSET).map_err(|_| {
        Error::DataConversionError(format!("interval of {} days is out of range", parts.days))
    })?;
    let nanos = (parts.nanos + SIGN_OFFSET) as u32;

    let mut encoded = [0u8; 11];
    encoded[0..4].copy_from_slice(&days.to_be_bytes());
    encoded[4] = (parts.hours + FIELD_OFFSET) as u8;
    encoded[5] = (parts.minutes + FIELD_OFFSET) as u8;
    encoded[6] = (parts.seconds + FIELD_OFFSET) as u8;
    encoded[7..11].copy_from_slice(&nanos.to_be_bytes());
    Ok(encoded)
}

/// Decode Oracle INTERVAL DAY TO SECOND wire bytes
pub fn decode_interval_ds(data: &[u8]) -> Result<Duration> {
    if data.len() < 11 {
        return Err(Error::DataConversionError(format!(
            "INTERVAL DAY TO SECOND requires 11 bytes, got {}",
            data.len()
        )));
    }
    let days = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as i64 - SIGN_OFFSET;
    let nanos = u32::from_be_bytes([data[7], data[8], data[9], data[10]]) as i64 - SIGN_OFFSET;
    let parts = IntervalParts {
        days,
        hours: data[4] as i64 - FIELD_OFFSET,
        minutes: data[5] as i64 - FIELD_OFFSET,
        seconds: data[6] as i64 - FIELD_OFFSET,
        nanos,
    };
    Ok(parts.to_duration())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_of_positive_interval() {
        let value = Duration::days(35) + Duration::seconds(5743);
        let parts = IntervalParts::from_duration(&value);
        assert_eq!(parts.days, 35);
        assert_eq!(parts.hours, 1);
        assert_eq!(parts.minutes, 35);
        assert_eq!(parts.seconds, 43);
        assert_eq!(parts.day_digits(), 2);
    }

    #[test]
    fn test_roundtrip() {
        for value in [
            Duration::days(35) + Duration::seconds(5743),
            Duration::zero(),
            Duration::milliseconds(1500),
            -(Duration::days(2) + Duration::minutes(3)),
            Duration::days(999) + Duration::microseconds(12),
        ] {
            let encoded = encode_interval_ds(&value).unwrap();
            assert_eq!(decode_interval_ds(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn test_encoded_layout() {
        let encoded = encode_interval_ds(&Duration::days(1)).unwrap();
        assert_eq!(&encoded[0..4], &[0x80, 0, 0, 1]);
        assert_eq!(&encoded[4..7], &[60, 60, 60]);
        assert_eq!(&encoded[7..11], &[0x80, 0, 0, 0]);
    }

    #[test]
    fn test_too_short() {
        assert!(decode_interval_ds(&[0u8; 7]).is_err());
    }
}
