//! Oracle DATE and TIMESTAMP encoding and decoding
//!
//! Oracle DATE format (7 bytes):
//! - Byte 0: Century + 100
//! - Byte 1: Year in century + 100
//! - Byte 2: Month (1-12)
//! - Byte 3: Day (1-31)
//! - Bytes 4-6: Hour, minute, second, each + 1
//!
//! TIMESTAMP appends fractional seconds as big-endian nanoseconds (4 bytes),
//! and TIMESTAMP WITH TIME ZONE appends hour and minute offsets (+20, +60).

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Error, Result};

/// Decoded Oracle DATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OracleDate {
    /// Year (e.g., 2024)
    pub year: i32,
    /// Month (1-12)
    pub month: u8,
    /// Day (1-31)
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
}

impl OracleDate {
    /// Create a new Oracle date
    pub fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Create a date-only value (time set to 00:00:00)
    pub fn date(year: i32, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Copy with the time of day cleared
    pub fn truncate_time(&self) -> Self {
        Self::date(self.year, self.month, self.day)
    }

    /// Convert to a chrono date-time, failing on out-of-range fields
    pub fn to_naive(&self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)
            .and_then(|d| d.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32))
            .ok_or_else(|| Error::DataConversionError(format!("invalid date {:?}", self)))
    }
}

impl From<NaiveDateTime> for OracleDate {
    fn from(dt: NaiveDateTime) -> Self {
        Self::new(
            dt.year(),
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
        )
    }
}

impl From<NaiveDate> for OracleDate {
    fn from(d: NaiveDate) -> Self {
        Self::date(d.year(), d.month() as u8, d.day() as u8)
    }
}

impl Default for OracleDate {
    fn default() -> Self {
        Self::new(1, 1, 1, 0, 0, 0)
    }
}

/// Decoded Oracle TIMESTAMP (with optional timezone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OracleTimestamp {
    /// Year (e.g., 2024)
    pub year: i32,
    /// Month (1-12)
    pub month: u8,
    /// Day (1-31)
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
    /// Fractional seconds in microseconds (0-999999)
    pub microsecond: u32,
    /// Timezone hour offset (-12 to +14)
    pub tz_hour_offset: i8,
    /// Timezone minute offset (-59 to +59)
    pub tz_minute_offset: i8,
}

impl OracleTimestamp {
    /// Create a new timestamp without timezone
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        microsecond: u32,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            tz_hour_offset: 0,
            tz_minute_offset: 0,
        }
    }

    /// Set the timezone offset
    pub fn with_offset(mut self, tz_hour_offset: i8, tz_minute_offset: i8) -> Self {
        self.tz_hour_offset = tz_hour_offset;
        self.tz_minute_offset = tz_minute_offset;
        self
    }

    /// Check if this timestamp has a non-zero timezone offset
    pub fn has_timezone(&self) -> bool {
        self.tz_hour_offset != 0 || self.tz_minute_offset != 0
    }

    /// Convert to OracleDate (loses fractional seconds and timezone)
    pub fn to_date(&self) -> OracleDate {
        OracleDate::new(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }
}

impl From<OracleDate> for OracleTimestamp {
    fn from(date: OracleDate) -> Self {
        Self::new(
            date.year,
            date.month,
            date.day,
            date.hour,
            date.minute,
            date.second,
            0,
        )
    }
}

impl From<NaiveDateTime> for OracleTimestamp {
    fn from(dt: NaiveDateTime) -> Self {
        let mut ts = OracleTimestamp::from(OracleDate::from(dt));
        ts.microsecond = dt.nanosecond() / 1000;
        ts
    }
}

const TZ_HOUR_OFFSET: i8 = 20;
const TZ_MINUTE_OFFSET: i8 = 60;
/// Flag indicating a named timezone region
const HAS_REGION_ID: u8 = 0x80;

/// Decode an Oracle DATE from wire format bytes (7 bytes)
pub fn decode_oracle_date(data: &[u8]) -> Result<OracleDate> {
    if data.len() < 7 {
        return Err(Error::DataConversionError(format!(
            "Oracle DATE requires 7 bytes, got {}",
            data.len()
        )));
    }

    let century = data[0] as i32 - 100;
    let year_in_century = data[1] as i32 - 100;

    Ok(OracleDate {
        year: century * 100 + year_in_century,
        month: data[2],
        day: data[3],
        hour: data[4].saturating_sub(1),
        minute: data[5].saturating_sub(1),
        second: data[6].saturating_sub(1),
    })
}

/// Decode an Oracle TIMESTAMP from wire format bytes
///
/// Accepts the DATE (7), TIMESTAMP (11) and TIMESTAMP WITH TIME ZONE (13)
/// layouts.
pub fn decode_oracle_timestamp(data: &[u8]) -> Result<OracleTimestamp> {
    let date = decode_oracle_date(data)?;
    let mut ts = OracleTimestamp::from(date);

    if data.len() >= 11 {
        let nanos = u32::from_be_bytes([data[7], data[8], data[9], data[10]]);
        ts.microsecond = nanos / 1000;
    }

    if data.len() >= 13 && data[11] != 0 && data[12] != 0 {
        if data[11] & HAS_REGION_ID != 0 {
            return Err(Error::DataConversionError(
                "named timezone regions are not supported".to_string(),
            ));
        }
        ts.tz_hour_offset = (data[11] as i8) - TZ_HOUR_OFFSET;
        ts.tz_minute_offset = (data[12] as i8) - TZ_MINUTE_OFFSET;
    }

    Ok(ts)
}

/// Encode an Oracle DATE to wire format (7 bytes)
pub fn encode_oracle_date(date: &OracleDate) -> [u8; 7] {
    [
        (date.year / 100 + 100) as u8,
        (date.year % 100 + 100) as u8,
        date.month,
        date.day,
        date.hour + 1,
        date.minute + 1,
        date.second + 1,
    ]
}

/// Encode an Oracle TIMESTAMP to wire format
///
/// Produces 11 bytes, or 13 when `include_tz` is set.
pub fn encode_oracle_timestamp(ts: &OracleTimestamp, include_tz: bool) -> Vec<u8> {
    let mut encoded = encode_oracle_date(&ts.to_date()).to_vec();
    encoded.extend_from_slice(&(ts.microsecond * 1000).to_be_bytes());
    if include_tz {
        encoded.push((ts.tz_hour_offset + TZ_HOUR_OFFSET) as u8);
        encoded.push((ts.tz_minute_offset + TZ_MINUTE_OFFSET) as u8);
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_date() {
        let data = [120, 124, 3, 15, 15, 31, 46];
        let date = decode_oracle_date(&data).unwrap();
        assert_eq!(date, OracleDate::new(2024, 3, 15, 14, 30, 45));
        assert_eq!(encode_oracle_date(&date), data);
    }

    #[test]
    fn test_decode_date_too_short() {
        assert!(decode_oracle_date(&[120, 124, 3]).is_err());
    }

    #[test]
    fn test_timestamp_roundtrip_with_fraction() {
        let ts = OracleTimestamp::new(2019, 10, 21, 8, 5, 9, 123456);
        let encoded = encode_oracle_timestamp(&ts, false);
        assert_eq!(encoded.len(), 11);
        assert_eq!(decode_oracle_timestamp(&encoded).unwrap(), ts);
    }

    #[test]
    fn test_timestamp_with_timezone() {
        let ts = OracleTimestamp::new(2019, 10, 21, 8, 5, 9, 0).with_offset(-5, -30);
        let encoded = encode_oracle_timestamp(&ts, true);
        assert_eq!(encoded.len(), 13);
        let decoded = decode_oracle_timestamp(&encoded).unwrap();
        assert!(decoded.has_timezone());
        assert_eq!(decoded.tz_hour_offset, -5);
        assert_eq!(decoded.tz_minute_offset, -30);
    }

    #[test]
    fn test_chrono_conversions() {
        let dt = NaiveDate::from_ymd_opt(2011, 2, 28)
            .unwrap()
            .and_hms_micro_opt(23, 59, 1, 500)
            .unwrap();
        let ts = OracleTimestamp::from(dt);
        assert_eq!(ts.microsecond, 500);
        let date = OracleDate::from(dt);
        assert_eq!(date.to_naive().unwrap(), dt.with_nanosecond(0).unwrap());
        assert_eq!(date.truncate_time(), OracleDate::date(2011, 2, 28));
    }
}
