//! Row data handling for query results
//!
//! This module provides types for:
//! - Representing column values in a type-safe manner
//! - Converting Rust types into bind values
//! - Accessing result rows by position or column name

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::{LobValue, Numeric, OracleDate, OracleTimestamp, RowId};

/// Represents a value bound to or fetched from an Oracle column.
///
/// Numeric values come in three runtime representations: native integer,
/// native float and arbitrary-precision decimal. Which one a fetch produces
/// is decided by the dialect's coercion rules.
///
/// # Example
///
/// ```rust
/// use oracle_dialect::Value;
///
/// fn describe(value: &Value) -> String {
///     match value {
///         Value::Null => "NULL".to_string(),
///         Value::Integer(i) => format!("int {}", i),
///         Value::Decimal(d) => format!("decimal {}", d),
///         other => other.to_string(),
///     }
/// }
///
/// assert_eq!(describe(&Value::Integer(5)), "int 5");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Text value (VARCHAR2, CHAR, CLOB as string)
    String(String),
    /// Byte array (RAW, BLOB as bytes, undecoded character data)
    Bytes(Vec<u8>),
    /// Native integer
    Integer(i64),
    /// Native floating point
    Float(f64),
    /// Arbitrary-precision decimal, possibly infinite or NaN
    Decimal(Numeric),
    /// Date value
    Date(OracleDate),
    /// Timestamp value (with optional timezone)
    Timestamp(OracleTimestamp),
    /// INTERVAL DAY TO SECOND value
    Interval(Duration),
    /// ROWID value
    RowId(RowId),
    /// Boolean value
    Boolean(bool),
    /// LOB value (CLOB, NCLOB, BLOB)
    Lob(LobValue),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the runtime representation
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Interval(_) => "interval",
            Value::RowId(_) => "rowid",
            Value::Boolean(_) => "bool",
            Value::Lob(_) => "lob",
        }
    }

    /// Try to get as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Decimal(Numeric::Finite(d)) if d.fract().is_zero() => d.to_i64(),
            _ => None,
        }
    }

    /// Try to get as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(n) => Some(n.to_f64()),
            _ => None,
        }
    }

    /// Try to get as a decimal
    pub fn as_decimal(&self) -> Option<&Numeric> {
        match self {
            Value::Decimal(n) => Some(n),
            _ => None,
        }
    }

    /// Try to get as bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

}

// Conversions for ergonomic bind parameter creation

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(Numeric::Finite(v))
    }
}

impl From<Numeric> for Value {
    fn from(v: Numeric) -> Self {
        Value::Decimal(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Interval(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(OracleDate::from(v))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Date(OracleDate::from(v))
    }
}

impl From<OracleTimestamp> for Value {
    fn from(v: OracleTimestamp) -> Self {
        Value::Timestamp(v)
    }
}

impl From<RowId> for Value {
    fn from(v: RowId) -> Self {
        Value::RowId(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Integer(i) => write!(f, "{}", i),
            // NaN prints the same regardless of its sign bit
            Value::Float(fl) if fl.is_nan() => write!(f, "nan"),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Decimal(n) => write!(f, "{}", n),
            Value::Date(d) => write!(
                f,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                d.year, d.month, d.day, d.hour, d.minute, d.second
            ),
            Value::Timestamp(ts) => {
                write!(
                    f,
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
                    ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second, ts.microsecond
                )?;
                if ts.has_timezone() {
                    write!(f, " {:+03}:{:02}", ts.tz_hour_offset, ts.tz_minute_offset.abs())?;
                }
                Ok(())
            }
            Value::Interval(d) => {
                let parts = crate::types::IntervalParts::from_duration(d);
                write!(
                    f,
                    "{} days, {}:{:02}:{:02}",
                    parts.days, parts.hours, parts.minutes, parts.seconds
                )
            }
            Value::RowId(r) => write!(f, "{}", r),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Lob(lob) => match lob {
                LobValue::Inline(data) => write!(f, "<LOB: {} inline>", data.len()),
                LobValue::Locator(loc) => write!(f, "<LOB: {}, locator>", loc.size()),
            },
        }
    }
}

/// A row of data from a query result
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Column values
    values: Vec<Value>,
    /// Column names (shared reference from result set)
    column_names: Option<Vec<String>>,
}

impl Row {
    /// Create a new row with values and column names
    pub fn with_names(values: Vec<Value>, names: Vec<String>) -> Self {
        Self {
            values,
            column_names: Some(names),
        }
    }

    /// Get the number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index (0-based)
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let names = self.column_names.as_ref()?;
        let index = names.iter().position(|n| n.eq_ignore_ascii_case(name))?;
        self.values.get(index)
    }

    /// Get all values
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Take ownership of values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Runtime representation of each value, in column order
    pub fn type_names(&self) -> Vec<&'static str> {
        self.values.iter().map(Value::type_name).collect()
    }
}

impl std::ops::Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl std::ops::Index<&str> for Row {
    type Output = Value;

    fn index(&self, name: &str) -> &Self::Output {
        self.get_by_name(name).unwrap_or(&Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_value_is_null() {
        assert!(Value::Null.is_null());
        assert!(!Value::Integer(42).is_null());
        assert!(!Value::String("test".to_string()).is_null());
    }

    #[test]
    fn test_value_as_i64() {
        assert_eq!(Value::Integer(42).as_i64(), Some(42));
        assert_eq!(Value::Float(53.0).as_i64(), Some(53));
        assert_eq!(Value::Float(53.5).as_i64(), None);
        let d = Value::from(Decimal::from_str("45.00").unwrap());
        assert_eq!(d.as_i64(), Some(45));
        assert_eq!(Value::String("42".to_string()).as_i64(), None);
    }

    #[test]
    fn test_nan_display_ignores_sign() {
        assert_eq!(Value::Float(f64::NAN).to_string(), "nan");
        assert_eq!(Value::Float(-f64::NAN).to_string(), "nan");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Value::Decimal(Numeric::NaN).to_string(), "NaN");
    }

    #[test]
    fn test_interval_display() {
        let v = Value::from(Duration::days(35) + Duration::seconds(5743));
        assert_eq!(v.to_string(), "35 days, 1:35:43");
    }

    #[test]
    fn test_decimal_equality_is_numeric() {
        let a = Value::from(Decimal::from_str("5.20").unwrap());
        let b = Value::from(Decimal::from_str("5.2").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, Value::Float(5.2));
    }

    #[test]
    fn test_row_access() {
        let row = Row::with_names(
            vec![Value::Integer(1), Value::String("hello".to_string()), Value::Null],
            vec!["ID".to_string(), "NAME".to_string(), "EMPTY".to_string()],
        );

        assert_eq!(row.len(), 3);
        assert_eq!(row.get(0).and_then(Value::as_i64), Some(1));
        assert_eq!(row.get_by_name("Name").and_then(Value::as_str), Some("hello"));
        assert!(row[2].is_null());
        assert!(row.get(99).is_none());
        assert_eq!(row["name"], Value::String("hello".to_string()));
        assert_eq!(row["missing"], Value::Null);
        assert_eq!(row.type_names(), vec!["int", "str", "null"]);
    }

    #[test]
    fn test_option_conversion() {
        let some: Value = Some(5i64).into();
        let none: Value = Option::<i64>::None.into();
        assert_eq!(some, Value::Integer(5));
        assert!(none.is_null());
    }
}
