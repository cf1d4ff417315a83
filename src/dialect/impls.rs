//! Dialect implementations of abstract types
//!
//! Adapting a [`SqlType`] yields a [`DialectImpl`], which knows the driver
//! type code for input-size hints and how values are processed on the way
//! in and out of the driver.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::EncodingErrors;
use crate::constants::DEFAULT_DECIMAL_SCALE;
use crate::driver::DbApiType;
use crate::error::{Error, Result};
use crate::row::Value;
use crate::sqltypes::SqlType;
use crate::types::{LobData, LobValue, Numeric, RowId};

/// Numeric implementation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericImpl {
    /// Declared precision
    pub precision: Option<u32>,
    /// Declared scale
    pub scale: Option<u32>,
    /// Return decimals rather than floats
    pub asdecimal: bool,
    /// Adapted from Oracle's own NUMBER type
    pub is_number: bool,
    /// Adapted from BINARY_DOUBLE or BINARY_FLOAT
    pub native_float: bool,
}

impl NumericImpl {
    /// Scale used when quantizing bound decimals
    pub fn effective_scale(&self) -> u32 {
        self.scale.unwrap_or(DEFAULT_DECIMAL_SCALE)
    }
}

/// Oracle implementation of an abstract type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectImpl {
    /// VARCHAR2
    OracleString,
    /// Unicode in the database character set
    UnicodeStringChar,
    /// Unicode in the national character set
    UnicodeStringNChar,
    /// CHAR
    Char,
    /// LONG
    Long,
    /// CLOB
    Text,
    /// Unicode text in a CLOB
    UnicodeTextClob,
    /// Unicode text in an NCLOB
    UnicodeTextNClob,
    /// BLOB
    Binary,
    /// RAW
    Raw,
    /// Date without time of day
    Date,
    /// DATE with time of day
    DateTime,
    /// TIMESTAMP
    Timestamp,
    /// Integer types
    Integer,
    /// Fixed and floating point numbers
    Numeric(NumericImpl),
    /// INTERVAL DAY TO SECOND
    Interval,
    /// ROWID
    RowId,
    /// Boolean stored as a small integer
    Boolean,
    /// Unknown type
    Null,
}

impl DialectImpl {
    /// Adapt a resolved type
    pub fn adapt(ty: &SqlType, use_nchar: bool) -> Self {
        match ty {
            SqlType::String { .. } | SqlType::Varchar { .. } | SqlType::Varchar2 { .. } => {
                DialectImpl::OracleString
            }
            SqlType::Unicode { .. } if use_nchar => DialectImpl::UnicodeStringNChar,
            SqlType::Unicode { .. } => DialectImpl::UnicodeStringChar,
            SqlType::NVarchar { .. } | SqlType::NVarchar2 { .. } | SqlType::NChar { .. } => {
                DialectImpl::UnicodeStringNChar
            }
            SqlType::Char { .. } => DialectImpl::Char,
            SqlType::Text | SqlType::Clob => DialectImpl::Text,
            SqlType::UnicodeText if use_nchar => DialectImpl::UnicodeTextNClob,
            SqlType::UnicodeText => DialectImpl::UnicodeTextClob,
            SqlType::NClob => DialectImpl::UnicodeTextNClob,
            SqlType::Long => DialectImpl::Long,
            SqlType::Raw { .. } => DialectImpl::Raw,
            SqlType::LargeBinary | SqlType::Blob => DialectImpl::Binary,
            SqlType::Date => DialectImpl::Date,
            SqlType::DateTime | SqlType::OracleDate => DialectImpl::DateTime,
            SqlType::Timestamp { .. } => DialectImpl::Timestamp,
            SqlType::Integer | SqlType::SmallInteger | SqlType::BigInteger => DialectImpl::Integer,
            SqlType::Numeric {
                precision,
                scale,
                asdecimal,
            }
            | SqlType::DoublePrecision {
                precision,
                scale,
                asdecimal,
            } => DialectImpl::Numeric(NumericImpl {
                precision: *precision,
                scale: *scale,
                asdecimal: *asdecimal,
                is_number: false,
                native_float: false,
            }),
            SqlType::Float {
                precision,
                asdecimal,
            } => DialectImpl::Numeric(NumericImpl {
                precision: *precision,
                scale: None,
                asdecimal: *asdecimal,
                is_number: false,
                native_float: false,
            }),
            SqlType::Number {
                precision,
                scale,
                asdecimal,
            } => DialectImpl::Numeric(NumericImpl {
                precision: *precision,
                scale: *scale,
                asdecimal: *asdecimal,
                is_number: true,
                native_float: false,
            }),
            SqlType::BinaryDouble { asdecimal } | SqlType::BinaryFloat { asdecimal } => {
                DialectImpl::Numeric(NumericImpl {
                    precision: None,
                    scale: None,
                    asdecimal: *asdecimal,
                    is_number: false,
                    native_float: true,
                })
            }
            SqlType::Interval { .. } => DialectImpl::Interval,
            SqlType::RowId => DialectImpl::RowId,
            SqlType::Boolean => DialectImpl::Boolean,
            SqlType::Null | SqlType::Variant { .. } | SqlType::Decorated(_) => DialectImpl::Null,
        }
    }

    /// Driver type code for this implementation
    pub fn dbapi_type(&self) -> Option<DbApiType> {
        let ty = match self {
            DialectImpl::OracleString => DbApiType::String,
            DialectImpl::UnicodeStringChar | DialectImpl::Long => DbApiType::LongString,
            DialectImpl::UnicodeStringNChar => DbApiType::NChar,
            DialectImpl::Char => DbApiType::FixedChar,
            DialectImpl::Text | DialectImpl::UnicodeTextClob => DbApiType::Clob,
            DialectImpl::UnicodeTextNClob => DbApiType::NClob,
            DialectImpl::Binary => DbApiType::Blob,
            DialectImpl::Raw => DbApiType::Binary,
            DialectImpl::Date | DialectImpl::DateTime => DbApiType::DateTime,
            DialectImpl::Timestamp => DbApiType::Timestamp,
            DialectImpl::Integer => DbApiType::Int,
            DialectImpl::Numeric(n) if n.native_float => DbApiType::NativeFloat,
            DialectImpl::Numeric(_) | DialectImpl::Boolean => DbApiType::Number,
            DialectImpl::Interval => DbApiType::Interval,
            DialectImpl::RowId => DbApiType::Rowid,
            DialectImpl::Null => return None,
        };
        Some(ty)
    }

    /// Whether values are character data
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            DialectImpl::OracleString
                | DialectImpl::UnicodeStringChar
                | DialectImpl::UnicodeStringNChar
                | DialectImpl::Char
                | DialectImpl::Long
                | DialectImpl::Text
                | DialectImpl::UnicodeTextClob
                | DialectImpl::UnicodeTextNClob
        )
    }

    /// Numeric parameters, for numeric implementations
    pub fn as_numeric(&self) -> Option<&NumericImpl> {
        match self {
            DialectImpl::Numeric(n) => Some(n),
            _ => None,
        }
    }

    /// Convert an application value into the form bound to the driver
    pub fn process_bind(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }
        match self {
            DialectImpl::Numeric(n) if n.scale == Some(0) => Ok(value),
            DialectImpl::Numeric(n) if n.asdecimal => bind_decimal(value, n.effective_scale()),
            DialectImpl::Numeric(_) => bind_float(value),
            DialectImpl::RowId => match value {
                Value::String(s) => Ok(Value::RowId(RowId::from_str(&s)?)),
                other => Ok(other),
            },
            DialectImpl::Boolean => match value {
                Value::Boolean(b) => Ok(Value::Integer(b as i64)),
                other => Ok(other),
            },
            _ => Ok(value),
        }
    }

    /// Convert a fetched value into the application's representation
    pub fn process_result(&self, value: Value, errors: EncodingErrors) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }
        match self {
            DialectImpl::Integer => to_integer(value),
            DialectImpl::Numeric(n) if n.asdecimal => match value {
                Value::Integer(i) => Ok(Value::from(Decimal::from(i))),
                Value::Float(f) => Ok(Value::Decimal(Numeric::from_f64(f)?)),
                other => Ok(other),
            },
            DialectImpl::Numeric(n) => match value {
                Value::Integer(i) if !n.is_number => Ok(Value::Float(i as f64)),
                // integers past i64 stay exact
                Value::Decimal(d) if n.is_number && n.scale == Some(0) => Ok(Value::Decimal(d)),
                Value::Decimal(d) => Ok(Value::Float(d.to_f64())),
                other => Ok(other),
            },
            DialectImpl::Date => match value {
                Value::Date(d) => Ok(Value::Date(d.truncate_time())),
                Value::Timestamp(ts) => Ok(Value::Date(ts.to_date().truncate_time())),
                other => Ok(other),
            },
            imp if imp.is_string() => match value {
                Value::Bytes(b) => Ok(Value::String(errors.decode(&b)?)),
                Value::Lob(LobValue::Inline(LobData::String(s))) => Ok(Value::String(s)),
                Value::Lob(LobValue::Inline(LobData::Bytes(b))) => {
                    Ok(Value::String(errors.decode(&b)?))
                }
                other => Ok(other),
            },
            DialectImpl::Binary | DialectImpl::Raw => match value {
                Value::Lob(LobValue::Inline(LobData::Bytes(b))) => Ok(Value::Bytes(b.to_vec())),
                other => Ok(other),
            },
            DialectImpl::Boolean => match value {
                Value::Integer(i) => Ok(Value::Boolean(i != 0)),
                Value::Decimal(d) => Ok(Value::Boolean(d.to_f64() != 0.0)),
                other => Ok(other),
            },
            DialectImpl::RowId => match value {
                Value::String(s) => Ok(Value::RowId(RowId::from_str(&s)?)),
                other => Ok(other),
            },
            _ => Ok(value),
        }
    }
}

fn bind_decimal(value: Value, scale: u32) -> Result<Value> {
    match value {
        Value::Integer(i) => {
            let mut d = Decimal::from(i);
            d.rescale(scale);
            Ok(Value::from(d))
        }
        Value::Float(f) if f.is_finite() => {
            let quantized = Decimal::from_str(&format!("{:.*}", scale as usize, f)).ok();
            match quantized {
                Some(d) => Ok(Value::from(d)),
                None => Ok(Value::Decimal(Numeric::from_f64(f)?)),
            }
        }
        Value::Float(f) => Ok(Value::Decimal(Numeric::from_f64(f)?)),
        // the driver has no decimal form for non-finite values
        Value::Decimal(d) if !d.is_finite() => Ok(Value::Float(d.to_f64())),
        other => Ok(other),
    }
}

fn bind_float(value: Value) -> Result<Value> {
    match value {
        Value::Integer(i) => Ok(Value::Float(i as f64)),
        Value::Decimal(d) => Ok(Value::Float(d.to_f64())),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Value::Float)
            .map_err(|_| Error::DataConversionError(format!("cannot bind {:?} as a float", s))),
        other => Ok(other),
    }
}

fn to_integer(value: Value) -> Result<Value> {
    match value {
        Value::Integer(_) => Ok(value),
        Value::Float(f) => Ok(Value::Integer(f.trunc() as i64)),
        Value::Decimal(n) if n.is_finite() => n
            .trunc_i64()
            .map(Value::Integer)
            .ok_or_else(|| Error::DataConversionError(format!("{} does not fit in i64", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Value::Integer)
            .map_err(|_| Error::DataConversionError(format!("invalid literal for int: {:?}", s))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapt(ty: SqlType) -> DialectImpl {
        DialectImpl::adapt(&ty, false)
    }

    #[test]
    fn test_dbapi_types() {
        assert_eq!(adapt(SqlType::SmallInteger).dbapi_type(), Some(DbApiType::Int));
        assert_eq!(adapt(SqlType::numeric(10, 8)).dbapi_type(), Some(DbApiType::Number));
        assert_eq!(adapt(SqlType::binary_float()).dbapi_type(), Some(DbApiType::NativeFloat));
        assert_eq!(adapt(SqlType::unicode(30)).dbapi_type(), Some(DbApiType::LongString));
        assert_eq!(
            DialectImpl::adapt(&SqlType::unicode(30), true).dbapi_type(),
            Some(DbApiType::NChar)
        );
        assert_eq!(adapt(SqlType::char(30)).dbapi_type(), Some(DbApiType::FixedChar));
        assert_eq!(adapt(SqlType::Null).dbapi_type(), None);
    }

    #[test]
    fn test_decimal_bind_quantizes() {
        let imp = adapt(SqlType::numeric(4, 2));
        let bound = imp.process_bind(Value::Float(5.2)).unwrap();
        assert_eq!(bound, Value::from(Decimal::from_str("5.20").unwrap()));
        assert_eq!(bound.as_decimal().and_then(Numeric::as_decimal).map(|d| d.scale()), Some(2));

        let imp = adapt(SqlType::float(None).asdecimal(true));
        let bound = imp.process_bind(Value::Integer(3)).unwrap();
        assert_eq!(bound.as_decimal().and_then(Numeric::as_decimal).map(|d| d.scale()), Some(10));
    }

    #[test]
    fn test_infinite_decimal_binds_as_float() {
        let imp = adapt(SqlType::binary_double().asdecimal(true));
        assert_eq!(
            imp.process_bind(Value::Decimal(Numeric::NegInfinity)).unwrap(),
            Value::Float(f64::NEG_INFINITY)
        );
        assert_eq!(
            imp.process_bind(Value::Float(f64::INFINITY)).unwrap(),
            Value::Decimal(Numeric::Infinity)
        );
    }

    #[test]
    fn test_scale_zero_binds_unchanged() {
        let imp = adapt(SqlType::number(9, 0));
        assert_eq!(imp.process_bind(Value::Integer(12)).unwrap(), Value::Integer(12));
    }

    #[test]
    fn test_result_processing() {
        let errors = EncodingErrors::Strict;
        assert_eq!(
            adapt(SqlType::Integer).process_result(Value::Float(5.0), errors).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            adapt(SqlType::numeric(5, 0).asdecimal(false))
                .process_result(Value::Integer(53), errors)
                .unwrap(),
            Value::Float(53.0)
        );
        assert_eq!(
            adapt(SqlType::number(9, None))
                .process_result(Value::Integer(12), errors)
                .unwrap(),
            Value::Integer(12)
        );
        assert_eq!(
            adapt(SqlType::number(9, None))
                .process_result(Value::from(Decimal::new(1576, 2)), errors)
                .unwrap(),
            Value::Float(15.76)
        );
        assert_eq!(
            adapt(SqlType::string(None))
                .process_result(Value::Bytes(b"hello".to_vec()), errors)
                .unwrap(),
            Value::from("hello")
        );
        assert_eq!(
            adapt(SqlType::Boolean).process_result(Value::Integer(1), errors).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_date_result_drops_time() {
        use crate::types::OracleDate;
        let imp = adapt(SqlType::Date);
        let value = Value::Date(OracleDate::new(2007, 10, 30, 11, 2, 32));
        assert_eq!(
            imp.process_result(value, EncodingErrors::Strict).unwrap(),
            Value::Date(OracleDate::date(2007, 10, 30))
        );
    }
}
