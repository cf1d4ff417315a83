//! Output handlers
//!
//! Before rows are fetched, every result column gets an [`OutputVar`] that
//! tells the driver how to fetch it, plus an optional [`OutConverter`] run
//! on each fetched value. Columns of statements that carry result types use
//! the typed handler of their numeric implementation; all other columns use
//! the connection-wide default handler.

use std::str::FromStr;

use tracing::trace;

use crate::config::EngineOptions;
use crate::constants::OracleType;
use crate::dialect::impls::NumericImpl;
use crate::driver::FetchAs;
use crate::error::{Error, Result};
use crate::row::Value;
use crate::statement::ColumnInfo;
use crate::types::Numeric;

/// Post-fetch conversion applied to each value of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutConverter {
    /// Text from an ambiguously described NUMBER: decimal if it has a
    /// fractional part, integer otherwise
    DetectDecimal {
        /// Session decimal character
        decimal_char: char,
    },
    /// Native float to decimal, keeping infinities
    FloatToDecimal,
}

impl OutConverter {
    /// Convert one fetched value
    pub fn apply(&self, value: Value) -> Result<Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (OutConverter::DetectDecimal { decimal_char }, Value::String(text)) => {
                detect_decimal(&text, *decimal_char)
            }
            (OutConverter::FloatToDecimal, Value::Float(f)) => {
                Ok(Value::Decimal(Numeric::from_f64(f)?))
            }
            (_, other) => Ok(other),
        }
    }
}

/// How one result column is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputVar {
    /// Driver fetch conversion
    pub fetch_as: FetchAs,
    /// Conversion applied after fetch
    pub converter: Option<OutConverter>,
}

impl OutputVar {
    fn fetch(fetch_as: FetchAs) -> Self {
        Self {
            fetch_as,
            converter: None,
        }
    }

    fn converted(fetch_as: FetchAs, converter: OutConverter) -> Self {
        Self {
            fetch_as,
            converter: Some(converter),
        }
    }
}

/// Connection-wide handler; `None` leaves the driver's default conversion
pub fn default_output(
    options: &EngineOptions,
    decimal_char: char,
    column: &ColumnInfo,
) -> Option<OutputVar> {
    let var = match column.oracle_type {
        OracleType::Number if !options.coerce_to_decimal => None,
        OracleType::Number if column.has_ambiguous_precision() => Some(OutputVar::converted(
            FetchAs::Text(options.encoding_errors),
            OutConverter::DetectDecimal { decimal_char },
        )),
        OracleType::Number if column.precision > 0 && column.scale > 0 => {
            Some(OutputVar::fetch(FetchAs::Decimal))
        }
        OracleType::Number if column.scale == 0 => None,
        OracleType::Number => Some(OutputVar::fetch(FetchAs::NativeFloat)),
        OracleType::Clob if options.auto_convert_lobs => {
            Some(OutputVar::fetch(FetchAs::LongString))
        }
        OracleType::Blob if options.auto_convert_lobs => {
            Some(OutputVar::fetch(FetchAs::LongBinary))
        }
        ty if ty.is_character() && !ty.is_lob() && options.coerce_to_unicode => {
            Some(OutputVar::fetch(FetchAs::Text(options.encoding_errors)))
        }
        _ => None,
    };
    trace!(column = %column.name, ?var, "default output handler");
    var
}

/// Handler installed for a column typed with a numeric implementation
pub fn typed_output(imp: &NumericImpl, column: &ColumnInfo) -> Option<OutputVar> {
    let native_source = matches!(
        column.oracle_type,
        OracleType::BinaryDouble | OracleType::BinaryFloat
    );
    let var = if imp.asdecimal {
        if native_source {
            Some(OutputVar::converted(FetchAs::NativeFloat, OutConverter::FloatToDecimal))
        } else {
            Some(OutputVar::fetch(FetchAs::Decimal))
        }
    } else if imp.is_number && column.scale == 0 {
        // integer NUMBER columns fetch best through the driver's default
        None
    } else {
        Some(OutputVar::fetch(FetchAs::NativeFloat))
    };
    trace!(column = %column.name, ?var, "typed output handler");
    var
}

fn detect_decimal(text: &str, decimal_char: char) -> Result<Value> {
    let mut normalized = if decimal_char == '.' {
        text.trim().to_string()
    } else {
        text.trim().replace(decimal_char, ".")
    };
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    } else if normalized.starts_with("-.") {
        normalized.insert(1, '0');
    }

    if normalized.contains('.') {
        return Numeric::from_str(&normalized).map(Value::Decimal);
    }
    match normalized.parse::<i64>() {
        Ok(i) => Ok(Value::Integer(i)),
        Err(_) => Numeric::from_str(&normalized).map(Value::Decimal).map_err(|_| {
            Error::DataConversionError(format!("invalid number text {:?}", text))
        }),
    }
}
