//! Column types and cell storage
//!
//! Every stored cell is a [`Datum`]: the Oracle type it was encoded as plus
//! its bytes in Oracle's internal format (NUMBER mantissa, 7-byte DATE,
//! sortable BINARY_DOUBLE and so on). Character data and LOB content are
//! kept as UTF-8. Converting between types goes through [`Scalar`].

use std::cmp::Ordering;
use std::str::FromStr;

use bytes::Bytes;
use chrono::Duration;
use indexmap::IndexMap;
use bigdecimal::BigDecimal;

use super::sql::TypeSpec;
use crate::constants::{csfrm, OracleType, FLOAT_BINARY_PRECISION, INTEGER_PRECISION, SCALE_UNKNOWN};
use crate::error::{code, Error, Result};
use crate::statement::ColumnInfo;
use crate::types::{
    decode_binary_double, decode_binary_float, decode_interval_ds, decode_oracle_number,
    decode_oracle_timestamp, encode_binary_double, encode_binary_float, encode_interval_ds,
    encode_oracle_date, encode_oracle_number, encode_oracle_timestamp, parse_rowid_string,
    place_point, IntervalParts, OracleNumber, OracleTimestamp, RowId,
};

/// Storage type of a column, a cast target or an expression
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ColumnType {
    pub oracle_type: OracleType,
    pub csfrm: u8,
    /// Describe precision; leading precision for intervals
    pub precision: i16,
    /// Describe scale; fractional precision for datetimes and intervals
    pub scale: i16,
    /// Maximum length, 0 when unbounded
    pub size: u32,
    pub char_semantics: bool,
    /// `DATA_TYPE` reported by the column dictionary
    pub dictionary_type: String,
    pub dictionary_precision: Option<u32>,
    pub dictionary_scale: Option<i32>,
}

impl ColumnType {
    fn new(oracle_type: OracleType) -> Self {
        let csfrm = if oracle_type.is_character() {
            csfrm::IMPLICIT
        } else {
            0
        };
        Self {
            oracle_type,
            csfrm,
            precision: 0,
            scale: 0,
            size: 0,
            char_semantics: false,
            dictionary_type: oracle_type.name().to_string(),
            dictionary_precision: None,
            dictionary_scale: None,
        }
    }

    /// Type of a value produced by an expression rather than a column
    pub fn natural(oracle_type: OracleType, csfrm: u8) -> Self {
        let mut ty = Self::new(oracle_type);
        if oracle_type.is_character() {
            ty.csfrm = csfrm;
        }
        match oracle_type {
            OracleType::Number => ty.scale = SCALE_UNKNOWN,
            OracleType::Timestamp | OracleType::TimestampTz => ty.scale = 6,
            OracleType::IntervalDs => {
                ty.precision = 9;
                ty.scale = 9;
            }
            _ => {}
        }
        ty
    }

    fn number(precision: i16, scale: i16) -> Self {
        let mut ty = Self::new(OracleType::Number);
        ty.precision = precision;
        ty.scale = scale;
        ty
    }

    fn character(oracle_type: OracleType, national: bool, size: u32, char_semantics: bool) -> Self {
        let mut ty = Self::new(oracle_type);
        if national {
            ty.csfrm = csfrm::NCHAR;
        }
        ty.size = size;
        ty.char_semantics = national || char_semantics;
        ty
    }

    /// Resolve a declared type
    pub fn from_spec(spec: &TypeSpec) -> Result<Self> {
        let precision_range = |p: u32| {
            if (1..=38).contains(&p) {
                Ok(p)
            } else {
                Err(Error::oracle(
                    1727,
                    "numeric precision specifier is out of range (1 to 38)",
                ))
            }
        };
        let required_length = || {
            spec.precision
                .ok_or_else(|| Error::oracle(code::MISSING_LEFT_PAREN, "missing left parenthesis"))
        };

        let ty = match spec.name.as_str() {
            "INTEGER" | "INT" | "SMALLINT" => {
                let mut ty = Self::number(INTEGER_PRECISION, 0);
                ty.dictionary_scale = Some(0);
                ty
            }
            "NUMBER" | "NUMERIC" | "DECIMAL" | "DEC" => match (spec.precision, spec.scale) {
                (Some(p), scale) => {
                    let p = precision_range(p)?;
                    let s = scale.unwrap_or(0);
                    let mut ty = Self::number(p as i16, s as i16);
                    ty.dictionary_type = "NUMBER".to_string();
                    ty.dictionary_precision = Some(p);
                    ty.dictionary_scale = Some(s);
                    ty
                }
                (None, Some(s)) => {
                    let mut ty = Self::number(INTEGER_PRECISION, s as i16);
                    ty.dictionary_type = "NUMBER".to_string();
                    ty.dictionary_scale = Some(s);
                    ty
                }
                (None, None) if spec.name == "NUMBER" => Self::number(0, SCALE_UNKNOWN),
                (None, None) => {
                    let mut ty = Self::number(INTEGER_PRECISION, 0);
                    ty.dictionary_type = "NUMBER".to_string();
                    ty.dictionary_scale = Some(0);
                    ty
                }
            },
            "FLOAT" | "REAL" | "DOUBLE PRECISION" => {
                let binary_precision = match spec.name.as_str() {
                    "REAL" => 63,
                    "DOUBLE PRECISION" => FLOAT_BINARY_PRECISION as u32,
                    _ => spec.precision.unwrap_or(FLOAT_BINARY_PRECISION as u32),
                };
                if !(1..=126).contains(&binary_precision) {
                    return Err(Error::oracle(
                        1724,
                        "floating point precision is out of range (1 to 126)",
                    ));
                }
                let mut ty = Self::number(binary_precision as i16, SCALE_UNKNOWN);
                ty.dictionary_type = "FLOAT".to_string();
                ty.dictionary_precision = Some(binary_precision);
                ty
            }
            "BINARY_DOUBLE" => Self::new(OracleType::BinaryDouble),
            "BINARY_FLOAT" => Self::new(OracleType::BinaryFloat),
            "VARCHAR2" | "VARCHAR" => Self::character(
                OracleType::Varchar,
                false,
                required_length()?,
                spec.char_semantics.unwrap_or(false),
            ),
            "NVARCHAR2" => {
                let mut ty = Self::character(OracleType::Varchar, true, required_length()?, true);
                ty.dictionary_type = "NVARCHAR2".to_string();
                ty
            }
            "CHAR" | "CHARACTER" => Self::character(
                OracleType::Char,
                false,
                spec.precision.unwrap_or(1),
                spec.char_semantics.unwrap_or(false),
            ),
            "NCHAR" => {
                let mut ty =
                    Self::character(OracleType::Char, true, spec.precision.unwrap_or(1), true);
                ty.dictionary_type = "NCHAR".to_string();
                ty
            }
            "LONG" => Self::new(OracleType::Long),
            "CLOB" => Self::new(OracleType::Clob),
            "NCLOB" => {
                let mut ty = Self::character(OracleType::Clob, true, 0, true);
                ty.dictionary_type = "NCLOB".to_string();
                ty
            }
            "BLOB" => Self::new(OracleType::Blob),
            "RAW" => {
                let mut ty = Self::new(OracleType::Raw);
                ty.size = required_length()?;
                ty
            }
            "DATE" => Self::new(OracleType::Date),
            "TIMESTAMP" => {
                let fractional = spec.precision.unwrap_or(6).min(9);
                let oracle_type = if spec.with_time_zone {
                    OracleType::TimestampTz
                } else {
                    OracleType::Timestamp
                };
                let mut ty = Self::new(oracle_type);
                ty.scale = fractional as i16;
                ty.dictionary_type = if spec.with_time_zone {
                    format!("TIMESTAMP({}) WITH TIME ZONE", fractional)
                } else {
                    format!("TIMESTAMP({})", fractional)
                };
                ty
            }
            "INTERVAL DAY TO SECOND" => {
                let day = spec.day_precision.unwrap_or(2).min(9);
                let second = spec.second_precision.unwrap_or(6).min(9);
                let mut ty = Self::new(OracleType::IntervalDs);
                ty.precision = day as i16;
                ty.scale = second as i16;
                ty.dictionary_type = format!("INTERVAL DAY({}) TO SECOND({})", day, second);
                ty
            }
            "ROWID" => Self::new(OracleType::Rowid),
            _ => return Err(Error::oracle(code::INVALID_DATATYPE, "invalid datatype")),
        };
        Ok(ty)
    }

    /// Describe metadata for a result column of this type
    pub fn describe(&self, name: &str) -> ColumnInfo {
        let mut info = ColumnInfo::new(name, self.oracle_type)
            .with_precision(self.precision, self.scale)
            .with_size(self.size);
        if self.oracle_type.is_character() {
            info.csfrm = self.csfrm;
        }
        info
    }

    /// `CHAR_LENGTH` reported by the column dictionary
    pub fn char_length(&self) -> u32 {
        match self.oracle_type {
            OracleType::Varchar | OracleType::Char => self.size,
            _ => 0,
        }
    }

    fn is_national(&self) -> bool {
        self.csfrm == csfrm::NCHAR
    }
}

/// A non-null stored value
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Datum {
    pub oracle_type: OracleType,
    pub csfrm: u8,
    pub data: Bytes,
}

impl Datum {
    pub fn new(oracle_type: OracleType, data: impl Into<Bytes>) -> Self {
        let csfrm = if oracle_type.is_character() {
            csfrm::IMPLICIT
        } else {
            0
        };
        Self {
            oracle_type,
            csfrm,
            data: data.into(),
        }
    }

    pub fn national(mut self) -> Self {
        self.csfrm = csfrm::NCHAR;
        self
    }

    pub fn number(text: &str) -> Result<Self> {
        let data = encode_oracle_number(text)
            .map_err(|_| Error::oracle(code::INVALID_NUMBER, "invalid number"))?;
        Ok(Self::new(OracleType::Number, data))
    }

    pub fn text(oracle_type: OracleType, text: &str) -> Self {
        Self::new(oracle_type, Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Decode into a type-independent value
    pub fn decode(&self) -> Result<Scalar> {
        Ok(match self.oracle_type {
            OracleType::Number | OracleType::Boolean => {
                Scalar::Number(decode_oracle_number(&self.data)?)
            }
            OracleType::BinaryDouble => Scalar::Double(decode_binary_double(&self.data)?),
            OracleType::BinaryFloat => Scalar::Double(decode_binary_float(&self.data)? as f64),
            OracleType::Varchar | OracleType::Char | OracleType::Long | OracleType::Clob => {
                Scalar::Text(self.utf8()?.to_string())
            }
            OracleType::Raw | OracleType::Blob => Scalar::Bytes(self.data.clone()),
            OracleType::Date | OracleType::Timestamp | OracleType::TimestampTz => {
                Scalar::Timestamp(decode_oracle_timestamp(&self.data)?)
            }
            OracleType::IntervalDs => Scalar::Interval(decode_interval_ds(&self.data)?),
            OracleType::Rowid => Scalar::RowId(parse_rowid_string(self.utf8()?)?),
        })
    }

    /// Stored character data
    pub fn utf8(&self) -> Result<&str> {
        std::str::from_utf8(&self.data)
            .map_err(|e| Error::Internal(format!("stored character data is not UTF-8: {}", e)))
    }
}

/// A decoded value, independent of the type it was stored as
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Scalar {
    Number(OracleNumber),
    Double(f64),
    Text(String),
    Bytes(Bytes),
    Timestamp(OracleTimestamp),
    Interval(Duration),
    RowId(RowId),
}

impl Scalar {
    fn type_name(&self) -> &'static str {
        match self {
            Scalar::Number(_) => "NUMBER",
            Scalar::Double(_) => "BINARY_DOUBLE",
            Scalar::Text(_) => "CHAR",
            Scalar::Bytes(_) => "BINARY",
            Scalar::Timestamp(_) => "TIMESTAMP",
            Scalar::Interval(_) => "INTERVAL DAY TO SECOND",
            Scalar::RowId(_) => "ROWID",
        }
    }

    fn to_f64(&self) -> Result<f64> {
        match self {
            Scalar::Number(n) => n.to_f64(),
            Scalar::Double(f) => Ok(*f),
            Scalar::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::oracle(code::INVALID_NUMBER, "invalid number")),
            other => Err(inconsistent("NUMBER", other)),
        }
    }

    /// Number text in canonical form, for storage as NUMBER
    fn to_number_text(&self) -> Result<String> {
        match self {
            Scalar::Number(n) if n.is_max_negative => {
                Err(Error::oracle(code::NUMERIC_OVERFLOW, "numeric overflow"))
            }
            Scalar::Number(n) => Ok(n.value.clone()),
            Scalar::Double(f) if !f.is_finite() => {
                Err(Error::oracle(code::NUMERIC_OVERFLOW, "numeric overflow"))
            }
            Scalar::Double(f) => Ok(format!("{:e}", f)),
            Scalar::Text(s) => {
                let trimmed = s.trim();
                encode_oracle_number(trimmed)
                    .map_err(|_| Error::oracle(code::INVALID_NUMBER, "invalid number"))?;
                Ok(trimmed.to_string())
            }
            other => Err(inconsistent("NUMBER", other)),
        }
    }

    fn to_text(&self) -> Result<String> {
        Ok(match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => n.to_text('.'),
            Scalar::Double(f) => f.to_string(),
            Scalar::Bytes(b) => b.iter().map(|byte| format!("{:02X}", byte)).collect(),
            Scalar::Timestamp(ts) => format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second
            ),
            Scalar::Interval(d) => {
                let parts = IntervalParts::from_duration(d);
                format!(
                    "+{:02} {:02}:{:02}:{:02}",
                    parts.days, parts.hours, parts.minutes, parts.seconds
                )
            }
            Scalar::RowId(r) => r.encode(),
        })
    }
}

fn inconsistent(expected: &str, got: &Scalar) -> Error {
    Error::oracle(
        code::INCONSISTENT_DATATYPES,
        format!("inconsistent datatypes: expected {} got {}", expected, got.type_name()),
    )
}

/// Convert a value for storage in a column (or a cast) of type `target`
///
/// `label` names the column in error messages, e.g. `"T1"."DATA"`.
pub(super) fn store(value: Scalar, target: &ColumnType, label: &str) -> Result<Datum> {
    let datum = match target.oracle_type {
        OracleType::Number | OracleType::Boolean => {
            let text = fit_number(&value.to_number_text()?, target)?;
            Datum::number(&text)?
        }
        OracleType::BinaryDouble => {
            Datum::new(OracleType::BinaryDouble, encode_binary_double(value.to_f64()?).to_vec())
        }
        OracleType::BinaryFloat => Datum::new(
            OracleType::BinaryFloat,
            encode_binary_float(value.to_f64()? as f32).to_vec(),
        ),
        OracleType::Varchar | OracleType::Char | OracleType::Long | OracleType::Clob => {
            let mut text = value.to_text()?;
            if target.size > 0 && target.oracle_type != OracleType::Clob {
                let actual = if target.char_semantics {
                    text.chars().count()
                } else {
                    text.len()
                };
                let maximum = target.size as usize;
                if actual > maximum {
                    return Err(too_large(label, actual, maximum));
                }
                if target.oracle_type == OracleType::Char {
                    text.extend(std::iter::repeat(' ').take(maximum - actual));
                }
            }
            let datum = Datum::text(target.oracle_type, &text);
            if target.is_national() {
                datum.national()
            } else {
                datum
            }
        }
        OracleType::Raw | OracleType::Blob => {
            let bytes = match value {
                Scalar::Bytes(b) => b,
                Scalar::Text(s) => decode_hex(&s)?,
                other => return Err(inconsistent("BINARY", &other)),
            };
            if target.oracle_type == OracleType::Raw
                && target.size > 0
                && bytes.len() > target.size as usize
            {
                return Err(too_large(label, bytes.len(), target.size as usize));
            }
            Datum::new(target.oracle_type, bytes)
        }
        OracleType::Date => match value {
            Scalar::Timestamp(ts) => {
                Datum::new(OracleType::Date, encode_oracle_date(&ts.to_date()).to_vec())
            }
            other => return Err(inconsistent("DATE", &other)),
        },
        OracleType::Timestamp | OracleType::TimestampTz => match value {
            Scalar::Timestamp(mut ts) => {
                let with_tz = target.oracle_type == OracleType::TimestampTz;
                if !with_tz {
                    ts = ts.with_offset(0, 0);
                }
                if (0..6).contains(&target.scale) {
                    let unit = 10u32.pow(6 - target.scale as u32);
                    ts.microsecond -= ts.microsecond % unit;
                }
                Datum::new(target.oracle_type, encode_oracle_timestamp(&ts, with_tz))
            }
            other => return Err(inconsistent("TIMESTAMP", &other)),
        },
        OracleType::IntervalDs => match value {
            Scalar::Interval(d) => {
                let parts = IntervalParts::from_duration(&d);
                if target.precision > 0 && parts.day_digits() > target.precision as u32 {
                    return Err(Error::oracle(
                        code::INTERVAL_PRECISION,
                        "the leading precision of the interval is too small",
                    ));
                }
                Datum::new(OracleType::IntervalDs, encode_interval_ds(&d)?.to_vec())
            }
            other => return Err(inconsistent("INTERVAL DAY TO SECOND", &other)),
        },
        OracleType::Rowid => {
            let rowid = match value {
                Scalar::RowId(r) => r,
                Scalar::Text(s) => parse_rowid_string(s.trim())
                    .map_err(|_| Error::oracle(1410, "invalid ROWID"))?,
                other => return Err(inconsistent("ROWID", &other)),
            };
            Datum::text(OracleType::Rowid, &rowid.encode())
        }
    };
    Ok(datum)
}

fn too_large(label: &str, actual: usize, maximum: usize) -> Error {
    Error::oracle(
        code::VALUE_TOO_LARGE,
        format!(
            "value too large for column {} (actual: {}, maximum: {})",
            label, actual, maximum
        ),
    )
}

fn decode_hex(text: &str) -> Result<Bytes> {
    let text = text.trim();
    let invalid = || Error::oracle(code::INVALID_HEX, "invalid hex number");
    if text.len() % 2 != 0 {
        return Err(invalid());
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(invalid)
        })
        .collect::<Result<Vec<u8>>>()
        .map(Bytes::from)
}

/// Round to the column scale and enforce its precision
///
/// Works on the decimal digits directly, so the full 38-digit range of
/// NUMBER is checked without loss.
fn fit_number(text: &str, target: &ColumnType) -> Result<String> {
    if target.scale == SCALE_UNKNOWN || target.precision == 0 {
        return Ok(text.to_string());
    }
    let exceeded = || {
        Error::oracle(
            code::PRECISION_EXCEEDED,
            "value larger than specified precision allowed for this column",
        )
    };
    let value = BigDecimal::from_str(text.trim())
        .map_err(|_| Error::oracle(code::INVALID_NUMBER, "invalid number"))?;
    let (mantissa, exponent) = value.as_bigint_and_exponent();
    let mantissa = mantissa.to_string();
    let (negative, mut digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, mantissa),
    };

    let scale = i64::from(target.scale);
    let mut exponent = exponent;
    if exponent > scale {
        let dropped = usize::try_from(exponent - scale).map_err(|_| exceeded())?;
        if digits.len() <= dropped {
            digits.insert_str(0, &"0".repeat(dropped + 1 - digits.len()));
        }
        let round_up = digits.as_bytes()[digits.len() - dropped] >= b'5';
        digits.truncate(digits.len() - dropped);
        if round_up {
            digits = increment_digits(&digits);
        }
        exponent = scale;
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok("0".to_string());
    }
    let magnitude = significant.len() as i64 - exponent;
    if magnitude > i64::from(target.precision) - scale {
        return Err(exceeded());
    }
    let sign = if negative { "-" } else { "" };
    Ok(format!("{}{}", sign, place_point(significant, exponent)))
}

/// Add one to a string of decimal digits
fn increment_digits(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }
    format!("1{}", String::from_utf8_lossy(&bytes))
}

/// Order two non-null values the way Oracle compares them
///
/// Two CHAR values compare with blank-padded semantics; any other character
/// comparison is exact.
pub(super) fn compare(a: &Datum, b: &Datum) -> Result<Ordering> {
    let blank_padded = a.oracle_type == OracleType::Char && b.oracle_type == OracleType::Char;
    let (left, right) = (a.decode()?, b.decode()?);
    Ok(match (&left, &right) {
        (Scalar::Number(x), Scalar::Number(y)) => {
            match (
                x.to_numeric()?.to_big_decimal(),
                y.to_numeric()?.to_big_decimal(),
            ) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => compare_f64(x.to_f64()?, y.to_f64()?),
            }
        }
        (Scalar::Number(_) | Scalar::Double(_), Scalar::Number(_) | Scalar::Double(_)) => {
            compare_f64(left.to_f64()?, right.to_f64()?)
        }
        (Scalar::Text(x), Scalar::Text(y)) if blank_padded => {
            x.trim_end_matches(' ').cmp(y.trim_end_matches(' '))
        }
        (Scalar::Text(x), Scalar::Text(y)) => x.cmp(y),
        (Scalar::Text(_), Scalar::Number(_) | Scalar::Double(_))
        | (Scalar::Number(_) | Scalar::Double(_), Scalar::Text(_)) => {
            compare_f64(left.to_f64()?, right.to_f64()?)
        }
        (Scalar::Bytes(x), Scalar::Bytes(y)) => x.cmp(y),
        (Scalar::Timestamp(x), Scalar::Timestamp(y)) => x.cmp(y),
        (Scalar::Interval(x), Scalar::Interval(y)) => x.cmp(y),
        (Scalar::RowId(x), Scalar::RowId(y)) => x.cmp(y),
        (Scalar::RowId(x), Scalar::Text(y)) => x.encode().as_str().cmp(y.trim()),
        (Scalar::Text(x), Scalar::RowId(y)) => x.trim().cmp(y.encode().as_str()),
        (_, other) => return Err(inconsistent(left.type_name(), other)),
    })
}

/// NaN sorts above every other value
fn compare_f64(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// A column of a stored table
#[derive(Debug, Clone)]
pub(super) struct StoredColumn {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

/// A stored row
#[derive(Debug, Clone)]
pub(super) struct StoredRow {
    pub rowid: RowId,
    pub cells: Vec<Option<Datum>>,
}

/// A table and its rows, in insertion order
#[derive(Debug, Clone)]
pub(super) struct TableData {
    pub name: String,
    pub columns: Vec<StoredColumn>,
    pub rows: Vec<StoredRow>,
    object_id: u32,
    next_slot: u32,
}

impl TableData {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Label used in error messages for a column
    pub fn label(&self, column: usize) -> String {
        let name = self.columns.get(column).map_or("", |c| c.name.as_str());
        format!("\"{}\".\"{}\"", self.name, name)
    }

    /// Append a row after checking NOT NULL and primary key constraints
    pub fn insert(&mut self, cells: Vec<Option<Datum>>) -> Result<&StoredRow> {
        for (i, column) in self.columns.iter().enumerate() {
            if !column.nullable && cells.get(i).map_or(true, Option::is_none) {
                return Err(Error::oracle(
                    code::CANNOT_INSERT_NULL,
                    format!("cannot insert NULL into (\"{}\".\"{}\")", self.name, column.name),
                ));
            }
        }

        let key: Vec<usize> = (0..self.columns.len())
            .filter(|i| self.columns[*i].primary_key)
            .collect();
        if !key.is_empty() {
            for row in &self.rows {
                let mut same = true;
                for &i in &key {
                    same &= match (&row.cells[i], &cells[i]) {
                        (Some(a), Some(b)) => compare(a, b)? == Ordering::Equal,
                        _ => false,
                    };
                }
                if same {
                    return Err(Error::oracle(
                        code::UNIQUE_VIOLATED,
                        format!("unique constraint (SYS_{}_PK) violated", self.name),
                    ));
                }
            }
        }

        let slot = self.next_slot;
        self.next_slot += 1;
        let rowid = RowId::new(self.object_id, 4, 130 + slot / 64, (slot % 64) as u16);
        self.rows.push(StoredRow { rowid, cells });
        self.rows
            .last()
            .ok_or_else(|| Error::Internal("row vanished after insert".to_string()))
    }
}

/// All tables of a database
#[derive(Debug, Default)]
pub(super) struct Catalog {
    tables: IndexMap<String, TableData>,
    next_object_id: u32,
}

impl Catalog {
    pub fn table(&self, name: &str) -> Result<&TableData> {
        self.tables.get(name).ok_or_else(table_not_found)
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut TableData> {
        self.tables.get_mut(name).ok_or_else(table_not_found)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableData> {
        self.tables.values()
    }

    pub fn create_table(&mut self, name: String, columns: Vec<StoredColumn>) -> Result<()> {
        if self.tables.contains_key(&name) {
            return Err(Error::oracle(
                code::NAME_IN_USE,
                "name is already used by an existing object",
            ));
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::oracle(
                    957,
                    format!("duplicate column name \"{}\"", column.name),
                ));
            }
        }
        self.next_object_id += 1;
        let table = TableData {
            name: name.clone(),
            columns,
            rows: Vec::new(),
            object_id: 73_000 + self.next_object_id,
            next_slot: 0,
        };
        self.tables.insert(name, table);
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(table_not_found)
    }
}

fn table_not_found() -> Error {
    Error::oracle(code::TABLE_NOT_FOUND, "table or view does not exist")
}
