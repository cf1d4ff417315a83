//! Abstract column types
//!
//! [`SqlType`] names an application-level notion of a column type. The
//! Oracle dialect compiles it to DDL and adapts it to a [`DialectImpl`]
//! that knows how values are bound and fetched.
//!
//! [`DialectImpl`]: crate::dialect::DialectImpl

use std::fmt;
use std::sync::Arc;

use crate::dialect::OracleDialect;
use crate::row::Value;

/// A user-defined type that picks its implementation per dialect
pub trait TypeDecorator: fmt::Debug + Send + Sync {
    /// The type used when no dialect-specific choice is made
    fn impl_type(&self) -> SqlType;

    /// The type to use for the given dialect
    fn load_dialect_impl(&self, dialect: &OracleDialect) -> SqlType {
        let _ = dialect;
        self.impl_type()
    }
}

/// Shared handle to a [`TypeDecorator`], compared by identity
#[derive(Clone)]
pub struct Decorator(pub Arc<dyn TypeDecorator>);

impl PartialEq for Decorator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Abstract column type
///
/// Lengths and precisions left as `None` take the dialect's default.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SqlType {
    // Generic types
    /// Variable-length string
    String { length: Option<u32> },
    /// Variable-length string holding arbitrary Unicode text
    Unicode { length: Option<u32> },
    /// Unbounded text
    Text,
    /// Unbounded Unicode text
    UnicodeText,
    /// SQL-standard VARCHAR
    Varchar { length: Option<u32> },
    /// SQL-standard NVARCHAR
    NVarchar { length: Option<u32> },
    /// Fixed-length string
    Char { length: Option<u32> },
    /// Fixed-length national string
    NChar { length: Option<u32> },
    /// Integer
    Integer,
    /// Small integer
    SmallInteger,
    /// Big integer
    BigInteger,
    /// Fixed-point number
    Numeric {
        precision: Option<u32>,
        scale: Option<u32>,
        asdecimal: bool,
    },
    /// Floating-point number
    Float { precision: Option<u32>, asdecimal: bool },
    /// Calendar date
    Date,
    /// Date and time
    DateTime,
    /// Timestamp with fractional seconds
    Timestamp { timezone: bool },
    /// Unbounded binary data
    LargeBinary,
    /// Boolean
    Boolean,
    /// Unknown type
    Null,

    // Oracle types
    /// VARCHAR2
    Varchar2 { length: Option<u32> },
    /// NVARCHAR2
    NVarchar2 { length: Option<u32> },
    /// NUMBER
    Number {
        precision: Option<u32>,
        scale: Option<u32>,
        asdecimal: bool,
    },
    /// BINARY_DOUBLE
    BinaryDouble { asdecimal: bool },
    /// BINARY_FLOAT
    BinaryFloat { asdecimal: bool },
    /// DOUBLE PRECISION
    DoublePrecision {
        precision: Option<u32>,
        scale: Option<u32>,
        asdecimal: bool,
    },
    /// Oracle DATE, which carries a time of day
    OracleDate,
    /// RAW
    Raw { length: Option<u32> },
    /// LONG
    Long,
    /// INTERVAL DAY TO SECOND
    Interval {
        day_precision: Option<u32>,
        second_precision: Option<u32>,
    },
    /// ROWID
    RowId,
    /// CLOB
    Clob,
    /// NCLOB
    NClob,
    /// BLOB
    Blob,

    // Composite types
    /// A default type with per-dialect overrides
    Variant {
        default: Box<SqlType>,
        variants: Vec<(String, SqlType)>,
    },
    /// A user-defined decorator
    Decorated(Decorator),
}

impl SqlType {
    /// `String(length)`
    pub fn string(length: impl Into<Option<u32>>) -> Self {
        SqlType::String { length: length.into() }
    }

    /// `Unicode(length)`
    pub fn unicode(length: impl Into<Option<u32>>) -> Self {
        SqlType::Unicode { length: length.into() }
    }

    /// `VARCHAR(length)`
    pub fn varchar(length: impl Into<Option<u32>>) -> Self {
        SqlType::Varchar { length: length.into() }
    }

    /// `NVARCHAR(length)`
    pub fn nvarchar(length: impl Into<Option<u32>>) -> Self {
        SqlType::NVarchar { length: length.into() }
    }

    /// `CHAR(length)`
    pub fn char(length: impl Into<Option<u32>>) -> Self {
        SqlType::Char { length: length.into() }
    }

    /// `NCHAR(length)`
    pub fn nchar(length: impl Into<Option<u32>>) -> Self {
        SqlType::NChar { length: length.into() }
    }

    /// `VARCHAR2(length)`
    pub fn varchar2(length: impl Into<Option<u32>>) -> Self {
        SqlType::Varchar2 { length: length.into() }
    }

    /// `NVARCHAR2(length)`
    pub fn nvarchar2(length: impl Into<Option<u32>>) -> Self {
        SqlType::NVarchar2 { length: length.into() }
    }

    /// `RAW(length)`
    pub fn raw(length: impl Into<Option<u32>>) -> Self {
        SqlType::Raw { length: length.into() }
    }

    /// `Numeric(precision, scale)`, returning decimals
    pub fn numeric(precision: impl Into<Option<u32>>, scale: impl Into<Option<u32>>) -> Self {
        SqlType::Numeric {
            precision: precision.into(),
            scale: scale.into(),
            asdecimal: true,
        }
    }

    /// `Float(precision)`, returning native floats
    pub fn float(precision: impl Into<Option<u32>>) -> Self {
        SqlType::Float {
            precision: precision.into(),
            asdecimal: false,
        }
    }

    /// `NUMBER(precision, scale)`; returns decimals only when the scale is
    /// positive
    pub fn number(precision: impl Into<Option<u32>>, scale: impl Into<Option<u32>>) -> Self {
        let scale = scale.into();
        SqlType::Number {
            precision: precision.into(),
            scale,
            asdecimal: scale.map_or(false, |s| s > 0),
        }
    }

    /// `BINARY_DOUBLE`
    pub fn binary_double() -> Self {
        SqlType::BinaryDouble { asdecimal: false }
    }

    /// `BINARY_FLOAT`
    pub fn binary_float() -> Self {
        SqlType::BinaryFloat { asdecimal: false }
    }

    /// `DOUBLE PRECISION`
    pub fn double_precision() -> Self {
        SqlType::DoublePrecision {
            precision: None,
            scale: None,
            asdecimal: false,
        }
    }

    /// `INTERVAL DAY(day_precision) TO SECOND(second_precision)`
    pub fn interval(
        day_precision: impl Into<Option<u32>>,
        second_precision: impl Into<Option<u32>>,
    ) -> Self {
        SqlType::Interval {
            day_precision: day_precision.into(),
            second_precision: second_precision.into(),
        }
    }

    /// `TIMESTAMP`, optionally with time zone
    pub fn timestamp(timezone: bool) -> Self {
        SqlType::Timestamp { timezone }
    }

    /// Wrap a user-defined decorator
    pub fn decorated(decorator: impl TypeDecorator + 'static) -> Self {
        SqlType::Decorated(Decorator(Arc::new(decorator)))
    }

    /// Override the numeric return representation
    ///
    /// Has no effect on non-numeric types.
    pub fn asdecimal(mut self, value: bool) -> Self {
        match &mut self {
            SqlType::Numeric { asdecimal, .. }
            | SqlType::Float { asdecimal, .. }
            | SqlType::Number { asdecimal, .. }
            | SqlType::BinaryDouble { asdecimal }
            | SqlType::BinaryFloat { asdecimal }
            | SqlType::DoublePrecision { asdecimal, .. } => *asdecimal = value,
            _ => {}
        }
        self
    }

    /// Use `ty` instead of this type on the named dialect
    pub fn with_variant(self, ty: SqlType, dialect_name: &str) -> Self {
        match self {
            SqlType::Variant {
                default,
                mut variants,
            } => {
                variants.push((dialect_name.to_string(), ty));
                SqlType::Variant { default, variants }
            }
            other => SqlType::Variant {
                default: Box::new(other),
                variants: vec![(dialect_name.to_string(), ty)],
            },
        }
    }

    /// Declared length of string and binary types
    pub fn length(&self) -> Option<u32> {
        match self {
            SqlType::String { length }
            | SqlType::Unicode { length }
            | SqlType::Varchar { length }
            | SqlType::NVarchar { length }
            | SqlType::Char { length }
            | SqlType::NChar { length }
            | SqlType::Varchar2 { length }
            | SqlType::NVarchar2 { length }
            | SqlType::Raw { length } => *length,
            _ => None,
        }
    }

    /// Whether this is a date-and-time type
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            SqlType::DateTime | SqlType::OracleDate | SqlType::Timestamp { .. }
        )
    }

    /// Whether values of this type are returned as decimals
    pub fn is_asdecimal(&self) -> bool {
        match self {
            SqlType::Numeric { asdecimal, .. }
            | SqlType::Float { asdecimal, .. }
            | SqlType::Number { asdecimal, .. }
            | SqlType::BinaryDouble { asdecimal }
            | SqlType::BinaryFloat { asdecimal }
            | SqlType::DoublePrecision { asdecimal, .. } => *asdecimal,
            _ => false,
        }
    }

    /// Type inferred for a bind value that carries no declared type
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::String(_) => SqlType::string(None),
            Value::Bytes(_) => SqlType::LargeBinary,
            Value::Integer(_) => SqlType::Integer,
            Value::Float(_) => SqlType::float(None),
            Value::Decimal(_) => SqlType::numeric(None, None),
            Value::Date(_) => SqlType::DateTime,
            Value::Timestamp(ts) => SqlType::timestamp(ts.has_timezone()),
            Value::Interval(_) => SqlType::interval(None, None),
            Value::RowId(_) => SqlType::RowId,
            Value::Boolean(_) => SqlType::Boolean,
            Value::Null | Value::Lob(_) => SqlType::Null,
        }
    }
}
