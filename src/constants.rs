//! Oracle type numbers and related constants
//!
//! Type numbers follow Oracle's internal ORA_TYPE_NUM values so that
//! describe metadata produced by any driver can be matched directly.

// =============================================================================
// Oracle Data Types (ORA_TYPE_NUM)
// =============================================================================

/// Oracle internal data type numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OracleType {
    /// VARCHAR2 / NVARCHAR2 string type
    Varchar = 1,
    /// NUMBER type (also FLOAT, INTEGER)
    Number = 2,
    /// LONG string type
    Long = 8,
    /// ROWID
    Rowid = 11,
    /// DATE type
    Date = 12,
    /// RAW binary type
    Raw = 23,
    /// CHAR / NCHAR fixed-length string
    Char = 96,
    /// BINARY_FLOAT
    BinaryFloat = 100,
    /// BINARY_DOUBLE
    BinaryDouble = 101,
    /// CLOB / NCLOB
    Clob = 112,
    /// BLOB
    Blob = 113,
    /// TIMESTAMP
    Timestamp = 180,
    /// TIMESTAMP WITH TIME ZONE
    TimestampTz = 181,
    /// INTERVAL DAY TO SECOND
    IntervalDs = 183,
    /// BOOLEAN (23c+)
    Boolean = 252,
}

impl OracleType {
    /// Check if this type is a LOB type whose values arrive as locators
    pub fn is_lob(&self) -> bool {
        matches!(self, OracleType::Clob | OracleType::Blob)
    }

    /// Check if values of this type are character data
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            OracleType::Varchar | OracleType::Char | OracleType::Long | OracleType::Clob
        )
    }

    /// Oracle's name for this type in describe output
    pub fn name(&self) -> &'static str {
        match self {
            OracleType::Varchar => "VARCHAR2",
            OracleType::Number => "NUMBER",
            OracleType::Long => "LONG",
            OracleType::Rowid => "ROWID",
            OracleType::Date => "DATE",
            OracleType::Raw => "RAW",
            OracleType::Char => "CHAR",
            OracleType::BinaryFloat => "BINARY_FLOAT",
            OracleType::BinaryDouble => "BINARY_DOUBLE",
            OracleType::Clob => "CLOB",
            OracleType::Blob => "BLOB",
            OracleType::Timestamp => "TIMESTAMP",
            OracleType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            OracleType::IntervalDs => "INTERVAL DAY TO SECOND",
            OracleType::Boolean => "BOOLEAN",
        }
    }
}

// =============================================================================
// Character Set Form (CSFRM)
// =============================================================================

/// Character set form (CSFRM) constants
pub mod csfrm {
    /// Implicit charset (database charset)
    pub const IMPLICIT: u8 = 1;
    /// NCHAR charset
    pub const NCHAR: u8 = 2;
}

// =============================================================================
// Numeric Metadata
// =============================================================================

/// Scale Oracle reports for NUMBER values of unknown scale
pub const SCALE_UNKNOWN: i16 = -127;

/// Binary precision Oracle reports for FLOAT and DOUBLE PRECISION
pub const FLOAT_BINARY_PRECISION: i16 = 126;

/// Precision Oracle reports for INTEGER columns
pub const INTEGER_PRECISION: i16 = 38;

// =============================================================================
// Miscellaneous Constants
// =============================================================================

/// Default LOB chunk size used when streaming LOB content
pub const LOB_CHUNK_SIZE: u32 = 8060;

/// Default fetch batch size
pub const DEFAULT_ARRAYSIZE: usize = 100;

/// Default scale used when quantizing binds for decimal columns without one
pub const DEFAULT_DECIMAL_SCALE: u32 = 10;
