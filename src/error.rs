//! Error types for the Oracle dialect
//!
//! Errors raised by the driver seam are passed through unchanged, so an
//! `ORA-nnnnn` error from the database keeps its code and message all the
//! way up to the caller.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Oracle error codes surfaced by the dialect and the memory driver
pub mod code {
    /// ORA-00001: unique constraint violated
    pub const UNIQUE_VIOLATED: u32 = 1;
    /// ORA-00902: invalid datatype
    pub const INVALID_DATATYPE: u32 = 902;
    /// ORA-00904: invalid identifier
    pub const INVALID_IDENTIFIER: u32 = 904;
    /// ORA-00906: missing left parenthesis
    pub const MISSING_LEFT_PAREN: u32 = 906;
    /// ORA-00907: missing right parenthesis
    pub const MISSING_RIGHT_PAREN: u32 = 907;
    /// ORA-00913: too many values
    pub const TOO_MANY_VALUES: u32 = 913;
    /// ORA-00923: FROM keyword not found where expected
    pub const FROM_NOT_FOUND: u32 = 923;
    /// ORA-00932: inconsistent datatypes
    pub const INCONSISTENT_DATATYPES: u32 = 932;
    /// ORA-00933: SQL command not properly ended
    pub const NOT_PROPERLY_ENDED: u32 = 933;
    /// ORA-00936: missing expression
    pub const MISSING_EXPRESSION: u32 = 936;
    /// ORA-00947: not enough values
    pub const NOT_ENOUGH_VALUES: u32 = 947;
    /// ORA-01427: single-row subquery returns more than one row
    pub const SUBQUERY_ROWS: u32 = 1427;
    /// ORA-01465: invalid hex number
    pub const INVALID_HEX: u32 = 1465;
    /// ORA-00942: table or view does not exist
    pub const TABLE_NOT_FOUND: u32 = 942;
    /// ORA-00955: name is already used by an existing object
    pub const NAME_IN_USE: u32 = 955;
    /// ORA-01400: cannot insert NULL
    pub const CANNOT_INSERT_NULL: u32 = 1400;
    /// ORA-01426: numeric overflow
    pub const NUMERIC_OVERFLOW: u32 = 1426;
    /// ORA-01438: value larger than specified precision
    pub const PRECISION_EXCEEDED: u32 = 1438;
    /// ORA-01722: invalid number
    pub const INVALID_NUMBER: u32 = 1722;
    /// ORA-01873: leading precision of the interval is too small
    pub const INTERVAL_PRECISION: u32 = 1873;
    /// ORA-01008: not all variables bound
    pub const NOT_ALL_BOUND: u32 = 1008;
    /// ORA-00900: invalid SQL statement
    pub const INVALID_SQL: u32 = 900;
    /// ORA-12899: value too large for column
    pub const VALUE_TOO_LARGE: u32 = 12899;
}

/// Main error type for the Oracle dialect
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Database Errors
    // =========================================================================
    /// Oracle database error with error code
    #[error("ORA-{code:05}: {message}")]
    OracleError { code: u32, message: String },

    /// Misuse of a driver object, such as reading a LOB handle that a later
    /// fetch has invalidated
    #[error("{0}")]
    Programming(String),

    /// Table requested for reflection does not exist
    #[error("no such table: {0}")]
    NoSuchTable(String),

    // =========================================================================
    // Compilation Errors
    // =========================================================================
    /// A type or statement cannot be rendered for Oracle
    #[error("compile error: {0}")]
    Compile(String),

    /// A bind parameter named by the statement was not supplied
    #[error("missing bind parameter: {0}")]
    MissingParameter(String),

    // =========================================================================
    // Data Type Errors
    // =========================================================================
    /// Data conversion error
    #[error("data conversion error: {0}")]
    DataConversionError(String),

    /// Bytes that could not be decoded under the strict encoding policy
    #[error("'utf-8' codec can't decode bytes: {0}")]
    Decode(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine option
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Connection closed
    #[error("connection closed")]
    ConnectionClosed,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (should not happen)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Oracle database error
    pub fn oracle(code: u32, message: impl Into<String>) -> Self {
        Error::OracleError {
            code,
            message: message.into(),
        }
    }

    /// Create a compile error
    pub fn compile(message: impl Into<String>) -> Self {
        Error::Compile(message.into())
    }

    /// The ORA code, if this is a database error
    pub fn oracle_code(&self) -> Option<u32> {
        match self {
            Error::OracleError { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_error_display() {
        let err = Error::oracle(12899, "value too large for column \"T1\".\"DATA\"");
        assert_eq!(
            err.to_string(),
            "ORA-12899: value too large for column \"T1\".\"DATA\""
        );
        assert_eq!(err.oracle_code(), Some(12899));
    }

    #[test]
    fn test_programming_error_is_bare_message() {
        let err = Error::Programming("LOB variable no longer valid after subsequent fetch".into());
        assert_eq!(
            err.to_string(),
            "LOB variable no longer valid after subsequent fetch"
        );
        assert_eq!(err.oracle_code(), None);
    }
}
