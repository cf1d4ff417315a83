//! Driver seam
//!
//! The engine talks to an Oracle client library through the [`Driver`]
//! trait: execute a statement, receive describe metadata, tell the driver
//! how each column should be fetched, then fetch rows in batches. Input-size
//! hints are declared before execution with [`Driver::set_input_sizes`].
//!
//! [`memory`] provides an in-process Oracle emulation used by the test suite.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::config::EncodingErrors;
use crate::error::{Error, Result};
use crate::row::Value;
use crate::statement::ColumnInfo;
use crate::types::{LobData, LobLocator};

/// Named bind parameters
pub type Params = IndexMap<String, Value>;

/// Driver-level type objects used for input-size hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbApiType {
    /// Oracle NUMBER
    Number,
    /// BINARY_DOUBLE / BINARY_FLOAT
    NativeFloat,
    /// Native integer
    Int,
    /// VARCHAR2
    String,
    /// CHAR
    FixedChar,
    /// NVARCHAR2
    NChar,
    /// NCHAR
    FixedNChar,
    /// LONG and long text binds
    LongString,
    /// CLOB
    Clob,
    /// NCLOB
    NClob,
    /// BLOB
    Blob,
    /// Generic LOB
    Lob,
    /// RAW
    Binary,
    /// LONG RAW and long binary binds
    LongBinary,
    /// DATE
    DateTime,
    /// TIMESTAMP
    Timestamp,
    /// INTERVAL DAY TO SECOND
    Interval,
    /// ROWID
    Rowid,
}

impl DbApiType {
    /// The driver's name for this type
    pub fn name(&self) -> &'static str {
        match self {
            DbApiType::Number => "NUMBER",
            DbApiType::NativeFloat => "NATIVE_FLOAT",
            DbApiType::Int => "int",
            DbApiType::String => "STRING",
            DbApiType::FixedChar => "FIXED_CHAR",
            DbApiType::NChar => "NCHAR",
            DbApiType::FixedNChar => "FIXED_NCHAR",
            DbApiType::LongString => "LONG_STRING",
            DbApiType::Clob => "CLOB",
            DbApiType::NClob => "NCLOB",
            DbApiType::Blob => "BLOB",
            DbApiType::Lob => "LOB",
            DbApiType::Binary => "BINARY",
            DbApiType::LongBinary => "LONG_BINARY",
            DbApiType::DateTime => "DATETIME",
            DbApiType::Timestamp => "TIMESTAMP",
            DbApiType::Interval => "INTERVAL",
            DbApiType::Rowid => "ROWID",
        }
    }
}

impl fmt::Display for DbApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the driver should fetch one result column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchAs {
    /// The driver's own conversion for the column type
    #[default]
    Default,
    /// Text, using the session's number formatting and the given decode policy
    Text(EncodingErrors),
    /// Arbitrary-precision decimal
    Decimal,
    /// Native float
    NativeFloat,
    /// LOB content materialized as text
    LongString,
    /// LOB content materialized as bytes
    LongBinary,
}

/// Server version reported by a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    /// Major release
    pub major: u16,
    /// Minor release
    pub minor: u16,
}

impl ServerVersion {
    /// Create a version
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for ServerVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('.');
        let mut next = |label: &str| -> Result<u16> {
            parts
                .next()
                .unwrap_or("0")
                .parse()
                .map_err(|_| Error::InvalidOption(format!("invalid {} in version {:?}", label, s)))
        };
        let major = next("major")?;
        let minor = next("minor")?;
        Ok(Self { major, minor })
    }
}

/// Outcome of executing one statement
#[derive(Debug, Clone, Default)]
pub struct ExecuteResult {
    /// Describe metadata for statements that produce rows
    pub columns: Vec<ColumnInfo>,
    /// Rows inserted, updated or deleted
    pub rows_affected: u64,
    /// Values of RETURNING ... INTO binds, keyed by bind name
    pub out_binds: IndexMap<String, Value>,
}

impl ExecuteResult {
    /// Whether the statement opened a cursor with result rows
    pub fn is_query(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// A connection to an Oracle server, as seen by the engine
#[async_trait]
pub trait Driver: Send {
    /// Declare bind types for the next execution
    async fn set_input_sizes(&mut self, sizes: IndexMap<String, DbApiType>) -> Result<()>;

    /// Execute a statement, opening a cursor when it returns rows
    async fn execute(&mut self, sql: &str, params: &Params) -> Result<ExecuteResult>;

    /// Execute a DML statement once per parameter set
    async fn execute_many(&mut self, sql: &str, params: &[Params]) -> Result<u64>;

    /// Choose fetch conversions for the open cursor's columns
    fn define(&mut self, fetch_as: Vec<FetchAs>) -> Result<()>;

    /// Fetch up to `max_rows` rows from the open cursor
    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<Vec<Value>>>;

    /// Read part of a LOB through its locator
    async fn read_lob(&mut self, locator: &LobLocator, offset: u64, amount: u64) -> Result<LobData>;

    /// Close the open cursor, if any
    fn close_cursor(&mut self);

    /// Version of the connected server
    fn server_version(&self) -> ServerVersion;

    /// Close the connection
    async fn close(&mut self) -> Result<()>;
}

/// Opens driver connections
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a new connection
    async fn connect(&self) -> Result<Box<dyn Driver>>;
}
