#![warn(missing_docs)]

//! # oracle-dialect
//!
//! The Oracle dialect of a SQL toolkit: how abstract column types compile to
//! Oracle DDL, how values are adapted on the way in and coerced on the way
//! out, how LOB columns are streamed, and which input-size hints are declared
//! to the driver before each execution.
//!
//! The crate talks to Oracle through the [`Driver`] seam. [`MemoryDatabase`]
//! is an in-process emulation of the server behaviour the dialect relies on,
//! so everything here runs without a live database.
//!
//! ## Quick Start
//!
//! ```rust
//! use oracle_dialect::{params, Column, Engine, EngineOptions, MemoryDatabase, SqlType, Table, Value};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> oracle_dialect::Result<()> {
//!     let engine = Engine::new(MemoryDatabase::new(), EngineOptions::default())?;
//!     let conn = engine.connect().await?;
//!
//!     let t = Table::new("t")
//!         .column(Column::new("id", SqlType::Integer).primary_key())
//!         .column(Column::new("data", SqlType::numeric(9, 3)));
//!     conn.create_table(&t).await?;
//!     conn.execute(&t.insert(), params! { "id" => 1, "data" => 14.85 }).await?;
//!
//!     let rows = conn.execute(&t.select(), params! {}).await?;
//!     assert_eq!(rows.rows()[0][0], Value::Integer(1));
//!     Ok(())
//! }
//! ```
//!
//! ## Numeric coercion
//!
//! | Column metadata | Untyped fetch | `Numeric`/`Float` typed fetch |
//! |-----------------|---------------|-------------------------------|
//! | `NUMBER(p, 0)` | `int` | `int` or `Decimal`/`float` per `asdecimal` |
//! | `NUMBER(p, s>0)` | `Decimal` | `Decimal` or `float` |
//! | `FLOAT`, `BINARY_DOUBLE` | `float` | `Decimal` or `float` |
//! | `(0, -127)` literals and subqueries | `int` or `Decimal` by value | per `asdecimal` |
//!
//! Integers outside `i64` come back as `Decimal`. Decimals keep all 38
//! digits of a NUMBER.

pub mod config;
pub mod constants;
pub mod dialect;
pub mod driver;
pub mod engine;
pub mod error;
pub mod row;
pub mod schema;
pub mod sqltypes;
pub mod statement;
pub mod types;

// Re-export commonly used types
pub use config::{EncodingErrors, EngineOptions};
pub use constants::OracleType;
pub use dialect::{DialectImpl, InputSizes, InputSizesHook, OracleDialect};
pub use driver::memory::{MemoryDatabase, MemoryDriver, MemoryOptions};
pub use driver::{Connector, DbApiType, Driver, ExecuteResult, FetchAs, Params, ServerVersion};
pub use engine::{Connection, Engine, ListenerId, ResultSet};
pub use error::{Error, Result};
pub use row::{Row, Value};
pub use schema::{text, Column, CompiledStatement, Executable, Expr, Table, TextQuery};
pub use sqltypes::{SqlType, TypeDecorator};
pub use statement::ColumnInfo;
pub use types::{LobData, LobLocator, LobValue, Numeric, OracleDate, OracleTimestamp, RowId};

/// Build [`Params`] from `name => value` pairs
///
/// ```rust
/// use oracle_dialect::{params, Value};
///
/// let p = params! { "id" => 1, "data" => "x" };
/// assert_eq!(p["id"], Value::Integer(1));
/// assert!(params! {}.is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(params.insert(::std::string::String::from($name), $crate::Value::from($value));)+
        params
    }};
}
