//! In-process Oracle emulation
//!
//! [`MemoryDatabase`] keeps tables in Oracle's internal value formats and
//! answers the SQL the dialect emits with the describe metadata a real server
//! reports, including the `(precision 0, scale -127)` of literals and scalar
//! subqueries. Each [`MemoryDatabase::connect`](crate::Connector::connect)
//! opens an independent session sharing the same catalog.
//!
//! # Example
//!
//! ```rust
//! use oracle_dialect::{Connector, MemoryDatabase, Params};
//!
//! # tokio_test_block(async {
//! let db = MemoryDatabase::new();
//! let mut session = db.connect().await.unwrap();
//! let result = session.execute("SELECT 5 FROM DUAL", &Params::new()).await.unwrap();
//! assert_eq!(result.columns[0].name, "5");
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod eval;
mod sql;
mod storage;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use self::eval::{table_columns, Binds, Evaluator, Relation};
use self::sql::{Insert, Statement};
use self::storage::{store, Catalog, ColumnType, Datum, Scalar};
use super::{Connector, DbApiType, Driver, ExecuteResult, FetchAs, Params, ServerVersion};
use crate::constants::{OracleType, LOB_CHUNK_SIZE, SCALE_UNKNOWN};
use crate::error::{Error, Result};
use crate::row::Value;
use crate::statement::ColumnInfo;
use crate::types::{
    decode_oracle_date, encode_oracle_date, encode_oracle_timestamp, LobData, LobLocator,
    LobValue, Numeric, OracleNumber,
};

/// Message of the error raised for a LOB handle invalidated by a later fetch
pub const STALE_LOB_MESSAGE: &str = "LOB variable no longer valid after subsequent fetch";

/// Behaviour of a [`MemoryDatabase`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOptions {
    /// Version reported to the dialect
    pub server_version: ServerVersion,
    /// Invalidate LOB handles of earlier fetch batches, as older drivers do
    pub legacy_lob_variables: bool,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            server_version: ServerVersion::new(19, 0),
            legacy_lob_variables: false,
        }
    }
}

impl MemoryOptions {
    /// Set the reported server version
    pub fn server_version(mut self, version: ServerVersion) -> Self {
        self.server_version = version;
        self
    }

    /// Emulate LOB handles that a subsequent fetch invalidates
    pub fn legacy_lob_variables(mut self, enabled: bool) -> Self {
        self.legacy_lob_variables = enabled;
        self
    }
}

#[derive(Debug, Default)]
struct Shared {
    catalog: Mutex<Catalog>,
    input_size_calls: Mutex<Vec<IndexMap<String, DbApiType>>>,
}

/// An in-memory database; clones share the same tables
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    options: MemoryOptions,
    shared: Arc<Shared>,
}

impl MemoryDatabase {
    /// Create an empty database with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty database
    pub fn with_options(options: MemoryOptions) -> Self {
        Self {
            options,
            shared: Arc::default(),
        }
    }

    /// Options this database was created with
    pub fn options(&self) -> &MemoryOptions {
        &self.options
    }

    /// Every `set_input_sizes` call made by any session, oldest first
    pub async fn input_size_calls(&self) -> Vec<IndexMap<String, DbApiType>> {
        self.shared.input_size_calls.lock().await.clone()
    }

    /// Drain the recorded `set_input_sizes` calls
    pub async fn take_input_size_calls(&self) -> Vec<IndexMap<String, DbApiType>> {
        std::mem::take(&mut *self.shared.input_size_calls.lock().await)
    }
}

impl MemoryDatabase {
    fn session(&self) -> MemoryDriver {
        MemoryDriver {
            options: self.options.clone(),
            shared: Arc::clone(&self.shared),
            decimal_char: '.',
            input_sizes: IndexMap::new(),
            cursor: None,
            lobs: HashMap::new(),
            next_lob_id: 0,
            fetch_epoch: 0,
            closed: false,
        }
    }
}

#[async_trait]
impl Connector for MemoryDatabase {
    async fn connect(&self) -> Result<Box<dyn Driver>> {
        debug!(version = %self.options.server_version, "opening memory session");
        Ok(Box::new(self.session()))
    }
}

struct Cursor {
    columns: Vec<ColumnInfo>,
    rows: VecDeque<Vec<Option<Datum>>>,
    defines: Vec<FetchAs>,
}

struct LobEntry {
    data: LobData,
    epoch: u64,
}

/// One session against a [`MemoryDatabase`]
pub struct MemoryDriver {
    options: MemoryOptions,
    shared: Arc<Shared>,
    decimal_char: char,
    /// Hints declared for the next execution, keyed by upper-case bind name
    input_sizes: IndexMap<String, DbApiType>,
    cursor: Option<Cursor>,
    lobs: HashMap<u64, LobEntry>,
    next_lob_id: u64,
    fetch_epoch: u64,
    closed: bool,
}

impl std::fmt::Debug for MemoryDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDriver")
            .field("decimal_char", &self.decimal_char)
            .field("open_cursor", &self.cursor.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}

impl MemoryDriver {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::ConnectionClosed)
        } else {
            Ok(())
        }
    }

    fn bind_set(&self, params: &Params, sizes: &IndexMap<String, DbApiType>) -> Result<Binds> {
        let mut binds = Binds::with_capacity(params.len());
        for (name, value) in params {
            let name = name.to_uppercase();
            let datum = bind_datum(value, sizes.get(&name).copied())?;
            binds.insert(name, datum);
        }
        Ok(binds)
    }

    async fn run(&mut self, statement: &Statement, binds: &Binds) -> Result<ExecuteResult> {
        let mut result = ExecuteResult::default();
        match statement {
            Statement::CreateTable(create) => {
                let columns = table_columns(create)?;
                self.shared
                    .catalog
                    .lock()
                    .await
                    .create_table(create.name.clone(), columns)?;
            }
            Statement::DropTable(name) => {
                self.shared.catalog.lock().await.drop_table(name)?;
            }
            Statement::AlterSession { parameter, value } => {
                self.alter_session(parameter, value)?;
            }
            Statement::Insert(insert) => {
                result.rows_affected = 1;
                result.out_binds = self.insert(insert, binds).await?;
            }
            Statement::Select(select) => {
                let relation = {
                    let catalog = self.shared.catalog.lock().await;
                    Evaluator::new(&catalog, binds).select(select)?
                };
                self.open_cursor(relation, &mut result);
            }
        }
        Ok(result)
    }

    async fn insert(&mut self, insert: &Insert, binds: &Binds) -> Result<IndexMap<String, Value>> {
        let mut catalog = self.shared.catalog.lock().await;
        let cells = Evaluator::new(&catalog, binds).insert_cells(insert)?;
        let rowid = catalog.table_mut(&insert.table)?.insert(cells)?.rowid;

        let mut out_binds = IndexMap::new();
        if insert.returning.is_empty() {
            return Ok(out_binds);
        }
        let inserted = Evaluator::new(&catalog, binds).returning(insert, rowid)?;
        drop(catalog);
        for (name, datum, column_type) in inserted.returning {
            let info = column_type.describe(&name);
            let value = match datum {
                Some(d) if d.oracle_type.is_lob() => Value::Lob(LobValue::Inline(lob_data(&d)?)),
                other => self.fetch_value(other, &info, FetchAs::Default)?,
            };
            out_binds.insert(name, value);
        }
        Ok(out_binds)
    }

    fn alter_session(&mut self, parameter: &str, value: &str) -> Result<()> {
        match parameter {
            "NLS_TERRITORY" => {
                self.decimal_char = match value.to_uppercase().as_str() {
                    "GERMANY" | "FRANCE" | "ITALY" | "SPAIN" | "NETHERLANDS" | "AUSTRIA" => ',',
                    _ => '.',
                };
            }
            "NLS_NUMERIC_CHARACTERS" => {
                self.decimal_char = value
                    .chars()
                    .next()
                    .ok_or_else(|| Error::oracle(12705, "invalid NLS parameter value specified"))?;
            }
            _ => {}
        }
        debug!(parameter, value, decimal_char = %self.decimal_char, "session altered");
        Ok(())
    }

    fn open_cursor(&mut self, relation: Relation, result: &mut ExecuteResult) {
        let columns = relation.describe();
        result.columns = columns.clone();
        let defines = vec![FetchAs::Default; columns.len()];
        self.cursor = Some(Cursor {
            columns,
            rows: relation.rows.into_iter().map(|r| r.cells).collect(),
            defines,
        });
    }

    fn register_lob(&mut self, datum: &Datum) -> Result<LobLocator> {
        let data = lob_data(datum)?;
        let size = data.len() as u64;
        self.next_lob_id += 1;
        let id = self.next_lob_id;
        self.lobs.insert(
            id,
            LobEntry {
                data,
                epoch: self.fetch_epoch,
            },
        );
        let mut handle = Vec::with_capacity(16);
        handle.extend_from_slice(&id.to_be_bytes());
        handle.extend_from_slice(&self.fetch_epoch.to_be_bytes());
        Ok(LobLocator::new(
            Bytes::from(handle),
            size,
            LOB_CHUNK_SIZE,
            datum.oracle_type,
        ))
    }

    fn fetch_value(&mut self, datum: Option<Datum>, column: &ColumnInfo, fetch_as: FetchAs) -> Result<Value> {
        let Some(datum) = datum else {
            return Ok(Value::Null);
        };
        let ty = datum.oracle_type;
        Ok(match (fetch_as, datum.decode()?) {
            (FetchAs::Text(errors), Scalar::Text(_)) => Value::String(errors.decode(&datum.data)?),
            (FetchAs::Text(_), Scalar::Number(n)) => Value::String(n.to_text(self.decimal_char)),
            (FetchAs::Text(_), Scalar::Double(f)) => {
                Value::String(f.to_string().replace('.', &self.decimal_char.to_string()))
            }
            (FetchAs::Decimal, Scalar::Number(n)) => Value::Decimal(n.to_numeric()?),
            (FetchAs::Decimal, Scalar::Double(f)) => Value::Decimal(Numeric::from_f64(f)?),
            (FetchAs::NativeFloat, Scalar::Number(n)) => Value::Float(n.to_f64()?),
            (FetchAs::NativeFloat, Scalar::Double(f)) => Value::Float(f),
            (FetchAs::LongString, Scalar::Text(s)) => Value::String(s),
            (FetchAs::LongBinary, Scalar::Bytes(b)) => Value::Bytes(b.to_vec()),
            (_, Scalar::Number(n)) if ty == OracleType::Boolean => Value::Boolean(n.value != "0"),
            (_, Scalar::Number(n)) => default_number(n, column)?,
            (_, Scalar::Double(f)) => Value::Float(f),
            (_, _) if ty.is_lob() => Value::Lob(LobValue::Locator(self.register_lob(&datum)?)),
            (_, Scalar::Text(_)) => Value::Bytes(datum.data.to_vec()),
            (_, Scalar::Bytes(b)) => Value::Bytes(b.to_vec()),
            (_, Scalar::Timestamp(_)) if ty == OracleType::Date => {
                Value::Date(decode_oracle_date(&datum.data)?)
            }
            (_, Scalar::Timestamp(ts)) => Value::Timestamp(ts),
            (_, Scalar::Interval(d)) => Value::Interval(d),
            (_, Scalar::RowId(r)) => Value::RowId(r),
        })
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn set_input_sizes(&mut self, sizes: IndexMap<String, DbApiType>) -> Result<()> {
        self.ensure_open()?;
        trace!(?sizes, "input sizes declared");
        self.input_sizes = sizes
            .iter()
            .map(|(name, ty)| (name.to_uppercase(), *ty))
            .collect();
        self.shared.input_size_calls.lock().await.push(sizes);
        Ok(())
    }

    async fn execute(&mut self, sql: &str, params: &Params) -> Result<ExecuteResult> {
        self.ensure_open()?;
        self.cursor = None;
        let sizes = std::mem::take(&mut self.input_sizes);
        let statement = sql::parse(sql)?;
        let binds = self.bind_set(params, &sizes)?;
        debug!(sql, binds = binds.len(), "memory execute");
        self.run(&statement, &binds).await
    }

    async fn execute_many(&mut self, sql: &str, params: &[Params]) -> Result<u64> {
        self.ensure_open()?;
        self.cursor = None;
        let sizes = std::mem::take(&mut self.input_sizes);
        let statement = sql::parse(sql)?;
        if matches!(statement, Statement::Select(_)) {
            return Err(Error::Programming(
                "executemany() cannot be used with queries".to_string(),
            ));
        }
        let mut rows = 0;
        for set in params {
            let binds = self.bind_set(set, &sizes)?;
            rows += self.run(&statement, &binds).await?.rows_affected;
        }
        debug!(sql, rows, "memory execute many");
        Ok(rows)
    }

    fn define(&mut self, fetch_as: Vec<FetchAs>) -> Result<()> {
        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| Error::Programming("no open cursor to define".to_string()))?;
        if fetch_as.len() != cursor.columns.len() {
            return Err(Error::Programming(format!(
                "{} fetch definitions for {} columns",
                fetch_as.len(),
                cursor.columns.len()
            )));
        }
        cursor.defines = fetch_as;
        Ok(())
    }

    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<Vec<Value>>> {
        self.ensure_open()?;
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(Error::Programming("fetch without an open cursor".to_string()));
        };
        let count = max_rows.min(cursor.rows.len());
        let batch: Vec<Vec<Option<Datum>>> = cursor.rows.drain(..count).collect();
        let columns = cursor.columns.clone();
        let defines = cursor.defines.clone();
        if !batch.is_empty() {
            self.fetch_epoch += 1;
            if self.options.legacy_lob_variables {
                self.lobs.clear();
            }
        }

        let mut rows = Vec::with_capacity(batch.len());
        for raw in batch {
            let mut row = Vec::with_capacity(raw.len());
            for ((datum, column), fetch_as) in raw.into_iter().zip(&columns).zip(&defines) {
                row.push(self.fetch_value(datum, column, *fetch_as)?);
            }
            rows.push(row);
        }
        Ok(rows)
    }

    async fn read_lob(&mut self, locator: &LobLocator, offset: u64, amount: u64) -> Result<LobData> {
        self.ensure_open()?;
        let handle = locator.locator_bytes();
        let (id, epoch) = match (handle.get(..8), handle.get(8..16)) {
            (Some(id), Some(epoch)) => (
                u64::from_be_bytes(id.try_into().map_err(|_| invalid_locator())?),
                u64::from_be_bytes(epoch.try_into().map_err(|_| invalid_locator())?),
            ),
            _ => return Err(invalid_locator()),
        };
        if self.options.legacy_lob_variables && epoch != self.fetch_epoch {
            return Err(Error::Programming(STALE_LOB_MESSAGE.to_string()));
        }
        let entry = self
            .lobs
            .get(&id)
            .filter(|entry| entry.epoch == epoch)
            .ok_or_else(invalid_locator)?;

        let start = usize::try_from(offset.saturating_sub(1)).unwrap_or(usize::MAX);
        let amount = usize::try_from(amount).unwrap_or(usize::MAX);
        Ok(match &entry.data {
            LobData::String(s) => LobData::String(s.chars().skip(start).take(amount).collect()),
            LobData::Bytes(b) => {
                let end = start.saturating_add(amount).min(b.len());
                LobData::Bytes(b.slice(start.min(end)..end))
            }
        })
    }

    fn close_cursor(&mut self) {
        self.cursor = None;
    }

    fn server_version(&self) -> ServerVersion {
        self.options.server_version
    }

    async fn close(&mut self) -> Result<()> {
        self.cursor = None;
        self.lobs.clear();
        self.closed = true;
        Ok(())
    }
}

fn invalid_locator() -> Error {
    Error::Programming("invalid LOB locator".to_string())
}

fn lob_data(datum: &Datum) -> Result<LobData> {
    Ok(match datum.oracle_type {
        OracleType::Blob => LobData::Bytes(datum.data.clone()),
        _ => LobData::String(datum.utf8()?.to_string()),
    })
}

/// The driver's own conversion of a NUMBER: integers for integral values
/// of integer or unconstrained columns, floats otherwise
fn default_number(n: OracleNumber, column: &ColumnInfo) -> Result<Value> {
    let integer_column =
        column.scale == 0 || (column.precision == 0 && column.scale == SCALE_UNKNOWN);
    if n.is_integer && integer_column {
        return Ok(match n.to_i64() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Decimal(n.to_numeric()?),
        });
    }
    Ok(Value::Float(n.to_f64()?))
}

/// Convert a bound value, honouring the declared input size
fn bind_datum(value: &Value, hint: Option<DbApiType>) -> Result<Option<Datum>> {
    let double = |f: f64| -> Result<Datum> {
        store(
            Scalar::Double(f),
            &ColumnType::natural(OracleType::BinaryDouble, 0),
            "",
        )
    };
    Ok(Some(match value {
        Value::Null => return Ok(None),
        Value::Integer(i) => Datum::number(&i.to_string())?,
        Value::Float(f) if hint == Some(DbApiType::NativeFloat) || !f.is_finite() => double(*f)?,
        Value::Float(f) => Datum::number(&format!("{:e}", f))?,
        Value::Decimal(n) if n.is_finite() && hint != Some(DbApiType::NativeFloat) => {
            Datum::number(&n.to_string())?
        }
        Value::Decimal(n) => double(n.to_f64())?,
        Value::String(s) if s.is_empty() => return Ok(None),
        Value::String(s) => {
            let (oracle_type, national) = match hint {
                Some(DbApiType::FixedChar) => (OracleType::Char, false),
                Some(DbApiType::FixedNChar) => (OracleType::Char, true),
                Some(DbApiType::NChar) => (OracleType::Varchar, true),
                Some(DbApiType::Clob) | Some(DbApiType::Lob) => (OracleType::Clob, false),
                Some(DbApiType::NClob) => (OracleType::Clob, true),
                Some(DbApiType::LongString) => (OracleType::Long, false),
                _ => (OracleType::Varchar, false),
            };
            let datum = Datum::text(oracle_type, s);
            if national {
                datum.national()
            } else {
                datum
            }
        }
        Value::Bytes(b) => {
            let oracle_type = match hint {
                Some(DbApiType::Blob) | Some(DbApiType::Lob) => OracleType::Blob,
                _ => OracleType::Raw,
            };
            Datum::new(oracle_type, Bytes::copy_from_slice(b))
        }
        Value::Date(d) => Datum::new(OracleType::Date, encode_oracle_date(d).to_vec()),
        Value::Timestamp(ts) if ts.has_timezone() => {
            Datum::new(OracleType::TimestampTz, encode_oracle_timestamp(ts, true))
        }
        Value::Timestamp(ts) => Datum::new(OracleType::Timestamp, encode_oracle_timestamp(ts, false)),
        Value::Interval(d) => store(
            Scalar::Interval(*d),
            &ColumnType::natural(OracleType::IntervalDs, 0),
            "",
        )?,
        Value::RowId(r) => Datum::text(OracleType::Rowid, &r.encode()),
        Value::Boolean(b) => Datum::number(if *b { "1" } else { "0" })?,
        Value::Lob(LobValue::Inline(LobData::String(s))) => {
            let datum = Datum::text(OracleType::Clob, s);
            if hint == Some(DbApiType::NClob) {
                datum.national()
            } else {
                datum
            }
        }
        Value::Lob(LobValue::Inline(LobData::Bytes(b))) => Datum::new(OracleType::Blob, b.clone()),
        Value::Lob(LobValue::Locator(_)) => {
            return Err(Error::Programming(
                "LOB locators cannot be bound; bind the content instead".to_string(),
            ))
        }
    }))
}
