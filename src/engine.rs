//! Engine and connections
//!
//! An [`Engine`] owns the options, the connector used to open driver
//! connections, the lazily initialized [`OracleDialect`] and the registry of
//! input-size hooks. A [`Connection`] runs statements through the dialect:
//!
//! 1. compile the statement
//! 2. apply bind processors
//! 3. compute input sizes, let hooks adjust them, and declare them
//! 4. execute
//! 5. choose an output handler per result column
//! 6. fetch in batches of `arraysize`, running converters and result
//!    processors on every value
//!
//! Plain SQL strings skip steps 2, 3 and the typed part of step 5.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, trace};

use crate::config::EngineOptions;
use crate::dialect::handlers::{default_output, typed_output};
use crate::dialect::{
    input_sizes, reflection, DialectImpl, InputSizesHook, OracleDialect, OutConverter,
};
use crate::driver::{Connector, Driver, ExecuteResult, FetchAs, Params};
use crate::error::{Error, Result};
use crate::row::{Row, Value};
use crate::schema::{text, BindParam, CompiledStatement, Executable, Table};
use crate::sqltypes::SqlType;
use crate::types::{LobBuffer, LobData, LobValue};

/// Handle returned when registering an input-size hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type HookRegistry = Arc<RwLock<Vec<(ListenerId, Arc<dyn InputSizesHook>)>>>;

/// Entry point: creates connections that share one dialect
#[derive(Clone)]
pub struct Engine {
    connector: Arc<dyn Connector>,
    options: EngineOptions,
    dialect: Arc<OnceCell<Arc<OracleDialect>>>,
    hooks: HookRegistry,
    next_listener: Arc<AtomicU64>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("dialect", &self.dialect.get())
            .finish()
    }
}

impl Engine {
    /// Create an engine over a connector
    pub fn new(connector: impl Connector + 'static, options: EngineOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            connector: Arc::new(connector),
            options,
            dialect: Arc::new(OnceCell::new()),
            hooks: Arc::new(RwLock::new(Vec::new())),
            next_listener: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Engine options
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The dialect, once a first connection has initialized it
    pub fn dialect(&self) -> Option<&OracleDialect> {
        self.dialect.get().map(|d| d.as_ref())
    }

    /// Open a connection, initializing the dialect on first use
    pub async fn connect(&self) -> Result<Connection> {
        let mut driver = self.connector.connect().await?;

        for sql in &self.options.session_statements {
            debug!(sql = %sql, "running session statement");
            driver.execute(sql, &Params::new()).await?;
            driver.close_cursor();
        }

        let options = self.options.clone();
        let session: &mut dyn Driver = driver.as_mut();
        let dialect = self
            .dialect
            .get_or_try_init(|| async move {
                let mut dialect = OracleDialect::new(options);
                dialect.initialize(session).await?;
                Ok::<_, Error>(Arc::new(dialect))
            })
            .await?
            .clone();

        Ok(Connection {
            driver: Mutex::new(driver),
            dialect,
            hooks: Arc::clone(&self.hooks),
        })
    }

    /// Open a driver connection that bypasses the dialect entirely
    pub async fn connect_raw(&self) -> Result<Box<dyn Driver>> {
        self.connector.connect().await
    }

    /// Register a hook that sees input sizes before every compiled execution
    pub fn listen_input_sizes(&self, hook: impl InputSizesHook + 'static) -> Result<ListenerId> {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.hooks
            .write()
            .map_err(|_| Error::Internal("input size hook registry poisoned".to_string()))?
            .push((id, Arc::new(hook)));
        Ok(id)
    }

    /// Remove a hook; returns whether it was registered
    pub fn remove_listener(&self, id: ListenerId) -> Result<bool> {
        let mut hooks = self
            .hooks
            .write()
            .map_err(|_| Error::Internal("input size hook registry poisoned".to_string()))?;
        let before = hooks.len();
        hooks.retain(|(existing, _)| *existing != id);
        Ok(hooks.len() != before)
    }

    /// Run one statement on a fresh connection and return its first value
    pub async fn scalar<E: Executable + ?Sized>(&self, stmt: &E, params: Params) -> Result<Value> {
        let conn = self.connect().await?;
        let value = conn.scalar(stmt, params).await;
        conn.close().await?;
        value
    }
}

/// Rows and metadata produced by one execution
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
    rows_affected: u64,
}

impl ResultSet {
    fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    /// Result column names, normalized
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Take the rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// First value of the first row, or NULL
    pub fn scalar(&self) -> Value {
        self.first()
            .and_then(|row| row.get(0))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Rows inserted, updated or deleted
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Iterate over rows
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// A connection that executes statements through the dialect
pub struct Connection {
    driver: Mutex<Box<dyn Driver>>,
    dialect: Arc<OracleDialect>,
    hooks: HookRegistry,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.dialect)
            .finish()
    }
}

impl Connection {
    /// The dialect in use
    pub fn dialect(&self) -> &OracleDialect {
        &self.dialect
    }

    /// Execute a statement and fetch all of its rows
    pub async fn execute<E: Executable + ?Sized>(&self, stmt: &E, params: Params) -> Result<ResultSet> {
        let compiled = stmt.compile(&self.dialect, &params)?;
        let bound = self.bind_params(&compiled, &compiled.binds)?;

        let mut driver = self.driver.lock().await;
        self.declare_input_sizes(driver.as_mut(), &compiled, &params).await?;

        debug!(sql = %compiled.sql, "executing statement");
        let result = driver.execute(&compiled.sql, &bound).await?;

        if !compiled.returning_binds.is_empty() {
            return self.returning_row(&compiled, result);
        }
        if !result.is_query() {
            return Ok(ResultSet::affected(result.rows_affected));
        }
        self.fetch_all(driver.as_mut(), &compiled, result).await
    }

    /// Execute a DML statement once per parameter set
    pub async fn execute_many<E: Executable + ?Sized>(
        &self,
        stmt: &E,
        param_sets: &[Params],
    ) -> Result<u64> {
        let Some(first) = param_sets.first() else {
            return Ok(0);
        };
        let compiled = stmt.compile(&self.dialect, first)?;

        let mut bound_sets = Vec::with_capacity(param_sets.len());
        for params in param_sets {
            let binds = stmt.compile(&self.dialect, params)?.binds;
            bound_sets.push(self.bind_params(&compiled, &binds)?);
        }

        let mut driver = self.driver.lock().await;
        self.declare_input_sizes(driver.as_mut(), &compiled, first).await?;
        debug!(sql = %compiled.sql, rows = bound_sets.len(), "executing statement many");
        driver.execute_many(&compiled.sql, &bound_sets).await
    }

    /// Execute a statement and return the first value of the first row
    pub async fn scalar<E: Executable + ?Sized>(&self, stmt: &E, params: Params) -> Result<Value> {
        Ok(self.execute(stmt, params).await?.scalar())
    }

    /// Create a table
    pub async fn create_table(&self, table: &Table) -> Result<()> {
        let ddl = self.dialect.create_table_ddl(table)?;
        self.execute(ddl.as_str(), Params::new()).await?;
        Ok(())
    }

    /// Drop a table
    pub async fn drop_table(&self, table: &Table) -> Result<()> {
        let ddl = self.dialect.drop_table_ddl(table);
        self.execute(ddl.as_str(), Params::new()).await?;
        Ok(())
    }

    /// Build a table definition from the data dictionary
    pub async fn reflect_table(&self, name: &str) -> Result<Table> {
        let query = text(reflection::COLUMNS_QUERY).columns([
            ("column_name", SqlType::string(None)),
            ("data_type", SqlType::string(None)),
            ("char_length", SqlType::Integer),
            ("data_precision", SqlType::Integer),
            ("data_scale", SqlType::Integer),
            ("nullable", SqlType::string(None)),
        ]);
        let mut params = Params::new();
        params.insert(
            "table_name".to_string(),
            Value::String(self.dialect.denormalize_name(name)),
        );
        let result = self.execute(&query, params).await?;
        reflection::table_from_rows(&self.dialect, name, result.rows())
    }

    /// Read the whole content of a LOB, in chunks for locators
    pub async fn read_lob(&self, lob: &LobValue) -> Result<LobData> {
        let locator = match lob {
            LobValue::Inline(data) => return Ok(data.clone()),
            LobValue::Locator(locator) => locator,
        };

        let mut data = LobBuffer::for_locator(locator);
        let size = locator.size();
        let chunk = u64::from(locator.chunk_size().max(1));

        let mut driver = self.driver.lock().await;
        let mut offset = 1u64;
        while offset <= size {
            let amount = chunk.min(size - offset + 1);
            let part = driver.read_lob(locator, offset, amount).await?;
            data.push(part)?;
            offset += amount;
        }
        Ok(data.finish())
    }

    /// Close the connection
    pub async fn close(&self) -> Result<()> {
        self.driver.lock().await.close().await
    }

    fn bind_params(&self, compiled: &CompiledStatement, binds: &[BindParam]) -> Result<Params> {
        let mut params = Params::with_capacity(binds.len());
        for bind in binds {
            let value = if compiled.raw {
                bind.value.clone()
            } else {
                self.dialect
                    .dialect_impl(&bind.sql_type)
                    .process_bind(bind.value.clone())?
            };
            params.insert(bind.key.clone(), value);
        }
        Ok(params)
    }

    async fn declare_input_sizes(
        &self,
        driver: &mut dyn Driver,
        compiled: &CompiledStatement,
        params: &Params,
    ) -> Result<()> {
        if compiled.raw || compiled.binds.is_empty() {
            return Ok(());
        }

        let mut sizes = input_sizes::compute(&self.dialect, &compiled.binds);
        {
            let hooks = self
                .hooks
                .read()
                .map_err(|_| Error::Internal("input size hook registry poisoned".to_string()))?;
            for (_, hook) in hooks.iter() {
                hook.on_input_sizes(&mut sizes, &compiled.sql, params);
            }
        }

        let sizes = input_sizes::to_driver(&sizes);
        trace!(?sizes, "declaring input sizes");
        driver.set_input_sizes(sizes).await
    }

    fn returning_row(&self, compiled: &CompiledStatement, result: ExecuteResult) -> Result<ResultSet> {
        let errors = self.dialect.options().encoding_errors;
        let mut names = Vec::with_capacity(compiled.returning_binds.len());
        let mut values = Vec::with_capacity(compiled.returning_binds.len());
        for (bind, (name, ty)) in compiled.returning_binds.iter().zip(&compiled.result_columns) {
            let value = result
                .out_binds
                .get(&bind.to_uppercase())
                .cloned()
                .unwrap_or(Value::Null);
            values.push(self.dialect.dialect_impl(ty).process_result(value, errors)?);
            names.push(name.clone());
        }
        Ok(ResultSet {
            rows: vec![Row::with_names(values, names.clone())],
            columns: names,
            rows_affected: result.rows_affected,
        })
    }

    async fn fetch_all(
        &self,
        driver: &mut dyn Driver,
        compiled: &CompiledStatement,
        result: ExecuteResult,
    ) -> Result<ResultSet> {
        let options = self.dialect.options();
        let decimal_char = self.dialect.decimal_char();

        let mut fetch_as = Vec::with_capacity(result.columns.len());
        let mut converters = Vec::with_capacity(result.columns.len());
        let mut processors: Vec<Option<DialectImpl>> = Vec::with_capacity(result.columns.len());
        for column in &result.columns {
            let imp = compiled
                .result_type(&column.name)
                .map(|ty| self.dialect.dialect_impl(ty));
            let var = match imp.as_ref().and_then(DialectImpl::as_numeric) {
                Some(numeric) => typed_output(numeric, column),
                None => default_output(options, decimal_char, column),
            };
            fetch_as.push(var.map_or(FetchAs::Default, |v| v.fetch_as));
            converters.push(var.and_then(|v| v.converter));
            processors.push(imp);
        }
        if let Err(e) = driver.define(fetch_as) {
            driver.close_cursor();
            return Err(e);
        }

        let names: Vec<String> = result
            .columns
            .iter()
            .map(|c| self.dialect.normalize_name(&c.name))
            .collect();

        let outcome = self
            .fetch_rows(driver, &names, &converters, &processors)
            .await;
        driver.close_cursor();

        Ok(ResultSet {
            columns: names,
            rows: outcome?,
            rows_affected: result.rows_affected,
        })
    }

    async fn fetch_rows(
        &self,
        driver: &mut dyn Driver,
        names: &[String],
        converters: &[Option<OutConverter>],
        processors: &[Option<DialectImpl>],
    ) -> Result<Vec<Row>> {
        let arraysize = self.dialect.options().arraysize;
        let errors = self.dialect.options().encoding_errors;

        let mut rows = Vec::new();
        loop {
            let batch = driver.fetch(arraysize).await?;
            let fetched = batch.len();
            trace!(rows = fetched, "fetched batch");

            for raw in batch {
                let mut values = Vec::with_capacity(raw.len());
                for (i, value) in raw.into_iter().enumerate() {
                    let value = match converters.get(i).copied().flatten() {
                        Some(converter) => converter.apply(value)?,
                        None => value,
                    };
                    let value = match processors.get(i).copied().flatten() {
                        Some(imp) => imp.process_result(value, errors)?,
                        None => value,
                    };
                    values.push(value);
                }
                rows.push(Row::with_names(values, names.to_vec()));
            }

            if fetched < arraysize {
                break;
            }
        }
        Ok(rows)
    }
}
