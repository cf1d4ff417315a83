//! Tables, columns and the statements built from them
//!
//! Statements compile against an [`OracleDialect`] into a
//! [`CompiledStatement`]: SQL text plus typed binds and, for queries, the
//! types of the result columns. Plain SQL strings compile as raw
//! statements that carry no type information at all.

use crate::dialect::OracleDialect;
use crate::driver::Params;
use crate::error::{Error, Result};
use crate::row::Value;
use crate::sqltypes::SqlType;
use crate::statement::Statement;

/// A table column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    sql_type: SqlType,
    primary_key: bool,
    nullable: bool,
}

impl Column {
    /// Create a nullable column
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            primary_key: false,
            nullable: true,
        }
    }

    /// Make this column (part of) the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Disallow NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type
    pub fn sql_type(&self) -> &SqlType {
        &self.sql_type
    }

    /// Whether the column is in the primary key
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Whether the column allows NULL
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// A table definition
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    /// Create a table with no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name, ignoring case
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn require_column(&self, name: &str) -> Result<&Column> {
        self.get_column(name).ok_or_else(|| {
            Error::compile(format!("table '{}' has no column '{}'", self.name, name))
        })
    }

    /// Start an INSERT into this table
    pub fn insert(&self) -> Insert {
        Insert {
            table: self.clone(),
            values: None,
            returning: Vec::new(),
        }
    }

    /// Start a SELECT of all columns of this table
    pub fn select(&self) -> Select {
        Select {
            columns: self
                .columns
                .iter()
                .map(|c| SelectItem {
                    name: c.name.clone(),
                    sql_type: c.sql_type.clone(),
                })
                .collect(),
            table: self.clone(),
            filters: Vec::new(),
            order_by: Vec::new(),
        }
    }
}

/// A bind parameter of a compiled statement
#[derive(Debug, Clone, PartialEq)]
pub struct BindParam {
    /// Parameter name as written in the SQL
    pub key: String,
    /// Declared type
    pub sql_type: SqlType,
    /// Application value
    pub value: Value,
}

/// Result of compiling a statement
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// SQL text
    pub sql: String,
    /// Typed binds, in order of appearance
    pub binds: Vec<BindParam>,
    /// Result column names and types, for typed queries and RETURNING
    pub result_columns: Vec<(String, SqlType)>,
    /// Out-bind names of a RETURNING clause, paired with `result_columns`
    pub returning_binds: Vec<String>,
    /// Raw SQL: no bind or result processing and no input sizes
    pub raw: bool,
}

impl CompiledStatement {
    fn raw(sql: &str, params: &Params) -> Self {
        Self {
            sql: sql.to_string(),
            binds: params
                .iter()
                .map(|(key, value)| BindParam {
                    key: key.clone(),
                    sql_type: SqlType::Null,
                    value: value.clone(),
                })
                .collect(),
            result_columns: Vec::new(),
            returning_binds: Vec::new(),
            raw: true,
        }
    }

    /// Whether the statement declares result column types
    pub fn is_typed(&self) -> bool {
        !self.result_columns.is_empty()
    }

    /// Type declared for a result column, matched without regard to case
    pub fn result_type(&self, name: &str) -> Option<&SqlType> {
        self.result_columns
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, ty)| ty)
    }
}

/// Something that compiles to SQL for the Oracle dialect
pub trait Executable {
    /// Compile against a dialect with the given parameters
    fn compile(&self, dialect: &OracleDialect, params: &Params) -> Result<CompiledStatement>;
}

impl Executable for str {
    fn compile(&self, _dialect: &OracleDialect, params: &Params) -> Result<CompiledStatement> {
        Ok(CompiledStatement::raw(self, params))
    }
}

impl Executable for String {
    fn compile(&self, dialect: &OracleDialect, params: &Params) -> Result<CompiledStatement> {
        self.as_str().compile(dialect, params)
    }
}

/// An INSERT statement
#[derive(Debug, Clone)]
pub struct Insert {
    table: Table,
    values: Option<Params>,
    returning: Vec<String>,
}

impl Insert {
    /// Fixed values, used instead of the execution parameters
    pub fn values(mut self, values: Params) -> Self {
        self.values = Some(values);
        self
    }

    /// Return a column's inserted value
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning.push(column.into());
        self
    }
}

impl Executable for Insert {
    fn compile(&self, _dialect: &OracleDialect, params: &Params) -> Result<CompiledStatement> {
        let source = self.values.as_ref().unwrap_or(params);
        let table = &self.table;

        let mut binds = Vec::with_capacity(source.len());
        for (key, value) in source {
            let column = table.require_column(key)?;
            binds.push(BindParam {
                key: column.name.clone(),
                sql_type: column.sql_type.clone(),
                value: value.clone(),
            });
        }

        if binds.is_empty() {
            return Err(Error::compile(format!(
                "INSERT into '{}' has no values",
                table.name
            )));
        }
        let names: Vec<&str> = binds.iter().map(|b| b.key.as_str()).collect();
        let placeholders: Vec<String> = names.iter().map(|n| format!(":{}", n)).collect();
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name,
            names.join(", "),
            placeholders.join(", ")
        );

        let mut result_columns = Vec::new();
        let mut returning_binds = Vec::new();
        if !self.returning.is_empty() {
            let mut targets = Vec::new();
            for (i, name) in self.returning.iter().enumerate() {
                let column = table.require_column(name)?;
                targets.push(format!("{}.{}", table.name, column.name));
                returning_binds.push(format!("ret_{}", i));
                result_columns.push((column.name.clone(), column.sql_type.clone()));
            }
            let outs: Vec<String> = returning_binds.iter().map(|b| format!(":{}", b)).collect();
            sql.push_str(&format!(" RETURNING {} INTO {}", targets.join(", "), outs.join(", ")));
        }

        Ok(CompiledStatement {
            sql,
            binds,
            result_columns,
            returning_binds,
            raw: false,
        })
    }
}

/// Right-hand side of a filter
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bound value, typed like the filtered column
    Value(Value),
    /// A bound value converted server-side with `CAST`
    Cast(Value, SqlType),
}

impl Expr {
    /// `CAST(:value AS ty)`
    pub fn cast(value: impl Into<Value>, ty: SqlType) -> Self {
        Expr::Cast(value.into(), ty)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

#[derive(Debug, Clone)]
struct SelectItem {
    name: String,
    sql_type: SqlType,
}

/// A SELECT statement over one table
#[derive(Debug, Clone)]
pub struct Select {
    table: Table,
    columns: Vec<SelectItem>,
    filters: Vec<(String, Expr)>,
    order_by: Vec<String>,
}

impl Select {
    /// Restrict the result to the named columns
    pub fn only(mut self, names: &[&str]) -> Result<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let column = self.table.require_column(name)?;
            columns.push(SelectItem {
                name: column.name.clone(),
                sql_type: column.sql_type.clone(),
            });
        }
        self.columns = columns;
        Ok(self)
    }

    /// Add a pseudo-column such as `rowid` to the result
    pub fn pseudo_column(mut self, name: impl Into<String>, sql_type: SqlType) -> Self {
        self.columns.push(SelectItem {
            name: name.into(),
            sql_type,
        });
        self
    }

    /// Filter on equality with a column or pseudo-column
    pub fn filter_eq(mut self, name: impl Into<String>, expr: impl Into<Expr>) -> Self {
        self.filters.push((name.into(), expr.into()));
        self
    }

    /// Order by a column
    pub fn order_by(mut self, name: impl Into<String>) -> Self {
        self.order_by.push(name.into());
        self
    }

    fn item_type(&self, name: &str) -> Result<SqlType> {
        if let Some(column) = self.table.get_column(name) {
            return Ok(column.sql_type.clone());
        }
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.sql_type.clone())
            .ok_or_else(|| {
                Error::compile(format!("table '{}' has no column '{}'", self.table.name, name))
            })
    }
}

impl Executable for Select {
    fn compile(&self, dialect: &OracleDialect, _params: &Params) -> Result<CompiledStatement> {
        let table = &self.table.name;
        let items: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{}.{}", table, c.name))
            .collect();
        let mut sql = format!("SELECT {} FROM {}", items.join(", "), table);

        let mut binds = Vec::new();
        let mut conditions = Vec::new();
        for (name, expr) in &self.filters {
            let column_type = self.item_type(name)?;
            let key = format!("{}_{}", name.to_lowercase(), binds.len() + 1);
            let condition = match expr {
                Expr::Value(value) => {
                    binds.push(BindParam {
                        key: key.clone(),
                        sql_type: column_type,
                        value: value.clone(),
                    });
                    format!("{}.{} = :{}", table, name, key)
                }
                Expr::Cast(value, ty) => {
                    let target = dialect.compile_type(ty)?;
                    binds.push(BindParam {
                        key: key.clone(),
                        sql_type: ty.clone(),
                        value: value.clone(),
                    });
                    format!("{}.{} = CAST(:{} AS {})", table, name, key, target)
                }
            };
            conditions.push(condition);
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let mut keys = Vec::with_capacity(self.order_by.len());
            for name in &self.order_by {
                self.item_type(name)?;
                keys.push(format!("{}.{}", table, name));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        Ok(CompiledStatement {
            sql,
            binds,
            result_columns: self
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.sql_type.clone()))
                .collect(),
            returning_binds: Vec::new(),
            raw: false,
        })
    }
}

/// Raw SQL with optional result and bind types
#[derive(Debug, Clone)]
pub struct TextQuery {
    sql: String,
    columns: Vec<(String, SqlType)>,
    bind_types: Vec<(String, SqlType)>,
}

/// Build a [`TextQuery`]
pub fn text(sql: impl Into<String>) -> TextQuery {
    TextQuery {
        sql: sql.into(),
        columns: Vec::new(),
        bind_types: Vec::new(),
    }
}

impl TextQuery {
    /// Declare result column types, in select-list order
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlType)>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(|(n, t)| (n.into(), t)).collect();
        self
    }

    /// Declare the type of a bind parameter
    pub fn bind_type(mut self, name: impl Into<String>, sql_type: SqlType) -> Self {
        self.bind_types.push((name.into(), sql_type));
        self
    }
}

impl Executable for TextQuery {
    fn compile(&self, _dialect: &OracleDialect, params: &Params) -> Result<CompiledStatement> {
        let statement = Statement::new(self.sql.as_str());
        let mut binds = Vec::new();
        for name in statement.bind_names() {
            let (key, value) = params
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(k, v)| (k.clone(), v.clone()))
                .ok_or_else(|| Error::MissingParameter(name.to_lowercase()))?;
            let sql_type = self
                .bind_types
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, t)| t.clone())
                .unwrap_or_else(|| SqlType::infer(&value));
            binds.push(BindParam {
                key,
                sql_type,
                value,
            });
        }

        Ok(CompiledStatement {
            sql: self.sql.clone(),
            binds,
            result_columns: self.columns.clone(),
            returning_binds: Vec::new(),
            raw: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineOptions;

    fn dialect() -> OracleDialect {
        OracleDialect::new(EngineOptions::default())
    }

    fn t1() -> Table {
        Table::new("t1").column(Column::new("foo", SqlType::Integer))
    }

    fn params(pairs: &[(&str, Value)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_insert_returning() {
        let compiled = t1()
            .insert()
            .returning("foo")
            .compile(&dialect(), &params(&[("foo", Value::Integer(5))]))
            .unwrap();
        assert_eq!(
            compiled.sql,
            "INSERT INTO t1 (foo) VALUES (:foo) RETURNING t1.foo INTO :ret_0"
        );
        assert_eq!(compiled.binds.len(), 1);
        assert_eq!(compiled.returning_binds, vec!["ret_0"]);
        assert_eq!(compiled.result_type("FOO"), Some(&SqlType::Integer));
    }

    #[test]
    fn test_insert_unknown_column() {
        let err = t1()
            .insert()
            .compile(&dialect(), &params(&[("bar", Value::Integer(5))]))
            .unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
    }

    #[test]
    fn test_select_with_cast_filter() {
        let compiled = t1()
            .select()
            .pseudo_column("rowid", SqlType::RowId)
            .filter_eq("rowid", Expr::cast("AAAAABAABAAAAABAAA", SqlType::RowId))
            .compile(&dialect(), &Params::new())
            .unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT t1.foo, t1.rowid FROM t1 WHERE t1.rowid = CAST(:rowid_1 AS ROWID)"
        );
        assert_eq!(compiled.binds[0].sql_type, SqlType::RowId);
        assert_eq!(compiled.result_columns.len(), 2);
    }

    #[test]
    fn test_text_infers_bind_types() {
        let compiled = text("SELECT :num FROM DUAL")
            .compile(&dialect(), &params(&[("num", Value::Integer(2))]))
            .unwrap();
        assert_eq!(compiled.binds[0].key, "num");
        assert_eq!(compiled.binds[0].sql_type, SqlType::Integer);

        let missing = text("SELECT :num FROM DUAL").compile(&dialect(), &Params::new());
        assert!(matches!(missing, Err(Error::MissingParameter(_))));
    }

    #[test]
    fn test_text_declared_bind_type() {
        let compiled = text("SELECT :NUM FROM DUAL")
            .bind_type("num", SqlType::binary_double())
            .compile(&dialect(), &params(&[("num", Value::Integer(2))]))
            .unwrap();
        assert_eq!(compiled.binds[0].sql_type, SqlType::binary_double());
    }

    #[test]
    fn test_raw_sql_is_untyped() {
        let compiled = "SELECT 1 FROM DUAL".compile(&dialect(), &Params::new()).unwrap();
        assert!(compiled.raw);
        assert!(!compiled.is_typed());
    }
}
