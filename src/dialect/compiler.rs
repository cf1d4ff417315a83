//! DDL rendering for abstract types and tables

use crate::dialect::OracleDialect;
use crate::error::{Error, Result};
use crate::schema::Table;
use crate::sqltypes::SqlType;

/// Renders [`SqlType`]s as Oracle DDL
pub struct TypeCompiler<'a> {
    dialect: &'a OracleDialect,
}

impl<'a> TypeCompiler<'a> {
    /// Create a compiler for the given dialect
    pub fn new(dialect: &'a OracleDialect) -> Self {
        Self { dialect }
    }

    /// Render one type
    pub fn process(&self, ty: &SqlType) -> Result<String> {
        let ty = self.dialect.resolve_type(ty);
        let nchar = self.dialect.use_nchar_for_unicode();

        let ddl = match &ty {
            SqlType::String { length } | SqlType::Varchar2 { length } => {
                self.string_type("VARCHAR2", *length, true)
            }
            SqlType::Unicode { length } if nchar => self.string_type("NVARCHAR2", *length, false),
            SqlType::Unicode { length } => self.string_type("VARCHAR2", *length, true),
            SqlType::Varchar { length } => self.string_type("VARCHAR", *length, true),
            SqlType::NVarchar { length } | SqlType::NVarchar2 { length } => {
                self.string_type("NVARCHAR2", *length, false)
            }
            SqlType::Char { length } => self.string_type("CHAR", *length, false),
            SqlType::NChar { length } => self.string_type("NCHAR", *length, false),
            SqlType::Raw { length } => self.string_type("RAW", *length, false),
            SqlType::Text | SqlType::Clob => "CLOB".to_string(),
            SqlType::UnicodeText if nchar => "NCLOB".to_string(),
            SqlType::UnicodeText => "CLOB".to_string(),
            SqlType::NClob => "NCLOB".to_string(),
            SqlType::LargeBinary | SqlType::Blob => "BLOB".to_string(),
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::SmallInteger | SqlType::Boolean => "SMALLINT".to_string(),
            SqlType::BigInteger => "NUMBER(19)".to_string(),
            SqlType::Numeric {
                precision, scale, ..
            } => numeric_type("NUMERIC", *precision, *scale),
            SqlType::Number {
                precision, scale, ..
            } => numeric_type("NUMBER", *precision, *scale),
            SqlType::DoublePrecision {
                precision, scale, ..
            } => numeric_type("DOUBLE PRECISION", *precision, *scale),
            // binary precision cannot be expressed in decimal digits
            SqlType::Float { .. } => "FLOAT".to_string(),
            SqlType::BinaryDouble { .. } => "BINARY_DOUBLE".to_string(),
            SqlType::BinaryFloat { .. } => "BINARY_FLOAT".to_string(),
            SqlType::Date | SqlType::DateTime | SqlType::OracleDate => "DATE".to_string(),
            SqlType::Timestamp { timezone: true } => "TIMESTAMP WITH TIME ZONE".to_string(),
            SqlType::Timestamp { timezone: false } => "TIMESTAMP".to_string(),
            SqlType::Interval {
                day_precision,
                second_precision,
            } => interval_type(*day_precision, *second_precision),
            SqlType::Long => "LONG".to_string(),
            SqlType::RowId => "ROWID".to_string(),
            SqlType::Null => {
                return Err(Error::compile("can't generate DDL for a null type"));
            }
            SqlType::Variant { .. } | SqlType::Decorated(_) => {
                return Err(Error::Internal(format!("unresolved type {:?}", ty)));
            }
        };
        Ok(ddl)
    }

    /// Render a `CREATE TABLE` statement
    pub fn create_table(&self, table: &Table) -> Result<String> {
        let mut parts = Vec::with_capacity(table.columns().len() + 1);
        for column in table.columns() {
            let ddl = self.process(column.sql_type()).map_err(|e| match e {
                Error::Compile(msg) => Error::compile(format!(
                    "(in table '{}', column '{}'): {}",
                    table.name(),
                    column.name(),
                    msg
                )),
                other => other,
            })?;
            let mut spec = format!("{} {}", column.name(), ddl);
            if !column.is_nullable() {
                spec.push_str(" NOT NULL");
            }
            parts.push(spec);
        }

        let primary_key: Vec<&str> = table
            .columns()
            .iter()
            .filter(|c| c.is_primary_key())
            .map(|c| c.name())
            .collect();
        if !primary_key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", primary_key.join(", ")));
        }

        Ok(format!("CREATE TABLE {} ({})", table.name(), parts.join(", ")))
    }

    fn string_type(&self, name: &str, length: Option<u32>, char_semantics: bool) -> String {
        match length {
            None => name.to_string(),
            Some(n) if char_semantics && self.dialect.supports_char_length() => {
                format!("{}({} CHAR)", name, n)
            }
            Some(n) => format!("{}({})", name, n),
        }
    }
}

fn numeric_type(name: &str, precision: Option<u32>, scale: Option<u32>) -> String {
    match (precision, scale) {
        (Some(p), Some(s)) => format!("{}({}, {})", name, p, s),
        (Some(p), None) => format!("{}({})", name, p),
        (None, _) => name.to_string(),
    }
}

fn interval_type(day_precision: Option<u32>, second_precision: Option<u32>) -> String {
    let mut ddl = String::from("INTERVAL DAY");
    if let Some(d) = day_precision {
        ddl.push_str(&format!("({})", d));
    }
    ddl.push_str(" TO SECOND");
    if let Some(s) = second_precision {
        ddl.push_str(&format!("({})", s));
    }
    ddl
}
