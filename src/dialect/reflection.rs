//! Table reflection from the data dictionary

use tracing::warn;

use crate::dialect::OracleDialect;
use crate::error::{Error, Result};
use crate::row::{Row, Value};
use crate::schema::{Column, Table};
use crate::sqltypes::SqlType;

/// Dictionary query listing a table's columns in declaration order
pub const COLUMNS_QUERY: &str = "SELECT column_name, data_type, char_length, data_precision, \
     data_scale, nullable FROM all_tab_columns WHERE table_name = :table_name ORDER BY column_id";

/// Build a table from the rows of [`COLUMNS_QUERY`]
pub fn table_from_rows(dialect: &OracleDialect, name: &str, rows: &[Row]) -> Result<Table> {
    if rows.is_empty() {
        return Err(Error::NoSuchTable(name.to_string()));
    }

    let mut table = Table::new(name);
    for row in rows {
        let column_name = text(&row[0])
            .ok_or_else(|| Error::Internal("dictionary row without column name".to_string()))?;
        let data_type = text(&row[1]).unwrap_or_default();
        let char_length = number(&row[2]);
        let precision = number(&row[3]);
        let scale = number(&row[4]);
        let nullable = text(&row[5]).map_or(true, |n| n == "Y");

        let sql_type = column_type(&data_type, char_length, precision, scale);
        if sql_type == SqlType::Null {
            warn!(
                column = %column_name,
                data_type = %data_type,
                "did not recognize type of column"
            );
        }

        let mut column = Column::new(dialect.normalize_name(&column_name), sql_type);
        if !nullable {
            column = column.not_null();
        }
        table = table.column(column);
    }
    Ok(table)
}

/// Map a dictionary type description to an abstract type
pub fn column_type(
    data_type: &str,
    char_length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> SqlType {
    match data_type {
        "NUMBER" if precision.is_none() && scale == Some(0) => SqlType::Integer,
        "NUMBER" => SqlType::number(precision, scale),
        "FLOAT" => SqlType::float(precision),
        "VARCHAR2" => SqlType::varchar(char_length),
        "NVARCHAR2" => SqlType::nvarchar(char_length),
        "CHAR" => SqlType::char(char_length),
        "NCHAR" => SqlType::nchar(char_length),
        t if t.contains("WITH TIME ZONE") => SqlType::timestamp(true),
        t => {
            let (base, qualifiers) = strip_qualifiers(t);
            match base.as_str() {
                "DATE" => SqlType::OracleDate,
                "TIMESTAMP" => SqlType::timestamp(false),
                "INTERVAL DAY TO SECOND" => SqlType::interval(
                    qualifiers.first().copied(),
                    qualifiers.get(1).copied(),
                ),
                "RAW" => SqlType::raw(qualifiers.first().copied()),
                "LONG" => SqlType::Long,
                "CLOB" => SqlType::Clob,
                "NCLOB" => SqlType::NClob,
                "BLOB" => SqlType::Blob,
                "BINARY_DOUBLE" => SqlType::binary_double(),
                "BINARY_FLOAT" => SqlType::binary_float(),
                "DOUBLE PRECISION" => SqlType::double_precision(),
                "ROWID" => SqlType::RowId,
                _ => SqlType::Null,
            }
        }
    }
}

/// Remove `(n)` groups, returning the bare name and the numbers removed
fn strip_qualifiers(data_type: &str) -> (String, Vec<u32>) {
    let mut base = String::with_capacity(data_type.len());
    let mut qualifiers = Vec::new();
    let mut rest = data_type;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')').map(|i| open + i) else {
            break;
        };
        match rest[open + 1..close].trim().parse::<u32>() {
            Ok(n) => {
                base.push_str(&rest[..open]);
                qualifiers.push(n);
            }
            Err(_) => base.push_str(&rest[..=close]),
        }
        rest = &rest[close + 1..];
    }
    base.push_str(rest);
    (base, qualifiers)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<u32> {
    value.as_i64().and_then(|n| u32::try_from(n).ok())
}
