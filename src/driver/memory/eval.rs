//! Statement evaluation against the catalog

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::sql::{CompareOp, CreateTable, Expr, FromItem, Insert, Select, SelectItem};
use super::storage::{compare, store, Catalog, ColumnType, Datum, Scalar, StoredColumn};
use crate::constants::{csfrm, OracleType, INTEGER_PRECISION};
use crate::error::{code, Error, Result};
use crate::statement::ColumnInfo;
use crate::types::{OracleNumber, RowId};

/// Bound values keyed by upper-case bind name
pub(super) type Binds = IndexMap<String, Option<Datum>>;

/// A named, typed result column
#[derive(Debug, Clone)]
pub(super) struct RelColumn {
    pub name: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone)]
pub(super) struct RelRow {
    pub cells: Vec<Option<Datum>>,
    pub rowid: Option<RowId>,
}

/// Rows produced by a query
#[derive(Debug, Clone, Default)]
pub(super) struct Relation {
    pub columns: Vec<RelColumn>,
    pub rows: Vec<RelRow>,
}

impl Relation {
    pub fn describe(&self) -> Vec<ColumnInfo> {
        self.columns
            .iter()
            .map(|c| c.column_type.describe(&c.name))
            .collect()
    }
}

/// Rows visible to expressions, under an optional qualifier
struct Scope {
    qualifier: Option<String>,
    relation: Relation,
}

impl Scope {
    fn empty() -> Self {
        Self {
            qualifier: None,
            relation: Relation::default(),
        }
    }

    fn resolve(&self, qualifier: Option<&str>, name: &str) -> Result<usize> {
        let qualifier_ok = match (qualifier, self.qualifier.as_deref()) {
            (None, _) => true,
            (Some(q), Some(own)) => q == own,
            (Some(_), None) => false,
        };
        self.relation
            .columns
            .iter()
            .position(|c| c.name == name)
            .filter(|_| qualifier_ok)
            .ok_or_else(|| invalid_identifier(qualifier, name))
    }
}

fn invalid_identifier(qualifier: Option<&str>, name: &str) -> Error {
    let full = match qualifier {
        Some(q) => format!("\"{}\".\"{}\"", q, name),
        None => format!("\"{}\"", name),
    };
    Error::oracle(code::INVALID_IDENTIFIER, format!("{}: invalid identifier", full))
}

/// The row an expression is evaluated against
struct RowRef<'r> {
    row: Option<&'r RelRow>,
    rownum: u64,
}

/// Evaluates statements over a read-only view of the catalog
pub(super) struct Evaluator<'a> {
    catalog: &'a Catalog,
    binds: &'a Binds,
}

/// Outcome of an INSERT
#[derive(Debug)]
pub(super) struct Inserted {
    /// RETURNING values, paired with their INTO bind names
    pub returning: Vec<(String, Option<Datum>, ColumnType)>,
}

impl<'a> Evaluator<'a> {
    pub fn new(catalog: &'a Catalog, binds: &'a Binds) -> Self {
        Self { catalog, binds }
    }

    /// Run a query to completion
    pub fn select(&self, select: &Select) -> Result<Relation> {
        let scope = self.source(&select.from)?;

        let mut kept = Vec::new();
        for row in &scope.relation.rows {
            let here = RowRef {
                row: Some(row),
                rownum: kept.len() as u64 + 1,
            };
            let keep = match &select.filter {
                Some(filter) => self.condition(filter, &scope, &here)? == Some(true),
                None => true,
            };
            if keep {
                kept.push(row);
            }
        }

        let mut columns = Vec::new();
        for item in &select.items {
            match item {
                SelectItem::Wildcard => columns.extend(scope.relation.columns.iter().cloned()),
                SelectItem::Expr { expr, alias, text } => columns.push(RelColumn {
                    name: output_name(expr, alias.as_deref(), text),
                    column_type: self.expr_type(expr, &scope)?,
                }),
            }
        }

        let mut projected = Vec::with_capacity(kept.len());
        for (i, row) in kept.iter().enumerate() {
            let here = RowRef {
                row: Some(*row),
                rownum: i as u64 + 1,
            };
            let mut cells = Vec::with_capacity(columns.len());
            for item in &select.items {
                match item {
                    SelectItem::Wildcard => cells.extend(row.cells.iter().cloned()),
                    SelectItem::Expr { expr, .. } => cells.push(self.value(expr, &scope, &here)?),
                }
            }
            projected.push(RelRow {
                cells,
                rowid: row.rowid,
            });
        }

        if !select.order_by.is_empty() {
            let aliases: Vec<Option<&str>> = select
                .items
                .iter()
                .flat_map(|item| match item {
                    SelectItem::Wildcard => vec![None; scope.relation.columns.len()],
                    SelectItem::Expr { alias, .. } => vec![alias.as_deref()],
                })
                .collect();

            let mut keyed = Vec::with_capacity(projected.len());
            for (i, (source, out)) in kept.iter().zip(projected).enumerate() {
                let here = RowRef {
                    row: Some(*source),
                    rownum: i as u64 + 1,
                };
                let mut keys = Vec::with_capacity(select.order_by.len());
                for key in &select.order_by {
                    let position = match &key.expr {
                        Expr::Number(n) => n.parse::<usize>().ok().filter(|p| *p >= 1),
                        Expr::Column {
                            qualifier: None,
                            name,
                        } => aliases.iter().position(|a| *a == Some(name.as_str())).map(|p| p + 1),
                        _ => None,
                    };
                    let value = match position {
                        Some(p) => out.cells.get(p - 1).cloned().ok_or_else(|| {
                            Error::oracle(
                                1785,
                                "ORDER BY item must be the number of a SELECT-list expression",
                            )
                        })?,
                        None => self.value(&key.expr, &scope, &here)?,
                    };
                    keys.push(value);
                }
                keyed.push((keys, out));
            }

            let mut failure = None;
            keyed.sort_by(|(a, _), (b, _)| {
                for (i, key) in select.order_by.iter().enumerate() {
                    let ordering = match (&a[i], &b[i]) {
                        (None, None) => Ordering::Equal,
                        (None, Some(_)) => Ordering::Greater,
                        (Some(_), None) => Ordering::Less,
                        (Some(x), Some(y)) => match compare(x, y) {
                            Ok(o) => o,
                            Err(e) => {
                                failure.get_or_insert(e);
                                Ordering::Equal
                            }
                        },
                    };
                    let ordering = if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
            if let Some(e) = failure {
                return Err(e);
            }
            projected = keyed.into_iter().map(|(_, row)| row).collect();
        }

        Ok(Relation {
            columns,
            rows: projected,
        })
    }

    fn source(&self, from: &FromItem) -> Result<Scope> {
        Ok(match from {
            FromItem::Dual => Scope {
                qualifier: Some("DUAL".to_string()),
                relation: Relation {
                    columns: vec![RelColumn {
                        name: "DUMMY".to_string(),
                        column_type: varchar(1),
                    }],
                    rows: vec![RelRow {
                        cells: vec![Some(Datum::text(OracleType::Varchar, "X"))],
                        rowid: Some(RowId::new(143, 1, 2168, 0)),
                    }],
                },
            },
            FromItem::Table { name, alias } => {
                let relation = match name.as_str() {
                    "ALL_TAB_COLUMNS" | "USER_TAB_COLUMNS" => self.dictionary(),
                    _ => {
                        let table = self.catalog.table(name)?;
                        Relation {
                            columns: table
                                .columns
                                .iter()
                                .map(|c| RelColumn {
                                    name: c.name.clone(),
                                    column_type: c.column_type.clone(),
                                })
                                .collect(),
                            rows: table
                                .rows
                                .iter()
                                .map(|r| RelRow {
                                    cells: r.cells.clone(),
                                    rowid: Some(r.rowid),
                                })
                                .collect(),
                        }
                    }
                };
                Scope {
                    qualifier: Some(alias.clone().unwrap_or_else(|| name.clone())),
                    relation,
                }
            }
            FromItem::Derived { query, alias } => Scope {
                qualifier: alias.clone(),
                relation: self.select(query)?,
            },
        })
    }

    /// `ALL_TAB_COLUMNS` over every stored table
    fn dictionary(&self) -> Relation {
        let number = |n: Option<i64>| n.and_then(|n| Datum::number(&n.to_string()).ok());
        let text = |s: &str| Some(Datum::text(OracleType::Varchar, s));
        let columns = [
            ("TABLE_NAME", varchar(128)),
            ("COLUMN_NAME", varchar(128)),
            ("DATA_TYPE", varchar(106)),
            ("CHAR_LENGTH", integer()),
            ("DATA_PRECISION", integer()),
            ("DATA_SCALE", integer()),
            ("NULLABLE", varchar(1)),
            ("COLUMN_ID", integer()),
        ]
        .into_iter()
        .map(|(name, column_type)| RelColumn {
            name: name.to_string(),
            column_type,
        })
        .collect();

        let mut rows = Vec::new();
        for table in self.catalog.tables() {
            for (i, column) in table.columns.iter().enumerate() {
                let ty = &column.column_type;
                rows.push(RelRow {
                    cells: vec![
                        text(&table.name),
                        text(&column.name),
                        text(&ty.dictionary_type),
                        number(Some(i64::from(ty.char_length()))),
                        number(ty.dictionary_precision.map(i64::from)),
                        number(ty.dictionary_scale.map(i64::from)),
                        text(if column.nullable { "Y" } else { "N" }),
                        number(Some(i as i64 + 1)),
                    ],
                    rowid: None,
                });
            }
        }
        Relation { columns, rows }
    }

    fn expr_type(&self, expr: &Expr, scope: &Scope) -> Result<ColumnType> {
        Ok(match expr {
            Expr::Null => varchar(0),
            Expr::Number(_) | Expr::RowNum => ColumnType::natural(OracleType::Number, 0),
            Expr::Str(s) => {
                let mut ty = ColumnType::natural(OracleType::Char, csfrm::IMPLICIT);
                ty.size = s.len() as u32;
                ty
            }
            Expr::Bind(name) => match self.binds.get(name) {
                Some(Some(datum)) => ColumnType::natural(datum.oracle_type, datum.csfrm),
                _ => varchar(0),
            },
            Expr::Column { qualifier, name } => {
                let index = scope.resolve(qualifier.as_deref(), name)?;
                scope.relation.columns[index].column_type.clone()
            }
            Expr::RowId { .. } => ColumnType::natural(OracleType::Rowid, 0),
            Expr::Negate(inner) => self.expr_type(inner, scope)?,
            Expr::Cast(_, spec) => ColumnType::from_spec(spec)?,
            Expr::Subquery(query) => {
                let relation = self.select(query)?;
                if relation.columns.len() != 1 {
                    return Err(Error::oracle(code::TOO_MANY_VALUES, "too many values"));
                }
                let ty = relation.columns[0].column_type.clone();
                if ty.oracle_type == OracleType::Number {
                    ColumnType::natural(OracleType::Number, 0)
                } else {
                    ty
                }
            }
            Expr::Compare(..) | Expr::IsNull { .. } | Expr::Not(_) | Expr::And(..) | Expr::Or(..) => {
                return Err(Error::oracle(
                    code::FROM_NOT_FOUND,
                    "FROM keyword not found where expected",
                ))
            }
        })
    }

    fn value(&self, expr: &Expr, scope: &Scope, here: &RowRef<'_>) -> Result<Option<Datum>> {
        Ok(match expr {
            Expr::Null => None,
            Expr::Number(n) => Some(Datum::number(n)?),
            Expr::Str(s) if s.is_empty() => None,
            Expr::Str(s) => Some(Datum::text(OracleType::Char, s)),
            Expr::Bind(name) => self
                .binds
                .get(name)
                .cloned()
                .ok_or_else(|| Error::oracle(code::NOT_ALL_BOUND, "not all variables bound"))?,
            Expr::Column { qualifier, name } => {
                let index = scope.resolve(qualifier.as_deref(), name)?;
                here.row.and_then(|row| row.cells.get(index).cloned().flatten())
            }
            Expr::RowId { qualifier } => {
                let rowid = here
                    .row
                    .and_then(|row| row.rowid)
                    .ok_or_else(|| invalid_identifier(qualifier.as_deref(), "ROWID"))?;
                Some(Datum::text(OracleType::Rowid, &rowid.encode()))
            }
            Expr::RowNum => Some(Datum::number(&here.rownum.to_string())?),
            Expr::Negate(inner) => match self.value(inner, scope, here)? {
                None => None,
                Some(datum) => Some(negate(&datum)?),
            },
            Expr::Cast(inner, spec) => {
                let target = ColumnType::from_spec(spec)?;
                match self.value(inner, scope, here)? {
                    None => None,
                    Some(datum) => Some(store(datum.decode()?, &target, "CAST")?),
                }
            }
            Expr::Subquery(query) => {
                let relation = self.select(query)?;
                if relation.columns.len() != 1 {
                    return Err(Error::oracle(code::TOO_MANY_VALUES, "too many values"));
                }
                match relation.rows.len() {
                    0 => None,
                    1 => relation.rows.into_iter().next().and_then(|r| r.cells.into_iter().next()).flatten(),
                    _ => {
                        return Err(Error::oracle(
                            code::SUBQUERY_ROWS,
                            "single-row subquery returns more than one row",
                        ))
                    }
                }
            }
            Expr::Compare(..) | Expr::IsNull { .. } | Expr::Not(_) | Expr::And(..) | Expr::Or(..) => {
                return Err(Error::oracle(
                    code::FROM_NOT_FOUND,
                    "FROM keyword not found where expected",
                ))
            }
        })
    }

    /// Three-valued truth of a condition
    fn condition(&self, expr: &Expr, scope: &Scope, here: &RowRef<'_>) -> Result<Option<bool>> {
        Ok(match expr {
            Expr::Compare(op, left, right) => {
                let left = self.value(left, scope, here)?;
                let right = self.value(right, scope, here)?;
                match (left, right) {
                    (Some(a), Some(b)) => {
                        let ordering = compare(&a, &b)?;
                        Some(match op {
                            CompareOp::Eq => ordering == Ordering::Equal,
                            CompareOp::Ne => ordering != Ordering::Equal,
                            CompareOp::Lt => ordering == Ordering::Less,
                            CompareOp::Le => ordering != Ordering::Greater,
                            CompareOp::Gt => ordering == Ordering::Greater,
                            CompareOp::Ge => ordering != Ordering::Less,
                        })
                    }
                    _ => None,
                }
            }
            Expr::IsNull { expr, negated } => {
                Some(self.value(expr, scope, here)?.is_none() != *negated)
            }
            Expr::Not(inner) => self.condition(inner, scope, here)?.map(|b| !b),
            Expr::And(a, b) => {
                match (self.condition(a, scope, here)?, self.condition(b, scope, here)?) {
                    (Some(false), _) | (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                }
            }
            Expr::Or(a, b) => {
                match (self.condition(a, scope, here)?, self.condition(b, scope, here)?) {
                    (Some(true), _) | (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                }
            }
            _ => return Err(Error::oracle(920, "invalid relational operator")),
        })
    }

    /// Evaluate the VALUES of an INSERT and convert them for the target columns
    pub fn insert_cells(&self, insert: &Insert) -> Result<Vec<Option<Datum>>> {
        let table = self.catalog.table(&insert.table)?;
        let targets: Vec<usize> = match &insert.columns {
            Some(names) => names
                .iter()
                .map(|name| {
                    table
                        .column_index(name)
                        .ok_or_else(|| invalid_identifier(Some(&table.name), name))
                })
                .collect::<Result<_>>()?,
            None => (0..table.columns.len()).collect(),
        };
        if insert.values.len() > targets.len() {
            return Err(Error::oracle(code::TOO_MANY_VALUES, "too many values"));
        }
        if insert.values.len() < targets.len() {
            return Err(Error::oracle(code::NOT_ENOUGH_VALUES, "not enough values"));
        }

        let scope = Scope::empty();
        let here = RowRef { row: None, rownum: 1 };
        let mut cells = vec![None; table.columns.len()];
        for (expr, &index) in insert.values.iter().zip(&targets) {
            let value = self.value(expr, &scope, &here)?;
            cells[index] = match value {
                None => None,
                Some(datum) => Some(store(
                    datum.decode()?,
                    &table.columns[index].column_type,
                    &table.label(index),
                )?),
            };
        }
        Ok(cells)
    }

    /// Evaluate a RETURNING clause against the row just inserted
    pub fn returning(&self, insert: &Insert, rowid: RowId) -> Result<Inserted> {
        if insert.returning.len() != insert.into.len() {
            return Err(Error::oracle(
                code::NOT_ENOUGH_VALUES,
                "not enough values",
            ));
        }
        let table = self.catalog.table(&insert.table)?;
        let Some(stored) = table.rows.iter().find(|r| r.rowid == rowid) else {
            return Err(Error::Internal("inserted row not found".to_string()));
        };
        let scope = Scope {
            qualifier: Some(table.name.clone()),
            relation: Relation {
                columns: table
                    .columns
                    .iter()
                    .map(|c| RelColumn {
                        name: c.name.clone(),
                        column_type: c.column_type.clone(),
                    })
                    .collect(),
                rows: Vec::new(),
            },
        };
        let row = RelRow {
            cells: stored.cells.clone(),
            rowid: Some(stored.rowid),
        };
        let here = RowRef {
            row: Some(&row),
            rownum: 1,
        };

        let mut returning = Vec::with_capacity(insert.returning.len());
        for (expr, bind) in insert.returning.iter().zip(&insert.into) {
            returning.push((
                bind.clone(),
                self.value(expr, &scope, &here)?,
                self.expr_type(expr, &scope)?,
            ));
        }
        Ok(Inserted { returning })
    }
}

/// Columns of a new table
pub(super) fn table_columns(create: &CreateTable) -> Result<Vec<StoredColumn>> {
    create
        .columns
        .iter()
        .map(|spec| {
            let primary_key = spec.primary_key || create.primary_key.contains(&spec.name);
            Ok(StoredColumn {
                name: spec.name.clone(),
                column_type: ColumnType::from_spec(&spec.data_type)?,
                nullable: !(spec.not_null || primary_key),
                primary_key,
            })
        })
        .collect()
}

/// Name Oracle gives an unaliased select item
fn output_name(expr: &Expr, alias: Option<&str>, text: &str) -> String {
    if let Some(alias) = alias {
        return alias.to_string();
    }
    match expr {
        Expr::Column { name, .. } => name.clone(),
        Expr::RowId { .. } => "ROWID".to_string(),
        Expr::RowNum => "ROWNUM".to_string(),
        _ => text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase(),
    }
}

fn negate(datum: &Datum) -> Result<Datum> {
    match datum.decode()? {
        Scalar::Number(n) => {
            let value = match n.value.strip_prefix('-') {
                Some(positive) => positive.to_string(),
                None => format!("-{}", n.value),
            };
            store(
                Scalar::Number(OracleNumber::new(value)),
                &ColumnType::natural(OracleType::Number, 0),
                "",
            )
        }
        Scalar::Double(f) => store(
            Scalar::Double(-f),
            &ColumnType::natural(datum.oracle_type, 0),
            "",
        ),
        Scalar::Text(s) => {
            let f: f64 = s
                .trim()
                .parse()
                .map_err(|_| Error::oracle(code::INVALID_NUMBER, "invalid number"))?;
            store(Scalar::Double(-f), &ColumnType::natural(OracleType::Number, 0), "")
        }
        _ => Err(Error::oracle(
            code::INCONSISTENT_DATATYPES,
            "inconsistent datatypes: expected NUMBER",
        )),
    }
}

fn varchar(size: u32) -> ColumnType {
    let mut ty = ColumnType::natural(OracleType::Varchar, csfrm::IMPLICIT);
    ty.size = size;
    ty
}

fn integer() -> ColumnType {
    let mut ty = ColumnType::natural(OracleType::Number, 0);
    ty.precision = INTEGER_PRECISION;
    ty.scale = 0;
    ty
}

#[cfg(test)]
mod tests {
    use super::super::sql::{parse, Statement};
    use super::*;

    fn catalog_with(ddl: &[&str]) -> Catalog {
        let mut catalog = Catalog::default();
        for sql in ddl {
            match parse(sql).unwrap() {
                Statement::CreateTable(create) => {
                    let columns = table_columns(&create).unwrap();
                    catalog.create_table(create.name, columns).unwrap();
                }
                other => panic!("not DDL: {:?}", other),
            }
        }
        catalog
    }

    fn insert(catalog: &mut Catalog, sql: &str) {
        let Statement::Insert(insert) = parse(sql).unwrap() else {
            panic!("not an insert");
        };
        let binds = Binds::new();
        let cells = Evaluator::new(catalog, &binds).insert_cells(&insert).unwrap();
        catalog.table_mut(&insert.table).unwrap().insert(cells).unwrap();
    }

    fn query(catalog: &Catalog, sql: &str) -> Result<Relation> {
        let Statement::Select(select) = parse(sql).unwrap() else {
            panic!("not a query");
        };
        let binds = Binds::new();
        Evaluator::new(catalog, &binds).select(&select)
    }

    fn number_at(relation: &Relation, row: usize, col: usize) -> String {
        match relation.rows[row].cells[col].as_ref().unwrap().decode().unwrap() {
            Scalar::Number(n) => n.value,
            other => panic!("not a number: {:?}", other),
        }
    }

    #[test]
    fn test_literal_metadata_is_ambiguous() {
        let catalog = Catalog::default();
        let relation = query(&catalog, "SELECT 5.66 FROM DUAL").unwrap();
        let info = &relation.describe()[0];
        assert_eq!(info.name, "5.66");
        assert!(info.has_ambiguous_precision());

        let relation = query(&catalog, "SELECT CAST(15 AS NUMBER(10, 2)) AS x FROM DUAL").unwrap();
        let info = &relation.describe()[0];
        assert_eq!((info.name.as_str(), info.precision, info.scale), ("X", 10, 2));
    }

    #[test]
    fn test_scalar_subquery_hides_precision() {
        let mut catalog = catalog_with(&["CREATE TABLE foo (idata INTEGER, ndata NUMERIC(20, 2))"]);
        insert(&mut catalog, "INSERT INTO foo (idata, ndata) VALUES (5, 45.6)");
        let relation = query(
            &catalog,
            "SELECT (SELECT idata FROM foo) AS a, (SELECT ndata FROM foo) AS b FROM DUAL",
        )
        .unwrap();
        for info in relation.describe() {
            assert!(info.has_ambiguous_precision(), "{:?}", info);
        }
        assert_eq!(number_at(&relation, 0, 0), "5");
        assert_eq!(number_at(&relation, 0, 1), "45.6");
    }

    #[test]
    fn test_filter_order_and_rownum() {
        let mut catalog = catalog_with(&["CREATE TABLE t (id INTEGER PRIMARY KEY, data VARCHAR2(20))"]);
        for (id, data) in [(3, "c"), (1, "a"), (2, "b")] {
            insert(&mut catalog, &format!("INSERT INTO t (id, data) VALUES ({}, '{}')", id, data));
        }
        let relation = query(&catalog, "SELECT t.id FROM t ORDER BY t.id DESC").unwrap();
        let ids: Vec<String> = (0..3).map(|i| number_at(&relation, i, 0)).collect();
        assert_eq!(ids, ["3", "2", "1"]);

        let relation = query(&catalog, "SELECT id FROM t WHERE ROWNUM <= 2 AND id > 1").unwrap();
        assert_eq!(relation.rows.len(), 2);

        let relation = query(&catalog, "SELECT id FROM t WHERE data = 'b'").unwrap();
        assert_eq!(number_at(&relation, 0, 0), "2");
    }

    #[test]
    fn test_derived_table_keeps_rowid() {
        let mut catalog = catalog_with(&["CREATE TABLE t1 (x INTEGER)"]);
        insert(&mut catalog, "INSERT INTO t1 (x) VALUES (5)");
        let relation = query(&catalog, "SELECT rowid FROM (SELECT t1.x FROM t1) anon_1").unwrap();
        assert_eq!(relation.columns[0].name, "ROWID");
        let stored = catalog.table("T1").unwrap().rows[0].rowid;
        let cell = relation.rows[0].cells[0].as_ref().unwrap();
        assert_eq!(cell.decode().unwrap(), Scalar::RowId(stored));
    }

    #[test]
    fn test_errors() {
        let mut catalog = catalog_with(&["CREATE TABLE t (id INTEGER)"]);
        insert(&mut catalog, "INSERT INTO t (id) VALUES (1)");
        insert(&mut catalog, "INSERT INTO t (id) VALUES (2)");

        let err = query(&catalog, "SELECT (SELECT id FROM t) FROM DUAL").unwrap_err();
        assert_eq!(err.oracle_code(), Some(code::SUBQUERY_ROWS));
        let err = query(&catalog, "SELECT nope FROM t").unwrap_err();
        assert_eq!(err.to_string(), "ORA-00904: \"NOPE\": invalid identifier");
        let err = query(&catalog, "SELECT id FROM missing").unwrap_err();
        assert_eq!(err.oracle_code(), Some(code::TABLE_NOT_FOUND));
        let err = query(&catalog, "SELECT :x FROM DUAL").unwrap_err();
        assert_eq!(err.oracle_code(), Some(code::NOT_ALL_BOUND));

        let Statement::Insert(ins) = parse("INSERT INTO t (id) VALUES (1, 2)").unwrap() else {
            unreachable!()
        };
        let binds = Binds::new();
        let err = Evaluator::new(&catalog, &binds).insert_cells(&ins).unwrap_err();
        assert_eq!(err.oracle_code(), Some(code::TOO_MANY_VALUES));
    }

    #[test]
    fn test_dictionary_rows() {
        let catalog = catalog_with(&[
            "CREATE TABLE z (id NUMBER(10, 2) NOT NULL, name NVARCHAR2(250), f FLOAT)",
        ]);
        let relation = query(
            &catalog,
            "SELECT column_name, data_type, char_length, data_precision, data_scale, nullable \
             FROM all_tab_columns WHERE table_name = 'Z' ORDER BY column_id",
        )
        .unwrap();
        assert_eq!(relation.rows.len(), 3);
        let text = |row: usize, col: usize| {
            relation.rows[row].cells[col]
                .as_ref()
                .map(|d| d.utf8().unwrap().to_string())
        };
        assert_eq!(text(0, 0).as_deref(), Some("ID"));
        assert_eq!(text(0, 5).as_deref(), Some("N"));
        assert_eq!(number_at(&relation, 0, 3), "10");
        assert_eq!(text(1, 1).as_deref(), Some("NVARCHAR2"));
        assert_eq!(number_at(&relation, 1, 2), "250");
        assert_eq!(text(2, 1).as_deref(), Some("FLOAT"));
        assert!(relation.rows[2].cells[4].is_none());
    }
}
