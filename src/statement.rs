//! SQL statement classification and result metadata
//!
//! Drivers use [`Statement`] to decide whether a statement produces rows and
//! which bind placeholders it expects; [`ColumnInfo`] is the describe
//! metadata a driver reports for each result column.

use crate::constants::{csfrm, OracleType, SCALE_UNKNOWN};

/// Statement type determined by parsing the SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementType {
    /// Unknown or unparsed statement
    #[default]
    Unknown,
    /// SELECT query
    Query,
    /// DML: INSERT, UPDATE, DELETE, MERGE
    Dml,
    /// DDL: CREATE, ALTER, DROP, etc.
    Ddl,
    /// PL/SQL block: BEGIN, DECLARE, CALL
    PlSql,
}

/// A bind placeholder found in the SQL text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindInfo {
    /// Parameter name without the leading colon, uppercased unless quoted
    pub name: String,
    /// Whether this is a RETURNING INTO bind
    pub is_return_bind: bool,
}

/// Metadata for a column in a result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name as the server reports it
    pub name: String,
    /// Oracle data type
    pub oracle_type: OracleType,
    /// Data type size (characters for CHAR semantics, bytes otherwise)
    pub data_size: u32,
    /// Precision (for NUMBER)
    pub precision: i16,
    /// Scale (for NUMBER)
    pub scale: i16,
    /// Whether NULL values are allowed
    pub nullable: bool,
    /// Character set form
    pub csfrm: u8,
}

impl ColumnInfo {
    /// Create a new column with minimal info
    pub fn new(name: impl Into<String>, oracle_type: OracleType) -> Self {
        let csfrm = if oracle_type.is_character() {
            csfrm::IMPLICIT
        } else {
            0
        };
        Self {
            name: name.into(),
            oracle_type,
            data_size: 0,
            precision: 0,
            scale: 0,
            nullable: true,
            csfrm,
        }
    }

    /// Set NUMBER precision and scale
    pub fn with_precision(mut self, precision: i16, scale: i16) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Set the data size
    pub fn with_size(mut self, data_size: u32) -> Self {
        self.data_size = data_size;
        self
    }

    /// Mark the column as using the national character set
    pub fn national(mut self) -> Self {
        self.csfrm = csfrm::NCHAR;
        self
    }

    /// Whether the describe metadata gives no usable precision
    ///
    /// Oracle reports `(0, 0)` or `(0, -127)` for numeric literals, bind
    /// expressions and scalar subqueries.
    pub fn has_ambiguous_precision(&self) -> bool {
        self.oracle_type == OracleType::Number
            && self.precision == 0
            && (self.scale == 0 || self.scale == SCALE_UNKNOWN)
    }
}

/// A parsed SQL statement
#[derive(Debug, Clone)]
pub struct Statement {
    sql: String,
    statement_type: StatementType,
    binds: Vec<BindInfo>,
    is_returning: bool,
}

impl Statement {
    /// Create a new statement from SQL text
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let statement_type = classify(&sql);
        let mut stmt = Self {
            sql,
            statement_type,
            binds: Vec::new(),
            is_returning: false,
        };
        if statement_type != StatementType::Ddl {
            stmt.scan_binds();
        }
        stmt
    }

    /// Get the statement type
    pub fn statement_type(&self) -> StatementType {
        self.statement_type
    }

    /// Check if this is a RETURNING ... INTO statement
    pub fn is_returning(&self) -> bool {
        self.is_returning
    }

    /// Bind placeholders in order of appearance
    pub fn binds(&self) -> &[BindInfo] {
        &self.binds
    }

    /// Distinct bind names in order of first appearance
    pub fn bind_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for bind in &self.binds {
            if !names.contains(&bind.name.as_str()) {
                names.push(&bind.name);
            }
        }
        names
    }

    fn scan_binds(&mut self) {
        let chars: Vec<char> = self.sql.chars().collect();
        let upper: Vec<char> = self.sql.to_uppercase().chars().collect();
        // uppercasing can change the length of non-ASCII text
        let upper = if upper.len() == chars.len() { upper } else { chars.clone() };

        let mut state = Lexical::Code;
        let mut returning_found = false;
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            let next = chars.get(i + 1).copied();
            match state {
                Lexical::String => {
                    if ch == '\'' {
                        state = Lexical::Code;
                    }
                    i += 1;
                    continue;
                }
                Lexical::LineComment => {
                    if ch == '\n' {
                        state = Lexical::Code;
                    }
                    i += 1;
                    continue;
                }
                Lexical::BlockComment => {
                    if ch == '*' && next == Some('/') {
                        state = Lexical::Code;
                        i += 2;
                    } else {
                        i += 1;
                    }
                    continue;
                }
                Lexical::Code => {}
            }

            match ch {
                '\'' => state = Lexical::String,
                '-' if next == Some('-') => {
                    state = Lexical::LineComment;
                    i += 1;
                }
                '/' if next == Some('*') => {
                    state = Lexical::BlockComment;
                    i += 1;
                }
                ':' => {
                    if let Some((name, consumed)) = bind_name_at(&chars, i + 1) {
                        let should_add = self.statement_type != StatementType::PlSql
                            || !self.binds.iter().any(|b| b.name == name);
                        if should_add {
                            self.binds.push(BindInfo {
                                name,
                                is_return_bind: self.is_returning,
                            });
                        }
                        i += 1 + consumed;
                        continue;
                    }
                }
                _ if self.statement_type == StatementType::Dml => {
                    if !returning_found && keyword_at(&upper, i, "RETURNING") {
                        returning_found = true;
                        i += "RETURNING".len();
                        continue;
                    }
                    if returning_found && !self.is_returning && keyword_at(&upper, i, "INTO") {
                        self.is_returning = true;
                        i += "INTO".len();
                        continue;
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}

#[derive(Clone, Copy)]
enum Lexical {
    Code,
    String,
    LineComment,
    BlockComment,
}

fn classify(sql: &str) -> StatementType {
    let first_word = sql
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .to_uppercase();
    match first_word.as_str() {
        "SELECT" | "WITH" => StatementType::Query,
        "INSERT" | "UPDATE" | "DELETE" | "MERGE" => StatementType::Dml,
        "CREATE" | "ALTER" | "DROP" | "GRANT" | "REVOKE" | "ANALYZE" | "AUDIT" | "COMMENT"
        | "TRUNCATE" => StatementType::Ddl,
        "DECLARE" | "BEGIN" | "CALL" => StatementType::PlSql,
        _ => StatementType::Unknown,
    }
}

fn keyword_at(chars: &[char], pos: usize, keyword: &str) -> bool {
    let end = pos + keyword.len();
    if end > chars.len() {
        return false;
    }
    if pos > 0 && chars[pos - 1].is_alphanumeric() {
        return false;
    }
    if chars[end..].first().map_or(false, |c| c.is_alphanumeric() || *c == '_') {
        return false;
    }
    chars[pos..end].iter().copied().eq(keyword.chars())
}

/// Bind name starting at `start` and the number of characters it spans
fn bind_name_at(chars: &[char], start: usize) -> Option<(String, usize)> {
    let first = *chars.get(start)?;

    if first == '"' {
        let len = chars[start + 1..].iter().position(|c| *c == '"')?;
        if len == 0 {
            return None;
        }
        let name = chars[start + 1..start + 1 + len].iter().collect();
        return Some((name, len + 2));
    }

    if first.is_ascii_digit() {
        let len = chars[start..].iter().take_while(|c| c.is_ascii_digit()).count();
        return Some((chars[start..start + len].iter().collect(), len));
    }

    if !first.is_alphabetic() {
        return None;
    }
    let len = chars[start..]
        .iter()
        .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '#'))
        .count();
    let name: String = chars[start..start + len].iter().collect();
    Some((name.to_uppercase(), len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_type_detection() {
        assert_eq!(Statement::new("SELECT * FROM dual").statement_type(), StatementType::Query);
        assert_eq!(Statement::new("INSERT INTO t VALUES (1)").statement_type(), StatementType::Dml);
        assert_eq!(Statement::new("CREATE TABLE t (x NUMBER)").statement_type(), StatementType::Ddl);
        assert_eq!(
            Statement::new("ALTER SESSION SET NLS_TERRITORY='GERMANY'").statement_type(),
            StatementType::Ddl
        );
        assert_eq!(Statement::new("BEGIN NULL; END;").statement_type(), StatementType::PlSql);
        assert_eq!(
            Statement::new("\n   select 1.1 from dual").statement_type(),
            StatementType::Query
        );
    }

    #[test]
    fn test_bind_variable_extraction() {
        let stmt = Statement::new("SELECT * FROM t WHERE x = :x AND y = :y_2");
        let names: Vec<_> = stmt.binds().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y_2"]);
    }

    #[test]
    fn test_numeric_and_quoted_binds() {
        let stmt = Statement::new("SELECT * FROM t WHERE x = :1 AND y = :\"MyBind\"");
        let names: Vec<_> = stmt.binds().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["1", "MyBind"]);
    }

    #[test]
    fn test_duplicate_binds() {
        let sql = Statement::new("SELECT * FROM t WHERE x = :x OR y = :x");
        assert_eq!(sql.binds().len(), 2);
        assert_eq!(sql.bind_names(), vec!["X"]);

        let plsql = Statement::new("BEGIN :x := :x + 1; END;");
        assert_eq!(plsql.binds().len(), 1);
    }

    #[test]
    fn test_returning_into() {
        let stmt = Statement::new("INSERT INTO t1 (foo) VALUES (:foo) RETURNING t1.foo INTO :ret_0");
        assert!(stmt.is_returning());
        assert!(!stmt.binds()[0].is_return_bind);
        assert!(stmt.binds()[1].is_return_bind);
    }

    #[test]
    fn test_binds_in_comments_and_strings_ignored() {
        let stmt = Statement::new("SELECT ':no' FROM t /* :x */ WHERE y = :y -- AND z = :z");
        assert_eq!(stmt.bind_names(), vec!["Y"]);
    }

    #[test]
    fn test_ambiguous_precision() {
        let literal = ColumnInfo::new("1.1", OracleType::Number).with_precision(0, SCALE_UNKNOWN);
        assert!(literal.has_ambiguous_precision());
        let integer = ColumnInfo::new("X", OracleType::Number).with_precision(38, 0);
        assert!(!integer.has_ambiguous_precision());
        let float = ColumnInfo::new("F", OracleType::BinaryDouble);
        assert!(!float.has_ambiguous_precision());
    }
}
