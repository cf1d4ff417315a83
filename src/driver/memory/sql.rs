//! Tokenizer and parser for the SQL subset the memory database executes
//!
//! Covered: `CREATE TABLE`, `DROP TABLE`, `INSERT ... VALUES ... RETURNING
//! ... INTO`, `SELECT` over a table, `DUAL`, the column dictionary or a
//! derived table, and `ALTER SESSION SET`. Expressions are literals, binds,
//! column references, `ROWID`, `ROWNUM`, `CAST`, scalar subqueries,
//! comparisons and boolean connectives.

use crate::error::{code, Error, Result};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Unquoted identifier or keyword, uppercased
    Word(String),
    /// Quoted identifier, verbatim
    Quoted(String),
    Number(String),
    Str(String),
    /// Bind name, uppercased unless quoted
    Bind(String),
    Symbol(&'static str),
}

#[derive(Debug, Clone)]
struct Lexed {
    token: Token,
    start: usize,
    end: usize,
}

const SYMBOLS: &[&str] = &[
    "<>", "!=", "<=", ">=", "||", "(", ")", ",", ".", "*", "=", "<", ">", "+", "-", "/", ";",
];

/// Words that end an expression or select item instead of naming an alias
const RESERVED: &[&str] = &[
    "FROM", "WHERE", "ORDER", "BY", "AND", "OR", "NOT", "AS", "ASC", "DESC", "INTO", "VALUES",
    "RETURNING", "IS", "NULL", "UNION", "GROUP", "HAVING",
];

fn syntax_error(code: u32, message: &str) -> Error {
    Error::oracle(code, message)
}

fn tokenize(sql: &str) -> Result<Vec<Lexed>> {
    let chars: Vec<(usize, char)> = sql.char_indices().collect();
    let end_of = |i: usize| chars.get(i).map_or(sql.len(), |(pos, _)| *pos);
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, ch) = chars[i];
        let next = chars.get(i + 1).map(|(_, c)| *c);

        if ch.is_whitespace() {
            i += 1;
            continue;
        }
        if ch == '-' && next == Some('-') {
            while i < chars.len() && chars[i].1 != '\n' {
                i += 1;
            }
            continue;
        }
        if ch == '/' && next == Some('*') {
            i += 2;
            while i < chars.len() && !(chars[i].1 == '*' && chars.get(i + 1).map(|c| c.1) == Some('/')) {
                i += 1;
            }
            i += 2;
            continue;
        }

        let (token, consumed) = if ch == '\'' {
            let mut text = String::new();
            let mut j = i + 1;
            loop {
                match chars.get(j).map(|c| c.1) {
                    None => {
                        return Err(syntax_error(1756, "quoted string not properly terminated"))
                    }
                    Some('\'') if chars.get(j + 1).map(|c| c.1) == Some('\'') => {
                        text.push('\'');
                        j += 2;
                    }
                    Some('\'') => break,
                    Some(c) => {
                        text.push(c);
                        j += 1;
                    }
                }
            }
            (Token::Str(text), j + 1 - i)
        } else if ch == '"' {
            let len = chars[i + 1..]
                .iter()
                .position(|(_, c)| *c == '"')
                .ok_or_else(|| syntax_error(1740, "missing double quote in identifier"))?;
            let name: String = chars[i + 1..i + 1 + len].iter().map(|(_, c)| c).collect();
            (Token::Quoted(name), len + 2)
        } else if ch == ':' {
            let (name, len) = bind_name(&chars[i + 1..])
                .ok_or_else(|| syntax_error(code::INVALID_SQL, "invalid bind variable name"))?;
            (Token::Bind(name), len + 1)
        } else if ch.is_ascii_digit() || (ch == '.' && next.map_or(false, |c| c.is_ascii_digit())) {
            let len = number_len(&chars[i..]);
            let text: String = chars[i..i + len].iter().map(|(_, c)| c).collect();
            (Token::Number(text), len)
        } else if ch.is_alphabetic() {
            let len = chars[i..]
                .iter()
                .take_while(|(_, c)| c.is_alphanumeric() || matches!(c, '_' | '$' | '#'))
                .count();
            let word: String = chars[i..i + len].iter().map(|(_, c)| c).collect();
            (Token::Word(word.to_uppercase()), len)
        } else {
            let rest = &sql[start..];
            let symbol = SYMBOLS
                .iter()
                .find(|s| rest.starts_with(**s))
                .ok_or_else(|| syntax_error(911, "invalid character"))?;
            (Token::Symbol(*symbol), symbol.len())
        };

        tokens.push(Lexed {
            token,
            start,
            end: end_of(i + consumed),
        });
        i += consumed;
    }
    Ok(tokens)
}

fn bind_name(chars: &[(usize, char)]) -> Option<(String, usize)> {
    let first = chars.first()?.1;
    if first == '"' {
        let len = chars[1..].iter().position(|(_, c)| *c == '"')?;
        let name = chars[1..1 + len].iter().map(|(_, c)| c).collect();
        return Some((name, len + 2));
    }
    if !first.is_alphanumeric() {
        return None;
    }
    let len = chars
        .iter()
        .take_while(|(_, c)| c.is_alphanumeric() || matches!(c, '_' | '$' | '#'))
        .count();
    let name: String = chars[..len].iter().map(|(_, c)| c).collect();
    Some((name.to_uppercase(), len))
}

fn number_len(chars: &[(usize, char)]) -> usize {
    let digits = |from: usize| {
        chars[from..]
            .iter()
            .take_while(|(_, c)| c.is_ascii_digit())
            .count()
    };
    let mut len = digits(0);
    if chars.get(len).map(|c| c.1) == Some('.') {
        len += 1 + digits(len + 1);
    }
    if matches!(chars.get(len).map(|c| c.1), Some('e') | Some('E')) {
        let mut exp = len + 1;
        if matches!(chars.get(exp).map(|c| c.1), Some('+') | Some('-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            len = exp + exp_digits;
        }
    }
    len
}

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Statement {
    CreateTable(CreateTable),
    DropTable(String),
    Insert(Insert),
    Select(Select),
    AlterSession { parameter: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub primary_key: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct ColumnSpec {
    pub name: String,
    pub data_type: TypeSpec,
    pub not_null: bool,
    pub primary_key: bool,
}

/// A declared data type, as written
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct TypeSpec {
    /// Type name, multi-word names joined by a space
    pub name: String,
    /// First parenthesized argument: precision or length
    pub precision: Option<u32>,
    /// Second parenthesized argument
    pub scale: Option<i32>,
    /// `CHAR` or `BYTE` length qualifier
    pub char_semantics: Option<bool>,
    pub with_time_zone: bool,
    /// Leading precision of `INTERVAL DAY(n)`
    pub day_precision: Option<u32>,
    /// Fractional precision of `TO SECOND(n)`
    pub second_precision: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Insert {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub values: Vec<Expr>,
    pub returning: Vec<Expr>,
    pub into: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Select {
    pub items: Vec<SelectItem>,
    pub from: FromItem,
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum SelectItem {
    Wildcard,
    Expr {
        expr: Expr,
        alias: Option<String>,
        /// Source text, used to name unaliased expressions
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum FromItem {
    Dual,
    Table { name: String, alias: Option<String> },
    Derived { query: Box<Select>, alias: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct OrderKey {
    pub expr: Expr,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Expr {
    Null,
    Number(String),
    Str(String),
    Bind(String),
    Column { qualifier: Option<String>, name: String },
    RowId { qualifier: Option<String> },
    RowNum,
    Negate(Box<Expr>),
    Cast(Box<Expr>, TypeSpec),
    Subquery(Box<Select>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    IsNull { expr: Box<Expr>, negated: bool },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Parse one statement
pub(super) fn parse(sql: &str) -> Result<Statement> {
    let mut parser = Parser {
        sql,
        tokens: tokenize(sql)?,
        pos: 0,
    };
    let stmt = parser.statement()?;
    parser.eat_symbol(";");
    if parser.pos < parser.tokens.len() {
        return Err(syntax_error(code::NOT_PROPERLY_ENDED, "SQL command not properly ended"));
    }
    Ok(stmt)
}

struct Parser<'a> {
    sql: &'a str,
    tokens: Vec<Lexed>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w == word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.eat_word(word) {
            Ok(())
        } else {
            let code = if word == "FROM" {
                code::FROM_NOT_FOUND
            } else {
                code::INVALID_SQL
            };
            Err(syntax_error(code, &format!("{} expected", word)))
        }
    }

    fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self.peek(), Some(Token::Symbol(s)) if *s == symbol)
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.is_symbol(symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<()> {
        if self.eat_symbol(symbol) {
            return Ok(());
        }
        Err(match symbol {
            "(" => syntax_error(code::MISSING_LEFT_PAREN, "missing left parenthesis"),
            ")" => syntax_error(code::MISSING_RIGHT_PAREN, "missing right parenthesis"),
            _ => syntax_error(code::INVALID_SQL, &format!("'{}' expected", symbol)),
        })
    }

    fn identifier(&mut self) -> Result<String> {
        match self.peek().cloned() {
            Some(Token::Word(w)) if !RESERVED.contains(&w.as_str()) => {
                self.pos += 1;
                Ok(w)
            }
            Some(Token::Quoted(q)) => {
                self.pos += 1;
                Ok(q)
            }
            _ => Err(syntax_error(code::INVALID_IDENTIFIER, "invalid identifier")),
        }
    }

    fn optional_alias(&mut self) -> Result<Option<String>> {
        if self.eat_word("AS") {
            return self.identifier().map(Some);
        }
        let names_alias = match self.peek() {
            Some(Token::Word(w)) => !RESERVED.contains(&w.as_str()),
            Some(Token::Quoted(_)) => true,
            _ => false,
        };
        if names_alias {
            self.identifier().map(Some)
        } else {
            Ok(None)
        }
    }

    fn number_arg(&mut self) -> Result<u32> {
        match self.advance() {
            Some(Token::Number(n)) => n
                .parse()
                .map_err(|_| syntax_error(code::INVALID_DATATYPE, "invalid precision")),
            _ => Err(syntax_error(code::INVALID_DATATYPE, "invalid datatype")),
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        let word = match self.peek() {
            Some(Token::Word(w)) => w.clone(),
            Some(Token::Symbol("(")) => return Ok(Statement::Select(self.parenthesized_select()?)),
            _ => return Err(syntax_error(code::INVALID_SQL, "invalid SQL statement")),
        };
        match word.as_str() {
            "CREATE" => self.create_table(),
            "DROP" => {
                self.pos += 1;
                self.expect_word("TABLE")?;
                Ok(Statement::DropTable(self.identifier()?))
            }
            "INSERT" => self.insert(),
            "SELECT" => Ok(Statement::Select(self.select()?)),
            "ALTER" => self.alter_session(),
            _ => Err(syntax_error(code::INVALID_SQL, "invalid SQL statement")),
        }
    }

    fn alter_session(&mut self) -> Result<Statement> {
        self.expect_word("ALTER")?;
        self.expect_word("SESSION")?;
        self.expect_word("SET")?;
        let parameter = self.identifier()?;
        self.expect_symbol("=")?;
        let value = match self.advance() {
            Some(Token::Str(s)) | Some(Token::Word(s)) | Some(Token::Quoted(s)) => s,
            Some(Token::Number(n)) => n,
            _ => return Err(syntax_error(code::MISSING_EXPRESSION, "missing expression")),
        };
        Ok(Statement::AlterSession { parameter, value })
    }

    fn create_table(&mut self) -> Result<Statement> {
        self.expect_word("CREATE")?;
        self.expect_word("TABLE")?;
        let name = self.identifier()?;
        self.expect_symbol("(")?;

        let mut columns = Vec::new();
        let mut primary_key = Vec::new();
        loop {
            if self.eat_word("PRIMARY") {
                self.expect_word("KEY")?;
                self.expect_symbol("(")?;
                loop {
                    primary_key.push(self.identifier()?);
                    if !self.eat_symbol(",") {
                        break;
                    }
                }
                self.expect_symbol(")")?;
            } else {
                columns.push(self.column_spec()?);
            }
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.expect_symbol(")")?;

        Ok(Statement::CreateTable(CreateTable {
            name,
            columns,
            primary_key,
        }))
    }

    fn column_spec(&mut self) -> Result<ColumnSpec> {
        let name = self.identifier()?;
        let data_type = self.type_spec()?;
        let mut spec = ColumnSpec {
            name,
            data_type,
            not_null: false,
            primary_key: false,
        };
        loop {
            if self.eat_word("NOT") {
                self.expect_word("NULL")?;
                spec.not_null = true;
            } else if self.eat_word("NULL") {
                spec.not_null = false;
            } else if self.eat_word("PRIMARY") {
                self.expect_word("KEY")?;
                spec.primary_key = true;
            } else {
                break;
            }
        }
        Ok(spec)
    }

    fn type_spec(&mut self) -> Result<TypeSpec> {
        let first = match self.advance() {
            Some(Token::Word(w)) => w,
            _ => return Err(syntax_error(code::INVALID_DATATYPE, "invalid datatype")),
        };
        let mut spec = TypeSpec::default();

        match first.as_str() {
            "DOUBLE" => {
                self.expect_word("PRECISION")?;
                spec.name = "DOUBLE PRECISION".to_string();
            }
            "LONG" if self.eat_word("RAW") => spec.name = "LONG RAW".to_string(),
            "INTERVAL" => {
                self.expect_word("DAY")?;
                if self.eat_symbol("(") {
                    spec.day_precision = Some(self.number_arg()?);
                    self.expect_symbol(")")?;
                }
                self.expect_word("TO")?;
                self.expect_word("SECOND")?;
                if self.eat_symbol("(") {
                    spec.second_precision = Some(self.number_arg()?);
                    self.expect_symbol(")")?;
                }
                spec.name = "INTERVAL DAY TO SECOND".to_string();
                return Ok(spec);
            }
            _ => spec.name = first,
        }

        if self.eat_symbol("(") {
            if self.eat_symbol("*") {
                spec.precision = None;
            } else {
                spec.precision = Some(self.number_arg()?);
            }
            if self.eat_word("CHAR") {
                spec.char_semantics = Some(true);
            } else if self.eat_word("BYTE") {
                spec.char_semantics = Some(false);
            }
            if self.eat_symbol(",") {
                let negative = self.eat_symbol("-");
                let scale = self.number_arg()? as i32;
                spec.scale = Some(if negative { -scale } else { scale });
            }
            self.expect_symbol(")")?;
        }

        if spec.name == "TIMESTAMP" && self.eat_word("WITH") {
            self.eat_word("LOCAL");
            self.expect_word("TIME")?;
            self.expect_word("ZONE")?;
            spec.with_time_zone = true;
        }
        Ok(spec)
    }

    fn insert(&mut self) -> Result<Statement> {
        self.expect_word("INSERT")?;
        self.expect_word("INTO")?;
        let table = self.identifier()?;

        let columns = if self.eat_symbol("(") {
            let mut names = Vec::new();
            loop {
                names.push(self.identifier()?);
                if !self.eat_symbol(",") {
                    break;
                }
            }
            self.expect_symbol(")")?;
            Some(names)
        } else {
            None
        };

        self.expect_word("VALUES")?;
        self.expect_symbol("(")?;
        let values = self.expr_list()?;
        self.expect_symbol(")")?;

        let mut returning = Vec::new();
        let mut into = Vec::new();
        if self.eat_word("RETURNING") || self.eat_word("RETURN") {
            returning = self.expr_list()?;
            self.expect_word("INTO")?;
            loop {
                match self.advance() {
                    Some(Token::Bind(name)) => into.push(name),
                    _ => return Err(syntax_error(code::INVALID_SQL, "bind variable expected")),
                }
                if !self.eat_symbol(",") {
                    break;
                }
            }
            if returning.len() != into.len() {
                let code = if returning.len() > into.len() {
                    code::NOT_ENOUGH_VALUES
                } else {
                    code::TOO_MANY_VALUES
                };
                return Err(syntax_error(code, "RETURNING and INTO lists differ in length"));
            }
        }

        Ok(Statement::Insert(Insert {
            table,
            columns,
            values,
            returning,
            into,
        }))
    }

    fn expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut list = Vec::new();
        loop {
            list.push(self.expr()?);
            if !self.eat_symbol(",") {
                break;
            }
        }
        Ok(list)
    }

    fn parenthesized_select(&mut self) -> Result<Select> {
        self.expect_symbol("(")?;
        let select = self.select()?;
        self.expect_symbol(")")?;
        Ok(select)
    }

    fn select(&mut self) -> Result<Select> {
        self.expect_word("SELECT")?;

        let mut items = Vec::new();
        loop {
            if self.eat_symbol("*") {
                items.push(SelectItem::Wildcard);
            } else {
                let start = self.pos;
                let expr = self.expr()?;
                let text = self.source_text(start, self.pos);
                let alias = self.optional_alias()?;
                items.push(SelectItem::Expr { expr, alias, text });
            }
            if !self.eat_symbol(",") {
                break;
            }
        }

        self.expect_word("FROM")?;
        let from = if self.is_symbol("(") {
            let query = self.parenthesized_select()?;
            FromItem::Derived {
                query: Box::new(query),
                alias: self.optional_alias()?,
            }
        } else {
            let name = self.identifier()?;
            if name == "DUAL" {
                self.optional_alias()?;
                FromItem::Dual
            } else {
                FromItem::Table {
                    name,
                    alias: self.optional_alias()?,
                }
            }
        };

        let filter = if self.eat_word("WHERE") {
            Some(self.expr()?)
        } else {
            None
        };

        let mut order_by = Vec::new();
        if self.eat_word("ORDER") {
            self.expect_word("BY")?;
            loop {
                let expr = self.expr()?;
                let descending = if self.eat_word("DESC") {
                    true
                } else {
                    self.eat_word("ASC");
                    false
                };
                order_by.push(OrderKey { expr, descending });
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }

        Ok(Select {
            items,
            from,
            filter,
            order_by,
        })
    }

    fn source_text(&self, from: usize, to: usize) -> String {
        match (self.tokens.get(from), to.checked_sub(1).and_then(|i| self.tokens.get(i))) {
            (Some(first), Some(last)) if to > from => self.sql[first.start..last.end].to_string(),
            _ => String::new(),
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut left = self.and_expr()?;
        while self.eat_word("OR") {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut left = self.not_expr()?;
        while self.eat_word("AND") {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr> {
        if self.eat_word("NOT") {
            return Ok(Expr::Not(Box::new(self.not_expr()?)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let left = self.unary()?;

        if self.eat_word("IS") {
            let negated = self.eat_word("NOT");
            self.expect_word("NULL")?;
            return Ok(Expr::IsNull {
                expr: Box::new(left),
                negated,
            });
        }

        let op = match self.peek() {
            Some(Token::Symbol("=")) => CompareOp::Eq,
            Some(Token::Symbol("<>")) | Some(Token::Symbol("!=")) => CompareOp::Ne,
            Some(Token::Symbol("<")) => CompareOp::Lt,
            Some(Token::Symbol("<=")) => CompareOp::Le,
            Some(Token::Symbol(">")) => CompareOp::Gt,
            Some(Token::Symbol(">=")) => CompareOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.unary()?;
        Ok(Expr::Compare(op, Box::new(left), Box::new(right)))
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.eat_symbol("-") {
            return Ok(match self.unary()? {
                Expr::Number(n) => Expr::Number(format!("-{}", n)),
                other => Expr::Negate(Box::new(other)),
            });
        }
        if self.eat_symbol("+") {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        let missing = || syntax_error(code::MISSING_EXPRESSION, "missing expression");
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Some(Token::Str(s)) => {
                self.pos += 1;
                Ok(Expr::Str(s))
            }
            Some(Token::Bind(b)) => {
                self.pos += 1;
                Ok(Expr::Bind(b))
            }
            Some(Token::Symbol("(")) => {
                if matches!(self.peek_at(1), Some(Token::Word(w)) if w == "SELECT") {
                    return Ok(Expr::Subquery(Box::new(self.parenthesized_select()?)));
                }
                self.pos += 1;
                let inner = self.expr()?;
                self.expect_symbol(")")?;
                Ok(inner)
            }
            Some(Token::Word(w)) => match w.as_str() {
                "NULL" => {
                    self.pos += 1;
                    Ok(Expr::Null)
                }
                "CAST" if matches!(self.peek_at(1), Some(Token::Symbol("("))) => {
                    self.pos += 2;
                    let inner = self.expr()?;
                    self.expect_word("AS")?;
                    let target = self.type_spec()?;
                    self.expect_symbol(")")?;
                    Ok(Expr::Cast(Box::new(inner), target))
                }
                "ROWNUM" => {
                    self.pos += 1;
                    Ok(Expr::RowNum)
                }
                "ROWID" => {
                    self.pos += 1;
                    Ok(Expr::RowId { qualifier: None })
                }
                w if RESERVED.contains(&w) => Err(missing()),
                _ => self.column_ref(),
            },
            Some(Token::Quoted(_)) => self.column_ref(),
            _ => Err(missing()),
        }
    }

    fn column_ref(&mut self) -> Result<Expr> {
        let first = self.identifier()?;
        if !self.eat_symbol(".") {
            return Ok(Expr::Column {
                qualifier: None,
                name: first,
            });
        }
        if self.eat_word("ROWID") {
            return Ok(Expr::RowId {
                qualifier: Some(first),
            });
        }
        let name = self.identifier()?;
        Ok(Expr::Column {
            qualifier: Some(first),
            name,
        })
    }
}
