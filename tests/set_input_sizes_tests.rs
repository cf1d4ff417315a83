//! Input-size hints sent to the driver for each column type

use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;

use oracle_dialect::{
    params, text, Column, DbApiType, Engine, EngineOptions, InputSizes, MemoryDatabase, OracleDialect,
    Params, SqlType, Table, TypeDecorator, Value,
};

/// Null everywhere except on Oracle, where it becomes the wrapped type
#[derive(Debug)]
struct OracleOnly(SqlType);

impl TypeDecorator for OracleOnly {
    fn impl_type(&self) -> SqlType {
        SqlType::Null
    }

    fn load_dialect_impl(&self, dialect: &OracleDialect) -> SqlType {
        if dialect.name() == "oracle" {
            self.0.clone()
        } else {
            self.impl_type()
        }
    }
}

fn tables(datatype: &SqlType) -> Vec<Table> {
    vec![
        Table::new("t1").column(Column::new("foo", datatype.clone())),
        Table::new("t2").column(Column::new(
            "foo",
            SqlType::Null.with_variant(datatype.clone(), "oracle"),
        )),
        Table::new("t3").column(Column::new(
            "foo",
            SqlType::decorated(OracleOnly(datatype.clone())),
        )),
    ]
}

async fn check_input_sizes_with(
    engine: Engine,
    db: &MemoryDatabase,
    datatype: SqlType,
    value: Value,
    expected: Option<DbApiType>,
) {
    let conn = engine.connect().await.unwrap();
    let expected: IndexMap<String, DbApiType> = expected
        .into_iter()
        .map(|ty| ("foo".to_string(), ty))
        .collect();

    for table in tables(&datatype) {
        conn.create_table(&table).await.unwrap();
        db.take_input_size_calls().await;

        conn.execute(&table.insert(), params! { "foo" => value.clone() })
            .await
            .unwrap();
        assert_eq!(
            db.take_input_size_calls().await,
            vec![expected.clone()],
            "inserting into {}",
            table.name()
        );
    }
}

async fn check_input_sizes(datatype: SqlType, value: impl Into<Value>, expected: Option<DbApiType>) {
    let db = MemoryDatabase::new();
    let engine = Engine::new(db.clone(), EngineOptions::default()).unwrap();
    check_input_sizes_with(engine, &db, datatype, value.into(), expected).await;
}

async fn check_input_sizes_nchar(
    datatype: SqlType,
    value: impl Into<Value>,
    expected: Option<DbApiType>,
) {
    let db = MemoryDatabase::new();
    let engine = Engine::new(
        db.clone(),
        EngineOptions::default().use_nchar_for_unicode(true),
    )
    .unwrap();
    check_input_sizes_with(engine, &db, datatype, value.into(), expected).await;
}

mod numeric_input_sizes_tests {
    use super::*;

    #[tokio::test]
    async fn test_smallint() {
        check_input_sizes(SqlType::SmallInteger, 25, Some(DbApiType::Int)).await;
    }

    #[tokio::test]
    async fn test_int() {
        check_input_sizes(SqlType::Integer, 25, Some(DbApiType::Int)).await;
    }

    #[tokio::test]
    async fn test_numeric() {
        let value = Decimal::from_str("25.34534").unwrap();
        check_input_sizes(SqlType::numeric(10, 8), value, None).await;
    }

    #[tokio::test]
    async fn test_float() {
        check_input_sizes(SqlType::float(15), 25.34534, None).await;
    }

    #[tokio::test]
    async fn test_binary_double() {
        check_input_sizes(SqlType::binary_double(), 25.34534, Some(DbApiType::NativeFloat)).await;
    }

    #[tokio::test]
    async fn test_binary_float() {
        check_input_sizes(SqlType::binary_float(), 25.34534, Some(DbApiType::NativeFloat)).await;
    }

    #[tokio::test]
    async fn test_double_precision() {
        check_input_sizes(SqlType::double_precision(), 25.34534, None).await;
    }
}

mod string_input_sizes_tests {
    use super::*;

    #[tokio::test]
    async fn test_unicode_nchar_mode() {
        check_input_sizes_nchar(SqlType::unicode(30), "test", Some(DbApiType::NChar)).await;
    }

    #[tokio::test]
    async fn test_unicodetext_nchar_mode() {
        check_input_sizes_nchar(SqlType::UnicodeText, "test", Some(DbApiType::NClob)).await;
    }

    #[tokio::test]
    async fn test_unicode() {
        check_input_sizes(SqlType::unicode(30), "test", None).await;
    }

    #[tokio::test]
    async fn test_unicodetext() {
        check_input_sizes(SqlType::UnicodeText, "test", Some(DbApiType::Clob)).await;
    }

    #[tokio::test]
    async fn test_string() {
        check_input_sizes(SqlType::string(30), "test", None).await;
    }

    #[tokio::test]
    async fn test_char() {
        check_input_sizes(SqlType::char(30), "test", Some(DbApiType::FixedChar)).await;
    }

    #[tokio::test]
    async fn test_nchar() {
        check_input_sizes(SqlType::nchar(30), "test", Some(DbApiType::NChar)).await;
    }

    #[tokio::test]
    async fn test_long() {
        check_input_sizes(SqlType::Long, "test", None).await;
    }

    #[tokio::test]
    async fn test_untyped_string_param_is_not_hinted() {
        let db = MemoryDatabase::new();
        let engine = Engine::new(db.clone(), EngineOptions::default()).unwrap();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let captured = seen.clone();
        engine
            .listen_input_sizes(move |sizes: &mut InputSizes, _sql: &str, _params: &Params| {
                captured.lock().unwrap().push(sizes.clone());
            })
            .unwrap();

        let conn = engine.connect().await.unwrap();
        let value = conn
            .scalar(&text("SELECT :foo FROM DUAL"), params! { "foo" => "hello world!" })
            .await
            .unwrap();
        assert_eq!(value, Value::from("hello world!"));

        assert_eq!(db.take_input_size_calls().await, vec![IndexMap::new()]);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get("foo"), Some(&None));
    }
}

mod input_sizes_hook_tests {
    use super::*;

    fn drop_native_float(sizes: &mut InputSizes, _sql: &str, _params: &Params) {
        sizes.retain(|_, ty| *ty != Some(DbApiType::NativeFloat));
    }

    #[tokio::test]
    async fn test_event_no_native_float() {
        let db = MemoryDatabase::new();
        let engine = Engine::new(db.clone(), EngineOptions::default()).unwrap();
        let id = engine.listen_input_sizes(drop_native_float).unwrap();

        check_input_sizes_with(
            engine.clone(),
            &db,
            SqlType::binary_float(),
            Value::from(25.34534),
            None,
        )
        .await;

        assert!(engine.remove_listener(id).unwrap());
        assert!(!engine.remove_listener(id).unwrap());
    }

    #[tokio::test]
    async fn test_removed_hook_no_longer_applies() {
        let db = MemoryDatabase::new();
        let engine = Engine::new(db.clone(), EngineOptions::default()).unwrap();
        let id = engine.listen_input_sizes(drop_native_float).unwrap();
        engine.remove_listener(id).unwrap();

        check_input_sizes_with(
            engine,
            &db,
            SqlType::binary_double(),
            Value::from(25.34534),
            Some(DbApiType::NativeFloat),
        )
        .await;
    }

    #[tokio::test]
    async fn test_hook_sees_statement_and_params() {
        let db = MemoryDatabase::new();
        let engine = Engine::new(db.clone(), EngineOptions::default()).unwrap();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let captured = seen.clone();
        engine
            .listen_input_sizes(move |sizes: &mut InputSizes, sql: &str, params: &Params| {
                captured
                    .lock()
                    .unwrap()
                    .push((sizes.clone(), sql.to_string(), params.clone()));
            })
            .unwrap();

        let conn = engine.connect().await.unwrap();
        let t = Table::new("t1").column(Column::new("foo", SqlType::Integer));
        conn.create_table(&t).await.unwrap();
        conn.execute(&t.insert(), params! { "foo" => 7 }).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (sizes, sql, params) = &seen[0];
        assert_eq!(sizes.get("foo"), Some(&Some(DbApiType::Int)));
        assert!(sql.starts_with("INSERT INTO t1"), "got {}", sql);
        assert_eq!(params["foo"], Value::Integer(7));
    }
}
