//! LOB fetch tests: locators, materialization and small fetch batches

use bytes::Bytes;

use oracle_dialect::{
    params, Column, Connection, Engine, EngineOptions, LobData, MemoryDatabase, MemoryOptions,
    Params, SqlType, Table, Value,
};

const BINARY_DATA: &[u8] = include_bytes!("fixtures/binary_data_one.dat");

fn stream() -> &'static [u8] {
    &BINARY_DATA[..12000]
}

fn z_test() -> Table {
    Table::new("z_test")
        .column(Column::new("id", SqlType::Integer).primary_key())
        .column(Column::new("data", SqlType::Text))
        .column(Column::new("bindata", SqlType::LargeBinary))
}

fn binary_table() -> Table {
    Table::new("binary_table")
        .column(Column::new("id", SqlType::Integer).primary_key())
        .column(Column::new("data", SqlType::LargeBinary))
}

fn z_test_rows() -> Vec<Params> {
    (1..20)
        .map(|i| {
            params! {
                "id" => i,
                "data" => format!("this is text {}", i),
                "bindata" => format!("this is binary {}", i).into_bytes(),
            }
        })
        .collect()
}

/// Seed both tables and return the database
async fn seeded(options: MemoryOptions) -> MemoryDatabase {
    let db = MemoryDatabase::with_options(options);
    let conn = Engine::new(db.clone(), EngineOptions::default())
        .unwrap()
        .connect()
        .await
        .unwrap();

    let z = z_test();
    conn.create_table(&z).await.unwrap();
    conn.execute_many(&z.insert(), &z_test_rows()).await.unwrap();

    let binary = binary_table();
    conn.create_table(&binary).await.unwrap();
    for i in 1..11 {
        conn.execute(&binary.insert(), params! { "id" => i, "data" => stream() })
            .await
            .unwrap();
    }
    conn.close().await.unwrap();
    db
}

async fn connect(db: &MemoryDatabase, options: EngineOptions) -> Connection {
    Engine::new(db.clone(), options)
        .unwrap()
        .connect()
        .await
        .unwrap()
}

async fn read(conn: &Connection, value: &Value) -> oracle_dialect::Result<LobData> {
    match value {
        Value::Lob(lob) => conn.read_lob(lob).await,
        other => panic!("expected a LOB, got {:?}", other),
    }
}

mod lob_convert_tests {
    use super::*;

    #[tokio::test]
    async fn test_lobs_without_convert() {
        let db = seeded(MemoryOptions::default()).await;
        let conn = connect(&db, EngineOptions::default().auto_convert_lobs(false)).await;

        let t = z_test();
        let result = conn
            .execute(&t.select().filter_eq("id", Value::Integer(1)), params! {})
            .await
            .unwrap();
        let row = result.first().unwrap();
        assert_eq!(
            read(&conn, &row["data"]).await.unwrap(),
            LobData::String("this is text 1".to_string())
        );
        assert_eq!(
            read(&conn, &row["bindata"]).await.unwrap(),
            LobData::Bytes(Bytes::from_static(b"this is binary 1"))
        );
    }

    #[tokio::test]
    async fn test_lobs_with_convert() {
        let db = seeded(MemoryOptions::default()).await;
        let conn = connect(&db, EngineOptions::default()).await;

        let t = z_test();
        let result = conn
            .execute(&t.select().filter_eq("id", Value::Integer(1)), params! {})
            .await
            .unwrap();
        let row = result.first().unwrap();
        assert_eq!(row["data"], Value::String("this is text 1".to_string()));
        assert_eq!(row["bindata"], Value::Bytes(b"this is binary 1".to_vec()));
    }

    #[tokio::test]
    async fn test_lobs_with_convert_raw() {
        let db = seeded(MemoryOptions::default()).await;
        let conn = connect(&db, EngineOptions::default()).await;

        let result = conn
            .execute("select data, bindata from z_test", params! {})
            .await
            .unwrap();
        let row = result.first().unwrap();
        assert_eq!(row["data"], Value::String("this is text 1".to_string()));
        assert_eq!(row["bindata"], Value::Bytes(b"this is binary 1".to_vec()));
    }

    #[tokio::test]
    async fn test_read_lob_inline_passthrough() {
        let db = seeded(MemoryOptions::default()).await;
        let conn = connect(&db, EngineOptions::default()).await;

        let inline = oracle_dialect::LobValue::Inline(LobData::String("abc".to_string()));
        assert_eq!(
            conn.read_lob(&inline).await.unwrap(),
            LobData::String("abc".to_string())
        );
    }
}

mod lob_many_rows_tests {
    use super::*;

    const MANY_ROWS: &str = "select id, data, bindata from z_test order by id";

    async fn read_all(conn: &Connection, rows: &[oracle_dialect::Row]) -> oracle_dialect::Result<()> {
        for (row, expected) in rows.iter().zip(z_test_rows()) {
            assert_eq!(row["id"], expected["id"]);
            let data = read(conn, &row["data"]).await?;
            assert_eq!(data.as_string(), expected["data"].as_str().map(str::to_string).as_ref());
            let bindata = read(conn, &row["bindata"]).await?;
            assert_eq!(
                bindata.as_bytes().map(|b| b.to_vec()),
                expected["bindata"].as_bytes().map(|b| b.to_vec())
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_lobs_without_convert_many_rows() {
        let db = seeded(MemoryOptions::default()).await;
        let conn = connect(
            &db,
            EngineOptions::default().auto_convert_lobs(false).arraysize(1),
        )
        .await;

        let result = conn.execute(MANY_ROWS, params! {}).await.unwrap();
        assert_eq!(result.len(), 19);
        read_all(&conn, result.rows()).await.unwrap();
    }

    #[tokio::test]
    async fn test_lobs_without_convert_many_rows_legacy_driver() {
        let db = seeded(MemoryOptions::default().legacy_lob_variables(true)).await;
        let conn = connect(
            &db,
            EngineOptions::default().auto_convert_lobs(false).arraysize(1),
        )
        .await;

        let result = conn.execute(MANY_ROWS, params! {}).await.unwrap();
        let err = read_all(&conn, result.rows()).await.unwrap_err();
        assert!(
            err.to_string()
                .contains("LOB variable no longer valid after subsequent fetch"),
            "got {}",
            err
        );
    }

    #[tokio::test]
    async fn test_legacy_driver_single_batch_is_fine() {
        let db = seeded(MemoryOptions::default().legacy_lob_variables(true)).await;
        let conn = connect(&db, EngineOptions::default().auto_convert_lobs(false)).await;

        let result = conn.execute(MANY_ROWS, params! {}).await.unwrap();
        read_all(&conn, result.rows()).await.unwrap();
    }

    #[tokio::test]
    async fn test_lobs_with_convert_many_rows() {
        let db = seeded(MemoryOptions::default().legacy_lob_variables(true)).await;
        let conn = connect(&db, EngineOptions::default().arraysize(1)).await;

        let result = conn.execute(MANY_ROWS, params! {}).await.unwrap();
        let expected = z_test_rows();
        assert_eq!(result.len(), expected.len());
        for (row, expected) in result.iter().zip(&expected) {
            assert_eq!(row["id"], expected["id"]);
            assert_eq!(row["data"], expected["data"]);
            assert_eq!(row["bindata"], expected["bindata"]);
        }
    }
}

mod large_stream_tests {
    use super::*;

    async fn check_large_stream(arraysize: usize) {
        let db = seeded(MemoryOptions::default()).await;
        let conn = connect(&db, EngineOptions::default().arraysize(arraysize)).await;

        let t = binary_table();
        let result = conn
            .execute(&t.select().order_by("id"), params! {})
            .await
            .unwrap();
        let rows: Vec<Vec<Value>> = result.into_iter().map(|r| r.into_values()).collect();
        let expected: Vec<Vec<Value>> = (1..11)
            .map(|i| vec![Value::Integer(i), Value::Bytes(stream().to_vec())])
            .collect();
        assert_eq!(rows, expected);
    }

    #[tokio::test]
    async fn test_large_stream() {
        check_large_stream(100).await;
    }

    #[tokio::test]
    async fn test_large_stream_single_arraysize() {
        check_large_stream(1).await;
    }

    #[tokio::test]
    async fn test_large_stream_locator_reads_in_chunks() {
        let db = seeded(MemoryOptions::default()).await;
        let conn = connect(&db, EngineOptions::default().auto_convert_lobs(false)).await;

        let value = conn
            .scalar("SELECT data FROM binary_table WHERE id = 3", params! {})
            .await
            .unwrap();
        let Value::Lob(lob) = &value else {
            panic!("expected a LOB, got {:?}", value);
        };
        assert_eq!(lob.size(), 12000);
        let data = conn.read_lob(lob).await.unwrap();
        assert_eq!(data, LobData::Bytes(Bytes::copy_from_slice(stream())));
    }
}
