//! Database client
//!
//! [`QueryExecutor`] is the seam between the dispatcher and the database.
//! [`MySqlExecutor`] implements it over a pooled sqlx MySQL connection, which
//! is what TiDB speaks on the wire.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use serde_json::{Number, Value};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Either, Executor, Row, TypeInfo};
use thiserror::Error;

use crate::config::ConnectionConfig;

/// One result row, keyed by column name in sorted order
pub type JsonRow = BTreeMap<String, Value>;

/// Everything a single statement produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub rows: Vec<JsonRow>,
    pub affected_rows: u64,
    pub last_insert_id: u64,
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Message(String),
}

/// Executes raw SQL against the database
///
/// Implementations own their connection handling (pooling, admission,
/// retries); callers submit one statement and await one outcome.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<QueryOutput, QueryError>;

    /// Release connections. Called once during shutdown.
    async fn close(&self) {}
}

/// sqlx-backed executor for TiDB / MySQL
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    /// Build the pool without opening a connection; the first query connects
    pub fn connect_lazy(config: &ConnectionConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .timezone(Some(config.timezone.clone()));

        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_lazy_with(options);

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            max_connections = config.pool_size,
            "Created TiDB connection pool"
        );

        Self { pool }
    }
}

#[async_trait]
impl QueryExecutor for MySqlExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryOutput, QueryError> {
        let mut output = QueryOutput::default();

        // A bare &str carries no arguments, so sqlx sends it over the text
        // protocol instead of preparing it
        let mut results = self.pool.fetch_many(sql);
        while let Some(step) = results.try_next().await? {
            match step {
                Either::Left(done) => {
                    output.affected_rows += done.rows_affected();
                    if done.last_insert_id() != 0 {
                        output.last_insert_id = done.last_insert_id();
                    }
                }
                Either::Right(row) => output.rows.push(row_to_json(&row)?),
            }
        }

        Ok(output)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("TiDB connection pool closed");
    }
}

fn row_to_json(row: &MySqlRow) -> Result<JsonRow, QueryError> {
    let mut object = JsonRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw: Option<Vec<u8>> = row.try_get_unchecked(index).map_err(|e| {
            QueryError::Message(format!("Failed to decode column '{}': {}", column.name(), e))
        })?;
        object.insert(
            column.name().to_string(),
            column_value(column.type_info().name(), raw),
        );
    }
    Ok(object)
}

/// Convert one text-protocol column value into JSON
///
/// `type_name` is the sqlx type name (`BIGINT UNSIGNED`, `DECIMAL`, ...).
/// DECIMAL stays a string so precision is never lost.
pub fn column_value(type_name: &str, raw: Option<Vec<u8>>) -> Value {
    let Some(bytes) = raw else {
        return Value::Null;
    };

    match type_name.trim_end_matches(" UNSIGNED") {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            integer_value(bytes)
        }
        "FLOAT" | "DOUBLE" => float_value(bytes),
        "BIT" => Value::from(
            bytes
                .iter()
                .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
        ),
        "JSON" => serde_json::from_slice(&bytes).unwrap_or_else(|_| text_value(bytes)),
        _ => text_value(bytes),
    }
}

fn integer_value(bytes: Vec<u8>) -> Value {
    let parsed = std::str::from_utf8(&bytes).ok().and_then(|s| {
        s.parse::<i64>()
            .map(Value::from)
            .or_else(|_| s.parse::<u64>().map(Value::from))
            .ok()
    });
    parsed.unwrap_or_else(|| text_value(bytes))
}

fn float_value(bytes: Vec<u8>) -> Value {
    let parsed = std::str::from_utf8(&bytes)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .and_then(Number::from_f64)
        .map(Value::Number);
    parsed.unwrap_or_else(|| text_value(bytes))
}

fn text_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(text) => Value::String(text),
        Err(e) => Value::String(format!("<binary {} bytes>", e.as_bytes().len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(s: &str) -> Option<Vec<u8>> {
        Some(s.as_bytes().to_vec())
    }

    #[test]
    fn test_null_is_null_for_any_type() {
        assert_eq!(column_value("BIGINT", None), Value::Null);
        assert_eq!(column_value("VARCHAR", None), Value::Null);
    }

    #[test]
    fn test_integers_become_numbers() {
        assert_eq!(column_value("INT", raw("-42")), json!(-42));
        assert_eq!(column_value("BOOLEAN", raw("1")), json!(1));
        assert_eq!(
            column_value("BIGINT UNSIGNED", raw("18446744073709551615")),
            json!(18446744073709551615u64)
        );
    }

    #[test]
    fn test_floats_become_numbers() {
        assert_eq!(column_value("DOUBLE", raw("1.5")), json!(1.5));
    }

    #[test]
    fn test_decimal_stays_string() {
        assert_eq!(
            column_value("DECIMAL", raw("12345678901234567890.12")),
            json!("12345678901234567890.12")
        );
    }

    #[test]
    fn test_json_column_is_embedded() {
        assert_eq!(
            column_value("JSON", raw(r#"{"a":[1,2]}"#)),
            json!({ "a": [1, 2] })
        );
    }

    #[test]
    fn test_temporal_and_text_are_strings() {
        assert_eq!(
            column_value("DATETIME", raw("2024-01-02 03:04:05")),
            json!("2024-01-02 03:04:05")
        );
        assert_eq!(column_value("VARCHAR", raw("alice")), json!("alice"));
    }

    #[test]
    fn test_bit_is_big_endian_number() {
        assert_eq!(column_value("BIT", Some(vec![0x01, 0x02])), json!(258));
    }

    #[test]
    fn test_non_utf8_binary_is_summarised() {
        assert_eq!(
            column_value("BLOB", Some(vec![0xff, 0xfe, 0x00])),
            json!("<binary 3 bytes>")
        );
    }
}
