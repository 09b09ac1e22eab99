//! Integration tests for tidb-mcp
//!
//! These run against a real TiDB (or MySQL) instance configured through the
//! same variables the server reads: `TIDB_HOST`, `TIDB_PORT`, `TIDB_USER`,
//! `TIDB_PASS`, `TIDB_DB`.
//!
//! # Running tests
//!
//! ```bash
//! TIDB_HOST=127.0.0.1 TIDB_PORT=4000 TIDB_USER=root TIDB_PASS=secret TIDB_DB=test \
//!     cargo test -p tidb-mcp --test integration -- --ignored
//! ```

use std::sync::Arc;

use tidb_mcp::{
    DispatchOutcome, MySqlExecutor, PermissionPolicy, QueryDispatcher, QueryExecutor, TidbConfig,
};

/// Build a dispatcher from the environment, or `None` when it is not configured
fn dispatcher(policy: PermissionPolicy) -> Option<(QueryDispatcher, Arc<MySqlExecutor>)> {
    let config = match TidbConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Skipping: {}", e);
            return None;
        }
    };
    let executor = Arc::new(MySqlExecutor::connect_lazy(&config.connection));
    Some((QueryDispatcher::new(executor.clone(), policy), executor))
}

#[tokio::test]
#[ignore = "integration test - requires a running TiDB"]
async fn read_select_literal() {
    let Some((dispatcher, executor)) = dispatcher(PermissionPolicy::default()) else {
        return;
    };

    let outcome = dispatcher.dispatch("SELECT 1 AS one, 'a' AS letter").await;

    let DispatchOutcome::Success(text) = outcome else {
        panic!("select failed: {:?}", outcome);
    };
    let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(rows, serde_json::json!([{ "letter": "a", "one": 1 }]));

    executor.close().await;
}

#[tokio::test]
#[ignore = "integration test - requires a running TiDB"]
async fn read_syntax_error_is_failure() {
    let Some((dispatcher, executor)) = dispatcher(PermissionPolicy::default()) else {
        return;
    };

    let outcome = dispatcher.dispatch("SELEC 1").await;

    assert!(!outcome.is_success());
    assert!(outcome.text().starts_with("TiDB query error:"));

    executor.close().await;
}

#[tokio::test]
#[ignore = "integration test - requires a running TiDB"]
async fn read_multi_statement_rejected() {
    let Some((dispatcher, executor)) = dispatcher(PermissionPolicy::default()) else {
        return;
    };

    let outcome = dispatcher.dispatch("SELECT 1; DELETE FROM t").await;

    assert_eq!(
        outcome,
        DispatchOutcome::Failure(
            "TiDB query error: multiple statements in one query are not allowed".to_string()
        )
    );

    executor.close().await;
}

#[tokio::test]
#[ignore = "write test - creates and drops a table"]
async fn write_insert_then_delete() {
    let Some((dispatcher, executor)) = dispatcher(PermissionPolicy::allow_all()) else {
        return;
    };

    let create = dispatcher
        .dispatch(
            "CREATE TABLE IF NOT EXISTS tidb_mcp_it \
             (id INT PRIMARY KEY AUTO_INCREMENT, name VARCHAR(32))",
        )
        .await;
    assert!(create.is_success(), "{:?}", create);

    let insert = dispatcher
        .dispatch("INSERT INTO tidb_mcp_it (name) VALUES ('Alice')")
        .await;
    let summary: serde_json::Value = serde_json::from_str(insert.text()).unwrap();
    assert_eq!(summary["affected_rows"], 1);

    let select = dispatcher
        .dispatch("SELECT name FROM tidb_mcp_it WHERE name = 'Alice'")
        .await;
    assert!(select.text().contains("Alice"), "original case must be preserved");

    let delete = dispatcher.dispatch("DELETE FROM tidb_mcp_it").await;
    assert!(delete.is_success());

    let dropped = dispatcher.dispatch("DROP TABLE tidb_mcp_it").await;
    assert!(dropped.is_success(), "failed to drop tidb_mcp_it: {:?}", dropped);
    executor.close().await;
}
