//! In-memory executor for tests

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::db::{JsonRow, QueryError, QueryExecutor, QueryOutput};

enum Reply {
    Output(QueryOutput),
    Fail(String),
}

/// Records every statement it receives and answers with a canned reply
pub struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
    reply: Reply,
}

impl RecordingExecutor {
    /// Answer every statement with these rows (a JSON array of objects)
    pub fn with_rows(rows: Value) -> Self {
        let rows: Vec<JsonRow> = serde_json::from_value(rows).expect("rows must be objects");
        Self::new(Reply::Output(QueryOutput {
            rows,
            ..Default::default()
        }))
    }

    pub fn with_affected(affected_rows: u64, last_insert_id: u64) -> Self {
        Self::new(Reply::Output(QueryOutput {
            rows: Vec::new(),
            affected_rows,
            last_insert_id,
        }))
    }

    /// Fail every statement with this message
    pub fn failing(message: &str) -> Self {
        Self::new(Reply::Fail(message.to_string()))
    }

    fn new(reply: Reply) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryOutput, QueryError> {
        self.calls.lock().unwrap().push(sql.to_string());
        match &self.reply {
            Reply::Output(output) => Ok(output.clone()),
            Reply::Fail(message) => Err(QueryError::Message(message.clone())),
        }
    }
}
