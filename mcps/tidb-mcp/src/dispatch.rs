//! Query dispatcher
//!
//! Classifies each query, applies the permission policy, runs what is
//! allowed and folds every database failure into an in-band
//! [`DispatchOutcome::Failure`].

use std::sync::Arc;

use mcp_common::{text_error, text_success, CallToolResult};
use serde::Serialize;

use crate::db::{QueryExecutor, QueryOutput};
use crate::guard::{classify, is_single_statement, PermissionPolicy, StatementKind};

const ERROR_PREFIX: &str = "TiDB query error";

/// Result of one dispatch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Serialized rows (or the statement summary)
    Success(String),
    /// Denial or execution error message
    Failure(String),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success(_))
    }

    pub fn text(&self) -> &str {
        match self {
            DispatchOutcome::Success(text) | DispatchOutcome::Failure(text) => text,
        }
    }

    /// Failures become tool results with `is_error` set, not protocol errors
    pub fn into_call_result(self) -> CallToolResult {
        match self {
            DispatchOutcome::Success(text) => text_success(text),
            DispatchOutcome::Failure(text) => text_error(text),
        }
    }
}

/// Summary for statements that return no result set
#[derive(Debug, Serialize)]
struct StatementSummary {
    affected_rows: u64,
    last_insert_id: u64,
}

pub struct QueryDispatcher {
    executor: Arc<dyn QueryExecutor>,
    policy: PermissionPolicy,
}

impl QueryDispatcher {
    pub fn new(executor: Arc<dyn QueryExecutor>, policy: PermissionPolicy) -> Self {
        Self { executor, policy }
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    /// Run one query through the policy and the database
    ///
    /// The executor sees the query exactly as given; classification works on
    /// a normalized copy. A denied query never reaches the executor, and
    /// neither does a query carrying more than one statement.
    pub async fn dispatch(&self, sql: &str) -> DispatchOutcome {
        let kind = classify(sql);
        tracing::debug!(kind = %kind, "Dispatching query");

        if let Err(mutation) = self.policy.check(&kind) {
            tracing::warn!(operation = %mutation, "Query denied by permission policy");
            return DispatchOutcome::Failure(format!(
                "{}: {} operations are not allowed",
                ERROR_PREFIX, mutation
            ));
        }

        if !is_single_statement(sql) {
            tracing::warn!(kind = %kind, "Query with multiple statements rejected");
            return DispatchOutcome::Failure(format!(
                "{}: multiple statements in one query are not allowed",
                ERROR_PREFIX
            ));
        }

        let output = match self.executor.execute(sql).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Query failed");
                return DispatchOutcome::Failure(format!("{}: {}", ERROR_PREFIX, e));
            }
        };

        tracing::debug!(
            rows = output.rows.len(),
            affected_rows = output.affected_rows,
            "Query succeeded"
        );

        match render(&kind, &output) {
            Ok(text) => DispatchOutcome::Success(text),
            Err(e) => DispatchOutcome::Failure(format!(
                "{}: failed to serialize result: {}",
                ERROR_PREFIX, e
            )),
        }
    }
}

/// Pretty-printed JSON for the caller: the rows when the statement produced a
/// result set, otherwise the affected-row summary
fn render(kind: &StatementKind, output: &QueryOutput) -> serde_json::Result<String> {
    if !output.rows.is_empty() || kind.returns_rows() {
        serde_json::to_string_pretty(&output.rows)
    } else {
        serde_json::to_string_pretty(&StatementSummary {
            affected_rows: output.affected_rows,
            last_insert_id: output.last_insert_id,
        })
    }
}
