//! MCP Server implementation for TiDB queries
//!
//! Exposes the query dispatcher as the single `tidb_query` tool. Resource
//! listings are advertised and always empty, and reading any URI yields no
//! contents.

use std::future::Future;
use std::sync::Arc;

use mcp_common::{
    async_trait, invalid_params, CallToolResult, EmbeddableError, EmbeddableMcp,
    EmbeddableResult, McpError, Tool,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router, RoleServer,
};
use serde_json::Value;

use crate::config::TidbConfig;
use crate::db::{MySqlExecutor, QueryExecutor};
use crate::dispatch::QueryDispatcher;
use crate::guard::PermissionPolicy;
use crate::params::QueryParams;

/// The TiDB MCP Server
#[derive(Clone)]
pub struct TidbMcpServer {
    dispatcher: Arc<QueryDispatcher>,
    executor: Arc<dyn QueryExecutor>,
    tool_router: ToolRouter<Self>,
}

impl TidbMcpServer {
    /// Create a server backed by a lazily connected TiDB pool
    pub fn new(config: &TidbConfig) -> Self {
        let executor = MySqlExecutor::connect_lazy(&config.connection);
        Self::with_executor(Arc::new(executor), config.permissions)
    }

    /// Create a server over any executor
    pub fn with_executor(executor: Arc<dyn QueryExecutor>, policy: PermissionPolicy) -> Self {
        Self {
            dispatcher: Arc::new(QueryDispatcher::new(executor.clone(), policy)),
            executor,
            tool_router: Self::tool_router(),
        }
    }

    /// Release the connection pool
    pub async fn close(&self) {
        self.executor.close().await;
    }

    /// Contents for a resource read. No resources exist, so every URI is empty.
    pub fn resource_contents(&self, uri: &str) -> ReadResourceResult {
        tracing::debug!(uri = %uri, "Resource read");
        ReadResourceResult {
            contents: Vec::new(),
        }
    }
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl TidbMcpServer {
    #[tool(description = "Execute SQL queries against TiDB")]
    async fn tidb_query(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.sql.trim().is_empty() {
            return Err(invalid_params("SQL query is required and must be a string"));
        }

        Ok(self.dispatcher.dispatch(&params.sql).await.into_call_result())
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for TidbMcpServer {
    fn get_info(&self) -> ServerInfo {
        let enabled = self.dispatcher.policy().enabled();
        let writes = if enabled.is_empty() {
            "INSERT, UPDATE and DELETE statements are disabled".to_string()
        } else {
            let names: Vec<String> = enabled.iter().map(ToString::to_string).collect();
            format!("Enabled write operations: {}", names.join(", "))
        };

        let mut info = ServerInfo {
            instructions: Some(format!(
                "TiDB query MCP server. Use tidb_query to run a SQL statement; \
                 results are returned as JSON. {}.",
                writes
            )),
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            ..Default::default()
        };
        info.server_info.name = "tidb-mcp".into();
        info.server_info.version = env!("CARGO_PKG_VERSION").into();
        info
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        std::future::ready(Ok(self.resource_contents(&request.uri)))
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for TidbMcpServer {
    fn server_name(&self) -> &str {
        "tidb"
    }

    fn server_description(&self) -> Option<&str> {
        Some("Permission-gated SQL execution against TiDB")
    }

    fn server_version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "tidb_query" => {
                let params: QueryParams = serde_json::from_value(params)?;
                self.tidb_query(Parameters(params)).await.map_err(Into::into)
            }

            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }
}
