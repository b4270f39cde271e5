//! MCP server implementation using rmcp.
//!
//! Serves the tool registry over stdio or Streamable HTTP.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::*,
    service::{NotificationContext, RequestContext, RoleServer},
};

use crate::ado::AdoError;
use crate::tools::{ArgumentError, ToolContext, ToolRegistry, UnknownTool};

const INSTRUCTIONS: &str = "Azure DevOps test results server. Query test runs of a project, \
     list the results of a run, fetch detail for a single result, and find the \
     automated test runs produced by a build.";

/// MCP server that handles protocol requests and delegates to tool handlers.
#[derive(Clone)]
pub struct McpServer {
    tool_registry: Arc<ToolRegistry>,
}

impl McpServer {
    /// Create a new MCP server over the given tool registry.
    pub fn new(tool_registry: Arc<ToolRegistry>) -> Self {
        Self { tool_registry }
    }

    /// Get the tool registry.
    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    fn capabilities() -> ServerCapabilities {
        ServerCapabilities::builder().enable_tools().build()
    }
}

/// Turn a failed tool call into the reply sent to the client.
///
/// Azure DevOps failures become a tool result with `is_error` set, carrying
/// the service message unchanged. Everything else is a JSON-RPC error.
pub fn tool_failure(err: anyhow::Error) -> Result<CallToolResult, McpError> {
    if let Some(ado_err) = err.downcast_ref::<AdoError>() {
        return Ok(CallToolResult::error(vec![Content::text(ado_err.to_string())]));
    }
    Err(tool_error_to_mcp(err))
}

/// Map a tool failure onto a JSON-RPC error.
///
/// Bad input and unknown tools are the caller's fault (`invalid_params`);
/// anything else is an internal error carrying the original message.
pub fn tool_error_to_mcp(err: anyhow::Error) -> McpError {
    if let Some(arg_err) = err.downcast_ref::<ArgumentError>() {
        return McpError::invalid_params(format!("Invalid arguments: {}", arg_err), None);
    }
    if let Some(unknown) = err.downcast_ref::<UnknownTool>() {
        return McpError::invalid_params(unknown.to_string(), None);
    }
    McpError::internal_error(format!("Tool execution failed: {:#}", err), None)
}

impl ServerHandler for McpServer {
    fn ping(
        &self,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<(), McpError>> + Send + '_ {
        std::future::ready(Ok(()))
    }

    fn initialize(
        &self,
        request: InitializeRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<InitializeResult, McpError>> + Send + '_ {
        tracing::info!(
            client = %request.client_info.name,
            client_version = %request.client_info.version,
            "MCP session initialized"
        );
        std::future::ready(Ok(self.get_info()))
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.tool_registry.list_tools(),
            next_cursor: None,
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_name = request.name.to_string();
        let args = request.arguments.unwrap_or_default();
        let registry = self.tool_registry.clone();
        let ctx = ToolContext {
            request_id: Some(format!("{:?}", context.id)),
        };

        async move {
            match registry.call_tool(&tool_name, args, &ctx).await {
                Ok(result) => Ok(result),
                Err(e) => {
                    tracing::warn!(tool = %tool_name, error = %e, "Tool call failed");
                    tool_failure(e)
                }
            }
        }
    }

    // Default implementations for unsupported features

    fn complete(
        &self,
        _request: CompleteRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CompleteResult, McpError>> + Send + '_ {
        std::future::ready(Err(McpError::method_not_found::<CompleteRequestMethod>()))
    }

    fn set_level(
        &self,
        _request: SetLevelRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<(), McpError>> + Send + '_ {
        std::future::ready(Err(McpError::method_not_found::<SetLevelRequestMethod>()))
    }

    fn on_cancelled(
        &self,
        _notification: CancelledNotificationParam,
        _context: NotificationContext<RoleServer>,
    ) -> impl Future<Output = ()> + Send + '_ {
        std::future::ready(())
    }

    fn on_initialized(
        &self,
        _context: NotificationContext<RoleServer>,
    ) -> impl Future<Output = ()> + Send + '_ {
        std::future::ready(())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: Self::capabilities(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Start the server as an MCP Streamable HTTP server.
///
/// This exposes the MCP endpoint at `/mcp` on the given bind address,
/// e.g. `127.0.0.1:3943`.
pub async fn start_mcp_http(server: Arc<McpServer>, bind: &str) -> Result<()> {
    let tool_registry = server.tool_registry().clone();

    let service = StreamableHttpService::new(
        move || Ok(McpServer::new(tool_registry.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new().nest_service("/mcp", service);
    let listener = tokio::net::TcpListener::bind(bind).await?;

    tracing::info!("MCP HTTP server listening on http://{}/mcp", bind);

    axum::serve(listener, router).await?;

    Ok(())
}
