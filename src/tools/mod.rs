//! Azure DevOps test-results tools.
//!
//! `configure_test_results_tools` binds the four handlers to a
//! `ToolRegistry`. Every handler validates its arguments, opens a fresh
//! connection, issues exactly one request and returns the service response
//! verbatim as indented JSON text.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::ado::{AdoResult, Connection, ConnectionProvider, TokenProvider};

mod args;
mod registry;

pub use args::{ArgumentError, Args};
pub use registry::{ToolContext, ToolHandler, ToolRegistry, UnknownTool};

// Tool handler implementations
mod get_test_result_details;
mod get_test_runs_for_build;
mod list_test_results;
mod list_test_runs;

pub use get_test_result_details::GetTestResultDetailsHandler;
pub use get_test_runs_for_build::GetTestRunsForBuildHandler;
pub use list_test_results::ListTestResultsHandler;
pub use list_test_runs::ListTestRunsHandler;


/// Registered tool names.
pub mod names {
    pub const LIST_TEST_RUNS: &str = "ado_list_test_runs";
    pub const LIST_TEST_RESULTS: &str = "ado_list_test_results";
    pub const GET_TEST_RESULT_DETAILS: &str = "ado_get_test_result_details";
    pub const GET_TEST_RUNS_FOR_BUILD: &str = "ado_get_test_runs_for_build";
}

/// The host-supplied collaborators every handler needs.
#[derive(Clone)]
pub struct AdoClients {
    tokens: Arc<dyn TokenProvider>,
    connections: Arc<dyn ConnectionProvider>,
}

impl AdoClients {
    pub fn new(tokens: Arc<dyn TokenProvider>, connections: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            tokens,
            connections,
        }
    }

    /// Open a fresh connection for one tool call.
    pub async fn connect(&self) -> AdoResult<Arc<dyn Connection>> {
        self.connections.connect(self.tokens.as_ref()).await
    }
}

/// Register the four test-results tools on `registry`.
pub fn configure_test_results_tools(
    registry: ToolRegistry,
    tokens: Arc<dyn TokenProvider>,
    connections: Arc<dyn ConnectionProvider>,
) -> ToolRegistry {
    let clients = AdoClients::new(tokens, connections);
    registry
        .register_handler(ListTestRunsHandler::new(clients.clone()))
        .register_handler(ListTestResultsHandler::new(clients.clone()))
        .register_handler(GetTestResultDetailsHandler::new(clients.clone()))
        .register_handler(GetTestRunsForBuildHandler::new(clients))
}

/// Serialize a service response as a single text content item, indented by
/// two spaces.
fn json_text_result<T: Serialize>(value: &T) -> anyhow::Result<CallToolResult> {
    let text = serde_json::to_string_pretty(value)?;
    Ok(CallToolResult {
        content: vec![Content::text(text)],
        structured_content: None,
        is_error: Some(false),
        meta: None,
    })
}
