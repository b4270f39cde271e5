pub mod ado;
pub mod config;
pub mod server;
pub mod tools;

pub use ado::{
    AzureDevOpsConnectionProvider, ConnectionProvider, PatTokenProvider, StaticBearerTokenProvider,
    TokenProvider,
};
pub use config::{AdoConfig, ConfigOverrides, Credential};
pub use server::McpServer;
pub use tools::{ToolHandler, ToolRegistry, configure_test_results_tools};

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_DIRECTIVES: &str = "info,rmcp=warn";

/// Log filter for the binary: `RUST_LOG` when set, otherwise
/// [`DEFAULT_LOG_DIRECTIVES`].
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES))
}

/// Build the tool registry for `config`, backed by the Azure DevOps SDK.
pub fn create_registry(config: &AdoConfig) -> ToolRegistry {
    let tokens = config.credential.token_provider();
    let connections: Arc<dyn ConnectionProvider> =
        Arc::new(AzureDevOpsConnectionProvider::new(config));
    configure_test_results_tools(ToolRegistry::new(), tokens, connections)
}

/// Convenience function to create a fully configured MCP server.
pub fn create_server(config: &AdoConfig) -> Result<Arc<McpServer>> {
    let registry = Arc::new(create_registry(config));
    tracing::info!(
        organization = %config.organization,
        tools = registry.len(),
        "Registered Azure DevOps test results tools"
    );
    Ok(Arc::new(McpServer::new(registry)))
}
