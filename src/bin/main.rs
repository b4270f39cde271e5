use std::path::PathBuf;

use ado_testresults_mcp::{AdoConfig, ConfigOverrides, create_registry, create_server, log_filter};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rmcp::service::ServiceExt;
use rmcp::transport::stdio;
use tracing::info;

#[derive(Parser)]
#[command(name = "ado-testresults-mcp")]
#[command(about = "MCP server exposing Azure DevOps test runs and test results")]
struct Cli {
    #[command(flatten)]
    ado: AdoArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AdoArgs {
    /// Azure DevOps organization name
    #[arg(long, global = true, env = "ADO_ORGANIZATION")]
    organization: Option<String>,
    /// Personal access token
    #[arg(long, global = true, env = "ADO_PAT", hide_env_values = true)]
    pat: Option<String>,
    /// Pre-acquired Entra ID bearer token (used when no PAT is given)
    #[arg(long, global = true, env = "ADO_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: Option<String>,
    /// Optional JSON config file
    #[arg(long, global = true, env = "ADO_MCP_CONFIG")]
    config: Option<PathBuf>,
    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl AdoArgs {
    fn load_config(self) -> Result<AdoConfig> {
        let overrides = ConfigOverrides {
            organization: self.organization,
            timeout_secs: self.timeout_secs,
            pat: self.pat,
            bearer_token: self.bearer_token,
        };
        Ok(AdoConfig::load(self.config.as_deref(), overrides)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run as an MCP stdio server (for use in mcp.json)
    McpStdio,
    /// Run as an MCP HTTP server
    McpHttp {
        /// Bind address, e.g. 0.0.0.0:3943
        #[arg(long, default_value = "127.0.0.1:3943")]
        bind: String,
    },
    /// Print the registered tools
    ListTools,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the stdio transport; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.ado.load_config()?;

    match cli.command {
        Commands::McpStdio => {
            info!(organization = %config.organization, "Starting MCP stdio server (rmcp)");

            let server = create_server(&config)?;

            // Run as an MCP stdio server. McpServer implements ServerHandler.
            let service = server
                .as_ref()
                .clone()
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

            // Block until the MCP session ends.
            service.waiting().await?;
            info!("MCP stdio server session ended");
        }
        Commands::McpHttp { bind } => {
            info!(
                organization = %config.organization,
                "Starting MCP HTTP server (rmcp) on {}", bind
            );

            let server = create_server(&config)?;
            ado_testresults_mcp::server::start_mcp_http(server, &bind).await?;
        }
        Commands::ListTools => {
            let registry = create_registry(&config);
            for tool in registry.list_tools() {
                println!("{}", tool.name);
                if let Some(description) = &tool.description {
                    println!("    {}", description);
                }
            }
        }
    }

    Ok(())
}
