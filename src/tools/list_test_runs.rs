//! Handler for the `ado_list_test_runs` tool.
//!
//! Lists the test runs of a project, optionally filtered by build URI and
//! automation flag.

use std::pin::Pin;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;
use tracing::debug;

use crate::ado::TestRunsQuery;
use crate::tools::{
    AdoClients, ArgumentError, Args, ToolContext, ToolHandler, json_text_result, names,
};

const DEFAULT_TOP: i32 = 50;

/// Validated arguments for `ado_list_test_runs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTestRunsParams {
    pub project: String,
    pub query: TestRunsQuery,
}

impl ListTestRunsParams {
    pub fn from_args(args: &JsonObject) -> Result<Self, ArgumentError> {
        let args = Args::new(args);
        Ok(Self {
            project: args.required_str("project")?,
            query: TestRunsQuery {
                build_uri: args.optional_str("buildUri")?,
                include_run_details: args.bool_or("includeRunDetails", false)?,
                automated: args.optional_bool("automated")?,
                top: args.i32_or("top", DEFAULT_TOP)?,
            },
        })
    }
}

/// Handler for the `ado_list_test_runs` tool.
pub struct ListTestRunsHandler {
    clients: AdoClients,
}

impl ListTestRunsHandler {
    pub fn new(clients: AdoClients) -> Self {
        Self { clients }
    }

    /// Build the input schema for this tool.
    fn input_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));

        let mut properties = serde_json::Map::new();
        properties.insert(
            "project".to_string(),
            json!({
                "type": "string",
                "description": "Project name or ID.",
            }),
        );
        properties.insert(
            "buildUri".to_string(),
            json!({
                "type": "string",
                "description": "Only return runs for this build, e.g. 'vstfs:///Build/Build/123'.",
            }),
        );
        properties.insert(
            "includeRunDetails".to_string(),
            json!({
                "type": "boolean",
                "default": false,
                "description": "Include full run details in each record.",
            }),
        );
        properties.insert(
            "automated".to_string(),
            json!({
                "type": "boolean",
                "description": "Only return automated (true) or manual (false) runs.",
            }),
        );
        properties.insert(
            "top".to_string(),
            json!({
                "type": "integer",
                "default": DEFAULT_TOP,
                "description": "Maximum number of runs to return.",
            }),
        );

        schema.insert("properties".to_string(), json!(properties));
        schema.insert("required".to_string(), json!(["project"]));
        schema
    }
}

impl ToolHandler for ListTestRunsHandler {
    fn name(&self) -> &str {
        names::LIST_TEST_RUNS
    }

    fn title(&self) -> Option<&str> {
        Some("List Test Runs")
    }

    fn description(&self) -> &str {
        "Get a list of test runs for a project with optional filtering by build"
    }

    fn input_schema(&self) -> JsonObject {
        self.input_schema()
    }

    fn read_only(&self) -> bool {
        true
    }

    fn execute(
        &self,
        args: JsonObject,
        ctx: &ToolContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        let request_id = ctx.request_id.clone();

        Box::pin(async move {
            let params = ListTestRunsParams::from_args(&args)?;
            debug!(
                request_id = ?request_id,
                project = %params.project,
                build_uri = ?params.query.build_uri,
                top = params.query.top,
                "Listing test runs"
            );

            let connection = self.clients.connect().await?;
            let runs = connection
                .test_api()
                .get_test_runs(&params.project, &params.query)
                .await?;

            json_text_result(&runs)
        })
    }
}
