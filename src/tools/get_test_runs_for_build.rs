//! Handler for the `ado_get_test_runs_for_build` tool.
//!
//! Lists the automated test runs produced by one build. The build is matched
//! through its `vstfs` URI.

use std::pin::Pin;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;
use tracing::debug;

use crate::ado::{TestRunsQuery, build_uri};
use crate::tools::{
    AdoClients, ArgumentError, Args, ToolContext, ToolHandler, json_text_result, names,
};

/// Runs for a build are always capped at this many records.
const BUILD_RUNS_TOP: i32 = 100;

/// Validated arguments for `ado_get_test_runs_for_build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTestRunsForBuildParams {
    pub project: String,
    pub build_id: i32,
    pub include_run_details: bool,
}

impl GetTestRunsForBuildParams {
    pub fn from_args(args: &JsonObject) -> Result<Self, ArgumentError> {
        let args = Args::new(args);
        Ok(Self {
            project: args.required_str("project")?,
            build_id: args.required_i32("buildId")?,
            include_run_details: args.bool_or("includeRunDetails", true)?,
        })
    }

    /// The runs query: build URI filter, automated runs only, capped at 100.
    pub fn to_query(&self) -> TestRunsQuery {
        TestRunsQuery {
            build_uri: Some(build_uri(self.build_id)),
            include_run_details: self.include_run_details,
            automated: Some(true),
            top: BUILD_RUNS_TOP,
        }
    }
}

/// Handler for the `ado_get_test_runs_for_build` tool.
pub struct GetTestRunsForBuildHandler {
    clients: AdoClients,
}

impl GetTestRunsForBuildHandler {
    pub fn new(clients: AdoClients) -> Self {
        Self { clients }
    }

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
            "buildId".to_string(),
            json!({
                "type": "integer",
                "description": "ID of the build whose test runs should be returned.",
            }),
        );
        properties.insert(
            "includeRunDetails".to_string(),
            json!({
                "type": "boolean",
                "default": true,
                "description": "Include full run details in each record.",
            }),
        );

        schema.insert("properties".to_string(), json!(properties));
        schema.insert("required".to_string(), json!(["project", "buildId"]));
        schema
    }
}

impl ToolHandler for GetTestRunsForBuildHandler {
    fn name(&self) -> &str {
        names::GET_TEST_RUNS_FOR_BUILD
    }

    fn title(&self) -> Option<&str> {
        Some("Get Test Runs For Build")
    }

    fn description(&self) -> &str {
        "Get test runs associated with a specific build ID"
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
            let params = GetTestRunsForBuildParams::from_args(&args)?;
            let query = params.to_query();
            debug!(
                request_id = ?request_id,
                project = %params.project,
                build_id = params.build_id,
                "Listing test runs for build"
            );

            let connection = self.clients.connect().await?;
            let runs = connection
                .test_api()
                .get_test_runs(&params.project, &query)
                .await?;

            json_text_result(&runs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_query_for_build() {
        let params =
            GetTestRunsForBuildParams::from_args(&obj(json!({"project": "Proj", "buildId": 4821})))
                .unwrap();
        assert!(params.include_run_details);
        assert_eq!(
            params.to_query(),
            TestRunsQuery {
                build_uri: Some("vstfs:///Build/Build/4821".to_string()),
                include_run_details: true,
                automated: Some(true),
                top: 100,
            }
        );
    }

    #[test]
    fn test_automated_and_top_are_fixed() {
        for include in [true, false] {
            let params = GetTestRunsForBuildParams::from_args(&obj(json!({
                "project": "Proj",
                "buildId": 7,
                "includeRunDetails": include
            })))
            .unwrap();
            let query = params.to_query();
            assert_eq!(query.include_run_details, include);
            assert_eq!(query.automated, Some(true));
            assert_eq!(query.top, 100);
        }
    }

    #[test]
    fn test_build_id_must_be_integer() {
        let err = GetTestRunsForBuildParams::from_args(&obj(json!({
            "project": "Proj",
            "buildId": "4821"
        })))
        .unwrap_err();
        assert!(matches!(err, ArgumentError::InvalidType { name: "buildId", .. }));
    }
}
