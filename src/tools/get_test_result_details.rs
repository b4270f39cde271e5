//! Handler for the `ado_get_test_result_details` tool.
//!
//! Fetches one test result through the Test Results area, which carries
//! iteration-level and error detail.

use std::pin::Pin;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;
use tracing::debug;

use crate::ado::{ResultDetails, details_to_include};
use crate::tools::{
    AdoClients, ArgumentError, Args, ToolContext, ToolHandler, json_text_result, names,
};

/// Validated arguments for `ado_get_test_result_details`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTestResultDetailsParams {
    pub project: String,
    pub run_id: i32,
    pub test_result_id: i32,
    pub details_to_include: Option<ResultDetails>,
}

impl GetTestResultDetailsParams {
    pub fn from_args(args: &JsonObject) -> Result<Self, ArgumentError> {
        let args = Args::new(args);
        let include_iterations = args.bool_or("includeIterations", true)?;
        Ok(Self {
            project: args.required_str("project")?,
            run_id: args.required_i32("runId")?,
            test_result_id: args.required_i32("testResultId")?,
            details_to_include: details_to_include(include_iterations, ResultDetails::Iterations),
        })
    }
}

/// Handler for the `ado_get_test_result_details` tool.
pub struct GetTestResultDetailsHandler {
    clients: AdoClients,
}

impl GetTestResultDetailsHandler {
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
            "runId".to_string(),
            json!({
                "type": "integer",
                "description": "ID of the test run containing the result.",
            }),
        );
        properties.insert(
            "testResultId".to_string(),
            json!({
                "type": "integer",
                "description": "ID of the test result within the run.",
            }),
        );
        properties.insert(
            "includeIterations".to_string(),
            json!({
                "type": "boolean",
                "default": true,
                "description": "Include iteration details, with per-iteration errors.",
            }),
        );

        schema.insert("properties".to_string(), json!(properties));
        schema.insert(
            "required".to_string(),
            json!(["project", "runId", "testResultId"]),
        );
        schema
    }
}

impl ToolHandler for GetTestResultDetailsHandler {
    fn name(&self) -> &str {
        names::GET_TEST_RESULT_DETAILS
    }

    fn title(&self) -> Option<&str> {
        Some("Get Test Result Details")
    }

    fn description(&self) -> &str {
        "Get detailed information for a specific test result including iterations and error details"
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
            let params = GetTestResultDetailsParams::from_args(&args)?;
            debug!(
                request_id = ?request_id,
                project = %params.project,
                run_id = params.run_id,
                test_result_id = params.test_result_id,
                "Fetching test result"
            );

            let connection = self.clients.connect().await?;
            let result = connection
                .test_results_api()
                .get_test_result_by_id(
                    &params.project,
                    params.run_id,
                    params.test_result_id,
                    params.details_to_include,
                )
                .await?;

            json_text_result(&result)
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
    fn test_iterations_included_by_default() {
        let params = GetTestResultDetailsParams::from_args(&obj(json!({
            "project": "Proj",
            "runId": 17,
            "testResultId": 100001
        })))
        .unwrap();
        assert_eq!(
            params,
            GetTestResultDetailsParams {
                project: "Proj".to_string(),
                run_id: 17,
                test_result_id: 100001,
                details_to_include: Some(ResultDetails::Iterations),
            }
        );
    }

    #[test]
    fn test_iterations_disabled() {
        let params = GetTestResultDetailsParams::from_args(&obj(json!({
            "project": "Proj",
            "runId": 17,
            "testResultId": 100001,
            "includeIterations": false
        })))
        .unwrap();
        assert_eq!(params.details_to_include, None);
    }

    #[test]
    fn test_result_id_is_required() {
        let err = GetTestResultDetailsParams::from_args(&obj(json!({
            "project": "Proj",
            "runId": 17
        })))
        .unwrap_err();
        assert_eq!(err, ArgumentError::Missing("testResultId"));
    }
}
