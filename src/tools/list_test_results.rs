//! Handler for the `ado_list_test_results` tool.
//!
//! Lists the results recorded in one test run, one page at a time.

use std::pin::Pin;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;
use tracing::debug;

use crate::ado::{ResultDetails, TestResultsQuery, details_to_include};
use crate::tools::{
    AdoClients, ArgumentError, Args, ToolContext, ToolHandler, json_text_result, names,
};

const DEFAULT_TOP: i32 = 1000;

/// Validated arguments for `ado_list_test_results`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTestResultsParams {
    pub project: String,
    pub run_id: i32,
    pub query: TestResultsQuery,
}

impl ListTestResultsParams {
    pub fn from_args(args: &JsonObject) -> Result<Self, ArgumentError> {
        let args = Args::new(args);
        let include_work_items = args.bool_or("includeWorkItems", false)?;
        Ok(Self {
            project: args.required_str("project")?,
            run_id: args.required_i32("runId")?,
            query: TestResultsQuery {
                details_to_include: details_to_include(
                    include_work_items,
                    ResultDetails::WorkItems,
                ),
                skip: args.optional_i32("skip")?,
                top: args.i32_or("top", DEFAULT_TOP)?,
            },
        })
    }
}

/// Handler for the `ado_list_test_results` tool.
pub struct ListTestResultsHandler {
    clients: AdoClients,
}

impl ListTestResultsHandler {
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
                "description": "ID of the test run.",
            }),
        );
        properties.insert(
            "includeWorkItems".to_string(),
            json!({
                "type": "boolean",
                "default": false,
                "description": "Include linked work item references in each result.",
            }),
        );
        properties.insert(
            "skip".to_string(),
            json!({
                "type": "integer",
                "description": "Number of results to skip (pagination offset).",
            }),
        );
        properties.insert(
            "top".to_string(),
            json!({
                "type": "integer",
                "default": DEFAULT_TOP,
                "description": "Maximum number of results to return.",
            }),
        );

        schema.insert("properties".to_string(), json!(properties));
        schema.insert("required".to_string(), json!(["project", "runId"]));
        schema
    }
}

impl ToolHandler for ListTestResultsHandler {
    fn name(&self) -> &str {
        names::LIST_TEST_RESULTS
    }

    fn title(&self) -> Option<&str> {
        Some("List Test Results")
    }

    fn description(&self) -> &str {
        "Get test results for a specific test run with detailed information"
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
            let params = ListTestResultsParams::from_args(&args)?;
            debug!(
                request_id = ?request_id,
                project = %params.project,
                run_id = params.run_id,
                skip = ?params.query.skip,
                top = params.query.top,
                "Listing test results"
            );

            let connection = self.clients.connect().await?;
            let results = connection
                .test_api()
                .get_test_results(&params.project, params.run_id, &params.query)
                .await?;

            json_text_result(&results)
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
    fn test_defaults() {
        let params =
            ListTestResultsParams::from_args(&obj(json!({"project": "Proj", "runId": 17})))
                .unwrap();
        assert_eq!(params.run_id, 17);
        assert_eq!(
            params.query,
            TestResultsQuery {
                details_to_include: None,
                skip: None,
                top: 1000,
            }
        );
    }

    #[test]
    fn test_include_work_items_maps_to_flag() {
        let params = ListTestResultsParams::from_args(&obj(json!({
            "project": "Proj",
            "runId": 17,
            "includeWorkItems": true,
            "skip": 100,
            "top": 25
        })))
        .unwrap();
        assert_eq!(params.query.details_to_include, Some(ResultDetails::WorkItems));
        assert_eq!(params.query.skip, Some(100));
        assert_eq!(params.query.top, 25);
    }

    #[test]
    fn test_explicit_false_sends_no_flag() {
        let params = ListTestResultsParams::from_args(&obj(json!({
            "project": "Proj",
            "runId": 17,
            "includeWorkItems": false
        })))
        .unwrap();
        assert_eq!(params.query.details_to_include, None);
    }

    #[test]
    fn test_run_id_is_required() {
        let err = ListTestResultsParams::from_args(&obj(json!({"project": "Proj"}))).unwrap_err();
        assert_eq!(err, ArgumentError::Missing("runId"));
    }
}
