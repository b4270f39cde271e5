//! Azure DevOps client layer.
//!
//! The tool handlers only talk to the traits in this module:
//! - `ConnectionProvider` hands out a fresh `Connection` per call
//! - `Connection` exposes the `test` and `test-results` sub-clients
//! - `TestApi` / `TestResultsApi` issue exactly one request each
//!
//! `AzureDevOpsConnectionProvider` backs them with `azure_devops_rust_api`;
//! tests plug in their own.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

mod auth;
mod client;
mod credential;
mod error;
mod query;

pub use auth::{AccessToken, AuthScheme, PatTokenProvider, StaticBearerTokenProvider, TokenProvider};
pub use client::{
    AzureDevOpsConnection, AzureDevOpsConnectionProvider, RealTestApi, RealTestResultsApi,
};
pub use credential::BearerCredential;
pub use error::{AdoError, AdoResult};
pub use query::{ResultDetails, TestResultsQuery, TestRunsQuery, build_uri, details_to_include};

/// Operations of the Test area (`_apis/test`).
#[async_trait]
pub trait TestApi: Send + Sync {
    /// Lists the test runs of a project.
    async fn get_test_runs(&self, project: &str, query: &TestRunsQuery) -> AdoResult<Vec<Value>>;

    /// Lists the results recorded in a test run.
    async fn get_test_results(
        &self,
        project: &str,
        run_id: i32,
        query: &TestResultsQuery,
    ) -> AdoResult<Vec<Value>>;
}

/// Operations of the Test Results area (`_apis/testresults`).
#[async_trait]
pub trait TestResultsApi: Send + Sync {
    /// Fetches one test result with optional extended detail.
    async fn get_test_result_by_id(
        &self,
        project: &str,
        run_id: i32,
        test_result_id: i32,
        details_to_include: Option<ResultDetails>,
    ) -> AdoResult<Value>;
}

/// An authenticated session against one organization.
pub trait Connection: Send + Sync {
    fn test_api(&self) -> Arc<dyn TestApi>;

    fn test_results_api(&self) -> Arc<dyn TestResultsApi>;
}

/// Produces authenticated connections on demand.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn connect(&self, tokens: &dyn TokenProvider) -> AdoResult<Arc<dyn Connection>>;
}
