//! Implementation of the client traits on top of `azure_devops_rust_api`.
//!
//! Each connection builds its own `test` and `test_results` SDK clients from
//! the credential fetched at connect time. Typed SDK responses are serialized
//! back to JSON so tools can pass them through unchanged.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use azure_devops_rust_api::{Credential, test, test_results};
use serde_json::Value;
use tracing::debug;

use super::auth::TokenProvider;
use super::error::{AdoError, AdoResult};
use super::query::{ResultDetails, TestResultsQuery, TestRunsQuery};
use super::{Connection, ConnectionProvider, TestApi, TestResultsApi};
use crate::config::AdoConfig;

/// Creates an `AzureDevOpsConnection` per call for one organization.
#[derive(Debug, Clone)]
pub struct AzureDevOpsConnectionProvider {
    organization: String,
    timeout: Duration,
}

impl AzureDevOpsConnectionProvider {
    pub fn new(config: &AdoConfig) -> Self {
        Self {
            organization: config.organization.clone(),
            timeout: config.request_timeout,
        }
    }
}

#[async_trait]
impl ConnectionProvider for AzureDevOpsConnectionProvider {
    async fn connect(&self, tokens: &dyn TokenProvider) -> AdoResult<Arc<dyn Connection>> {
        let credential = tokens.access_token().await?.to_credential();
        Ok(Arc::new(AzureDevOpsConnection::new(
            self.organization.clone(),
            credential,
            self.timeout,
        )))
    }
}

/// An authenticated session holding both sub-clients.
#[derive(Clone)]
pub struct AzureDevOpsConnection {
    test: RealTestApi,
    test_results: RealTestResultsApi,
}

impl AzureDevOpsConnection {
    pub fn new(organization: String, credential: Credential, timeout: Duration) -> Self {
        let test_client = test::ClientBuilder::new(credential.clone()).build();
        let test_results_client = test_results::ClientBuilder::new(credential).build();
        Self {
            test: RealTestApi {
                client: test_client,
                organization: organization.clone(),
                timeout,
            },
            test_results: RealTestResultsApi {
                client: test_results_client,
                organization,
                timeout,
            },
        }
    }
}

impl Connection for AzureDevOpsConnection {
    fn test_api(&self) -> Arc<dyn TestApi> {
        Arc::new(self.test.clone())
    }

    fn test_results_api(&self) -> Arc<dyn TestResultsApi> {
        Arc::new(self.test_results.clone())
    }
}

/// Wraps `azure_devops_rust_api::test::Client`.
#[derive(Clone)]
pub struct RealTestApi {
    client: test::Client,
    organization: String,
    timeout: Duration,
}

#[async_trait]
impl TestApi for RealTestApi {
    async fn get_test_runs(&self, project: &str, query: &TestRunsQuery) -> AdoResult<Vec<Value>> {
        debug!(organization = %self.organization, project, ?query, "Listing test runs");

        let mut request = self
            .client
            .runs_client()
            .list(&self.organization, project)
            .include_run_details(query.include_run_details)
            .top(query.top);
        if let Some(build_uri) = &query.build_uri {
            request = request.build_uri(build_uri);
        }
        if let Some(automated) = query.automated {
            request = request.automated(automated);
        }

        let runs = within(self.timeout, request).await?;
        to_json_list(runs.value)
    }

    async fn get_test_results(
        &self,
        project: &str,
        run_id: i32,
        query: &TestResultsQuery,
    ) -> AdoResult<Vec<Value>> {
        debug!(organization = %self.organization, project, run_id, ?query, "Listing test results");

        let mut request = self
            .client
            .results_client()
            .list(&self.organization, project, run_id)
            .top(query.top);
        if let Some(details) = query.details_to_include {
            request = request.details_to_include(details.as_str());
        }
        if let Some(skip) = query.skip {
            request = request.skip(skip);
        }

        let results = within(self.timeout, request).await?;
        to_json_list(results.value)
    }
}

/// Wraps `azure_devops_rust_api::test_results::Client`.
#[derive(Clone)]
pub struct RealTestResultsApi {
    client: test_results::Client,
    organization: String,
    timeout: Duration,
}

#[async_trait]
impl TestResultsApi for RealTestResultsApi {
    async fn get_test_result_by_id(
        &self,
        project: &str,
        run_id: i32,
        test_result_id: i32,
        details_to_include: Option<ResultDetails>,
    ) -> AdoResult<Value> {
        debug!(
            organization = %self.organization,
            project,
            run_id,
            test_result_id,
            ?details_to_include,
            "Fetching test result"
        );

        let mut request = self
            .client
            .results_client()
            .get_test_result_by_id(&self.organization, project, run_id, test_result_id);
        if let Some(details) = details_to_include {
            request = request.details_to_include(details.as_str());
        }

        let result = within(self.timeout, request).await?;
        Ok(serde_json::to_value(result)?)
    }
}

/// Await an SDK request, giving up after `timeout`.
async fn within<F, T>(timeout: Duration, request: F) -> AdoResult<T>
where
    F: IntoFuture<Output = azure_core::Result<T>>,
{
    match tokio::time::timeout(timeout, request).await {
        Ok(response) => Ok(response?),
        Err(_) => Err(AdoError::Timeout(timeout)),
    }
}

fn to_json_list<T: serde::Serialize>(items: Vec<T>) -> AdoResult<Vec<Value>> {
    items
        .into_iter()
        .map(|item| serde_json::to_value(item).map_err(AdoError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_within_passes_results_through() {
        let value = within(Duration::from_secs(1), async {
            Ok::<_, azure_core::Error>(42)
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_within_times_out() {
        let err = within(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, azure_core::Error>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AdoError::Timeout(d) if d == Duration::from_millis(10)));
    }

    #[test]
    fn test_to_json_list_serializes_each_item() {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Run {
            id: i32,
            is_automated: bool,
        }

        let items = to_json_list(vec![
            Run {
                id: 1,
                is_automated: true,
            },
            Run {
                id: 2,
                is_automated: false,
            },
        ])
        .unwrap();
        assert_eq!(
            items,
            vec![
                serde_json::json!({"id": 1, "isAutomated": true}),
                serde_json::json!({"id": 2, "isAutomated": false}),
            ]
        );
    }

    #[test]
    fn test_connection_hands_out_both_sub_clients() {
        let connection = AzureDevOpsConnection::new(
            "contoso".to_string(),
            Credential::from_pat("pat".to_string()),
            Duration::from_secs(30),
        );
        let _test: Arc<dyn TestApi> = connection.test_api();
        let _results: Arc<dyn TestResultsApi> = connection.test_results_api();
    }
}
