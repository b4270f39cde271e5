//! Errors raised by the Azure DevOps client layer.

use std::time::Duration;

/// Errors returned by the Azure DevOps clients.
#[derive(Debug, thiserror::Error)]
pub enum AdoError {
    /// The SDK reported a failure: transport, non-success status or an
    /// undecodable body.
    #[error("Azure DevOps request failed: {0}")]
    Service(#[from] azure_core::Error),

    /// A typed response could not be turned back into JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request did not complete within the configured timeout.
    #[error("Azure DevOps request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// No usable credential could be produced.
    #[error("Authentication failed: {0}")]
    Auth(String),
}

pub type AdoResult<T> = Result<T, AdoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = AdoError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Azure DevOps request timed out after 60s");
    }

    #[test]
    fn test_json_errors_convert() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: AdoError = source.into();
        assert!(matches!(err, AdoError::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
