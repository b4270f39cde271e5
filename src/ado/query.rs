//! Request-shaping types for the Test and Test Results areas.
//!
//! These are the only values the tool layer derives on its own: the detail
//! flag sent as `detailsToInclude` and the build URI used to tie runs to a build.

use std::fmt;

/// Extended data the service can be asked to include with a test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDetails {
    /// Linked work item references.
    WorkItems,
    /// Iteration-level detail, including per-iteration errors.
    Iterations,
}

impl ResultDetails {
    /// The literal the service expects in `detailsToInclude`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultDetails::WorkItems => "WorkItems",
            ResultDetails::Iterations => "iterations",
        }
    }
}

impl fmt::Display for ResultDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a tool's boolean switch onto an optional detail flag.
///
/// `false` never becomes a value sent downstream; it means "no flag".
pub fn details_to_include(include: bool, detail: ResultDetails) -> Option<ResultDetails> {
    if include { Some(detail) } else { None }
}

/// Build the `vstfs` URI Azure DevOps uses to identify a build.
pub fn build_uri(build_id: i32) -> String {
    format!("vstfs:///Build/Build/{}", build_id)
}

/// Filters for listing the test runs of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunsQuery {
    pub build_uri: Option<String>,
    pub include_run_details: bool,
    pub automated: Option<bool>,
    pub top: i32,
}

/// Pagination and detail options for listing the results of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResultsQuery {
    pub details_to_include: Option<ResultDetails>,
    pub skip: Option<i32>,
    pub top: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_uri_format() {
        assert_eq!(build_uri(4821), "vstfs:///Build/Build/4821");
        assert_eq!(build_uri(1), "vstfs:///Build/Build/1");
        assert_eq!(build_uri(0), "vstfs:///Build/Build/0");
    }

    #[test]
    fn test_build_uri_has_no_extra_characters() {
        for id in [7, 42, 99_999, i32::MAX] {
            let uri = build_uri(id);
            let suffix = uri
                .strip_prefix("vstfs:///Build/Build/")
                .expect("scheme prefix");
            assert_eq!(suffix, id.to_string());
        }
    }

    #[test]
    fn test_details_to_include_true_maps_to_flag() {
        assert_eq!(
            details_to_include(true, ResultDetails::WorkItems),
            Some(ResultDetails::WorkItems)
        );
        assert_eq!(
            details_to_include(true, ResultDetails::Iterations),
            Some(ResultDetails::Iterations)
        );
    }

    #[test]
    fn test_details_to_include_false_maps_to_none() {
        assert_eq!(details_to_include(false, ResultDetails::WorkItems), None);
        assert_eq!(details_to_include(false, ResultDetails::Iterations), None);
    }

    #[test]
    fn test_result_details_wire_text() {
        assert_eq!(ResultDetails::WorkItems.as_str(), "WorkItems");
        assert_eq!(ResultDetails::Iterations.as_str(), "iterations");
        assert_eq!(ResultDetails::Iterations.to_string(), "iterations");
    }
}
