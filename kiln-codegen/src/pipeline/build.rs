use std::{path::PathBuf, time::Duration};

use serde::{Serialize, Serializer};

use super::ValidationIssue;

/// How a toolchain invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildStatus {
    Succeeded,
    /// Non-zero exit, or the process could not be started (`exit_code` is `None`)
    Failed { exit_code: Option<i32> },
    TimedOut,
    Cancelled,
}

/// Outcome of one compile attempt.
///
/// A failed build is a value, not an error: callers check [`BuildResult::success`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildResult {
    #[serde(flatten)]
    pub status: BuildStatus,
    pub stdout: String,
    pub stderr: String,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    pub issues: Vec<ValidationIssue>,
    /// Produced binary, for build-with-output invocations
    pub artifact: Option<PathBuf>,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

impl BuildResult {
    pub fn new(status: BuildStatus, duration: Duration) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
            duration,
            issues: Vec::new(),
            artifact: None,
        }
    }

    pub fn succeeded(duration: Duration) -> Self {
        Self::new(BuildStatus::Succeeded, duration)
    }

    pub fn failed(exit_code: Option<i32>, duration: Duration) -> Self {
        Self::new(BuildStatus::Failed { exit_code }, duration)
    }

    /// Result for a request cancelled before the toolchain started.
    pub fn cancelled() -> Self {
        Self::new(BuildStatus::Cancelled, Duration::ZERO)
    }

    pub fn with_output(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }

    pub fn with_issues(mut self, issues: Vec<ValidationIssue>) -> Self {
        self.issues = issues;
        self
    }

    pub fn with_artifact(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    pub fn success(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_build_is_not_success() {
        let result = BuildResult::failed(Some(101), Duration::from_millis(1500))
            .with_output("", "error[E0425]: cannot find value `x`");
        assert!(!result.success());
        assert_eq!(result.status, BuildStatus::Failed { exit_code: Some(101) });
    }

    #[test]
    fn test_serializes_status_and_millis() {
        let result = BuildResult::new(BuildStatus::TimedOut, Duration::from_millis(2500));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "timed_out");
        assert_eq!(json["duration_ms"], 2500);
    }
}
