//! Commit-status reporting against the GitHub statuses API.
//!
//! The reporter is a command issuer, not a state tracker: any transition may
//! be issued at any time, and the only durable record of a commit's status
//! lives on the remote host.

use crate::client::GithubClient;
use crate::commits::CommitRange;
use crate::error::GooseError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Namespace prefix for status contexts, as shown in the GitHub UI.
pub const STATUS_NAMESPACE: &str = "goose";

/// Marker substituted with the head SHA in configured statuses URLs.
const SHA_TOKEN: &str = "{sha}";

/// The remote host's commit-status vocabulary. No other values are valid;
/// anything else is rejected at the boundary via `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitStatus {
    Pending,
    Success,
    Failure,
    Error,
}

impl CommitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommitStatus {
    type Err = GooseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            "error" => Ok(Self::Error),
            other => Err(GooseError::Config {
                message: format!("'{other}' is not a commit status"),
            }),
        }
    }
}

/// A status description: either plain text or an error captured at the call
/// site. One stringification rule for both, so callers never special-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportMessage {
    Text(String),
    Caught(String),
}

impl ReportMessage {
    /// Capture an error (or anything displayable) as a message.
    pub fn caught(err: impl std::fmt::Display) -> Self {
        Self::Caught(err.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Caught(s) => s,
        }
    }
}

impl From<String> for ReportMessage {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ReportMessage {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Wire body for a status update.
#[derive(Debug, Serialize)]
struct StatusReportRequest<'a> {
    owner: &'a str,
    repo: &'a str,
    sha: &'a str,
    state: CommitStatus,
    context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Issues status transitions for named checks on one commit.
///
/// Every operation returns whether the remote accepted the update (HTTP 200),
/// independent of the state value being reported: `fail()` for a legitimate
/// build failure still yields `Ok(true)` when GitHub takes the update.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    commit_range: CommitRange,
    statuses_url: String,
    client: GithubClient,
}

impl StatusReporter {
    /// `statuses_url` is the configured template containing a `{sha}`
    /// placeholder.
    pub fn new(
        commit_range: CommitRange,
        statuses_url: impl Into<String>,
        client: GithubClient,
    ) -> Self {
        Self {
            commit_range,
            statuses_url: statuses_url.into(),
            client,
        }
    }

    fn request(
        &self,
        service: &str,
        state: CommitStatus,
        description: Option<String>,
    ) -> Result<bool, GooseError> {
        let CommitRange { owner, repo, head_sha } = &self.commit_range;
        let body = serde_json::to_value(StatusReportRequest {
            owner,
            repo,
            sha: head_sha,
            state,
            context: format!("{STATUS_NAMESPACE}/{service}"),
            description: description.filter(|d| !d.is_empty()),
        })
        .map_err(|e| GooseError::transport("failed to encode status body", e))?;

        debug!("calling {owner}/{repo} with status {state} for service {service}");
        let url = self.statuses_url.replace(SHA_TOKEN, head_sha);
        Ok(self.client.post(&url, &body)?.is_ok())
    }

    /// Issue `pending` with no description.
    pub fn pending(&self, service: &str) -> Result<bool, GooseError> {
        self.request(service, CommitStatus::Pending, None)
    }

    /// Issue `success` with no description.
    pub fn ok(&self, service: &str) -> Result<bool, GooseError> {
        self.request(service, CommitStatus::Success, None)
    }

    /// Issue `failure` with the given message as description.
    pub fn fail(&self, service: &str, message: impl Into<ReportMessage>) -> Result<bool, GooseError> {
        self.request(
            service,
            CommitStatus::Failure,
            Some(message.into().as_str().to_string()),
        )
    }

    /// Issue `error` with the given message. Reserved for reporter-internal
    /// and infrastructure failures, as distinct from legitimate build
    /// failures.
    pub fn error(&self, service: &str, message: impl Into<ReportMessage>) -> Result<bool, GooseError> {
        self.request(
            service,
            CommitStatus::Error,
            Some(message.into().as_str().to_string()),
        )
    }

    /// One poll cycle: a `pending` heartbeat on the `poll` service.
    pub fn poll_once(&self) -> Result<bool, GooseError> {
        self.request(
            "poll",
            CommitStatus::Pending,
            Some("Polling for changes".to_string()),
        )
    }

    /// Heartbeat loop on a fixed interval. A failed cycle reports an `error`
    /// status and keeps looping; there is no cancellation other than process
    /// termination. Must run on a dedicated thread, never a request path.
    pub fn poll_for_changes(&self, interval: Duration) -> ! {
        loop {
            match self.poll_once() {
                Ok(true) => info!("polling successful, no changes detected"),
                Ok(false) => warn!("polling heartbeat not accepted by remote"),
                Err(e) => {
                    let _ = self.error("poll", ReportMessage::caught(&e));
                }
            }
            std::thread::sleep(interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCall, MockTransport};
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::Arc;

    fn reporter_with(transport: Arc<MockTransport>) -> StatusReporter {
        StatusReporter::new(
            CommitRange::new("acme", "widgets", "abc123"),
            "https://host/api/v3/repos/acme/widgets/statuses/{sha}",
            GithubClient::with_transport(transport, "https://host/api/v3"),
        )
    }

    #[test]
    fn test_commit_status_wire_values() {
        assert_eq!(serde_json::to_string(&CommitStatus::Pending).unwrap(), r#""pending""#);
        assert_eq!(serde_json::to_string(&CommitStatus::Success).unwrap(), r#""success""#);
        assert_eq!(serde_json::to_string(&CommitStatus::Failure).unwrap(), r#""failure""#);
        assert_eq!(serde_json::to_string(&CommitStatus::Error).unwrap(), r#""error""#);
    }

    #[test]
    fn test_commit_status_from_str_rejects_unknown() {
        assert_eq!(CommitStatus::from_str("pending").unwrap(), CommitStatus::Pending);
        assert!(CommitStatus::from_str("queued").is_err());
        assert!(CommitStatus::from_str("Success").is_err());
        assert!(CommitStatus::from_str("").is_err());
    }

    #[test]
    fn test_report_message_stringification() {
        let text = ReportMessage::from("build broke");
        let caught = ReportMessage::caught(std::io::Error::other("disk full"));
        assert_eq!(text.as_str(), "build broke");
        assert_eq!(caught.as_str(), "disk full");
    }

    #[test]
    fn test_context_and_state_for_all_operations() {
        let transport = Arc::new(MockTransport::ok());
        let reporter = reporter_with(transport.clone());

        reporter.pending("lint").unwrap();
        reporter.ok("lint").unwrap();
        reporter.fail("lint", "broken").unwrap();
        reporter.error("lint", "crashed").unwrap();

        let states: Vec<String> = transport
            .calls()
            .into_iter()
            .map(|call| match call {
                MockCall::Post { body, .. } => {
                    assert_eq!(body["context"], "goose/lint");
                    body["state"].as_str().unwrap().to_string()
                }
                other => panic!("unexpected call: {other:?}"),
            })
            .collect();
        assert_eq!(states, vec!["pending", "success", "failure", "error"]);
    }

    #[test]
    fn test_description_only_with_message() {
        let transport = Arc::new(MockTransport::ok());
        let reporter = reporter_with(transport.clone());

        reporter.pending("ci").unwrap();
        reporter.ok("ci").unwrap();
        reporter.fail("ci", "build broke").unwrap();

        let calls = transport.calls();
        let body = |i: usize| match &calls[i] {
            MockCall::Post { body, .. } => body.clone(),
            other => panic!("unexpected call: {other:?}"),
        };
        assert!(body(0).get("description").is_none());
        assert!(body(1).get("description").is_none());
        assert_eq!(body(2)["description"], "build broke");
    }

    #[test]
    fn test_empty_message_omits_description() {
        let transport = Arc::new(MockTransport::ok());
        let reporter = reporter_with(transport.clone());

        reporter.fail("ci", "").unwrap();

        match &transport.calls()[0] {
            MockCall::Post { body, .. } => assert!(body.get("description").is_none()),
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn test_sha_substitution() {
        let transport = Arc::new(MockTransport::ok());
        let reporter = reporter_with(transport.clone());

        reporter.pending("ci").unwrap();

        match &transport.calls()[0] {
            MockCall::Post { url, .. } => {
                assert_eq!(url, "https://host/api/v3/repos/acme/widgets/statuses/abc123");
                assert!(!url.contains("{sha}"));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn test_non_200_reports_false_not_error() {
        let transport = Arc::new(MockTransport::with_status(422));
        let reporter = reporter_with(transport);
        assert!(!reporter.fail("ci", "broken").unwrap());
    }

    #[test]
    fn test_remote_accepting_a_failure_report_is_true() {
        let transport = Arc::new(MockTransport::ok());
        let reporter = reporter_with(transport);
        assert!(reporter.fail("ci", "legitimate build failure").unwrap());
    }

    #[test]
    fn test_poll_once_is_pending_heartbeat() {
        let transport = Arc::new(MockTransport::ok());
        let reporter = reporter_with(transport.clone());

        assert!(reporter.poll_once().unwrap());
        match &transport.calls()[0] {
            MockCall::Post { body, .. } => {
                assert_eq!(body["state"], "pending");
                assert_eq!(body["context"], "goose/poll");
                assert_eq!(body["description"], "Polling for changes");
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn test_end_to_end_fail_body() {
        let transport = Arc::new(MockTransport::ok());
        let reporter = reporter_with(transport.clone());

        assert!(reporter.fail("ci", "build broke").unwrap());

        assert_eq!(
            transport.calls(),
            vec![MockCall::Post {
                url: "https://host/api/v3/repos/acme/widgets/statuses/abc123".to_string(),
                body: json!({
                    "owner": "acme",
                    "repo": "widgets",
                    "sha": "abc123",
                    "state": "failure",
                    "context": "goose/ci",
                    "description": "build broke",
                }),
            }]
        );
    }
}
