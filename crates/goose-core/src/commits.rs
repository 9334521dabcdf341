//! Repository/commit identity a status report attaches to.

use serde_json::Value;

/// Identifies a repository (owner, name) and the exact commit a report must
/// attach to. Built fresh from each webhook payload, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub owner: String,
    pub repo: String,
    pub head_sha: String,
}

impl CommitRange {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        head_sha: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            head_sha: head_sha.into(),
        }
    }

    /// Extract the commit range from a pull-request webhook payload.
    ///
    /// Only the three needed fields are read; any missing one yields `None`
    /// rather than an error, since inbound payloads are not schema-validated.
    pub fn from_pull_request_payload(payload: &Value) -> Option<Self> {
        let owner = payload
            .pointer("/repository/owner/login")
            .and_then(Value::as_str)?;
        let repo = payload.pointer("/repository/name").and_then(Value::as_str)?;
        let head_sha = payload
            .pointer("/pull_request/head/sha")
            .and_then(Value::as_str)?;
        Some(Self::new(owner, repo, head_sha))
    }
}
