//! Event dispatch: maps an inbound webhook event-type name to the handler
//! registered for it.
//!
//! The table is built at startup from the configured entries. An unknown
//! event name looks up to "no handler" and is recorded as a no-op, never an
//! error; new event types are supported by registering a handler under that
//! name.

use crate::client::GithubClient;
use crate::commits::CommitRange;
use crate::config::ConfigEntry;
use crate::error::GooseError;
use crate::reporter::StatusReporter;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a dispatch lookup, surfaced to the webhook boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Processed,
    NotProcessed,
}

impl Dispatch {
    pub fn processed(self) -> bool {
        self == Self::Processed
    }
}

/// A handler invoked with the raw event payload.
pub type EventHandler = Arc<dyn Fn(&Value) -> Result<(), GooseError> + Send + Sync>;

/// Dispatch table from event-type name to handler.
#[derive(Clone)]
pub struct EventProcessor {
    handlers: HashMap<String, EventHandler>,
    entries: Arc<Vec<ConfigEntry>>,
}

impl std::fmt::Debug for EventProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProcessor")
            .field("events", &self.events())
            .field("entries", &self.entries)
            .finish()
    }
}

impl EventProcessor {
    /// Build the table with the built-in handlers registered.
    pub fn new(entries: Vec<ConfigEntry>, client: GithubClient) -> Self {
        let entries = Arc::new(entries);
        let mut processor = Self {
            handlers: HashMap::new(),
            entries: entries.clone(),
        };

        let pr_entries = entries.clone();
        processor.register(
            "pull_request",
            Arc::new(move |payload: &Value| process_pull_request(&pr_entries, &client, payload)),
        );
        processor.register("ping", Arc::new(process_ping));

        processor
    }

    /// Register a handler for an event-type name.
    ///
    /// If a handler with the same name already exists, it will be replaced.
    pub fn register(&mut self, event: impl Into<String>, handler: EventHandler) {
        self.handlers.insert(event.into(), handler);
    }

    /// Look up and invoke the handler for `event`, forwarding the payload.
    ///
    /// A miss is a recorded no-op. A handler error propagates to the caller;
    /// no retry is performed here.
    pub fn dispatch(&self, event: &str, payload: &Value) -> Result<Dispatch, GooseError> {
        match self.handlers.get(event) {
            Some(handler) => {
                debug!("dispatching event '{event}'");
                handler(payload)?;
                Ok(Dispatch::Processed)
            }
            None => {
                info!("no handler registered for event '{event}'");
                Ok(Dispatch::NotProcessed)
            }
        }
    }

    /// Whether a handler is registered for `event`.
    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Registered event-type names, sorted.
    pub fn events(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The configured entries this processor reports against.
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }
}

/// Pull-request events: for the actions that open or refresh a PR, move every
/// configured check to `pending` on the new head commit.
fn process_pull_request(
    entries: &[ConfigEntry],
    client: &GithubClient,
    payload: &Value,
) -> Result<(), GooseError> {
    let action = payload.get("action").and_then(Value::as_str).unwrap_or("");
    if !matches!(action, "opened" | "reopened" | "synchronize") {
        debug!("ignoring pull_request action '{action}'");
        return Ok(());
    }

    let Some(range) = CommitRange::from_pull_request_payload(payload) else {
        warn!("pull_request payload missing repository/head fields, skipping");
        return Ok(());
    };

    // TODO: fetch the PR file list and honor file_patterns before reporting.
    for entry in entries {
        let reporter = StatusReporter::new(range.clone(), entry.url.clone(), client.clone());
        if !reporter.pending(&entry.name)? {
            warn!(
                "status update for '{}' on {}/{}@{} not accepted",
                entry.name, range.owner, range.repo, range.head_sha
            );
        }
    }
    Ok(())
}

/// Ping events: GitHub sends one when a webhook is first configured.
fn process_ping(payload: &Value) -> Result<(), GooseError> {
    let zen = payload.get("zen").and_then(Value::as_str).unwrap_or("");
    info!("webhook ping received: {zen}");
    Ok(())
}
