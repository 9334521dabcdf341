//! Core types for goose, a GitHub webhook service that reports build/check
//! status back onto pull-request commits.
//!
//! The pipeline has two halves:
//! - an [`EventProcessor`](processor::EventProcessor) that routes each inbound
//!   webhook event to the handler registered for its event-type name, and
//! - a [`StatusReporter`](reporter::StatusReporter) that issues
//!   pending/success/failure/error transitions for a named check against the
//!   remote statuses API.
//!
//! The HTTP endpoint that receives webhooks lives in the `goose-webhook`
//! binary; this crate is transport-server agnostic and only performs blocking
//! outbound calls.

pub mod client;
pub mod commits;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod processor;
pub mod reporter;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use client::{ApiResponse, GithubClient, HttpTransport, StatusTransport};
pub use commits::CommitRange;
pub use config::{ConfigEntry, load_service_config};
pub use credentials::{Credentials, authenticate_url};
pub use error::GooseError;
pub use processor::{Dispatch, EventHandler, EventProcessor};
pub use reporter::{CommitStatus, ReportMessage, StatusReporter};
