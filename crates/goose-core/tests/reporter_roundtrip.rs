//! End-to-end reporter behavior against a mock transport.

use goose_core::mock::{MockCall, MockTransport};
use goose_core::{CommitRange, CommitStatus, GithubClient, StatusReporter};
use serde_json::json;
use std::sync::Arc;

fn acme_reporter(transport: Arc<MockTransport>) -> StatusReporter {
    StatusReporter::new(
        CommitRange::new("acme", "widgets", "abc123"),
        "https://host/api/v3/repos/acme/widgets/statuses/{sha}",
        GithubClient::with_transport(transport, "https://host/api/v3"),
    )
}

#[test]
fn fail_produces_exact_post_url_and_body() {
    let transport = Arc::new(MockTransport::ok());
    let reporter = acme_reporter(transport.clone());

    let accepted = reporter.fail("ci", "build broke").unwrap();

    assert!(accepted);
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

#[test]
fn every_operation_maps_to_its_wire_state() {
    let transport = Arc::new(MockTransport::ok());
    let reporter = acme_reporter(transport.clone());

    reporter.pending("ci").unwrap();
    reporter.ok("ci").unwrap();
    reporter.fail("ci", "nope").unwrap();
    reporter.error("ci", "infra down").unwrap();

    let expected = [
        CommitStatus::Pending,
        CommitStatus::Success,
        CommitStatus::Failure,
        CommitStatus::Error,
    ];
    for (call, state) in transport.calls().iter().zip(expected) {
        match call {
            MockCall::Post { body, .. } => {
                assert_eq!(body["state"], state.as_str());
                assert_eq!(body["context"], "goose/ci");
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }
}

#[test]
fn caught_error_message_becomes_description() {
    let transport = Arc::new(MockTransport::ok());
    let reporter = acme_reporter(transport.clone());

    let caught = goose_core::ReportMessage::caught(std::io::Error::other("git fetch timed out"));
    reporter.error("ci", caught).unwrap();

    match &transport.calls()[0] {
        MockCall::Post { body, .. } => {
            assert_eq!(body["description"], "git fetch timed out");
            assert_eq!(body["state"], "error");
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[test]
fn remote_rejection_is_false_not_err() {
    let transport = Arc::new(MockTransport::with_status(502));
    let reporter = acme_reporter(transport);

    assert!(!reporter.ok("ci").unwrap());
    assert!(!reporter.pending("ci").unwrap());
}

#[test]
fn transport_failure_is_err() {
    let transport = Arc::new(MockTransport::with_error("dns failure"));
    let reporter = acme_reporter(transport);

    assert!(reporter.ok("ci").is_err());
}
