//! Mock transport for testing. Returns canned responses and records calls.

use crate::client::{ApiResponse, StatusTransport};
use crate::error::GooseError;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Record of transport calls for test assertions
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Post { url: String, body: Value },
    Get { url: String },
}

/// Mock transport with a fixed response (or error) and a call log.
#[derive(Debug, Clone)]
pub struct MockTransport {
    status: u16,
    body: String,
    error: Option<String>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockTransport {
    /// Mock that answers every call with HTTP 200 and an empty JSON body.
    pub fn ok() -> Self {
        Self::with_body(200, "{}".to_string())
    }

    /// Mock that answers every call with the given status and empty body.
    pub fn with_status(status: u16) -> Self {
        Self::with_body(status, "{}".to_string())
    }

    /// Mock that answers every call with the given status and body.
    pub fn with_body(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            error: None,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock whose every call fails with a transport error.
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: String::new(),
            error: Some(message.into()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a copy of the call log for assertions
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear the call log
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear();
    }

    fn log_call(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    fn respond(&self) -> Result<ApiResponse, GooseError> {
        if let Some(message) = &self.error {
            return Err(GooseError::Transport {
                message: message.clone(),
                source: None,
            });
        }
        Ok(ApiResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

impl StatusTransport for MockTransport {
    fn post(&self, url: &str, body: &Value) -> Result<ApiResponse, GooseError> {
        self.log_call(MockCall::Post {
            url: url.to_string(),
            body: body.clone(),
        });
        self.respond()
    }

    fn get(&self, url: &str) -> Result<ApiResponse, GooseError> {
        self.log_call(MockCall::Get {
            url: url.to_string(),
        });
        self.respond()
    }
}
