//! per-call options
//!
//! a [`Call`] carries variables, extra headers, and cancellation for a single
//! query or mutation.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// options for a single repository call
#[derive(Debug, Clone, Default)]
pub struct Call {
    pub(crate) variables: Option<Value>,
    pub(crate) variables_error: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) timeout: Option<Duration>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    /// send variables with the operation
    ///
    /// a value that fails to serialize is reported when the call executes.
    pub fn with_variables<V: Serialize>(mut self, variables: V) -> Self {
        match serde_json::to_value(variables) {
            Ok(value) => {
                self.variables = Some(value);
                self.variables_error = None;
            }
            Err(err) => self.variables_error = Some(err.to_string()),
        }
        self
    }

    /// add a header to this call only
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// add headers to this call only; later values replace earlier ones
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers {
            if let Some(name) = name {
                self.headers.insert(name, value);
            }
        }
        self
    }

    /// abort the call if no response was classified within `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// abort the call when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn variables(&self) -> Option<&Value> {
        self.variables.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}
