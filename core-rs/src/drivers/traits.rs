//! Transport trait for the triplestore
//!
//! Defines the wire-level seam between the client and the store.
//! Implementations include:
//! - HttpTransport (reqwest, SPARQL over HTTP)
//! - In-memory fakes in tests

use crate::errors::Result;
use std::time::Duration;

/// Raw HTTP outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: String::new(),
            body: body.into(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Wire protocol to the triplestore
///
/// # Protocol Semantics
///
/// - `select` sends a read query to the query endpoint and returns the
///   SPARQL JSON results document untouched
/// - `update` sends an authenticated update body (inserts, graph drops) to
///   the upload endpoint with the given read timeout
/// - Non-2xx statuses are returned, not raised; only failures to complete
///   the round trip are errors
/// - Implementations never retry
#[allow(async_fn_in_trait)]
pub trait SparqlTransport: Send + Sync {
    async fn select(&self, endpoint: &str, query: &str) -> Result<TransportResponse>;

    async fn update(&self, endpoint: &str, body: &str, timeout: Duration) -> Result<TransportResponse>;
}
