//! HttpTransport for SPARQL over HTTP
//!
//! Provides the reqwest-backed wire layer:
//! - Form-encoded read queries with JSON results
//! - `application/sparql-query` update bodies
//! - HTTP Basic authentication on the upload endpoint
//! - Connect timeout per client, read timeout per update

use crate::config::TraitBankConfig;
use crate::errors::Result;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

use super::traits::{SparqlTransport, TransportResponse};

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
pub const SPARQL_QUERY: &str = "application/sparql-query";

/// HTTP transport to a Virtuoso-style SPARQL endpoint
///
/// The inner client is reused across calls; it keeps no state beyond its
/// connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    username: String,
    password: String,
}

impl HttpTransport {
    /// Create new HttpTransport
    ///
    /// # Example
    ///
    /// ```
    /// use traitbank_core::config::TraitBankConfig;
    /// use traitbank_core::drivers::HttpTransport;
    ///
    /// let transport = HttpTransport::new(&TraitBankConfig::default()).unwrap();
    /// ```
    pub fn new(config: &TraitBankConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    async fn into_transport_response(response: reqwest::Response) -> Result<TransportResponse> {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await?;

        Ok(TransportResponse::new(status.as_u16(), body).with_reason(reason))
    }
}

impl SparqlTransport for HttpTransport {
    async fn select(&self, endpoint: &str, query: &str) -> Result<TransportResponse> {
        let response = self
            .client
            .post(endpoint)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)])
            .send()
            .await?;

        Self::into_transport_response(response).await
    }

    async fn update(&self, endpoint: &str, body: &str, timeout: Duration) -> Result<TransportResponse> {
        let response = self
            .client
            .post(endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, SPARQL_QUERY)
            .timeout(timeout)
            .body(body.to_string())
            .send()
            .await?;

        Self::into_transport_response(response).await
    }
}
