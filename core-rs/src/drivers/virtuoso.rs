//! Triplestore client for the Virtuoso trait bank
//!
//! Reads go to the query endpoint and come back as typed rows. Bulk inserts
//! are chunked and posted strictly in sequence to the authenticated upload
//! endpoint; the first failing chunk stops the load.

use tracing::{debug, error, info, warn};

use crate::config::TraitBankConfig;
use crate::errors::{Result, TraitBankError};
use crate::namespace;
use crate::query::SparqlQuery;

use super::http::HttpTransport;
use super::results::{parse_results, Row};
use super::traits::SparqlTransport;

/// Graph namespace owned by EOL; the only one bulk drops may touch
pub const EOL_GRAPH_PREFIX: &str = "http://eol.org/";

/// Outcome of a chunked insert
#[derive(Debug)]
pub struct InsertReport {
    pub graph: String,
    pub total_batches: usize,
    /// Batches acknowledged by the store, counted from the first batch
    pub committed_batches: usize,
    pub skipped: Option<String>,
    pub failure: Option<TraitBankError>,
}

impl InsertReport {
    fn skipped(graph: &str, reason: &str) -> Self {
        Self {
            graph: graph.to_string(),
            total_batches: 0,
            committed_batches: 0,
            skipped: Some(reason.to_string()),
            failure: None,
        }
    }

    /// True only when every batch was committed
    pub fn succeeded(&self) -> bool {
        self.skipped.is_none() && self.failure.is_none() && self.committed_batches == self.total_batches
    }

    /// Batch index to pass to `insert_batch_from` to continue a failed load
    pub fn resume_from(&self) -> Option<usize> {
        match self.failure {
            Some(TraitBankError::BatchInsertFailure { .. }) => Some(self.committed_batches),
            _ => None,
        }
    }
}

/// Client for the trait bank triplestore
pub struct TripleStoreClient<T: SparqlTransport = HttpTransport> {
    transport: T,
    config: TraitBankConfig,
}

impl TripleStoreClient<HttpTransport> {
    /// Create a client speaking HTTP to the configured endpoints
    pub fn connect(config: &TraitBankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_transport(HttpTransport::new(config)?, config.clone()))
    }
}

impl<T: SparqlTransport> TripleStoreClient<T> {
    pub fn with_transport(transport: T, config: TraitBankConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &TraitBankConfig {
        &self.config
    }

    /// Run a read query and decode its rows
    ///
    /// Wire and store failures surface as `QueryExecution`; nothing is retried.
    pub async fn execute(&self, query: &SparqlQuery) -> Result<Vec<Row>> {
        let response = self
            .transport
            .select(&self.config.endpoint_uri, &query.with_prelude())
            .await?;

        if !response.is_success() {
            return Err(TraitBankError::QueryExecution(format!(
                "{} {} from {}: {}",
                response.status, response.reason, self.config.endpoint_uri, response.body
            )));
        }

        let rows = parse_results(&response.body)?;
        debug!(rows = rows.len(), endpoint = %self.config.endpoint_uri, "query executed");
        Ok(rows)
    }

    /// Insert triples into a graph in fixed-size batches
    pub async fn insert_batch(&self, triples: &[String], graph_name: &str) -> InsertReport {
        self.insert_batch_from(triples, graph_name, 0).await
    }

    /// Insert triples, skipping batches before `first_batch`
    ///
    /// Batches are posted one at a time. On the first rejected batch the full
    /// request context is logged and the remaining batches are not sent.
    /// Batches already committed stay committed; `InsertReport::resume_from`
    /// tells the caller where to continue.
    pub async fn insert_batch_from(
        &self,
        triples: &[String],
        graph_name: &str,
        first_batch: usize,
    ) -> InsertReport {
        if !self.config.data_enabled {
            info!(graph = graph_name, "data loading disabled, skipping insert");
            return InsertReport::skipped(graph_name, "data loading disabled");
        }
        if triples.is_empty() {
            info!(graph = graph_name, "no triples to insert");
            return InsertReport::skipped(graph_name, "no triples");
        }

        let batches: Vec<&[String]> = triples.chunks(self.config.insert_batch_size.max(1)).collect();
        let total_batches = batches.len();
        if first_batch >= total_batches {
            warn!(graph = graph_name, first_batch, total_batches, "first batch out of range, nothing sent");
            return InsertReport {
                graph: graph_name.to_string(),
                total_batches,
                committed_batches: 0,
                skipped: None,
                failure: Some(TraitBankError::BatchOutOfRange {
                    first_batch,
                    total_batches,
                }),
            };
        }

        let mut report = InsertReport {
            graph: graph_name.to_string(),
            total_batches,
            committed_batches: first_batch,
            skipped: None,
            failure: None,
        };
        let prelude = namespace::prelude();

        for (index, group) in batches.iter().enumerate().skip(first_batch) {
            info!(count = group.len(), batch = index + 1, total = total_batches, "inserting triples");

            let query = SparqlQuery::insert_data(graph_name, group);
            let body = format!("{} {}", prelude, query);
            let outcome = self
                .transport
                .update(&self.config.upload_uri, &body, self.config.insert_timeout())
                .await;

            let (status, message) = match outcome {
                Ok(response) if response.is_success() => {
                    report.committed_batches += 1;
                    continue;
                }
                Ok(response) => {
                    error!(
                        graph = graph_name,
                        uri = %self.config.upload_uri,
                        user = %self.config.username,
                        prefixes = %prelude,
                        query = %query,
                        status = response.status,
                        reason = %response.reason,
                        response_body = %response.body,
                        "SOME DATA FAILED TO LOAD IN VIRTUOSO"
                    );
                    (response.status, format!("{} {}", response.reason, response.body))
                }
                Err(err) => {
                    error!(
                        graph = graph_name,
                        uri = %self.config.upload_uri,
                        user = %self.config.username,
                        prefixes = %prelude,
                        query = %query,
                        error = %err,
                        "SOME DATA FAILED TO LOAD IN VIRTUOSO"
                    );
                    (0, err.to_string())
                }
            };

            report.failure = Some(TraitBankError::BatchInsertFailure {
                graph: graph_name.to_string(),
                batch: index,
                status,
                message,
            });
            return report;
        }

        report
    }

    /// Remove every triple of a graph
    pub async fn delete_graph(&self, graph_name: &str) -> Result<()> {
        let update = SparqlQuery::clear_graph(graph_name);
        let response = self
            .transport
            .update(&self.config.upload_uri, &update.with_prelude(), self.config.insert_timeout())
            .await?;

        if !response.is_success() {
            return Err(TraitBankError::QueryExecution(format!(
                "failed to clear graph {}: {} {}",
                graph_name, response.status, response.reason
            )));
        }

        info!(graph = graph_name, "graph cleared");
        Ok(())
    }

    /// Names of all non-empty graphs in the store
    ///
    /// Feeding this list into `delete_graph` unfiltered wipes the store; use
    /// `drop_graphs_with_prefix` instead.
    pub async fn list_graphs(&self) -> Result<Vec<String>> {
        let rows = self.execute(&SparqlQuery::all_graph_names()).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get_str("graph"))
            .map(str::to_string)
            .collect())
    }

    /// Clear every graph whose name starts with `prefix`
    ///
    /// Returns the cleared graph names. An empty prefix is rejected.
    pub async fn drop_graphs_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        if prefix.is_empty() {
            return Err(TraitBankError::MissingRequiredOption("prefix"));
        }

        let mut dropped = Vec::new();
        for graph_name in self.list_graphs().await? {
            if !graph_name.starts_with(prefix) {
                continue;
            }
            warn!(graph = %graph_name, "dropping graph");
            self.delete_graph(&graph_name).await?;
            dropped.push(graph_name);
        }

        Ok(dropped)
    }
}
