/**
 * config.rs
 * Trait bank connection and query settings (YAML format)
 *
 * Format:
 * ```yaml
 * endpointUri: http://localhost:8890/sparql
 * uploadUri: http://localhost:8890/sparql-auth
 * username: dba
 * password: dba
 * taxonPrefix: http://eol.org/pages/
 * aggregatableAttributes:
 *   - http://purl.obolibrary.org/obo/VT_0001259
 * insertBatchSize: 5000
 * ```
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::entity::{EntityId, TaxonScope};
use crate::errors::{Result, TraitBankError};

pub const DEFAULT_TAXON_PREFIX: &str = "http://eol.org/pages/";
pub const DEFAULT_URI_TRUE: &str = "http://eol.org/schema/terms/true";
pub const DEFAULT_TRAITBANK_GRAPH: &str = "http://eol.org/traitbank";
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 5_000;

fn default_taxon_prefix() -> String {
    DEFAULT_TAXON_PREFIX.to_string()
}

fn default_uri_true() -> String {
    DEFAULT_URI_TRUE.to_string()
}

fn default_traitbank_graph() -> String {
    DEFAULT_TRAITBANK_GRAPH.to_string()
}

fn default_insert_batch_size() -> usize {
    DEFAULT_INSERT_BATCH_SIZE
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_insert_timeout_secs() -> u64 {
    240
}

fn default_data_enabled() -> bool {
    true
}

/// Settings shared by the query builder, client and aggregator
///
/// Built once at startup and passed by reference.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraitBankConfig {
    /// Read endpoint
    pub endpoint_uri: String,
    /// Authenticated insert/update endpoint
    pub upload_uri: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_taxon_prefix")]
    pub taxon_prefix: String,
    #[serde(default = "default_uri_true")]
    pub uri_true: String,
    #[serde(default = "default_traitbank_graph")]
    pub traitbank_graph: String,
    /// Attributes eligible for clade range aggregation
    #[serde(default)]
    pub aggregatable_attributes: Vec<String>,
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_insert_timeout_secs")]
    pub insert_timeout_secs: u64,
    /// When false, inserts are skipped
    #[serde(default = "default_data_enabled")]
    pub data_enabled: bool,
}

impl fmt::Debug for TraitBankConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraitBankConfig")
            .field("endpoint_uri", &self.endpoint_uri)
            .field("upload_uri", &self.upload_uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("taxon_prefix", &self.taxon_prefix)
            .field("uri_true", &self.uri_true)
            .field("traitbank_graph", &self.traitbank_graph)
            .field("aggregatable_attributes", &self.aggregatable_attributes)
            .field("insert_batch_size", &self.insert_batch_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("insert_timeout_secs", &self.insert_timeout_secs)
            .field("data_enabled", &self.data_enabled)
            .finish()
    }
}

impl Default for TraitBankConfig {
    fn default() -> Self {
        Self {
            endpoint_uri: "http://localhost:8890/sparql".to_string(),
            upload_uri: "http://localhost:8890/sparql-auth".to_string(),
            username: "dba".to_string(),
            password: String::new(),
            taxon_prefix: default_taxon_prefix(),
            uri_true: default_uri_true(),
            traitbank_graph: default_traitbank_graph(),
            aggregatable_attributes: Vec::new(),
            insert_batch_size: default_insert_batch_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
            insert_timeout_secs: default_insert_timeout_secs(),
            data_enabled: default_data_enabled(),
        }
    }
}

impl TraitBankConfig {
    /// Load settings from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TraitBankError::Config(format!(
                "config file not found: {}",
                path.to_string_lossy()
            )));
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate settings from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: TraitBankConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Ensures endpoints are present and the batch size is usable
    pub fn validate(&self) -> Result<()> {
        if self.endpoint_uri.is_empty() {
            return Err(TraitBankError::Config("endpointUri cannot be empty".to_string()));
        }

        if self.upload_uri.is_empty() {
            return Err(TraitBankError::Config("uploadUri cannot be empty".to_string()));
        }

        if self.insert_batch_size == 0 {
            return Err(TraitBankError::Config("insertBatchSize must be positive".to_string()));
        }

        if self.taxon_prefix.is_empty() {
            return Err(TraitBankError::Config("taxonPrefix cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Scope a taxon concept id against the configured prefix
    pub fn taxon(&self, id: impl Into<EntityId>) -> TaxonScope {
        TaxonScope::new(self.taxon_prefix.clone(), id)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn insert_timeout(&self) -> Duration {
        Duration::from_secs(self.insert_timeout_secs)
    }
}
