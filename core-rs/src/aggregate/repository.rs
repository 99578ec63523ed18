//! Bulk lookup collaborators
//!
//! The aggregator never fetches records one at a time. Every trait here takes
//! the full id/URI set of one aggregation pass.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::errors::LookupError;

/// Taxonomic concept (a "page")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonConcept {
    pub id: EntityId,
    pub scientific_name: Option<String>,
}

/// Ontology entry for a URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownUri {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub is_unit_of_measure: bool,
    /// Unit implied by a measurement type, e.g. body mass implies grams
    #[serde(default)]
    pub has_unit_of_measure: Option<String>,
}

/// Data source a trait is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: EntityId,
    pub title: String,
    pub content_partner: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait TaxonRepository: Send + Sync {
    async fn find_by_ids(&self, ids: &[EntityId]) -> Result<Vec<TaxonConcept>, LookupError>;

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<TaxonConcept>, LookupError> {
        let found = self.find_by_ids(std::slice::from_ref(id)).await?;
        Ok(found.into_iter().find(|taxon| &taxon.id == id))
    }
}

#[allow(async_fn_in_trait)]
pub trait KnownUriRepository: Send + Sync {
    async fn find_by_uris(&self, uris: &[String]) -> Result<Vec<KnownUri>, LookupError>;
}

#[allow(async_fn_in_trait)]
pub trait ResourceRepository: Send + Sync {
    async fn find_by_ids(&self, ids: &[EntityId]) -> Result<Vec<Resource>, LookupError>;
}
