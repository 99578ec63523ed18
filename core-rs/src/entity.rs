//! Entity identifiers and kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key of a taxonomic concept or other site entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(u64),
    Str(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{}", id),
            EntityId::Str(id) => f.write_str(id),
        }
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        EntityId::Int(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        match id.parse::<u64>() {
            Ok(n) => EntityId::Int(n),
            Err(_) => EntityId::Str(id.to_string()),
        }
    }
}

/// Closed set of linkable site entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Collection,
    Community,
    DataObject,
    User,
    TaxonConcept,
}

impl EntityKind {
    fn path_segment(self) -> &'static str {
        match self {
            EntityKind::Collection => "collections",
            EntityKind::Community => "communities",
            EntityKind::DataObject => "data_objects",
            EntityKind::User => "users",
            EntityKind::TaxonConcept => "pages",
        }
    }

    /// Canonical URL of an entity
    ///
    /// # Examples
    ///
    /// ```
    /// use traitbank_core::entity::{EntityId, EntityKind};
    ///
    /// let url = EntityKind::TaxonConcept.url("http://eol.org", &EntityId::Int(1));
    /// assert_eq!(url, "http://eol.org/pages/1");
    /// ```
    pub fn url(self, base: &str, id: &EntityId) -> String {
        format!("{}/{}/{}", base.trim_end_matches('/'), self.path_segment(), id)
    }

    /// URL of the entity's newsfeed; data objects and taxa have none of their own
    pub fn newsfeed_url(self, base: &str, id: &EntityId) -> String {
        match self {
            EntityKind::Collection | EntityKind::Community | EntityKind::User => {
                format!("{}/newsfeed", self.url(base, id))
            }
            EntityKind::DataObject | EntityKind::TaxonConcept => self.url(base, id),
        }
    }
}

/// A taxon concept addressed through the configured taxon URI prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonScope {
    prefix: String,
    id: EntityId,
}

impl TaxonScope {
    pub fn new(prefix: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            prefix: prefix.into(),
            id: id.into(),
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Full taxon URI, e.g. `http://eol.org/pages/42`
    pub fn uri(&self) -> String {
        format!("{}{}", self.prefix, self.id)
    }
}
