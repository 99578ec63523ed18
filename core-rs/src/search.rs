//! Trait search: options in, assembled trait set out
//!
//! ```text
//! TraitSearch ──plan──> clade_scan query ──execute──> rows ──build──> TraitSet
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{KnownUriRepository, ResourceRepository, TaxonRepository, TraitAssembler, TraitSet};
use crate::drivers::{SparqlTransport, TripleStoreClient};
use crate::entity::EntityId;
use crate::errors::{Result, TraitBankError};
use crate::namespace::{Expanded, NamespaceResolver};
use crate::query::{QueryBuilder, SparqlQuery};

/// Row variable identifying each trait in scan results
pub const TRAIT_VARIABLE: &str = "trait";

/// Options of one trait search, as submitted by the web layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitSearch {
    #[serde(default)]
    pub querystring: Option<String>,
    /// Attribute (predicate) URI; required
    #[serde(default)]
    pub attribute: Option<String>,
    /// Restrict to descendants of this taxon concept
    #[serde(default)]
    pub clade: Option<EntityId>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl TraitSearch {
    pub fn for_attribute(attribute: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            ..Self::default()
        }
    }

    pub fn within_clade(mut self, clade: impl Into<EntityId>) -> Self {
        self.clade = Some(clade.into());
        self
    }

    pub fn with_querystring(mut self, querystring: impl Into<String>) -> Self {
        self.querystring = Some(querystring.into());
        self
    }

    pub fn paginate(mut self, limit: u32, offset: Option<u32>) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    fn attribute(&self) -> Result<&str> {
        match self.attribute.as_deref().map(str::trim) {
            Some(attribute) if !attribute.is_empty() => Ok(attribute),
            _ => Err(TraitBankError::MissingRequiredOption("attribute")),
        }
    }

    /// Full URI of the searched attribute
    pub fn attribute_uri(&self) -> Result<String> {
        match NamespaceResolver::expand(self.attribute()?)? {
            Expanded::Uri(uri) => Ok(uri.trim_start_matches('<').trim_end_matches('>').to_string()),
            Expanded::Literal(literal) => Err(TraitBankError::Unsupported(format!(
                "attribute must be a URI, got '{}'",
                literal
            ))),
        }
    }

    /// Choose the query for these options
    ///
    /// Fails before any network call when the attribute is missing or a
    /// free-text querystring is given.
    ///
    /// # Example
    ///
    /// ```
    /// use traitbank_core::config::TraitBankConfig;
    /// use traitbank_core::query::QueryBuilder;
    /// use traitbank_core::search::TraitSearch;
    ///
    /// let config = TraitBankConfig::default();
    /// let search = TraitSearch::for_attribute("http://purl.obolibrary.org/obo/OBA_0000056").within_clade(37);
    /// let query = search.plan(&QueryBuilder::new(&config)).unwrap();
    /// assert!(query.as_str().contains("eol:has_ancestor <http://eol.org/pages/37>"));
    /// ```
    pub fn plan(&self, builder: &QueryBuilder<'_>) -> Result<SparqlQuery> {
        let attribute = self.attribute()?;

        if self.querystring.as_deref().is_some_and(|q| !q.trim().is_empty()) {
            return Err(TraitBankError::Unsupported(
                "querystring search is not supported".to_string(),
            ));
        }

        builder.clade_scan(attribute, self.clade.as_ref(), self.limit, self.offset)
    }

    /// Plan, execute and assemble the search
    pub async fn run<T, P, K, S>(
        &self,
        client: &TripleStoreClient<T>,
        assembler: &TraitAssembler<'_, P, K, S>,
    ) -> Result<TraitSet>
    where
        T: SparqlTransport,
        P: TaxonRepository,
        K: KnownUriRepository,
        S: ResourceRepository,
    {
        let query = self.plan(&QueryBuilder::new(client.config()))?;
        let predicate = self.attribute_uri()?;

        let rows = client.execute(&query).await?;
        let traits = assembler.build(&rows, TRAIT_VARIABLE, Some(predicate.as_str())).await;

        info!(
            attribute = %predicate,
            clade = ?self.clade,
            rows = rows.len(),
            traits = traits.len(),
            "trait search complete"
        );
        Ok(traits)
    }
}
