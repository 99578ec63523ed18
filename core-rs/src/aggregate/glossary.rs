//! Glossary of URIs referenced by one result set

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::namespace::humanize;

use super::repository::{KnownUri, KnownUriRepository};

/// URI paired with its display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriComponents {
    pub uri: String,
    pub label: String,
}

/// Known-URI entries resolved once per aggregation pass
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: HashMap<String, KnownUri>,
}

impl Glossary {
    pub fn from_entries(entries: impl IntoIterator<Item = KnownUri>) -> Self {
        Self {
            entries: entries.into_iter().map(|known| (known.uri.clone(), known)).collect(),
        }
    }

    /// Resolve every distinct URI with a single repository call
    ///
    /// A failed lookup yields an empty glossary; labels then fall back to
    /// humanized URIs.
    pub async fn fetch<R, I, S>(repository: &R, uris: I) -> Self
    where
        R: KnownUriRepository,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = uris.into_iter().map(Into::into).collect();
        if distinct.is_empty() {
            return Self::default();
        }

        let uris: Vec<String> = distinct.into_iter().collect();
        match repository.find_by_uris(&uris).await {
            Ok(found) => {
                debug!(requested = uris.len(), found = found.len(), "glossary resolved");
                Self::from_entries(found)
            }
            Err(err) => {
                warn!(error = %err, requested = uris.len(), "glossary lookup failed, using URI labels");
                Self::default()
            }
        }
    }

    /// Add entries resolved by a later lookup
    pub fn merge(&mut self, other: Glossary) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, uri: &str) -> Option<&KnownUri> {
        self.entries.get(uri)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display label: the known name, a humanized URI tail, or the URI itself
    pub fn label(&self, uri: &str) -> String {
        if let Some(known) = self.get(uri) {
            return known.name.clone();
        }
        humanize(uri).unwrap_or_else(|| uri.to_string())
    }

    pub fn components(&self, uri: &str) -> UriComponents {
        UriComponents {
            uri: uri.to_string(),
            label: self.label(uri),
        }
    }

    /// Unit of measure for a unit URI or a measurement type implying one
    ///
    /// Returns `None` unless the resolved URI is a known unit.
    pub fn unit_components(&self, uri: &str) -> Option<UriComponents> {
        let implied = self
            .get(uri)
            .filter(|known| !known.is_unit_of_measure)
            .and_then(|known| known.has_unit_of_measure.as_deref());
        let unit_uri = implied.unwrap_or(uri);

        self.get(unit_uri)
            .filter(|known| known.is_unit_of_measure)
            .map(|known| UriComponents {
                uri: known.uri.clone(),
                label: known.name.clone(),
            })
    }
}
