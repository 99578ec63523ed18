//! Assembly of query rows into traits with their pages, glossary and sources
//!
//! ## Pipeline
//!
//! ```text
//! rows ──group_by_subject──> groups ──> page ids ──(1 bulk fetch)──> pages
//!   │                                   all URIs ──(1 bulk fetch)──> glossary
//!   └──> traits ──> source ids ──(1 bulk fetch)──> sources
//! ```
//!
//! ## Row shapes
//!
//! - property rows (`trait_predicate` / `value`, clade scan): one row per
//!   property; `meta_predicate` / `meta_value` describe the trait-valued
//!   `value`, never the trait itself
//! - metadata rows (`parent_uri` / `attribute` / `value`): each row is one
//!   metadata entry of `parent_uri`
//! - data point rows (`attribute`, `value`, `unit_of_measure_uri`, ...):
//!   one row per measurement or association; associations also carry
//!   `target_taxon_concept_id` and `inverse_attribute`

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::TraitBankConfig;
use crate::drivers::Row;
use crate::entity::EntityId;
use crate::errors::Result;

use super::glossary::{Glossary, UriComponents};
use super::grouping::group_by_subject;
use super::ranges::{RangeAggregate, RangeSet};
use super::repository::{KnownUriRepository, Resource, ResourceRepository, TaxonConcept, TaxonRepository};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const MEASUREMENT_TYPE: &str = "http://rs.tdwg.org/dwc/terms/measurementType";
const MEASUREMENT_VALUE: &str = "http://rs.tdwg.org/dwc/terms/measurementValue";
const MEASUREMENT_UNIT: &str = "http://rs.tdwg.org/dwc/terms/measurementUnit";
const STATISTICAL_METHOD: &str = "http://eol.org/schema/terms/statisticalMethod";
const LIFE_STAGE: &str = "http://rs.tdwg.org/dwc/terms/lifeStage";
const SEX: &str = "http://rs.tdwg.org/dwc/terms/sex";
const DC_SOURCE: &str = "http://purl.org/dc/terms/source";

static RESOURCE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/resources/(\d+)").expect("static regex"));

/// Default variable holding the page (taxon concept) URI
pub const PAGE_VARIABLE: &str = "page";

/// Variable holding the target page of an association
pub const TARGET_VARIABLE: &str = "target_taxon_concept_id";

/// Variable naming the trait a metadata row belongs to
pub const PARENT_VARIABLE: &str = "parent_uri";

/// One metadata entry of a trait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadatum {
    pub predicate: String,
    pub value: String,
    pub units: Option<String>,
}

/// Property of a trait-valued property, one level deep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedProperty {
    /// URI of the trait the property describes
    pub value_uri: String,
    pub predicate: String,
    pub value: String,
}

/// One aggregated data point: a measurement or an association
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trait {
    pub uri: String,
    pub page_id: Option<EntityId>,
    pub predicate: Option<String>,
    pub value: Option<String>,
    pub units: Option<String>,
    pub statistical_method: Option<String>,
    pub life_stage: Option<String>,
    pub sex: Option<String>,
    pub source_id: Option<EntityId>,
    /// Page at the other end of an association
    pub target_page_id: Option<EntityId>,
    /// Association type as seen from the target
    pub inverse_predicate: Option<String>,
    /// First-seen order, no duplicates
    pub metadata: Vec<Metadatum>,
    pub nested: Vec<NestedProperty>,
}

impl Trait {
    fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            ..Self::default()
        }
    }

    fn set_source(&mut self, value: &str) {
        if self.source_id.is_none() {
            self.source_id = RESOURCE_ID
                .captures(value)
                .map(|caps| EntityId::from(&caps[1]));
        }
    }

    fn push_metadata(&mut self, predicate: &str, value: &str, units: Option<&str>) -> bool {
        let entry = Metadatum {
            predicate: predicate.to_string(),
            value: value.to_string(),
            units: units.map(str::to_string),
        };
        if self.metadata.contains(&entry) {
            return false;
        }
        self.metadata.push(entry);
        true
    }

    fn push_nested(&mut self, value_uri: &str, predicate: &str, value: &str) {
        let property = NestedProperty {
            value_uri: value_uri.to_string(),
            predicate: predicate.to_string(),
            value: value.to_string(),
        };
        if !self.nested.contains(&property) {
            self.nested.push(property);
        }
    }

    fn absorb_property(&mut self, predicate: &str, value: &str) {
        match predicate {
            RDF_TYPE => {}
            MEASUREMENT_TYPE => {
                self.predicate.get_or_insert_with(|| value.to_string());
            }
            MEASUREMENT_VALUE => {
                self.value.get_or_insert_with(|| value.to_string());
            }
            MEASUREMENT_UNIT => {
                self.units.get_or_insert_with(|| value.to_string());
            }
            STATISTICAL_METHOD => {
                self.statistical_method.get_or_insert_with(|| value.to_string());
            }
            LIFE_STAGE => {
                self.life_stage.get_or_insert_with(|| value.to_string());
            }
            SEX => {
                self.sex.get_or_insert_with(|| value.to_string());
            }
            DC_SOURCE => {
                self.set_source(value);
                self.push_metadata(predicate, value, None);
            }
            _ => {
                self.push_metadata(predicate, value, None);
            }
        }
    }

    fn absorb_metadata_row(&mut self, row: &Row) -> bool {
        match (row.get_str("attribute"), row.get_str("value")) {
            (Some(attribute), Some(value)) => {
                self.push_metadata(attribute, value, row.get_str("unit_of_measure_uri"))
            }
            _ => false,
        }
    }

    fn absorb_row(&mut self, row: &Row) {
        if let (Some(predicate), Some(value)) = (row.get_str("trait_predicate"), row.get_str("value")) {
            self.absorb_property(predicate, value);
            if let (Some(meta_predicate), Some(meta_value)) =
                (row.get_str("meta_predicate"), row.get_str("meta_value"))
            {
                self.push_nested(value, meta_predicate, meta_value);
            }
        } else if row.get(PARENT_VARIABLE).is_some() {
            self.absorb_metadata_row(row);
        } else {
            let columns = [
                ("attribute", MEASUREMENT_TYPE),
                ("value", MEASUREMENT_VALUE),
                ("unit_of_measure_uri", MEASUREMENT_UNIT),
                ("statistical_method", STATISTICAL_METHOD),
                ("life_stage", LIFE_STAGE),
                ("sex", SEX),
            ];
            for (column, predicate) in columns {
                if let Some(value) = row.get_str(column) {
                    self.absorb_property(predicate, value);
                }
            }
            if let Some(inverse) = row.get_str("inverse_attribute") {
                self.inverse_predicate.get_or_insert_with(|| inverse.to_string());
            }
        }

        if let Some(graph) = row.get_str("graph") {
            self.set_source(graph);
        }
    }

    /// True when the data point links two pages
    pub fn is_association(&self) -> bool {
        self.target_page_id.is_some() || self.inverse_predicate.is_some()
    }

    /// Properties of the trait-valued property `value_uri`
    pub fn nested_properties<'t>(&'t self, value_uri: &'t str) -> impl Iterator<Item = &'t NestedProperty> {
        self.nested.iter().filter(move |property| property.value_uri == value_uri)
    }

    /// Display label of the measured attribute
    pub fn predicate_label(&self, glossary: &Glossary) -> Option<String> {
        self.predicate.as_deref().map(|uri| glossary.label(uri))
    }

    /// Unit of the value: explicit, or implied by the attribute
    pub fn unit_components(&self, glossary: &Glossary) -> Option<UriComponents> {
        self.units
            .as_deref()
            .or(self.predicate.as_deref())
            .and_then(|uri| glossary.unit_components(uri))
    }
}

/// Traits of one search plus everything they reference
#[derive(Debug, Clone, Default)]
pub struct TraitSet {
    traits: Vec<Trait>,
    pages: HashMap<EntityId, TaxonConcept>,
    sources: HashMap<EntityId, Resource>,
    glossary: Glossary,
}

impl TraitSet {
    pub fn traits(&self) -> &[Trait] {
        &self.traits
    }

    pub fn into_traits(self) -> Vec<Trait> {
        self.traits
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn get(&self, uri: &str) -> Option<&Trait> {
        self.traits.iter().find(|item| item.uri == uri)
    }

    pub fn associations(&self) -> impl Iterator<Item = &Trait> {
        self.traits.iter().filter(|item| item.is_association())
    }

    pub fn page(&self, id: &EntityId) -> Option<&TaxonConcept> {
        self.pages.get(id)
    }

    pub fn pages(&self) -> impl Iterator<Item = &TaxonConcept> {
        self.pages.values()
    }

    pub fn source(&self, id: &EntityId) -> Option<&Resource> {
        self.sources.get(id)
    }

    pub fn sources(&self) -> impl Iterator<Item = &Resource> {
        self.sources.values()
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn page_of(&self, item: &Trait) -> Option<&TaxonConcept> {
        item.page_id.as_ref().and_then(|id| self.page(id))
    }

    pub fn target_page_of(&self, item: &Trait) -> Option<&TaxonConcept> {
        item.target_page_id.as_ref().and_then(|id| self.page(id))
    }

    pub fn source_of(&self, item: &Trait) -> Option<&Resource> {
        item.source_id.as_ref().and_then(|id| self.source(id))
    }

    /// Append metadata rows to the traits named by their `parent_uri`
    ///
    /// Returns the number of new entries. Rows for unknown traits are ignored.
    pub fn attach_metadata(&mut self, rows: &[Row]) -> usize {
        let index: HashMap<String, usize> = self
            .traits
            .iter()
            .enumerate()
            .map(|(at, item)| (item.uri.clone(), at))
            .collect();

        let mut attached = 0;
        for row in rows {
            let Some(&at) = row.get_str(PARENT_VARIABLE).and_then(|uri| index.get(uri)) else {
                continue;
            };
            if self.traits[at].absorb_metadata_row(row) {
                attached += 1;
            }
        }
        attached
    }
}

/// Builds trait sets from rows using the bulk lookup collaborators
pub struct TraitAssembler<'a, P, K, S> {
    pages: &'a P,
    known_uris: &'a K,
    resources: &'a S,
    page_pattern: Regex,
    page_variable: String,
}

impl<'a, P, K, S> TraitAssembler<'a, P, K, S>
where
    P: TaxonRepository,
    K: KnownUriRepository,
    S: ResourceRepository,
{
    /// Create an assembler recognising page URIs under the configured taxon prefix
    pub fn new(config: &TraitBankConfig, pages: &'a P, known_uris: &'a K, resources: &'a S) -> Result<Self> {
        let page_pattern = Regex::new(&format!(r"^{}(\d+)$", regex::escape(&config.taxon_prefix)))?;

        Ok(Self {
            pages,
            known_uris,
            resources,
            page_pattern,
            page_variable: PAGE_VARIABLE.to_string(),
        })
    }

    /// Read page URIs from another variable, e.g. `taxon_concept_id`
    pub fn with_page_variable(mut self, variable: impl Into<String>) -> Self {
        self.page_variable = variable.into();
        self
    }

    /// Entity id of a page URI, if it follows the taxon URI template
    pub fn page_id(&self, uri: &str) -> Option<EntityId> {
        self.page_pattern
            .captures(uri)
            .map(|caps| EntityId::from(&caps[1]))
    }

    fn page_id_of(&self, subject: &str, row: &Row, variable: &str) -> Option<EntityId> {
        let uri = row.get_str(variable)?;
        let id = self.page_id(uri);
        if id.is_none() {
            debug!(subject, page = uri, variable, "page URI does not match taxon template");
        }
        id
    }

    /// Group rows by `subject_var` and resolve everything they reference
    ///
    /// `predicate` is the searched attribute; it is attached to every trait
    /// lacking its own and included in the glossary lookup. Association
    /// targets share the single page lookup with the traits' own pages.
    pub async fn build(&self, rows: &[Row], subject_var: &str, predicate: Option<&str>) -> TraitSet {
        let groups = group_by_subject(rows, subject_var);

        let mut traits = Vec::with_capacity(groups.len());
        let mut page_ids = BTreeSet::new();
        for group in &groups {
            let mut item = Trait::new(&group.subject);
            for row in &group.rows {
                if item.page_id.is_none() {
                    item.page_id = self.page_id_of(&group.subject, row, &self.page_variable);
                }
                if item.target_page_id.is_none() {
                    item.target_page_id = self.page_id_of(&group.subject, row, TARGET_VARIABLE);
                }
                item.absorb_row(row);
            }
            if let Some(predicate) = predicate {
                item.predicate.get_or_insert_with(|| predicate.to_string());
            }
            page_ids.extend(item.page_id.iter().chain(&item.target_page_id).cloned());
            traits.push(item);
        }

        let pages = self.fetch_pages(page_ids.into_iter().collect()).await;

        let uris = rows
            .iter()
            .flat_map(|row| row.uris())
            .chain(predicate)
            .map(str::to_string);
        let glossary = Glossary::fetch(self.known_uris, uris).await;

        let source_ids: BTreeSet<EntityId> = traits.iter().filter_map(|t| t.source_id.clone()).collect();
        let sources = self.fetch_sources(source_ids.into_iter().collect()).await;

        debug!(
            rows = rows.len(),
            traits = traits.len(),
            pages = pages.len(),
            glossary = glossary.len(),
            sources = sources.len(),
            "trait set assembled"
        );

        TraitSet {
            traits,
            pages,
            sources,
            glossary,
        }
    }

    /// Attach metadata rows to an assembled set
    ///
    /// URIs the set's glossary lacks are resolved with one more lookup.
    pub async fn attach_metadata(&self, set: &mut TraitSet, rows: &[Row]) -> usize {
        let attached = set.attach_metadata(rows);

        let unseen: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.uris())
            .filter(|uri| set.glossary.get(uri).is_none())
            .collect();
        let resolved = Glossary::fetch(self.known_uris, unseen).await;
        set.glossary.merge(resolved);

        debug!(rows = rows.len(), attached, "metadata attached");
        attached
    }

    /// Parse range aggregate rows and label their attributes and units
    pub async fn build_ranges(&self, rows: &[Row]) -> RangeSet {
        let ranges: Vec<RangeAggregate> = rows
            .iter()
            .filter_map(|row| {
                let range = RangeAggregate::from_row(row);
                if range.is_none() {
                    debug!("range row without attribute skipped");
                }
                range
            })
            .collect();

        let uris = ranges
            .iter()
            .flat_map(|range| std::iter::once(range.attribute.as_str()).chain(range.units.as_deref()));
        let glossary = Glossary::fetch(self.known_uris, uris).await;

        RangeSet::new(ranges, glossary)
    }

    async fn fetch_pages(&self, ids: Vec<EntityId>) -> HashMap<EntityId, TaxonConcept> {
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.pages.find_by_ids(&ids).await {
            Ok(found) => found.into_iter().map(|page| (page.id.clone(), page)).collect(),
            Err(err) => {
                warn!(error = %err, requested = ids.len(), "page lookup failed, traits left without pages");
                HashMap::new()
            }
        }
    }

    async fn fetch_sources(&self, ids: Vec<EntityId>) -> HashMap<EntityId, Resource> {
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.resources.find_by_ids(&ids).await {
            Ok(found) => found.into_iter().map(|source| (source.id.clone(), source)).collect(),
            Err(err) => {
                warn!(error = %err, requested = ids.len(), "source lookup failed, traits left unattributed");
                HashMap::new()
            }
        }
    }
}
