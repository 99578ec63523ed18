/**
 * sparql.rs
 * Query types and builders for the trait bank triplestore
 */

use std::fmt;

use crate::config::TraitBankConfig;
use crate::entity::EntityId;
use crate::errors::{Result, TraitBankError};
use crate::namespace::{self, Expanded, NamespaceResolver};

use super::options::{QueryOptions, SortDirection};

/// Row cap of the per-page measurement and association queries
pub const PAGE_QUERY_LIMIT: u32 = 800;

/// Global Genome Initiative count attributes
pub const GGI_URIS: &[&str] = &[
    "http://eol.org/schema/terms/NumberRichSpeciesPagesInEOL",
    "http://eol.org/schema/terms/NumberOfSequencesInGenBank",
    "http://eol.org/schema/terms/NumberRecordsInGBIF",
    "http://eol.org/schema/terms/NumberRecordsInBOLD",
    "http://eol.org/schema/terms/NumberPublicRecordsInBOLD",
    "http://eol.org/schema/terms/NumberSpecimensInGGBN",
    "http://eol.org/schema/terms/NumberReferencesInBHL",
];

pub const CONSERVATION_STATUS_URI: &str =
    "http://rs.tdwg.org/ontology/voc/SPMInfoItems#ConservationStatus";

/// Structural predicates never surfaced as metadata
pub const METADATA_BLOCKLIST: &[&str] = &[
    "rdf:type",
    "dwc:taxonConceptID",
    "dwc:measurementType",
    "dwc:measurementValue",
    "dwc:measurementID",
    "eolreference:referenceID",
    "eol:targetOccurrenceID",
    "dwc:taxonID",
    "dwc:eventID",
    "eol:associationType",
    "dwc:measurementUnit",
    "dwc:occurrenceID",
    "eol:measurementOfTaxon",
];

/// Numeric cast of a measurement value, ignoring thousands separators
pub const NUMERIC_VALUE_EXPR: &str = r#"xsd:float(REPLACE(?value, ",", ""))"#;

/// Immutable query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// Query text preceded by the namespace PREFIX declarations
    pub fn with_prelude(&self) -> String {
        format!("{}\n{}", namespace::prelude(), self.query)
    }

    /// Names of every graph holding at least one triple
    pub fn all_graph_names() -> Self {
        Self::new("SELECT ?graph WHERE { GRAPH ?graph { ?s ?p ?o } } GROUP BY ?graph")
    }

    /// Update removing every triple of a graph
    pub fn clear_graph(graph_name: &str) -> Self {
        Self::new(format!("CLEAR GRAPH <{}>", graph_name))
    }

    /// Insert statement for one batch of triples
    ///
    /// # Example
    ///
    /// ```
    /// use traitbank_core::query::SparqlQuery;
    ///
    /// let triples = vec!["<http://a> <http://b> \"1\"".to_string()];
    /// let query = SparqlQuery::insert_data("http://eol.org/resources/1", &triples);
    /// assert!(query.as_str().starts_with("INSERT DATA INTO <http://eol.org/resources/1>"));
    /// ```
    pub fn insert_data(graph_name: &str, triples: &[String]) -> Self {
        Self::new(format!(
            "INSERT DATA INTO <{}> {{ {} }}",
            graph_name,
            triples.join(" .\n")
        ))
    }
}

impl fmt::Display for SparqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

/// Render a URI-shaped value as an IRI reference
fn iri(value: &str) -> Result<String> {
    match NamespaceResolver::expand(value)? {
        Expanded::Uri(uri) if uri.starts_with('<') => Ok(uri),
        Expanded::Uri(uri) => Ok(format!("<{}>", uri)),
        Expanded::Literal(literal) => Err(TraitBankError::Unsupported(format!(
            "expected a URI, got literal '{}'",
            literal
        ))),
    }
}

/// Builds the trait bank query shapes from one shared configuration
pub struct QueryBuilder<'a> {
    config: &'a TraitBankConfig,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(config: &'a TraitBankConfig) -> Self {
        Self { config }
    }

    fn taxon_uri(&self, id: &EntityId) -> String {
        self.config.taxon(id.clone()).uri()
    }

    /// Measurements attached to a taxon directly or through its occurrences
    ///
    /// # Example
    ///
    /// ```
    /// use traitbank_core::config::TraitBankConfig;
    /// use traitbank_core::entity::EntityId;
    /// use traitbank_core::query::QueryBuilder;
    ///
    /// let config = TraitBankConfig::default();
    /// let query = QueryBuilder::new(&config).measurements(&EntityId::Int(123));
    /// assert!(query.as_str().contains("<http://eol.org/pages/123>"));
    /// assert!(query.as_str().contains("LIMIT 800"));
    /// ```
    pub fn measurements(&self, taxon_concept: &EntityId) -> SparqlQuery {
        SparqlQuery::new(format!(
            r#"SELECT DISTINCT ?attribute ?value ?unit_of_measure_uri
  ?statistical_method ?life_stage ?sex ?data_point_uri ?graph
  ?taxon_concept_id
WHERE {{
  GRAPH ?graph {{
    ?data_point_uri dwc:measurementType ?attribute .
    ?data_point_uri dwc:measurementValue ?value .
    OPTIONAL {{ ?data_point_uri dwc:measurementUnit ?unit_of_measure_uri }} .
    OPTIONAL {{ ?data_point_uri eolterms:statisticalMethod ?statistical_method }} .
  }} .
  {{
    ?data_point_uri dwc:taxonConceptID ?taxon_concept_id .
    OPTIONAL {{ ?data_point_uri dwc:lifeStage ?life_stage }} .
    OPTIONAL {{ ?data_point_uri dwc:sex ?sex }}
  }}
  UNION {{
    ?data_point_uri dwc:occurrenceID ?occurrence .
    ?occurrence dwc:taxonID ?taxon .
    ?data_point_uri eol:measurementOfTaxon eolterms:true .
    GRAPH ?resource_mappings_graph {{
      ?taxon dwc:taxonConceptID ?taxon_concept_id
    }}
    OPTIONAL {{ ?occurrence dwc:lifeStage ?life_stage }} .
    OPTIONAL {{ ?occurrence dwc:sex ?sex }}
  }}
  FILTER ( ?taxon_concept_id = <{}> )
}}
LIMIT {}"#,
            self.taxon_uri(taxon_concept),
            PAGE_QUERY_LIMIT
        ))
    }

    /// Association edges from a taxon, in both directions
    pub fn associations(&self, taxon_concept: &EntityId) -> SparqlQuery {
        SparqlQuery::new(format!(
            r#"SELECT DISTINCT ?attribute ?value ?target_taxon_concept_id
  ?inverse_attribute ?data_point_uri ?graph
WHERE {{
  GRAPH ?resource_mappings_graph {{
    ?taxon dwc:taxonConceptID ?source_taxon_concept_id .
    FILTER ( ?source_taxon_concept_id = <{}> ) .
    ?value dwc:taxonConceptID ?target_taxon_concept_id
  }} .
  GRAPH ?graph {{
    ?occurrence dwc:taxonID ?taxon .
    ?target_occurrence dwc:taxonID ?value .
    {{
      ?data_point_uri dwc:occurrenceID ?occurrence .
      ?data_point_uri eol:targetOccurrenceID ?target_occurrence .
      ?data_point_uri eol:associationType ?attribute
    }}
    UNION
    {{
      ?data_point_uri dwc:occurrenceID ?target_occurrence .
      ?data_point_uri eol:targetOccurrenceID ?occurrence .
      ?data_point_uri eol:associationType ?inverse_attribute
    }}
  }} .
  OPTIONAL {{
    GRAPH ?mappings {{
      ?inverse_attribute owl:inverseOf ?attribute
    }}
  }}
}}
LIMIT {}"#,
            self.taxon_uri(taxon_concept),
            PAGE_QUERY_LIMIT
        ))
    }

    /// Min/max/count aggregates over every descendant of a taxon
    ///
    /// Only the configured aggregatable attributes are considered; an empty
    /// allow-list is rejected before any query is built.
    pub fn ranges(&self, taxon_concept: &EntityId) -> Result<SparqlQuery> {
        if self.config.aggregatable_attributes.is_empty() {
            return Err(TraitBankError::MissingRequiredOption("aggregatableAttributes"));
        }

        let allowed = self
            .config
            .aggregatable_attributes
            .iter()
            .map(|uri| iri(uri).map(|iri| format!("IRI({})", iri)))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        Ok(SparqlQuery::new(format!(
            r#"SELECT ?attribute
  (COUNT(DISTINCT ?descendant_concept_id) AS ?count_taxa)
  (COUNT(DISTINCT ?data_point_uri) AS ?count_measurements)
  (MIN(xsd:float(?value)) AS ?min)
  (MAX(xsd:float(?value)) AS ?max)
  ?unit_of_measure_uri
WHERE {{
  ?parent_taxon dwc:taxonConceptID <{}> .
  ?t dwc:parentNameUsageID+ ?parent_taxon .
  ?t dwc:taxonConceptID ?descendant_concept_id .
  ?occurrence dwc:taxonID ?taxon .
  ?taxon dwc:taxonConceptID ?descendant_concept_id .
  ?data_point_uri dwc:occurrenceID ?occurrence .
  ?data_point_uri eol:measurementOfTaxon ?measurementOfTaxon .
  ?data_point_uri dwc:measurementType ?attribute .
  ?data_point_uri dwc:measurementValue ?value .
  OPTIONAL {{
    ?data_point_uri dwc:measurementUnit ?unit_of_measure_uri
  }}
  FILTER (
    ?attribute IN ({})
    && ?measurementOfTaxon = <{}>
  )
}}
GROUP BY ?attribute ?unit_of_measure_uri
ORDER BY DESC(?min)"#,
            self.taxon_uri(taxon_concept),
            allowed,
            self.config.uri_true
        )))
    }

    /// Metadata of trait or association URIs
    ///
    /// Matches direct, occurrence, child measurement, sibling occurrence
    /// measurement, association measurement, event and scientific name
    /// properties, minus the structural predicates in `METADATA_BLOCKLIST`.
    pub fn metadata(&self, uris_to_lookup: &[String]) -> Result<SparqlQuery> {
        if uris_to_lookup.is_empty() {
            return Err(TraitBankError::MissingRequiredOption("uris"));
        }

        let parents = uris_to_lookup
            .iter()
            .map(|uri| iri(uri))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        Ok(SparqlQuery::new(format!(
            r#"SELECT DISTINCT ?parent_uri ?attribute ?value ?unit_of_measure_uri
WHERE {{
  GRAPH ?graph {{
    {{
      ?parent_uri ?attribute ?value .
    }} UNION {{
      ?parent_uri dwc:occurrenceID ?occurrence .
      ?occurrence ?attribute ?value .
    }} UNION {{
      ?measurement eol:parentMeasurementID ?parent_uri .
      ?measurement dwc:measurementType ?attribute .
      ?measurement dwc:measurementValue ?value .
      OPTIONAL {{ ?measurement dwc:measurementUnit ?unit_of_measure_uri }} .
    }} UNION {{
      ?parent_uri dwc:occurrenceID ?occurrence .
      ?measurement dwc:occurrenceID ?occurrence .
      ?measurement dwc:measurementType ?attribute .
      ?measurement dwc:measurementValue ?value .
      FILTER NOT EXISTS {{ ?measurement eol:measurementOfTaxon eolterms:true }} .
      OPTIONAL {{ ?measurement dwc:measurementUnit ?unit_of_measure_uri }} .
    }} UNION {{
      ?measurement eol:associationID ?parent_uri .
      ?measurement dwc:measurementType ?attribute .
      ?measurement dwc:measurementValue ?value .
      OPTIONAL {{ ?measurement dwc:measurementUnit ?unit_of_measure_uri }} .
    }} UNION {{
      ?parent_uri dwc:occurrenceID ?occurrence .
      ?occurrence dwc:eventID ?event .
      ?event ?attribute ?value .
    }} UNION {{
      ?parent_uri dwc:occurrenceID ?occurrence .
      ?occurrence dwc:taxonID ?taxon .
      ?taxon ?attribute ?value .
      FILTER ( ?attribute = dwc:scientificName )
    }}
    FILTER ( ?attribute NOT IN ({}) ) .
    FILTER ( ?parent_uri IN ({}) )
  }}
}}"#,
            METADATA_BLOCKLIST.join(", "),
            parents
        )))
    }

    /// Traits of pages having `predicate`, optionally limited to one clade
    ///
    /// Each trait comes back with all of its properties, plus one level of
    /// nested properties when a property value is itself a trait.
    pub fn clade_scan(
        &self,
        predicate: &str,
        clade: Option<&EntityId>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<SparqlQuery> {
        if predicate.trim().is_empty() {
            return Err(TraitBankError::MissingRequiredOption("predicate"));
        }
        let predicate = iri(predicate)?;

        let ancestor = match clade {
            Some(clade) => format!(
                "\n    ?page eol:has_ancestor <{}> .",
                self.taxon_uri(clade)
            ),
            None => String::new(),
        };
        let options = QueryOptions {
            limit,
            offset,
            ..QueryOptions::default()
        };

        Ok(SparqlQuery::new(format!(
            r#"SELECT DISTINCT *
# data_search_within_clade
WHERE {{
  GRAPH <{}> {{
    ?page {} ?trait .{}
    ?trait a eol:trait .
    ?trait ?trait_predicate ?value .
    OPTIONAL {{ ?value a eol:trait . ?value ?meta_predicate ?meta_value }}
  }}
}}
{}"#,
            self.config.traitbank_graph,
            predicate,
            ancestor,
            options.pagination_clause()
        )))
    }

    /// Page/trait listing sorted numerically by measurement value
    ///
    /// # Example
    ///
    /// ```
    /// use traitbank_core::config::TraitBankConfig;
    /// use traitbank_core::query::{QueryBuilder, QueryOptions, SortDirection};
    ///
    /// let config = TraitBankConfig::default();
    /// let options = QueryOptions::new().with_sort(SortDirection::Descending);
    /// let query = QueryBuilder::new(&config)
    ///     .scan("http://purl.obolibrary.org/obo/OBA_0000056", None, &options)
    ///     .unwrap();
    /// assert!(query.as_str().contains("ORDER BY DESC(xsd:float("));
    /// ```
    pub fn scan(
        &self,
        predicate: &str,
        clade: Option<&EntityId>,
        options: &QueryOptions,
    ) -> Result<SparqlQuery> {
        if predicate.trim().is_empty() {
            return Err(TraitBankError::MissingRequiredOption("predicate"));
        }
        let predicate = iri(predicate)?;

        let fields = if options.count {
            "(COUNT(*) AS ?count)"
        } else {
            "DISTINCT ?page ?trait"
        };

        let mut query = format!(
            "# data_search part 1\nSELECT {} WHERE {{ GRAPH <{}> {{ ?page a eol:page . ?page {} ?trait . ",
            fields, self.config.traitbank_graph, predicate
        );
        if let Some(clade) = clade {
            query.push_str(&format!("?page eol:has_ancestor <{}> . ", self.taxon_uri(clade)));
        }
        query.push_str("?trait a eol:trait . ?trait dwc:measurementValue ?value . } } ");

        if !options.count {
            let order = match options.sort {
                SortDirection::Descending => format!("DESC({})", NUMERIC_VALUE_EXPR),
                SortDirection::Ascending => NUMERIC_VALUE_EXPR.to_string(),
            };
            query.push_str(&format!("ORDER BY {} {}", order, options.pagination_clause()));
        }

        Ok(SparqlQuery::new(query.trim_end().to_string()))
    }

    /// Global Genome Initiative counts of a taxon
    pub fn ggi(&self, taxon_concept: &EntityId) -> SparqlQuery {
        let attributes = GGI_URIS
            .iter()
            .map(|uri| format!("<{}>", uri))
            .collect::<Vec<_>>()
            .join(", ");

        SparqlQuery::new(format!(
            r#"SELECT DISTINCT ?attribute ?value ?data_point_uri ?graph ?taxon_concept_id
WHERE {{
  GRAPH ?graph {{
    ?data_point_uri dwc:measurementType ?attribute .
    ?data_point_uri dwc:measurementValue ?value .
    FILTER ( ?attribute IN ({}) )
  }} .
  {{
    ?data_point_uri dwc:occurrenceID ?occurrence .
    ?occurrence dwc:taxonID ?taxon .
    ?data_point_uri eol:measurementOfTaxon eolterms:true .
    ?taxon dwc:taxonConceptID ?taxon_concept_id .
    FILTER ( ?taxon_concept_id = <{}> ) .
  }}
}}
LIMIT 100"#,
            attributes,
            self.taxon_uri(taxon_concept)
        ))
    }

    /// Conservation status records of a taxon
    pub fn iucn_status(&self, taxon_concept: &EntityId) -> SparqlQuery {
        SparqlQuery::new(format!(
            r#"SELECT DISTINCT ?attribute ?value ?data_point_uri ?graph ?taxon_concept_id
WHERE {{
  GRAPH ?graph {{
    ?data_point_uri dwc:measurementType ?attribute .
    ?data_point_uri dwc:measurementValue ?value .
    FILTER ( ?attribute = <{}> )
  }} .
  {{
    ?data_point_uri dwc:occurrenceID ?occurrence .
    ?occurrence dwc:taxonID ?taxon .
    ?taxon dwc:taxonConceptID ?taxon_concept_id .
    FILTER ( ?taxon_concept_id = <{}> )
  }}
}}"#,
            CONSERVATION_STATUS_URI,
            self.taxon_uri(taxon_concept)
        ))
    }
}
