//! Search Pipeline Integration Tests
//!
//! Runs TraitSearch and the per-page reads end to end: each query executes on
//! an in-memory oxigraph store behind a SparqlTransport, and the rows are
//! assembled with in-memory repositories that count their calls.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use oxigraph::model::Term as RdfTerm;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use serde_json::{json, Map, Value};
use traitbank_core::aggregate::{
    KnownUri, KnownUriRepository, Resource, ResourceRepository, TaxonConcept, TaxonRepository, TraitAssembler,
};
use traitbank_core::config::TraitBankConfig;
use traitbank_core::drivers::{SparqlTransport, TransportResponse, TripleStoreClient};
use traitbank_core::entity::EntityId;
use traitbank_core::errors::{LookupError, Result, TraitBankError};
use traitbank_core::namespace;
use traitbank_core::query::QueryBuilder;
use traitbank_core::search::TraitSearch;

const OBA: &str = "http://purl.obolibrary.org/obo/OBA_0000056";
const T41: &str = "http://eol.org/resources/1/measurements/t41";
const T904: &str = "http://eol.org/resources/2/measurements/t904";
const T41_CHILD: &str = "http://eol.org/resources/1/measurements/t41-child";
const BODY_MASS: &str = "http://purl.obolibrary.org/obo/VT_0001259";
const GRAM: &str = "http://purl.obolibrary.org/obo/UO_0000021";
const KILOGRAM: &str = "http://purl.obolibrary.org/obo/UO_0000009";
const MASS41: &str = "http://eol.org/resources/5/measurements/mass41";
const LENGTH41: &str = "http://eol.org/resources/5/measurements/length41";
const EATS: &str = "http://purl.obolibrary.org/obo/RO_0002470";
const PARASITE_OF: &str = "http://purl.obolibrary.org/obo/RO_0002444";

/// Answers read queries from an oxigraph store as SPARQL JSON results
struct StoreTransport {
    store: Store,
    selects: AtomicUsize,
}

impl StoreTransport {
    fn seeded() -> Self {
        let store = Store::new().unwrap();
        let data = format!(
            r#"{}
INSERT DATA {{
  GRAPH <http://eol.org/traitbank> {{
    <http://eol.org/pages/41> a eol:page ;
      eol:has_ancestor <http://eol.org/pages/37> ;
      <{oba}> <{t41}> .
    <{t41}> a eol:trait ;
      dwc:measurementValue "1,200" ;
      dwc:measurementUnit <{gram}> ;
      dwc:lifeStage "adult" ;
      dc:source <http://eol.org/resources/1> ;
      eol:hasChildMeasurement <{child}> .
    <{child}> a eol:trait ;
      dwc:measurementValue "999" ;
      dwc:measurementUnit <{kilogram}> .
    <http://eol.org/pages/904> a eol:page ;
      <{oba}> <{t904}> .
    <{t904}> a eol:trait ;
      dwc:measurementValue "3" ;
      dc:source <http://eol.org/resources/2> .
  }}
  GRAPH <http://eol.org/resources/5> {{
    <{mass41}> dwc:measurementType <{mass}> ;
      dwc:measurementValue "20" ;
      dwc:measurementUnit <{gram}> ;
      eolterms:statisticalMethod <http://eol.org/schema/terms/average> ;
      <http://eol.org/schema/terms/SampleSize> "14" .
    <{length41}> dwc:measurementType <{oba}> ;
      dwc:measurementValue "7" .
    <http://eol.org/resources/5/measurements/sd41> eol:parentMeasurementID <{mass41}> ;
      dwc:measurementType <http://eol.org/schema/terms/StandardDeviation> ;
      dwc:measurementValue "2.5" ;
      dwc:measurementUnit <{gram}> .
  }}
  <{mass41}> dwc:taxonConceptID <http://eol.org/pages/41> ;
    dwc:lifeStage "adult" .
  <{length41}> dwc:taxonConceptID <http://eol.org/pages/41> .
  GRAPH <http://eol.org/resources/6/mappings> {{
    <http://eol.org/resources/6/taxa/wolf> dwc:taxonConceptID <http://eol.org/pages/41> .
    <http://eol.org/resources/6/taxa/deer> dwc:taxonConceptID <http://eol.org/pages/77> .
    <http://eol.org/resources/6/taxa/tick> dwc:taxonConceptID <http://eol.org/pages/88> .
  }}
  GRAPH <http://eol.org/resources/6> {{
    <http://eol.org/resources/6/occurrences/wolf> dwc:taxonID <http://eol.org/resources/6/taxa/wolf> .
    <http://eol.org/resources/6/occurrences/deer> dwc:taxonID <http://eol.org/resources/6/taxa/deer> .
    <http://eol.org/resources/6/occurrences/tick> dwc:taxonID <http://eol.org/resources/6/taxa/tick> .
    <http://eol.org/resources/6/associations/eats>
      dwc:occurrenceID <http://eol.org/resources/6/occurrences/wolf> ;
      eol:targetOccurrenceID <http://eol.org/resources/6/occurrences/deer> ;
      eol:associationType <{eats}> .
    <http://eol.org/resources/6/associations/tick>
      dwc:occurrenceID <http://eol.org/resources/6/occurrences/tick> ;
      eol:targetOccurrenceID <http://eol.org/resources/6/occurrences/wolf> ;
      eol:associationType <{parasite_of}> .
  }}
  <http://eol.org/resources/9/taxa/t37> dwc:taxonConceptID <http://eol.org/pages/37> .
  <http://eol.org/resources/9/taxa/t41> dwc:taxonConceptID <http://eol.org/pages/41> ;
    dwc:parentNameUsageID <http://eol.org/resources/9/taxa/t37> .
  <http://eol.org/resources/9/taxa/t42> dwc:taxonConceptID <http://eol.org/pages/42> ;
    dwc:parentNameUsageID <http://eol.org/resources/9/taxa/t41> .
  <http://eol.org/resources/9/occurrences/o41> dwc:taxonID <http://eol.org/resources/9/taxa/t41> .
  <http://eol.org/resources/9/occurrences/o42> dwc:taxonID <http://eol.org/resources/9/taxa/t42> .
  <http://eol.org/resources/9/measurements/m41> dwc:occurrenceID <http://eol.org/resources/9/occurrences/o41> ;
    eol:measurementOfTaxon eolterms:true ;
    dwc:measurementType <{mass}> ;
    dwc:measurementValue "12.5" ;
    dwc:measurementUnit <{gram}> .
  <http://eol.org/resources/9/measurements/m42> dwc:occurrenceID <http://eol.org/resources/9/occurrences/o42> ;
    eol:measurementOfTaxon eolterms:true ;
    dwc:measurementType <{mass}> ;
    dwc:measurementValue "40" ;
    dwc:measurementUnit <{gram}> .
  <http://eol.org/resources/9/measurements/l42> dwc:occurrenceID <http://eol.org/resources/9/occurrences/o42> ;
    eol:measurementOfTaxon eolterms:true ;
    dwc:measurementType <{oba}> ;
    dwc:measurementValue "9" .
}}"#,
            namespace::prelude(),
            oba = OBA,
            t41 = T41,
            t904 = T904,
            child = T41_CHILD,
            gram = GRAM,
            kilogram = KILOGRAM,
            mass = BODY_MASS,
            mass41 = MASS41,
            length41 = LENGTH41,
            eats = EATS,
            parasite_of = PARASITE_OF
        );
        store.update(data.as_str()).unwrap();
        Self {
            store,
            selects: AtomicUsize::new(0),
        }
    }

    fn binding(term: &RdfTerm) -> Value {
        match term {
            RdfTerm::NamedNode(node) => json!({"type": "uri", "value": node.as_str()}),
            RdfTerm::Literal(literal) => {
                json!({"type": "literal", "value": literal.value(), "datatype": literal.datatype().as_str()})
            }
            other => json!({"type": "bnode", "value": other.to_string()}),
        }
    }
}

impl SparqlTransport for StoreTransport {
    async fn select(&self, _endpoint: &str, query: &str) -> Result<TransportResponse> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        let results = match self.store.query(query) {
            Ok(results) => results,
            Err(err) => return Ok(TransportResponse::new(400, err.to_string())),
        };

        let QueryResults::Solutions(solutions) = results else {
            return Ok(TransportResponse::new(400, "not a SELECT"));
        };
        let mut bindings = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| TraitBankError::QueryExecution(e.to_string()))?;
            let row: Map<String, Value> = solution
                .iter()
                .map(|(variable, term)| (variable.as_str().to_string(), Self::binding(term)))
                .collect();
            bindings.push(Value::Object(row));
        }

        let body = json!({"results": {"bindings": bindings}});
        Ok(TransportResponse::new(200, body.to_string()))
    }

    async fn update(&self, _endpoint: &str, _body: &str, _timeout: Duration) -> Result<TransportResponse> {
        Ok(TransportResponse::new(501, "read-only"))
    }
}

#[derive(Default)]
struct Taxa {
    calls: AtomicUsize,
}

impl TaxonRepository for Taxa {
    async fn find_by_ids(&self, ids: &[EntityId]) -> std::result::Result<Vec<TaxonConcept>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let names: HashMap<EntityId, &str> = HashMap::from([
            (EntityId::Int(41), "Canis lupus"),
            (EntityId::Int(77), "Odocoileus virginianus"),
            (EntityId::Int(88), "Ixodes scapularis"),
            (EntityId::Int(904), "Quercus alba"),
        ]);
        Ok(ids
            .iter()
            .filter_map(|id| {
                names.get(id).map(|name| TaxonConcept {
                    id: id.clone(),
                    scientific_name: Some(name.to_string()),
                })
            })
            .collect())
    }
}

#[derive(Default)]
struct KnownUris {
    calls: AtomicUsize,
    requested: std::sync::Mutex<Vec<String>>,
}

impl KnownUriRepository for KnownUris {
    async fn find_by_uris(&self, uris: &[String]) -> std::result::Result<Vec<KnownUri>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().extend(uris.iter().cloned());
        Ok(uris
            .iter()
            .filter(|uri| uri.as_str() == OBA)
            .map(|uri| KnownUri {
                uri: uri.clone(),
                name: "body length".to_string(),
                is_unit_of_measure: false,
                has_unit_of_measure: None,
            })
            .collect())
    }
}

#[derive(Default)]
struct Resources {
    calls: AtomicUsize,
}

impl ResourceRepository for Resources {
    async fn find_by_ids(&self, ids: &[EntityId]) -> std::result::Result<Vec<Resource>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids
            .iter()
            .map(|id| Resource {
                id: id.clone(),
                title: format!("Resource {}", id),
                content_partner: Some("AnAge".to_string()),
            })
            .collect())
    }
}

#[tokio::test]
async fn clade_search_assembles_traits() {
    let config = TraitBankConfig::default();
    let client = TripleStoreClient::with_transport(StoreTransport::seeded(), config.clone());
    let (taxa, glossary, resources) = (Taxa::default(), KnownUris::default(), Resources::default());
    let assembler = TraitAssembler::new(&config, &taxa, &glossary, &resources).unwrap();

    let traits = TraitSearch::for_attribute(OBA)
        .within_clade(37)
        .run(&client, &assembler)
        .await
        .unwrap();

    assert_eq!(traits.len(), 1);
    let found = &traits.traits()[0];
    assert_eq!(found.uri, T41);
    assert_eq!(found.page_id, Some(EntityId::Int(41)));
    assert_eq!(found.predicate.as_deref(), Some(OBA));
    assert_eq!(found.value.as_deref(), Some("1,200"));
    assert_eq!(found.units.as_deref(), Some("http://purl.obolibrary.org/obo/UO_0000021"));
    assert_eq!(found.life_stage.as_deref(), Some("adult"));
    assert_eq!(found.source_id, Some(EntityId::Int(1)));

    assert_eq!(traits.page_of(found).unwrap().scientific_name.as_deref(), Some("Canis lupus"));
    assert_eq!(traits.source_of(found).unwrap().title, "Resource 1");
    assert_eq!(found.predicate_label(traits.glossary()).as_deref(), Some("body length"));

    assert_eq!(taxa.calls.load(Ordering::SeqCst), 1);
    assert_eq!(glossary.calls.load(Ordering::SeqCst), 1);
    assert_eq!(resources.calls.load(Ordering::SeqCst), 1);
    assert!(glossary.requested.lock().unwrap().contains(&OBA.to_string()));
}

#[tokio::test]
async fn clade_search_keeps_nested_trait_apart() {
    let config = TraitBankConfig::default();
    let client = TripleStoreClient::with_transport(StoreTransport::seeded(), config.clone());
    let (taxa, glossary, resources) = (Taxa::default(), KnownUris::default(), Resources::default());
    let assembler = TraitAssembler::new(&config, &taxa, &glossary, &resources).unwrap();

    let traits = TraitSearch::for_attribute(OBA)
        .within_clade(37)
        .run(&client, &assembler)
        .await
        .unwrap();
    let found = traits.get(T41).unwrap();

    assert_eq!(found.value.as_deref(), Some("1,200"));
    assert_eq!(found.units.as_deref(), Some(GRAM));

    let nested: Vec<(&str, &str)> = found
        .nested_properties(T41_CHILD)
        .map(|p| (p.predicate.as_str(), p.value.as_str()))
        .collect();
    assert!(nested.contains(&("http://rs.tdwg.org/dwc/terms/measurementValue", "999")));
    assert!(nested.contains(&("http://rs.tdwg.org/dwc/terms/measurementUnit", KILOGRAM)));
    assert!(traits.get(T41_CHILD).is_none());
}

#[tokio::test]
async fn measurements_then_metadata_for_a_page() {
    let config = TraitBankConfig::default();
    let client = TripleStoreClient::with_transport(StoreTransport::seeded(), config.clone());
    let (taxa, glossary, resources) = (Taxa::default(), KnownUris::default(), Resources::default());
    let assembler = TraitAssembler::new(&config, &taxa, &glossary, &resources)
        .unwrap()
        .with_page_variable("taxon_concept_id");
    let builder = QueryBuilder::new(&config);

    let rows = client.execute(&builder.measurements(&EntityId::Int(41))).await.unwrap();
    let mut traits = assembler.build(&rows, "data_point_uri", None).await;

    assert_eq!(traits.len(), 2);
    let mass = traits.get(MASS41).unwrap();
    assert_eq!(mass.page_id, Some(EntityId::Int(41)));
    assert_eq!(mass.predicate.as_deref(), Some(BODY_MASS));
    assert_eq!(mass.value.as_deref(), Some("20"));
    assert_eq!(mass.units.as_deref(), Some(GRAM));
    assert_eq!(mass.statistical_method.as_deref(), Some("http://eol.org/schema/terms/average"));
    assert_eq!(mass.life_stage.as_deref(), Some("adult"));
    assert_eq!(mass.source_id, Some(EntityId::Int(5)));
    assert_eq!(traits.page_of(mass).unwrap().scientific_name.as_deref(), Some("Canis lupus"));
    assert_eq!(traits.get(LENGTH41).unwrap().predicate.as_deref(), Some(OBA));

    let uris: Vec<String> = traits.traits().iter().map(|t| t.uri.clone()).collect();
    let metadata = client.execute(&builder.metadata(&uris).unwrap()).await.unwrap();
    let attached = assembler.attach_metadata(&mut traits, &metadata).await;
    assert!(attached >= 2);

    let mass = traits.get(MASS41).unwrap();
    let sample_size = mass
        .metadata
        .iter()
        .find(|m| m.predicate == "http://eol.org/schema/terms/SampleSize")
        .unwrap();
    assert_eq!(sample_size.value, "14");
    let deviation = mass
        .metadata
        .iter()
        .find(|m| m.predicate == "http://eol.org/schema/terms/StandardDeviation")
        .unwrap();
    assert_eq!(deviation.value, "2.5");
    assert_eq!(deviation.units.as_deref(), Some(GRAM));

    assert_eq!(mass.value.as_deref(), Some("20"));
    assert_eq!(taxa.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn associations_resolve_both_directions() {
    let config = TraitBankConfig::default();
    let client = TripleStoreClient::with_transport(StoreTransport::seeded(), config.clone());
    let (taxa, glossary, resources) = (Taxa::default(), KnownUris::default(), Resources::default());
    let assembler = TraitAssembler::new(&config, &taxa, &glossary, &resources).unwrap();

    let query = QueryBuilder::new(&config).associations(&EntityId::Int(41));
    let rows = client.execute(&query).await.unwrap();
    let traits = assembler.build(&rows, "data_point_uri", None).await;

    assert_eq!(traits.associations().count(), 2);

    let eats = traits.get("http://eol.org/resources/6/associations/eats").unwrap();
    assert_eq!(eats.predicate.as_deref(), Some(EATS));
    assert_eq!(eats.target_page_id, Some(EntityId::Int(77)));
    assert_eq!(
        traits.target_page_of(eats).unwrap().scientific_name.as_deref(),
        Some("Odocoileus virginianus")
    );

    let tick = traits.get("http://eol.org/resources/6/associations/tick").unwrap();
    assert!(tick.predicate.is_none());
    assert_eq!(tick.inverse_predicate.as_deref(), Some(PARASITE_OF));
    assert_eq!(traits.target_page_of(tick).unwrap().scientific_name.as_deref(), Some("Ixodes scapularis"));
    assert_eq!(traits.source_of(tick).unwrap().title, "Resource 6");

    assert_eq!(taxa.calls.load(Ordering::SeqCst), 1);
    assert_eq!(resources.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ranges_aggregate_descendants() {
    let config = TraitBankConfig {
        aggregatable_attributes: vec![BODY_MASS.to_string()],
        ..TraitBankConfig::default()
    };
    let client = TripleStoreClient::with_transport(StoreTransport::seeded(), config.clone());
    let (taxa, glossary, resources) = (Taxa::default(), KnownUris::default(), Resources::default());
    let assembler = TraitAssembler::new(&config, &taxa, &glossary, &resources).unwrap();

    let query = QueryBuilder::new(&config).ranges(&EntityId::Int(37)).unwrap();
    let rows = client.execute(&query).await.unwrap();
    let ranges = assembler.build_ranges(&rows).await;

    assert_eq!(ranges.len(), 1);
    let range = &ranges.ranges()[0];
    assert_eq!(range.attribute, BODY_MASS);
    assert_eq!(range.units.as_deref(), Some(GRAM));
    assert_eq!(range.count_taxa, 2);
    assert_eq!(range.count_measurements, 2);
    assert_eq!(range.min, Some(12.5));
    assert_eq!(range.max, Some(40.0));
    assert_eq!(glossary.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn search_without_clade_covers_whole_bank() {
    let config = TraitBankConfig::default();
    let client = TripleStoreClient::with_transport(StoreTransport::seeded(), config.clone());
    let (taxa, glossary, resources) = (Taxa::default(), KnownUris::default(), Resources::default());
    let assembler = TraitAssembler::new(&config, &taxa, &glossary, &resources).unwrap();

    let traits = TraitSearch::for_attribute(OBA).run(&client, &assembler).await.unwrap();

    let uris: BTreeSet<&str> = traits.traits().iter().map(|t| t.uri.as_str()).collect();
    assert_eq!(uris, BTreeSet::from([T41, T904]));

    let sources: BTreeSet<String> = traits.sources().map(|s| s.title.clone()).collect();
    assert_eq!(sources, BTreeSet::from(["Resource 1".to_string(), "Resource 2".to_string()]));
    assert_eq!(resources.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn querystring_search_fails_before_io() {
    let config = TraitBankConfig::default();
    let client = TripleStoreClient::with_transport(StoreTransport::seeded(), config.clone());
    let (taxa, glossary, resources) = (Taxa::default(), KnownUris::default(), Resources::default());
    let assembler = TraitAssembler::new(&config, &taxa, &glossary, &resources).unwrap();

    let result = TraitSearch::for_attribute(OBA)
        .with_querystring("wolves")
        .run(&client, &assembler)
        .await;

    assert!(matches!(result, Err(TraitBankError::Unsupported(_))));
    assert_eq!(client.transport().selects.load(Ordering::SeqCst), 0);
    assert_eq!(taxa.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_attribute_fails_before_io() {
    let config = TraitBankConfig::default();
    let client = TripleStoreClient::with_transport(StoreTransport::seeded(), config.clone());
    let (taxa, glossary, resources) = (Taxa::default(), KnownUris::default(), Resources::default());
    let assembler = TraitAssembler::new(&config, &taxa, &glossary, &resources).unwrap();

    let result = TraitSearch::default().run(&client, &assembler).await;

    assert!(matches!(result, Err(TraitBankError::MissingRequiredOption("attribute"))));
    assert_eq!(client.transport().selects.load(Ordering::SeqCst), 0);
}
