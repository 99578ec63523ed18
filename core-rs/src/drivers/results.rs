//! Typed rows decoded from SPARQL JSON results
//!
//! ```text
//! { "results": { "bindings": [ { "var": { "type": "uri", "value": "..." } } ] } }
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::{Result, TraitBankError};

/// One bound value: a URI or a literal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Uri(String),
    Literal {
        value: String,
        datatype: Option<String>,
        lang: Option<String>,
    },
}

impl Term {
    pub fn uri(value: impl Into<String>) -> Self {
        Term::Uri(value.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Term::Uri(uri) => uri,
            Term::Literal { value, .. } => value,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Term::Uri(_))
    }

    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Term::Uri(uri) => Some(uri),
            Term::Literal { .. } => None,
        }
    }
}

/// Variable name to value mapping of one solution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    bindings: HashMap<String, Term>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variable: impl Into<String>, term: Term) -> Self {
        self.bindings.insert(variable.into(), term);
        self
    }

    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.bindings.get(variable)
    }

    pub fn get_str(&self, variable: &str) -> Option<&str> {
        self.get(variable).map(Term::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All URI values bound in this row
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.bindings.values().filter_map(Term::as_uri)
    }
}

#[derive(Deserialize)]
struct ResultsDocument {
    results: ResultsBody,
}

#[derive(Deserialize)]
struct ResultsBody {
    bindings: Vec<HashMap<String, JsonBinding>>,
}

#[derive(Deserialize)]
struct JsonBinding {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    datatype: Option<String>,
    #[serde(rename = "xml:lang")]
    lang: Option<String>,
}

impl From<JsonBinding> for Term {
    fn from(binding: JsonBinding) -> Self {
        match binding.kind.as_str() {
            "uri" => Term::Uri(binding.value),
            // literal, typed-literal (Virtuoso) and bnode labels
            _ => Term::Literal {
                value: binding.value,
                datatype: binding.datatype,
                lang: binding.lang,
            },
        }
    }
}

/// Decode a SPARQL JSON results document into rows
///
/// # Example
///
/// ```
/// use traitbank_core::drivers::{parse_results, Term};
///
/// let json = r#"{"head":{"vars":["graph"]},"results":{"bindings":[
///     {"graph":{"type":"uri","value":"http://eol.org/resources/1"}}]}}"#;
/// let rows = parse_results(json).unwrap();
/// assert_eq!(rows[0].get("graph"), Some(&Term::uri("http://eol.org/resources/1")));
/// ```
pub fn parse_results(body: &str) -> Result<Vec<Row>> {
    let document: ResultsDocument = serde_json::from_str(body).map_err(|e| {
        TraitBankError::QueryExecution(format!("invalid SPARQL results document: {}", e))
    })?;

    Ok(document
        .results
        .bindings
        .into_iter()
        .map(|solution| Row {
            bindings: solution
                .into_iter()
                .map(|(variable, binding)| (variable, Term::from(binding)))
                .collect(),
        })
        .collect())
}
