//! Namespace and URI handling for trait bank queries
//!
//! ## URI Forms
//!
//! ```text
//! http://rs.tdwg.org/dwc/terms/measurementType     full URI
//! <http://rs.tdwg.org/dwc/terms/measurementType>   enclosed URI
//! dwc:measurementType                              namespaced URI
//! 12.5                                             literal
//! ```
//!
//! Namespaced forms only resolve against the fixed prefix table below. An
//! unregistered prefix is an error, never a literal.

mod label;
mod resolver;

pub use label::{escape_entities, humanize, to_underscore};
pub use resolver::{Expanded, NamespaceResolver, UriKind};

/// Registered namespace prefixes and their stems
pub const NAMESPACES: &[(&str, &str)] = &[
    ("dwc", "http://rs.tdwg.org/dwc/terms/"),
    ("dwct", "http://rs.tdwg.org/dwc/dwctype/"),
    ("dc", "http://purl.org/dc/terms/"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("eol", "http://eol.org/schema/terms/"),
    ("obis", "http://iobis.org/schema/terms/"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("anage", "http://anage.org/schema/terms/"),
];

/// Prefixes only used inside query text, never accepted by `expand`
const QUERY_ONLY_NAMESPACES: &[(&str, &str)] = &[
    ("eolterms", "http://eol.org/schema/terms/"),
    ("eolreference", "http://eol.org/schema/reference/"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

/// Look up the stem registered for a prefix
///
/// # Examples
///
/// ```
/// use traitbank_core::namespace::stem;
///
/// assert_eq!(stem("dwc"), Some("http://rs.tdwg.org/dwc/terms/"));
/// assert_eq!(stem("nope"), None);
/// ```
pub fn stem(prefix: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, stem)| *stem)
}

/// PREFIX declarations prepended to every request body
pub fn prelude() -> String {
    NAMESPACES
        .iter()
        .chain(QUERY_ONLY_NAMESPACES.iter())
        .map(|(prefix, stem)| format!("PREFIX {}: <{}>", prefix, stem))
        .collect::<Vec<_>>()
        .join("\n")
}
