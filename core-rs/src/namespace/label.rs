//! Human-readable labels for term URIs

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(/|#)([a-z0-9_-]{3,})$").expect("static regex"));
static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("static regex"));
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("static regex"));

/// Derive a label from the last path segment or fragment of a URI
///
/// # Examples
///
/// ```
/// use traitbank_core::namespace::humanize;
///
/// assert_eq!(humanize("http://eol.org/schema/terms/bodyMass"), Some("Body Mass".to_string()));
/// assert_eq!(humanize("http://rs.tdwg.org/ontology/voc/SPMInfoItems#ConservationStatus"),
///            Some("Conservation Status".to_string()));
/// assert_eq!(humanize("http://eol.org/x"), None);
/// ```
pub fn humanize(uri: &str) -> Option<String> {
    let caps = TRAILING_SEGMENT.captures(uri)?;
    let words = underscore(&caps[2]).replace('_', " ");
    Some(capitalize_words(&words))
}

/// Split CamelCase into snake_case, hyphens become underscores
fn underscore(word: &str) -> String {
    let word = ACRONYM_BOUNDARY.replace_all(word, "${1}_${2}");
    let word = CAMEL_BOUNDARY.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

/// Upper-case the first character of each space-separated word
fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-case a label, join words with underscores and escape markup
///
/// # Examples
///
/// ```
/// use traitbank_core::namespace::to_underscore;
///
/// assert_eq!(to_underscore("Body Mass"), "body_mass");
/// assert_eq!(to_underscore("A&B"), "a&amp;b");
/// ```
pub fn to_underscore(label: &str) -> String {
    escape_entities(&label.to_lowercase().replace(' ', "_"))
}

/// Escape XML entities and strip backslashes and line breaks
pub fn escape_entities(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
        .replace(['\\', '\n', '\r'], "")
}
