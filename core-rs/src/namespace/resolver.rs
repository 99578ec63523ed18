//! Namespace resolver for classifying, expanding and enclosing query values

use crate::errors::{Result, TraitBankError};
use once_cell::sync::Lazy;
use regex::Regex;

static BASIC_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^ ]+$").expect("static regex"));
static ENCLOSED_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^<https?://[^ ]+>$").expect("static regex"));
static NAMESPACED_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^([a-z0-9_-]{1,30}):(.*)$").expect("static regex"));
static EOL_TRIPLESTORE_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^http://(eol\.org/resources/[0-9]+/(taxa|occurrences|events)/|anage\.org|adw\.org|iobis\.org|reeffish\.org)",
    )
    .expect("static regex")
});

/// Shape of a query value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriKind {
    FullUri,
    EnclosedUri,
    NamespacedUri,
    Literal,
}

/// Result of expanding a query value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expanded {
    Uri(String),
    /// Literals are passed through untouched and are never URIs
    Literal(String),
}

impl Expanded {
    pub fn as_str(&self) -> &str {
        match self {
            Expanded::Uri(s) | Expanded::Literal(s) => s,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Expanded::Uri(_))
    }
}

/// Namespace resolver for query values
pub struct NamespaceResolver;

impl NamespaceResolver {
    /// Classify a value by shape
    ///
    /// # Examples
    ///
    /// ```
    /// use traitbank_core::namespace::{NamespaceResolver, UriKind};
    ///
    /// assert_eq!(NamespaceResolver::classify("http://eol.org/pages/7"), UriKind::FullUri);
    /// assert_eq!(NamespaceResolver::classify("<http://eol.org/pages/7>"), UriKind::EnclosedUri);
    /// assert_eq!(NamespaceResolver::classify("dwc:measurementType"), UriKind::NamespacedUri);
    /// assert_eq!(NamespaceResolver::classify("12.5 kg"), UriKind::Literal);
    /// ```
    pub fn classify(value: &str) -> UriKind {
        if BASIC_URI.is_match(value) {
            UriKind::FullUri
        } else if ENCLOSED_URI.is_match(value) {
            UriKind::EnclosedUri
        } else if NAMESPACED_URI.is_match(value) {
            UriKind::NamespacedUri
        } else {
            UriKind::Literal
        }
    }

    /// True for full, enclosed and namespaced URIs
    pub fn is_uri(value: &str) -> bool {
        Self::classify(value) != UriKind::Literal
    }

    /// Dereference a namespaced URI; full URIs and literals pass through
    ///
    /// # Examples
    ///
    /// ```
    /// use traitbank_core::namespace::{Expanded, NamespaceResolver};
    ///
    /// let expanded = NamespaceResolver::expand("dwc:measurementType").unwrap();
    /// assert_eq!(expanded, Expanded::Uri("http://rs.tdwg.org/dwc/terms/measurementType".to_string()));
    ///
    /// assert!(NamespaceResolver::expand("nope:thing").is_err());
    /// ```
    pub fn expand(value: &str) -> Result<Expanded> {
        match Self::classify(value) {
            UriKind::FullUri | UriKind::EnclosedUri => Ok(Expanded::Uri(value.to_string())),
            UriKind::NamespacedUri => {
                let caps = NAMESPACED_URI
                    .captures(value)
                    .ok_or_else(|| TraitBankError::UnknownNamespace(value.to_string()))?;
                let prefix = &caps[1];
                let local = &caps[2];
                let stem = super::stem(prefix)
                    .ok_or_else(|| TraitBankError::UnknownNamespace(prefix.to_string()))?;
                Ok(Expanded::Uri(format!("{}{}", stem, local)))
            }
            UriKind::Literal => Ok(Expanded::Literal(value.to_string())),
        }
    }

    /// Wrap a value for embedding in query text
    ///
    /// Bare full URIs get angle brackets, everything else becomes a quoted
    /// literal.
    ///
    /// # Examples
    ///
    /// ```
    /// use traitbank_core::namespace::NamespaceResolver;
    ///
    /// assert_eq!(NamespaceResolver::enclose("http://eol.org/pages/7"), "<http://eol.org/pages/7>");
    /// assert_eq!(NamespaceResolver::enclose("adult"), "\"adult\"");
    /// ```
    pub fn enclose(value: &str) -> String {
        if BASIC_URI.is_match(value) {
            format!("<{}>", value)
        } else {
            let escaped = value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
                .replace('\r', "\\r");
            format!("\"{}\"", escaped)
        }
    }

    /// True for URIs whose data lives in the EOL triplestore itself
    pub fn in_eol_triplestore(uri: &str) -> bool {
        EOL_TRIPLESTORE_URI.is_match(uri)
    }
}
