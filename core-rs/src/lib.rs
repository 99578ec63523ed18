//! # Trait Bank Core - SPARQL query and aggregation layer
//!
//! Builds parameterized SPARQL queries against the EOL trait bank, runs them
//! on a Virtuoso-style triplestore, loads triples in fail-fast batches, and
//! assembles result rows into traits with their pages, glossary and sources.
//!
//! ## Key Features
//!
//! - Namespace-aware URI classification and expansion
//! - Query shapes for measurements, associations, clade ranges, metadata
//!   and clade-scoped scans
//! - Chunked, resumable inserts with full failure diagnostics
//! - Bulk-only collaborator lookups (one call per collaborator per pass)
//!
//! ## Architecture
//!
//! ```text
//!  TraitSearch / caller
//!        │ options
//!        ▼
//!  ┌─────────────┐   text   ┌──────────────────┐   rows   ┌────────────────┐
//!  │ QueryBuilder│ ───────> │ TripleStoreClient│ ───────> │ TraitAssembler │
//!  └─────────────┘          └──────────────────┘          └────────────────┘
//!        │                          │ SparqlTransport             │ repositories
//!  NamespaceResolver          HttpTransport (reqwest)       taxa / URIs / resources
//! ```

pub mod errors;
pub mod config;
pub mod entity;
pub mod namespace;
pub mod query;
pub mod drivers;
pub mod aggregate;
pub mod search;

pub use errors::{LookupError, TraitBankError};
pub use config::TraitBankConfig;
pub use entity::{EntityId, EntityKind, TaxonScope};
pub use namespace::{Expanded, NamespaceResolver, UriKind};
pub use query::{QueryBuilder, QueryOptions, SortDirection, SparqlQuery};
pub use drivers::{HttpTransport, InsertReport, Row, SparqlTransport, Term, TransportResponse, TripleStoreClient};
pub use aggregate::{
    Glossary, KnownUri, KnownUriRepository, RangeAggregate, RangeSet, Resource, ResourceRepository, TaxonConcept,
    TaxonRepository, Trait, TraitAssembler, TraitSet,
};
pub use search::TraitSearch;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
