//! Drivers module for triplestore access
//!
//! Provides the transport seam (SparqlTransport trait) and implementations:
//! - HttpTransport: SPARQL over HTTP with reqwest
//! - TripleStoreClient: query execution, chunked inserts, graph administration
//! - Row/Term: typed bindings decoded from SPARQL JSON results

mod traits;
mod http;
mod results;
mod virtuoso;

pub use traits::{SparqlTransport, TransportResponse};
pub use http::{HttpTransport, SPARQL_QUERY, SPARQL_RESULTS_JSON};
pub use results::{parse_results, Row, Term};
pub use virtuoso::{InsertReport, TripleStoreClient, EOL_GRAPH_PREFIX};
