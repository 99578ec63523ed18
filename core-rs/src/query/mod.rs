/**
 * query module
 *
 * - sparql: query text type and the trait bank query shapes
 * - options: limit/offset/sort/count options bag
 */

pub mod options;
pub mod sparql;

pub use options::{QueryOptions, SortDirection, DEFAULT_SCAN_LIMIT};
pub use sparql::{
    QueryBuilder, SparqlQuery, CONSERVATION_STATUS_URI, GGI_URIS, METADATA_BLOCKLIST,
    NUMERIC_VALUE_EXPR, PAGE_QUERY_LIMIT,
};
