/**
 * aggregate module
 *
 * - repository: bulk lookup collaborators (taxa, known URIs, resources)
 * - grouping: stable group-by-subject over result rows
 * - glossary: one-pass URI label and unit resolution
 * - ranges: typed min/max/count aggregates
 * - trait_set: assembly of rows into traits with pages and sources
 */

pub mod glossary;
pub mod grouping;
pub mod ranges;
pub mod repository;
pub mod trait_set;

pub use glossary::{Glossary, UriComponents};
pub use grouping::{group_by_subject, TraitGroup};
pub use repository::{
    KnownUri, KnownUriRepository, Resource, ResourceRepository, TaxonConcept, TaxonRepository,
};
pub use ranges::{RangeAggregate, RangeSet};
pub use trait_set::{
    Metadatum, NestedProperty, Trait, TraitAssembler, TraitSet, PAGE_VARIABLE, PARENT_VARIABLE, TARGET_VARIABLE,
};
