//! Min/max/count aggregates per attribute below a taxon

use crate::drivers::Row;

use super::glossary::{Glossary, UriComponents};

/// One `ranges` row: an attribute and unit with its spread over a clade
#[derive(Debug, Clone, PartialEq)]
pub struct RangeAggregate {
    pub attribute: String,
    pub units: Option<String>,
    pub count_taxa: u64,
    pub count_measurements: u64,
    /// `None` when no value of the group was numeric
    pub min: Option<f64>,
    pub max: Option<f64>,
}

fn count(row: &Row, variable: &str) -> u64 {
    row.get_str(variable)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

fn number(row: &Row, variable: &str) -> Option<f64> {
    row.get_str(variable).and_then(|value| value.trim().parse().ok())
}

impl RangeAggregate {
    /// Read a ranges row; rows without an attribute are not aggregates
    ///
    /// # Example
    ///
    /// ```
    /// use traitbank_core::aggregate::RangeAggregate;
    /// use traitbank_core::drivers::{Row, Term};
    ///
    /// let row = Row::new()
    ///     .with("attribute", Term::uri("http://purl.obolibrary.org/obo/VT_0001259"))
    ///     .with("count_taxa", Term::literal("2"))
    ///     .with("count_measurements", Term::literal("3"))
    ///     .with("min", Term::literal("12.5"))
    ///     .with("max", Term::literal("40"));
    /// let range = RangeAggregate::from_row(&row).unwrap();
    /// assert_eq!(range.count_measurements, 3);
    /// assert_eq!(range.max, Some(40.0));
    /// ```
    pub fn from_row(row: &Row) -> Option<Self> {
        let attribute = row.get_str("attribute")?;
        Some(Self {
            attribute: attribute.to_string(),
            units: row.get_str("unit_of_measure_uri").map(str::to_string),
            count_taxa: count(row, "count_taxa"),
            count_measurements: count(row, "count_measurements"),
            min: number(row, "min"),
            max: number(row, "max"),
        })
    }

    pub fn label(&self, glossary: &Glossary) -> String {
        glossary.label(&self.attribute)
    }

    /// Unit of the range: explicit, or implied by the attribute
    pub fn unit_components(&self, glossary: &Glossary) -> Option<UriComponents> {
        let uri = self.units.as_deref().unwrap_or(&self.attribute);
        glossary.unit_components(uri)
    }
}

/// Range aggregates of one taxon, in query order (widest minimum first)
#[derive(Debug, Clone, Default)]
pub struct RangeSet {
    ranges: Vec<RangeAggregate>,
    glossary: Glossary,
}

impl RangeSet {
    pub(crate) fn new(ranges: Vec<RangeAggregate>, glossary: Glossary) -> Self {
        Self { ranges, glossary }
    }

    pub fn ranges(&self) -> &[RangeAggregate] {
        &self.ranges
    }

    pub fn into_ranges(self) -> Vec<RangeAggregate> {
        self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    /// Ranges of one attribute, one per unit
    pub fn for_attribute<'r>(&'r self, attribute: &'r str) -> impl Iterator<Item = &'r RangeAggregate> {
        self.ranges.iter().filter(move |range| range.attribute == attribute)
    }
}
