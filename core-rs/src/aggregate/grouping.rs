//! Grouping of result rows by subject

use std::collections::HashMap;

use crate::drivers::Row;

/// Rows sharing one subject URI
#[derive(Debug, Clone, PartialEq)]
pub struct TraitGroup {
    pub subject: String,
    pub rows: Vec<Row>,
}

/// Group rows by the value bound to `subject_var`
///
/// Groups come back in the order their subject was first seen. Rows without
/// the variable are dropped.
///
/// # Example
///
/// ```
/// use traitbank_core::aggregate::group_by_subject;
/// use traitbank_core::drivers::{Row, Term};
///
/// let rows = vec![
///     Row::new().with("trait", Term::uri("http://eol.org/t/2")),
///     Row::new().with("trait", Term::uri("http://eol.org/t/1")),
///     Row::new().with("trait", Term::uri("http://eol.org/t/2")),
/// ];
/// let groups = group_by_subject(&rows, "trait");
/// assert_eq!(groups[0].subject, "http://eol.org/t/2");
/// assert_eq!(groups[0].rows.len(), 2);
/// ```
pub fn group_by_subject(rows: &[Row], subject_var: &str) -> Vec<TraitGroup> {
    let mut groups: Vec<TraitGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let Some(subject) = row.get_str(subject_var) else {
            continue;
        };

        match index.get(subject) {
            Some(&at) => groups[at].rows.push(row.clone()),
            None => {
                index.insert(subject, groups.len());
                groups.push(TraitGroup {
                    subject: subject.to_string(),
                    rows: vec![row.clone()],
                });
            }
        }
    }

    groups
}
