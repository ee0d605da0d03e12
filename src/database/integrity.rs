//! Consistency predicate over a sequence of insertions, and its repair
//!
//! A sequence is consistent when every insertion matches its columns, no two
//! rows of a table share a value in a primary-key/unique column, and every
//! row referencing another table through a foreign key comes after at least
//! one row of that table.

use super::action::SqlInsertAction;
use crate::randomness::Randomness;
use log::debug;
use std::collections::HashSet;

/// First constraint broken by a sequence of insertions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityViolation {
    #[error("insertion {index} does not match its columns")]
    InvalidInsertion { index: usize },

    #[error("insertion {index} repeats value '{value}' in unique column '{column}'")]
    DuplicateValue {
        index: usize,
        column: String,
        value: String,
    },

    #[error("insertion {index} references table '{table}' with no earlier row")]
    MissingReference { index: usize, table: String },
}

/// Find the first violation, scanning insertions in execution order
pub fn find_violation<'a, I>(insertions: I) -> Option<IntegrityViolation>
where
    I: IntoIterator<Item = &'a SqlInsertAction>,
{
    let mut seen_tables: HashSet<String> = HashSet::new();
    let mut unique_values: HashSet<(String, String, String)> = HashSet::new();

    for (index, insertion) in insertions.into_iter().enumerate() {
        if !insertion.verify() {
            return Some(IntegrityViolation::InvalidInsertion { index });
        }
        let table = insertion.table_name().to_ascii_uppercase();

        for column in insertion.columns() {
            for referenced in &column.foreign_key_refs {
                if !seen_tables.contains(&referenced.to_ascii_uppercase()) {
                    return Some(IntegrityViolation::MissingReference {
                        index,
                        table: referenced.clone(),
                    });
                }
            }

            if !column.requires_unique_values() {
                continue;
            }
            if let Some(gene) = insertion.gene_for(&column.name) {
                let value = gene.raw_value();
                let key = (table.clone(), column.name.to_ascii_uppercase(), value.clone());
                if !unique_values.insert(key) {
                    return Some(IntegrityViolation::DuplicateValue {
                        index,
                        column: column.name.clone(),
                        value,
                    });
                }
            }
        }

        seen_tables.insert(table);
    }
    None
}

pub fn is_consistent(insertions: &[SqlInsertAction]) -> bool {
    find_violation(insertions).is_none()
}

/// Fix violations one at a time until the sequence is consistent.
///
/// Duplicated unique values are re-randomized, rows with dangling references
/// are dropped, and rows whose values are out of domain are re-randomized
/// (or dropped when their genes do not match the columns at all). A
/// consistent sequence is left untouched. Gives up after `max_attempts`
/// fixes, returning the violation still present.
pub fn repair_insertions(
    insertions: &mut Vec<SqlInsertAction>,
    randomness: &mut Randomness,
    max_attempts: usize,
) -> Result<(), IntegrityViolation> {
    for _ in 0..max_attempts {
        let violation = match find_violation(insertions.iter()) {
            None => return Ok(()),
            Some(v) => v,
        };
        debug!("Repairing initialization actions: {}", violation);

        match violation {
            IntegrityViolation::InvalidInsertion { index } => {
                let insertion = &mut insertions[index];
                if insertion.see_genes().len() == insertion.columns().len() {
                    insertion.randomize(randomness);
                } else {
                    insertions.remove(index);
                }
            }
            IntegrityViolation::DuplicateValue { index, column, .. } => {
                if let Some(gene) = insertions[index].gene_for_mut(&column) {
                    gene.randomize(randomness);
                }
            }
            IntegrityViolation::MissingReference { index, .. } => {
                insertions.remove(index);
            }
        }
    }

    match find_violation(insertions.iter()) {
        None => Ok(()),
        Some(violation) => Err(violation),
    }
}
