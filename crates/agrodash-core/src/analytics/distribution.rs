//! Type distribution: record counts per category value
//!
//! Categories are free-form strings entered by field officers and are
//! grouped literally ("Maize" and "maize" are distinct). Records without a
//! category form a single `null` group.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{Categorized, TypeCount};

/// Count records per category, ordered by key with the null group first
pub fn type_distribution<R: Categorized>(records: &[Arc<R>]) -> Vec<TypeCount> {
    let mut groups: BTreeMap<Option<&str>, u64> = BTreeMap::new();

    for record in records {
        *groups.entry(record.category()).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|(category, value)| TypeCount {
            category: category.map(str::to_string),
            value,
        })
        .collect()
}

/// Sum of all group counts
pub fn total(distribution: &[TypeCount]) -> u64 {
    distribution.iter().map(|group| group.value).sum()
}
