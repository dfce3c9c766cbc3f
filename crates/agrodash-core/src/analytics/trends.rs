//! Monthly trends
//!
//! Buckets records by the calendar month (1-12) of their creation time.
//! Months are taken in UTC so the same data always lands in the same
//! bucket regardless of where the process runs. Years are folded together.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{MonthCount, Record};

/// Shape of a monthly series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthlyLayout {
    /// Only months with at least one record
    #[default]
    Sparse,
    /// All twelve months, empty ones as zero
    Dense,
}

impl MonthlyLayout {
    /// Reshape a sparse series into this layout
    pub fn apply(self, sparse: Vec<MonthCount>) -> Vec<MonthCount> {
        match self {
            MonthlyLayout::Sparse => sparse,
            MonthlyLayout::Dense => densify(&sparse),
        }
    }
}

/// Count records per creation month, ascending, empty months omitted
pub fn monthly_trend<R: Record>(records: &[Arc<R>]) -> Vec<MonthCount> {
    let mut buckets = [0u64; 12];

    for record in records {
        // month0() is 0-based
        buckets[record.created_at().month0() as usize] += 1;
    }

    buckets
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(idx, count)| MonthCount {
            month: idx as u32 + 1,
            value: *count,
        })
        .collect()
}

/// Expand to twelve entries, filling gaps with zero
pub fn densify(sparse: &[MonthCount]) -> Vec<MonthCount> {
    (1..=12)
        .map(|month| MonthCount {
            month,
            value: sparse
                .iter()
                .find(|bucket| bucket.month == month)
                .map_or(0, |bucket| bucket.value),
        })
        .collect()
}

/// Sum of all bucket counts
pub fn total(series: &[MonthCount]) -> u64 {
    series.iter().map(|bucket| bucket.value).sum()
}
