use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{MonthKey, Record, WeekKey, total_amount};

/// One point of a report series: a period label and the sum of its amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub label: String,
    pub total: f64,
}

/// Everything the presentation layer needs to show the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total: f64,
    pub record_count: usize,
    pub monthly: Vec<PeriodTotal>,
    pub weekly: Vec<PeriodTotal>,
}

impl SummaryReport {
    /// No records at all, as opposed to records summing to zero.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// Sum amounts per bucket key, in ascending key order.
fn bucket_totals<K, F>(records: &[Record], key_of: F) -> Vec<(K, f64)>
where
    K: Ord,
    F: Fn(&Record) -> K,
{
    let mut buckets: BTreeMap<K, f64> = BTreeMap::new();
    for record in records {
        *buckets.entry(key_of(record)).or_insert(0.0) += record.amount;
    }
    buckets.into_iter().collect()
}

/// Totals per calendar month, oldest first, labelled like "January-2024".
pub fn monthly_totals(records: &[Record]) -> Vec<PeriodTotal> {
    bucket_totals(records, |r| MonthKey::of(r.date))
        .into_iter()
        .map(|(key, total)| PeriodTotal {
            label: key.label(),
            total,
        })
        .collect()
}

/// Totals per ISO-8601 week, oldest first, labelled like "Week 1/2025".
pub fn weekly_totals(records: &[Record]) -> Vec<PeriodTotal> {
    bucket_totals(records, |r| WeekKey::of(r.date))
        .into_iter()
        .map(|(key, total)| PeriodTotal {
            label: key.label(),
            total,
        })
        .collect()
}

pub fn summarize(records: &[Record]) -> SummaryReport {
    SummaryReport {
        total: total_amount(records),
        record_count: records.len(),
        monthly: monthly_totals(records),
        weekly: weekly_totals(records),
    }
}
