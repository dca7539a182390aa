use std::collections::BTreeMap;

use crate::models::component::TransportMode;
use crate::models::cost_record::{CostKey, CostRecord, RecordState, SkipReason};

/// One item a stage could not process, with its scope ("site 12", "site 12 / Lüderitz")
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub scope: String,
    pub reason: SkipReason,
}

/// Computed vs skipped counts of a single pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: &'static str,
    pub computed: usize,
    pub skipped: Vec<SkippedItem>,
}

impl StageReport {
    pub fn new(stage: &'static str) -> Self {
        Self { stage, computed: 0, skipped: Vec::new() }
    }

    pub fn record_computed(&mut self) {
        self.computed += 1;
    }

    pub fn record_skip(&mut self, scope: impl Into<String>, reason: SkipReason) {
        self.skipped.push(SkippedItem { scope: scope.into(), reason });
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of skips per reason code
    pub fn reasons_by_code(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.skipped {
            *counts.entry(item.reason.code()).or_insert(0) += 1;
        }
        counts
    }
}

/// A (demand center, mode) pair dropped before any of its records were evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPair {
    pub demand_center: String,
    pub mode: TransportMode,
    pub reason: String,
}

/// Outcome of the cost stage over every (site, demand center, mode) triple
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    pub computed: usize,
    pub skipped: usize,
    pub reasons: BTreeMap<String, usize>,
    pub skipped_pairs: Vec<SkippedPair>,
}

impl RunSummary {
    pub fn from_records(records: &BTreeMap<CostKey, CostRecord>, skipped_pairs: Vec<SkippedPair>) -> Self {
        let mut summary = RunSummary {
            skipped_pairs,
            ..Default::default()
        };

        for record in records.values() {
            match record.get_state() {
                RecordState::Computed(_) => summary.computed += 1,
                RecordState::Skipped(reason) => {
                    summary.skipped += 1;
                    *summary.reasons.entry(reason.to_string()).or_insert(0) += 1;
                }
                RecordState::Pending => {}
            }
        }

        summary
    }

    pub fn total(&self) -> usize {
        self.computed + self.skipped
    }
}
