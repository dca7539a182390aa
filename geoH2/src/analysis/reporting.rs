use std::collections::BTreeMap;

use super::summary::{RunSummary, StageReport};
use crate::core::aggregation::ModeChoice;
use crate::models::component::TransportMode;
use crate::models::cost_record::{CostKey, CostRecord};

pub fn print_stage_report(report: &StageReport) {
    println!("\n{} stage", report.stage);
    println!("----------------------------------------");
    println!("Computed: {}", report.computed);
    println!("Skipped: {}", report.skipped_count());
    for (code, count) in report.reasons_by_code() {
        println!("  {}: {}", code, count);
    }
}

pub fn print_run_summary(summary: &RunSummary) {
    println!("\nCost Records");
    println!("----------------------------------------");
    println!("Total: {}", summary.total());
    println!("Computed: {}", summary.computed);
    println!("Skipped: {}", summary.skipped);
    if !summary.reasons.is_empty() {
        println!("Skip reasons:");
        for (reason, count) in &summary.reasons {
            println!("  {} x {}", count, reason);
        }
    }
    if !summary.skipped_pairs.is_empty() {
        println!("Skipped demand center / mode pairs:");
        for pair in &summary.skipped_pairs {
            println!("  {} / {}: {}", pair.demand_center, pair.mode, pair.reason);
        }
    }
}

/// Cheapest computed LCOH per (demand center, mode)
pub fn cheapest_records(records: &BTreeMap<CostKey, CostRecord>) -> BTreeMap<(String, TransportMode), (u64, f64)> {
    let mut best: BTreeMap<(String, TransportMode), (u64, f64)> = BTreeMap::new();
    for (key, record) in records {
        let Some(breakdown) = record.breakdown() else { continue };
        let lcoh = breakdown.levelized_cost();
        let entry = best.entry((key.demand_center.clone(), key.mode)).or_insert((key.site_id, lcoh));
        if lcoh < entry.1 {
            *entry = (key.site_id, lcoh);
        }
    }
    best
}

pub fn print_cheapest_sites(records: &BTreeMap<CostKey, CostRecord>) {
    let best = cheapest_records(records);
    if best.is_empty() {
        return;
    }
    println!("\nLowest LCOH per Demand Center");
    println!("----------------------------------------");
    for ((demand_center, mode), (site_id, lcoh)) in best {
        println!("{} ({}): site {} at €{:.3}/kg", demand_center, mode, site_id, lcoh);
    }
}

/// Sites per (demand center, cheapest mode)
pub fn mode_counts(choices: &BTreeMap<(u64, String), ModeChoice>) -> BTreeMap<(String, TransportMode), usize> {
    let mut counts = BTreeMap::new();
    for ((_, demand_center), choice) in choices {
        *counts.entry((demand_center.clone(), choice.mode)).or_insert(0) += 1;
    }
    counts
}

pub fn print_mode_choices(choices: &BTreeMap<(u64, String), ModeChoice>) {
    if choices.is_empty() {
        return;
    }
    println!("\nCheapest Transport Mode");
    println!("----------------------------------------");
    for ((demand_center, mode), count) in mode_counts(choices) {
        println!("{}: {} at {} sites", demand_center, mode, count);
    }
}
