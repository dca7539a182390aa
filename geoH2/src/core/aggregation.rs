//! Annuitization and aggregation over every (site, demand center, mode) triple.
//!
//! Inputs are the columns left by the transport, water and capacity stages. Each triple is
//! independent, so the work is spread over rayon and merged back by [`CostKey`]; completion
//! order never shows in the result.
//!
//! Two levels of tolerance:
//! - a (demand center, mode) pair whose required capacity column is absent on every site
//!   is skipped as a whole and logged;
//! - a single triple with a missing or invalid value is marked skipped with its reason and
//!   its cost columns stay unset.
//!
//! When a stage input is missing, the upstream check is repeated so the record carries the
//! reason the site failed there (an invalid distance, say) rather than the missing column.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analysis::summary::{RunSummary, SkippedPair};
use crate::config::engine_config::EngineConfig;
use crate::core::annuity::annual_component_cost;
use crate::core::transport::compute_transport;
use crate::core::water::WaterCostModel;
use crate::errors::EngineError;
use crate::models::columns;
use crate::models::component::{ComponentKind, TransportMode};
use crate::models::cost_record::{CostBreakdown, CostKey, CostRecord, SkipReason};
use crate::models::demand_center::DemandCenter;
use crate::models::parameters::{CountryParameters, FinancingTerms, ParameterSet};
use crate::models::site::Site;
use crate::utils::logging::{self, OperationCategory, StageType};
use crate::utils::parallel::map_items;

/// Least-cost delivery mode of one (site, demand center)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeChoice {
    pub mode: TransportMode,
    pub levelized_cost: f64,
}

#[derive(Debug, Clone)]
pub struct AggregationOutput {
    pub sites: Vec<Site>,
    pub records: BTreeMap<CostKey, CostRecord>,
    /// Keyed by (site id, demand center); pairs without a computed record are absent
    pub mode_choices: BTreeMap<(u64, String), ModeChoice>,
    pub summary: RunSummary,
}

/// Required capacity columns of a pair that no site carries
fn missing_pair_columns(sites: &[Site], demand_center: &str, mode: TransportMode, required: &[ComponentKind]) -> Vec<String> {
    required
        .iter()
        .map(|component| columns::capacity(demand_center, mode, *component))
        .filter(|column| !sites.iter().any(|site| site.has_column(column)))
        .collect()
}

fn missing_column(column: &str) -> SkipReason {
    SkipReason::MissingInput(format!("missing column '{}'", column))
}

fn lowest_water_cost(
    site: &Site,
    params: &ParameterSet,
    country: &CountryParameters,
    water_model: &WaterCostModel,
) -> Result<f64, SkipReason> {
    if let Some(cost) = site.column(columns::LOWEST_WATER_COST) {
        return Ok(cost);
    }
    water_model.evaluate(site, &params.water, country.electricity_price)?;
    Err(missing_column(columns::LOWEST_WATER_COST))
}

fn transport_term(
    site: &Site,
    demand_center: &DemandCenter,
    mode: TransportMode,
    params: &ParameterSet,
    config: &EngineConfig,
) -> Result<f64, SkipReason> {
    let column = columns::pair_transport_cost(demand_center.get_name(), mode);
    if let Some(cost) = site.column(&column) {
        return Ok(cost);
    }
    compute_transport(site, demand_center, params)?.mode_cost(mode, config.transport_cost_source)?;
    Err(missing_column(&column))
}

/// Cost breakdown of one triple from the site's appended columns.
pub fn evaluate_triple(
    site: &Site,
    demand_center: &DemandCenter,
    mode: TransportMode,
    params: &ParameterSet,
    water_model: &WaterCostModel,
    config: &EngineConfig,
) -> Result<CostBreakdown, SkipReason> {
    let name = demand_center.get_name();
    let demand = demand_center.validated_demand()?;

    let country = params.country(site.get_country()).ok_or_else(|| {
        SkipReason::MissingInput(format!("no country parameters for '{}'", site.get_country()))
    })?;

    let water_unit_cost = lowest_water_cost(site, params, country, water_model)?;
    let transport_cost = transport_term(site, demand_center, mode, params, config)?;

    let mut component_costs = BTreeMap::new();
    for component in ComponentKind::ALL {
        let column = columns::capacity(name, mode, component);
        let capacity = match site.column(&column) {
            Some(capacity) => capacity,
            None if config.required_components.contains(&component) => return Err(missing_column(&column)),
            None => continue,
        };

        let technology = params.technology.get(component).ok_or_else(|| {
            SkipReason::MissingInput(format!("no technology parameters for {}", component))
        })?;
        let terms = FinancingTerms::new(
            country.terms(component.asset_class()).interest_rate,
            technology.lifetime_years,
        );
        let method = config.annuitization.method_for(component);
        let annual = annual_component_cost(component, capacity, technology.capital_cost, &terms, &method)?;
        component_costs.insert(component, annual);
    }

    Ok(CostBreakdown::new(component_costs, water_unit_cost, transport_cost, name, demand)?)
}

/// Cheapest computed mode per (site, demand center). Skipped records never compete; on
/// equal LCOH the mode that comes first in [`TransportMode::ALL`] is kept.
pub fn select_cheapest_modes(records: &BTreeMap<CostKey, CostRecord>) -> BTreeMap<(u64, String), ModeChoice> {
    let mut choices: BTreeMap<(u64, String), ModeChoice> = BTreeMap::new();
    for (key, record) in records {
        let Some(breakdown) = record.breakdown() else { continue };
        let candidate = ModeChoice { mode: key.mode, levelized_cost: breakdown.levelized_cost() };
        match choices.entry((key.site_id, key.demand_center.clone())) {
            Entry::Vacant(entry) => {
                entry.insert(candidate);
            }
            Entry::Occupied(mut entry) => {
                if candidate.levelized_cost < entry.get().levelized_cost {
                    entry.insert(candidate);
                }
            }
        }
    }
    choices
}

fn progress_bar(len: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} cost records")
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

/// Removes cost-stage output of a demand center so a rerun never leaves stale figures
/// next to a record that is now skipped. Transport terms are stage inputs and stay.
fn clear_cost_columns(site: &mut Site, demand_center: &str) {
    for mode in TransportMode::ALL {
        for component in ComponentKind::ALL {
            site.remove_column(&columns::component_cost(demand_center, mode, component));
        }
        site.remove_column(&columns::pair_water_cost(demand_center, mode));
        site.remove_column(&columns::total_cost(demand_center, mode));
        site.remove_column(&columns::lcoh(demand_center, mode));
    }
    site.remove_column(&columns::lowest_lcoh(demand_center));
    site.remove_passthrough(&columns::cheapest_mode(demand_center));
}

fn append_cost_columns(site: &mut Site, key: &CostKey, breakdown: &CostBreakdown) {
    let (dc, mode) = (key.demand_center.as_str(), key.mode);
    for (component, cost) in breakdown.component_costs() {
        site.append_column(columns::component_cost(dc, mode, *component), *cost);
    }
    site.append_column(columns::pair_water_cost(dc, mode), breakdown.water_cost());
    site.append_column(columns::total_cost(dc, mode), breakdown.total_cost());
    site.append_column(columns::lcoh(dc, mode), breakdown.levelized_cost());
}

/// Runs the cost stage. Fails only on an illegal record transition, which would mean two
/// results for the same key.
pub fn run_aggregation_stage(
    sites: &[Site],
    demand_centers: &[DemandCenter],
    params: &ParameterSet,
    water_model: &WaterCostModel,
    config: &EngineConfig,
    show_progress: bool,
) -> Result<AggregationOutput, EngineError> {
    let _timing = logging::start_timing("run_aggregation_stage",
        OperationCategory::Stage { subcategory: StageType::Aggregation });

    let mut records: BTreeMap<CostKey, CostRecord> = BTreeMap::new();
    let mut skipped_pairs = Vec::new();
    let mut triples: Vec<(usize, usize, TransportMode)> = Vec::new();

    for (dc_index, dc) in demand_centers.iter().enumerate() {
        for &mode in &config.transport_modes {
            let missing = missing_pair_columns(sites, dc.get_name(), mode, &config.required_components);
            if missing.is_empty() {
                triples.extend((0..sites.len()).map(|site_index| (site_index, dc_index, mode)));
                continue;
            }

            let reason = format!("capacity column '{}' absent for every site", missing[0]);
            warn!("Skipping {} / {}: {}", dc.get_name(), mode, reason);
            for site in sites {
                let mut record = CostRecord::new(CostKey::new(site.get_id(), dc.get_name(), mode));
                record.skip(SkipReason::MissingInput(reason.clone()))?;
                records.insert(record.get_key().clone(), record);
            }
            skipped_pairs.push(SkippedPair {
                demand_center: dc.get_name().to_string(),
                mode,
                reason,
            });
        }
    }

    debug!("Evaluating {} cost records", triples.len());
    let bar = progress_bar(triples.len(), show_progress);

    let results = map_items(&triples, config.parallel, |&(site_index, dc_index, mode)| {
        let site = &sites[site_index];
        let dc = &demand_centers[dc_index];
        let outcome = evaluate_triple(site, dc, mode, params, water_model, config);
        bar.inc(1);
        (CostKey::new(site.get_id(), dc.get_name(), mode), outcome)
    });
    bar.finish_and_clear();

    for (key, outcome) in results {
        let mut record = CostRecord::new(key.clone());
        match outcome {
            Ok(breakdown) => record.complete(breakdown)?,
            Err(reason) => {
                debug!("Cost record {} skipped: {}", key, reason);
                record.skip(reason)?;
            }
        }
        if records.insert(key.clone(), record).is_some() {
            return Err(EngineError::InvalidTransition { key: key.to_string(), state: "computed" });
        }
    }

    let mut output_sites = sites.to_vec();
    for site in &mut output_sites {
        for dc in demand_centers {
            clear_cost_columns(site, dc.get_name());
        }
    }
    let index_by_id: HashMap<u64, usize> = output_sites
        .iter()
        .enumerate()
        .map(|(index, site)| (site.get_id(), index))
        .collect();

    for (key, record) in &records {
        if let (Some(breakdown), Some(&index)) = (record.breakdown(), index_by_id.get(&key.site_id)) {
            append_cost_columns(&mut output_sites[index], key, breakdown);
        }
    }

    let mode_choices = select_cheapest_modes(&records);
    for ((site_id, dc), choice) in &mode_choices {
        if let Some(&index) = index_by_id.get(site_id) {
            let site = &mut output_sites[index];
            site.append_column(columns::lowest_lcoh(dc), choice.levelized_cost);
            site.insert_passthrough(columns::cheapest_mode(dc), Value::from(choice.mode.label()));
        }
    }

    let summary = RunSummary::from_records(&records, skipped_pairs);
    info!(
        "Cost stage: {} records computed, {} skipped, {} pairs dropped",
        summary.computed,
        summary.skipped,
        summary.skipped_pairs.len()
    );

    Ok(AggregationOutput {
        sites: output_sites,
        records,
        mode_choices,
        summary,
    })
}
