use tracing::{debug, info, warn};

use crate::analysis::summary::StageReport;
use crate::config::engine_config::{EngineConfig, TransportCostSource};
use crate::errors::{ensure_finite, ValidationError};
use crate::models::columns;
use crate::models::component::TransportMode;
use crate::models::cost_record::SkipReason;
use crate::models::demand_center::DemandCenter;
use crate::models::parameters::{InfrastructureParameters, ParameterSet, RoadTariff};
use crate::models::site::Site;
use crate::utils::logging::{self, OperationCategory, StageType};
use crate::utils::parallel::map_items;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadTier {
    Short,
    Long,
}

/// `distance < threshold` is short; exactly at the threshold the long tier applies.
pub fn road_tier(distance_km: f64, threshold_km: f64) -> RoadTier {
    if distance_km < threshold_km {
        RoadTier::Short
    } else {
        RoadTier::Long
    }
}

fn tariff_for(infra: &InfrastructureParameters, tier: RoadTier) -> &RoadTariff {
    match tier {
        RoadTier::Short => &infra.short_road,
        RoadTier::Long => &infra.long_road,
    }
}

fn validate_distance(distance_km: f64) -> Result<f64, ValidationError> {
    if distance_km.is_finite() && distance_km >= 0.0 {
        Ok(distance_km)
    } else {
        Err(ValidationError::InvalidDistance {
            field: "demand center distance".to_string(),
            value: distance_km,
        })
    }
}

/// Road construction plus upkeep over `distance_km`, priced with the tier's own CAPEX and OPEX.
pub fn road_cost(distance_km: f64, infra: &InfrastructureParameters, threshold_km: f64) -> Result<f64, ValidationError> {
    let distance_km = validate_distance(distance_km)?;
    if distance_km == 0.0 {
        return Ok(0.0);
    }
    let tariff = tariff_for(infra, road_tier(distance_km, threshold_km));
    ensure_finite(
        "road construction cost",
        tariff.capex_per_km * distance_km + tariff.opex_per_km * distance_km,
    )
}

/// Linear stand-in for a trucking strategy optimizer: unit × km × kg/a
pub fn placeholder_trucking_cost(distance_km: f64, unit_cost_per_km_kg: f64, annual_demand_kg: f64) -> Result<f64, ValidationError> {
    let distance_km = validate_distance(distance_km)?;
    ensure_finite("placeholder trucking cost", unit_cost_per_km_kg * distance_km * annual_demand_kg)
}

/// Per (site, demand center) transport figures. [`TransportCost::mode_cost`] turns them
/// into the term each delivery mode carries into its total.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportCost {
    pub distance_km: f64,
    pub road_tier: RoadTier,
    pub road_construction_cost: f64,
    /// Fails when the demand center has no usable annual demand
    pub placeholder_trucking_cost: Result<f64, ValidationError>,
}

impl TransportCost {
    /// Both modes carry the access road. Trucking adds the placeholder trucking cost
    /// under [`TransportCostSource::RoadAndPlaceholderTrucking`]; pipeline never does.
    pub fn mode_cost(&self, mode: TransportMode, source: TransportCostSource) -> Result<f64, SkipReason> {
        match (mode, source) {
            (TransportMode::Trucking, TransportCostSource::RoadAndPlaceholderTrucking) => {
                let trucking = self.placeholder_trucking_cost.clone()?;
                Ok(ensure_finite("transport cost", self.road_construction_cost + trucking)?)
            }
            _ => Ok(self.road_construction_cost),
        }
    }
}

pub fn compute_transport(
    site: &Site,
    demand_center: &DemandCenter,
    params: &ParameterSet,
) -> Result<TransportCost, SkipReason> {
    let centroid = site
        .centroid()
        .ok_or_else(|| SkipReason::MissingInput(format!("site {} has an empty geometry", site.get_id())))?;

    let global = &params.global;
    let distance_km = validate_distance(centroid.distance_km(demand_center.get_location(), global.degrees_to_km))?;
    let road_construction_cost = road_cost(distance_km, &params.infrastructure, global.short_road_threshold_km)?;

    let placeholder = demand_center
        .validated_demand()
        .and_then(|demand| placeholder_trucking_cost(distance_km, global.placeholder_trucking_cost, demand));

    Ok(TransportCost {
        distance_km,
        road_tier: road_tier(distance_km, global.short_road_threshold_km),
        road_construction_cost,
        placeholder_trucking_cost: placeholder,
    })
}

/// Warns when the long-road tariff is cheaper than the short-road one; the tiered
/// cost then drops at the threshold and is no longer monotone in distance.
pub fn check_road_tariffs(infra: &InfrastructureParameters) -> bool {
    let short = infra.short_road.unit_cost();
    let long = infra.long_road.unit_cost();
    if long < short {
        warn!(
            "Long road unit cost ({:.2}/km) is below short road unit cost ({:.2}/km); road cost decreases at the threshold",
            long, short
        );
        return false;
    }
    true
}

/// Appends per-demand-center distance and road columns, the transport term of every
/// (demand center, mode) pair, the minimum distance to any demand center and the average
/// transport term over the pairs that were computed. Returns a new collection; `sites` is
/// left untouched.
pub fn run_transport_stage(
    sites: &[Site],
    demand_centers: &[DemandCenter],
    params: &ParameterSet,
    config: &EngineConfig,
) -> (Vec<Site>, StageReport) {
    let _timing = logging::start_timing("run_transport_stage",
        OperationCategory::Stage { subcategory: StageType::Transport });

    check_road_tariffs(&params.infrastructure);
    let source = config.transport_cost_source;

    let results = map_items(sites, config.parallel, |site| {
        let mut augmented = site.clone();
        let mut outcomes = Vec::with_capacity(demand_centers.len() * config.transport_modes.len());
        let mut min_distance: Option<f64> = None;
        let mut mode_costs = Vec::new();

        for dc in demand_centers {
            let name = dc.get_name();
            let cost = match compute_transport(site, dc, params) {
                Ok(cost) => cost,
                Err(reason) => {
                    for &mode in &config.transport_modes {
                        outcomes.push((format!("{} / {}", name, mode), Err(reason.clone())));
                    }
                    continue;
                }
            };

            augmented.append_column(columns::distance(name), cost.distance_km);
            augmented.append_column(columns::road_construction_cost(name), cost.road_construction_cost);
            if let Ok(trucking) = &cost.placeholder_trucking_cost {
                augmented.append_column(columns::placeholder_trucking_cost(name), *trucking);
            }
            min_distance = Some(min_distance.map_or(cost.distance_km, |m| m.min(cost.distance_km)));

            for &mode in &config.transport_modes {
                let column = columns::pair_transport_cost(name, mode);
                match cost.mode_cost(mode, source) {
                    Ok(value) => {
                        augmented.append_column(column, value);
                        mode_costs.push(value);
                        outcomes.push((format!("{} / {}", name, mode), Ok(())));
                    }
                    Err(reason) => {
                        augmented.remove_column(&column);
                        outcomes.push((format!("{} / {}", name, mode), Err(reason)));
                    }
                }
            }
        }

        if let Some(distance) = min_distance {
            augmented.append_column(columns::MIN_DISTANCE_TO_DEMAND, distance);
        }
        if !mode_costs.is_empty() {
            let average = mode_costs.iter().sum::<f64>() / mode_costs.len() as f64;
            augmented.append_column(columns::AVG_TRANSPORT_COST, average);
        }
        (augmented, outcomes)
    });

    let mut report = StageReport::new("transport");
    let mut output = Vec::with_capacity(results.len());
    for (site, outcomes) in results {
        for (pair, outcome) in outcomes {
            match outcome {
                Ok(()) => report.record_computed(),
                Err(reason) => {
                    debug!("Transport skipped for site {} / {}: {}", site.get_id(), pair, reason);
                    report.record_skip(format!("site {} / {}", site.get_id(), pair), reason);
                }
            }
        }
        output.push(site);
    }

    info!(
        "Transport stage: {} site/demand/mode entries computed, {} skipped",
        report.computed,
        report.skipped_count()
    );
    (output, report)
}
