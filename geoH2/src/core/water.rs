//! Water supply cost per kg of hydrogen.
//!
//! Every sourcing option is a named candidate evaluated per site; the lowest wins and all
//! candidates are kept in the output so the choice can be audited.

use tracing::{debug, info};

use crate::analysis::summary::StageReport;
use crate::config::constants::{LITRES_PER_CUBIC_METRE, WATER_TRANSPORT_REFERENCE_KM};
use crate::config::engine_config::EngineConfig;
use crate::errors::{ensure_finite, ValidationError};
use crate::models::columns;
use crate::models::cost_record::SkipReason;
use crate::models::parameters::{ParameterSet, WaterParameters};
use crate::models::site::Site;
use crate::utils::logging::{self, OperationCategory, StageType};
use crate::utils::parallel::map_items;

pub trait WaterSourcing: Send + Sync {
    /// Column name of the candidate ("Freshwater cost")
    fn name(&self) -> &'static str;

    /// Cost per kg H2 of sourcing water for `site` this way
    fn unit_cost(&self, site: &Site, water: &WaterParameters, electricity_price: f64) -> Result<f64, ValidationError>;
}

/// `(specific + transport/100 km × d + kWh/m3 × price) × L/kg / 1000`
pub fn water_unit_cost(
    distance_km: f64,
    treatment_kwh_per_m3: f64,
    water: &WaterParameters,
    electricity_price: f64,
) -> Result<f64, ValidationError> {
    let per_m3 = water.specific_cost_per_m3
        + water.transport_cost_per_100km_m3 / WATER_TRANSPORT_REFERENCE_KM * distance_km
        + treatment_kwh_per_m3 * electricity_price;
    ensure_finite("water cost", per_m3 * water.demand_litres_per_kg_h2 / LITRES_PER_CUBIC_METRE)
}

/// Nearest lake or river, treated with freshwater energy intensity
#[derive(Debug, Clone, Copy, Default)]
pub struct Freshwater;

/// Coast, treated (desalinated) with ocean energy intensity
#[derive(Debug, Clone, Copy, Default)]
pub struct OceanWater;

impl WaterSourcing for Freshwater {
    fn name(&self) -> &'static str {
        columns::FRESHWATER_COST
    }

    fn unit_cost(&self, site: &Site, water: &WaterParameters, electricity_price: f64) -> Result<f64, ValidationError> {
        let distances = site.get_distances();
        let waterbody = site.require_distance("waterbody_dist", distances.waterbody)?;
        let waterway = site.require_distance("waterway_dist", distances.waterway)?;
        water_unit_cost(
            waterbody.min(waterway),
            water.freshwater_treatment_kwh_per_m3,
            water,
            electricity_price,
        )
    }
}

impl WaterSourcing for OceanWater {
    fn name(&self) -> &'static str {
        columns::OCEAN_WATER_COST
    }

    fn unit_cost(&self, site: &Site, water: &WaterParameters, electricity_price: f64) -> Result<f64, ValidationError> {
        let ocean = site.require_distance("ocean_dist", site.get_distances().ocean)?;
        water_unit_cost(ocean, water.ocean_treatment_kwh_per_m3, water, electricity_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterCandidate {
    pub name: &'static str,
    pub cost: f64,
}

/// All evaluated candidates of one site and the index of the cheapest
#[derive(Debug, Clone, PartialEq)]
pub struct WaterSelection {
    candidates: Vec<WaterCandidate>,
    selected: usize,
}

impl WaterSelection {
    pub fn candidates(&self) -> &[WaterCandidate] {
        &self.candidates
    }

    pub fn selected(&self) -> &WaterCandidate {
        &self.candidates[self.selected]
    }

    pub fn lowest_cost(&self) -> f64 {
        self.selected().cost
    }
}

pub struct WaterCostModel {
    sources: Vec<Box<dyn WaterSourcing>>,
}

impl WaterCostModel {
    pub fn new(sources: Vec<Box<dyn WaterSourcing>>) -> Self {
        Self { sources }
    }

    /// Freshwater and ocean water, in that order
    pub fn standard() -> Self {
        Self::new(vec![Box::new(Freshwater), Box::new(OceanWater)])
    }

    /// Evaluates every candidate; any failing candidate invalidates the site.
    /// Ties keep the earlier candidate.
    pub fn evaluate(&self, site: &Site, water: &WaterParameters, electricity_price: f64) -> Result<WaterSelection, SkipReason> {
        let mut candidates: Vec<WaterCandidate> = Vec::with_capacity(self.sources.len());
        let mut selected = 0;

        for source in &self.sources {
            let cost = source.unit_cost(site, water, electricity_price)?;
            if !candidates.is_empty() && cost < candidates[selected].cost {
                selected = candidates.len();
            }
            candidates.push(WaterCandidate { name: source.name(), cost });
        }

        if candidates.is_empty() {
            return Err(SkipReason::MissingInput("no water sourcing options configured".to_string()));
        }
        Ok(WaterSelection { candidates, selected })
    }
}

impl Default for WaterCostModel {
    fn default() -> Self {
        Self::standard()
    }
}

/// Appends one column per candidate plus the lowest cost. Sites failing validation, or
/// whose country has no parameters, get none of them.
pub fn run_water_stage(
    sites: &[Site],
    params: &ParameterSet,
    model: &WaterCostModel,
    config: &EngineConfig,
) -> (Vec<Site>, StageReport) {
    let _timing = logging::start_timing("run_water_stage",
        OperationCategory::Stage { subcategory: StageType::Water });

    let results = map_items(sites, config.parallel, |site| {
        let mut augmented = site.clone();
        let outcome = match params.country(site.get_country()) {
            None => Err(SkipReason::MissingInput(format!(
                "no country parameters for '{}'",
                site.get_country()
            ))),
            Some(country) => model.evaluate(site, &params.water, country.electricity_price),
        };

        let outcome = outcome.map(|selection| {
            for candidate in selection.candidates() {
                augmented.append_column(candidate.name, candidate.cost);
            }
            augmented.append_column(columns::LOWEST_WATER_COST, selection.lowest_cost());
        });
        (augmented, outcome)
    });

    let mut report = StageReport::new("water");
    let mut output = Vec::with_capacity(results.len());
    for (site, outcome) in results {
        match outcome {
            Ok(()) => report.record_computed(),
            Err(reason) => {
                debug!("Water cost skipped for site {}: {}", site.get_id(), reason);
                report.record_skip(format!("site {}", site.get_id()), reason);
            }
        }
        output.push(site);
    }

    info!("Water stage: {} sites computed, {} skipped", report.computed, report.skipped_count());
    (output, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::site::SiteDistances;
    use crate::test_support::{parameter_set, water_parameters};
    use crate::utils::geometry::{GeoPoint, Geometry};

    fn site(country: &str, waterbody: Option<f64>, waterway: Option<f64>, ocean: Option<f64>) -> Site {
        Site::new(
            1,
            Geometry::Point(GeoPoint::new(15.0, -26.0)),
            country,
            SiteDistances { waterbody, waterway, ocean, ..Default::default() },
        )
    }

    #[test]
    fn unit_cost_converts_litres_to_cubic_metres() {
        let water = WaterParameters {
            freshwater_treatment_kwh_per_m3: 0.0,
            ocean_treatment_kwh_per_m3: 0.0,
            transport_cost_per_100km_m3: 100.0,
            specific_cost_per_m3: 0.0,
            demand_litres_per_kg_h2: 1000.0,
        };
        // 100 per 100 km over 3 km, one cubic metre per kg
        assert!((water_unit_cost(3.0, 0.0, &water, 0.1).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn freshwater_uses_the_nearer_of_lake_and_river() {
        let water = water_parameters();
        let near_river = Freshwater.unit_cost(&site("NA", Some(40.0), Some(20.0), Some(1.0)), &water, 0.1).unwrap();
        let expected = water_unit_cost(20.0, water.freshwater_treatment_kwh_per_m3, &water, 0.1).unwrap();
        assert_eq!(near_river, expected);
    }

    #[test]
    fn nearby_ocean_beats_distant_freshwater() {
        let water = water_parameters();
        let site = site("NA", Some(20.0), Some(20.0), Some(5.0));
        let selection = WaterCostModel::standard().evaluate(&site, &water, 0.10465).unwrap();

        let fresh = selection.candidates()[0].cost;
        let ocean = selection.candidates()[1].cost;
        assert_eq!(selection.selected().name, columns::OCEAN_WATER_COST);
        assert_eq!(selection.lowest_cost(), ocean);
        assert!(ocean < fresh);
    }

    #[test]
    fn model_without_sources_has_nothing_to_select() {
        let site = site("NA", Some(1.0), Some(1.0), Some(1.0));
        let err = WaterCostModel::new(Vec::new()).evaluate(&site, &water_parameters(), 0.1).unwrap_err();
        assert_eq!(err.code(), "MISSING_INPUT");
    }

    #[test]
    fn custom_model_selects_among_its_own_sources() {
        let site = site("NA", None, None, Some(4.0));
        let model = WaterCostModel::new(vec![Box::new(OceanWater)]);
        let selection = model.evaluate(&site, &water_parameters(), 0.1).unwrap();
        assert_eq!(selection.candidates().len(), 1);
        assert_eq!(selection.selected().name, columns::OCEAN_WATER_COST);
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let water = WaterParameters { ocean_treatment_kwh_per_m3: 0.4, ..water_parameters() };
        let site = site("NA", Some(7.0), Some(7.0), Some(7.0));
        let selection = WaterCostModel::standard().evaluate(&site, &water, 0.1).unwrap();
        assert_eq!(selection.selected().name, columns::FRESHWATER_COST);
    }

    #[test]
    fn missing_or_negative_distance_fails_the_site() {
        let water = water_parameters();
        let model = WaterCostModel::standard();

        let err = model.evaluate(&site("NA", Some(1.0), Some(1.0), None), &water, 0.1).unwrap_err();
        assert_eq!(err.code(), "MISSING_DISTANCE");
        let err = model.evaluate(&site("NA", Some(-2.0), Some(1.0), Some(1.0)), &water, 0.1).unwrap_err();
        assert_eq!(err.code(), "INVALID_DISTANCE");
    }

    #[test]
    fn stage_leaves_failed_sites_without_water_columns() {
        let params = parameter_set();
        let config = EngineConfig { parallel: false, ..EngineConfig::default() };
        let sites = vec![
            site("NA", Some(10.0), Some(12.0), Some(30.0)),
            site("NA", None, Some(12.0), Some(30.0)),
            site("ZZ", Some(10.0), Some(12.0), Some(30.0)),
        ];

        let (out, report) = run_water_stage(&sites, &params, &WaterCostModel::standard(), &config);

        assert_eq!(report.computed, 1);
        assert_eq!(report.skipped_count(), 2);
        assert!(out[0].has_column(columns::FRESHWATER_COST));
        assert!(out[0].has_column(columns::OCEAN_WATER_COST));
        let lowest = out[0].column(columns::LOWEST_WATER_COST).unwrap();
        assert_eq!(lowest, out[0].column(columns::FRESHWATER_COST).unwrap());
        assert!(!out[1].has_column(columns::LOWEST_WATER_COST));
        assert!(!out[2].has_column(columns::LOWEST_WATER_COST));
        assert_eq!(report.reasons_by_code().get("MISSING_INPUT"), Some(&1));
    }
}
