use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use super::component::{AssetClass, ComponentKind};
use crate::config::constants::*;

/// Interest rate and lifetime (years) of one financeable asset class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingTerms {
    pub interest_rate: f64,
    pub lifetime_years: f64,
}

impl FinancingTerms {
    pub fn new(interest_rate: f64, lifetime_years: f64) -> Self {
        Self { interest_rate, lifetime_years }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryParameters {
    pub country: String,
    pub solar: FinancingTerms,
    pub wind: FinancingTerms,
    pub plant: FinancingTerms,
    pub infrastructure: FinancingTerms,
    pub electricity_price: f64, // €/kWh
    pub heat_price: f64,        // €/kWh
}

impl CountryParameters {
    pub fn terms(&self, class: AssetClass) -> &FinancingTerms {
        match class {
            AssetClass::Solar => &self.solar,
            AssetClass::Wind => &self.wind,
            AssetClass::Plant => &self.plant,
            AssetClass::Infrastructure => &self.infrastructure,
        }
    }
}

/// Cost data of one component, per unit of its natural capacity unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnologyCost {
    pub capital_cost: f64,
    pub operating_cost: Option<f64>,
    pub lifetime_years: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnologyParameters {
    costs: BTreeMap<ComponentKind, TechnologyCost>,
}

impl TechnologyParameters {
    pub fn new(costs: BTreeMap<ComponentKind, TechnologyCost>) -> Self {
        Self { costs }
    }

    pub fn get(&self, component: ComponentKind) -> Option<&TechnologyCost> {
        self.costs.get(&component)
    }

    pub fn insert(&mut self, component: ComponentKind, cost: TechnologyCost) {
        self.costs.insert(component, cost);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterParameters {
    pub freshwater_treatment_kwh_per_m3: f64,
    pub ocean_treatment_kwh_per_m3: f64,
    pub transport_cost_per_100km_m3: f64,
    pub specific_cost_per_m3: f64,
    pub demand_litres_per_kg_h2: f64,
}

/// Capital and annual operating cost per km of road
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadTariff {
    pub capex_per_km: f64,
    pub opex_per_km: f64,
}

impl RoadTariff {
    pub fn unit_cost(&self) -> f64 {
        self.capex_per_km + self.opex_per_km
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureParameters {
    pub short_road: RoadTariff,
    pub long_road: RoadTariff,
}

/// Scalar constants shared by the stages. Defaults come from the injected engine
/// configuration and may be overridden by a global parameter table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConstants {
    pub degrees_to_km: f64,
    pub short_road_threshold_km: f64,
    pub placeholder_trucking_cost: f64, // €/km/kg
}

impl Default for GlobalConstants {
    fn default() -> Self {
        Self {
            degrees_to_km: DEGREES_TO_KM,
            short_road_threshold_km: SHORT_ROAD_THRESHOLD_KM,
            placeholder_trucking_cost: PLACEHOLDER_TRUCKING_COST,
        }
    }
}

/// Every parameter table a run needs, loaded once before computation starts and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub countries: BTreeMap<String, CountryParameters>,
    pub technology: TechnologyParameters,
    pub water: WaterParameters,
    pub infrastructure: InfrastructureParameters,
    pub global: GlobalConstants,
    /// Applied to every country without a row; only set when defaults were allowed
    pub fallback_country: Option<CountryParameters>,
}

impl ParameterSet {
    pub fn country(&self, code: &str) -> Option<&CountryParameters> {
        self.countries.get(code).or(self.fallback_country.as_ref())
    }
}
