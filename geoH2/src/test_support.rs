// Shared fixtures for unit tests

use std::collections::BTreeMap;

use crate::config::engine_config::CountryDefaults;
use crate::models::component::ComponentKind;
use crate::models::parameters::{
    GlobalConstants, InfrastructureParameters, ParameterSet, RoadTariff, TechnologyCost,
    TechnologyParameters, WaterParameters,
};

pub fn water_parameters() -> WaterParameters {
    WaterParameters {
        freshwater_treatment_kwh_per_m3: 0.4,
        ocean_treatment_kwh_per_m3: 0.8,
        transport_cost_per_100km_m3: 0.5,
        specific_cost_per_m3: 1.25,
        demand_litres_per_kg_h2: 21.0,
    }
}

pub fn technology_parameters() -> TechnologyParameters {
    let mut costs = BTreeMap::new();
    for (component, capex, lifetime) in [
        (ComponentKind::Wind, 1.5, 20.0),
        (ComponentKind::Solar, 1.0, 25.0),
        (ComponentKind::Electrolyzer, 2.0, 20.0),
        (ComponentKind::Battery, 0.5, 10.0),
        (ComponentKind::H2Storage, 0.02, 20.0),
    ] {
        costs.insert(component, TechnologyCost { capital_cost: capex, operating_cost: None, lifetime_years: lifetime });
    }
    TechnologyParameters::new(costs)
}

pub fn parameter_set() -> ParameterSet {
    let mut countries = BTreeMap::new();
    countries.insert("NA".to_string(), CountryDefaults::default().to_parameters("NA"));

    ParameterSet {
        countries,
        technology: technology_parameters(),
        water: water_parameters(),
        infrastructure: InfrastructureParameters {
            short_road: RoadTariff { capex_per_km: 100.0, opex_per_km: 10.0 },
            long_road: RoadTariff { capex_per_km: 200.0, opex_per_km: 20.0 },
        },
        global: GlobalConstants::default(),
        fallback_country: None,
    }
}
