use std::collections::BTreeMap;
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::config::constants::*;
use crate::core::annuity::AnnuitizationMethod;
use crate::errors::{InputError, InputResult};
use crate::models::component::{ComponentKind, TransportMode};
use crate::models::parameters::{CountryParameters, FinancingTerms, GlobalConstants};

/// Which figure feeds the "transport cost" term of the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TransportCostSource {
    /// Road construction and upkeep only
    Road,
    /// Road plus the linear placeholder trucking estimate
    RoadAndPlaceholderTrucking,
}

/// Annuitization formula per component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnuitizationPlan {
    pub default: AnnuitizationMethod,
    pub overrides: BTreeMap<ComponentKind, AnnuitizationMethod>,
}

impl Default for AnnuitizationPlan {
    fn default() -> Self {
        Self {
            default: AnnuitizationMethod::StraightLine,
            overrides: BTreeMap::new(),
        }
    }
}

impl AnnuitizationPlan {
    pub fn uniform(method: AnnuitizationMethod) -> Self {
        Self { default: method, overrides: BTreeMap::new() }
    }

    pub fn method_for(&self, component: ComponentKind) -> AnnuitizationMethod {
        self.overrides.get(&component).copied().unwrap_or(self.default)
    }
}

/// Country terms applied to every site when no country parameter table exists
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryDefaults {
    pub interest_rate: f64,
    pub generation_lifetime: f64,     // Solar and wind
    pub plant_lifetime: f64,
    pub infrastructure_lifetime: f64,
    pub electricity_price: f64,       // €/kWh
    pub heat_price: f64,              // €/kWh
}

impl Default for CountryDefaults {
    fn default() -> Self {
        Self {
            interest_rate: DEFAULT_INTEREST_RATE,
            generation_lifetime: DEFAULT_GENERATION_LIFETIME,
            plant_lifetime: DEFAULT_PLANT_LIFETIME,
            infrastructure_lifetime: DEFAULT_INFRASTRUCTURE_LIFETIME,
            electricity_price: DEFAULT_ELECTRICITY_PRICE,
            heat_price: DEFAULT_HEAT_PRICE,
        }
    }
}

impl CountryDefaults {
    pub fn to_parameters(&self, country: &str) -> CountryParameters {
        CountryParameters {
            country: country.to_string(),
            solar: FinancingTerms::new(self.interest_rate, self.generation_lifetime),
            wind: FinancingTerms::new(self.interest_rate, self.generation_lifetime),
            plant: FinancingTerms::new(self.interest_rate, self.plant_lifetime),
            infrastructure: FinancingTerms::new(self.interest_rate, self.infrastructure_lifetime),
            electricity_price: self.electricity_price,
            heat_price: self.heat_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultParameters {
    pub global: GlobalConstants,
    pub country: CountryDefaults,
    /// Without this flag a missing country parameter file aborts the run
    pub allow_default_country_parameters: bool,
}

impl Default for DefaultParameters {
    fn default() -> Self {
        Self {
            global: GlobalConstants::default(),
            country: CountryDefaults::default(),
            allow_default_country_parameters: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub transport_cost_source: TransportCostSource,
    pub annuitization: AnnuitizationPlan,
    pub transport_modes: Vec<TransportMode>,
    pub required_components: Vec<ComponentKind>,
    pub defaults: DefaultParameters,
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            transport_cost_source: TransportCostSource::Road,
            annuitization: AnnuitizationPlan::default(),
            transport_modes: TransportMode::ALL.to_vec(),
            required_components: ComponentKind::ALL.to_vec(),
            defaults: DefaultParameters::default(),
            parallel: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> InputResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| InputError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|source| InputError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
