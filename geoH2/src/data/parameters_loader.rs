use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::config::constants::*;
use crate::config::engine_config::DefaultParameters;
use crate::data::csv_table::{KeyValueTable, WideTable};
use crate::errors::{InputError, InputResult};
use crate::models::component::ComponentKind;
use crate::models::parameters::*;
use crate::utils::logging::{self, FileIOType, OperationCategory};

const COUNTRY_KEY: &str = "Country";
const COUNTRY_COLUMNS: [&str; 10] = [
    "Solar interest rate",
    "Solar lifetime [a]",
    "Wind interest rate",
    "Wind lifetime [a]",
    "Plant interest rate",
    "Plant lifetime [a]",
    "Infrastructure interest rate",
    "Infrastructure lifetime [a]",
    "Electricity price [€/kWh]",
    "Heat price [€/kWh]",
];

const INFRA_KEY: &str = "Infrastructure";
const INFRA_CAPEX: &str = "CAPEX [€/km]";
const INFRA_OPEX: &str = "OPEX [€/km/a]";

const FRESHWATER_TREATMENT: &str = "Freshwater treatment electricity demand [kWh/m3]";
const OCEAN_TREATMENT: &str = "Ocean water treatment electricity demand [kWh/m3]";
const WATER_TRANSPORT: &str = "Water transport cost [€/100 km/m3]";
const WATER_SPECIFIC: &str = "Water specific cost [€/m3]";
const WATER_DEMAND: &str = "Water demand [L/kg H2]";

const GLOBAL_DEGREES_TO_KM: &str = "Degrees to km [km/deg]";
const GLOBAL_SHORT_ROAD_THRESHOLD: &str = "Short road threshold [km]";
const GLOBAL_PLACEHOLDER_TRUCKING: &str = "Placeholder trucking cost [€/km/kg]";

pub fn capital_cost_key(component: ComponentKind) -> String {
    format!("{} capital cost [€/{}]", component.parameter_label(), component.capacity_unit())
}

pub fn operating_cost_key(component: ComponentKind) -> String {
    format!("{} operating cost [€/{}/a]", component.parameter_label(), component.capacity_unit())
}

pub fn lifetime_key(component: ComponentKind) -> String {
    format!("{} lifetime [a]", component.parameter_label())
}

pub fn parse_country_parameters(table: &WideTable) -> InputResult<BTreeMap<String, CountryParameters>> {
    let mut countries = BTreeMap::new();
    for row in table.rows() {
        let terms = |asset: &str| -> InputResult<FinancingTerms> {
            Ok(FinancingTerms::new(
                row.f64(&format!("{} interest rate", asset))?,
                row.f64(&format!("{} lifetime [a]", asset))?,
            ))
        };
        let params = CountryParameters {
            country: row.key().to_string(),
            solar: terms("Solar")?,
            wind: terms("Wind")?,
            plant: terms("Plant")?,
            infrastructure: terms("Infrastructure")?,
            electricity_price: row.f64("Electricity price [€/kWh]")?,
            heat_price: row.f64("Heat price [€/kWh]")?,
        };
        if countries.insert(row.key().to_string(), params).is_some() {
            return Err(InputError::DuplicateKey {
                table: table.name().to_string(),
                key: row.key().to_string(),
            });
        }
    }
    Ok(countries)
}

pub fn parse_technology_parameters(table: &KeyValueTable) -> InputResult<TechnologyParameters> {
    let mut technology = TechnologyParameters::default();
    for component in ComponentKind::ALL {
        technology.insert(component, TechnologyCost {
            capital_cost: table.get_f64(&capital_cost_key(component))?,
            operating_cost: table.get_optional_f64(&operating_cost_key(component))?,
            lifetime_years: table.get_f64(&lifetime_key(component))?,
        });
    }
    Ok(technology)
}

pub fn parse_water_parameters(table: &KeyValueTable) -> InputResult<WaterParameters> {
    Ok(WaterParameters {
        freshwater_treatment_kwh_per_m3: table.get_f64(FRESHWATER_TREATMENT)?,
        ocean_treatment_kwh_per_m3: table.get_f64(OCEAN_TREATMENT)?,
        transport_cost_per_100km_m3: table.get_f64(WATER_TRANSPORT)?,
        specific_cost_per_m3: table.get_f64(WATER_SPECIFIC)?,
        demand_litres_per_kg_h2: table.get_f64(WATER_DEMAND)?,
    })
}

pub fn parse_infrastructure_parameters(table: &WideTable) -> InputResult<InfrastructureParameters> {
    let tariff = |name: &str| -> InputResult<RoadTariff> {
        let row = table
            .row(name)
            .ok_or_else(|| InputError::missing_parameter(table.name(), name))?;
        Ok(RoadTariff {
            capex_per_km: row.f64(INFRA_CAPEX)?,
            opex_per_km: row.f64(INFRA_OPEX)?,
        })
    };
    Ok(InfrastructureParameters {
        short_road: tariff(SHORT_ROAD_NAME)?,
        long_road: tariff(LONG_ROAD_NAME)?,
    })
}

/// Overrides only the constants present in the table
pub fn apply_global_overrides(table: &KeyValueTable, defaults: GlobalConstants) -> InputResult<GlobalConstants> {
    Ok(GlobalConstants {
        degrees_to_km: table.get_optional_f64(GLOBAL_DEGREES_TO_KM)?.unwrap_or(defaults.degrees_to_km),
        short_road_threshold_km: table
            .get_optional_f64(GLOBAL_SHORT_ROAD_THRESHOLD)?
            .unwrap_or(defaults.short_road_threshold_km),
        placeholder_trucking_cost: table
            .get_optional_f64(GLOBAL_PLACEHOLDER_TRUCKING)?
            .unwrap_or(defaults.placeholder_trucking_cost),
    })
}

/// Loads every parameter table of `dir` once, before any computation.
///
/// Missing technology, water or infrastructure files abort the run. A missing country
/// file aborts too unless country defaults were explicitly allowed. A missing global file
/// keeps the injected defaults.
pub fn load_parameter_set(dir: &Path, defaults: &DefaultParameters) -> InputResult<ParameterSet> {
    let _timing = logging::start_timing("load_parameter_set",
        OperationCategory::FileIO { subcategory: FileIOType::DataLoad });

    let country_path = dir.join(COUNTRY_PARAMETERS_FILE);
    let (countries, fallback_country) =
        match WideTable::from_path(&country_path, COUNTRY_PARAMETERS_FILE, COUNTRY_KEY, &COUNTRY_COLUMNS) {
            Ok(table) => (parse_country_parameters(&table)?, None),
            Err(InputError::MissingFile { .. }) if defaults.allow_default_country_parameters => {
                warn!("{} not found; using default country parameters for every site", country_path.display());
                (BTreeMap::new(), Some(defaults.country.to_parameters("default")))
            }
            Err(e) => return Err(e),
        };

    let technology = parse_technology_parameters(&KeyValueTable::from_path(
        &dir.join(TECHNOLOGY_PARAMETERS_FILE),
        TECHNOLOGY_PARAMETERS_FILE,
    )?)?;

    let water = parse_water_parameters(&KeyValueTable::from_path(
        &dir.join(WATER_PARAMETERS_FILE),
        WATER_PARAMETERS_FILE,
    )?)?;

    let infrastructure = parse_infrastructure_parameters(&WideTable::from_path(
        &dir.join(INFRA_PARAMETERS_FILE),
        INFRA_PARAMETERS_FILE,
        INFRA_KEY,
        &[INFRA_CAPEX, INFRA_OPEX],
    )?)?;

    let global = match KeyValueTable::from_path(&dir.join(GLOBAL_PARAMETERS_FILE), GLOBAL_PARAMETERS_FILE) {
        Ok(table) => apply_global_overrides(&table, defaults.global)?,
        Err(InputError::MissingFile { .. }) => defaults.global,
        Err(e) => return Err(e),
    };

    info!(
        "Loaded parameters for {} countries from {}",
        countries.len(),
        dir.display()
    );

    Ok(ParameterSet {
        countries,
        technology,
        water,
        infrastructure,
        global,
        fallback_country,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTRY_CSV: &str = "Country,Solar interest rate,Solar lifetime [a],Wind interest rate,Wind lifetime [a],\
Plant interest rate,Plant lifetime [a],Infrastructure interest rate,Infrastructure lifetime [a],\
Electricity price [€/kWh],Heat price [€/kWh]\nNA,0.05,25,0.06,20,0.07,20,0.04,50,0.1,0.02\n";

    #[test]
    fn country_rows_map_to_asset_classes() {
        let table = WideTable::from_reader(COUNTRY_CSV.as_bytes(), "country", COUNTRY_KEY, &COUNTRY_COLUMNS).unwrap();
        let countries = parse_country_parameters(&table).unwrap();
        let na = &countries["NA"];

        assert_eq!(na.solar, FinancingTerms::new(0.05, 25.0));
        assert_eq!(na.plant.interest_rate, 0.07);
        assert_eq!(na.infrastructure.lifetime_years, 50.0);
        assert_eq!(na.electricity_price, 0.1);
    }

    #[test]
    fn country_table_without_price_column_is_rejected() {
        let csv = "Country,Solar interest rate\nNA,0.05\n";
        let err = WideTable::from_reader(csv.as_bytes(), "country", COUNTRY_KEY, &COUNTRY_COLUMNS).unwrap_err();
        assert!(matches!(err, InputError::MissingColumn { .. }));
    }

    #[test]
    fn technology_keys_carry_units() {
        assert_eq!(capital_cost_key(ComponentKind::H2Storage), "H2 storage capital cost [€/Wh]");
        assert_eq!(capital_cost_key(ComponentKind::Wind), "Wind capital cost [€/W]");
        assert_eq!(lifetime_key(ComponentKind::Electrolyzer), "Electrolyzer lifetime [a]");
    }

    #[test]
    fn technology_table_needs_every_component() {
        let table = KeyValueTable::from_reader(
            "Parameter,Value\nWind capital cost [€/W],1.5\nWind lifetime [a],20\n".as_bytes(),
            "technology",
        )
        .unwrap();
        let err = parse_technology_parameters(&table).unwrap_err();
        assert!(matches!(err, InputError::MissingParameter { ref key, .. } if key == "Solar capital cost [€/W]"));
    }

    #[test]
    fn global_table_overrides_only_listed_constants() {
        let table = KeyValueTable::from_reader("Parameter,Value\nShort road threshold [km],15\n".as_bytes(), "global").unwrap();
        let global = apply_global_overrides(&table, GlobalConstants::default()).unwrap();
        assert_eq!(global.short_road_threshold_km, 15.0);
        assert_eq!(global.degrees_to_km, DEGREES_TO_KM);
    }

    #[test]
    fn infrastructure_needs_both_road_tiers() {
        let csv = "Infrastructure,CAPEX [€/km],OPEX [€/km/a]\nShort road,100,10\n";
        let table = WideTable::from_reader(csv.as_bytes(), "infra", INFRA_KEY, &[INFRA_CAPEX, INFRA_OPEX]).unwrap();
        let err = parse_infrastructure_parameters(&table).unwrap_err();
        assert!(matches!(err, InputError::MissingParameter { ref key, .. } if key == LONG_ROAD_NAME));
    }
}
