// Geometry Constants
pub const DEGREES_TO_KM: f64 = 111.0;                // Planar degree -> km scaling used for site/demand distances

// Road Infrastructure Constants
pub const SHORT_ROAD_THRESHOLD_KM: f64 = 10.0;        // Below this distance the short-road tariff applies
pub const SHORT_ROAD_NAME: &str = "Short road";
pub const LONG_ROAD_NAME: &str = "Long road";

// Trucking Placeholder
pub const PLACEHOLDER_TRUCKING_COST: f64 = 0.1;       // €/km/kg, stand-in until a trucking strategy optimizer is wired in

// Water Supply Constants
pub const LITRES_PER_CUBIC_METRE: f64 = 1000.0;
pub const WATER_TRANSPORT_REFERENCE_KM: f64 = 100.0;  // Water transport is quoted per 100 km

// Default Country Parameters (used only when explicitly allowed)
pub const DEFAULT_INTEREST_RATE: f64 = 0.06;
pub const DEFAULT_GENERATION_LIFETIME: f64 = 20.0;
pub const DEFAULT_PLANT_LIFETIME: f64 = 20.0;
pub const DEFAULT_INFRASTRUCTURE_LIFETIME: f64 = 50.0;
pub const DEFAULT_ELECTRICITY_PRICE: f64 = 0.10465;   // €/kWh
pub const DEFAULT_HEAT_PRICE: f64 = 0.02;             // €/kWh

// Placeholder Capacity Optimizer
pub const PLACEHOLDER_SEED: u64 = 42;
pub const PLACEHOLDER_WIND_RANGE: (f64, f64) = (50.0, 200.0);
pub const PLACEHOLDER_SOLAR_RANGE: (f64, f64) = (100.0, 400.0);
pub const PLACEHOLDER_ELECTROLYZER_RANGE: (f64, f64) = (20.0, 100.0);
pub const PLACEHOLDER_BATTERY_RANGE: (f64, f64) = (10.0, 50.0);
pub const PLACEHOLDER_H2_STORAGE_RANGE: (f64, f64) = (1000.0, 5000.0);

// Parameter File Names
pub const COUNTRY_PARAMETERS_FILE: &str = "country_parameters.csv";
pub const DEMAND_PARAMETERS_FILE: &str = "demand_parameters.csv";
pub const TECHNOLOGY_PARAMETERS_FILE: &str = "technology_parameters.csv";
pub const WATER_PARAMETERS_FILE: &str = "water_parameters.csv";
pub const INFRA_PARAMETERS_FILE: &str = "infra_parameters.csv";
pub const GLOBAL_PARAMETERS_FILE: &str = "global_parameters.csv";

// Stage Output File Names
pub const TRANSPORT_OUTPUT_FILE: &str = "hex_transport.geojson";
pub const WATER_OUTPUT_FILE: &str = "hex_water.geojson";
pub const CAPACITY_OUTPUT_FILE: &str = "hex_capacity.geojson";
pub const COST_OUTPUT_FILE: &str = "hex_cost_components.geojson";
pub const COST_TABLE_FILE: &str = "hex_cost_components.csv";
pub const COST_RECORDS_FILE: &str = "cost_records.csv";
