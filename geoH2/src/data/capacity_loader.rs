use std::path::Path;
use tracing::info;

use crate::core::capacity::TableCapacities;
use crate::data::csv_table::WideTable;
use crate::errors::{InputError, InputResult};
use crate::models::component::{ComponentKind, TransportMode};
use crate::utils::logging::{self, FileIOType, OperationCategory};

const CAPACITY_TABLE: &str = "capacity table";
const SITE: &str = "Site";
const DEMAND_CENTER: &str = "Demand center";
const MODE: &str = "Transport mode";
const COMPONENT: &str = "Component";
const CAPACITY: &str = "Capacity";

/// Long-format capacity table: one row per (site, demand center, mode, component)
pub fn parse_capacity_table(table: &WideTable) -> InputResult<TableCapacities> {
    let mut capacities = TableCapacities::new();

    for row in table.rows() {
        let site_id = row.key().parse::<u64>().map_err(|_| InputError::InvalidNumber {
            table: table.name().to_string(),
            key: SITE.to_string(),
            value: row.key().to_string(),
        })?;
        let mode_name = row.text(MODE)?;
        let mode: TransportMode = mode_name.parse().map_err(|_| InputError::UnknownName {
            kind: "transport mode",
            value: mode_name.to_string(),
        })?;
        let component_name = row.text(COMPONENT)?;
        let component: ComponentKind = component_name.parse().map_err(|_| InputError::UnknownName {
            kind: "component",
            value: component_name.to_string(),
        })?;

        capacities.insert(site_id, row.text(DEMAND_CENTER)?, mode, component, row.f64(CAPACITY)?);
    }

    Ok(capacities)
}

pub fn load_capacity_table(path: &Path) -> InputResult<TableCapacities> {
    let _timing = logging::start_timing("load_capacity_table",
        OperationCategory::FileIO { subcategory: FileIOType::DataLoad });

    let table = WideTable::from_path(path, CAPACITY_TABLE, SITE, &[DEMAND_CENTER, MODE, COMPONENT, CAPACITY])?;
    let capacities = parse_capacity_table(&table)?;
    info!("Loaded {} capacity allocations from {}", capacities.len(), path.display());
    Ok(capacities)
}
