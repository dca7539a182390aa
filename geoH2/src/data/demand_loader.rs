use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use crate::config::constants::DEMAND_PARAMETERS_FILE;
use crate::data::csv_table::WideTable;
use crate::errors::{InputError, InputResult};
use crate::models::demand_center::DemandCenter;
use crate::utils::geometry::GeoPoint;

const DEMAND_KEY: &str = "Demand center";
const DEMAND_LAT: &str = "Lat [deg]";
const DEMAND_LON: &str = "Lon [deg]";
const DEMAND_QUANTITY: &str = "Annual demand [kg/a]";
const DEMAND_STATE: &str = "Demand state";

/// Demand centers in file order. Names must be unique; the demand quantity is validated
/// later, per record, so a zero demand skips that center's records instead of the run.
pub fn parse_demand_centers(table: &WideTable) -> InputResult<Vec<DemandCenter>> {
    let mut seen = BTreeSet::new();
    let mut centers = Vec::with_capacity(table.len());

    for row in table.rows() {
        if !seen.insert(row.key().to_string()) {
            return Err(InputError::DuplicateKey {
                table: table.name().to_string(),
                key: row.key().to_string(),
            });
        }
        centers.push(DemandCenter::new(
            row.key(),
            GeoPoint::new(row.f64(DEMAND_LON)?, row.f64(DEMAND_LAT)?),
            row.f64(DEMAND_QUANTITY)?,
            row.text(DEMAND_STATE)?,
        ));
    }

    Ok(centers)
}

pub fn load_demand_centers(dir: &Path) -> InputResult<Vec<DemandCenter>> {
    let table = WideTable::from_path(
        &dir.join(DEMAND_PARAMETERS_FILE),
        DEMAND_PARAMETERS_FILE,
        DEMAND_KEY,
        &[DEMAND_LAT, DEMAND_LON, DEMAND_QUANTITY, DEMAND_STATE],
    )?;
    let centers = parse_demand_centers(&table)?;
    info!("Loaded {} demand centers", centers.len());
    Ok(centers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Demand center,Lat [deg],Lon [deg],Annual demand [kg/a],Demand state\n";

    fn table(body: &str) -> WideTable {
        let csv = format!("{}{}", HEADER, body);
        WideTable::from_reader(csv.as_bytes(), "demand", DEMAND_KEY, &[DEMAND_LAT, DEMAND_LON, DEMAND_QUANTITY, DEMAND_STATE])
            .unwrap()
    }

    #[test]
    fn rows_become_demand_centers() {
        let centers = parse_demand_centers(&table("Lüderitz,-26.65,15.16,1000,500 bar\n")).unwrap();
        assert_eq!(centers.len(), 1);
        assert_eq!(centers[0].get_name(), "Lüderitz");
        assert_eq!(centers[0].get_location(), &GeoPoint::new(15.16, -26.65));
        assert_eq!(centers[0].get_demand_state(), "500 bar");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = parse_demand_centers(&table("A,0,0,1,LH2\nA,1,1,2,LH2\n")).unwrap_err();
        assert!(matches!(err, InputError::DuplicateKey { .. }));
    }

    #[test]
    fn zero_demand_loads_and_fails_later() {
        let centers = parse_demand_centers(&table("A,0,0,0,LH2\n")).unwrap();
        assert!(centers[0].validated_demand().is_err());
    }
}
