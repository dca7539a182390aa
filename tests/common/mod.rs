use std::fs;
use std::path::Path;

pub const COUNTRY_HEADER: &str = "Country,Solar interest rate,Solar lifetime [a],Wind interest rate,Wind lifetime [a],\
Plant interest rate,Plant lifetime [a],Infrastructure interest rate,Infrastructure lifetime [a],\
Electricity price [€/kWh],Heat price [€/kWh]";

pub struct WaterTable {
    pub freshwater_kwh: f64,
    pub ocean_kwh: f64,
    pub transport_per_100km: f64,
    pub specific: f64,
    pub litres_per_kg: f64,
}

pub fn write_country(dir: &Path, electricity_price: f64) {
    let body = format!("{}\nNA,0.05,25,0.06,20,0.07,20,0.04,50,{},0.02\n", COUNTRY_HEADER, electricity_price);
    fs::write(dir.join("country_parameters.csv"), body).unwrap();
}

pub fn write_technology(dir: &Path) {
    let body = "Parameter,Value\n\
Wind capital cost [€/W],1.5\nWind lifetime [a],20\n\
Solar capital cost [€/W],1.0\nSolar lifetime [a],25\n\
Electrolyzer capital cost [€/W],2.0\nElectrolyzer operating cost [€/W/a],0.04\nElectrolyzer lifetime [a],20\n\
Battery capital cost [€/W],0.5\nBattery lifetime [a],10\n\
H2 storage capital cost [€/Wh],0.02\nH2 storage lifetime [a],20\n";
    fs::write(dir.join("technology_parameters.csv"), body).unwrap();
}

pub fn write_water(dir: &Path, water: &WaterTable) {
    let body = format!(
        "Parameter,Value\n\
Freshwater treatment electricity demand [kWh/m3],{}\n\
Ocean water treatment electricity demand [kWh/m3],{}\n\
Water transport cost [€/100 km/m3],{}\n\
Water specific cost [€/m3],{}\n\
Water demand [L/kg H2],{}\n",
        water.freshwater_kwh, water.ocean_kwh, water.transport_per_100km, water.specific, water.litres_per_kg
    );
    fs::write(dir.join("water_parameters.csv"), body).unwrap();
}

pub fn write_infra(dir: &Path) {
    let body = "Infrastructure,CAPEX [€/km],OPEX [€/km/a]\nShort road,100,10\nLong road,200,20\n";
    fs::write(dir.join("infra_parameters.csv"), body).unwrap();
}

pub fn write_global(dir: &Path, degrees_to_km: f64) {
    let body = format!("Parameter,Value\nDegrees to km [km/deg],{}\n", degrees_to_km);
    fs::write(dir.join("global_parameters.csv"), body).unwrap();
}

pub fn write_demand(dir: &Path, annual_demand: f64) {
    let body = format!(
        "Demand center,Lat [deg],Lon [deg],Annual demand [kg/a],Demand state\nPort,0,0,{},500 bar\n",
        annual_demand
    );
    fs::write(dir.join("demand_parameters.csv"), body).unwrap();
}

/// Point site at (lon, 0) with the given water distances
pub fn site_feature(id: u64, lon: f64, waterbody: f64, waterway: f64, ocean: f64) -> String {
    format!(
        r#"{{"type": "Feature", "geometry": {{"type": "Point", "coordinates": [{lon}, 0.0]}},
            "properties": {{"site_id": {id}, "country": "NA", "waterbody_dist": {waterbody},
                            "waterway_dist": {waterway}, "ocean_dist": {ocean}}}}}"#
    )
}

pub fn write_sites(path: &Path, features: &[String]) {
    let body = format!(r#"{{"type": "FeatureCollection", "features": [{}]}}"#, features.join(","));
    fs::write(path, body).unwrap();
}
