use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use chrono::Local;
use csv::Writer;
use serde_json::Value;
use tracing::info;

use crate::config::constants::{COST_RECORDS_FILE, COST_TABLE_FILE};
use crate::core::pipeline::PipelineOutput;
use crate::data::sites_loader::save_sites;
use crate::errors::{InputError, InputResult};
use crate::models::component::ComponentKind;
use crate::models::cost_record::{CostKey, CostRecord};
use crate::models::site::Site;
use crate::utils::logging::{self, FileIOType, OperationCategory};

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn text_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Writes stage collections and flat tables into a timestamped run directory
pub struct CsvExporter {
    output_dir: PathBuf,
    timestamp: String,
    verbose_logging: bool,
}

impl CsvExporter {
    /// Creates `<output_dir>/<YYYYmmdd_HHMMSS>`
    pub fn new(output_dir: impl AsRef<Path>, verbose_logging: bool) -> InputResult<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let full_path = output_dir.as_ref().join(&timestamp);
        std::fs::create_dir_all(&full_path).map_err(|e| InputError::io(&full_path, e))?;

        Ok(Self {
            output_dir: full_path,
            timestamp,
            verbose_logging,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Every stage's GeoJSON plus, when costs ran, the flat site table and the record table
    pub fn export_pipeline(&self, output: &PipelineOutput) -> InputResult<()> {
        let _timing = logging::start_timing("export_pipeline",
            OperationCategory::FileIO { subcategory: FileIOType::ResultsSave });

        for stage in &output.stages {
            if let Some(file) = stage.stage.output_file() {
                save_sites(&self.output_dir.join(file), &stage.sites)?;
            }
        }

        if let Some(costs) = &output.costs {
            self.export_site_table(COST_TABLE_FILE, &costs.sites)?;
            self.export_cost_records(&costs.records)?;
        }

        if self.verbose_logging {
            info!("Results written to {}", self.output_dir.display());
        }
        Ok(())
    }

    /// Site collection without geometry: numeric columns, then carried-through text such as
    /// the cheapest transport mode. Values a site lacks are empty cells.
    pub fn export_site_table(&self, file_name: &str, sites: &[Site]) -> InputResult<PathBuf> {
        let path = self.output_dir.join(file_name);
        let mut writer = Writer::from_path(&path).map_err(|e| InputError::csv(file_name, e))?;

        let columns: BTreeSet<&String> = sites.iter().flat_map(|site| site.columns().keys()).collect();
        let mut header = vec![
            "site_id", "country", "waterbody_dist", "waterway_dist", "ocean_dist", "grid_dist", "road_dist",
            "theo_pv", "theo_wind",
        ]
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
        let labels: BTreeSet<&String> = sites.iter().flat_map(|site| site.passthrough().keys()).collect();
        header.extend(columns.iter().map(|c| c.to_string()));
        header.extend(labels.iter().map(|l| l.to_string()));
        writer.write_record(&header).map_err(|e| InputError::csv(file_name, e))?;

        for site in sites {
            let distances = site.get_distances();
            let potentials = site.get_potentials();
            let mut row = vec![
                site.get_id().to_string(),
                site.get_country().to_string(),
                cell(distances.waterbody),
                cell(distances.waterway),
                cell(distances.ocean),
                cell(distances.grid),
                cell(distances.road),
                cell(potentials.solar),
                cell(potentials.wind),
            ];
            row.extend(columns.iter().map(|c| cell(site.column(c))));
            row.extend(labels.iter().map(|l| text_cell(site.passthrough().get(*l))));
            writer.write_record(&row).map_err(|e| InputError::csv(file_name, e))?;
        }

        writer.flush().map_err(|e| InputError::io(&path, e))?;
        Ok(path)
    }

    /// One row per (site, demand center, mode) with its state and, when computed, its costs
    pub fn export_cost_records(&self, records: &BTreeMap<CostKey, CostRecord>) -> InputResult<PathBuf> {
        let path = self.output_dir.join(COST_RECORDS_FILE);
        let mut writer = Writer::from_path(&path).map_err(|e| InputError::csv(COST_RECORDS_FILE, e))?;

        let mut header: Vec<String> = ["Site", "Demand center", "Transport mode", "State", "Skip reason"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        header.extend(ComponentKind::ALL.iter().map(|c| format!("{} cost", c.label())));
        header.extend(
            ["Water unit cost", "Water cost", "Transport cost", "Total cost", "LCOH"]
                .iter()
                .map(|s| s.to_string()),
        );
        writer.write_record(&header).map_err(|e| InputError::csv(COST_RECORDS_FILE, e))?;

        for (key, record) in records {
            let breakdown = record.breakdown();
            let mut row = vec![
                key.site_id.to_string(),
                key.demand_center.clone(),
                key.mode.to_string(),
                record.get_state().name().to_string(),
                record.skip_reason().map(|r| r.to_string()).unwrap_or_default(),
            ];
            row.extend(ComponentKind::ALL.iter().map(|c| cell(breakdown.and_then(|b| b.component_cost(*c)))));
            row.push(cell(breakdown.map(|b| b.water_unit_cost())));
            row.push(cell(breakdown.map(|b| b.water_cost())));
            row.push(cell(breakdown.map(|b| b.transport_cost())));
            row.push(cell(breakdown.map(|b| b.total_cost())));
            row.push(cell(breakdown.map(|b| b.levelized_cost())));
            writer.write_record(&row).map_err(|e| InputError::csv(COST_RECORDS_FILE, e))?;
        }

        writer.flush().map_err(|e| InputError::io(&path, e))?;
        info!("Exported {} cost records to {}", records.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::component::TransportMode;
    use crate::models::cost_record::{CostBreakdown, SkipReason};
    use crate::models::site::SiteDistances;
    use crate::utils::geometry::{GeoPoint, Geometry};

    #[test]
    fn run_directory_is_created_under_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path(), false).unwrap();
        assert!(exporter.output_dir().is_dir());
        assert!(exporter.output_dir().ends_with(exporter.timestamp()));
    }

    #[test]
    fn unset_columns_are_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path(), false).unwrap();

        let mut with_cost = Site::new(1, Geometry::Point(GeoPoint::new(0.0, 0.0)), "NA", SiteDistances::default());
        with_cost.append_column("Port trucking LCOH", 2.55);
        let without = Site::new(2, Geometry::Point(GeoPoint::new(1.0, 0.0)), "NA", SiteDistances::default());

        let path = exporter.export_site_table("sites.csv", &[with_cost, without]).unwrap();
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader.headers().unwrap().clone();
        let lcoh_index = header.iter().position(|h| h == "Port trucking LCOH").unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(&rows[0][lcoh_index], "2.55");
        assert_eq!(&rows[1][lcoh_index], "");
    }

    #[test]
    fn text_properties_follow_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path(), false).unwrap();

        let mut site = Site::new(1, Geometry::Point(GeoPoint::new(0.0, 0.0)), "NA", SiteDistances::default());
        site.append_column("Port lowest LCOH", 2.05);
        site.insert_passthrough("Port cheapest transport mode", Value::from("pipeline"));

        let path = exporter.export_site_table("sites.csv", &[site]).unwrap();
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader.headers().unwrap().clone();
        let row = reader.records().next().unwrap().unwrap();

        assert_eq!(header.iter().last(), Some("Port cheapest transport mode"));
        assert_eq!(row.iter().last(), Some("pipeline"));
    }

    #[test]
    fn record_table_lists_state_and_reason() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path(), false).unwrap();

        let mut records = BTreeMap::new();
        let computed_key = CostKey::new(1, "Port", TransportMode::Trucking);
        let mut computed = CostRecord::new(computed_key.clone());
        computed
            .complete(CostBreakdown::new(BTreeMap::new(), 2.0, 550.0, "Port", 1000.0).unwrap())
            .unwrap();
        records.insert(computed_key, computed);

        let skipped_key = CostKey::new(2, "Port", TransportMode::Trucking);
        let mut skipped = CostRecord::new(skipped_key.clone());
        skipped.skip(SkipReason::MissingInput("missing column 'Lowest water cost'".to_string())).unwrap();
        records.insert(skipped_key, skipped);

        let path = exporter.export_cost_records(&records).unwrap();
        let mut reader = csv::Reader::from_path(path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(&rows[0][3], "computed");
        assert_eq!(rows[0].iter().last(), Some("2.55"));
        assert_eq!(&rows[1][3], "skipped");
        assert_eq!(&rows[1][4], "missing column 'Lowest water cost'");
        assert_eq!(rows[1].iter().last(), Some(""));
    }
}
