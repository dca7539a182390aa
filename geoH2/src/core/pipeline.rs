use std::fmt;
use tracing::info;

use crate::analysis::summary::StageReport;
use crate::config::constants::*;
use crate::config::engine_config::EngineConfig;
use crate::core::aggregation::{run_aggregation_stage, AggregationOutput};
use crate::core::capacity::{run_capacity_stage, CapacityOptimizer, ZeroCapacity};
use crate::core::transport::run_transport_stage;
use crate::core::water::{run_water_stage, WaterCostModel};
use crate::errors::EngineError;
use crate::models::demand_center::DemandCenter;
use crate::models::parameters::ParameterSet;
use crate::models::site::Site;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Stage {
    All,
    Transport,
    Water,
    Capacity,
    Costs,
}

impl Stage {
    pub const SEQUENCE: [Stage; 4] = [Stage::Transport, Stage::Water, Stage::Capacity, Stage::Costs];

    /// GeoJSON file the stage's collection is written to
    pub fn output_file(&self) -> Option<&'static str> {
        match self {
            Stage::All => None,
            Stage::Transport => Some(TRANSPORT_OUTPUT_FILE),
            Stage::Water => Some(WATER_OUTPUT_FILE),
            Stage::Capacity => Some(CAPACITY_OUTPUT_FILE),
            Stage::Costs => Some(COST_OUTPUT_FILE),
        }
    }

    fn expand(self) -> Vec<Stage> {
        match self {
            Stage::All => Stage::SEQUENCE.to_vec(),
            stage => vec![stage],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::All => "all",
            Stage::Transport => "transport",
            Stage::Water => "water",
            Stage::Capacity => "capacity",
            Stage::Costs => "costs",
        };
        write!(f, "{}", name)
    }
}

/// Collection produced by one stage and its report
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub stage: Stage,
    pub sites: Vec<Site>,
    pub report: StageReport,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub stages: Vec<StageOutput>,
    /// Present when the cost stage ran
    pub costs: Option<AggregationOutput>,
}

impl PipelineOutput {
    pub fn final_sites(&self) -> Option<&[Site]> {
        self.stages.last().map(|stage| stage.sites.as_slice())
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageOutput> {
        self.stages.iter().find(|output| output.stage == stage)
    }
}

/// Chains the costing stages. Each stage reads the previous stage's collection and
/// produces a new one; the input sites are never modified.
pub struct Pipeline {
    params: ParameterSet,
    demand_centers: Vec<DemandCenter>,
    config: EngineConfig,
    water_model: WaterCostModel,
    optimizer: Box<dyn CapacityOptimizer>,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(params: ParameterSet, demand_centers: Vec<DemandCenter>, config: EngineConfig) -> Self {
        Self {
            params,
            demand_centers,
            config,
            water_model: WaterCostModel::standard(),
            optimizer: Box::new(ZeroCapacity),
            show_progress: false,
        }
    }

    pub fn with_optimizer(mut self, optimizer: Box<dyn CapacityOptimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_water_model(mut self, water_model: WaterCostModel) -> Self {
        self.water_model = water_model;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn get_parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub fn get_demand_centers(&self) -> &[DemandCenter] {
        &self.demand_centers
    }

    pub fn transport(&self, sites: &[Site]) -> (Vec<Site>, StageReport) {
        run_transport_stage(sites, &self.demand_centers, &self.params, &self.config)
    }

    pub fn water(&self, sites: &[Site]) -> (Vec<Site>, StageReport) {
        run_water_stage(sites, &self.params, &self.water_model, &self.config)
    }

    pub fn capacity(&self, sites: &[Site]) -> (Vec<Site>, StageReport) {
        run_capacity_stage(sites, &self.demand_centers, &self.params.technology, self.optimizer.as_ref(), &self.config)
    }

    pub fn costs(&self, sites: &[Site]) -> Result<AggregationOutput, EngineError> {
        run_aggregation_stage(
            sites,
            &self.demand_centers,
            &self.params,
            &self.water_model,
            &self.config,
            self.show_progress,
        )
    }

    /// Runs `stage` (or every stage for [`Stage::All`]) starting from `sites`.
    pub fn run(&self, sites: &[Site], stage: Stage) -> Result<PipelineOutput, EngineError> {
        let mut stages = Vec::new();
        let mut costs = None;
        let mut current = sites.to_vec();

        for step in stage.expand() {
            info!("Running {} stage on {} sites", step, current.len());
            let (next, report) = match step {
                Stage::Transport => self.transport(&current),
                Stage::Water => self.water(&current),
                Stage::Capacity => self.capacity(&current),
                Stage::Costs => {
                    let output = self.costs(&current)?;
                    let report = cost_report(&output);
                    let next = output.sites.clone();
                    costs = Some(output);
                    (next, report)
                }
                Stage::All => continue,
            };
            stages.push(StageOutput { stage: step, sites: next.clone(), report });
            current = next;
        }

        Ok(PipelineOutput { stages, costs })
    }
}

fn cost_report(output: &AggregationOutput) -> StageReport {
    let mut report = StageReport::new("costs");
    for record in output.records.values() {
        match record.skip_reason() {
            Some(reason) => report.record_skip(record.get_key().to_string(), reason.clone()),
            None => report.record_computed(),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::columns;
    use crate::models::component::TransportMode;
    use crate::models::site::SiteDistances;
    use crate::test_support::parameter_set;
    use crate::utils::geometry::{GeoPoint, Geometry};

    #[test]
    fn full_run_chains_every_stage() {
        let sites = vec![Site::new(
            1,
            Geometry::Point(GeoPoint::new(0.05, 0.0)),
            "NA",
            SiteDistances {
                waterbody: Some(20.0),
                waterway: Some(25.0),
                ocean: Some(5.0),
                ..Default::default()
            },
        )];
        let dcs = vec![DemandCenter::new("Port", GeoPoint::new(0.0, 0.0), 1000.0, "500 bar")];
        let config = EngineConfig { parallel: false, ..EngineConfig::default() };
        let pipeline = Pipeline::new(parameter_set(), dcs, config);

        let output = pipeline.run(&sites, Stage::All).unwrap();

        assert_eq!(output.stages.len(), 4);
        assert!(output.stage(Stage::Transport).unwrap().sites[0].has_column(&columns::distance("Port")));
        assert!(!output.stage(Stage::Transport).unwrap().sites[0].has_column(columns::LOWEST_WATER_COST));
        let costs = output.costs.as_ref().unwrap();
        assert_eq!(costs.summary.computed, 2);
        let final_site = &output.final_sites().unwrap()[0];
        assert!(final_site.column(&columns::lcoh("Port", TransportMode::Trucking)).is_some());
        assert!(sites[0].columns().is_empty());
    }

    #[test]
    fn single_stage_runs_alone() {
        let sites = vec![Site::new(1, Geometry::Point(GeoPoint::new(0.0, 0.0)), "NA", SiteDistances::default())];
        let pipeline = Pipeline::new(parameter_set(), Vec::new(), EngineConfig::default());

        let output = pipeline.run(&sites, Stage::Water).unwrap();
        assert_eq!(output.stages.len(), 1);
        assert!(output.costs.is_none());
        assert_eq!(output.stages[0].report.skipped_count(), 1);
    }
}
