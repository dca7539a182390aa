use std::path::{Path, PathBuf};
use clap::Parser;

use crate::config::engine_config::TransportCostSource;
use crate::core::annuity::AnnuitizationMethod;
use crate::core::pipeline::Stage;

#[derive(Parser)]
#[command(author, version, about = "Levelized cost of delivered hydrogen per site, demand center and transport mode", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "GeoJSON site collection (hexagons or points)")]
    sites: PathBuf,

    #[arg(short, long, default_value = "Parameters", help = "Directory holding the parameter tables")]
    parameters: PathBuf,

    #[arg(long, help = "Long-format capacity table (Site, Demand center, Transport mode, Component, Capacity)")]
    capacities: Option<PathBuf>,

    #[arg(long, default_value_t = false, conflicts_with = "capacities",
          help = "Draw random placeholder capacities instead of reading a table")]
    placeholder_capacities: bool,

    #[arg(long, help = "Seed for the placeholder capacity optimizer")]
    seed: Option<u64>,

    #[arg(short, long, default_value = "Results")]
    output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = Stage::All)]
    stage: Stage,

    #[arg(long, value_enum, help = "Which transport figure enters the total cost")]
    transport_cost: Option<TransportCostSource>,

    #[arg(long, value_enum, help = "Annuitization formula applied to every component")]
    annuitization: Option<AnnuitizationMethod>,

    #[arg(short, long, help = "JSON engine configuration; flags override its fields")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    sequential: bool,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[arg(long, default_value_t = false)]
    progress: bool,
}

impl Args {
    pub fn sites(&self) -> &Path {
        &self.sites
    }

    pub fn parameters(&self) -> &Path {
        &self.parameters
    }

    pub fn capacities(&self) -> Option<&Path> {
        self.capacities.as_deref()
    }

    pub fn placeholder_capacities(&self) -> bool {
        self.placeholder_capacities
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn transport_cost(&self) -> Option<TransportCostSource> {
        self.transport_cost
    }

    pub fn annuitization(&self) -> Option<AnnuitizationMethod> {
        self.annuitization
    }

    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    pub fn sequential(&self) -> bool {
        self.sequential
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn progress(&self) -> bool {
        self.progress
    }
}
