use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use geoh2::analysis::reporting;
use geoh2::cli::cli::Args;
use geoh2::config::constants::PLACEHOLDER_SEED;
use geoh2::config::engine_config::{AnnuitizationPlan, EngineConfig};
use geoh2::core::capacity::{CapacityOptimizer, PlaceholderOptimizer, ZeroCapacity};
use geoh2::core::pipeline::Pipeline;
use geoh2::data::{capacity_loader, demand_loader, parameters_loader, sites_loader};
use geoh2::utils::csv_export::CsvExporter;
use geoh2::utils::logging;

fn build_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match args.config() {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to read engine configuration {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(source) = args.transport_cost() {
        config.transport_cost_source = source;
    }
    if let Some(method) = args.annuitization() {
        config.annuitization = AnnuitizationPlan::uniform(method);
    }
    if args.sequential() {
        config.parallel = false;
    }
    Ok(config)
}

fn build_optimizer(args: &Args) -> Result<Box<dyn CapacityOptimizer>> {
    if let Some(path) = args.capacities() {
        let table = capacity_loader::load_capacity_table(path)
            .with_context(|| format!("Failed to load capacity table {}", path.display()))?;
        return Ok(Box::new(table));
    }
    if args.placeholder_capacities() {
        let seed = args.seed().unwrap_or(PLACEHOLDER_SEED);
        info!("Using placeholder capacities (seed {})", seed);
        return Ok(Box::new(PlaceholderOptimizer::new(seed)));
    }
    info!("No capacity source given; all installed capacities are zero");
    Ok(Box::new(ZeroCapacity))
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.verbose())?;

    println!("GeoH2 delivery cost engine");
    println!("Stage: {}, parallel: {}", args.stage(), if args.sequential() { "no" } else { "yes" });

    let config = build_config(&args)?;

    let params = parameters_loader::load_parameter_set(args.parameters(), &config.defaults)
        .with_context(|| format!("Failed to load parameters from {}", args.parameters().display()))?;
    let demand_centers = demand_loader::load_demand_centers(args.parameters())
        .context("Failed to load demand centers")?;
    let sites = sites_loader::load_sites(args.sites())
        .with_context(|| format!("Failed to load sites from {}", args.sites().display()))?;
    let optimizer = build_optimizer(&args)?;

    let pipeline = Pipeline::new(params, demand_centers, config)
        .with_optimizer(optimizer)
        .with_progress(args.progress());

    let output = pipeline.run(&sites, args.stage())?;

    let exporter = CsvExporter::new(args.output_dir(), args.verbose())
        .context("Failed to create output directory")?;
    exporter.export_pipeline(&output).context("Failed to write results")?;

    for stage in &output.stages {
        reporting::print_stage_report(&stage.report);
    }
    if let Some(costs) = &output.costs {
        reporting::print_run_summary(&costs.summary);
        reporting::print_cheapest_sites(&costs.records);
        reporting::print_mode_choices(&costs.mode_choices);
    }
    println!("\nResults written to {}", exporter.output_dir().display());

    logging::print_timing_report();
    Ok(())
}
