// Module declarations for the hydrogen delivery cost engine

// Costing stages and the aggregation engine
pub mod core {
    pub mod annuity;
    pub mod transport;
    pub mod water;
    pub mod capacity;
    pub mod aggregation;
    pub mod pipeline;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod engine_config;
}

// Model definitions
pub mod models {
    pub mod columns;
    pub mod component;
    pub mod site;
    pub mod demand_center;
    pub mod parameters;
    pub mod cost_record;
}

// Data loaders
pub mod data {
    pub mod csv_table;
    pub mod sites_loader;
    pub mod parameters_loader;
    pub mod demand_loader;
    pub mod capacity_loader;
}

// Run summaries and reporting
pub mod analysis {
    pub mod summary;
    pub mod reporting;
}

// Utility functions
pub mod utils {
    pub mod geometry;
    pub mod parallel;
    pub mod logging;
    pub mod csv_export;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

pub mod errors;

#[cfg(test)]
mod test_support;

// Re-export commonly used items
pub use crate::config::engine_config::EngineConfig;
pub use crate::core::pipeline::{Pipeline, PipelineOutput};
pub use crate::errors::{EngineError, InputError, ValidationError};
pub use crate::models::site::Site;
