// Column names appended to site collections by each stage.
// Per-pair columns are prefixed with "<demand center> <mode>", per-demand-center
// columns with "<demand center>".

use super::component::{ComponentKind, TransportMode};

pub const FRESHWATER_COST: &str = "Freshwater cost";
pub const OCEAN_WATER_COST: &str = "Ocean water cost";
pub const LOWEST_WATER_COST: &str = "Lowest water cost";
pub const MIN_DISTANCE_TO_DEMAND: &str = "min distance to demand [km]";
pub const AVG_TRANSPORT_COST: &str = "avg transport cost";

pub fn distance(demand_center: &str) -> String {
    format!("{} distance [km]", demand_center)
}

pub fn road_construction_cost(demand_center: &str) -> String {
    format!("{} road construction cost", demand_center)
}

pub fn placeholder_trucking_cost(demand_center: &str) -> String {
    format!("{} placeholder trucking cost", demand_center)
}

pub fn lowest_lcoh(demand_center: &str) -> String {
    format!("{} lowest LCOH", demand_center)
}

pub fn cheapest_mode(demand_center: &str) -> String {
    format!("{} cheapest transport mode", demand_center)
}

fn pair(demand_center: &str, mode: TransportMode, suffix: &str) -> String {
    format!("{} {} {}", demand_center, mode.label(), suffix)
}

pub fn capacity(demand_center: &str, mode: TransportMode, component: ComponentKind) -> String {
    pair(demand_center, mode, &format!("{} capacity", component.label()))
}

pub fn component_cost(demand_center: &str, mode: TransportMode, component: ComponentKind) -> String {
    pair(demand_center, mode, &format!("{} cost", component.label()))
}

pub fn pair_water_cost(demand_center: &str, mode: TransportMode) -> String {
    pair(demand_center, mode, "water cost")
}

/// Written by the transport stage, read by the cost stage
pub fn pair_transport_cost(demand_center: &str, mode: TransportMode) -> String {
    pair(demand_center, mode, "transport cost")
}

pub fn total_cost(demand_center: &str, mode: TransportMode) -> String {
    pair(demand_center, mode, "total cost")
}

pub fn lcoh(demand_center: &str, mode: TransportMode) -> String {
    pair(demand_center, mode, "LCOH")
}
