use std::collections::BTreeMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::analysis::summary::StageReport;
use crate::config::constants::*;
use crate::config::engine_config::EngineConfig;
use crate::models::columns;
use crate::models::component::{ComponentKind, TransportMode};
use crate::models::cost_record::SkipReason;
use crate::models::demand_center::DemandCenter;
use crate::models::parameters::TechnologyParameters;
use crate::models::site::Site;
use crate::utils::logging::{self, OperationCategory, StageType};
use crate::utils::parallel::map_items;

/// Installed capacity per component, in each component's natural unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapacityAllocation {
    capacities: BTreeMap<ComponentKind, f64>,
}

impl CapacityAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component: ComponentKind, capacity: f64) -> Self {
        self.insert(component, capacity);
        self
    }

    pub fn insert(&mut self, component: ComponentKind, capacity: f64) {
        self.capacities.insert(component, capacity);
    }

    pub fn get(&self, component: ComponentKind) -> Option<f64> {
        self.capacities.get(&component).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentKind, f64)> + '_ {
        self.capacities.iter().map(|(component, capacity)| (*component, *capacity))
    }

    pub fn len(&self) -> usize {
        self.capacities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capacities.is_empty()
    }
}

/// Everything a sizing strategy may look at for one (site, demand center, mode)
pub struct AllocationRequest<'a> {
    pub site: &'a Site,
    pub demand_center: &'a DemandCenter,
    pub mode: TransportMode,
    pub technology: &'a TechnologyParameters,
}

/// Sizing strategy for generation, storage and electrolysis. The engine only relies on
/// the shape of the returned allocation.
pub trait CapacityOptimizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the strategy has no answer for this triple
    fn allocate(&self, request: &AllocationRequest<'_>) -> Option<CapacityAllocation>;
}

/// Random capacities within fixed per-component ranges. Stands in for a real optimizer
/// so the rest of the pipeline can run end to end.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderOptimizer {
    seed: u64,
}

impl PlaceholderOptimizer {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn range_for(component: ComponentKind) -> (f64, f64) {
        match component {
            ComponentKind::Wind => PLACEHOLDER_WIND_RANGE,
            ComponentKind::Solar => PLACEHOLDER_SOLAR_RANGE,
            ComponentKind::Electrolyzer => PLACEHOLDER_ELECTROLYZER_RANGE,
            ComponentKind::Battery => PLACEHOLDER_BATTERY_RANGE,
            ComponentKind::H2Storage => PLACEHOLDER_H2_STORAGE_RANGE,
        }
    }
}

impl Default for PlaceholderOptimizer {
    fn default() -> Self {
        Self::new(PLACEHOLDER_SEED)
    }
}

/// Stable per-triple seed (FNV-1a over the key), so draws do not depend on scheduling
pub fn triple_seed(seed: u64, site_id: u64, demand_center: &str, mode: TransportMode) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    let bytes = seed
        .to_le_bytes()
        .into_iter()
        .chain(site_id.to_le_bytes())
        .chain(demand_center.bytes())
        .chain(mode.label().bytes());
    for byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl CapacityOptimizer for PlaceholderOptimizer {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn allocate(&self, request: &AllocationRequest<'_>) -> Option<CapacityAllocation> {
        let mut rng = StdRng::seed_from_u64(triple_seed(
            self.seed,
            request.site.get_id(),
            request.demand_center.get_name(),
            request.mode,
        ));

        let mut allocation = CapacityAllocation::new();
        for component in ComponentKind::ALL {
            let (low, high) = Self::range_for(component);
            allocation.insert(component, rng.gen_range(low..=high));
        }
        Some(allocation)
    }
}

/// Installs nothing; only water and transport costs remain
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCapacity;

impl CapacityOptimizer for ZeroCapacity {
    fn name(&self) -> &'static str {
        "zero"
    }

    fn allocate(&self, _request: &AllocationRequest<'_>) -> Option<CapacityAllocation> {
        let mut allocation = CapacityAllocation::new();
        for component in ComponentKind::ALL {
            allocation.insert(component, 0.0);
        }
        Some(allocation)
    }
}

/// Precomputed allocations, typically read from a capacity table
#[derive(Debug, Clone, Default)]
pub struct TableCapacities {
    allocations: BTreeMap<(u64, String, TransportMode), CapacityAllocation>,
}

impl TableCapacities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, site_id: u64, demand_center: &str, mode: TransportMode, component: ComponentKind, capacity: f64) {
        self.allocations
            .entry((site_id, demand_center.to_string(), mode))
            .or_default()
            .insert(component, capacity);
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

impl CapacityOptimizer for TableCapacities {
    fn name(&self) -> &'static str {
        "table"
    }

    fn allocate(&self, request: &AllocationRequest<'_>) -> Option<CapacityAllocation> {
        self.allocations
            .get(&(request.site.get_id(), request.demand_center.get_name().to_string(), request.mode))
            .cloned()
    }
}

/// Appends `D M <component> capacity` columns for every demand center and mode.
pub fn run_capacity_stage(
    sites: &[Site],
    demand_centers: &[DemandCenter],
    technology: &TechnologyParameters,
    optimizer: &dyn CapacityOptimizer,
    config: &EngineConfig,
) -> (Vec<Site>, StageReport) {
    let _timing = logging::start_timing("run_capacity_stage",
        OperationCategory::Stage { subcategory: StageType::Capacity });

    info!("Sizing capacities with the {} optimizer", optimizer.name());

    let results = map_items(sites, config.parallel, |site| {
        let mut augmented = site.clone();
        let mut missing = Vec::new();
        let mut allocated = 0usize;

        for dc in demand_centers {
            for &mode in &config.transport_modes {
                let request = AllocationRequest { site, demand_center: dc, mode, technology };
                match optimizer.allocate(&request) {
                    Some(allocation) => {
                        for (component, capacity) in allocation.iter() {
                            augmented.append_column(columns::capacity(dc.get_name(), mode, component), capacity);
                        }
                        allocated += 1;
                    }
                    None => missing.push(format!("{} / {}", dc.get_name(), mode)),
                }
            }
        }
        (augmented, allocated, missing)
    });

    let mut report = StageReport::new("capacity");
    let mut output = Vec::with_capacity(results.len());
    for (site, allocated, missing) in results {
        report.computed += allocated;
        for pair in missing {
            debug!("No capacity allocation for site {} / {}", site.get_id(), pair);
            report.record_skip(
                format!("site {} / {}", site.get_id(), pair),
                SkipReason::MissingInput("no capacity allocation".to_string()),
            );
        }
        output.push(site);
    }

    info!("Capacity stage: {} allocations, {} missing", report.computed, report.skipped_count());
    (output, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::site::SiteDistances;
    use crate::test_support::technology_parameters;
    use crate::utils::geometry::{GeoPoint, Geometry};

    fn site(id: u64) -> Site {
        Site::new(id, Geometry::Point(GeoPoint::new(15.0, -26.0)), "NA", SiteDistances::default())
    }

    fn port() -> DemandCenter {
        DemandCenter::new("Port", GeoPoint::new(15.1, -26.6), 1000.0, "500 bar")
    }

    #[test]
    fn placeholder_draws_stay_in_range_and_repeat() {
        let technology = technology_parameters();
        let (site, dc) = (site(3), port());
        let request = AllocationRequest { site: &site, demand_center: &dc, mode: TransportMode::Pipeline, technology: &technology };

        let optimizer = PlaceholderOptimizer::default();
        let first = optimizer.allocate(&request).unwrap();
        let second = optimizer.allocate(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);

        for (component, capacity) in first.iter() {
            let (low, high) = PlaceholderOptimizer::range_for(component);
            assert!(capacity >= low && capacity <= high, "{} = {}", component, capacity);
        }
    }

    #[test]
    fn placeholder_seed_differs_per_triple() {
        let a = triple_seed(42, 1, "Port", TransportMode::Trucking);
        assert_ne!(a, triple_seed(42, 2, "Port", TransportMode::Trucking));
        assert_ne!(a, triple_seed(42, 1, "Port", TransportMode::Pipeline));
        assert_ne!(a, triple_seed(7, 1, "Port", TransportMode::Trucking));
        assert_eq!(a, triple_seed(42, 1, "Port", TransportMode::Trucking));
    }

    #[test]
    fn table_returns_only_known_triples() {
        let technology = technology_parameters();
        let mut table = TableCapacities::new();
        table.insert(1, "Port", TransportMode::Trucking, ComponentKind::Wind, 120.0);
        table.insert(1, "Port", TransportMode::Trucking, ComponentKind::Solar, 80.0);

        let (known, unknown, dc) = (site(1), site(2), port());
        let hit = table.allocate(&AllocationRequest { site: &known, demand_center: &dc, mode: TransportMode::Trucking, technology: &technology });
        let miss = table.allocate(&AllocationRequest { site: &unknown, demand_center: &dc, mode: TransportMode::Trucking, technology: &technology });

        assert_eq!(hit.unwrap().get(ComponentKind::Solar), Some(80.0));
        assert!(miss.is_none());
    }

    #[test]
    fn stage_writes_capacity_columns_for_each_mode() {
        let technology = technology_parameters();
        let config = EngineConfig { parallel: false, ..EngineConfig::default() };
        let sites = vec![site(1), site(2)];
        let dcs = vec![port()];

        let (out, report) = run_capacity_stage(&sites, &dcs, &technology, &ZeroCapacity, &config);

        assert_eq!(report.computed, 4);
        for mode in TransportMode::ALL {
            for component in ComponentKind::ALL {
                assert_eq!(out[1].column(&columns::capacity("Port", mode, component)), Some(0.0));
            }
        }
        assert!(sites[0].columns().is_empty());
    }
}
