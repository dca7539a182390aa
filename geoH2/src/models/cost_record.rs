use std::collections::BTreeMap;
use std::fmt;
use serde::Serialize;

use super::component::{ComponentKind, TransportMode};
use crate::errors::{ensure_finite, EngineError, ValidationError};

/// Identifies one (site, demand center, transport mode) triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CostKey {
    pub site_id: u64,
    pub demand_center: String,
    pub mode: TransportMode,
}

impl CostKey {
    pub fn new(site_id: u64, demand_center: impl Into<String>, mode: TransportMode) -> Self {
        Self {
            site_id,
            demand_center: demand_center.into(),
            mode,
        }
    }
}

impl fmt::Display for CostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "site {} / {} / {}", self.site_id, self.demand_center, self.mode)
    }
}

/// Why a record was not computed
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// A required input (column, parameter row) was absent for this scope
    MissingInput(String),
    Validation(ValidationError),
}

impl SkipReason {
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::MissingInput(_) => "MISSING_INPUT",
            SkipReason::Validation(err) => err.code(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingInput(message) => write!(f, "{}", message),
            SkipReason::Validation(err) => write!(f, "{}", err),
        }
    }
}

impl From<ValidationError> for SkipReason {
    fn from(err: ValidationError) -> Self {
        SkipReason::Validation(err)
    }
}

/// Annual cost decomposition of one computed record. The total is built from the
/// listed terms only, so it always equals their sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    component_costs: BTreeMap<ComponentKind, f64>,
    water_unit_cost: f64,
    water_cost: f64,
    transport_cost: f64,
    total_cost: f64,
    levelized_cost: f64,
}

impl CostBreakdown {
    pub fn new(
        component_costs: BTreeMap<ComponentKind, f64>,
        water_unit_cost: f64,
        transport_cost: f64,
        demand_center: &str,
        annual_demand: f64,
    ) -> Result<Self, ValidationError> {
        if !(annual_demand.is_finite() && annual_demand > 0.0) {
            return Err(ValidationError::NonPositiveDemand {
                demand_center: demand_center.to_string(),
                value: annual_demand,
            });
        }

        let water_cost = ensure_finite("water cost", water_unit_cost * annual_demand)?;
        let component_sum: f64 = component_costs.values().sum();
        let total_cost = ensure_finite("total cost", component_sum + water_cost + transport_cost)?;
        let levelized_cost = ensure_finite("levelized cost", total_cost / annual_demand)?;

        Ok(Self {
            component_costs,
            water_unit_cost,
            water_cost,
            transport_cost,
            total_cost,
            levelized_cost,
        })
    }

    pub fn component_costs(&self) -> &BTreeMap<ComponentKind, f64> {
        &self.component_costs
    }

    pub fn component_cost(&self, component: ComponentKind) -> Option<f64> {
        self.component_costs.get(&component).copied()
    }

    /// Water cost per kg H2 of the selected source
    pub fn water_unit_cost(&self) -> f64 {
        self.water_unit_cost
    }

    /// Annual water cost (unit cost × annual demand)
    pub fn water_cost(&self) -> f64 {
        self.water_cost
    }

    pub fn transport_cost(&self) -> f64 {
        self.transport_cost
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Total cost per kg of annual demand (LCOH)
    pub fn levelized_cost(&self) -> f64 {
        self.levelized_cost
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordState {
    Pending,
    Computed(CostBreakdown),
    Skipped(SkipReason),
}

impl RecordState {
    pub fn name(&self) -> &'static str {
        match self {
            RecordState::Pending => "pending",
            RecordState::Computed(_) => "computed",
            RecordState::Skipped(_) => "skipped",
        }
    }
}

/// Output unit of the engine. Starts pending and moves exactly once, to computed
/// or skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct CostRecord {
    key: CostKey,
    state: RecordState,
}

impl CostRecord {
    pub fn new(key: CostKey) -> Self {
        Self { key, state: RecordState::Pending }
    }

    pub fn get_key(&self) -> &CostKey {
        &self.key
    }

    pub fn get_state(&self) -> &RecordState {
        &self.state
    }

    pub fn breakdown(&self) -> Option<&CostBreakdown> {
        match &self.state {
            RecordState::Computed(breakdown) => Some(breakdown),
            _ => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.state {
            RecordState::Skipped(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn complete(&mut self, breakdown: CostBreakdown) -> Result<(), EngineError> {
        self.transition(RecordState::Computed(breakdown))
    }

    pub fn skip(&mut self, reason: SkipReason) -> Result<(), EngineError> {
        self.transition(RecordState::Skipped(reason))
    }

    fn transition(&mut self, next: RecordState) -> Result<(), EngineError> {
        if !matches!(self.state, RecordState::Pending) {
            return Err(EngineError::InvalidTransition {
                key: self.key.to_string(),
                state: self.state.name(),
            });
        }
        self.state = next;
        Ok(())
    }
}
