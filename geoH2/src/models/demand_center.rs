use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::utils::geometry::GeoPoint;

/// A named hydrogen off-taker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandCenter {
    name: String,
    location: GeoPoint,
    annual_demand_kg: f64,
    demand_state: String,
}

impl DemandCenter {
    pub fn new(name: impl Into<String>, location: GeoPoint, annual_demand_kg: f64, demand_state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location,
            annual_demand_kg,
            demand_state: demand_state.into(),
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_location(&self) -> &GeoPoint {
        &self.location
    }

    pub fn get_annual_demand(&self) -> f64 {
        self.annual_demand_kg
    }

    /// Required delivery state (e.g. "500 bar", "LH2"); not interpreted by the engine
    pub fn get_demand_state(&self) -> &str {
        &self.demand_state
    }

    /// Annual demand usable as a divisor
    pub fn validated_demand(&self) -> Result<f64, ValidationError> {
        if self.annual_demand_kg.is_finite() && self.annual_demand_kg > 0.0 {
            Ok(self.annual_demand_kg)
        } else {
            Err(ValidationError::NonPositiveDemand {
                demand_center: self.name.clone(),
                value: self.annual_demand_kg,
            })
        }
    }
}
