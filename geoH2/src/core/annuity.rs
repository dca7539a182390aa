//! Conversion of one-off capital costs into equivalent annual costs.
//!
//! Two formulas are available and can be chosen per component:
//! - straight-line: `capex / lifetime`
//! - capital recovery factor: `capex × r(1+r)^n / ((1+r)^n − 1)`
//!
//! Both guard their divisors, so a zero lifetime is reported as a
//! [`ValidationError`] instead of producing an infinite cost.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_finite, ValidationError};
use crate::models::component::ComponentKind;
use crate::models::parameters::FinancingTerms;

pub trait Annuity {
    /// Annual equivalent of `capital_cost` under the given financing terms
    fn annual_cost(&self, capital_cost: f64, terms: &FinancingTerms, asset: &str) -> Result<f64, ValidationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AnnuitizationMethod {
    StraightLine,
    CapitalRecovery,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLine;

#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalRecovery;

fn require_lifetime(terms: &FinancingTerms, asset: &str) -> Result<f64, ValidationError> {
    if terms.lifetime_years.is_finite() && terms.lifetime_years > 0.0 {
        Ok(terms.lifetime_years)
    } else {
        Err(ValidationError::NonPositiveLifetime {
            asset: asset.to_string(),
            value: terms.lifetime_years,
        })
    }
}

/// Capital recovery factor. An interest rate of zero degenerates to `1 / n`.
pub fn capital_recovery_factor(interest_rate: f64, lifetime_years: f64) -> f64 {
    if interest_rate == 0.0 {
        return 1.0 / lifetime_years;
    }
    let growth = (1.0 + interest_rate).powf(lifetime_years);
    interest_rate * growth / (growth - 1.0)
}

impl Annuity for StraightLine {
    fn annual_cost(&self, capital_cost: f64, terms: &FinancingTerms, asset: &str) -> Result<f64, ValidationError> {
        let lifetime = require_lifetime(terms, asset)?;
        ensure_finite("annual capital cost", capital_cost / lifetime)
    }
}

impl Annuity for CapitalRecovery {
    fn annual_cost(&self, capital_cost: f64, terms: &FinancingTerms, asset: &str) -> Result<f64, ValidationError> {
        let lifetime = require_lifetime(terms, asset)?;
        if !terms.interest_rate.is_finite() || terms.interest_rate < 0.0 {
            return Err(ValidationError::NegativeInterestRate {
                asset: asset.to_string(),
                value: terms.interest_rate,
            });
        }
        let crf = capital_recovery_factor(terms.interest_rate, lifetime);
        ensure_finite("annual capital cost", capital_cost * crf)
    }
}

impl Annuity for AnnuitizationMethod {
    fn annual_cost(&self, capital_cost: f64, terms: &FinancingTerms, asset: &str) -> Result<f64, ValidationError> {
        match self {
            AnnuitizationMethod::StraightLine => StraightLine.annual_cost(capital_cost, terms, asset),
            AnnuitizationMethod::CapitalRecovery => CapitalRecovery.annual_cost(capital_cost, terms, asset),
        }
    }
}

/// Annual cost of an installed component: `capacity × unit capex` annuitized.
pub fn annual_component_cost(
    component: ComponentKind,
    capacity: f64,
    unit_capex: f64,
    terms: &FinancingTerms,
    annuity: &dyn Annuity,
) -> Result<f64, ValidationError> {
    if !capacity.is_finite() || capacity < 0.0 {
        return Err(ValidationError::InvalidCapacity {
            component: component.to_string(),
            value: capacity,
        });
    }
    if !unit_capex.is_finite() || unit_capex < 0.0 {
        return Err(ValidationError::InvalidUnitCost {
            parameter: format!("{} capital cost", component.parameter_label()),
            value: unit_capex,
        });
    }
    annuity.annual_cost(capacity * unit_capex, terms, component.label())
}
