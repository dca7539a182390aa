use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ValidationError;
use crate::utils::geometry::{GeoPoint, Geometry};

/// Static distances from a site to surrounding features, in km.
/// `None` means the upstream grid generator did not provide the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteDistances {
    pub waterbody: Option<f64>,
    pub waterway: Option<f64>,
    pub ocean: Option<f64>,
    pub grid: Option<f64>,
    pub road: Option<f64>,
}

/// Theoretical renewable potentials of a site, in capacity units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SitePotentials {
    pub solar: Option<f64>,
    pub wind: Option<f64>,
}

/// One spatial cell. Static attributes are fixed at creation; stages only append
/// columns, and every stage works on its own copy of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    id: u64,
    geometry: Geometry,
    country: String,
    distances: SiteDistances,
    potentials: SitePotentials,
    columns: BTreeMap<String, f64>,
    passthrough: BTreeMap<String, Value>,
}

impl Site {
    pub fn new(id: u64, geometry: Geometry, country: impl Into<String>, distances: SiteDistances) -> Self {
        Self {
            id,
            geometry,
            country: country.into(),
            distances,
            potentials: SitePotentials::default(),
            columns: BTreeMap::new(),
            passthrough: BTreeMap::new(),
        }
    }

    pub fn with_potentials(mut self, potentials: SitePotentials) -> Self {
        self.potentials = potentials;
        self
    }

    pub fn get_id(&self) -> u64 {
        self.id
    }

    pub fn get_geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn get_country(&self) -> &str {
        &self.country
    }

    pub fn get_distances(&self) -> &SiteDistances {
        &self.distances
    }

    pub fn get_potentials(&self) -> &SitePotentials {
        &self.potentials
    }

    pub fn centroid(&self) -> Option<GeoPoint> {
        self.geometry.centroid()
    }

    pub fn column(&self, name: &str) -> Option<f64> {
        self.columns.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn columns(&self) -> &BTreeMap<String, f64> {
        &self.columns
    }

    /// Appends a computed column. Re-running a stage replaces its own earlier output.
    pub fn append_column(&mut self, name: impl Into<String>, value: f64) {
        self.columns.insert(name.into(), value);
    }

    /// Drops a column left by an earlier run of a stage
    pub fn remove_column(&mut self, name: &str) -> Option<f64> {
        self.columns.remove(name)
    }

    pub fn passthrough(&self) -> &BTreeMap<String, Value> {
        &self.passthrough
    }

    pub fn insert_passthrough(&mut self, name: impl Into<String>, value: Value) {
        self.passthrough.insert(name.into(), value);
    }

    pub fn remove_passthrough(&mut self, name: &str) -> Option<Value> {
        self.passthrough.remove(name)
    }

    /// Validated distance lookup: present, finite and non-negative
    pub fn require_distance(&self, field: &str, value: Option<f64>) -> Result<f64, ValidationError> {
        match value {
            None => Err(ValidationError::MissingDistance { field: field.to_string() }),
            Some(d) if !d.is_finite() || d < 0.0 => Err(ValidationError::InvalidDistance {
                field: field.to_string(),
                value: d,
            }),
            Some(d) => Ok(d),
        }
    }
}
