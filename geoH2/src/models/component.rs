use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Infrastructure sized by the capacity optimizer and annuitized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Wind,
    Solar,
    Electrolyzer,
    Battery,
    H2Storage,
}

/// Financing classes carried by the country parameter table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Solar,
    Wind,
    Plant,
    Infrastructure,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Wind,
        ComponentKind::Solar,
        ComponentKind::Electrolyzer,
        ComponentKind::Battery,
        ComponentKind::H2Storage,
    ];

    /// Lower-case label used in column names ("D M wind capacity")
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Wind => "wind",
            ComponentKind::Solar => "solar",
            ComponentKind::Electrolyzer => "electrolyzer",
            ComponentKind::Battery => "battery",
            ComponentKind::H2Storage => "h2 storage",
        }
    }

    /// Capitalised label used in technology parameter keys ("Wind capital cost [€/W]")
    pub fn parameter_label(&self) -> &'static str {
        match self {
            ComponentKind::Wind => "Wind",
            ComponentKind::Solar => "Solar",
            ComponentKind::Electrolyzer => "Electrolyzer",
            ComponentKind::Battery => "Battery",
            ComponentKind::H2Storage => "H2 storage",
        }
    }

    /// Natural capacity unit of the component
    pub fn capacity_unit(&self) -> &'static str {
        match self {
            ComponentKind::H2Storage => "Wh",
            _ => "W",
        }
    }

    pub fn asset_class(&self) -> AssetClass {
        match self {
            ComponentKind::Wind => AssetClass::Wind,
            ComponentKind::Solar => AssetClass::Solar,
            ComponentKind::Electrolyzer |
            ComponentKind::Battery |
            ComponentKind::H2Storage => AssetClass::Plant,
        }
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', " ").as_str() {
            "wind" => Ok(ComponentKind::Wind),
            "solar" => Ok(ComponentKind::Solar),
            "electrolyzer" => Ok(ComponentKind::Electrolyzer),
            "battery" => Ok(ComponentKind::Battery),
            "h2 storage" => Ok(ComponentKind::H2Storage),
            _ => Err(format!("Unknown component: {}", s)),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl AssetClass {
    pub fn label(&self) -> &'static str {
        match self {
            AssetClass::Solar => "Solar",
            AssetClass::Wind => "Wind",
            AssetClass::Plant => "Plant",
            AssetClass::Infrastructure => "Infrastructure",
        }
    }
}

/// Delivery strategy evaluated per site and demand center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Trucking,
    Pipeline,
}

impl TransportMode {
    pub const ALL: [TransportMode; 2] = [TransportMode::Trucking, TransportMode::Pipeline];

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Trucking => "trucking",
            TransportMode::Pipeline => "pipeline",
        }
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trucking" => Ok(TransportMode::Trucking),
            "pipeline" => Ok(TransportMode::Pipeline),
            _ => Err(format!("Unknown transport mode: {}", s)),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
