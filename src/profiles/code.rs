//! Building code era modifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SeismicError;

/// Seismic design code the building was designed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingCode {
    /// Pre-modern design, little ductile detailing
    Legacy,
    Modern,
    /// Performance-based design with supplemental systems
    Advanced,
}

impl BuildingCode {
    pub const ALL: [BuildingCode; 3] = [
        BuildingCode::Legacy,
        BuildingCode::Modern,
        BuildingCode::Advanced,
    ];

    pub fn profile(self) -> &'static CodeProfile {
        match self {
            BuildingCode::Legacy => &LEGACY,
            BuildingCode::Modern => &MODERN,
            BuildingCode::Advanced => &ADVANCED,
        }
    }
}

impl Default for BuildingCode {
    fn default() -> Self {
        Self::Modern
    }
}

impl fmt::Display for BuildingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

impl FromStr for BuildingCode {
    type Err = SeismicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" | "old" => Ok(Self::Legacy),
            "modern" => Ok(Self::Modern),
            "advanced" => Ok(Self::Advanced),
            _ => Err(SeismicError::UnknownVariant {
                kind: "building code",
                value: s.to_string(),
            }),
        }
    }
}

/// Modifiers applied on top of the material profile
#[derive(Debug, Clone, Serialize)]
pub struct CodeProfile {
    pub name: &'static str,
    pub strength_modifier: f64,
    pub stiffness_modifier: f64,
    pub damping_modifier: f64,
    pub collapse_threshold_modifier: f64,
}

pub const LEGACY: CodeProfile = CodeProfile {
    name: "Legacy",
    strength_modifier: 0.70,
    stiffness_modifier: 0.80,
    damping_modifier: 0.90,
    collapse_threshold_modifier: 0.75,
};

pub const MODERN: CodeProfile = CodeProfile {
    name: "Modern",
    strength_modifier: 1.00,
    stiffness_modifier: 1.00,
    damping_modifier: 1.00,
    collapse_threshold_modifier: 1.00,
};

pub const ADVANCED: CodeProfile = CodeProfile {
    name: "Advanced",
    strength_modifier: 1.30,
    stiffness_modifier: 1.15,
    damping_modifier: 1.20,
    collapse_threshold_modifier: 1.30,
};
