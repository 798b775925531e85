//! Structural material properties

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::SeismicError;

/// Gross building density of the reference (concrete) structure in kg/m³
pub const REFERENCE_DENSITY: f64 = 300.0;

/// Primary structural system of the simulated building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralMaterial {
    Concrete,
    Steel,
    Wood,
    Hybrid,
}

impl StructuralMaterial {
    pub const ALL: [StructuralMaterial; 4] = [
        StructuralMaterial::Concrete,
        StructuralMaterial::Steel,
        StructuralMaterial::Wood,
        StructuralMaterial::Hybrid,
    ];

    /// Static property table entry for this material
    pub fn profile(self) -> &'static MaterialProfile {
        match self {
            StructuralMaterial::Concrete => &CONCRETE,
            StructuralMaterial::Steel => &STEEL,
            StructuralMaterial::Wood => &WOOD,
            StructuralMaterial::Hybrid => &HYBRID,
        }
    }
}

impl Default for StructuralMaterial {
    fn default() -> Self {
        Self::Concrete
    }
}

impl fmt::Display for StructuralMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

impl FromStr for StructuralMaterial {
    type Err = SeismicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concrete" | "rc" => Ok(Self::Concrete),
            "steel" => Ok(Self::Steel),
            "wood" | "timber" => Ok(Self::Wood),
            "hybrid" | "composite" => Ok(Self::Hybrid),
            _ => Err(SeismicError::UnknownVariant {
                kind: "structural material",
                value: s.to_string(),
            }),
        }
    }
}

/// Material properties used by the response model and collapse evaluator
///
/// `yield_strength`, `ultimate_strain` and `ductility` are display values only;
/// the collapse decision reads the drift thresholds.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialProfile {
    pub name: &'static str,
    /// Modulus of elasticity in GPa
    pub elastic_modulus: f64,
    /// Effective gross building density in kg/m³
    pub density: f64,
    /// Inherent damping ratio
    pub damping_ratio: f64,
    /// Inter-story drift ratio at which the system collapses
    pub collapse_threshold: f64,
    /// Inter-story drift ratio at which visible damage starts
    pub damage_threshold: f64,
    pub stiffness_modifier: f64,
    pub color: Color,
    /// Yield strength in MPa
    pub yield_strength: f64,
    pub ultimate_strain: f64,
    pub ductility: f64,
    /// Absolute roof displacement limit in cm
    pub displacement_limit: f64,
}

impl MaterialProfile {
    /// Mass density relative to the concrete reference
    pub fn density_ratio(&self) -> f64 {
        self.density / REFERENCE_DENSITY
    }
}

pub const CONCRETE: MaterialProfile = MaterialProfile {
    name: "Concrete",
    elastic_modulus: 30.0,
    density: 300.0,
    damping_ratio: 0.05,
    collapse_threshold: 0.035,
    damage_threshold: 0.010,
    stiffness_modifier: 1.0,
    color: Color::rgb(0x9e, 0x9e, 0x9e),
    yield_strength: 420.0,
    ultimate_strain: 0.003,
    ductility: 3.0,
    displacement_limit: 120.0,
};

pub const STEEL: MaterialProfile = MaterialProfile {
    name: "Steel",
    elastic_modulus: 200.0,
    density: 240.0,
    damping_ratio: 0.02,
    collapse_threshold: 0.050,
    damage_threshold: 0.015,
    stiffness_modifier: 1.2,
    color: Color::rgb(0x46, 0x82, 0xb4),
    yield_strength: 345.0,
    ultimate_strain: 0.20,
    ductility: 6.0,
    displacement_limit: 180.0,
};

pub const WOOD: MaterialProfile = MaterialProfile {
    name: "Wood",
    elastic_modulus: 12.0,
    density: 150.0,
    damping_ratio: 0.07,
    collapse_threshold: 0.030,
    damage_threshold: 0.008,
    stiffness_modifier: 0.6,
    color: Color::rgb(0x8b, 0x5a, 0x2b),
    yield_strength: 40.0,
    ultimate_strain: 0.01,
    ductility: 2.0,
    displacement_limit: 90.0,
};

pub const HYBRID: MaterialProfile = MaterialProfile {
    name: "Hybrid",
    elastic_modulus: 100.0,
    density: 270.0,
    damping_ratio: 0.04,
    collapse_threshold: 0.060,
    damage_threshold: 0.020,
    stiffness_modifier: 1.3,
    color: Color::rgb(0x5f, 0x9e, 0xa0),
    yield_strength: 380.0,
    ultimate_strain: 0.05,
    ductility: 5.0,
    displacement_limit: 200.0,
};
