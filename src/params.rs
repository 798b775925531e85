//! Simulation input parameters
//!
//! [`SimulationParameters`] is a small `Copy` value. Every builder clamps to the
//! ranges the user-facing controls allow, so downstream code never sees NaN or
//! out-of-range magnitudes and distances.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SeismicError, SeismicResult};
use crate::profiles::{
    BuildingCode, Reinforcement, SoilType, StructuralMaterial, StructuralProperties,
};

pub const MAGNITUDE_RANGE: (f64, f64) = (4.0, 9.5);
pub const DISTANCE_RANGE: (f64, f64) = (5.0, 300.0);
pub const DAMPING_RANGE: (f64, f64) = (0.01, 0.20);
pub const SPEED_RANGE: (f64, f64) = (0.1, 3.0);

/// Speed presets offered by the basic control panel
pub const SPEED_PRESETS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

/// Which ground-motion model drives the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Closed-form sinusoid computed on the fly each frame
    Simplified,
    /// Precomputed stochastic record played back through a window
    Realistic,
}

impl Default for SimulationMode {
    fn default() -> Self {
        Self::Simplified
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationMode::Simplified => f.write_str("Simplified"),
            SimulationMode::Realistic => f.write_str("Realistic"),
        }
    }
}

impl FromStr for SimulationMode {
    type Err = SeismicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simplified" | "simple" => Ok(Self::Simplified),
            "realistic" | "enhanced" => Ok(Self::Realistic),
            _ => Err(SeismicError::UnknownVariant {
                kind: "simulation mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Earthquake and building inputs for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Moment magnitude
    pub magnitude: f64,
    /// Epicentral distance in km
    pub distance_km: f64,
    pub soil_type: SoilType,
    /// Damping ratio used by the simplified model
    pub damping_ratio: f64,
    pub material: StructuralMaterial,
    pub building_code: BuildingCode,
    pub reinforcement: Reinforcement,
    /// Active damping assistance reduces the response
    pub ai_support: bool,
    pub mode: SimulationMode,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            magnitude: 6.5,
            distance_km: 20.0,
            soil_type: SoilType::Stiff,
            damping_ratio: 0.05,
            material: StructuralMaterial::Concrete,
            building_code: BuildingCode::Modern,
            reinforcement: Reinforcement::Standard,
            ai_support: false,
            mode: SimulationMode::Simplified,
        }
    }
}

fn clamp_or(value: f64, range: (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(range.0, range.1)
    } else {
        fallback
    }
}

impl SimulationParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set magnitude, clamped to [4.0, 9.5]
    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = clamp_or(magnitude, MAGNITUDE_RANGE, Self::default().magnitude);
        self
    }

    /// Set epicentral distance, clamped to [5, 300] km
    pub fn with_distance(mut self, distance_km: f64) -> Self {
        self.distance_km = clamp_or(distance_km, DISTANCE_RANGE, Self::default().distance_km);
        self
    }

    /// Set damping ratio, clamped to [0.01, 0.20]
    pub fn with_damping(mut self, damping_ratio: f64) -> Self {
        self.damping_ratio = clamp_or(damping_ratio, DAMPING_RANGE, Self::default().damping_ratio);
        self
    }

    pub fn with_soil(mut self, soil_type: SoilType) -> Self {
        self.soil_type = soil_type;
        self
    }

    pub fn with_material(mut self, material: StructuralMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_code(mut self, building_code: BuildingCode) -> Self {
        self.building_code = building_code;
        self
    }

    pub fn with_reinforcement(mut self, reinforcement: Reinforcement) -> Self {
        self.reinforcement = reinforcement;
        self
    }

    pub fn with_ai_support(mut self, ai_support: bool) -> Self {
        self.ai_support = ai_support;
        self
    }

    pub fn with_mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Re-apply every range clamp (used on values that came from deserialization)
    pub fn clamped(self) -> Self {
        let magnitude = self.magnitude;
        let distance = self.distance_km;
        let damping = self.damping_ratio;
        self.with_magnitude(magnitude)
            .with_distance(distance)
            .with_damping(damping)
    }

    /// Strict check used at boundaries that prefer rejecting to clamping
    pub fn validate(&self) -> SeismicResult<()> {
        let checks = [
            ("magnitude", self.magnitude, MAGNITUDE_RANGE),
            ("distance_km", self.distance_km, DISTANCE_RANGE),
            ("damping_ratio", self.damping_ratio, DAMPING_RANGE),
        ];
        for (name, value, (lo, hi)) in checks {
            if !value.is_finite() || value < lo || value > hi {
                return Err(SeismicError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Material, code and reinforcement tables for this parameter set
    pub fn structure(&self) -> StructuralProperties {
        StructuralProperties::new(self.material, self.building_code, self.reinforcement)
    }

    /// Overlay the keys present in a JSON object onto `self`, then clamp
    ///
    /// Lets callers send only the controls that changed.
    pub fn merged_json(&self, json: &str) -> SeismicResult<Self> {
        let mut base = serde_json::to_value(self)?;
        let patch: serde_json::Value = serde_json::from_str(json)?;
        match (&mut base, patch) {
            (serde_json::Value::Object(target), serde_json::Value::Object(changes)) => {
                target.extend(changes);
            }
            _ => {
                return Err(SeismicError::InvalidInput(
                    "parameters must be a JSON object".to_string(),
                ))
            }
        }
        let merged: SimulationParameters = serde_json::from_value(base)?;
        Ok(merged.clamped())
    }

    /// Multiplicative response factor from active damping
    pub fn response_reduction(&self, reduction: f64) -> f64 {
        if self.ai_support {
            reduction
        } else {
            1.0
        }
    }
}

/// Clamp a playback speed multiplier to [0.1, 3.0]
pub fn clamp_speed(speed: f64) -> f64 {
    clamp_or(speed, SPEED_RANGE, 1.0)
}
