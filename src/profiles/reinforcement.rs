//! Reinforcement level modifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SeismicError;

/// Amount of seismic reinforcement / retrofit detailing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reinforcement {
    Minimal,
    Standard,
    Advanced,
}

impl Reinforcement {
    pub const ALL: [Reinforcement; 3] = [
        Reinforcement::Minimal,
        Reinforcement::Standard,
        Reinforcement::Advanced,
    ];

    pub fn profile(self) -> &'static ReinforcementProfile {
        match self {
            Reinforcement::Minimal => &MINIMAL,
            Reinforcement::Standard => &STANDARD,
            Reinforcement::Advanced => &ADVANCED,
        }
    }
}

impl Default for Reinforcement {
    fn default() -> Self {
        Self::Standard
    }
}

impl fmt::Display for Reinforcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

impl FromStr for Reinforcement {
    type Err = SeismicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" | "none" => Ok(Self::Minimal),
            "standard" => Ok(Self::Standard),
            "advanced" | "enhanced" => Ok(Self::Advanced),
            _ => Err(SeismicError::UnknownVariant {
                kind: "reinforcement level",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReinforcementProfile {
    pub name: &'static str,
    pub strength_modifier: f64,
    pub stiffness_modifier: f64,
    pub damping_modifier: f64,
    pub collapse_threshold_modifier: f64,
}

pub const MINIMAL: ReinforcementProfile = ReinforcementProfile {
    name: "Minimal",
    strength_modifier: 0.75,
    stiffness_modifier: 0.85,
    damping_modifier: 0.95,
    collapse_threshold_modifier: 0.80,
};

pub const STANDARD: ReinforcementProfile = ReinforcementProfile {
    name: "Standard",
    strength_modifier: 1.00,
    stiffness_modifier: 1.00,
    damping_modifier: 1.00,
    collapse_threshold_modifier: 1.00,
};

pub const ADVANCED: ReinforcementProfile = ReinforcementProfile {
    name: "Advanced",
    strength_modifier: 1.25,
    stiffness_modifier: 1.10,
    damping_modifier: 1.10,
    collapse_threshold_modifier: 1.25,
};
