//! Site class / soil amplification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SeismicError;

/// Site soil category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Rock,
    Stiff,
    Soft,
    VerySoft,
}

impl SoilType {
    pub const ALL: [SoilType; 4] = [
        SoilType::Rock,
        SoilType::Stiff,
        SoilType::Soft,
        SoilType::VerySoft,
    ];

    /// Surface amplification of bedrock shaking
    pub fn amplification(self) -> f64 {
        match self {
            SoilType::Rock => 1.0,
            SoilType::Stiff => 1.3,
            SoilType::Soft => 1.8,
            SoilType::VerySoft => 2.5,
        }
    }

    /// Dominant site frequency before distance/magnitude corrections, in Hz
    pub fn base_frequency(self) -> f64 {
        match self {
            SoilType::Rock => 5.0,
            SoilType::Stiff => 3.0,
            SoilType::Soft => 1.5,
            SoilType::VerySoft => 0.8,
        }
    }

    /// Shear-wave velocity of the upper 30 m in m/s (display only)
    pub fn vs30(self) -> f64 {
        match self {
            SoilType::Rock => 1100.0,
            SoilType::Stiff => 550.0,
            SoilType::Soft => 250.0,
            SoilType::VerySoft => 150.0,
        }
    }

    /// Basin resonance term `(frequency Hz, weight)`, soft sites only
    pub fn basin_resonance(self) -> Option<(f64, f64)> {
        match self {
            SoilType::Soft => Some((0.40, 0.3)),
            SoilType::VerySoft => Some((0.25, 0.5)),
            _ => None,
        }
    }

    pub fn is_soft(self) -> bool {
        matches!(self, SoilType::Soft | SoilType::VerySoft)
    }

    pub fn label(self) -> &'static str {
        match self {
            SoilType::Rock => "Rock",
            SoilType::Stiff => "Stiff soil",
            SoilType::Soft => "Soft soil",
            SoilType::VerySoft => "Very soft soil",
        }
    }
}

impl Default for SoilType {
    fn default() -> Self {
        Self::Stiff
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SoilType {
    type Err = SeismicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "rock" => Ok(Self::Rock),
            "stiff" => Ok(Self::Stiff),
            "soft" => Ok(Self::Soft),
            "very_soft" | "verysoft" => Ok(Self::VerySoft),
            _ => Err(SeismicError::UnknownVariant {
                kind: "soil type",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softer_soils_amplify_more() {
        let amps: Vec<f64> = SoilType::ALL.iter().map(|s| s.amplification()).collect();
        assert!(amps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn parse_accepts_hyphenated_names() {
        assert_eq!("very-soft".parse::<SoilType>().unwrap(), SoilType::VerySoft);
        assert_eq!("Very Soft".parse::<SoilType>().unwrap(), SoilType::VerySoft);
        assert!("mud".parse::<SoilType>().is_err());
    }
}
