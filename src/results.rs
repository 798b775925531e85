//! Result types reported by the simulator

use serde::{Deserialize, Serialize};

use crate::collapse::{CollapseState, CollapseTrigger, DamageAssessment};
use crate::config::SimulationConfig;
use crate::ground_motion::{dominant_frequency, expected_pga, SimplifiedMotion};
use crate::params::{SimulationMode, SimulationParameters};

/// Derived values shown next to the controls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatedValues {
    /// Simplified-model peak ground acceleration in g
    pub pga: f64,
    /// Simplified-model shaking frequency in Hz
    pub frequency: f64,
    /// Soil-amplified simplified PGA in g
    pub max_amplitude: f64,
    pub soil_amplification: f64,
    /// Building fundamental period in seconds
    pub natural_period: f64,
    /// Material × code damping ratio
    pub effective_damping: f64,
    /// Attenuation-relation PGA used by the realistic model, in g
    pub expected_pga: f64,
    /// Realistic dominant frequency in Hz
    pub dominant_frequency: f64,
    /// Drift ratio at which the building collapses
    pub collapse_threshold: f64,
}

impl CalculatedValues {
    pub fn new(params: &SimulationParameters, config: &SimulationConfig) -> Self {
        let simplified = SimplifiedMotion::new(params);
        let props = params.structure();
        Self {
            pga: simplified.pga,
            frequency: simplified.frequency,
            max_amplitude: simplified.max_amplitude,
            soil_amplification: params.soil_type.amplification(),
            natural_period: props.fundamental_period(config.num_floors),
            effective_damping: props.effective_damping(),
            expected_pga: expected_pga(params),
            dominant_frequency: dominant_frequency(params),
            collapse_threshold: props.collapse_threshold(),
        }
    }

    /// PGA of the active model, formatted to two decimals
    pub fn pga_display(&self, mode: SimulationMode) -> String {
        match mode {
            SimulationMode::Simplified => format!("{:.2}", self.pga),
            SimulationMode::Realistic => format!("{:.2}", self.expected_pga),
        }
    }
}

/// Summary of one headless playback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub params: SimulationParameters,
    /// Frames evaluated
    pub frames: usize,
    /// Simulated time covered in seconds
    pub simulated_time: f64,
    /// Largest |ground acceleration| seen, in g
    pub peak_pga: f64,
    /// Largest |floor displacement| seen, in cm
    pub peak_roof_displacement: f64,
    /// Largest governing drift ratio seen
    pub max_drift_ratio: f64,
    /// Lowest health seen (0 after collapse)
    pub min_health_percent: f64,
    /// Any frame flagged a soft story
    pub soft_story_detected: bool,
    pub collapsed: bool,
    pub collapse_time: Option<f64>,
    pub collapse_trigger: Option<CollapseTrigger>,
}

impl RunSummary {
    pub fn new(params: SimulationParameters) -> Self {
        Self {
            params,
            frames: 0,
            simulated_time: 0.0,
            peak_pga: 0.0,
            peak_roof_displacement: 0.0,
            max_drift_ratio: 0.0,
            min_health_percent: 100.0,
            soft_story_detected: false,
            collapsed: false,
            collapse_time: None,
            collapse_trigger: None,
        }
    }

    /// Fold one frame into the running extremes
    pub fn record(&mut self, t: f64, pga: f64, assessment: &DamageAssessment) {
        self.frames += 1;
        self.simulated_time = self.simulated_time.max(t);
        self.peak_pga = self.peak_pga.max(pga.abs());
        self.peak_roof_displacement = self
            .peak_roof_displacement
            .max(assessment.roof_displacement_cm);
        self.max_drift_ratio = self.max_drift_ratio.max(assessment.max_drift_ratio);
        self.min_health_percent = self.min_health_percent.min(assessment.health_percent);
        self.soft_story_detected |= assessment.soft_story;
    }

    /// Copy the latched collapse outcome
    pub fn finish(&mut self, collapse: &CollapseState) {
        self.collapsed = collapse.has_collapsed;
        self.collapse_time = collapse.onset_time;
        self.collapse_trigger = collapse.trigger;
        if self.collapsed {
            self.min_health_percent = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn calculated_values_for_default_parameters() {
        let v = CalculatedValues::new(&SimulationParameters::new(), &SimulationConfig::default());
        assert_eq!(v.pga_display(SimulationMode::Simplified), "2.24");
        assert_relative_eq!(v.soil_amplification, 1.3);
        assert_relative_eq!(v.natural_period, 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.effective_damping, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn summary_tracks_extremes() {
        let params = SimulationParameters::new();
        let mut s = RunSummary::new(params);
        let mut a = DamageAssessment::at_rest(&params);
        a.roof_displacement_cm = 4.0;
        a.max_drift_ratio = 0.002;
        a.health_percent = 90.0;
        s.record(1.0, -0.3, &a);
        a.roof_displacement_cm = 2.0;
        a.health_percent = 95.0;
        s.record(2.0, 0.1, &a);

        assert_eq!(s.frames, 2);
        assert_relative_eq!(s.peak_pga, 0.3);
        assert_relative_eq!(s.peak_roof_displacement, 4.0);
        assert_relative_eq!(s.min_health_percent, 90.0);
        s.finish(&CollapseState::new());
        assert!(!s.collapsed);
    }
}
