//! Fixed simulation constants and tuning options

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SeismicResult;

/// Building geometry, timing and playback constants for a simulator instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of stories above ground
    pub num_floors: usize,
    /// Story height in cm
    pub story_height_cm: f64,
    /// Length of one realistic record in seconds
    pub total_duration: f64,
    /// Samples in one realistic record
    pub sample_count: usize,
    /// Ambient-noise lead-in before the main shock arrives, in seconds
    pub pre_event_time: f64,
    /// Nominal frame step in seconds
    pub frame_dt: f64,
    /// Chart samples shown before the current index
    pub chart_behind: usize,
    /// Chart samples shown after the current index
    pub chart_ahead: usize,
    /// Max length of the rolling simplified-mode history
    pub simplified_window: usize,
    /// Seed for the realistic ground-motion synthesis
    pub seed: u64,
    /// Draw fresh noise each time a record is regenerated
    pub reseed_each_run: bool,
    /// Response factor applied while AI damping support is active
    pub ai_response_reduction: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_floors: 10,
            story_height_cm: 350.0,
            total_duration: 60.0,
            sample_count: 1000,
            pre_event_time: 2.0,
            frame_dt: 1.0 / 60.0,
            chart_behind: 30,
            chart_ahead: 90,
            simplified_window: 200,
            seed: 0x5eed_1906,
            reseed_each_run: false,
            ai_response_reduction: 0.6,
            canvas_width: 800.0,
            canvas_height: 600.0,
        }
    }
}

/// Upper bound on realistic record length
pub const MAX_SAMPLES: usize = 20_000;
/// Upper bound on the simplified rolling window
pub const MAX_WINDOW: usize = 10_000;

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> SeismicResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&text)?;
        Ok(config.sanitized())
    }

    /// Defaults overridden by `SEISMIC_FLOORS`, `SEISMIC_SAMPLES`,
    /// `SEISMIC_DURATION` and `SEISMIC_SEED`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(n) = env_parse::<usize>("SEISMIC_FLOORS") {
            config.num_floors = n;
        }
        if let Some(n) = env_parse::<usize>("SEISMIC_SAMPLES") {
            config.sample_count = n;
        }
        if let Some(d) = env_parse::<f64>("SEISMIC_DURATION") {
            config.total_duration = d;
        }
        if let Some(seed) = env_parse::<u64>("SEISMIC_SEED") {
            config.seed = seed;
        }
        config.sanitized()
    }

    /// Replace values that would make the simulation degenerate
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.num_floors = self.num_floors.clamp(1, 60);
        self.sample_count = self.sample_count.clamp(2, MAX_SAMPLES);
        self.simplified_window = self.simplified_window.clamp(2, MAX_WINDOW);
        self.chart_behind = self.chart_behind.min(self.sample_count);
        self.chart_ahead = self.chart_ahead.min(self.sample_count);
        if !(self.story_height_cm.is_finite() && self.story_height_cm > 0.0) {
            self.story_height_cm = defaults.story_height_cm;
        }
        if !(self.total_duration.is_finite() && self.total_duration > 0.0) {
            self.total_duration = defaults.total_duration;
        }
        if !(self.pre_event_time.is_finite() && self.pre_event_time >= 0.0) {
            self.pre_event_time = defaults.pre_event_time;
        }
        if !(self.frame_dt.is_finite() && self.frame_dt > 0.0) {
            self.frame_dt = defaults.frame_dt;
        }
        if !(self.ai_response_reduction.is_finite() && self.ai_response_reduction > 0.0) {
            self.ai_response_reduction = defaults.ai_response_reduction;
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            self.canvas_width = defaults.canvas_width;
            self.canvas_height = defaults.canvas_height;
        }
        self
    }

    pub fn with_floors(mut self, num_floors: usize) -> Self {
        self.num_floors = num_floors.clamp(1, 60);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_duration(mut self, total_duration: f64, sample_count: usize) -> Self {
        self.total_duration = total_duration;
        self.sample_count = sample_count;
        self.sanitized()
    }

    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self.sanitized()
    }

    /// Fresh noise per regeneration
    pub fn with_reseeding(mut self) -> Self {
        self.reseed_each_run = true;
        self
    }

    /// Building height in cm
    pub fn building_height_cm(&self) -> f64 {
        self.num_floors as f64 * self.story_height_cm
    }

    /// Spacing of realistic samples in seconds
    pub fn sample_dt(&self) -> f64 {
        self.total_duration / self.sample_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_canonical() {
        let c = SimulationConfig::default();
        assert_eq!(c.num_floors, 10);
        assert_eq!(c.pre_event_time, 2.0);
        assert_relative_eq!(c.sample_dt(), 0.06, epsilon = 1e-12);
        assert_relative_eq!(c.building_height_cm(), 3500.0);
    }

    #[test]
    fn sanitize_repairs_degenerate_values() {
        let c = SimulationConfig {
            num_floors: 0,
            sample_count: 0,
            total_duration: -1.0,
            frame_dt: f64::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(c.num_floors, 1);
        assert_eq!(c.sample_count, 2);
        assert_eq!(c.total_duration, 60.0);
        assert_relative_eq!(c.frame_dt, 1.0 / 60.0);
    }

    #[test]
    fn oversized_lengths_are_bounded() {
        let c = SimulationConfig {
            sample_count: usize::MAX,
            simplified_window: usize::MAX,
            chart_behind: usize::MAX,
            chart_ahead: usize::MAX,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(c.sample_count, MAX_SAMPLES);
        assert_eq!(c.simplified_window, MAX_WINDOW);
        assert_eq!(c.chart_behind, MAX_SAMPLES);
        assert_eq!(c.chart_ahead, MAX_SAMPLES);

        let small = SimulationConfig::default().with_duration(10.0, 50);
        assert_eq!(small.chart_ahead, 50);
        assert_eq!(small.chart_behind, 30);
    }

    #[test]
    fn json_file_round_trip_keeps_defaults_for_missing_keys() {
        let path = std::env::temp_dir().join("seismic_config_test.json");
        std::fs::write(&path, r#"{"num_floors": 6, "seed": 42}"#).unwrap();
        let c = SimulationConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(c.num_floors, 6);
        assert_eq!(c.seed, 42);
        assert_eq!(c.sample_count, 1000);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimulationConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, crate::error::SeismicError::IoError(_)));
    }
}
