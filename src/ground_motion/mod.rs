//! Ground motion generation
//!
//! Two models share the [`TimeHistory`] output type:
//! - [`SimplifiedMotion`]: closed-form sinusoid, evaluated per frame
//! - [`realistic::generate`]: stochastic record precomputed for the full duration

pub mod realistic;
pub mod simplified;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::params::{SimulationMode, SimulationParameters};

pub use realistic::{dominant_frequency, expected_pga, RealisticMotion};
pub use simplified::SimplifiedMotion;

/// One sample of ground/building motion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundSample {
    /// Time in seconds
    pub t: f64,
    /// Ground acceleration in g (signed)
    pub pga: f64,
    /// Velocity in cm/s
    pub velocity: f64,
    /// Building response displacement in cm
    pub displacement: f64,
}

impl GroundSample {
    pub fn is_finite(&self) -> bool {
        self.t.is_finite()
            && self.pga.is_finite()
            && self.velocity.is_finite()
            && self.displacement.is_finite()
    }
}

/// Ordered ground-motion samples, optionally bounded to a rolling window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeHistory {
    samples: Vec<GroundSample>,
    max_len: Option<usize>,
}

impl TimeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rolling history that drops the oldest samples beyond `max_len`
    pub fn bounded(max_len: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_len.clamp(1, crate::config::MAX_WINDOW) + 1),
            max_len: Some(max_len.max(1)),
        }
    }

    pub fn from_samples(samples: Vec<GroundSample>) -> Self {
        Self {
            samples,
            max_len: None,
        }
    }

    /// Append, truncating from the front when over the bound
    pub fn push(&mut self, sample: GroundSample) {
        self.samples.push(sample);
        if let Some(max) = self.max_len {
            if self.samples.len() > max {
                let excess = self.samples.len() - max;
                self.samples.drain(..excess);
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    pub fn get(&self, index: usize) -> Option<&GroundSample> {
        self.samples.get(index)
    }

    pub fn last(&self) -> Option<&GroundSample> {
        self.samples.last()
    }

    pub fn samples(&self) -> &[GroundSample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroundSample> {
        self.samples.iter()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    pub fn pga(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.pga).collect()
    }

    pub fn velocity(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.velocity).collect()
    }

    pub fn displacement(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.displacement).collect()
    }

    /// Largest |acceleration| in g
    pub fn peak_pga(&self) -> f64 {
        self.samples.iter().fold(0.0, |m, s| m.max(s.pga.abs()))
    }

    /// Largest |displacement| in cm
    pub fn peak_displacement(&self) -> f64 {
        self.samples.iter().fold(0.0, |m, s| m.max(s.displacement.abs()))
    }

    /// Sample index for playback time `t` over a record of length `duration`
    ///
    /// `floor((t mod D) / D · n)`; times at or past the end pin to the last sample.
    pub fn index_at(&self, t: f64, duration: f64) -> Option<usize> {
        let n = self.samples.len();
        if n == 0 {
            return None;
        }
        if !(duration > 0.0) || !t.is_finite() || t >= duration {
            return Some(n - 1);
        }
        let frac = (t.max(0.0) % duration) / duration;
        Some(((frac * n as f64).floor() as usize).min(n - 1))
    }

    /// Samples in `[index - behind, index + ahead]`, clipped, with the start offset
    pub fn window(&self, index: usize, behind: usize, ahead: usize) -> (usize, &[GroundSample]) {
        if self.samples.is_empty() {
            return (0, &[]);
        }
        let index = index.min(self.samples.len() - 1);
        let start = index.saturating_sub(behind);
        let end = index
            .saturating_add(ahead)
            .saturating_add(1)
            .min(self.samples.len());
        (start, &self.samples[start..end])
    }

    /// True when every value is finite
    pub fn is_sanitized(&self) -> bool {
        self.samples.iter().all(GroundSample::is_finite)
    }

    /// True when sample times never decrease
    pub fn is_time_monotonic(&self) -> bool {
        self.samples.windows(2).all(|w| w[1].t >= w[0].t)
    }
}

/// Full-duration history for either model
///
/// Simplified mode samples the closed form on the same grid the realistic
/// record uses, which is what non-animated consumers (server, charts) need.
pub fn generate<R: Rng + ?Sized>(
    params: &SimulationParameters,
    config: &SimulationConfig,
    rng: &mut R,
) -> TimeHistory {
    match params.mode {
        SimulationMode::Realistic => realistic::generate(params, config, rng),
        SimulationMode::Simplified => {
            let motion = SimplifiedMotion::new(params);
            let dt = config.sample_dt();
            TimeHistory::from_samples(
                (0..config.sample_count)
                    .map(|i| motion.sample(i as f64 * dt))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64) -> GroundSample {
        GroundSample {
            t,
            ..Default::default()
        }
    }

    #[test]
    fn bounded_history_drops_oldest() {
        let mut h = TimeHistory::bounded(3);
        for i in 0..5 {
            h.push(sample(i as f64));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.times(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn index_at_normalizes_time() {
        let h = TimeHistory::from_samples((0..100).map(|i| sample(i as f64 * 0.6)).collect());
        assert_eq!(h.index_at(0.0, 60.0), Some(0));
        assert_eq!(h.index_at(30.0, 60.0), Some(50));
        assert_eq!(h.index_at(59.99, 60.0), Some(99));
        assert_eq!(h.index_at(60.0, 60.0), Some(99));
        assert_eq!(TimeHistory::new().index_at(1.0, 60.0), None);
    }

    #[test]
    fn window_clips_at_edges() {
        let h = TimeHistory::from_samples((0..10).map(|i| sample(i as f64)).collect());
        let (start, w) = h.window(2, 30, 3);
        assert_eq!(start, 0);
        assert_eq!(w.len(), 6);
        let (start, w) = h.window(8, 2, 90);
        assert_eq!(start, 6);
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn huge_spans_do_not_overflow() {
        let h = TimeHistory::from_samples((0..10).map(|i| sample(i as f64)).collect());
        let (start, w) = h.window(4, usize::MAX, usize::MAX);
        assert_eq!(start, 0);
        assert_eq!(w.len(), 10);

        let mut rolling = TimeHistory::bounded(usize::MAX);
        rolling.push(sample(0.0));
        assert_eq!(rolling.len(), 1);
    }

    #[test]
    fn simplified_generate_covers_duration() {
        let params = SimulationParameters::default();
        let config = SimulationConfig::default();
        let mut rng = <rand_chacha::ChaCha8Rng as rand::SeedableRng>::seed_from_u64(1);
        let h = generate(&params, &config, &mut rng);
        assert_eq!(h.len(), config.sample_count);
        assert!(h.is_time_monotonic());
        assert!(h.is_sanitized());
    }
}
