//! Stochastic, envelope-modulated ground motion with Newmark-β building response
//!
//! The record has three phases:
//! 1. ambient noise until `pre_event_time`
//! 2. main shock: P-wave ramp, quadratic rise, fluctuating S-wave plateau, exponential coda
//! 3. aftershocks triggered with an Omori-law rate
//!
//! The carrier is a superposition of the dominant site frequency, four secondary
//! frequencies, an optional basin resonance and colored noise. The acceleration
//! record is rescaled so its peak equals the attenuation-relation PGA, then drives
//! an SDOF oscillator tuned to the building to produce velocity and displacement.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::math::{gaussian, newmark, sanitize, sanitize_slice, G_CM_S2, TWO_PI};
use crate::params::SimulationParameters;

use super::{GroundSample, TimeHistory};

/// Upper bound on the attenuation-relation PGA, in g
pub const MAX_PGA_G: f64 = 2.5;

/// Multipliers of the dominant frequency and their relative weights
const CARRIER_RATIOS: [f64; 5] = [1.0, 1.5, 0.7, 2.3, 0.4];
const CARRIER_WEIGHTS: [f64; 5] = [1.0, 0.5, 0.35, 0.25, 0.15];

/// Colored noise: fixed frequencies (Hz) and weights, random phases
const NOISE_FREQUENCIES: [f64; 5] = [0.7, 1.9, 3.7, 6.1, 8.9];
const NOISE_WEIGHTS: [f64; 5] = [0.12, 0.09, 0.07, 0.05, 0.03];
const WHITE_NOISE: f64 = 0.05;

/// Ambient level relative to the main-shock peak
const AMBIENT_LEVEL: f64 = 0.01;

const P_WAVE_LEVEL: f64 = 0.25;
const RISE_TIME: f64 = 1.5;
const PLATEAU_FLUCTUATION: f64 = 0.15;
const PLATEAU_FLUCTUATION_HZ: f64 = 0.25;

/// Båth's law: the largest aftershock is about 1.2 magnitude units smaller
const AFTERSHOCK_AMPLITUDE: f64 = 0.25;
const OMORI_P: f64 = 1.1;

/// Attenuation-relation PGA in g, soil-amplified and capped at [`MAX_PGA_G`]
pub fn expected_pga(params: &SimulationParameters) -> f64 {
    let m = params.magnitude;
    let r = params.distance_km.max(1.0);
    let near_source = 0.149 * (0.647 * m).exp();
    let ln_pga = -3.512 + 0.904 * m - 1.328 * (r * r + near_source * near_source).sqrt().ln();
    sanitize(ln_pga.exp() * params.soil_type.amplification()).min(MAX_PGA_G)
}

/// Dominant shaking frequency in Hz: softer sites, longer paths and larger
/// ruptures all shift energy to lower frequencies
pub fn dominant_frequency(params: &SimulationParameters) -> f64 {
    let base = params.soil_type.base_frequency();
    let distance_factor = (1.0 + params.distance_km / 100.0).powf(0.3);
    let magnitude_factor = 1.0 + 0.15 * (params.magnitude - 4.0);
    sanitize(base / distance_factor / magnitude_factor).clamp(0.2, 10.0)
}

/// Derived shape of one realistic record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealisticMotion {
    /// Target peak ground acceleration in g
    pub expected_pga: f64,
    pub dominant_frequency: f64,
    /// S–P arrival gap in seconds
    pub s_p_time: f64,
    /// Strong-motion plateau duration in seconds
    pub strong_duration: f64,
    pub coda_length: f64,
    /// Building fundamental period in seconds
    pub building_period: f64,
    pub building_damping: f64,
    /// Displacement gain from stiffness and magnitude
    pub displacement_scale: f64,
    pub pre_event_time: f64,
}

impl RealisticMotion {
    pub fn new(params: &SimulationParameters, config: &SimulationConfig) -> Self {
        let props = params.structure();
        let strong_duration = (2.0 + 2.5 * (params.magnitude - 4.0)).clamp(2.0, 25.0);
        let stiffness_factor = 1.0 / props.stiffness_ratio().max(1e-6).sqrt();
        let magnitude_factor = 1.0 + 0.25 * (params.magnitude - 5.0).max(0.0);
        Self {
            expected_pga: expected_pga(params),
            dominant_frequency: dominant_frequency(params),
            s_p_time: (params.distance_km / 8.0).clamp(0.5, 10.0),
            strong_duration,
            coda_length: 2.0 * strong_duration,
            building_period: props.fundamental_period(config.num_floors),
            building_damping: props.effective_damping(),
            displacement_scale: stiffness_factor * magnitude_factor,
            pre_event_time: config.pre_event_time,
        }
    }

    /// Time (s) at which the main-shock coda ends and the aftershock period starts
    pub fn main_shock_end(&self) -> f64 {
        self.pre_event_time + self.s_p_time + RISE_TIME + self.strong_duration + self.coda_length
    }

    /// Main-shock envelope in [0, 1] at absolute time `t`
    pub fn envelope(&self, t: f64) -> f64 {
        let tau = t - self.pre_event_time;
        if tau < 0.0 {
            return 0.0;
        }
        if tau < self.s_p_time {
            return P_WAVE_LEVEL * tau / self.s_p_time;
        }
        let tau = tau - self.s_p_time;
        if tau < RISE_TIME {
            let x = tau / RISE_TIME;
            return P_WAVE_LEVEL + (1.0 - P_WAVE_LEVEL) * x * x;
        }
        let tau = tau - RISE_TIME;
        if tau < self.strong_duration {
            return plateau(tau);
        }
        let tau = tau - self.strong_duration;
        // Decays to ~5 % of the plateau level by the end of the coda
        plateau(self.strong_duration) * (-3.0 * tau / self.coda_length).exp()
    }
}

fn plateau(tau: f64) -> f64 {
    1.0 - 0.5 * PLATEAU_FLUCTUATION * (1.0 - (TWO_PI * PLATEAU_FLUCTUATION_HZ * tau).cos())
}

#[derive(Debug, Clone, Copy)]
struct Aftershock {
    start: f64,
    amplitude: f64,
    decay: f64,
}

impl Aftershock {
    fn envelope(&self, t: f64) -> f64 {
        let age = t - self.start;
        if age < 0.0 {
            return 0.0;
        }
        self.amplitude * (age / 0.2).min(1.0) * (-age / self.decay).exp()
    }

    fn expired(&self, t: f64) -> bool {
        t - self.start > 5.0 * self.decay
    }
}

/// Random phases drawn once per record
struct Phases {
    carrier: [f64; 5],
    basin: f64,
    noise: [f64; 5],
}

impl Phases {
    fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut phase = || rng.gen::<f64>() * TWO_PI;
        Self {
            carrier: [phase(), phase(), phase(), phase(), phase()],
            basin: phase(),
            noise: [phase(), phase(), phase(), phase(), phase()],
        }
    }
}

/// Generate a full realistic record
///
/// Deterministic for a given `rng` state: two calls with identically seeded
/// generators return identical histories.
pub fn generate<R: Rng + ?Sized>(
    params: &SimulationParameters,
    config: &SimulationConfig,
    rng: &mut R,
) -> TimeHistory {
    let motion = RealisticMotion::new(params, config);
    let n = config.sample_count.max(2);
    let dt = config.sample_dt();
    let phases = Phases::draw(rng);
    let basin = params.soil_type.basin_resonance();

    let total_weight = CARRIER_WEIGHTS.iter().sum::<f64>()
        + NOISE_WEIGHTS.iter().sum::<f64>()
        + basin.map_or(0.0, |(_, w)| w)
        + WHITE_NOISE;

    let aftershock_rate = 0.5 * (params.magnitude - 4.0).max(0.0);
    let main_end = motion.main_shock_end();
    let mut aftershocks: Vec<Aftershock> = Vec::new();
    let mut aftershock_count = 0usize;

    let mut times = Vec::with_capacity(n);
    let mut accel = Vec::with_capacity(n);

    for i in 0..n {
        let t = i as f64 * dt;

        let mut carrier = 0.0;
        for k in 0..CARRIER_RATIOS.len() {
            let f = motion.dominant_frequency * CARRIER_RATIOS[k];
            carrier += CARRIER_WEIGHTS[k] * (TWO_PI * f * t + phases.carrier[k]).sin();
        }
        if let Some((f, w)) = basin {
            carrier += w * (TWO_PI * f * t + phases.basin).sin();
        }
        for k in 0..NOISE_FREQUENCIES.len() {
            carrier += NOISE_WEIGHTS[k] * (TWO_PI * NOISE_FREQUENCIES[k] * t + phases.noise[k]).sin();
        }
        carrier += WHITE_NOISE * gaussian(rng);
        carrier /= total_weight;

        let mut envelope = motion.envelope(t);
        if t >= main_end {
            let since = t - main_end;
            let probability = dt * aftershock_rate / (1.0 + since).powf(OMORI_P);
            if rng.gen::<f64>() < probability {
                aftershocks.push(Aftershock {
                    start: t,
                    amplitude: AFTERSHOCK_AMPLITUDE * rng.gen_range(0.3..1.0),
                    decay: rng.gen_range(1.0..3.0),
                });
                aftershock_count += 1;
            }
            aftershocks.retain(|a| !a.expired(t));
            envelope += aftershocks.iter().map(|a| a.envelope(t)).sum::<f64>();
        }

        let ambient = AMBIENT_LEVEL * gaussian(rng);
        times.push(t);
        accel.push(envelope * carrier + ambient);
    }

    let replaced = sanitize_slice(&mut accel);
    if replaced > 0 {
        warn!("ground motion: {} non-finite acceleration samples zeroed", replaced);
    }

    // Rescale so the record's peak matches the attenuation PGA
    let peak = accel.iter().fold(0.0f64, |m, a| m.max(a.abs()));
    let scale = if peak > 1e-12 {
        motion.expected_pga / peak
    } else {
        0.0
    };
    for a in accel.iter_mut() {
        *a *= scale;
    }

    // Relative building response: ü + 2ζωu̇ + ω²u = -a_g
    let load: Vec<f64> = accel.iter().map(|a| -a * G_CM_S2).collect();
    let response = newmark::integrate(&load, dt, motion.building_period, motion.building_damping);

    let samples: Vec<GroundSample> = times
        .iter()
        .zip(accel.iter())
        .zip(response.iter())
        .map(|((&t, &a), state)| GroundSample {
            t,
            pga: sanitize(a),
            velocity: sanitize(state.v),
            displacement: sanitize(state.u * motion.displacement_scale),
        })
        .collect();

    debug!(
        "realistic record: M{:.1} R={:.0}km pga={:.3}g f={:.2}Hz T={:.2}s zeta={:.3} aftershocks={} samples={}",
        params.magnitude,
        params.distance_km,
        motion.expected_pga,
        motion.dominant_frequency,
        motion.building_period,
        motion.building_damping,
        aftershock_count,
        samples.len()
    );

    TimeHistory::from_samples(samples)
}
