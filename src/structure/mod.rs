//! Structural response: ground response → per-floor lateral displacement

pub mod modal;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::ground_motion::GroundSample;
use crate::math::{sanitize, TWO_PI};
use crate::params::{SimulationMode, SimulationParameters};

pub use modal::{active_mode_count, active_weights, fundamental_shape, mode_shape, MAX_MODES};

/// Ground-level horizontal shift per g of ground acceleration, in cm
pub const GROUND_SHIFT_PER_G: f64 = 10.0;

/// Response (cm) past which second-order amplification kicks in
const P_DELTA_ONSET: f64 = 30.0;
const P_DELTA_MIN_TIME: f64 = 5.0;

/// Floor-specific ripple amplitude relative to the ground response
const FLOOR_RIPPLE: f64 = 0.02;

/// State of one floor level (index 0 is the ground)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorState {
    pub index: usize,
    /// Height above the base in cm
    pub y: f64,
    /// Lateral displacement relative to the base in cm
    pub x_displacement: f64,
    /// Lateral position including the ground shift in cm
    pub absolute_x: f64,
}

/// Per-parameter-set response model: mode shapes and weights are built once
#[derive(Debug, Clone)]
pub struct ResponseModel {
    num_floors: usize,
    story_height: f64,
    pre_event_time: f64,
    mode: SimulationMode,
    shapes: DMatrix<f64>,
    weights: DVector<f64>,
    /// Fundamental circular frequency of the building (rad/s)
    omega1: f64,
    /// soil × density/stiffness × AI reduction
    gain: f64,
}

impl ResponseModel {
    pub fn new(params: &SimulationParameters, config: &SimulationConfig) -> Self {
        let props = params.structure();
        let weights = modal::active_weights(params);
        let shapes = modal::shape_matrix(
            config.num_floors,
            weights.len(),
            params.material,
            params.mode,
        );
        let period = props.fundamental_period(config.num_floors);
        let gain = params.soil_type.amplification()
            * (props.material.density_ratio() / props.stiffness_ratio().max(1e-6))
            * params.response_reduction(config.ai_response_reduction);

        Self {
            num_floors: config.num_floors.max(1),
            story_height: config.story_height_cm,
            pre_event_time: config.pre_event_time,
            mode: params.mode,
            shapes,
            weights,
            omega1: TWO_PI / period.max(1e-6),
            gain,
        }
    }

    pub fn num_modes(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    /// Superposed shape at every floor for time `t`
    ///
    /// Higher modes oscillate at `(2k-1)·ω₁` relative to the fundamental.
    pub fn combined_shape(&self, ground_response: f64, t: f64) -> DVector<f64> {
        let temporal = DVector::from_fn(self.weights.len(), |k, _| {
            if k == 0 {
                1.0
            } else {
                ((2 * k + 1) as f64 * self.omega1 * t).cos()
            }
        });
        let mut shape = &self.shapes * self.weights.component_mul(&temporal);

        let magnitude = ground_response.abs();
        if magnitude > P_DELTA_ONSET && t > P_DELTA_MIN_TIME {
            let amplification = 0.1 * (magnitude / 50.0).powf(0.8);
            for (i, value) in shape.iter_mut().enumerate() {
                let h = i as f64 / self.num_floors as f64;
                *value *= 1.0 + amplification * h;
            }
        }
        shape
    }

    /// Floor states for one ground sample at time `t`
    pub fn floors(&self, sample: &GroundSample, t: f64) -> Vec<FloorState> {
        let ground_response = sanitize(sample.displacement);
        let shape = self.combined_shape(ground_response, t);
        let ground_shift = sanitize(sample.pga) * GROUND_SHIFT_PER_G;
        let ripple_on = self.mode == SimulationMode::Realistic && t > self.pre_event_time;

        (0..=self.num_floors)
            .map(|i| {
                let h = i as f64 / self.num_floors as f64;
                let ripple = if ripple_on {
                    FLOOR_RIPPLE
                        * ground_response.abs()
                        * h
                        * (TWO_PI * (2.5 + 0.35 * i as f64) * t).sin()
                } else {
                    0.0
                };
                let x = sanitize((ground_response * shape[i] + ripple) * self.gain);
                FloorState {
                    index: i,
                    y: i as f64 * self.story_height,
                    x_displacement: x,
                    absolute_x: ground_shift + x,
                }
            })
            .collect()
    }
}

/// One-shot convenience over [`ResponseModel`]
pub fn floor_displacements(
    sample: &GroundSample,
    params: &SimulationParameters,
    config: &SimulationConfig,
    t: f64,
) -> Vec<FloorState> {
    ResponseModel::new(params, config).floors(sample, t)
}

/// Inter-story drift ratios `|Δx| / story_height`, one per story
pub fn story_drifts(floors: &[FloorState], story_height: f64) -> Vec<f64> {
    floors
        .windows(2)
        .map(|w| sanitize((w[1].x_displacement - w[0].x_displacement).abs() / story_height))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::profiles::{SoilType, StructuralMaterial};

    fn sample(displacement: f64) -> GroundSample {
        GroundSample {
            t: 8.0,
            pga: 0.2,
            velocity: 0.0,
            displacement,
        }
    }

    #[test]
    fn floor_count_includes_ground() {
        let config = SimulationConfig::default();
        let floors = floor_displacements(&sample(5.0), &SimulationParameters::new(), &config, 8.0);
        assert_eq!(floors.len(), config.num_floors + 1);
        assert_eq!(floors[0].x_displacement, 0.0);
        assert_relative_eq!(floors[10].y, 3500.0);
    }

    #[test]
    fn ground_shift_moves_absolute_position() {
        let floors = floor_displacements(
            &sample(5.0),
            &SimulationParameters::new(),
            &SimulationConfig::default(),
            8.0,
        );
        assert_relative_eq!(floors[0].absolute_x, 2.0);
        assert_relative_eq!(floors[3].absolute_x, 2.0 + floors[3].x_displacement);
    }

    #[test]
    fn simplified_roof_follows_gain() {
        // linear shape, one mode: roof = response × soil × density/stiffness
        let params = SimulationParameters::new().with_soil(SoilType::Rock);
        let floors = floor_displacements(&sample(4.0), &params, &SimulationConfig::default(), 8.0);
        assert_relative_eq!(floors[10].x_displacement, 4.0, epsilon = 1e-12);
        assert_relative_eq!(floors[5].x_displacement, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn single_mode_realistic_profile_is_monotonic() {
        // M4 on rock → one active mode
        let params = SimulationParameters::new()
            .with_magnitude(4.0)
            .with_soil(SoilType::Rock)
            .with_mode(SimulationMode::Realistic);
        let config = SimulationConfig::default();
        let model = ResponseModel::new(&params, &config);
        assert_eq!(model.num_modes(), 1);
        let shape = model.combined_shape(1.0, 1.0);
        assert!(shape.as_slice().windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn ai_support_scales_every_floor_by_reduction() {
        let config = SimulationConfig::default();
        let base = SimulationParameters::new()
            .with_magnitude(7.5)
            .with_material(StructuralMaterial::Steel)
            .with_mode(SimulationMode::Realistic);
        let t = 12.3;
        let without = floor_displacements(&sample(45.0), &base, &config, t);
        let with = floor_displacements(&sample(45.0), &base.with_ai_support(true), &config, t);
        for (a, b) in without.iter().zip(&with) {
            assert_relative_eq!(b.x_displacement, 0.6 * a.x_displacement, epsilon = 1e-9);
        }
    }

    #[test]
    fn p_delta_amplifies_upper_floors_late() {
        let params = SimulationParameters::new().with_soil(SoilType::Rock);
        let model = ResponseModel::new(&params, &SimulationConfig::default());
        let early = model.combined_shape(80.0, 2.0);
        let late = model.combined_shape(80.0, 8.0);
        assert_relative_eq!(early[0], late[0]);
        assert!(late[10] > early[10]);
    }

    #[test]
    fn drifts_per_story() {
        let floors: Vec<FloorState> = [0.0, 3.5, 10.5]
            .iter()
            .enumerate()
            .map(|(i, &x)| FloorState {
                index: i,
                x_displacement: x,
                ..Default::default()
            })
            .collect();
        let d = story_drifts(&floors, 350.0);
        assert_relative_eq!(d[0], 0.01);
        assert_relative_eq!(d[1], 0.02);
    }
}
