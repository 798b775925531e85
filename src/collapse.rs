//! Collapse and damage evaluation
//!
//! [`evaluate`] inspects one frame's floor field and returns a [`DamageAssessment`].
//! [`CollapseState`] latches the first collapse and stays collapsed until an
//! explicit reset.

use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::math::{safe_div, sanitize};
use crate::params::SimulationParameters;
use crate::profiles::StructuralMaterial;
use crate::structure::{story_drifts, FloorState};

/// Adjacent-story drift ratio bounds outside which a story counts as soft
const SOFT_STORY_HIGH: f64 = 1.5;
const SOFT_STORY_LOW: f64 = 0.667;
const MIN_DRIFT_FOR_RATIO: f64 = 1e-6;

/// Collapse mechanism that fired first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseTrigger {
    Drift,
    GroundAcceleration,
    SoftStory,
    Energy,
    PDelta,
    Displacement,
}

impl fmt::Display for CollapseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollapseTrigger::Drift => "excessive inter-story drift",
            CollapseTrigger::GroundAcceleration => "ground acceleration beyond capacity",
            CollapseTrigger::SoftStory => "soft-story mechanism",
            CollapseTrigger::Energy => "cumulative energy demand",
            CollapseTrigger::PDelta => "P-Delta instability",
            CollapseTrigger::Displacement => "roof displacement limit",
        };
        f.write_str(s)
    }
}

/// Everything the evaluator derived for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageAssessment {
    /// A collapse condition fired this frame
    pub collapsed: bool,
    pub trigger: Option<CollapseTrigger>,
    /// 0–100, 100 = undamaged
    pub health_percent: f64,
    /// Governing drift ratio after P-Delta and material amplification
    pub max_drift_ratio: f64,
    pub soft_story: bool,
    pub p_delta_factor: f64,
    pub energy_factor: f64,
    /// Largest |floor displacement| in cm
    pub roof_displacement_cm: f64,
    /// Collapse drift threshold after code and reinforcement modifiers
    pub collapse_threshold: f64,
    pub damage_threshold: f64,
}

impl DamageAssessment {
    /// Healthy structure at rest
    pub fn at_rest(params: &SimulationParameters) -> Self {
        let props = params.structure();
        Self {
            health_percent: 100.0,
            collapse_threshold: props.collapse_threshold(),
            damage_threshold: props.damage_threshold(),
            ..Default::default()
        }
    }
}

/// True when any adjacent pair of story drifts differs by more than 1.5×
pub fn has_soft_story(drifts: &[f64]) -> bool {
    drifts.windows(2).any(|w| {
        if w[0] <= MIN_DRIFT_FOR_RATIO || w[1] <= MIN_DRIFT_FOR_RATIO {
            return false;
        }
        let ratio = w[0] / w[1];
        ratio > SOFT_STORY_HIGH || ratio < SOFT_STORY_LOW
    })
}

/// Second-order sensitivity from overall drift, weight, height and stiffness
pub fn p_delta_factor(
    overall_drift: f64,
    density_ratio: f64,
    height_m: f64,
    elastic_modulus_gpa: f64,
) -> f64 {
    let flexibility = safe_div(30.0, elastic_modulus_gpa).sqrt();
    sanitize(overall_drift * density_ratio * (height_m / 10.0) * flexibility * 2.0)
}

/// Evaluate one frame
///
/// `current_pga` is the instantaneous ground acceleration in g (sign ignored),
/// `t` the elapsed simulation time used by the start-up guards.
pub fn evaluate(
    floors: &[FloorState],
    current_pga: f64,
    t: f64,
    params: &SimulationParameters,
    config: &SimulationConfig,
) -> DamageAssessment {
    let props = params.structure();
    let material = props.material;
    let threshold = props.collapse_threshold();
    let pga = sanitize(current_pga).abs();

    let drifts = story_drifts(floors, config.story_height_cm);
    let mut max_drift = drifts.iter().cloned().fold(0.0, f64::max);
    let soft_story = has_soft_story(&drifts);

    let roof = floors.last().map_or(0.0, |f| f.x_displacement);
    let displacement_cm = floors
        .iter()
        .fold(0.0f64, |m, f| m.max(f.x_displacement.abs()));
    let overall_drift = safe_div(roof.abs(), config.building_height_cm());

    let p_delta = p_delta_factor(
        overall_drift,
        material.density_ratio(),
        config.building_height_cm() / 100.0,
        material.elastic_modulus,
    );
    if p_delta > 0.05 {
        max_drift *= 1.0 + p_delta;
    }

    let energy = max_drift * max_drift * (pga * 5.0).max(1.0);

    match params.material {
        StructuralMaterial::Concrete if energy > 0.5 => max_drift *= 1.2,
        StructuralMaterial::Steel if max_drift > 0.03 => max_drift *= 1.1,
        StructuralMaterial::Wood if max_drift > 0.01 => max_drift *= 1.3,
        _ => {}
    }

    let trigger = if max_drift > 1.2 * threshold && t > 5.0 {
        Some(CollapseTrigger::Drift)
    } else if pga > props.pga_limit() && pga > 0.8 && t > 5.0 {
        Some(CollapseTrigger::GroundAcceleration)
    } else if soft_story && max_drift > 0.8 * threshold && t > 10.0 {
        Some(CollapseTrigger::SoftStory)
    } else if energy > 1.2 && max_drift > 0.6 * threshold && t > 15.0 {
        Some(CollapseTrigger::Energy)
    } else if p_delta > 0.35 && t > 15.0 {
        Some(CollapseTrigger::PDelta)
    } else if displacement_cm > 0.9 * props.displacement_limit()
        && displacement_cm > 30.0
        && t > 5.0
    {
        Some(CollapseTrigger::Displacement)
    } else {
        None
    };

    let health_percent = if trigger.is_some() {
        0.0
    } else {
        (100.0 * (1.0 - safe_div(max_drift, threshold))).clamp(0.0, 100.0)
    };

    DamageAssessment {
        collapsed: trigger.is_some(),
        trigger,
        health_percent,
        max_drift_ratio: max_drift,
        soft_story,
        p_delta_factor: p_delta,
        energy_factor: energy,
        roof_displacement_cm: displacement_cm,
        collapse_threshold: threshold,
        damage_threshold: props.damage_threshold(),
    }
}

/// One-way collapse latch
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CollapseState {
    pub has_collapsed: bool,
    /// Simulation time at which collapse first fired
    pub onset_time: Option<f64>,
    pub trigger: Option<CollapseTrigger>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch a collapse from `assessment`; returns true on the transition frame
    pub fn observe(&mut self, assessment: &DamageAssessment, t: f64) -> bool {
        if self.has_collapsed || !assessment.collapsed {
            return false;
        }
        self.has_collapsed = true;
        self.onset_time = Some(t);
        self.trigger = assessment.trigger;
        info!(
            "collapse at t={:.2}s: {} (drift {:.4}, threshold {:.4})",
            t,
            assessment.trigger.map_or_else(String::new, |c| c.to_string()),
            assessment.max_drift_ratio,
            assessment.collapse_threshold
        );
        true
    }

    /// Seconds since collapse onset (0 if standing)
    pub fn elapsed(&self, t: f64) -> f64 {
        self.onset_time.map_or(0.0, |onset| (t - onset).max(0.0))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
