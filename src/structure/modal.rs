//! Analytical mode shapes and modal participation weights

use std::f64::consts::FRAC_PI_2;

use nalgebra::{DMatrix, DVector};

use crate::params::{SimulationMode, SimulationParameters};
use crate::profiles::{SoilType, StructuralMaterial};

pub const MAX_MODES: usize = 5;

/// Fundamental cantilever shape `sin(πh/2)`, h = 0 at base, 1 at roof
pub fn fundamental_shape(h: f64) -> f64 {
    (FRAC_PI_2 * h).sin()
}

/// Unmodified shape of mode `k` (1-based): `sin((2k-1)πh/2)`
pub fn base_shape(k: usize, h: f64) -> f64 {
    ((2 * k - 1) as f64 * FRAC_PI_2 * h).sin()
}

/// Mode `k` shape adjusted for how the structural system deforms
pub fn mode_shape(k: usize, h: f64, material: StructuralMaterial) -> f64 {
    let phi = base_shape(k, h);
    match (material, k) {
        // Flexible upper stories
        (StructuralMaterial::Steel, 1) => phi * (1.0 + 0.1 * h),
        // Shear deformation adds a linear component
        (StructuralMaterial::Concrete, 1) => 0.85 * phi + 0.15 * h,
        (StructuralMaterial::Wood, 1) => 0.8 * phi + 0.2 * h,
        (StructuralMaterial::Wood, k) => phi * 0.7f64.powi(k as i32 - 1),
        (StructuralMaterial::Hybrid, 1) => {
            0.5 * (phi * (1.0 + 0.1 * h)) + 0.5 * (0.85 * phi + 0.15 * h)
        }
        _ => phi,
    }
}

fn normalize(weights: &mut [f64]) {
    let sum: f64 = weights.iter().sum();
    if sum > 1e-12 {
        weights.iter_mut().for_each(|w| *w /= sum);
    } else {
        weights.iter_mut().for_each(|w| *w = 0.0);
        weights[0] = 1.0;
    }
}

/// Magnitude-bracket weights before site and material adjustments
fn bracket_weights(magnitude: f64) -> [f64; MAX_MODES] {
    if magnitude > 7.5 {
        [0.80, 0.12, 0.05, 0.02, 0.01]
    } else if magnitude > 7.0 {
        [0.70, 0.18, 0.07, 0.03, 0.02]
    } else if magnitude > 6.0 {
        [0.60, 0.22, 0.10, 0.05, 0.03]
    } else if magnitude > 5.0 {
        [0.50, 0.25, 0.13, 0.07, 0.05]
    } else {
        [0.40, 0.28, 0.16, 0.10, 0.06]
    }
}

/// Participation weights for all five modes, renormalized after each adjustment
pub fn participation_weights(params: &SimulationParameters) -> [f64; MAX_MODES] {
    let mut w = bracket_weights(params.magnitude);

    match params.soil_type {
        SoilType::Soft => w[0] *= 1.2,
        SoilType::VerySoft => w[0] *= 1.3,
        SoilType::Rock => {
            w[0] *= 0.85;
            w[1] *= 1.15;
            w[2] *= 1.10;
        }
        SoilType::Stiff => {}
    }
    normalize(&mut w);

    match params.material {
        StructuralMaterial::Steel => {
            w[1] *= 1.15;
            w[2] *= 1.10;
        }
        StructuralMaterial::Wood => {
            for weight in &mut w[1..4] {
                *weight *= 0.8;
            }
        }
        StructuralMaterial::Hybrid => w[0] *= 1.1,
        StructuralMaterial::Concrete => {}
    }
    normalize(&mut w);
    w
}

/// Number of modes superposed for this parameter set
pub fn active_mode_count(params: &SimulationParameters) -> usize {
    match params.mode {
        SimulationMode::Simplified => 1,
        SimulationMode::Realistic => {
            let base = (1.0 + ((params.magnitude - 4.0) / 0.8).floor()).clamp(1.0, MAX_MODES as f64)
                as usize;
            let soft_bonus = usize::from(params.soil_type.is_soft());
            (base + soft_bonus).min(MAX_MODES)
        }
    }
}

/// Weights of the active modes, renormalized to sum to 1
pub fn active_weights(params: &SimulationParameters) -> DVector<f64> {
    let count = active_mode_count(params);
    let all = participation_weights(params);
    let mut active = all[..count].to_vec();
    normalize(&mut active);
    DVector::from_vec(active)
}

/// `(num_floors + 1) × modes` matrix of shape values at each floor level
///
/// Simplified mode uses a single linear shape.
pub fn shape_matrix(
    num_floors: usize,
    modes: usize,
    material: StructuralMaterial,
    mode: SimulationMode,
) -> DMatrix<f64> {
    let n = num_floors.max(1);
    DMatrix::from_fn(n + 1, modes.max(1), |floor, col| {
        let h = floor as f64 / n as f64;
        match mode {
            SimulationMode::Simplified => h,
            SimulationMode::Realistic => mode_shape(col + 1, h, material),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::profiles::SoilType;

    #[test]
    fn fundamental_shape_grows_toward_roof() {
        let n = 20;
        for f in 0..n {
            let lo = fundamental_shape(f as f64 / n as f64);
            let hi = fundamental_shape((f + 1) as f64 / n as f64);
            assert!(hi.abs() >= lo.abs());
        }
        assert_relative_eq!(fundamental_shape(1.0), 1.0);
        assert_eq!(fundamental_shape(0.0), 0.0);
    }

    #[test]
    fn material_fundamentals_stay_monotonic() {
        for material in StructuralMaterial::ALL {
            let mut prev = mode_shape(1, 0.0, material);
            for i in 1..=50 {
                let cur = mode_shape(1, i as f64 / 50.0, material);
                assert!(cur >= prev, "{material:?} at {i}");
                prev = cur;
            }
        }
    }

    #[test]
    fn higher_modes_have_nodes() {
        // Mode 2 = sin(3πh/2) crosses zero at h = 2/3
        assert!(base_shape(2, 2.0 / 3.0).abs() < 1e-12);
        assert!(base_shape(2, 1.0) < 0.0);
    }

    #[test]
    fn weights_sum_to_one_for_every_combination() {
        let magnitudes = [4.0, 5.0, 5.5, 6.2, 7.2, 7.8, 9.5];
        for &m in &magnitudes {
            for soil in SoilType::ALL {
                for material in StructuralMaterial::ALL {
                    for mode in [SimulationMode::Simplified, SimulationMode::Realistic] {
                        let p = SimulationParameters::new()
                            .with_magnitude(m)
                            .with_soil(soil)
                            .with_material(material)
                            .with_mode(mode);
                        let all: f64 = participation_weights(&p).iter().sum();
                        assert_relative_eq!(all, 1.0, epsilon = 1e-6);
                        assert_relative_eq!(active_weights(&p).sum(), 1.0, epsilon = 1e-6);
                    }
                }
            }
        }
    }

    #[test]
    fn large_events_favor_fundamental() {
        let big = participation_weights(&SimulationParameters::new().with_magnitude(8.0));
        let small = participation_weights(&SimulationParameters::new().with_magnitude(4.5));
        assert!(big[0] > small[0]);
    }

    #[test]
    fn active_modes_follow_magnitude_and_soil() {
        let p = SimulationParameters::new().with_mode(SimulationMode::Realistic);
        assert_eq!(active_mode_count(&p.with_magnitude(4.0).with_soil(SoilType::Rock)), 1);
        assert_eq!(active_mode_count(&p.with_magnitude(6.5).with_soil(SoilType::Rock)), 4);
        assert_eq!(active_mode_count(&p.with_magnitude(6.5).with_soil(SoilType::Soft)), 5);
        assert_eq!(active_mode_count(&p.with_magnitude(9.5).with_soil(SoilType::VerySoft)), 5);
        assert_eq!(active_mode_count(&p.with_mode(SimulationMode::Simplified)), 1);
    }

    #[test]
    fn simplified_shape_is_linear() {
        let m = shape_matrix(4, 1, StructuralMaterial::Steel, SimulationMode::Simplified);
        assert_eq!(m.nrows(), 5);
        assert_relative_eq!(m[(2, 0)], 0.5);
        assert_relative_eq!(m[(4, 0)], 1.0);
    }
}
