//! Closed-form single-degree-of-freedom ground motion

use serde::{Deserialize, Serialize};

use crate::math::{sanitize, G_CM_S2, TWO_PI};
use crate::params::SimulationParameters;

use super::GroundSample;

/// Responses smaller than this are replaced so the animation never freezes
const VISIBILITY_FLOOR: f64 = 0.5;

/// Parameters of the sinusoidal model, derived once per parameter set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedMotion {
    /// Peak ground acceleration in g, before soil amplification
    pub pga: f64,
    /// Shaking frequency in Hz
    pub frequency: f64,
    /// Soil-amplified peak acceleration in g
    pub max_amplitude: f64,
    pub damping_ratio: f64,
}

impl SimplifiedMotion {
    pub fn new(params: &SimulationParameters) -> Self {
        let distance = params.distance_km.max(1e-3);
        let pga = sanitize(10f64.powf(params.magnitude - 4.5) / distance.sqrt() * 0.1);
        let frequency = (2.0 - (params.magnitude - 4.0) * 0.2).max(0.05);
        Self {
            pga,
            frequency,
            max_amplitude: pga * params.soil_type.amplification(),
            damping_ratio: params.damping_ratio,
        }
    }

    fn omega(&self) -> f64 {
        TWO_PI * self.frequency
    }

    /// Ground acceleration in g
    pub fn acceleration_g(&self, t: f64) -> f64 {
        sanitize((self.omega() * t).sin() * self.max_amplitude)
    }

    /// Ground motion in display units
    pub fn ground_motion(&self, t: f64) -> f64 {
        self.acceleration_g(t) * 30.0
    }

    /// Ground velocity in cm/s, integrated from rest
    pub fn ground_velocity(&self, t: f64) -> f64 {
        let omega = self.omega();
        sanitize(self.max_amplitude * G_CM_S2 / omega * (1.0 - (omega * t).cos()))
    }

    /// Damped building response in display units (cm)
    pub fn building_response(&self, t: f64) -> f64 {
        let decay = (-self.damping_ratio * self.omega() * t).exp();
        let response = sanitize(-self.ground_motion(t) * decay * 1.5);
        if response.abs() < VISIBILITY_FLOOR {
            VISIBILITY_FLOOR * (0.5 * t).sin()
        } else {
            response
        }
    }

    pub fn sample(&self, t: f64) -> GroundSample {
        GroundSample {
            t,
            pga: self.acceleration_g(t),
            velocity: self.ground_velocity(t),
            displacement: self.building_response(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::profiles::SoilType;

    fn params() -> SimulationParameters {
        SimulationParameters::new()
            .with_magnitude(6.5)
            .with_distance(20.0)
            .with_soil(SoilType::Stiff)
            .with_damping(0.05)
    }

    #[test]
    fn pga_follows_closed_form() {
        let m = SimplifiedMotion::new(&params());
        let expected = 10f64.powf(6.5 - 4.5) / 20f64.sqrt() * 0.1;
        assert_relative_eq!(m.pga, expected, epsilon = 1e-12);
        assert_eq!(format!("{:.2}", m.pga), "2.24");
        assert_relative_eq!(m.frequency, 1.5, epsilon = 1e-12);
        assert_relative_eq!(m.max_amplitude, expected * 1.3, epsilon = 1e-12);
    }

    #[test]
    fn response_opposes_ground_and_decays() {
        let m = SimplifiedMotion::new(&params());
        // quarter period: sin = 1
        let t = 0.25 / m.frequency;
        assert!(m.building_response(t) < 0.0);
        let late = 10.0 + 0.25 / m.frequency;
        assert!(m.building_response(late).abs() < m.building_response(t).abs());
    }

    #[test]
    fn visibility_floor_keeps_motion() {
        let weak = SimulationParameters::new().with_magnitude(4.0).with_distance(300.0);
        let m = SimplifiedMotion::new(&weak);
        let t = 3.0;
        assert_relative_eq!(m.building_response(t), 0.5 * (0.5 * t).sin(), epsilon = 1e-12);
    }

    #[test]
    fn velocity_starts_at_rest() {
        let m = SimplifiedMotion::new(&params());
        assert_eq!(m.ground_velocity(0.0), 0.0);
        assert!(m.sample(0.3).is_finite());
    }
}
