//! Newmark-β time integration for a linear SDOF oscillator
//!
//! Solves `ü + 2ζω u̇ + ω² u = p(t)` with unit mass using the incremental
//! formulation (Chopra, Table 5.4.2). With β = 1/4, γ = 1/2 (constant average
//! acceleration) the scheme is unconditionally stable.

use serde::{Deserialize, Serialize};

pub const AVERAGE_ACCELERATION_BETA: f64 = 0.25;
pub const AVERAGE_ACCELERATION_GAMMA: f64 = 0.5;

/// Displacement, velocity and acceleration at one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NewmarkState {
    pub u: f64,
    pub v: f64,
    pub a: f64,
}

/// Stepper for one oscillator
#[derive(Debug, Clone)]
pub struct Newmark {
    beta: f64,
    gamma: f64,
    dt: f64,
    k: f64,
    a1: f64,
    a2: f64,
    a3: f64,
    k_hat: f64,
    state: NewmarkState,
}

impl Newmark {
    /// Average-acceleration integrator for natural `period` (s), damping `zeta`, step `dt`
    pub fn new(period: f64, zeta: f64, dt: f64) -> Self {
        Self::with_parameters(
            period,
            zeta,
            dt,
            AVERAGE_ACCELERATION_BETA,
            AVERAGE_ACCELERATION_GAMMA,
        )
    }

    pub fn with_parameters(period: f64, zeta: f64, dt: f64, beta: f64, gamma: f64) -> Self {
        let omega = 2.0 * std::f64::consts::PI / period.max(1e-6);
        let k = omega * omega;
        let c = 2.0 * zeta * omega;
        let dt = dt.max(1e-9);

        let a1 = 1.0 / (beta * dt * dt) + gamma / (beta * dt) * c;
        let a2 = 1.0 / (beta * dt) + (gamma / beta - 1.0) * c;
        let a3 = (1.0 / (2.0 * beta) - 1.0) + dt * (gamma / (2.0 * beta) - 1.0) * c;

        Self {
            beta,
            gamma,
            dt,
            k,
            a1,
            a2,
            a3,
            k_hat: k + a1,
            state: NewmarkState::default(),
        }
    }

    /// Reset to rest under initial load `p0`
    pub fn start(&mut self, p0: f64) -> NewmarkState {
        self.state = NewmarkState { u: 0.0, v: 0.0, a: p0 };
        self.state
    }

    pub fn state(&self) -> NewmarkState {
        self.state
    }

    /// Advance one step to load `p_next`
    pub fn step(&mut self, p_next: f64) -> NewmarkState {
        let NewmarkState { u, v, a } = self.state;
        let (beta, gamma, dt) = (self.beta, self.gamma, self.dt);

        let p_hat = p_next + self.a1 * u + self.a2 * v + self.a3 * a;
        let u_next = p_hat / self.k_hat;
        let du = u_next - u;
        let v_next = gamma / (beta * dt) * du
            + (1.0 - gamma / beta) * v
            + dt * (1.0 - gamma / (2.0 * beta)) * a;
        let a_next = du / (beta * dt * dt) - v / (beta * dt) - (1.0 / (2.0 * beta) - 1.0) * a;

        self.state = NewmarkState {
            u: u_next,
            v: v_next,
            a: a_next,
        };
        self.state
    }

    /// Static displacement under load `p`
    pub fn static_displacement(&self, p: f64) -> f64 {
        p / self.k
    }
}

/// Integrate a whole load history starting from rest
pub fn integrate(load: &[f64], dt: f64, period: f64, zeta: f64) -> Vec<NewmarkState> {
    let Some(&p0) = load.first() else {
        return Vec::new();
    };
    let mut solver = Newmark::new(period, zeta, dt);
    let mut out = Vec::with_capacity(load.len());
    out.push(solver.start(p0));
    out.extend(load[1..].iter().map(|&p| solver.step(p)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn step_load_settles_at_static_displacement() {
        let load = vec![1.0; 4000];
        let history = integrate(&load, 0.01, 1.0, 0.05);
        let solver = Newmark::new(1.0, 0.05, 0.01);
        let last = history.last().unwrap();
        assert_relative_eq!(last.u, solver.static_displacement(1.0), epsilon = 1e-4);
        assert!(last.v.abs() < 1e-3);
    }

    #[test]
    fn undamped_free_vibration_keeps_amplitude() {
        // Initial impulse approximated by one loaded step, then free vibration
        let mut load = vec![0.0; 2000];
        load[0] = 10.0;
        let history = integrate(&load, 0.005, 0.5, 0.0);
        let early = history[100..300].iter().fold(0.0f64, |m, s| m.max(s.u.abs()));
        let late = history[1700..1900].iter().fold(0.0f64, |m, s| m.max(s.u.abs()));
        assert!(early > 0.0);
        assert_relative_eq!(early, late, max_relative = 0.02);
    }

    #[test]
    fn large_time_step_stays_bounded() {
        let load: Vec<f64> = (0..500).map(|i| (i as f64 * 0.7).sin()).collect();
        let history = integrate(&load, 1.0, 0.05, 0.02);
        assert!(history.iter().all(|s| s.u.is_finite() && s.u.abs() < 10.0));
    }

    #[test]
    fn empty_load_gives_empty_history() {
        assert!(integrate(&[], 0.01, 1.0, 0.05).is_empty());
    }
}
