//! Numerical helpers shared by the generators, response model and renderer

pub mod newmark;

use rand::Rng;

pub use newmark::{integrate, Newmark, NewmarkState};

pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;

/// Standard gravity in m/s²
pub const GRAVITY: f64 = 9.80665;

/// One g expressed in cm/s²
pub const G_CM_S2: f64 = GRAVITY * 100.0;

/// Replace NaN / ±∞ with 0
#[inline]
pub fn sanitize(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Sanitize in place, returning how many values were replaced
pub fn sanitize_slice(values: &mut [f64]) -> usize {
    let mut replaced = 0;
    for v in values.iter_mut() {
        if !v.is_finite() {
            *v = 0.0;
            replaced += 1;
        }
    }
    replaced
}

/// Division that yields 0 instead of ∞/NaN for near-zero denominators
#[inline]
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den.abs() < 1e-12 {
        0.0
    } else {
        sanitize(num / den)
    }
}

/// Standard normal deviate (Box–Muller)
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() is in [0, 1); shift away from 0 for the log
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    sanitize((-2.0 * u1.ln()).sqrt() * (TWO_PI * u2).cos())
}

/// splitmix64 finalizer, used for deterministic per-particle jitter
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Deterministic value in [0, 1) from a seed
#[inline]
pub fn hash_unit(seed: u64) -> f64 {
    (splitmix64(seed) >> 11) as f64 / (1u64 << 53) as f64
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite smoothstep on [0, 1]
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
