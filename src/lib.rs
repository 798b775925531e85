//! Seismic Response - an interactive building-response simulator
//!
//! Turns earthquake and building inputs into a ground-motion record, per-floor
//! lateral displacements and a collapse decision, and draws the result onto a
//! 2D surface. Supports:
//! - Simplified closed-form shaking, evaluated per frame
//! - Realistic stochastic records (envelope, aftershocks, Newmark-β response)
//! - Modal superposition of up to five analytical mode shapes
//! - Drift, PGA, soft-story, energy, P-Delta and displacement collapse triggers
//! - Material-specific collapse choreography
//!
//! ## Example
//! ```rust
//! use seismic_response::prelude::*;
//!
//! let params = SimulationParameters::new()
//!     .with_magnitude(4.0)
//!     .with_distance(300.0)
//!     .with_soil(SoilType::Rock)
//!     .with_mode(SimulationMode::Realistic);
//!
//! let mut driver = AnimationDriver::new(params, SimulationConfig::default());
//! let summary = driver.run_to_completion(1.0 / 30.0);
//!
//! assert!(!summary.collapsed);
//! assert!(summary.min_health_percent > 90.0);
//!
//! // Chart arrays and a screenshot of the last frame
//! let chart = driver.chart_window();
//! assert_eq!(chart.time.len(), chart.pga.len());
//! let url = driver.screenshot().unwrap();
//! assert!(url.starts_with("data:image/svg+xml"));
//! ```

pub mod chart;
pub mod collapse;
pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod ground_motion;
pub mod math;
pub mod params;
pub mod profiles;
pub mod render;
pub mod results;
pub mod structure;

// Re-export common types
pub mod prelude {
    pub use crate::chart::{ChartKind, ChartSeries, ChartWindow};
    pub use crate::collapse::{CollapseState, CollapseTrigger, DamageAssessment};
    pub use crate::color::Color;
    pub use crate::config::SimulationConfig;
    pub use crate::driver::{
        derive_animation_frame, AnimationClock, AnimationDriver, AnimationFrame, ClockEvent,
        PlaybackState,
    };
    pub use crate::error::{SeismicError, SeismicResult};
    pub use crate::ground_motion::{GroundSample, RealisticMotion, SimplifiedMotion, TimeHistory};
    pub use crate::params::{SimulationMode, SimulationParameters};
    pub use crate::profiles::{
        BuildingCode, MaterialProfile, Reinforcement, SoilType, StructuralMaterial,
        StructuralProperties,
    };
    pub use crate::render::{Canvas, DriftSeverity, RecordingCanvas, Renderer};
    pub use crate::results::{CalculatedValues, RunSummary};
    pub use crate::structure::{FloorState, ResponseModel};
}

#[cfg(feature = "wasm")]
pub mod wasm;
