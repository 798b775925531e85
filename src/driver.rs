//! Animation driver: playback clock, per-frame pipeline and cached records
//!
//! The clock transition ([`AnimationClock::advance`]) and the frame derivation
//! ([`derive_animation_frame`]) are pure. [`AnimationDriver`] owns the mutable
//! pieces: the realistic record, the simplified rolling window, the collapse
//! latch and the last frame.

use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::chart::ChartWindow;
use crate::collapse::{self, CollapseState, DamageAssessment};
use crate::config::SimulationConfig;
use crate::error::SeismicResult;
use crate::ground_motion::{self, GroundSample, SimplifiedMotion, TimeHistory};
use crate::math::splitmix64;
use crate::params::{clamp_speed, SimulationMode, SimulationParameters};
use crate::render::{Canvas, RecordingCanvas, RenderState, Renderer};
use crate::results::{CalculatedValues, RunSummary};
use crate::structure::{FloorState, ResponseModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// What one clock step did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockEvent {
    /// Not playing; time unchanged
    Idle,
    Advanced,
    /// Simplified playback passed the end and restarted at 0
    Wrapped,
    /// Realistic playback reached the end and stopped
    Finished,
}

/// Playback time and speed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationClock {
    pub current_time: f64,
    pub is_playing: bool,
    pub speed_multiplier: f64,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            is_playing: false,
            speed_multiplier: 1.0,
        }
    }
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        if self.is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn with_speed(self, speed: f64) -> Self {
        Self {
            speed_multiplier: clamp_speed(speed),
            ..self
        }
    }

    /// Step by `dt · speed`
    ///
    /// Simplified playback wraps to 0 past `duration`; realistic playback pins
    /// to `duration` and stops.
    pub fn advance(self, dt: f64, duration: f64, mode: SimulationMode) -> (Self, ClockEvent) {
        if !self.is_playing || !(dt.is_finite() && dt > 0.0) {
            return (self, ClockEvent::Idle);
        }
        let t = self.current_time + dt * self.speed_multiplier;
        if t < duration {
            return (
                Self {
                    current_time: t,
                    ..self
                },
                ClockEvent::Advanced,
            );
        }
        match mode {
            SimulationMode::Simplified => (
                Self {
                    current_time: 0.0,
                    ..self
                },
                ClockEvent::Wrapped,
            ),
            SimulationMode::Realistic => (
                Self {
                    current_time: duration,
                    is_playing: false,
                    ..self
                },
                ClockEvent::Finished,
            ),
        }
    }
}

/// Everything derived for one displayed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub t: f64,
    pub sample: GroundSample,
    pub floors: Vec<FloorState>,
    pub assessment: DamageAssessment,
}

/// Pure frame derivation from a ground sample
pub fn derive_animation_frame(
    params: &SimulationParameters,
    config: &SimulationConfig,
    sample: &GroundSample,
    t: f64,
    collapse: &CollapseState,
) -> AnimationFrame {
    let model = ResponseModel::new(params, config);
    derive_frame_with(&model, params, config, sample, t, collapse)
}

/// [`derive_animation_frame`] with a prebuilt response model
pub fn derive_frame_with(
    model: &ResponseModel,
    params: &SimulationParameters,
    config: &SimulationConfig,
    sample: &GroundSample,
    t: f64,
    collapse: &CollapseState,
) -> AnimationFrame {
    let floors = model.floors(sample, t);
    let mut assessment = collapse::evaluate(&floors, sample.pga, t, params, config);
    if collapse.has_collapsed {
        assessment.collapsed = true;
        assessment.health_percent = 0.0;
        assessment.trigger = collapse.trigger;
    }
    AnimationFrame {
        t,
        sample: *sample,
        floors,
        assessment,
    }
}

/// Stateful playback of one simulator instance
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    params: SimulationParameters,
    config: SimulationConfig,
    clock: AnimationClock,
    /// Full realistic record
    history: TimeHistory,
    /// Parameters `history` was generated with
    generated_for: Option<SimulationParameters>,
    generation: u64,
    /// Simplified rolling window
    rolling: TimeHistory,
    simplified: SimplifiedMotion,
    model: ResponseModel,
    collapse: CollapseState,
    frame: AnimationFrame,
    current_index: Option<usize>,
    renderer: Renderer,
}

impl AnimationDriver {
    pub fn new(params: SimulationParameters, config: SimulationConfig) -> Self {
        let params = params.clamped();
        let config = config.sanitized();
        let model = ResponseModel::new(&params, &config);
        let collapse = CollapseState::new();
        let frame = derive_frame_with(
            &model,
            &params,
            &config,
            &GroundSample::default(),
            0.0,
            &collapse,
        );
        Self {
            rolling: TimeHistory::bounded(config.simplified_window),
            simplified: SimplifiedMotion::new(&params),
            params,
            config,
            clock: AnimationClock::new(),
            history: TimeHistory::new(),
            generated_for: None,
            generation: 0,
            model,
            collapse,
            frame,
            current_index: None,
            renderer: Renderer::default(),
        }
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> AnimationClock {
        self.clock
    }

    pub fn state(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time
    }

    pub fn frame(&self) -> &AnimationFrame {
        &self.frame
    }

    pub fn collapse_state(&self) -> &CollapseState {
        &self.collapse
    }

    /// Realistic record (empty until generated)
    pub fn history(&self) -> &TimeHistory {
        &self.history
    }

    /// Simplified rolling window
    pub fn rolling_history(&self) -> &TimeHistory {
        &self.rolling
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.renderer = renderer;
    }

    /// True when the realistic record is absent or was built for other parameters
    pub fn is_stale(&self) -> bool {
        self.generated_for != Some(self.params)
    }

    /// Rebuild the realistic record for the current parameters
    pub fn regenerate(&mut self) {
        let seed = if self.config.reseed_each_run {
            splitmix64(self.config.seed ^ self.generation)
        } else {
            self.config.seed
        };
        self.generation += 1;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.history = ground_motion::generate(&self.params, &self.config, &mut rng);
        self.generated_for = Some(self.params);
        debug!(
            "regenerated {} record #{} ({} samples, seed {:#x})",
            self.params.mode,
            self.generation,
            self.history.len(),
            seed
        );
    }

    fn ensure_history(&mut self) {
        if self.params.mode == SimulationMode::Realistic && self.is_stale() {
            self.regenerate();
        }
    }

    /// Start or resume playback
    ///
    /// Realistic mode regenerates a stale record first; a finished run restarts.
    pub fn play(&mut self) {
        self.ensure_history();
        if self.params.mode == SimulationMode::Realistic
            && self.clock.current_time >= self.config.total_duration
        {
            self.restart();
        }
        self.clock.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.clock.is_playing = false;
    }

    /// Stop and rewind; clears collapse and the rolling window
    pub fn reset(&mut self) {
        self.clock.is_playing = false;
        self.restart();
    }

    fn restart(&mut self) {
        self.clock.current_time = 0.0;
        self.collapse.reset();
        self.rolling.clear();
        self.current_index = None;
        self.frame = derive_frame_with(
            &self.model,
            &self.params,
            &self.config,
            &GroundSample::default(),
            0.0,
            &self.collapse,
        );
    }

    /// Apply new parameters: invalidate, rewind and resume playing
    pub fn set_params(&mut self, params: SimulationParameters) {
        let params = params.clamped();
        if params == self.params {
            return;
        }
        debug!(
            "parameters changed (M{:.1}, {} km, {:?}, {}), invalidating",
            params.magnitude, params.distance_km, params.soil_type, params.mode
        );
        self.params = params;
        self.generated_for = None;
        self.history.clear();
        self.simplified = SimplifiedMotion::new(&params);
        self.model = ResponseModel::new(&params, &self.config);
        self.restart();
        self.play();
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.clock = self.clock.with_speed(speed);
    }

    /// Advance one frame and run the pipeline
    pub fn tick(&mut self, dt: f64) -> ClockEvent {
        if self.clock.is_playing {
            self.ensure_history();
        }
        let (clock, event) = self
            .clock
            .advance(dt, self.config.total_duration, self.params.mode);
        self.clock = clock;
        if event == ClockEvent::Idle {
            return event;
        }
        if event == ClockEvent::Wrapped {
            self.rolling.clear();
        }

        let t = self.clock.current_time;
        let sample = match self.params.mode {
            SimulationMode::Realistic => {
                self.current_index = self.history.index_at(t, self.config.total_duration);
                self.current_index
                    .and_then(|i| self.history.get(i).copied())
                    .unwrap_or(GroundSample {
                        t,
                        ..Default::default()
                    })
            }
            SimulationMode::Simplified => {
                let sample = self.simplified.sample(t);
                self.rolling.push(sample);
                self.current_index = self.rolling.len().checked_sub(1);
                sample
            }
        };

        self.frame = derive_frame_with(
            &self.model,
            &self.params,
            &self.config,
            &sample,
            t,
            &self.collapse,
        );
        if self.collapse.observe(&self.frame.assessment, t) {
            self.frame.assessment.collapsed = true;
        }
        event
    }

    /// Play one full duration headlessly from the start
    pub fn run_to_completion(&mut self, frame_dt: f64) -> RunSummary {
        let frame_dt = if frame_dt.is_finite() && frame_dt > 0.0 {
            frame_dt
        } else {
            self.config.frame_dt
        };
        self.reset();
        self.play();

        let mut summary = RunSummary::new(self.params);
        let max_frames =
            (self.config.total_duration / (frame_dt * self.clock.speed_multiplier)).ceil() as usize + 2;
        for _ in 0..max_frames {
            match self.tick(frame_dt) {
                ClockEvent::Idle | ClockEvent::Wrapped => break,
                ClockEvent::Advanced | ClockEvent::Finished => {
                    summary.record(self.frame.t, self.frame.sample.pga, &self.frame.assessment);
                }
            }
            if !self.clock.is_playing {
                break;
            }
        }
        self.pause();
        summary.finish(&self.collapse);
        summary
    }

    pub fn calculated_values(&self) -> CalculatedValues {
        CalculatedValues::new(&self.params, &self.config)
    }

    /// Chart arrays around the current position
    pub fn chart_window(&self) -> ChartWindow {
        match self.params.mode {
            SimulationMode::Realistic => match self.current_index {
                Some(index) => ChartWindow::around(
                    &self.history,
                    index,
                    self.config.chart_behind,
                    self.config.chart_ahead,
                ),
                None => ChartWindow::default(),
            },
            SimulationMode::Simplified => ChartWindow::rolling(&self.rolling),
        }
    }

    fn waveform(&self) -> (&[GroundSample], Option<usize>) {
        match (self.params.mode, self.current_index) {
            (SimulationMode::Realistic, Some(index)) => {
                let (start, slice) =
                    self.history
                        .window(index, self.config.chart_behind, self.config.chart_ahead);
                (slice, Some(index - start))
            }
            (SimulationMode::Realistic, None) => (&[] as &[GroundSample], None),
            (SimulationMode::Simplified, marker) => (self.rolling.samples(), marker),
        }
    }

    pub fn render_state(&self) -> RenderState<'_> {
        let (waveform, waveform_marker) = self.waveform();
        RenderState {
            params: &self.params,
            config: &self.config,
            t: self.frame.t,
            floors: &self.frame.floors,
            sample: self.frame.sample,
            assessment: &self.frame.assessment,
            collapse: &self.collapse,
            waveform,
            waveform_marker,
        }
    }

    /// Draw the current frame
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C) -> SeismicResult<()> {
        self.renderer.render(canvas, &self.render_state())
    }

    /// Current frame as an SVG data URL
    pub fn screenshot(&self) -> SeismicResult<String> {
        let mut canvas = RecordingCanvas::new(self.config.canvas_width, self.config.canvas_height);
        self.render(&mut canvas)?;
        Ok(canvas.to_data_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::profiles::SoilType;

    fn small_config() -> SimulationConfig {
        SimulationConfig::default().with_duration(20.0, 400)
    }

    fn realistic() -> SimulationParameters {
        SimulationParameters::new().with_mode(SimulationMode::Realistic)
    }

    #[test]
    fn clock_is_idle_when_stopped() {
        let clock = AnimationClock::new();
        let (next, event) = clock.advance(0.1, 60.0, SimulationMode::Simplified);
        assert_eq!(event, ClockEvent::Idle);
        assert_eq!(next, clock);
    }

    #[test]
    fn clock_scales_by_speed() {
        let clock = AnimationClock {
            is_playing: true,
            ..Default::default()
        }
        .with_speed(2.0);
        let (next, event) = clock.advance(0.1, 60.0, SimulationMode::Simplified);
        assert_eq!(event, ClockEvent::Advanced);
        assert_relative_eq!(next.current_time, 0.2);
        assert_eq!(AnimationClock::new().with_speed(50.0).speed_multiplier, 3.0);
    }

    #[test]
    fn simplified_wraps_and_realistic_stops() {
        let clock = AnimationClock {
            current_time: 59.95,
            is_playing: true,
            speed_multiplier: 1.0,
        };
        let (wrapped, event) = clock.advance(0.1, 60.0, SimulationMode::Simplified);
        assert_eq!(event, ClockEvent::Wrapped);
        assert_eq!(wrapped.current_time, 0.0);
        assert!(wrapped.is_playing);

        let (done, event) = clock.advance(0.1, 60.0, SimulationMode::Realistic);
        assert_eq!(event, ClockEvent::Finished);
        assert_eq!(done.current_time, 60.0);
        assert_eq!(done.state(), PlaybackState::Stopped);
    }

    #[test]
    fn play_generates_realistic_record() {
        let mut driver = AnimationDriver::new(realistic(), small_config());
        assert!(driver.is_stale());
        driver.play();
        assert!(!driver.is_stale());
        assert_eq!(driver.history().len(), 400);
        assert_eq!(driver.state(), PlaybackState::Playing);
    }

    #[test]
    fn tick_maps_time_to_sample_index() {
        let mut driver = AnimationDriver::new(realistic(), small_config());
        driver.play();
        for _ in 0..10 {
            driver.tick(0.5);
        }
        assert_relative_eq!(driver.current_time(), 5.0, epsilon = 1e-9);
        assert_eq!(driver.current_index(), Some(100));
        assert_eq!(driver.frame().floors.len(), 11);
        let w = driver.chart_window();
        assert_eq!(w.len(), 121);
        assert_eq!(w.current_index, Some(30));
    }

    #[test]
    fn pause_freezes_time() {
        let mut driver = AnimationDriver::new(SimulationParameters::new(), small_config());
        driver.play();
        driver.tick(0.1);
        driver.pause();
        let t = driver.current_time();
        assert_eq!(driver.tick(0.1), ClockEvent::Idle);
        assert_eq!(driver.current_time(), t);
    }

    #[test]
    fn simplified_window_is_bounded() {
        let config = small_config();
        let mut driver = AnimationDriver::new(SimulationParameters::new(), config.clone());
        driver.play();
        for _ in 0..(config.simplified_window + 50) {
            driver.tick(0.01);
        }
        assert_eq!(driver.rolling_history().len(), config.simplified_window);
        let w = driver.chart_window();
        assert_eq!(w.current_index, Some(config.simplified_window - 1));
    }

    #[test]
    fn parameter_change_rewinds_and_resumes() {
        let mut driver = AnimationDriver::new(SimulationParameters::new(), small_config());
        driver.play();
        for _ in 0..30 {
            driver.tick(0.1);
        }
        driver.pause();

        driver.set_params(realistic().with_soil(SoilType::Soft));
        assert_eq!(driver.current_time(), 0.0);
        assert_eq!(driver.state(), PlaybackState::Playing);
        assert!(!driver.is_stale());
        assert!(!driver.collapse_state().has_collapsed);
        assert!(driver.rolling_history().is_empty());
    }

    #[test]
    fn unchanged_parameters_are_a_no_op() {
        let mut driver = AnimationDriver::new(SimulationParameters::new(), small_config());
        driver.set_params(SimulationParameters::new());
        assert_eq!(driver.state(), PlaybackState::Stopped);
    }

    #[test]
    fn realistic_run_stops_at_duration() {
        let mut driver = AnimationDriver::new(realistic(), small_config());
        let summary = driver.run_to_completion(0.1);
        assert_eq!(driver.state(), PlaybackState::Stopped);
        assert_relative_eq!(summary.simulated_time, 20.0);
        assert_eq!(driver.current_index(), Some(399));
        assert!(summary.frames >= 199);
    }

    #[test]
    fn frame_derivation_is_pure() {
        let params = realistic();
        let config = SimulationConfig::default();
        let sample = GroundSample {
            t: 9.0,
            pga: 0.2,
            velocity: 3.0,
            displacement: 12.0,
        };
        let a = derive_animation_frame(&params, &config, &sample, 9.0, &CollapseState::new());
        let b = derive_animation_frame(&params, &config, &sample, 9.0, &CollapseState::new());
        assert_eq!(a, b);
    }

    #[test]
    fn latched_collapse_zeroes_health_in_later_frames() {
        let params = realistic();
        let config = SimulationConfig::default();
        let latched = CollapseState {
            has_collapsed: true,
            onset_time: Some(6.0),
            trigger: Some(collapse::CollapseTrigger::Drift),
        };
        let frame = derive_animation_frame(&params, &config, &GroundSample::default(), 8.0, &latched);
        assert!(frame.assessment.collapsed);
        assert_eq!(frame.assessment.health_percent, 0.0);
    }

    #[test]
    fn screenshot_is_svg_data_url() {
        let mut driver = AnimationDriver::new(SimulationParameters::new(), small_config());
        driver.play();
        driver.tick(0.2);
        let url = driver.screenshot().unwrap();
        assert!(url.starts_with("data:image/svg+xml"));
    }

    #[test]
    fn oversized_windows_from_config_stay_usable() {
        let config = SimulationConfig {
            chart_ahead: usize::MAX,
            simplified_window: usize::MAX,
            ..small_config()
        };
        let mut driver = AnimationDriver::new(realistic(), config);
        driver.play();
        driver.tick(0.5);
        let w = driver.chart_window();
        assert_eq!(w.current_index, Some(10));
        assert_eq!(w.len(), 400);
    }

    #[test]
    fn bare_renderer_skips_text() {
        let config = small_config().with_canvas(400.0, 300.0);
        let mut driver = AnimationDriver::new(SimulationParameters::new(), config);
        driver.set_renderer(Renderer::default().without_overlay().without_waveform());
        driver.play();
        driver.tick(0.2);
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        driver.render(&mut canvas).unwrap();
        assert!(canvas.texts().is_empty());
        assert!(!canvas.into_commands().is_empty());
    }

    #[test]
    fn reseeding_draws_new_noise() {
        let config = small_config().with_reseeding();
        let mut driver = AnimationDriver::new(realistic(), config);
        driver.regenerate();
        let first = driver.history().clone();
        driver.regenerate();
        assert_ne!(&first, driver.history());

        let mut fixed = AnimationDriver::new(realistic(), small_config());
        fixed.regenerate();
        let again = fixed.history().clone();
        fixed.regenerate();
        assert_eq!(&again, fixed.history());
    }
}
