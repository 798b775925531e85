//! WASM bindings for the seismic simulator
//!
//! The browser owns the animation loop (`requestAnimationFrame`) and calls
//! `tick` then `render` each frame. Parameters, charts and summaries cross the
//! boundary as JSON strings.

use std::f64::consts::TAU;
use std::fmt::Display;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::chart::ChartKind;
use crate::color::Color;
use crate::error::{SeismicError, SeismicResult};
use crate::prelude::*;
use crate::render::Point;

// Use wee_alloc for smaller WASM binary
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"error":"Serialization failed: {}"}}"#, e)
    })
}

fn render_error(e: JsValue) -> SeismicError {
    SeismicError::Render(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

// ========================
// Canvas adapter
// ========================

/// [`Canvas`] over a browser 2D context
pub struct WebCanvas {
    ctx: CanvasRenderingContext2d,
}

impl WebCanvas {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    fn path(&self, points: &[Point]) {
        self.ctx.begin_path();
        if let Some((first, rest)) = points.split_first() {
            self.ctx.move_to(first.0, first.1);
            for p in rest {
                self.ctx.line_to(p.0, p.1);
            }
        }
    }
}

impl Canvas for WebCanvas {
    fn size(&self) -> (f64, f64) {
        self.ctx
            .canvas()
            .map_or((800.0, 600.0), |c| (c.width() as f64, c.height() as f64))
    }

    fn clear(&mut self, color: Color) -> SeismicResult<()> {
        let (w, h) = self.size();
        self.fill_rect(0.0, 0.0, w, h, color)
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> SeismicResult<()> {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(x, y, w, h);
        Ok(())
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64) -> SeismicResult<()> {
        self.polyline(&[from, to], color, width)
    }

    fn polyline(&mut self, points: &[Point], color: Color, width: f64) -> SeismicResult<()> {
        if points.len() < 2 {
            return Ok(());
        }
        self.path(points);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.stroke();
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) -> SeismicResult<()> {
        if points.len() < 3 {
            return Ok(());
        }
        self.path(points);
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> SeismicResult<()> {
        self.ctx.begin_path();
        self.ctx
            .arc(center.0, center.1, radius.max(0.0), 0.0, TAU)
            .map_err(render_error)?;
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
        Ok(())
    }

    fn text(&mut self, text: &str, at: Point, size: f64, color: Color) -> SeismicResult<()> {
        self.ctx.set_font(&format!("{:.0}px sans-serif", size));
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_text(text, at.0, at.1).map_err(render_error)
    }
}

// ========================
// Simulator
// ========================

#[derive(Debug, Serialize)]
struct ChartData {
    acceleration: ChartSeries,
    velocity: ChartSeries,
    displacement: ChartSeries,
}

/// Browser-facing simulator instance
#[wasm_bindgen]
pub struct SeismicSimulator {
    driver: AnimationDriver,
}

impl Default for SeismicSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SeismicSimulator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SeismicSimulator {
        Self {
            driver: AnimationDriver::new(SimulationParameters::new(), SimulationConfig::default()),
        }
    }

    /// Build with a JSON [`SimulationConfig`]; missing keys keep their defaults
    pub fn with_config(config_json: &str) -> Result<SeismicSimulator, JsValue> {
        let config: SimulationConfig = serde_json::from_str(config_json).map_err(js_error)?;
        Ok(Self {
            driver: AnimationDriver::new(SimulationParameters::new(), config),
        })
    }

    /// Apply a (partial) JSON parameter object; restarts playback
    pub fn set_parameters(&mut self, params_json: &str) -> Result<(), JsValue> {
        let params = self
            .driver
            .params()
            .merged_json(params_json)
            .map_err(js_error)?;
        self.driver.set_params(params);
        Ok(())
    }

    pub fn parameters(&self) -> String {
        to_json(self.driver.params())
    }

    pub fn play(&mut self) {
        self.driver.play();
    }

    pub fn pause(&mut self) {
        self.driver.pause();
    }

    pub fn reset(&mut self) {
        self.driver.reset();
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.driver.set_speed(speed);
    }

    /// Advance by `dt` seconds; returns the clock event name
    pub fn tick(&mut self, dt: f64) -> String {
        to_json(&self.driver.tick(dt)).trim_matches('"').to_string()
    }

    pub fn current_time(&self) -> f64 {
        self.driver.current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.driver.state() == PlaybackState::Playing
    }

    pub fn has_collapsed(&self) -> bool {
        self.driver.collapse_state().has_collapsed
    }

    pub fn health_percent(&self) -> f64 {
        self.driver.frame().assessment.health_percent
    }

    pub fn render(&self, ctx: CanvasRenderingContext2d) -> Result<(), JsValue> {
        let mut canvas = WebCanvas::new(ctx);
        self.driver.render(&mut canvas).map_err(js_error)
    }

    /// Acceleration, velocity and displacement series for the chart library
    pub fn chart_data(&self) -> String {
        let window = self.driver.chart_window();
        to_json(&ChartData {
            acceleration: window.series(ChartKind::Acceleration),
            velocity: window.series(ChartKind::Velocity),
            displacement: window.series(ChartKind::Displacement),
        })
    }

    pub fn calculated_values(&self) -> String {
        to_json(&self.driver.calculated_values())
    }

    /// Current frame: floors, sample and damage assessment
    pub fn frame(&self) -> String {
        to_json(self.driver.frame())
    }

    /// Play one full duration headlessly and return the summary
    pub fn run_to_completion(&mut self, frame_dt: f64) -> String {
        to_json(&self.driver.run_to_completion(frame_dt))
    }

    /// PNG of the on-page canvas when given, otherwise an SVG of the current frame
    pub fn screenshot(&self, canvas: Option<HtmlCanvasElement>) -> Result<String, JsValue> {
        match canvas {
            Some(canvas) => canvas.to_data_url(),
            None => self.driver.screenshot().map_err(js_error),
        }
    }
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
