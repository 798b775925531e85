//! 2D rendering of the building, ground, waveform and overlay
//!
//! Everything here is a pure function of the frame state: the renderer reads
//! floors, collapse and assessment values and issues drawing commands through
//! the [`Canvas`] trait. Nothing is cached between frames.

pub mod building;
pub mod collapse;
pub mod overlay;
pub mod recorder;

use crate::collapse::{CollapseState, DamageAssessment};
use crate::color::Color;
use crate::config::SimulationConfig;
use crate::error::SeismicResult;
use crate::ground_motion::GroundSample;
use crate::params::SimulationParameters;
use crate::structure::{FloorState, GROUND_SHIFT_PER_G};

pub use building::DriftSeverity;
pub use recorder::{DrawCommand, RecordingCanvas};

/// Screen point in pixels, y down
pub type Point = (f64, f64);

/// Minimal 2D drawing surface
pub trait Canvas {
    /// Surface size in pixels
    fn size(&self) -> (f64, f64);

    fn clear(&mut self, color: Color) -> SeismicResult<()>;

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> SeismicResult<()>;

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64) -> SeismicResult<()>;

    fn polyline(&mut self, points: &[Point], color: Color, width: f64) -> SeismicResult<()>;

    fn fill_polygon(&mut self, points: &[Point], color: Color) -> SeismicResult<()>;

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> SeismicResult<()>;

    fn text(&mut self, text: &str, at: Point, size: f64, color: Color) -> SeismicResult<()>;
}

/// Lateral pixels per cm of displacement at the reference canvas width
const LATERAL_PX_PER_CM: f64 = 1.5;
const REFERENCE_WIDTH: f64 = 800.0;

/// Maps building coordinates (cm) onto the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Screen y of the ground surface
    pub ground_y: f64,
    /// Screen x of the building axis at rest
    pub center_x: f64,
    /// Vertical pixels per cm of building height
    pub px_per_cm: f64,
    /// Horizontal pixels per cm of lateral displacement
    pub lateral_px_per_cm: f64,
    pub half_width_px: f64,
    pub slab_px: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, building_height_cm: f64) -> Self {
        let ground_y = height * 0.78;
        Self {
            width,
            height,
            ground_y,
            center_x: width * 0.5,
            px_per_cm: height * 0.62 / building_height_cm.max(1.0),
            lateral_px_per_cm: LATERAL_PX_PER_CM * (width / REFERENCE_WIDTH).max(0.25),
            half_width_px: width * 0.09,
            slab_px: (height * 0.012).max(3.0),
        }
    }

    /// Screen point for lateral position `x_cm` at height `y_cm`
    pub fn point(&self, x_cm: f64, y_cm: f64) -> Point {
        (
            self.center_x + x_cm * self.lateral_px_per_cm,
            self.ground_y - y_cm * self.px_per_cm,
        )
    }

    /// Screen point from a pixel offset relative to the base center, y up
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        (self.center_x + dx, self.ground_y - dy)
    }

    pub fn story_px(&self, story_height_cm: f64) -> f64 {
        story_height_cm * self.px_per_cm
    }
}

/// Everything one frame draws from
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub params: &'a SimulationParameters,
    pub config: &'a SimulationConfig,
    pub t: f64,
    pub floors: &'a [FloorState],
    pub sample: GroundSample,
    pub assessment: &'a DamageAssessment,
    pub collapse: &'a CollapseState,
    /// Samples shown in the waveform strip
    pub waveform: &'a [GroundSample],
    pub waveform_marker: Option<usize>,
}

/// Draw-order and layer switches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderer {
    pub show_waveform: bool,
    pub show_overlay: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            show_waveform: true,
            show_overlay: true,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_overlay(mut self) -> Self {
        self.show_overlay = false;
        self
    }

    pub fn without_waveform(mut self) -> Self {
        self.show_waveform = false;
        self
    }

    /// Draw one complete frame
    pub fn render<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        state: &RenderState<'_>,
    ) -> SeismicResult<()> {
        let (width, height) = canvas.size();
        let vp = Viewport::new(width, height, state.config.building_height_cm());

        canvas.clear(Color::SKY)?;
        draw_ground(canvas, &vp, state.sample.pga * GROUND_SHIFT_PER_G)?;

        if state.collapse.has_collapsed {
            collapse::draw_collapse(canvas, &vp, state)?;
        } else {
            building::draw_building(canvas, &vp, state)?;
        }

        if self.show_waveform {
            overlay::draw_waveform(canvas, &vp, state.waveform, state.waveform_marker)?;
        }
        if self.show_overlay {
            overlay::draw_overlay(canvas, &vp, state)?;
        }
        Ok(())
    }
}

const GROUND_TICK_SPACING: f64 = 40.0;

/// Earth and grass band; tick marks slide with the ground shift
fn draw_ground<C: Canvas + ?Sized>(canvas: &mut C, vp: &Viewport, shift_cm: f64) -> SeismicResult<()> {
    canvas.fill_rect(0.0, vp.ground_y, vp.width, vp.height - vp.ground_y, Color::EARTH)?;
    canvas.fill_rect(0.0, vp.ground_y, vp.width, 6.0, Color::GRASS)?;

    let shift_px = shift_cm * vp.lateral_px_per_cm;
    let phase = shift_px.rem_euclid(GROUND_TICK_SPACING);
    let mut x = phase - GROUND_TICK_SPACING;
    let tick = Color::EARTH.darken(0.3);
    while x < vp.width + GROUND_TICK_SPACING {
        canvas.line((x, vp.ground_y + 8.0), (x - 10.0, vp.ground_y + 22.0), tick, 2.0)?;
        x += GROUND_TICK_SPACING;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn viewport_places_base_on_ground() {
        let vp = Viewport::new(800.0, 600.0, 3500.0);
        let (x, y) = vp.point(0.0, 0.0);
        assert_relative_eq!(x, 400.0);
        assert_relative_eq!(y, vp.ground_y);
        let (_, roof_y) = vp.point(0.0, 3500.0);
        assert!(roof_y > 0.0 && roof_y < vp.ground_y);
    }

    #[test]
    fn lateral_scale_follows_canvas_width() {
        let narrow = Viewport::new(400.0, 600.0, 3500.0);
        let wide = Viewport::new(800.0, 600.0, 3500.0);
        assert_relative_eq!(wide.lateral_px_per_cm, 2.0 * narrow.lateral_px_per_cm);
    }

    #[test]
    fn ground_ticks_move_with_shift() {
        let mut a = RecordingCanvas::new(800.0, 600.0);
        let mut b = RecordingCanvas::new(800.0, 600.0);
        let vp = Viewport::new(800.0, 600.0, 3500.0);
        draw_ground(&mut a, &vp, 0.0).unwrap();
        draw_ground(&mut b, &vp, 5.0).unwrap();
        assert_eq!(a.commands().len(), b.commands().len());
        assert_ne!(a.commands(), b.commands());
    }
}
