//! Text overlay, collapse banner and waveform strip

use crate::color::Color;
use crate::error::SeismicResult;
use crate::ground_motion::GroundSample;

use super::{Canvas, Point, RenderState, Viewport};

const PANEL_X: f64 = 10.0;
const PANEL_Y: f64 = 10.0;
const PANEL_WIDTH: f64 = 260.0;
const LINE_HEIGHT: f64 = 18.0;
const FONT_SIZE: f64 = 13.0;

const STRIP_HEIGHT: f64 = 60.0;
const STRIP_MARGIN: f64 = 10.0;

/// Lines shown in the overlay panel
pub fn overlay_lines(state: &RenderState<'_>) -> Vec<String> {
    let params = state.params;
    let roof = state.floors.last().map_or(0.0, |f| f.x_displacement);
    let mut lines = vec![
        format!("Time: {:.1} s ({} mode)", state.t, params.mode),
        format!("PGA: {:.2} g", state.sample.pga.abs()),
        format!("Roof displacement: {:.1} cm", roof),
        format!("Max drift: {:.2} %", state.assessment.max_drift_ratio * 100.0),
        format!("Material: {}", params.material),
        format!("Code: {} / {}", params.building_code, params.reinforcement),
        format!("AI damping: {}", if params.ai_support { "ON" } else { "OFF" }),
    ];
    if state.collapse.has_collapsed {
        lines.push("Health: 0 %".to_string());
    } else {
        lines.push(format!("Health: {:.0} %", state.assessment.health_percent));
    }
    if state.assessment.soft_story {
        lines.push("Soft story detected".to_string());
    }
    lines
}

/// Banner text once collapsed
pub fn collapse_banner(state: &RenderState<'_>) -> Option<(String, String)> {
    if !state.collapse.has_collapsed {
        return None;
    }
    let cause = state
        .collapse
        .trigger
        .map_or_else(|| "structural failure".to_string(), |t| t.to_string());
    let at = state
        .collapse
        .onset_time
        .map_or_else(String::new, |t| format!(" at {:.1} s", t));
    Some(("STRUCTURAL COLLAPSE".to_string(), format!("{}{}", cause, at)))
}

pub fn draw_overlay<C: Canvas + ?Sized>(
    canvas: &mut C,
    vp: &Viewport,
    state: &RenderState<'_>,
) -> SeismicResult<()> {
    let lines = overlay_lines(state);
    let height = LINE_HEIGHT * lines.len() as f64 + 12.0;
    canvas.fill_rect(PANEL_X, PANEL_Y, PANEL_WIDTH, height, Color::PANEL)?;
    for (i, line) in lines.iter().enumerate() {
        let color = if line.starts_with("Health") && state.collapse.has_collapsed {
            Color::RED
        } else {
            Color::WHITE
        };
        canvas.text(
            line,
            (PANEL_X + 10.0, PANEL_Y + 20.0 + i as f64 * LINE_HEIGHT),
            FONT_SIZE,
            color,
        )?;
    }

    if let Some((title, detail)) = collapse_banner(state) {
        let w = vp.width * 0.5;
        let x = (vp.width - w) * 0.5;
        let y = vp.height * 0.35;
        canvas.fill_rect(x, y, w, 64.0, Color::RED.with_alpha(220))?;
        canvas.text(&title, (x + 20.0, y + 28.0), 22.0, Color::WHITE)?;
        canvas.text(&detail, (x + 20.0, y + 52.0), FONT_SIZE, Color::WHITE)?;
    }
    Ok(())
}

/// Acceleration trace along the bottom of the canvas with a playback marker
pub fn draw_waveform<C: Canvas + ?Sized>(
    canvas: &mut C,
    vp: &Viewport,
    samples: &[GroundSample],
    marker: Option<usize>,
) -> SeismicResult<()> {
    if samples.len() < 2 {
        return Ok(());
    }
    let x0 = STRIP_MARGIN;
    let w = vp.width - 2.0 * STRIP_MARGIN;
    let y0 = vp.height - STRIP_HEIGHT - STRIP_MARGIN;
    let mid_y = y0 + STRIP_HEIGHT * 0.5;
    canvas.fill_rect(x0, y0, w, STRIP_HEIGHT, Color::PANEL)?;
    canvas.line((x0, mid_y), (x0 + w, mid_y), Color::WHITE.with_alpha(60), 1.0)?;

    let peak = samples.iter().fold(0.0f64, |m, s| m.max(s.pga.abs()));
    let scale = if peak > 1e-12 {
        0.45 * STRIP_HEIGHT / peak
    } else {
        0.0
    };
    let step = w / (samples.len() - 1) as f64;
    let points: Vec<Point> = samples
        .iter()
        .enumerate()
        .map(|(i, s)| (x0 + i as f64 * step, mid_y - s.pga * scale))
        .collect();
    canvas.polyline(&points, Color::WAVE, 1.5)?;

    if let Some(i) = marker.filter(|&i| i < samples.len()) {
        let x = x0 + i as f64 * step;
        canvas.line((x, y0), (x, y0 + STRIP_HEIGHT), Color::RED, 1.5)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collapse::{CollapseState, CollapseTrigger, DamageAssessment};
    use crate::config::SimulationConfig;
    use crate::params::SimulationParameters;
    use crate::render::{DrawCommand, RecordingCanvas};
    use crate::structure::FloorState;

    fn with_state<F: FnOnce(&RenderState<'_>)>(collapse: CollapseState, f: F) {
        let params = SimulationParameters::new().with_ai_support(true);
        let config = SimulationConfig::default();
        let assessment = DamageAssessment::at_rest(&params);
        let floors = vec![FloorState::default(); 11];
        let state = RenderState {
            params: &params,
            config: &config,
            t: 12.0,
            floors: &floors,
            sample: GroundSample {
                pga: -0.31,
                ..Default::default()
            },
            assessment: &assessment,
            collapse: &collapse,
            waveform: &[],
            waveform_marker: None,
        };
        f(&state);
    }

    #[test]
    fn panel_reports_inputs_and_health() {
        with_state(CollapseState::new(), |state| {
            let lines = overlay_lines(state);
            assert!(lines.contains(&"PGA: 0.31 g".to_string()));
            assert!(lines.contains(&"AI damping: ON".to_string()));
            assert!(lines.contains(&"Health: 100 %".to_string()));
            assert!(collapse_banner(state).is_none());
        });
    }

    #[test]
    fn banner_names_the_trigger() {
        let collapse = CollapseState {
            has_collapsed: true,
            onset_time: Some(7.3),
            trigger: Some(CollapseTrigger::SoftStory),
        };
        with_state(collapse, |state| {
            let (title, detail) = collapse_banner(state).unwrap();
            assert_eq!(title, "STRUCTURAL COLLAPSE");
            assert_eq!(detail, "soft-story mechanism at 7.3 s");
            assert!(overlay_lines(state).contains(&"Health: 0 %".to_string()));
        });
    }

    #[test]
    fn waveform_draws_trace_and_marker() {
        let vp = Viewport::new(800.0, 600.0, 3500.0);
        let samples: Vec<GroundSample> = (0..50)
            .map(|i| GroundSample {
                t: i as f64,
                pga: (i as f64 * 0.3).sin(),
                ..Default::default()
            })
            .collect();
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        draw_waveform(&mut canvas, &vp, &samples, Some(10)).unwrap();
        let polylines = canvas
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polyline { points, .. } if points.len() == 50))
            .count();
        assert_eq!(polylines, 1);
        assert_eq!(canvas.count_color(Color::RED), 1);
    }
}
