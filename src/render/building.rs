//! Standing building: slabs, columns, damage coloring and bracing

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::SeismicResult;
use crate::profiles::StructuralMaterial;
use crate::structure::{story_drifts, FloorState};

use super::{Canvas, Point, RenderState, Viewport};

/// Damage color band for one story
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftSeverity {
    Normal,
    Yellow,
    Orange,
    Red,
}

impl DriftSeverity {
    /// Band for `drift` given the (modified) damage and collapse thresholds
    ///
    /// Yellow ends at the midpoint of damage and collapse, orange at 0.9 × collapse.
    pub fn classify(drift: f64, damage: f64, collapse: f64) -> Self {
        let severe = 0.5 * (damage + collapse);
        let critical = 0.9 * collapse;
        if drift < damage {
            DriftSeverity::Normal
        } else if drift < severe {
            DriftSeverity::Yellow
        } else if drift < critical {
            DriftSeverity::Orange
        } else {
            DriftSeverity::Red
        }
    }

    pub fn color(self, material_color: Color) -> Color {
        match self {
            DriftSeverity::Normal => material_color,
            DriftSeverity::Yellow => Color::YELLOW,
            DriftSeverity::Orange => Color::ORANGE,
            DriftSeverity::Red => Color::RED,
        }
    }
}

/// Screen corners of one floor: (left, right)
fn floor_edges(vp: &Viewport, floor: &FloorState) -> (Point, Point) {
    let (x, y) = vp.point(floor.absolute_x, floor.y);
    ((x - vp.half_width_px, y), (x + vp.half_width_px, y))
}

fn mid(a: Point, b: Point) -> Point {
    (0.5 * (a.0 + b.0), 0.5 * (a.1 + b.1))
}

fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Lateral-force system that appears once a story is damaged
fn draw_bracing<C: Canvas + ?Sized>(
    canvas: &mut C,
    material: StructuralMaterial,
    lower: (Point, Point),
    upper: (Point, Point),
    color: Color,
) -> SeismicResult<()> {
    let (ll, lr) = lower;
    let (ul, ur) = upper;
    match material {
        StructuralMaterial::Steel => {
            canvas.line(ll, ur, color, 2.0)?;
            canvas.line(lr, ul, color, 2.0)?;
        }
        StructuralMaterial::Concrete => {
            // Shear wall in the middle third of the bay
            let wall = [
                lerp_point(ll, lr, 1.0 / 3.0),
                lerp_point(ll, lr, 2.0 / 3.0),
                lerp_point(ul, ur, 2.0 / 3.0),
                lerp_point(ul, ur, 1.0 / 3.0),
            ];
            canvas.fill_polygon(&wall, color.with_alpha(110))?;
        }
        StructuralMaterial::Hybrid => {
            let top = mid(ul, ur);
            let bottom = mid(ll, lr);
            canvas.line(ll, top, color, 2.0)?;
            canvas.line(top, lr, color, 2.0)?;
            canvas.line(ul, bottom, color, 1.5)?;
            canvas.line(bottom, ur, color, 1.5)?;
        }
        StructuralMaterial::Wood => {}
    }
    Ok(())
}

/// Severity of every story, bottom to top
pub fn story_severities(state: &RenderState<'_>) -> Vec<DriftSeverity> {
    story_drifts(state.floors, state.config.story_height_cm)
        .into_iter()
        .map(|d| {
            DriftSeverity::classify(
                d,
                state.assessment.damage_threshold,
                state.assessment.collapse_threshold,
            )
        })
        .collect()
}

pub fn draw_building<C: Canvas + ?Sized>(
    canvas: &mut C,
    vp: &Viewport,
    state: &RenderState<'_>,
) -> SeismicResult<()> {
    let floors = state.floors;
    if floors.is_empty() {
        return Ok(());
    }
    let material = state.params.material;
    let base_color = material.profile().color;
    let severities = story_severities(state);

    // Foundation
    let (fl, fr) = floor_edges(vp, &floors[0]);
    canvas.fill_rect(
        fl.0 - 6.0,
        fl.1,
        fr.0 - fl.0 + 12.0,
        vp.slab_px * 1.5,
        base_color.darken(0.4),
    )?;

    for (story, pair) in floors.windows(2).enumerate() {
        let lower = floor_edges(vp, &pair[0]);
        let upper = floor_edges(vp, &pair[1]);
        let severity = severities.get(story).copied().unwrap_or(DriftSeverity::Normal);
        let color = severity.color(base_color);

        if severity > DriftSeverity::Normal {
            draw_bracing(canvas, material, lower, upper, color.darken(0.2))?;
        }

        let column_width = if material == StructuralMaterial::Wood { 2.0 } else { 3.0 };
        canvas.line(lower.0, upper.0, color, column_width)?;
        canvas.line(lower.1, upper.1, color, column_width)?;
        canvas.line(mid(lower.0, lower.1), mid(upper.0, upper.1), color.with_alpha(140), 1.0)?;

        let slab = [
            upper.0,
            upper.1,
            (upper.1 .0, upper.1 .1 + vp.slab_px),
            (upper.0 .0, upper.0 .1 + vp.slab_px),
        ];
        canvas.fill_polygon(&slab, color.darken(0.15))?;
    }
    Ok(())
}
