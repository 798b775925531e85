//! Canvas that records drawing commands, with SVG export for screenshots

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::SeismicResult;

use super::{Canvas, Point};

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    },
    Polyline {
        points: Vec<Point>,
        color: Color,
        width: f64,
    },
    Polygon {
        points: Vec<Point>,
        color: Color,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Color,
    },
    Text {
        text: String,
        at: Point,
        size: f64,
        color: Color,
    },
}

/// In-memory drawing surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Number of recorded commands whose color equals `color`
    pub fn count_color(&self, color: Color) -> usize {
        self.commands
            .iter()
            .filter(|c| command_color(c) == color)
            .count()
    }

    /// All recorded text, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Standalone SVG document of the recorded frame
    pub fn to_svg(&self) -> String {
        let mut svg = String::with_capacity(64 * self.commands.len() + 128);
        let _ = write!(
            svg,
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>",
            w = self.width,
            h = self.height
        );
        for command in &self.commands {
            write_svg_element(&mut svg, command, self.width, self.height);
        }
        svg.push_str("</svg>");
        svg
    }

    /// `data:image/svg+xml` URL of the recorded frame
    pub fn to_data_url(&self) -> String {
        format!("data:image/svg+xml;charset=utf-8,{}", encode_data_url(&self.to_svg()))
    }
}

fn command_color(command: &DrawCommand) -> Color {
    match command {
        DrawCommand::Clear { color }
        | DrawCommand::Rect { color, .. }
        | DrawCommand::Line { color, .. }
        | DrawCommand::Polyline { color, .. }
        | DrawCommand::Polygon { color, .. }
        | DrawCommand::Circle { color, .. }
        | DrawCommand::Text { color, .. } => *color,
    }
}

fn svg_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
}

fn write_svg_element(svg: &mut String, command: &DrawCommand, width: f64, height: f64) {
    let _ = match command {
        DrawCommand::Clear { color } => write!(
            svg,
            "<rect x='0' y='0' width='{}' height='{}' fill='{}'/>",
            width,
            height,
            color.to_css()
        ),
        DrawCommand::Rect { x, y, w, h, color } => write!(
            svg,
            "<rect x='{:.1}' y='{:.1}' width='{:.1}' height='{:.1}' fill='{}'/>",
            x,
            y,
            w,
            h,
            color.to_css()
        ),
        DrawCommand::Line {
            from,
            to,
            color,
            width,
        } => write!(
            svg,
            "<line x1='{:.1}' y1='{:.1}' x2='{:.1}' y2='{:.1}' stroke='{}' stroke-width='{:.1}'/>",
            from.0,
            from.1,
            to.0,
            to.1,
            color.to_css(),
            width
        ),
        DrawCommand::Polyline {
            points,
            color,
            width,
        } => write!(
            svg,
            "<polyline points='{}' fill='none' stroke='{}' stroke-width='{:.1}'/>",
            svg_points(points),
            color.to_css(),
            width
        ),
        DrawCommand::Polygon { points, color } => write!(
            svg,
            "<polygon points='{}' fill='{}'/>",
            svg_points(points),
            color.to_css()
        ),
        DrawCommand::Circle {
            center,
            radius,
            color,
        } => write!(
            svg,
            "<circle cx='{:.1}' cy='{:.1}' r='{:.1}' fill='{}'/>",
            center.0,
            center.1,
            radius,
            color.to_css()
        ),
        DrawCommand::Text {
            text,
            at,
            size,
            color,
        } => write!(
            svg,
            "<text x='{:.1}' y='{:.1}' font-family='sans-serif' font-size='{:.0}' fill='{}'>{}</text>",
            at.0,
            at.1,
            size,
            color.to_css(),
            escape_xml(text)
        ),
    };
}

/// Percent-encode the characters that are unsafe inside a data URL
fn encode_data_url(svg: &str) -> String {
    let mut out = String::with_capacity(svg.len() + svg.len() / 8);
    for c in svg.chars() {
        match c {
            '%' => out.push_str("%25"),
            '#' => out.push_str("%23"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            '"' => out.push_str("%22"),
            '\n' => out.push_str("%0A"),
            _ => out.push(c),
        }
    }
    out
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) -> SeismicResult<()> {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
        Ok(())
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) -> SeismicResult<()> {
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
        Ok(())
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64) -> SeismicResult<()> {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
        Ok(())
    }

    fn polyline(&mut self, points: &[Point], color: Color, width: f64) -> SeismicResult<()> {
        if points.len() >= 2 {
            self.commands.push(DrawCommand::Polyline {
                points: points.to_vec(),
                color,
                width,
            });
        }
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) -> SeismicResult<()> {
        if points.len() >= 3 {
            self.commands.push(DrawCommand::Polygon {
                points: points.to_vec(),
                color,
            });
        }
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) -> SeismicResult<()> {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn text(&mut self, text: &str, at: Point, size: f64, color: Color) -> SeismicResult<()> {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            size,
            color,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_starts_a_new_frame() {
        let mut c = RecordingCanvas::new(100.0, 50.0);
        c.fill_rect(0.0, 0.0, 10.0, 10.0, Color::RED).unwrap();
        c.clear(Color::SKY).unwrap();
        assert_eq!(c.commands().len(), 1);
        assert_eq!(c.count_color(Color::SKY), 1);
    }

    #[test]
    fn degenerate_shapes_are_skipped() {
        let mut c = RecordingCanvas::new(100.0, 50.0);
        c.polyline(&[(0.0, 0.0)], Color::WAVE, 1.0).unwrap();
        c.fill_polygon(&[(0.0, 0.0), (1.0, 1.0)], Color::RED).unwrap();
        assert!(c.commands().is_empty());
    }

    #[test]
    fn svg_contains_elements_and_escapes_text() {
        let mut c = RecordingCanvas::new(100.0, 50.0);
        c.clear(Color::WHITE).unwrap();
        c.line((0.0, 0.0), (10.0, 10.0), Color::BLACK, 2.0).unwrap();
        c.text("drift < limit & ok", (5.0, 5.0), 12.0, Color::BLACK)
            .unwrap();
        let svg = c.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<line"));
        assert!(svg.contains("drift &lt; limit &amp; ok"));
    }

    #[test]
    fn data_url_is_percent_encoded() {
        let mut c = RecordingCanvas::new(10.0, 10.0);
        c.clear(Color::RED).unwrap();
        let url = c.to_data_url();
        assert!(url.starts_with("data:image/svg+xml;charset=utf-8,%3Csvg"));
        assert!(!url.contains('<'));
        assert!(!url.contains('#'));
    }
}
