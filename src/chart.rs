//! Chart data: plain arrays around the current playback position

use serde::{Deserialize, Serialize};

use crate::ground_motion::{GroundSample, TimeHistory};

/// Which quantity a chart plots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Acceleration,
    Velocity,
    Displacement,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::Acceleration,
        ChartKind::Velocity,
        ChartKind::Displacement,
    ];

    /// Axis label with units
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Acceleration => "Acceleration (g)",
            ChartKind::Velocity => "Velocity (cm/s)",
            ChartKind::Displacement => "Displacement (cm)",
        }
    }
}

/// One chart's arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub label: String,
    pub time: Vec<f64>,
    pub values: Vec<f64>,
    /// Position of the playback marker within `values`
    pub current_index: Option<usize>,
}

/// Equal-length arrays for all three charts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartWindow {
    pub time: Vec<f64>,
    pub pga: Vec<f64>,
    pub velocity: Vec<f64>,
    pub displacement: Vec<f64>,
    /// Marker position within the arrays, `None` when empty
    pub current_index: Option<usize>,
}

impl ChartWindow {
    fn from_slice(samples: &[GroundSample], current_index: Option<usize>) -> Self {
        Self {
            time: samples.iter().map(|s| s.t).collect(),
            pga: samples.iter().map(|s| s.pga).collect(),
            velocity: samples.iter().map(|s| s.velocity).collect(),
            displacement: samples.iter().map(|s| s.displacement).collect(),
            current_index,
        }
    }

    /// Window of `behind` samples before and `ahead` after `index`, clipped to the record
    pub fn around(history: &TimeHistory, index: usize, behind: usize, ahead: usize) -> Self {
        if history.is_empty() {
            return Self::default();
        }
        let (start, slice) = history.window(index, behind, ahead);
        let marker = index.min(history.len() - 1) - start;
        Self::from_slice(slice, Some(marker))
    }

    /// The whole (rolling) history with the marker on the newest sample
    pub fn rolling(history: &TimeHistory) -> Self {
        let marker = history.len().checked_sub(1);
        Self::from_slice(history.samples(), marker)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn series(&self, kind: ChartKind) -> ChartSeries {
        let values = match kind {
            ChartKind::Acceleration => &self.pga,
            ChartKind::Velocity => &self.velocity,
            ChartKind::Displacement => &self.displacement,
        };
        ChartSeries {
            kind,
            label: kind.label().to_string(),
            time: self.time.clone(),
            values: values.clone(),
            current_index: self.current_index,
        }
    }

    /// Largest |value| of a series, used for symmetric axis scaling
    pub fn abs_max(&self, kind: ChartKind) -> f64 {
        let values = match kind {
            ChartKind::Acceleration => &self.pga,
            ChartKind::Velocity => &self.velocity,
            ChartKind::Displacement => &self.displacement,
        };
        values.iter().fold(0.0, |m, v| m.max(v.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(n: usize) -> TimeHistory {
        TimeHistory::from_samples(
            (0..n)
                .map(|i| GroundSample {
                    t: i as f64 * 0.06,
                    pga: i as f64,
                    velocity: -(i as f64),
                    displacement: 2.0 * i as f64,
                })
                .collect(),
        )
    }

    #[test]
    fn realistic_window_spans_behind_and_ahead() {
        let w = ChartWindow::around(&history(1000), 500, 30, 90);
        assert_eq!(w.len(), 121);
        assert_eq!(w.current_index, Some(30));
        assert_eq!(w.pga[30], 500.0);
    }

    #[test]
    fn window_clips_at_start_and_end() {
        let h = history(1000);
        let w = ChartWindow::around(&h, 5, 30, 90);
        assert_eq!(w.time.len(), 96);
        assert_eq!(w.current_index, Some(5));

        let w = ChartWindow::around(&h, 999, 30, 90);
        assert_eq!(w.len(), 31);
        assert_eq!(w.current_index, Some(30));
    }

    #[test]
    fn arrays_have_equal_length() {
        let w = ChartWindow::rolling(&history(17));
        assert_eq!(w.pga.len(), w.time.len());
        assert_eq!(w.velocity.len(), w.time.len());
        assert_eq!(w.displacement.len(), w.time.len());
        assert_eq!(w.current_index, Some(16));
        let s = w.series(ChartKind::Displacement);
        assert_eq!(s.values[16], 32.0);
        assert_eq!(s.label, "Displacement (cm)");
        assert_eq!(w.abs_max(ChartKind::Velocity), 16.0);
    }

    #[test]
    fn empty_history_has_no_marker() {
        assert_eq!(ChartWindow::rolling(&TimeHistory::new()).current_index, None);
        assert!(ChartWindow::around(&TimeHistory::new(), 3, 30, 90).is_empty());
    }
}
