//! Chart annotations emitted by strategies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Where a plotted series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    /// Overlay on the price chart
    TechnicalIndicatorOnPrice,
}

/// Sink for plotted indicator values
pub trait Visualisation {
    fn plot_indicator(
        &mut self,
        timestamp: DateTime<Utc>,
        label: &str,
        kind: PlotKind,
        value: f64,
        pair: Option<&Symbol>,
    );
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub kind: PlotKind,
    pub value: f64,
    pub pair: Option<Symbol>,
}

/// Keeps every plotted point in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingVisualisation {
    points: Vec<PlotPoint>,
}

impl RecordingVisualisation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PlotPoint] {
        &self.points
    }

    /// Points of one series in plotting order
    pub fn series<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a PlotPoint> + 'a {
        self.points.iter().filter(move |p| p.label == label)
    }
}

impl Visualisation for RecordingVisualisation {
    fn plot_indicator(
        &mut self,
        timestamp: DateTime<Utc>,
        label: &str,
        kind: PlotKind,
        value: f64,
        pair: Option<&Symbol>,
    ) {
        self.points.push(PlotPoint {
            timestamp,
            label: label.to_string(),
            kind,
            value,
            pair: pair.cloned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_keeps_order_and_filters_series() {
        let mut vis = RecordingVisualisation::new();
        let ts = Utc::now();
        vis.plot_indicator(ts, "VWAP", PlotKind::TechnicalIndicatorOnPrice, 100.0, None);
        vis.plot_indicator(ts, "Breakout", PlotKind::TechnicalIndicatorOnPrice, 50.0, None);
        vis.plot_indicator(ts, "VWAP", PlotKind::TechnicalIndicatorOnPrice, 101.0, None);

        assert_eq!(vis.points().len(), 3);
        let vwap: Vec<f64> = vis.series("VWAP").map(|p| p.value).collect();
        assert_eq!(vwap, vec![100.0, 101.0]);
    }
}
