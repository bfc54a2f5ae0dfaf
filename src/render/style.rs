use serde::{Deserialize, Serialize};

/// Point marker drawn at every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Circle,
    TriangleUp,
    TriangleDown,
    Square,
    Cross,
}

/// Legend label, colour and marker for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub label: String,
    /// CSS colour name or `#rrggbb`.
    pub color: String,
    pub marker: Marker,
}

/// Opacity applied to both lines and markers.
pub const SERIES_OPACITY: f64 = 0.7;
/// Marker radius in pixels.
pub const MARKER_SIZE: i32 = 4;
pub const LINE_WIDTH: u32 = 2;
