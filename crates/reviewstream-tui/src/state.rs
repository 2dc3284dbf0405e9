//! Dashboard view state.

use reviewstream_core::chart::ChartData;

/// Whether the channel still delivers messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Live,
    /// Writer finished; the last charts stay on screen until the user quits.
    Closed,
    Interrupted,
}

impl StreamStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Closed => "stream closed",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Everything the render functions read.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Human-readable channel name for the header.
    pub source: String,
    pub chart: ChartData,
    pub status: StreamStatus,
}

impl DashboardState {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            chart: ChartData::default(),
            status: StreamStatus::Live,
        }
    }
}
