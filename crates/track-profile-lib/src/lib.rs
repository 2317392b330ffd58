//! Track Profile Library - Core pipeline for recorded GPS sessions
//!
//! This library turns a recorded GPS session (location samples grouped into recording
//! sessions) into the two artifacts a viewer needs: polylines for a map overlay and a
//! distance-indexed speed/altitude profile for a chart.
//!
//! # Architecture
//!
//! - **[`RecordDocument`]**: Validated, immutable model of the raw grouped records
//! - **[`Track`]**: Per-group coordinate polylines plus the initial map focus
//! - **[`MetricsSeries`]**: Parallel cumulative distance, speed and altitude series
//! - **[`distance`]**: Haversine great-circle distance on a spherical Earth
//!
//! Both [`Track`] and [`MetricsSeries`] are derived independently from the same
//! [`RecordDocument`]; neither depends on the other.
//!
//! # Performance Characteristics
//!
//! - **Load**: O(N) over all samples, groups validated in parallel
//! - **Track**: O(N), groups reduced in parallel
//! - **Metrics**: O(N), a single sequential fold (the odometer cannot be split)

mod document;
mod metrics;
mod track;
pub mod distance;

// Public API exports
pub use document::{LocationSample, RecordDocument, RecordingGroup, Token};
pub use metrics::{MetricsSeries, Odometer, ProfileRow, ProfileSummary};
pub use track::{Track, TrackGroup};

/// Error types for the track profile pipeline
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Malformed input at `{path}`: {reason}")]
    MalformedInput { path: String, reason: String },

    #[error("Empty track: {0}")]
    EmptyTrack(String),

    #[error("Empty profile: no sample has latitude, longitude and speed")]
    EmptyProfile,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GPX error: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
