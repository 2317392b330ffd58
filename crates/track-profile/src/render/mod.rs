//! Output adapters for the two derived artifacts
//!
//! Map renderers consume a [`Track`] (one polyline per group plus the focus point),
//! profile renderers consume a [`MetricsSeries`]. Renderers write into any
//! [`Write`]; callers render into memory first so that a failing renderer never
//! leaves a partial file behind.

mod chart;
mod gpx_export;
mod map;
mod raster;
mod table;

pub use chart::{ChartFormat, ChartStyle, SpeedAltitudeChart};
pub use gpx_export::GpxExport;
pub use map::{LeafletMap, MapStyle, TilesProvider};
pub use table::ProfileCsv;

use std::io::Write;
use track_profile_lib::{MetricsSeries, Result, Track};

/// Produces a viewable map document from the track polylines
pub trait MapRenderer {
    fn render_map(&self, track: &Track, out: &mut dyn Write) -> Result<()>;
}

/// Produces a chart or table from the distance-indexed profile
pub trait ProfileRenderer {
    fn render_profile(&self, series: &MetricsSeries, out: &mut dyn Write) -> Result<()>;
}

/// Run a renderer against an in-memory buffer
pub fn render_to_vec(render: impl FnOnce(&mut dyn Write) -> Result<()>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    render(&mut buffer)?;
    Ok(buffer)
}
