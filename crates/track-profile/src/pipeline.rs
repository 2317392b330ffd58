//! Load once, derive both artifacts, write what could be produced in full
//!
//! The map path and the profile path are independent: a document whose first group has
//! no position cannot produce a map, but its profile may still be complete. A malformed
//! document aborts before anything is written.

use crate::Settings;
use crate::render::{
    GpxExport, LeafletMap, MapRenderer, ProfileCsv, ProfileRenderer, SpeedAltitudeChart,
    render_to_vec,
};
use anyhow::Context;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use track_profile_lib::{MetricsSeries, ProfileSummary, RecordDocument, Track};

/// Outcome of one run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Map artifacts written (HTML, then GPX if requested)
    pub map_files: Vec<PathBuf>,
    /// Profile artifacts written (chart, then CSV and summary if requested)
    pub profile_files: Vec<PathBuf>,
    pub summary: ProfileSummary,
    /// Why the map artifacts were not produced
    pub map_error: Option<String>,
    /// Why the profile artifacts were not produced
    pub profile_error: Option<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.map_error.is_none() && self.profile_error.is_none()
    }
}

type Artifact = (PathBuf, Vec<u8>);

pub fn run(settings: &Settings) -> anyhow::Result<RunReport> {
    let document = RecordDocument::from_path(&settings.input)
        .with_context(|| format!("Failed to load {}", settings.input.display()))?;
    tracing::info!(
        "Opened {} ({} groups, {} samples)",
        settings.input.display(),
        document.groups().len(),
        document.total_samples()
    );

    std::fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            settings.output_dir.display()
        )
    })?;

    let mut report = RunReport::default();

    match map_artifacts(&document, settings).and_then(write_artifacts) {
        Ok(files) => report.map_files = files,
        Err(e) => {
            tracing::error!("Map not produced: {e:#}");
            report.map_error = Some(format!("{e:#}"));
        }
    }

    let series = MetricsSeries::extract(&document);
    report.summary = ProfileSummary::from_series(&series);

    match profile_artifacts(&series, &report.summary, settings).and_then(write_artifacts) {
        Ok(files) => report.profile_files = files,
        Err(e) => {
            tracing::error!("Profile not produced: {e:#}");
            report.profile_error = Some(format!("{e:#}"));
        }
    }

    Ok(report)
}

fn map_artifacts(document: &RecordDocument, settings: &Settings) -> anyhow::Result<Vec<Artifact>> {
    let track = Track::load(document)?;
    let map = LeafletMap::new(settings.map_style());

    let mut artifacts = vec![(
        settings.output_path(&settings.map_file),
        render_to_vec(|out| map.render_map(&track, out))?,
    )];
    if let Some(gpx_file) = &settings.gpx_file {
        artifacts.push((
            settings.output_path(gpx_file),
            render_to_vec(|out| GpxExport.render_map(&track, out))?,
        ));
    }
    Ok(artifacts)
}

fn profile_artifacts(
    series: &MetricsSeries,
    summary: &ProfileSummary,
    settings: &Settings,
) -> anyhow::Result<Vec<Artifact>> {
    let chart = SpeedAltitudeChart::new(settings.chart_style());

    let mut artifacts = vec![(
        settings.output_path(&settings.chart_file),
        render_to_vec(|out| chart.render_profile(series, out))?,
    )];
    if let Some(csv_file) = &settings.csv_file {
        artifacts.push((
            settings.output_path(csv_file),
            render_to_vec(|out| ProfileCsv.render_profile(series, out))?,
        ));
    }
    if let Some(summary_file) = &settings.summary_file {
        artifacts.push((
            settings.output_path(summary_file),
            serde_json::to_vec_pretty(summary)?,
        ));
    }
    Ok(artifacts)
}

/// Write a set of artifacts all-or-nothing
///
/// Every artifact is first written next to its target under a hidden `.partial` name,
/// then renamed into place. On any failure the partial files and the targets already
/// renamed are removed, so the set is either complete on disk or absent.
fn write_artifacts(artifacts: Vec<Artifact>) -> anyhow::Result<Vec<PathBuf>> {
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(artifacts.len());
    for (path, bytes) in artifacts {
        let partial = partial_path(&path);
        if let Err(e) = std::fs::write(&partial, bytes) {
            discard(staged.iter().map(|(partial, _)| partial.as_path()));
            discard([partial.as_path()]);
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }
        staged.push((partial, path));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (i, (partial, path)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(partial, path) {
            discard(written.iter().map(PathBuf::as_path));
            discard(staged[i..].iter().map(|(partial, _)| partial.as_path()));
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }
        written.push(path.clone());
    }

    for path in &written {
        tracing::info!("Wrote {}", path.display());
    }
    Ok(written)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".partial");
    path.with_file_name(name)
}

fn discard<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove {}: {e}", path.display());
        }
    }
}
