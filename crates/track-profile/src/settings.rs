use crate::render::{ChartFormat, ChartStyle, MapStyle, TilesProvider};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Profile - Renders a recorded GPS session as a map overlay and a speed/altitude chart
pub struct Settings {
    /// Recorded session JSON file (`totalRecord.groups[].locationData[]`)
    #[clap(value_name = "FILE", env = "TRACK_PROFILE_INPUT")]
    pub input: PathBuf,

    /// Directory where all artifacts are written
    #[clap(short, long, default_value = ".", env = "TRACK_PROFILE_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Map document file name (HTML)
    #[clap(long, default_value = "map.html", env = "TRACK_PROFILE_MAP_FILE")]
    pub map_file: PathBuf,

    /// Speed/altitude chart file name; PNG unless it ends in `.svg`
    #[clap(long, default_value = "speed_altitude.png", env = "TRACK_PROFILE_CHART_FILE")]
    pub chart_file: PathBuf,

    /// Also export the polylines as GPX
    #[clap(long, value_name = "FILE", env = "TRACK_PROFILE_GPX_FILE")]
    pub gpx_file: Option<PathBuf>,

    /// Also export the profile as CSV
    #[clap(long, value_name = "FILE", env = "TRACK_PROFILE_CSV_FILE")]
    pub csv_file: Option<PathBuf>,

    /// Also write the profile summary as JSON
    #[clap(long, value_name = "FILE", env = "TRACK_PROFILE_SUMMARY_FILE")]
    pub summary_file: Option<PathBuf>,

    /// Map tiles provider
    #[clap(long, value_enum, default_value_t = TilesProvider::OpenStreetMap, env = "TRACK_PROFILE_TILES")]
    pub tiles: TilesProvider,

    /// Initial map zoom level
    #[clap(long, default_value = "14", env = "TRACK_PROFILE_ZOOM")]
    pub zoom: u8,

    /// Fit the map to the whole track instead of focusing the first point
    #[clap(long, env = "TRACK_PROFILE_FIT_BOUNDS")]
    pub fit_bounds: bool,

    /// Track line width in pixels
    #[clap(long, default_value = "4.0", env = "TRACK_PROFILE_LINE_WIDTH")]
    pub line_width: f64,

    /// Chart width in pixels
    #[clap(long, default_value = "1000", env = "TRACK_PROFILE_CHART_WIDTH")]
    pub chart_width: u32,

    /// Chart height in pixels
    #[clap(long, default_value = "500", env = "TRACK_PROFILE_CHART_HEIGHT")]
    pub chart_height: u32,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Full path of an artifact inside the output directory
    pub fn output_path(&self, file: &Path) -> PathBuf {
        self.output_dir.join(file)
    }

    pub fn map_style(&self) -> MapStyle {
        MapStyle {
            tiles: self.tiles,
            zoom: self.zoom,
            fit_bounds: self.fit_bounds,
            line_weight: self.line_width,
            ..MapStyle::default()
        }
    }

    pub fn chart_style(&self) -> ChartStyle {
        ChartStyle {
            width: self.chart_width,
            height: self.chart_height,
            format: ChartFormat::from_path(&self.chart_file),
            ..ChartStyle::default()
        }
    }
}
