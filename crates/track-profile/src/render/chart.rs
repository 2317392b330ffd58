//! Speed and altitude against distance, as a PNG or SVG chart

use super::ProfileRenderer;
use super::raster::GlyphText;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::io::{Cursor, Write};
use std::path::Path;
use track_profile_lib::{DataError, MetricsSeries, Result};

const SPEED_COLOR: RGBColor = RGBColor(31, 119, 180);
const ALTITUDE_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Smallest x span, so a single-sample profile still gets a usable axis
const MIN_SPAN_KM: f64 = 0.001;

/// Output encoding of the chart
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartFormat {
    Png,
    Svg,
}

impl ChartFormat {
    /// Format implied by a file name: `.svg` is vector, anything else is PNG
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => Self::Svg,
            _ => Self::Png,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub format: ChartFormat,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            title: "Speed & Altitude vs Distance".to_string(),
            format: ChartFormat::Png,
        }
    }
}

/// Dual-axis line chart: speed on the left axis, altitude on the right, distance shared
#[derive(Clone, Debug, Default)]
pub struct SpeedAltitudeChart {
    pub style: ChartStyle,
}

impl SpeedAltitudeChart {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }

    fn draw<DB: DrawingBackend>(
        &self,
        series: &MetricsSeries,
        root: DrawingArea<DB, Shift>,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let distance_km = series.distance_km();
        let x_max = distance_km.last().copied().unwrap_or(0.0).max(MIN_SPAN_KM);
        let speed_max = series.speed_kmh().iter().copied().fold(0.0, f64::max).max(1.0) * 1.05;
        let (altitude_min, altitude_max) = altitude_range(series.altitude_m());

        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.style.title, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(0.0..x_max, 0.0..speed_max)?
            .set_secondary_coord(0.0..x_max, altitude_min..altitude_max);

        chart
            .configure_mesh()
            .x_desc("Distance (km)")
            .y_desc("Speed (km/h)")
            .axis_desc_style(("sans-serif", 15))
            .y_label_style(("sans-serif", 12).into_font().color(&SPEED_COLOR))
            .draw()?;

        chart
            .configure_secondary_axes()
            .y_desc("Altitude (m)")
            .axis_desc_style(("sans-serif", 15))
            .label_style(("sans-serif", 12).into_font().color(&ALTITUDE_COLOR))
            .draw()?;

        chart.draw_series(LineSeries::new(
            distance_km.iter().copied().zip(series.speed_kmh().iter().copied()),
            SPEED_COLOR.stroke_width(2),
        ))?;

        for run in altitude_runs(&distance_km, series.altitude_m()) {
            chart.draw_secondary_series(LineSeries::new(run, ALTITUDE_COLOR.stroke_width(2)))?;
        }

        root.present()?;
        Ok(())
    }

    fn render_svg(&self, series: &MetricsSeries) -> Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.style.width, self.style.height))
                .into_drawing_area();
            self.draw(series, root).map_err(plotting_error)?;
        }
        Ok(svg.into_bytes())
    }

    fn render_png(&self, series: &MetricsSeries) -> Result<Vec<u8>> {
        let (width, height) = (self.style.width, self.style.height);
        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        {
            let backend = BitMapBackend::with_buffer(&mut pixels, (width, height));
            let root = GlyphText::new(backend).into_drawing_area();
            self.draw(series, root).map_err(plotting_error)?;
        }

        let image = image::RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| DataError::Render("chart buffer does not match its size".to_string()))?;
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| DataError::Render(format!("PNG encoding error: {e}")))?;
        Ok(png)
    }
}

fn plotting_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> DataError {
    DataError::Render(format!("plotting error: {e}"))
}

impl ProfileRenderer for SpeedAltitudeChart {
    fn render_profile(&self, series: &MetricsSeries, out: &mut dyn Write) -> Result<()> {
        if series.is_empty() {
            return Err(DataError::EmptyProfile);
        }

        let bytes = match self.style.format {
            ChartFormat::Png => self.render_png(series)?,
            ChartFormat::Svg => self.render_svg(series)?,
        };
        out.write_all(&bytes)?;
        tracing::debug!(
            "Rendered {:?} chart with {} samples",
            self.style.format,
            series.len()
        );
        Ok(())
    }
}

/// Altitude axis range over the known values, padded; `0..1` when none is known
fn altitude_range(altitude: &[Option<f64>]) -> (f64, f64) {
    let known = altitude.iter().flatten().copied();
    let (min, max) = known.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| {
        (lo.min(a), hi.max(a))
    });

    if !min.is_finite() {
        (0.0, 1.0)
    } else if max - min < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}

/// Split the altitude line wherever the altitude is unknown
fn altitude_runs(distance_km: &[f64], altitude: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (&x, y) in distance_km.iter().zip(altitude) {
        match y {
            Some(y) => current.push((x, *y)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}
