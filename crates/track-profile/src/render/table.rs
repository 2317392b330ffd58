use super::ProfileRenderer;
use serde::Serialize;
use std::io::Write;
use track_profile_lib::{DataError, MetricsSeries, Result};

/// CSV export of the profile, distance in kilometers
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileCsv;

#[derive(Serialize)]
struct CsvRow {
    distance_km: f64,
    speed_kmh: f64,
    altitude_m: Option<f64>,
}

impl ProfileRenderer for ProfileCsv {
    fn render_profile(&self, series: &MetricsSeries, out: &mut dyn Write) -> Result<()> {
        if series.is_empty() {
            return Err(DataError::EmptyProfile);
        }

        let csv_error = |e: csv::Error| DataError::Render(format!("CSV error: {e}"));
        let mut writer = csv::Writer::from_writer(out);
        for row in series.rows() {
            writer
                .serialize(CsvRow {
                    distance_km: row.distance_m / 1000.0,
                    speed_kmh: row.speed_kmh,
                    altitude_m: row.altitude_m,
                })
                .map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }
}
