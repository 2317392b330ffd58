//! Distance-indexed speed and altitude profile
//!
//! The profile is built by a single sequential fold over every sample of the document.
//! Group boundaries do not reset the odometer: distance is cumulative over the whole
//! recording.

use crate::distance::haversine_between;
use crate::{LocationSample, RecordDocument};
use geo::Point;
use serde::Serialize;

/// Meters per second to kilometers per hour
const MS_TO_KMH: f64 = 3.6;

/// Fold state for the running distance: last accepted position and total so far
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Odometer {
    last: Option<Point<f64>>,
    total_m: f64,
}

impl Odometer {
    /// Move to `position`, returning the new state
    ///
    /// The first position starts the odometer at zero; every later one adds the
    /// great-circle distance from the previous accepted position.
    #[must_use]
    pub fn advance(self, position: Point<f64>) -> Self {
        let step = self
            .last
            .map_or(0.0, |last| haversine_between(&last, &position));
        Self {
            last: Some(position),
            total_m: self.total_m + step,
        }
    }

    /// Cumulative distance in meters
    #[inline]
    pub fn total_m(&self) -> f64 {
        self.total_m
    }
}

/// One accepted sample of the profile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileRow {
    pub distance_m: f64,
    pub speed_kmh: f64,
    pub altitude_m: Option<f64>,
}

/// Three parallel series of equal length; index `i` refers to the same accepted sample
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsSeries {
    cumulative_distance_m: Vec<f64>,
    speed_kmh: Vec<f64>,
    altitude_m: Vec<Option<f64>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MetricsSeries {
    /// Extract the profile from every sample of the document, in document order
    ///
    /// Samples without latitude, longitude or speed are skipped entirely: they add no
    /// distance, no row, and do not move the odometer. A missing altitude is not a skip
    /// condition and is kept as `None`.
    pub fn extract(document: &RecordDocument) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("metrics::extract");

        let capacity = document.total_samples();
        let init = (
            Odometer::default(),
            Self {
                cumulative_distance_m: Vec::with_capacity(capacity),
                speed_kmh: Vec::with_capacity(capacity),
                altitude_m: Vec::with_capacity(capacity),
            },
        );

        let (_, series) = document
            .samples()
            .fold(init, |(odometer, mut series), sample| {
                match accepted(sample) {
                    Some((position, speed)) => {
                        let odometer = odometer.advance(position);
                        series.push(ProfileRow {
                            distance_m: odometer.total_m(),
                            speed_kmh: speed * MS_TO_KMH,
                            altitude_m: sample.altitude,
                        });
                        (odometer, series)
                    }
                    None => (odometer, series),
                }
            });

        let skipped = capacity - series.len();
        if skipped > 0 {
            tracing::debug!("Skipped {skipped} of {capacity} samples missing position or speed");
        }
        series
    }

    fn push(&mut self, row: ProfileRow) {
        self.cumulative_distance_m.push(row.distance_m);
        self.speed_kmh.push(row.speed_kmh);
        self.altitude_m.push(row.altitude_m);
    }

    /// Cumulative distance in meters; starts at 0 and never decreases
    #[inline]
    pub fn cumulative_distance_m(&self) -> &[f64] {
        &self.cumulative_distance_m
    }

    /// Cumulative distance in kilometers
    pub fn distance_km(&self) -> Vec<f64> {
        self.cumulative_distance_m
            .iter()
            .map(|d| d / 1000.0)
            .collect()
    }

    /// Speed in kilometers per hour
    #[inline]
    pub fn speed_kmh(&self) -> &[f64] {
        &self.speed_kmh
    }

    /// Altitude in meters, `None` where the accepted sample had none
    #[inline]
    pub fn altitude_m(&self) -> &[Option<f64>] {
        &self.altitude_m
    }

    /// Number of accepted samples
    #[inline]
    pub fn len(&self) -> usize {
        self.speed_kmh.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.speed_kmh.is_empty()
    }

    /// Total distance covered in meters
    pub fn total_distance_m(&self) -> f64 {
        self.cumulative_distance_m.last().copied().unwrap_or(0.0)
    }

    /// Iterate the series row by row
    pub fn rows(&self) -> impl Iterator<Item = ProfileRow> + '_ {
        self.cumulative_distance_m
            .iter()
            .zip(&self.speed_kmh)
            .zip(&self.altitude_m)
            .map(|((&distance_m, &speed_kmh), &altitude_m)| ProfileRow {
                distance_m,
                speed_kmh,
                altitude_m,
            })
    }
}

fn accepted(sample: &LocationSample) -> Option<(Point<f64>, f64)> {
    Some((sample.position()?, sample.speed?))
}

/// Aggregate figures over a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileSummary {
    /// Number of accepted samples
    pub samples: usize,
    /// Total distance in meters
    pub total_distance_m: f64,
    pub max_speed_kmh: f64,
    /// Arithmetic mean over accepted samples
    pub mean_speed_kmh: f64,
    pub min_altitude_m: Option<f64>,
    pub max_altitude_m: Option<f64>,
    /// Sum of positive altitude steps between consecutive known altitudes
    pub total_ascent_m: f64,
}

impl ProfileSummary {
    pub fn from_series(series: &MetricsSeries) -> Self {
        if series.is_empty() {
            return Self::default();
        }

        let speeds = series.speed_kmh();
        let max_speed_kmh = speeds.iter().copied().fold(0.0, f64::max);
        let mean_speed_kmh = speeds.iter().sum::<f64>() / speeds.len() as f64;

        let altitudes: Vec<f64> = series.altitude_m().iter().flatten().copied().collect();
        let min_altitude_m = altitudes.iter().copied().reduce(f64::min);
        let max_altitude_m = altitudes.iter().copied().reduce(f64::max);
        let total_ascent_m: f64 = altitudes
            .windows(2)
            .map(|w| (w[1] - w[0]).max(0.0))
            .sum();

        Self {
            samples: series.len(),
            total_distance_m: series.total_distance_m(),
            max_speed_kmh,
            mean_speed_kmh,
            min_altitude_m,
            max_altitude_m,
            total_ascent_m,
        }
    }
}
