//! Map polylines derived from a recorded session
//!
//! This module provides the `Track` struct: one coordinate polyline per recording
//! group, plus the initial map focus point.

use crate::{DataError, RecordDocument, RecordingGroup, Result, Token};
use geo::{Point, Rect};
use rayon::prelude::*;

/// One recording group reduced to the coordinates needed for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct TrackGroup {
    pub group_no: Token,
    pub start_time: Option<Token>,
    pub end_time: Option<Token>,
    /// Usable positions in recorded order (x = longitude, y = latitude)
    pub points: Vec<Point<f64>>,
}

impl TrackGroup {
    /// Keep only samples that have both coordinates; nothing is substituted for the rest
    fn from_group(group: &RecordingGroup) -> Self {
        Self {
            group_no: group.group_no.clone(),
            start_time: group.start_time.clone(),
            end_time: group.end_time.clone(),
            points: group.samples.iter().filter_map(|s| s.position()).collect(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// All recording groups as polylines, in document order
///
/// A `Track` always has a focus point: construction fails if the first group has no
/// usable position.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    groups: Vec<TrackGroup>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Build the polyline groups for a document
    ///
    /// Groups without any usable point are kept (their identity and time window may still
    /// matter to a renderer), except for the first group, which must provide the focus.
    pub fn load(document: &RecordDocument) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::load");

        if document.groups().is_empty() {
            return Err(DataError::EmptyTrack("document has no groups".to_string()));
        }

        let groups: Vec<TrackGroup> = document
            .groups()
            .par_iter()
            .map(TrackGroup::from_group)
            .collect();

        if groups[0].is_empty() {
            return Err(DataError::EmptyTrack(format!(
                "first group ({}) has no sample with both latitude and longitude",
                groups[0].group_no
            )));
        }

        for group in &groups {
            tracing::debug!("Group {}: {} usable points", group.group_no, group.points.len());
        }

        Ok(Self { groups })
    }

    /// Groups in document order
    #[inline]
    pub fn groups(&self) -> &[TrackGroup] {
        &self.groups
    }

    /// Initial map focus: the first usable position of the first group
    #[inline]
    pub fn focus(&self) -> Point<f64> {
        // Non-empty by construction, see `Track::load`
        self.groups[0].points[0]
    }

    /// Bounding box of every point in WGS84 degrees (x = longitude, y = latitude)
    pub fn bounding_box(&self) -> Rect<f64> {
        let focus = self.focus();
        let (mut min_x, mut min_y) = (focus.x(), focus.y());
        let (mut max_x, mut max_y) = (min_x, min_y);

        for point in self.groups.iter().flat_map(|g| g.points.iter()) {
            min_x = min_x.min(point.x());
            min_y = min_y.min(point.y());
            max_x = max_x.max(point.x());
            max_y = max_y.max(point.y());
        }

        Rect::new(
            geo::Coord { x: min_x, y: min_y },
            geo::Coord { x: max_x, y: max_y },
        )
    }

    /// Convert to GPX: one track per group, each with a single segment
    pub fn to_gpx(&self) -> gpx::Gpx {
        let mut out = gpx::Gpx::default();
        out.version = gpx::GpxVersion::Gpx11;
        out.creator = Some(concat!("track-profile ", env!("CARGO_PKG_VERSION")).to_string());

        for group in &self.groups {
            let mut segment = gpx::TrackSegment::default();
            segment
                .points
                .extend(group.points.iter().map(|p| gpx::Waypoint::new(*p)));

            let mut track = gpx::Track::default();
            track.name = Some(format!("Group {}", group.group_no));
            track.segments.push(segment);
            out.tracks.push(track);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocationSample;

    fn create_test_sample(lat: f64, lon: f64) -> LocationSample {
        LocationSample::new(lat, lon, 1.0, 10.0)
    }

    fn null_coordinates() -> LocationSample {
        LocationSample {
            latitude: None,
            longitude: None,
            speed: Some(1.0),
            altitude: Some(10.0),
        }
    }

    fn create_test_document() -> RecordDocument {
        RecordDocument::new(vec![
            RecordingGroup::new(
                1,
                vec![
                    create_test_sample(51.5074, -0.1278),
                    null_coordinates(),
                    create_test_sample(51.5076, -0.1276),
                ],
            ),
            RecordingGroup::new(2, vec![null_coordinates()]),
            RecordingGroup::new(3, vec![create_test_sample(51.5078, -0.1274)]),
        ])
    }

    #[test]
    fn test_track_load() {
        let track = Track::load(&create_test_document()).unwrap();

        assert_eq!(track.groups().len(), 3);
        assert_eq!(
            track.groups()[0].points,
            vec![Point::new(-0.1278, 51.5074), Point::new(-0.1276, 51.5076)]
        );
        assert_eq!(track.groups()[2].points, vec![Point::new(-0.1274, 51.5078)]);
    }

    #[test]
    fn test_empty_groups_are_kept() {
        let track = Track::load(&create_test_document()).unwrap();

        let second = &track.groups()[1];
        assert_eq!(second.group_no, Token::from(2));
        assert!(second.is_empty());
    }

    #[test]
    fn test_focus_is_first_usable_point() {
        let doc = RecordDocument::new(vec![RecordingGroup::new(
            1,
            vec![null_coordinates(), create_test_sample(35.0, 139.0)],
        )]);
        let track = Track::load(&doc).unwrap();
        assert_eq!(track.focus(), Point::new(139.0, 35.0));
    }

    #[test]
    fn test_no_groups_fails() {
        let result = Track::load(&RecordDocument::default());
        assert!(matches!(result, Err(DataError::EmptyTrack(_))));
    }

    #[test]
    fn test_first_group_without_coordinates_fails() {
        // Later groups having valid points does not help
        let doc = RecordDocument::new(vec![
            RecordingGroup::new(1, vec![null_coordinates(), null_coordinates()]),
            RecordingGroup::new(2, vec![create_test_sample(35.0, 139.0)]),
        ]);
        let result = Track::load(&doc);
        assert!(matches!(result, Err(DataError::EmptyTrack(_))));
    }

    #[test]
    fn test_half_coordinates_are_skipped() {
        let lat_only = LocationSample {
            longitude: None,
            ..create_test_sample(1.0, 2.0)
        };
        let doc = RecordDocument::new(vec![RecordingGroup::new(
            1,
            vec![create_test_sample(1.0, 2.0), lat_only],
        )]);
        let track = Track::load(&doc).unwrap();
        assert_eq!(track.groups()[0].points, vec![Point::new(2.0, 1.0)]);
    }

    #[test]
    fn test_bounding_box() {
        let track = Track::load(&create_test_document()).unwrap();

        let bbox = track.bounding_box();
        assert_eq!(bbox.min(), geo::Coord { x: -0.1278, y: 51.5074 });
        assert_eq!(bbox.max(), geo::Coord { x: -0.1274, y: 51.5078 });
    }

    #[test]
    fn test_to_gpx() {
        let track = Track::load(&create_test_document()).unwrap();
        let gpx = track.to_gpx();

        assert_eq!(gpx.tracks.len(), 3);
        assert_eq!(gpx.tracks[0].name.as_deref(), Some("Group 1"));
        assert_eq!(gpx.tracks[0].segments[0].points.len(), 2);
        assert!(gpx.tracks[1].segments[0].points.is_empty());
        assert_eq!(gpx.tracks[2].segments[0].points[0].point().y(), 51.5078);
    }
}
