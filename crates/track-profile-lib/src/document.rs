//! Recorded session document: parsing and validation
//!
//! This module provides the `RecordDocument` model of the grouped location records.
//! The whole structure is validated eagerly when the document is built, so every later
//! stage can walk it without re-checking shapes. Errors carry the JSON path of the
//! offending value.

use crate::{DataError, Result};
use geo::Point;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Opaque identifier or timestamp token, kept exactly as recorded
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Token {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for Token {
    fn from(value: i32) -> Self {
        Token::Number(value.into())
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::Text(value.to_string())
    }
}

/// A single location measurement; every field may be missing
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocationSample {
    /// Degrees, signed
    pub latitude: Option<f64>,
    /// Degrees, signed
    pub longitude: Option<f64>,
    /// Meters per second
    pub speed: Option<f64>,
    /// Meters
    pub altitude: Option<f64>,
}

impl LocationSample {
    /// Create a fully populated sample
    pub fn new(latitude: f64, longitude: f64, speed: f64, altitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            speed: Some(speed),
            altitude: Some(altitude),
        }
    }

    /// Position as a geo point (x = longitude, y = latitude), if both coordinates are present
    #[inline]
    pub fn position(&self) -> Option<Point<f64>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Point::new(lon, lat)),
            _ => None,
        }
    }

    fn from_value(value: &Value, path: &str) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| DataError::malformed(path, expected("an object", value)))?;

        let field = |name: &str| -> Result<Option<f64>> {
            match object.get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => v.as_f64().map(Some).ok_or_else(|| {
                    DataError::malformed(format!("{path}.{name}"), expected("a number or null", v))
                }),
            }
        };

        Ok(Self {
            latitude: field("latitude")?,
            longitude: field("longitude")?,
            speed: field("speed")?,
            altitude: field("altitude")?,
        })
    }
}

/// One recording session segment (e.g. between a pause and a resume)
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingGroup {
    pub group_no: Token,
    pub start_time: Option<Token>,
    pub end_time: Option<Token>,
    /// Samples in chronological order
    pub samples: Vec<LocationSample>,
}

impl RecordingGroup {
    /// Create a group without time bounds
    pub fn new(group_no: impl Into<Token>, samples: Vec<LocationSample>) -> Self {
        Self {
            group_no: group_no.into(),
            start_time: None,
            end_time: None,
            samples,
        }
    }

    fn from_value(value: &Value, path: &str) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| DataError::malformed(path, expected("an object", value)))?;

        let group_no_path = format!("{path}.groupNo");
        let group_no = match object.get("groupNo") {
            None => return Err(DataError::malformed(group_no_path, "missing field")),
            Some(v) => token(v).ok_or_else(|| {
                DataError::malformed(&group_no_path, expected("a number or string", v))
            })?,
        };

        // The keys must be present; `null` marks an unknown bound
        let time = |name: &str| -> Result<Option<Token>> {
            let time_path = format!("{path}.{name}");
            match object.get(name) {
                None => Err(DataError::malformed(time_path, "missing field")),
                Some(Value::Null) => Ok(None),
                Some(v) => token(v).map(Some).ok_or_else(|| {
                    DataError::malformed(time_path, expected("a number, string or null", v))
                }),
            }
        };
        let start_time = time("startTime")?;
        let end_time = time("endTime")?;

        let data_path = format!("{path}.locationData");
        let location_data = object
            .get("locationData")
            .ok_or_else(|| DataError::malformed(&data_path, "missing field"))?;
        let location_data = location_data
            .as_array()
            .ok_or_else(|| DataError::malformed(&data_path, expected("an array", location_data)))?;

        let samples = location_data
            .iter()
            .enumerate()
            .map(|(i, sample)| LocationSample::from_value(sample, &format!("{data_path}[{i}]")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            group_no,
            start_time,
            end_time,
            samples,
        })
    }
}

/// A fully validated recorded session: `totalRecord.groups` in document order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordDocument {
    groups: Vec<RecordingGroup>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RecordDocument {
    /// Create a document from already built groups
    pub fn new(groups: Vec<RecordingGroup>) -> Self {
        Self { groups }
    }

    /// Parse and validate a JSON document held in memory
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Parse and validate a JSON document from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    /// Read, parse and validate a JSON document from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Validate a generic JSON value and convert it into the typed model
    ///
    /// Groups are independent, so they are validated in parallel. The resulting
    /// order is always the document order.
    pub fn from_value(value: Value) -> Result<Self> {
        #[cfg(feature = "profiling")]
        profiling::scope!("document::from_value");

        let record = value
            .get("totalRecord")
            .ok_or_else(|| DataError::malformed("totalRecord", "missing field"))?;
        if !record.is_object() {
            return Err(DataError::malformed("totalRecord", expected("an object", record)));
        }

        let groups = record
            .get("groups")
            .ok_or_else(|| DataError::malformed("totalRecord.groups", "missing field"))?;
        let groups = groups
            .as_array()
            .ok_or_else(|| DataError::malformed("totalRecord.groups", expected("an array", groups)))?;

        let groups = groups
            .par_iter()
            .enumerate()
            .map(|(i, group)| RecordingGroup::from_value(group, &format!("totalRecord.groups[{i}]")))
            .collect::<Result<Vec<_>>>()?;

        let document = Self { groups };
        tracing::debug!(
            "Loaded document with {} groups and {} samples",
            document.groups.len(),
            document.total_samples()
        );
        Ok(document)
    }

    /// All groups in document order
    #[inline]
    pub fn groups(&self) -> &[RecordingGroup] {
        &self.groups
    }

    /// Every sample of every group, in document order
    pub fn samples(&self) -> impl Iterator<Item = &LocationSample> {
        self.groups.iter().flat_map(|group| group.samples.iter())
    }

    /// Total number of samples across all groups
    pub fn total_samples(&self) -> usize {
        self.groups.iter().map(|group| group.samples.len()).sum()
    }
}

fn token(value: &Value) -> Option<Token> {
    match value {
        Value::Number(n) => Some(Token::Number(n.clone())),
        Value::String(s) => Some(Token::Text(s.clone())),
        _ => None,
    }
}

fn expected(what: &str, found: &Value) -> String {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("expected {what}, found {kind}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DOCUMENT: &str = r#"{
        "totalRecord": {
            "groups": [
                {
                    "groupNo": 1,
                    "startTime": "2025-11-15T00:31:24Z",
                    "endTime": "2025-11-15T00:45:02Z",
                    "locationData": [
                        {"latitude": 35.0, "longitude": 139.0, "speed": 1.5, "altitude": 12.0},
                        {"latitude": null, "longitude": 139.1, "speed": 1.0, "altitude": 13.0},
                        {"latitude": 35.1, "longitude": 139.1, "speed": null}
                    ]
                },
                {
                    "groupNo": "B",
                    "startTime": 1731630684,
                    "endTime": null,
                    "locationData": []
                }
            ]
        }
    }"#;

    fn assert_malformed_at(json: &str, expected_path: &str) {
        match RecordDocument::from_json_str(json) {
            Err(DataError::MalformedInput { path, .. }) => assert_eq!(path, expected_path),
            other => panic!("expected MalformedInput at {expected_path}, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_document() {
        let doc = RecordDocument::from_json_str(SAMPLE_DOCUMENT).unwrap();

        assert_eq!(doc.groups().len(), 2);
        assert_eq!(doc.total_samples(), 3);

        let first = &doc.groups()[0];
        assert_eq!(first.group_no.to_string(), "1");
        assert_eq!(
            first.start_time,
            Some(Token::Text("2025-11-15T00:31:24Z".to_string()))
        );
        assert_eq!(first.samples[0], LocationSample::new(35.0, 139.0, 1.5, 12.0));
        assert_eq!(first.samples[1].latitude, None);
        assert_eq!(first.samples[2].altitude, None);

        let second = &doc.groups()[1];
        assert_eq!(second.group_no, Token::from("B"));
        assert_eq!(second.start_time.as_ref().map(|t| t.to_string()), Some("1731630684".to_string()));
        assert_eq!(second.end_time, None);
        assert!(second.samples.is_empty());
    }

    #[test]
    fn test_samples_are_in_document_order() {
        let doc = RecordDocument::from_json_str(SAMPLE_DOCUMENT).unwrap();
        let lats: Vec<Option<f64>> = doc.samples().map(|s| s.latitude).collect();
        assert_eq!(lats, vec![Some(35.0), None, Some(35.1)]);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{"totalRecord": {"version": 3, "groups": [
            {"groupNo": 0, "startTime": null, "endTime": null, "pauses": [],
             "locationData": [{"latitude": 1.0, "longitude": 2.0, "accuracy": 5}]}
        ]}}"#;
        let doc = RecordDocument::from_json_str(json).unwrap();
        assert_eq!(doc.groups()[0].samples[0].position(), Some(Point::new(2.0, 1.0)));
    }

    #[test]
    fn test_missing_total_record() {
        assert_malformed_at(r#"{"groups": []}"#, "totalRecord");
        assert_malformed_at(r#"[1, 2, 3]"#, "totalRecord");
        assert_malformed_at(r#"{"totalRecord": 5}"#, "totalRecord");
    }

    #[test]
    fn test_missing_or_wrong_groups() {
        assert_malformed_at(r#"{"totalRecord": {}}"#, "totalRecord.groups");
        assert_malformed_at(r#"{"totalRecord": {"groups": {}}}"#, "totalRecord.groups");
    }

    #[test]
    fn test_bad_group_fields() {
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [
                {"groupNo": 1, "startTime": null, "endTime": null, "locationData": []}, 7
            ]}}"#,
            "totalRecord.groups[1]",
        );
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [{"startTime": null, "endTime": null, "locationData": []}]}}"#,
            "totalRecord.groups[0].groupNo",
        );
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [{"groupNo": true, "locationData": []}]}}"#,
            "totalRecord.groups[0].groupNo",
        );
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [{"groupNo": 1, "startTime": [], "locationData": []}]}}"#,
            "totalRecord.groups[0].startTime",
        );
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [{"groupNo": 1, "startTime": null, "endTime": null}]}}"#,
            "totalRecord.groups[0].locationData",
        );
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [
                {"groupNo": 1, "startTime": null, "endTime": null, "locationData": "none"}
            ]}}"#,
            "totalRecord.groups[0].locationData",
        );
    }

    #[test]
    fn test_time_bounds_must_be_present() {
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [{"groupNo": 1, "endTime": null, "locationData": []}]}}"#,
            "totalRecord.groups[0].startTime",
        );
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [
                {"groupNo": 1, "startTime": "2025-11-15T00:31:24Z", "locationData": []}
            ]}}"#,
            "totalRecord.groups[0].endTime",
        );
    }

    #[test]
    fn test_bad_sample_fields() {
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [{"groupNo": 1, "startTime": null, "endTime": null, "locationData": [
                {"latitude": 1.0, "longitude": 2.0},
                {"latitude": 1.0, "longitude": 2.0, "speed": "fast"}
            ]}]}}"#,
            "totalRecord.groups[0].locationData[1].speed",
        );
        assert_malformed_at(
            r#"{"totalRecord": {"groups": [
                {"groupNo": 1, "startTime": null, "endTime": null, "locationData": [null]}
            ]}}"#,
            "totalRecord.groups[0].locationData[0]",
        );
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let result = RecordDocument::from_json_str("{ not json");
        assert!(matches!(result, Err(DataError::Json(_))));
    }

    #[test]
    fn test_sample_position() {
        let complete = LocationSample::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(complete.position(), Some(Point::new(2.0, 1.0)));

        let no_longitude = LocationSample {
            longitude: None,
            ..complete
        };
        assert!(no_longitude.position().is_none());

        let no_latitude = LocationSample {
            latitude: None,
            ..complete
        };
        assert!(no_latitude.position().is_none());
    }

    #[test]
    fn test_from_reader() {
        let doc = RecordDocument::from_reader(SAMPLE_DOCUMENT.as_bytes()).unwrap();
        assert_eq!(doc.groups().len(), 2);
    }
}
