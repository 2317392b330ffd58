use super::MapRenderer;
use std::io::Write;
use track_profile_lib::{Result, Track};

/// GPX 1.1 export: one `<trk>` per recording group
#[derive(Debug, Clone, Copy, Default)]
pub struct GpxExport;

impl MapRenderer for GpxExport {
    fn render_map(&self, track: &Track, out: &mut dyn Write) -> Result<()> {
        gpx::write(&track.to_gpx(), out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_to_vec;
    use track_profile_lib::{LocationSample, RecordDocument, RecordingGroup};

    #[test]
    fn test_gpx_is_readable_back() {
        let doc = RecordDocument::new(vec![
            RecordingGroup::new(
                1,
                vec![
                    LocationSample::new(35.0, 139.0, 1.0, 10.0),
                    LocationSample::new(35.001, 139.001, 1.0, 11.0),
                ],
            ),
            RecordingGroup::new(2, vec![LocationSample::new(35.002, 139.002, 1.0, 12.0)]),
        ]);
        let track = Track::load(&doc).unwrap();

        let bytes = render_to_vec(|out| GpxExport.render_map(&track, out)).unwrap();
        let parsed = gpx::read(bytes.as_slice()).unwrap();

        assert_eq!(parsed.tracks.len(), 2);
        assert_eq!(parsed.tracks[1].name.as_deref(), Some("Group 2"));
        let first = &parsed.tracks[0].segments[0].points;
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].point().x(), 139.001);
        assert_eq!(first[1].point().y(), 35.001);
    }
}
