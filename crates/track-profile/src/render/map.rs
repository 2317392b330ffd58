//! Leaflet map document
//!
//! The polylines are embedded as a GeoJSON FeatureCollection, one LineString per
//! recording group. Groups without usable points become features with a `null`
//! geometry, which Leaflet skips, so the group still appears in the data.

use super::MapRenderer;
use maud::{DOCTYPE, PreEscaped, html};
use serde_json::{Value, json};
use std::io::Write;
use track_profile_lib::{Result, Track, TrackGroup};

const LEAFLET_VERSION: &str = "1.9.4";

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TilesProvider {
    #[value(name = "osm")]
    OpenStreetMap,
    #[value(name = "opentopomap")]
    OpenTopoMap,
    #[value(name = "cyclosm")]
    CyclOSM,
}

impl TilesProvider {
    pub fn url(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            Self::OpenTopoMap => "https://tile.opentopomap.org/{z}/{x}/{y}.png",
            Self::CyclOSM => "https://a.tile-cyclosm.openstreetmap.fr/cyclosm/{z}/{x}/{y}.png",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
            Self::CyclOSM => "© CyclOSM & OpenStreetMap contributors",
        }
    }

    pub fn max_zoom(&self) -> u8 {
        match self {
            Self::OpenStreetMap => 19,
            Self::OpenTopoMap => 17,
            Self::CyclOSM => 20,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
            Self::CyclOSM => "CyclOSM",
        }
    }
}

/// Visual options for the map document
#[derive(Clone, Debug, PartialEq)]
pub struct MapStyle {
    pub tiles: TilesProvider,
    /// Initial zoom around the focus point
    pub zoom: u8,
    /// Fit the view to every point after focusing
    pub fit_bounds: bool,
    /// Polyline width in pixels
    pub line_weight: f64,
    pub line_opacity: f64,
    pub title: String,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            tiles: TilesProvider::OpenStreetMap,
            zoom: 14,
            fit_bounds: false,
            line_weight: 4.0,
            line_opacity: 0.8,
            title: "Recorded track".to_string(),
        }
    }
}

/// Self-contained HTML page showing the track on a Leaflet map
#[derive(Clone, Debug, Default)]
pub struct LeafletMap {
    pub style: MapStyle,
}

impl LeafletMap {
    pub fn new(style: MapStyle) -> Self {
        Self { style }
    }

    /// The polylines as a GeoJSON FeatureCollection (coordinates are `[lon, lat]`)
    pub fn feature_collection(track: &Track) -> Value {
        let features: Vec<Value> = track.groups().iter().map(group_feature).collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

fn group_feature(group: &TrackGroup) -> Value {
    let geometry = if group.is_empty() {
        Value::Null
    } else {
        let coordinates: Vec<[f64; 2]> = group.points.iter().map(|p| [p.x(), p.y()]).collect();
        json!({ "type": "LineString", "coordinates": coordinates })
    };

    json!({
        "type": "Feature",
        "properties": {
            "groupNo": group.group_no,
            "startTime": group.start_time,
            "endTime": group.end_time,
            "popup": format!("Group {}", group.group_no),
        },
        "geometry": geometry,
    })
}

/// Serialize a value for inline use in a `<script>` element
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

impl MapRenderer for LeafletMap {
    fn render_map(&self, track: &Track, out: &mut dyn Write) -> Result<()> {
        let style = &self.style;
        let focus = track.focus();

        let fit_bounds = if style.fit_bounds {
            let bbox = track.bounding_box();
            format!(
                "map.fitBounds([[{}, {}], [{}, {}]]);\n",
                bbox.min().y,
                bbox.min().x,
                bbox.max().y,
                bbox.max().x
            )
        } else {
            String::new()
        };

        let script = format!(
            r#"
const track = {features};
const map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer({tiles_url}, {{ maxZoom: {max_zoom}, attribution: {attribution} }}).addTo(map);
L.geoJSON(track, {{
  style: {{ weight: {weight}, opacity: {opacity} }},
  onEachFeature: (feature, layer) => layer.bindPopup(feature.properties.popup),
}}).addTo(map);
{fit_bounds}"#,
            features = script_json(&Self::feature_collection(track)),
            lat = focus.y(),
            lon = focus.x(),
            zoom = style.zoom,
            tiles_url = script_json(&json!(style.tiles.url())),
            max_zoom = style.tiles.max_zoom(),
            attribution = script_json(&json!(style.tiles.attribution())),
            weight = style.line_weight,
            opacity = style.line_opacity,
        );

        let leaflet = format!("https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet");
        let page = html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (style.title) }
                    link rel="stylesheet" href={ (leaflet) ".css" };
                    script src={ (leaflet) ".js" } {}
                    style { "html, body, #map { height: 100%; margin: 0; }" }
                }
                body {
                    div id="map" {}
                    script { (PreEscaped(script)) }
                }
            }
        };
        out.write_all(page.into_string().as_bytes())?;

        tracing::debug!(
            "Rendered {} map with {} groups around ({}, {})",
            style.tiles.name(),
            track.groups().len(),
            focus.y(),
            focus.x()
        );
        Ok(())
    }
}
