//! Standalone HTML map renderer.
//!
//! # Invariants
//! - Marker slots are reused after deletion; the generation counter makes
//!   old handles to a reused slot stale.
//! - Rendering never mutates marker state.

use super::{MapDisplay, MapError, MapResult, MarkerHandle};
use crate::model::geo::Coordinates;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Default full-map view centre.
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    latitude: 52.0,
    longitude: 21.0,
};
/// Default full-map zoom level.
pub const DEFAULT_ZOOM: u8 = 8;
/// Zoom level for a map centred on one location.
pub const SINGLE_LOCATION_ZOOM: u8 = 11;

const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Marker as it will appear in the rendered document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    marker: Option<RenderedMarker>,
}

/// Arena-backed map that renders to a Leaflet HTML page.
#[derive(Debug, Clone)]
pub struct LeafletMap {
    center: Coordinates,
    zoom: u8,
    slots: Vec<Slot>,
}

impl Default for LeafletMap {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM)
    }
}

impl LeafletMap {
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            slots: Vec::new(),
        }
    }

    /// Map centred on one location with a single marker labelled `label`.
    pub fn single_location(position: Coordinates, label: &str) -> MapResult<Self> {
        let mut map = Self::new(position, SINGLE_LOCATION_ZOOM);
        map.set_marker(position, label)?;
        Ok(map)
    }

    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Live markers in slot order.
    pub fn markers(&self) -> Vec<RenderedMarker> {
        self.slots
            .iter()
            .filter_map(|slot| slot.marker.clone())
            .collect()
    }

    pub fn marker_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.marker.is_some()).count()
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&RenderedMarker> {
        self.live_slot(handle).and_then(|slot| slot.marker.as_ref())
    }

    /// Renders a self-contained HTML document.
    pub fn render_html(&self) -> MapResult<String> {
        // `</` would close the inline script early.
        let markers = serde_json::to_string(&self.markers())?.replace("</", "<\\/");
        let center = serde_json::to_string(&[self.center.latitude, self.center.longitude])?;
        let tile_url = serde_json::to_string(TILE_URL)?;
        let attribution = serde_json::to_string(TILE_ATTRIBUTION)?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView({center}, {zoom});
L.tileLayer({tile_url}, {{ attribution: {attribution} }}).addTo(map);
var markers = {markers};
markers.forEach(function (m) {{
  L.marker([m.latitude, m.longitude]).bindPopup(document.createTextNode(m.label)).addTo(map);
}});
</script>
</body>
</html>
"#,
            zoom = self.zoom,
        ))
    }

    /// Writes the rendered document to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> MapResult<()> {
        let html = self.render_html()?;
        let io_error = |source| MapError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, html).map_err(io_error)?;
        info!(
            "event=map_save module=map status=ok markers={}",
            self.marker_count()
        );
        Ok(())
    }

    fn live_slot(&self, handle: MarkerHandle) -> Option<&Slot> {
        let index = usize::try_from(handle.index()).ok()?;
        self.slots
            .get(index)
            .filter(|slot| slot.generation == handle.generation() && slot.marker.is_some())
    }
}

impl MapDisplay for LeafletMap {
    fn set_marker(&mut self, position: Coordinates, label: &str) -> MapResult<MarkerHandle> {
        let marker = RenderedMarker {
            latitude: position.latitude,
            longitude: position.longitude,
            label: label.to_string(),
        };

        if let Some((index, slot)) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.marker.is_none())
        {
            slot.generation = slot.generation.wrapping_add(1);
            slot.marker = Some(marker);
            return Ok(MarkerHandle::new(slot_index(index), slot.generation));
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            marker: Some(marker),
        });
        Ok(MarkerHandle::new(slot_index(index), 0))
    }

    fn delete_marker(&mut self, handle: MarkerHandle) -> MapResult<()> {
        let slot = usize::try_from(handle.index())
            .ok()
            .and_then(|index| self.slots.get_mut(index))
            .filter(|slot| slot.generation == handle.generation() && slot.marker.is_some())
            .ok_or(MapError::UnknownMarker(handle))?;
        slot.marker = None;
        Ok(())
    }

    fn set_position(&mut self, position: Coordinates) {
        self.center = position;
    }

    fn set_zoom(&mut self, level: u8) {
        self.zoom = level;
    }
}

fn slot_index(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{LeafletMap, DEFAULT_CENTER, DEFAULT_ZOOM, SINGLE_LOCATION_ZOOM};
    use crate::map::{MapDisplay, MapError};
    use crate::model::geo::Coordinates;

    #[test]
    fn deleted_handle_becomes_stale_after_slot_reuse() {
        let mut map = LeafletMap::default();
        let first = map.set_marker(Coordinates::new(52.23, 21.01), "Jan").unwrap();
        map.delete_marker(first).unwrap();

        let second = map.set_marker(Coordinates::new(50.06, 19.94), "Anna").unwrap();
        assert_ne!(first, second);
        assert!(matches!(
            map.delete_marker(first),
            Err(MapError::UnknownMarker(handle)) if handle == first
        ));
        assert_eq!(map.marker(second).unwrap().label, "Anna");
        assert_eq!(map.marker_count(), 1);
    }

    #[test]
    fn single_location_map_is_centred_and_zoomed_in() {
        let position = Coordinates::new(52.23, 21.01);
        let map = LeafletMap::single_location(position, "Warszawa").unwrap();
        assert_eq!(map.center(), position);
        assert_eq!(map.zoom(), SINGLE_LOCATION_ZOOM);
        assert_eq!(map.markers()[0].label, "Warszawa");
    }

    #[test]
    fn view_defaults_and_setters() {
        let mut map = LeafletMap::default();
        assert_eq!(map.center(), DEFAULT_CENTER);
        assert_eq!(map.zoom(), DEFAULT_ZOOM);

        map.set_position(Coordinates::new(54.35, 18.65));
        map.set_zoom(11);
        assert_eq!(map.center(), Coordinates::new(54.35, 18.65));
        assert_eq!(map.zoom(), 11);
    }

    #[test]
    fn rendered_labels_are_json_escaped() {
        let mut map = LeafletMap::default();
        map.set_marker(Coordinates::new(52.23, 21.01), "</script><b>\"x\"")
            .unwrap();
        let html = map.render_html().unwrap();
        assert!(html.contains("setView([52.0,21.0], 8)"));
        assert!(html.contains(r#"\"x\""#));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maps").join("common_map.html");
        let mut map = LeafletMap::default();
        map.set_marker(Coordinates::new(52.23, 21.01), "Jan").unwrap();

        map.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"label\":\"Jan\""));
    }
}
