//! Map sinks: render a placed overlay on top of a base map

use log::info;
use std::path::Path;

use crate::config::MapConfig;
use crate::coordinate::midpoint;
use crate::errors::{OverlayError, OverlayResult};
use crate::utils::write_utils;

/// Leaflet release loaded by rendered documents
const LEAFLET_VERSION: &str = "1.9.4";

/// Something that can show an image overlay at geographic bounds
pub trait MapSink {
    /// Place `image` (a path or URL) over `bounds` = `[[south, west], [north, east]]`
    fn add_overlay(&self, image: &str, bounds: [[f64; 2]; 2], opacity: f64) -> OverlayResult<RenderedMap>;
}

/// A rendered, self-contained map document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMap {
    html: String,
}

impl RenderedMap {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn save(&self, path: &Path) -> OverlayResult<()> {
        write_utils::write_atomic(path, self.html.as_bytes())?;
        info!("Saved map document to {}", path.display());
        Ok(())
    }
}

/// Renders overlays as a Leaflet HTML page
#[derive(Debug, Clone, PartialEq)]
pub struct LeafletMapSink {
    tile_url: String,
    attribution: String,
    max_zoom: u8,
}

impl LeafletMapSink {
    pub fn new(config: &MapConfig) -> Self {
        LeafletMapSink {
            tile_url: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            max_zoom: config.max_zoom,
        }
    }
}

/// Encode a value as a JavaScript literal that is safe inside a script tag
fn js_literal<T: serde::Serialize + ?Sized>(value: &T) -> OverlayResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

impl MapSink for LeafletMapSink {
    fn add_overlay(&self, image: &str, bounds: [[f64; 2]; 2], opacity: f64) -> OverlayResult<RenderedMap> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(OverlayError::Config(format!("opacity {} is outside [0, 1]", opacity)));
        }
        if bounds.iter().flatten().any(|v| !v.is_finite()) {
            return Err(OverlayError::MalformedRaster(format!("non-finite overlay bounds {:?}", bounds)));
        }

        let center = [midpoint(bounds[0][0], bounds[1][0]), midpoint(bounds[0][1], bounds[1][1])];

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Raster overlay</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const bounds = {bounds};
const map = L.map('map');
L.tileLayer({tile_url}, {{ maxZoom: {max_zoom}, attribution: {attribution} }}).addTo(map);
L.imageOverlay({image}, bounds, {{ opacity: {opacity} }}).addTo(map);
L.marker({center}).addTo(map);
map.fitBounds(bounds);
</script>
</body>
</html>
"#,
            version = LEAFLET_VERSION,
            bounds = js_literal(&bounds)?,
            tile_url = js_literal(&self.tile_url)?,
            max_zoom = self.max_zoom,
            attribution = js_literal(&self.attribution)?,
            image = js_literal(image)?,
            opacity = opacity,
            center = js_literal(&center)?,
        );

        Ok(RenderedMap { html })
    }
}
