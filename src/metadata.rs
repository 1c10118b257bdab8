//! Metadata response for an ingested raster

use serde::Serialize;

use crate::coordinate::{CoordinateReferenceId, RasterBounds};
use crate::errors::OverlayResult;

/// `{"bounds": {"left", "bottom", "right", "top"}, "epsg": <int|null>}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RasterMetadata {
    pub bounds: RasterBounds,
    pub epsg: Option<CoordinateReferenceId>,
}

impl RasterMetadata {
    pub fn new(bounds: RasterBounds, epsg: Option<CoordinateReferenceId>) -> Self {
        RasterMetadata { bounds, epsg }
    }

    pub fn to_json(&self) -> OverlayResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
