//! Overlay composition: pixel cube + bounds in, display image + placement out

use log::info;

use crate::coordinate::RasterBounds;
use crate::errors::OverlayResult;
use crate::overlay::display_image::DisplayImage;
use crate::overlay::placement::OverlayPlacement;
use crate::raster::PixelCube;

/// Result of compositing one raster
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub image: DisplayImage,
    pub placement: OverlayPlacement,
}

/// Turns ingested rasters into displayable, placed overlays
pub struct OverlayCompositor;

impl OverlayCompositor {
    pub fn composite(cube: &PixelCube, bounds: &RasterBounds) -> OverlayResult<Composite> {
        let image = DisplayImage::from_cube(cube)?;
        let placement = OverlayPlacement::from_bounds(bounds);

        let center = placement.center();
        info!("Composited {}x{} overlay centered at ({}, {})",
              image.width(), image.height(), center.lat, center.lon);
        Ok(Composite { image, placement })
    }
}
