//! Raster ingestion: one scoped file handle in, bounds + CRS + pixels out

use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::coordinate::{CoordinateReferenceId, GeoTransform, RasterBounds};
use crate::errors::{OverlayError, OverlayResult};
use crate::io::seekable::SeekableReader;
use crate::metadata::RasterMetadata;
use crate::raster::band_reader::BandReader;
use crate::raster::layout::RasterLayout;
use crate::raster::pixel_cube::PixelCube;
use crate::tiff::errors::TiffError;
use crate::tiff::geo_keys::GeoKeyParser;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Everything extracted from one raster
#[derive(Debug, Clone, PartialEq)]
pub struct RasterScene {
    pub bounds: RasterBounds,
    pub crs: Option<CoordinateReferenceId>,
    pub cube: PixelCube,
}

impl RasterScene {
    pub fn metadata(&self) -> RasterMetadata {
        RasterMetadata::new(self.bounds, self.crs)
    }
}

/// Reads GeoTIFF rasters into [`RasterScene`]s
#[derive(Debug, Clone, Default)]
pub struct RasterIngestor {
    require_geographic_crs: bool,
    show_progress: bool,
}

impl RasterIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject rasters whose CRS is absent or not longitude/latitude
    pub fn with_geographic_guard(mut self, enabled: bool) -> Self {
        self.require_geographic_crs = enabled;
        self
    }

    /// Draw a progress bar while decoding pixel blocks
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Ingest the raster at `path`
    ///
    /// The file is opened once and closed before this returns, on success
    /// and on every error path.
    pub fn ingest(&self, path: &Path) -> OverlayResult<RasterScene> {
        let scene = {
            let mut reader = Self::open(path)?;
            self.ingest_from(&mut reader)?
        };

        info!("Ingested {}: {}x{} pixels, bounds {:?}, CRS {}",
              path.display(), scene.cube.width(), scene.cube.height(), scene.bounds,
              scene.crs.map_or_else(|| "none".to_string(), |c| c.to_string()));
        Ok(scene)
    }

    /// Ingest a raster from an already opened stream
    pub fn ingest_from(&self, reader: &mut dyn SeekableReader) -> OverlayResult<RasterScene> {
        let (tiff_reader, ifd) = Self::read_main_ifd(reader)?;

        let layout = RasterLayout::from_ifd(&tiff_reader, reader, &ifd)?;
        let (bounds, crs) = self.read_georeference(&tiff_reader, reader, &ifd)?;

        let bands = BandReader::new(&tiff_reader, &ifd, &layout)
            .with_progress(self.show_progress)
            .read_bands(reader)?;
        let cube = PixelCube::from_bands(layout.height, layout.width, bands)?;

        Ok(RasterScene { bounds, crs, cube })
    }

    /// Read only the metadata response of the raster at `path`
    pub fn inspect(&self, path: &Path) -> OverlayResult<RasterMetadata> {
        let mut reader = Self::open(path)?;
        self.inspect_from(&mut reader)
    }

    /// Read bounds and CRS without decoding pixels
    pub fn inspect_from(&self, reader: &mut dyn SeekableReader) -> OverlayResult<RasterMetadata> {
        let (tiff_reader, ifd) = Self::read_main_ifd(reader)?;
        let (bounds, crs) = self.read_georeference(&tiff_reader, reader, &ifd)?;
        Ok(RasterMetadata::new(bounds, crs))
    }

    fn open(path: &Path) -> OverlayResult<BufReader<File>> {
        let file = File::open(path)
            .map_err(|e| OverlayError::io(format!("opening {}", path.display()), e))?;
        Ok(BufReader::new(file))
    }

    fn read_main_ifd(reader: &mut dyn SeekableReader) -> OverlayResult<(TiffReader, IFD)> {
        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(reader)?;
        let ifd = tiff.ifds.into_iter().next().ok_or(TiffError::NoImageDirectory)?;
        Ok((tiff_reader, ifd))
    }

    fn read_georeference(
        &self,
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> OverlayResult<(RasterBounds, Option<CoordinateReferenceId>)> {
        let geo_info = GeoKeyParser::extract_geo_info(tiff_reader, reader, ifd)?;
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;

        let bounds = GeoTransform::from_geo_info(&geo_info)?.bounds(width, height)?;
        let crs = geo_info.epsg().and_then(CoordinateReferenceId::from_epsg);

        if self.require_geographic_crs && !crs.is_some_and(|c| c.system().is_geographic()) {
            return Err(OverlayError::MalformedRaster(format!(
                "raster CRS {} is not geographic; overlay placement needs latitude/longitude bounds",
                crs.map_or_else(|| "(none)".to_string(), |c| c.to_string()))));
        }

        Ok((bounds, crs))
    }
}
