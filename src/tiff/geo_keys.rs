//! GeoTIFF metadata and GeoKey parsing
//!
//! Georeferencing in a GeoTIFF lives in two places: the model tags
//! (pixel scale, tiepoints, transformation matrix) and the GeoKey
//! directory, a SHORT array whose keys name the coordinate reference
//! system and the raster space convention.

use log::debug;

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{epsg, geo_keys, raster_type, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// One entry of the GeoKey directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    /// 0 when the value is stored in `value_offset` itself
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

impl GeoKeyEntry {
    pub fn new(key_id: u16, tiff_tag_location: u16, count: u16, value_offset: u16) -> Self {
        Self { key_id, tiff_tag_location, count, value_offset }
    }

    /// The key's value when it is stored inline as a SHORT
    pub fn inline_value(&self) -> Option<u16> {
        if self.tiff_tag_location == 0 {
            Some(self.value_offset)
        } else {
            None
        }
    }
}

/// Get the name of a GeoKey
pub fn get_key_name(key_id: u16) -> &'static str {
    match key_id {
        geo_keys::MODEL_TYPE => "GTModelTypeGeoKey",
        geo_keys::RASTER_TYPE => "GTRasterTypeGeoKey",
        geo_keys::GEOGRAPHIC_TYPE => "GeographicTypeGeoKey",
        geo_keys::PROJECTED_CS_TYPE => "ProjectedCSTypeGeoKey",
        _ => "Unknown",
    }
}

/// Georeferencing values read from one IFD
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoInfo {
    /// ProjectedCSTypeGeoKey
    pub projected_cs_code: Option<u16>,
    /// GeographicTypeGeoKey
    pub geographic_cs_code: Option<u16>,
    /// GTRasterTypeGeoKey, PixelIsArea when absent
    pub raster_type: u16,
    /// ModelPixelScaleTag (sx, sy, sz)
    pub pixel_scale: Option<[f64; 3]>,
    /// First ModelTiepointTag entry (i, j, k, x, y, z)
    pub tie_point: Option<[f64; 6]>,
    /// ModelTransformationTag, 4x4 row-major
    pub transformation: Option<[f64; 16]>,
}

impl GeoInfo {
    /// EPSG code of the raster's coordinate reference system
    ///
    /// The projected code wins over the geographic one; 0 and the
    /// user-defined marker count as "not set".
    pub fn epsg(&self) -> Option<u32> {
        let registered = |code: &Option<u16>| {
            code.map(u32::from)
                .filter(|c| *c != 0 && *c != epsg::USER_DEFINED)
        };

        registered(&self.projected_cs_code).or_else(|| registered(&self.geographic_cs_code))
    }

    /// Whether the raster uses the PixelIsPoint convention
    pub fn is_pixel_is_point(&self) -> bool {
        self.raster_type == raster_type::PIXEL_IS_POINT
    }

    /// Whether any model tag needed for bounds is present
    pub fn is_georeferenced(&self) -> bool {
        self.transformation.is_some() || (self.pixel_scale.is_some() && self.tie_point.is_some())
    }
}

/// Parser for GeoTIFF geographic metadata
pub struct GeoKeyParser;

impl GeoKeyParser {
    /// Parse the GeoKey directory from an IFD
    ///
    /// The directory header is four SHORTs (version, revision, minor
    /// revision, key count) followed by four SHORTs per key. A missing
    /// directory yields an empty list.
    pub fn parse_geo_key_directory(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<Vec<GeoKeyEntry>> {
        if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            return Ok(Vec::new());
        }

        let values = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
        if values.len() < 4 {
            return Err(TiffError::Malformed("Invalid GeoKey directory header".to_string()));
        }

        let num_keys = values[3] as usize;
        debug!("GeoKey directory: version={}, revision={}.{}, keys={}",
               values[0], values[1], values[2], num_keys);

        if values.len() < 4 + num_keys * 4 {
            return Err(TiffError::Malformed(format!(
                "GeoKey directory declares {} keys but holds {} values", num_keys, values.len())));
        }

        let entries = values[4..4 + num_keys * 4]
            .chunks_exact(4)
            .map(|key| {
                let entry = GeoKeyEntry::new(key[0] as u16, key[1] as u16, key[2] as u16, key[3] as u16);
                debug!("GeoKey: id={} ({}), location={}, count={}, value={}",
                       entry.key_id, get_key_name(entry.key_id),
                       entry.tiff_tag_location, entry.count, entry.value_offset);
                entry
            })
            .collect();

        Ok(entries)
    }

    /// Extract georeferencing information from a TIFF IFD
    pub fn extract_geo_info(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> TiffResult<GeoInfo> {
        let mut geo_info = GeoInfo {
            raster_type: raster_type::PIXEL_IS_AREA,
            ..GeoInfo::default()
        };

        for key in Self::parse_geo_key_directory(tiff_reader, reader, ifd)? {
            match (key.key_id, key.inline_value()) {
                (geo_keys::PROJECTED_CS_TYPE, Some(code)) => geo_info.projected_cs_code = Some(code),
                (geo_keys::GEOGRAPHIC_TYPE, Some(code)) => geo_info.geographic_cs_code = Some(code),
                (geo_keys::RASTER_TYPE, Some(value)) => geo_info.raster_type = value,
                _ => {}
            }
        }

        if ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) {
            let scale = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
            if scale.len() < 2 {
                return Err(TiffError::Malformed("ModelPixelScale needs at least 2 values".to_string()));
            }
            geo_info.pixel_scale = Some([scale[0], scale[1], scale.get(2).copied().unwrap_or(0.0)]);
        }

        if ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
            let tie_points = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
            if tie_points.len() < 6 {
                return Err(TiffError::Malformed("ModelTiepoint needs at least 6 values".to_string()));
            }
            let mut tie_point = [0.0; 6];
            tie_point.copy_from_slice(&tie_points[..6]);
            geo_info.tie_point = Some(tie_point);
        }

        if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
            let matrix = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
            if matrix.len() < 16 {
                return Err(TiffError::Malformed("ModelTransformation needs 16 values".to_string()));
            }
            let mut transformation = [0.0; 16];
            transformation.copy_from_slice(&matrix[..16]);
            geo_info.transformation = Some(transformation);
        }

        debug!("GeoInfo: {:?}", geo_info);
        Ok(geo_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projected_code_wins_over_geographic() {
        let info = GeoInfo {
            projected_cs_code: Some(32643),
            geographic_cs_code: Some(4326),
            ..GeoInfo::default()
        };
        assert_eq!(info.epsg(), Some(32643));
    }

    #[test]
    fn user_defined_codes_count_as_absent() {
        let info = GeoInfo {
            projected_cs_code: Some(32767),
            geographic_cs_code: Some(4326),
            ..GeoInfo::default()
        };
        assert_eq!(info.epsg(), Some(4326));

        let info = GeoInfo {
            geographic_cs_code: Some(32767),
            ..GeoInfo::default()
        };
        assert_eq!(info.epsg(), None);
    }

    #[test]
    fn georeferencing_needs_scale_and_tiepoint_or_matrix() {
        let mut info = GeoInfo {
            pixel_scale: Some([1.0, 1.0, 0.0]),
            ..GeoInfo::default()
        };
        assert!(!info.is_georeferenced());

        info.tie_point = Some([0.0; 6]);
        assert!(info.is_georeferenced());
    }
}
