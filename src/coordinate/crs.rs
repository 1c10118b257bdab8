//! Coordinate Reference System handling

use serde::Serialize;
use std::fmt;

use crate::tiff::constants::epsg;

/// EPSG identifier of a raster's coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CoordinateReferenceId(u32);

impl CoordinateReferenceId {
    /// Wrap a registered EPSG code; 0 and the user-defined marker yield None
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            0 | epsg::USER_DEFINED => None,
            code => Some(CoordinateReferenceId(code)),
        }
    }

    pub fn code(&self) -> u32 {
        self.0
    }

    /// The well-known system this identifier names
    pub fn system(&self) -> CoordinateSystem {
        CoordinateSystem::from_epsg(self.0)
    }
}

impl fmt::Display for CoordinateReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// Identifier for common coordinate systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// WGS 84 (EPSG:4326)
    WGS84,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// UTM Zone (EPSG:326xx for northern hemisphere, 327xx for southern)
    UTM(u8, bool),
    /// Other EPSG code
    Other(u32),
}

impl CoordinateSystem {
    /// Classify an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        match code {
            epsg::WGS84 => CoordinateSystem::WGS84,
            epsg::WEB_MERCATOR => CoordinateSystem::WebMercator,
            32601..=32660 => CoordinateSystem::UTM((code - 32600) as u8, true),
            32701..=32760 => CoordinateSystem::UTM((code - 32700) as u8, false),
            _ => CoordinateSystem::Other(code),
        }
    }

    /// Get the EPSG code for this coordinate system
    pub fn epsg_code(&self) -> u32 {
        match self {
            CoordinateSystem::WGS84 => epsg::WGS84,
            CoordinateSystem::WebMercator => epsg::WEB_MERCATOR,
            CoordinateSystem::UTM(zone, is_northern) => {
                if *is_northern {
                    32600 + *zone as u32
                } else {
                    32700 + *zone as u32
                }
            },
            CoordinateSystem::Other(code) => *code,
        }
    }

    /// Whether coordinates are longitude/latitude degrees
    ///
    /// EPSG registers geographic 2D systems in the 4001..=4999 block.
    pub fn is_geographic(&self) -> bool {
        match self {
            CoordinateSystem::WGS84 => true,
            CoordinateSystem::Other(code) => (4001..=4999).contains(code),
            _ => false,
        }
    }

    /// Get a description of this coordinate system
    pub fn description(&self) -> String {
        match self {
            CoordinateSystem::WGS84 => "WGS 84 (EPSG:4326)".to_string(),
            CoordinateSystem::WebMercator => "Web Mercator (EPSG:3857)".to_string(),
            CoordinateSystem::UTM(zone, is_northern) => {
                if *is_northern {
                    format!("UTM Zone {}N (EPSG:{})", zone, self.epsg_code())
                } else {
                    format!("UTM Zone {}S (EPSG:{})", zone, self.epsg_code())
                }
            },
            CoordinateSystem::Other(code) => format!("EPSG:{}", code),
        }
    }
}
