use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::errors::{OverlayError, OverlayResult};
use crate::location::{self, LocationQuery, LocationResponse};
use crate::metadata::RasterMetadata;
use crate::overlay::{LeafletMapSink, MapSink, OverlayCompositor, OverlayPlacement};
use crate::raster::RasterIngestor;
use crate::utils::write_utils;

/// Files written for one processed raster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayArtifacts {
    pub image_path: PathBuf,
    pub map_path: PathBuf,
    pub metadata_path: PathBuf,
    pub metadata: RasterMetadata,
    pub placement: OverlayPlacement,
}

/// Main interface to the rasteroverlay library
///
/// Runs ingest, composite and persist for one raster at a time. Holds
/// only a shared reference to the configuration.
pub struct RasterOverlay<'a> {
    config: &'a AppConfig,
    ingestor: RasterIngestor,
    map_sink: Box<dyn MapSink + 'a>,
}

impl<'a> RasterOverlay<'a> {
    /// Create a pipeline rendering through Leaflet
    pub fn new(config: &'a AppConfig) -> Self {
        RasterOverlay {
            config,
            ingestor: RasterIngestor::new().with_geographic_guard(config.require_geographic_crs),
            map_sink: Box::new(LeafletMapSink::new(&config.map)),
        }
    }

    /// Render maps through a different sink
    pub fn with_map_sink(mut self, map_sink: Box<dyn MapSink + 'a>) -> Self {
        self.map_sink = map_sink;
        self
    }

    /// Show a progress bar while decoding pixel blocks
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.ingestor = self.ingestor.with_progress(enabled);
        self
    }

    /// Read the metadata response without decoding pixels
    pub fn inspect(&self, input_path: &Path) -> OverlayResult<RasterMetadata> {
        self.ingestor.inspect(input_path)
    }

    /// Ingest `input_path` and write `<stem>.<ext>`, `<stem>.html` and
    /// `<stem>.json` into `output_dir`
    ///
    /// Nothing is written unless ingestion and composition succeed; if one
    /// artifact fails to save, the ones already saved are removed.
    pub fn process(&self, input_path: &Path, output_dir: &Path, opacity: Option<f64>) -> OverlayResult<OverlayArtifacts> {
        let opacity = opacity.unwrap_or(self.config.map.opacity);
        if !(0.0..=1.0).contains(&opacity) {
            return Err(OverlayError::Config(format!("opacity {} is outside [0, 1]", opacity)));
        }

        let scene = self.ingestor.ingest(input_path)?;
        let composite = OverlayCompositor::composite(&scene.cube, &scene.bounds)?;
        let metadata = scene.metadata();

        let stem = input_path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "raster".to_string());
        let image_name = format!("{}.{}", stem, self.config.output.image_extension);
        let image_path = output_dir.join(&image_name);
        let map_path = output_dir.join(format!("{}.html", stem));
        let metadata_path = output_dir.join(format!("{}.json", stem));

        let rendered = self.map_sink.add_overlay(&image_name, composite.placement.corners(), opacity)?;
        let metadata_json = metadata.to_json()?;

        fs::create_dir_all(output_dir)
            .map_err(|e| OverlayError::io(format!("creating {}", output_dir.display()), e))?;

        let mut written: Vec<PathBuf> = Vec::new();
        let saved = composite.image.save(&image_path)
            .and_then(|_| {
                written.push(image_path.clone());
                rendered.save(&map_path)
            })
            .and_then(|_| {
                written.push(map_path.clone());
                write_utils::write_atomic(&metadata_path, metadata_json.as_bytes())
            });

        if let Err(e) = saved {
            for path in written {
                if let Err(remove_err) = fs::remove_file(&path) {
                    warn!("Could not remove {}: {}", path.display(), remove_err);
                }
            }
            return Err(e);
        }

        info!("Wrote {}, {} and {}", image_path.display(), map_path.display(), metadata_path.display());
        Ok(OverlayArtifacts {
            image_path,
            map_path,
            metadata_path,
            metadata,
            placement: composite.placement,
        })
    }

    /// Resolve a project location with the configured places and fallback
    pub fn locate(&self, query: &LocationQuery) -> LocationResponse {
        location::resolve_with_config(query, self.config)
    }
}
