//! Overlay composition
//!
//! Normalizes pixel cubes into display images, computes their map
//! placement and renders them through a map sink.

pub mod normalize;
pub mod display_image;
pub mod placement;
pub mod compositor;
pub mod map;

pub use compositor::{Composite, OverlayCompositor};
pub use display_image::DisplayImage;
pub use map::{LeafletMapSink, MapSink, RenderedMap};
pub use placement::OverlayPlacement;
