#![warn(missing_docs)]

//! Level-of-detail GeoJSON MultiPolygon renderer & hit-tester for Macroquad.
//!
//! Features are normalized into a unit square at load time, scaled to the
//! viewport and simplified into a few detail levels once the surface size is
//! known, and redrawn by a dedicated render thread. Hit testing always runs
//! against the most detailed level, whatever is on screen.

mod config;
mod error;
mod feature;
mod geom;
mod ir_geo;
mod loader {
    pub mod json_loader;
}
mod map;
mod render;
mod scene;
mod style;
mod view;

pub use config::ViewConfig;
pub use error::{MapError, SkipReason, SurfaceError};
pub use feature::{simplify_ring, DetailLevels, Feature, LodKey};
pub use geom::{ring_contains, Bounds, MultiPolygon, Polygon, Ring};
pub use ir_geo::{IrFeature, IrFeatureCollection, IrGeometry, Properties, RawMultiPolygon, RawPosition};
pub use loader::json_loader::{decode_collection_file, decode_collection_str, decode_collection_value};
pub use map::GeoMap;
pub use render::cull::{query_visible, visible_model_rect};
pub use render::frame::{DrawOp, Frame, FrameSlot, FrameSurface};
pub use render::present::{present, triangulate};
pub use render::render_loop::LoopState;
pub use render::surface::{DrawTarget, Surface};
pub use scene::{build_scene, LoadReport, LoadedScene};
pub use style::{argb_to_color, color_to_argb, Paint, PaintStyle, ARGB_BLACK, ARGB_BLUE, ARGB_CYAN, ARGB_WHITE};
pub use view::{Camera, CameraSnapshot};
