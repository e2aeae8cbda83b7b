use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors surfaced by loading, configuration and render-loop lifecycle.
#[derive(Debug, Error)]
pub enum MapError {
    /// A scene was loaded while the render loop was running.
    #[error("cannot load a scene while the render loop is running")]
    LoadWhileRunning,

    /// The render loop was started twice without being stopped.
    #[error("render loop is already running")]
    AlreadyRunning,

    /// Level-of-detail models can only be generated once per feature.
    #[error("level-of-detail models were already generated for this feature")]
    LodAlreadyGenerated,

    /// The decoded JSON tree is not a GeoJSON FeatureCollection.
    #[error("expected a FeatureCollection, found {0}")]
    NotAFeatureCollection(String),

    /// A file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A file was read but is not valid JSON.
    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// JSON parse error for in-memory input.
    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Only `.json` and `.geojson` files are decoded.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A [`ViewConfig`](crate::ViewConfig) value is out of range.
    #[error("invalid view configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to start the render thread.
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Transient failures of a drawable surface. The render loop skips the frame
/// and tries again on the next cycle.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// No target can be locked right now.
    #[error("drawing surface unavailable")]
    Unavailable,

    /// The drawn target was not accepted.
    #[error("failed to submit frame: {0}")]
    Submit(String),
}

/// Why a feature or coordinate was dropped while building a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// A coordinate tuple did not hold exactly two numbers.
    MalformedCoordinate {
        /// Index of the feature in the collection.
        feature: usize,
    },
    /// Geometry other than MultiPolygon.
    UnsupportedGeometryType {
        /// Index of the feature in the collection.
        feature: usize,
        /// GeoJSON geometry type.
        kind: String,
    },
    /// No geometry, or a geometry without a type.
    MissingGeometry {
        /// Index of the feature in the collection.
        feature: usize,
    },
    /// Nesting of the coordinate arrays is wrong, or the entry is not a feature object.
    MalformedGeometry {
        /// Index of the feature in the collection.
        feature: usize,
        /// Decoder message.
        reason: String,
    },
}
