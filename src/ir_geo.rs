// src/ir_geo.rs
use std::collections::BTreeMap;

/// Coordinate tuple as decoded, before any validation.
pub type RawPosition = Vec<f64>;
/// `[polygon][ring][position]`.
pub type RawMultiPolygon = Vec<Vec<Vec<RawPosition>>>;

/// Canonical, format-agnostic feature collection.
#[derive(Debug, Clone, Default)]
pub struct IrFeatureCollection {
    /// Features in array order.
    pub features: Vec<IrFeature>, // scene order: array order
}

/// One decoded feature.
#[derive(Debug, Clone)]
pub struct IrFeature {
    /// Decoded or classified geometry.
    pub geometry: IrGeometry,
    /// Stringified properties.
    pub properties: Properties,
}

/// Geometry as classified by the decoder.
#[derive(Debug, Clone)]
pub enum IrGeometry {
    /// Unvalidated MultiPolygon coordinates.
    MultiPolygon(RawMultiPolygon),
    /// Any other GeoJSON geometry type, by name.
    Unsupported(String),
    /// No geometry, or no geometry type.
    Missing,
    /// The coordinates (or the feature itself) could not be read.
    Malformed(String),
}

/// Immutable feature metadata, e.g. `"ID"` or `"NAME"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Properties(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
