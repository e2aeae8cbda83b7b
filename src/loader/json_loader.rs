// src/loader/json_loader.rs
use crate::error::MapError;
use crate::ir_geo::*;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;

#[derive(Deserialize)]
struct JsonFeatureCollection {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    features: Vec<JsonValue>,
}

#[derive(Deserialize)]
struct JsonFeature {
    #[serde(default)]
    geometry: Option<JsonGeometry>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, JsonValue>>,
}

#[derive(Deserialize)]
struct JsonGeometry {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    coordinates: JsonValue,
}

fn property_to_ir(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn properties_from_json(props: Option<serde_json::Map<String, JsonValue>>) -> Properties {
    props
        .into_iter()
        .flatten()
        .filter_map(|(name, value)| property_to_ir(value).map(|v| (name, v)))
        .collect()
}

fn as_array<'a>(value: &'a JsonValue, what: &str) -> Result<&'a Vec<JsonValue>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("{what} is not an array"))
}

/// Non-numeric tuples decode to an empty position so the scene loader drops
/// them like any other malformed coordinate.
fn position_to_ir(value: &JsonValue) -> RawPosition {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .map(JsonValue::as_f64)
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

fn ring_to_ir(ring: &JsonValue) -> Result<Vec<RawPosition>, String> {
    Ok(as_array(ring, "ring")?.iter().map(position_to_ir).collect())
}

fn multipolygon_to_ir(coordinates: &JsonValue) -> Result<RawMultiPolygon, String> {
    let mut polygons = Vec::new();
    for polygon in as_array(coordinates, "coordinates")? {
        let rings = as_array(polygon, "polygon")?
            .iter()
            .map(ring_to_ir)
            .collect::<Result<Vec<_>, _>>()?;
        polygons.push(rings);
    }
    Ok(polygons)
}

fn feature_to_ir(value: JsonValue) -> IrFeature {
    let feature: JsonFeature = match serde_json::from_value(value) {
        Ok(f) => f,
        Err(err) => {
            return IrFeature {
                geometry: IrGeometry::Malformed(err.to_string()),
                properties: Properties::new(),
            }
        }
    };

    let geometry = match feature.geometry {
        None => IrGeometry::Missing,
        Some(JsonGeometry { kind: None, .. }) => IrGeometry::Missing,
        Some(JsonGeometry {
            kind: Some(kind),
            coordinates,
        }) => {
            if kind == "MultiPolygon" {
                multipolygon_to_ir(&coordinates)
                    .map(IrGeometry::MultiPolygon)
                    .unwrap_or_else(IrGeometry::Malformed)
            } else {
                IrGeometry::Unsupported(kind)
            }
        }
    };

    IrFeature {
        geometry,
        properties: properties_from_json(feature.properties),
    }
}

/// Decode an already parsed JSON tree.
pub fn decode_collection_value(value: JsonValue) -> Result<IrFeatureCollection, MapError> {
    let j: JsonFeatureCollection = serde_json::from_value(value)?;

    match j.kind.as_deref() {
        Some("FeatureCollection") => {}
        Some(other) => return Err(MapError::NotAFeatureCollection(other.to_owned())),
        None => return Err(MapError::NotAFeatureCollection("no type".to_owned())),
    }

    Ok(IrFeatureCollection {
        features: j.features.into_iter().map(feature_to_ir).collect(),
    })
}

/// Decode GeoJSON text.
pub fn decode_collection_str(json: &str) -> Result<IrFeatureCollection, MapError> {
    let value: JsonValue = serde_json::from_str(json)?;
    decode_collection_value(value)
}

/// Decode a `.json` or `.geojson` file.
pub fn decode_collection_file(path: impl AsRef<Path>) -> Result<IrFeatureCollection, MapError> {
    let p = path.as_ref();
    match p.extension().and_then(|e| e.to_str()) {
        Some("json") | Some("geojson") => {}
        _ => return Err(MapError::UnsupportedFormat(p.display().to_string())),
    }

    let txt = std::fs::read_to_string(p).map_err(|source| MapError::Io {
        path: p.to_path_buf(),
        source,
    })?;
    let value: JsonValue = serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: p.to_path_buf(),
        source,
    })?;

    decode_collection_value(value)
}
