//! Builds features from a decoded feature collection.
//!
//! Coordinates are read as `(x, -y)`: GeoJSON's y axis points up while render
//! space grows downwards. A global bounding box is accumulated over every
//! accepted point and then used to normalize each feature into the unit square.

use crate::error::SkipReason;
use crate::feature::Feature;
use crate::geom::{Bounds, MultiPolygon, Polygon, Ring};
use crate::ir_geo::{IrFeatureCollection, IrGeometry, RawMultiPolygon};
use log::{info, warn};
use macroquad::prelude::*;

/// What a load produced and what it had to leave out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Features kept.
    pub features_loaded: usize,
    /// Points kept across all features.
    pub points_loaded: usize,
    /// Everything left out, in input order.
    pub skipped: Vec<SkipReason>,
}

impl LoadReport {
    /// Features dropped entirely.
    pub fn skipped_features(&self) -> usize {
        self.skipped
            .iter()
            .filter(|r| !matches!(r, SkipReason::MalformedCoordinate { .. }))
            .count()
    }

    /// Coordinates dropped from kept features.
    pub fn skipped_points(&self) -> usize {
        self.skipped
            .iter()
            .filter(|r| matches!(r, SkipReason::MalformedCoordinate { .. }))
            .count()
    }
}

/// Output of [`build_scene`].
pub struct LoadedScene {
    /// Normalized features, in collection order.
    pub features: Vec<Feature>,
    /// Extent of the raw (y-flipped) coordinates.
    pub map_bounds: Bounds,
    /// What was kept and skipped.
    pub report: LoadReport,
}

fn polygons_from_raw(
    raw: RawMultiPolygon,
    feature: usize,
    map_bounds: &mut Bounds,
    report: &mut LoadReport,
) -> MultiPolygon {
    raw.into_iter()
        .map(|polygon| -> Polygon {
            polygon
                .into_iter()
                .map(|ring| -> Ring {
                    let mut points = Vec::with_capacity(ring.len());
                    for position in ring {
                        let [x, y] = position[..] else {
                            report
                                .skipped
                                .push(SkipReason::MalformedCoordinate { feature });
                            continue;
                        };
                        let p = vec2(x as f32, (-y) as f32);
                        map_bounds.extend(p);
                        points.push(p);
                    }
                    points
                })
                .collect()
        })
        .collect()
}

/// Convert every MultiPolygon feature, skipping (and logging) the rest, then
/// normalize against the accumulated map bounds.
pub fn build_scene(ir: IrFeatureCollection, stroke_color: u32, fill_color: u32) -> LoadedScene {
    let mut map_bounds = Bounds::empty();
    let mut report = LoadReport::default();
    let mut features = Vec::new();

    for (index, feature) in ir.features.into_iter().enumerate() {
        let reason = match feature.geometry {
            IrGeometry::MultiPolygon(raw) => {
                let polygons = polygons_from_raw(raw, index, &mut map_bounds, &mut report);
                features.push(Feature::new(
                    polygons,
                    stroke_color,
                    fill_color,
                    feature.properties,
                ));
                continue;
            }
            IrGeometry::Unsupported(kind) => SkipReason::UnsupportedGeometryType {
                feature: index,
                kind,
            },
            IrGeometry::Missing => SkipReason::MissingGeometry { feature: index },
            IrGeometry::Malformed(reason) => SkipReason::MalformedGeometry {
                feature: index,
                reason,
            },
        };
        warn!("Skipping feature {index}: {reason:?}");
        report.skipped.push(reason);
    }

    let bad_points = report.skipped_points();
    if bad_points > 0 {
        warn!("Skipped {bad_points} malformed coordinates");
    }

    if !map_bounds.is_empty() {
        for f in &mut features {
            f.normalize(&map_bounds);
        }
    }

    report.features_loaded = features.len();
    report.points_loaded = features.iter().map(Feature::point_count).sum();
    info!(
        "Loaded {} features ({} points), skipped {}",
        report.features_loaded,
        report.points_loaded,
        report.skipped_features()
    );

    LoadedScene {
        features,
        map_bounds,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir_geo::{IrFeature, Properties};
    use crate::style::{ARGB_BLACK, ARGB_BLUE};

    fn multipolygon(rings: &[&[[f64; 2]]]) -> IrGeometry {
        IrGeometry::MultiPolygon(vec![rings
            .iter()
            .map(|ring| ring.iter().map(|p| p.to_vec()).collect())
            .collect()])
    }

    fn collection(features: Vec<IrGeometry>) -> IrFeatureCollection {
        IrFeatureCollection {
            features: features
                .into_iter()
                .map(|geometry| IrFeature {
                    geometry,
                    properties: Properties::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn flips_y_and_normalizes_against_all_features() {
        let ir = collection(vec![
            multipolygon(&[&[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0]]]),
            multipolygon(&[&[[2.0, 2.0], [4.0, 2.0], [4.0, 4.0]]]),
        ]);
        let scene = build_scene(ir, ARGB_BLACK, ARGB_BLUE);

        assert_eq!(scene.map_bounds, Bounds::new(0.0, -4.0, 4.0, 0.0));
        assert_eq!(scene.features.len(), 2);
        assert_eq!(scene.features[0].bounds(), Bounds::new(0.0, 0.5, 0.5, 1.0));
        assert_eq!(scene.features[1].bounds(), Bounds::new(0.5, 0.0, 1.0, 0.5));
        assert_eq!(scene.features[0].fill_color(), ARGB_BLUE);
        assert_eq!(scene.report.points_loaded, 6);
    }

    #[test]
    fn skips_unsupported_and_malformed_entries() {
        let mut ir = collection(vec![
            IrGeometry::Unsupported("LineString".into()),
            IrGeometry::Missing,
            IrGeometry::Malformed("coordinates is not an array".into()),
            multipolygon(&[&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]),
        ]);
        if let IrGeometry::MultiPolygon(polygons) = &mut ir.features[3].geometry {
            polygons[0][0].push(vec![5.0]);
            polygons[0][0].push(vec![9.0, 9.0, 9.0]);
        }

        let scene = build_scene(ir, ARGB_BLACK, ARGB_BLUE);
        assert_eq!(scene.features.len(), 1);
        assert_eq!(scene.report.skipped_features(), 3);
        assert_eq!(scene.report.skipped_points(), 2);
        assert_eq!(scene.map_bounds, Bounds::new(0.0, -1.0, 1.0, 0.0));
        assert!(matches!(
            &scene.report.skipped[0],
            SkipReason::UnsupportedGeometryType { feature: 0, kind } if kind == "LineString"
        ));
    }

    #[test]
    fn empty_collection_yields_empty_scene() {
        let scene = build_scene(IrFeatureCollection::default(), ARGB_BLACK, ARGB_BLUE);
        assert!(scene.features.is_empty());
        assert!(scene.map_bounds.is_empty());
    }
}
