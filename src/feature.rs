use crate::error::MapError;
use crate::geom::{self, Bounds, MultiPolygon, Ring};
use crate::ir_geo::Properties;
use crate::render::surface::DrawTarget;
use crate::style::Paint;
use log::{debug, warn};
use macroquad::prelude::*;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Zoom threshold used as a detail-level key. Ordered by `f32::total_cmp`.
#[derive(Debug, Clone, Copy)]
pub struct LodKey(pub f32);

impl PartialEq for LodKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}
impl Eq for LodKey {}
impl PartialOrd for LodKey {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}
impl Ord for LodKey {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0.total_cmp(&other.0)
    }
}

static EMPTY: MultiPolygon = Vec::new();

/// Geometry of one feature across detail levels.
///
/// A level keyed `s` was simplified with a distance cutoff of `cutoff / s`,
/// so larger keys keep more points.
#[derive(Debug, Clone)]
pub enum DetailLevels {
    /// Full-resolution geometry, before any simplification pass.
    Full(MultiPolygon),
    /// Simplified copies keyed by zoom threshold.
    Simplified(BTreeMap<LodKey, MultiPolygon>),
}

impl DetailLevels {
    /// Highest-fidelity geometry available.
    pub fn finest(&self) -> &MultiPolygon {
        match self {
            DetailLevels::Full(g) => g,
            DetailLevels::Simplified(levels) => levels.values().next_back().unwrap_or(&EMPTY),
        }
    }

    /// Smallest key `>= scale`, falling back to the largest key.
    pub fn select(&self, scale: f32) -> &MultiPolygon {
        match self {
            DetailLevels::Full(g) => g,
            DetailLevels::Simplified(levels) => levels
                .range(LodKey(scale)..)
                .next()
                .or_else(|| levels.iter().next_back())
                .map_or(&EMPTY, |(_, g)| g),
        }
    }

    /// Zoom thresholds in ascending order. Empty for `Full`.
    pub fn keys(&self) -> Vec<f32> {
        match self {
            DetailLevels::Full(_) => Vec::new(),
            DetailLevels::Simplified(levels) => levels.keys().map(|k| k.0).collect(),
        }
    }

    /// Level stored under exactly `key`.
    pub fn get(&self, key: f32) -> Option<&MultiPolygon> {
        match self {
            DetailLevels::Full(_) => None,
            DetailLevels::Simplified(levels) => levels.get(&LodKey(key)),
        }
    }

    /// Every stored level, coarsest first.
    pub fn iter(&self) -> impl Iterator<Item = &MultiPolygon> {
        let (full, simplified) = match self {
            DetailLevels::Full(g) => (Some(g), None),
            DetailLevels::Simplified(levels) => (None, Some(levels.values())),
        };
        full.into_iter().chain(simplified.into_iter().flatten())
    }

    fn for_each_level_mut(&mut self, mut f: impl FnMut(&mut MultiPolygon)) {
        match self {
            DetailLevels::Full(g) => f(g),
            DetailLevels::Simplified(levels) => levels.values_mut().for_each(f),
        }
    }
}

struct Geometry {
    levels: DetailLevels,
    /// Box of the finest level, used for hit testing.
    bounds: Bounds,
    /// Box around every level, used for culling.
    draw_bounds: Bounds,
}

impl Geometry {
    fn new(levels: DetailLevels) -> Self {
        let mut g = Geometry {
            levels,
            bounds: Bounds::empty(),
            draw_bounds: Bounds::empty(),
        };
        g.recompute_bounds();
        g
    }

    fn recompute_bounds(&mut self) {
        self.bounds = Bounds::from_points(geom::points(self.levels.finest()));
        // Coarse levels may keep points the finest level dropped.
        self.draw_bounds = Bounds::from_points(self.levels.iter().flat_map(|level| geom::points(level)));
    }
}

/// One MultiPolygon with its detail levels, paint and metadata.
///
/// Geometry sits behind a read-write lock that is only written during
/// normalization and LOD generation; afterwards every access is a read.
/// Colours are plain atomics so a tap handler can change them while the
/// render thread draws.
pub struct Feature {
    geometry: RwLock<Geometry>,
    stroke_color: AtomicU32,
    fill_color: AtomicU32,
    properties: Properties,
}

impl std::fmt::Debug for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feature")
            .field("properties", &self.properties)
            .field("bounds", &self.bounds())
            .field("stroke_color", &format!("{:#010x}", self.stroke_color()))
            .field("fill_color", &format!("{:#010x}", self.fill_color()))
            .finish()
    }
}

impl Feature {
    /// Full-resolution feature with ARGB stroke and fill colours.
    pub fn new(polygons: MultiPolygon, stroke_color: u32, fill_color: u32, properties: Properties) -> Self {
        Feature {
            geometry: RwLock::new(Geometry::new(DetailLevels::Full(polygons))),
            stroke_color: AtomicU32::new(stroke_color),
            fill_color: AtomicU32::new(fill_color),
            properties,
        }
    }

    /// Metadata such as `ID` and `NAME`.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Stroke colour, `0xAARRGGBB`.
    #[inline]
    pub fn stroke_color(&self) -> u32 {
        self.stroke_color.load(Ordering::Relaxed)
    }

    /// Takes effect on the next frame.
    #[inline]
    pub fn set_stroke_color(&self, argb: u32) {
        self.stroke_color.store(argb, Ordering::Relaxed);
    }

    /// Fill colour, `0xAARRGGBB`.
    #[inline]
    pub fn fill_color(&self) -> u32 {
        self.fill_color.load(Ordering::Relaxed)
    }

    /// Takes effect on the next frame.
    #[inline]
    pub fn set_fill_color(&self, argb: u32) {
        self.fill_color.store(argb, Ordering::Relaxed);
    }

    /// Bounding box of the finest level.
    pub fn bounds(&self) -> Bounds {
        self.geometry.read().bounds
    }

    /// Read access to the stored levels. Hold it briefly.
    pub fn detail_levels(&self) -> MappedRwLockReadGuard<'_, DetailLevels> {
        RwLockReadGuard::map(self.geometry.read(), |g| &g.levels)
    }

    /// Points in the finest level.
    pub fn point_count(&self) -> usize {
        geom::point_count(self.geometry.read().levels.finest())
    }

    /// Rescale into the unit square spanned by `map_bounds`.
    pub fn normalize(&mut self, map_bounds: &Bounds) {
        let width = nonzero(map_bounds.width());
        let height = nonzero(map_bounds.height());
        let g = self.geometry.get_mut();

        g.levels.for_each_level_mut(|level| {
            for p in geom::points_mut(level) {
                p.x = (p.x - map_bounds.left) / width;
                p.y = (p.y - map_bounds.top) / height;
            }
        });

        g.recompute_bounds();
    }

    /// Scale unit-square geometry to pixels and build one simplified level per
    /// zoom level, always from the full-resolution geometry.
    pub fn generate_lod_models(
        &self,
        viewport_width: f32,
        aspect_ratio: f32,
        zoom_levels: &[f32],
        cutoff_distance: f32,
    ) -> Result<(), MapError> {
        let mut g = self.geometry.write();

        let DetailLevels::Full(full) = &mut g.levels else {
            return Err(MapError::LodAlreadyGenerated);
        };

        for p in geom::points_mut(full) {
            p.x *= viewport_width;
            p.y *= aspect_ratio * viewport_width;
        }
        debug!(
            "Scale corrected to width, {} points updated.",
            geom::point_count(full)
        );

        let mut levels = BTreeMap::new();
        for &scale in zoom_levels {
            if !(scale.is_finite() && scale > 0.0) {
                warn!("Ignoring zoom level {scale}");
                continue;
            }

            let threshold = cutoff_distance / scale;
            let simplified: MultiPolygon = full
                .iter()
                .map(|polygon| {
                    polygon
                        .iter()
                        .map(|ring| simplify_ring(ring, threshold))
                        .collect()
                })
                .collect();

            debug!(
                "LOD {scale} generated, {} points created.",
                geom::point_count(&simplified)
            );
            levels.insert(LodKey(scale), simplified);
        }

        // The full model is never drawn once simplified levels exist.
        if !levels.is_empty() {
            g.levels = DetailLevels::Simplified(levels);
        }

        g.recompute_bounds();
        Ok(())
    }

    /// Draw the level matching `scale` with the camera transform
    /// `(p + offset) * scale`. Every ring is filled, then stroked, on its own.
    pub fn draw(
        &self,
        target: &mut dyn DrawTarget,
        scale: f32,
        offset_x: f32,
        offset_y: f32,
        stroke_style: &Paint,
        fill_style: &Paint,
    ) {
        let stroke = stroke_style.with_argb(self.stroke_color());
        let fill = fill_style.with_argb(self.fill_color());
        let offset = vec2(offset_x, offset_y);

        let g = self.geometry.read();
        let mut path: Vec<Vec2> = Vec::new();

        for ring in g.levels.select(scale).iter().flatten() {
            if ring.is_empty() {
                continue;
            }
            path.clear();
            path.extend(ring.iter().map(|p| (*p + offset) * scale));

            target.fill_path(&path, &fill);
            target.stroke_path(&path, &stroke);
        }
    }

    /// Hit test against the highest-fidelity level, whatever level is drawn.
    pub fn contains_point(&self, p: Vec2) -> bool {
        let g = self.geometry.read();
        if !g.bounds.contains(p) {
            return false;
        }
        g.levels
            .finest()
            .iter()
            .flatten()
            .any(|ring| geom::ring_contains(ring, p))
    }

    /// True when any level of the feature may overlap `area`. Neither box is
    /// modified.
    pub fn contains_box(&self, area: &Bounds) -> bool {
        self.geometry.read().draw_bounds.intersects(area)
    }
}

#[inline]
fn nonzero(extent: f32) -> f32 {
    if extent > 0.0 {
        extent
    } else {
        1.0
    }
}

/// Greedy distance simplification. Keeps the first point, keeps enough points
/// to end with at least three, and otherwise keeps a point only when it lies
/// farther than `threshold` from the last kept point. On jumps longer than
/// twice the threshold the preceding point is kept too, so long skipped runs
/// keep their corner.
pub fn simplify_ring(ring: &[Vec2], threshold: f32) -> Ring {
    let Some(&first) = ring.first() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(ring.len());
    out.push(first);

    for i in 1..ring.len() {
        if out.len() < 3 && ring.len() - i <= 3 - out.len() {
            out.push(ring[i]);
            continue;
        }

        let last = out[out.len() - 1];
        let dst = ring[i].distance(last);
        if dst > threshold {
            if dst > threshold * 2.0 && last != ring[i - 1] {
                out.push(ring[i - 1]);
            }
            out.push(ring[i]);
        }
    }

    out
}
