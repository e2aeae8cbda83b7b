use macroquad::prelude::*;

/// Closed boundary; the last point connects back to the first.
pub type Ring = Vec<Vec2>;
/// Ring 0 is the outer boundary, later rings are holes.
pub type Polygon = Vec<Ring>;
/// Polygons of one feature.
pub type MultiPolygon = Vec<Polygon>;

/// Axis-aligned box with `top < bottom` in render space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest x.
    pub left: f32,
    /// Smallest y.
    pub top: f32,
    /// Largest x.
    pub right: f32,
    /// Largest y.
    pub bottom: f32,
}

impl Bounds {
    /// Box from its edges.
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Bounds {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Inverted box that any `extend` call collapses onto the first point.
    pub const fn empty() -> Self {
        Bounds::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN)
    }

    /// Tight box around `points`, empty when there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec2>) -> Self {
        let mut b = Bounds::empty();
        for p in points {
            b.extend(*p);
        }
        b
    }

    /// Grow to include `p`.
    #[inline]
    pub fn extend(&mut self, p: Vec2) {
        self.left = self.left.min(p.x);
        self.top = self.top.min(p.y);
        self.right = self.right.max(p.x);
        self.bottom = self.bottom.max(p.y);
    }

    /// True until a point has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    /// `right - left`.
    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// `bottom - top`.
    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Half-open containment: left and top edges are inside, right and bottom are not.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && p.x >= self.left
            && p.x < self.right
            && p.y >= self.top
            && p.y < self.bottom
    }

    /// True when the two boxes share a region of non-zero area.
    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Overlap of the two boxes, if any.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        if !self.intersects(other) {
            return None;
        }
        Some(Bounds::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        ))
    }
}

/// Even-odd ray casting. The ring is treated as closed.
pub fn ring_contains(ring: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let Some(mut j) = ring.len().checked_sub(1) else {
        return false;
    };

    for i in 0..ring.len() {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Total points over all rings.
pub fn point_count(geometry: &MultiPolygon) -> usize {
    geometry
        .iter()
        .map(|polygon| polygon.iter().map(Vec::len).sum::<usize>())
        .sum()
}

/// Every point, mutably.
pub fn points_mut(geometry: &mut MultiPolygon) -> impl Iterator<Item = &mut Vec2> {
    geometry.iter_mut().flatten().flatten()
}

/// Every point.
pub fn points(geometry: &MultiPolygon) -> impl Iterator<Item = &Vec2> {
    geometry.iter().flatten().flatten()
}
