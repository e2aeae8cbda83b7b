use crate::feature::Feature;
use crate::geom::Bounds;
use crate::view::CameraSnapshot;
use macroquad::prelude::*;
use std::sync::Arc;

/// Extra model-space margin, in screen pixels, so strokes on the edge are kept.
const CULL_MARGIN_PX: f32 = 2.0;

/// Model-space rectangle visible through a viewport of `size` pixels.
pub fn visible_model_rect(size: Vec2, camera: &CameraSnapshot) -> Bounds {
    let pad = vec2(CULL_MARGIN_PX, CULL_MARGIN_PX);
    let min = camera.screen_to_model(-pad);
    let max = camera.screen_to_model(size + pad);
    Bounds::new(min.x, min.y, max.x, max.y)
}

/// Features whose bounds overlap `area`, in scene order.
pub fn query_visible<'f>(
    features: &'f [Arc<Feature>],
    area: &'f Bounds,
) -> impl Iterator<Item = &'f Arc<Feature>> + 'f {
    features.iter().filter(move |f| f.contains_box(area))
}
