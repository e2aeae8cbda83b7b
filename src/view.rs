use log::warn;
use macroquad::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// `f32` stored as its bit pattern.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(v: f32) -> Self {
        AtomicF32(AtomicU32::new(v.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, v: f32) {
        self.0.store(v.to_bits(), Ordering::Relaxed);
    }
}

/// Camera transform at one instant: model `p` maps to `(p + offset) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    /// Model-space translation applied before scaling.
    pub offset: Vec2,
    /// Zoom factor.
    pub scale: f32,
}

impl CameraSnapshot {
    /// Screen pixels to model space.
    #[inline]
    pub fn screen_to_model(&self, screen: Vec2) -> Vec2 {
        screen * (1.0 / self.scale) - self.offset
    }

    /// Model space to screen pixels.
    #[inline]
    pub fn model_to_screen(&self, model: Vec2) -> Vec2 {
        (model + self.offset) * self.scale
    }
}

/// Pan/zoom state shared between the input thread and the render thread.
///
/// Each scalar is its own atomic and they are not updated together: a frame
/// may see a new offset with an old scale. That frame is off by one gesture
/// step and the next redraw corrects it.
#[derive(Debug)]
pub struct Camera {
    offset_x: AtomicF32,
    offset_y: AtomicF32,
    scale: AtomicF32,
    redraw: AtomicBool,
    min_scale: f32,
    max_scale: f32,
}

impl Camera {
    /// Camera at offset zero and `min_scale`, with a redraw pending.
    pub fn new(min_scale: f32, max_scale: f32) -> Self {
        Camera {
            offset_x: AtomicF32::new(0.0),
            offset_y: AtomicF32::new(0.0),
            scale: AtomicF32::new(min_scale),
            redraw: AtomicBool::new(true),
            min_scale,
            max_scale,
        }
    }

    /// Current offset and scale.
    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            offset: vec2(self.offset_x.load(), self.offset_y.load()),
            scale: self.scale.load(),
        }
    }

    /// Current zoom factor.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale.load()
    }

    /// Current model-space offset.
    #[inline]
    pub fn offset(&self) -> Vec2 {
        vec2(self.offset_x.load(), self.offset_y.load())
    }

    /// Pan by a screen-space delta.
    pub fn scroll(&self, dx: f32, dy: f32) {
        let inv = 1.0 / self.scale.load();
        self.offset_x.store(self.offset_x.load() - dx * inv);
        self.offset_y.store(self.offset_y.load() - dy * inv);
        self.request_redraw();
    }

    /// Zoom by `factor` around a screen-space focus point, keeping the model
    /// point under the focus in place.
    pub fn scale_by(&self, factor: f32, focus_x: f32, focus_y: f32) {
        if !(factor.is_finite() && focus_x.is_finite() && focus_y.is_finite()) {
            warn!("Ignoring zoom by {factor} around ({focus_x}, {focus_y})");
            return;
        }
        let old_scale = self.scale.load();
        let new_scale = (old_scale * factor).clamp(self.min_scale, self.max_scale);
        self.scale.store(new_scale);

        let delta = 1.0 / old_scale - 1.0 / new_scale;
        self.offset_x.store(self.offset_x.load() - delta * focus_x);
        self.offset_y.store(self.offset_y.load() - delta * focus_y);
        self.request_redraw();
    }

    /// Screen pixels to model space with the current transform.
    pub fn screen_to_model(&self, screen: Vec2) -> Vec2 {
        self.snapshot().screen_to_model(screen)
    }

    /// Back to the initial offset and scale.
    pub fn reset(&self) {
        self.offset_x.store(0.0);
        self.offset_y.store(0.0);
        self.scale.store(self.min_scale);
        self.request_redraw();
    }

    /// Ask the render loop for a new frame.
    #[inline]
    pub fn request_redraw(&self) {
        self.redraw.store(true, Ordering::Release);
    }

    /// Consume a pending redraw request.
    #[inline]
    pub fn take_redraw(&self) -> bool {
        self.redraw.swap(false, Ordering::AcqRel)
    }

    /// Whether a redraw is pending.
    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw.load(Ordering::Acquire)
    }
}
