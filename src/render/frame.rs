use crate::error::SurfaceError;
use crate::render::surface::{DrawTarget, Surface};
use crate::style::Paint;
use macroquad::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// One recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Clear everything to a colour.
    Clear(Color),
    /// Fill a closed path.
    Fill {
        /// Screen-space vertices.
        path: Vec<Vec2>,
        /// Fill colour.
        color: Color,
    },
    /// Outline a closed path.
    Stroke {
        /// Screen-space vertices.
        path: Vec<Vec2>,
        /// Line colour.
        color: Color,
        /// Line width in pixels.
        width: f32,
    },
}

/// Display list recorded off the window thread and replayed by the presenter.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Surface size in pixels.
    pub size: Vec2,
    /// Commands in paint order.
    pub ops: Vec<DrawOp>,
}

impl Frame {
    /// Empty frame.
    pub fn new(size: Vec2) -> Self {
        Frame {
            size,
            ops: Vec::new(),
        }
    }

    /// Fill paths and colours in paint order.
    pub fn fills(&self) -> impl Iterator<Item = (&[Vec2], Color)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Fill { path, color } => Some((path.as_slice(), *color)),
            _ => None,
        })
    }
}

impl DrawTarget for Frame {
    fn clear(&mut self, color: Color) {
        // Everything before a clear is invisible.
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_path(&mut self, path: &[Vec2], paint: &Paint) {
        self.ops.push(DrawOp::Fill {
            path: path.to_vec(),
            color: paint.color,
        });
    }

    fn stroke_path(&mut self, path: &[Vec2], paint: &Paint) {
        self.ops.push(DrawOp::Stroke {
            path: path.to_vec(),
            color: paint.color,
            width: paint.stroke_width,
        });
    }
}

#[derive(Default)]
struct SlotInner {
    latest: Option<Arc<Frame>>,
    submitted: u64,
}

/// Latest submitted frame, shared between the render thread and whoever
/// presents it.
#[derive(Clone, Default)]
pub struct FrameSlot(Arc<Mutex<SlotInner>>);

impl FrameSlot {
    /// Slot with no frame yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently submitted frame.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.0.lock().latest.clone()
    }

    /// Number of frames submitted since the slot was created.
    pub fn submitted(&self) -> u64 {
        self.0.lock().submitted
    }

    fn publish(&self, frame: Frame) {
        let mut inner = self.0.lock();
        inner.latest = Some(Arc::new(frame));
        inner.submitted += 1;
    }
}

/// Surface that records frames into a [`FrameSlot`].
pub struct FrameSurface {
    size: Vec2,
    slot: FrameSlot,
}

impl FrameSurface {
    /// Surface of `size` pixels with a fresh slot.
    pub fn new(size: Vec2) -> Self {
        Self::with_slot(size, FrameSlot::new())
    }

    /// Surface publishing into an existing slot.
    pub fn with_slot(size: Vec2, slot: FrameSlot) -> Self {
        FrameSurface { size, slot }
    }

    /// Handle to the slot frames are published into.
    pub fn slot(&self) -> FrameSlot {
        self.slot.clone()
    }
}

impl Surface for FrameSurface {
    type Target = Frame;

    fn size(&self) -> Vec2 {
        self.size
    }

    fn try_acquire_drawing_target(&mut self) -> Result<Frame, SurfaceError> {
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Err(SurfaceError::Unavailable);
        }
        Ok(Frame::new(self.size))
    }

    fn submit(&mut self, frame: Frame) -> Result<(), SurfaceError> {
        self.slot.publish(frame);
        Ok(())
    }
}
