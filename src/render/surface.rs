use crate::error::SurfaceError;
use crate::style::Paint;
use macroquad::prelude::*;

/// Something a frame can be painted into. Paths are closed implicitly.
pub trait DrawTarget {
    /// Fill the whole target.
    fn clear(&mut self, color: Color);
    /// Fill a closed path.
    fn fill_path(&mut self, path: &[Vec2], paint: &Paint);
    /// Outline a closed path.
    fn stroke_path(&mut self, path: &[Vec2], paint: &Paint);
}

/// A drawable surface with a lock/submit contract. Both calls may fail
/// transiently; the render loop treats failure as "skip this frame".
pub trait Surface {
    /// What a frame is drawn into.
    type Target: DrawTarget;

    /// Width and height in pixels.
    fn size(&self) -> Vec2;

    /// Lock a target for one frame.
    fn try_acquire_drawing_target(&mut self) -> Result<Self::Target, SurfaceError>;

    /// Unlock and show a drawn target.
    fn submit(&mut self, target: Self::Target) -> Result<(), SurfaceError>;
}
