//! Dedicated render worker.
//!
//! The worker owns the surface. It generates LOD models once per loaded scene,
//! then redraws whenever the camera's redraw flag is set and otherwise waits
//! on a stop channel for one frame interval, so a stop request wakes it
//! immediately.

use crate::error::{MapError, SurfaceError};
use crate::feature::Feature;
use crate::map::Shared;
use crate::render::cull::{query_visible, visible_model_rect};
use crate::render::surface::{DrawTarget, Surface};
use crate::style::argb_to_color;
use flume::{RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Render-loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    /// Never started.
    Idle = 0,
    /// Worker is drawing.
    Running = 1,
    /// Stop requested, worker not yet joined.
    Stopping = 2,
    /// Worker has exited.
    Stopped = 3,
}

impl LoopState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => LoopState::Running,
            2 => LoopState::Stopping,
            3 => LoopState::Stopped,
            _ => LoopState::Idle,
        }
    }

    /// Loading is only allowed while no worker touches the scene.
    pub fn accepts_load(self) -> bool {
        matches!(self, LoopState::Idle | LoopState::Stopped)
    }
}

#[derive(Debug)]
pub struct AtomicLoopState(AtomicU8);

impl AtomicLoopState {
    pub fn new(state: LoopState) -> Self {
        AtomicLoopState(AtomicU8::new(state as u8))
    }

    #[inline]
    pub fn get(&self) -> LoopState {
        LoopState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: LoopState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Move from `Idle`/`Stopped` to `Running`; fails if a worker is live.
    fn try_start(&self) -> bool {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            if !LoopState::from_u8(current).accepts_load() {
                return false;
            }
            match self.0.compare_exchange_weak(
                current,
                LoopState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Handle to a running worker.
pub struct RenderLoop {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl RenderLoop {
    pub(crate) fn spawn<S>(shared: Arc<Shared>, surface: S) -> Result<Self, MapError>
    where
        S: Surface + Send + 'static,
    {
        if !shared.state.try_start() {
            return Err(MapError::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = flume::unbounded::<()>();
        let worker_shared = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name("geojson-render".into())
            .spawn(move || {
                let mut surface = surface;
                prepare_lod(&worker_shared, &surface);
                info!("Render loop running");

                let interval = worker_shared.config.frame_interval();
                loop {
                    if worker_shared.camera.take_redraw() {
                        if let Err(err) = render_frame(&worker_shared, &mut surface) {
                            warn!("Skipping frame: {err}");
                            worker_shared.camera.request_redraw();
                        }
                    }

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                worker_shared.state.set(LoopState::Stopped);
                info!("Render loop stopped");
            });

        match handle {
            Ok(handle) => Ok(RenderLoop {
                stop_tx,
                handle: Some(handle),
                shared,
            }),
            Err(err) => {
                shared.state.set(LoopState::Stopped);
                Err(MapError::Spawn(err))
            }
        }
    }

    /// Signal the worker and wait until it has exited, so the surface can be
    /// released safely afterwards.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shared.state.set(LoopState::Stopping);
        // A send error means the worker already left the loop.
        let _ = self.stop_tx.send(());
        if handle.join().is_err() {
            error!("Render thread panicked");
        }
        self.shared.state.set(LoopState::Stopped);
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Generate LOD models for the current scene if that has not happened yet.
/// A surface without a usable size leaves the scene untouched, so the next
/// start tries again.
fn prepare_lod<S: Surface>(shared: &Shared, surface: &S) {
    let scene = shared.scene.read();
    if scene.lod_ready {
        return;
    }

    let size = surface.size();
    if !(size.x.is_finite() && size.x > 0.0 && size.y.is_finite() && size.y > 0.0) {
        warn!("Deferring LOD generation, surface size is {size}");
        return;
    }

    let bounds = scene.map_bounds;
    let aspect_ratio = if bounds.is_empty() || bounds.width() <= 0.0 {
        1.0
    } else {
        bounds.height() / bounds.width()
    };
    let width = size.x;

    let started = Instant::now();
    for feature in scene.features.iter() {
        if let Err(err) = feature.generate_lod_models(
            width,
            aspect_ratio,
            &shared.config.zoom_levels,
            shared.config.cutoff_distance,
        ) {
            warn!("LOD generation skipped: {err}");
        }
    }
    drop(scene);

    shared.scene.write().lod_ready = true;
    debug!("LOD models generated in {:?}", started.elapsed());
}

fn render_frame<S: Surface>(shared: &Shared, surface: &mut S) -> Result<(), SurfaceError> {
    let started = Instant::now();
    let mut target = surface.try_acquire_drawing_target()?;

    target.clear(argb_to_color(shared.config.background_color));

    let camera = shared.camera.snapshot();
    let features: Arc<Vec<Arc<Feature>>> = Arc::clone(&shared.scene.read().features);
    let area = visible_model_rect(surface.size(), &camera);

    for feature in query_visible(&features, &area) {
        feature.draw(
            &mut target,
            camera.scale,
            camera.offset.x,
            camera.offset.y,
            &shared.stroke_paint,
            &shared.fill_paint,
        );
    }

    surface.submit(target)?;
    debug!("Render time: {:?}", started.elapsed());
    Ok(())
}
