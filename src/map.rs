use crate::config::ViewConfig;
use crate::error::MapError;
use crate::feature::Feature;
use crate::geom::Bounds;
use crate::ir_geo::IrFeatureCollection;
use crate::loader::json_loader::*;
use crate::render::render_loop::{AtomicLoopState, LoopState, RenderLoop};
use crate::render::surface::Surface;
use crate::scene::{build_scene, LoadReport};
use crate::style::Paint;
use crate::view::{Camera, CameraSnapshot};
use anyhow::Context;
use log::info;
use macroquad::prelude::*;
use parking_lot::{Mutex, RwLock};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;

type PressListener = Arc<dyn Fn(&Arc<Feature>) + Send + Sync>;

pub(crate) struct SceneState {
    pub features: Arc<Vec<Arc<Feature>>>,
    /// Raw extent of the loaded data; only used for the aspect ratio.
    pub map_bounds: Bounds,
    pub lod_ready: bool,
}

/// State shared with the render worker.
pub(crate) struct Shared {
    pub scene: RwLock<SceneState>,
    pub camera: Camera,
    pub state: AtomicLoopState,
    pub config: ViewConfig,
    pub stroke_paint: Paint,
    pub fill_paint: Paint,
}

/// A GeoJSON MultiPolygon map rendered by a background loop.
///
/// Load before the surface becomes available, then drive the camera from
/// decoded gestures and hit-test taps:
///
/// ```no_run
/// use geojson_lod_view::{FrameSurface, GeoMap, ViewConfig};
/// use macroquad::prelude::vec2;
///
/// let mut map = GeoMap::open("assets/seas.geojson", ViewConfig::default())?;
/// map.set_feature_press_listener(|f| println!("{:?}", f.properties().get("NAME")));
/// map.on_surface_available(FrameSurface::new(vec2(1280.0, 720.0)))?;
/// map.scale_by(1.5, 640.0, 360.0);
/// map.tap(vec2(100.0, 200.0));
/// map.on_surface_destroyed();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct GeoMap {
    shared: Arc<Shared>,
    listener: Mutex<Option<PressListener>>,
    render_loop: Option<RenderLoop>,
}

impl GeoMap {
    /// Empty map with paint defaults and camera limits from `config`.
    pub fn new(config: ViewConfig) -> Self {
        let stroke_paint = Paint::stroke(config.stroke_color, config.stroke_width);
        let fill_paint = Paint::fill(config.fill_color);
        let shared = Shared {
            scene: RwLock::new(SceneState {
                features: Arc::new(Vec::new()),
                map_bounds: Bounds::empty(),
                lod_ready: false,
            }),
            camera: Camera::new(config.min_scale, config.max_scale),
            state: AtomicLoopState::new(LoopState::Idle),
            config,
            stroke_paint,
            fill_paint,
        };

        GeoMap {
            shared: Arc::new(shared),
            listener: Mutex::new(None),
            render_loop: None,
        }
    }

    /// Validate `config`, then load a GeoJSON file.
    pub fn open(path: impl AsRef<Path>, config: ViewConfig) -> anyhow::Result<Self> {
        let path = path.as_ref();
        config.validate().context("Validating view config")?;
        let map = Self::new(config);
        let ir = decode_collection_file(path)
            .with_context(|| format!("Decoding GeoJSON file {}", path.display()))?;
        map.load_collection(ir)
            .with_context(|| format!("Loading features from {}", path.display()))?;
        Ok(map)
    }

    /// Replace the scene. Fails while the render loop is running.
    pub fn load_collection(&self, ir: IrFeatureCollection) -> Result<LoadReport, MapError> {
        if !self.state().accepts_load() {
            return Err(MapError::LoadWhileRunning);
        }

        let loaded = build_scene(ir, self.default_stroke_color(), self.default_fill_color());

        let mut scene = self.shared.scene.write();
        // Re-check under the lock so a concurrent start cannot slip in.
        if !self.state().accepts_load() {
            return Err(MapError::LoadWhileRunning);
        }
        scene.features = Arc::new(loaded.features.into_iter().map(Arc::new).collect());
        scene.map_bounds = loaded.map_bounds;
        scene.lod_ready = false;
        drop(scene);

        self.shared.camera.reset();
        Ok(loaded.report)
    }

    /// Load from a parsed JSON tree.
    pub fn load_value(&self, value: JsonValue) -> Result<LoadReport, MapError> {
        if !self.state().accepts_load() {
            return Err(MapError::LoadWhileRunning);
        }
        self.load_collection(decode_collection_value(value)?)
    }

    /// Load from GeoJSON text.
    pub fn load_str(&self, json: &str) -> Result<LoadReport, MapError> {
        if !self.state().accepts_load() {
            return Err(MapError::LoadWhileRunning);
        }
        self.load_collection(decode_collection_str(json)?)
    }

    /// Load a `.json` or `.geojson` file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadReport, MapError> {
        if !self.state().accepts_load() {
            return Err(MapError::LoadWhileRunning);
        }
        self.load_collection(decode_collection_file(path)?)
    }

    /// All features in scene order.
    pub fn features(&self) -> Arc<Vec<Arc<Feature>>> {
        Arc::clone(&self.shared.scene.read().features)
    }

    /// Extent of the loaded data before normalization.
    pub fn map_bounds(&self) -> Bounds {
        self.shared.scene.read().map_bounds
    }

    /// Configuration the map was created with.
    pub fn config(&self) -> &ViewConfig {
        &self.shared.config
    }

    /// Fill colour new features start with.
    pub fn default_fill_color(&self) -> u32 {
        self.shared.config.fill_color
    }

    /// Stroke colour new features start with.
    pub fn default_stroke_color(&self) -> u32 {
        self.shared.config.stroke_color
    }

    /// Called with the hit feature on every [`tap`](Self::tap) that hits one.
    pub fn set_feature_press_listener<F>(&self, listener: F)
    where
        F: Fn(&Arc<Feature>) + Send + Sync + 'static,
    {
        *self.listener.lock() = Some(Arc::new(listener));
    }

    /// Remove the press listener.
    pub fn clear_feature_press_listener(&self) {
        *self.listener.lock() = None;
    }

    /// Render-loop state.
    pub fn state(&self) -> LoopState {
        self.shared.state.get()
    }

    /// Current camera transform.
    pub fn camera(&self) -> CameraSnapshot {
        self.shared.camera.snapshot()
    }

    /// Pan by a screen-space delta.
    pub fn scroll(&self, dx: f32, dy: f32) {
        self.shared.camera.scroll(dx, dy);
    }

    /// Zoom around a screen point, clamped to the configured limits.
    pub fn scale_by(&self, factor: f32, focus_x: f32, focus_y: f32) {
        self.shared.camera.scale_by(factor, focus_x, focus_y);
    }

    /// Request a frame even if the camera did not move.
    pub fn force_redraw(&self) {
        self.shared.camera.request_redraw();
    }

    /// First feature, in scene order, under a screen-space point.
    pub fn feature_at_point(&self, screen: Vec2) -> Option<Arc<Feature>> {
        let p = self.shared.camera.screen_to_model(screen);
        let features = self.features();
        features.iter().find(|f| f.contains_point(p)).cloned()
    }

    /// Hit-test a tap, notify the press listener and redraw.
    pub fn tap(&self, screen: Vec2) -> Option<Arc<Feature>> {
        let feature = self.feature_at_point(screen)?;
        // Cloned out so the listener may replace itself.
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(&feature);
            self.force_redraw();
        }
        Some(feature)
    }

    /// Start the render loop on `surface`.
    pub fn on_surface_available<S>(&mut self, surface: S) -> Result<(), MapError>
    where
        S: Surface + Send + 'static,
    {
        if self.render_loop.is_some() {
            return Err(MapError::AlreadyRunning);
        }
        let scene = self.shared.scene.read();
        info!(
            "Surface available ({} features), starting render loop",
            scene.features.len()
        );
        drop(scene);

        self.render_loop = Some(RenderLoop::spawn(Arc::clone(&self.shared), surface)?);
        self.force_redraw();
        Ok(())
    }

    /// Stop the render loop and wait for it to exit.
    pub fn on_surface_destroyed(&mut self) {
        if let Some(render_loop) = self.render_loop.take() {
            render_loop.stop();
        }
    }
}

impl Drop for GeoMap {
    fn drop(&mut self) {
        self.on_surface_destroyed();
    }
}
