// tests/render_loop_tests.rs

use geojson_lod_view::{
    argb_to_color, DetailLevels, DrawOp, Frame, FrameSlot, FrameSurface, GeoMap, LoopState,
    MapError, Surface, SurfaceError, ViewConfig, ARGB_CYAN,
};
use macroquad::prelude::{vec2, Vec2};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const SEAS: &str = r#"
{
  "type": "FeatureCollection",
  "features": [
    {
      "properties": { "ID": "A", "NAME": "West" },
      "geometry": { "type": "MultiPolygon", "coordinates": [[[[0,0],[4,0],[4,4],[0,4]]]] }
    },
    {
      "properties": { "ID": "B", "NAME": "Overlap" },
      "geometry": { "type": "MultiPolygon", "coordinates": [[[[2,0],[8,0],[8,4],[2,4]]]] }
    }
  ]
}
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn wait_for_frame(slot: &FrameSlot, what: &str, pred: impl Fn(&Frame) -> bool) -> Arc<Frame> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(frame) = slot.latest() {
            if pred(&frame) {
                return frame;
            }
        }
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(5));
    }
}

fn fill_count(frame: &Frame) -> usize {
    frame.fills().count()
}

fn started_map(size: Vec2) -> (GeoMap, FrameSlot) {
    init_logging();
    let mut map = GeoMap::new(ViewConfig::default());
    map.load_str(SEAS).expect("should load");
    let surface = FrameSurface::new(size);
    let slot = surface.slot();
    map.on_surface_available(surface).expect("should start");
    wait_for_frame(&slot, "first frame", |f| fill_count(f) == 2);
    (map, slot)
}

#[test]
fn first_frame_draws_every_feature_in_order() {
    let (mut map, slot) = started_map(vec2(800.0, 400.0));
    assert_eq!(map.state(), LoopState::Running);

    let frame = slot.latest().expect("frame");
    assert!(matches!(frame.ops[0], DrawOp::Clear(_)));
    // Fill then stroke per ring, features in scene order.
    assert!(matches!(frame.ops[1], DrawOp::Fill { .. }));
    assert!(matches!(frame.ops[2], DrawOp::Stroke { .. }));
    match (&frame.ops[1], &frame.ops[3]) {
        (DrawOp::Fill { path: a, .. }, DrawOp::Fill { path: b, .. }) => {
            assert_eq!(a[0], vec2(0.0, 400.0));
            assert_eq!(b[0], vec2(200.0, 400.0));
        }
        other => panic!("unexpected ops {other:?}"),
    }

    for feature in map.features().iter() {
        let levels = feature.detail_levels();
        assert!(matches!(*levels, DetailLevels::Simplified(_)));
        assert_eq!(levels.keys(), vec![1.0, 3.0, 5.0]);
    }

    map.on_surface_destroyed();
    assert_eq!(map.state(), LoopState::Stopped);
}

#[test]
fn load_while_running_fails_and_keeps_scene() {
    let (mut map, _slot) = started_map(vec2(800.0, 400.0));
    let before = map.features();

    let err = map.load_str(SEAS).unwrap_err();
    assert!(matches!(err, MapError::LoadWhileRunning));
    assert!(Arc::ptr_eq(&before, &map.features()));

    map.on_surface_destroyed();
    map.load_str(SEAS).expect("load after stop");
    assert!(!Arc::ptr_eq(&before, &map.features()));
}

#[test]
fn starting_twice_is_rejected() {
    let (mut map, _slot) = started_map(vec2(800.0, 400.0));
    let err = map
        .on_surface_available(FrameSurface::new(vec2(10.0, 10.0)))
        .unwrap_err();
    assert!(matches!(err, MapError::AlreadyRunning));
    map.on_surface_destroyed();
}

#[test]
fn tap_selects_first_feature_and_recolors_next_frame() {
    let (mut map, slot) = started_map(vec2(800.0, 400.0));

    let pressed: Arc<Mutex<Vec<String>>> = Arc::default();
    let seen = Arc::clone(&pressed);
    map.set_feature_press_listener(move |f| {
        seen.lock()
            .unwrap()
            .push(f.properties().get("ID").unwrap_or_default().to_owned());
        f.set_fill_color(ARGB_CYAN);
    });

    // (300, 200) lies in both squares; scene order wins.
    let hit = map.tap(vec2(300.0, 200.0)).expect("hit");
    assert_eq!(hit.properties().get("ID"), Some("A"));
    assert_eq!(*pressed.lock().unwrap(), vec!["A".to_string()]);

    let cyan = argb_to_color(ARGB_CYAN);
    let frame = wait_for_frame(&slot, "recoloured frame", |f| {
        f.fills().any(|(_, color)| color == cyan)
    });
    assert_eq!(frame.fills().next().map(|(_, c)| c), Some(cyan));

    assert_eq!(
        map.feature_at_point(vec2(700.0, 200.0))
            .and_then(|f| f.properties().get("ID").map(str::to_owned)),
        Some("B".to_string())
    );
    assert!(map.tap(vec2(790.0, 10.0)).is_some());
    assert!(map.feature_at_point(vec2(900.0, 200.0)).is_none());

    map.on_surface_destroyed();
}

#[test]
fn hit_testing_follows_the_camera() {
    let (mut map, _slot) = started_map(vec2(800.0, 400.0));

    map.scroll(100.0, 0.0);
    // Screen x 350 lands on model x 450, past the right edge of "A".
    let hit = map.feature_at_point(vec2(150.0, 10.0)).expect("hit");
    assert_eq!(hit.properties().get("ID"), Some("A"));
    let hit = map.feature_at_point(vec2(350.0, 10.0)).expect("hit");
    assert_eq!(hit.properties().get("ID"), Some("B"));

    for _ in 0..10 {
        map.scale_by(10.0, 0.0, 0.0);
    }
    assert_eq!(map.camera().scale, 5.0);

    map.on_surface_destroyed();
}

#[test]
fn panning_redraws_with_new_offset() {
    let (mut map, slot) = started_map(vec2(800.0, 400.0));
    let before = slot.submitted();

    map.scroll(-50.0, 0.0);
    let frame = wait_for_frame(&slot, "panned frame", |f| {
        f.fills().next().map(|(path, _)| path[0]) == Some(vec2(50.0, 400.0))
    });
    assert!(slot.submitted() > before);
    assert_eq!(fill_count(&frame), 2);

    // Panned far enough that "A" is culled.
    map.scroll(600.0, 0.0);
    wait_for_frame(&slot, "culled frame", |f| fill_count(f) == 1);

    map.on_surface_destroyed();
}

#[test]
fn stop_interrupts_a_long_frame_wait() {
    init_logging();
    let config = ViewConfig {
        frame_interval_ms: 60_000,
        ..ViewConfig::default()
    };
    let mut map = GeoMap::new(config);
    map.load_str(SEAS).expect("should load");
    let surface = FrameSurface::new(vec2(100.0, 100.0));
    let slot = surface.slot();
    map.on_surface_available(surface).expect("should start");
    wait_for_frame(&slot, "first frame", |f| fill_count(f) == 2);

    let started = Instant::now();
    map.on_surface_destroyed();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(map.state(), LoopState::Stopped);
}

#[test]
fn restart_keeps_lod_models_and_redraws() {
    let (mut map, slot) = started_map(vec2(800.0, 400.0));
    let points: Vec<usize> = map.features().iter().map(|f| f.point_count()).collect();
    map.on_surface_destroyed();

    let surface = FrameSurface::with_slot(vec2(800.0, 400.0), slot.clone());
    let before = slot.submitted();
    map.on_surface_available(surface).expect("should restart");
    wait_for_frame(&slot, "frame after restart", |_| slot.submitted() > before);

    let after: Vec<usize> = map.features().iter().map(|f| f.point_count()).collect();
    assert_eq!(points, after);
    let first = map.features()[0].bounds();
    assert_eq!(first.right, 400.0);

    map.on_surface_destroyed();
}

#[test]
fn zero_sized_surface_defers_lod_until_a_real_one() {
    init_logging();
    let mut map = GeoMap::new(ViewConfig::default());
    map.load_str(SEAS).expect("should load");

    map.on_surface_available(FrameSurface::new(Vec2::ZERO))
        .expect("should start");
    map.on_surface_destroyed();

    let west = Arc::clone(&map.features()[0]);
    assert!(matches!(*west.detail_levels(), DetailLevels::Full(_)));
    assert_eq!(west.bounds().right, 0.5);

    let surface = FrameSurface::new(vec2(800.0, 400.0));
    let slot = surface.slot();
    map.on_surface_available(surface).expect("should restart");
    wait_for_frame(&slot, "first real frame", |f| fill_count(f) == 2);

    assert!(matches!(*west.detail_levels(), DetailLevels::Simplified(_)));
    assert_eq!(west.bounds().right, 400.0);
    let hit = map.feature_at_point(vec2(100.0, 200.0)).expect("hit");
    assert_eq!(hit.properties().get("ID"), Some("A"));

    map.on_surface_destroyed();
}

/// Refuses the first `failures` acquisitions.
struct FlakySurface {
    inner: FrameSurface,
    failures: usize,
    attempts: Arc<AtomicUsize>,
}

impl Surface for FlakySurface {
    type Target = Frame;

    fn size(&self) -> Vec2 {
        self.inner.size()
    }

    fn try_acquire_drawing_target(&mut self) -> Result<Frame, SurfaceError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(SurfaceError::Unavailable);
        }
        self.inner.try_acquire_drawing_target()
    }

    fn submit(&mut self, frame: Frame) -> Result<(), SurfaceError> {
        self.inner.submit(frame)
    }
}

#[test]
fn unavailable_surface_skips_frames_until_it_recovers() {
    init_logging();
    let mut map = GeoMap::new(ViewConfig {
        frame_interval_ms: 1,
        ..ViewConfig::default()
    });
    map.load_str(SEAS).expect("should load");

    let inner = FrameSurface::new(vec2(100.0, 100.0));
    let slot = inner.slot();
    let attempts = Arc::new(AtomicUsize::new(0));
    let surface = FlakySurface {
        inner,
        failures: 3,
        attempts: Arc::clone(&attempts),
    };

    map.on_surface_available(surface).expect("should start");
    wait_for_frame(&slot, "frame after recovery", |f| fill_count(f) == 2);
    assert!(attempts.load(Ordering::SeqCst) >= 4);

    map.on_surface_destroyed();
}
