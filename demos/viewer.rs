use geojson_lod_view::{present, Feature, FrameSurface, GeoMap, ViewConfig, ARGB_CYAN};
use macroquad::prelude::*;
use std::sync::{Arc, Mutex};

/// Drags shorter than this, in pixels, count as a tap.
const TAP_SLOP: f32 = 6.0;

fn window_conf() -> Conf {
    Conf {
        window_title: "GeoJSON Viewer".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let _ = env_logger::try_init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/seas.geojson".to_string());
    let config = match std::env::args().nth(2) {
        Some(config) => ViewConfig::from_file(config).expect("Failed to read view config"),
        None => ViewConfig::default(),
    };

    let mut map = GeoMap::open(&path, config).expect("Failed to load map");

    // Highlight the pressed feature and restore the previous one.
    let default_fill = map.default_fill_color();
    let selected: Mutex<Option<Arc<Feature>>> = Mutex::new(None);
    map.set_feature_press_listener(move |feature| {
        let mut selected = selected.lock().unwrap();
        if let Some(previous) = selected.take() {
            previous.set_fill_color(default_fill);
        }
        feature.set_fill_color(ARGB_CYAN);
        println!("pressed {:?}", feature.properties().get("NAME"));
        *selected = Some(Arc::clone(feature));
    });

    let surface = FrameSurface::new(vec2(screen_width(), screen_height()));
    let slot = surface.slot();
    map.on_surface_available(surface)
        .expect("Failed to start render loop");

    let mut drag_start: Option<Vec2> = None;
    let mut last = Vec2::ZERO;

    loop {
        let mouse = Vec2::from(mouse_position());

        if is_mouse_button_pressed(MouseButton::Left) {
            drag_start = Some(mouse);
            last = mouse;
        } else if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse - last;
            if delta != Vec2::ZERO {
                map.scroll(-delta.x, -delta.y);
            }
            last = mouse;
        }

        if is_mouse_button_released(MouseButton::Left) {
            if let Some(start) = drag_start.take() {
                if start.distance(mouse) < TAP_SLOP {
                    map.tap(mouse);
                }
            }
        }

        let (_, wheel) = mouse_wheel();
        if wheel != 0.0 {
            let factor = if wheel > 0.0 { 1.1 } else { 1.0 / 1.1 };
            map.scale_by(factor, mouse.x, mouse.y);
        }

        match slot.latest() {
            Some(frame) => present(&frame),
            None => clear_background(WHITE),
        }

        let camera = map.camera();
        draw_text(
            &format!("FPS: {}  zoom: {:.2}", get_fps(), camera.scale),
            20.0,
            30.0,
            24.0,
            DARKGRAY,
        );

        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        next_frame().await;
    }

    map.on_surface_destroyed();
}
