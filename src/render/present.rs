//! Replays a recorded [`Frame`] with macroquad. Must run on the window thread.

use crate::render::frame::{DrawOp, Frame};
use earcutr::earcut;
use log::debug;
use macroquad::prelude::*;

/// Split a closed path into triangles. Returns nothing for degenerate paths.
pub fn triangulate(path: &[Vec2]) -> Vec<[Vec2; 3]> {
    let mut n = path.len();
    // earcut expects the closing vertex to be implicit.
    while n >= 2 && path[0] == path[n - 1] {
        n -= 1;
    }
    if n < 3 {
        return Vec::new();
    }

    let coords: Vec<f64> = path[..n]
        .iter()
        .flat_map(|p| [p.x as f64, p.y as f64])
        .collect();

    match earcut(&coords, &[], 2) {
        Ok(idx) => idx
            .chunks_exact(3)
            .map(|t| [path[t[0]], path[t[1]], path[t[2]]])
            .collect(),
        Err(err) => {
            debug!("Triangulation failed for {n}-point path: {err:?}");
            Vec::new()
        }
    }
}

fn draw_closed_polyline(path: &[Vec2], thickness: f32, color: Color) {
    let Some(&last) = path.last() else {
        return;
    };
    let mut prev = last;
    for &p in path {
        draw_line(prev.x, prev.y, p.x, p.y, thickness, color);
        prev = p;
    }
}

/// Draw `frame` into the current macroquad window.
pub fn present(frame: &Frame) {
    for op in &frame.ops {
        match op {
            DrawOp::Clear(color) => clear_background(*color),
            DrawOp::Fill { path, color } => {
                for [a, b, c] in triangulate(path) {
                    draw_triangle(a, b, c, *color);
                }
            }
            DrawOp::Stroke { path, color, width } => {
                draw_closed_polyline(path, width.max(1.0), *color);
            }
        }
    }
}
