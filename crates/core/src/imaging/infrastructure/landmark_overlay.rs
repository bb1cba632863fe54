//! Debug rendering of located eyes onto a copy of the target image.

use crate::detection::domain::detection_result::DetectionResult;
use crate::detection::domain::landmark_set::LandmarkSet;
use crate::shared::frame::Frame;

const CENTER_COLOR: [u8; 3] = [255, 0, 0];
const CIRCLE_COLOR: [u8; 3] = [0, 255, 0];
const BOUNDARY_COLOR: [u8; 3] = [255, 255, 0];
const CONTOUR_COLOR: [u8; 3] = [0, 128, 255];

/// Draws each eye's center, iris circle and boundary points, plus the eye
/// contour when the raw landmarks are at hand. Returns an RGB copy.
pub fn draw_landmark_overlay(
    frame: &Frame,
    detection: &DetectionResult,
    landmarks: Option<&LandmarkSet>,
) -> Frame {
    let mut out = frame.to_rgb();
    let size = out.size();

    for (side, eye) in detection.eyes() {
        let (cx, cy) = eye.center_px();
        draw_circle(&mut out, (cx as f64, cy as f64), eye.radius_px(), CIRCLE_COLOR);
        for (bx, by) in eye.boundary_px() {
            draw_dot(&mut out, (bx as i32, by as i32), 1, BOUNDARY_COLOR);
        }
        draw_dot(&mut out, (cx, cy), 2, CENTER_COLOR);

        if let Some(set) = landmarks {
            for p in set.eye_contour(side) {
                let (x, y) = p.to_pixel(size);
                draw_dot(&mut out, (x as i32, y as i32), 1, CONTOUR_COLOR);
            }
        }
        log::debug!("Overlay drawn for {side} eye at ({cx}, {cy})");
    }
    out
}

fn put(frame: &mut Frame, x: i32, y: i32, rgb: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < frame.width() && (y as u32) < frame.height() {
        frame.set_rgb(x as u32, y as u32, rgb);
    }
}

fn draw_dot(frame: &mut Frame, center: (i32, i32), radius: i32, rgb: [u8; 3]) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(frame, center.0 + dx, center.1 + dy, rgb);
            }
        }
    }
}

fn draw_circle(frame: &mut Frame, center: (f64, f64), radius: f64, rgb: [u8; 3]) {
    // One sample per pixel of circumference keeps the outline gap-free.
    let steps = ((std::f64::consts::TAU * radius).ceil() as usize).max(8);
    for i in 0..steps {
        let t = std::f64::consts::TAU * i as f64 / steps as f64;
        let x = center.0 + radius * t.cos();
        let y = center.1 + radius * t.sin();
        put(frame, x.round() as i32, y.round() as i32, rgb);
    }
}
