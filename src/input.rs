/*
 * Input Module
 *
 * This module forwards window events to the banner. nannou reports pointer
 * positions relative to the window center with y up; the banner expects
 * client pixels with the origin at the top-left corner and y down.
 *
 * Features:
 * - Mouse and touch tracking for both animation loops
 * - Resizing the star canvas with the window
 * - Toggling the debug overlay
 * - Teardown when the window closes
 */

use nannou::event::TouchEvent;
use nannou::prelude::*;
use nannou::winit::event::TouchPhase;

use crate::app::Model;

/// Window point to client pixels.
pub fn to_client(pos: Point2, window_rect: Rect) -> Vec2 {
    vec2(pos.x - window_rect.left(), window_rect.top() - pos.y)
}

// Mouse moved event handler
pub fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    let client = to_client(pos, app.window_rect());
    model.banner.pointer_moved(client);
}

// Touch event handler; only moves steer the scene
pub fn touch(app: &App, model: &mut Model, touch: TouchEvent) {
    if touch.phase != TouchPhase::Moved {
        return;
    }
    let client = to_client(touch.position, app.window_rect());
    // A window has no page to scroll, so the suppression flag has no consumer
    let _ = model.banner.touch_moved(&[client]);
}

pub fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.banner.resized(size.x);
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if key == Key::D {
        model.show_debug = !model.show_debug;
        log::debug!("Debug overlay {}", if model.show_debug { "shown" } else { "hidden" });
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}

pub fn closed(_app: &App, model: &mut Model) {
    model.banner.unmount();
}
