/*
 * UI Module
 *
 * This module contains functions for creating and updating the tuning panel
 * using nannou_egui, and for drawing the debug overlay onto the frame.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::{BannerParams, ParticleParams};

// Update the tuning panel. Returns whether any star parameter changed.
pub fn update_ui(
    egui: &mut Egui,
    params: &mut ParticleParams,
    show_debug: &mut bool,
    debug_info: &DebugInfo,
) -> bool {
    let before = (params.mouse_distance, params.max_radius);

    let ctx = egui.begin_frame();

    egui::Window::new("Banner Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Stars", |ui| {
                ui.add(egui::Slider::new(&mut params.mouse_distance, BannerParams::get_mouse_distance_range()).text("Pointer Distance"));
                ui.add(egui::Slider::new(&mut params.max_radius, BannerParams::get_max_radius_range()).text("Max Radius"));
            });

            ui.collapsing("Scene", |ui| {
                ui.label(format!("Pointer NDC: ({:.2}, {:.2})", debug_info.pointer_ndc.x, debug_info.pointer_ndc.y));
                ui.label(format!("Hit: {}", debug_info.last_hit.unwrap_or("-")));
                ui.label(format!("Recolors: {}", debug_info.recolors));
            });

            ui.separator();
            ui.label(format!("FPS: {:.1}", debug_info.fps));
            ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));

            ui.checkbox(show_debug, "Show Debug Info");
        });

    // The slider floor sits at the birth radius, but a config may start higher
    params.max_radius = params.max_radius.max(params.radius);

    before != (params.mouse_distance, params.max_radius)
}

// Draw debug information on the screen
pub fn draw_debug_info(
    draw: &nannou::Draw,
    debug_info: &DebugInfo,
    window_rect: nannou::geom::Rect,
    stars: usize,
    scene_active: bool,
) {
    let lines = debug_info.lines(stars, scene_active);

    // Background panel in the bottom-left corner, clear of the 3D viewport
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 220.0;
    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.left() + panel_width / 2.0;
    let panel_y = window_rect.bottom() + panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.left() + margin;
    let text_y = window_rect.bottom() + panel_height - margin;

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        draw.text(text)
            .x_y(text_x + 80.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
