/*
 * Renderer Module
 *
 * This module draws the banner: the star field across the top of the window
 * and the 3D scene inside its fixed viewport at the top-left corner, with
 * the debug overlay and the tuning panel on top.
 *
 * The 3D scene is drawn with the 2D `Draw` API. Every triangle is projected
 * to the viewport, lit once with a single face normal (flat shading) and
 * the faces are painted far to near. The 3D surface has a transparent
 * clear color, so the stars show through around the creature.
 */

use nannou::glam::Mat4;
use nannou::prelude::*;

use crate::app::Model;
use crate::geometry::Color;
use crate::stage::{Light, Stage};
use crate::ui;

// Page color behind both surfaces
const BACKGROUND: (f32, f32, f32) = (0.03, 0.04, 0.07);

#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub points: [Vec2; 3],
    /// Mean NDC depth; larger is further away.
    pub depth: f32,
    pub color: Color,
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(rgb(BACKGROUND.0, BACKGROUND.1, BACKGROUND.2));

    let window_rect = app.window_rect();
    let particles = &model.banner.particles;

    let canvas = top_left_rect(window_rect, particles.width(), particles.height());
    particles.draw(&draw, canvas);

    if let Some(stage) = &model.banner.stage {
        let side = model.params.scene.logical_viewport;
        let viewport = top_left_rect(window_rect, side, side);
        for face in scene_faces(stage, viewport) {
            let [a, b, c] = face.points;
            draw.tri().points(a, b, c).color(face.color.to_rgb());
        }
    }

    if model.show_debug {
        ui::draw_debug_info(
            &draw,
            &model.debug_info,
            window_rect,
            particles.particles().len(),
            model.banner.stage.is_some(),
        );
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        log::error!("Failed to render frame: {err:?}");
    }

    if model.show_debug {
        if let Err(err) = model.egui.draw_to_frame(&frame) {
            log::error!("Failed to render tuning panel: {err:?}");
        }
    }
}

// Rectangle of the given size whose top-left corner is the window's
pub fn top_left_rect(window_rect: Rect, width: f32, height: f32) -> Rect {
    Rect::from_corners(
        pt2(window_rect.left(), window_rect.top()),
        pt2(window_rect.left() + width, window_rect.top() - height),
    )
}

/// All visible triangles of the stage, lit and sorted back to front, in the
/// window coordinates of `viewport`.
pub fn scene_faces(stage: &Stage, viewport: Rect) -> Vec<Face> {
    let camera = &stage.camera;
    let view_projection = camera.view_projection();
    let mut faces = Vec::new();

    for root in stage.roots() {
        root.visit(Mat4::IDENTITY, &mut |node, world| {
            let Some(mesh) = node.mesh() else {
                return;
            };
            let base = stage.materials.get(mesh.material).color;

            for [a, b, c] in mesh.geometry.triangles() {
                let world_points = [
                    world.transform_point3(a),
                    world.transform_point3(b),
                    world.transform_point3(c),
                ];

                let mut ndc = [Vec3::ZERO; 3];
                let mut clipped = false;
                for (out, point) in ndc.iter_mut().zip(world_points) {
                    match camera.project(&view_projection, point) {
                        Some(p) if (-1.0..=1.0).contains(&p.z) => *out = p,
                        _ => clipped = true,
                    }
                }
                if clipped {
                    continue;
                }

                let [wa, wb, wc] = world_points;
                let cross = (wb - wa).cross(wc - wa);
                let length = cross.length();
                if length <= f32::EPSILON {
                    continue;
                }
                // Double-sided: light the side that faces the camera
                let mut normal = cross / length;
                let centroid = (wa + wb + wc) / 3.0;
                if normal.dot(camera.position - centroid) < 0.0 {
                    normal = -normal;
                }

                faces.push(Face {
                    points: ndc.map(|p| ndc_to_viewport(p.truncate(), viewport)),
                    depth: (ndc[0].z + ndc[1].z + ndc[2].z) / 3.0,
                    color: base.scaled(shade(&stage.lights, normal)),
                });
            }
        });
    }

    // Painter's order: far faces first
    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    log::trace!("Built {} scene faces", faces.len());
    faces
}

pub fn ndc_to_viewport(ndc: Vec2, viewport: Rect) -> Vec2 {
    vec2(
        viewport.x() + ndc.x * viewport.w() / 2.0,
        viewport.y() + ndc.y * viewport.h() / 2.0,
    )
}

/// Light reaching a surface with the given world normal: hemisphere ambient
/// blended on the normal's y, plus a Lambert term per directional light.
pub fn shade(lights: &[Light], normal: Vec3) -> Color {
    let mut total = Color { r: 0.0, g: 0.0, b: 0.0 };

    for light in lights {
        let (color, weight) = match *light {
            Light::Hemisphere { sky, ground, intensity } => {
                let t = 0.5 * normal.y + 0.5;
                let mixed = Color {
                    r: ground.r + (sky.r - ground.r) * t,
                    g: ground.g + (sky.g - ground.g) * t,
                    b: ground.b + (sky.b - ground.b) * t,
                };
                (mixed, intensity)
            }
            Light::Directional { color, intensity, position, .. } => {
                // Directional lights shine from their position toward the origin
                let lambert = normal.dot(position.normalize()).max(0.0);
                (color, intensity * lambert)
            }
        };
        total.r += color.r * weight;
        total.g += color.g * weight;
        total.b += color.b * weight;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SceneParams;

    fn hemisphere_only() -> Vec<Light> {
        vec![Light::Hemisphere {
            sky: Color::from_hex(0xffffff),
            ground: Color::from_hex(0x000000),
            intensity: 1.0,
        }]
    }

    #[test]
    fn hemisphere_blends_from_ground_to_sky() {
        let lights = hemisphere_only();
        assert_eq!(shade(&lights, vec3(0.0, 1.0, 0.0)).r, 1.0);
        assert_eq!(shade(&lights, vec3(0.0, -1.0, 0.0)).r, 0.0);
        assert_eq!(shade(&lights, vec3(1.0, 0.0, 0.0)).g, 0.5);
    }

    #[test]
    fn directional_light_only_reaches_facing_surfaces() {
        let lights = vec![Light::Directional {
            color: Color::from_hex(0xffffff),
            intensity: 0.8,
            position: vec3(0.0, 0.0, 10.0),
            casts_shadow: false,
        }];
        assert!((shade(&lights, vec3(0.0, 0.0, 1.0)).b - 0.8).abs() < 1e-6);
        assert_eq!(shade(&lights, vec3(0.0, 0.0, -1.0)).b, 0.0);
        assert_eq!(shade(&lights, vec3(1.0, 0.0, 0.0)).b, 0.0);
    }

    #[test]
    fn ndc_corners_land_on_viewport_corners() {
        let viewport = top_left_rect(Rect::from_w_h(1280.0, 720.0), 600.0, 600.0);
        assert_eq!(ndc_to_viewport(vec2(-1.0, 1.0), viewport), vec2(-640.0, 360.0));
        assert_eq!(ndc_to_viewport(vec2(1.0, -1.0), viewport), vec2(-40.0, -240.0));
    }

    #[test]
    fn scene_faces_are_in_view_and_sorted() {
        let stage = Stage::new(&SceneParams::default());
        let viewport = top_left_rect(Rect::from_w_h(1280.0, 720.0), 600.0, 600.0);
        let faces = scene_faces(&stage, viewport);
        assert!(!faces.is_empty());

        for pair in faces.windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
        for face in &faces {
            assert!(face.depth >= -1.0 && face.depth <= 1.0);
            let c = face.color;
            assert!(c.r <= 1.0 && c.g <= 1.0 && c.b <= 1.0);
        }
    }

    #[test]
    fn recolor_shows_up_in_the_faces() {
        let mut stage = Stage::new(&SceneParams::default());
        let viewport = Rect::from_w_h(600.0, 600.0);
        let before: Vec<Color> = scene_faces(&stage, viewport).iter().map(|f| f.color).collect();

        stage.materials.get_mut(stage.chameleon.skin).color = Color::from_hex(0xff0000);
        let after: Vec<Color> = scene_faces(&stage, viewport).iter().map(|f| f.color).collect();

        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
    }
}
