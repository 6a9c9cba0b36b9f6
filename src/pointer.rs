/*
 * Pointer Module
 *
 * Pointer state shared by both animation loops, the mapping from client
 * coordinates to normalized device coordinates, and ray picking against a
 * subtree of the scene graph.
 *
 * Known limitation: normalisation always divides by the fixed logical
 * viewport size and uses page coordinates, not coordinates relative to the
 * 3D surface or its current size. A pointer is only mapped correctly while
 * the surface sits at the page origin at its logical size.
 */

use nannou::glam::Mat4;
use nannou::prelude::*;

use crate::camera::Ray;
use crate::geometry::{MaterialId, MaterialLibrary};
use crate::scene_graph::{Node, NodeId};

/// Hex colors that are never overwritten by a recolor: eye whites and pupils.
pub const RESERVED_COLORS: [&str; 2] = ["ffffff", "3f3f3f"];

pub const RECOLOR_SATURATION: f32 = 1.0;
pub const RECOLOR_LIGHTNESS: f32 = 0.6;

// Last known pointer, in client pixels
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub position: Option<Vec2>,
    // Reserved, no behaviour reads these
    pub down: bool,
    pub moved: bool,
}

pub struct PointerBridge {
    pub screen: PointerState,
    ndc: Vec2,
    logical_viewport: f32,
}

impl PointerBridge {
    pub fn new(logical_viewport: f32) -> Self {
        Self {
            screen: PointerState::default(),
            // Until the first move the picking ray goes through the center
            ndc: Vec2::ZERO,
            logical_viewport,
        }
    }

    pub fn pointer_moved(&mut self, client: Vec2) {
        self.screen.position = Some(client);
        self.screen.moved = true;
        self.ndc = to_ndc(client, self.logical_viewport);
    }

    // Only the 3D scene follows touches; the star field listens to the mouse.
    // Returns true: the host must not scroll the page for this touch.
    pub fn touch_moved(&mut self, touches: &[Vec2]) -> bool {
        if let Some(first) = touches.first() {
            self.ndc = to_ndc(*first, self.logical_viewport);
        }
        true
    }

    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }
}

/// Map client pixels to [-1, 1] with y pointing up.
pub fn to_ndc(client: Vec2, logical_viewport: f32) -> Vec2 {
    vec2(
        (client.x / logical_viewport) * 2.0 - 1.0,
        -(client.y / logical_viewport) * 2.0 + 1.0,
    )
}

#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub distance: f32,
    pub point: Vec3,
    pub node: NodeId,
    pub name: &'static str,
    pub material: MaterialId,
}

/// Nearest intersection of `ray` with any renderable node of the subtree.
/// `parent_world` is the world matrix of the subtree root's parent.
pub fn pick(root: &Node, parent_world: Mat4, ray: &Ray) -> Option<Hit> {
    let mut nearest: Option<Hit> = None;

    root.visit(parent_world, &mut |node, world| {
        let Some(mesh) = node.mesh() else {
            return;
        };
        for [a, b, c] in mesh.geometry.triangles() {
            let (a, b, c) = (
                world.transform_point3(a),
                world.transform_point3(b),
                world.transform_point3(c),
            );
            let Some(distance) = ray.intersect_triangle(a, b, c) else {
                continue;
            };
            if nearest.map_or(true, |hit| distance < hit.distance) {
                nearest = Some(Hit {
                    distance,
                    point: ray.at(distance),
                    node: node.id,
                    name: node.name,
                    material: mesh.material,
                });
            }
        }
    });

    nearest
}

/// Hue in [0, 1) for the wall-clock time, sweeping once around the wheel
/// every `1 / hue_time_scale` milliseconds.
pub fn hue_at(now_ms: f64, hue_time_scale: f64) -> f32 {
    let time = now_ms * hue_time_scale;
    (((360.0 * (1.0 + time)) % 360.0) / 360.0) as f32
}

/// Paint the struck material with `hue` unless its color is reserved.
/// Returns whether the material changed.
pub fn paint(materials: &mut MaterialLibrary, hit: &Hit, hue: f32) -> bool {
    let material = materials.get_mut(hit.material);
    let current = material.color.hex_string();
    if RESERVED_COLORS.contains(&current.as_str()) {
        return false;
    }
    material.color.set_hsl(hue, RECOLOR_SATURATION, RECOLOR_LIGHTNESS);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{capped_cylinder, Color};
    use crate::scene_graph::NodeIds;

    fn down_the_z_axis(x: f32, y: f32) -> Ray {
        Ray {
            origin: vec3(x, y, 50.0),
            direction: vec3(0.0, 0.0, -1.0),
        }
    }

    #[test]
    fn ndc_uses_the_fixed_viewport() {
        assert_eq!(to_ndc(vec2(0.0, 0.0), 600.0), vec2(-1.0, 1.0));
        assert_eq!(to_ndc(vec2(300.0, 300.0), 600.0), vec2(0.0, 0.0));
        assert_eq!(to_ndc(vec2(600.0, 600.0), 600.0), vec2(1.0, -1.0));
        // Beyond the viewport the coordinates leave [-1, 1]
        assert_eq!(to_ndc(vec2(1200.0, 0.0), 600.0).x, 3.0);
    }

    #[test]
    fn touch_moves_only_the_3d_pointer() {
        let mut bridge = PointerBridge::new(600.0);
        assert_eq!(bridge.ndc(), Vec2::ZERO);

        assert!(bridge.touch_moved(&[vec2(150.0, 450.0), vec2(0.0, 0.0)]));
        assert_eq!(bridge.ndc(), vec2(-0.5, -0.5));
        assert!(bridge.screen.position.is_none());

        bridge.pointer_moved(vec2(600.0, 0.0));
        assert_eq!(bridge.ndc(), vec2(1.0, 1.0));
        assert_eq!(bridge.screen.position, Some(vec2(600.0, 0.0)));

        // An empty touch list keeps the last coordinates
        assert!(bridge.touch_moved(&[]));
        assert_eq!(bridge.ndc(), vec2(1.0, 1.0));
    }

    #[test]
    fn hue_sweeps_with_time() {
        assert_eq!(hue_at(0.0, 0.00005), 0.0);
        assert!((hue_at(5_000.0, 0.00005) - 0.25).abs() < 1e-6);
        // One full turn every 20 seconds
        assert!((hue_at(20_000.0, 0.00005) - hue_at(0.0, 0.00005)).abs() < 1e-6);
        let h = hue_at(1_700_000_123_456.0, 0.00005);
        assert!((0.0..1.0).contains(&h));
    }

    #[test]
    fn nearest_hit_wins() {
        let mut ids = NodeIds::new();
        let mut lib = MaterialLibrary::new();
        let near = Node::renderable(&mut ids, "near", capped_cylinder(&mut lib, 0x112233, 1.0, 1.0, 1.0, 8)).at(0.0, 0.0, 5.0);
        let far = Node::renderable(&mut ids, "far", capped_cylinder(&mut lib, 0x445566, 1.0, 1.0, 1.0, 8));
        let root = Node::group(&mut ids, "root").with_child(far).with_child(near);

        let hit = pick(&root, Mat4::IDENTITY, &down_the_z_axis(0.1, 0.0)).unwrap();
        assert_eq!(hit.name, "near");
        assert!(hit.point.z > 5.0);

        assert!(pick(&root, Mat4::IDENTITY, &down_the_z_axis(10.0, 0.0)).is_none());
    }

    #[test]
    fn reserved_surfaces_keep_their_color() {
        let mut ids = NodeIds::new();
        let mut lib = MaterialLibrary::new();
        let white = Node::renderable(&mut ids, "eye_white", capped_cylinder(&mut lib, 0xffffff, 1.0, 1.0, 1.0, 5));
        let pupil = Node::renderable(&mut ids, "pupil", capped_cylinder(&mut lib, 0x3f3f3f, 1.0, 1.0, 1.0, 5)).at(5.0, 0.0, 0.0);
        let root = Node::group(&mut ids, "eye").with_child(white).with_child(pupil);

        for (x, hex) in [(0.0, 0xffffff), (5.0, 0x3f3f3f)] {
            let hit = pick(&root, Mat4::IDENTITY, &down_the_z_axis(x, 0.2)).unwrap();
            assert!(!paint(&mut lib, &hit, 0.3));
            assert_eq!(lib.get(hit.material).color.hex(), hex);
        }
    }

    #[test]
    fn other_surfaces_take_the_sweep_color() {
        let mut ids = NodeIds::new();
        let mut lib = MaterialLibrary::new();
        let skin = Node::renderable(&mut ids, "skin", capped_cylinder(&mut lib, 0x1ccca3, 1.0, 1.0, 1.0, 5));

        let hit = pick(&skin, Mat4::IDENTITY, &down_the_z_axis(0.0, 0.0)).unwrap();
        assert!(paint(&mut lib, &hit, 0.0));

        let mut expected = Color::from_hex(0);
        expected.set_hsl(0.0, 1.0, 0.6);
        assert_eq!(lib.get(hit.material).color, expected);
    }
}
