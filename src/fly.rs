/*
 * Fly Module
 *
 * A cube body with two flapping wings. The flight path is a closed-form
 * Lissajous curve of wall-clock time; the wing beat advances a fixed phase
 * step per frame, so it is tied to the frame rate.
 */

use nannou::prelude::*;
use std::f32::consts::PI;

use crate::geometry::{cube, cylinder, Material, MaterialLibrary, Mesh};
use crate::scene_graph::{Node, NodeIds};

pub const BODY_COLOR: u32 = 0x3f3f3f;
pub const WING_COLOR: u32 = 0xffffff;

const WING_AMPLITUDE: f32 = PI / 8.0;

pub struct Fly {
    pub group: Node,
    // Grows without bound; must still absorb one step after days of frames
    wing_phase: f64,
    phase_step: f64,
}

impl Fly {
    pub fn new(ids: &mut NodeIds, materials: &mut MaterialLibrary, phase_step: f32) -> Self {
        let body = Node::renderable(ids, "fly_body", cube(materials, 1.0, BODY_COLOR));

        // The wing pivots around its root rather than its middle
        let wing_material = materials.add(Material::flat(WING_COLOR));
        let wing_geometry = cylinder(0.42, 0.08, 1.26, 4).translated(vec3(0.0, 0.21, 0.04));
        let right_wing = Node::renderable(ids, "right_wing", Mesh::new(wing_geometry, wing_material))
            .at(0.0, 0.2, 0.6)
            .rotated(vec3(PI / 4.0, 0.0, PI / 4.0));

        let mut left_wing = right_wing.duplicate(ids, "left_wing");
        left_wing.transform.position.z = -right_wing.transform.position.z;

        let group = Node::group(ids, "fly")
            .at(0.0, 12.71, 19.08)
            .with_child(body)
            .with_child(right_wing)
            .with_child(left_wing);

        Self {
            group,
            wing_phase: 0.0,
            phase_step: phase_step as f64,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.group.transform.position
    }

    pub fn wing_phase(&self) -> f64 {
        self.wing_phase
    }

    pub fn move_wings(&mut self) {
        self.wing_phase += self.phase_step;
        let (right, left) = wing_angles(self.wing_phase);
        if let Some(wing) = self.group.child_named_mut("right_wing") {
            wing.transform.rotation.x = right;
        }
        if let Some(wing) = self.group.child_named_mut("left_wing") {
            wing.transform.rotation.x = left;
        }
    }

    // `timer` is wall-clock milliseconds already multiplied by the flight time scale
    pub fn move_fly(&mut self, timer: f64) {
        let (x, y) = flight_offset(timer);
        self.group.transform.position.x = x;
        self.group.transform.position.y = y;
    }
}

/// Horizontal and vertical position of the fly at `timer`.
pub fn flight_offset(timer: f64) -> (f32, f32) {
    ((4.0 * (timer * 3.0).cos()) as f32, (5.0 * (timer * 6.0).sin()) as f32)
}

/// X rotations of the right and left wing at the given beat phase.
pub fn wing_angles(phase: f64) -> (f32, f32) {
    let swing = phase.cos() as f32 * WING_AMPLITUDE;
    (PI / 4.0 - swing, -PI / 4.0 + swing)
}

/// Smallest timer interval after which the flight path repeats: the LCM of
/// the horizontal (2π/3) and vertical (2π/6) periods.
pub const FLIGHT_PERIOD: f64 = 2.0 * std::f64::consts::PI / 3.0;
