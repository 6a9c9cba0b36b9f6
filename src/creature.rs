/*
 * Creature Module
 *
 * The low-poly chameleon. Every part is a capped cylinder (the head is a
 * coarse sphere) placed with hand-tuned offsets relative to its parent.
 * One skin material is shared by all body parts, so painting any of them
 * repaints the whole animal. The eye whites and pupils have their own
 * materials and are never repainted.
 *
 * Each frame the head turns to face the fly.
 */

use nannou::glam::{Mat3, Mat4};
use nannou::prelude::*;

use crate::geometry::{capped_cylinder, cylinder, sphere, Material, MaterialId, MaterialLibrary, Mesh};
use crate::scene_graph::{euler_xyz_from_matrix, extract_rotation, rad, Node, NodeIds};

pub const SKIN_COLOR: u32 = 0x1ccca3;
pub const EYE_WHITE_COLOR: u32 = 0xffffff;
pub const PUPIL_COLOR: u32 = 0x3f3f3f;

// The head is pinned at this height inside the creature group
const HEAD_HEIGHT: f32 = 1.0;

pub const HEAD: &str = "head";
pub const BODY: &str = "body";
pub const TAIL: &str = "tail";
pub const LEGS: [&str; 4] = ["front_right_leg", "front_left_leg", "back_right_leg", "back_left_leg"];

pub struct Chameleon {
    pub group: Node,
    pub skin: MaterialId,
}

impl Chameleon {
    pub fn new(ids: &mut NodeIds, materials: &mut MaterialLibrary) -> Self {
        let skin = materials.add(Material::flat(SKIN_COLOR));

        let mut group = Node::group(ids, "chameleon")
            .at(-1.0, 3.0, 2.7)
            .rotated_deg(18.84, 0.0, 2.2);

        group.add(build_head(ids, materials, skin));
        group.add(build_body(ids, skin));
        group.add(build_tail(ids, skin));
        for leg in build_legs(ids, skin) {
            group.add(leg);
        }

        // Every mesh of the animal casts and receives shadows
        group.set_shadows(true, true);

        Self { group, skin }
    }

    pub fn head(&self) -> Option<&Node> {
        self.group.child_named(HEAD)
    }

    // Turn the head so its +Z axis faces `target` (world space), then apply
    // the fixed offset that lines the mesh's snout up with that axis.
    pub fn move_head(&mut self, target: Vec3) {
        let parent_world = self.group.transform.local_matrix();
        let Some(head) = self.group.child_named_mut(HEAD) else {
            return;
        };

        head.transform.position.y = HEAD_HEIGHT;

        let head_world = parent_world.transform_point3(head.transform.position);
        let world_rotation = look_rotation(head_world, target, vec3(0.0, 1.0, 0.0));
        let parent_rotation = extract_rotation(&parent_world);
        let mut rotation = euler_xyz_from_matrix(parent_rotation.transpose() * world_rotation);

        rotation.x += rad(90.0);
        rotation.y += rad(45.0);
        head.transform.rotation = rotation;
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.group.transform.local_matrix()
    }
}

/// Rotation whose +Z axis points from `from` towards `to`.
pub fn look_rotation(from: Vec3, to: Vec3, up: Vec3) -> Mat3 {
    let mut z = to - from;
    if z.length_squared() == 0.0 {
        z.z = 1.0;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.length_squared() == 0.0 {
        // Looking straight along `up`: nudge the forward axis off it
        if up.z.abs() == 1.0 {
            z.x += 0.0001;
        } else {
            z.z += 0.0001;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    x = x.normalize();
    let y = z.cross(x);

    Mat3::from_cols(x, y, z)
}

fn skin_cylinder(
    ids: &mut NodeIds,
    name: &'static str,
    skin: MaterialId,
    top_radius: f32,
    bottom_radius: f32,
    height: f32,
    radial_segments: u32,
) -> Node {
    let mesh = Mesh::new(cylinder(top_radius, bottom_radius, height, radial_segments), skin);
    Node::renderable(ids, name, mesh)
}

fn build_head(ids: &mut NodeIds, materials: &mut MaterialLibrary, skin: MaterialId) -> Node {
    let mut head = Node::renderable(ids, HEAD, Mesh::new(sphere(5.0, 4, 4), skin)).rotated_deg(90.0, 45.0, 0.0);

    // Right eye: a skin socket holding the white, which holds the pupil
    let pupil = Node::renderable(ids, "pupil", capped_cylinder(materials, PUPIL_COLOR, 0.86, 0.36, 1.14, 5))
        .at(-0.01, -0.27, -0.01);
    let eye_white = Node::renderable(ids, "eye_white", capped_cylinder(materials, EYE_WHITE_COLOR, 1.26, 0.78, 1.14, 5))
        .at(0.02, -0.37, -0.06)
        .with_child(pupil);
    let right_eye = skin_cylinder(ids, "right_eye", skin, 2.0, 1.3, 1.4, 5)
        .at(3.0, 1.6, 1.6)
        .rotated_deg(-27.2, -45.0, 90.0)
        .with_child(eye_white);

    let left_eye = right_eye.mirrored(ids, "left_eye", vec3(-1.62, 1.47, -2.92), vec3(25.0, -225.0, 82.8));
    head.add(right_eye);
    head.add(left_eye);

    head.add(skin_cylinder(ids, "nose", skin, 0.88, 3.52, 1.96, 4).at(-0.02, 4.53, 0.0));
    head.add(skin_cylinder(ids, "cap", skin, 0.96, 3.5, 4.0, 4).at(1.88, -1.54, -1.85));

    head
}

fn build_body(ids: &mut NodeIds, skin: MaterialId) -> Node {
    Node::group(ids, BODY)
        .at(4.19, -4.51, -2.7)
        .rotated_deg(62.4, 45.0, 0.0)
        .with_child(skin_cylinder(ids, "neck", skin, 3.48, 7.0, 8.0, 4).at(0.0, -1.46, -5.85))
        .with_child(skin_cylinder(ids, "torso", skin, 7.0, 3.9, 6.0, 4).at(-0.03, -8.4, -5.87))
        .with_child(skin_cylinder(ids, "back", skin, 3.9, 1.4, 3.0, 4).at(-0.03, -12.9, -5.87))
}

fn build_tail(ids: &mut NodeIds, skin: MaterialId) -> Node {
    Node::renderable(ids, TAIL, Mesh::new(cylinder(2.14, 1.2, 8.7, 4), skin))
        .at(0.05, -7.85, -17.43)
        .rotated_deg(48.0, 45.0, 0.0)
        .with_child(
            skin_cylinder(ids, "tail_segment", skin, 1.2, 1.0, 13.0, 4)
                .at(-3.76, -6.24, 3.92)
                .rotated_deg(67.4, 45.0, -116.6),
        )
        .with_child(
            skin_cylinder(ids, "tail_segment", skin, 0.78, 1.0, 7.0, 4)
                .at(-8.46, -5.13, 8.86)
                .rotated_deg(17.6, 3.0, 16.2),
        )
        .with_child(
            skin_cylinder(ids, "tail_segment", skin, 1.2, 0.76, 5.0, 4)
                .at(-7.55, -1.35, 7.96)
                .rotated_deg(67.4, 45.0, -116.6),
        )
        .with_child(
            skin_cylinder(ids, "tail_segment", skin, 1.2, 0.74, 4.06, 4)
                .at(-5.24, -1.2, 5.52)
                .rotated_deg(15.4, 2.8, 13.0),
        )
}

// One leg is modelled with its toes; the other three are copies of it
fn build_legs(ids: &mut NodeIds, skin: MaterialId) -> [Node; 4] {
    let toe = skin_cylinder(ids, "toe", skin, 0.4, 1.04, 2.0, 4)
        .at(0.32, -1.55, 1.21)
        .rotated_deg(105.4, 41.0, 0.0);
    let second_toe = toe.mirrored(ids, "toe", vec3(-0.76, -1.5, 0.61), vec3(59.8, 39.6, 69.6));
    let third_toe = toe.mirrored(ids, "toe", vec3(-1.11, -1.57, -0.58), vec3(43.2, -9.8, 120.8));

    let front_right = skin_cylinder(ids, LEGS[0], skin, 1.56, 1.0, 3.96, 4)
        .at(2.34, -5.86, -4.55)
        .rotated_deg(-12.6, 53.0, 0.0)
        .with_child(toe)
        .with_child(second_toe)
        .with_child(third_toe);

    let front_left = front_right.mirrored(ids, LEGS[1], vec3(-2.08, -5.86, -4.55), vec3(-20.6, 45.0, 0.0));
    let back_right = front_right
        .mirrored(ids, LEGS[2], vec3(2.39, -9.07, -10.93), vec3(-19.4, 51.2, 4.2))
        .scaled(0.7, 0.7, 0.7);
    // Copied from the back leg so it inherits the smaller scale
    let back_left = back_right.mirrored(ids, LEGS[3], vec3(-2.08, -8.9, -10.1), vec3(-18.0, 28.6, 0.0));

    [front_right, front_left, back_right, back_left]
}
