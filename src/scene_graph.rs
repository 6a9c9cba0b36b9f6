/*
 * Scene Graph Module
 *
 * Hierarchical transform nodes. Each node owns its children outright, so the
 * graph is a strict tree: moving or rotating a node carries every descendant.
 *
 * Rotations are Euler angles applied in X, Y, Z order (the matrix is
 * Rx * Ry * Rz), and a node's local matrix is translation * rotation * scale.
 *
 * Symmetric parts are produced with `Node::mirrored`: the fully built source
 * subtree is duplicated (meshes, materials and children included) and only
 * the root transform of the copy is overwritten.
 */

use nannou::glam::{Mat3, Mat4};
use nannou::prelude::*;
use std::collections::HashSet;
use std::f32::consts::PI;

use crate::error::{BannerError, Result};
use crate::geometry::Mesh;

pub fn rad(degrees: f32) -> f32 {
    degrees * (PI / 180.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * mat4_from_mat3(euler_xyz_matrix(self.rotation))
            * Mat4::from_scale(self.scale)
    }
}

pub fn euler_xyz_matrix(rotation: Vec3) -> Mat3 {
    Mat3::from_rotation_x(rotation.x) * Mat3::from_rotation_y(rotation.y) * Mat3::from_rotation_z(rotation.z)
}

// Inverse of `euler_xyz_matrix` for a pure rotation. Near gimbal lock the
// Z angle is folded into X.
pub fn euler_xyz_from_matrix(m: Mat3) -> Vec3 {
    let m11 = m.x_axis.x;
    let m12 = m.y_axis.x;
    let m13 = m.z_axis.x;
    let m22 = m.y_axis.y;
    let m23 = m.z_axis.y;
    let m32 = m.y_axis.z;
    let m33 = m.z_axis.z;

    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.999_999_9 {
        vec3((-m23).atan2(m33), y, (-m12).atan2(m11))
    } else {
        vec3(m32.atan2(m22), y, 0.0)
    }
}

/// Rotation part of an affine matrix with any scale divided out.
pub fn extract_rotation(m: &Mat4) -> Mat3 {
    Mat3::from_cols(
        m.x_axis.truncate().normalize_or_zero(),
        m.y_axis.truncate().normalize_or_zero(),
        m.z_axis.truncate().normalize_or_zero(),
    )
}

pub fn mat4_from_mat3(m: Mat3) -> Mat4 {
    Mat4::from_cols(
        m.x_axis.extend(0.0),
        m.y_axis.extend(0.0),
        m.z_axis.extend(0.0),
        vec4(0.0, 0.0, 0.0, 1.0),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

// Hands out node ids for one scene
#[derive(Debug, Default)]
pub struct NodeIds {
    next: u32,
}

impl NodeIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

// What a node carries besides its transform. Only `Renderable` nodes are
// drawn, hit-tested and take part in shadowing.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Renderable(Mesh),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: &'static str,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn group(ids: &mut NodeIds, name: &'static str) -> Self {
        Self {
            id: ids.next_id(),
            name,
            transform: Transform::default(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn renderable(ids: &mut NodeIds, name: &'static str, mesh: Mesh) -> Self {
        Self {
            kind: NodeKind::Renderable(mesh),
            ..Self::group(ids, name)
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = vec3(x, y, z);
        self
    }

    /// Set the rotation from Euler angles given in degrees.
    pub fn rotated_deg(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.rotation = vec3(rad(x), rad(y), rad(z));
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn scaled(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.scale = vec3(x, y, z);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn add(&mut self, child: Node) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Renderable(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    /// Deep copy of this subtree with fresh ids. Meshes keep pointing at the
    /// same geometry and material.
    pub fn duplicate(&self, ids: &mut NodeIds, name: &'static str) -> Node {
        let mut copy = self.duplicate_subtree(ids);
        copy.name = name;
        copy
    }

    fn duplicate_subtree(&self, ids: &mut NodeIds) -> Node {
        Node {
            id: ids.next_id(),
            name: self.name,
            transform: self.transform,
            kind: self.kind.clone(),
            children: self.children.iter().map(|c| c.duplicate_subtree(ids)).collect(),
        }
    }

    /// Duplicate then place the copy elsewhere. The scale of the source is
    /// carried over unchanged.
    pub fn mirrored(&self, ids: &mut NodeIds, name: &'static str, position: Vec3, rotation_deg: Vec3) -> Node {
        self.duplicate(ids, name)
            .at(position.x, position.y, position.z)
            .rotated_deg(rotation_deg.x, rotation_deg.y, rotation_deg.z)
    }

    pub fn child_named(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_named_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    // Depth-first search, first match wins
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Visit this node and every descendant in depth-first pre-order,
    /// passing each node's world matrix.
    pub fn visit<F>(&self, parent_world: Mat4, f: &mut F)
    where
        F: FnMut(&Node, Mat4),
    {
        let world = parent_world * self.transform.local_matrix();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }

    pub fn for_each_mesh_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Mesh),
    {
        if let NodeKind::Renderable(mesh) = &mut self.kind {
            f(mesh);
        }
        for child in &mut self.children {
            child.for_each_mesh_mut(f);
        }
    }

    pub fn set_shadows(&mut self, cast: bool, receive: bool) {
        self.for_each_mesh_mut(&mut |mesh| {
            mesh.casts_shadow = cast;
            mesh.receives_shadow = receive;
        });
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    pub fn renderable_count(&self) -> usize {
        let own = self.mesh().is_some() as usize;
        own + self.children.iter().map(Node::renderable_count).sum::<usize>()
    }

    /// Walk the subtree and fail if any node id shows up twice. Returns the
    /// number of nodes visited.
    pub fn validate_tree(&self) -> Result<usize> {
        let mut seen = HashSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.id) {
                return Err(BannerError::CyclicGraph { node: node.id.raw() });
            }
            stack.extend(node.children.iter());
        }
        Ok(seen.len())
    }
}
