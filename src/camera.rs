/*
 * Camera Module
 *
 * This module defines the fixed perspective camera of the 3D scene. It
 * provides the transformations between world space and normalized device
 * coordinates, and builds picking rays through a point on the screen.
 */

use nannou::glam::Mat4;
use nannou::prelude::*;

use crate::scene_graph::rad;

pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            target: vec3(0.0, 0.0, -1.0),
            up: vec3(0.0, 1.0, 0.0),
            fov_y_degrees,
            aspect,
            near,
            far,
        }
    }

    pub fn look_at(mut self, position: Vec3, target: Vec3) -> Self {
        self.position = position;
        self.target = target;
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(rad(self.fov_y_degrees), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    // Project a world point to normalized device coordinates.
    // Returns None for points on or behind the camera plane.
    pub fn project(&self, view_projection: &Mat4, point: Vec3) -> Option<Vec3> {
        let clip = *view_projection * point.extend(1.0);
        if clip.w <= 1e-5 {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }

    // Ray from the eye through a point given in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let through = inverse.project_point3(vec3(ndc.x, ndc.y, 0.5));
        Ray {
            origin: self.position,
            direction: (through - self.position).normalize(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    // Möller-Trumbore, both faces count. Returns the distance along the ray.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < 1e-8 {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}
