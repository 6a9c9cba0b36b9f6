/*
 * Geometry Module
 *
 * Primitive solids for the low-poly scene (capped cylinders, UV spheres and
 * boxes), the flat material they are painted with and the color type used
 * for material recoloring.
 *
 * Every material is rendered with flat shading: one color and one normal
 * per triangle. That is a fixed look for the scene, so there is no switch
 * for it. Degenerate parameters (negative radii, zero segments) are not
 * validated and simply produce degenerate triangles.
 */

use nannou::prelude::*;
use std::f32::consts::PI;
use std::rc::Rc;

// RGB triple in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn hex(&self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Lowercase six digit hex without a prefix, e.g. `"3f3f3f"`.
    pub fn hex_string(&self) -> String {
        format!("{:06x}", self.hex())
    }

    /// Set from hue, saturation and lightness, all in [0, 1]. The hue wraps.
    pub fn set_hsl(&mut self, hue: f32, saturation: f32, lightness: f32) {
        let h = hue.rem_euclid(1.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            self.r = l;
            self.g = l;
            self.b = l;
            return;
        }

        let high = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let low = 2.0 * l - high;

        self.r = hue_to_channel(low, high, h + 1.0 / 3.0);
        self.g = hue_to_channel(low, high, h);
        self.b = hue_to_channel(low, high, h - 1.0 / 3.0);
    }

    pub fn to_rgb(&self) -> Rgb {
        rgb(self.r, self.g, self.b)
    }

    pub fn scaled(&self, factor: Color) -> Color {
        Color {
            r: (self.r * factor.r).min(1.0),
            g: (self.g * factor.g).min(1.0),
            b: (self.b * factor.b).min(1.0),
        }
    }
}

fn hue_to_channel(low: f32, high: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        low + (high - low) * 6.0 * t
    } else if t < 0.5 {
        high
    } else if t < 2.0 / 3.0 {
        low + (high - low) * 6.0 * (2.0 / 3.0 - t)
    } else {
        low
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub color: Color,
    pub roughness: f32,
}

impl Material {
    pub fn flat(hex: u32) -> Self {
        Self {
            color: Color::from_hex(hex),
            roughness: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

// Owns every material of a scene. Meshes refer to entries by id, so a
// duplicated mesh keeps painting with the same material as its source.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn get(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn get_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

// Indexed triangle soup in the local space of its node
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
}

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.iter().map(move |&[a, b, c]| {
            [
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            ]
        })
    }

    /// Bake a translation into the vertices, moving the pivot of the shape.
    pub fn translated(mut self, offset: Vec3) -> Self {
        for p in &mut self.positions {
            *p += offset;
        }
        self
    }
}

// A drawable leaf: shared geometry plus a material reference
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Rc<Geometry>,
    pub material: MaterialId,
    pub casts_shadow: bool,
    pub receives_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: MaterialId) -> Self {
        Self {
            geometry: Rc::new(geometry),
            material,
            casts_shadow: false,
            receives_shadow: false,
        }
    }
}

// Closed cylinder along Y, centered on the origin. The side is split into
// `radial_segments` quads and both ends are closed with triangle fans.
pub fn cylinder(top_radius: f32, bottom_radius: f32, height: f32, radial_segments: u32) -> Geometry {
    let mut geometry = Geometry::default();
    let half = height / 2.0;
    let segments = radial_segments as usize;

    // Side rings: row 0 at the top, row 1 at the bottom
    for (radius, y) in [(top_radius, half), (bottom_radius, -half)] {
        for x in 0..=segments {
            let theta = x as f32 / radial_segments as f32 * 2.0 * PI;
            geometry
                .positions
                .push(vec3(radius * theta.sin(), y, radius * theta.cos()));
        }
    }
    let ring = segments as u32 + 1;
    for x in 0..radial_segments {
        let a = x;
        let b = ring + x;
        let c = ring + x + 1;
        let d = x + 1;
        geometry.indices.push([a, b, d]);
        geometry.indices.push([b, c, d]);
    }

    // Caps
    for (radius, sign) in [(top_radius, 1.0f32), (bottom_radius, -1.0)] {
        let center = geometry.positions.len() as u32;
        geometry.positions.push(vec3(0.0, half * sign, 0.0));
        let start = geometry.positions.len() as u32;
        for x in 0..=segments {
            let theta = x as f32 / radial_segments as f32 * 2.0 * PI;
            geometry
                .positions
                .push(vec3(radius * theta.sin(), half * sign, radius * theta.cos()));
        }
        for x in 0..radial_segments {
            let i = start + x;
            if sign > 0.0 {
                geometry.indices.push([i, i + 1, center]);
            } else {
                geometry.indices.push([i + 1, i, center]);
            }
        }
    }

    geometry
}

// Latitude/longitude sphere. Low segment counts give the faceted head.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let mut geometry = Geometry::default();
    let columns = width_segments + 1;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            geometry.positions.push(vec3(
                -radius * (u * 2.0 * PI).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * 2.0 * PI).sin() * (v * PI).sin(),
            ));
        }
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * columns + ix + 1;
            let b = iy * columns + ix;
            let c = (iy + 1) * columns + ix;
            let d = (iy + 1) * columns + ix + 1;
            // The pole rows collapse to a point, skip their degenerate halves
            if iy != 0 {
                geometry.indices.push([a, b, d]);
            }
            if iy != height_segments - 1 {
                geometry.indices.push([b, c, d]);
            }
        }
    }

    geometry
}

// Axis aligned box centered on the origin, two triangles per face
pub fn cuboid(width: f32, height: f32, depth: f32) -> Geometry {
    let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
    let positions = vec![
        vec3(-x, -y, z),
        vec3(x, -y, z),
        vec3(x, y, z),
        vec3(-x, y, z),
        vec3(-x, -y, -z),
        vec3(x, -y, -z),
        vec3(x, y, -z),
        vec3(-x, y, -z),
    ];
    let indices = vec![
        [0, 1, 2], [0, 2, 3], // +z
        [5, 4, 7], [5, 7, 6], // -z
        [1, 5, 6], [1, 6, 2], // +x
        [4, 0, 3], [4, 3, 7], // -x
        [3, 2, 6], [3, 6, 7], // +y
        [4, 5, 1], [4, 1, 0], // -y
    ];
    Geometry { positions, indices }
}

/// Cylinder painted with a fresh material of its own.
pub fn capped_cylinder(
    materials: &mut MaterialLibrary,
    color: u32,
    top_radius: f32,
    bottom_radius: f32,
    height: f32,
    radial_segments: u32,
) -> Mesh {
    let material = materials.add(Material::flat(color));
    Mesh::new(cylinder(top_radius, bottom_radius, height, radial_segments), material)
}

/// Cube of side `size` painted with a fresh material of its own.
pub fn cube(materials: &mut MaterialLibrary, size: f32, color: u32) -> Mesh {
    let material = materials.add(Material::flat(color));
    Mesh::new(cuboid(size, size, size), material)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_of_reserved_colors() {
        assert_eq!(Color::from_hex(0xffffff).hex_string(), "ffffff");
        assert_eq!(Color::from_hex(0x3f3f3f).hex_string(), "3f3f3f");
        assert_eq!(Color::from_hex(0x1ccca3).hex(), 0x1ccca3);
    }

    #[test]
    fn hsl_primaries() {
        let mut c = Color::from_hex(0);
        c.set_hsl(0.0, 1.0, 0.5);
        assert_eq!(c.hex_string(), "ff0000");
        c.set_hsl(1.0 / 3.0, 1.0, 0.5);
        assert_eq!(c.hex_string(), "00ff00");
        c.set_hsl(2.0 / 3.0, 1.0, 0.5);
        assert_eq!(c.hex_string(), "0000ff");
        // Hue wraps around
        c.set_hsl(1.0, 1.0, 0.5);
        assert_eq!(c.hex_string(), "ff0000");
    }

    #[test]
    fn sweep_colors_never_hit_reserved_hexes() {
        let mut c = Color::from_hex(0);
        for step in 0..360 {
            c.set_hsl(step as f32 / 360.0, 1.0, 0.6);
            let hex = c.hex_string();
            assert_ne!(hex, "ffffff");
            assert_ne!(hex, "3f3f3f");
        }
    }

    #[test]
    fn cylinder_counts() {
        let g = cylinder(1.0, 2.0, 3.0, 4);
        // 4 side quads, 4 triangles per cap
        assert_eq!(g.triangle_count(), 4 * 2 + 4 * 2);
        let max_y = g.positions.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let min_y = g.positions.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!((max_y - 1.5).abs() < 1e-6);
        assert!((min_y + 1.5).abs() < 1e-6);
    }

    #[test]
    fn sphere_counts_and_radius() {
        let g = sphere(5.0, 4, 4);
        // Pole rows contribute one triangle per column, inner rows two
        assert_eq!(g.triangle_count(), 4 + 4 + 2 * 4 * 2);
        for p in &g.positions {
            assert!((p.length() - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn cube_has_twelve_triangles() {
        let g = cuboid(1.0, 1.0, 1.0);
        assert_eq!(g.triangle_count(), 12);
        assert!(g.positions.iter().all(|p| p.abs().max_element() <= 0.5));
    }

    #[test]
    fn translation_moves_the_pivot() {
        let g = cuboid(1.0, 1.0, 1.0).translated(vec3(0.0, 0.21, 0.04));
        let max_y = g.positions.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!((max_y - 0.71).abs() < 1e-6);
    }

    #[test]
    fn duplicated_mesh_shares_material() {
        let mut lib = MaterialLibrary::new();
        let mesh = capped_cylinder(&mut lib, 0xffffff, 1.0, 1.0, 1.0, 5);
        let copy = mesh.clone();
        lib.get_mut(mesh.material).color = Color::from_hex(0x123456);
        assert_eq!(lib.get(copy.material).color.hex(), 0x123456);
        assert!(Rc::ptr_eq(&mesh.geometry, &copy.geometry));
    }
}
