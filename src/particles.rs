/*
 * Particle Field Module
 *
 * This module defines the star field drawn behind the banner. Each star is a
 * small disc drifting at a constant velocity inside the canvas and bouncing
 * off its edges. Stars inside a square neighbourhood around the pointer swell
 * by a fixed step per frame up to a maximum radius; outside it they shrink
 * back to the radius they were born with.
 *
 * Coordinates are canvas pixels: origin at the top-left corner, y down.
 * Motion is per frame, not per second.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::geometry::Color;
use crate::params::ParticleParams;

#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub min_radius: f32,
    pub color: Color,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: Color) -> Self {
        Self {
            position,
            velocity,
            radius,
            min_radius: radius,
            color,
        }
    }

    // Advance one frame inside a `bounds` sized canvas
    pub fn update(&mut self, bounds: Vec2, pointer: Option<Vec2>, params: &ParticleParams) {
        // Bounce: flip each axis independently when the disc touches an edge
        if self.position.x + self.radius > bounds.x || self.position.x - self.radius < 0.0 {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y + self.radius > bounds.y || self.position.y - self.radius < 0.0 {
            self.velocity.y = -self.velocity.y;
        }

        self.position += self.velocity;

        // The bounce is checked before moving, so the step itself can overshoot
        // an edge (and a narrowed canvas can strand stars outside it)
        self.position.x = self.position.x.clamp(0.0, bounds.x.max(0.0));
        self.position.y = self.position.y.clamp(0.0, bounds.y.max(0.0));

        if self.is_near(pointer, params.mouse_distance) {
            if self.radius < params.max_radius {
                self.radius = (self.radius + params.growth_step).min(params.max_radius);
            }
        } else if self.radius > self.min_radius {
            self.radius = (self.radius - params.growth_step).max(self.min_radius);
        }
    }

    // Square neighbourhood test, per axis. An unknown pointer is never near.
    pub fn is_near(&self, pointer: Option<Vec2>, distance: f32) -> bool {
        match pointer {
            Some(p) => (p.x - self.position.x).abs() < distance && (p.y - self.position.y).abs() < distance,
            None => false,
        }
    }

    // Draw the star; `canvas` is the window area the canvas occupies
    pub fn draw(&self, draw: &Draw, canvas: Rect) {
        draw.ellipse()
            .x_y(canvas.left() + self.position.x, canvas.top() - self.position.y)
            .radius(self.radius)
            .color(self.color.to_rgb());
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    params: ParticleParams,
    width: f32,
    height: f32,
}

impl ParticleField {
    pub fn new<R: Rng>(params: ParticleParams, width: f32, rng: &mut R) -> Self {
        let height = params.canvas_height;
        let particles = (0..params.population)
            .map(|_| spawn(&params, width, height, rng))
            .collect();

        log::debug!("Spawned {} stars on a {width}x{height} canvas", params.population);

        Self {
            particles,
            params,
            width,
            height,
        }
    }

    pub fn tick(&mut self, pointer: Option<Vec2>) {
        let bounds = vec2(self.width, self.height);
        for particle in &mut self.particles {
            particle.update(bounds, pointer, &self.params);
        }
    }

    // Only the width follows the viewport; the height keeps its initial value
    pub fn resize(&mut self, width: f32) {
        log::trace!("Star canvas width {} -> {width}", self.width);
        self.width = width;
    }

    pub fn draw(&self, draw: &Draw, canvas: Rect) {
        for particle in &self.particles {
            particle.draw(draw, canvas);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn params(&self) -> &ParticleParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParticleParams {
        &mut self.params
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

fn spawn<R: Rng>(params: &ParticleParams, width: f32, height: f32, rng: &mut R) -> Particle {
    let radius = params.radius;
    let x = rng.gen::<f32>() * (width - radius * 2.0) + radius;
    let y = rng.gen::<f32>() * (height - radius * 2.0) + radius;

    // The vertical draw is biased upwards: dy lies in [-1.5, 0)
    let dx = (rng.gen::<f32>() - 0.5) * 1.5;
    let dy = (rng.gen::<f32>() - 1.0) * 1.5;

    let hex = params.palette[rng.gen_range(0..params.palette.len())];
    Particle::new(vec2(x, y), vec2(dx, dy), radius, Color::from_hex(hex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(population: usize, width: f32) -> ParticleField {
        let params = ParticleParams {
            population,
            ..ParticleParams::default()
        };
        ParticleField::new(params, width, &mut StdRng::seed_from_u64(7))
    }

    fn assert_contained(field: &ParticleField) {
        for p in field.particles() {
            assert!(p.position.x >= 0.0 && p.position.x <= field.width(), "x = {}", p.position.x);
            assert!(p.position.y >= 0.0 && p.position.y <= field.height(), "y = {}", p.position.y);
        }
    }

    #[test]
    fn initial_state_follows_the_spawn_rules() {
        let field = field(1200, 1280.0);
        assert_eq!(field.particles().len(), 1200);
        let palette: Vec<u32> = field.params().palette.clone();
        for p in field.particles() {
            assert!(p.position.x >= 0.5 && p.position.x <= 1279.5);
            assert!(p.position.y >= 0.5 && p.position.y <= 625.5);
            assert!(p.velocity.x >= -0.75 && p.velocity.x <= 0.75);
            assert!(p.velocity.y >= -1.5 && p.velocity.y <= 0.0);
            assert_eq!(p.radius, 0.5);
            assert!(palette.contains(&p.color.hex()));
        }
    }

    #[test]
    fn stars_stay_inside_the_canvas() {
        let mut field = field(300, 400.0);
        for frame in 0..2000 {
            // Sweep the pointer around so radii change too
            let pointer = vec2((frame % 400) as f32, (frame % 626) as f32);
            field.tick(Some(pointer));
            assert_contained(&field);
        }
    }

    #[test]
    fn radius_stays_within_bounds() {
        let mut field = field(200, 300.0);
        for frame in 0..500 {
            let pointer = if frame % 3 == 0 { None } else { Some(vec2(150.0, 300.0)) };
            field.tick(pointer);
            for p in field.particles() {
                assert!(p.radius >= p.min_radius && p.radius <= field.params().max_radius);
            }
        }
    }

    #[test]
    fn radius_moves_one_unit_per_frame() {
        let params = ParticleParams {
            max_radius: 3.5,
            ..ParticleParams::default()
        };
        let bounds = vec2(1000.0, 1000.0);
        let mut p = Particle::new(vec2(500.0, 500.0), Vec2::ZERO, 0.5, Color::from_hex(0));

        let pointer = Some(vec2(510.0, 490.0));
        for expected in [1.5, 2.5, 3.5, 3.5] {
            p.update(bounds, pointer, &params);
            assert_eq!(p.radius, expected);
        }

        for expected in [2.5, 1.5, 0.5, 0.5] {
            p.update(bounds, None, &params);
            assert_eq!(p.radius, expected);
        }
    }

    #[test]
    fn growth_is_capped_at_max_radius() {
        let params = ParticleParams {
            max_radius: 2.0,
            ..ParticleParams::default()
        };
        let mut p = Particle::new(vec2(50.0, 50.0), Vec2::ZERO, 0.5, Color::from_hex(0));
        p.update(vec2(100.0, 100.0), Some(vec2(50.0, 50.0)), &params);
        p.update(vec2(100.0, 100.0), Some(vec2(50.0, 50.0)), &params);
        assert_eq!(p.radius, 2.0);
    }

    #[test]
    fn neighbourhood_is_square() {
        let p = Particle::new(vec2(100.0, 100.0), Vec2::ZERO, 0.5, Color::from_hex(0));
        // Corner of the square is inside although it is further than 50 away
        assert!(p.is_near(Some(vec2(149.0, 149.0)), 50.0));
        assert!(!p.is_near(Some(vec2(150.0, 100.0)), 50.0));
        assert!(!p.is_near(None, 50.0));
    }

    #[test]
    fn far_pointer_settles_every_radius() {
        let mut field = field(500, 800.0);
        for _ in 0..10 {
            field.tick(Some(vec2(400.0, 300.0)));
        }
        for _ in 0..5 {
            field.tick(Some(vec2(-10_000.0, -10_000.0)));
        }
        for p in field.particles() {
            assert_eq!(p.radius, p.min_radius);
        }
    }

    #[test]
    fn edges_reflect_velocity() {
        let params = ParticleParams::default();
        let mut p = Particle::new(vec2(99.8, 50.0), vec2(0.5, 0.0), 0.5, Color::from_hex(0));
        p.update(vec2(100.0, 100.0), None, &params);
        assert_eq!(p.velocity.x, -0.5);
        assert!((p.position.x - 99.3).abs() < 1e-4);

        let mut p = Particle::new(vec2(50.0, 0.2), vec2(0.0, -1.0), 0.5, Color::from_hex(0));
        p.update(vec2(100.0, 100.0), None, &params);
        assert_eq!(p.velocity.y, 1.0);
    }

    #[test]
    fn resize_changes_width_only() {
        let mut field = field(10, 1024.0);
        field.resize(640.0);
        assert_eq!(field.width(), 640.0);
        assert_eq!(field.height(), 626.0);

        field.tick(None);
        assert_contained(&field);
    }
}
