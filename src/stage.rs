/*
 * Stage Module
 *
 * The 3D scene as a whole: the chameleon, the fly, the branch it sits on,
 * the fixed camera and the lights. `Stage::advance` runs the per-frame
 * update of the 3D loop; drawing is left to the renderer.
 */

use nannou::glam::Mat4;
use nannou::prelude::*;

use crate::camera::Camera;
use crate::creature::Chameleon;
use crate::error::Result;
use crate::fly::Fly;
use crate::geometry::{capped_cylinder, Color, MaterialLibrary};
use crate::params::SceneParams;
use crate::pointer::{hue_at, paint, pick, Hit};
use crate::scene_graph::{Node, NodeIds};

pub const BRANCH_COLOR: u32 = 0x17b26f;

#[derive(Debug, Clone, Copy)]
pub enum Light {
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
        casts_shadow: bool,
    },
}

// What the last frame did, for the debug overlay
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameReport {
    pub hit: Option<&'static str>,
    pub recolored: bool,
}

pub struct Stage {
    pub chameleon: Chameleon,
    pub fly: Fly,
    pub branch: Node,
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub materials: MaterialLibrary,
    params: SceneParams,
}

impl Stage {
    pub fn new(params: &SceneParams) -> Self {
        let mut ids = NodeIds::new();
        let mut materials = MaterialLibrary::new();

        let chameleon = Chameleon::new(&mut ids, &mut materials);
        let fly = Fly::new(&mut ids, &mut materials, params.wing_phase_step);

        let mut branch = Node::renderable(
            &mut ids,
            "branch",
            capped_cylinder(&mut materials, BRANCH_COLOR, 0.76, 1.12, 2.14, 5),
        )
        .at(-2.76, -5.67, -7.86)
        .rotated_deg(85.18, 4.14, -20.4)
        .scaled(3.78, 11.92, 2.72);
        branch.set_shadows(true, true);

        let camera = Camera::perspective(75.0, 1.0, 0.1, 1000.0).look_at(vec3(30.0, 0.0, 10.0), Vec3::ZERO);

        log::debug!(
            "Built stage: {} creature nodes, {} materials",
            chameleon.group.node_count(),
            materials.len()
        );

        Self {
            chameleon,
            fly,
            branch,
            camera,
            lights: default_lights(),
            materials,
            params: params.clone(),
        }
    }

    /// Top-level nodes in draw order.
    pub fn roots(&self) -> [&Node; 3] {
        [&self.chameleon.group, &self.branch, &self.fly.group]
    }

    /// Total node count across all roots, failing if any subtree is not a tree.
    pub fn validate(&self) -> Result<usize> {
        let mut total = 0;
        for root in self.roots() {
            total += root.validate_tree()?;
        }
        Ok(total)
    }

    // Cast the pointer ray at the creature and paint whatever it strikes
    pub fn select_color(&mut self, ndc: Vec2, now_ms: f64) -> (Option<Hit>, bool) {
        let ray = self.camera.ray_from_ndc(ndc);
        let Some(hit) = pick(&self.chameleon.group, Mat4::IDENTITY, &ray) else {
            return (None, false);
        };
        let hue = hue_at(now_ms, self.params.hue_time_scale);
        let recolored = paint(&mut self.materials, &hit, hue);
        (Some(hit), recolored)
    }

    /// One frame of the 3D loop: recolor, head tracking, wing beat, flight.
    pub fn advance(&mut self, ndc: Vec2, now_ms: f64) -> FrameReport {
        let (hit, recolored) = self.select_color(ndc, now_ms);

        // The head tracks where the fly was at the end of the previous frame
        self.chameleon.move_head(self.fly.position());

        self.fly.move_wings();
        self.fly.move_fly(now_ms * self.params.fly_time_scale);

        if let Some(hit) = &hit {
            log::trace!("Pointer over {} (recolored: {recolored})", hit.name);
        }

        FrameReport {
            hit: hit.map(|h| h.name),
            recolored,
        }
    }
}

fn default_lights() -> Vec<Light> {
    vec![
        Light::Hemisphere {
            sky: Color::from_hex(0xffffff),
            ground: Color::from_hex(0xffffff),
            intensity: 0.6,
        },
        Light::Directional {
            color: Color::from_hex(0xffffff),
            intensity: 1.0,
            position: vec3(20.0, 13.0, 12.0),
            casts_shadow: true,
        },
        Light::Directional {
            color: Color::from_hex(0xd9fbfc),
            intensity: 0.6,
            position: vec3(-27.0, 18.0, 6.0),
            casts_shadow: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::SKIN_COLOR;
    use crate::fly::FLIGHT_PERIOD;

    fn stage() -> Stage {
        Stage::new(&SceneParams::default())
    }

    // NDC of the center of the first creature part with this name
    fn part_ndc(stage: &Stage, name: &str) -> Vec2 {
        let mut center = None;
        stage.chameleon.group.visit(Mat4::IDENTITY, &mut |node, world| {
            if node.name == name && center.is_none() {
                center = Some(world.transform_point3(Vec3::ZERO));
            }
        });
        let vp = stage.camera.view_projection();
        stage.camera.project(&vp, center.unwrap()).unwrap().truncate()
    }

    // The torso center, which no eye part covers from the camera
    fn torso_ndc(stage: &Stage) -> Vec2 {
        part_ndc(stage, "torso")
    }

    #[test]
    fn scene_is_a_forest_of_trees() {
        let stage = stage();
        // 35 creature nodes, 1 branch, 4 fly nodes
        assert_eq!(stage.validate().unwrap(), 35 + 1 + 4);
        assert_eq!(stage.lights.len(), 3);
        assert!(stage.branch.mesh().unwrap().casts_shadow);
    }

    #[test]
    fn pointer_over_the_body_recolors_all_skin() {
        let mut stage = stage();
        let ndc = torso_ndc(&stage);

        let (hit, recolored) = stage.select_color(ndc, 5_000.0);
        let hit = hit.unwrap();
        assert!(recolored);
        assert_eq!(hit.material, stage.chameleon.skin);

        let skin = stage.materials.get(stage.chameleon.skin).color;
        assert_ne!(skin.hex(), SKIN_COLOR);
        let mut expected = Color::from_hex(0);
        expected.set_hsl(0.25, 1.0, 0.6);
        assert_eq!(skin, expected);
    }

    #[test]
    fn pointer_away_from_the_creature_changes_nothing() {
        let mut stage = stage();
        // Top-left corner of the viewport is empty sky
        let (hit, recolored) = stage.select_color(vec2(-0.99, 0.99), 5_000.0);
        assert!(hit.is_none());
        assert!(!recolored);
        assert_eq!(stage.materials.get(stage.chameleon.skin).color.hex(), SKIN_COLOR);
    }

    #[test]
    fn pointer_over_the_eye_keeps_every_color() {
        let mut stage = stage();
        let ndc = part_ndc(&stage, "eye_white");

        let (hit, recolored) = stage.select_color(ndc, 5_000.0);
        // The pupil sits in front of the white's center
        assert_eq!(hit.map(|h| h.name), Some("pupil"));
        assert!(!recolored);
        assert_eq!(stage.materials.get(stage.chameleon.skin).color.hex(), SKIN_COLOR);

        let report = stage.advance(ndc, 6_000.0);
        assert!(!report.recolored);
        assert_eq!(stage.materials.get(stage.chameleon.skin).color.hex(), SKIN_COLOR);
    }

    #[test]
    fn advance_moves_fly_wings_and_head() {
        let mut stage = stage();
        let before = stage.fly.position();

        let report = stage.advance(vec2(-0.99, 0.99), 1_234.0);
        assert!(report.hit.is_none());
        assert_eq!(stage.fly.wing_phase(), 0.5);
        assert_ne!(stage.fly.position(), before);
        assert_eq!(stage.chameleon.head().unwrap().transform.position.y, 1.0);
    }

    #[test]
    fn fly_returns_after_a_full_period() {
        let mut stage = stage();
        let scale = SceneParams::default().fly_time_scale;
        let start_ms = 1_000_000.0;

        stage.advance(Vec2::ZERO, start_ms);
        let first = stage.fly.position();
        stage.advance(Vec2::ZERO, start_ms + FLIGHT_PERIOD / scale);
        let second = stage.fly.position();
        assert!((first - second).length() < 1e-3);
    }
}
