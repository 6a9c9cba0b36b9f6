/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that carries frame metrics and
 * the pointer picking state shown in the debug overlay.
 */

use nannou::prelude::*;
use std::time::Duration;

// Debug information to display
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub pointer_ndc: Vec2,
    pub last_hit: Option<&'static str>,
    pub recolors: u64,
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: Duration::ZERO,
            pointer_ndc: Vec2::ZERO,
            last_hit: None,
            recolors: 0,
        }
    }
}

impl DebugInfo {
    pub fn lines(&self, stars: usize, scene_active: bool) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Stars: {}", stars),
            format!("3D scene: {}", if scene_active { "on" } else { "off" }),
            format!("Pointer NDC: ({:.2}, {:.2})", self.pointer_ndc.x, self.pointer_ndc.y),
            format!("Hit: {}", self.last_hit.unwrap_or("-")),
            format!("Recolors: {}", self.recolors),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_lines_reflect_state() {
        let info = DebugInfo {
            last_hit: Some("torso"),
            recolors: 3,
            ..DebugInfo::default()
        };
        let lines = info.lines(1200, false);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[2], "Stars: 1200");
        assert_eq!(lines[3], "3D scene: off");
        assert_eq!(lines[5], "Hit: torso");
        assert_eq!(lines[6], "Recolors: 3");
    }
}
