/*
 * Banner - Module Definitions
 *
 * This file defines the module structure of the animated banner: a star
 * field that reacts to the pointer, and a low-poly chameleon on a branch
 * whose head follows a fly and whose skin changes color under the pointer.
 */

// Re-export key components for easier access
pub use app::{Banner, Model, Surfaces};
pub use camera::Camera;
pub use error::{BannerError, Result};
pub use params::BannerParams;
pub use particles::ParticleField;
pub use stage::Stage;
pub use debug::DebugInfo;

// Define modules
pub mod geometry;
pub mod scene_graph;
pub mod creature;
pub mod fly;
pub mod stage;
pub mod camera;
pub mod particles;
pub mod pointer;
pub mod params;
pub mod error;
pub mod debug;
pub mod app;
pub mod ui;
pub mod renderer;
pub mod input;
