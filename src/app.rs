/*
 * Application Module
 *
 * This module wires the banner to its host. `Banner` is the mounted scene:
 * it owns the star field, the 3D stage and the pointer, receives the host's
 * input events and is driven once per display refresh by `Banner::frame`.
 * `Banner::unmount` removes every listener and cancels the frame callbacks;
 * afterwards all entry points are inert.
 *
 * The nannou `Model` plays the host: its window supplies both surfaces and
 * its update callback is the display refresh.
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::debug::DebugInfo;
use crate::error::{BannerError, Result};
use crate::input;
use crate::params::BannerParams;
use crate::particles::ParticleField;
use crate::pointer::PointerBridge;
use crate::renderer;
use crate::stage::{FrameReport, Stage};
use crate::ui;

// 2D drawing surface for the star field
#[derive(Debug, Clone, Copy)]
pub struct CanvasSurface {
    pub width: f32,
}

// Container for the 3D surface
#[derive(Debug, Clone, Copy)]
pub struct WorldSurface {
    pub supports_3d: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Surfaces {
    pub stars: Option<CanvasSurface>,
    pub world: Option<WorldSurface>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    PointerMove,
    TouchMove,
    Resize,
}

pub struct Banner {
    pub particles: ParticleField,
    /// Absent when the host cannot render 3D; the star field still runs.
    pub stage: Option<Stage>,
    pub pointer: PointerBridge,
    listeners: Vec<Listener>,
    frame_scheduled: bool,
    last_report: FrameReport,
}

impl Banner {
    pub fn mount<R: Rng>(surfaces: &Surfaces, params: &BannerParams, rng: &mut R) -> Result<Self> {
        let stars = surfaces.stars.ok_or(BannerError::MissingSurface("stars"))?;
        let world = surfaces.world.ok_or(BannerError::MissingSurface("world"))?;
        params.particles.validate()?;

        let particles = ParticleField::new(params.particles.clone(), stars.width, rng);

        let stage = if world.supports_3d {
            Some(Stage::new(&params.scene))
        } else {
            log::warn!("3D rendering is not available, the creature scene is disabled");
            None
        };

        log::info!(
            "Mounted banner: {} stars, 3D scene {}",
            particles.particles().len(),
            if stage.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            particles,
            stage,
            pointer: PointerBridge::new(params.scene.logical_viewport),
            listeners: vec![Listener::PointerMove, Listener::TouchMove, Listener::Resize],
            frame_scheduled: true,
            last_report: FrameReport::default(),
        })
    }

    fn listening(&self, listener: Listener) -> bool {
        self.listeners.contains(&listener)
    }

    pub fn pointer_moved(&mut self, client: Vec2) {
        if self.listening(Listener::PointerMove) {
            self.pointer.pointer_moved(client);
        }
    }

    /// Returns whether the default scroll behaviour must be suppressed.
    pub fn touch_moved(&mut self, touches: &[Vec2]) -> bool {
        if !self.listening(Listener::TouchMove) {
            return false;
        }
        self.pointer.touch_moved(touches)
    }

    // The 3D surface keeps its logical size; only the star canvas widens
    pub fn resized(&mut self, viewport_width: f32) {
        if self.listening(Listener::Resize) {
            self.particles.resize(viewport_width);
        }
    }

    /// Run both animation loops once. Returns false once the frame callback
    /// has been cancelled.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.frame_scheduled {
            return false;
        }

        self.particles.tick(self.pointer.screen.position);

        if let Some(stage) = &mut self.stage {
            self.last_report = stage.advance(self.pointer.ndc(), now_ms);
        }

        true
    }

    /// Remove all listeners and cancel the frame callbacks. Only the first
    /// call has an effect; it returns whether this call did the teardown.
    pub fn unmount(&mut self) -> bool {
        if !self.frame_scheduled && self.listeners.is_empty() {
            return false;
        }
        self.listeners.clear();
        self.frame_scheduled = false;
        log::info!("Unmounted banner");
        true
    }

    pub fn is_mounted(&self) -> bool {
        self.frame_scheduled
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn last_report(&self) -> FrameReport {
        self.last_report
    }
}

// Main model for the application
pub struct Model {
    pub banner: Banner,
    pub params: BannerParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub show_debug: bool,
}

pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;

// Initialize the model
pub fn model(app: &App) -> Model {
    let params = BannerParams::load().unwrap_or_else(|err| panic!("failed to load banner configuration: {err}"));

    let window_id = app
        .new_window()
        .title("Banner")
        .size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .touch(input::touch)
        .resized(input::resized)
        .key_pressed(input::key_pressed)
        .raw_event(input::raw_window_event)
        .closed(input::closed)
        .build()
        .unwrap_or_else(|err| panic!("failed to create the banner window: {err:?}"));

    let window = app
        .window(window_id)
        .unwrap_or_else(|| panic!("banner window {window_id:?} vanished after creation"));
    let egui = Egui::from_window(&window);

    // The window stands in for the page: it is the star canvas and hosts
    // the 3D viewport, which wgpu can always render
    let surfaces = Surfaces {
        stars: Some(CanvasSurface {
            width: window.rect().w(),
        }),
        world: Some(WorldSurface { supports_3d: true }),
    };

    let banner = Banner::mount(&surfaces, &params, &mut rand::thread_rng())
        .unwrap_or_else(|err| panic!("failed to mount the banner: {err}"));

    Model {
        banner,
        show_debug: params.scene.show_debug,
        params,
        egui,
        debug_info: DebugInfo::default(),
    }
}

pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    if model.show_debug {
        model.egui.set_elapsed_time(update.since_start);
        let changed = ui::update_ui(
            &mut model.egui,
            model.banner.particles.params_mut(),
            &mut model.show_debug,
            &model.debug_info,
        );
        if changed {
            log::debug!("Star parameters tuned: {:?}", model.banner.particles.params());
        }
    }

    if !model.banner.frame(wall_clock_ms()) {
        return;
    }

    let report = model.banner.last_report();
    model.debug_info.pointer_ndc = model.banner.pointer.ndc();
    model.debug_info.last_hit = report.hit;
    if report.recolored {
        model.debug_info.recolors += 1;
    }
}

// Milliseconds since the Unix epoch
pub fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
