// Copyright (c) 2026 rezky_nightky

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::{mix, Canvas};
use crate::config::Settings;
use crate::input::Pointer;
use crate::layout::{self, Viewport};
use crate::palette::{ColorTable, Rgb};
use crate::particle::Particle;
use crate::runtime::{GlowStyle, RenderMode};

const MAX_STEP_S: f32 = 0.25;
const GLOW_STOP: f32 = 0.4;
const HIGHLIGHT: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    pub mode: RenderMode,
    pub trail_alpha: f32,
    pub glow: GlowStyle,
    pub glow_scale: f32,
    pub breathe_speed: f32,
    pub breathe_amplitude: f32,
    pub highlight: bool,
    pub background: Rgb,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::Trail,
            trail_alpha: 0.05,
            glow: GlowStyle::Gradient,
            glow_scale: 3.0,
            breathe_speed: 2.0,
            breathe_amplitude: 0.08,
            highlight: true,
            background: Rgb::BLACK,
        }
    }
}

pub struct Scene {
    settings: Settings,
    colors: ColorTable,
    viewport: Viewport,
    particles: Vec<Particle>,
    canvas: Canvas,
    clock: f32,
    paused: bool,
    rng: StdRng,
}

fn canvas_for(vp: Viewport, background: Rgb) -> Canvas {
    Canvas::new(
        vp.width.ceil() as usize,
        vp.height.ceil() as usize,
        background.to_linear(),
    )
}

impl Scene {
    pub fn new(settings: Settings, viewport: Viewport, rng: StdRng) -> Self {
        let colors = settings.color_table();
        let canvas = canvas_for(viewport, settings.render.background);
        let mut scene = Self {
            settings,
            colors,
            viewport,
            particles: Vec::new(),
            canvas,
            clock: 0.0,
            paused: false,
            rng,
        };
        scene.scatter();
        scene
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.settings.render.mode = mode;
    }

    pub fn set_glow(&mut self, glow: GlowStyle) {
        self.settings.render.glow = glow;
    }

    pub fn scatter(&mut self) {
        let s = &self.settings;
        let fresh = layout::seed(
            &s.sprites,
            &s.layout,
            &s.drift,
            &self.colors,
            self.viewport,
            &mut self.rng,
        );
        self.particles = fresh;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        debug!(
            width = viewport.width,
            height = viewport.height,
            "viewport resized"
        );
        self.viewport = viewport;
        self.canvas = canvas_for(viewport, self.settings.render.background);
        self.scatter();
    }

    pub fn step(&mut self, dt: f32, pointer: Pointer) {
        if self.paused || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(MAX_STEP_S);
        self.clock += dt;
        let physics = self.settings.physics;
        for p in &mut self.particles {
            p.update(self.clock, dt, pointer, &physics);
        }
    }

    pub fn paint(&mut self) {
        let render = self.settings.render;
        match render.mode {
            RenderMode::Trail => self.canvas.fade(render.trail_alpha),
            RenderMode::Clear => self.canvas.clear(),
        }
        for p in &self.particles {
            paint_particle(&mut self.canvas, p, self.clock, &render);
        }
    }
}

fn paint_particle(canvas: &mut Canvas, p: &Particle, t: f32, render: &RenderSettings) {
    let size = p.breathing_size(t, render.breathe_speed, render.breathe_amplitude);
    let sw = p.swatch;
    let reach = size * render.glow_scale;

    match render.glow {
        GlowStyle::Gradient => canvas.radial(p.pos, reach, |d| {
            if d < GLOW_STOP {
                let k = d / GLOW_STOP;
                Some((mix(sw.color, sw.glow, k), 1.0 + (sw.glow_alpha - 1.0) * k))
            } else {
                let k = (d - GLOW_STOP) / (1.0 - GLOW_STOP);
                Some((sw.glow, sw.glow_alpha * (1.0 - k)))
            }
        }),
        GlowStyle::Shadow => canvas.radial(p.pos, reach, |d| {
            Some((sw.glow, sw.glow_alpha * (-4.0 * d * d).exp() * (1.0 - d)))
        }),
    }

    canvas.disc(p.pos, size, sw.color, 1.0);
    if render.highlight {
        canvas.disc(p.pos, size * 0.5, HIGHLIGHT, 0.4);
    }
}
