// Copyright (c) 2026 rezky_nightky

use std::collections::BTreeSet;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::layout::{default_sprites, DriftSettings, LayoutSettings, Sprite};
use crate::palette::{default_entries, ColorEntry, ColorTable};
use crate::particle::Physics;
use crate::runtime::{GlowStyle, Integrator, Preset, RenderMode};
use crate::scene::RenderSettings;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  yuleglow --preset standalone --fps 60 --color-bg black --log-level warn";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        DEFAULT_PARAMS_USAGE.replacen(
            "DEFAULT PARAMS USAGE:",
            "\x1b[1;36mDEFAULT PARAMS USAGE:\x1b[0m",
            1,
        )
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "yuleglow", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'C',
        long = "config",
        help_heading = "CONFIG",
        help = "Settings file (TOML). Default: <config dir>/yuleglow/config.toml when present"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "dump-config",
        help_heading = "CONFIG",
        help = "Print the effective settings as TOML and exit"
    )]
    pub dump_config: bool,

    #[arg(
        short = 'p',
        long = "preset",
        value_enum,
        help_heading = "CONFIG",
        help = "Apply a preset on top of the settings file"
    )]
    pub preset: Option<Preset>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Random seed for start positions and drift"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "snapshot",
        value_name = "FRAMES",
        help_heading = "GENERAL",
        help = "Simulate N frames off-screen, print the last one and exit (min 1 max 100000)"
    )]
    pub snapshot: Option<u32>,

    #[arg(
        short = 'r',
        long = "render-mode",
        value_enum,
        help_heading = "APPEARANCE",
        help = "Canvas handling between frames"
    )]
    pub render_mode: Option<RenderMode>,

    #[arg(
        short = 'g',
        long = "glow",
        value_enum,
        help_heading = "APPEARANCE",
        help = "Glow style"
    )]
    pub glow: Option<GlowStyle>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "integrator",
        value_enum,
        help_heading = "PHYSICS",
        help = "Spring integration scheme"
    )]
    pub integrator: Option<Integrator>,

    #[arg(
        long = "spring",
        help_heading = "PHYSICS",
        help = "Spring constant (min 0.0001 max 1)"
    )]
    pub spring: Option<f32>,

    #[arg(
        long = "friction",
        help_heading = "PHYSICS",
        help = "Velocity kept per frame (min 0.01 max 1)"
    )]
    pub friction: Option<f32>,

    #[arg(
        long = "repel-radius",
        help_heading = "PHYSICS",
        help = "Pointer repel radius in pixels (min 0 max 1000)"
    )]
    pub repel_radius: Option<f32>,

    #[arg(
        long = "repel-strength",
        help_heading = "PHYSICS",
        help = "Pointer repel strength (min 0 max 1000)"
    )]
    pub repel_strength: Option<f32>,

    #[arg(
        long = "log-level",
        default_value = "warn",
        help_heading = "LOGGING",
        help = "Log level (error, warn, info, debug, trace)"
    )]
    pub log_level: String,

    #[arg(
        long = "log-file",
        help_heading = "LOGGING",
        help = "Write logs to a file instead of stderr"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "list-presets",
        help_heading = "HELP",
        help = "List available presets and exit"
    )]
    pub list_presets: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub physics: Physics,
    pub drift: DriftSettings,
    pub render: RenderSettings,
    pub layout: LayoutSettings,
    #[serde(rename = "sprite")]
    pub sprites: Vec<Sprite>,
    #[serde(rename = "color")]
    pub colors: Vec<ColorEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            physics: Physics::default(),
            drift: DriftSettings::default(),
            render: RenderSettings::default(),
            layout: LayoutSettings::default(),
            sprites: default_sprites(),
            colors: default_entries(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "yuleglow").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid settings file: {}", path.display()))
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!(path = %path.display(), "loading settings");
            return Self::from_path(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                info!(path = %path.display(), "loading settings");
                Self::from_path(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize settings")
    }

    pub fn color_table(&self) -> ColorTable {
        ColorTable::from_entries(&self.colors)
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        let (integrator, spring, friction, mode, glow, highlight) = match preset {
            Preset::Standalone => (
                Integrator::PerFrame,
                0.018,
                0.88,
                RenderMode::Trail,
                GlowStyle::Gradient,
                true,
            ),
            Preset::Embedded => (
                Integrator::DeltaTime,
                0.02,
                0.85,
                RenderMode::Clear,
                GlowStyle::Shadow,
                false,
            ),
        };
        self.physics.integrator = integrator;
        self.physics.spring = spring;
        self.physics.friction = friction;
        self.render.mode = mode;
        self.render.glow = glow;
        self.render.highlight = highlight;
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.preset {
            self.apply_preset(p);
        }
        if let Some(m) = args.render_mode {
            self.render.mode = m;
        }
        if let Some(g) = args.glow {
            self.render.glow = g;
        }
        if let Some(i) = args.integrator {
            self.physics.integrator = i;
        }
        if let Some(v) = args.spring {
            self.physics.spring = v;
        }
        if let Some(v) = args.friction {
            self.physics.friction = v;
        }
        if let Some(v) = args.repel_radius {
            self.physics.repel_radius = v;
        }
        if let Some(v) = args.repel_strength {
            self.physics.repel_strength = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.physics;
        ensure!(
            p.spring.is_finite() && p.spring > 0.0 && p.spring <= 1.0,
            "physics.spring must be in (0, 1], got {}",
            p.spring
        );
        ensure!(
            p.friction.is_finite() && p.friction > 0.0 && p.friction <= 1.0,
            "physics.friction must be in (0, 1], got {}",
            p.friction
        );
        ensure!(
            p.repel_radius.is_finite() && p.repel_radius >= 0.0,
            "physics.repel_radius must be >= 0"
        );
        ensure!(
            p.repel_strength.is_finite() && p.repel_strength >= 0.0,
            "physics.repel_strength must be >= 0"
        );
        ensure!(
            p.max_catchup_frames.is_finite() && p.max_catchup_frames >= 1.0,
            "physics.max_catchup_frames must be >= 1"
        );

        for (name, [lo, hi]) in [("drift.radius", self.drift.radius), ("drift.speed", self.drift.speed)] {
            ensure!(
                lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi,
                "{} must be an ordered non-negative range, got [{}, {}]",
                name,
                lo,
                hi
            );
        }

        let r = &self.render;
        ensure!(
            r.trail_alpha > 0.0 && r.trail_alpha <= 1.0,
            "render.trail_alpha must be in (0, 1]"
        );
        ensure!(
            r.glow_scale.is_finite() && r.glow_scale >= 1.0,
            "render.glow_scale must be >= 1"
        );
        ensure!(
            r.breathe_amplitude.is_finite() && (0.0..1.0).contains(&r.breathe_amplitude),
            "render.breathe_amplitude must be in [0, 1)"
        );

        for class in [self.layout.wide, self.layout.compact] {
            ensure!(
                class.particle_size > 0.0 && class.spacing > 0.0,
                "layout particle_size and spacing must be positive"
            );
        }

        if self.sprites.is_empty() {
            bail!("at least one [[sprite]] is required");
        }
        let table = self.color_table();
        let mut missing = BTreeSet::new();
        for s in &self.sprites {
            ensure!(
                s.anchor.iter().all(|v| v.is_finite()),
                "sprite {:?} has a non-finite anchor",
                s.name
            );
            ensure!(
                s.scale_wide > 0.0 && s.scale_compact > 0.0,
                "sprite {:?} needs positive scales",
                s.name
            );
            missing.extend(s.pattern.color_indices().filter(|&i| !table.contains(i)));
        }
        if !missing.is_empty() {
            bail!("pattern color indices without a [[color]] entry: {:?}", missing);
        }
        Ok(())
    }
}

pub fn print_list_presets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE PRESETS:\x1b[0m");
    } else {
        println!("AVAILABLE PRESETS:");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("standalone   per-frame springs (0.018/0.88), fading trails, gradient glow");
    println!("embedded     time-normalized springs (0.02/0.85), hard clear, shadow glow");
}
