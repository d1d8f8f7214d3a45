// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod config;
mod frame;
mod input;
mod layout;
mod palette;
mod particle;
mod pattern;
mod raster;
mod runtime;
mod scene;
mod snapshot;
mod terminal;
mod widget;

use std::env;
use std::fs::File;
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use anyhow::{Context, Result};
use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn, Level};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_presets, Args, ColorBg,
    Settings,
};
use crate::frame::Frame;
use crate::input::Disposition;
use crate::raster::Rasterizer;
use crate::runtime::ColorMode;
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::widget::{LoopHandle, Widget};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const SNAPSHOT_FALLBACK_SIZE: (u16, u16) = (100, 32);

fn build_info() -> &'static str {
    env!("YULEGLOW_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Blue))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: Option<f32>, min: f32, max: f32) {
    let Some(v) = v else {
        return;
    };
    require_f64_range(name, v as f64, min as f64, max as f64);
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            16 => ColorMode::Color16,
            8 | 256 => ColorMode::Color256,
            24 | 32 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,16,8,256,24,32)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Color16 => "16-color",
        ColorMode::Mono => "mono",
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let level: Level = args
        .log_level
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid --log-level: {}", args.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);
    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn install_signal_handlers(handle: &LoopHandle) {
    #[cfg(unix)]
    {
        match Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            Ok(mut signals) => {
                let handle = handle.clone();
                thread::spawn(move || {
                    if let Some(sig) = signals.forever().next() {
                        info!(signal = sig, "signal received, stopping");
                        handle.cancel();
                    }
                });
            }
            Err(e) => warn!(error = %e, "failed to install signal handlers"),
        }
    }

    #[cfg(windows)]
    {
        let handle = handle.clone();
        if let Err(e) = ctrlc::set_handler(move || handle.cancel()) {
            warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_logging(&args)?;

    if args.list_presets {
        print_list_presets();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        let sha = env!("YULEGLOW_GIT_SHA");
        if !sha.is_empty() {
            println!("Commit: {}", sha);
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let unset = |s: &str| if s.is_empty() { "(unset)".to_string() } else { s.to_string() };

        println!("BITCOLOR CHECK:");
        println!("  COLORTERM: {}", unset(&colorterm));
        println!("  TERM: {}", unset(&term));
        println!("  auto_detected: {}", color_mode_label(detect_color_mode_auto()));
        if args.colormode.is_some() {
            println!("  forced: {}", color_mode_label(detect_color_mode(&args)));
        }
        println!("  effective: {}", color_mode_label(detect_color_mode(&args)));
        return Ok(());
    }

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let duration_s = args.duration.and_then(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        (s > 0.0).then(|| require_f64_range("--duration", s, 0.1, 86400.0))
    });
    require_f32_range("--spring", args.spring, 0.0001, 1.0);
    require_f32_range("--friction", args.friction, 0.01, 1.0);
    require_f32_range("--repel-radius", args.repel_radius, 0.0, 1000.0);
    require_f32_range("--repel-strength", args.repel_strength, 0.0, 1000.0);
    if let Some(n) = args.snapshot {
        require_f64_range("--snapshot", n as f64, 1.0, 100_000.0);
    }

    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply_args(&args);
    settings.validate()?;

    if args.dump_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let raster = Rasterizer {
        color_mode: detect_color_mode(&args),
        default_background: matches!(args.color_bg, ColorBg::DefaultBackground),
    };
    let stdout_is_tty = std::io::stdout().is_terminal();

    if let Some(frames) = args.snapshot {
        let (cols, rows) = if stdout_is_tty {
            crossterm::terminal::size().unwrap_or(SNAPSHOT_FALLBACK_SIZE)
        } else {
            SNAPSHOT_FALLBACK_SIZE
        };
        let mut widget = Widget::new(settings, raster, cols, rows, make_rng(args.seed));
        let colored = raster.color_mode != ColorMode::Mono && color_enabled_stdout();
        snapshot::run(
            &mut widget,
            cols,
            rows,
            frames,
            target_fps,
            colored,
            &mut std::io::stdout().lock(),
        )?;
        return Ok(());
    }

    if !stdout_is_tty {
        warn!("stdout is not a terminal; nothing to draw on");
        return Ok(());
    }

    let mut term = match Terminal::new() {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "terminal unavailable; animation disabled");
            return Ok(());
        }
    };
    let (w, h) = term.size()?;

    let mut widget = Widget::new(settings, raster, w, h, make_rng(args.seed));
    let handle = widget.start();
    install_signal_handlers(&handle);

    let mut frame = Frame::new(w, h, None);

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let max_frame_dt = (target_period.as_secs_f32() * 4.0).min(0.25);
    let mut next_frame = Instant::now();
    let mut last_tick = Instant::now();

    let mut perf_frames: u64 = 0;
    let mut perf_drawn_frames: u64 = 0;
    let mut perf_work_sum_s: f64 = 0.0;
    let mut perf_work_max_s: f32 = 0.0;

    while widget.is_running() {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                let ev = Terminal::read_event()?;
                if widget.handle_event(&ev) == Disposition::Consumed {
                    continue;
                }
                match ev {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            widget.stop();
                            break;
                        }

                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => widget.stop(),
                            KeyCode::Char(' ') => {
                                widget.scene_mut().scatter();
                                frame.mark_all_dirty();
                            }
                            KeyCode::Char('p') => widget.scene_mut().toggle_pause(),
                            KeyCode::Char('t') => {
                                let scene = widget.scene_mut();
                                let mode = scene.settings().render.mode.toggled();
                                scene.set_render_mode(mode);
                            }
                            KeyCode::Char('g') => {
                                let scene = widget.scene_mut();
                                let glow = scene.settings().render.glow.toggled();
                                scene.set_glow(glow);
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !widget.is_running() || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !widget.is_running() {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            widget.resize(nw, nh);
            frame = Frame::new(nw, nh, None);
        }

        let work_start = Instant::now();
        let dt = work_start
            .saturating_duration_since(last_tick)
            .as_secs_f32()
            .min(max_frame_dt);
        last_tick = work_start;

        widget.frame(dt, &mut frame);
        let did_draw = frame.has_changes();
        if did_draw {
            term.draw(&mut frame)?;
        }
        let work_s = work_start.elapsed().as_secs_f32();

        if args.perf_stats {
            perf_frames = perf_frames.saturating_add(1);
            if did_draw {
                perf_drawn_frames = perf_drawn_frames.saturating_add(1);
            }
            perf_work_sum_s += work_s as f64;
            perf_work_max_s = perf_work_max_s.max(work_s);
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    widget.stop();
    drop(term);

    if args.perf_stats {
        let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
        let frames = perf_frames.max(1);

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  avg_fps: {:.3}", perf_frames as f64 / elapsed_s);
        println!("  frames: {}", perf_frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            perf_drawn_frames,
            perf_drawn_frames as f64 / frames as f64 * 100.0
        );
        println!(
            "  avg_work_ms: {:.3}",
            perf_work_sum_s / frames as f64 * 1000.0
        );
        println!("  max_work_ms: {:.3}", perf_work_max_s as f64 * 1000.0);
        println!("  particles: {}", widget.scene().particles().len());
    }

    Ok(())
}
