// Copyright (c) 2026 rezky_nightky

use std::io::{Result, Write};

use crossterm::style::ContentStyle;
use tracing::info;

use crate::frame::Frame;
use crate::widget::Widget;

pub fn run<W: Write>(
    widget: &mut Widget,
    cols: u16,
    rows: u16,
    frames: u32,
    fps: f64,
    colored: bool,
    out: &mut W,
) -> Result<()> {
    let mut frame = Frame::new(cols, rows, None);
    let dt = (1.0 / fps) as f32;

    let handle = widget.start();
    for _ in 0..frames {
        if !widget.frame(dt, &mut frame) {
            break;
        }
    }
    handle.cancel();
    info!(frames, cols, rows, "snapshot rendered");

    write_frame(&frame, colored, out)
}

pub fn write_frame<W: Write>(frame: &Frame, colored: bool, out: &mut W) -> Result<()> {
    for row in frame.rows() {
        for cell in row {
            if colored {
                let style = ContentStyle {
                    foreground_color: cell.fg,
                    background_color: cell.bg,
                    ..ContentStyle::default()
                };
                write!(out, "{}", style.apply(cell.ch))?;
            } else {
                write!(out, "{}", cell.ch)?;
            }
        }
        writeln!(out)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::raster::Rasterizer;
    use crate::runtime::ColorMode;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn plain_snapshot_draws_both_sprites() {
        let (cols, rows) = (120, 40);
        let mut w = Widget::new(
            Settings::default(),
            Rasterizer {
                color_mode: ColorMode::Mono,
                default_background: true,
            },
            cols,
            rows,
            StdRng::seed_from_u64(5),
        );
        let mut out = Vec::new();
        run(&mut w, cols, rows, 600, 60.0, false, &mut out).unwrap();
        assert!(!w.is_running());

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), rows as usize);
        assert!(lines.iter().all(|l| l.chars().count() == cols as usize));

        let lit_in = |from: usize, to: usize| {
            lines
                .iter()
                .flat_map(|l| l.chars().skip(from).take(to - from))
                .filter(|&c| c != ' ')
                .count()
        };
        // Santa sits in the left half, the tree in the right half.
        assert!(lit_in(0, 60) > 50);
        assert!(lit_in(60, 120) > 50);
    }

    #[test]
    fn colored_output_contains_escape_sequences() {
        let mut w = Widget::new(
            Settings::default(),
            Rasterizer {
                color_mode: ColorMode::TrueColor,
                default_background: false,
            },
            30,
            10,
            StdRng::seed_from_u64(5),
        );
        let mut out = Vec::new();
        run(&mut w, 30, 10, 5, 60.0, true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b["));
        assert_eq!(text.lines().count(), 10);
    }
}
