// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::canvas::Canvas;
use crate::cell::{Cell, FULL_BLOCK, LOWER_HALF, UPPER_HALF};
use crate::frame::Frame;
use crate::palette::{luminance, term_color, Rgb};
use crate::runtime::ColorMode;

const DARK_EPSILON: f32 = 0.02;
const MONO_THRESHOLD: f32 = 0.2;

#[derive(Clone, Copy, Debug)]
pub struct Rasterizer {
    pub color_mode: ColorMode,
    pub default_background: bool,
}

impl Rasterizer {
    fn background_cell(&self, canvas: &Canvas) -> Option<Color> {
        if self.default_background {
            None
        } else {
            term_color(self.color_mode, Rgb::from_linear(canvas.background()))
        }
    }

    pub fn draw(&self, canvas: &Canvas, frame: &mut Frame) {
        let bg = self.background_cell(canvas);
        let bg_lum = luminance(canvas.background());
        let sample = |x: u16, y: usize| {
            canvas
                .pixel(x as usize, y)
                .unwrap_or_else(|| canvas.background())
        };

        for row in 0..frame.height {
            for col in 0..frame.width {
                let top = sample(col, row as usize * 2);
                let bottom = sample(col, row as usize * 2 + 1);
                let cell = if self.color_mode == ColorMode::Mono {
                    mono_cell(top, bottom)
                } else {
                    let lit = |c: [f32; 3]| (luminance(c) - bg_lum).abs() > DARK_EPSILON;
                    let color = |c: [f32; 3]| term_color(self.color_mode, Rgb::from_linear(c));
                    match (lit(top), lit(bottom)) {
                        (false, false) => Cell::blank(bg),
                        (true, false) => Cell {
                            ch: UPPER_HALF,
                            fg: color(top),
                            bg,
                        },
                        (false, true) => Cell {
                            ch: LOWER_HALF,
                            fg: color(bottom),
                            bg,
                        },
                        (true, true) => Cell {
                            ch: UPPER_HALF,
                            fg: color(top),
                            bg: color(bottom),
                        },
                    }
                };
                frame.set(col, row, cell);
            }
        }
    }
}

fn mono_cell(top: [f32; 3], bottom: [f32; 3]) -> Cell {
    let ch = match (
        luminance(top) > MONO_THRESHOLD,
        luminance(bottom) > MONO_THRESHOLD,
    ) {
        (false, false) => ' ',
        (true, false) => UPPER_HALF,
        (false, true) => LOWER_HALF,
        (true, true) => FULL_BLOCK,
    };
    Cell {
        ch,
        fg: None,
        bg: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
    const RED: [f32; 3] = [1.0, 0.0, 0.0];

    fn canvas_with(top: [f32; 3], bottom: [f32; 3]) -> Canvas {
        let mut c = Canvas::new(1, 2, BLACK);
        c.blend(0, 0, top, 1.0);
        c.blend(0, 1, bottom, 1.0);
        c
    }

    #[test]
    fn truecolor_uses_half_blocks() {
        let r = Rasterizer {
            color_mode: ColorMode::TrueColor,
            default_background: false,
        };
        let mut f = Frame::new(1, 1, None);

        r.draw(&canvas_with(RED, BLACK), &mut f);
        let cell = *f.get(0, 0).unwrap();
        assert_eq!(cell.ch, UPPER_HALF);
        assert_eq!(cell.fg, Some(Color::Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(cell.bg, Some(Color::Rgb { r: 0, g: 0, b: 0 }));

        r.draw(&canvas_with(BLACK, RED), &mut f);
        assert_eq!(f.get(0, 0).unwrap().ch, LOWER_HALF);

        r.draw(&canvas_with(BLACK, BLACK), &mut f);
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn default_background_leaves_bg_unset() {
        let r = Rasterizer {
            color_mode: ColorMode::Color256,
            default_background: true,
        };
        let mut f = Frame::new(1, 1, None);
        r.draw(&canvas_with(RED, BLACK), &mut f);
        assert_eq!(f.get(0, 0).unwrap().bg, None);
    }

    #[test]
    fn mono_picks_block_by_luminance() {
        let r = Rasterizer {
            color_mode: ColorMode::Mono,
            default_background: false,
        };
        let white = [1.0, 1.0, 1.0];
        let mut f = Frame::new(1, 1, None);
        r.draw(&canvas_with(white, white), &mut f);
        assert_eq!(f.get(0, 0).unwrap().ch, FULL_BLOCK);
        r.draw(&canvas_with(BLACK, white), &mut f);
        assert_eq!(f.get(0, 0).unwrap().ch, LOWER_HALF);
    }

    #[test]
    fn cells_past_canvas_edge_are_background() {
        let r = Rasterizer {
            color_mode: ColorMode::TrueColor,
            default_background: true,
        };
        let mut f = Frame::new(3, 3, None);
        r.draw(&canvas_with(RED, RED), &mut f);
        assert_eq!(f.get(2, 2).unwrap().ch, ' ');
        assert_eq!(f.get(0, 0).unwrap().ch, UPPER_HALF);
    }
}
