// Copyright (c) 2026 rezky_nightky

use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

use crate::runtime::ColorMode;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_linear(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn from_linear(c: [f32; 3]) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(c[0]), q(c[1]), q(c[2]))
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| format!("invalid color {:?} (expected #RRGGBB)", s))?;
        match digits.as_slice() {
            [r, g, b] => Ok(Self::new(r * 17, g * 17, b * 17)),
            [r1, r0, g1, g0, b1, b0] => Ok(Self::new(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0)),
            _ => Err(format!("invalid color {:?} (expected #RRGGBB)", s)),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ColorEntry {
    pub index: u8,
    pub color: Rgb,
    pub glow: Rgb,
    pub glow_alpha: f32,
}

impl ColorEntry {
    const fn new(index: u8, color: Rgb, glow_alpha: f32) -> Self {
        Self {
            index,
            color,
            glow: color,
            glow_alpha,
        }
    }
}

pub fn default_entries() -> Vec<ColorEntry> {
    vec![
        ColorEntry::new(1, Rgb::new(0xFF, 0xFF, 0xFF), 0.8), // beard, trim
        ColorEntry::new(2, Rgb::new(0xFF, 0xE4, 0xC4), 0.6), // skin
        ColorEntry::new(3, Rgb::new(0x1A, 0x1A, 0x1A), 0.5), // eyes
        ColorEntry::new(4, Rgb::new(0xFF, 0x69, 0xB4), 0.7), // cheeks
        ColorEntry::new(5, Rgb::new(0xC4, 0x1E, 0x3A), 0.6), // mouth
        ColorEntry::new(6, Rgb::new(0xDC, 0x14, 0x3C), 0.8), // suit
        ColorEntry::new(7, Rgb::new(0x2C, 0x2C, 0x2C), 0.5), // boots
        ColorEntry::new(8, Rgb::new(0x22, 0x8B, 0x22), 0.7), // needles
        ColorEntry::new(9, Rgb::new(0xFF, 0xD7, 0x00), 0.9), // ornaments
        ColorEntry::new(10, Rgb::new(0x8B, 0x45, 0x13), 0.6), // trunk
    ]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Swatch {
    pub color: [f32; 3],
    pub glow: [f32; 3],
    pub glow_alpha: f32,
}

#[derive(Clone, Debug)]
pub struct ColorTable {
    slots: Vec<Option<Swatch>>,
}

impl ColorTable {
    pub fn from_entries(entries: &[ColorEntry]) -> Self {
        let mut slots = vec![None; 256];
        for e in entries {
            if e.index == 0 {
                continue;
            }
            slots[e.index as usize] = Some(Swatch {
                color: e.color.to_linear(),
                glow: e.glow.to_linear(),
                glow_alpha: e.glow_alpha.clamp(0.0, 1.0),
            });
        }
        Self { slots }
    }

    pub fn get(&self, index: u8) -> Option<&Swatch> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    pub fn contains(&self, index: u8) -> bool {
        self.get(index).is_some()
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(c: Rgb) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5) + 127) / 255;
    let (r6, g6, b6) = (level(c.r), level(c.g), level(c.b));
    let (cr, cg, cb) = (
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(c.r, c.g, c.b, cr, cg, cb);

    let avg = ((c.r as u16 + c.g as u16 + c.b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, 0),
        239..=255 => (231, 255),
        _ => {
            let step = (avg - 8) / 10;
            (232 + step, 8 + 10 * step)
        }
    };
    let gray_dist = dist2(c.r, c.g, c.b, gray, gray, gray);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(c: Rgb) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, (r, g, b))| dist2(c.r, c.g, c.b, *r, *g, *b))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

pub fn term_color(mode: ColorMode, c: Rgb) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::Color16 => Some(rgb_to_color16(c)),
    }
}

pub fn luminance(c: [f32; 3]) -> f32 {
    0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!("#FFE4C4".parse::<Rgb>().unwrap(), Rgb::new(255, 228, 196));
        assert_eq!("8b4513".parse::<Rgb>().unwrap(), Rgb::new(139, 69, 19));
        assert_eq!("#f00".parse::<Rgb>().unwrap(), Rgb::new(255, 0, 0));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#GG0000".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(0x22, 0x8B, 0x22).to_string(), "#228B22");
    }

    #[test]
    fn table_covers_builtin_indices() {
        let table = ColorTable::from_entries(&default_entries());
        for i in 1..=10 {
            assert!(table.contains(i), "missing index {}", i);
        }
        assert!(!table.contains(0));
        assert!(!table.contains(11));
    }

    #[test]
    fn quantization_hits_obvious_targets() {
        assert_eq!(rgb_to_ansi256(Rgb::BLACK), 16);
        assert_eq!(rgb_to_ansi256(Rgb::WHITE), 231);
        assert_eq!(rgb_to_color16(Rgb::new(250, 5, 5)), Color::Red);
        assert_eq!(term_color(ColorMode::Mono, Rgb::WHITE), None);
    }
}
