// Copyright (c) 2026 rezky_nightky

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::palette::{ColorTable, Swatch};
use crate::particle::Particle;
use crate::pattern::{self, Pattern};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self::new(cols as f32, rows as f32 * 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeClassKind {
    Wide,
    Compact,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SizeClass {
    pub particle_size: f32,
    pub spacing: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    pub compact_below: f32,
    pub wide: SizeClass,
    pub compact: SizeClass,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            compact_below: 160.0,
            wide: SizeClass {
                particle_size: 1.0,
                spacing: 1.5,
            },
            compact: SizeClass {
                particle_size: 0.8,
                spacing: 1.5,
            },
        }
    }
}

impl LayoutSettings {
    pub fn class_for(&self, vp: Viewport) -> (SizeClassKind, SizeClass) {
        if vp.width < self.compact_below {
            (SizeClassKind::Compact, self.compact)
        } else {
            (SizeClassKind::Wide, self.wide)
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Sprite {
    pub name: String,
    pub anchor: [f32; 2],
    pub scale_wide: f32,
    pub scale_compact: f32,
    pub pattern: Pattern,
}

impl Sprite {
    pub fn scale(&self, kind: SizeClassKind) -> f32 {
        match kind {
            SizeClassKind::Wide => self.scale_wide,
            SizeClassKind::Compact => self.scale_compact,
        }
    }

    pub fn anchor_in(&self, vp: Viewport) -> Vec2 {
        Vec2::new(vp.width * self.anchor[0], vp.height * self.anchor[1])
    }

    pub fn targets(
        &self,
        class: SizeClass,
        kind: SizeClassKind,
        vp: Viewport,
    ) -> impl Iterator<Item = (u8, Vec2)> + '_ {
        let pitch = class.particle_size * class.spacing * self.scale(kind);
        let anchor = self.anchor_in(vp);
        let half = Vec2::new(
            self.pattern.cols() as f32 / 2.0,
            self.pattern.rows() as f32 / 2.0,
        );
        self.pattern.cells().map(move |c| {
            let grid = Vec2::new(c.col as f32, c.row as f32);
            (c.color_index, anchor + (grid - half) * pitch)
        })
    }
}

pub fn default_sprites() -> Vec<Sprite> {
    vec![
        Sprite {
            name: "santa".to_string(),
            anchor: [0.25, 0.5],
            scale_wide: 2.4,
            scale_compact: 2.0,
            pattern: pattern::santa(),
        },
        Sprite {
            name: "tree".to_string(),
            anchor: [0.75, 0.5],
            scale_wide: 3.0,
            scale_compact: 2.3,
            pattern: pattern::tree(),
        },
    ]
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct DriftSettings {
    pub radius: [f32; 2],
    pub speed: [f32; 2],
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self {
            radius: [0.4, 1.0],
            speed: [0.3, 0.6],
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

const FALLBACK: Swatch = Swatch {
    color: [1.0, 1.0, 1.0],
    glow: [1.0, 1.0, 1.0],
    glow_alpha: 0.5,
};

pub fn seed<R: Rng + ?Sized>(
    sprites: &[Sprite],
    layout: &LayoutSettings,
    drift: &DriftSettings,
    colors: &ColorTable,
    vp: Viewport,
    rng: &mut R,
) -> Vec<Particle> {
    let (kind, class) = layout.class_for(vp);
    let total: usize = sprites.iter().map(|s| s.pattern.filled()).sum();
    let mut out = Vec::with_capacity(total);

    for sprite in sprites {
        for (color_index, base) in sprite.targets(class, kind, vp) {
            let swatch = colors.get(color_index).copied().unwrap_or_else(|| {
                warn!(sprite = %sprite.name, color_index, "no color for index");
                FALLBACK
            });
            out.push(Particle {
                pos: Vec2::new(sample(rng, 0.0, vp.width), sample(rng, 0.0, vp.height)),
                vel: Vec2::ZERO,
                base,
                color_index,
                swatch,
                size: class.particle_size,
                phase: sample(rng, 0.0, std::f32::consts::TAU),
                drift_radius: sample(rng, drift.radius[0], drift.radius[1]),
                drift_speed: sample(rng, drift.speed[0], drift.speed[1]),
            });
        }
    }

    debug!(
        particles = out.len(),
        width = vp.width,
        height = vp.height,
        class = ?kind,
        "seeded"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::default_entries;
    use rand::{rngs::StdRng, SeedableRng};

    fn colors() -> ColorTable {
        ColorTable::from_entries(&default_entries())
    }

    #[test]
    fn particle_count_matches_filled_cells_for_any_viewport() {
        let sprites = default_sprites();
        let mut rng = StdRng::seed_from_u64(7);
        for (w, h) in [(40.0, 20.0), (100.0, 100.0), (400.0, 120.0), (0.0, 0.0)] {
            let ps = seed(
                &sprites,
                &LayoutSettings::default(),
                &DriftSettings::default(),
                &colors(),
                Viewport::new(w, h),
                &mut rng,
            );
            assert_eq!(ps.len(), 345);
        }
    }

    #[test]
    fn start_positions_lie_inside_viewport() {
        let mut rng = StdRng::seed_from_u64(1);
        let vp = Viewport::new(120.0, 60.0);
        let ps = seed(
            &default_sprites(),
            &LayoutSettings::default(),
            &DriftSettings::default(),
            &colors(),
            vp,
            &mut rng,
        );
        for p in &ps {
            assert!((0.0..120.0).contains(&p.pos.x));
            assert!((0.0..60.0).contains(&p.pos.y));
            assert!((0.4..1.0).contains(&p.drift_radius));
        }
    }

    #[test]
    fn single_cell_lands_half_a_pitch_off_anchor() {
        let sprite = Sprite {
            name: "dot".to_string(),
            anchor: [0.5, 0.5],
            scale_wide: 2.0,
            scale_compact: 2.0,
            pattern: Pattern::new(vec![vec![1]]),
        };
        let layout = LayoutSettings::default();
        let vp = Viewport::new(100.0, 100.0);
        let (kind, class) = layout.class_for(vp);
        assert_eq!(kind, SizeClassKind::Compact);

        let targets: Vec<_> = sprite.targets(class, kind, vp).collect();
        let pitch = class.particle_size * class.spacing * 2.0;
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].0, 1);
        assert!((targets[0].1 - Vec2::splat(50.0 - pitch / 2.0)).length() < 1e-5);
    }

    #[test]
    fn wide_class_above_breakpoint() {
        let layout = LayoutSettings::default();
        assert_eq!(
            layout.class_for(Viewport::new(200.0, 80.0)).0,
            SizeClassKind::Wide
        );
    }

    #[test]
    fn empty_ranges_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(sample(&mut rng, 2.0, 2.0), 2.0);
        assert_eq!(sample(&mut rng, 0.0, 0.0), 0.0);
    }
}
