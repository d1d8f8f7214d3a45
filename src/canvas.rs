// Copyright (c) 2026 rezky_nightky

use glam::Vec2;

#[derive(Clone, Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    px: Vec<[f32; 3]>,
    background: [f32; 3],
}

pub fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: [f32; 3]) -> Self {
        Self {
            width,
            height,
            px: vec![background; width * height],
            background,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn background(&self) -> [f32; 3] {
        self.background
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.px[y * self.width + x])
    }

    pub fn clear(&mut self) {
        self.px.fill(self.background);
    }

    pub fn fade(&mut self, alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        let bg = self.background;
        for p in &mut self.px {
            *p = mix(*p, bg, a);
        }
    }

    pub fn blend(&mut self, x: usize, y: usize, color: [f32; 3], alpha: f32) {
        if x >= self.width || y >= self.height || alpha <= 0.0 {
            return;
        }
        let i = y * self.width + x;
        self.px[i] = mix(self.px[i], color, alpha.min(1.0));
    }

    /// Visit every pixel whose center lies within `radius` of `center`,
    /// handing the shader the normalized distance in `[0, 1)`.
    pub fn radial<F>(&mut self, center: Vec2, radius: f32, mut shader: F)
    where
        F: FnMut(f32) -> Option<([f32; 3], f32)>,
    {
        if radius.is_nan() || radius <= 0.0 || !center.is_finite() {
            return;
        }
        let Some((x0, x1)) = span(center.x, radius, self.width) else {
            return;
        };
        let Some((y0, y1)) = span(center.y, radius, self.height) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center) / radius;
                if d >= 1.0 {
                    continue;
                }
                if let Some((color, alpha)) = shader(d) {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }

    pub fn disc(&mut self, center: Vec2, radius: f32, color: [f32; 3], alpha: f32) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let reach = radius + 0.5;
        self.radial(center, reach, |d| {
            let coverage = (reach - d * reach).clamp(0.0, 1.0);
            Some((color, alpha * coverage))
        });
    }
}

fn span(c: f32, r: f32, len: usize) -> Option<(usize, usize)> {
    let lo = (c - r).floor().max(0.0);
    let hi = (c + r).ceil().min(len as f32);
    if hi <= lo {
        return None;
    }
    Some((lo as usize, hi as usize))
}
