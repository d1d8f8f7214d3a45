// Copyright (c) 2026 rezky_nightky

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::input::Pointer;
use crate::palette::Swatch;
use crate::runtime::Integrator;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct Physics {
    pub spring: f32,
    pub friction: f32,
    pub repel_radius: f32,
    pub repel_strength: f32,
    pub integrator: Integrator,
    pub max_catchup_frames: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            spring: 0.018,
            friction: 0.88,
            repel_radius: 14.0,
            repel_strength: 6.0,
            integrator: Integrator::PerFrame,
            max_catchup_frames: 3.0,
        }
    }
}

/// Magnitude of the push a pointer at `dist` applies. Linear falloff to zero
/// at `radius`; zero for coincident or non-finite distances.
pub fn repulsion(dist: f32, radius: f32, strength: f32) -> f32 {
    if !dist.is_finite() || dist <= 0.0 || dist >= radius {
        return 0.0;
    }
    (1.0 - dist / radius) * strength
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub base: Vec2,
    pub color_index: u8,
    pub swatch: Swatch,
    pub size: f32,
    pub phase: f32,
    pub drift_radius: f32,
    pub drift_speed: f32,
}

impl Particle {
    pub fn drift_target(&self, t: f32) -> Vec2 {
        let a = t * self.drift_speed + self.phase;
        self.base + Vec2::new(a.cos(), a.sin()) * self.drift_radius
    }

    fn push_from(&self, pointer: Pointer, physics: &Physics) -> Vec2 {
        let away = self.pos - pointer.pos();
        let dist = away.length();
        let force = repulsion(dist, physics.repel_radius, physics.repel_strength);
        if force == 0.0 {
            return Vec2::ZERO;
        }
        away / dist * force
    }

    pub fn update(&mut self, t: f32, dt: f32, pointer: Pointer, physics: &Physics) {
        let k = physics
            .integrator
            .step_scale(dt, physics.max_catchup_frames);
        if k == 0.0 {
            return;
        }

        match physics.integrator {
            Integrator::PerFrame => self.step(t, 1.0, pointer, physics),
            Integrator::DeltaTime => {
                // Each sub-step covers at most one reference frame.
                let n = (k - 1e-4).ceil().max(1.0);
                let h = k / n;
                for _ in 0..n as u32 {
                    self.step(t, h, pointer, physics);
                }
            }
        }
    }

    fn step(&mut self, t: f32, h: f32, pointer: Pointer, physics: &Physics) {
        let delta = self.drift_target(t) - self.pos + self.push_from(pointer, physics);
        self.vel += delta * (physics.spring * h);
        self.vel *= physics.friction.powf(h);
        self.pos += self.vel * h;
    }

    pub fn breathing_size(&self, t: f32, speed: f32, amplitude: f32) -> f32 {
        self.size * (1.0 + (t * speed + self.phase).sin() * amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swatch() -> Swatch {
        Swatch {
            color: [1.0, 1.0, 1.0],
            glow: [1.0, 1.0, 1.0],
            glow_alpha: 0.8,
        }
    }

    fn particle_at(pos: Vec2, base: Vec2) -> Particle {
        Particle {
            pos,
            vel: Vec2::ZERO,
            base,
            color_index: 1,
            swatch: swatch(),
            size: 1.0,
            phase: 0.7,
            drift_radius: 1.5,
            drift_speed: 0.45,
        }
    }

    fn embedded_physics() -> Physics {
        Physics {
            spring: 0.02,
            friction: 0.85,
            integrator: Integrator::DeltaTime,
            ..Physics::default()
        }
    }

    #[test]
    fn repulsion_falls_off_and_vanishes_at_radius() {
        let (r, k) = (14.0, 6.0);
        assert_eq!(repulsion(0.0, r, k), 0.0);
        assert_eq!(repulsion(-1.0, r, k), 0.0);
        assert_eq!(repulsion(f32::NAN, r, k), 0.0);
        assert_eq!(repulsion(r, r, k), 0.0);
        assert_eq!(repulsion(r * 2.0, r, k), 0.0);

        let mut prev = f32::INFINITY;
        for i in 1..140 {
            let f = repulsion(i as f32 * 0.1, r, k);
            assert!(f.is_finite());
            assert!(f < prev, "not decreasing at step {}", i);
            prev = f;
        }
        assert!(repulsion(1e-6, r, k) <= k);
    }

    #[test]
    fn drift_stays_on_circle() {
        let p = particle_at(Vec2::ZERO, Vec2::new(10.0, -4.0));
        for i in 0..200 {
            let off = p.drift_target(i as f32 * 0.37) - p.base;
            assert!((off.length() - p.drift_radius).abs() < 1e-4);
        }
    }

    #[test]
    fn settles_onto_drift_orbit_without_pointer() {
        for physics in [Physics::default(), embedded_physics()] {
            let mut p = particle_at(Vec2::new(180.0, 3.0), Vec2::new(40.0, 70.0));
            let dt = 1.0 / 60.0;
            let mut t = 0.0;
            for _ in 0..1200 {
                t += dt;
                p.update(t, dt, Pointer::FAR, &physics);
            }
            assert!(p.pos.is_finite());
            let lag = (p.pos - p.drift_target(t)).length();
            assert!(lag < 0.05 * p.drift_radius + 0.05, "lag {}", lag);
            assert!((p.pos - p.base).length() <= p.drift_radius * 1.05);
        }
    }

    #[test]
    fn stiff_delta_time_spring_survives_long_frames() {
        for spring in [0.8, 1.0] {
            let physics = Physics {
                spring,
                ..embedded_physics()
            };
            let mut p = particle_at(Vec2::new(180.0, 3.0), Vec2::new(40.0, 70.0));
            let mut t = 0.0;
            for _ in 0..60 {
                t += 0.25;
                p.update(t, 0.25, Pointer::FAR, &physics);
                assert!(p.pos.is_finite() && p.vel.is_finite());
            }
            let off = (p.pos - p.base).length();
            assert!(off < p.drift_radius + 0.5, "spring {} ended {} off", spring, off);
        }
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        for physics in [Physics::default(), embedded_physics()] {
            let mut p = particle_at(Vec2::new(5.0, 5.0), Vec2::new(50.0, 50.0));
            p.vel = Vec2::new(0.3, -0.2);
            let before = (p.pos, p.vel);
            p.update(12.0, 0.0, Pointer::at(6.0, 6.0), &physics);
            assert_eq!((p.pos, p.vel), before);
        }
    }

    #[test]
    fn pointer_pushes_away_and_release_lets_particle_return() {
        let physics = Physics::default();
        let base = Vec2::new(50.0, 50.0);
        let mut p = particle_at(base, base);
        p.drift_radius = 0.0;

        let pointer = Pointer::at(53.0, 50.0);
        let dt = 1.0 / 60.0;
        for i in 0..120 {
            p.update(i as f32 * dt, dt, pointer, &physics);
        }
        assert!(p.pos.x < base.x - 0.5, "expected push to the left, at {}", p.pos.x);
        assert_eq!(p.base, base);

        for i in 120..1200 {
            p.update(i as f32 * dt, dt, Pointer::FAR, &physics);
        }
        assert!((p.pos - base).length() < 1e-2);
    }

    #[test]
    fn pointer_on_top_of_particle_is_harmless() {
        let physics = Physics::default();
        let mut p = particle_at(Vec2::new(20.0, 20.0), Vec2::new(20.0, 20.0));
        p.update(1.0, 1.0 / 60.0, Pointer::at(20.0, 20.0), &physics);
        assert!(p.pos.is_finite() && p.vel.is_finite());
    }

    #[test]
    fn breathing_is_bounded_by_amplitude() {
        let p = particle_at(Vec2::ZERO, Vec2::ZERO);
        for i in 0..100 {
            let s = p.breathing_size(i as f32 * 0.13, 2.0, 0.08);
            assert!((0.92 - 1e-5..=1.08 + 1e-5).contains(&s));
        }
    }
}
