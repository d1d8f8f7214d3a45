// Copyright (c) 2026 rezky_nightky

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(clap::ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    Trail,
    Clear,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Trail => RenderMode::Clear,
            RenderMode::Clear => RenderMode::Trail,
        }
    }
}

#[derive(clap::ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GlowStyle {
    Gradient,
    Shadow,
}

impl GlowStyle {
    pub fn toggled(self) -> Self {
        match self {
            GlowStyle::Gradient => GlowStyle::Shadow,
            GlowStyle::Shadow => GlowStyle::Gradient,
        }
    }
}

#[derive(clap::ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Integrator {
    PerFrame,
    DeltaTime,
}

pub const REFERENCE_HZ: f32 = 60.0;

impl Integrator {
    /// Number of reference frames a step of `dt` seconds stands for.
    /// Zero means "do not step".
    pub fn step_scale(self, dt: f32, max_catchup: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        match self {
            Integrator::PerFrame => 1.0,
            Integrator::DeltaTime => (dt * REFERENCE_HZ).min(max_catchup.max(0.0)),
        }
    }
}

#[derive(clap::ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Standalone,
    Embedded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_or_negative_dt_never_steps() {
        for integ in [Integrator::PerFrame, Integrator::DeltaTime] {
            assert_eq!(integ.step_scale(0.0, 3.0), 0.0);
            assert_eq!(integ.step_scale(-0.1, 3.0), 0.0);
            assert_eq!(integ.step_scale(f32::NAN, 3.0), 0.0);
        }
    }

    #[test]
    fn delta_time_scale_is_capped() {
        let k = Integrator::DeltaTime.step_scale(1.0 / 60.0, 3.0);
        assert!((k - 1.0).abs() < 1e-5);
        assert_eq!(Integrator::DeltaTime.step_scale(1.0, 3.0), 3.0);
        assert_eq!(Integrator::PerFrame.step_scale(1.0, 3.0), 1.0);
    }
}
