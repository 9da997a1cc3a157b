//! Render-side consumers of the published control state.
//!
//! The swirl effect does not use the control values directly. It eases its own shader uniforms
//! toward them every rendered frame, and advances its animation clock by the rotation speed.

use std::fmt;

use swirl_utils::filter::{Ema, EmaState, SimpleFilter};

use crate::{control::ControlState, driver::Status};

const INITIAL_SCALE: f32 = 1.0;
const INITIAL_ROUGHNESS: f32 = 0.5;
const INITIAL_INTENSITY: f32 = 1.0;

/// Shader uniforms of the swirl effect.
#[derive(Debug, Clone)]
pub struct SwirlUniforms {
    time: f32,
    scale: SimpleFilter<Ema, f32>,
    roughness: SimpleFilter<Ema, f32>,
    intensity: SimpleFilter<Ema, f32>,
}

impl Default for SwirlUniforms {
    fn default() -> Self {
        Self::new()
    }
}

impl SwirlUniforms {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            scale: SimpleFilter::with_state(Ema::new(0.1), EmaState::seeded(INITIAL_SCALE)),
            roughness: SimpleFilter::with_state(
                Ema::new(0.05),
                EmaState::seeded(INITIAL_ROUGHNESS),
            ),
            intensity: SimpleFilter::with_state(
                Ema::new(0.1),
                EmaState::seeded(INITIAL_INTENSITY),
            ),
        }
    }

    /// Advances the uniforms by one rendered frame that took `delta_secs` seconds.
    pub fn update(&mut self, controls: &ControlState, delta_secs: f32) {
        self.time += delta_secs * controls.rotation_speed;
        self.scale.filter(controls.zoom);
        self.roughness.filter(controls.roughness);
        self.intensity
            .filter(if controls.is_interacting { 1.5 } else { 1.1 });
    }

    /// The animation clock, which runs backwards while the rotation speed is negative.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale.state().last().unwrap_or(INITIAL_SCALE)
    }

    #[inline]
    pub fn roughness(&self) -> f32 {
        self.roughness.state().last().unwrap_or(INITIAL_ROUGHNESS)
    }

    #[inline]
    pub fn intensity(&self) -> f32 {
        self.intensity.state().last().unwrap_or(INITIAL_INTENSITY)
    }
}

/// Strength of the bloom post-processing pass.
pub fn bloom_intensity(controls: &ControlState) -> f32 {
    if controls.is_interacting {
        1.5
    } else {
        0.5
    }
}

/// The heads-up display text.
#[derive(Debug, Clone, Copy)]
pub struct Hud {
    pub status: Status,
    pub controls: ControlState,
}

impl fmt::Display for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status == Status::Loading {
            return f.write_str("INITIALIZING AI VISION...");
        }
        write!(
            f,
            "ZOOM: {:.2} | SPEED: {:.2}",
            self.controls.zoom, self.controls.rotation_speed
        )?;
        if self.controls.is_interacting {
            f.write_str(" | Input Detected")?;
        }
        Ok(())
    }
}
