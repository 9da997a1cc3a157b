//! Temporal smoothing of control channels.

use swirl_utils::filter::Ema;

use super::Channels;

/// Per-channel smoothing rates.
///
/// Each rate is the weight of the new target in every update, so higher rates respond faster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingRates(Channels<f32>);

impl Default for SmoothingRates {
    fn default() -> Self {
        // Roughness changes the texture of the whole image and is eased in more slowly.
        Self(Channels::new(0.1, 0.1, 0.05))
    }
}

impl SmoothingRates {
    pub fn new(rates: Channels<f32>) -> Self {
        Self(rates)
    }

    pub fn with_zoom(mut self, rate: f32) -> Self {
        self.0.zoom = rate;
        self
    }

    pub fn with_rotation_speed(mut self, rate: f32) -> Self {
        self.0.rotation_speed = rate;
        self
    }

    pub fn with_roughness(mut self, rate: f32) -> Self {
        self.0.roughness = rate;
        self
    }

    pub fn rates(&self) -> Channels<f32> {
        self.0
    }
}

/// Exponential low-pass filter applied to every control channel.
///
/// The smoother itself is stateless; the smoothed values are passed in and returned by
/// [`TemporalSmoother::smooth`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalSmoother {
    filters: Channels<Ema>,
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(SmoothingRates::default())
    }
}

impl TemporalSmoother {
    /// Creates a smoother using the given rates.
    ///
    /// # Panics
    ///
    /// Panics if any rate is outside of `0.0..=1.0`.
    pub fn new(rates: SmoothingRates) -> Self {
        Self {
            filters: rates.0.map(|_, rate| Ema::new(rate)),
        }
    }

    /// Moves every `current` channel value toward its target by that channel's rate.
    pub fn smooth(&self, current: Channels<f32>, targets: Channels<f32>) -> Channels<f32> {
        current.zip_with(targets, |channel, current, target| {
            self.filters.get(channel).blend(current, target)
        })
    }
}
