//! Exponential Moving Average.

use super::Filter;

/// An Exponential Moving Average (EMA) filter.
///
/// This is a first-order IIR low-pass filter. Fed a constant value, the output approaches it
/// asymptotically and never overshoots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    alpha: f32,
}

impl Ema {
    /// Creates a new Exponential Moving Average filter.
    ///
    /// The `alpha` parameter must be between 0.0 and 1.0 and is the weight given to each new
    /// value. Values closer to 1.0 follow the input quickly, while values closer to 0.0 smooth more
    /// strongly and react more slowly.
    ///
    /// # Panics
    ///
    /// This method will panic if `alpha` is not in between 0.0 and 1.0.
    pub fn new(alpha: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&alpha),
            "EMA alpha must be in range 0.0..=1.0, got {alpha}"
        );
        Self { alpha }
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Blends `last` toward `value`, returning `(1 - alpha) * last + alpha * value`.
    #[inline]
    pub fn blend(&self, last: f32, value: f32) -> f32 {
        (1.0 - self.alpha) * last + self.alpha * value
    }
}

/// Filter state for [`Ema`] filters.
///
/// The default state is empty, which makes the first filtered value pass through unchanged. A
/// state created with [`EmaState::seeded`] instead blends the very first value with the seed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EmaState {
    last: Option<f32>,
}

impl EmaState {
    pub fn seeded(value: f32) -> Self {
        Self { last: Some(value) }
    }

    /// Returns the most recent filter output, if any value was filtered or seeded.
    #[inline]
    pub fn last(&self) -> Option<f32> {
        self.last
    }
}

impl Filter<f32> for Ema {
    type State = EmaState;

    fn filter(&self, state: &mut Self::State, value: f32) -> f32 {
        let out = match state.last {
            Some(last) => self.blend(last, value),
            None => value,
        };
        state.last = Some(out);
        out
    }
}
