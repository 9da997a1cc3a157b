//! Data filtering, averaging and smoothing.

use std::marker::PhantomData;

pub mod ema;

pub use ema::{Ema, EmaState};

/// A filter for values of type `T`.
///
/// Filters are stateless parameter sets. The state they operate on is kept separately in
/// [`Filter::State`], so that the same parameters can be applied to many independent signals.
pub trait Filter<T> {
    /// The per-signal filter state.
    type State;

    /// Adds a new value to the filter state, returning the filtered value.
    fn filter(&self, state: &mut Self::State, value: T) -> T;
}

/// Bundles a [`Filter`] with the state of a single signal.
#[derive(Debug, Clone)]
pub struct SimpleFilter<F: Filter<T>, T> {
    filter: F,
    state: F::State,
    _value: PhantomData<fn(T) -> T>,
}

impl<F: Filter<T>, T> SimpleFilter<F, T>
where
    F::State: Default,
{
    /// Creates a [`SimpleFilter`] starting from the default (empty) filter state.
    pub fn new(filter: F) -> Self {
        Self::with_state(filter, F::State::default())
    }

    /// Resets the accumulated state to the state just after construction with [`Self::new`].
    pub fn reset(&mut self) {
        self.state = F::State::default();
    }
}

impl<F: Filter<T>, T> SimpleFilter<F, T> {
    /// Creates a [`SimpleFilter`] starting from an explicit filter state.
    pub fn with_state(filter: F, state: F::State) -> Self {
        Self {
            filter,
            state,
            _value: PhantomData,
        }
    }

    /// Pushes a value through the filter, returning the filtered value.
    pub fn filter(&mut self, value: T) -> T {
        self.filter.filter(&mut self.state, value)
    }

    #[inline]
    pub fn state(&self) -> &F::State {
        &self.state
    }
}
