//! The gesture-to-control pipeline.
//!
//! A [`Pipeline`] holds only configuration. All state carried from one frame to the next lives in
//! a [`PipelineState`], which [`Pipeline::step`] takes by value and returns updated, so that
//! processing a stream of [`DetectionResult`]s is a fold over that stream.

use std::borrow::Borrow;

use crate::{
    control::{
        mapping::{ChannelMapper, MapperConfig},
        smoothing::{SmoothingRates, TemporalSmoother},
        Channels, ControlState, Interaction,
    },
    detection::DetectionResult,
    hand::gesture::GestureClassifier,
};

/// Configuration of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    classifier: GestureClassifier,
    mapper: MapperConfig,
    rates: SmoothingRates,
    initial: Channels<f32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classifier: GestureClassifier::default(),
            mapper: MapperConfig::default(),
            rates: SmoothingRates::default(),
            initial: ControlState::DEFAULT_CHANNELS,
        }
    }
}

impl PipelineConfig {
    pub fn with_classifier(self, classifier: GestureClassifier) -> Self {
        Self { classifier, ..self }
    }

    pub fn with_mapper(self, mapper: MapperConfig) -> Self {
        Self { mapper, ..self }
    }

    pub fn with_smoothing_rates(self, rates: SmoothingRates) -> Self {
        Self { rates, ..self }
    }

    /// Sets the channel values the pipeline starts out with.
    pub fn with_initial_channels(self, initial: Channels<f32>) -> Self {
        Self { initial, ..self }
    }
}

/// State carried across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineState {
    smoothed: Channels<f32>,
    targets: Channels<f32>,
    interaction: Interaction,
}

impl PipelineState {
    /// Creates the state at pipeline start: no interaction, and targets equal to `initial`.
    pub fn new(initial: Channels<f32>) -> Self {
        Self {
            smoothed: initial,
            targets: initial,
            interaction: Interaction::Idle,
        }
    }

    #[inline]
    pub fn smoothed(&self) -> Channels<f32> {
        self.smoothed
    }

    /// The most recent target of each channel.
    #[inline]
    pub fn targets(&self) -> Channels<f32> {
        self.targets
    }

    #[inline]
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// The control state to publish for this pipeline state.
    pub fn controls(&self) -> ControlState {
        ControlState::new(self.smoothed, self.interaction)
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new(ControlState::DEFAULT_CHANNELS)
    }
}

/// Converts detection results into control states.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pipeline {
    classifier: GestureClassifier,
    mapper: ChannelMapper,
    smoother: TemporalSmoother,
    initial: Channels<f32>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            classifier: config.classifier,
            mapper: ChannelMapper::new(config.mapper),
            smoother: TemporalSmoother::new(config.rates),
            initial: config.initial,
        }
    }

    /// Returns the state to start (or restart) processing from.
    pub fn initial_state(&self) -> PipelineState {
        PipelineState::new(self.initial)
    }

    /// Processes one frame's detections.
    ///
    /// A frame without usable hands only marks the state as idle; all channel values and targets
    /// are carried over unchanged.
    pub fn step(&self, state: PipelineState, detection: &DetectionResult) -> PipelineState {
        let hands = detection.validated();
        let interaction = Interaction::observe(hands.len());
        if interaction != state.interaction {
            log::debug!("interaction: {:?} -> {:?}", state.interaction, interaction);
        }

        if hands.is_empty() {
            return PipelineState {
                interaction,
                ..state
            };
        }

        let targets = self.mapper.targets(state.targets, &hands, &self.classifier);
        let smoothed = self.smoother.smooth(state.smoothed, targets);
        log::trace!("targets={:?} smoothed={:?}", targets, smoothed);

        PipelineState {
            smoothed,
            targets,
            interaction,
        }
    }

    /// Lazily processes a stream of detection results, yielding the control state published after
    /// each of them.
    pub fn run<'a, I>(
        &'a self,
        state: PipelineState,
        detections: I,
    ) -> impl Iterator<Item = ControlState> + 'a
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: Borrow<DetectionResult>,
    {
        detections
            .into_iter()
            .scan(state, move |state, detection| {
                *state = self.step(*state, detection.borrow());
                Some(state.controls())
            })
    }
}
