//! Mapping of hand measurements to control channel targets.

use crate::{
    hand::{gesture::GestureClassifier, Hand, Handedness},
    landmark::{HandLandmarks, LandmarkIdx},
};

use super::{Channel, Channels, ControlState};

/// Parameters of the [`ChannelMapper`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperConfig {
    pinch_min: f32,
    pinch_max: f32,
    zoom_min: f32,
    zoom_max: f32,
    rotation_center: f32,
    rotation_gain: f32,
    roughness_fist: f32,
    roughness_open: f32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            pinch_min: 0.02,
            pinch_max: 0.15,
            zoom_min: 0.5,
            zoom_max: 3.0,
            rotation_center: 0.5,
            rotation_gain: 4.0,
            roughness_fist: 0.9,
            roughness_open: 0.1,
        }
    }
}

impl MapperConfig {
    /// Sets the range of pinch distances mapped onto the zoom range.
    ///
    /// Distances outside of the window saturate at the ends of the zoom range.
    ///
    /// # Panics
    ///
    /// Panics if `min` is not smaller than `max`.
    pub fn with_pinch_window(self, min: f32, max: f32) -> Self {
        assert!(min < max, "empty pinch window {min}..{max}");
        Self {
            pinch_min: min,
            pinch_max: max,
            ..self
        }
    }

    /// Sets the zoom range the pinch window is mapped onto.
    ///
    /// # Panics
    ///
    /// Panics if `min..=max` is empty or not contained in [`ControlState::ZOOM_RANGE`].
    pub fn with_zoom_range(self, min: f32, max: f32) -> Self {
        let (lo, hi) = ControlState::ZOOM_RANGE;
        assert!(
            lo <= min && min <= max && max <= hi,
            "zoom range {min}..={max} must lie within {lo}..={hi}"
        );
        Self {
            zoom_min: min,
            zoom_max: max,
            ..self
        }
    }

    /// Sets the rotation speed per unit of horizontal index finger offset from the frame center.
    ///
    /// # Panics
    ///
    /// Panics if a fingertip at the frame edge would exceed [`ControlState::ROTATION_SPEED_RANGE`].
    pub fn with_rotation_gain(self, gain: f32) -> Self {
        let (lo, hi) = ControlState::ROTATION_SPEED_RANGE;
        let offset = self.rotation_center.max(1.0 - self.rotation_center);
        assert!(
            (lo..=hi).contains(&(gain * offset)) && (lo..=hi).contains(&(-gain * offset)),
            "rotation gain {gain} exceeds the rotation speed range {lo}..={hi}"
        );
        Self {
            rotation_gain: gain,
            ..self
        }
    }

    /// Sets the roughness targets for frames with and without a fist.
    ///
    /// # Panics
    ///
    /// Panics if either value is outside of [`ControlState::ROUGHNESS_RANGE`].
    pub fn with_roughness(self, fist: f32, open: f32) -> Self {
        let (lo, hi) = ControlState::ROUGHNESS_RANGE;
        assert!(
            (lo..=hi).contains(&fist) && (lo..=hi).contains(&open),
            "roughness values {fist}, {open} must lie within {lo}..={hi}"
        );
        Self {
            roughness_fist: fist,
            roughness_open: open,
            ..self
        }
    }
}

/// Derives per-frame target values for the control channels from detected hands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelMapper {
    config: MapperConfig,
}

impl ChannelMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Maps a pinch distance (thumb tip to index finger tip) to a zoom target.
    pub fn zoom_for_pinch(&self, distance: f32) -> f32 {
        let c = &self.config;
        let normalized = ((distance - c.pinch_min) / (c.pinch_max - c.pinch_min)).clamp(0.0, 1.0);
        c.zoom_min + normalized * (c.zoom_max - c.zoom_min)
    }

    /// Maps the normalized horizontal index finger tip position to a rotation speed target.
    ///
    /// The frame center yields zero rotation. Positions outside of the frame are clamped to its
    /// edges.
    pub fn rotation_for_index_x(&self, x: f32) -> f32 {
        (x.clamp(0.0, 1.0) - self.config.rotation_center) * self.config.rotation_gain
    }

    pub fn roughness_for(&self, any_fist: bool) -> f32 {
        if any_fist {
            self.config.roughness_fist
        } else {
            self.config.roughness_open
        }
    }

    /// Computes the target for the channel driven by a hand of the given handedness.
    pub fn hand_target(&self, handedness: Handedness, hand: &HandLandmarks) -> (Channel, f32) {
        let value = match handedness {
            Handedness::Left => self.zoom_for_pinch(pinch_distance(hand)),
            Handedness::Right => self.rotation_for_index_x(hand[LandmarkIdx::IndexFingerTip].x()),
        };
        (handedness.channel(), value)
    }

    /// Computes the targets for all channels from the hands of one frame.
    ///
    /// Channels without a hand to drive them keep their `previous` target. Hands without a
    /// handedness label only contribute to the roughness channel. Roughness goes to its fist value
    /// if *any* hand is a fist.
    ///
    /// If `hands` is empty, `previous` is returned unchanged.
    pub fn targets(
        &self,
        previous: Channels<f32>,
        hands: &[Hand],
        classifier: &GestureClassifier,
    ) -> Channels<f32> {
        let mut targets = previous;
        if hands.is_empty() {
            return targets;
        }

        let mut any_fist = false;
        for hand in hands {
            if let Some(handedness) = hand.handedness {
                let (channel, value) = self.hand_target(handedness, &hand.landmarks);
                targets.set(channel, value);
            }
            any_fist |= classifier.is_fist(&hand.landmarks);
        }
        targets.roughness = self.roughness_for(any_fist);

        targets
    }
}

/// Computes the planar distance between the thumb tip and the index finger tip.
pub fn pinch_distance(hand: &HandLandmarks) -> f32 {
    hand.distance(LandmarkIdx::ThumbTip, LandmarkIdx::IndexFingerTip)
}
