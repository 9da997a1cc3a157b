//! Landmark detection results and the detector interface.

use crate::hand::{DetectedHand, Hand};

/// The hands observed by a [`LandmarkDetector`] in one frame.
///
/// May be empty. A conforming detector reports at most one hand per [`Handedness`].
///
/// [`Handedness`]: crate::hand::Handedness
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionResult {
    pub hands: Vec<DetectedHand>,
}

impl DetectionResult {
    pub fn new(hands: Vec<DetectedHand>) -> Self {
        Self { hands }
    }

    /// A result without any hands.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hands.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectedHand> + '_ {
        self.hands.iter()
    }

    /// Returns all hands with a complete landmark set, in detection order.
    ///
    /// Malformed hands are logged and skipped.
    pub fn validated(&self) -> Vec<Hand> {
        self.hands
            .iter()
            .filter_map(|hand| match hand.validate() {
                Ok(hand) => Some(hand),
                Err(e) => {
                    log::warn!("discarding {:?} hand: {}", hand.handedness, e);
                    None
                }
            })
            .collect()
    }
}

impl FromIterator<DetectedHand> for DetectionResult {
    fn from_iter<I: IntoIterator<Item = DetectedHand>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<Hand>> for DetectionResult {
    fn from(hands: Vec<Hand>) -> Self {
        hands.into_iter().map(DetectedHand::from).collect()
    }
}

/// A hand landmark detector operating on frames of type `F`.
///
/// This is the interface to the external vision model. Detection runs synchronously and must
/// complete before the frame's control state can be published.
pub trait LandmarkDetector<F> {
    /// Detects the hands in `frame`, captured `timestamp_ms` milliseconds into the stream.
    ///
    /// Timestamps passed to a detector never decrease.
    fn detect(&mut self, frame: &F, timestamp_ms: f64) -> DetectionResult;
}

impl<F, D: LandmarkDetector<F> + ?Sized> LandmarkDetector<F> for Box<D> {
    fn detect(&mut self, frame: &F, timestamp_ms: f64) -> DetectionResult {
        (**self).detect(frame, timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use crate::{hand::Handedness, landmark::Landmark, sim::HandPose};

    use super::*;

    #[test]
    fn validated_drops_malformed_hands() {
        let good = DetectedHand::from(HandPose::open().right().hand());
        let short = DetectedHand::new(vec![Landmark::default(); 12], Some(Handedness::Left));
        let result = DetectionResult::new(vec![short, good.clone()]);

        assert_eq!(result.len(), 2);
        let hands = result.validated();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].handedness, Some(Handedness::Right));
        assert_eq!(DetectedHand::from(hands[0]), good);
    }

    #[test]
    fn empty_result() {
        let result = DetectionResult::empty();
        assert!(result.is_empty());
        assert!(result.validated().is_empty());
    }
}
