//! Open hand vs. fist classification.

use crate::landmark::{HandLandmarks, LandmarkIdx};

/// The non-thumb fingers considered by the [`GestureClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    pub fn tip(self) -> LandmarkIdx {
        match self {
            Self::Index => LandmarkIdx::IndexFingerTip,
            Self::Middle => LandmarkIdx::MiddleFingerTip,
            Self::Ring => LandmarkIdx::RingFingerTip,
            Self::Pinky => LandmarkIdx::PinkyTip,
        }
    }

    pub fn pip(self) -> LandmarkIdx {
        match self {
            Self::Index => LandmarkIdx::IndexFingerPip,
            Self::Middle => LandmarkIdx::MiddleFingerPip,
            Self::Ring => LandmarkIdx::RingFingerPip,
            Self::Pinky => LandmarkIdx::PinkyPip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Open,
    Fist,
}

/// Classifies a hand as a fist or an open hand by checking which fingers are folded.
///
/// A finger counts as folded when its tip is closer to the wrist than `fold_ratio` times the
/// distance between its PIP joint and the wrist. The hand is a fist when at least `min_folded`
/// fingers are folded.
///
/// Lowering `fold_ratio` requires a tighter curl before a finger counts as folded (fewer false
/// fists, more missed ones); raising it does the opposite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureClassifier {
    fold_ratio: f32,
    min_folded: usize,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self {
            fold_ratio: Self::DEFAULT_FOLD_RATIO,
            min_folded: Self::DEFAULT_MIN_FOLDED,
        }
    }
}

impl GestureClassifier {
    pub const DEFAULT_FOLD_RATIO: f32 = 0.8;
    pub const DEFAULT_MIN_FOLDED: usize = 3;

    pub fn with_fold_ratio(self, fold_ratio: f32) -> Self {
        Self { fold_ratio, ..self }
    }

    /// Sets the number of folded fingers required for a fist.
    ///
    /// # Panics
    ///
    /// Panics if `min_folded` is 0 or greater than 4.
    pub fn with_min_folded(self, min_folded: usize) -> Self {
        assert!((1..=Finger::ALL.len()).contains(&min_folded));
        Self { min_folded, ..self }
    }

    pub fn is_folded(&self, hand: &HandLandmarks, finger: Finger) -> bool {
        let tip = hand.distance(finger.tip(), LandmarkIdx::Wrist);
        let pip = hand.distance(finger.pip(), LandmarkIdx::Wrist);
        tip < pip * self.fold_ratio
    }

    /// Counts the folded non-thumb fingers of `hand`.
    pub fn folded_fingers(&self, hand: &HandLandmarks) -> usize {
        Finger::ALL
            .iter()
            .filter(|finger| self.is_folded(hand, **finger))
            .count()
    }

    pub fn classify(&self, hand: &HandLandmarks) -> Gesture {
        if self.folded_fingers(hand) >= self.min_folded {
            Gesture::Fist
        } else {
            Gesture::Open
        }
    }

    #[inline]
    pub fn is_fist(&self, hand: &HandLandmarks) -> bool {
        self.classify(hand) == Gesture::Fist
    }
}
