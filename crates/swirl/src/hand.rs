//! Detected hands and their handedness.

pub mod gesture;

use std::{fmt, str::FromStr};

use crate::{
    control::Channel,
    landmark::{HandLandmarks, Landmark, MalformedHand},
};

/// Which hand a detection belongs to, as labeled by the landmark detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parses a detector category label such as `"Left"` or `"Right"`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace. Returns [`None`] for any
    /// other label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if label.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else {
            None
        }
    }

    /// Returns the control channel driven by a hand of this handedness.
    ///
    /// The left hand pinches to zoom, the right hand's index finger sets the rotation speed.
    pub fn channel(self) -> Channel {
        match self {
            Self::Left => Channel::Zoom,
            Self::Right => Channel::RotationSpeed,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "Left",
            Self::Right => "Right",
        })
    }
}

/// Error returned when parsing an unknown handedness label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHandedness(String);

impl fmt::Display for UnknownHandedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown handedness label '{}'", self.0)
    }
}

impl std::error::Error for UnknownHandedness {}

impl FromStr for Handedness {
    type Err = UnknownHandedness;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownHandedness(s.to_string()))
    }
}

/// A hand as reported by the landmark detector, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedHand {
    pub landmarks: Vec<Landmark>,
    pub handedness: Option<Handedness>,
}

impl DetectedHand {
    pub fn new(landmarks: Vec<Landmark>, handedness: Option<Handedness>) -> Self {
        Self {
            landmarks,
            handedness,
        }
    }

    /// Creates a [`DetectedHand`] from a detector's raw category label.
    ///
    /// Unknown labels leave the handedness unset.
    pub fn with_label(landmarks: Vec<Landmark>, label: &str) -> Self {
        Self::new(landmarks, Handedness::from_label(label))
    }

    /// Validates the landmark count, producing a [`Hand`].
    pub fn validate(&self) -> Result<Hand, MalformedHand> {
        Ok(Hand {
            landmarks: HandLandmarks::from_slice(&self.landmarks)?,
            handedness: self.handedness,
        })
    }
}

impl From<Hand> for DetectedHand {
    fn from(hand: Hand) -> Self {
        Self::new(hand.landmarks.as_slice().to_vec(), hand.handedness)
    }
}

/// A validated hand with a complete landmark set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hand {
    pub landmarks: HandLandmarks,
    pub handedness: Option<Handedness>,
}

impl Hand {
    pub fn new(landmarks: HandLandmarks, handedness: Option<Handedness>) -> Self {
        Self {
            landmarks,
            handedness,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::landmark::NUM_LANDMARKS;

    use super::*;

    #[test]
    fn parses_detector_labels() {
        assert_eq!(Handedness::from_label("Left"), Some(Handedness::Left));
        assert_eq!(Handedness::from_label(" right\n"), Some(Handedness::Right));
        assert_eq!(Handedness::from_label("LEFT"), Some(Handedness::Left));
        assert_eq!(Handedness::from_label(""), None);
        assert_eq!(Handedness::from_label("Both"), None);

        assert_eq!("Right".parse::<Handedness>(), Ok(Handedness::Right));
        let err = "Up".parse::<Handedness>().unwrap_err();
        assert_eq!(err.to_string(), "unknown handedness label 'Up'");
    }

    #[test]
    fn display_round_trips() {
        for hand in [Handedness::Left, Handedness::Right] {
            assert_eq!(hand.to_string().parse::<Handedness>(), Ok(hand));
        }
    }

    #[test]
    fn dispatch_table() {
        assert_eq!(Handedness::Left.channel(), Channel::Zoom);
        assert_eq!(Handedness::Right.channel(), Channel::RotationSpeed);
    }

    #[test]
    fn unknown_label_keeps_landmarks() {
        let hand = DetectedHand::with_label(vec![Landmark::default(); NUM_LANDMARKS], "Unknown");
        assert_eq!(hand.handedness, None);
        let hand = hand.validate().unwrap();
        assert_eq!(hand.handedness, None);
    }

    #[test]
    fn short_hand_fails_validation() {
        let hand = DetectedHand::new(vec![Landmark::default(); 5], Some(Handedness::Left));
        assert_eq!(hand.validate().unwrap_err(), MalformedHand::LandmarkCount(5));
    }
}
