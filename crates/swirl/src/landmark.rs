//! Hand landmark data as produced by an external landmark detector.

use std::{error::Error, fmt, ops::Index};

use nalgebra::Point2;

type Position = [f32; 3];

/// Number of landmarks in a hand landmark set.
pub const NUM_LANDMARKS: usize = 21;

/// A landmark in 3D space.
///
/// `x` and `y` are normalized to the input frame (0.0 to 1.0 from left to right and top to
/// bottom), `z` is a relative depth estimate.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Default)]
pub struct Landmark {
    pos: Position,
}

impl Landmark {
    pub fn new(position: Position) -> Self {
        Self { pos: position }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos[1]
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.pos[2]
    }

    /// Returns the landmark's position projected onto the image plane.
    #[inline]
    pub fn planar(&self) -> Point2<f32> {
        Point2::new(self.x(), self.y())
    }

    /// Returns whether all coordinates are finite (neither NaN nor infinite).
    pub fn is_finite(&self) -> bool {
        self.pos.iter().all(|c| c.is_finite())
    }

    /// Computes the Euclidean distance between two landmarks in the image plane.
    ///
    /// The depth coordinate is ignored, so all gesture thresholds are image-plane distances.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        nalgebra::distance(&self.planar(), &other.planar())
    }
}

impl From<Position> for Landmark {
    fn from(pos: Position) -> Self {
        Self::new(pos)
    }
}

/// Names for the hand landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkIdx {
    /// All landmarks, in detector order.
    pub const ALL: [LandmarkIdx; NUM_LANDMARKS] = {
        use LandmarkIdx::*;
        [
            Wrist,
            ThumbCmc,
            ThumbMcp,
            ThumbIp,
            ThumbTip,
            IndexFingerMcp,
            IndexFingerPip,
            IndexFingerDip,
            IndexFingerTip,
            MiddleFingerMcp,
            MiddleFingerPip,
            MiddleFingerDip,
            MiddleFingerTip,
            RingFingerMcp,
            RingFingerPip,
            RingFingerDip,
            RingFingerTip,
            PinkyMcp,
            PinkyPip,
            PinkyDip,
            PinkyTip,
        ]
    };
}

/// Pairs of landmarks connected by a bone, for drawing a hand skeleton.
pub const CONNECTIVITY: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // Surround the palm:
        (Wrist, ThumbCmc),
        (ThumbCmc, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (PinkyMcp, Wrist),
        // Thumb:
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // Index:
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // Middle:
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // Ring:
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // Pinky:
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// A complete set of the 21 landmarks of one hand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandLandmarks {
    landmarks: [Landmark; NUM_LANDMARKS],
}

impl HandLandmarks {
    pub fn new(landmarks: [Landmark; NUM_LANDMARKS]) -> Self {
        Self { landmarks }
    }

    /// Copies the landmarks out of a slice produced by a detector.
    ///
    /// Fails with [`MalformedHand`] unless the slice contains exactly [`NUM_LANDMARKS`] entries,
    /// all of them with finite coordinates.
    pub fn from_slice(landmarks: &[Landmark]) -> Result<Self, MalformedHand> {
        let landmarks = <[Landmark; NUM_LANDMARKS]>::try_from(landmarks)
            .map_err(|_| MalformedHand::LandmarkCount(landmarks.len()))?;
        if let Some(idx) = LandmarkIdx::ALL
            .into_iter()
            .find(|&idx| !landmarks[idx as usize].is_finite())
        {
            return Err(MalformedHand::NonFinite(idx));
        }
        Ok(Self { landmarks })
    }

    #[inline]
    pub fn get(&self, idx: LandmarkIdx) -> Landmark {
        self.landmarks[idx as usize]
    }

    pub fn set(&mut self, idx: LandmarkIdx, landmark: Landmark) {
        self.landmarks[idx as usize] = landmark;
    }

    pub fn iter(&self) -> impl Iterator<Item = Landmark> + Clone + '_ {
        self.landmarks.iter().copied()
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Planar distance between two landmarks of this hand.
    pub fn distance(&self, a: LandmarkIdx, b: LandmarkIdx) -> f32 {
        self.get(a).planar_distance(&self.get(b))
    }
}

impl Index<LandmarkIdx> for HandLandmarks {
    type Output = Landmark;

    #[inline]
    fn index(&self, idx: LandmarkIdx) -> &Landmark {
        &self.landmarks[idx as usize]
    }
}

/// Error returned when a detector reports a hand with the wrong number of landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedHand {
    /// The detector reported this many landmarks instead of [`NUM_LANDMARKS`].
    LandmarkCount(usize),
    /// A landmark has a NaN or infinite coordinate.
    NonFinite(LandmarkIdx),
}

impl fmt::Display for MalformedHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LandmarkCount(len) => write!(
                f,
                "malformed hand: expected {} landmarks, got {}",
                NUM_LANDMARKS, len
            ),
            Self::NonFinite(idx) => {
                write!(f, "malformed hand: non-finite coordinate at {:?}", idx)
            }
        }
    }
}

impl Error for MalformedHand {}
