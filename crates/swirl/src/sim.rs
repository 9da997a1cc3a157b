//! Synthetic hands, frame sources and detectors.
//!
//! Used by the demo binary in place of a camera and vision model, and by the tests to build hand
//! poses with known geometry.

use std::{collections::VecDeque, f32::consts::TAU, time::Duration};

use crate::{
    detection::{DetectionResult, LandmarkDetector},
    hand::{gesture::Finger, DetectedHand, Hand, Handedness},
    landmark::{HandLandmarks, Landmark, LandmarkIdx},
    video::{FrameSource, FrameSourceOptions},
};

/// Wrist-to-tip distance of an extended finger, relative to its wrist-to-PIP distance.
const EXTENDED_TIP_RATIO: f32 = 1.4;
/// Wrist-to-tip distance of a curled finger, relative to its wrist-to-PIP distance.
const CURLED_TIP_RATIO: f32 = 0.5;

/// Finger joint offsets from the wrist: `(finger, MCP, PIP)`.
const FINGER_JOINTS: [(Finger, [f32; 2], [f32; 2]); 4] = [
    (Finger::Index, [-0.030, -0.100], [-0.035, -0.150]),
    (Finger::Middle, [0.000, -0.105], [0.000, -0.160]),
    (Finger::Ring, [0.030, -0.100], [0.033, -0.150]),
    (Finger::Pinky, [0.055, -0.090], [0.062, -0.130]),
];

/// Thumb joint offsets from the wrist: CMC, MCP, IP and tip.
const THUMB_JOINTS: [[f32; 2]; 4] = [
    [-0.035, -0.030],
    [-0.060, -0.060],
    [-0.075, -0.085],
    [-0.085, -0.110],
];

/// Builder for a right-side-up hand with known geometry.
///
/// Every finger is placed on a straight line from the wrist through its PIP joint. The tip sits at
/// a configurable multiple of the wrist-to-PIP distance along that line, which directly controls
/// whether the finger counts as folded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    wrist: [f32; 2],
    tip_ratios: [f32; 4],
    pinch: Option<f32>,
    index_tip_x: Option<f32>,
    handedness: Option<Handedness>,
}

impl HandPose {
    /// An open hand with all fingers extended.
    pub fn open() -> Self {
        Self {
            wrist: [0.5, 0.8],
            tip_ratios: [EXTENDED_TIP_RATIO; 4],
            pinch: None,
            index_tip_x: None,
            handedness: None,
        }
    }

    /// A closed fist with all fingers curled.
    pub fn fist() -> Self {
        Self {
            tip_ratios: [CURLED_TIP_RATIO; 4],
            ..Self::open()
        }
    }

    /// Moves the wrist to `(x, y)`.
    pub fn at(self, x: f32, y: f32) -> Self {
        Self {
            wrist: [x, y],
            ..self
        }
    }

    /// Places the tip of `finger` at `ratio` times its wrist-to-PIP distance from the wrist.
    pub fn tip_ratio(mut self, finger: Finger, ratio: f32) -> Self {
        self.tip_ratios[finger_slot(finger)] = ratio;
        self
    }

    /// Places the thumb tip `distance` to the left of the index finger tip.
    pub fn pinch(self, distance: f32) -> Self {
        Self {
            pinch: Some(distance),
            ..self
        }
    }

    /// Shifts the hand horizontally so that the index finger tip ends up at `x`.
    pub fn index_tip_x(self, x: f32) -> Self {
        Self {
            index_tip_x: Some(x),
            ..self
        }
    }

    pub fn left(self) -> Self {
        Self {
            handedness: Some(Handedness::Left),
            ..self
        }
    }

    pub fn right(self) -> Self {
        Self {
            handedness: Some(Handedness::Right),
            ..self
        }
    }

    pub fn unlabeled(self) -> Self {
        Self {
            handedness: None,
            ..self
        }
    }

    pub fn landmarks(&self) -> HandLandmarks {
        let mut landmarks = HandLandmarks::default();
        let [wx, wy] = self.wrist;
        let mut put = |idx: LandmarkIdx, [dx, dy]: [f32; 2]| {
            landmarks.set(idx, Landmark::new([wx + dx, wy + dy, 0.0]));
        };

        put(LandmarkIdx::Wrist, [0.0, 0.0]);
        for (idx, offset) in [
            LandmarkIdx::ThumbCmc,
            LandmarkIdx::ThumbMcp,
            LandmarkIdx::ThumbIp,
            LandmarkIdx::ThumbTip,
        ]
        .into_iter()
        .zip(THUMB_JOINTS)
        {
            put(idx, offset);
        }

        for (finger, mcp, pip) in FINGER_JOINTS {
            let ratio = self.tip_ratios[finger_slot(finger)];
            let tip = [pip[0] * ratio, pip[1] * ratio];
            let dip = [(pip[0] + tip[0]) / 2.0, (pip[1] + tip[1]) / 2.0];
            let [mcp_idx, pip_idx, dip_idx, tip_idx] = finger_landmarks(finger);
            put(mcp_idx, mcp);
            put(pip_idx, pip);
            put(dip_idx, dip);
            put(tip_idx, tip);
        }

        if let Some(distance) = self.pinch {
            let index_tip = landmarks.get(LandmarkIdx::IndexFingerTip);
            landmarks.set(
                LandmarkIdx::ThumbTip,
                Landmark::new([index_tip.x() - distance, index_tip.y(), 0.0]),
            );
        }

        if let Some(x) = self.index_tip_x {
            let dx = x - landmarks.get(LandmarkIdx::IndexFingerTip).x();
            for idx in LandmarkIdx::ALL {
                let [lx, ly, lz] = landmarks.get(idx).position();
                landmarks.set(idx, Landmark::new([lx + dx, ly, lz]));
            }
        }

        landmarks
    }

    pub fn hand(&self) -> Hand {
        Hand::new(self.landmarks(), self.handedness)
    }

    pub fn detected(&self) -> DetectedHand {
        self.hand().into()
    }
}

fn finger_slot(finger: Finger) -> usize {
    match finger {
        Finger::Index => 0,
        Finger::Middle => 1,
        Finger::Ring => 2,
        Finger::Pinky => 3,
    }
}

fn finger_landmarks(finger: Finger) -> [LandmarkIdx; 4] {
    use LandmarkIdx::*;
    match finger {
        Finger::Index => [IndexFingerMcp, IndexFingerPip, IndexFingerDip, IndexFingerTip],
        Finger::Middle => [MiddleFingerMcp, MiddleFingerPip, MiddleFingerDip, MiddleFingerTip],
        Finger::Ring => [RingFingerMcp, RingFingerPip, RingFingerDip, RingFingerTip],
        Finger::Pinky => [PinkyMcp, PinkyPip, PinkyDip, PinkyTip],
    }
}

/// A frame source that replays prerecorded detection results.
///
/// Pair it with [`Passthrough`] to feed recorded detections through a
/// [`Driver`][crate::driver::Driver].
#[derive(Debug, Clone, Default)]
pub struct Replay {
    frames: VecDeque<DetectionResult>,
}

impl Replay {
    pub fn new(frames: impl IntoIterator<Item = DetectionResult>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Number of frames left to replay.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for Replay {
    type Frame = DetectionResult;

    fn read(&mut self) -> anyhow::Result<Option<DetectionResult>> {
        Ok(self.frames.pop_front())
    }
}

/// A detector for [`Replay`] frames, which already contain their detections.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl LandmarkDetector<DetectionResult> for Passthrough {
    fn detect(&mut self, frame: &DetectionResult, _timestamp_ms: f64) -> DetectionResult {
        frame.clone()
    }
}

/// A frame produced by [`SimCamera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimFrame {
    pub index: u64,
    /// Capture time relative to the first frame.
    pub time: Duration,
}

/// A camera producing empty frames at a fixed nominal frame rate.
#[derive(Debug, Clone)]
pub struct SimCamera {
    options: FrameSourceOptions,
    next: u64,
    limit: Option<u64>,
}

impl SimCamera {
    pub fn new(options: FrameSourceOptions) -> Self {
        log::info!(
            "opened simulated camera ({} @ {} FPS)",
            options.get_resolution(),
            options.get_fps()
        );
        Self {
            options,
            next: 0,
            limit: None,
        }
    }

    /// Ends the stream after `frames` frames.
    pub fn with_frame_limit(self, frames: u64) -> Self {
        Self {
            limit: Some(frames),
            ..self
        }
    }

    pub fn options(&self) -> &FrameSourceOptions {
        &self.options
    }
}

impl FrameSource for SimCamera {
    type Frame = SimFrame;

    fn read(&mut self) -> anyhow::Result<Option<SimFrame>> {
        if self.limit.map_or(false, |limit| self.next >= limit) {
            return Ok(None);
        }
        let index = self.next;
        self.next += 1;
        let time = self.options.frame_interval() * u32::try_from(index)?;
        Ok(Some(SimFrame { index, time }))
    }
}

/// A scripted two-handed performance, acting as the landmark detector for [`SimCamera`] frames.
///
/// Over a repeating cycle, the left hand pinches open and closed, the right hand sweeps its index
/// finger across the frame and closes into a fist for a while, and both hands briefly leave the
/// frame at the end.
#[derive(Debug, Clone, Copy)]
pub struct Choreography {
    cycle: f32,
}

impl Default for Choreography {
    fn default() -> Self {
        Self { cycle: 8.0 }
    }
}

impl Choreography {
    const PINCH_PERIOD: f32 = 3.0;
    const SWEEP_PERIOD: f32 = 5.0;

    /// Returns the hands visible `time` seconds into the performance.
    pub fn hands_at(&self, time: f32) -> DetectionResult {
        let phase = time.rem_euclid(self.cycle) / self.cycle;
        if phase >= 0.875 {
            return DetectionResult::empty();
        }

        let pinch = 0.085 + 0.065 * (TAU * time / Self::PINCH_PERIOD).sin();
        let mut hands = vec![HandPose::open().at(0.25, 0.8).pinch(pinch).left().detected()];

        if phase < 0.75 {
            let x = 0.5 + 0.4 * (TAU * time / Self::SWEEP_PERIOD).sin();
            let pose = if (0.375..0.625).contains(&phase) {
                HandPose::fist()
            } else {
                HandPose::open()
            };
            hands.push(pose.index_tip_x(x).right().detected());
        }

        DetectionResult::new(hands)
    }
}

impl LandmarkDetector<SimFrame> for Choreography {
    fn detect(&mut self, frame: &SimFrame, _timestamp_ms: f64) -> DetectionResult {
        self.hands_at(frame.time.as_secs_f32())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::{control::mapping::pinch_distance, hand::gesture::GestureClassifier};

    use super::*;

    #[test]
    fn pose_geometry() {
        let hand = HandPose::open().at(0.4, 0.9).landmarks();
        let wrist = hand[LandmarkIdx::Wrist];
        assert_relative_eq!(wrist.x(), 0.4);
        assert_relative_eq!(wrist.y(), 0.9);
        // Fingers point up in the frame.
        assert!(hand[LandmarkIdx::MiddleFingerTip].y() < hand[LandmarkIdx::MiddleFingerPip].y());
    }

    #[test]
    fn pinch_and_shift() {
        let hand = HandPose::open().pinch(0.05).index_tip_x(0.9).landmarks();
        assert_relative_eq!(pinch_distance(&hand), 0.05, epsilon = 1e-5);
        assert_relative_eq!(hand[LandmarkIdx::IndexFingerTip].x(), 0.9, epsilon = 1e-5);
    }

    #[test]
    fn sim_camera_frame_times() {
        let mut camera = SimCamera::new(FrameSourceOptions::default().fps(10)).with_frame_limit(3);
        let frames = std::iter::from_fn(|| camera.read().unwrap()).collect::<Vec<_>>();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].time, Duration::from_millis(200));
    }

    #[test]
    fn choreography_cycle() {
        let show = Choreography::default();
        let classifier = GestureClassifier::default();

        let both = show.hands_at(1.0).validated();
        assert_eq!(both.len(), 2);
        assert!(!classifier.is_fist(&both[1].landmarks));

        let fist = show.hands_at(4.0).validated();
        assert_eq!(fist[1].handedness, Some(Handedness::Right));
        assert!(classifier.is_fist(&fist[1].landmarks));

        assert_eq!(show.hands_at(6.5).len(), 1);
        assert!(show.hands_at(7.5).is_empty());
        assert_eq!(show.hands_at(9.0).len(), 2);
    }

    #[test]
    fn replay_ends() {
        let mut replay = Replay::new([DetectionResult::empty()]);
        assert_eq!(replay.remaining(), 1);
        assert_eq!(replay.read().unwrap(), Some(DetectionResult::empty()));
        assert_eq!(replay.read().unwrap(), None);
    }
}
