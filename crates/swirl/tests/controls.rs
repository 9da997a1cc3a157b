use approx::assert_relative_eq;
use swirl::{
    control::{mapping::ChannelMapper, ControlState},
    detection::DetectionResult,
    driver::{Driver, Status},
    hand::{gesture::Finger, DetectedHand, Handedness},
    landmark::Landmark,
    pipeline::Pipeline,
    sim::{HandPose, Passthrough, Replay},
};

fn frame(poses: &[HandPose]) -> DetectionResult {
    poses.iter().map(HandPose::detected).collect()
}

/// Wiggles every landmark by up to `amount` in x and y.
fn jitter(hand: DetectedHand, amount: f32) -> DetectedHand {
    let landmarks = hand
        .landmarks
        .iter()
        .map(|lm| {
            let [x, y, z] = lm.position();
            let dx = (fastrand::f32() * 2.0 - 1.0) * amount;
            let dy = (fastrand::f32() * 2.0 - 1.0) * amount;
            Landmark::new([x + dx, y + dy, z])
        })
        .collect();
    DetectedHand::new(landmarks, hand.handedness)
}

fn random_pose() -> HandPose {
    let mut pose = if fastrand::bool() {
        HandPose::fist()
    } else {
        HandPose::open()
    };
    pose = pose
        .at(fastrand::f32(), fastrand::f32())
        .pinch(fastrand::f32() * 0.4);
    if fastrand::bool() {
        pose = pose.index_tip_x(fastrand::f32() * 1.6 - 0.3);
    }
    match fastrand::u8(0..3) {
        0 => pose.left(),
        1 => pose.right(),
        _ => pose.unlabeled(),
    }
}

#[test]
fn controls_stay_in_bounds() {
    fastrand::seed(0x5317);
    let pipeline = Pipeline::default();

    let frames = (0..2000).map(|_| {
        (0..fastrand::usize(0..=2))
            .map(|_| jitter(random_pose().detected(), 0.05))
            .collect::<DetectionResult>()
    });

    for controls in pipeline.run(pipeline.initial_state(), frames) {
        assert!(controls.is_within_bounds(), "{controls:?}");
    }
}

#[test]
fn pinch_window_mapping() {
    let mapper = ChannelMapper::default();
    assert_relative_eq!(mapper.zoom_for_pinch(0.02), 0.5, epsilon = 1e-6);
    assert_relative_eq!(mapper.zoom_for_pinch(0.15), 3.0, epsilon = 1e-6);
    let exact = 0.5 + (0.08 - 0.02) / 0.13 * 2.5;
    assert_relative_eq!(mapper.zoom_for_pinch(0.08), exact, epsilon = 1e-6);
    assert_eq!(mapper.zoom_for_pinch(0.30), 3.0);
    assert_eq!(mapper.zoom_for_pinch(0.0), 0.5);
}

#[test]
fn zoom_converges_geometrically() {
    let pipeline = Pipeline::default();
    let pinch = frame(&[HandPose::open().pinch(0.15).left()]);

    let mut state = pipeline.initial_state();
    let mut last_error = f32::INFINITY;
    for n in 1..=40 {
        state = pipeline.step(state, &pinch);
        let error = 3.0 - state.smoothed().zoom;
        assert_relative_eq!(error, 0.9f32.powi(n) * 2.0, epsilon = 1e-4);
        assert!(error > 0.0 && error < last_error);
        last_error = error;
    }
}

#[test]
fn rotation_follows_right_index() {
    let pipeline = Pipeline::default();
    let mut state = pipeline.initial_state();
    for x in [0.0, 0.5, 1.0] {
        state = pipeline.step(state, &frame(&[HandPose::open().index_tip_x(x).right()]));
        assert_relative_eq!(state.targets().rotation_speed, (x - 0.5) * 4.0, epsilon = 1e-5);
    }
}

#[test]
fn fist_needs_three_folded_fingers() {
    let pipeline = Pipeline::default();
    let three = HandPose::open()
        .tip_ratio(Finger::Index, 0.5)
        .tip_ratio(Finger::Middle, 0.5)
        .tip_ratio(Finger::Ring, 0.5);
    let two = HandPose::open()
        .tip_ratio(Finger::Index, 0.5)
        .tip_ratio(Finger::Middle, 0.5);

    let state = pipeline.step(pipeline.initial_state(), &frame(&[three.right()]));
    assert_eq!(state.targets().roughness, 0.9);
    let state = pipeline.step(pipeline.initial_state(), &frame(&[two.right()]));
    assert_eq!(state.targets().roughness, 0.1);
}

#[test]
fn empty_frames_freeze_values() {
    let pipeline = Pipeline::default();
    let frames = [
        frame(&[HandPose::fist().pinch(0.03).left()]),
        frame(&[HandPose::open().index_tip_x(0.9).right()]),
        DetectionResult::empty(),
        DetectionResult::empty(),
    ];
    let states: Vec<ControlState> = pipeline.run(pipeline.initial_state(), &frames).collect();

    assert!(states[1].is_interacting);
    for state in &states[2..] {
        assert!(!state.is_interacting);
        assert_eq!(state.channels(), states[1].channels());
    }
}

#[test]
fn interaction_flickers_without_debounce() {
    let pipeline = Pipeline::default();
    let hand = frame(&[HandPose::open().right()]);
    let frames = [hand.clone(), DetectionResult::empty(), hand];
    let flags: Vec<bool> = pipeline
        .run(pipeline.initial_state(), &frames)
        .map(|s| s.is_interacting)
        .collect();
    assert_eq!(flags, [true, false, true]);
}

#[test]
fn one_fist_of_two_hands_sets_roughness() {
    let pipeline = Pipeline::default();
    for hands in [
        [HandPose::fist().left(), HandPose::open().right()],
        [HandPose::open().right(), HandPose::fist().left()],
    ] {
        let state = pipeline.step(pipeline.initial_state(), &frame(&hands));
        assert_eq!(state.targets().roughness, 0.9);
    }
}

#[test]
fn driver_replays_detections() {
    let frames = vec![
        frame(&[HandPose::fist().pinch(0.15).left()]),
        DetectionResult::new(vec![DetectedHand::new(
            vec![Landmark::default(); 4],
            Some(Handedness::Right),
        )]),
        frame(&[HandPose::open().right()]),
    ];
    let expected: Vec<_> = {
        let pipeline = Pipeline::default();
        pipeline.run(pipeline.initial_state(), &frames).collect()
    };

    let mut driver = Driver::new(Pipeline::default(), Replay::new(frames), Passthrough);
    assert_eq!(driver.status(), Status::Ready);
    let mut published = Vec::new();
    driver.run(std::time::Duration::ZERO, |update| published.push(update.controls));

    assert_eq!(published, expected);
    assert_eq!(driver.controls(), expected[2]);
}
