//! Drives the [`Pipeline`] from a frame source and a landmark detector.
//!
//! The [`Driver`] is meant to be called once per rendered frame by the host ([`Driver::tick`]), or
//! to run its own paced loop ([`Driver::run`]). Each iteration reads a frame, runs the detector,
//! folds the result into the pipeline state and publishes the new [`ControlState`]. Iterations
//! never overlap, so the pipeline state is only ever accessed from the driving thread.

use std::{
    io, mem,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use crossbeam::channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::{
    control::ControlState,
    detection::{DetectionResult, LandmarkDetector},
    pipeline::{Pipeline, PipelineState},
    timer::{FpsCounter, Timer},
    video::FrameSource,
};

/// Lower bound on how long [`Driver::run`] waits per iteration while the detector is loading.
const MIN_LOADING_WAIT: Duration = Duration::from_millis(10);

/// A shared flag that cancels all further iterations once set.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that processing stops.
    ///
    /// After this returns, no further frames are read, no further detector calls are made and the
    /// published control state no longer changes. An iteration that is already running on another
    /// thread is allowed to finish.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Pulls frames from a [`FrameSource`] and yields the [`DetectionResult`] for each of them.
///
/// Detector timestamps are the milliseconds elapsed since the iterator was created and never
/// decrease. The iterator ends when the source ends or fails, or when its [`StopHandle`] fires.
pub struct Detections<S, D> {
    source: S,
    detector: D,
    stop: StopHandle,
    start: Instant,
    last_timestamp_ms: f64,
    ended: bool,
    t_detect: Timer,
}

impl<S, D> Detections<S, D>
where
    S: FrameSource,
    D: LandmarkDetector<S::Frame>,
{
    pub fn new(source: S, detector: D) -> Self {
        Self {
            source,
            detector,
            stop: StopHandle::new(),
            start: Instant::now(),
            last_timestamp_ms: 0.0,
            ended: false,
            t_detect: Timer::new("detect"),
        }
    }

    /// Makes this iterator end once `stop` fires.
    pub fn with_stop_handle(self, stop: StopHandle) -> Self {
        Self { stop, ..self }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns whether the frame source has ended (or failed).
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn timer(&self) -> &Timer {
        &self.t_detect
    }

    fn timestamp_ms(&mut self) -> f64 {
        let now = self.start.elapsed().as_secs_f64() * 1000.0;
        self.last_timestamp_ms = now.max(self.last_timestamp_ms);
        self.last_timestamp_ms
    }
}

impl<S, D> Iterator for Detections<S, D>
where
    S: FrameSource,
    D: LandmarkDetector<S::Frame>,
{
    type Item = DetectionResult;

    fn next(&mut self) -> Option<DetectionResult> {
        if self.ended || self.stop.is_stopped() {
            return None;
        }

        let frame = match self.source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("frame source ended");
                self.ended = true;
                return None;
            }
            Err(e) => {
                log::error!("failed to read frame: {e:#}");
                self.ended = true;
                return None;
            }
        };

        let timestamp_ms = self.timestamp_ms();
        let detector = &mut self.detector;
        Some(self.t_detect.time(|| detector.detect(&frame, timestamp_ms)))
    }
}

/// Readiness of a [`Driver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The landmark detector is still being initialized.
    Loading,
    /// Frames are being processed.
    Ready,
    /// The landmark detector failed to initialize. The driver will never become ready.
    Disabled,
}

/// The result of one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// The newly published control state.
    pub controls: ControlState,
    /// The raw detections of the frame, for debug visualization.
    pub detection: DetectionResult,
}

enum Stage<S, D> {
    Loading {
        source: S,
        init: Receiver<anyhow::Result<D>>,
    },
    Ready(Detections<S, D>),
    Disabled,
}

/// Owns the pipeline state and runs one pipeline iteration per frame.
pub struct Driver<S, D> {
    stage: Stage<S, D>,
    pipeline: Pipeline,
    state: PipelineState,
    stop: StopHandle,
    t_process: Timer,
}

impl<S, D> Driver<S, D>
where
    S: FrameSource,
    D: LandmarkDetector<S::Frame>,
{
    /// Creates a driver using an already initialized detector.
    pub fn new(pipeline: Pipeline, source: S, detector: D) -> Self {
        let stop = StopHandle::new();
        let detections = Detections::new(source, detector).with_stop_handle(stop.clone());
        Self::with_stage(pipeline, Stage::Ready(detections), stop)
    }

    /// Creates a driver that initializes its detector in the background by calling `loader`.
    ///
    /// The driver reports [`Status::Loading`] and publishes the pipeline's initial control state
    /// until `loader` finishes. If `loader` fails or panics, the failure is logged and the driver
    /// is permanently [`Status::Disabled`]; initialization is not retried.
    ///
    /// Returns an error if the initialization thread could not be spawned.
    pub fn spawn<L>(pipeline: Pipeline, source: S, loader: L) -> io::Result<Self>
    where
        L: FnOnce() -> anyhow::Result<D> + Send + 'static,
        D: Send + 'static,
    {
        // A capacity of 1 means that the loader thread never blocks on sending its result.
        let (sender, init) = crossbeam::channel::bounded(1);
        thread::Builder::new()
            .name("detector init".into())
            .spawn(move || {
                log::debug!("initializing landmark detector");
                // Ignore errors, the driver was dropped before initialization finished.
                sender.send(loader()).ok();
            })?;

        let stop = StopHandle::new();
        Ok(Self::with_stage(
            pipeline,
            Stage::Loading { source, init },
            stop,
        ))
    }

    fn with_stage(pipeline: Pipeline, stage: Stage<S, D>, stop: StopHandle) -> Self {
        Self {
            stage,
            pipeline,
            state: pipeline.initial_state(),
            stop,
            t_process: Timer::new("process"),
        }
    }

    pub fn status(&self) -> Status {
        match self.stage {
            Stage::Loading { .. } => Status::Loading,
            Stage::Ready(_) => Status::Ready,
            Stage::Disabled => Status::Disabled,
        }
    }

    /// Returns a handle that cancels this driver.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// The most recently published control state.
    pub fn controls(&self) -> ControlState {
        self.state.controls()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Returns whether no further updates will ever be produced.
    pub fn is_finished(&self) -> bool {
        self.stop.is_stopped()
            || match &self.stage {
                Stage::Loading { .. } => false,
                Stage::Ready(detections) => detections.is_ended(),
                Stage::Disabled => true,
            }
    }

    /// Resets the pipeline state to its initial values.
    pub fn restart(&mut self) {
        log::debug!("resetting pipeline state");
        self.state = self.pipeline.initial_state();
    }

    /// Returns profiling timers for the detector and pipeline.
    pub fn timers(&self) -> Vec<&Timer> {
        let mut timers = Vec::with_capacity(2);
        if let Stage::Ready(detections) = &self.stage {
            timers.push(detections.timer());
        }
        timers.push(&self.t_process);
        timers
    }

    /// Blocks until detector initialization has finished, returning the resulting status.
    pub fn block_until_initialized(&mut self) -> Status {
        if let Stage::Loading { init, .. } = &self.stage {
            let result = init
                .recv()
                .unwrap_or_else(|_| Err(anyhow!("detector initialization panicked")));
            self.finish_init(result);
        }
        self.status()
    }

    /// Waits up to `timeout` for detector initialization to finish, returning the resulting
    /// status.
    pub fn wait_for_init(&mut self, timeout: Duration) -> Status {
        if let Stage::Loading { init, .. } = &self.stage {
            let result = match init.recv_timeout(timeout) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => return Status::Loading,
                Err(RecvTimeoutError::Disconnected) => {
                    Err(anyhow!("detector initialization panicked"))
                }
            };
            self.finish_init(result);
        }
        self.status()
    }

    fn poll_init(&mut self) {
        let Stage::Loading { init, .. } = &self.stage else {
            return;
        };
        let result = match init.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(anyhow!("detector initialization panicked")),
        };
        self.finish_init(result);
    }

    fn finish_init(&mut self, result: anyhow::Result<D>) {
        let Stage::Loading { source, .. } = mem::replace(&mut self.stage, Stage::Disabled) else {
            return;
        };
        match result {
            Ok(detector) => {
                log::info!("landmark detector ready");
                let detections =
                    Detections::new(source, detector).with_stop_handle(self.stop.clone());
                self.stage = Stage::Ready(detections);
            }
            Err(e) => {
                log::error!("landmark detector initialization failed, disabling hand tracking: {e:#}");
            }
        }
    }

    /// Runs one pipeline iteration.
    ///
    /// Returns [`None`] without touching the pipeline state if the driver is stopped, not ready,
    /// or the source has no new frame.
    pub fn tick(&mut self) -> Option<Update> {
        if self.stop.is_stopped() {
            return None;
        }
        self.poll_init();

        let Stage::Ready(detections) = &mut self.stage else {
            return None;
        };
        if !detections.source().is_ready() {
            return None;
        }
        let detection = detections.next()?;

        let (pipeline, state) = (&self.pipeline, self.state);
        self.state = self.t_process.time(|| pipeline.step(state, &detection));

        Some(Update {
            controls: self.state.controls(),
            detection,
        })
    }

    /// Calls [`Driver::tick`] once every `interval` until the driver is finished or stopped,
    /// passing every update to `on_update`.
    ///
    /// While the detector is loading, the loop waits on its initialization instead.
    pub fn run(&mut self, interval: Duration, mut on_update: impl FnMut(&Update)) {
        let mut fps = FpsCounter::new("pipeline");
        while !self.is_finished() {
            if self.wait_for_init(interval.max(MIN_LOADING_WAIT)) == Status::Loading {
                continue;
            }
            let start = Instant::now();
            if let Some(update) = self.tick() {
                on_update(&update);
                fps.tick_with(&self.timers());
            }
            if let Some(remaining) = interval.checked_sub(start.elapsed()) {
                thread::sleep(remaining);
            }
        }
    }
}

impl<S, D> Drop for Driver<S, D> {
    fn drop(&mut self) {
        self.stop.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use anyhow::bail;

    use crate::sim::{HandPose, Passthrough, Replay};

    use super::*;

    fn frames(n: usize) -> Vec<DetectionResult> {
        (0..n)
            .map(|_| DetectionResult::from(vec![HandPose::fist().pinch(0.15).left().hand()]))
            .collect()
    }

    #[test]
    fn ticks_until_source_ends() {
        let mut driver = Driver::new(Pipeline::default(), Replay::new(frames(3)), Passthrough);
        assert_eq!(driver.status(), Status::Ready);
        for _ in 0..3 {
            let update = driver.tick().unwrap();
            assert!(update.controls.is_interacting);
            assert_eq!(update.controls, driver.controls());
        }
        assert!(driver.tick().is_none());
        assert!(driver.is_finished());
    }

    #[test]
    fn stop_prevents_further_detection() {
        struct Counting(mpsc::Sender<()>);

        impl LandmarkDetector<DetectionResult> for Counting {
            fn detect(&mut self, frame: &DetectionResult, _: f64) -> DetectionResult {
                self.0.send(()).unwrap();
                frame.clone()
            }
        }

        let (sender, calls) = mpsc::channel();
        let mut driver = Driver::new(
            Pipeline::default(),
            Replay::new(frames(5)),
            Counting(sender),
        );
        driver.tick().unwrap();
        let published = driver.controls();

        driver.stop_handle().stop();
        assert!(driver.tick().is_none());
        assert!(driver.is_finished());
        assert_eq!(driver.controls(), published);
        assert_eq!(calls.try_iter().count(), 1);
    }

    #[test]
    fn failed_initialization_disables_driver() {
        let mut driver = Driver::<_, Passthrough>::spawn(
            Pipeline::default(),
            Replay::new(frames(3)),
            || bail!("model failed to load"),
        )
        .unwrap();
        assert_eq!(driver.block_until_initialized(), Status::Disabled);
        assert!(driver.tick().is_none());
        assert!(driver.is_finished());
        assert_eq!(driver.controls(), ControlState::default());
    }

    #[test]
    fn panicking_loader_disables_driver() {
        let mut driver = Driver::<_, Passthrough>::spawn(
            Pipeline::default(),
            Replay::new(frames(1)),
            || panic!("loader panic"),
        )
        .unwrap();
        assert_eq!(driver.block_until_initialized(), Status::Disabled);
    }

    #[test]
    fn background_initialization() {
        let mut driver =
            Driver::spawn(Pipeline::default(), Replay::new(frames(2)), || Ok(Passthrough))
                .unwrap();
        assert_eq!(driver.block_until_initialized(), Status::Ready);
        assert!(driver.tick().is_some());
    }

    #[test]
    fn dropping_driver_stops_shared_handle() {
        let driver = Driver::new(Pipeline::default(), Replay::new(frames(3)), Passthrough);
        let handle = driver.stop_handle();
        assert!(!handle.is_stopped());
        drop(driver);
        assert!(handle.is_stopped());

        let mut detections =
            Detections::new(Replay::new(frames(3)), Passthrough).with_stop_handle(handle);
        assert_eq!(detections.next(), None);
        assert_eq!(detections.source().remaining(), 3);
    }

    #[test]
    fn wait_for_init_blocks_until_timeout() {
        let (release, gate) = mpsc::channel::<()>();
        let mut driver = Driver::spawn(Pipeline::default(), Replay::new(frames(1)), move || {
            gate.recv().ok();
            Ok(Passthrough)
        })
        .unwrap();

        let start = Instant::now();
        assert_eq!(driver.wait_for_init(Duration::from_millis(20)), Status::Loading);
        assert!(start.elapsed() >= Duration::from_millis(20));

        release.send(()).unwrap();
        assert_eq!(driver.wait_for_init(Duration::from_secs(10)), Status::Ready);
    }

    #[test]
    fn run_waits_for_slow_loader() {
        let mut driver = Driver::spawn(Pipeline::default(), Replay::new(frames(3)), || {
            thread::sleep(Duration::from_millis(50));
            Ok(Passthrough)
        })
        .unwrap();
        let mut updates = 0;
        driver.run(Duration::ZERO, |_| updates += 1);
        assert_eq!(updates, 3);
        assert_eq!(driver.status(), Status::Ready);
    }

    #[test]
    fn unready_source_skips_iteration() {
        struct Unready;

        impl FrameSource for Unready {
            type Frame = DetectionResult;

            fn is_ready(&self) -> bool {
                false
            }

            fn read(&mut self) -> anyhow::Result<Option<DetectionResult>> {
                unreachable!("frame read while not ready")
            }
        }

        let mut driver = Driver::new(Pipeline::default(), Unready, Passthrough);
        assert!(driver.tick().is_none());
        assert!(!driver.is_finished());
    }

    #[test]
    fn restart_resets_state() {
        let mut driver = Driver::new(Pipeline::default(), Replay::new(frames(2)), Passthrough);
        driver.tick().unwrap();
        assert_ne!(driver.controls(), ControlState::default());
        driver.restart();
        assert_eq!(driver.controls(), ControlState::default());
    }

    #[test]
    fn run_publishes_every_frame() {
        let mut driver = Driver::new(Pipeline::default(), Replay::new(frames(4)), Passthrough);
        let mut updates = Vec::new();
        driver.run(Duration::ZERO, |update| updates.push(update.controls));
        assert_eq!(updates.len(), 4);
        assert!(updates.windows(2).all(|w| w[1].zoom > w[0].zoom));
    }

    #[test]
    fn detections_timestamps_never_decrease() {
        struct Stamps(Vec<f64>);

        impl LandmarkDetector<DetectionResult> for Stamps {
            fn detect(&mut self, frame: &DetectionResult, timestamp_ms: f64) -> DetectionResult {
                self.0.push(timestamp_ms);
                frame.clone()
            }
        }

        let mut detections = Detections::new(Replay::new(frames(10)), Stamps(Vec::new()));
        assert_eq!(detections.by_ref().count(), 10);
        assert!(detections.is_ended());
        assert!(detections
            .detector
            .0
            .windows(2)
            .all(|w| w[1] >= w[0]));
    }
}
