//! Per-frame profiling.

use std::{
    fmt,
    sync::Mutex,
    time::{Duration, Instant},
};

use swirl_utils::filter::{Ema, EmaState, Filter};

const EMA_ALPHA: f32 = 0.3;

/// Measures how long an operation takes, averaged over the calls since it was last displayed.
///
/// Displaying the timer with `{}` prints `name: <calls>x<average>ms` and starts a new averaging
/// window.
pub struct Timer {
    name: &'static str,
    ema: Ema,
    window: Mutex<Window>,
}

#[derive(Default)]
struct Window {
    ema_state: EmaState,
    calls: usize,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ema: Ema::new(EMA_ALPHA),
            window: Mutex::new(Window::default()),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invokes a closure, measuring and recording the time it takes.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.record(start.elapsed());
        result
    }

    /// Records an externally measured duration.
    pub fn record(&self, duration: Duration) {
        let mut window = self.lock();
        let Window { ema_state, calls } = &mut *window;
        self.ema.filter(ema_state, duration.as_secs_f32());
        *calls += 1;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Window> {
        // A poisoned window only holds statistics, keep using it.
        self.window.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let window = std::mem::take(&mut *self.lock());
        let avg_ms = window.ema_state.last().unwrap_or(0.0) * 1000.0;
        write!(f, "{}: {}x{:.01}ms", self.name, window.calls, avg_ms)
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer").field("name", &self.name).finish()
    }
}

/// Logs the number of processed frames once per second.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Counts a frame, logging the frame rate if a second has passed.
    pub fn tick(&mut self) {
        self.tick_with(&[]);
    }

    /// Counts a frame, logging the frame rate and `timers` if a second has passed.
    pub fn tick_with(&mut self, timers: &[&Timer]) {
        self.frames += 1;
        if self.start.elapsed() < Duration::from_secs(1) {
            return;
        }

        let timers = timers
            .iter()
            .map(|timer| timer.to_string())
            .collect::<Vec<_>>();
        if timers.is_empty() {
            log::debug!("{}: {} FPS", self.name, self.frames);
        } else {
            log::debug!("{}: {} FPS ({})", self.name, self.frames, timers.join(", "));
        }

        self.frames = 0;
        self.start = Instant::now();
    }
}
