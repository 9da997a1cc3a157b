//! Hand-gesture control for a generative swirl visual.
//!
//! A camera frame is handed to an external hand landmark detector, which reports up to two hands
//! with 21 landmarks each. This crate turns those detections into a small set of continuously
//! smoothed control values:
//!
//! - the **left** hand's thumb-to-index pinch sets the zoom,
//! - the **right** hand's index fingertip position sets the rotation speed,
//! - a fist on **either** hand raises the surface roughness.
//!
//! The resulting [`ControlState`] is published once per processed frame and read by the
//! renderer.
//!
//! # Coordinates
//!
//! Landmark `x` and `y` coordinates are normalized to the input frame, with `(0, 0)` in the top
//! left corner and Y pointing *down*. All gesture thresholds are distances in this normalized image
//! plane, so they depend on how large the hand appears in the frame.
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: overrides the log filter configured by [`init_logger!`].
//!
//! [`ControlState`]: control::ControlState

use log::LevelFilter;

pub mod control;
pub mod detection;
pub mod driver;
pub mod hand;
pub mod landmark;
pub mod overlay;
pub mod pipeline;
pub mod render;
pub mod sim;
pub mod timer;
pub mod video;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library will log at *debug* level, unless overridden via `RUST_LOG`.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
