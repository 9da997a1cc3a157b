//! Video frame sources.
//!
//! Frame acquisition is done by the host application. This module only defines the interface the
//! [`Driver`][crate::driver::Driver] pulls frames through, and the format the pipeline expects.

use std::{fmt, time::Duration};

/// Resolution (`width x height`) of a video frame or drawing surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// VGA resolution: `640x480`
    pub const VGA: Self = Self {
        width: 640,
        height: 480,
    };

    /// Creates a new [`Resolution`] of `width x height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Converts normalized frame coordinates to pixel coordinates.
    pub fn to_pixels(&self, x: f32, y: f32) -> [f32; 2] {
        [x * self.width as f32, y * self.height as f32]
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Capture format requested from a [`FrameSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSourceOptions {
    resolution: Resolution,
    fps: u32,
}

impl Default for FrameSourceOptions {
    fn default() -> Self {
        Self {
            resolution: Resolution::VGA,
            fps: 30,
        }
    }
}

impl FrameSourceOptions {
    /// Sets the desired frame resolution.
    #[inline]
    pub fn resolution(self, resolution: Resolution) -> Self {
        Self { resolution, ..self }
    }

    /// Sets the desired frame rate.
    ///
    /// # Panics
    ///
    /// Panics if `fps` is 0.
    #[inline]
    pub fn fps(self, fps: u32) -> Self {
        assert!(fps > 0, "frame rate must be positive");
        Self { fps, ..self }
    }

    #[inline]
    pub fn get_resolution(&self) -> Resolution {
        self.resolution
    }

    #[inline]
    pub fn get_fps(&self) -> u32 {
        self.fps
    }

    /// The nominal time between two frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }
}

/// A source of video frames, such as a camera.
pub trait FrameSource {
    type Frame;

    /// Returns whether a new frame can be read without waiting.
    ///
    /// Cooperative hosts check this once per iteration and skip the iteration if no frame is ready.
    fn is_ready(&self) -> bool {
        true
    }

    /// Reads the next frame, blocking until one is available.
    ///
    /// Returns `Ok(None)` once the source has no more frames.
    fn read(&mut self) -> anyhow::Result<Option<Self::Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    type Frame = S::Frame;

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn read(&mut self) -> anyhow::Result<Option<Self::Frame>> {
        (**self).read()
    }
}
