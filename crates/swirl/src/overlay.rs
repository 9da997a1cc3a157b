//! Debug visualization of detected hand skeletons.

use std::fmt::{self, Write as _};

use crate::{
    detection::DetectionResult,
    landmark::{HandLandmarks, Landmark, CONNECTIVITY},
    video::Resolution,
};

/// An 8-bit sRGB color.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Color([u8; 3]);

impl Color {
    pub const BLACK: Self = Self([0, 0, 0]);
    pub const WHITE: Self = Self([255, 255, 255]);
    /// The pale blue used for landmark markers.
    pub const PALE_BLUE: Self = Self([0xA0, 0xC4, 0xFF]);

    #[inline]
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r(), self.g(), self.b())
    }
}

/// A 2D drawing surface using pixel coordinates.
pub trait Canvas {
    /// Erases everything drawn so far.
    fn clear(&mut self);

    fn line(&mut self, from: [f32; 2], to: [f32; 2], color: Color, width: f32);

    /// Draws a filled circle centered at `at`.
    fn marker(&mut self, at: [f32; 2], color: Color, radius: f32);
}

/// Draws the landmark skeleton of every detected hand.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonOverlay {
    resolution: Resolution,
    bone_color: Color,
    bone_width: f32,
    joint_color: Color,
    joint_radius: f32,
}

impl SkeletonOverlay {
    /// Creates an overlay for a surface matching the video frame resolution.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            bone_color: Color::WHITE,
            bone_width: 2.0,
            joint_color: Color::PALE_BLUE,
            joint_radius: 3.0,
        }
    }

    pub fn with_bones(self, color: Color, width: f32) -> Self {
        Self {
            bone_color: color,
            bone_width: width,
            ..self
        }
    }

    pub fn with_joints(self, color: Color, radius: f32) -> Self {
        Self {
            joint_color: color,
            joint_radius: radius,
            ..self
        }
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Clears `canvas` and draws the hands in `detection` onto it.
    ///
    /// Malformed hands are skipped, exactly like the pipeline skips them.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, detection: &DetectionResult) {
        canvas.clear();
        for hand in detection.iter().filter_map(|hand| hand.validate().ok()) {
            self.draw_hand(canvas, &hand.landmarks);
        }
    }

    fn draw_hand<C: Canvas + ?Sized>(&self, canvas: &mut C, landmarks: &HandLandmarks) {
        let px = |lm: Landmark| self.resolution.to_pixels(lm.x(), lm.y());
        for &(a, b) in CONNECTIVITY {
            canvas.line(
                px(landmarks[a]),
                px(landmarks[b]),
                self.bone_color,
                self.bone_width,
            );
        }
        for lm in landmarks.iter() {
            canvas.marker(px(lm), self.joint_color, self.joint_radius);
        }
    }
}

/// A [`Canvas`] that records its contents as an SVG document.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    resolution: Resolution,
    body: String,
}

impl SvgCanvas {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            body: String::new(),
        }
    }

    /// Returns whether nothing has been drawn since the last clear.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Renders the complete SVG document.
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.resolution.width(), self.resolution.height());
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
            self.body
        )
    }
}

impl Canvas for SvgCanvas {
    fn clear(&mut self) {
        self.body.clear();
    }

    fn line(&mut self, [x1, y1]: [f32; 2], [x2, y2]: [f32; 2], color: Color, width: f32) {
        // Writing to a `String` cannot fail.
        writeln!(
            self.body,
            "  <line x1=\"{x1:.1}\" y1=\"{y1:.1}\" x2=\"{x2:.1}\" y2=\"{y2:.1}\" stroke=\"{color:?}\" stroke-width=\"{width}\"/>"
        )
        .ok();
    }

    fn marker(&mut self, [cx, cy]: [f32; 2], color: Color, radius: f32) {
        writeln!(
            self.body,
            "  <circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"{radius}\" fill=\"{color:?}\"/>"
        )
        .ok();
    }
}
