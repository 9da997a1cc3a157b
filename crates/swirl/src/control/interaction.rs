//! Per-frame interaction state.

/// Whether the user is currently gesturing.
///
/// The state is derived from the current frame alone: any detected hand makes it
/// [`Interaction::Active`], a frame without hands makes it [`Interaction::Idle`]. There is no
/// debouncing, so a single missed detection is immediately visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Active,
}

impl Interaction {
    /// Returns the interaction state for a frame containing `hand_count` hands.
    pub fn observe(hand_count: usize) -> Self {
        if hand_count > 0 {
            Self::Active
        } else {
            Self::Idle
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}
