//! Control channels and the published control state.
//!
//! Three continuous channels drive the visual: [`Channel::Zoom`], [`Channel::RotationSpeed`] and
//! [`Channel::Roughness`]. Each frame with at least one hand produces a *target* value per channel
//! (see [`mapping`]), which the persistent *smoothed* value then eases toward (see [`smoothing`]).

pub mod interaction;
pub mod mapping;
pub mod smoothing;

pub use interaction::Interaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Zoom,
    RotationSpeed,
    Roughness,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Self::Zoom, Self::RotationSpeed, Self::Roughness];
}

/// One value of type `T` per control [`Channel`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Channels<T> {
    pub zoom: T,
    pub rotation_speed: T,
    pub roughness: T,
}

impl<T> Channels<T> {
    pub const fn new(zoom: T, rotation_speed: T, roughness: T) -> Self {
        Self {
            zoom,
            rotation_speed,
            roughness,
        }
    }

    pub fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::Zoom => &self.zoom,
            Channel::RotationSpeed => &self.rotation_speed,
            Channel::Roughness => &self.roughness,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut T {
        match channel {
            Channel::Zoom => &mut self.zoom,
            Channel::RotationSpeed => &mut self.rotation_speed,
            Channel::Roughness => &mut self.roughness,
        }
    }

    pub fn set(&mut self, channel: Channel, value: T) {
        *self.get_mut(channel) = value;
    }

    pub fn map<U>(self, mut f: impl FnMut(Channel, T) -> U) -> Channels<U> {
        Channels {
            zoom: f(Channel::Zoom, self.zoom),
            rotation_speed: f(Channel::RotationSpeed, self.rotation_speed),
            roughness: f(Channel::Roughness, self.roughness),
        }
    }

    pub fn zip_with<U, V>(
        self,
        other: Channels<U>,
        mut f: impl FnMut(Channel, T, U) -> V,
    ) -> Channels<V> {
        Channels {
            zoom: f(Channel::Zoom, self.zoom, other.zoom),
            rotation_speed: f(
                Channel::RotationSpeed,
                self.rotation_speed,
                other.rotation_speed,
            ),
            roughness: f(Channel::Roughness, self.roughness, other.roughness),
        }
    }
}

/// The control values published to consumers once per processed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub zoom: f32,
    pub rotation_speed: f32,
    pub roughness: f32,
    pub is_interacting: bool,
}

impl ControlState {
    pub const ZOOM_RANGE: (f32, f32) = (0.5, 3.0);
    pub const ROTATION_SPEED_RANGE: (f32, f32) = (-2.0, 2.0);
    pub const ROUGHNESS_RANGE: (f32, f32) = (0.0, 1.0);

    /// Initial channel values, published until the first frame with a hand is processed.
    pub const DEFAULT_CHANNELS: Channels<f32> = Channels::new(1.0, 0.1, 0.5);

    /// Creates a control state, clamping every channel to its range.
    pub fn new(channels: Channels<f32>, interaction: Interaction) -> Self {
        let clamp = |v: f32, (min, max): (f32, f32)| v.clamp(min, max);
        Self {
            zoom: clamp(channels.zoom, Self::ZOOM_RANGE),
            rotation_speed: clamp(channels.rotation_speed, Self::ROTATION_SPEED_RANGE),
            roughness: clamp(channels.roughness, Self::ROUGHNESS_RANGE),
            is_interacting: interaction.is_active(),
        }
    }

    pub fn channels(&self) -> Channels<f32> {
        Channels::new(self.zoom, self.rotation_speed, self.roughness)
    }

    /// Returns whether every channel is within its documented range.
    pub fn is_within_bounds(&self) -> bool {
        let within = |v: f32, (min, max): (f32, f32)| (min..=max).contains(&v);
        within(self.zoom, Self::ZOOM_RANGE)
            && within(self.rotation_speed, Self::ROTATION_SPEED_RANGE)
            && within(self.roughness, Self::ROUGHNESS_RANGE)
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHANNELS, Interaction::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state() {
        let state = ControlState::default();
        assert_eq!(state.zoom, 1.0);
        assert_eq!(state.rotation_speed, 0.1);
        assert_eq!(state.roughness, 0.5);
        assert!(!state.is_interacting);
        assert!(state.is_within_bounds());
    }

    #[test]
    fn bounds() {
        let mut state = ControlState::default();
        state.zoom = 3.01;
        assert!(!state.is_within_bounds());
        state.zoom = 3.0;
        state.rotation_speed = -2.0;
        state.roughness = 0.0;
        assert!(state.is_within_bounds());
        state.roughness = -0.01;
        assert!(!state.is_within_bounds());
    }

    #[test]
    fn new_clamps_channels() {
        let state = ControlState::new(Channels::new(3.01, -2.5, 1.5), Interaction::Active);
        assert_eq!(state.channels(), Channels::new(3.0, -2.0, 1.0));
        assert!(state.is_interacting);
    }

    #[test]
    fn channel_access() {
        let mut channels = Channels::new(1, 2, 3);
        for channel in Channel::ALL {
            channels.set(channel, *channels.get(channel) * 10);
        }
        assert_eq!(channels, Channels::new(10, 20, 30));

        let sums = channels.zip_with(Channels::new(1, 1, 1), |_, a, b| a + b);
        assert_eq!(sums, Channels::new(11, 21, 31));

        let names = channels.map(|channel, _| channel);
        assert_eq!(*names.get(Channel::Roughness), Channel::Roughness);
    }
}
