// Static wheel -> channel -> pin layout

use std::fmt;

use super::mixer::Wheel;
use crate::config::PWM_PINS;

/// Number of PWM channels driven (two per wheel)
pub const CHANNEL_COUNT: usize = 8;

/// Hardware PWM channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PwmChannel(pub u8);

impl PwmChannel {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PwmChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Forward and reverse channels of one wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPair {
    pub forward: PwmChannel,
    pub reverse: PwmChannel,
}

/// Wheel i drives channels 2i (forward) and 2i+1 (reverse);
/// each channel is attached to one output pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAssignment {
    pins: [u8; CHANNEL_COUNT],
}

impl Default for ChannelAssignment {
    fn default() -> Self {
        Self::with_pins(PWM_PINS)
    }
}

impl ChannelAssignment {
    pub fn with_pins(pins: [u8; CHANNEL_COUNT]) -> Self {
        Self { pins }
    }

    pub fn pair(&self, wheel: Wheel) -> ChannelPair {
        let base = (wheel.index() * 2) as u8;
        ChannelPair {
            forward: PwmChannel(base),
            reverse: PwmChannel(base + 1),
        }
    }

    /// Output pin of a channel, `None` past the last channel
    pub fn pin(&self, channel: PwmChannel) -> Option<u8> {
        self.pins.get(channel.index()).copied()
    }

    /// All channels with their pins, in channel order
    pub fn channels(&self) -> impl Iterator<Item = (PwmChannel, u8)> + '_ {
        self.pins
            .iter()
            .enumerate()
            .map(|(i, &pin)| (PwmChannel(i as u8), pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_follow_wheel_order() {
        let layout = ChannelAssignment::default();
        let pair = layout.pair(Wheel::FrontRight);
        assert_eq!((pair.forward, pair.reverse), (PwmChannel(0), PwmChannel(1)));
        let pair = layout.pair(Wheel::RearRight);
        assert_eq!((pair.forward, pair.reverse), (PwmChannel(6), PwmChannel(7)));
    }

    #[test]
    fn test_every_channel_used_once() {
        let layout = ChannelAssignment::default();
        let mut used: Vec<PwmChannel> = Wheel::ALL
            .iter()
            .flat_map(|&w| {
                let p = layout.pair(w);
                [p.forward, p.reverse]
            })
            .collect();
        used.sort();
        let all: Vec<PwmChannel> = layout.channels().map(|(ch, _)| ch).collect();
        assert_eq!(used, all);
    }

    #[test]
    fn test_default_pins() {
        let layout = ChannelAssignment::default();
        assert_eq!(layout.pin(PwmChannel(0)), Some(14));
        assert_eq!(layout.pin(PwmChannel(3)), Some(13));
        assert_eq!(layout.pin(PwmChannel(7)), Some(33));
        assert_eq!(layout.channels().count(), CHANNEL_COUNT);
    }

    #[test]
    fn test_pin_past_last_channel() {
        let layout = ChannelAssignment::default();
        assert_eq!(layout.pin(PwmChannel(8)), None);
        assert_eq!(layout.pin(PwmChannel(u8::MAX)), None);
    }
}
