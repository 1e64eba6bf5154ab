// PWM channel backends
//
// The drivetrain only needs configure/attach/write. `SimulatedPwm` keeps an
// in-memory register file; `SerialBridge` (bridge.rs) forwards to hardware.

use tracing::debug;

use super::channels::{CHANNEL_COUNT, PwmChannel};

/// Error types for PWM backends
#[derive(Debug, thiserror::Error)]
pub enum PwmError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No such PWM channel: {channel}")]
    InvalidChannel { channel: PwmChannel },

    #[error("PWM channel {channel} written before configure/attach")]
    NotConfigured { channel: PwmChannel },

    #[error("Unsupported PWM resolution: {bits} bits")]
    InvalidResolution { bits: u8 },
}

pub type Result<T> = std::result::Result<T, PwmError>;

/// Timer-backed PWM outputs
pub trait PwmChannels {
    /// Set up a channel's timer
    fn configure(
        &mut self,
        channel: PwmChannel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<()>;

    /// Route a channel to an output pin
    fn attach(&mut self, channel: PwmChannel, pin: u8) -> Result<()>;

    /// Set a channel's duty
    fn write(&mut self, channel: PwmChannel, duty: u16) -> Result<()>;
}

impl<P: PwmChannels + ?Sized> PwmChannels for Box<P> {
    fn configure(
        &mut self,
        channel: PwmChannel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<()> {
        (**self).configure(channel, frequency_hz, resolution_bits)
    }

    fn attach(&mut self, channel: PwmChannel, pin: u8) -> Result<()> {
        (**self).attach(channel, pin)
    }

    fn write(&mut self, channel: PwmChannel, duty: u16) -> Result<()> {
        (**self).write(channel, duty)
    }
}

pub(crate) fn check_resolution(bits: u8) -> Result<()> {
    if (1..=16).contains(&bits) {
        Ok(())
    } else {
        Err(PwmError::InvalidResolution { bits })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    pub frequency_hz: u32,
    pub resolution_bits: u8,
    pub pin: Option<u8>,
    pub duty: u16,
}

/// In-memory PWM outputs, used when no hardware bridge is configured
#[derive(Debug, Default)]
pub struct SimulatedPwm {
    channels: [Option<ChannelState>; CHANNEL_COUNT],
    writes: usize,
}

impl SimulatedPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, channel: PwmChannel) -> Option<ChannelState> {
        self.channels.get(channel.index()).copied().flatten()
    }

    /// Current duty of every channel, in channel order
    pub fn duties(&self) -> [u16; CHANNEL_COUNT] {
        self.channels
            .map(|state| state.map(|s| s.duty).unwrap_or_default())
    }

    /// Number of duty writes accepted so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn slot(&mut self, channel: PwmChannel) -> Result<&mut Option<ChannelState>> {
        self.channels
            .get_mut(channel.index())
            .ok_or(PwmError::InvalidChannel { channel })
    }
}

impl PwmChannels for SimulatedPwm {
    fn configure(
        &mut self,
        channel: PwmChannel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<()> {
        check_resolution(resolution_bits)?;
        debug!(
            "Configure {}: {} Hz, {} bit",
            channel, frequency_hz, resolution_bits
        );
        *self.slot(channel)? = Some(ChannelState {
            frequency_hz,
            resolution_bits,
            ..Default::default()
        });
        Ok(())
    }

    fn attach(&mut self, channel: PwmChannel, pin: u8) -> Result<()> {
        let state = self
            .slot(channel)?
            .as_mut()
            .ok_or(PwmError::NotConfigured { channel })?;
        debug!("Attach {} to pin {}", channel, pin);
        state.pin = Some(pin);
        Ok(())
    }

    fn write(&mut self, channel: PwmChannel, duty: u16) -> Result<()> {
        let state = self
            .slot(channel)?
            .as_mut()
            .filter(|s| s.pin.is_some())
            .ok_or(PwmError::NotConfigured { channel })?;
        debug!("Write {}: duty={}", channel, duty);
        state.duty = duty;
        self.writes += 1;
        Ok(())
    }
}
