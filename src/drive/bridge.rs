// Serial PWM bridge
//
// Forwards channel setup and duty writes to a microcontroller that owns the
// PWM timers. Frames are fire-and-forget, the bridge never answers.
//
// Frame format: [0xFF, 0xFF, Channel, Length, Instruction, Params..., Checksum]
// Length counts instruction + params + checksum; checksum is !sum of
// everything after the header.

use serialport::{self, SerialPort};
use std::io::Write;
use std::time::Duration;
use tracing::debug;

use super::channels::{CHANNEL_COUNT, PwmChannel};
use super::pwm::{PwmChannels, PwmError, Result, check_resolution};

pub const DEFAULT_TIMEOUT_MS: u64 = 100;

const HEADER: [u8; 2] = [0xFF, 0xFF];

/// Instruction set understood by the bridge
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Configure = 0x01, // params: frequency u32 LE, resolution u8
    Attach = 0x02,    // params: pin u8
    Write = 0x03,     // params: duty u16 LE
}

/// PWM outputs behind a serial link
pub struct SerialBridge<W: Write = Box<dyn SerialPort>> {
    port: W,
}

impl SerialBridge {
    /// Open the bridge's serial port
    pub fn open(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }
}

impl<W: Write> SerialBridge<W> {
    /// Wrap an already open link
    pub fn from_writer(port: W) -> Self {
        Self { port }
    }

    pub fn into_inner(self) -> W {
        self.port
    }

    fn send(
        &mut self,
        channel: PwmChannel,
        instruction: Instruction,
        params: &[u8],
    ) -> Result<()> {
        if channel.index() >= CHANNEL_COUNT {
            return Err(PwmError::InvalidChannel { channel });
        }
        let frame = encode_frame(channel, instruction, params);
        self.port.write_all(&frame)?;
        self.port.flush()?;
        Ok(())
    }
}

fn encode_frame(channel: PwmChannel, instruction: Instruction, params: &[u8]) -> Vec<u8> {
    let mut frame = HEADER.to_vec();
    frame.extend([channel.0, params.len() as u8 + 2, instruction as u8]);
    frame.extend_from_slice(params);
    let sum = frame[HEADER.len()..]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    frame.push(!sum);
    frame
}

impl<W: Write> PwmChannels for SerialBridge<W> {
    fn configure(
        &mut self,
        channel: PwmChannel,
        frequency_hz: u32,
        resolution_bits: u8,
    ) -> Result<()> {
        check_resolution(resolution_bits)?;
        let f = frequency_hz.to_le_bytes();
        let params = [f[0], f[1], f[2], f[3], resolution_bits];
        debug!(
            "Bridge configure {}: {} Hz, {} bit",
            channel, frequency_hz, resolution_bits
        );
        self.send(channel, Instruction::Configure, &params)
    }

    fn attach(&mut self, channel: PwmChannel, pin: u8) -> Result<()> {
        debug!("Bridge attach {} to pin {}", channel, pin);
        self.send(channel, Instruction::Attach, &[pin])
    }

    fn write(&mut self, channel: PwmChannel, duty: u16) -> Result<()> {
        self.send(channel, Instruction::Write, &duty.to_le_bytes())
    }
}
