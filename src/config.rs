// Topics, timings, PWM layout and command-line options
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::drive::OverflowPolicy;

// Node name used in log lines
pub const NODE_NAME: &str = "radicon_node";

// Zenoh key expression carrying Twist commands
pub const TOPIC_CMD_VEL: &str = "cmd_vel";

// Default zenoh port when only a peer address is given
pub const DEFAULT_PEER_PORT: u16 = 7447;

// Executor wait per spin
pub const SPIN_TIMEOUT: Duration = Duration::from_millis(10);

// Startup pauses: after the session opens, and after init completes
pub const TRANSPORT_SETTLE: Duration = Duration::from_millis(2000);
pub const STARTUP_GRACE: Duration = Duration::from_millis(1000);

// Halt state repeats its message at this interval
pub const HALT_REPEAT: Duration = Duration::from_secs(10);

// PWM timer configuration
pub const PWM_FREQUENCY_HZ: u32 = 20_000;
pub const PWM_RESOLUTION_BITS: u8 = 8;

// Output pin per PWM channel (channel 2i = wheel i forward, 2i+1 = reverse)
pub const PWM_PINS: [u8; 8] = [14, 26, 25, 13, 32, 27, 19, 33];

// Mixer gain: unit command lands near mid-range of the 8-bit duty space
pub const MIX_SCALE: f64 = 127.0;

// Serial PWM bridge
pub const BRIDGE_BAUDRATE: u32 = 115_200;

/// Overflow handling as selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OverflowArg {
    /// Saturate at the largest representable duty
    #[default]
    Clamp,
    /// Keep only the low resolution bits, like the register does
    Truncate,
}

impl From<OverflowArg> for OverflowPolicy {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Clamp => OverflowPolicy::Clamp,
            OverflowArg::Truncate => OverflowPolicy::Truncate,
        }
    }
}

/// Runtime options
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Drive a four-wheel PWM base from cmd_vel")]
pub struct Options {
    /// Address of the zenoh router or peer (scouting is used when omitted)
    #[arg(long)]
    pub peer: Option<String>,

    /// Port of the zenoh router or peer
    #[arg(long, default_value_t = DEFAULT_PEER_PORT)]
    pub port: u16,

    /// Key expression to subscribe to
    #[arg(long, default_value = TOPIC_CMD_VEL)]
    pub topic: String,

    /// Serial port of a PWM bridge; without it channel writes are simulated
    #[arg(long)]
    pub bridge: Option<String>,

    /// Baud rate of the PWM bridge
    #[arg(long, default_value_t = BRIDGE_BAUDRATE)]
    pub baud: u32,

    /// What to do with duties outside the PWM resolution
    #[arg(long, value_enum, default_value_t = OverflowArg::Clamp)]
    pub overflow: OverflowArg,

    /// Mixer gain applied to linear.x and angular.z
    #[arg(long, default_value_t = MIX_SCALE)]
    pub scale: f64,

    /// Disable multicast scouting; only explicit endpoints are used
    #[arg(long)]
    pub no_multicast: bool,
}

impl Options {
    /// Zenoh connect endpoint, if a peer was given
    pub fn endpoint(&self) -> Option<String> {
        self.peer
            .as_ref()
            .map(|addr| format!("tcp/{}:{}", addr, self.port))
    }
}
