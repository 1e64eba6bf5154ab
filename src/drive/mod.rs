// Drive module for the four-wheel PWM base
//
// Provides:
// - Velocity mixing (cmd_vel -> signed duty per wheel)
// - Signed duty -> forward/reverse PWM pair
// - PWM backends (simulated, serial bridge)
// - Drivetrain combining the above

pub mod bridge;
pub mod channels;
mod drivetrain;
pub mod mixer;
pub mod output;
pub mod pwm;

pub use bridge::SerialBridge;
pub use channels::{CHANNEL_COUNT, ChannelAssignment, ChannelPair, PwmChannel};
pub use drivetrain::{Drivetrain, PwmConfig};
pub use mixer::{Mixer, Wheel, WheelDuty};
pub use output::{DutyPair, OverflowPolicy};
pub use pwm::{PwmChannels, PwmError, SimulatedPwm};
