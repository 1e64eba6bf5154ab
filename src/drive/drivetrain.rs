// Four-wheel drivetrain on dual-channel PWM
//
// Combines the mixer, the output mapper and a PWM backend into the
// callback body run for every new command.

use tracing::{debug, info, warn};

use super::channels::ChannelAssignment;
use super::mixer::{Mixer, WheelDuty};
use super::output::{DutyPair, OverflowPolicy, max_duty};
use super::pwm::{PwmChannels, PwmError};
use crate::config::{PWM_FREQUENCY_HZ, PWM_RESOLUTION_BITS};
use crate::messages::VelocityCommand;

/// Timer settings shared by all channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    pub frequency_hz: u32,
    pub resolution_bits: u8,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency_hz: PWM_FREQUENCY_HZ,
            resolution_bits: PWM_RESOLUTION_BITS,
        }
    }
}

pub struct Drivetrain<P: PwmChannels> {
    pwm: P,
    layout: ChannelAssignment,
    config: PwmConfig,
    mixer: Mixer,
    policy: OverflowPolicy,
    initialized: bool,
}

impl<P: PwmChannels> Drivetrain<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            layout: ChannelAssignment::default(),
            config: PwmConfig::default(),
            mixer: Mixer::default(),
            policy: OverflowPolicy::default(),
            initialized: false,
        }
    }

    pub fn with_mixer(mut self, mixer: Mixer) -> Self {
        self.mixer = mixer;
        self
    }

    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_config(mut self, config: PwmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_layout(mut self, layout: ChannelAssignment) -> Self {
        self.layout = layout;
        self
    }

    /// Configure every channel, attach it to its pin and write 0.
    ///
    /// Must succeed before `apply`; any failure here is an init failure.
    pub fn initialize(&mut self) -> Result<(), PwmError> {
        info!(
            "Initializing {} PWM channels at {} Hz, {} bit",
            self.layout.channels().count(),
            self.config.frequency_hz,
            self.config.resolution_bits
        );

        for (channel, pin) in self.layout.channels() {
            self.pwm.configure(
                channel,
                self.config.frequency_hz,
                self.config.resolution_bits,
            )?;
            self.pwm.attach(channel, pin)?;
            self.pwm.write(channel, 0)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Mix a command and write both channels of every wheel.
    ///
    /// Write failures are logged and skipped; the next command rewrites
    /// every channel anyway.
    pub fn apply(&mut self, cmd: &VelocityCommand) -> WheelDuty {
        let duty = self.mixer.mix(cmd);
        debug!(
            "cmd linear.x={} angular.z={} -> duty {:?}",
            cmd.linear_x,
            cmd.angular_z,
            duty.as_array()
        );
        self.write_duty(&duty);
        duty
    }

    /// Write an already mixed duty set (forward then reverse, wheel order)
    pub fn write_duty(&mut self, duty: &WheelDuty) {
        let max = max_duty(self.config.resolution_bits);
        for (wheel, value) in duty.iter() {
            let pair = self.layout.pair(wheel);
            let out = DutyPair::split(value, self.policy, max);
            if value.unsigned_abs() > u32::from(max) {
                debug!(
                    "{:?} duty {} exceeds {}, {:?} -> {:?}",
                    wheel, value, max, self.policy, out
                );
            }
            for (channel, level) in [
                (pair.forward, out.forward),
                (pair.reverse, out.reverse),
            ] {
                if let Err(e) = self.pwm.write(channel, level) {
                    warn!("PWM write to {} failed: {}", channel, e);
                }
            }
        }
    }

    /// Drive every channel to 0
    pub fn stop(&mut self) {
        info!("Stopping all wheels");
        self.write_duty(&WheelDuty::zero());
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }
}

impl<P: PwmChannels> Drop for Drivetrain<P> {
    fn drop(&mut self) {
        // Leave the wheels stopped when the drivetrain goes away
        if self.initialized {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::mixer::Wheel;
    use crate::drive::pwm::SimulatedPwm;

    fn drivetrain(policy: OverflowPolicy) -> Drivetrain<SimulatedPwm> {
        let mut dt = Drivetrain::new(SimulatedPwm::new()).with_policy(policy);
        dt.initialize().unwrap();
        dt
    }

    #[test]
    fn test_initialize_configures_all_channels() {
        let dt = drivetrain(OverflowPolicy::Clamp);
        let layout = ChannelAssignment::default();
        for (channel, pin) in layout.channels() {
            let state = dt.pwm().state(channel).unwrap();
            assert_eq!(state.frequency_hz, 20_000);
            assert_eq!(state.resolution_bits, 8);
            assert_eq!(state.pin, Some(pin));
            assert_eq!(state.duty, 0);
        }
        assert_eq!(dt.pwm().write_count(), 8);
    }

    #[test]
    fn test_forward_scenario() {
        let mut dt = drivetrain(OverflowPolicy::Clamp);
        let duty = dt.apply(&VelocityCommand::new(1.0, 0.0));
        assert_eq!(duty.as_array(), [127, -127, -127, 127]);
        // [w0 fwd, w0 rev, w1 fwd, w1 rev, ...]
        assert_eq!(dt.pwm().duties(), [127, 0, 0, 127, 0, 127, 127, 0]);
    }

    #[test]
    fn test_zero_scenario() {
        let mut dt = drivetrain(OverflowPolicy::Clamp);
        dt.apply(&VelocityCommand::new(0.7, 0.2));
        let before = dt.pwm().write_count();
        dt.apply(&VelocityCommand::default());
        assert_eq!(dt.pwm().duties(), [0; 8]);
        assert_eq!(dt.pwm().write_count() - before, 8);
    }

    #[test]
    fn test_eight_writes_per_command() {
        let mut dt = drivetrain(OverflowPolicy::Clamp);
        let before = dt.pwm().write_count();
        dt.apply(&VelocityCommand::new(0.3, -0.1));
        assert_eq!(dt.pwm().write_count() - before, 8);
    }

    #[test]
    fn test_same_command_same_writes() {
        let mut dt = drivetrain(OverflowPolicy::Clamp);
        let cmd = VelocityCommand::new(-0.4, 0.9);
        let first = (dt.apply(&cmd), dt.pwm().duties());
        let second = (dt.apply(&cmd), dt.pwm().duties());
        assert_eq!(first, second);
    }

    #[test]
    fn test_mutual_exclusion_per_wheel() {
        let mut dt = drivetrain(OverflowPolicy::Clamp);
        for (x, z) in [(1.0, 0.0), (-1.0, 0.3), (0.2, -0.9), (2.5, 2.5)] {
            dt.apply(&VelocityCommand::new(x, z));
            let d = dt.pwm().duties();
            for wheel in Wheel::ALL {
                let i = wheel.index() * 2;
                assert_eq!(u32::from(d[i]) * u32::from(d[i + 1]), 0, "{:?}", d);
            }
        }
    }

    #[test]
    fn test_overflow_clamped() {
        let mut dt = drivetrain(OverflowPolicy::Clamp);
        let duty = dt.apply(&VelocityCommand::new(2.5, 0.0));
        assert_eq!(duty.as_array(), [317, -317, -317, 317]);
        assert_eq!(dt.pwm().duties(), [255, 0, 0, 255, 0, 255, 255, 0]);
    }

    #[test]
    fn test_overflow_truncated() {
        let mut dt = drivetrain(OverflowPolicy::Truncate);
        dt.apply(&VelocityCommand::new(2.5, 0.0));
        // 317 & 0xFF = 61
        assert_eq!(dt.pwm().duties(), [61, 0, 0, 61, 0, 61, 61, 0]);
    }

    #[test]
    fn test_higher_resolution_has_headroom() {
        let mut dt = Drivetrain::new(SimulatedPwm::new()).with_config(PwmConfig {
            frequency_hz: 20_000,
            resolution_bits: 10,
        });
        dt.initialize().unwrap();
        dt.apply(&VelocityCommand::new(2.5, 0.0));
        assert_eq!(dt.pwm().duties()[0], 317);
    }

    #[test]
    fn test_custom_layout_pins() {
        let pins = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut dt = Drivetrain::new(SimulatedPwm::new())
            .with_layout(ChannelAssignment::with_pins(pins));
        dt.initialize().unwrap();
        let layout = ChannelAssignment::with_pins(pins);
        for (channel, pin) in layout.channels() {
            assert_eq!(dt.pwm().state(channel).unwrap().pin, Some(pin));
        }
    }

    #[test]
    fn test_initialize_fails_on_bad_resolution() {
        let mut dt = Drivetrain::new(SimulatedPwm::new()).with_config(PwmConfig {
            frequency_hz: 20_000,
            resolution_bits: 0,
        });
        assert!(matches!(
            dt.initialize(),
            Err(PwmError::InvalidResolution { bits: 0 })
        ));
    }

    #[test]
    fn test_apply_before_initialize_does_not_panic() {
        let mut dt = Drivetrain::new(SimulatedPwm::new());
        let duty = dt.apply(&VelocityCommand::new(1.0, 0.0));
        assert_eq!(duty.as_array(), [127, -127, -127, 127]);
        assert_eq!(dt.pwm().write_count(), 0);
    }
}
