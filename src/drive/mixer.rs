// Velocity mixing for the four-wheel base
// Converts (linear.x, angular.z) into one signed duty per wheel.

use std::ops::{Index, IndexMut};

use crate::config::MIX_SCALE;
use crate::messages::VelocityCommand;

/// Wheels in positional order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wheel {
    FrontRight = 0,
    FrontLeft = 1,
    RearLeft = 2,
    RearRight = 3,
}

impl Wheel {
    pub const ALL: [Wheel; 4] = [
        Wheel::FrontRight,
        Wheel::FrontLeft,
        Wheel::RearLeft,
        Wheel::RearRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sign applied to linear.x for this wheel
    fn linear_sign(self) -> f64 {
        match self {
            Wheel::FrontRight | Wheel::RearRight => 1.0,
            Wheel::FrontLeft | Wheel::RearLeft => -1.0,
        }
    }
}

/// Signed duty per wheel, not yet limited to the PWM resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelDuty([i32; 4]);

impl WheelDuty {
    pub fn new(duties: [i32; 4]) -> Self {
        Self(duties)
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns duties as array [front_right, front_left, rear_left, rear_right]
    pub fn as_array(&self) -> [i32; 4] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Wheel, i32)> + '_ {
        Wheel::ALL.into_iter().map(move |w| (w, self[w]))
    }
}

impl Index<Wheel> for WheelDuty {
    type Output = i32;

    fn index(&self, wheel: Wheel) -> &i32 {
        &self.0[wheel.index()]
    }
}

impl IndexMut<Wheel> for WheelDuty {
    fn index_mut(&mut self, wheel: Wheel) -> &mut i32 {
        &mut self.0[wheel.index()]
    }
}

/// Linear mixer with a single gain for both axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    scale: f64,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(MIX_SCALE)
    }
}

impl Mixer {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Mix a command into per-wheel duties
    ///
    /// Right wheels take `+linear_x`, left wheels `-linear_x`; all four take
    /// `+angular_z`. Each sum is truncated toward zero. No clamping here.
    pub fn mix(&self, cmd: &VelocityCommand) -> WheelDuty {
        let mut duty = WheelDuty::zero();
        for wheel in Wheel::ALL {
            let value =
                wheel.linear_sign() * cmd.linear_x * self.scale + cmd.angular_z * self.scale;
            // NaN maps to 0, infinities saturate
            duty[wheel] = value as i32;
        }
        duty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mix(linear_x: f64, angular_z: f64) -> WheelDuty {
        Mixer::default().mix(&VelocityCommand::new(linear_x, angular_z))
    }

    #[test]
    fn test_zero_command() {
        assert_eq!(mix(0.0, 0.0), WheelDuty::zero());
    }

    #[test]
    fn test_forward_only() {
        for v in [-1.0, -0.5, 0.25, 1.0] {
            let duty = mix(v, 0.0);
            let expected = (127.0 * v) as i32;
            assert_eq!(duty[Wheel::FrontRight], expected);
            assert_eq!(duty[Wheel::RearRight], expected);
            assert_eq!(duty[Wheel::FrontLeft], -expected);
            assert_eq!(duty[Wheel::RearLeft], -expected);
        }
    }

    #[test]
    fn test_rotation_only() {
        // Pure yaw drives all four wheels the same way
        for w in [-1.0, 0.5, 1.0] {
            let duty = mix(0.0, w);
            let expected = (127.0 * w) as i32;
            assert!(duty.iter().all(|(_, d)| d == expected), "{:?}", duty);
        }
    }

    #[test]
    fn test_unit_forward() {
        assert_eq!(mix(1.0, 0.0).as_array(), [127, -127, -127, 127]);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // 0.5 * 127 = 63.5, -0.5 * 127 = -63.5
        assert_eq!(mix(0.5, 0.0).as_array(), [63, -63, -63, 63]);
        // 2.5 * 127 = 317.5
        assert_eq!(mix(2.5, 0.0).as_array(), [317, -317, -317, 317]);
    }

    #[test]
    fn test_combined_command() {
        // right: 0.5*127 + 0.5*127 = 127, left: -63.5 + 63.5 = 0
        assert_eq!(mix(0.5, 0.5).as_array(), [127, 0, 0, 127]);
    }

    #[test]
    fn test_not_clamped() {
        let duty = mix(10.0, 0.0);
        assert_eq!(duty[Wheel::FrontRight], 1270);
        assert_eq!(duty[Wheel::FrontLeft], -1270);
    }

    #[test]
    fn test_non_finite_input() {
        assert_eq!(mix(f64::NAN, 0.0), WheelDuty::zero());
        let duty = mix(f64::INFINITY, 0.0);
        assert_eq!(duty[Wheel::FrontRight], i32::MAX);
        assert_eq!(duty[Wheel::FrontLeft], i32::MIN);
    }

    #[test]
    fn test_custom_scale() {
        let duty = Mixer::new(255.0).mix(&VelocityCommand::new(1.0, 0.0));
        assert_eq!(duty.as_array(), [255, -255, -255, 255]);
    }

    #[test]
    fn test_idempotent() {
        let mixer = Mixer::default();
        let cmd = VelocityCommand::new(0.3, -0.7);
        assert_eq!(mixer.mix(&cmd), mixer.mix(&cmd));
    }
}
