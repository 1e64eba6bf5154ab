// Signed duty -> (forward, reverse) PWM pair

/// How a duty magnitude above the PWM resolution is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Saturate at the largest representable duty
    #[default]
    Clamp,
    /// Keep the low resolution bits only (317 -> 61 at 8 bits).
    /// Matches what the duty register does with an oversized write.
    Truncate,
}

impl OverflowPolicy {
    fn limit(self, magnitude: u32, max_duty: u16) -> u16 {
        match self {
            OverflowPolicy::Clamp => magnitude.min(u32::from(max_duty)) as u16,
            OverflowPolicy::Truncate => (magnitude & u32::from(max_duty)) as u16,
        }
    }
}

/// Largest duty for a given resolution
pub fn max_duty(resolution_bits: u8) -> u16 {
    match resolution_bits {
        0 => 0,
        1..=15 => (1u16 << resolution_bits) - 1,
        _ => u16::MAX,
    }
}

/// Duty written to a wheel's two channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DutyPair {
    pub forward: u16,
    pub reverse: u16,
}

impl DutyPair {
    /// Split a signed duty; at most one side is ever nonzero
    pub fn split(duty: i32, policy: OverflowPolicy, max_duty: u16) -> Self {
        if duty > 0 {
            Self {
                forward: policy.limit(duty.unsigned_abs(), max_duty),
                reverse: 0,
            }
        } else if duty < 0 {
            Self {
                forward: 0,
                reverse: policy.limit(duty.unsigned_abs(), max_duty),
            }
        } else {
            Self::default()
        }
    }

    /// Signed duty as seen at the motor
    pub fn net(&self) -> i32 {
        i32::from(self.forward) - i32::from(self.reverse)
    }
}
