// Message types for the runtime

use serde::{Deserialize, Serialize};

/// 3-vector as carried by geometry_msgs/Twist
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// Wire message published on cmd_vel
// Missing components read as zero, unknown fields are ignored
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

/// The two Twist components the drivetrain consumes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityCommand {
    pub linear_x: f64,
    pub angular_z: f64,
}

impl VelocityCommand {
    pub fn new(linear_x: f64, angular_z: f64) -> Self {
        Self {
            linear_x,
            angular_z,
        }
    }
}

impl From<&Twist> for VelocityCommand {
    fn from(twist: &Twist) -> Self {
        Self {
            linear_x: twist.linear.x,
            angular_z: twist.angular.z,
        }
    }
}

/// Decode a JSON Twist payload into a command
pub fn decode_command(payload: &[u8]) -> Result<VelocityCommand, serde_json::Error> {
    let twist: Twist = serde_json::from_slice(payload)?;
    Ok(VelocityCommand::from(&twist))
}
