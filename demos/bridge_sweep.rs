// Bridge sweep: step each wheel of a serial PWM bridge, one direction at a time
//
// Usage: cargo run --example bridge_sweep -- <port> [baud]
// Example: cargo run --example bridge_sweep -- /dev/ttyUSB0 115200
//
// Lift the wheels off the ground first. Duty stays low (about 25%).

use radicon_zenoh_runtime::config::BRIDGE_BAUDRATE;
use radicon_zenoh_runtime::drive::{Drivetrain, SerialBridge, Wheel, WheelDuty};
use std::io::{self, Write};
use std::thread::sleep;
use std::time::Duration;

const TEST_DUTY: i32 = 64;

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(port) = args.next() else {
        println!("Usage: bridge_sweep <port> [baud]");
        return Ok(());
    };
    let baud = match args.next() {
        Some(b) => b.parse()?,
        None => BRIDGE_BAUDRATE,
    };

    println!("Serial port: {} @ {} baud", port, baud);
    if !confirm("Are the wheels OFF THE GROUND?")? {
        println!("Aborted.");
        return Ok(());
    }

    let bridge = SerialBridge::open(&port, baud)?;
    let mut drivetrain = Drivetrain::new(bridge);
    drivetrain.initialize()?;
    println!("✓ 8 channels configured and zeroed");

    for wheel in Wheel::ALL {
        for (label, value) in [("forward", TEST_DUTY), ("reverse", -TEST_DUTY)] {
            println!("  {:?} {}...", wheel, label);
            let mut duty = WheelDuty::zero();
            duty[wheel] = value;
            drivetrain.write_duty(&duty);
            sleep(Duration::from_millis(500));

            drivetrain.stop();
            sleep(Duration::from_millis(300));
        }
    }

    println!("✓ Sweep complete");
    Ok(())
}
