// Keyboard teleop: W/S forward/back, A/D turn, R/F speed, Q quit
// Publishes JSON Twist on cmd_vel at ~50Hz.
//
// Usage: cargo run --example teleop -- [peer address]
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use radicon_zenoh_runtime::config::{DEFAULT_PEER_PORT, TOPIC_CMD_VEL};
use radicon_zenoh_runtime::messages::{Twist, Vector3};
use std::time::{Duration, Instant};
use tracing::info;

const SPEEDS: [f64; 3] = [0.3, 0.6, 1.0]; // fraction of full duty
const INPUT_TIMEOUT_MS: u64 = 100; // Reset velocities after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut config = zenoh::Config::default();
    if let Some(peer) = std::env::args().nth(1) {
        let endpoint = format!("tcp/{}:{}", peer, DEFAULT_PEER_PORT);
        info!("Connecting to {}", endpoint);
        config.insert_json5("connect/endpoints", &format!("[\"{}\"]", endpoint))?;
    }

    info!("Opening Zenoh session...");
    let session = zenoh::open(config).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_VEL).await?;

    info!("Controls: W/S=forward/back, A/D=turn, R/F=speed, Q=quit");
    info!("Speed: LOW");

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;

    let mut linear_x = 0.0;
    let mut angular_z = 0.0;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    KeyCode::Char('w') if pressed => {
                        linear_x = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        linear_x = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        angular_z = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        angular_z = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(2);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            linear_x = 0.0;
            angular_z = 0.0;
        }

        let twist = Twist {
            linear: Vector3 {
                x: linear_x,
                ..Default::default()
            },
            angular: Vector3 {
                z: angular_z,
                ..Default::default()
            },
        };
        publisher.put(serde_json::to_string(&twist)?).await?;
    }

    // Leave the base stopped
    publisher.put(serde_json::to_string(&Twist::default())?).await?;
    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
