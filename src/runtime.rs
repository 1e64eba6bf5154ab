// Bootstrap and control loop
// Startup either completes or parks in the halt state; after that the loop
// spins the intake every SPIN_TIMEOUT and drives the wheels from the newest
// cmd_vel. There is no shutdown path.

use std::convert::Infallible;
use std::error::Error;

use tokio::time::sleep;
use tracing::{error, info, trace};

use crate::config::{HALT_REPEAT, NODE_NAME, Options, SPIN_TIMEOUT, STARTUP_GRACE, TRANSPORT_SETTLE};
use crate::display::{ConsoleDisplay, StatusDisplay};
use crate::drive::{Drivetrain, Mixer, PwmChannels, PwmError, SerialBridge, SimulatedPwm};
use crate::intake::{CommandIntake, IntakeError};

/// Shown repeatedly once startup has failed
pub const INIT_ERROR_MESSAGE: &str = "An error occurred during transport init";

/// Startup failures; all of them end in the halt state
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("PWM setup failed: {0}")]
    Pwm(#[from] PwmError),

    #[error("Transport setup failed: {0}")]
    Transport(#[source] Box<dyn Error + Send + Sync>),
}

/// Everything the control loop owns
pub struct Runtime<P: PwmChannels> {
    drivetrain: Drivetrain<P>,
    intake: CommandIntake,
    session: Option<zenoh::Session>,
}

impl<P: PwmChannels> Runtime<P> {
    pub fn new(drivetrain: Drivetrain<P>, intake: CommandIntake) -> Self {
        Self {
            drivetrain,
            intake,
            session: None,
        }
    }

    /// Keep the session open for as long as the runtime spins
    pub fn with_session(mut self, session: zenoh::Session) -> Self {
        self.session = Some(session);
        self
    }

    /// One executor pass: wait for a command and drive the wheels with it
    pub async fn spin_once(&mut self) -> Result<bool, IntakeError> {
        let drivetrain = &mut self.drivetrain;
        self.intake
            .spin_some(SPIN_TIMEOUT, |cmd| {
                drivetrain.apply(cmd);
            })
            .await
    }

    /// Spin forever; failed passes are skipped
    pub async fn run(mut self) -> Infallible {
        info!("{} spinning every {}ms", NODE_NAME, SPIN_TIMEOUT.as_millis());
        loop {
            if let Err(e) = self.spin_once().await {
                trace!("Spin failed: {}", e);
            }
        }
    }

    pub fn drivetrain(&self) -> &Drivetrain<P> {
        &self.drivetrain
    }

    pub fn session(&self) -> Option<&zenoh::Session> {
        self.session.as_ref()
    }
}

/// PWM backend selected by the options
pub fn open_backend(opts: &Options) -> Result<Box<dyn PwmChannels>, PwmError> {
    match &opts.bridge {
        Some(port) => {
            info!("Opening PWM bridge on {} at {} baud", port, opts.baud);
            Ok(Box::new(SerialBridge::open(port, opts.baud)?))
        }
        None => {
            info!("No PWM bridge configured, simulating channel writes");
            Ok(Box::new(SimulatedPwm::new()))
        }
    }
}

fn transport_error<E: std::fmt::Display>(e: E) -> InitError {
    InitError::Transport(e.to_string().into())
}

/// Zenoh configuration for the peer endpoint and scouting options
pub fn transport_config(opts: &Options) -> Result<zenoh::Config, InitError> {
    let mut config = zenoh::Config::default();
    if let Some(endpoint) = opts.endpoint() {
        info!("Connecting to {}", endpoint);
        config
            .insert_json5("connect/endpoints", &format!("[\"{}\"]", endpoint))
            .map_err(transport_error)?;
    }
    if opts.no_multicast {
        config
            .insert_json5("scouting/multicast/enabled", "false")
            .map_err(transport_error)?;
    }
    Ok(config)
}

/// Bring up PWM outputs, the zenoh session and the cmd_vel subscription
pub async fn start(
    opts: &Options,
    display: &mut dyn StatusDisplay,
) -> Result<Runtime<Box<dyn PwmChannels>>, InitError> {
    display.append_line("Initialize pwm pin");
    let mut drivetrain = Drivetrain::new(open_backend(opts)?)
        .with_mixer(Mixer::new(opts.scale))
        .with_policy(opts.overflow.into());
    drivetrain.initialize()?;

    display.append_line("Initialize transport");
    info!("Opening Zenoh session...");
    let session = zenoh::open(transport_config(opts)?)
        .await
        .map_err(InitError::Transport)?;
    sleep(TRANSPORT_SETTLE).await;

    info!("{} subscribing to {}", NODE_NAME, opts.topic);
    let intake = CommandIntake::subscribe(&session, &opts.topic)
        .await
        .map_err(InitError::Transport)?;

    display.append_line("Successfully initialized transport");
    info!("Overflow policy: {:?}", drivetrain.policy());
    sleep(STARTUP_GRACE).await;

    Ok(Runtime::new(drivetrain, intake).with_session(session))
}

/// Fail-stop: repeat the error message forever
pub async fn halt(display: &mut dyn StatusDisplay, err: &InitError) -> Infallible {
    error!("{}", err);
    loop {
        display.append_line(INIT_ERROR_MESSAGE);
        sleep(HALT_REPEAT).await;
    }
}

/// Start and spin; never returns
pub async fn run(opts: Options) -> Infallible {
    let mut display = ConsoleDisplay;
    match start(&opts, &mut display).await {
        Ok(runtime) => runtime.run().await,
        Err(e) => halt(&mut display, &e).await,
    }
}
