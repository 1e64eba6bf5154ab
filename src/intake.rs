// Command intake: zenoh subscription feeding a latest-value slot
//
// Samples arrive on zenoh's own threads and replace whatever command is
// waiting; the control loop picks up at most the newest one per spin.
// Superseded commands are never delivered.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::messages::{VelocityCommand, decode_command};

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("command source closed")]
    Closed,
}

/// Transport side of the slot
#[derive(Debug)]
pub struct CommandSlot {
    tx: watch::Sender<Option<VelocityCommand>>,
}

impl CommandSlot {
    /// Replace the pending command
    pub fn offer(&self, cmd: VelocityCommand) {
        self.tx.send_replace(Some(cmd));
    }
}

/// Control-loop side of the slot
pub struct CommandIntake {
    rx: watch::Receiver<Option<VelocityCommand>>,
    _subscriber: Option<zenoh::pubsub::Subscriber<()>>,
}

/// Build a connected slot/intake pair
pub fn latest_slot() -> (CommandSlot, CommandIntake) {
    let (tx, rx) = watch::channel(None);
    (
        CommandSlot { tx },
        CommandIntake {
            rx,
            _subscriber: None,
        },
    )
}

impl CommandIntake {
    /// Subscribe to JSON Twist payloads on `topic`
    pub async fn subscribe(session: &zenoh::Session, topic: &str) -> zenoh::Result<Self> {
        let (slot, mut intake) = latest_slot();
        let subscriber = session
            .declare_subscriber(topic.to_owned())
            .callback(move |sample| {
                let payload = sample.payload().to_bytes();
                match decode_command(&payload) {
                    Ok(cmd) => slot.offer(cmd),
                    Err(e) => warn!("Failed to parse command: {}", e),
                }
            })
            .await?;
        intake._subscriber = Some(subscriber);
        Ok(intake)
    }

    /// Wait up to `wait` for a new command and hand the newest to `callback`.
    ///
    /// Returns whether the callback ran. When the source is gone the full
    /// wait still elapses before `IntakeError::Closed` is returned.
    pub async fn spin_some<F>(
        &mut self,
        wait: Duration,
        mut callback: F,
    ) -> Result<bool, IntakeError>
    where
        F: FnMut(&VelocityCommand),
    {
        match timeout(wait, self.rx.changed()).await {
            Err(_elapsed) => Ok(false),
            Ok(Err(_)) => {
                sleep(wait).await;
                Err(IntakeError::Closed)
            }
            Ok(Ok(())) => {
                let latest = *self.rx.borrow_and_update();
                match latest {
                    Some(cmd) => {
                        debug!("Dispatching {:?}", cmd);
                        callback(&cmd);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }
}
