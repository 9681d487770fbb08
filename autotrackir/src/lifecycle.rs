//! Lifecycle coordinator - one exit path for every reason to stop.
//!
//! Two producers can ask the process to stop: the OS (Ctrl+C / SIGTERM,
//! via `ctrlc`) and the simulator (a `Quit` message seen by the poll loop).
//! Both post to a single termination channel. The coordinator reads the
//! first reason, cancels the poll loop, takes the session back from it and
//! closes it once. Later posts are dropped.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::poller::Poller;
use crate::simconnect::SimConnectClient;

/// Room for one post from each producer, so neither ever blocks.
const TERMINATION_CHANNEL_CAPACITY: usize = 2;

/// Why the control loop is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl+C or a terminate request from the OS.
    Signal,
    /// The simulator sent `Quit`.
    SimulatorQuit,
    /// Every producer went away without posting.
    ChannelClosed,
}

/// Errors setting up the coordinator.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The OS signal handler could not be installed.
    #[error("Failed to install signal handler: {0}")]
    SignalHandler(#[from] ctrlc::Error),
}

/// Producer half of the termination channel.
#[derive(Debug, Clone)]
pub struct ShutdownSender {
    tx: mpsc::Sender<ShutdownReason>,
}

impl ShutdownSender {
    /// Post `reason` without blocking.
    ///
    /// Returns `false` when shutdown is already under way and the post was
    /// dropped.
    pub fn notify(&self, reason: ShutdownReason) -> bool {
        match self.tx.try_send(reason) {
            Ok(()) => true,
            Err(e) => {
                debug!(?reason, error = %e, "Shutdown already requested, ignoring");
                false
            }
        }
    }
}

/// Consumer half of the termination channel.
#[derive(Debug)]
pub struct ShutdownReceiver {
    rx: mpsc::Receiver<ShutdownReason>,
}

impl ShutdownReceiver {
    /// Wait for the first shutdown request.
    ///
    /// Consumes the receiver, so later posts are discarded.
    pub async fn wait(mut self) -> ShutdownReason {
        self.rx.recv().await.unwrap_or(ShutdownReason::ChannelClosed)
    }
}

/// Create the termination channel.
pub fn termination_channel() -> (ShutdownSender, ShutdownReceiver) {
    let (tx, rx) = mpsc::channel(TERMINATION_CHANNEL_CAPACITY);
    (ShutdownSender { tx }, ShutdownReceiver { rx })
}

/// Route Ctrl+C and SIGTERM into `sender`.
///
/// Can only be installed once per process.
pub fn install_signal_handler(sender: ShutdownSender) -> Result<(), LifecycleError> {
    ctrlc::set_handler(move || {
        sender.notify(ShutdownReason::Signal);
    })?;
    debug!("Signal handler installed");
    Ok(())
}

/// Runs the poll loop until the first shutdown request, then cleans up.
pub struct LifecycleCoordinator {
    sender: ShutdownSender,
    receiver: ShutdownReceiver,
    cancellation: CancellationToken,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        let (sender, receiver) = termination_channel();
        Self {
            sender,
            receiver,
            cancellation: CancellationToken::new(),
        }
    }

    /// A producer handle for the termination channel.
    pub fn sender(&self) -> ShutdownSender {
        self.sender.clone()
    }

    /// Route OS signals into this coordinator.
    pub fn install_signal_handler(&self) -> Result<(), LifecycleError> {
        install_signal_handler(self.sender())
    }

    /// Start `poller`, wait for a shutdown request, stop the poller and
    /// close its session.
    pub async fn run<C>(self, poller: Poller<C>) -> ShutdownReason
    where
        C: SimConnectClient + 'static,
    {
        let LifecycleCoordinator {
            sender,
            receiver,
            cancellation,
        } = self;
        // The coordinator's own sender must not keep the channel open.
        drop(sender);

        let handle = poller.start(cancellation.clone());

        let reason = receiver.wait().await;
        info!(?reason, "Shutting down");

        cancellation.cancel();

        match handle.await {
            Ok(mut session) => {
                if let Err(e) = session.close() {
                    warn!(error = %e, "Failed to close SimConnect session");
                }
            }
            Err(e) => {
                error!(error = %e, "Poll loop task failed");
            }
        }

        reason
    }
}

impl Default for LifecycleCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_reason_wins() {
        let (sender, receiver) = termination_channel();
        assert!(sender.notify(ShutdownReason::SimulatorQuit));
        assert!(sender.notify(ShutdownReason::Signal));

        assert_eq!(receiver.wait().await, ShutdownReason::SimulatorQuit);
    }

    #[tokio::test]
    async fn test_late_post_never_blocks() {
        let (sender, receiver) = termination_channel();
        for _ in 0..TERMINATION_CHANNEL_CAPACITY {
            assert!(sender.notify(ShutdownReason::Signal));
        }
        // Channel is full: dropped, not blocked.
        assert!(!sender.notify(ShutdownReason::SimulatorQuit));

        assert_eq!(receiver.wait().await, ShutdownReason::Signal);
    }

    #[tokio::test]
    async fn test_post_after_receiver_gone() {
        let (sender, receiver) = termination_channel();
        drop(receiver);
        assert!(!sender.notify(ShutdownReason::Signal));
    }

    #[tokio::test]
    async fn test_all_senders_dropped() {
        let (sender, receiver) = termination_channel();
        drop(sender);
        assert_eq!(receiver.wait().await, ShutdownReason::ChannelClosed);
    }
}
