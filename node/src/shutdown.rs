//! Stop signal for the relay loop.
//!
//! The relay ticks on an interval, settling due auctions and pumping
//! envelopes between the two ledgers. A tick is never interrupted: the loop
//! `select!`s on its ticker and on a [`ShutdownController`] receiver, so a
//! SIGINT/SIGTERM lands between ticks and no envelope is left half-delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub struct ShutdownController {
    tx: broadcast::Sender<()>,
    /// Set once stopping begins. A broadcast only reaches receivers that
    /// existed when it was sent; this flag covers loops that subscribe later.
    triggered: AtomicBool,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Ask every relay loop to stop after its current tick. Repeat calls are no-ops.
    pub fn shutdown(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(());
    }

    /// Wait for SIGTERM or SIGINT, then stop the relay.
    pub async fn wait_for_signal(&self) {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = signal::ctrl_c() => tracing::info!("SIGINT, relay stopping after current tick"),
            _ = terminate => tracing::info!("SIGTERM, relay stopping after current tick"),
        }

        self.shutdown();
    }

    /// Run [`wait_for_signal`](Self::wait_for_signal) on its own task.
    /// The relay aborts the handle once its loop has exited.
    pub fn spawn_signal_listener(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.wait_for_signal().await })
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}
