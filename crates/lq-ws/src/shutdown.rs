use tokio::sync::broadcast;

/// Broadcast-backed shutdown signal. Clones share one channel, so a
/// single [`ShutdownCoordinator::shutdown`] reaches every guard.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Notify every guard. Called from the signal handler.
    pub fn shutdown(&self) {
        log::info!("Shutdown tripped, waking all guards");
        let _ = self.tx.send(());
    }

    pub fn subscribe_guard(&self) -> ShutdownGuard {
        ShutdownGuard {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-task handle on the shutdown channel.
pub struct ShutdownGuard {
    rx: broadcast::Receiver<()>,
}

impl ShutdownGuard {
    pub async fn wait(&mut self) {
        let _ = self.rx.recv().await;
    }

    /// Non-blocking check; consumes the signal when present.
    pub fn poll_shutdown(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }
}
