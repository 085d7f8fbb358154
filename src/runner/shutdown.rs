use futures::future;
use tokio::select;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

/// Receives the first SIGINT/SIGTERM delivered to the process.
pub struct Shutdown {
    rx: watch::Receiver<Option<&'static str>>,
}

/// Fires a [`Shutdown`] by hand.
#[cfg(test)]
pub struct ShutdownTrigger {
    tx: watch::Sender<Option<&'static str>>,
}

impl Shutdown {
    pub fn listen() -> Self {
        Self {
            rx: spawn_shutdown_listener(),
        }
    }

    #[cfg(test)]
    pub fn manual() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(None);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    #[cfg(test)]
    pub fn requested(&self) -> Option<&'static str> {
        *self.rx.borrow()
    }

    /// Resolves with the signal name once shutdown is requested. Never
    /// resolves if the listener went away without a signal.
    pub async fn wait(&mut self) -> &'static str {
        loop {
            if let Some(signal) = *self.rx.borrow_and_update() {
                return signal;
            }
            if self.rx.changed().await.is_err() {
                return future::pending().await;
            }
        }
    }
}

#[cfg(test)]
impl ShutdownTrigger {
    pub fn trigger(&self, signal: &'static str) {
        let _ = self.tx.send(Some(signal));
    }
}

fn spawn_shutdown_listener() -> watch::Receiver<Option<&'static str>> {
    let (shutdown_tx, shutdown_rx) = watch::channel(None);

    tokio::spawn(async move {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).ok();

        let term_future = async {
            if let Some(ref mut sigterm) = sigterm {
                sigterm.recv().await;
                Some("SIGTERM")
            } else {
                future::pending::<Option<&'static str>>().await
            }
        };

        select! {
            res = signal::ctrl_c() => {
                if res.is_ok() {
                    info!("Received SIGINT.");
                    let _ = shutdown_tx.send(Some("SIGINT"));
                } else {
                    warn!("Failed to listen for SIGINT: {:?}", res.err());
                }
            }
            _ = term_future => {
                info!("Received SIGTERM.");
                let _ = shutdown_tx.send(Some("SIGTERM"));
            }
        }
    });

    shutdown_rx
}
