//! Shutdown coordination for the relay.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// The flag is latched: a task that subscribes after [`Shutdown::trigger`]
/// still observes it. Cloning shares the same flag.
#[derive(Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// One subscriber's view of the shutdown flag.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger shutdown. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of subscribers still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered, or once every coordinator is gone.
    pub async fn wait(mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = shutdown.clone().subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        a.wait().await;
        b.wait().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();

        let late = shutdown.subscribe();
        tokio::time::timeout(Duration::from_secs(1), late.wait())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_pends_until_triggered() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        let pending = tokio::time::timeout(Duration::from_secs(60), signal.wait()).await;
        assert!(pending.is_err());
    }
}
