//! Stop signal shared by the server task and the signal watcher.
//!
//! `main` hands a clone to the signal watcher and passes the original to
//! [`Startup::serve`](crate::lifecycle::Startup::serve), which subscribes
//! twice: once for the axum graceful shutdown and once to start the grace
//! period timer.

use tokio::sync::broadcast;

/// One-shot stop notification fanned out to every subscriber.
#[derive(Clone)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    /// A receiver that resolves once [`Shutdown::trigger`] is called.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Ask the server to stop. Receivers created afterwards never see it.
    pub fn trigger(&self) {
        if self.notify.send(()).is_err() {
            tracing::debug!("Stop requested with nothing listening");
        }
    }

    /// How many receivers are still alive.
    pub fn receiver_count(&self) -> usize {
        self.notify.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_the_channel() {
        let shutdown = Shutdown::new();
        let watcher = shutdown.clone();
        let mut rx = shutdown.subscribe();

        watcher.trigger();
        assert!(rx.recv().await.is_ok());
        assert_eq!(watcher.receiver_count(), 1);
    }

    #[test]
    fn test_trigger_without_subscribers_is_harmless() {
        Shutdown::default().trigger();
    }
}
