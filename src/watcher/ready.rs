//! Readiness signal flipped after the watcher's first completed tick.

use tokio::sync::watch;

/// Lets writers wait until the current partitions have been created once.
#[derive(Clone, Debug)]
pub struct ReadySignal {
    rx: watch::Receiver<bool>,
}

impl ReadySignal {
    pub(crate) fn channel() -> (watch::Sender<bool>, ReadySignal) {
        let (tx, rx) = watch::channel(false);
        (tx, ReadySignal { rx })
    }

    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the first tick has completed.
    ///
    /// Returns `false` if the watcher stopped before ever completing a tick.
    pub async fn wait(&self) -> bool {
        let mut rx = self.rx.clone();
        let ready = rx.wait_for(|ready| *ready).await.is_ok();
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_after_send() {
        let (tx, ready) = ReadySignal::channel();
        assert!(!ready.is_ready());

        let waiter = ready.clone();
        let task = tokio::spawn(async move { waiter.wait().await });
        tx.send_replace(true);

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("wait should resolve")
            .expect("task should not panic");
        assert!(result);
        assert!(ready.is_ready());
    }

    #[tokio::test]
    async fn test_wait_returns_false_when_sender_dropped() {
        let (tx, ready) = ReadySignal::channel();
        drop(tx);
        assert!(!ready.wait().await);
    }
}
