//! Trailing-edge value debouncing.
//!
//! [`Debounced`] throttles a rapidly-changing input (a search box) down to
//! the values that survive a quiet period. Every [`Debounced::set`]
//! restarts the timer; only a timer that runs to completion publishes its
//! value, so a superseded update can never land after a newer one.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A trailing-debounced copy of a value.
///
/// `set` records a candidate value; after `delay` without another `set`,
/// the candidate is published to `current()` and to all subscribers.
pub struct Debounced<T> {
    delay: Duration,
    tx: watch::Sender<T>,
    // Held so publishing never fails while the host has no subscriber.
    _rx: watch::Receiver<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Clone + Send + Sync + 'static> Debounced<T> {
    /// Creates a debouncer that starts out already publishing `initial`.
    pub fn new(initial: T, delay: Duration) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self {
            delay,
            tx,
            _rx: rx,
            pending: Mutex::new(None),
        }
    }

    /// Records a new candidate value, restarting the quiet-period timer.
    ///
    /// The previous pending timer (if any) is cancelled before the new one
    /// starts, so at most one publish is ever outstanding.
    pub fn set(&self, value: T) {
        let tx = self.tx.clone();
        let delay = self.delay;

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(prev) = pending.take() {
            prev.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value);
        }));
    }

    /// Returns the last published value.
    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Subscribes to published values.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T> Drop for Debounced<T> {
    fn drop(&mut self) {
        if let Some(pending) = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_publishes_after_quiet_period() {
        let debounced = Debounced::new(String::new(), Duration::from_millis(40));

        debounced.set("chairs".to_string());
        assert_eq!(debounced.current(), "");

        sleep(Duration::from_millis(120)).await;
        assert_eq!(debounced.current(), "chairs");
    }

    #[tokio::test]
    async fn test_superseded_set_never_publishes() {
        let debounced = Debounced::new("initial".to_string(), Duration::from_millis(80));

        debounced.set("stale".to_string());
        sleep(Duration::from_millis(30)).await;
        debounced.set("fresh".to_string());

        // The stale timer would have fired by now if it had not been cancelled.
        sleep(Duration::from_millis(30)).await;
        assert_eq!(debounced.current(), "initial");

        sleep(Duration::from_millis(150)).await;
        assert_eq!(debounced.current(), "fresh");
    }

    #[tokio::test]
    async fn test_subscriber_sees_published_value() {
        let debounced = Debounced::new(0u32, Duration::from_millis(20));
        let mut rx = debounced.subscribe();

        debounced.set(7);
        rx.changed().await.unwrap();

        assert_eq!(*rx.borrow(), 7);
    }
}
