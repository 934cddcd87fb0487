//! In-memory event bus for tests/dev.

use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("event bus lock poisoned")]
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Best-effort fan-out
/// - Dead subscribers are dropped on the next publish
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive messages until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}
