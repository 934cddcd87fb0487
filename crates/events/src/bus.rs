//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is the notification sink for inventory changes. It is used
//! strictly after a mutation was persisted: the owner store is the source of
//! truth, the bus only tells other subsystems that something changed.
//!
//! - **Transport-agnostic**: in-memory channels here, anything else behind the trait
//! - **Fire-and-forget**: no acknowledgement, no retry
//! - **Broadcast**: each subscription receives a copy of every message

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// ```ignore
/// let subscription = bus.subscribe();
///
/// loop {
///     match subscription.recv_timeout(Duration::from_secs(1)) {
///         Ok(envelope) => refresh_ui(envelope),
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
///
/// Subscriptions are meant for single-threaded consumption. Messages arrive in
/// publish order for a single publisher.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain every message currently buffered, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// ```text
/// engine call → owner store (persist) → EventBus (publish) → subscribers
/// ```
///
/// `publish()` can fail (poisoned lock, closed transport). Callers decide
/// whether that matters; the inventory adapters log it and move on, since
/// the persisted record is already authoritative.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
