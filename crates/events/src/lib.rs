//! Inventory change notifications: event contract, envelope and pub/sub bus.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
