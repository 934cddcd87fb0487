//! Background workers.

pub mod decay_worker;

pub use decay_worker::{DecayWorker, WorkerHandle};
