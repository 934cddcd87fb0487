use std::io;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use stash_events::{EventBus, EventEnvelope};
use stash_inventory::InventoryEvent;

use crate::owner_store::OwnerStore;
use crate::service::InventoryService;

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Periodic decay ticker.
///
/// Runs [`InventoryService::decay_all`] once per interval until shut down.
/// The first tick happens one full interval after spawning.
#[derive(Debug)]
pub struct DecayWorker;

impl DecayWorker {
    pub fn spawn<S, B>(service: Arc<InventoryService<S, B>>, interval: Duration) -> io::Result<WorkerHandle>
    where
        S: OwnerStore + 'static,
        B: EventBus<EventEnvelope<InventoryEvent>> + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name("decay-worker".to_string())
            .spawn(move || worker_loop(&service, interval, shutdown_rx))?;

        info!(interval_ms = interval.as_millis() as u64, "decay worker started");
        Ok(WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }

    /// Spawn with the service's configured interval, or nothing when decay is disabled.
    pub fn from_config<S, B>(service: Arc<InventoryService<S, B>>) -> io::Result<Option<WorkerHandle>>
    where
        S: OwnerStore + 'static,
        B: EventBus<EventEnvelope<InventoryEvent>> + 'static,
    {
        let config = service.config();
        if !config.decay_enabled {
            info!("decay worker disabled");
            return Ok(None);
        }
        let interval = config.decay_interval();
        Self::spawn(service, interval).map(Some)
    }
}

fn worker_loop<S, B>(service: &InventoryService<S, B>, interval: Duration, shutdown_rx: mpsc::Receiver<()>)
where
    S: OwnerStore,
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    loop {
        match shutdown_rx.recv_timeout(interval) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => match service.decay_all() {
                Ok(report) => debug!(changed = report.owners_changed, "decay tick"),
                Err(err) => warn!(error = %err, "decay tick failed"),
            },
        }
    }
    info!("decay worker stopped");
}
