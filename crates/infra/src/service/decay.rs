use tracing::{info, warn};

use stash_events::{EventBus, EventEnvelope};
use stash_inventory::InventoryEvent;

use crate::owner_store::OwnerStore;

use super::{InventoryService, OwnerRef, ServiceResult};

/// Result of one decay pass over every owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecayReport {
    /// Owners whose collection was ticked (exempt owners are not counted).
    pub owners_visited: usize,
    pub owners_changed: usize,
    pub stacks_expired: usize,
    /// Owners whose record could not be read or written.
    pub owners_failed: usize,
}

impl<S, B> InventoryService<S, B>
where
    S: OwnerStore,
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    /// Advance decay by one tick for every non-exempt owner.
    ///
    /// Each owner is re-read under its lock before ticking. A failing owner
    /// is logged and counted; the pass goes on with the next one.
    pub fn decay_all(&self) -> ServiceResult<DecayReport> {
        let mut report = DecayReport::default();

        for listed in self.store.list()? {
            if listed.decay_exempt {
                continue;
            }
            report.owners_visited += 1;

            let owner = OwnerRef::of(&listed);
            let ticked = self.with_owner(&owner, || {
                let Some(record) = self.store.get(listed.kind, listed.id)? else {
                    return Ok(None);
                };
                let before = record.items.len();
                let version = record.version;
                let saved = self.commit(record, |engine, items, _| Ok((engine.invoke_decay(items), None)))?;
                Ok((saved.version != version).then(|| before - saved.items.len()))
            });

            match ticked {
                Ok(Some(expired)) => {
                    report.owners_changed += 1;
                    report.stacks_expired += expired;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(owner = %listed.id, kind = %listed.kind, error = %err, "decay tick failed for owner");
                    report.owners_failed += 1;
                }
            }
        }

        info!(
            visited = report.owners_visited,
            changed = report.owners_changed,
            expired = report.stacks_expired,
            failed = report.owners_failed,
            "decay pass finished"
        );
        Ok(report)
    }
}
