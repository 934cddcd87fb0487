//! Versioned records and optimistic concurrency expectations.

use crate::error::{DomainError, DomainResult};

/// A persisted document that carries a monotonically increasing version.
///
/// Owner records use this to detect lost updates when two writers fetch the
/// same snapshot and both try to persist a mutation.
pub trait VersionedRecord {
    /// Strongly-typed record identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the record identifier.
    fn id(&self) -> &Self::Id;

    /// Version of the stored document (+1 per successful write).
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (migrations, administrative overwrites).
    Any,
    /// Require the stored document to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
