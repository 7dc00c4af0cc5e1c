//! Snapshot store trait definition.

use crate::error::SnapshotError;
use crate::types::Snapshot;

/// Whole-object persistence for the cache contents.
///
/// There is no partial update: `persist` always replaces the previous
/// snapshot with the full mapping.
pub trait SnapshotStore: Send + Sync {
    /// Read the stored snapshot. `Ok(None)` when nothing has been stored yet.
    fn restore(&self) -> Result<Option<Snapshot>, SnapshotError>;

    /// Overwrite the stored snapshot.
    fn persist(&self, snapshot: &Snapshot) -> Result<(), SnapshotError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn restore(&self) -> Result<Option<Snapshot>, SnapshotError> {
        (**self).restore()
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        (**self).persist(snapshot)
    }
}
