//! The [`StateStore`] and [`LockManager`] component interfaces.
//!
//! The engine composes one of each. Implementations must be thread-safe and
//! execute every operation atomically with respect to all other operations on
//! the same component. No ordering is implied between the two components.

use bytes::Bytes;

use crate::error::LockResult;
use crate::types::{LockRecord, StateBlob};

/// Holder of the single state blob.
///
/// The store never fails: absence is reported through return values, and
/// content is stored without looking at it.
pub trait StateStore: Send + Sync {
    /// Read the current blob.
    ///
    /// Returns `None` when no state has been written, or after a delete.
    fn get(&self) -> Option<StateBlob>;

    /// Replace (or create) the blob and return the revision it was stored at.
    ///
    /// Prior content is overwritten irrecoverably.
    fn put(&self, content: Bytes) -> u64;

    /// Clear the blob. Returns `true` if one existed before the call.
    fn delete(&self) -> bool;

    /// The revision counter: number of successful puts over the store's
    /// lifetime. Not reset by delete.
    fn revision(&self) -> u64;

    /// Whether a blob currently exists.
    fn exists(&self) -> bool {
        self.get().is_some()
    }
}

/// Holder of the single advisory lock.
///
/// Two states: unlocked (initial) and locked with a record. Rejections never
/// change the state.
pub trait LockManager: Send + Sync {
    /// Take the lock with `record`.
    ///
    /// Fails with [`LockError::Conflict`](crate::LockError::Conflict) carrying
    /// the currently held record if any lock is held, regardless of the new
    /// record's identifier. The new record is dropped in that case.
    fn acquire(&self, record: LockRecord) -> LockResult<()>;

    /// Release the lock identified by `id`.
    ///
    /// Fails with [`LockError::NotLocked`](crate::LockError::NotLocked) when
    /// nothing is held and [`LockError::Mismatch`](crate::LockError::Mismatch)
    /// when `id` is not exactly the held record's identifier.
    fn release(&self, id: &str) -> LockResult<()>;

    /// The currently held record, if any.
    fn inspect(&self) -> Option<LockRecord>;

    /// Whether a lock is currently held.
    fn is_locked(&self) -> bool {
        self.inspect().is_some()
    }
}
