//! In-memory components.
//!
//! [`InMemoryStateStore`] and [`InMemoryLockManager`] keep their data behind a
//! single `std::sync` lock each. Everything is lost when they are dropped.
//!
//! A poisoned lock is recovered rather than propagated: each operation leaves
//! the guarded value consistent before it can panic, so the data behind a
//! poisoned guard is still valid.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{LockError, LockResult};
use crate::traits::{LockManager, StateStore};
use crate::types::{LockRecord, StateBlob};

#[derive(Debug, Default)]
struct StoreInner {
    current: Option<StateBlob>,
    revision: u64,
}

/// An in-memory implementation of [`StateStore`].
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryStateStore {
    /// Create an empty store at revision 0.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self) -> Option<StateBlob> {
        self.read().current.clone()
    }

    fn put(&self, content: Bytes) -> u64 {
        let mut inner = self.write();
        inner.revision += 1;
        let revision = inner.revision;
        let size = content.len();
        inner.current = Some(StateBlob { content, revision });
        debug!(revision, size, "state replaced");
        revision
    }

    fn delete(&self) -> bool {
        let existed = self.write().current.take().is_some();
        debug!(existed, "state deleted");
        existed
    }

    fn revision(&self) -> u64 {
        self.read().revision
    }

    fn exists(&self) -> bool {
        self.read().current.is_some()
    }
}

/// An in-memory implementation of [`LockManager`].
#[derive(Debug, Default)]
pub struct InMemoryLockManager {
    held: Mutex<Option<LockRecord>>,
}

impl InMemoryLockManager {
    /// Create an unlocked manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Option<LockRecord>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LockManager for InMemoryLockManager {
    fn acquire(&self, record: LockRecord) -> LockResult<()> {
        let mut held = self.guard();
        if let Some(current) = held.as_ref() {
            debug!(held = %current.id, requested = %record.id, "lock acquire rejected");
            return Err(LockError::Conflict {
                held: current.clone(),
            });
        }
        info!(
            lock_id = %record.id,
            operation = %record.operation,
            who = %record.who,
            "lock acquired"
        );
        *held = Some(record);
        Ok(())
    }

    fn release(&self, id: &str) -> LockResult<()> {
        let mut held = self.guard();
        match held.as_ref() {
            None => Err(LockError::NotLocked),
            Some(current) if current.is_held_by(id) => {
                info!(lock_id = %current.id, "lock released");
                *held = None;
                Ok(())
            }
            Some(current) => {
                debug!(held = %current.id, requested = %id, "lock release rejected");
                Err(LockError::Mismatch {
                    held: current.clone(),
                    requested: id.to_string(),
                })
            }
        }
    }

    fn inspect(&self) -> Option<LockRecord> {
        self.guard().clone()
    }

    fn is_locked(&self) -> bool {
        self.guard().is_some()
    }
}
