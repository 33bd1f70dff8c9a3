//! The [`Engine`] facade composing one state store and one lock manager.
//!
//! The engine is what the transport layer holds. It forwards each operation
//! to the component that owns it and, under [`WritePolicy::RequireLock`],
//! checks the supplied lock identifier before a write.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LockError, LockResult, WriteError, WriteResult};
use crate::memory::{InMemoryLockManager, InMemoryStateStore};
use crate::traits::{LockManager, StateStore};
use crate::types::{LockRecord, StateBlob};

/// Whether state writes are gated by lock ownership.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Put and delete ignore the lock entirely.
    #[default]
    Permissive,
    /// While a lock is held, put and delete must present its identifier.
    RequireLock,
}

/// Read-only projection of both components, for health reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub has_state: bool,
    pub is_locked: bool,
    pub revision: u64,
    pub lock: Option<LockRecord>,
}

/// Shared handle over the state store and lock manager.
///
/// Cloning is cheap and every clone sees the same components.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn StateStore>,
    locks: Arc<dyn LockManager>,
    policy: WritePolicy,
}

impl Engine {
    /// Fresh in-memory engine: no state, unlocked, revision 0.
    pub fn new(policy: WritePolicy) -> Self {
        Self::with_components(
            Arc::new(InMemoryStateStore::new()),
            Arc::new(InMemoryLockManager::new()),
            policy,
        )
    }

    pub fn with_components(
        store: Arc<dyn StateStore>,
        locks: Arc<dyn LockManager>,
        policy: WritePolicy,
    ) -> Self {
        Self {
            store,
            locks,
            policy,
        }
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    pub fn get_state(&self) -> Option<StateBlob> {
        self.store.get()
    }

    /// Replace the state and return the new revision.
    ///
    /// `lock_id` is only consulted under [`WritePolicy::RequireLock`].
    pub fn put_state(&self, content: Bytes, lock_id: Option<&str>) -> WriteResult<u64> {
        self.check_write(lock_id)?;
        Ok(self.store.put(content))
    }

    /// Delete the state. Returns whether a blob existed.
    pub fn delete_state(&self, lock_id: Option<&str>) -> WriteResult<bool> {
        self.check_write(lock_id)?;
        Ok(self.store.delete())
    }

    pub fn lock(&self, record: LockRecord) -> LockResult<()> {
        self.locks.acquire(record).inspect_err(|err| {
            if let LockError::Conflict { held } = err {
                warn!(held = %held.id, who = %held.who, "lock requested while held");
            }
        })
    }

    pub fn unlock(&self, id: &str) -> LockResult<()> {
        self.locks.release(id)
    }

    pub fn health(&self) -> HealthSnapshot {
        let lock = self.locks.inspect();
        HealthSnapshot {
            has_state: self.store.exists(),
            is_locked: lock.is_some(),
            revision: self.store.revision(),
            lock,
        }
    }

    // The lock may change between this check and the write; cross-component
    // ordering is not guaranteed.
    fn check_write(&self, lock_id: Option<&str>) -> WriteResult<()> {
        if self.policy == WritePolicy::Permissive {
            return Ok(());
        }
        match self.locks.inspect() {
            Some(held) if lock_id != Some(held.id.as_str()) => {
                debug!(held = %held.id, supplied = ?lock_id, "write rejected");
                Err(WriteError::Locked {
                    held,
                    supplied: lock_id.map(str::to_string),
                })
            }
            _ => Ok(()),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(WritePolicy::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("policy", &self.policy)
            .field("revision", &self.store.revision())
            .field("locked", &self.locks.is_locked())
            .finish()
    }
}
