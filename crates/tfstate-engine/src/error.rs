//! Rejection outcomes of lock operations and guarded writes.
//!
//! Reading or deleting absent state is not an error and has no variant here;
//! the store reports absence through its return values.

use thiserror::Error;

use crate::types::LockRecord;

/// Why a lock operation was rejected.
///
/// `Conflict` comes only from acquire; `Mismatch` and `NotLocked` come only
/// from release. Every variant leaves the lock state untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LockError {
    /// Acquire while another lock is held. Carries the record that is held.
    #[error("state is locked by {} (lock ID: {}, operation: {})", .held.who, .held.id, .held.operation)]
    Conflict { held: LockRecord },

    /// Release with an identifier that does not match the held lock.
    #[error("lock ID mismatch: held {}, got {requested:?}", .held.id)]
    Mismatch { held: LockRecord, requested: String },

    /// Release while no lock is held.
    #[error("state is not locked")]
    NotLocked,
}

impl LockError {
    /// The record currently holding the resource, if the error carries one.
    pub fn held(&self) -> Option<&LockRecord> {
        match self {
            Self::Conflict { held } | Self::Mismatch { held, .. } => Some(held),
            Self::NotLocked => None,
        }
    }
}

/// A state write refused under [`WritePolicy::RequireLock`](crate::WritePolicy::RequireLock).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("state is locked by {} (lock ID: {}); write supplied {supplied:?}", .held.who, .held.id)]
    Locked {
        held: LockRecord,
        supplied: Option<String>,
    },
}

impl WriteError {
    pub fn held(&self) -> &LockRecord {
        match self {
            Self::Locked { held, .. } => held,
        }
    }
}

pub type LockResult<T> = Result<T, LockError>;

pub type WriteResult<T> = Result<T, WriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_display_names_holder() {
        let held = LockRecord::new("lock-1", "apply").with_who("alice@host");
        let err = LockError::Conflict { held };
        assert_eq!(
            err.to_string(),
            "state is locked by alice@host (lock ID: lock-1, operation: apply)"
        );
    }

    #[test]
    fn held_projection() {
        let held = LockRecord::new("lock-1", "apply");
        let err = LockError::Mismatch {
            held: held.clone(),
            requested: "lock-2".into(),
        };
        assert_eq!(err.held(), Some(&held));
        assert!(err.to_string().contains("\"lock-2\""));
        assert_eq!(LockError::NotLocked.held(), None);
    }

    #[test]
    fn write_error_carries_holder() {
        let held = LockRecord::new("lock-1", "apply");
        let err = WriteError::Locked {
            held: held.clone(),
            supplied: None,
        };
        assert_eq!(err.held(), &held);
        assert!(err.to_string().contains("None"));
    }
}
