//! State-and-lock engine for a Terraform HTTP remote-state backend.
//!
//! One logical resource: an opaque state blob plus an advisory lock that
//! serializes concurrent plan/apply runs against it.
//!
//! # Components
//!
//! - [`StateStore`] -- the current blob (or nothing) and a revision counter
//! - [`LockManager`] -- at most one [`LockRecord`], with conflict detection
//! - [`Engine`] -- the shared handle the transport holds, composing both
//!
//! # Rules
//!
//! 1. The store never inspects content and never fails; absence is `None`.
//! 2. Acquire succeeds only when nothing is held. There is no queueing.
//! 3. Only the exact held identifier releases a lock.
//! 4. Rejections never mutate state.
//! 5. Writes are independent of the lock unless [`WritePolicy::RequireLock`]
//!    is selected.
//! 6. Nothing persists past the process.

pub mod engine;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use engine::{Engine, HealthSnapshot, WritePolicy};
pub use error::{LockError, LockResult, WriteError, WriteResult};
pub use memory::{InMemoryLockManager, InMemoryStateStore};
pub use traits::{LockManager, StateStore};
pub use types::{LockRecord, StateBlob};
