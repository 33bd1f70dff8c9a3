//! Core data types held by the engine.
//!
//! A [`StateBlob`] is the opaque state document owned by the client tool. A
//! [`LockRecord`] describes the exclusive hold a client has over the
//! resource. Both are plain values; the components that own them decide when
//! they are created, replaced and destroyed.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The current state document and the revision it was written at.
///
/// The content is never parsed or validated. Cloning is cheap: the content
/// is reference-counted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBlob {
    /// Raw content exactly as the client sent it.
    pub content: Bytes,
    /// Revision assigned by the store when this content was written.
    pub revision: u64,
}

impl StateBlob {
    pub fn new(content: impl Into<Bytes>, revision: u64) -> Self {
        Self {
            content: content.into(),
            revision,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// An exclusive hold on the resource.
///
/// Field names on the wire follow Terraform's `LockInfo` JSON document. All
/// string fields are free-form; the identifier is the only one the engine
/// ever looks at, and only to compare it for equality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Caller-chosen opaque identifier. The sole token accepted for release.
    #[serde(rename = "ID", default)]
    pub id: String,

    /// What the caller intends to do while holding the lock (e.g. "OperationTypeApply").
    #[serde(rename = "Operation", default)]
    pub operation: String,

    /// Extra human-readable information.
    #[serde(rename = "Info", default)]
    pub info: String,

    /// Holder identity, usually `user@host`.
    #[serde(rename = "Who", default)]
    pub who: String,

    /// Version of the client tool that took the lock.
    #[serde(rename = "Version", default)]
    pub version: String,

    /// When the lock was created.
    ///
    /// Kept as an instant, not as the client's text: a `+02:00` offset is
    /// normalized to UTC and sub-second digits are re-rendered when the
    /// record is echoed back.
    #[serde(rename = "Created", default = "Utc::now")]
    pub created: DateTime<Utc>,

    /// Path of the state the lock refers to, when the client supplies one.
    #[serde(rename = "Path", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl LockRecord {
    /// Create a record with the given identifier and operation, stamped now.
    pub fn new(id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operation: operation.into(),
            info: String::new(),
            who: String::new(),
            version: String::new(),
            created: Utc::now(),
            path: None,
        }
    }

    pub fn with_who(mut self, who: impl Into<String>) -> Self {
        self.who = who.into();
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Whether `id` is the token that releases this lock.
    pub fn is_held_by(&self, id: &str) -> bool {
        self.id == id
    }
}
