use std::fmt;

use stashdb_core::PerformerId;
use stashdb_storage::StorageError;
use thiserror::Error;

/// Which side of an edit a missing performer was referenced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRole {
    Target,
    MergeSource,
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => f.write_str("target"),
            Self::MergeSource => f.write_str("merge source"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict on performer {performer_id}: {reason}")]
    Conflict {
        performer_id: PerformerId,
        reason: String,
    },

    #[error("{role} performer not found: {performer_id}")]
    NotFound {
        role: EntityRole,
        performer_id: PerformerId,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
