//! Store-level errors and their mapping into [`AcervoError`].

use acervo_core::{AcervoError, RecordKind};
use thiserror::Error;

/// Errors raised by a [`Repository`](crate::Repository) or
/// [`ArchiveCatalog`](crate::ArchiveCatalog).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An insert collided with an existing record.
    #[error("{kind} {id} already exists")]
    Duplicate {
        /// Record kind.
        kind: RecordKind,
        /// Record identifier.
        id: String,
    },

    /// An update targeted a record that does not exist.
    #[error("{kind} {id} does not exist")]
    Missing {
        /// Record kind.
        kind: RecordKind,
        /// Record identifier.
        id: String,
    },

    /// An update tried to change a write-once field.
    #[error("{kind} {id}: write-once fields cannot change")]
    ImmutableRecord {
        /// Record kind.
        kind: RecordKind,
        /// Record identifier.
        id: String,
    },

    /// A guarded update found the record in a different status than the
    /// caller read: another writer changed it in between.
    #[error("{kind} {id} changed concurrently: expected status {expected}, found {found}")]
    Conflict {
        /// Record kind.
        kind: RecordKind,
        /// Record identifier.
        id: String,
        /// Status the writer read.
        expected: String,
        /// Status actually stored.
        found: String,
    },

    /// A stored row could not be mapped back into a record.
    #[error("corrupt {kind} row {id}: {reason}")]
    Corrupt {
        /// Record kind.
        kind: RecordKind,
        /// Row identifier.
        id: String,
        /// What failed to parse.
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn corrupt(kind: RecordKind, id: impl ToString, reason: impl ToString) -> Self {
        Self::Corrupt {
            kind,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Unavailable(format!("migration failed: {err}"))
    }
}

impl From<StoreError> for AcervoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AcervoError::StoreUnavailable(msg),
            StoreError::Missing { kind, id } => AcervoError::NotFound { kind, id },
            other @ (StoreError::Duplicate { .. }
            | StoreError::ImmutableRecord { .. }
            | StoreError::Conflict { .. }
            | StoreError::Corrupt { .. }) => AcervoError::InvalidState(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_maps_to_store_unavailable() {
        let err: AcervoError = StoreError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, AcervoError::StoreUnavailable(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn missing_maps_to_not_found() {
        let err: AcervoError = StoreError::Missing {
            kind: RecordKind::Transaction,
            id: "t-1".into(),
        }
        .into();
        assert!(matches!(
            err,
            AcervoError::NotFound {
                kind: RecordKind::Transaction,
                ..
            }
        ));
    }

    #[test]
    fn immutable_maps_to_invalid_state() {
        let err: AcervoError = StoreError::ImmutableRecord {
            kind: RecordKind::Transaction,
            id: "t-1".into(),
        }
        .into();
        assert!(matches!(err, AcervoError::InvalidState(_)));
        assert!(err.to_string().contains("write-once"));
    }

    #[test]
    fn conflict_maps_to_invalid_state() {
        let err: AcervoError = StoreError::Conflict {
            kind: RecordKind::Document,
            id: "d-1".into(),
            expected: "PENDING_REVIEW".into(),
            found: "REJECTED".into(),
        }
        .into();
        assert!(matches!(err, AcervoError::InvalidState(_)));
        assert!(!err.is_transient());
        assert!(err.to_string().contains("found REJECTED"));
    }
}
