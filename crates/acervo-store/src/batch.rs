//! Atomic write batches.
//!
//! A [`WriteBatch`] collects record writes and the governance entries that
//! justify them. [`Repository::commit`](crate::Repository::commit) applies
//! the whole batch or nothing.

use acervo_core::{Timestamp, TransactionId};
use acervo_state::{
    DocumentStatus, FinancialStatus, FiscalConfiguration, GovernanceEntry, RightsDocument,
    Transaction, TransactionReferences,
};

/// One record write inside a batch.
///
/// Status changes name the status the caller read. The store applies them
/// only while the stored record still carries that status, and fails the
/// batch with [`StoreError::Conflict`](crate::StoreError::Conflict)
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordWrite {
    /// Persist a newly submitted document.
    InsertDocument(RightsDocument),
    /// Persist a document's new lifecycle. Terms are write-once.
    UpdateDocument {
        /// The document after its transition.
        document: RightsDocument,
        /// Status the stored document must still have.
        expected: DocumentStatus,
    },
    /// Persist a new transaction.
    InsertTransaction(Transaction),
    /// Persist a transaction's new status. Amounts are write-once.
    UpdateTransactionStatus {
        /// The transaction after its transition.
        transaction: Transaction,
        /// Status the stored transaction must still have.
        expected: FinancialStatus,
    },
    /// Set external references on a transaction. `None` fields keep the
    /// stored value; status is never touched.
    AttachTransactionReferences {
        /// Target transaction.
        id: TransactionId,
        /// References to set.
        references: TransactionReferences,
        /// New `updated_at`.
        at: Timestamp,
    },
    /// Create or replace the fiscal configuration singleton.
    PutFiscalConfiguration(FiscalConfiguration),
}

impl RecordWrite {
    /// A document transition guarded on the status it was read with.
    pub fn document_transition(document: RightsDocument, expected: DocumentStatus) -> Self {
        Self::UpdateDocument { document, expected }
    }

    /// A transaction transition guarded on the status it was read with.
    pub fn transaction_transition(transaction: Transaction, expected: FinancialStatus) -> Self {
        Self::UpdateTransactionStatus {
            transaction,
            expected,
        }
    }
}

/// Record writes plus their governance entries, committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<RecordWrite>,
    entries: Vec<GovernanceEntry>,
}

impl WriteBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record write.
    pub fn write(mut self, write: RecordWrite) -> Self {
        self.writes.push(write);
        self
    }

    /// Append a governance entry.
    pub fn record(mut self, entry: GovernanceEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Append a record write in place.
    pub fn push_write(&mut self, write: RecordWrite) {
        self.writes.push(write);
    }

    /// Append a governance entry in place.
    pub fn push_entry(&mut self, entry: GovernanceEntry) {
        self.entries.push(entry);
    }

    /// Record writes, in application order.
    pub fn writes(&self) -> &[RecordWrite] {
        &self.writes
    }

    /// Governance entries, in append order.
    pub fn entries(&self) -> &[GovernanceEntry] {
        &self.entries
    }

    /// Whether the batch carries nothing.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.entries.is_empty()
    }

    /// Split into writes and entries.
    pub fn into_parts(self) -> (Vec<RecordWrite>, Vec<GovernanceEntry>) {
        (self.writes, self.entries)
    }
}
