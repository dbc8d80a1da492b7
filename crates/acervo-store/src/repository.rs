//! The single persistence abstraction.

use async_trait::async_trait;

use acervo_core::{
    BeneficiaryId, DecisionCategory, DocumentId, ItemId, PersonId, PhotoAssetId, Timestamp,
    TransactionId,
};
use acervo_state::{DocumentStatus, FiscalConfiguration, GovernanceEntry, RightsDocument, Transaction};

use crate::batch::WriteBatch;
use crate::error::StoreError;

/// Which governance entries to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerFilter {
    /// Every entry.
    All,
    /// Entries decided within `[start, end]`, both inclusive.
    Period {
        /// Inclusive lower bound.
        start: Timestamp,
        /// Inclusive upper bound.
        end: Timestamp,
    },
    /// Entries about one entity.
    Entity {
        /// Entity type name.
        entity_type: String,
        /// Entity identifier.
        entity_id: String,
    },
    /// Entries by one actor.
    Actor(String),
    /// Entries of one category.
    Category(DecisionCategory),
}

impl LedgerFilter {
    /// Whether `entry` passes this filter.
    pub fn matches(&self, entry: &GovernanceEntry) -> bool {
        match self {
            Self::All => true,
            Self::Period { start, end } => {
                entry.decided_at() >= *start && entry.decided_at() <= *end
            }
            Self::Entity {
                entity_type,
                entity_id,
            } => entry.entity_type() == entity_type && entry.entity_id() == entity_id,
            Self::Actor(actor_id) => entry.actor_id() == actor_id,
            Self::Category(category) => entry.category() == *category,
        }
    }
}

/// Durable storage for documents, transactions, the fiscal configuration
/// and the governance ledger.
///
/// List reads return records in store insertion order.
#[async_trait]
pub trait Repository: Send + Sync {
    // ── rights documents ─────────────────────────────────────────────

    /// Fetch a document by id.
    async fn document(&self, id: DocumentId) -> Result<Option<RightsDocument>, StoreError>;

    /// Documents linked to an item.
    async fn documents_for_item(&self, item_id: &ItemId) -> Result<Vec<RightsDocument>, StoreError>;

    /// Documents linked directly to a photo asset.
    async fn documents_for_photo(
        &self,
        photo_asset_id: &PhotoAssetId,
    ) -> Result<Vec<RightsDocument>, StoreError>;

    /// Documents by author.
    async fn documents_by_author(&self, author_id: &PersonId)
        -> Result<Vec<RightsDocument>, StoreError>;

    /// Documents in a given status.
    async fn documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> Result<Vec<RightsDocument>, StoreError>;

    /// `Validated` documents whose expiry lies strictly before `now`.
    async fn documents_due_for_expiry(
        &self,
        now: Timestamp,
    ) -> Result<Vec<RightsDocument>, StoreError>;

    // ── transactions ─────────────────────────────────────────────────

    /// Fetch a transaction by id.
    async fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// A beneficiary's transactions in creation order.
    async fn transactions_for_beneficiary(
        &self,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<Vec<Transaction>, StoreError>;

    // ── fiscal configuration ─────────────────────────────────────────

    /// The singleton, or `None` when not yet configured.
    async fn fiscal_configuration(&self) -> Result<Option<FiscalConfiguration>, StoreError>;

    // ── governance ledger ────────────────────────────────────────────

    /// Governance entries passing `filter`, in insertion order.
    async fn governance_entries(&self, filter: &LedgerFilter)
        -> Result<Vec<GovernanceEntry>, StoreError>;

    // ── writes ───────────────────────────────────────────────────────

    /// Apply every write and append every entry in `batch`, or none of them.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
