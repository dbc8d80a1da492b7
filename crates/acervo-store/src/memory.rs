//! In-memory repository and catalog.
//!
//! All state sits behind one `parking_lot::RwLock`, which is never held
//! across an `.await`. A commit stages the batch on a copy of the tables and
//! swaps it in only if every write succeeds, so a failed batch leaves no
//! trace.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use acervo_core::{
    BeneficiaryId, DocumentId, ItemId, PersonId, PhotoAssetId, RecordKind, Timestamp,
    TransactionId,
};
use acervo_state::{DocumentStatus, FiscalConfiguration, GovernanceEntry, RightsDocument, Transaction};

use crate::batch::{RecordWrite, WriteBatch};
use crate::catalog::{ArchiveCatalog, Beneficiary, CatalogItem};
use crate::error::StoreError;
use crate::repository::{LedgerFilter, Repository};

#[derive(Debug, Clone, Default)]
struct Tables {
    documents: Vec<RightsDocument>,
    transactions: Vec<Transaction>,
    fiscal: Option<FiscalConfiguration>,
    ledger: Vec<GovernanceEntry>,
}

impl Tables {
    fn apply(&mut self, write: RecordWrite) -> Result<(), StoreError> {
        match write {
            RecordWrite::InsertDocument(doc) => {
                if self.documents.iter().any(|d| d.id() == doc.id()) {
                    return Err(StoreError::Duplicate {
                        kind: RecordKind::Document,
                        id: doc.id().to_string(),
                    });
                }
                self.documents.push(doc);
            }
            RecordWrite::UpdateDocument { document, expected } => {
                let id = document.id().to_string();
                let slot = self
                    .documents
                    .iter_mut()
                    .find(|d| d.id() == document.id())
                    .ok_or_else(|| StoreError::Missing {
                        kind: RecordKind::Document,
                        id: id.clone(),
                    })?;
                if slot.terms() != document.terms() {
                    return Err(StoreError::ImmutableRecord {
                        kind: RecordKind::Document,
                        id,
                    });
                }
                if slot.status() != expected {
                    return Err(StoreError::Conflict {
                        kind: RecordKind::Document,
                        id,
                        expected: expected.as_str().to_string(),
                        found: slot.status().as_str().to_string(),
                    });
                }
                *slot = document;
            }
            RecordWrite::InsertTransaction(tx) => {
                if self.transactions.iter().any(|t| t.id() == tx.id()) {
                    return Err(StoreError::Duplicate {
                        kind: RecordKind::Transaction,
                        id: tx.id().to_string(),
                    });
                }
                self.transactions.push(tx);
            }
            RecordWrite::UpdateTransactionStatus {
                transaction,
                expected,
            } => {
                let id = transaction.id().to_string();
                let slot = self.transaction_slot(transaction.id())?;
                if !slot.same_fixed_fields(&transaction) {
                    return Err(StoreError::ImmutableRecord {
                        kind: RecordKind::Transaction,
                        id,
                    });
                }
                if slot.status() != expected {
                    return Err(StoreError::Conflict {
                        kind: RecordKind::Transaction,
                        id,
                        expected: expected.as_str().to_string(),
                        found: slot.status().as_str().to_string(),
                    });
                }
                slot.adopt_status(&transaction);
            }
            RecordWrite::AttachTransactionReferences { id, references, at } => {
                self.transaction_slot(id)?.merge_references(&references, at);
            }
            RecordWrite::PutFiscalConfiguration(config) => {
                self.fiscal = Some(config);
            }
        }
        Ok(())
    }

    fn transaction_slot(&mut self, id: TransactionId) -> Result<&mut Transaction, StoreError> {
        self.transactions
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| StoreError::Missing {
                kind: RecordKind::Transaction,
                id: id.to_string(),
            })
    }

    fn append(&mut self, entry: GovernanceEntry) -> Result<(), StoreError> {
        if self.ledger.iter().any(|e| e.id() == entry.id()) {
            return Err(StoreError::Duplicate {
                kind: RecordKind::GovernanceEntry,
                id: entry.id().to_string(),
            });
        }
        self.ledger.push(entry);
        Ok(())
    }
}

/// Thread-safe, cloneable in-memory [`Repository`].
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while set, every read and commit fails with
    /// [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of governance entries held.
    pub fn ledger_len(&self) -> usize {
        self.tables.read().ledger.len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }

    fn select_documents(
        &self,
        pred: impl Fn(&RightsDocument) -> bool,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().documents.iter().filter(|d| pred(d)).cloned().collect())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn document(&self, id: DocumentId) -> Result<Option<RightsDocument>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().documents.iter().find(|d| d.id() == id).cloned())
    }

    async fn documents_for_item(&self, item_id: &ItemId) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents(|d| d.item_id() == Some(item_id))
    }

    async fn documents_for_photo(
        &self,
        photo_asset_id: &PhotoAssetId,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents(|d| d.photo_asset_id() == Some(photo_asset_id))
    }

    async fn documents_by_author(
        &self,
        author_id: &PersonId,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents(|d| &d.terms().author_id == author_id)
    }

    async fn documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents(|d| d.status() == status)
    }

    async fn documents_due_for_expiry(
        &self,
        now: Timestamp,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents(|d| d.is_due_for_expiry(now))
    }

    async fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().transactions.iter().find(|t| t.id() == id).cloned())
    }

    async fn transactions_for_beneficiary(
        &self,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<Vec<Transaction>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .transactions
            .iter()
            .filter(|t| t.beneficiary_id() == beneficiary_id)
            .cloned()
            .collect())
    }

    async fn fiscal_configuration(&self) -> Result<Option<FiscalConfiguration>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().fiscal.clone())
    }

    async fn governance_entries(
        &self,
        filter: &LedgerFilter,
    ) -> Result<Vec<GovernanceEntry>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .ledger
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.check_available()?;
        let (writes, entries) = batch.into_parts();
        let mut guard = self.tables.write();
        let mut staged = guard.clone();
        for write in writes {
            staged.apply(write)?;
        }
        for entry in entries {
            staged.append(entry)?;
        }
        *guard = staged;
        Ok(())
    }
}

// ─── Catalog ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CatalogData {
    items: HashMap<ItemId, CatalogItem>,
    beneficiaries: HashMap<BeneficiaryId, Beneficiary>,
}

/// Cloneable in-memory [`ArchiveCatalog`], populated by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    data: Arc<RwLock<CatalogData>>,
}

impl InMemoryCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item.
    pub fn put_item(&self, item: CatalogItem) {
        self.data.write().items.insert(item.id.clone(), item);
    }

    /// Insert or replace a beneficiary.
    pub fn put_beneficiary(&self, beneficiary: Beneficiary) {
        self.data
            .write()
            .beneficiaries
            .insert(beneficiary.id.clone(), beneficiary);
    }
}

#[async_trait]
impl ArchiveCatalog for InMemoryCatalog {
    async fn item(&self, id: &ItemId) -> Result<Option<CatalogItem>, StoreError> {
        Ok(self.data.read().items.get(id).cloned())
    }

    async fn beneficiary(&self, id: &BeneficiaryId) -> Result<Option<Beneficiary>, StoreError> {
        Ok(self.data.read().beneficiaries.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use acervo_core::{
        ActorContext, DecisionCategory, DocumentKind, LicenseType, LicenseeId, Money, Percentage,
    };
    use acervo_state::{
        Decision, DocumentTerms, FinancialStatus, LicenseProposal, TransactionReferences,
    };

    fn terms(item: &str) -> DocumentTerms {
        DocumentTerms {
            kind: DocumentKind::AssignmentOfImageRights,
            description: "cessão de imagem".into(),
            item_id: Some(ItemId::new(item)),
            photo_asset_id: None,
            person_ids: BTreeSet::new(),
            author_id: PersonId::new("author-1"),
            author_name: "Autor".into(),
            artifact_url: None,
            artifact_hash: None,
            signature_validated: true,
            permits_commercial_use: true,
            permitted_purposes: BTreeSet::new(),
            permitted_territories: BTreeSet::new(),
            usage_restrictions: None,
            expires_at: None,
        }
    }

    fn entry(label: &str) -> GovernanceEntry {
        GovernanceEntry::new(
            Decision::new(DecisionCategory::Legal, "rights_document", "d", label),
            &ActorContext::system(),
            Timestamp::now(),
        )
    }

    fn transaction() -> Transaction {
        let config = FiscalConfiguration::new(
            Percentage::parse("0.85").unwrap(),
            Percentage::parse("0.15").unwrap(),
            None,
            "admin",
            Timestamp::now(),
        );
        Transaction::settle(
            LicenseProposal::new(
                ItemId::new("item-1"),
                BeneficiaryId::new("b-1"),
                LicenseeId::new("l-1"),
                LicenseType::Editorial,
            ),
            config.split(Money::parse("100").unwrap()).unwrap(),
            "pix",
            Timestamp::now(),
        )
        .unwrap()
    }

    // ── commit atomicity ─────────────────────────────────────────────

    #[tokio::test]
    async fn commit_applies_writes_and_entries_together() {
        let repo = InMemoryRepository::new();
        let doc = RightsDocument::submit(terms("item-1"), Timestamp::now()).unwrap();
        repo.commit(
            WriteBatch::new()
                .write(RecordWrite::InsertDocument(doc.clone()))
                .record(entry("DOCUMENT_REGISTERED")),
        )
        .await
        .unwrap();
        assert_eq!(repo.document(doc.id()).await.unwrap(), Some(doc));
        assert_eq!(repo.ledger_len(), 1);
    }

    #[tokio::test]
    async fn failed_write_discards_whole_batch() {
        let repo = InMemoryRepository::new();
        let doc = RightsDocument::submit(terms("item-1"), Timestamp::now()).unwrap();
        // The update targets a document that was never inserted.
        let err = repo
            .commit(
                WriteBatch::new()
                    .write(RecordWrite::document_transition(doc, DocumentStatus::PendingReview))
                    .record(entry("DOCUMENT_VALIDATED")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
        assert_eq!(repo.ledger_len(), 0);
    }

    #[tokio::test]
    async fn outage_fails_reads_and_commits() {
        let repo = InMemoryRepository::new();
        repo.set_unavailable(true);
        assert!(matches!(
            repo.fiscal_configuration().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(repo.commit(WriteBatch::new().record(entry("X"))).await.is_err());
        repo.set_unavailable(false);
        assert_eq!(repo.ledger_len(), 0);
    }

    // ── immutability ─────────────────────────────────────────────────

    #[tokio::test]
    async fn transaction_update_keeps_amounts_fixed() {
        let repo = InMemoryRepository::new();
        let tx = transaction();
        repo.commit(WriteBatch::new().write(RecordWrite::InsertTransaction(tx.clone())))
            .await
            .unwrap();

        let mut reversed = tx.clone();
        reversed.reverse(Timestamp::now()).unwrap();
        repo.commit(WriteBatch::new().write(RecordWrite::transaction_transition(
            reversed,
            FinancialStatus::Settled,
        )))
        .await
        .unwrap();

        // A different transaction reusing the id differs in fixed fields.
        let impostor = Transaction::restore(
            tx.id(),
            LicenseProposal::new(
                ItemId::new("item-1"),
                BeneficiaryId::new("b-1"),
                LicenseeId::new("l-1"),
                LicenseType::Commercial,
            ),
            *tx.split(),
            "pix".into(),
            FinancialStatus::Settled,
            None,
            tx.created_at(),
            tx.updated_at(),
        )
        .unwrap();
        let err = repo
            .commit(WriteBatch::new().write(RecordWrite::transaction_transition(
                impostor,
                FinancialStatus::Reversed,
            )))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ImmutableRecord { .. }));
    }

    // ── guarded status updates ───────────────────────────────────────

    #[tokio::test]
    async fn stale_document_review_is_a_conflict() {
        let repo = InMemoryRepository::new();
        let doc = RightsDocument::submit(terms("item-1"), Timestamp::now()).unwrap();
        repo.commit(WriteBatch::new().write(RecordWrite::InsertDocument(doc.clone())))
            .await
            .unwrap();

        let mut rejected = doc.clone();
        rejected.reject("juridico-1", None, Timestamp::now()).unwrap();
        let mut validated = doc.clone();
        validated.validate("juridico-2", None, Timestamp::now()).unwrap();

        repo.commit(
            WriteBatch::new()
                .write(RecordWrite::document_transition(rejected, DocumentStatus::PendingReview))
                .record(entry("DOCUMENT_REJECTED")),
        )
        .await
        .unwrap();
        let err = repo
            .commit(
                WriteBatch::new()
                    .write(RecordWrite::document_transition(validated, DocumentStatus::PendingReview))
                    .record(entry("DOCUMENT_VALIDATED")),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Conflict { ref expected, ref found, .. }
                if expected == "PENDING_REVIEW" && found == "REJECTED"
        ));
        let stored = repo.document(doc.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), DocumentStatus::Rejected);
        assert_eq!(repo.ledger_len(), 1);
    }

    #[tokio::test]
    async fn stale_transaction_transition_is_a_conflict() {
        let repo = InMemoryRepository::new();
        let tx = transaction();
        repo.commit(WriteBatch::new().write(RecordWrite::InsertTransaction(tx.clone())))
            .await
            .unwrap();
        let mut reversed = tx.clone();
        reversed.reverse(Timestamp::now()).unwrap();
        repo.commit(WriteBatch::new().write(RecordWrite::transaction_transition(
            reversed.clone(),
            FinancialStatus::Settled,
        )))
        .await
        .unwrap();

        let err = repo
            .commit(WriteBatch::new().write(RecordWrite::transaction_transition(
                reversed,
                FinancialStatus::Settled,
            )))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn references_do_not_undo_a_reversal() {
        let repo = InMemoryRepository::new();
        let tx = transaction();
        repo.commit(WriteBatch::new().write(RecordWrite::InsertTransaction(tx.clone())))
            .await
            .unwrap();

        // Both writers read the settled record before either commits.
        let mut reversed = tx.clone();
        reversed.reverse(Timestamp::now()).unwrap();
        repo.commit(WriteBatch::new().write(RecordWrite::transaction_transition(
            reversed,
            FinancialStatus::Settled,
        )))
        .await
        .unwrap();
        repo.commit(WriteBatch::new().write(RecordWrite::AttachTransactionReferences {
            id: tx.id(),
            references: TransactionReferences {
                gateway_reference: None,
                receipt_reference: Some("receipts/001.pdf".into()),
            },
            at: Timestamp::now(),
        }))
        .await
        .unwrap();

        let stored = repo.transaction(tx.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), FinancialStatus::Reversed);
        assert_eq!(stored.references().receipt_reference.as_deref(), Some("receipts/001.pdf"));
    }

    #[tokio::test]
    async fn status_update_keeps_references_written_meanwhile() {
        let repo = InMemoryRepository::new();
        let tx = transaction();
        repo.commit(WriteBatch::new().write(RecordWrite::InsertTransaction(tx.clone())))
            .await
            .unwrap();
        let mut reversed = tx.clone();
        reversed.reverse(Timestamp::now()).unwrap();

        repo.commit(WriteBatch::new().write(RecordWrite::AttachTransactionReferences {
            id: tx.id(),
            references: TransactionReferences {
                gateway_reference: Some("gw-9".into()),
                receipt_reference: None,
            },
            at: Timestamp::now(),
        }))
        .await
        .unwrap();
        repo.commit(WriteBatch::new().write(RecordWrite::transaction_transition(
            reversed,
            FinancialStatus::Settled,
        )))
        .await
        .unwrap();

        let stored = repo.transaction(tx.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), FinancialStatus::Reversed);
        assert_eq!(stored.references().gateway_reference.as_deref(), Some("gw-9"));
    }

    #[tokio::test]
    async fn references_for_unknown_transaction_are_missing() {
        let repo = InMemoryRepository::new();
        let err = repo
            .commit(WriteBatch::new().write(RecordWrite::AttachTransactionReferences {
                id: TransactionId::new(),
                references: TransactionReferences::default(),
                at: Timestamp::now(),
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let repo = InMemoryRepository::new();
        let tx = transaction();
        repo.commit(WriteBatch::new().write(RecordWrite::InsertTransaction(tx.clone())))
            .await
            .unwrap();
        let err = repo
            .commit(WriteBatch::new().write(RecordWrite::InsertTransaction(tx)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    // ── queries ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn ledger_reads_preserve_insertion_order() {
        let repo = InMemoryRepository::new();
        for label in ["A", "B", "C"] {
            repo.commit(WriteBatch::new().record(entry(label))).await.unwrap();
        }
        let labels: Vec<String> = repo
            .governance_entries(&LedgerFilter::All)
            .await
            .unwrap()
            .iter()
            .map(|e| e.decision().to_string())
            .collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn document_queries_filter_by_link() {
        let repo = InMemoryRepository::new();
        let a = RightsDocument::submit(terms("item-a"), Timestamp::now()).unwrap();
        let b = RightsDocument::submit(terms("item-b"), Timestamp::now()).unwrap();
        repo.commit(
            WriteBatch::new()
                .write(RecordWrite::InsertDocument(a.clone()))
                .write(RecordWrite::InsertDocument(b)),
        )
        .await
        .unwrap();
        let found = repo.documents_for_item(&ItemId::new("item-a")).await.unwrap();
        assert_eq!(found, vec![a]);
        assert_eq!(
            repo.documents_by_status(DocumentStatus::PendingReview).await.unwrap().len(),
            2
        );
        assert_eq!(
            repo.documents_by_author(&PersonId::new("author-1")).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn catalog_lookup() {
        let catalog = InMemoryCatalog::new();
        catalog.put_item(CatalogItem {
            id: ItemId::new("item-1"),
            title: "Final de 1970".into(),
            base_price: Money::parse("1000.00").unwrap(),
            available_for_licensing: true,
        });
        assert!(catalog.item(&ItemId::new("item-1")).await.unwrap().is_some());
        assert!(catalog.item(&ItemId::new("nope")).await.unwrap().is_none());
        assert!(catalog.beneficiary(&BeneficiaryId::new("b")).await.unwrap().is_none());
    }
}
