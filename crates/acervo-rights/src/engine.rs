//! # Authorization Engine
//!
//! ## Decision rules
//!
//! - An item is licensable iff at least one document linked to it permits
//!   licensing. Zero documents means not licensable. Conflicting documents
//!   use OR semantics: the most permissive valid document wins.
//! - A photo asset with directly linked documents is decided by those
//!   documents alone. Only a photo with none falls back to its item.
//! - Purpose and territory checks look only at permitting documents; an
//!   empty permitted set means unrestricted.
//!
//! The query operations never write. Reviewer actions and the sweep commit
//! the document change and its governance entry in one batch.

use std::sync::Arc;

use acervo_core::{
    AcervoError, ActorContext, DecisionCategory, DocumentId, ItemId, PersonId, PhotoAssetId,
    Purpose, RecordKind, Territory, Timestamp,
};
use acervo_governance::GovernanceLedger;
use acervo_state::{Decision, DocumentStatus, DocumentTerms, RightsDocument};
use acervo_store::{RecordWrite, Repository, WriteBatch};

use crate::policy::ExpiryAuditPolicy;

/// Entity type name under which documents appear in the ledger.
pub const DOCUMENT_ENTITY: &str = "rights_document";

/// Ledger labels for document decisions.
pub mod labels {
    /// A document was submitted for review.
    pub const REGISTERED: &str = "DOCUMENT_REGISTERED";
    /// A reviewer accepted a document.
    pub const VALIDATED: &str = "DOCUMENT_VALIDATED";
    /// A reviewer refused a document.
    pub const REJECTED: &str = "DOCUMENT_REJECTED";
    /// The sweep lapsed a document past its expiry.
    pub const EXPIRED: &str = "DOCUMENT_EXPIRED";
}

/// Decides licensing eligibility from rights documents.
#[derive(Clone)]
pub struct AuthorizationEngine {
    repo: Arc<dyn Repository>,
    expiry_policy: ExpiryAuditPolicy,
}

impl std::fmt::Debug for AuthorizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationEngine")
            .field("expiry_policy", &self.expiry_policy)
            .finish_non_exhaustive()
    }
}

impl AuthorizationEngine {
    /// Engine over `repo` with the default expiry policy.
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            expiry_policy: ExpiryAuditPolicy::default(),
        }
    }

    /// Replace the expiry audit policy.
    pub fn with_expiry_policy(mut self, policy: ExpiryAuditPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    /// The expiry audit policy in force.
    pub fn expiry_policy(&self) -> ExpiryAuditPolicy {
        self.expiry_policy
    }

    // ── authorization queries ────────────────────────────────────────

    /// Whether `item_id` may be licensed now.
    #[tracing::instrument(skip(self))]
    pub async fn can_license_item(&self, item_id: &ItemId) -> Result<bool, AcervoError> {
        let now = Timestamp::now();
        let docs = self.repo.documents_for_item(item_id).await?;
        let permitted = docs.iter().any(|d| d.permits_licensing(now));
        record_outcome("item", permitted);
        if !permitted {
            tracing::warn!(%item_id, documents = docs.len(), "Item is not licensable");
        }
        Ok(permitted)
    }

    /// Whether a specific photo asset of `item_id` may be licensed now.
    #[tracing::instrument(skip(self))]
    pub async fn can_license_photo(
        &self,
        item_id: &ItemId,
        photo_asset_id: &PhotoAssetId,
    ) -> Result<bool, AcervoError> {
        let direct = self.repo.documents_for_photo(photo_asset_id).await?;
        if direct.is_empty() {
            tracing::debug!(%photo_asset_id, "No photo-level document, deciding by item");
            return self.can_license_item(item_id).await;
        }
        let now = Timestamp::now();
        let permitted = direct.iter().any(|d| d.permits_licensing(now));
        record_outcome("photo", permitted);
        if !permitted {
            tracing::warn!(%photo_asset_id, "Photo is not licensable");
        }
        Ok(permitted)
    }

    /// Whether some permitting document for `item_id` allows `purpose`.
    #[tracing::instrument(skip(self))]
    pub async fn can_use_for_purpose(
        &self,
        item_id: &ItemId,
        purpose: Purpose,
    ) -> Result<bool, AcervoError> {
        Ok(self
            .permitting_documents(item_id)
            .await?
            .iter()
            .any(|d| d.allows_purpose(purpose)))
    }

    /// Whether some permitting document for `item_id` allows `territory`.
    #[tracing::instrument(skip(self))]
    pub async fn can_use_in_territory(
        &self,
        item_id: &ItemId,
        territory: Territory,
    ) -> Result<bool, AcervoError> {
        Ok(self
            .permitting_documents(item_id)
            .await?
            .iter()
            .any(|d| d.allows_territory(territory)))
    }

    /// Documents for `item_id` currently in `Validated` status.
    pub async fn list_valid_documents(
        &self,
        item_id: &ItemId,
    ) -> Result<Vec<RightsDocument>, AcervoError> {
        let docs = self.repo.documents_for_item(item_id).await?;
        Ok(docs
            .into_iter()
            .filter(|d| d.status() == DocumentStatus::Validated)
            .collect())
    }

    async fn permitting_documents(&self, item_id: &ItemId) -> Result<Vec<RightsDocument>, AcervoError> {
        let now = Timestamp::now();
        let docs = self.repo.documents_for_item(item_id).await?;
        Ok(docs.into_iter().filter(|d| d.permits_licensing(now)).collect())
    }

    // ── document queries ─────────────────────────────────────────────

    /// Fetch a document.
    pub async fn document(&self, id: DocumentId) -> Result<RightsDocument, AcervoError> {
        self.repo
            .document(id)
            .await?
            .ok_or_else(|| AcervoError::not_found(RecordKind::Document, id))
    }

    /// Documents by author.
    pub async fn documents_by_author(
        &self,
        author_id: &PersonId,
    ) -> Result<Vec<RightsDocument>, AcervoError> {
        Ok(self.repo.documents_by_author(author_id).await?)
    }

    /// Documents in `status`.
    pub async fn documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> Result<Vec<RightsDocument>, AcervoError> {
        Ok(self.repo.documents_by_status(status).await?)
    }

    // ── lifecycle actions ────────────────────────────────────────────

    /// Submit a document for review.
    #[tracing::instrument(skip(self, terms), fields(actor_id = %actor.id))]
    pub async fn register_document(
        &self,
        terms: DocumentTerms,
        actor: &ActorContext,
    ) -> Result<RightsDocument, AcervoError> {
        let doc = RightsDocument::submit(terms, Timestamp::now())?;
        let entry = GovernanceLedger::stamp(
            Decision::new(DecisionCategory::Legal, DOCUMENT_ENTITY, doc.id(), labels::REGISTERED)
                .with_justification(doc.terms().description.clone()),
            actor,
        )?;
        self.repo
            .commit(
                WriteBatch::new()
                    .write(RecordWrite::InsertDocument(doc.clone()))
                    .record(entry),
            )
            .await?;
        tracing::info!(document_id = %doc.id(), actor_id = %actor.id, "Rights document registered");
        Ok(doc)
    }

    /// Reviewer accepts a pending document.
    ///
    /// If another review lands between the read and the commit, this one
    /// fails with [`AcervoError::InvalidState`] and records nothing.
    #[tracing::instrument(skip(self, notes), fields(actor_id = %actor.id))]
    pub async fn validate_document(
        &self,
        id: DocumentId,
        actor: &ActorContext,
        notes: Option<String>,
    ) -> Result<RightsDocument, AcervoError> {
        self.review(id, actor, notes, Review::Validate).await
    }

    /// Reviewer refuses a pending document.
    #[tracing::instrument(skip(self, notes), fields(actor_id = %actor.id))]
    pub async fn reject_document(
        &self,
        id: DocumentId,
        actor: &ActorContext,
        notes: Option<String>,
    ) -> Result<RightsDocument, AcervoError> {
        self.review(id, actor, notes, Review::Reject).await
    }

    async fn review(
        &self,
        id: DocumentId,
        actor: &ActorContext,
        notes: Option<String>,
        review: Review,
    ) -> Result<RightsDocument, AcervoError> {
        let mut doc = self.document(id).await?;
        let read_status = doc.status();
        let now = Timestamp::now();
        let outcome = match review {
            Review::Validate => doc.validate(&actor.id, notes.clone(), now),
            Review::Reject => doc.reject(&actor.id, notes.clone(), now),
        };
        if let Err(err) = outcome {
            tracing::warn!(document_id = %id, error = %err, "Review refused");
            return Err(err.into());
        }

        let entry = GovernanceLedger::stamp(
            Decision::new(DecisionCategory::Legal, DOCUMENT_ENTITY, id, review.label())
                .with_justification(notes.unwrap_or_default()),
            actor,
        )?;
        self.repo
            .commit(
                WriteBatch::new()
                    .write(RecordWrite::document_transition(doc.clone(), read_status))
                    .record(entry),
            )
            .await?;
        tracing::info!(document_id = %id, status = %doc.status(), actor_id = %actor.id, "Rights document reviewed");
        Ok(doc)
    }

    /// Lapse every `Validated` document whose expiry is strictly before
    /// `now`. Returns how many were expired.
    ///
    /// Under [`ExpiryAuditPolicy::Record`] each expiry is committed with a
    /// `legal` entry attributed to the system actor.
    ///
    /// The sweep commits as one batch. If any selected document changed
    /// status meanwhile, nothing is expired and the error is
    /// [`AcervoError::InvalidState`]; a re-run picks up what is still due.
    #[tracing::instrument(skip(self))]
    pub async fn sweep_expired(&self, now: Timestamp) -> Result<usize, AcervoError> {
        let due = self.repo.documents_due_for_expiry(now).await?;
        if due.is_empty() {
            tracing::debug!("No documents due for expiry");
            return Ok(0);
        }

        let system = ActorContext::system();
        let mut batch = WriteBatch::new();
        let mut expired = 0usize;
        for mut doc in due {
            // The store's selection is re-checked against the document itself.
            if doc.expire(now).is_err() {
                continue;
            }
            if self.expiry_policy == ExpiryAuditPolicy::Record {
                let expiry = doc
                    .expires_at()
                    .map(|t| t.to_iso8601())
                    .unwrap_or_default();
                batch.push_entry(GovernanceLedger::stamp(
                    Decision::new(DecisionCategory::Legal, DOCUMENT_ENTITY, doc.id(), labels::EXPIRED)
                        .with_justification(format!("expiry {expiry} passed")),
                    &system,
                )?);
            }
            batch.push_write(RecordWrite::document_transition(doc, DocumentStatus::Validated));
            expired += 1;
        }

        self.repo.commit(batch).await?;
        metrics::counter!("acervo_documents_expired_total").increment(expired as u64);
        tracing::info!(expired, policy = ?self.expiry_policy, "Expiry sweep completed");
        Ok(expired)
    }
}

#[derive(Debug, Clone, Copy)]
enum Review {
    Validate,
    Reject,
}

impl Review {
    fn label(self) -> &'static str {
        match self {
            Self::Validate => labels::VALIDATED,
            Self::Reject => labels::REJECTED,
        }
    }
}

fn record_outcome(scope: &'static str, permitted: bool) {
    let outcome = if permitted { "permitted" } else { "denied" };
    metrics::counter!("acervo_authorization_checks_total", "scope" => scope, "outcome" => outcome)
        .increment(1);
}
