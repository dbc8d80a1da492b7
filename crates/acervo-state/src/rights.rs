//! # Rights Document Lifecycle
//!
//! A rights document is a claim of authorization over an archive item or a
//! specific photographic asset: a copyright assignment, an image-rights
//! assignment, a use authorization, a public-domain declaration.
//!
//! ## States
//!
//! ```text
//! PendingReview ──▶ Validated ──▶ Expired (terminal, via sweep)
//!       │
//!       └──▶ Rejected (terminal)
//! ```
//!
//! Review transitions are explicit reviewer actions. Expiry is applied by a
//! sweep and only ever touches `Validated` documents. Nothing leaves a
//! terminal state.
//!
//! ## Authorization predicate
//!
//! [`RightsDocument::permits_licensing`] is the single licensing gate:
//! commercial use permitted, status `Validated`, and no expiry or an expiry
//! strictly after `now`. Every eligibility check in the workspace calls it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use acervo_core::{
    AcervoError, DocumentId, DocumentKind, ItemId, PersonId, PhotoAssetId, Purpose, Territory,
    Timestamp,
};

// ─── Document Status ─────────────────────────────────────────────────

/// The lifecycle state of a rights document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Submitted, awaiting legal review.
    PendingReview,
    /// Reviewed and accepted.
    Validated,
    /// Reviewed and refused (terminal).
    Rejected,
    /// Was valid, expiry date has passed (terminal).
    Expired,
}

impl DocumentStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Expired)
    }

    /// Stable upper-case name, shared by serde and the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "PENDING_REVIEW",
            Self::Validated => "VALIDATED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_REVIEW" => Ok(Self::PendingReview),
            "VALIDATED" => Ok(Self::Validated),
            "REJECTED" => Ok(Self::Rejected),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(DocumentError::UnknownStatus(other.to_string())),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from rights document lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Attempted transition is not valid from the current state.
    #[error("invalid rights document transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: DocumentStatus,
        /// Attempted target state.
        to: DocumentStatus,
    },

    /// Document is in a terminal state.
    #[error("rights document {id} is in terminal state {state}")]
    TerminalState {
        /// The document.
        id: DocumentId,
        /// The terminal state.
        state: DocumentStatus,
    },

    /// Expiry requested for a document whose expiry has not passed.
    #[error("rights document {id} has not expired")]
    NotExpired {
        /// The document.
        id: DocumentId,
    },

    /// A document must be linked to an item or a photo asset.
    #[error("rights document must reference an item or a photo asset")]
    Unlinked,

    /// A stored status string was not recognized.
    #[error("unknown rights document status: {0:?}")]
    UnknownStatus(String),
}

impl From<DocumentError> for AcervoError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Unlinked => AcervoError::Validation(err.to_string()),
            other => AcervoError::InvalidState(other.to_string()),
        }
    }
}

// ─── Terms ───────────────────────────────────────────────────────────

/// What a document asserts. Fixed at submission; reviewers accept or reject
/// the terms as a whole rather than editing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTerms {
    /// Legal instrument.
    pub kind: DocumentKind,
    /// Free-text description.
    pub description: String,
    /// Archive item the document covers, if any.
    pub item_id: Option<ItemId>,
    /// Specific photographic asset the document covers, if any.
    pub photo_asset_id: Option<PhotoAssetId>,
    /// People depicted or otherwise covered.
    pub person_ids: BTreeSet<PersonId>,
    /// Author of the document.
    pub author_id: PersonId,
    /// Public name of the author.
    pub author_name: String,
    /// Location of the signed digital artifact.
    pub artifact_url: Option<String>,
    /// Hash of the signed digital artifact.
    pub artifact_hash: Option<String>,
    /// Whether the digital signature on the artifact was validated.
    pub signature_validated: bool,
    /// Whether the document permits commercial use.
    pub permits_commercial_use: bool,
    /// Permitted purposes. Empty means unrestricted.
    pub permitted_purposes: BTreeSet<Purpose>,
    /// Permitted territories. Empty means unrestricted.
    pub permitted_territories: BTreeSet<Territory>,
    /// Free-text usage restrictions.
    pub usage_restrictions: Option<String>,
    /// When the permission lapses. `None` never expires.
    pub expires_at: Option<Timestamp>,
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Review and audit metadata that changes as the document moves through
/// its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLifecycle {
    /// Current state.
    pub status: DocumentStatus,
    /// Notes left by the reviewer.
    pub reviewer_notes: Option<String>,
    /// Identity of the reviewer.
    pub reviewed_by: Option<String>,
    /// Submission instant.
    pub created_at: Timestamp,
    /// Last transition instant.
    pub updated_at: Timestamp,
}

// ─── Rights Document ─────────────────────────────────────────────────

/// A rights document with its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightsDocument {
    id: DocumentId,
    terms: DocumentTerms,
    lifecycle: DocumentLifecycle,
}

impl RightsDocument {
    /// Submit a new document for review.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Unlinked`] if the terms reference neither an item
    /// nor a photo asset.
    pub fn submit(terms: DocumentTerms, at: Timestamp) -> Result<Self, DocumentError> {
        if terms.item_id.is_none() && terms.photo_asset_id.is_none() {
            return Err(DocumentError::Unlinked);
        }
        Ok(Self {
            id: DocumentId::new(),
            terms,
            lifecycle: DocumentLifecycle {
                status: DocumentStatus::PendingReview,
                reviewer_notes: None,
                reviewed_by: None,
                created_at: at,
                updated_at: at,
            },
        })
    }

    /// Rebuild a document read back from storage.
    pub fn restore(id: DocumentId, terms: DocumentTerms, lifecycle: DocumentLifecycle) -> Self {
        Self { id, terms, lifecycle }
    }

    /// Document identifier.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The asserted terms.
    pub fn terms(&self) -> &DocumentTerms {
        &self.terms
    }

    /// Review and audit metadata.
    pub fn lifecycle(&self) -> &DocumentLifecycle {
        &self.lifecycle
    }

    /// Current status.
    pub fn status(&self) -> DocumentStatus {
        self.lifecycle.status
    }

    /// Linked item, if any.
    pub fn item_id(&self) -> Option<&ItemId> {
        self.terms.item_id.as_ref()
    }

    /// Linked photo asset, if any.
    pub fn photo_asset_id(&self) -> Option<&PhotoAssetId> {
        self.terms.photo_asset_id.as_ref()
    }

    /// Expiry instant, if any.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.terms.expires_at
    }

    /// The licensing gate.
    ///
    /// True iff commercial use is permitted, the document is `Validated`,
    /// and it has no expiry or its expiry is strictly after `now`.
    pub fn permits_licensing(&self, now: Timestamp) -> bool {
        self.terms.permits_commercial_use
            && self.lifecycle.status == DocumentStatus::Validated
            && self.terms.expires_at.map_or(true, |expiry| expiry > now)
    }

    /// Whether `purpose` is within the permitted set (empty = unrestricted).
    pub fn allows_purpose(&self, purpose: Purpose) -> bool {
        self.terms.permitted_purposes.is_empty() || self.terms.permitted_purposes.contains(&purpose)
    }

    /// Whether `territory` is within the permitted set (empty = unrestricted).
    pub fn allows_territory(&self, territory: Territory) -> bool {
        self.terms.permitted_territories.is_empty()
            || self.terms.permitted_territories.contains(&territory)
    }

    /// Whether a `Validated` document's expiry lies strictly before `now`.
    pub fn is_due_for_expiry(&self, now: Timestamp) -> bool {
        self.lifecycle.status == DocumentStatus::Validated
            && self.terms.expires_at.is_some_and(|expiry| expiry < now)
    }

    /// Accept the document (PENDING_REVIEW → VALIDATED).
    pub fn validate(
        &mut self,
        reviewer: &str,
        notes: Option<String>,
        at: Timestamp,
    ) -> Result<(), DocumentError> {
        self.require_state(DocumentStatus::PendingReview, DocumentStatus::Validated)?;
        self.lifecycle.reviewed_by = Some(reviewer.to_string());
        self.lifecycle.reviewer_notes = notes;
        self.do_transition(DocumentStatus::Validated, at);
        Ok(())
    }

    /// Refuse the document (PENDING_REVIEW → REJECTED).
    pub fn reject(
        &mut self,
        reviewer: &str,
        notes: Option<String>,
        at: Timestamp,
    ) -> Result<(), DocumentError> {
        self.require_state(DocumentStatus::PendingReview, DocumentStatus::Rejected)?;
        self.lifecycle.reviewed_by = Some(reviewer.to_string());
        self.lifecycle.reviewer_notes = notes;
        self.do_transition(DocumentStatus::Rejected, at);
        Ok(())
    }

    /// Lapse a validated document whose expiry has passed (VALIDATED → EXPIRED).
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DocumentError> {
        self.require_state(DocumentStatus::Validated, DocumentStatus::Expired)?;
        if !self.is_due_for_expiry(now) {
            return Err(DocumentError::NotExpired { id: self.id });
        }
        self.do_transition(DocumentStatus::Expired, now);
        Ok(())
    }

    fn require_state(&self, expected: DocumentStatus, target: DocumentStatus) -> Result<(), DocumentError> {
        let current = self.lifecycle.status;
        if current.is_terminal() {
            return Err(DocumentError::TerminalState {
                id: self.id,
                state: current,
            });
        }
        if current != expected {
            return Err(DocumentError::InvalidTransition {
                from: current,
                to: target,
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: DocumentStatus, at: Timestamp) {
        self.lifecycle.status = to;
        self.lifecycle.updated_at = at;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
