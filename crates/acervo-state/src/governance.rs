//! # Governance Entry: Immutable Decision Record
//!
//! One entry per legally, financially or administratively significant
//! decision. An entry references the affected record only by type name and
//! identifier: a denormalized snapshot of what was decided, so ledger
//! integrity survives deletion of the referenced record.
//!
//! ## Immutability
//!
//! Fields are private and there are no setters. The content digest is
//! computed once at construction over every field; [`GovernanceEntry::restore`]
//! recomputes it and refuses rows whose stored digest disagrees, so a row
//! edited directly in storage is detected on read.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use acervo_core::{AcervoError, ActorContext, DecisionCategory, EntryId, Timestamp};

/// The content of a decision, before it is stamped and recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Decision category.
    pub category: DecisionCategory,
    /// Affected entity type name (e.g. `rights_document`).
    pub entity_type: String,
    /// Affected entity identifier.
    pub entity_id: String,
    /// Short decision label (e.g. `DOCUMENT_VALIDATED`).
    pub label: String,
    /// Free-text justification.
    pub justification: String,
}

impl Decision {
    /// A decision with an empty justification.
    pub fn new(
        category: DecisionCategory,
        entity_type: impl Into<String>,
        entity_id: impl ToString,
        label: impl Into<String>,
    ) -> Self {
        Self {
            category,
            entity_type: entity_type.into(),
            entity_id: entity_id.to_string(),
            label: label.into(),
            justification: String::new(),
        }
    }

    /// Attach a justification.
    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = justification.into();
        self
    }

    /// Entity type, entity id and label must be non-blank.
    pub fn validate(&self) -> Result<(), AcervoError> {
        for (field, value) in [
            ("entity type", &self.entity_type),
            ("entity id", &self.entity_id),
            ("decision label", &self.label),
        ] {
            if value.trim().is_empty() {
                return Err(AcervoError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// A recorded decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceEntry {
    id: EntryId,
    category: DecisionCategory,
    entity_type: String,
    entity_id: String,
    decision: String,
    justification: String,
    actor_id: String,
    actor_role: String,
    decided_at: Timestamp,
    digest: String,
}

impl GovernanceEntry {
    /// Stamp `decision` with its actor and instant.
    pub fn new(decision: Decision, actor: &ActorContext, decided_at: Timestamp) -> Self {
        let mut entry = Self {
            id: EntryId::new(),
            category: decision.category,
            entity_type: decision.entity_type,
            entity_id: decision.entity_id,
            decision: decision.label,
            justification: decision.justification,
            actor_id: actor.id.clone(),
            actor_role: actor.role.clone(),
            decided_at,
            digest: String::new(),
        };
        entry.digest = entry.compute_digest();
        entry
    }

    /// Rebuild an entry read back from storage.
    ///
    /// # Errors
    ///
    /// [`AcervoError::InvalidState`] if `digest` does not match the content.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: EntryId,
        decision: Decision,
        actor_id: String,
        actor_role: String,
        decided_at: Timestamp,
        digest: String,
    ) -> Result<Self, AcervoError> {
        let entry = Self {
            id,
            category: decision.category,
            entity_type: decision.entity_type,
            entity_id: decision.entity_id,
            decision: decision.label,
            justification: decision.justification,
            actor_id,
            actor_role,
            decided_at,
            digest,
        };
        if !entry.verify_integrity() {
            return Err(AcervoError::InvalidState(format!(
                "governance entry {} failed its integrity check",
                entry.id
            )));
        }
        Ok(entry)
    }

    /// Entry identifier.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Decision category.
    pub fn category(&self) -> DecisionCategory {
        self.category
    }

    /// Affected entity type name.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Affected entity identifier.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Short decision label.
    pub fn decision(&self) -> &str {
        &self.decision
    }

    /// Free-text justification.
    pub fn justification(&self) -> &str {
        &self.justification
    }

    /// Responsible actor identifier.
    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// Responsible actor's role label.
    pub fn actor_role(&self) -> &str {
        &self.actor_role
    }

    /// Decision instant.
    pub fn decided_at(&self) -> Timestamp {
        self.decided_at
    }

    /// Hex SHA-256 over the entry content.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Whether the stored digest matches the content.
    pub fn verify_integrity(&self) -> bool {
        self.digest == self.compute_digest()
    }

    fn compute_digest(&self) -> String {
        // serde_json objects keep keys sorted, so the encoding is stable.
        let content = serde_json::json!({
            "id": self.id.to_string(),
            "category": self.category.as_str(),
            "entity_type": self.entity_type,
            "entity_id": self.entity_id,
            "decision": self.decision,
            "justification": self.justification,
            "actor_id": self.actor_id,
            "actor_role": self.actor_role,
            "decided_at": self.decided_at.to_iso8601(),
        });
        let hash = Sha256::digest(content.to_string().as_bytes());
        hash.iter().map(|b| format!("{b:02x}")).collect()
    }
}
