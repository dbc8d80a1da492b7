//! # Governance Ledger
//!
//! Append and query. There is no update, delete or undo.
//!
//! ## Period queries
//!
//! `query_by_period(start, end)` resolves its optional bounds as follows:
//!
//! | start | end  | range                 |
//! |-------|------|-----------------------|
//! | some  | some | `[start, end]`        |
//! | some  | none | `[start, now]`        |
//! | none  | some | `[epoch, end]`        |
//! | none  | none | the whole ledger      |
//!
//! Query results come back in store insertion order. Only the export sorts.

use std::sync::Arc;

use acervo_core::{AcervoError, ActorContext, DecisionCategory, Timestamp};
use acervo_state::{Decision, GovernanceEntry};
use acervo_store::{LedgerFilter, Repository, WriteBatch};

/// Resolve optional period bounds into a ledger filter, given the current
/// instant.
pub fn resolve_period(start: Option<Timestamp>, end: Option<Timestamp>, now: Timestamp) -> LedgerFilter {
    match (start, end) {
        (Some(start), Some(end)) => LedgerFilter::Period { start, end },
        (Some(start), None) => LedgerFilter::Period { start, end: now },
        (None, Some(end)) => LedgerFilter::Period {
            start: Timestamp::epoch(),
            end,
        },
        (None, None) => LedgerFilter::All,
    }
}

/// The append-only governance ledger.
#[derive(Clone)]
pub struct GovernanceLedger {
    repo: Arc<dyn Repository>,
}

impl std::fmt::Debug for GovernanceLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceLedger").finish_non_exhaustive()
    }
}

impl GovernanceLedger {
    /// A ledger over `repo`.
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Build an entry for `decision`, stamped with the current instant.
    ///
    /// The entry is not persisted; add it to a [`WriteBatch`] alongside the
    /// record change it justifies.
    pub fn stamp(decision: Decision, actor: &ActorContext) -> Result<GovernanceEntry, AcervoError> {
        decision.validate()?;
        Ok(GovernanceEntry::new(decision, actor, Timestamp::now()))
    }

    /// Record a standalone decision.
    ///
    /// Fails only on invalid input or when the store is unavailable.
    #[tracing::instrument(skip(self, decision), fields(label = %decision.label, entity_id = %decision.entity_id))]
    pub async fn record(
        &self,
        decision: Decision,
        actor: &ActorContext,
    ) -> Result<GovernanceEntry, AcervoError> {
        let entry = Self::stamp(decision, actor)?;
        self.repo
            .commit(WriteBatch::new().record(entry.clone()))
            .await?;
        metrics::counter!("acervo_governance_entries_total", "category" => entry.category().as_str())
            .increment(1);
        tracing::info!(
            entry_id = %entry.id(),
            category = %entry.category(),
            actor_id = %entry.actor_id(),
            "Governance decision recorded"
        );
        Ok(entry)
    }

    /// Entries decided within the period resolved by [`resolve_period`].
    pub async fn query_by_period(
        &self,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<Vec<GovernanceEntry>, AcervoError> {
        let filter = resolve_period(start, end, Timestamp::now());
        tracing::debug!(?filter, "Querying ledger by period");
        self.query(&filter).await
    }

    /// Entries about one entity.
    pub async fn query_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<GovernanceEntry>, AcervoError> {
        self.query(&LedgerFilter::Entity {
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
        })
        .await
    }

    /// Entries by one actor.
    pub async fn query_by_actor(&self, actor_id: &str) -> Result<Vec<GovernanceEntry>, AcervoError> {
        self.query(&LedgerFilter::Actor(actor_id.to_string())).await
    }

    /// Entries of one category.
    pub async fn query_by_category(
        &self,
        category: DecisionCategory,
    ) -> Result<Vec<GovernanceEntry>, AcervoError> {
        self.query(&LedgerFilter::Category(category)).await
    }

    /// The whole ledger.
    pub async fn list_all(&self) -> Result<Vec<GovernanceEntry>, AcervoError> {
        self.query(&LedgerFilter::All).await
    }

    async fn query(&self, filter: &LedgerFilter) -> Result<Vec<GovernanceEntry>, AcervoError> {
        Ok(self.repo.governance_entries(filter).await?)
    }
}
