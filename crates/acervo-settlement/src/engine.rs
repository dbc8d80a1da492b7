//! # Settlement Engine
//!
//! ## `settle` checks, in order
//!
//! 1. Item and beneficiary exist (`NotFound`).
//! 2. Under [`SettlementPolicy::require_authorization`], the item is
//!    licensable and its documents allow the license's purpose
//!    (`Unauthorized`).
//! 3. The item is offered for licensing (`InvalidState`).
//! 4. A fiscal configuration exists (`ConfigurationMissing`).
//!
//! Only then is the split computed and the transaction committed, together
//! with its `financial` ledger entry.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use acervo_core::{
    AcervoError, ActorContext, BeneficiaryId, DecisionCategory, ItemId, Money, Percentage,
    RecordKind, Timestamp, TransactionId,
};
use acervo_governance::GovernanceLedger;
use acervo_rights::AuthorizationEngine;
use acervo_state::{
    Decision, FinancialStatus, FiscalConfiguration, LicenseProposal, SplitAmounts, Transaction,
    TransactionReferences, FISCAL_CONFIGURATION_KEY,
};
use acervo_store::{ArchiveCatalog, Beneficiary, CatalogItem, RecordWrite, Repository, WriteBatch};

use crate::policy::SettlementPolicy;

/// Entity type name under which transactions appear in the ledger.
pub const TRANSACTION_ENTITY: &str = "transaction";
/// Entity type name under which the fiscal configuration appears in the ledger.
pub const FISCAL_ENTITY: &str = "fiscal_configuration";

/// Ledger labels for settlement decisions.
pub mod labels {
    /// A license was settled.
    pub const SETTLED: &str = "LICENSE_SETTLED";
    /// A transaction was reversed.
    pub const REVERSED: &str = "TRANSACTION_REVERSED";
    /// The revenue split was changed.
    pub const FISCAL_UPDATED: &str = "FISCAL_CONFIGURATION_UPDATED";
}

/// What a settlement would produce. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Simulation {
    /// Item priced.
    pub item_id: ItemId,
    /// Rights-holder.
    pub beneficiary_id: BeneficiaryId,
    /// Beneficiary display name.
    pub beneficiary_name: String,
    /// Where the net amount would be paid.
    pub payout_destination: String,
    /// Gross, commission and net under the current configuration.
    pub split: SplitAmounts,
    /// Whether the catalog currently offers the item for licensing.
    pub available_for_licensing: bool,
}

/// A beneficiary's balance and transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Rights-holder.
    pub beneficiary_id: BeneficiaryId,
    /// Sum of net amounts over `Settled` transactions.
    pub balance: Money,
    /// Every transaction of the beneficiary, in creation order.
    pub history: Vec<Transaction>,
}

impl Statement {
    /// Transactions counted in the balance.
    pub fn settled(&self) -> impl Iterator<Item = &Transaction> {
        self.history
            .iter()
            .filter(|t| t.status() == FinancialStatus::Settled)
    }
}

/// Simulates and settles licenses.
#[derive(Clone)]
pub struct SettlementEngine {
    repo: Arc<dyn Repository>,
    catalog: Arc<dyn ArchiveCatalog>,
    authorization: AuthorizationEngine,
    policy: SettlementPolicy,
}

impl std::fmt::Debug for SettlementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SettlementEngine {
    /// Engine with the default policy.
    pub fn new(
        repo: Arc<dyn Repository>,
        catalog: Arc<dyn ArchiveCatalog>,
        authorization: AuthorizationEngine,
    ) -> Self {
        Self {
            repo,
            catalog,
            authorization,
            policy: SettlementPolicy::default(),
        }
    }

    /// Replace the settlement policy.
    pub fn with_policy(mut self, policy: SettlementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The policy in force.
    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    // ── simulation and settlement ────────────────────────────────────

    /// Price a license of `item_id` for `beneficiary_id` under the current
    /// fiscal configuration. Does not consult authorization.
    #[tracing::instrument(skip(self))]
    pub async fn simulate(
        &self,
        item_id: &ItemId,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<Simulation, AcervoError> {
        let (item, beneficiary) = self.load_parties(item_id, beneficiary_id).await?;
        let config = self.current_configuration().await?;
        let split = config.split(item.base_price)?;
        tracing::debug!(gross = %split.gross, net = %split.net, "License simulated");
        Ok(Simulation {
            item_id: item.id,
            beneficiary_id: beneficiary.id,
            beneficiary_name: beneficiary.display_name,
            payout_destination: beneficiary.payout_destination,
            split,
            available_for_licensing: item.available_for_licensing,
        })
    }

    /// Settle `proposal`, creating a `Settled` transaction and its ledger
    /// entry atomically.
    #[tracing::instrument(skip(self, proposal), fields(item_id = %proposal.item_id, actor_id = %actor.id))]
    pub async fn settle(
        &self,
        proposal: LicenseProposal,
        actor: &ActorContext,
    ) -> Result<Transaction, AcervoError> {
        if proposal.currency.trim().is_empty() {
            return Err(AcervoError::Validation("currency must not be empty".into()));
        }
        let (item, beneficiary) = self
            .load_parties(&proposal.item_id, &proposal.beneficiary_id)
            .await?;

        if self.policy.require_authorization {
            self.authorize(&proposal).await?;
        }
        if !item.available_for_licensing {
            return Err(AcervoError::InvalidState(format!(
                "item {} is not available for licensing",
                item.id
            )));
        }

        let config = self.current_configuration().await?;
        let split = config.split(item.base_price)?;
        let tx = Transaction::settle(proposal, split, beneficiary.payout_destination, Timestamp::now())?;

        let entry = GovernanceLedger::stamp(
            Decision::new(DecisionCategory::Financial, TRANSACTION_ENTITY, tx.id(), labels::SETTLED)
                .with_justification(format!(
                    "{} license of item {}: gross {} {}, commission {} ({}), net {} to {}",
                    tx.license_type(),
                    tx.item_id(),
                    split.gross,
                    tx.currency(),
                    split.commission,
                    split.commission_percentage.to_percent_string(),
                    split.net,
                    tx.beneficiary_id(),
                )),
            actor,
        )?;
        self.repo
            .commit(
                WriteBatch::new()
                    .write(RecordWrite::InsertTransaction(tx.clone()))
                    .record(entry),
            )
            .await?;

        metrics::counter!("acervo_settlements_total", "license_type" => tx.license_type().as_str())
            .increment(1);
        tracing::info!(
            transaction_id = %tx.id(),
            gross = %split.gross,
            net = %split.net,
            commission = %split.commission,
            "License settled"
        );
        Ok(tx)
    }

    async fn authorize(&self, proposal: &LicenseProposal) -> Result<(), AcervoError> {
        if !self.authorization.can_license_item(&proposal.item_id).await? {
            return Err(AcervoError::Unauthorized(format!(
                "item {} has no valid rights document permitting commercial licensing",
                proposal.item_id
            )));
        }
        let purpose = proposal.license_type.purpose();
        if !self
            .authorization
            .can_use_for_purpose(&proposal.item_id, purpose)
            .await?
        {
            return Err(AcervoError::Unauthorized(format!(
                "item {} is not cleared for {purpose} use",
                proposal.item_id
            )));
        }
        Ok(())
    }

    /// Balance (net of `Settled` transactions only) and full history.
    #[tracing::instrument(skip(self))]
    pub async fn statement_for(&self, beneficiary_id: &BeneficiaryId) -> Result<Statement, AcervoError> {
        let history = self.repo.transactions_for_beneficiary(beneficiary_id).await?;
        let mut balance = Money::zero();
        for tx in history.iter().filter(|t| t.status() == FinancialStatus::Settled) {
            balance = balance.checked_add(tx.split().net)?;
        }
        Ok(Statement {
            beneficiary_id: beneficiary_id.clone(),
            balance,
            history,
        })
    }

    // ── post-settlement changes ──────────────────────────────────────

    /// Fetch a transaction.
    pub async fn transaction(&self, id: TransactionId) -> Result<Transaction, AcervoError> {
        self.repo
            .transaction(id)
            .await?
            .ok_or_else(|| AcervoError::not_found(RecordKind::Transaction, id))
    }

    /// Mark a transaction reversed. The record is kept.
    ///
    /// Fails with [`AcervoError::InvalidState`] if another writer changed the
    /// status between the read and the commit.
    #[tracing::instrument(skip(self, justification), fields(actor_id = %actor.id))]
    pub async fn reverse_transaction(
        &self,
        id: TransactionId,
        actor: &ActorContext,
        justification: &str,
    ) -> Result<Transaction, AcervoError> {
        let mut tx = self.transaction(id).await?;
        let read_status = tx.status();
        if let Err(err) = tx.reverse(Timestamp::now()) {
            tracing::warn!(transaction_id = %id, error = %err, "Reversal refused");
            return Err(err.into());
        }
        let entry = GovernanceLedger::stamp(
            Decision::new(DecisionCategory::Financial, TRANSACTION_ENTITY, id, labels::REVERSED)
                .with_justification(justification),
            actor,
        )?;
        self.repo
            .commit(
                WriteBatch::new()
                    .write(RecordWrite::transaction_transition(tx.clone(), read_status))
                    .record(entry),
            )
            .await?;
        tracing::info!(transaction_id = %id, actor_id = %actor.id, "Transaction reversed");
        Ok(tx)
    }

    /// Record the receipt artifact reference. Only the reference is
    /// written, so a concurrent status change is never undone.
    pub async fn attach_receipt(
        &self,
        id: TransactionId,
        receipt_reference: &str,
    ) -> Result<Transaction, AcervoError> {
        let references = TransactionReferences {
            gateway_reference: None,
            receipt_reference: Some(require_reference(receipt_reference)?.to_string()),
        };
        self.persist_references(id, references).await
    }

    /// Record the payment-gateway reference. Only the reference is written.
    pub async fn attach_gateway_reference(
        &self,
        id: TransactionId,
        gateway_reference: &str,
    ) -> Result<Transaction, AcervoError> {
        let references = TransactionReferences {
            gateway_reference: Some(require_reference(gateway_reference)?.to_string()),
            receipt_reference: None,
        };
        self.persist_references(id, references).await
    }

    async fn persist_references(
        &self,
        id: TransactionId,
        references: TransactionReferences,
    ) -> Result<Transaction, AcervoError> {
        self.repo
            .commit(WriteBatch::new().write(RecordWrite::AttachTransactionReferences {
                id,
                references,
                at: Timestamp::now(),
            }))
            .await?;
        tracing::debug!(transaction_id = %id, "Transaction references updated");
        self.transaction(id).await
    }

    // ── fiscal configuration ─────────────────────────────────────────

    /// The configuration in force.
    ///
    /// # Errors
    ///
    /// [`AcervoError::ConfigurationMissing`] if none has been written.
    pub async fn current_configuration(&self) -> Result<FiscalConfiguration, AcervoError> {
        self.repo
            .fiscal_configuration()
            .await?
            .ok_or(AcervoError::ConfigurationMissing)
    }

    /// Set the revenue split. Each percentage must lie in `[0, 1]`; they need
    /// not sum to 1.
    #[tracing::instrument(skip(self, legal_note), fields(actor_id = %actor.id))]
    pub async fn update_fiscal_configuration(
        &self,
        actor: &ActorContext,
        beneficiary_percentage: Decimal,
        platform_percentage: Decimal,
        legal_note: Option<String>,
    ) -> Result<FiscalConfiguration, AcervoError> {
        let beneficiary = Percentage::new(beneficiary_percentage)?;
        let platform = Percentage::new(platform_percentage)?;
        let previous = self.repo.fiscal_configuration().await?;

        let config = FiscalConfiguration::new(
            beneficiary,
            platform,
            legal_note,
            actor.id.clone(),
            Timestamp::now(),
        );
        let before = previous.map_or_else(
            || "unconfigured".to_string(),
            |p| {
                format!(
                    "{}/{}",
                    p.beneficiary_percentage.to_percent_string(),
                    p.platform_percentage.to_percent_string()
                )
            },
        );
        let mut justification = format!(
            "split {} -> {}/{}",
            before,
            beneficiary.to_percent_string(),
            platform.to_percent_string()
        );
        if let Some(note) = &config.legal_note {
            justification.push_str(&format!("; {note}"));
        }

        let entry = GovernanceLedger::stamp(
            Decision::new(
                DecisionCategory::Administrative,
                FISCAL_ENTITY,
                FISCAL_CONFIGURATION_KEY,
                labels::FISCAL_UPDATED,
            )
            .with_justification(justification),
            actor,
        )?;
        self.repo
            .commit(
                WriteBatch::new()
                    .write(RecordWrite::PutFiscalConfiguration(config.clone()))
                    .record(entry),
            )
            .await?;
        if !config.unallocated_fraction().is_zero() {
            tracing::warn!(
                unallocated = %config.unallocated_fraction(),
                "Fiscal percentages do not sum to 1; the difference is absorbed by the platform"
            );
        }
        tracing::info!(actor_id = %actor.id, "Fiscal configuration updated");
        Ok(config)
    }

    async fn load_parties(
        &self,
        item_id: &ItemId,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<(CatalogItem, Beneficiary), AcervoError> {
        let item = self
            .catalog
            .item(item_id)
            .await?
            .ok_or_else(|| AcervoError::not_found(RecordKind::Item, item_id))?;
        let beneficiary = self
            .catalog
            .beneficiary(beneficiary_id)
            .await?
            .ok_or_else(|| AcervoError::not_found(RecordKind::Beneficiary, beneficiary_id))?;
        Ok((item, beneficiary))
    }
}

fn require_reference(reference: &str) -> Result<&str, AcervoError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(AcervoError::Validation("reference must not be empty".into()));
    }
    Ok(trimmed)
}
