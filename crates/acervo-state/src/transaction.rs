//! # Settlement Transaction
//!
//! An immutable financial fact. Amounts and the percentages that produced
//! them are captured at creation from the fiscal snapshot in force, so a
//! later change to the fiscal configuration never alters a past split.
//!
//! ## Financial Status
//!
//! ```text
//! Pending ──▶ Approved ──▶ Settled ──▶ Reversed (terminal)
//!    │           │                        ▲
//!    ├───────────┼──▶ Settled             │
//!    └───────────┴────────────────────────┘
//! ```
//!
//! Reversal is a status change, never an erasure. After creation only the
//! financial status and the export references (gateway and receipt) may
//! change.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use acervo_core::{
    AcervoError, BeneficiaryId, ItemId, LicenseType, LicenseeId, MoneyError, Timestamp, TransactionId,
};

use crate::fiscal::SplitAmounts;

// ─── Financial Status ────────────────────────────────────────────────

/// Financial status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinancialStatus {
    /// Recorded, awaiting approval.
    Pending,
    /// Approved, funds not yet moved.
    Approved,
    /// Settled; counts towards the beneficiary's balance.
    Settled,
    /// Reversed (terminal).
    Reversed,
}

impl FinancialStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reversed)
    }

    /// Stable upper-case name, shared by serde and the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Settled => "SETTLED",
            Self::Reversed => "REVERSED",
        }
    }
}

impl std::fmt::Display for FinancialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FinancialStatus {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "SETTLED" => Ok(Self::Settled),
            "REVERSED" => Ok(Self::Reversed),
            other => Err(TransactionError::UnknownStatus(other.to_string())),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from transaction construction and status transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Attempted transition is not valid from the current status.
    #[error("invalid transaction transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: FinancialStatus,
        /// Attempted target status.
        to: FinancialStatus,
    },

    /// Transaction is reversed.
    #[error("transaction {id} is in terminal status {status}")]
    TerminalState {
        /// The transaction.
        id: TransactionId,
        /// The terminal status.
        status: FinancialStatus,
    },

    /// Stored amounts do not reconcile.
    #[error("transaction {id} does not balance: commission {commission} + net {net} != gross {gross}")]
    Unbalanced {
        /// The transaction.
        id: TransactionId,
        /// Gross amount.
        gross: String,
        /// Commission amount.
        commission: String,
        /// Net amount.
        net: String,
    },

    /// Monetary arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A stored status string was not recognized.
    #[error("unknown financial status: {0:?}")]
    UnknownStatus(String),
}

impl From<TransactionError> for AcervoError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Money(e) => e.into(),
            other => AcervoError::InvalidState(other.to_string()),
        }
    }
}

// ─── Proposal ────────────────────────────────────────────────────────

/// A licensing request awaiting simulation or settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseProposal {
    /// Item being licensed.
    pub item_id: ItemId,
    /// Rights-holder receiving the net payout.
    pub beneficiary_id: BeneficiaryId,
    /// Buyer/licensee.
    pub licensee_id: LicenseeId,
    /// License acquired.
    pub license_type: LicenseType,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Exchange rate recorded alongside the currency; never applied.
    pub exchange_rate: Option<Decimal>,
    /// Payment-gateway reference, when already known.
    pub gateway_reference: Option<String>,
}

impl LicenseProposal {
    /// Currency used when a proposal names none.
    pub const DEFAULT_CURRENCY: &'static str = "BRL";

    /// Proposal in the default currency with no gateway reference yet.
    pub fn new(
        item_id: ItemId,
        beneficiary_id: BeneficiaryId,
        licensee_id: LicenseeId,
        license_type: LicenseType,
    ) -> Self {
        Self {
            item_id,
            beneficiary_id,
            licensee_id,
            license_type,
            currency: Self::DEFAULT_CURRENCY.to_string(),
            exchange_rate: None,
            gateway_reference: None,
        }
    }
}

// ─── Transaction ─────────────────────────────────────────────────────

/// Export-related references: the only non-status fields that may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReferences {
    /// External payment-gateway reference.
    pub gateway_reference: Option<String>,
    /// Receipt artifact reference.
    pub receipt_reference: Option<String>,
}

/// A settlement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    item_id: ItemId,
    beneficiary_id: BeneficiaryId,
    licensee_id: LicenseeId,
    split: SplitAmounts,
    license_type: LicenseType,
    currency: String,
    exchange_rate: Option<Decimal>,
    payout_destination: String,
    status: FinancialStatus,
    references: TransactionReferences,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Transaction {
    /// Create a settled transaction from a proposal and a computed split.
    ///
    /// # Errors
    ///
    /// [`TransactionError::Unbalanced`] if the split does not reconcile.
    pub fn settle(
        proposal: LicenseProposal,
        split: SplitAmounts,
        payout_destination: impl Into<String>,
        at: Timestamp,
    ) -> Result<Self, TransactionError> {
        let tx = Self {
            id: TransactionId::new(),
            item_id: proposal.item_id,
            beneficiary_id: proposal.beneficiary_id,
            licensee_id: proposal.licensee_id,
            split,
            license_type: proposal.license_type,
            currency: proposal.currency,
            exchange_rate: proposal.exchange_rate,
            payout_destination: payout_destination.into(),
            status: FinancialStatus::Settled,
            references: TransactionReferences {
                gateway_reference: proposal.gateway_reference,
                receipt_reference: None,
            },
            created_at: at,
            updated_at: at,
        };
        tx.check_balance()?;
        Ok(tx)
    }

    /// Rebuild a transaction read back from storage, re-checking its balance.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: TransactionId,
        proposal: LicenseProposal,
        split: SplitAmounts,
        payout_destination: String,
        status: FinancialStatus,
        receipt_reference: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self, TransactionError> {
        let tx = Self {
            id,
            item_id: proposal.item_id,
            beneficiary_id: proposal.beneficiary_id,
            licensee_id: proposal.licensee_id,
            split,
            license_type: proposal.license_type,
            currency: proposal.currency,
            exchange_rate: proposal.exchange_rate,
            payout_destination,
            status,
            references: TransactionReferences {
                gateway_reference: proposal.gateway_reference,
                receipt_reference,
            },
            created_at,
            updated_at,
        };
        tx.check_balance()?;
        Ok(tx)
    }

    // ── accessors ────────────────────────────────────────────────────

    /// Transaction identifier.
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Licensed item.
    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// Rights-holder.
    pub fn beneficiary_id(&self) -> &BeneficiaryId {
        &self.beneficiary_id
    }

    /// Buyer/licensee.
    pub fn licensee_id(&self) -> &LicenseeId {
        &self.licensee_id
    }

    /// Amounts and the percentages that produced them.
    pub fn split(&self) -> &SplitAmounts {
        &self.split
    }

    /// License acquired.
    pub fn license_type(&self) -> LicenseType {
        self.license_type
    }

    /// ISO 4217 currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Recorded exchange rate.
    pub fn exchange_rate(&self) -> Option<Decimal> {
        self.exchange_rate
    }

    /// Beneficiary's payout destination token at settlement time.
    pub fn payout_destination(&self) -> &str {
        &self.payout_destination
    }

    /// Current financial status.
    pub fn status(&self) -> FinancialStatus {
        self.status
    }

    /// Gateway and receipt references.
    pub fn references(&self) -> &TransactionReferences {
        &self.references
    }

    /// Creation instant.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last update instant.
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Whether `other` carries exactly the same write-once fields.
    pub fn same_fixed_fields(&self, other: &Transaction) -> bool {
        self.id == other.id
            && self.item_id == other.item_id
            && self.beneficiary_id == other.beneficiary_id
            && self.licensee_id == other.licensee_id
            && self.split == other.split
            && self.license_type == other.license_type
            && self.currency == other.currency
            && self.exchange_rate == other.exchange_rate
            && self.payout_destination == other.payout_destination
            && self.created_at == other.created_at
    }

    // ── transitions ──────────────────────────────────────────────────

    /// PENDING → APPROVED.
    pub fn approve(&mut self, at: Timestamp) -> Result<(), TransactionError> {
        self.transition(&[FinancialStatus::Pending], FinancialStatus::Approved, at)
    }

    /// PENDING | APPROVED → SETTLED.
    pub fn mark_settled(&mut self, at: Timestamp) -> Result<(), TransactionError> {
        self.transition(
            &[FinancialStatus::Pending, FinancialStatus::Approved],
            FinancialStatus::Settled,
            at,
        )
    }

    /// Any non-terminal status → REVERSED.
    pub fn reverse(&mut self, at: Timestamp) -> Result<(), TransactionError> {
        self.transition(
            &[FinancialStatus::Pending, FinancialStatus::Approved, FinancialStatus::Settled],
            FinancialStatus::Reversed,
            at,
        )
    }

    /// Record the receipt artifact reference.
    pub fn attach_receipt(&mut self, receipt_reference: impl Into<String>, at: Timestamp) {
        self.references.receipt_reference = Some(receipt_reference.into());
        self.updated_at = at;
    }

    /// Record the payment-gateway reference.
    pub fn attach_gateway_reference(&mut self, gateway_reference: impl Into<String>, at: Timestamp) {
        self.references.gateway_reference = Some(gateway_reference.into());
        self.updated_at = at;
    }

    /// Set every reference present in `references`, keeping the others.
    pub fn merge_references(&mut self, references: &TransactionReferences, at: Timestamp) {
        if let Some(gateway) = &references.gateway_reference {
            self.references.gateway_reference = Some(gateway.clone());
        }
        if let Some(receipt) = &references.receipt_reference {
            self.references.receipt_reference = Some(receipt.clone());
        }
        self.updated_at = at;
    }

    /// Take `source`'s status and `updated_at`, keeping this record's
    /// references. Stores use it to apply a status-only update.
    pub fn adopt_status(&mut self, source: &Transaction) {
        self.status = source.status;
        self.updated_at = source.updated_at;
    }

    fn transition(
        &mut self,
        allowed_from: &[FinancialStatus],
        to: FinancialStatus,
        at: Timestamp,
    ) -> Result<(), TransactionError> {
        if self.status.is_terminal() {
            return Err(TransactionError::TerminalState {
                id: self.id,
                status: self.status,
            });
        }
        if !allowed_from.contains(&self.status) {
            return Err(TransactionError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = at;
        Ok(())
    }

    fn check_balance(&self) -> Result<(), TransactionError> {
        if self.split.is_balanced() {
            return Ok(());
        }
        Err(TransactionError::Unbalanced {
            id: self.id,
            gross: self.split.gross.to_string(),
            commission: self.split.commission.to_string(),
            net: self.split.net.to_string(),
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use acervo_core::{Money, Percentage};

    use crate::fiscal::FiscalConfiguration;

    fn proposal() -> LicenseProposal {
        LicenseProposal::new(
            ItemId::new("item-1"),
            BeneficiaryId::new("athlete-9"),
            LicenseeId::new("publisher-3"),
            LicenseType::Editorial,
        )
    }

    fn split(gross: &str) -> SplitAmounts {
        FiscalConfiguration::new(
            Percentage::parse("0.85").unwrap(),
            Percentage::parse("0.15").unwrap(),
            None,
            "admin",
            Timestamp::now(),
        )
        .split(Money::parse(gross).unwrap())
        .unwrap()
    }

    fn settled() -> Transaction {
        Transaction::settle(proposal(), split("1000.00"), "pix:athlete-9", Timestamp::now()).unwrap()
    }

    #[test]
    fn settle_creates_settled_record_in_default_currency() {
        let tx = settled();
        assert_eq!(tx.status(), FinancialStatus::Settled);
        assert_eq!(tx.currency(), "BRL");
        assert_eq!(tx.split().net, Money::parse("850").unwrap());
        assert_eq!(tx.payout_destination(), "pix:athlete-9");
    }

    #[test]
    fn unbalanced_split_is_refused() {
        let mut bad = split("1000.00");
        bad.net = Money::parse("900.00").unwrap();
        let err = Transaction::settle(proposal(), bad, "pix", Timestamp::now()).unwrap_err();
        assert!(matches!(err, TransactionError::Unbalanced { .. }));
    }

    #[test]
    fn restore_rechecks_balance() {
        let mut bad = split("10.00");
        bad.commission = Money::parse("0.00").unwrap();
        let now = Timestamp::now();
        let err = Transaction::restore(
            TransactionId::new(),
            proposal(),
            bad,
            "pix".into(),
            FinancialStatus::Settled,
            None,
            now,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, TransactionError::Unbalanced { .. }));
    }

    #[test]
    fn reversal_is_terminal() {
        let mut tx = settled();
        tx.reverse(Timestamp::now()).unwrap();
        assert_eq!(tx.status(), FinancialStatus::Reversed);
        assert!(matches!(
            tx.reverse(Timestamp::now()),
            Err(TransactionError::TerminalState { .. })
        ));
    }

    #[test]
    fn settled_cannot_be_approved() {
        let mut tx = settled();
        assert_eq!(
            tx.approve(Timestamp::now()).unwrap_err(),
            TransactionError::InvalidTransition {
                from: FinancialStatus::Settled,
                to: FinancialStatus::Approved,
            }
        );
    }

    #[test]
    fn pending_approved_settled_path() {
        let now = Timestamp::now();
        let mut tx = Transaction::restore(
            TransactionId::new(),
            proposal(),
            split("50.00"),
            "pix".into(),
            FinancialStatus::Pending,
            None,
            now,
            now,
        )
        .unwrap();
        tx.approve(now).unwrap();
        tx.mark_settled(now).unwrap();
        assert_eq!(tx.status(), FinancialStatus::Settled);
    }

    #[test]
    fn references_change_without_touching_fixed_fields() {
        let original = settled();
        let mut tx = original.clone();
        tx.attach_receipt("receipts/2026/001.pdf", Timestamp::now());
        tx.attach_gateway_reference("gw-123", Timestamp::now());
        assert!(tx.same_fixed_fields(&original));
        assert_eq!(tx.references().receipt_reference.as_deref(), Some("receipts/2026/001.pdf"));
        assert_eq!(tx.references().gateway_reference.as_deref(), Some("gw-123"));
    }

    #[test]
    fn merge_references_keeps_absent_fields() {
        let mut tx = settled();
        tx.attach_gateway_reference("gw-123", Timestamp::now());
        let receipt_only = TransactionReferences {
            gateway_reference: None,
            receipt_reference: Some("receipts/2026/002.pdf".into()),
        };
        tx.merge_references(&receipt_only, Timestamp::now());
        assert_eq!(tx.references().gateway_reference.as_deref(), Some("gw-123"));
        assert_eq!(tx.references().receipt_reference.as_deref(), Some("receipts/2026/002.pdf"));
        assert_eq!(tx.status(), FinancialStatus::Settled);
    }

    #[test]
    fn adopt_status_keeps_references() {
        let mut stored = settled();
        stored.attach_receipt("receipts/2026/003.pdf", Timestamp::now());
        let mut reversed = stored.clone();
        reversed.reverse(Timestamp::now()).unwrap();
        stored.adopt_status(&reversed);
        assert_eq!(stored.status(), FinancialStatus::Reversed);
        assert_eq!(stored.references().receipt_reference.as_deref(), Some("receipts/2026/003.pdf"));
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [
            FinancialStatus::Pending,
            FinancialStatus::Approved,
            FinancialStatus::Settled,
            FinancialStatus::Reversed,
        ] {
            assert_eq!(status.as_str().parse::<FinancialStatus>().unwrap(), status);
        }
        assert!("PAID".parse::<FinancialStatus>().is_err());
    }
}
