//! Archive catalog lookup.
//!
//! Items and beneficiaries are owned by the archive catalog, not by this
//! engine. Settlement only needs a handful of their fields, so the catalog is
//! modelled as a read-only lookup.

use async_trait::async_trait;

use acervo_core::{BeneficiaryId, ItemId, Money};

use crate::error::StoreError;

/// The licensing-relevant view of an archive item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Item identifier.
    pub id: ItemId,
    /// Display title.
    pub title: String,
    /// Base license price.
    pub base_price: Money,
    /// Whether the item is currently offered for licensing.
    pub available_for_licensing: bool,
}

/// The payout-relevant view of a rights-holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beneficiary {
    /// Beneficiary identifier.
    pub id: BeneficiaryId,
    /// Display name.
    pub display_name: String,
    /// Payout destination token (e.g. a PIX key).
    pub payout_destination: String,
}

/// Read-only lookup of items and beneficiaries.
#[async_trait]
pub trait ArchiveCatalog: Send + Sync {
    /// Fetch an item by id.
    async fn item(&self, id: &ItemId) -> Result<Option<CatalogItem>, StoreError>;

    /// Fetch a beneficiary by id.
    async fn beneficiary(&self, id: &BeneficiaryId) -> Result<Option<Beneficiary>, StoreError>;
}
