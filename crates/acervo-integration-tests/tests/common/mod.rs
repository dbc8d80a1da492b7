//! Shared fixture: engines over in-memory stores, one seeded item and
//! beneficiary.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use acervo_core::{
    ActorContext, BeneficiaryId, DocumentKind, ItemId, LicenseType, LicenseeId, Money, PersonId,
    Timestamp,
};
use acervo_governance::GovernanceLedger;
use acervo_rights::{AuthorizationEngine, ExpiryAuditPolicy};
use acervo_settlement::{SettlementEngine, SettlementPolicy};
use acervo_state::{DocumentTerms, LicenseProposal, RightsDocument};
use acervo_store::{Beneficiary, CatalogItem, InMemoryCatalog, InMemoryRepository, Repository};

pub const ITEM: &str = "item-x";
pub const BENEFICIARY: &str = "athlete-1";

pub struct World {
    pub repo: InMemoryRepository,
    pub catalog: InMemoryCatalog,
    pub rights: AuthorizationEngine,
    pub settlement: SettlementEngine,
    pub ledger: GovernanceLedger,
}

impl World {
    pub fn new() -> Self {
        Self::with_policies(SettlementPolicy::default(), ExpiryAuditPolicy::default())
    }

    pub fn with_policies(settlement: SettlementPolicy, expiry: ExpiryAuditPolicy) -> Self {
        let repo = InMemoryRepository::new();
        let catalog = InMemoryCatalog::new();
        catalog.put_item(CatalogItem {
            id: ItemId::new(ITEM),
            title: "Final da Copa, 1970".into(),
            base_price: Money::parse("1000.00").unwrap(),
            available_for_licensing: true,
        });
        catalog.put_beneficiary(Beneficiary {
            id: BeneficiaryId::new(BENEFICIARY),
            display_name: "Atleta Um".into(),
            payout_destination: "pix:atleta1@example.org".into(),
        });
        Self::over(Arc::new(repo.clone()), repo, catalog, settlement, expiry)
    }

    /// Engines over `store`, which may wrap `repo`.
    pub fn over(
        store: Arc<dyn Repository>,
        repo: InMemoryRepository,
        catalog: InMemoryCatalog,
        settlement: SettlementPolicy,
        expiry: ExpiryAuditPolicy,
    ) -> Self {
        let rights = AuthorizationEngine::new(store.clone()).with_expiry_policy(expiry);
        let settlement = SettlementEngine::new(store.clone(), Arc::new(catalog.clone()), rights.clone())
            .with_policy(settlement);
        Self {
            repo,
            catalog,
            rights,
            settlement,
            ledger: GovernanceLedger::new(store),
        }
    }

    pub async fn configure(&self, beneficiary: &str, platform: &str) {
        self.settlement
            .update_fiscal_configuration(
                &admin(),
                beneficiary.parse().unwrap(),
                platform.parse().unwrap(),
                Some("Portaria 1/2026".into()),
            )
            .await
            .unwrap();
    }

    /// Register and validate a commercial-use document for `item`.
    pub async fn validated_document(&self, item: &str, expires_at: Option<Timestamp>) -> RightsDocument {
        let doc = self
            .rights
            .register_document(terms(item, true, expires_at), &admin())
            .await
            .unwrap();
        self.rights
            .validate_document(doc.id(), &reviewer(), Some("assinatura conferida".into()))
            .await
            .unwrap()
    }
}

pub fn admin() -> ActorContext {
    ActorContext::new("admin-1", "ADMIN")
}

pub fn reviewer() -> ActorContext {
    ActorContext::new("juridico-1", "LEGAL_REVIEWER")
}

pub fn terms(item: &str, commercial: bool, expires_at: Option<Timestamp>) -> DocumentTerms {
    DocumentTerms {
        kind: DocumentKind::AssignmentOfImageRights,
        description: "Termo de cessão de direitos de imagem".into(),
        item_id: Some(ItemId::new(item)),
        photo_asset_id: None,
        person_ids: BTreeSet::from([PersonId::new("athlete-1")]),
        author_id: PersonId::new("photographer-1"),
        author_name: "Fotógrafo".into(),
        artifact_url: Some("https://arquivos.example.org/termos/1.pdf".into()),
        artifact_hash: Some("ab12".into()),
        signature_validated: true,
        permits_commercial_use: commercial,
        permitted_purposes: BTreeSet::new(),
        permitted_territories: BTreeSet::new(),
        usage_restrictions: None,
        expires_at,
    }
}

pub fn proposal(license_type: LicenseType) -> LicenseProposal {
    LicenseProposal::new(
        ItemId::new(ITEM),
        BeneficiaryId::new(BENEFICIARY),
        LicenseeId::new("editora-1"),
        license_type,
    )
}

pub fn money(s: &str) -> Money {
    Money::parse(s).unwrap()
}
