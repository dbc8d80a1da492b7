//! Engine assembly.

use std::sync::Arc;

use anyhow::{Context, Result};

use acervo_governance::GovernanceLedger;
use acervo_rights::AuthorizationEngine;
use acervo_settlement::SettlementEngine;
use acervo_store::{postgres, ArchiveCatalog, PgCatalog, PgRepository, Repository};

use crate::config::AcervoConfig;

/// The engines a command may use, sharing one repository.
#[derive(Clone, Debug)]
pub struct Services {
    /// Governance ledger queries, used by `export`.
    pub ledger: GovernanceLedger,
    /// Rights documents and expiry, used by `sweep`.
    pub rights: AuthorizationEngine,
    /// Settlements and fiscal configuration, used by `fiscal` and `statement`.
    pub settlement: SettlementEngine,
}

impl Services {
    /// Wire the engines over `repo` and `catalog` with the configured policies.
    pub fn assemble(
        repo: Arc<dyn Repository>,
        catalog: Arc<dyn ArchiveCatalog>,
        config: &AcervoConfig,
    ) -> Self {
        let rights = AuthorizationEngine::new(repo.clone()).with_expiry_policy(config.expiry_policy());
        let settlement = SettlementEngine::new(repo.clone(), catalog, rights.clone())
            .with_policy(config.settlement_policy());
        Self {
            ledger: GovernanceLedger::new(repo),
            rights,
            settlement,
        }
    }

    /// Connect to PostgreSQL and wire the engines over it.
    pub async fn connect(config: &AcervoConfig) -> Result<Self> {
        let url = config.require_database_url()?;
        let pool = postgres::connect(url, config.db_max_connections)
            .await
            .context("connecting to PostgreSQL")?;
        Ok(Self::assemble(
            Arc::new(PgRepository::new(pool.clone())),
            Arc::new(PgCatalog::new(pool)),
            config,
        ))
    }
}
