//! PostgreSQL repository and catalog.
//!
//! Row structs mirror the tables in `migrations/`. Amounts and percentages
//! are stored as decimal strings and parsed back on read; a row that fails
//! to parse is reported as [`StoreError::Corrupt`], never patched up.
//!
//! [`PgRepository::commit`] runs the whole batch inside one SQL transaction.
//! Status updates carry the status the caller read in their `WHERE` clause,
//! so a row another writer moved first is reported as
//! [`StoreError::Conflict`] and the batch rolls back.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use uuid::Uuid;

use acervo_core::{
    BeneficiaryId, DecisionCategory, DocumentId, DocumentKind, EntryId, ItemId, LicenseType,
    LicenseeId, Money, MoneyError, Percentage, PersonId, PhotoAssetId, Purpose, RecordKind, Territory,
    Timestamp, TransactionId,
};
use acervo_state::{
    Decision, DocumentLifecycle, DocumentStatus, DocumentTerms, FinancialStatus,
    FiscalConfiguration, GovernanceEntry, LicenseProposal, RightsDocument, SplitAmounts,
    Transaction, TransactionReferences, FISCAL_CONFIGURATION_KEY,
};

use crate::batch::{RecordWrite, WriteBatch};
use crate::catalog::{ArchiveCatalog, Beneficiary, CatalogItem};
use crate::error::StoreError;
use crate::repository::{LedgerFilter, Repository};

/// Connect to PostgreSQL.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;
    tracing::info!(max_connections, "Connected to PostgreSQL");
    Ok(pool)
}

/// Run the embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Connect and migrate.
pub async fn init_pool(url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = connect(url, max_connections).await?;
    migrate(&pool).await?;
    Ok(pool)
}

const DOCUMENT_COLUMNS: &str = "id, kind, description, item_id, photo_asset_id, person_ids,
     author_id, author_name, artifact_url, artifact_hash, signature_validated,
     permits_commercial_use, permitted_purposes, permitted_territories,
     usage_restrictions, expires_at, status, reviewer_notes, reviewed_by,
     created_at, updated_at";

const TRANSACTION_COLUMNS: &str = "id, item_id, beneficiary_id, licensee_id, gross_amount,
     commission_amount, net_amount, beneficiary_percentage, commission_percentage,
     license_type, currency, exchange_rate, payout_destination, financial_status,
     gateway_reference, receipt_reference, created_at, updated_at";

const ENTRY_COLUMNS: &str = "id, category, entity_type, entity_id, decision, justification,
     actor_id, actor_role, decided_at, digest";

/// [`Repository`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Wrap a connected pool. Migrations must already have run.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_documents(
        &self,
        condition: &str,
        bind: DocumentBind<'_>,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM rights_documents WHERE {condition} ORDER BY seq");
        let query = sqlx::query_as::<_, DocumentRow>(&sql);
        let rows = match bind {
            DocumentBind::Text(value) => query.bind(value).fetch_all(&self.pool).await?,
            DocumentBind::Instant(value) => query.bind(value).fetch_all(&self.pool).await?,
        };
        rows.into_iter().map(DocumentRow::into_record).collect()
    }
}

enum DocumentBind<'a> {
    Text(&'a str),
    Instant(DateTime<Utc>),
}

#[async_trait]
impl Repository for PgRepository {
    async fn document(&self, id: DocumentId) -> Result<Option<RightsDocument>, StoreError> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM rights_documents WHERE id = $1");
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(DocumentRow::into_record).transpose()
    }

    async fn documents_for_item(&self, item_id: &ItemId) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents("item_id = $1", DocumentBind::Text(item_id.as_str()))
            .await
    }

    async fn documents_for_photo(
        &self,
        photo_asset_id: &PhotoAssetId,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents("photo_asset_id = $1", DocumentBind::Text(photo_asset_id.as_str()))
            .await
    }

    async fn documents_by_author(
        &self,
        author_id: &PersonId,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents("author_id = $1", DocumentBind::Text(author_id.as_str()))
            .await
    }

    async fn documents_by_status(
        &self,
        status: DocumentStatus,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents("status = $1", DocumentBind::Text(status.as_str()))
            .await
    }

    async fn documents_due_for_expiry(
        &self,
        now: Timestamp,
    ) -> Result<Vec<RightsDocument>, StoreError> {
        self.select_documents(
            "status = 'VALIDATED' AND expires_at IS NOT NULL AND expires_at < $1",
            DocumentBind::Instant(*now.as_datetime()),
        )
        .await
    }

    async fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1");
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(TransactionRow::into_record).transpose()
    }

    async fn transactions_for_beneficiary(
        &self,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<Vec<Transaction>, StoreError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE beneficiary_id = $1 ORDER BY seq"
        );
        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(beneficiary_id.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TransactionRow::into_record).collect()
    }

    async fn fiscal_configuration(&self) -> Result<Option<FiscalConfiguration>, StoreError> {
        let row = sqlx::query_as::<_, FiscalRow>(
            "SELECT beneficiary_percentage, platform_percentage, legal_note, updated_at, updated_by
             FROM fiscal_configuration WHERE key = $1",
        )
        .bind(FISCAL_CONFIGURATION_KEY)
        .fetch_optional(&self.pool)
        .await?;
        row.map(FiscalRow::into_record).transpose()
    }

    async fn governance_entries(
        &self,
        filter: &LedgerFilter,
    ) -> Result<Vec<GovernanceEntry>, StoreError> {
        let rows = match filter {
            LedgerFilter::All => {
                let sql = format!("SELECT {ENTRY_COLUMNS} FROM governance_entries ORDER BY seq");
                sqlx::query_as::<_, EntryRow>(&sql).fetch_all(&self.pool).await?
            }
            LedgerFilter::Period { start, end } => {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM governance_entries
                     WHERE decided_at >= $1 AND decided_at <= $2 ORDER BY seq"
                );
                sqlx::query_as::<_, EntryRow>(&sql)
                    .bind(*start.as_datetime())
                    .bind(*end.as_datetime())
                    .fetch_all(&self.pool)
                    .await?
            }
            LedgerFilter::Entity {
                entity_type,
                entity_id,
            } => {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM governance_entries
                     WHERE entity_type = $1 AND entity_id = $2 ORDER BY seq"
                );
                sqlx::query_as::<_, EntryRow>(&sql)
                    .bind(entity_type)
                    .bind(entity_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            LedgerFilter::Actor(actor_id) => {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM governance_entries WHERE actor_id = $1 ORDER BY seq"
                );
                sqlx::query_as::<_, EntryRow>(&sql)
                    .bind(actor_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            LedgerFilter::Category(category) => {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM governance_entries WHERE category = $1 ORDER BY seq"
                );
                sqlx::query_as::<_, EntryRow>(&sql)
                    .bind(category.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(EntryRow::into_record).collect()
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let (writes, entries) = batch.into_parts();
        let mut tx = self.pool.begin().await?;
        for write in &writes {
            apply_write(&mut *tx, write).await?;
        }
        for entry in &entries {
            insert_entry(&mut *tx, entry).await?;
        }
        tx.commit().await?;
        tracing::debug!(writes = writes.len(), entries = entries.len(), "Batch committed");
        Ok(())
    }
}

// ─── Writes ──────────────────────────────────────────────────────────

async fn apply_write(conn: &mut PgConnection, write: &RecordWrite) -> Result<(), StoreError> {
    match write {
        RecordWrite::InsertDocument(doc) => insert_document(conn, doc).await,
        RecordWrite::UpdateDocument { document, expected } => {
            update_document(conn, document, *expected).await
        }
        RecordWrite::InsertTransaction(t) => insert_transaction(conn, t).await,
        RecordWrite::UpdateTransactionStatus {
            transaction,
            expected,
        } => update_transaction_status(conn, transaction, *expected).await,
        RecordWrite::AttachTransactionReferences { id, references, at } => {
            attach_references(conn, *id, references, *at).await
        }
        RecordWrite::PutFiscalConfiguration(config) => put_fiscal(conn, config).await,
    }
}

async fn insert_document(conn: &mut PgConnection, doc: &RightsDocument) -> Result<(), StoreError> {
    let terms = doc.terms();
    let lifecycle = doc.lifecycle();
    let result = sqlx::query(
        "INSERT INTO rights_documents (id, kind, description, item_id, photo_asset_id, person_ids,
         author_id, author_name, artifact_url, artifact_hash, signature_validated,
         permits_commercial_use, permitted_purposes, permitted_territories,
         usage_restrictions, expires_at, status, reviewer_notes, reviewed_by,
         created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(*doc.id().as_uuid())
    .bind(terms.kind.as_str())
    .bind(&terms.description)
    .bind(terms.item_id.as_ref().map(ItemId::as_str))
    .bind(terms.photo_asset_id.as_ref().map(PhotoAssetId::as_str))
    .bind(terms.person_ids.iter().map(|p| p.as_str().to_string()).collect::<Vec<_>>())
    .bind(terms.author_id.as_str())
    .bind(&terms.author_name)
    .bind(&terms.artifact_url)
    .bind(&terms.artifact_hash)
    .bind(terms.signature_validated)
    .bind(terms.permits_commercial_use)
    .bind(terms.permitted_purposes.iter().map(|p| p.as_str().to_string()).collect::<Vec<_>>())
    .bind(terms.permitted_territories.iter().map(|t| t.as_str().to_string()).collect::<Vec<_>>())
    .bind(&terms.usage_restrictions)
    .bind(terms.expires_at.map(|t| *t.as_datetime()))
    .bind(lifecycle.status.as_str())
    .bind(&lifecycle.reviewer_notes)
    .bind(&lifecycle.reviewed_by)
    .bind(*lifecycle.created_at.as_datetime())
    .bind(*lifecycle.updated_at.as_datetime())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Duplicate {
            kind: RecordKind::Document,
            id: doc.id().to_string(),
        });
    }
    Ok(())
}

/// Only lifecycle columns are written; terms are write-once. The row must
/// still carry `expected`.
async fn update_document(
    conn: &mut PgConnection,
    doc: &RightsDocument,
    expected: DocumentStatus,
) -> Result<(), StoreError> {
    let lifecycle = doc.lifecycle();
    let result = sqlx::query(
        "UPDATE rights_documents
         SET status = $2, reviewer_notes = $3, reviewed_by = $4, updated_at = $5
         WHERE id = $1 AND status = $6",
    )
    .bind(*doc.id().as_uuid())
    .bind(lifecycle.status.as_str())
    .bind(&lifecycle.reviewer_notes)
    .bind(&lifecycle.reviewed_by)
    .bind(*lifecycle.updated_at.as_datetime())
    .bind(expected.as_str())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(unmatched_update(
            conn,
            RecordKind::Document,
            "SELECT status FROM rights_documents WHERE id = $1",
            *doc.id().as_uuid(),
            expected.as_str(),
        )
        .await);
    }
    Ok(())
}

async fn insert_transaction(conn: &mut PgConnection, t: &Transaction) -> Result<(), StoreError> {
    let split = t.split();
    let result = sqlx::query(
        "INSERT INTO transactions (id, item_id, beneficiary_id, licensee_id, gross_amount,
         commission_amount, net_amount, beneficiary_percentage, commission_percentage,
         license_type, currency, exchange_rate, payout_destination, financial_status,
         gateway_reference, receipt_reference, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(*t.id().as_uuid())
    .bind(t.item_id().as_str())
    .bind(t.beneficiary_id().as_str())
    .bind(t.licensee_id().as_str())
    .bind(split.gross.to_string())
    .bind(split.commission.to_string())
    .bind(split.net.to_string())
    .bind(split.beneficiary_percentage.fraction().to_string())
    .bind(split.commission_percentage.fraction().to_string())
    .bind(t.license_type().as_str())
    .bind(t.currency())
    .bind(t.exchange_rate().map(|r| r.to_string()))
    .bind(t.payout_destination())
    .bind(t.status().as_str())
    .bind(&t.references().gateway_reference)
    .bind(&t.references().receipt_reference)
    .bind(*t.created_at().as_datetime())
    .bind(*t.updated_at().as_datetime())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Duplicate {
            kind: RecordKind::Transaction,
            id: t.id().to_string(),
        });
    }
    Ok(())
}

/// Writes status only. Amount and reference columns never appear in the
/// SET list, and the row must still carry `expected`.
async fn update_transaction_status(
    conn: &mut PgConnection,
    t: &Transaction,
    expected: FinancialStatus,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        "UPDATE transactions
         SET financial_status = $2, updated_at = $3
         WHERE id = $1 AND financial_status = $4",
    )
    .bind(*t.id().as_uuid())
    .bind(t.status().as_str())
    .bind(*t.updated_at().as_datetime())
    .bind(expected.as_str())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(unmatched_update(
            conn,
            RecordKind::Transaction,
            "SELECT financial_status FROM transactions WHERE id = $1",
            *t.id().as_uuid(),
            expected.as_str(),
        )
        .await);
    }
    Ok(())
}

/// Absent references keep the stored column.
async fn attach_references(
    conn: &mut PgConnection,
    id: TransactionId,
    references: &TransactionReferences,
    at: Timestamp,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        "UPDATE transactions
         SET gateway_reference = COALESCE($2, gateway_reference),
             receipt_reference = COALESCE($3, receipt_reference),
             updated_at = $4
         WHERE id = $1",
    )
    .bind(*id.as_uuid())
    .bind(&references.gateway_reference)
    .bind(&references.receipt_reference)
    .bind(*at.as_datetime())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Missing {
            kind: RecordKind::Transaction,
            id: id.to_string(),
        });
    }
    Ok(())
}

/// A guarded update matched no row: either the record is gone or another
/// writer moved its status first. `status_sql` selects the current status.
async fn unmatched_update(
    conn: &mut PgConnection,
    kind: RecordKind,
    status_sql: &str,
    id: Uuid,
    expected: &str,
) -> StoreError {
    let found = sqlx::query_scalar::<_, String>(status_sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;
    match found {
        Ok(Some(found)) => StoreError::Conflict {
            kind,
            id: id.to_string(),
            expected: expected.to_string(),
            found,
        },
        Ok(None) => StoreError::Missing {
            kind,
            id: id.to_string(),
        },
        Err(err) => err.into(),
    }
}

async fn put_fiscal(conn: &mut PgConnection, config: &FiscalConfiguration) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO fiscal_configuration
         (key, beneficiary_percentage, platform_percentage, legal_note, updated_at, updated_by)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (key) DO UPDATE SET
           beneficiary_percentage = EXCLUDED.beneficiary_percentage,
           platform_percentage = EXCLUDED.platform_percentage,
           legal_note = EXCLUDED.legal_note,
           updated_at = EXCLUDED.updated_at,
           updated_by = EXCLUDED.updated_by",
    )
    .bind(FISCAL_CONFIGURATION_KEY)
    .bind(config.beneficiary_percentage.fraction().to_string())
    .bind(config.platform_percentage.fraction().to_string())
    .bind(&config.legal_note)
    .bind(*config.updated_at.as_datetime())
    .bind(&config.updated_by)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_entry(conn: &mut PgConnection, entry: &GovernanceEntry) -> Result<(), StoreError> {
    let result = sqlx::query(
        "INSERT INTO governance_entries (id, category, entity_type, entity_id, decision,
         justification, actor_id, actor_role, decided_at, digest)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(*entry.id().as_uuid())
    .bind(entry.category().as_str())
    .bind(entry.entity_type())
    .bind(entry.entity_id())
    .bind(entry.decision())
    .bind(entry.justification())
    .bind(entry.actor_id())
    .bind(entry.actor_role())
    .bind(*entry.decided_at().as_datetime())
    .bind(entry.digest())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Duplicate {
            kind: RecordKind::GovernanceEntry,
            id: entry.id().to_string(),
        });
    }
    Ok(())
}

// ─── Catalog ─────────────────────────────────────────────────────────

/// [`ArchiveCatalog`] reading the `archive_items` and `beneficiaries` tables.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Wrap a connected pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveCatalog for PgCatalog {
    async fn item(&self, id: &ItemId) -> Result<Option<CatalogItem>, StoreError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, title, base_price, available_for_licensing FROM archive_items WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(ItemRow::into_record).transpose()
    }

    async fn beneficiary(&self, id: &BeneficiaryId) -> Result<Option<Beneficiary>, StoreError> {
        let row = sqlx::query_as::<_, BeneficiaryRow>(
            "SELECT id, display_name, payout_destination FROM beneficiaries WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(BeneficiaryRow::into_record))
    }
}

// ─── Row types ───────────────────────────────────────────────────────

fn parse_all<T: FromStr>(
    kind: RecordKind,
    id: &dyn std::fmt::Display,
    values: Vec<String>,
) -> Result<BTreeSet<T>, StoreError>
where
    T: Ord,
    T::Err: std::fmt::Display,
{
    values
        .iter()
        .map(|v| T::from_str(v).map_err(|e| StoreError::corrupt(kind, id.to_string(), e)))
        .collect()
}

fn parse_field<T: FromStr>(
    kind: RecordKind,
    id: &dyn std::fmt::Display,
    value: &str,
) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|e| StoreError::corrupt(kind, id.to_string(), e))
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    kind: String,
    description: String,
    item_id: Option<String>,
    photo_asset_id: Option<String>,
    person_ids: Vec<String>,
    author_id: String,
    author_name: String,
    artifact_url: Option<String>,
    artifact_hash: Option<String>,
    signature_validated: bool,
    permits_commercial_use: bool,
    permitted_purposes: Vec<String>,
    permitted_territories: Vec<String>,
    usage_restrictions: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    status: String,
    reviewer_notes: Option<String>,
    reviewed_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_record(self) -> Result<RightsDocument, StoreError> {
        const K: RecordKind = RecordKind::Document;
        let id = self.id;
        let terms = DocumentTerms {
            kind: parse_field::<DocumentKind>(K, &id, &self.kind)?,
            description: self.description,
            item_id: self.item_id.map(ItemId::new),
            photo_asset_id: self.photo_asset_id.map(PhotoAssetId::new),
            person_ids: self.person_ids.into_iter().map(PersonId::new).collect(),
            author_id: PersonId::new(self.author_id),
            author_name: self.author_name,
            artifact_url: self.artifact_url,
            artifact_hash: self.artifact_hash,
            signature_validated: self.signature_validated,
            permits_commercial_use: self.permits_commercial_use,
            permitted_purposes: parse_all::<Purpose>(K, &id, self.permitted_purposes)?,
            permitted_territories: parse_all::<Territory>(K, &id, self.permitted_territories)?,
            usage_restrictions: self.usage_restrictions,
            expires_at: self.expires_at.map(Timestamp::from_utc),
        };
        let lifecycle = DocumentLifecycle {
            status: parse_field::<DocumentStatus>(K, &id, &self.status)?,
            reviewer_notes: self.reviewer_notes,
            reviewed_by: self.reviewed_by,
            created_at: Timestamp::from_utc(self.created_at),
            updated_at: Timestamp::from_utc(self.updated_at),
        };
        Ok(RightsDocument::restore(DocumentId::from_uuid(id), terms, lifecycle))
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    item_id: String,
    beneficiary_id: String,
    licensee_id: String,
    gross_amount: String,
    commission_amount: String,
    net_amount: String,
    beneficiary_percentage: String,
    commission_percentage: String,
    license_type: String,
    currency: String,
    exchange_rate: Option<String>,
    payout_destination: String,
    financial_status: String,
    gateway_reference: Option<String>,
    receipt_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_record(self) -> Result<Transaction, StoreError> {
        const K: RecordKind = RecordKind::Transaction;
        let id = self.id;
        let split = SplitAmounts {
            gross: parse_field::<Money>(K, &id, &self.gross_amount)?,
            commission: parse_field::<Money>(K, &id, &self.commission_amount)?,
            net: parse_field::<Money>(K, &id, &self.net_amount)?,
            beneficiary_percentage: Percentage::parse(&self.beneficiary_percentage)
                .map_err(|e| StoreError::corrupt(K, id, e))?,
            commission_percentage: Percentage::parse(&self.commission_percentage)
                .map_err(|e| StoreError::corrupt(K, id, e))?,
        };
        let exchange_rate = self
            .exchange_rate
            .as_deref()
            .map(|r| parse_field::<Decimal>(K, &id, r))
            .transpose()?;
        let proposal = LicenseProposal {
            item_id: ItemId::new(self.item_id),
            beneficiary_id: BeneficiaryId::new(self.beneficiary_id),
            licensee_id: LicenseeId::new(self.licensee_id),
            license_type: parse_field::<LicenseType>(K, &id, &self.license_type)?,
            currency: self.currency,
            exchange_rate,
            gateway_reference: self.gateway_reference,
        };
        let status = parse_field::<FinancialStatus>(K, &id, &self.financial_status)?;
        Transaction::restore(
            TransactionId::from_uuid(id),
            proposal,
            split,
            self.payout_destination,
            status,
            self.receipt_reference,
            Timestamp::from_utc(self.created_at),
            Timestamp::from_utc(self.updated_at),
        )
        .map_err(|e| StoreError::corrupt(K, id, e))
    }
}

#[derive(sqlx::FromRow)]
struct FiscalRow {
    beneficiary_percentage: String,
    platform_percentage: String,
    legal_note: Option<String>,
    updated_at: DateTime<Utc>,
    updated_by: String,
}

impl FiscalRow {
    fn into_record(self) -> Result<FiscalConfiguration, StoreError> {
        let corrupt =
            |e: MoneyError| StoreError::corrupt(RecordKind::FiscalConfiguration, FISCAL_CONFIGURATION_KEY, e);
        Ok(FiscalConfiguration::new(
            Percentage::parse(&self.beneficiary_percentage).map_err(corrupt)?,
            Percentage::parse(&self.platform_percentage).map_err(corrupt)?,
            self.legal_note,
            self.updated_by,
            Timestamp::from_utc(self.updated_at),
        ))
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    category: String,
    entity_type: String,
    entity_id: String,
    decision: String,
    justification: String,
    actor_id: String,
    actor_role: String,
    decided_at: DateTime<Utc>,
    digest: String,
}

impl EntryRow {
    fn into_record(self) -> Result<GovernanceEntry, StoreError> {
        const K: RecordKind = RecordKind::GovernanceEntry;
        let id = self.id;
        let decision = Decision {
            category: parse_field::<DecisionCategory>(K, &id, &self.category)?,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            label: self.decision,
            justification: self.justification,
        };
        GovernanceEntry::restore(
            EntryId::from_uuid(id),
            decision,
            self.actor_id,
            self.actor_role,
            Timestamp::from_utc(self.decided_at),
            self.digest,
        )
        .map_err(|e| StoreError::corrupt(K, id, e))
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    title: String,
    base_price: String,
    available_for_licensing: bool,
}

impl ItemRow {
    fn into_record(self) -> Result<CatalogItem, StoreError> {
        let base_price = parse_field::<Money>(RecordKind::Item, &self.id, &self.base_price)?;
        Ok(CatalogItem {
            id: ItemId::new(self.id),
            title: self.title,
            base_price,
            available_for_licensing: self.available_for_licensing,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BeneficiaryRow {
    id: String,
    display_name: String,
    payout_destination: String,
}

impl BeneficiaryRow {
    fn into_record(self) -> Beneficiary {
        Beneficiary {
            id: BeneficiaryId::new(self.id),
            display_name: self.display_name,
            payout_destination: self.payout_destination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acervo_core::ActorContext;

    fn now() -> DateTime<Utc> {
        *Timestamp::now().as_datetime()
    }

    fn document_row() -> DocumentRow {
        DocumentRow {
            id: Uuid::new_v4(),
            kind: "assignment_of_copyright".into(),
            description: "cessão".into(),
            item_id: Some("item-1".into()),
            photo_asset_id: None,
            person_ids: vec!["p-1".into(), "p-2".into()],
            author_id: "author-1".into(),
            author_name: "Fotógrafo".into(),
            artifact_url: Some("s3://docs/1.pdf".into()),
            artifact_hash: None,
            signature_validated: true,
            permits_commercial_use: true,
            permitted_purposes: vec!["editorial".into(), "commercial".into()],
            permitted_territories: vec![],
            usage_restrictions: None,
            expires_at: None,
            status: "VALIDATED".into(),
            reviewer_notes: Some("ok".into()),
            reviewed_by: Some("ana".into()),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn transaction_row() -> TransactionRow {
        TransactionRow {
            id: Uuid::new_v4(),
            item_id: "item-1".into(),
            beneficiary_id: "b-1".into(),
            licensee_id: "l-1".into(),
            gross_amount: "1000.00".into(),
            commission_amount: "150.00".into(),
            net_amount: "850.00".into(),
            beneficiary_percentage: "0.85".into(),
            commission_percentage: "0.15".into(),
            license_type: "editorial".into(),
            currency: "BRL".into(),
            exchange_rate: Some("5.4321".into()),
            payout_destination: "pix:b-1".into(),
            financial_status: "SETTLED".into(),
            gateway_reference: None,
            receipt_reference: Some("r-1".into()),
            created_at: now(),
            updated_at: now(),
        }
    }

    // ── document rows ────────────────────────────────────────────────

    #[test]
    fn document_row_maps_sets_and_status() {
        let doc = document_row().into_record().unwrap();
        assert_eq!(doc.status(), DocumentStatus::Validated);
        assert_eq!(doc.terms().person_ids.len(), 2);
        assert!(doc.allows_purpose(Purpose::Editorial));
        assert!(!doc.allows_purpose(Purpose::Advertising));
        assert!(doc.allows_territory(Territory::International));
        assert!(doc.permits_licensing(Timestamp::now()));
    }

    #[test]
    fn unknown_purpose_is_corrupt() {
        let mut row = document_row();
        row.permitted_purposes = vec!["propaganda".into()];
        assert!(matches!(row.into_record(), Err(StoreError::Corrupt { .. })));
    }

    // ── transaction rows ─────────────────────────────────────────────

    #[test]
    fn transaction_row_maps_amounts() {
        let t = transaction_row().into_record().unwrap();
        assert_eq!(t.split().net, Money::parse("850").unwrap());
        assert_eq!(t.status(), FinancialStatus::Settled);
        assert_eq!(t.exchange_rate(), Some(Decimal::new(54321, 4)));
        assert_eq!(t.references().receipt_reference.as_deref(), Some("r-1"));
    }

    #[test]
    fn unbalanced_transaction_row_is_corrupt() {
        let mut row = transaction_row();
        row.net_amount = "900.00".into();
        assert!(matches!(row.into_record(), Err(StoreError::Corrupt { .. })));
    }

    // ── governance rows ──────────────────────────────────────────────

    #[test]
    fn entry_row_roundtrips_digest() {
        let entry = GovernanceEntry::new(
            Decision::new(DecisionCategory::Financial, "transaction", "t-1", "LICENSE_SETTLED"),
            &ActorContext::new("op", "FINANCE"),
            Timestamp::now(),
        );
        let row = EntryRow {
            id: *entry.id().as_uuid(),
            category: "financial".into(),
            entity_type: "transaction".into(),
            entity_id: "t-1".into(),
            decision: "LICENSE_SETTLED".into(),
            justification: String::new(),
            actor_id: "op".into(),
            actor_role: "FINANCE".into(),
            decided_at: *entry.decided_at().as_datetime(),
            digest: entry.digest().to_string(),
        };
        assert_eq!(row.into_record().unwrap(), entry);
    }

    #[test]
    fn tampered_entry_row_is_corrupt() {
        let entry = GovernanceEntry::new(
            Decision::new(DecisionCategory::Legal, "rights_document", "d-1", "DOCUMENT_VALIDATED"),
            &ActorContext::system(),
            Timestamp::now(),
        );
        let row = EntryRow {
            id: *entry.id().as_uuid(),
            category: "legal".into(),
            entity_type: "rights_document".into(),
            entity_id: "d-1".into(),
            decision: "DOCUMENT_REJECTED".into(),
            justification: String::new(),
            actor_id: "system".into(),
            actor_role: "SYSTEM".into(),
            decided_at: *entry.decided_at().as_datetime(),
            digest: entry.digest().to_string(),
        };
        assert!(matches!(row.into_record(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn fiscal_row_rejects_out_of_range_percentage() {
        let row = FiscalRow {
            beneficiary_percentage: "1.5".into(),
            platform_percentage: "0.15".into(),
            legal_note: None,
            updated_at: now(),
            updated_by: "admin".into(),
        };
        assert!(row.into_record().is_err());
    }

    #[test]
    fn item_row_parses_price() {
        let item = ItemRow {
            id: "item-1".into(),
            title: "Copa 1970".into(),
            base_price: "1000.00".into(),
            available_for_licensing: false,
        }
        .into_record()
        .unwrap();
        assert_eq!(item.base_price, Money::parse("1000").unwrap());
        assert!(!item.available_for_licensing);
    }
}
