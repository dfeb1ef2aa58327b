//! SQLite-backed state store.
//!
//! Every record is a JSON document in one `records` table, keyed by
//! `(kind, id)` with a couple of indexed columns for the queries the handlers
//! need. `created_seq` preserves insertion order across upserts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use starbridge_domain::*;

use crate::infrastructure::ports::{
    CampaignRepo, Change, ChangeSet, ClockPort, ContactRepo, FuelSourceRepo, LibraryRepo,
    OrderRepo, RepoError, ShipLogRepo, ShipRepo, TransmissionRepo, UnitOfWork,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Campaign,
    Ship,
    Contact,
    Order,
    Transmission,
    FuelSource,
    LogEntry,
    Library,
}

impl RecordKind {
    fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Campaign => "campaign",
            RecordKind::Ship => "ship",
            RecordKind::Contact => "contact",
            RecordKind::Order => "order",
            RecordKind::Transmission => "transmission",
            RecordKind::FuelSource => "fuel_source",
            RecordKind::LogEntry => "log_entry",
            RecordKind::Library => "library",
        }
    }
}

/// Secondary keys stored next to a record.
#[derive(Default)]
struct RecordKeys {
    campaign_id: Option<String>,
    parent_id: Option<String>,
    search_text: Option<String>,
}

impl RecordKeys {
    fn campaign(id: CampaignId) -> Self {
        Self {
            campaign_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn parent(mut self, id: impl ToString) -> Self {
        self.parent_id = Some(id.to_string());
        self
    }
}

/// A serialized row, ready to upsert.
struct Record {
    kind: RecordKind,
    id: String,
    keys: RecordKeys,
    json: String,
}

impl Record {
    fn encode<T: Serialize>(
        kind: RecordKind,
        id: impl ToString,
        keys: RecordKeys,
        value: &T,
    ) -> Result<Self, RepoError> {
        let json =
            serde_json::to_string(value).map_err(|e| RepoError::Serialization(e.to_string()))?;
        Ok(Self {
            kind,
            id: id.to_string(),
            keys,
            json,
        })
    }

    fn campaign(campaign: &Campaign) -> Result<Self, RepoError> {
        Self::encode(
            RecordKind::Campaign,
            campaign.id,
            RecordKeys::campaign(campaign.id),
            campaign,
        )
    }

    fn ship(ship: &Ship) -> Result<Self, RepoError> {
        Self::encode(
            RecordKind::Ship,
            ship.id,
            RecordKeys::campaign(ship.campaign_id),
            ship,
        )
    }

    fn contact(contact: &Contact) -> Result<Self, RepoError> {
        Self::encode(
            RecordKind::Contact,
            contact.id,
            RecordKeys::campaign(contact.campaign_id),
            contact,
        )
    }

    fn order(order: &Order) -> Result<Self, RepoError> {
        Self::encode(
            RecordKind::Order,
            order.id,
            RecordKeys::default().parent(order.ship_id),
            order,
        )
    }

    fn transmission(transmission: &Transmission) -> Result<Self, RepoError> {
        let mut keys = RecordKeys::campaign(transmission.campaign_id);
        if let Some(ship_id) = transmission.ship_id {
            keys = keys.parent(ship_id);
        }
        Self::encode(RecordKind::Transmission, transmission.id, keys, transmission)
    }

    fn fuel_source(source: &FuelSource) -> Result<Self, RepoError> {
        Self::encode(
            RecordKind::FuelSource,
            source.id,
            RecordKeys::campaign(source.campaign_id),
            source,
        )
    }

    fn log_entry(entry: &ShipLogEntry) -> Result<Self, RepoError> {
        Self::encode(
            RecordKind::LogEntry,
            entry.id,
            RecordKeys::campaign(entry.campaign_id).parent(entry.ship_id),
            entry,
        )
    }

    fn library(entry: &LibraryEntry) -> Result<Self, RepoError> {
        let keys = RecordKeys {
            search_text: Some(entry.search_text()),
            ..Default::default()
        };
        Self::encode(RecordKind::Library, entry.id, keys, entry)
    }
}

enum Write {
    Upsert(Record),
    Delete(RecordKind, String),
}

impl Write {
    fn from_change(change: &Change) -> Result<Self, RepoError> {
        Ok(match change {
            Change::Campaign(campaign) => Write::Upsert(Record::campaign(campaign)?),
            Change::Ship(ship) => Write::Upsert(Record::ship(ship)?),
            Change::Contact(contact) => Write::Upsert(Record::contact(contact)?),
            Change::RemoveContact(id) => Write::Delete(RecordKind::Contact, id.to_string()),
            Change::Order(order) => Write::Upsert(Record::order(order)?),
            Change::RemoveOrder(id) => Write::Delete(RecordKind::Order, id.to_string()),
            Change::FuelSource(source) => Write::Upsert(Record::fuel_source(source)?),
            Change::LogEntry(entry) => Write::Upsert(Record::log_entry(entry)?),
        })
    }
}

async fn upsert<'e, E>(executor: E, record: Record, now: String) -> Result<(), RepoError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO records
            (kind, id, campaign_id, parent_id, search_text, data_json, created_seq, updated_at)
        VALUES
            (?, ?, ?, ?, ?, ?, (SELECT COALESCE(MAX(created_seq), 0) + 1 FROM records), ?)
        ON CONFLICT(kind, id) DO UPDATE SET
            campaign_id = excluded.campaign_id,
            parent_id = excluded.parent_id,
            search_text = excluded.search_text,
            data_json = excluded.data_json,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(record.kind.as_str())
    .bind(record.id)
    .bind(record.keys.campaign_id)
    .bind(record.keys.parent_id)
    .bind(record.keys.search_text)
    .bind(record.json)
    .bind(now)
    .execute(executor)
    .await
    .map_err(|e| RepoError::database("save", e))?;

    Ok(())
}

async fn delete<'e, E>(executor: E, kind: RecordKind, id: String) -> Result<(), RepoError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM records WHERE kind = ? AND id = ?")
        .bind(kind.as_str())
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| RepoError::database("delete", e))?;
    Ok(())
}

enum Filter {
    All,
    Campaign(String),
    Parent(String),
}

/// SQLite implementation of every repository port.
pub struct SqliteStore {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteStore {
    /// Open (or create) a store file.
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool, clock).await
    }

    /// A private in-memory store. Used by tests and throwaway servers.
    pub async fn in_memory(clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        // One connection that never idles out, or the database goes with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool, clock).await
    }

    async fn with_pool(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                kind TEXT NOT NULL,
                id TEXT NOT NULL,
                campaign_id TEXT,
                parent_id TEXT,
                search_text TEXT,
                data_json TEXT NOT NULL,
                created_seq INTEGER NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (kind, id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("migrate", e))?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_records_campaign ON records (kind, campaign_id)",
            "CREATE INDEX IF NOT EXISTS idx_records_parent ON records (kind, parent_id)",
        ] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RepoError::database("migrate", e))?;
        }

        Ok(Self { pool, clock })
    }

    fn timestamp(&self) -> String {
        self.clock.now().to_rfc3339()
    }

    async fn put(&self, record: Record) -> Result<(), RepoError> {
        upsert(&self.pool, record, self.timestamp()).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        id: String,
    ) -> Result<Option<T>, RepoError> {
        let row = sqlx::query("SELECT data_json FROM records WHERE kind = ? AND id = ?")
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get", e))?;

        row.map(|row| decode(row.get("data_json"))).transpose()
    }

    async fn fetch_all<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        filter: Filter,
    ) -> Result<Vec<T>, RepoError> {
        let (sql, key) = match filter {
            Filter::All => (
                "SELECT data_json FROM records WHERE kind = ? ORDER BY created_seq, rowid",
                None,
            ),
            Filter::Campaign(id) => (
                "SELECT data_json FROM records WHERE kind = ? AND campaign_id = ? \
                 ORDER BY created_seq, rowid",
                Some(id),
            ),
            Filter::Parent(id) => (
                "SELECT data_json FROM records WHERE kind = ? AND parent_id = ? \
                 ORDER BY created_seq, rowid",
                Some(id),
            ),
        };

        let mut query = sqlx::query(sql).bind(kind.as_str());
        if let Some(key) = key {
            query = query.bind(key);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list", e))?;

        rows.iter().map(|row| decode(row.get("data_json"))).collect()
    }

    async fn remove(&self, kind: RecordKind, id: String) -> Result<(), RepoError> {
        delete(&self.pool, kind, id).await
    }
}

fn decode<T: DeserializeOwned>(json: String) -> Result<T, RepoError> {
    serde_json::from_str(&json).map_err(|e| RepoError::Serialization(e.to_string()))
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl UnitOfWork for SqliteStore {
    async fn commit(&self, changes: ChangeSet) -> Result<(), RepoError> {
        if changes.is_empty() {
            return Ok(());
        }
        // Encode everything first so a serialization error never opens a transaction.
        let writes = changes
            .changes()
            .iter()
            .map(Write::from_change)
            .collect::<Result<Vec<_>, _>>()?;
        let now = self.timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("begin", e))?;

        // Returning early drops `tx`, which rolls back.
        for write in writes {
            match write {
                Write::Upsert(record) => upsert(&mut *tx, record, now.clone()).await?,
                Write::Delete(kind, id) => delete(&mut *tx, kind, id).await?,
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("commit", e))?;

        tracing::debug!(writes = changes.len(), "Change set committed");
        Ok(())
    }
}

#[async_trait]
impl CampaignRepo for SqliteStore {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError> {
        self.fetch(RecordKind::Campaign, id.to_string()).await
    }

    async fn save(&self, campaign: &Campaign) -> Result<(), RepoError> {
        self.put(Record::campaign(campaign)?).await
    }

    async fn list(&self) -> Result<Vec<Campaign>, RepoError> {
        self.fetch_all(RecordKind::Campaign, Filter::All).await
    }
}

#[async_trait]
impl ShipRepo for SqliteStore {
    async fn get(&self, id: ShipId) -> Result<Option<Ship>, RepoError> {
        self.fetch(RecordKind::Ship, id.to_string()).await
    }

    async fn save(&self, ship: &Ship) -> Result<(), RepoError> {
        self.put(Record::ship(ship)?).await
    }

    async fn list_in_campaign(&self, campaign_id: CampaignId) -> Result<Vec<Ship>, RepoError> {
        self.fetch_all(RecordKind::Ship, Filter::Campaign(campaign_id.to_string()))
            .await
    }
}

#[async_trait]
impl ContactRepo for SqliteStore {
    async fn get(&self, id: ContactId) -> Result<Option<Contact>, RepoError> {
        self.fetch(RecordKind::Contact, id.to_string()).await
    }

    async fn save(&self, contact: &Contact) -> Result<(), RepoError> {
        self.put(Record::contact(contact)?).await
    }

    async fn delete(&self, id: ContactId) -> Result<(), RepoError> {
        self.remove(RecordKind::Contact, id.to_string()).await
    }

    async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<Contact>, RepoError> {
        self.fetch_all(RecordKind::Contact, Filter::Campaign(campaign_id.to_string()))
            .await
    }
}

#[async_trait]
impl OrderRepo for SqliteStore {
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError> {
        self.fetch(RecordKind::Order, id.to_string()).await
    }

    async fn save(&self, order: &Order) -> Result<(), RepoError> {
        self.put(Record::order(order)?).await
    }

    async fn list_for_ship(&self, ship_id: ShipId) -> Result<Vec<Order>, RepoError> {
        self.fetch_all(RecordKind::Order, Filter::Parent(ship_id.to_string()))
            .await
    }
}

#[async_trait]
impl TransmissionRepo for SqliteStore {
    async fn get(&self, id: TransmissionId) -> Result<Option<Transmission>, RepoError> {
        self.fetch(RecordKind::Transmission, id.to_string()).await
    }

    async fn save(&self, transmission: &Transmission) -> Result<(), RepoError> {
        self.put(Record::transmission(transmission)?).await
    }

    async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
        include_archived: bool,
    ) -> Result<Vec<Transmission>, RepoError> {
        let all: Vec<Transmission> = self
            .fetch_all(
                RecordKind::Transmission,
                Filter::Campaign(campaign_id.to_string()),
            )
            .await?;
        Ok(all
            .into_iter()
            .filter(|t| include_archived || !t.archived)
            .collect())
    }
}

#[async_trait]
impl FuelSourceRepo for SqliteStore {
    async fn get(&self, id: FuelSourceId) -> Result<Option<FuelSource>, RepoError> {
        self.fetch(RecordKind::FuelSource, id.to_string()).await
    }

    async fn save(&self, source: &FuelSource) -> Result<(), RepoError> {
        self.put(Record::fuel_source(source)?).await
    }

    async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<FuelSource>, RepoError> {
        self.fetch_all(
            RecordKind::FuelSource,
            Filter::Campaign(campaign_id.to_string()),
        )
        .await
    }
}

#[async_trait]
impl ShipLogRepo for SqliteStore {
    async fn append(&self, entry: &ShipLogEntry) -> Result<(), RepoError> {
        self.put(Record::log_entry(entry)?).await
    }

    async fn list_for_ship(
        &self,
        ship_id: ShipId,
        limit: u32,
    ) -> Result<Vec<ShipLogEntry>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT data_json FROM records
            WHERE kind = ? AND parent_id = ?
            ORDER BY created_seq DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(RecordKind::LogEntry.as_str())
        .bind(ship_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list", e))?;

        let mut entries = rows
            .iter()
            .map(|row| decode(row.get("data_json")))
            .collect::<Result<Vec<ShipLogEntry>, _>>()?;
        entries.reverse();
        Ok(entries)
    }
}

#[async_trait]
impl LibraryRepo for SqliteStore {
    async fn save(&self, entry: &LibraryEntry) -> Result<(), RepoError> {
        self.put(Record::library(entry)?).await
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM records WHERE kind = ?")
            .bind(RecordKind::Library.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count", e))?;
        let n: i64 = row.get("n");
        Ok(u64::try_from(n).unwrap_or_default())
    }

    async fn search(
        &self,
        query: &LibraryQuery,
        limit: u32,
    ) -> Result<Vec<LibraryEntry>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT data_json FROM records
            WHERE kind = ? AND search_text LIKE ? ESCAPE '\'
            ORDER BY created_seq, rowid
            LIMIT ?
            "#,
        )
        .bind(RecordKind::Library.as_str())
        .bind(like_pattern(query.as_str()))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("search", e))?;

        rows.iter().map(|row| decode(row.get("data_json"))).collect()
    }
}

#[cfg(test)]
impl SqliteStore {
    /// Make every write of `kind` fail the way a full disk would.
    pub(crate) async fn reject_writes_of(&self, kind: &str) {
        for event in ["INSERT", "UPDATE"] {
            let trigger = format!(
                "CREATE TRIGGER reject_{kind}_{event} BEFORE {event} ON records \
                 WHEN NEW.kind = '{kind}' \
                 BEGIN SELECT RAISE(ABORT, 'database or disk is full'); END"
            );
            sqlx::query(&trigger)
                .execute(&self.pool)
                .await
                .expect("trigger");
        }
    }
}
