// SQLite history of upload summaries, capped at a retention ceiling.
// Insert + evict run in one transaction behind a single-writer lock, so readers see
// either the state before an insert or after its eviction, never in between.

pub mod retention;

use crate::error::{Error, Result};
use crate::models::{SummaryFields, SummaryRecord, TypeDistribution};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::{info, instrument};

pub use retention::RETENTION_CEILING;

const SELECT_COLUMNS: &str = "SELECT id, file_name, uploaded_at, total_count, avg_flowrate, avg_pressure, avg_temperature, type_distribution FROM summaries";

pub struct HistoryStore {
    pool: SqlitePool,
    retention_limit: u32,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Open (or create) the database at `path` with WAL and a busy timeout.
    pub async fn connect(
        path: &str,
        max_pool_size: u32,
        retention_limit: u32,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (1..=RETENTION_CEILING).contains(&retention_limit),
            "retention_limit must be between 1 and {}, got {}",
            RETENTION_CEILING,
            retention_limit
        );
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self {
            pool,
            retention_limit,
            write_lock: Mutex::new(()),
        })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name TEXT NOT NULL,
                uploaded_at INTEGER NOT NULL,
                total_count INTEGER NOT NULL,
                avg_flowrate REAL NOT NULL,
                avg_pressure REAL NOT NULL,
                avg_temperature REAL NOT NULL,
                type_distribution TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_summaries_uploaded_at ON summaries(uploaded_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn retention_limit(&self) -> u32 {
        self.retention_limit
    }

    /// Store a new summary stamped with the current time, then evict beyond the ceiling.
    pub async fn insert(&self, fields: SummaryFields) -> Result<SummaryRecord> {
        self.insert_at(fields, Utc::now()).await
    }

    /// Like [`insert`](Self::insert) with an explicit upload time.
    /// The stored time is never earlier than the newest existing record's.
    #[instrument(skip(self, fields), fields(repo = "history", operation = "insert", file_name = %fields.file_name))]
    pub async fn insert_at(
        &self,
        fields: SummaryFields,
        uploaded_at: DateTime<Utc>,
    ) -> Result<SummaryRecord> {
        let distribution_json = serde_json::to_string(&fields.type_distribution)?;

        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let newest =
            sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(uploaded_at) FROM summaries")
                .fetch_one(&mut *tx)
                .await?;
        let uploaded_at_ms = newest.map_or(uploaded_at.timestamp_millis(), |n| {
            n.max(uploaded_at.timestamp_millis())
        });
        let uploaded_at = timestamp_from_millis(uploaded_at_ms)?;

        let id = sqlx::query(
            "INSERT INTO summaries (file_name, uploaded_at, total_count, avg_flowrate, avg_pressure, avg_temperature, type_distribution) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&fields.file_name)
        .bind(uploaded_at_ms)
        .bind(fields.total_count as i64)
        .bind(fields.avg_flowrate)
        .bind(fields.avg_pressure)
        .bind(fields.avg_temperature)
        .bind(&distribution_json)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let evicted = retention::evict_oldest_beyond(&mut *tx, self.retention_limit).await?;
        let count = retention::stored_count(&mut *tx).await?;
        if count > self.retention_limit as u64 {
            // tx is dropped without commit, so the insert is rolled back too.
            tracing::error!(
                count,
                ceiling = self.retention_limit,
                "retention ceiling exceeded after eviction"
            );
            return Err(Error::RetentionViolation {
                count,
                ceiling: self.retention_limit,
            });
        }
        tx.commit().await?;

        if evicted > 0 {
            info!(id, evicted, "evicted summaries beyond retention ceiling");
        }
        Ok(SummaryRecord::from_fields(id, uploaded_at, fields))
    }

    #[instrument(skip(self), fields(repo = "history", operation = "get"))]
    pub async fn get(&self, id: i64) -> Result<SummaryRecord> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Err(Error::NotFound(id));
        };
        parse_record_row(&row)
    }

    /// At most `limit` summaries, newest first. `limit` is capped at the ceiling.
    #[instrument(skip(self), fields(repo = "history", operation = "list_recent"))]
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<SummaryRecord>> {
        let limit = limit.min(self.retention_limit);
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY uploaded_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_record_row).collect()
    }

    pub async fn count(&self) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        Ok(retention::stored_count(&mut *conn).await?)
    }
}

fn timestamp_from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| Error::InvalidRecord(format!("uploaded_at out of range: {ms}")))
}

fn parse_record_row(row: &sqlx::sqlite::SqliteRow) -> Result<SummaryRecord> {
    let id: i64 = row.try_get("id")?;
    let file_name: String = row.try_get("file_name")?;
    let uploaded_at: i64 = row.try_get("uploaded_at")?;
    let total_count: i64 = row.try_get("total_count")?;
    let avg_flowrate: f64 = row.try_get("avg_flowrate")?;
    let avg_pressure: f64 = row.try_get("avg_pressure")?;
    let avg_temperature: f64 = row.try_get("avg_temperature")?;
    let type_distribution: String = row.try_get("type_distribution")?;
    let type_distribution: TypeDistribution = serde_json::from_str(&type_distribution)?;

    Ok(SummaryRecord {
        id,
        file_name,
        uploaded_at: timestamp_from_millis(uploaded_at)?,
        total_count: total_count.max(0) as u64,
        avg_flowrate,
        avg_pressure,
        avg_temperature,
        type_distribution,
    })
}
