//! Persistence for punch records
//!
//! The punch table belongs to the biometric vendor's software, so every
//! identifier is quoted to preserve its mixed-case spelling. Rows are never
//! deleted: marking a record synced flips `"IsSync"` and the fetch predicate
//! skips flipped rows from then on.

use crate::config::DatabaseConfig;
use crate::error::{Result, SyncError};
use crate::model::PunchRecord;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source and sink for punch records.
///
/// `mark_synced` takes the identifying triple rather than a row id; the
/// vendor table has no primary key, so every row matching the triple is
/// updated together.
#[async_trait]
pub trait RecordStore: Send {
    /// All records not yet synced, oldest punch first
    async fn fetch_pending(&mut self) -> Result<Vec<PunchRecord>>;

    /// Flag every row matching the triple as synced, returning rows affected
    async fn mark_synced(
        &mut self,
        punch_datetime: &str,
        card_no: &str,
        machine_no: &str,
    ) -> Result<u64>;
}

/// Postgres-backed record store over a dedicated connection.
///
/// One store is opened per sync cycle and closed when the cycle ends, so a
/// restarted database server never leaves the daemon holding a dead session.
pub struct PunchStore {
    conn: PgConnection,
}

impl PunchStore {
    /// Open a dedicated connection using the configured parameters
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.username)
            .password(&config.password)
            .application_name("attsync");

        let conn = tokio::time::timeout(CONNECT_TIMEOUT, PgConnection::connect_with(&options))
            .await
            .map_err(|_| SyncError::ConnectTimeout(CONNECT_TIMEOUT))??;

        Ok(Self { conn })
    }

    /// Round-trip check used by the connection test command
    pub async fn ping(&mut self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&mut self.conn).await?;
        Ok(())
    }

    /// Close the session gracefully. Dropping the store also releases the
    /// connection, but without the terminate handshake.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PunchStore {
    async fn fetch_pending(&mut self) -> Result<Vec<PunchRecord>> {
        let records = sqlx::query_as::<_, PunchRecord>(
            r#"
            SELECT "MachineNo", "CardNo", "PunchDatetime"
            FROM "Tran_MachineRawPunch"
            WHERE ("IsSync" IS NULL OR "IsSync" = FALSE)
            ORDER BY "PunchDatetime" ASC
            "#,
        )
        .fetch_all(&mut self.conn)
        .await?;

        Ok(records)
    }

    async fn mark_synced(
        &mut self,
        punch_datetime: &str,
        card_no: &str,
        machine_no: &str,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE "Tran_MachineRawPunch"
            SET "IsSync" = TRUE
            WHERE "PunchDatetime" = $1 AND "CardNo" = $2 AND "MachineNo" = $3
            "#,
        )
        .bind(punch_datetime)
        .bind(card_no)
        .bind(machine_no)
        .execute(&mut self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}

/// In-memory record store for tests.
///
/// Tracks a synced flag per row and counts `mark_synced` invocations so
/// tests can assert exactly which records were flagged and how often.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<(PunchRecord, bool)>,
    mark_calls: usize,
    fail_fetch: bool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store where every given row is pending.
    pub fn with_rows(rows: Vec<PunchRecord>) -> Self {
        Self {
            rows: rows.into_iter().map(|record| (record, false)).collect(),
            ..Self::default()
        }
    }

    /// Make every subsequent `fetch_pending` fail with a database error.
    pub fn fail_fetch(&mut self) {
        self.fail_fetch = true;
    }

    /// Number of `mark_synced` invocations so far.
    pub fn mark_calls(&self) -> usize {
        self.mark_calls
    }

    /// Rows still awaiting sync.
    pub fn pending_count(&self) -> usize {
        self.rows.iter().filter(|(_, synced)| !synced).count()
    }

    /// Whether at least one row matches the triple and all matches are synced.
    pub fn is_synced(&self, punch_datetime: &str, card_no: &str, machine_no: &str) -> bool {
        let mut matched = false;
        for (record, synced) in &self.rows {
            if record.punch_datetime == punch_datetime
                && record.card_no == card_no
                && record.machine_no == machine_no
            {
                matched = true;
                if !synced {
                    return false;
                }
            }
        }
        matched
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_pending(&mut self) -> Result<Vec<PunchRecord>> {
        if self.fail_fetch {
            return Err(SyncError::Database(sqlx::Error::PoolClosed));
        }

        let mut pending: Vec<PunchRecord> = self
            .rows
            .iter()
            .filter(|(_, synced)| !synced)
            .map(|(record, _)| record.clone())
            .collect();
        pending.sort_by(|a, b| a.punch_datetime.cmp(&b.punch_datetime));

        Ok(pending)
    }

    async fn mark_synced(
        &mut self,
        punch_datetime: &str,
        card_no: &str,
        machine_no: &str,
    ) -> Result<u64> {
        self.mark_calls += 1;

        let mut affected = 0;
        for (record, synced) in &mut self.rows {
            if record.punch_datetime == punch_datetime
                && record.card_no == card_no
                && record.machine_no == machine_no
            {
                *synced = true;
                affected += 1;
            }
        }

        Ok(affected)
    }
}
