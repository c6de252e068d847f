//! Sync cycle execution
//!
//! A cycle opens a fresh database session, walks every pending punch record
//! through transform, machine validation, transmit and classification, and
//! flags a row synced only when the remote reply confirmed receipt. A record
//! that fails any stage is skipped and picked up again next cycle; only a
//! failure to reach the database aborts the cycle itself.

use crate::api::{endpoints, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::machines::MachineRegistry;
use crate::model::PunchRecord;
use crate::payload::{self, AttendanceEnvelope};
use crate::response::{classify, ApiReply, SyncOutcome};
use crate::store::{PunchStore, RecordStore};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Counters for one pass over the pending records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Rows returned by the pending fetch
    pub fetched: usize,
    /// Rows confirmed by the API and flagged synced
    pub synced: usize,
    /// Rows left pending for the next cycle
    pub skipped: usize,
}

/// Drives sync cycles against the configured transport.
///
/// Cycles are serialized: a second `run_cycle` caller waits until the
/// running cycle finishes.
pub struct SyncEngine<T: Transport> {
    config: Config,
    registry: MachineRegistry,
    transport: T,
    cycle_lock: Mutex<()>,
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(config: Config, transport: T) -> Self {
        let registry = MachineRegistry::from_allow_list(&config.app.machine_ids);
        Self {
            config,
            registry,
            transport,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Run one full sync cycle against a fresh database session.
    ///
    /// The session is closed on success and failure alike; an error here is
    /// cycle-level (connect or fetch) and leaves every row untouched.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let _cycle = self.cycle_lock.lock().await;

        let mut store = PunchStore::connect(&self.config.database).await?;
        if self.config.app.debug {
            info!("Database connection established");
        }

        let report = self.process_pending(&mut store).await;
        if let Err(e) = store.close().await {
            warn!(error = %e, "Error closing database connection");
        }
        report
    }

    /// Run one cycle over a caller-supplied store.
    ///
    /// Takes the same cycle lock as [`run_cycle`](Self::run_cycle), so
    /// concurrent callers execute their passes strictly one after another.
    pub async fn run_cycle_with<S: RecordStore>(&self, store: &mut S) -> Result<CycleReport> {
        let _cycle = self.cycle_lock.lock().await;
        self.process_pending(store).await
    }

    /// Process every pending record in the given store.
    ///
    /// A record failing any stage is logged and skipped; the pass continues
    /// with the remaining records.
    async fn process_pending<S: RecordStore>(&self, store: &mut S) -> Result<CycleReport> {
        let records = store.fetch_pending().await?;
        let mut report = CycleReport {
            fetched: records.len(),
            ..CycleReport::default()
        };

        for record in &records {
            match self.process_record(store, record).await {
                Ok(true) => report.synced += 1,
                Ok(false) => report.skipped += 1,
                Err(e) if e.is_machine_rejection() => {
                    report.skipped += 1;
                    warn!(
                        machine_no = %record.machine_no,
                        card_no = %record.card_no,
                        error = %e,
                        "Skipping record, check the machine ID allow-list"
                    );
                }
                Err(e) => {
                    report.skipped += 1;
                    error!(
                        machine_no = %record.machine_no,
                        card_no = %record.card_no,
                        error = %e,
                        "Error processing record"
                    );
                }
            }
        }

        info!(total = report.fetched, synced = report.synced, "Total records processed");
        if report.fetched == 0 {
            info!("No unprocessed records found");
        }

        Ok(report)
    }

    /// Returns `Ok(true)` when the record was confirmed and flagged synced.
    async fn process_record<S: RecordStore>(
        &self,
        store: &mut S,
        punch: &PunchRecord,
    ) -> Result<bool> {
        let record = payload::build_record(punch, &self.config.school.code)?;
        let employee = record.biometric_code.clone();

        info!(
            employee = %employee,
            datetime = %record.datetime,
            machine_no = %punch.machine_no,
            "Processing punch"
        );

        self.registry.validate(&punch.machine_no)?;

        let envelope = AttendanceEnvelope::from(record);
        let payload_json = serde_json::to_string(&envelope)?;
        let url = endpoints::attendance_url(
            &self.config.api.primary_url,
            &self.config.school.code,
            &payload_json,
        );

        info!(machine_no = %punch.machine_no, "Sending attendance data to server");
        if self.config.app.debug {
            info!(url = %url, "Sending request");
        }

        let reply = self.transport.send(&url).await;
        if self.config.app.debug {
            info!(response = %reply, "API response");
        }

        match classify(&reply) {
            SyncOutcome::Confirmed => {
                let rows = store
                    .mark_synced(&punch.punch_datetime, &punch.card_no, &punch.machine_no)
                    .await?;
                info!(employee = %employee, rows_updated = rows, "Record synced");
                Ok(true)
            }
            SyncOutcome::NotConfirmed => {
                warn!(
                    employee = %employee,
                    response = %reply,
                    "Network issue, will retry in next cycle"
                );
                Ok(false)
            }
            SyncOutcome::Indeterminate => {
                if matches!(&reply, ApiReply::Body(body) if body.is_empty()) {
                    warn!(employee = %employee, "Empty response received, will retry in next cycle");
                } else {
                    warn!(
                        employee = %employee,
                        response = %reply,
                        "Unexpected response format, will retry in next cycle"
                    );
                }
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.school.code = "SCH1".to_string();
        config.app.machine_ids = "101,102".to_string();
        config.app.debug = false;
        config
    }

    #[tokio::test]
    async fn test_empty_store_reports_nothing_fetched() {
        let engine = SyncEngine::new(test_config(), MockTransport::new());
        let mut store = MemoryStore::new();

        let report = engine.run_cycle_with(&mut store).await.unwrap();
        assert_eq!(report, CycleReport::default());
    }

    #[tokio::test]
    async fn test_confirmed_reply_marks_record_synced() {
        let transport = Arc::new(MockTransport::new());
        transport.push_reply(ApiReply::body(r#"{"status":"success"}"#));
        let engine = SyncEngine::new(test_config(), Arc::clone(&transport));

        let mut store =
            MemoryStore::with_rows(vec![PunchRecord::new("101", "7", "2024-01-05 08:15:00")]);
        let report = engine.run_cycle_with(&mut store).await.unwrap();

        assert_eq!(report.fetched, 1);
        assert_eq!(report.synced, 1);
        assert!(store.is_synced("2024-01-05 08:15:00", "7", "101"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains("school_code=SCH1"));
        assert!(requests[0].contains("attendancedata="));
    }

    #[tokio::test]
    async fn test_unconfirmed_reply_leaves_record_pending() {
        let transport = Arc::new(MockTransport::new());
        transport.push_reply(ApiReply::TimedOut);
        let engine = SyncEngine::new(test_config(), Arc::clone(&transport));

        let mut store =
            MemoryStore::with_rows(vec![PunchRecord::new("101", "7", "2024-01-05 08:15:00")]);
        let report = engine.run_cycle_with(&mut store).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(store.mark_calls(), 0);
        assert_eq!(store.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_machine_never_reaches_the_transport() {
        let transport = Arc::new(MockTransport::new());
        let engine = SyncEngine::new(test_config(), Arc::clone(&transport));

        let mut store =
            MemoryStore::with_rows(vec![PunchRecord::new("999", "7", "2024-01-05 08:15:00")]);
        let report = engine.run_cycle_with(&mut store).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert!(transport.requests().is_empty());
        assert_eq!(store.pending_count(), 1);
    }
}
