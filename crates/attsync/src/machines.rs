//! Machine allow-list

use crate::error::{Result, SyncError};

/// Registry of punch machines permitted to generate outbound requests.
///
/// Built from the comma-separated `machine_ids` configuration value.
/// Validation runs before URL construction, so a record from an unknown
/// device never produces a request.
#[derive(Debug, Clone)]
pub struct MachineRegistry {
    ids: Vec<String>,
}

impl MachineRegistry {
    /// Parse a comma-separated allow-list. Entries are trimmed; empty
    /// entries are dropped.
    pub fn from_allow_list(raw: &str) -> Self {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string)
            .collect();
        Self { ids }
    }

    /// Whether the machine ID is configured. The comparison is exact: a
    /// stored ID with stray whitespace does not match.
    pub fn is_known(&self, machine_id: &str) -> bool {
        self.ids.iter().any(|id| id == machine_id)
    }

    /// Configured machine IDs, in configuration order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Reject empty or unconfigured machine IDs.
    ///
    /// The unknown-machine error carries the configured list, so a
    /// misconfigured device shows up in the log with everything needed to
    /// fix it.
    pub fn validate(&self, machine_id: &str) -> Result<()> {
        if machine_id.trim().is_empty() {
            return Err(SyncError::EmptyMachineId);
        }
        if !self.is_known(machine_id) {
            return Err(SyncError::unknown_machine(machine_id, &self.ids));
        }
        Ok(())
    }
}
