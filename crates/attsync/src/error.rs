//! Error types for the attendance sync agent
//!
//! Errors carry their scope: record-level failures (bad timestamp, bad card
//! number, unconfigured machine) skip a single punch and leave it unsynced
//! for a later cycle, database failures abort the current cycle, and
//! configuration failures are fatal at startup only.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type for the sync agent
#[derive(Error, Debug)]
pub enum SyncError {
    /// Punch timestamp did not match the machine's storage layout
    #[error("Invalid punch timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },

    /// Card number was not a non-negative integer
    #[error("Invalid card number '{value}': {source}")]
    CardNumber {
        value: String,
        source: std::num::ParseIntError,
    },

    /// Record carried no machine ID
    #[error("Machine ID must not be empty")]
    EmptyMachineId,

    /// Machine ID not present in the configured allow-list
    #[error("Unknown machine ID '{machine_id}'. Configured IDs: {configured}")]
    UnknownMachine {
        machine_id: String,
        configured: String,
    },

    /// Database operation failed (SQLx)
    #[error("Database error: {0}. Check your database connection settings.")]
    Database(#[from] sqlx::Error),

    /// Database session could not be established in time
    #[error("Database connection timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// Payload serialization failed
    #[error("Failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check the configuration file.")]
    Config(String),

    /// Configuration file parsing failed
    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Default configuration could not be rendered
    #[error("Failed to render default configuration: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// File system operation failed
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a timestamp error carrying the offending value
    pub fn timestamp(value: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::Timestamp {
            value: value.into(),
            source,
        }
    }

    /// Create a card number error carrying the offending value
    pub fn card_number(value: impl Into<String>, source: std::num::ParseIntError) -> Self {
        Self::CardNumber {
            value: value.into(),
            source,
        }
    }

    /// Create an unknown machine error listing the configured IDs
    pub fn unknown_machine(machine_id: impl Into<String>, configured: &[String]) -> Self {
        Self::UnknownMachine {
            machine_id: machine_id.into(),
            configured: configured.join(", "),
        }
    }

    /// Whether this error is a record-level configuration problem rather
    /// than a processing failure
    pub fn is_machine_rejection(&self) -> bool {
        matches!(self, Self::EmptyMachineId | Self::UnknownMachine { .. })
    }
}
