//! AttSync Library
//!
//! Synchronizes biometric punch records from a local vendor database to a
//! remote attendance API.
//!
//! # Overview
//!
//! Each sync cycle walks the pending punch records through a fixed pipeline:
//!
//! - **Fetch**: read unsent rows from the vendor punch table
//! - **Transform**: reshape timestamps and card numbers into the wire format
//! - **Validate**: drop records from machines outside the allow-list
//! - **Transmit**: GET the JSON payload to the attendance endpoint
//! - **Classify**: decide from the reply whether receipt was confirmed
//! - **Mark**: flag confirmed rows so they are never sent again
//!
//! Unconfirmed rows stay pending and are retried on the next cycle, so a
//! punch is delivered at least once and never silently dropped.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod machines;
pub mod model;
pub mod payload;
pub mod response;
pub mod scheduler;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use engine::{CycleReport, SyncEngine};
pub use error::{Result, SyncError};
pub use model::PunchRecord;
pub use response::{classify, ApiReply, SyncOutcome};

use clap::Parser;
use std::path::PathBuf;

/// AttSync - Biometric Attendance Synchronization System
#[derive(Parser, Debug)]
#[command(name = "attsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Test database connectivity and exit
    #[arg(long)]
    pub test_connection: bool,

    /// Test API connectivity and exit
    #[arg(long)]
    pub test_api: bool,

    /// Configuration file path
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}
