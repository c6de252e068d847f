//! AttSync Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the attendance sync workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all AttSync workspace members:
//!
//! - **Logging**: Centralized tracing subscriber setup (console + rolling file)
//!
//! # Example
//!
//! ```no_run
//! use attsync_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::default();
//!     let _guard = init_logging(&config)?;
//!
//!     info!("Application started");
//!     Ok(())
//! }
//! ```

pub mod logging;

// Re-export commonly used types
pub use logging::{init_logging, LogConfig, LogLevel};
