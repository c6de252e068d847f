//! Wire payload construction
//!
//! Converts a raw punch row into the attendance API's JSON envelope. The
//! punch machines store timestamps as "yyyy-MM-dd HH:mm:ss"; the API expects
//! "dd-MM-yyyy HH:mm:ss" and an 8-digit zero-padded employee code.

use crate::error::{Result, SyncError};
use crate::model::PunchRecord;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Timestamp layout used by the punch-machine database.
pub const PUNCH_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp layout expected by the attendance API.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Minimum width of the employee code on the wire.
const BIOMETRIC_CODE_WIDTH: usize = 8;

/// One attendance event in the API's wire format.
///
/// The `biomatric_code` spelling is the server's field name. It is part of
/// the wire contract and must not be corrected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    #[serde(rename = "biomatric_code")]
    pub biometric_code: String,
    pub school_code: String,
    pub datetime: String,
}

/// Envelope the API expects: a list of events under `data`.
///
/// The agent always sends a single event per request; the list shape is the
/// server's contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceEnvelope {
    pub data: Vec<AttendanceRecord>,
}

impl From<AttendanceRecord> for AttendanceEnvelope {
    fn from(record: AttendanceRecord) -> Self {
        Self { data: vec![record] }
    }
}

/// Build the wire event for a single punch.
///
/// Fails when the timestamp does not match the machine layout or the card
/// number is not a non-negative integer; both are record-level defects that
/// leave the row unsynced.
pub fn build_record(punch: &PunchRecord, school_code: &str) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        biometric_code: format_biometric_code(&punch.card_no)?,
        school_code: school_code.to_string(),
        datetime: format_wire_timestamp(&punch.punch_datetime)?,
    })
}

/// Build the full envelope for a single punch.
pub fn build_envelope(punch: &PunchRecord, school_code: &str) -> Result<AttendanceEnvelope> {
    build_record(punch, school_code).map(AttendanceEnvelope::from)
}

/// Reformat a machine timestamp into the API layout.
///
/// Parsing is strict: trailing input (fractional seconds, timezone
/// suffixes) is rejected rather than truncated.
pub fn format_wire_timestamp(raw: &str) -> Result<String> {
    let parsed = NaiveDateTime::parse_from_str(raw, PUNCH_TIMESTAMP_FORMAT)
        .map_err(|source| SyncError::timestamp(raw, source))?;
    Ok(parsed.format(WIRE_TIMESTAMP_FORMAT).to_string())
}

/// Zero-pad a card number to the wire employee code.
///
/// Leading zeros in the stored value are normalized away by the integer
/// parse; values wider than 8 digits keep their full width.
pub fn format_biometric_code(raw: &str) -> Result<String> {
    let card: u32 = raw
        .parse()
        .map_err(|source| SyncError::card_number(raw, source))?;
    Ok(format!("{:0width$}", card, width = BIOMETRIC_CODE_WIDTH))
}
