//! Punch row model

use sqlx::FromRow;

/// One raw punch row from the machine database.
///
/// All fields are carried as the stored text, unmodified. The table has no
/// primary key; the (punch_datetime, card_no, machine_no) triple identifies
/// a punch for the mark-synced update, and duplicate triples are possible
/// (an update touches every match).
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PunchRecord {
    /// Device identifier, matched against the configured allow-list
    #[sqlx(rename = "MachineNo")]
    pub machine_no: String,

    /// Employee card number as stored (may carry leading zeros)
    #[sqlx(rename = "CardNo")]
    pub card_no: String,

    /// Punch time as stored, "yyyy-MM-dd HH:mm:ss"
    #[sqlx(rename = "PunchDatetime")]
    pub punch_datetime: String,
}

impl PunchRecord {
    pub fn new(
        machine_no: impl Into<String>,
        card_no: impl Into<String>,
        punch_datetime: impl Into<String>,
    ) -> Self {
        Self {
            machine_no: machine_no.into(),
            card_no: card_no.into(),
            punch_datetime: punch_datetime.into(),
        }
    }
}
