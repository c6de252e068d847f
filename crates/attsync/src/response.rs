//! Remote reply classification
//!
//! The attendance API answers with free-form bodies: sometimes a JSON
//! status object, sometimes plain text. Classification is therefore
//! containment-based, and its outcome is the only thing that may flip a
//! punch to synced. When in doubt the classifier says so, and the record
//! rides again next cycle; the remote treats resends idempotently.

use std::fmt;

/// Fragment the API includes in structured success replies.
const SUCCESS_STATUS_FRAGMENT: &str = r#""status":"success""#;

/// Reply from one transmit attempt.
///
/// Transport failures are first-class variants rather than in-band body
/// text, so classification can never mistake a failure token for real
/// response content (or the reverse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply {
    /// 2xx response with its body text
    Body(String),
    /// Non-2xx HTTP status
    HttpError(u16),
    /// TCP/TLS connection could not be established
    ConnectionFailed,
    /// Request exceeded the configured timeout
    TimedOut,
    /// Any other transport fault
    Failed,
}

impl ApiReply {
    /// Convenience constructor for body replies
    pub fn body(s: impl Into<String>) -> Self {
        Self::Body(s.into())
    }
}

/// Renders replies the way they appear in sync logs: bodies verbatim,
/// transport failures as their sentinel tokens.
impl fmt::Display for ApiReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiReply::Body(body) => write!(f, "{}", body),
            ApiReply::HttpError(status) => write!(f, "HTTP_ERROR_{}", status),
            ApiReply::ConnectionFailed => write!(f, "CONNECTION_FAILED"),
            ApiReply::TimedOut => write!(f, "TIMEOUT"),
            ApiReply::Failed => write!(f, "ERROR"),
        }
    }
}

/// Outcome of classifying one reply.
///
/// Only `Confirmed` may mark a record synced; both other outcomes leave
/// the row for the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Remote accepted (or had already processed) the record
    Confirmed,
    /// Transport-level failure; the request may never have arrived
    NotConfirmed,
    /// Reply was empty or unrecognized
    Indeterminate,
}

/// Classify a transmit reply.
///
/// `Employee not found` counts as confirmed: the remote has processed the
/// record and resending would never change the answer, so retrying forever
/// is the only alternative.
pub fn classify(reply: &ApiReply) -> SyncOutcome {
    match reply {
        ApiReply::Body(body) if body.is_empty() => SyncOutcome::Indeterminate,
        ApiReply::Body(body) => {
            if body.contains(SUCCESS_STATUS_FRAGMENT)
                || body.contains("successfully")
                || body.contains("Successfully")
            {
                SyncOutcome::Confirmed
            } else if body.contains("Employee not found") {
                SyncOutcome::Confirmed
            } else {
                SyncOutcome::Indeterminate
            }
        }
        ApiReply::HttpError(_) | ApiReply::ConnectionFailed | ApiReply::TimedOut => {
            SyncOutcome::NotConfirmed
        }
        ApiReply::Failed => SyncOutcome::Indeterminate,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_success_fragment_confirms() {
        let reply = ApiReply::body(r#"{"status":"success","message":"ok"}"#);
        assert_eq!(classify(&reply), SyncOutcome::Confirmed);
    }

    #[test]
    fn test_plain_text_success_confirms_in_both_casings() {
        assert_eq!(
            classify(&ApiReply::body("Attendance marked successfully")),
            SyncOutcome::Confirmed
        );
        assert_eq!(
            classify(&ApiReply::body("Successfully recorded")),
            SyncOutcome::Confirmed
        );
    }

    #[test]
    fn test_unknown_employee_confirms() {
        let reply = ApiReply::body("Employee not found for code 00000007");
        assert_eq!(classify(&reply), SyncOutcome::Confirmed);
    }

    #[test]
    fn test_transport_failures_are_not_confirmed() {
        assert_eq!(
            classify(&ApiReply::HttpError(500)),
            SyncOutcome::NotConfirmed
        );
        assert_eq!(
            classify(&ApiReply::HttpError(404)),
            SyncOutcome::NotConfirmed
        );
        assert_eq!(
            classify(&ApiReply::ConnectionFailed),
            SyncOutcome::NotConfirmed
        );
        assert_eq!(classify(&ApiReply::TimedOut), SyncOutcome::NotConfirmed);
    }

    #[test]
    fn test_empty_body_is_indeterminate() {
        assert_eq!(classify(&ApiReply::body("")), SyncOutcome::Indeterminate);
    }

    #[test]
    fn test_unrecognized_body_is_indeterminate() {
        assert_eq!(
            classify(&ApiReply::body(r#"{"status":"queued"}"#)),
            SyncOutcome::Indeterminate
        );
    }

    #[test]
    fn test_generic_failure_is_indeterminate() {
        assert_eq!(classify(&ApiReply::Failed), SyncOutcome::Indeterminate);
    }

    #[test]
    fn test_body_text_resembling_failure_tokens_is_indeterminate() {
        // A 2xx body is classified on content alone; token-like text inside
        // it must not read as a transport failure.
        assert_eq!(
            classify(&ApiReply::body("TIMEOUT while queuing record")),
            SyncOutcome::Indeterminate
        );
        assert_eq!(
            classify(&ApiReply::body("HTTP_ERROR_500")),
            SyncOutcome::Indeterminate
        );
    }

    #[test]
    fn test_display_renders_sentinel_tokens() {
        assert_eq!(ApiReply::HttpError(503).to_string(), "HTTP_ERROR_503");
        assert_eq!(ApiReply::ConnectionFailed.to_string(), "CONNECTION_FAILED");
        assert_eq!(ApiReply::TimedOut.to_string(), "TIMEOUT");
        assert_eq!(ApiReply::Failed.to_string(), "ERROR");
        assert_eq!(ApiReply::body("raw body").to_string(), "raw body");
    }
}
