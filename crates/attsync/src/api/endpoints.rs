//! API endpoint URL builders
//!
//! Helper functions to construct attendance API URLs.

/// Build the attendance submission URL.
///
/// The JSON payload travels URL-encoded in the `attendancedata` query
/// parameter. The school code rides alongside unencoded; codes are plain
/// alphanumeric by contract.
pub fn attendance_url(base_url: &str, school_code: &str, payload_json: &str) -> String {
    format!(
        "{}?school_code={}&attendancedata={}",
        base_url,
        school_code,
        urlencoding::encode(payload_json)
    )
}

/// Build the probe URL used by `--test-api`
pub fn probe_url(base_url: &str, school_code: &str) -> String {
    format!("{}?school_code={}", base_url, school_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_url() {
        let url = attendance_url(
            "https://api.example.com/v1/attendance",
            "SCH1",
            r#"{"data":[]}"#,
        );
        assert_eq!(
            url,
            "https://api.example.com/v1/attendance?school_code=SCH1&attendancedata=%7B%22data%22%3A%5B%5D%7D"
        );
    }

    #[test]
    fn test_attendance_url_encodes_spaces_and_quotes() {
        let url = attendance_url(
            "http://localhost:8000/mark",
            "demo",
            r#"{"datetime":"05-01-2024 08:15:00"}"#,
        );
        assert_eq!(
            url,
            "http://localhost:8000/mark?school_code=demo&attendancedata=%7B%22datetime%22%3A%2205-01-2024%2008%3A15%3A00%22%7D"
        );
    }

    #[test]
    fn test_probe_url() {
        let url = probe_url("https://api.example.com/v1/attendance", "SCH1");
        assert_eq!(
            url,
            "https://api.example.com/v1/attendance?school_code=SCH1"
        );
    }
}
