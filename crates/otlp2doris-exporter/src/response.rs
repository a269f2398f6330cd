// Stream Load response classification

use reqwest::StatusCode;
use serde::Deserialize;

/// How a load settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Rows are committed (or were already committed under this label).
    Success,
    /// Doris refused the data itself; retrying cannot help.
    Rejected,
    /// Anything else; retry with the same label.
    Transient,
}

/// Body of a Stream Load response. Only `Status` is required by Doris; the
/// rest varies between versions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamLoadResponse {
    #[serde(default)]
    pub txn_id: Option<i64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub existing_job_status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub number_total_rows: Option<i64>,
    #[serde(default)]
    pub number_loaded_rows: Option<i64>,
    #[serde(default)]
    pub number_filtered_rows: Option<i64>,
    #[serde(default)]
    pub load_bytes: Option<i64>,
    #[serde(default)]
    pub load_time_ms: Option<i64>,
    #[serde(default, rename = "ErrorURL")]
    pub error_url: Option<String>,
}

impl StreamLoadResponse {
    pub fn is_success(&self) -> bool {
        match self.status.as_str() {
            "Success" | "Publish Timeout" => true,
            "Label Already Exists" => self.existing_job_status.as_deref() == Some("FINISHED"),
            _ => false,
        }
    }

    /// The data itself was refused, e.g. too many filtered rows.
    pub fn is_rejected(&self) -> bool {
        let has_error_url = self.error_url.as_deref().is_some_and(|url| !url.is_empty());
        let data_quality = self
            .message
            .as_deref()
            .is_some_and(|m| m.contains("DATA_QUALITY_ERROR"));
        (self.status == "Fail" && has_error_url) || data_quality
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_success() {
            Outcome::Success
        } else if self.is_rejected() {
            Outcome::Rejected
        } else {
            Outcome::Transient
        }
    }
}

/// Classify a fully-read HTTP response.
///
/// Non-2xx statuses and unparseable bodies are transient.
pub fn classify(status: StatusCode, body: &[u8]) -> (Outcome, Option<StreamLoadResponse>) {
    if !status.is_success() {
        return (Outcome::Transient, None);
    }
    match serde_json::from_slice::<StreamLoadResponse>(body) {
        Ok(response) => (response.outcome(), Some(response)),
        Err(_) => (Outcome::Transient, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(body: &str) -> Outcome {
        classify(StatusCode::OK, body.as_bytes()).0
    }

    #[test]
    fn test_success_statuses() {
        assert_eq!(outcome(r#"{"Status":"Success"}"#), Outcome::Success);
        assert_eq!(outcome(r#"{"Status":"Publish Timeout"}"#), Outcome::Success);
        assert_eq!(
            outcome(r#"{"Status":"Label Already Exists","ExistingJobStatus":"FINISHED"}"#),
            Outcome::Success
        );
    }

    #[test]
    fn test_rejected_statuses() {
        assert_eq!(
            outcome(
                r#"{"Status":"Fail","Message":"too many filtered rows","ErrorURL":"http://be:8040/api/_load_error_log?file=x"}"#
            ),
            Outcome::Rejected
        );
        assert_eq!(
            outcome(r#"{"Status":"Fail","Message":"[DATA_QUALITY_ERROR]too many filtered rows"}"#),
            Outcome::Rejected
        );
    }

    #[test]
    fn test_transient_statuses() {
        assert_eq!(outcome(r#"{"Status":"Fail"}"#), Outcome::Transient);
        assert_eq!(outcome(r#"{"Status":"Fail","ErrorURL":""}"#), Outcome::Transient);
        assert_eq!(
            outcome(r#"{"Status":"Label Already Exists","ExistingJobStatus":"RUNNING"}"#),
            Outcome::Transient
        );
        assert_eq!(outcome("<html>502</html>"), Outcome::Transient);
        assert_eq!(outcome("{}"), Outcome::Transient);
        assert_eq!(
            classify(StatusCode::SERVICE_UNAVAILABLE, br#"{"Status":"Success"}"#).0,
            Outcome::Transient
        );
    }

    #[test]
    fn test_full_response_parses() {
        let body = r#"{
            "TxnId": 1003,
            "Label": "otel_otel_otel_logs_20240115143000_x",
            "Status": "Success",
            "Message": "OK",
            "NumberTotalRows": 10,
            "NumberLoadedRows": 10,
            "NumberFilteredRows": 0,
            "LoadBytes": 2048,
            "LoadTimeMs": 35
        }"#;
        let (outcome, response) = classify(StatusCode::OK, body.as_bytes());
        let response = response.unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(response.txn_id, Some(1003));
        assert_eq!(response.number_loaded_rows, Some(10));
        assert_eq!(response.load_bytes, Some(2048));
    }
}
