//! Terminal result of a run.
//!
//! The status code and body are the entire observable contract to the
//! invoking environment; the wire shape is
//! `{"statusCode": <int>, "body": <JSON string>}`.

use serde::Serialize;
use serde_json::json;

use crate::error::RenewalError;

/// Structured result returned to the invoker, exactly once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    /// 200 on success, 400 for configuration problems, 500 for
    /// operational problems.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded body string.
    pub body: String,
}

impl Response {
    /// Success result carrying the domain, the secret identifier, and the
    /// issuance timestamp.
    pub fn success(domain: &str, secret_name: &str, timestamp: &str) -> Self {
        Self {
            status_code: 200,
            body: json!({
                "message": "Certificate renewal completed successfully",
                "domain": domain,
                "secretName": secret_name,
                "timestamp": timestamp,
            })
            .to_string(),
        }
    }

    /// Failure result classified by the error's status code, with the
    /// error's operator-facing message as the body.
    pub fn failure(error: &RenewalError) -> Self {
        Self {
            status_code: error.status_code(),
            body: json!({ "error": error.to_string() }).to_string(),
        }
    }
}
