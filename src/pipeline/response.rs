//! Response envelope returned by `/sort`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortResponse {
    #[serde(rename = "requestID")]
    pub request_id: String,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl SortResponse {
    pub fn success(request_id: u64, duration: Duration) -> Self {
        Self {
            request_id: request_id.to_string(),
            status: ResponseStatus::Success,
            duration: Some(format!("{duration:?}")),
        }
    }

    pub fn error(request_id: u64) -> Self {
        Self {
            request_id: request_id.to_string(),
            status: ResponseStatus::Error,
            duration: None,
        }
    }
}
