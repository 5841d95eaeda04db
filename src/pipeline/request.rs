//! Inbound request model.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// HTTP method as far as the pipeline cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Other(String),
}

impl From<&axum::http::Method> for Method {
    fn from(method: &axum::http::Method) -> Self {
        if method == axum::http::Method::GET {
            Method::Get
        } else {
            Method::Other(method.as_str().to_string())
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Other(name) => f.write_str(name),
        }
    }
}

/// A sort request. Its id is derived from the arrival time, never from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: u64,
    method: Method,
    arrival: SystemTime,
}

impl Request {
    pub fn new(method: Method, arrival: SystemTime) -> Self {
        Self {
            id: request_id_from(arrival),
            method,
            arrival,
        }
    }

    /// Request arriving at the current wall-clock time.
    pub fn arrived_now(method: Method) -> Self {
        Self::new(method, SystemTime::now())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn arrival(&self) -> SystemTime {
        self.arrival
    }
}

/// Nanoseconds since the Unix epoch. Times before the epoch map to 0.
pub fn request_id_from(arrival: SystemTime) -> u64 {
    arrival
        .duration_since(UNIX_EPOCH)
        .map(|since| u64::try_from(since.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
