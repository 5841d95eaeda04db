//! Admission control.
//!
//! The parity gate is a deterministic chaos-injection rule used to produce a
//! steady error rate for the dashboards. It is not authentication: the id comes
//! from the arrival timestamp, so roughly half of all GET requests are rejected
//! depending only on when they arrive.

use crate::pipeline::request::{Method, Request};

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("request id is even")]
    OddEvenGate,
}

impl ValidationError {
    /// HTTP status reported to the client.
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationError::MethodNotAllowed => 405,
            ValidationError::OddEvenGate => 400,
        }
    }

    /// Stable label for logs and span attributes.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MethodNotAllowed => "method_not_allowed",
            ValidationError::OddEvenGate => "odd_even_gate",
        }
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Rejected(ValidationError),
}

/// Odd ids pass, even ids fail.
pub fn passes_parity_gate(id: u64) -> bool {
    id % 2 == 1
}

/// Decide whether `request` gets any work done. The method is checked first.
pub fn validate(request: &Request) -> Admission {
    if request.method() != &Method::Get {
        return Admission::Rejected(ValidationError::MethodNotAllowed);
    }
    if !passes_parity_gate(request.id()) {
        return Admission::Rejected(ValidationError::OddEvenGate);
    }
    Admission::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn request(method: Method, id: u64) -> Request {
        Request::new(method, UNIX_EPOCH + Duration::from_nanos(id))
    }

    #[test]
    fn test_odd_get_is_accepted() {
        assert_eq!(validate(&request(Method::Get, 1_001)), Admission::Accepted);
    }

    #[test]
    fn test_even_get_hits_parity_gate() {
        assert_eq!(
            validate(&request(Method::Get, 1_000)),
            Admission::Rejected(ValidationError::OddEvenGate)
        );
    }

    #[test]
    fn test_non_get_rejected_regardless_of_parity() {
        for id in [1_000, 1_001] {
            assert_eq!(
                validate(&request(Method::Other("POST".into()), id)),
                Admission::Rejected(ValidationError::MethodNotAllowed)
            );
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ValidationError::MethodNotAllowed.status_code(), 405);
        assert_eq!(ValidationError::OddEvenGate.status_code(), 400);
    }
}
