//! Maps authorization denials to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use tenantgate_auth::Denial;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// A denial rendered for the caller.
///
/// The body never names the scheme, requirement, partition or reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenialResponse(pub Denial);

impl From<Denial> for DenialResponse {
    fn from(denial: Denial) -> Self {
        Self(denial)
    }
}

impl IntoResponse for DenialResponse {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self.0 {
            Denial::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required",
            ),
            Denial::Forbidden | Denial::Denied => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", "Access denied")
            }
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: message.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Denial::Unauthenticated, StatusCode::UNAUTHORIZED),
            (Denial::Forbidden, StatusCode::FORBIDDEN),
            (Denial::Denied, StatusCode::FORBIDDEN),
        ];
        for (denial, status) in cases {
            assert_eq!(DenialResponse(denial).into_response().status(), status);
        }
    }
}
