use crate::models::{passthrough, UpstreamBody};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error("Upstream rejected request with status {status}")]
    UpstreamRejected { status: StatusCode, body: UpstreamBody },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Payment not completed")]
    PaymentNotCompleted { record: Value },

    #[error("Payment settled on the wrong network")]
    WrongNetwork { record: Value },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn missing_payment_id() -> Self {
        GatewayError::Validation("paymentId is required".to_string())
    }

    pub fn invalid_payment_id(payment_id: &str) -> Self {
        GatewayError::Validation(format!("paymentId {:?} is not a valid identifier", payment_id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_)
            | GatewayError::PaymentNotCompleted { .. }
            | GatewayError::WrongNetwork { .. } => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamRejected { status, .. } => *status,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "VALIDATION_ERROR",
            GatewayError::UpstreamRejected { .. } => "UPSTREAM_REJECTED",
            GatewayError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            GatewayError::PaymentNotCompleted { .. } => "PAYMENT_NOT_COMPLETED",
            GatewayError::WrongNetwork { .. } => "WRONG_NETWORK",
            GatewayError::NotFound(_) => "NOT_FOUND",
            _ => "INTERNAL_ERROR",
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, error_code = error_code, "Request failed");
        } else {
            tracing::warn!(error = %self, error_code = error_code, "Request rejected");
        }

        let (error, detail) = match self {
            // Upstream's own error vocabulary goes back to the caller untouched.
            GatewayError::UpstreamRejected { status, body } => return passthrough(status, body),
            GatewayError::PaymentNotCompleted { record } => {
                ("Payment not completed".to_string(), Some(record))
            }
            GatewayError::WrongNetwork { record } => {
                ("Payment settled on the wrong network".to_string(), Some(record))
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            success: false,
            error,
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
            detail,
        };

        (status, Json(body)).into_response()
    }
}
