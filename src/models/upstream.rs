use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Body returned by the payment platform. Error pages are not always JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpstreamBody {
    Json(Value),
    Raw(String),
}

impl UpstreamBody {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => UpstreamBody::Json(value),
            Err(_) => UpstreamBody::Raw(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            UpstreamBody::Json(value) => Some(value),
            UpstreamBody::Raw(_) => None,
        }
    }

    /// JSON view of the body; raw text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            UpstreamBody::Json(value) => value,
            UpstreamBody::Raw(text) => Value::String(text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub success: bool,
    pub status: StatusCode,
    pub body: UpstreamBody,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: UpstreamBody) -> Self {
        Self {
            success: status.is_success(),
            status,
            body,
        }
    }
}

/// Relays the upstream status and body to the caller unchanged.
pub fn passthrough(status: StatusCode, body: UpstreamBody) -> Response {
    match body {
        UpstreamBody::Json(value) => (status, Json(value)).into_response(),
        UpstreamBody::Raw(text) => (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        passthrough(self.status, self.body)
    }
}
