use crate::{config::Config, error::GatewayError};
use axum::{extract::State, http::header, response::IntoResponse};
use std::io::ErrorKind;
use std::sync::Arc;

/// Domain validation token: `PI_VALIDATION_KEY` if set, otherwise the bundled file.
pub async fn validation_key(
    State(config): State<Arc<Config>>,
) -> Result<impl IntoResponse, GatewayError> {
    let token = match &config.validation_key {
        Some(token) => token.clone(),
        None => match tokio::fs::read_to_string(&config.validation_key_file).await {
            Ok(contents) => contents.trim().to_string(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GatewayError::NotFound("validation key".to_string()))
            }
            Err(e) => {
                return Err(GatewayError::Internal(format!(
                    "failed to read {}: {}",
                    config.validation_key_file.display(),
                    e
                )))
            }
        },
    };

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], token))
}
