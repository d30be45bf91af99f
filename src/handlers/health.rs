use crate::{
    config::Config,
    models::{HealthStatus, Metadata},
};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

pub async fn metadata(State(config): State<Arc<Config>>) -> Json<Metadata> {
    Json(Metadata {
        name: config.app_name.clone(),
        description: config.app_description.clone(),
        url: config.app_url.clone(),
    })
}
