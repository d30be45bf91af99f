use crate::{
    config::Config,
    handlers::*,
    services::{LocaleService, PaymentPlatform, PaymentService, PiPlatformClient},
};
use anyhow::Result;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub payments: Arc<PaymentService>,
    pub locales: Arc<LocaleService>,
}

impl AppState {
    /// Wires services against the real platform client.
    pub fn from_config(config: Config) -> Result<Self> {
        let platform = Arc::new(PiPlatformClient::new(
            &config.pi_api_base_url,
            config.pi_api_key.clone(),
            config.upstream_timeout,
        )?);
        Ok(Self::with_platform(config, platform))
    }

    pub fn with_platform(config: Config, platform: Arc<dyn PaymentPlatform>) -> Self {
        let payments = Arc::new(PaymentService::new(platform, config.network));
        let locales = Arc::new(LocaleService::new(config.locales_dir.clone()));

        Self {
            config: Arc::new(config),
            payments,
            locales,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/metadata", get(metadata))
        .route("/approve-payment", post(approve_payment))
        .route("/complete-payment", post(complete_payment))
        .route("/cancel-payment", post(cancel_payment))
        .route("/validation-key.txt", get(validation_key))
        .route("/i18n/:file", get(locale))
        .fallback_service(static_files)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::default().include_headers(true)),
                )
                .layer(CorsLayer::permissive()),
        )
}
