use crate::{error::GatewayError, services::LocaleService};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub lang: Option<String>,
}

/// `GET /i18n/{lang}.json`; `auto.json` negotiates from `?lang=` and `Accept-Language`.
pub async fn locale(
    State(locales): State<Arc<LocaleService>>,
    Path(file): Path<String>,
    Query(query): Query<LocaleQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    let requested = file
        .strip_suffix(".json")
        .ok_or_else(|| GatewayError::NotFound(format!("/i18n/{}", file)))?;

    let requested = if requested.eq_ignore_ascii_case("auto") {
        let accept_language = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        LocaleService::negotiate(query.lang.as_deref(), accept_language)
    } else {
        requested
    };

    let (lang, body) = locales.load(requested).await?;

    Ok((
        [(header::CONTENT_LANGUAGE, lang)],
        Json(body.as_ref().clone()),
    ))
}
