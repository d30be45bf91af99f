use crate::{
    error::{GatewayError, GatewayResult},
    models::{UpstreamBody, UpstreamResponse},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::{header, Method, Url};
use serde_json::{json, Value};
use std::time::Duration;

/// Lifecycle actions exposed by the payment platform.
#[async_trait]
pub trait PaymentPlatform: Send + Sync {
    async fn approve(&self, payment_id: &str) -> GatewayResult<UpstreamResponse>;

    async fn complete(&self, payment_id: &str, txid: Option<&str>)
        -> GatewayResult<UpstreamResponse>;

    async fn cancel(&self, payment_id: &str) -> GatewayResult<UpstreamResponse>;

    async fn get_payment(&self, payment_id: &str) -> GatewayResult<UpstreamResponse>;
}

/// HTTP client for the Pi platform REST API.
pub struct PiPlatformClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl PiPlatformClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid upstream base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Upstream base URL cannot be a base: {}", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        tracing::info!(
            "Pi platform client initialized ({}, timeout {}s)",
            base_url,
            timeout.as_secs()
        );

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// `{base}/payments/{id}[/{action}]` with the id escaped as a single segment.
    ///
    /// `.` and `..` are refused: the URL parser drops them instead of escaping.
    fn payment_url(&self, payment_id: &str, action: Option<&str>) -> GatewayResult<Url> {
        if matches!(payment_id, "." | "..") {
            return Err(GatewayError::invalid_payment_id(payment_id));
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::Internal("Upstream base URL cannot be a base".into()))?;
            segments.pop_if_empty().push("payments").push(payment_id);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }

    async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> GatewayResult<UpstreamResponse> {
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(key) = &self.api_key {
            request = request.header(header::AUTHORIZATION, format!("Key {}", key));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!("Upstream {} {} timed out", method, url.path());
            } else {
                tracing::warn!("Upstream {} {} failed: {}", method, url.path(), e);
            }
            GatewayError::UpstreamUnavailable(e.to_string())
        })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| GatewayError::Internal(e.to_string()))?;
        let text = response.text().await.map_err(|e| {
            tracing::warn!("Failed to read upstream body for {}: {}", url.path(), e);
            GatewayError::UpstreamUnavailable(e.to_string())
        })?;

        tracing::debug!("Upstream {} {} -> {}", method, url.path(), status);

        Ok(UpstreamResponse::new(status, UpstreamBody::parse(text)))
    }
}

#[async_trait]
impl PaymentPlatform for PiPlatformClient {
    async fn approve(&self, payment_id: &str) -> GatewayResult<UpstreamResponse> {
        let url = self.payment_url(payment_id, Some("approve"))?;
        self.call(Method::POST, url, Some(json!({}))).await
    }

    async fn complete(
        &self,
        payment_id: &str,
        txid: Option<&str>,
    ) -> GatewayResult<UpstreamResponse> {
        let url = self.payment_url(payment_id, Some("complete"))?;
        let body = match txid {
            Some(txid) => json!({ "txid": txid }),
            None => json!({}),
        };
        self.call(Method::POST, url, Some(body)).await
    }

    async fn cancel(&self, payment_id: &str) -> GatewayResult<UpstreamResponse> {
        let url = self.payment_url(payment_id, Some("cancel"))?;
        self.call(Method::POST, url, Some(json!({}))).await
    }

    async fn get_payment(&self, payment_id: &str) -> GatewayResult<UpstreamResponse> {
        let url = self.payment_url(payment_id, None)?;
        self.call(Method::GET, url, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> PiPlatformClient {
        PiPlatformClient::new(base, None, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn builds_action_urls() {
        let client = client("https://api.minepi.com/v2");
        assert_eq!(
            client.payment_url("abc", Some("approve")).unwrap().as_str(),
            "https://api.minepi.com/v2/payments/abc/approve"
        );
        assert_eq!(
            client.payment_url("abc", None).unwrap().as_str(),
            "https://api.minepi.com/v2/payments/abc"
        );
    }

    #[test]
    fn tolerates_trailing_slash_in_base() {
        let client = client("https://api.minepi.com/v2/");
        assert_eq!(
            client.payment_url("abc", Some("cancel")).unwrap().as_str(),
            "https://api.minepi.com/v2/payments/abc/cancel"
        );
    }

    #[test]
    fn escapes_identifier_as_one_segment() {
        let client = client("https://api.minepi.com/v2");
        let url = client.payment_url("../admin?x=1", Some("approve")).unwrap();
        assert_eq!(url.path_segments().unwrap().count(), 4);
        assert!(url.path().contains("%2F"));
        assert!(url.path().ends_with("/approve"));
        assert!(url.query().is_none());
    }

    #[test]
    fn refuses_dot_segment_identifiers() {
        let client = client("https://api.minepi.com/v2");
        for id in [".", ".."] {
            assert!(matches!(
                client.payment_url(id, Some("approve")),
                Err(GatewayError::Validation(_))
            ));
            assert!(matches!(
                client.payment_url(id, None),
                Err(GatewayError::Validation(_))
            ));
        }

        // Dots inside a longer id are ordinary characters.
        let url = client.payment_url("...", None).unwrap();
        assert_eq!(url.as_str(), "https://api.minepi.com/v2/payments/...");
    }

    #[tokio::test]
    async fn dot_segment_identifier_never_leaves_the_client() {
        let client = client("http://127.0.0.1:9");
        let err = client.get_payment("..").await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(PiPlatformClient::new("not a url", None, Duration::from_secs(1)).is_err());
        assert!(
            PiPlatformClient::new("mailto:ops@example.com", None, Duration::from_secs(1)).is_err()
        );
    }

    #[tokio::test]
    async fn unreachable_upstream_is_unavailable() {
        // Port 9 (discard) is not expected to be listening locally.
        let client = client("http://127.0.0.1:9");
        let err = client.approve("abc").await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn silent_upstream_times_out_as_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and hold them open without ever answering.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = client(&format!("http://{}", addr));
        let started = std::time::Instant::now();
        let err = client.approve("abc").await.unwrap_err();

        assert!(matches!(err, GatewayError::UpstreamUnavailable(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
