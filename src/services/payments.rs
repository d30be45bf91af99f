use crate::{
    config::Network,
    error::{GatewayError, GatewayResult},
    models::{Confirmation, PaymentRequest, UpstreamResponse},
    services::PaymentPlatform,
};
use serde_json::Value;
use std::sync::Arc;

pub const DETAIL_UNAVAILABLE_NOTE: &str = "payment detail unavailable";

/// Relays payment lifecycle actions to the platform and verifies completions.
///
/// Holds no payment state: every call is resolved against the platform at call time.
pub struct PaymentService {
    platform: Arc<dyn PaymentPlatform>,
    network: Network,
}

impl PaymentService {
    pub fn new(platform: Arc<dyn PaymentPlatform>, network: Network) -> Self {
        Self { platform, network }
    }

    pub async fn initiate_approval(
        &self,
        request: &PaymentRequest,
    ) -> GatewayResult<UpstreamResponse> {
        let payment_id = required_payment_id(request)?;

        tracing::info!(payment_id, "Approving payment");
        let response = self.platform.approve(payment_id).await?;
        ensure_accepted(response)
    }

    pub async fn cancel(&self, request: &PaymentRequest) -> GatewayResult<UpstreamResponse> {
        let payment_id = required_payment_id(request)?;

        tracing::info!(payment_id, "Cancelling payment");
        let response = self.platform.cancel(payment_id).await?;
        ensure_accepted(response)
    }

    /// Completes the payment, then re-reads it from the platform and checks that it
    /// actually settled, and settled on the configured network.
    pub async fn confirm_completion(
        &self,
        request: &PaymentRequest,
    ) -> GatewayResult<Confirmation> {
        let payment_id = required_payment_id(request)?;
        let txid = request.txid();

        tracing::info!(payment_id, txid = ?txid, "Completing payment");
        let completed = ensure_accepted(self.platform.complete(payment_id, txid).await?)?;

        let detail = match self.platform.get_payment(payment_id).await {
            Ok(detail) if detail.success => detail,
            Ok(detail) => {
                tracing::warn!(
                    payment_id,
                    status = %detail.status,
                    "Payment detail fetch rejected"
                );
                return Ok(unverified(completed));
            }
            Err(e) => {
                tracing::warn!(payment_id, error = %e, "Payment detail fetch failed");
                return Ok(unverified(completed));
            }
        };

        let Some(record) = detail.body.as_json().cloned() else {
            tracing::warn!(payment_id, "Payment detail was not JSON");
            return Ok(unverified(completed));
        };

        self.verify_record(&record)?;

        tracing::info!(payment_id, "Payment completion verified");
        Ok(Confirmation::verified(record))
    }

    fn verify_record(&self, record: &Value) -> GatewayResult<()> {
        let status = payment_status(record);
        let settled = status
            .as_deref()
            .map(|s| s.contains("completed") || s.contains("approved"))
            .unwrap_or(false);
        if !settled {
            tracing::warn!(status = ?status, "Payment record not completed");
            return Err(GatewayError::PaymentNotCompleted {
                record: record.clone(),
            });
        }

        if self.network == Network::Mainnet {
            if let Some(network) = record.get("network").and_then(Value::as_str) {
                if !network.to_lowercase().contains("main") {
                    tracing::warn!(network, "Payment record on unexpected network");
                    return Err(GatewayError::WrongNetwork {
                        record: record.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// The payment id, rejected when missing or when it would be read as a path
/// segment of its own (`.` or `..`).
fn required_payment_id(request: &PaymentRequest) -> GatewayResult<&str> {
    let payment_id = request.payment_id().ok_or_else(GatewayError::missing_payment_id)?;
    if matches!(payment_id, "." | "..") {
        return Err(GatewayError::invalid_payment_id(payment_id));
    }
    Ok(payment_id)
}

/// Completion result returned as-is when the platform's record can't be read back.
fn unverified(completed: UpstreamResponse) -> Confirmation {
    Confirmation::unverified(completed.body.into_value(), DETAIL_UNAVAILABLE_NOTE)
}

fn ensure_accepted(response: UpstreamResponse) -> GatewayResult<UpstreamResponse> {
    if response.success {
        Ok(response)
    } else {
        Err(GatewayError::UpstreamRejected {
            status: response.status,
            body: response.body,
        })
    }
}

/// Lowercased status of a payment record.
///
/// Accepts a plain `status`/`state` string or the platform's object of lifecycle flags.
pub fn payment_status(record: &Value) -> Option<String> {
    match record.get("status") {
        Some(Value::String(status)) => return Some(status.to_lowercase()),
        Some(Value::Object(flags)) => {
            let flag = |name: &str| flags.get(name).and_then(Value::as_bool).unwrap_or(false);
            let status = if flag("cancelled") || flag("user_cancelled") {
                "cancelled"
            } else if flag("developer_completed") {
                "completed"
            } else if flag("developer_approved") {
                "approved"
            } else {
                "pending"
            };
            return Some(status.to_string());
        }
        _ => {}
    }

    record
        .get("state")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
}
