use crate::{
    error::GatewayError,
    models::{Confirmation, PaymentRequest, UpstreamResponse},
    services::PaymentService,
};
use axum::{extract::State, Json};
use std::sync::Arc;

// A missing or non-JSON body is handled as a request without a paymentId.
fn payment_request(body: Option<Json<PaymentRequest>>) -> PaymentRequest {
    body.map(|Json(request)| request).unwrap_or_default()
}

pub async fn approve_payment(
    State(payments): State<Arc<PaymentService>>,
    body: Option<Json<PaymentRequest>>,
) -> Result<UpstreamResponse, GatewayError> {
    payments.initiate_approval(&payment_request(body)).await
}

pub async fn complete_payment(
    State(payments): State<Arc<PaymentService>>,
    body: Option<Json<PaymentRequest>>,
) -> Result<Json<Confirmation>, GatewayError> {
    let confirmation = payments.confirm_completion(&payment_request(body)).await?;
    Ok(Json(confirmation))
}

pub async fn cancel_payment(
    State(payments): State<Arc<PaymentService>>,
    body: Option<Json<PaymentRequest>>,
) -> Result<UpstreamResponse, GatewayError> {
    payments.cancel(&payment_request(body)).await
}
