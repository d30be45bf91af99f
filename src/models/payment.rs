use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body accepted by the approve/complete/cancel endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default, alias = "payment_id")]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub txid: Option<String>,
}

impl PaymentRequest {
    pub fn new(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: Some(payment_id.into()),
            txid: None,
        }
    }

    pub fn with_txid(mut self, txid: impl Into<String>) -> Self {
        self.txid = Some(txid.into());
        self
    }

    /// The payment identifier, if present and not blank.
    pub fn payment_id(&self) -> Option<&str> {
        self.payment_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn txid(&self) -> Option<&str> {
        self.txid.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Outcome of a successful completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    pub ok: bool,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Confirmation {
    pub fn verified(record: Value) -> Self {
        Self {
            ok: true,
            data: record,
            note: None,
        }
    }

    pub fn unverified(data: Value, note: impl Into<String>) -> Self {
        Self {
            ok: true,
            data,
            note: Some(note.into()),
        }
    }
}
