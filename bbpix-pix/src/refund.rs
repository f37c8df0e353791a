//! Refunds (`devolucoes`) against received payments.

use bbpix_http_client::RequestContext;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::validation::{TXID_MAX_LEN, require, validate_amount};
use crate::{Client, PixError, PixResult};

/// Settlement state of a refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    EmProcessamento,
    Devolvido,
    NaoRealizado,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundTime {
    #[serde(rename = "solicitacao")]
    pub requested_at: DateTime<Utc>,
    #[serde(rename = "liquidacao", default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
}

/// A refund, either standalone or embedded in a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    #[serde(rename = "rtrId")]
    pub rtr_id: String,
    #[serde(rename = "valor", with = "crate::amount")]
    pub amount: Decimal,
    #[serde(rename = "horario")]
    pub time: RefundTime,
    pub status: RefundStatus,
    #[serde(rename = "motivo", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Body of a refund request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRefundRequest {
    #[serde(rename = "valor", with = "crate::amount")]
    pub amount: Decimal,
    #[serde(rename = "motivo", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CreateRefundRequest {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            reason: None,
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn validate(&self) -> PixResult<()> {
        validate_amount("refund amount", self.amount)
    }
}

fn validate_refund_id(id: &str) -> PixResult<()> {
    require("refund id", id)?;
    if id.len() > TXID_MAX_LEN || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PixError::validation(format!(
            "refund id must be at most {TXID_MAX_LEN} letters or digits"
        )));
    }
    Ok(())
}

impl Client {
    /// Request a refund of (part of) payment `e2eid` under the caller-chosen `refund_id`.
    pub async fn create_refund(
        &self,
        ctx: &RequestContext,
        e2eid: &str,
        refund_id: &str,
        request: &CreateRefundRequest,
    ) -> PixResult<Refund> {
        require("e2eid", e2eid)?;
        validate_refund_id(refund_id)?;
        request.validate()?;
        debug!(e2eid, refund_id, amount = %request.amount, "Creating refund");

        self.http()
            .put(format!("/pix/{e2eid}/devolucao/{refund_id}"))
            .context(ctx)
            .json(request)
            .send_json()
            .await
            .map_err(PixError::request("create refund"))
    }

    pub async fn get_refund(
        &self,
        ctx: &RequestContext,
        e2eid: &str,
        refund_id: &str,
    ) -> PixResult<Refund> {
        require("e2eid", e2eid)?;
        require("refund id", refund_id)?;

        self.http()
            .get(format!("/pix/{e2eid}/devolucao/{refund_id}"))
            .context(ctx)
            .send_json()
            .await
            .map_err(PixError::request("get refund"))
    }
}
