//! Received PIX payments (`/pix`).

use bbpix_http_client::RequestContext;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::refund::Refund;
use crate::types::{ListParameters, Paging, timestamp};
use crate::validation::{require, validate_cnpj, validate_cpf};
use crate::{Client, PixError, PixResult};

/// A payment received into the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "endToEndId")]
    pub end_to_end_id: String,
    /// Charge the payment settled, absent for payments made straight to a key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(rename = "valor", with = "crate::amount")]
    pub amount: Decimal,
    #[serde(rename = "horario")]
    pub time: DateTime<Utc>,
    #[serde(rename = "infoPagador", default, skip_serializing_if = "Option::is_none")]
    pub payer_info: Option<String>,
    #[serde(rename = "devolucoes", default, skip_serializing_if = "Vec::is_empty")]
    pub refunds: Vec<Refund>,
}

/// One page of payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentListResponse {
    #[serde(rename = "parametros")]
    pub parameters: ListParameters,
    #[serde(rename = "pix", default)]
    pub payments: Vec<Payment>,
}

/// Filter for [`Client::list_payments`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListPaymentsParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub txid: Option<String>,
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub paging: Paging,
}

impl ListPaymentsParams {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            txid: None,
            cpf: None,
            cnpj: None,
            paging: Paging::default(),
        }
    }

    pub fn txid(mut self, txid: impl Into<String>) -> Self {
        self.txid = Some(txid.into());
        self
    }

    pub fn cpf(mut self, cpf: impl Into<String>) -> Self {
        self.cpf = Some(cpf.into());
        self
    }

    pub fn cnpj(mut self, cnpj: impl Into<String>) -> Self {
        self.cnpj = Some(cnpj.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.paging.page = Some(page);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.paging.page_size = Some(size);
        self
    }

    pub fn validate(&self) -> PixResult<()> {
        if self.start > self.end {
            return Err(PixError::validation("start must not be after end"));
        }
        if self.cpf.is_some() && self.cnpj.is_some() {
            return Err(PixError::validation("filter by either cpf or cnpj, not both"));
        }
        if let Some(cpf) = &self.cpf {
            validate_cpf(cpf)?;
        }
        if let Some(cnpj) = &self.cnpj {
            validate_cnpj(cnpj)?;
        }
        Ok(())
    }
}

impl Client {
    pub async fn get_payment(&self, ctx: &RequestContext, e2eid: &str) -> PixResult<Payment> {
        require("e2eid", e2eid)?;

        self.http()
            .get(format!("/pix/{e2eid}"))
            .context(ctx)
            .send_json()
            .await
            .map_err(PixError::request("get payment"))
    }

    pub async fn list_payments(
        &self,
        ctx: &RequestContext,
        params: &ListPaymentsParams,
    ) -> PixResult<PaymentListResponse> {
        params.validate()?;

        self.http()
            .get("/pix")
            .context(ctx)
            .query("inicio", timestamp(&params.start))
            .query("fim", timestamp(&params.end))
            .query_opt("txid", params.txid.as_deref())
            .query_opt("cpf", params.cpf.as_deref())
            .query_opt("cnpj", params.cnpj.as_deref())
            .query_opt("paginaAtual", params.paging.page)
            .query_opt("itensPorPagina", params.paging.page_size)
            .send_json()
            .await
            .map_err(PixError::request("list payments"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_decodes_with_refunds() {
        let payment: Payment = serde_json::from_value(json!({
            "endToEndId": "E12345678202401101000abcdefghijk",
            "txid": "abcdefghijklmnopqrstuvwxyz012",
            "valor": "100.00",
            "horario": "2024-01-10T10:00:00.123Z",
            "infoPagador": "Obrigado",
            "devolucoes": [{
                "id": "D1",
                "rtrId": "D12345678202401101000abcdefghijk",
                "valor": "10.00",
                "horario": {
                    "solicitacao": "2024-01-10T11:00:00Z",
                    "liquidacao": "2024-01-10T11:00:05Z"
                },
                "status": "DEVOLVIDO",
                "motivo": "Cliente desistiu"
            }]
        }))
        .unwrap();

        assert_eq!(payment.amount, Decimal::new(100, 0));
        assert_eq!(payment.refunds.len(), 1);
        assert_eq!(payment.refunds[0].amount, Decimal::new(10, 0));
        assert!(payment.refunds[0].time.settled_at.is_some());
    }

    #[test]
    fn test_payment_without_charge() {
        let payment: Payment = serde_json::from_value(json!({
            "endToEndId": "E1",
            "valor": "1.99",
            "horario": "2024-01-10T10:00:00Z"
        }))
        .unwrap();

        assert!(payment.txid.is_none());
        assert!(payment.refunds.is_empty());
    }

    #[test]
    fn test_list_params_validation() {
        let now = Utc::now();
        let earlier = now - chrono::Duration::hours(2);
        assert!(ListPaymentsParams::new(earlier, now).txid("x").validate().is_ok());
        assert!(ListPaymentsParams::new(now, earlier).validate().is_err());
        assert!(
            ListPaymentsParams::new(earlier, now)
                .cpf("abc")
                .validate()
                .is_err()
        );
    }
}
