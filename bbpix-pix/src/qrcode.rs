//! Immediate charges (`/cob`) and their QR codes.

use bbpix_http_client::RequestContext;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{
    AdditionalInfo, Amount, Calendar, Debtor, ListParameters, Location, Paging, timestamp,
};
use crate::validation::{
    require, validate_amount, validate_cnpj, validate_cpf, validate_debtor, validate_expiration,
    validate_txid,
};
use crate::{Client, PixError, PixResult};

/// Charge lifetime used when none is given, in seconds.
pub const DEFAULT_EXPIRATION: u32 = 3600;

/// Lifecycle of a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QRCodeStatus {
    Ativa,
    Concluida,
    RemovidaPeloUsuarioRecebedor,
    RemovidaPeloPsp,
    #[serde(other)]
    Unknown,
}

impl QRCodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ativa => "ATIVA",
            Self::Concluida => "CONCLUIDA",
            Self::RemovidaPeloUsuarioRecebedor => "REMOVIDA_PELO_USUARIO_RECEBEDOR",
            Self::RemovidaPeloPsp => "REMOVIDA_PELO_PSP",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for QRCodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a new immediate charge.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateQRCodeRequest {
    pub txid: String,
    /// Seconds until the charge expires.
    pub expiration: u32,
    pub amount: Decimal,
    /// The receiver's PIX key.
    pub key: String,
    pub payer_request: Option<String>,
    pub additional_info: Vec<AdditionalInfo>,
    pub debtor: Option<Debtor>,
}

impl CreateQRCodeRequest {
    pub fn new(txid: impl Into<String>, key: impl Into<String>, amount: Decimal) -> Self {
        Self {
            txid: txid.into(),
            expiration: DEFAULT_EXPIRATION,
            amount,
            key: key.into(),
            payer_request: None,
            additional_info: Vec::new(),
            debtor: None,
        }
    }

    pub fn expiration(mut self, seconds: u32) -> Self {
        self.expiration = seconds;
        self
    }

    pub fn debtor(mut self, debtor: Debtor) -> Self {
        self.debtor = Some(debtor);
        self
    }

    /// Message shown to the payer.
    pub fn payer_request(mut self, message: impl Into<String>) -> Self {
        self.payer_request = Some(message.into());
        self
    }

    pub fn info(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_info.push(AdditionalInfo::new(name, value));
        self
    }

    pub fn validate(&self) -> PixResult<()> {
        validate_txid(&self.txid)?;
        require("key", &self.key)?;
        validate_amount("amount", self.amount)?;
        validate_expiration(self.expiration)?;
        if let Some(debtor) = &self.debtor {
            validate_debtor(debtor)?;
        }
        Ok(())
    }

    fn body(&self) -> ChargeBody<'_> {
        ChargeBody {
            calendar: Some(CalendarBody {
                expiration: self.expiration,
            }),
            amount: Some(AmountBody {
                original: self.amount,
            }),
            key: Some(&self.key),
            payer_request: self.payer_request.as_deref(),
            additional_info: &self.additional_info,
            debtor: self.debtor.as_ref(),
        }
    }
}

/// Changes to an existing charge. Unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateQRCodeRequest {
    pub expiration: Option<u32>,
    pub amount: Option<Decimal>,
    pub debtor: Option<Debtor>,
    pub payer_request: Option<String>,
}

impl UpdateQRCodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expiration(mut self, seconds: u32) -> Self {
        self.expiration = Some(seconds);
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn debtor(mut self, debtor: Debtor) -> Self {
        self.debtor = Some(debtor);
        self
    }

    pub fn payer_request(mut self, message: impl Into<String>) -> Self {
        self.payer_request = Some(message.into());
        self
    }

    pub fn validate(&self) -> PixResult<()> {
        if self.expiration.is_none()
            && self.amount.is_none()
            && self.debtor.is_none()
            && self.payer_request.is_none()
        {
            return Err(PixError::validation("update has no changes"));
        }
        if let Some(seconds) = self.expiration {
            validate_expiration(seconds)?;
        }
        if let Some(amount) = self.amount {
            validate_amount("amount", amount)?;
        }
        if let Some(debtor) = &self.debtor {
            validate_debtor(debtor)?;
        }
        Ok(())
    }

    fn body(&self) -> ChargeBody<'_> {
        ChargeBody {
            calendar: self.expiration.map(|expiration| CalendarBody { expiration }),
            amount: self.amount.map(|original| AmountBody { original }),
            key: None,
            payer_request: self.payer_request.as_deref(),
            additional_info: &[],
            debtor: self.debtor.as_ref(),
        }
    }
}

#[derive(Serialize)]
struct ChargeBody<'a> {
    #[serde(rename = "calendario", skip_serializing_if = "Option::is_none")]
    calendar: Option<CalendarBody>,
    #[serde(rename = "valor", skip_serializing_if = "Option::is_none")]
    amount: Option<AmountBody>,
    #[serde(rename = "chave", skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(rename = "solicitacaoPagador", skip_serializing_if = "Option::is_none")]
    payer_request: Option<&'a str>,
    #[serde(rename = "infoAdicionais", skip_serializing_if = "no_info")]
    additional_info: &'a [AdditionalInfo],
    #[serde(rename = "devedor", skip_serializing_if = "Option::is_none")]
    debtor: Option<&'a Debtor>,
}

fn no_info(info: &&[AdditionalInfo]) -> bool {
    info.is_empty()
}

#[derive(Serialize)]
struct CalendarBody {
    #[serde(rename = "expiracao")]
    expiration: u32,
}

#[derive(Serialize)]
struct AmountBody {
    #[serde(with = "crate::amount")]
    original: Decimal,
}

/// A charge as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QRCodeResponse {
    #[serde(rename = "calendario")]
    pub calendar: Calendar,
    pub txid: String,
    #[serde(rename = "revisao", default)]
    pub revision: u32,
    #[serde(rename = "loc", default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: QRCodeStatus,
    #[serde(rename = "devedor", default, skip_serializing_if = "Option::is_none")]
    pub debtor: Option<Debtor>,
    #[serde(rename = "valor")]
    pub amount: Amount,
    #[serde(rename = "chave", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "solicitacaoPagador", default, skip_serializing_if = "Option::is_none")]
    pub payer_request: Option<String>,
    #[serde(rename = "infoAdicionais", default, skip_serializing_if = "Vec::is_empty")]
    pub additional_info: Vec<AdditionalInfo>,
    /// The copy-and-paste payload for the payer's banking app.
    #[serde(rename = "pixCopiaECola", default, skip_serializing_if = "Option::is_none")]
    pub copy_paste: Option<String>,
}

/// One page of charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QRCodeListResponse {
    #[serde(rename = "parametros")]
    pub parameters: ListParameters,
    #[serde(rename = "cobs", default)]
    pub qr_codes: Vec<QRCodeResponse>,
}

/// Filter for [`Client::list_qr_codes`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListQRCodesParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub status: Option<QRCodeStatus>,
    pub paging: Paging,
}

impl ListQRCodesParams {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            cpf: None,
            cnpj: None,
            status: None,
            paging: Paging::default(),
        }
    }

    pub fn cpf(mut self, cpf: impl Into<String>) -> Self {
        self.cpf = Some(cpf.into());
        self
    }

    pub fn cnpj(mut self, cnpj: impl Into<String>) -> Self {
        self.cnpj = Some(cnpj.into());
        self
    }

    pub fn status(mut self, status: QRCodeStatus) -> Self {
        self.status = Some(status);
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
        if self.status == Some(QRCodeStatus::Unknown) {
            return Err(PixError::validation("unknown status filter"));
        }
        Ok(())
    }
}

impl Client {
    /// Create an immediate charge under the caller-chosen txid.
    pub async fn create_qr_code(
        &self,
        ctx: &RequestContext,
        request: &CreateQRCodeRequest,
    ) -> PixResult<QRCodeResponse> {
        request.validate()?;
        debug!(txid = %request.txid, amount = %request.amount, "Creating QR code");

        self.http()
            .put(format!("/cob/{}", request.txid))
            .context(ctx)
            .json(&request.body())
            .send_json()
            .await
            .map_err(PixError::request("create qr code"))
    }

    pub async fn get_qr_code(&self, ctx: &RequestContext, txid: &str) -> PixResult<QRCodeResponse> {
        require("txid", txid)?;

        self.http()
            .get(format!("/cob/{txid}"))
            .context(ctx)
            .send_json()
            .await
            .map_err(PixError::request("get qr code"))
    }

    pub async fn update_qr_code(
        &self,
        ctx: &RequestContext,
        txid: &str,
        request: &UpdateQRCodeRequest,
    ) -> PixResult<QRCodeResponse> {
        require("txid", txid)?;
        request.validate()?;
        debug!(txid, "Updating QR code");

        self.http()
            .patch(format!("/cob/{txid}"))
            .context(ctx)
            .json(&request.body())
            .send_json()
            .await
            .map_err(PixError::request("update qr code"))
    }

    pub async fn list_qr_codes(
        &self,
        ctx: &RequestContext,
        params: &ListQRCodesParams,
    ) -> PixResult<QRCodeListResponse> {
        params.validate()?;

        self.http()
            .get("/cob")
            .context(ctx)
            .query("inicio", timestamp(&params.start))
            .query("fim", timestamp(&params.end))
            .query_opt("cpf", params.cpf.as_deref())
            .query_opt("cnpj", params.cnpj.as_deref())
            .query_opt("status", params.status)
            .query_opt("paginaAtual", params.paging.page)
            .query_opt("itensPorPagina", params.paging.page_size)
            .send_json()
            .await
            .map_err(PixError::request("list qr codes"))
    }

    pub async fn delete_qr_code(&self, ctx: &RequestContext, txid: &str) -> PixResult<()> {
        require("txid", txid)?;
        debug!(txid, "Deleting QR code");

        self.http()
            .delete(format!("/cob/{txid}"))
            .context(ctx)
            .send_empty()
            .await
            .map_err(PixError::request("delete qr code"))
    }
}
