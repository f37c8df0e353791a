//! Shared PIX data types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation;
use crate::PixResult;

/// The payer of a charge, identified by exactly one of CPF or CNPJ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debtor {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cnpj: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
}

impl Debtor {
    /// A natural person, identified by an 11-digit CPF.
    pub fn person(cpf: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cpf: Some(cpf.into()),
            cnpj: None,
            name: name.into(),
        }
    }

    /// A company, identified by a 14-digit CNPJ.
    pub fn company(cnpj: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cpf: None,
            cnpj: Some(cnpj.into()),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> PixResult<()> {
        validation::validate_debtor(self)
    }
}

/// A free-form name/value pair shown to the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor")]
    pub value: String,
}

impl AdditionalInfo {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Charge lifetime as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    #[serde(rename = "criacao", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Seconds from creation until the charge expires.
    #[serde(rename = "expiracao", default)]
    pub expiration: u32,
}

/// Charged amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    #[serde(with = "crate::amount")]
    pub original: Decimal,
}

/// Payload location attached to a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub location: String,
    #[serde(rename = "tipoCob")]
    pub charge_type: String,
}

/// Paging metadata on list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(rename = "paginaAtual", default)]
    pub current_page: u32,
    #[serde(rename = "itensPorPagina", default)]
    pub items_per_page: u32,
    #[serde(rename = "quantidadeDePaginas", default)]
    pub total_pages: u32,
    #[serde(rename = "quantidadeTotalDeItens", default)]
    pub total_items: u32,
}

/// Echo of the filter a list request was served with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParameters {
    #[serde(rename = "inicio")]
    pub start: DateTime<Utc>,
    #[serde(rename = "fim")]
    pub end: DateTime<Utc>,
    #[serde(rename = "paginacao", default)]
    pub pagination: Pagination,
}

/// Page selection shared by the list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub(crate) fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
