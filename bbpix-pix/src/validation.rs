//! Input checks applied before a request leaves the process.

use rust_decimal::Decimal;

use crate::types::Debtor;
use crate::{PixError, PixResult};

pub const TXID_MIN_LEN: usize = 26;
pub const TXID_MAX_LEN: usize = 35;
/// Longest charge lifetime the API accepts, in seconds.
pub const MAX_EXPIRATION: u32 = 86_400;

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

/// A txid for a new charge: 26 to 35 ASCII letters or digits.
pub fn validate_txid(txid: &str) -> PixResult<()> {
    require("txid", txid)?;
    let len = txid.len();
    if !(TXID_MIN_LEN..=TXID_MAX_LEN).contains(&len) {
        return Err(PixError::validation(format!(
            "txid must be between {TXID_MIN_LEN} and {TXID_MAX_LEN} characters, got {len}"
        )));
    }
    if !txid.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PixError::validation("txid must contain only letters and digits"));
    }
    Ok(())
}

pub fn require(field: &str, value: &str) -> PixResult<()> {
    if value.trim().is_empty() {
        return Err(PixError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn validate_amount(field: &str, value: Decimal) -> PixResult<()> {
    if value <= Decimal::ZERO {
        return Err(PixError::validation(format!("{field} must be positive")));
    }
    Ok(())
}

pub fn validate_expiration(seconds: u32) -> PixResult<()> {
    if seconds == 0 || seconds > MAX_EXPIRATION {
        return Err(PixError::validation(format!(
            "expiration must be between 1 and {MAX_EXPIRATION} seconds"
        )));
    }
    Ok(())
}

pub fn validate_debtor(debtor: &Debtor) -> PixResult<()> {
    require("debtor name", &debtor.name)?;
    match (debtor.cpf.as_deref(), debtor.cnpj.as_deref()) {
        (Some(cpf), None) => validate_cpf(cpf),
        (None, Some(cnpj)) => validate_cnpj(cnpj),
        (Some(_), Some(_)) => Err(PixError::validation(
            "debtor must have either cpf or cnpj, not both",
        )),
        (None, None) => Err(PixError::validation("debtor must have a cpf or cnpj")),
    }
}

pub fn validate_cpf(cpf: &str) -> PixResult<()> {
    validate_digits("cpf", cpf, CPF_LEN)
}

pub fn validate_cnpj(cnpj: &str) -> PixResult<()> {
    validate_digits("cnpj", cnpj, CNPJ_LEN)
}

fn validate_digits(field: &str, value: &str, len: usize) -> PixResult<()> {
    if value.len() != len || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PixError::validation(format!("{field} must have {len} digits")));
    }
    Ok(())
}
