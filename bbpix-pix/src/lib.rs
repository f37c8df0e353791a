//! PIX resources for the Banco do Brasil API
//!
//! Typed requests and responses for immediate charges (`/cob`), received
//! payments (`/pix`) and refunds, sent through a [`bbpix_http_client::HttpClient`].
//!
//! Inputs are checked before anything goes on the wire: a bad txid, an
//! empty identifier or a non-positive amount fails with
//! [`PixError::Validation`] and never reaches the network.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bbpix_http_client::{HttpClient, RequestContext};
//! use bbpix_pix::{Client, CreateQRCodeRequest, Debtor};
//! use rust_decimal::Decimal;
//!
//! # async fn example(http: HttpClient) -> Result<(), bbpix_pix::PixError> {
//! let pix = Client::new(http);
//! let ctx = RequestContext::new();
//!
//! let request = CreateQRCodeRequest::new(
//!     "7978c0c97ea847e78e8849634473c1f1",
//!     "chave@example.com",
//!     Decimal::new(12345, 2),
//! )
//! .debtor(Debtor::person("12345678909", "Fulano de Tal"));
//!
//! let charge = pix.create_qr_code(&ctx, &request).await?;
//! println!("pay with: {:?}", charge.copy_paste);
//! # Ok(())
//! # }
//! ```

pub mod amount;
mod client;
mod error;
pub mod payment;
pub mod qrcode;
pub mod refund;
mod types;
pub mod validation;

pub use amount::format_amount;
pub use client::Client;
pub use error::{PixError, PixResult};
pub use payment::{ListPaymentsParams, Payment, PaymentListResponse};
pub use qrcode::{
    CreateQRCodeRequest, ListQRCodesParams, QRCodeListResponse, QRCodeResponse, QRCodeStatus,
    UpdateQRCodeRequest,
};
pub use refund::{CreateRefundRequest, Refund, RefundStatus, RefundTime};
pub use chrono::{DateTime, Utc};
pub use rust_decimal::Decimal;
pub use types::{
    AdditionalInfo, Amount, Calendar, Debtor, ListParameters, Location, Pagination, Paging,
};
