//! Entry point for the PIX resources.

use bbpix_http_client::HttpClient;

/// PIX resource client.
///
/// Operations are split by resource: QR codes in [`crate::qrcode`], received
/// payments in [`crate::payment`] and refunds in [`crate::refund`]. Every call
/// goes through the [`HttpClient`] it was built with, so authentication,
/// retries and the circuit breaker apply uniformly.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
}

impl Client {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}
