// Bearer credential issued by the identity endpoint

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remaining validity below which a token is treated as expired.
pub const EXPIRY_MARGIN: std::time::Duration = std::time::Duration::from_secs(5 * 60);

// Upper bound accepted by `chrono::Duration::seconds`.
const MAX_EXPIRES_IN: u64 = (i64::MAX / 1000) as u64;

/// An access token plus the data needed to decide when it must be refreshed.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    /// Validity in seconds, counted from `issued_at`.
    pub expires_in: u64,
    /// Stamped locally when the token is received.
    #[serde(skip, default = "Utc::now")]
    pub issued_at: DateTime<Utc>,
}

impl Token {
    /// Create a token issued now.
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_in: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_in,
            issued_at: Utc::now(),
        }
    }

    /// Override the issuance time.
    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = issued_at;
        self
    }

    /// Nominal expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        let validity = Duration::seconds(self.expires_in.min(MAX_EXPIRES_IN) as i64);
        self.issued_at
            .checked_add_signed(validity)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// True once less than [`EXPIRY_MARGIN`] of validity remains.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        (self.expires_at() - now).num_seconds() < EXPIRY_MARGIN.as_secs() as i64
    }

    /// Value for the `Authorization` header, e.g. `Bearer abc`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

// The access token never ends up in logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
