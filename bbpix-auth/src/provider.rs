// Token provider abstraction

use crate::{Result, Token};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of bearer credentials for outbound requests.
///
/// Implementations cache the credential and are shared by every request
/// flow of a client, so both methods must be safe to call concurrently.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a credential that is valid for at least the expiry margin.
    async fn get_token(&self) -> Result<Token>;

    /// Drop the cached credential so the next `get_token` fetches a new one.
    fn invalidate(&self);
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn get_token(&self) -> Result<Token> {
        (**self).get_token().await
    }

    fn invalidate(&self) {
        (**self).invalidate()
    }
}
