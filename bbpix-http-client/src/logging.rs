//! Request logging stage.

use crate::{Request, RequestContext, Response, Result, Transport};
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::Level;

// tracing needs the level at compile time, so pick the macro at runtime.
macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        if $level == Level::ERROR {
            tracing::error!($($arg)+)
        } else if $level == Level::WARN {
            tracing::warn!($($arg)+)
        } else if $level == Level::INFO {
            tracing::info!($($arg)+)
        } else if $level == Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

/// Emits one event per logical request with its final outcome and duration.
pub struct LoggingTransport<T> {
    inner: T,
    level: Level,
}

impl<T> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            level: Level::INFO,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

#[async_trait]
impl<T: Transport> Transport for LoggingTransport<T> {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        let start = Instant::now();
        let outcome = self.inner.send(ctx, request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            Ok(response) => event_at!(
                self.level,
                method = %request.method(),
                url = %request.url(),
                status = response.status().as_u16(),
                duration_ms,
                "HTTP request completed"
            ),
            Err(e) => event_at!(
                self.level,
                method = %request.method(),
                url = %request.url(),
                duration_ms,
                error = %e,
                "HTTP request failed"
            ),
        }

        outcome
    }
}
