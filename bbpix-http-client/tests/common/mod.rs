//! Shared test doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use bbpix_auth::{AuthError, Token, TokenProvider};
use bbpix_http_client::{HttpClientError, Request, RequestContext, Response, Result, StatusCode, Transport};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the scripted transport does for one call.
#[derive(Debug, Clone)]
pub enum Step {
    Status(u16),
    Body(u16, &'static str),
    /// Transport-level failure.
    Error,
    /// Never completes unless the context fires.
    Hang,
}

/// Bumps a counter when the response carrying it is dropped.
struct ReleaseGuard(Arc<AtomicUsize>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Transport that replays a script, then repeats a fallback step.
pub struct MockTransport {
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicUsize,
    released: Arc<AtomicUsize>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Self::with_fallback(steps, Step::Status(200))
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::with_fallback([], step)
    }

    pub fn with_fallback(steps: impl IntoIterator<Item = Step>, fallback: Step) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            fallback,
            calls: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Responses produced by this transport that have since been dropped.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    fn response(&self, status: u16, body: &'static str) -> Response {
        let status = StatusCode::from_u16(status).expect("valid status");
        let mut response = Response::new(status, body);
        response
            .extensions_mut()
            .insert(Arc::new(ReleaseGuard(Arc::clone(&self.released))));
        response
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let step = self
            .steps
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match step {
            Step::Status(status) => Ok(self.response(status, "")),
            Step::Body(status, body) => Ok(self.response(status, body)),
            Step::Error => Err(HttpClientError::Connection("connection refused".into())),
            Step::Hang => ctx.run(std::future::pending::<Result<Response>>()).await,
        }
    }
}

/// Token provider that hands out a fixed token and counts calls.
pub struct StaticTokenProvider {
    token: Token,
    fail: bool,
    fetches: AtomicUsize,
    invalidations: AtomicUsize,
}

impl StaticTokenProvider {
    pub fn new(access_token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: Token::new(access_token, "Bearer", 3600),
            fail: false,
            fetches: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            token: Token::new("unused", "Bearer", 3600),
            fail: true,
            fetches: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        })
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> bbpix_auth::Result<Token> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AuthError::Status {
                status: 401,
                body: "invalid_client".into(),
            });
        }
        Ok(self.token.clone())
    }

    fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn get(url: &str) -> Request {
    Request::parse(bbpix_http_client::Method::GET, url).expect("valid url")
}

pub fn request(method: bbpix_http_client::Method, url: &str) -> Request {
    Request::parse(method, url).expect("valid url")
}
