//! Pipeline overhead benchmarks for bbpix

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use bbpix::auth::{Result as AuthResult, Token, TokenProvider};
use bbpix::http::{
    CircuitBreaker, CircuitBreakerConfig, FixedJitter, Method, Pipeline, Request, RequestContext,
    Response, Result, RetryConfig, StatusCode, Transport,
};

struct OkTransport;

#[async_trait]
impl Transport for OkTransport {
    async fn send(&self, _ctx: &RequestContext, _request: &Request) -> Result<Response> {
        Ok(Response::new(StatusCode::OK, "{}"))
    }
}

struct StaticToken(Token);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn get_token(&self) -> AuthResult<Token> {
        Ok(self.0.clone())
    }

    fn invalidate(&self) {}
}

// =============================================================================
// Retry
// =============================================================================

fn bench_backoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("backoff");
    let config = RetryConfig::new(10, Duration::from_millis(100));

    for attempt in [0, 3, 9, 40] {
        group.bench_with_input(
            BenchmarkId::new("delay_for_attempt", attempt),
            &attempt,
            |b, &attempt| b.iter(|| config.delay_for_attempt(black_box(attempt), black_box(1.1))),
        );
    }

    group.finish();
}

// =============================================================================
// Circuit breaker
// =============================================================================

fn bench_circuit_breaker(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_breaker");
    let breaker = CircuitBreaker::new(CircuitBreakerConfig::new(5, Duration::from_secs(60)));

    group.bench_function("acquire_record_success", |b| {
        b.iter(|| {
            if let Ok(permit) = breaker.try_acquire() {
                permit.record_success();
            }
        })
    });

    group.bench_function("state", |b| b.iter(|| black_box(breaker.state())));

    group.finish();
}

// =============================================================================
// Full pipeline
// =============================================================================

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let pipeline = Pipeline::builder()
        .token_provider(Arc::new(StaticToken(Token::new("bench", "Bearer", 3600))))
        .app_key("bench-key")
        .jitter(Arc::new(FixedJitter(1.0)))
        .build(OkTransport)
        .unwrap();
    let request = Request::parse(Method::GET, "https://api.example.com/pix-bb/v1/cob/abc").unwrap();
    let ctx = RequestContext::new();

    group.bench_function("send_ok", |b| {
        b.to_async(&runtime).iter(|| async {
            let response = pipeline.send(&ctx, &request).await.unwrap();
            black_box(response.status())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_backoff, bench_circuit_breaker, bench_pipeline);
criterion_main!(benches);
