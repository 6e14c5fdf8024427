// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token-bucket rate limiting for outbound RPC calls.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use tokio::{sync::Mutex, time::Instant};
use tower::Layer;
use tracing::trace;

/// Limits calls to `requests` per `period`, allowing bursts up to `requests`.
///
/// All services produced by one layer share a bucket, so one layer caps the
/// whole client no matter how many requests are in flight.
///
/// ```rust
/// use nearscan::transport::RateLimitLayer;
/// use std::time::Duration;
///
/// let per_second = RateLimitLayer::per_second(20);
/// let spaced = RateLimitLayer::with_min_delay(Duration::from_millis(50));
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    bucket: Arc<Mutex<TokenBucket>>,
}

impl RateLimitLayer {
    /// `requests` per `period`.
    pub fn new(requests: u32, period: Duration) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket::new(requests, period))),
        }
    }

    /// `requests` per second.
    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1))
    }

    /// At most one call per `delay`, no bursts.
    pub fn with_min_delay(delay: Duration) -> Self {
        Self::new(1, delay)
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService {
            service,
            bucket: self.bucket.clone(),
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    /// Tokens per nanosecond
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(requests: u32, period: Duration) -> Self {
        let requests = requests.max(1);
        let period_nanos = period.as_nanos().max(1) as f64;
        Self {
            capacity: requests as f64,
            tokens: requests as f64,
            refill_rate: requests as f64 / period_nanos,
            last_refill: Instant::now(),
        }
    }

    /// Takes a token, or returns how long until one is available.
    fn try_acquire(&mut self) -> Option<Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return None;
        }
        let missing = 1.0 - self.tokens;
        Some(Duration::from_nanos((missing / self.refill_rate).ceil() as u64))
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_nanos() as f64;
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}

/// Service produced by [`RateLimitLayer`].
#[derive(Clone, Debug)]
pub struct RateLimitService<S> {
    service: S,
    bucket: Arc<Mutex<TokenBucket>>,
}

impl<S, Request> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let bucket = self.bucket.clone();
        let mut service = self.service.clone();

        Box::pin(async move {
            loop {
                let wait = bucket.lock().await.try_acquire();
                match wait {
                    None => break,
                    Some(wait) => {
                        trace!(wait_ms = wait.as_millis() as u64, "rate limited");
                        tokio::time::sleep(wait).await;
                    }
                }
            }

            service.call(request).await
        })
    }
}
