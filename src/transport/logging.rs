// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower logging layer for JSON-RPC calls.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket, SerializedRequest};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

/// Records every RPC call in an `rpc_call` span with its label and duration.
///
/// Payloads are only logged (at `trace`) when enabled, since `view_code`
/// responses carry whole contracts.
#[derive(Clone, Debug, Default)]
pub struct LoggingLayer {
    log_requests: bool,
    log_responses: bool,
}

impl LoggingLayer {
    /// Timing and errors only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log request payloads.
    pub fn with_request_logging(mut self) -> Self {
        self.log_requests = true;
        self
    }

    /// Also log response payloads.
    pub fn with_response_logging(mut self) -> Self {
        self.log_responses = true;
        self
    }

    /// Log both payloads.
    pub fn verbose(self) -> Self {
        self.with_request_logging().with_response_logging()
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService {
            service,
            log_requests: self.log_requests,
            log_responses: self.log_responses,
        }
    }
}

/// Service produced by [`LoggingLayer`].
#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
    log_requests: bool,
    log_responses: bool,
}

impl<S> tower::Service<RequestPacket> for LoggingService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let log_requests = self.log_requests;
        let log_responses = self.log_responses;
        let mut service = self.service.clone();
        let label = call_label(&request);

        let span = tracing::info_span!(
            "rpc_call",
            method = %label,
            duration_ms = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let start = Instant::now();

                if log_requests {
                    trace!(request = ?request, "RPC request");
                } else {
                    debug!("RPC request: {label}");
                }

                let result = service.call(request).await;
                let duration_ms = start.elapsed().as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);

                match &result {
                    Ok(response) if log_responses => {
                        trace!(response = ?response, duration_ms, "RPC response");
                    }
                    Ok(_) => debug!(duration_ms, "RPC response: {label}"),
                    Err(e) => warn!(error = %e, duration_ms, "RPC error: {label}"),
                }

                result
            }
            .instrument(span),
        )
    }
}

/// `method`, or `method/request_type` for NEAR `query` calls.
fn call_label(request: &RequestPacket) -> String {
    match request {
        RequestPacket::Single(req) => single_label(req),
        RequestPacket::Batch(reqs) => match reqs.as_slice() {
            [] => "batch(empty)".to_string(),
            [req] => single_label(req),
            _ => format!("batch({} calls)", reqs.len()),
        },
    }
}

fn single_label(req: &SerializedRequest) -> String {
    let method = req.method();
    let request_type = req
        .params()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw.get()).ok())
        .and_then(|params| {
            params
                .get("request_type")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });

    match request_type {
        Some(request_type) => format!("{method}/{request_type}"),
        None => method.to_string(),
    }
}
