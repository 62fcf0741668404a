//! Request logging middleware for HTTP request/response tracking.
//!
//! Every request gets a request id (echoed back in `x-request-id`) and one
//! structured `tracing` event on completion with status and latency. Request
//! bodies are never logged since they may carry full images.

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
};
use futures::future::{Ready, ok};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use uuid::Uuid;

/// Requests slower than this are logged with an extra warning.
pub const SLOW_REQUEST_MS: u128 = 15_000;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request logging middleware that captures request/response metadata.
#[derive(Clone)]
pub struct RequestLoggingMiddleware;

impl RequestLoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RequestLoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLoggingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggingService { service })
    }
}

/// Request logging service implementation.
pub struct RequestLoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4();

        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = extract_real_ip(&req);
        let content_length = req
            .headers()
            .get("content-length")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            remote_addr = %remote_addr,
            content_length,
            "Incoming request"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut response = fut.await?;
            let duration_ms = start_time.elapsed().as_millis();
            let status_code = response.status().as_u16();

            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            match status_code {
                500..=599 => tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status_code,
                    duration_ms = duration_ms as u64,
                    "{method} {path} {status_code} {duration_ms}ms"
                ),
                400..=499 => tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status_code,
                    duration_ms = duration_ms as u64,
                    "{method} {path} {status_code} {duration_ms}ms"
                ),
                _ => tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status_code,
                    duration_ms = duration_ms as u64,
                    "{method} {path} {status_code} {duration_ms}ms"
                ),
            }

            if duration_ms > SLOW_REQUEST_MS {
                tracing::warn!(
                    request_id = %request_id,
                    slow_request = true,
                    threshold_ms = SLOW_REQUEST_MS as u64,
                    "Slow request detected: {method} {path} ({duration_ms}ms)"
                );
            }

            Ok(response)
        })
    }
}

/// Extract real IP address considering proxy headers.
pub fn extract_real_ip(req: &ServiceRequest) -> String {
    let headers_to_check = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

    for header_name in &headers_to_check {
        if let Some(ip_str) = req.headers().get(*header_name).and_then(|h| h.to_str().ok()) {
            // Take the first IP if multiple are present (comma-separated)
            let first_ip = ip_str.split(',').next().unwrap_or("").trim();
            if !first_ip.is_empty() && first_ip != "unknown" {
                return first_ip.to_string();
            }
        }
    }

    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}
