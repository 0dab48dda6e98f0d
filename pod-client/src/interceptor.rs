//! Hooks observing every request outcome.

use std::fmt::Debug;

use crate::error::ApiError;
use crate::request::RequestDescription;

/// Observes the outcome of each request.
///
/// Exactly one of the two methods is called, exactly once, per request.
pub trait ResponseInterceptor: Send + Sync {
    /// The request succeeded and decoded to `payload`.
    fn on_success(&self, request: &RequestDescription, payload: &dyn Debug);

    /// The request failed.
    fn on_error(&self, request: &RequestDescription, error: &ApiError);
}

/// Logs requests and outcomes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

impl ResponseInterceptor for TracingInterceptor {
    fn on_success(&self, request: &RequestDescription, payload: &dyn Debug) {
        tracing::info!(method = request.method().as_str(), url = request.url(), "request succeeded");
        tracing::debug!(request = %request, payload = ?payload, "response payload");
    }

    fn on_error(&self, request: &RequestDescription, error: &ApiError) {
        match error {
            ApiError::App(app) => app.trace_warn("request failed"),
            other => tracing::warn!(error = %other, "request failed"),
        }
        tracing::info!(request = %request, "failed request");
    }
}
