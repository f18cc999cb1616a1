//! Shared application state for the era API.

use std::time::Duration;

use world_one_eras::RequestContext;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState<B> {
    /// Storage backend with its transaction handling.
    pub backend: B,
    /// Deadline applied to each request's era operations.
    pub request_timeout: Duration,
}

impl<B> AppState<B> {
    /// Create state over `backend` with the given per-request deadline.
    pub const fn new(backend: B, request_timeout: Duration) -> Self {
        Self {
            backend,
            request_timeout,
        }
    }

    /// A fresh context for one request.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }
}
