//! Caller-side cancellation and deadlines.
//!
//! A [`RequestContext`] travels with every era operation. The caller can
//! cancel it or give it a deadline; the era services race each store call
//! against it and check it again once the call returns, so an answer that
//! arrives after the caller gave up is never trusted.
//!
//! # Architecture
//!
//! The cancelled flag is an [`AtomicBool`] paired with a [`Notify`] so
//! synchronous checks ([`RequestContext::err`]) stay lock-free and async
//! waiters ([`RequestContext::done`]) wake as soon as [`cancel`] is called.
//!
//! [`cancel`]: RequestContext::cancel

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

/// Why a context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Cancellation {
    /// The caller cancelled the context.
    #[error("context cancelled")]
    Cancelled,
    /// The context's deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Default)]
struct Signal {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cancellation handle threaded through era operations.
///
/// Cloning is cheap; all clones share the same cancelled flag.
#[derive(Debug, Clone)]
pub struct RequestContext {
    signal: Arc<Signal>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            signal: Arc::default(),
            deadline: None,
        }
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Instant::now()
            .checked_add(timeout)
            .map_or_else(Self::background, Self::with_deadline)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            signal: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.signal.cancelled.store(true, Ordering::Release);
        self.signal.notify.notify_waiters();
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<Cancellation> {
        if self.signal.cancelled.load(Ordering::Acquire) {
            return Some(Cancellation::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Cancellation::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> Cancellation {
        let notified = self.signal.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not missed.
        notified.as_mut().enable();

        if let Some(cancellation) = self.err() {
            return cancellation;
        }

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = &mut notified => Cancellation::Cancelled,
                    () = tokio::time::sleep_until(deadline) => {
                        self.err().unwrap_or(Cancellation::DeadlineExceeded)
                    }
                }
            }
            None => {
                notified.await;
                Cancellation::Cancelled
            }
        }
    }

    /// Drive `fut` unless the context finishes first.
    ///
    /// The context is checked again after `fut` completes: an answer that
    /// raced a cancellation is discarded.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Cancellation> {
        tokio::select! {
            biased;
            cancellation = self.done() => Err(cancellation),
            output = fut => self.err().map_or(Ok(output), Err),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}
