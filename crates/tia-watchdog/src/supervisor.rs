//! Guarded call supervision.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::duration::format_secs;
use crate::token::{CallId, CancelToken};
use crate::watchdog::{Resolution, Watchdog};

/// Result of exactly one guarded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Success(T),
    TimedOut(Expired),
    Failed(E),
}

impl<T, E> Outcome<T, E> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::TimedOut(expired) => Outcome::TimedOut(expired),
            Self::Failed(err) => Outcome::Failed(err),
        }
    }

    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::TimedOut(expired) => Outcome::TimedOut(expired),
            Self::Failed(err) => Outcome::Failed(f(err)),
        }
    }
}

/// Timeout report for a guarded call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} timed out after {} seconds", format_secs(*.after))]
pub struct Expired {
    pub call: CallId,
    pub operation: SmolStr,
    pub after: Duration,
}

/// Runs operations under a deadline. Call ids are unique per supervisor.
#[derive(Debug)]
pub struct Supervisor {
    next_call: AtomicU64,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_call: AtomicU64::new(1),
        }
    }

    /// Run `work` on the calling thread with a watchdog armed for `timeout`.
    ///
    /// `work` receives the call's [`CancelToken`] and is expected to observe
    /// it at its blocking points. If the watchdog fires before `work`
    /// returns, whatever `work` returns afterwards is discarded and the
    /// outcome is [`Outcome::TimedOut`]. A zero timeout never starts `work`.
    pub fn guarded_call<T, E, F>(&self, operation: &str, timeout: Duration, work: F) -> Outcome<T, E>
    where
        E: fmt::Display,
        F: FnOnce(&CancelToken) -> Result<T, E>,
    {
        self.run(operation, timeout, None, work)
    }

    /// Nested form of [`Supervisor::guarded_call`]. The inner token is a
    /// child of `parent`, so the enclosing deadline also interrupts `work`;
    /// that interruption surfaces here as `Failed` and as `TimedOut` in the
    /// enclosing call.
    pub fn guarded_call_within<T, E, F>(
        &self,
        parent: &CancelToken,
        operation: &str,
        timeout: Duration,
        work: F,
    ) -> Outcome<T, E>
    where
        E: fmt::Display,
        F: FnOnce(&CancelToken) -> Result<T, E>,
    {
        self.run(operation, timeout, Some(parent.clone()), work)
    }

    fn run<T, E, F>(
        &self,
        operation: &str,
        timeout: Duration,
        parent: Option<CancelToken>,
        work: F,
    ) -> Outcome<T, E>
    where
        E: fmt::Display,
        F: FnOnce(&CancelToken) -> Result<T, E>,
    {
        let call = CallId::new(self.next_call.fetch_add(1, Ordering::Relaxed));
        let token = CancelToken::new(call, parent);
        let timeout_secs = format_secs(timeout);
        debug!(call = %call, operation, timeout_secs = %timeout_secs, "guarded call started");

        let mut watchdog = Watchdog::arm(&token, timeout);
        let result = if watchdog.has_fired() {
            None
        } else {
            Some(work(&token))
        };
        let resolution = watchdog.resolve();
        watchdog.disarm();

        match (resolution, result) {
            (Resolution::Completed, Some(Ok(value))) => {
                debug!(call = %call, operation, timeout_secs = %timeout_secs, "guarded call completed");
                Outcome::Success(value)
            }
            (Resolution::Completed, Some(Err(err))) => {
                warn!(call = %call, operation, timeout_secs = %timeout_secs, error = %err, "guarded call failed");
                Outcome::Failed(err)
            }
            _ => {
                warn!(call = %call, operation, timeout_secs = %timeout_secs, "guarded call timed out");
                Outcome::TimedOut(Expired {
                    call,
                    operation: SmolStr::new(operation),
                    after: timeout,
                })
            }
        }
    }
}
