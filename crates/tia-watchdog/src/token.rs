//! Per-call cancellation tokens.
//! - CallId: identity of one guarded call
//! - CancelToken: check/sleep/wait_detached observation points
//! - Interrupted: error raised when a token is observed cancelled

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, RecvTimeoutError};
use thiserror::Error;

const POLL_CHUNK: Duration = Duration::from_millis(5);

/// Identity of one guarded call. Only a [`crate::Supervisor`] hands out
/// non-zero ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(u64);

impl CallId {
    pub(crate) const UNGUARDED: Self = Self(0);

    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raised by an observation point once the token (or one of its ancestors)
/// has been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation interrupted by the watchdog of call {call}")]
pub struct Interrupted {
    call: CallId,
}

impl Interrupted {
    /// The call whose watchdog fired.
    #[must_use]
    pub fn call(&self) -> CallId {
        self.call
    }
}

/// Cancellation handle handed to a guarded operation.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug)]
struct TokenInner {
    id: CallId,
    cancelled: AtomicBool,
    parent: Option<CancelToken>,
}

impl CancelToken {
    pub(crate) fn new(id: CallId, parent: Option<CancelToken>) -> Self {
        Self {
            inner: Arc::new(TokenInner {
                id,
                cancelled: AtomicBool::new(false),
                parent,
            }),
        }
    }

    /// A token no watchdog is attached to. It is never cancelled.
    #[must_use]
    pub fn unguarded() -> Self {
        Self::new(CallId::UNGUARDED, None)
    }

    #[must_use]
    pub fn id(&self) -> CallId {
        self.inner.id
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_by().is_some()
    }

    /// The nearest call (this one or an enclosing one) that was cancelled.
    #[must_use]
    pub fn cancelled_by(&self) -> Option<CallId> {
        let mut current = Some(self);
        while let Some(token) = current {
            if token.inner.cancelled.load(Ordering::SeqCst) {
                return Some(token.inner.id);
            }
            current = token.inner.parent.as_ref();
        }
        None
    }

    /// Observation point: fails once the call has been cancelled.
    pub fn check(&self) -> Result<(), Interrupted> {
        match self.cancelled_by() {
            Some(call) => Err(Interrupted { call }),
            None => Ok(()),
        }
    }

    /// Sleep for `duration`, returning early when the token is cancelled.
    /// A duration past the clock's range sleeps until cancellation.
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let deadline = Instant::now().checked_add(duration);
        loop {
            self.check()?;
            let chunk = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(());
                    }
                    deadline.duration_since(now).min(POLL_CHUNK)
                }
                None => POLL_CHUNK,
            };
            thread::sleep(chunk);
        }
    }

    /// Run a blocking closure on a helper thread and wait for it while
    /// watching the token. On cancellation the helper is abandoned: it keeps
    /// running to completion and its result is dropped.
    ///
    /// A panic inside `work` is resumed on the calling thread.
    pub fn wait_detached<T, F>(&self, work: F) -> Result<T, Interrupted>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.check()?;
        let (tx, rx) = bounded(1);
        let handle = thread::spawn(move || {
            let _ = tx.send(work());
        });
        loop {
            match rx.recv_timeout(POLL_CHUNK) {
                Ok(value) => return Ok(value),
                Err(RecvTimeoutError::Timeout) => self.check()?,
                Err(RecvTimeoutError::Disconnected) => {
                    if let Err(payload) = handle.join() {
                        std::panic::resume_unwind(payload);
                    }
                    // The sender is only dropped without sending when `work` panicked.
                    unreachable!("detached worker exited without a result");
                }
            }
        }
    }

    /// Returns `true` for the first cancellation only.
    pub(crate) fn cancel(&self) -> bool {
        !self.inner.cancelled.swap(true, Ordering::SeqCst)
    }
}
