//! One-shot deadline watchdog.
//! - Watchdog::arm: start the timer thread for one call
//! - Watchdog::resolve: race the operation's completion against expiry
//! - Watchdog::disarm: stop and join the timer (idempotent, also on drop)

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::trace;

use crate::token::CancelToken;

const ARMED: u8 = 0;
const COMPLETED: u8 = 1;
const FIRED: u8 = 2;

/// Which side won the race for a guarded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Completed,
    Fired,
}

#[derive(Debug)]
struct CallState {
    phase: AtomicU8,
}

impl CallState {
    fn new() -> Self {
        Self {
            phase: AtomicU8::new(ARMED),
        }
    }

    fn transition(&self, to: u8) -> bool {
        self.phase
            .compare_exchange(ARMED, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn fire(&self) -> bool {
        self.transition(FIRED)
    }

    fn complete(&self) -> bool {
        self.transition(COMPLETED)
    }

    fn fired(&self) -> bool {
        self.phase.load(Ordering::SeqCst) == FIRED
    }
}

/// Single-shot timer delivering at most one interruption to one token.
#[derive(Debug)]
pub struct Watchdog {
    state: Arc<CallState>,
    disarm: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Arm a watchdog for `timeout`. A zero timeout fires before returning.
    #[must_use]
    pub fn arm(token: &CancelToken, timeout: Duration) -> Self {
        let call = token.id();
        let state = Arc::new(CallState::new());
        if timeout.is_zero() {
            if state.fire() {
                token.cancel();
            }
            return Self {
                state,
                disarm: None,
                handle: None,
            };
        }

        let (disarm_tx, disarm_rx) = bounded::<()>(1);
        let timer_state = Arc::clone(&state);
        let timer_token = token.clone();
        let handle = thread::spawn(move || {
            // A disarm message or a dropped sender both end the wait early.
            if let Err(RecvTimeoutError::Timeout) = disarm_rx.recv_timeout(timeout) {
                if timer_state.fire() {
                    timer_token.cancel();
                    trace!(call = %call, "watchdog fired");
                }
            }
        });
        Self {
            state,
            disarm: Some(disarm_tx),
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.state.fired()
    }

    /// Mark the guarded operation as finished. Returns [`Resolution::Fired`]
    /// when the deadline expired first; a later expiry becomes a no-op.
    pub fn resolve(&self) -> Resolution {
        if self.state.complete() {
            Resolution::Completed
        } else {
            Resolution::Fired
        }
    }

    /// Stop the timer and wait for its thread to exit. Safe to call any
    /// number of times, before or after the watchdog fired.
    pub fn disarm(&mut self) {
        if let Some(disarm) = self.disarm.take() {
            let _ = disarm.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.disarm();
    }
}
