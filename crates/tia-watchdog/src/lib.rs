//! Deadline supervision for calls into an engineering automation layer.
//!
//! A guarded call runs its operation on the calling thread while a one-shot
//! [`Watchdog`] waits out the deadline on a background thread. Cancellation
//! is delivered through a per-call [`CancelToken`], so the operation unwinds
//! at its next observation point ([`CancelToken::check`],
//! [`CancelToken::sleep`] or [`CancelToken::wait_detached`]). Exactly one
//! [`Outcome`] is produced per call and the watchdog is always disarmed
//! before [`Supervisor::guarded_call`] returns.
//!
//! Native code that never reaches an observation point delays the timeout
//! until it yields; [`CancelToken::wait_detached`] moves such a call onto an
//! abandonable helper thread instead.

mod duration;
mod supervisor;
mod token;
mod watchdog;

pub use duration::{duration_from_secs, format_secs};
pub use supervisor::{Expired, Outcome, Supervisor};
pub use token::{CallId, CancelToken, Interrupted};
pub use watchdog::{Resolution, Watchdog};
