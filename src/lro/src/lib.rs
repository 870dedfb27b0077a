// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Types and functions to wait for asynchronous operations.
//!
//! Many mutating requests in the management API return `202 Accepted` and
//! continue in the background. The client must poll until the operation
//! reaches a terminal state. This crate contains the [Poller] trait, a generic
//! polling loop ([perform_polling]), and the two pollers used by the clients:
//!
//! * [OperationPoller] queries the `operations/{id}` resource, and
//!   [block_until_completed] wraps it for any response to a mutating request.
//! * [DiskDeletionPoller] re-issues a disk deletion while the service reports
//!   the disk as still attached to a deleted virtual machine.

use gax::Result;
use gax::error::Error;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

// Bounds the deadline and the interval, larger values overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

mod disk;
mod operation;
mod status;

pub use disk::{DiskDeleter, DiskDeletionPoller, is_in_use_error};
pub use operation::{
    OPERATIONS_API_VERSION, OPERATIONS_PATH, OperationPoller, block_until_completed,
};
pub use status::{OperationState, OperationStatus};

/// The decision returned by [Poller::is_done].
///
/// # Parameters
/// * `T` - the type returned when the poll completes successfully.
#[derive(Debug)]
pub enum PollingResult<T> {
    /// The operation is still in progress.
    InProgress,
    /// The probe failed with a transient error.
    ///
    /// The polling loop continues as if the operation was still in progress.
    /// The error is kept, the loop reports the most recent one as the
    /// [source][std::error::Error::source] of a timeout.
    PollingError(Error),
    /// The operation completed. This includes the result.
    ///
    /// An `Err` value stops the polling loop immediately. It is never retried.
    Completed(Result<T>),
}

/// The trait implemented by the asynchronous operation pollers.
///
/// A poller does two things: it performs one unit of polling work, and it
/// decides whether the result of that work completes the poll.
pub trait Poller: Send {
    /// The type returned by each probe, and by the polling loop on success.
    type Output: Send;

    /// Performs one unit of work.
    ///
    /// For most operations this queries a status resource. For disk deletions
    /// this re-issues the deletion itself.
    fn probe(&mut self) -> impl Future<Output = Result<Self::Output>> + Send;

    /// Decides if the result of a probe completes the poll.
    ///
    /// Implementations must not perform I/O, and must return the same
    /// decision for equivalent inputs.
    fn is_done(&self, result: Result<Self::Output>) -> PollingResult<Self::Output>;
}

/// The error reported when a polling loop exceeds its timeout.
///
/// The message is always the same. If the poller reported any transient
/// errors the most recent one is available as the
/// [source][std::error::Error::source].
///
/// # Example
/// ```
/// # use cloud_mgmt_lro::PollingTimeout;
/// # use std::error::Error as _;
/// fn last_error(e: &gax::error::Error) -> Option<&gax::error::Error> {
///     e.source()
///         .and_then(|s| s.downcast_ref::<PollingTimeout>())
///         .and_then(|t| t.last_error())
/// }
/// ```
#[derive(Debug)]
pub struct PollingTimeout {
    last_error: Option<Error>,
}

impl PollingTimeout {
    /// The most recent transient error, if any.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }
}

impl std::fmt::Display for PollingTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "polling timed out waiting for an asynchronous operation")
    }
}

impl std::error::Error for PollingTimeout {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_error
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Drives `poller` until it completes, fails, or `timeout` expires.
///
/// The first probe is issued immediately. Subsequent probes are issued every
/// `interval`. The deadline is checked before each probe, no probe is issued
/// once it passes.
///
/// A zero `interval` runs a single probe. If that probe does not complete the
/// poll the function returns a timeout error.
///
/// Very large values, such as [Duration::MAX], are capped at about 30 years.
/// The wait for the next probe never extends past the deadline.
///
/// # Example
/// ```
/// # use cloud_mgmt_lro::{perform_polling, Poller, PollingResult};
/// # use gax::Result;
/// # use std::time::Duration;
/// struct Countdown(u32);
/// impl Poller for Countdown {
///     type Output = u32;
///     async fn probe(&mut self) -> Result<u32> {
///         self.0 = self.0.saturating_sub(1);
///         Ok(self.0)
///     }
///     fn is_done(&self, result: Result<u32>) -> PollingResult<u32> {
///         match result {
///             Ok(0) => PollingResult::Completed(Ok(0)),
///             Ok(_) => PollingResult::InProgress,
///             Err(e) => PollingResult::Completed(Err(e)),
///         }
///     }
/// }
/// # tokio_test::block_on(async {
/// let mut poller = Countdown(1);
/// let got = perform_polling(&mut poller, Duration::from_millis(1), Duration::from_secs(5)).await?;
/// assert_eq!(got, 0);
/// # gax::Result::<()>::Ok(()) });
/// ```
pub async fn perform_polling<P>(
    poller: &mut P,
    interval: Duration,
    timeout: Duration,
) -> Result<P::Output>
where
    P: Poller,
{
    let start = Instant::now();
    let deadline = start + timeout.min(FAR_FUTURE);
    let mut ticker = (!interval.is_zero()).then(|| {
        let interval = interval.min(FAR_FUTURE);
        let mut ticker = tokio::time::interval_at(start + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });
    let mut last_error = None;
    let mut attempt = 0_u32;
    loop {
        if Instant::now() >= deadline {
            tracing::warn!(attempt, ?timeout, "polling timed out");
            return Err(Error::timeout(PollingTimeout { last_error }));
        }
        attempt += 1;
        tracing::debug!(attempt, "probing asynchronous operation");
        let result = poller.probe().await;
        match poller.is_done(result) {
            PollingResult::Completed(result) => {
                tracing::debug!(attempt, success = result.is_ok(), "polling completed");
                return result;
            }
            PollingResult::PollingError(e) => {
                tracing::debug!(attempt, error = %e, "transient polling error");
                last_error = Some(e);
            }
            PollingResult::InProgress => {}
        }
        match ticker.as_mut() {
            Some(t) => {
                // An elapsed wait is reported by the deadline check.
                let _ = tokio::time::timeout_at(deadline, t.tick()).await;
            }
            None => {
                tracing::warn!(attempt, "polling timed out, a zero interval allows a single probe");
                return Err(Error::timeout(PollingTimeout { last_error }));
            }
        }
    }
}
