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

//! Defines the exchange-level retry policy.
//!
//! The management service answers some requests with transient errors, for
//! example `409 Conflict` while another operation holds a lock on the same
//! resource, or `503 Service Unavailable` during maintenance. The transport
//! automatically resends the request when the response status is in the
//! retryable set, up to a fixed number of times, with a fixed delay between
//! attempts.
//!
//! This is independent of the asynchronous-operation polling loops, which
//! poll until the operation reaches a terminal state and always run on top of
//! this policy.
//!
//! # Example
//! ```
//! # use cloud_mgmt_gax::retry_policy::RetryPolicy;
//! # use std::time::Duration;
//! let policy = RetryPolicy::default()
//!     .with_max_retries(3)
//!     .with_delay(Duration::from_secs(2));
//! let mut session = policy.session();
//! assert!(session.should_retry(http::StatusCode::SERVICE_UNAVAILABLE));
//! assert!(!session.should_retry(http::StatusCode::BAD_REQUEST));
//! ```

use http::StatusCode;
use std::time::Duration;

/// The default number of retries for each exchange.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// The default delay between retries.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Controls which responses are retried by the transport, and how often.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    retryable_status_codes: Vec<StatusCode>,
    delay: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            retryable_status_codes: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    /// Changes the maximum number of retries.
    pub fn with_max_retries(mut self, v: u32) -> Self {
        self.max_retries = v;
        self
    }

    /// Changes the delay between retries.
    pub fn with_delay(mut self, v: Duration) -> Self {
        self.delay = v;
        self
    }

    /// Replaces the set of retryable status codes.
    pub fn with_retryable_status_codes<I>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = StatusCode>,
    {
        self.retryable_status_codes = v.into_iter().collect();
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn retryable_status_codes(&self) -> &[StatusCode] {
        &self.retryable_status_codes
    }

    /// Returns true if `status` is in the retryable set.
    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Starts the retry bookkeeping for a single exchange.
    pub fn session(&self) -> RetrySession<'_> {
        RetrySession {
            policy: self,
            retries_left: self.max_retries,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retryable_status_codes: vec![
                StatusCode::CONFLICT,
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
            delay: DEFAULT_DELAY,
        }
    }
}

/// Tracks the retries consumed by one exchange.
#[derive(Debug)]
pub struct RetrySession<'a> {
    policy: &'a RetryPolicy,
    retries_left: u32,
}

impl RetrySession<'_> {
    /// Consumes one retry if `status` is retryable and retries remain.
    pub fn should_retry(&mut self, status: StatusCode) -> bool {
        if self.retries_left == 0 || !self.policy.is_retryable(status) {
            return false;
        }
        self.retries_left -= 1;
        true
    }

    pub fn retries_left(&self) -> u32 {
        self.retries_left
    }

    /// The delay before the next attempt.
    pub fn delay(&self) -> Duration {
        self.policy.delay
    }
}
