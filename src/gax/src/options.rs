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

//! Client configuration and polling options.
//!
//! Applications rarely need to use these types directly, the client builders
//! populate them. They are public so the polling crates and the clients share
//! a single definition.

use crate::retry_policy::RetryPolicy;
use std::time::Duration;

/// The default endpoint for the management service.
pub const DEFAULT_ENDPOINT: &str = "https://management.core.windows.net";

pub(crate) const LOGGING_VAR: &str = "CLOUD_MGMT_LOGGING";

/// Controls how often, and for how long, an asynchronous operation is polled.
///
/// An interval of zero disables waiting for long-running operations: the
/// clients return as soon as the service accepts the request.
///
/// # Example
/// ```
/// # use cloud_mgmt_gax::options::PollingOptions;
/// # use std::time::Duration;
/// let options = PollingOptions::default()
///     .with_interval(Duration::from_secs(5))
///     .with_timeout(Duration::from_secs(600));
/// assert_eq!(options.interval(), Duration::from_secs(5));
/// assert!(!options.is_disabled());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollingOptions {
    interval: Duration,
    timeout: Duration,
}

impl PollingOptions {
    /// Creates a new instance.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// The defaults for disk deletion.
    ///
    /// Disks remain attached to a virtual machine for a while after the
    /// machine is deleted, so these allow more time than the defaults for
    /// other operations.
    pub fn disk_deletion() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(30 * 60),
        }
    }

    /// Changes the polling interval.
    pub fn with_interval(mut self, v: Duration) -> Self {
        self.interval = v;
        self
    }

    /// Changes the overall polling timeout.
    pub fn with_timeout(mut self, v: Duration) -> Self {
        self.timeout = v;
        self
    }

    /// The delay between consecutive probes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The maximum time spent polling.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns true if waiting for long-running operations is disabled.
    pub fn is_disabled(&self) -> bool {
        self.interval.is_zero()
    }
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(20 * 60),
        }
    }
}

/// Configure a client.
///
/// The client builders populate this type. The transport and the clients
/// read it.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub endpoint: String,
    pub subscription_id: String,
    pub retry_policy: RetryPolicy,
    pub polling: PollingOptions,
    pub disk_deletion: PollingOptions,
    pub tracing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subscription_id: String::new(),
            retry_policy: RetryPolicy::default(),
            polling: PollingOptions::default(),
            disk_deletion: PollingOptions::disk_deletion(),
            tracing: false,
        }
    }
}

/// Returns true if the environment or client configuration enables tracing.
pub fn tracing_enabled(config: &ClientConfig) -> bool {
    if config.tracing {
        return true;
    }
    std::env::var(LOGGING_VAR)
        .map(|v| v == "true")
        .unwrap_or(false)
}
