// Copyright 2025 Google LLC
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

//! Provide types for client construction.
//!
//! Applications should not create builders directly, instead use
//! [ManagementClient::builder][crate::ManagementClient::builder].
//!
//! ## Example: create a client with a different endpoint
//!
//! ```
//! # use cloud_mgmt::ManagementClient;
//! let client = ManagementClient::builder()
//!     .with_endpoint("https://management.example.com")
//!     .with_subscription_id("my-subscription")
//!     .build()?;
//! # cloud_mgmt::builder::Result::<()>::Ok(())
//! ```

use crate::ManagementClient;
use gax::http_client::{ReqwestTransport, Transport};
use gax::options::{ClientConfig, PollingOptions};
use gax::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// The result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Indicates a problem while constructing a client.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// If true, the client could not initialize the transport client.
    pub fn is_transport(&self) -> bool {
        matches!(&self.0, ErrorKind::Transport(_))
    }

    /// If true, the configuration is missing the subscription id.
    pub fn is_missing_subscription_id(&self) -> bool {
        matches!(&self.0, ErrorKind::MissingSubscriptionId)
    }

    pub(crate) fn transport<T: Into<BoxError>>(source: T) -> Self {
        Self(ErrorKind::Transport(source.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("could not initialize transport client")]
    Transport(#[source] BoxError),
    #[error("the subscription id is required")]
    MissingSubscriptionId,
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A builder for [ManagementClient].
#[derive(Clone, Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates a new client.
    pub fn build(self) -> Result<ManagementClient> {
        if self.config.subscription_id.is_empty() {
            return Err(Error(ErrorKind::MissingSubscriptionId));
        }
        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(&self.config).map_err(Error::transport)?),
        };
        Ok(ManagementClient::new(transport, self.config))
    }

    /// Sets the endpoint.
    ///
    /// ```
    /// # use cloud_mgmt::ManagementClient;
    /// let client = ManagementClient::builder()
    ///     .with_endpoint("http://localhost:8080")
    ///     .with_subscription_id("test-only")
    ///     .build()?;
    /// # cloud_mgmt::builder::Result::<()>::Ok(())
    /// ```
    pub fn with_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.config.endpoint = v.into();
        self
    }

    /// Sets the subscription id, every request path is relative to it.
    pub fn with_subscription_id<V: Into<String>>(mut self, v: V) -> Self {
        self.config.subscription_id = v.into();
        self
    }

    /// Configure the exchange-level retry policy.
    ///
    /// ```
    /// # use cloud_mgmt::ManagementClient;
    /// # use gax::retry_policy::RetryPolicy;
    /// let client = ManagementClient::builder()
    ///     .with_subscription_id("test-only")
    ///     .with_retry_policy(RetryPolicy::default().with_max_retries(2))
    ///     .build()?;
    /// # cloud_mgmt::builder::Result::<()>::Ok(())
    /// ```
    pub fn with_retry_policy(mut self, v: RetryPolicy) -> Self {
        self.config.retry_policy = v;
        self
    }

    /// Sets the interval between asynchronous operation polls.
    ///
    /// A zero interval disables waiting for asynchronous operations.
    pub fn with_polling_interval(mut self, v: Duration) -> Self {
        self.config.polling = self.config.polling.with_interval(v);
        self
    }

    /// Sets the maximum time spent waiting for an asynchronous operation.
    pub fn with_polling_timeout(mut self, v: Duration) -> Self {
        self.config.polling = self.config.polling.with_timeout(v);
        self
    }

    /// Sets the default polling options for disk deletions.
    pub fn with_disk_deletion_options(mut self, v: PollingOptions) -> Self {
        self.config.disk_deletion = v;
        self
    }

    /// Enables tracing.
    ///
    /// The client libraries can be dynamically instrumented with the Tokio
    /// [tracing] framework. Setting this flag enables the per-request events.
    ///
    /// [tracing]: https://docs.rs/tracing/latest/tracing/
    pub fn with_tracing(mut self) -> Self {
        self.config.tracing = true;
        self
    }

    /// Replaces the default transport.
    pub fn with_transport(mut self, v: Arc<dyn Transport>) -> Self {
        self.transport = Some(v);
        self
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }
}
