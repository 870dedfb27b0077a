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

use crate::Result;
use crate::builder::ClientBuilder;
use crate::model::{DeleteDiskRequest, OperationStatus, disk_path};
use gax::http_client::{Request, Transport};
use gax::options::{ClientConfig, PollingOptions};
use lro::{DiskDeleter, DiskDeletionPoller, OPERATIONS_API_VERSION, OPERATIONS_PATH};
use std::sync::Arc;

const HOSTED_SERVICES_API_VERSION: &str = "2010-10-28";
const DEPLOYMENTS_API_VERSION: &str = "2009-10-01";
const DISKS_API_VERSION: &str = "2012-08-01";

/// A client for the cloud management API.
///
/// # Example
/// ```
/// # use cloud_mgmt::ManagementClient;
/// # tokio_test::block_on(async {
/// let client = ManagementClient::builder()
///     .with_subscription_id("my-subscription")
///     .build()?;
/// # anyhow::Result::<()>::Ok(()) });
/// ```
///
/// # Configuration
///
/// To configure `ManagementClient` use the `with_*` methods in the type
/// returned by [builder()][ManagementClient::builder]. The default
/// configuration should work for most applications. Common configuration
/// changes include
///
/// * [with_endpoint()]: by default this client uses the global default
///   endpoint. Applications using private or test environments may need to
///   override this default.
/// * [with_polling_interval()] and [with_polling_timeout()]: control how
///   the client waits for asynchronous operations.
///
/// [with_endpoint()]: ClientBuilder::with_endpoint
/// [with_polling_interval()]: ClientBuilder::with_polling_interval
/// [with_polling_timeout()]: ClientBuilder::with_polling_timeout
///
/// # Pooling and Cloning
///
/// `ManagementClient` holds a connection pool internally, it is advised to
/// create one and then reuse it. You do not need to wrap `ManagementClient`
/// in an [Rc](std::rc::Rc) or [Arc] to reuse it, because it already uses an
/// `Arc` internally.
#[derive(Clone, Debug)]
pub struct ManagementClient {
    transport: Arc<dyn Transport>,
    polling: PollingOptions,
    disk_deletion: PollingOptions,
}

impl ManagementClient {
    /// Returns a builder for [ManagementClient].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            polling: config.polling,
            disk_deletion: config.disk_deletion,
        }
    }

    /// The options used to wait for asynchronous operations.
    pub fn polling_options(&self) -> &PollingOptions {
        &self.polling
    }

    /// The default options used by [delete_disk][ManagementClient::delete_disk].
    pub fn disk_deletion_options(&self) -> &PollingOptions {
        &self.disk_deletion
    }

    /// Sends `request` and waits for any asynchronous operation it starts.
    pub async fn send_and_wait(&self, request: Request) -> Result<()> {
        let response = self.transport.exchange(request).await?;
        lro::block_until_completed(self.transport.clone(), response, &self.polling).await
    }

    /// Deletes the resource at `path`, a missing resource is not an error.
    pub async fn delete_and_wait<P, V>(&self, path: P, api_version: V) -> Result<()>
    where
        P: Into<String>,
        V: Into<String>,
    {
        match self.send_and_wait(Request::delete(path, api_version)).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!(error = %e, "resource not found, treating the deletion as a success");
                Ok(())
            }
            r => r,
        }
    }

    /// Deletes a hosted service.
    pub async fn delete_hosted_service(&self, service_name: &str) -> Result<()> {
        self.delete_and_wait(
            format!("services/hostedservices/{service_name}"),
            HOSTED_SERVICES_API_VERSION,
        )
        .await
    }

    /// Deletes a deployment from a hosted service.
    pub async fn delete_deployment(&self, service_name: &str, deployment_name: &str) -> Result<()> {
        self.delete_and_wait(
            format!("services/hostedservices/{service_name}/deployments/{deployment_name}"),
            DEPLOYMENTS_API_VERSION,
        )
        .await
    }

    /// Returns the current status of an asynchronous operation.
    ///
    /// Unlike the polling loops, this reports any non-2xx response as an
    /// error.
    pub async fn get_operation(&self, operation_id: &str) -> Result<OperationStatus> {
        let request = Request::get(
            format!("{OPERATIONS_PATH}/{operation_id}"),
            OPERATIONS_API_VERSION,
        );
        let response = self.transport.exchange(request).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }
        OperationStatus::from_xml(response.body())
    }

    /// Deletes a disk, and optionally the blob backing it.
    ///
    /// Retries the deletion while the service reports the disk as still in use
    /// by a deleted virtual machine, using the client's
    /// [disk deletion options][ClientBuilder::with_disk_deletion_options].
    pub async fn delete_disk(&self, request: DeleteDiskRequest) -> Result<()> {
        let options = self.disk_deletion;
        self.delete_disk_with_options(request, options).await
    }

    /// Deletes a disk, like [delete_disk][ManagementClient::delete_disk], with
    /// explicit polling options.
    pub async fn delete_disk_with_options(
        &self,
        request: DeleteDiskRequest,
        options: PollingOptions,
    ) -> Result<()> {
        let mut poller = DiskDeletionPoller::new(self.clone(), request.disk_name, request.delete_blob);
        lro::perform_polling(&mut poller, options.interval(), options.timeout()).await
    }
}

impl DiskDeleter for ManagementClient {
    async fn delete_disk_attempt(&self, disk_name: &str, delete_blob: bool) -> Result<()> {
        self.delete_and_wait(disk_path(disk_name, delete_blob), DISKS_API_VERSION)
            .await
    }
}
