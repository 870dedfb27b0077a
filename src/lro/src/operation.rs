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

use super::{OperationStatus, Poller, PollingResult, perform_polling};
use gax::Result;
use gax::error::Error;
use gax::http_client::{Request, Transport};
use gax::options::PollingOptions;
use gax::response::{REQUEST_ID_HEADER, Response};
use http::StatusCode;
use std::sync::Arc;

/// The path prefix of the operation status resource.
pub const OPERATIONS_PATH: &str = "operations";

/// The API version used to query operation status.
pub const OPERATIONS_API_VERSION: &str = "2009-10-01";

/// Polls the status of an asynchronous operation.
///
/// Each probe is a `GET operations/{id}`. The poll completes once the service
/// reports a terminal state. Responses with a non-2xx status do not end the
/// poll, the status resource is polled optimistically.
#[derive(Clone, Debug)]
pub struct OperationPoller {
    transport: Arc<dyn Transport>,
    operation_id: String,
}

impl OperationPoller {
    pub fn new<T: Into<String>>(transport: Arc<dyn Transport>, operation_id: T) -> Self {
        Self {
            transport,
            operation_id: operation_id.into(),
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    fn request(&self) -> Request {
        Request::get(
            format!("{OPERATIONS_PATH}/{}", self.operation_id),
            OPERATIONS_API_VERSION,
        )
    }
}

impl Poller for OperationPoller {
    type Output = Response;

    async fn probe(&mut self) -> Result<Response> {
        self.transport.exchange(self.request()).await
    }

    fn is_done(&self, result: Result<Response>) -> PollingResult<Response> {
        let response = match result {
            Ok(r) => r,
            Err(e) => return PollingResult::Completed(Err(e)),
        };
        if !response.is_success() {
            tracing::debug!(
                operation = %self.operation_id,
                status = %response.status(),
                "ignoring unsuccessful operation status response"
            );
            return PollingResult::InProgress;
        }
        match OperationStatus::from_xml(response.body()) {
            Err(e) => PollingResult::Completed(Err(e)),
            Ok(s) if s.status().is_terminal() => PollingResult::Completed(Ok(response)),
            Ok(_) => PollingResult::InProgress,
        }
    }
}

/// Waits until the request that produced `response` completes.
///
/// * `200 OK`, `201 Created`, and `204 No Content` mean the request completed
///   synchronously.
/// * `202 Accepted` starts an asynchronous operation, identified by the
///   `x-ms-request-id` header. The function polls the operation until it
///   completes, and succeeds only if the operation succeeded. If polling is
///   disabled in `options` the function returns immediately.
/// * Any other status is returned as an error.
///
/// # Example
/// ```
/// # use gax::http_client::Transport;
/// # use gax::options::PollingOptions;
/// # use gax::response::Response;
/// # use cloud_mgmt_lro::block_until_completed;
/// # use std::sync::Arc;
/// async fn sample(transport: Arc<dyn Transport>, response: Response) -> gax::Result<()> {
///     block_until_completed(transport, response, &PollingOptions::default()).await
/// }
/// ```
pub async fn block_until_completed(
    transport: Arc<dyn Transport>,
    response: Response,
    options: &PollingOptions,
) -> Result<()> {
    match response.status() {
        StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {
            tracing::debug!(status = %response.status(), "request completed synchronously");
            Ok(())
        }
        StatusCode::ACCEPTED => {
            if options.is_disabled() {
                tracing::debug!("polling disabled, not waiting for the operation");
                return Ok(());
            }
            let id = response.request_id().ok_or_else(|| {
                Error::protocol(format!(
                    "the service accepted the request without an operation id in the `{REQUEST_ID_HEADER}` header"
                ))
            })?;
            let mut poller = OperationPoller::new(transport, id);
            let last = perform_polling(&mut poller, options.interval(), options.timeout()).await?;
            OperationStatus::from_xml(last.body())?.into_result()
        }
        _ => Err(response.into_error()),
    }
}
