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

use crate::Result;
use crate::error::Error;
use crate::options::{ClientConfig, tracing_enabled};
use crate::response::Response;
use crate::retry_policy::RetryPolicy;
use bytes::Bytes;
use http::Method;

/// The header carrying the API version of each request.
pub const VERSION_HEADER: &str = "x-ms-version";

const XML_CONTENT_TYPE: &str = "application/xml";
const MAX_REDIRECTS: usize = 10;

/// A single request to the management service.
///
/// The path is relative to the subscription, e.g. `services/disks/my-disk`.
///
/// # Example
/// ```
/// # use cloud_mgmt_gax::http_client::Request;
/// let request = Request::delete("services/disks/my-disk", "2012-08-01");
/// assert_eq!(request.method(), &http::Method::DELETE);
/// assert_eq!(request.path(), "services/disks/my-disk");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    api_version: String,
    payload: Option<Bytes>,
    content_type: Option<String>,
}

impl Request {
    pub fn new<P: Into<String>, V: Into<String>>(method: Method, path: P, api_version: V) -> Self {
        Self {
            method,
            path: path.into(),
            api_version: api_version.into(),
            payload: None,
            content_type: None,
        }
    }

    pub fn get<P: Into<String>, V: Into<String>>(path: P, api_version: V) -> Self {
        Self::new(Method::GET, path, api_version)
    }

    pub fn delete<P: Into<String>, V: Into<String>>(path: P, api_version: V) -> Self {
        Self::new(Method::DELETE, path, api_version)
    }

    pub fn post<P: Into<String>, V: Into<String>>(path: P, api_version: V) -> Self {
        Self::new(Method::POST, path, api_version)
    }

    pub fn put<P: Into<String>, V: Into<String>>(path: P, api_version: V) -> Self {
        Self::new(Method::PUT, path, api_version)
    }

    /// Sets the request payload.
    ///
    /// Payloads are sent as `application/xml` unless a content type is set.
    pub fn with_payload<T: Into<Bytes>>(mut self, v: T) -> Self {
        self.payload = Some(v.into());
        self
    }

    pub fn with_content_type<T: Into<String>>(mut self, v: T) -> Self {
        self.content_type = Some(v.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Sends requests to the management service.
///
/// Implementations return any complete HTTP response, including non-2xx
/// responses, as `Ok`. Callers decide what each status means. Errors are
/// reserved for exchanges that produce no response, e.g. a refused
/// connection.
///
/// Applications can provide their own implementation, for example, to mock
/// the service in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn exchange(&self, request: Request) -> Result<Response>;
}

/// The default [Transport], based on [reqwest].
///
/// Requests are sent to `{endpoint}/{subscription_id}/{path}`. Responses with
/// a status in the retry policy's retryable set are resent after the policy's
/// delay, until the policy is exhausted.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    retry_policy: RetryPolicy,
    tracing: bool,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(Error::binding)?;
        Ok(Self {
            inner,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            subscription_id: config.subscription_id.clone(),
            retry_policy: config.retry_policy.clone(),
            tracing: tracing_enabled(config),
        })
    }

    fn url(&self, request: &Request) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.subscription_id,
            request.path().trim_start_matches('/')
        )
    }

    async fn request_attempt(&self, request: &Request, attempt: u32) -> Result<Response> {
        let url = self.url(request);
        if self.tracing {
            tracing::debug!(
                method = %request.method(),
                %url,
                api_version = request.api_version(),
                attempt,
                "sending request"
            );
        }
        let mut builder = self
            .inner
            .request(request.method().clone(), url)
            .header(VERSION_HEADER, request.api_version());
        if let Some(payload) = request.payload() {
            builder = builder
                .header(
                    reqwest::header::CONTENT_TYPE,
                    request.content_type().unwrap_or(XML_CONTENT_TYPE),
                )
                .body(payload.clone());
        }
        let response = builder.send().await.map_err(Error::io)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Error::io)?;
        if self.tracing {
            tracing::debug!(method = %request.method(), path = request.path(), %status, "received response");
        }
        Ok(Response::from_parts(status, headers, body))
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn exchange(&self, request: Request) -> Result<Response> {
        let mut session = self.retry_policy.session();
        let mut attempt = 0_u32;
        loop {
            attempt += 1;
            let response = self.request_attempt(&request, attempt).await?;
            if !session.should_retry(response.status()) {
                return Ok(response);
            }
            if self.tracing {
                tracing::warn!(
                    method = %request.method(),
                    path = request.path(),
                    status = %response.status(),
                    retries_left = session.retries_left(),
                    "retrying request after transient error"
                );
            }
            tokio::time::sleep(session.delay()).await;
        }
    }
}
