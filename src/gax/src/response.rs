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

//! Response types.
//!
//! This module contains the response type returned by a [Transport]. The
//! management API returns XML documents whose meaning depends on the status
//! code, so the response keeps the raw payload and lets the caller decide how
//! to decode it.
//!
//! [Transport]: crate::http_client::Transport

use crate::error::{Error, ServiceError};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// The header carrying the request identifier of every response.
///
/// For requests answered with `202 Accepted` this is also the id of the
/// asynchronous operation started by the request.
pub const REQUEST_ID_HEADER: &str = "x-ms-request-id";

/// The response to a single HTTP exchange.
///
/// # Example
/// ```
/// # use cloud_mgmt_gax::response::Response;
/// let response = Response::new(http::StatusCode::ACCEPTED)
///     .set_header("x-ms-request-id", "op-123");
/// assert_eq!(response.request_id(), Some("op-123"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates a response with the given status, no headers, and no body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Creates a response from its parts.
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response payload.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns true for any 2xx status code.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The value of the `x-ms-request-id` header.
    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID_HEADER).filter(|v| !v.is_empty())
    }

    /// Adds a header, ignoring invalid names or values.
    pub fn set_header<K: AsRef<str>, V: AsRef<str>>(mut self, name: K, value: V) -> Self {
        if let (Ok(k), Ok(v)) = (
            http::HeaderName::try_from(name.as_ref()),
            http::HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(k, v);
        }
        self
    }

    /// Replaces the payload.
    pub fn set_body<T: Into<Bytes>>(mut self, body: T) -> Self {
        self.body = body.into();
        self
    }

    /// Converts a non-2xx response into an error.
    ///
    /// If the body contains an `<Error>` document the result carries the
    /// decoded [ServiceError]. Otherwise the result carries the raw status,
    /// headers, and payload.
    pub fn into_error(self) -> Error {
        let status_code = self.status.as_u16();
        match ServiceError::try_from(&self.body) {
            Ok(details) if !details.is_empty() => {
                Error::service_with_http_metadata(details, Some(status_code), Some(self.headers))
            }
            _ => Error::http(status_code, self.headers, self.body),
        }
    }
}
