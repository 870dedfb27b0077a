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

use super::Error;

/// The error details returned by the management service.
///
/// Failed requests carry an XML body of the form:
///
/// ```xml
/// <Error xmlns="http://schemas.microsoft.com/windowsazure">
///   <Code>ResourceNotFound</Code>
///   <Message>The hosted service does not exist.</Message>
/// </Error>
/// ```
///
/// Failed asynchronous operations report the same two fields inside their
/// `<Operation>` document.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[non_exhaustive]
pub struct ServiceError {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

impl ServiceError {
    /// Creates a new instance.
    ///
    /// # Example
    /// ```
    /// # use cloud_mgmt_gax::error::ServiceError;
    /// let e = ServiceError::new("BadRequest", "the request is invalid");
    /// assert_eq!(e.code(), "BadRequest");
    /// ```
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The service-defined error code, e.g. `ResourceNotFound`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// A human-readable description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if neither the code nor the message are set.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.message.is_empty()
    }

    /// Decodes an `<Error>` document.
    pub fn from_xml(payload: &[u8]) -> crate::Result<Self> {
        let text = std::str::from_utf8(payload).map_err(Error::deser)?;
        quick_xml::de::from_str(text).map_err(Error::deser)
    }
}

impl TryFrom<&bytes::Bytes> for ServiceError {
    type Error = Error;

    fn try_from(value: &bytes::Bytes) -> Result<Self, Self::Error> {
        Self::from_xml(value.as_ref())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.message)
    }
}
