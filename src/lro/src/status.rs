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

use gax::Result;
use gax::error::{Error, ServiceError};

/// The state of an asynchronous operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationState {
    /// The operation is still running.
    InProgress,
    /// The operation completed successfully.
    Succeeded,
    /// The operation failed. The error code and message may be empty.
    Failed,
    /// The service did not report a state.
    #[default]
    Empty,
    /// A state not known to this library. Treated as terminal.
    Other(String),
}

impl OperationState {
    /// Returns true if the operation will not change state again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress | Self::Empty)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => "InProgress",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Empty => "",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for OperationState {
    fn from(value: &str) -> Self {
        match value {
            "" => Self::Empty,
            "InProgress" => Self::InProgress,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decoded `<Operation>` document returned by `GET operations/{id}`.
///
/// ```xml
/// <Operation xmlns="http://schemas.microsoft.com/windowsazure">
///   <ID>request-id</ID>
///   <Status>Failed</Status>
///   <HttpStatusCode>400</HttpStatusCode>
///   <Error>
///     <Code>BadRequest</Code>
///     <Message>The specified deployment slot is occupied.</Message>
///   </Error>
/// </Operation>
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationStatus {
    id: String,
    status: OperationState,
    http_status_code: Option<u16>,
    error_code: String,
    error_message: String,
}

#[derive(serde::Deserialize)]
struct OperationDocument {
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "Status", default)]
    status: String,
    #[serde(rename = "HttpStatusCode", default)]
    http_status_code: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<ServiceError>,
}

impl OperationStatus {
    /// Decodes an `<Operation>` document.
    ///
    /// Missing fields decode to their empty values. Malformed documents are
    /// reported as [deserialization][Error::is_deserialization] errors.
    pub fn from_xml(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload).map_err(Error::deser)?;
        let doc: OperationDocument = quick_xml::de::from_str(text).map_err(Error::deser)?;
        let http_status_code = doc
            .http_status_code
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<u16>)
            .transpose()
            .map_err(Error::deser)?;
        let error = doc.error.unwrap_or_default();
        Ok(Self {
            id: doc.id,
            status: OperationState::from(doc.status.as_str()),
            http_status_code,
            error_code: error.code().to_string(),
            error_message: error.message().to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &OperationState {
        &self.status
    }

    /// The HTTP status code of the operation, usually only set once the
    /// operation is terminal.
    pub fn http_status_code(&self) -> Option<u16> {
        self.http_status_code
    }

    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Converts a terminal status into the result of the operation.
    ///
    /// Any state other than `Succeeded` is an [operation][Error::is_operation]
    /// error carrying the operation's code and message.
    pub fn into_result(self) -> Result<()> {
        if self.status == OperationState::Succeeded {
            return Ok(());
        }
        Err(Error::operation(
            self.id,
            ServiceError::new(self.error_code, self.error_message),
            self.http_status_code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn decode_failed() -> anyhow::Result<()> {
        let payload = r#"<?xml version="1.0" encoding="utf-8"?>
<Operation xmlns="http://schemas.microsoft.com/windowsazure" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
  <ID>op-123</ID>
  <Status>Failed</Status>
  <HttpStatusCode>400</HttpStatusCode>
  <Error>
    <Code>BadRequest</Code>
    <Message>The specified deployment slot is occupied.</Message>
  </Error>
</Operation>"#;
        let got = OperationStatus::from_xml(payload.as_bytes())?;
        assert_eq!(got.id(), "op-123");
        assert_eq!(got.status(), &OperationState::Failed);
        assert_eq!(got.http_status_code(), Some(400));
        assert_eq!(got.error_code(), "BadRequest");
        assert_eq!(
            got.error_message(),
            "The specified deployment slot is occupied."
        );
        Ok(())
    }

    #[test]
    fn decode_in_progress() -> anyhow::Result<()> {
        let payload = r#"<Operation xmlns="http://schemas.microsoft.com/windowsazure"><ID>op-1</ID><Status>InProgress</Status></Operation>"#;
        let got = OperationStatus::from_xml(payload.as_bytes())?;
        assert_eq!(got.id(), "op-1");
        assert_eq!(got.status(), &OperationState::InProgress);
        assert_eq!(got.http_status_code(), None);
        assert_eq!(got.error_code(), "");
        assert_eq!(got.error_message(), "");
        Ok(())
    }

    #[test]
    fn decode_missing_status() -> anyhow::Result<()> {
        let got = OperationStatus::from_xml(b"<Operation><ID>op-2</ID></Operation>")?;
        assert_eq!(got.status(), &OperationState::Empty);
        assert!(!got.status().is_terminal());
        Ok(())
    }

    #[test_case(b""; "empty")]
    #[test_case(b"<Operation><ID>op-1</Status></Operation>"; "mismatched tags")]
    fn decode_malformed(payload: &[u8]) {
        let err = OperationStatus::from_xml(payload).unwrap_err();
        assert!(err.is_deserialization(), "{err:?}");
    }

    #[test_case("InProgress", OperationState::InProgress, false)]
    #[test_case("", OperationState::Empty, false)]
    #[test_case("Succeeded", OperationState::Succeeded, true)]
    #[test_case("Failed", OperationState::Failed, true)]
    #[test_case("Cancelled", OperationState::Other("Cancelled".into()), true)]
    fn state(input: &str, want: OperationState, terminal: bool) {
        let got = OperationState::from(input);
        assert_eq!(got, want);
        assert_eq!(got.is_terminal(), terminal);
        assert_eq!(got.as_str(), input);
        assert_eq!(got.to_string(), input);
    }

    #[test]
    fn into_result_succeeded() {
        let status = OperationStatus {
            id: "op-1".into(),
            status: OperationState::Succeeded,
            http_status_code: Some(200),
            ..Default::default()
        };
        assert!(status.into_result().is_ok());
    }

    #[test]
    fn into_result_failed() {
        let status = OperationStatus {
            id: "op-1".into(),
            status: OperationState::Failed,
            http_status_code: Some(409),
            error_code: "ConflictError".into(),
            error_message: "the resource is busy".into(),
        };
        let err = status.into_result().unwrap_err();
        assert!(err.is_operation(), "{err:?}");
        assert_eq!(err.operation_id(), Some("op-1"));
        assert_eq!(err.http_status_code(), Some(409));
        let details = err.service_error();
        assert_eq!(
            details,
            Some(&ServiceError::new("ConflictError", "the resource is busy"))
        );
    }

    #[test]
    fn into_result_failed_without_details() {
        let status = OperationStatus {
            id: "op-1".into(),
            status: OperationState::Failed,
            ..Default::default()
        };
        let err = status.into_result().unwrap_err();
        assert!(err.is_operation(), "{err:?}");
        assert!(err.service_error().is_some_and(|e| e.is_empty()), "{err:?}");
    }
}
