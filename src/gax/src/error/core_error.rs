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

use super::ServiceError;
use http::HeaderMap;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by all client libraries.
///
/// The client libraries report errors from multiple sources. For example, the
/// service may return an error, the transport may be unable to create the
/// necessary connection to make a request, an asynchronous operation may fail
/// or may not complete before the polling deadline, or the response may be
/// impossible to decode.
///
/// Most applications will just return the error or log it, without any further
/// action. However, some applications may need to interrogate the error
/// details. This type offers a series of predicates to determine the error
/// kind. The type also offers accessors to query the most common error details.
/// Applications can query the error [source][std::error::Error::source] for
/// deeper information.
///
/// # Example
/// ```
/// use cloud_mgmt_gax::error::Error;
/// match example_function() {
///     Err(e) if e.is_not_found() => { println!("already gone {e}"); },
///     Err(e) if e.is_timeout() => { println!("not enough time {e}"); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # use cloud_mgmt_gax::error::ServiceError;
///     # Err(Error::service_with_http_metadata(ServiceError::new("ResourceNotFound", "gone"), Some(404), None))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error representing a polling timeout.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_mgmt_gax::error::Error;
    /// let error = Error::timeout("simulated timeout");
    /// assert!(error.is_timeout());
    /// assert!(error.source().is_some());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            source: Some(source.into()),
        }
    }

    /// The asynchronous operation did not complete before the polling deadline.
    ///
    /// This is always a client-side generated error. The operation may still
    /// complete in the service.
    ///
    /// # Troubleshooting
    ///
    /// Some operations, notably disk deletions shortly after deleting the
    /// virtual machine that used the disk, may take a long time to settle.
    /// Consider increasing the polling timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Creates an error representing a deserialization problem.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use cloud_mgmt_gax::error::Error;
    /// let error = Error::deser("simulated problem");
    /// assert!(error.is_deserialization());
    /// assert!(error.source().is_some());
    /// ```
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            source: Some(source.into()),
        }
    }

    /// The response could not be deserialized.
    ///
    /// This is always a client-side generated error. Note that the request may
    /// or may not have completed in the service.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Creates an error representing a violation of the asynchronous operation
    /// protocol, for example, an `Accepted` response without an operation id.
    ///
    /// # Example
    /// ```
    /// use cloud_mgmt_gax::error::Error;
    /// let error = Error::protocol("missing header");
    /// assert!(error.is_protocol());
    /// ```
    pub fn protocol<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Protocol,
            source: Some(source.into()),
        }
    }

    /// The service response did not follow the asynchronous operation protocol.
    pub fn is_protocol(&self) -> bool {
        matches!(self.kind, ErrorKind::Protocol)
    }

    /// Creates an error representing a request that cannot be built.
    pub fn binding<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Binding,
            source: Some(source.into()),
        }
    }

    /// If true, the request could not be built, for example, because the
    /// endpoint or a header value is invalid.
    pub fn is_binding(&self) -> bool {
        matches!(self.kind, ErrorKind::Binding)
    }

    /// Creates a service error including transport metadata.
    ///
    /// # Example
    /// ```
    /// use cloud_mgmt_gax::error::{Error, ServiceError};
    /// let details = ServiceError::new("ResourceNotFound", "NOT FOUND");
    /// let error = Error::service_with_http_metadata(details.clone(), Some(404), None);
    /// assert_eq!(error.service_error(), Some(&details));
    /// assert!(error.is_not_found());
    /// ```
    pub fn service_with_http_metadata(
        details: ServiceError,
        status_code: Option<u16>,
        headers: Option<HeaderMap>,
    ) -> Self {
        let details = ServiceDetails {
            status_code,
            headers,
            details,
        };
        Self {
            kind: ErrorKind::Service(Box::new(details)),
            source: None,
        }
    }

    /// Creates an error for an asynchronous operation that reached a terminal
    /// state other than `Succeeded`.
    ///
    /// # Example
    /// ```
    /// use cloud_mgmt_gax::error::{Error, ServiceError};
    /// let details = ServiceError::new("InternalError", "the server encountered an internal error");
    /// let error = Error::operation("op-123", details, Some(500));
    /// assert!(error.is_operation());
    /// assert_eq!(error.http_status_code(), Some(500));
    /// ```
    pub fn operation<T: Into<String>>(
        id: T,
        details: ServiceError,
        status_code: Option<u16>,
    ) -> Self {
        let details = OperationDetails {
            id: id.into(),
            status_code,
            details,
        };
        Self {
            kind: ErrorKind::Operation(Box::new(details)),
            source: None,
        }
    }

    /// The asynchronous operation completed with an error.
    ///
    /// The service accepted the request, but the operation it started failed.
    /// Use [service_error][Error::service_error] to get the code and message
    /// reported by the operation. These may be empty, the service does not
    /// always populate them.
    pub fn is_operation(&self) -> bool {
        matches!(self.kind, ErrorKind::Operation(_))
    }

    /// The operation id, if this is an operation error.
    pub fn operation_id(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Operation(d) => Some(d.id.as_str()),
            _ => None,
        }
    }

    /// The error details reported by the service, if any.
    ///
    /// These are set for errors decoded from a non-2xx response with an
    /// `<Error>` body, and for failed asynchronous operations.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match &self.kind {
            ErrorKind::Service(d) => Some(&d.details),
            ErrorKind::Operation(d) => Some(&d.details),
            _ => None,
        }
    }

    /// The HTTP status code, if any, associated with this error.
    ///
    /// # Example
    /// ```
    /// use cloud_mgmt_gax::error::Error;
    /// let e = search_for_thing("the thing");
    /// if let Some(code) = e.http_status_code() {
    ///     if code == 404 {
    ///         println!("cannot find the thing, more details in {e}");
    ///     }
    /// }
    ///
    /// fn search_for_thing(name: &str) -> Error {
    ///     # Error::http(400, http::HeaderMap::new(), bytes::Bytes::from_static(b"NOT FOUND"))
    /// }
    /// ```
    ///
    /// For failed asynchronous operations this is the status code reported in
    /// the operation document, not the status of the polling request.
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Transport(d) => d.status_code,
            ErrorKind::Service(d) => d.status_code,
            ErrorKind::Operation(d) => d.status_code,
            _ => None,
        }
    }

    /// Returns true if the service reported the resource does not exist.
    ///
    /// Delete operations use this to treat an already deleted resource as a
    /// success. Failed asynchronous operations are never reported as not
    /// found, even if the operation document carries a 404 code.
    pub fn is_not_found(&self) -> bool {
        if self.is_operation() {
            return false;
        }
        self.http_status_code() == Some(http::StatusCode::NOT_FOUND.as_u16())
    }

    /// The headers, if any, associated with this error.
    pub fn http_headers(&self) -> Option<&http::HeaderMap> {
        match &self.kind {
            ErrorKind::Transport(d) => d.headers.as_ref(),
            ErrorKind::Service(d) => d.headers.as_ref(),
            _ => None,
        }
    }

    /// The payload, if any, associated with this error.
    ///
    /// Only set when the service returned a body that could not be decoded as
    /// an `<Error>` document.
    pub fn http_payload(&self) -> Option<&bytes::Bytes> {
        match &self.kind {
            ErrorKind::Transport(d) => d.payload.as_ref(),
            _ => None,
        }
    }

    /// A non-2xx response whose body is not a valid error document.
    pub fn http(status_code: u16, headers: HeaderMap, payload: bytes::Bytes) -> Self {
        let details = TransportDetails {
            status_code: Some(status_code),
            headers: Some(headers),
            payload: Some(payload),
        };
        let kind = ErrorKind::Transport(Box::new(details));
        Self { kind, source: None }
    }

    /// A problem in the transport layer without a full HTTP response.
    ///
    /// Examples include: a refused connection, a TLS handshake failure, or
    /// too many redirects.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        let details = TransportDetails {
            status_code: None,
            headers: None,
            payload: None,
        };
        Self {
            kind: ErrorKind::Transport(Box::new(details)),
            source: Some(source.into()),
        }
    }

    /// A problem in the transport layer without a full HTTP response.
    ///
    /// # Troubleshooting
    ///
    /// This indicates a problem completing the request. These errors are never
    /// retried by the polling loops. Verify the endpoint is reachable from
    /// your environment.
    pub fn is_io(&self) -> bool {
        matches!(
        &self.kind,
        ErrorKind::Transport(d) if matches!(**d, TransportDetails {
            status_code: None,
            headers: None,
            payload: None,
        }))
    }

    /// A problem reported by the transport layer with some response metadata.
    pub fn transport<T: Into<BoxError>>(headers: HeaderMap, source: T) -> Self {
        let details = TransportDetails {
            headers: Some(headers),
            status_code: None,
            payload: None,
        };
        Self {
            kind: ErrorKind::Transport(Box::new(details)),
            source: Some(source.into()),
        }
    }

    /// A problem in the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(&self.kind, ErrorKind::Transport { .. })
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Binding, Some(e)) => write!(f, "cannot build the request {e}"),
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the response {e}")
            }
            (ErrorKind::Protocol, Some(e)) => write!(
                f,
                "the service response violates the asynchronous operation protocol: {e}"
            ),
            (ErrorKind::Timeout, Some(e)) => write!(f, "{e}"),
            (ErrorKind::Transport(details), _) => details.display(self.source(), f),
            (ErrorKind::Service(d), _) => {
                write!(
                    f,
                    "the service reports an error: {} - {}",
                    d.details.code(),
                    d.details.message()
                )?;
                display_status_code(d.status_code, f)
            }
            (ErrorKind::Operation(d), _) if d.details.is_empty() => {
                write!(
                    f,
                    "asynchronous operation {} failed without error details",
                    d.id
                )?;
                display_status_code(d.status_code, f)
            }
            (ErrorKind::Operation(d), _) => {
                write!(
                    f,
                    "asynchronous operation {} failed: {} - {}",
                    d.id,
                    d.details.code(),
                    d.details.message()
                )?;
                display_status_code(d.status_code, f)
            }
            (_, None) => unreachable!("no constructor allows this"),
        }
    }
}

fn display_status_code(code: Option<u16>, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let Some(code) = code else {
        return Ok(());
    };
    let reason = http::StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    write!(f, " (http code {code}: {reason})")
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

/// The type of error held by an [Error] instance.
#[derive(Debug)]
enum ErrorKind {
    Binding,
    Deserialization,
    Protocol,
    Timeout,
    Transport(Box<TransportDetails>),
    Service(Box<ServiceDetails>),
    Operation(Box<OperationDetails>),
}

#[derive(Debug)]
struct TransportDetails {
    status_code: Option<u16>,
    headers: Option<HeaderMap>,
    payload: Option<bytes::Bytes>,
}

impl TransportDetails {
    fn display(
        &self,
        source: Option<&(dyn StdError + 'static)>,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match (source, &self) {
            (
                _,
                TransportDetails {
                    status_code: Some(code),
                    payload: Some(p),
                    ..
                },
            ) => {
                if let Ok(message) = std::str::from_utf8(p.as_ref()) {
                    write!(f, "the HTTP transport reports a [{code}] error: {message}")
                } else {
                    write!(f, "the HTTP transport reports a [{code}] error: {p:?}")
                }
            }
            (Some(source), _) => {
                write!(f, "the transport reports an error: {source}")
            }
            (None, _) => unreachable!("no Error constructor allows this"),
        }
    }
}

#[derive(Debug)]
struct ServiceDetails {
    status_code: Option<u16>,
    headers: Option<HeaderMap>,
    details: ServiceError,
}

#[derive(Debug)]
struct OperationDetails {
    id: String,
    status_code: Option<u16>,
    details: ServiceError,
}
