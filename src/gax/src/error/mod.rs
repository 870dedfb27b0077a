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

//! Errors returned by the management clients.
//!
//! The client libraries distinguish between errors detected while trying to
//! send a request (e.g. cannot open a connection), errors returned by the
//! service itself (a non-2xx response, usually with an `<Error>` body), and
//! asynchronous operations that reached a failed terminal state.
//!
//! # Examples
//!
//! ```
//! use cloud_mgmt_gax::error::Error;
//! fn handle_error(e: Error) {
//!     if let Some(details) = e.service_error() {
//!         println!("service error {} - {}", details.code(), details.message());
//!     }
//!     if e.is_not_found() {
//!         println!("the resource does not exist");
//!     }
//! }
//! ```

mod core_error;
mod service_error;
pub use core_error::*;
pub use service_error::*;
