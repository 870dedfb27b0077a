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

//! Cloud management API helpers.
//!
//! This crate contains the types and functions shared by the cloud management
//! client libraries: the error type, the HTTP exchange abstraction, the
//! exchange-level retry policy, and the client and polling options.
//!
//! The asynchronous-operation pollers live in a separate crate
//! (`cloud-mgmt-lro`), which consumes the [Transport][http_client::Transport]
//! trait defined here.

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all functions wrapping management API
/// requests.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// The core error types used by the management clients.
pub mod error;

/// Defines the request and transport abstractions used to talk to the service.
pub mod http_client;

pub mod options;
pub mod response;
pub mod retry_policy;
