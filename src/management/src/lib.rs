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

//! Cloud Management client library for Rust.
//!
//! The [ManagementClient] sends requests to the management API and waits for
//! any asynchronous operations they start. Requests that return
//! `202 Accepted` are polled until the operation completes, so each method
//! returns only once the change is applied.
//!
//! # Example
//! ```no_run
//! # use cloud_mgmt::ManagementClient;
//! # use cloud_mgmt::model::DeleteDiskRequest;
//! # tokio_test::block_on(async {
//! let client = ManagementClient::builder()
//!     .with_subscription_id("my-subscription")
//!     .build()?;
//! client.delete_hosted_service("my-service").await?;
//! client
//!     .delete_disk(DeleteDiskRequest::new("my-disk").set_delete_blob(true))
//!     .await?;
//! # anyhow::Result::<()>::Ok(()) });
//! ```

pub use gax::Result;
pub use gax::error::Error;

pub mod builder;
pub mod client;
pub mod model;

pub use client::ManagementClient;
