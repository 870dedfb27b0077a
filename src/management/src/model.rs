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

//! Request types for the [ManagementClient][crate::ManagementClient].

pub use lro::{OperationState, OperationStatus};

/// The request for [ManagementClient::delete_disk][crate::ManagementClient::delete_disk].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct DeleteDiskRequest {
    /// The name of the disk.
    pub disk_name: String,
    /// If true, also delete the blob backing the disk.
    pub delete_blob: bool,
}

impl DeleteDiskRequest {
    pub fn new<T: Into<String>>(disk_name: T) -> Self {
        Self {
            disk_name: disk_name.into(),
            delete_blob: false,
        }
    }

    /// Sets the value of [delete_blob][DeleteDiskRequest::delete_blob].
    pub fn set_delete_blob(mut self, v: bool) -> Self {
        self.delete_blob = v;
        self
    }
}

pub(crate) fn disk_path(disk_name: &str, delete_blob: bool) -> String {
    if delete_blob {
        format!("services/disks/{disk_name}?comp=media")
    } else {
        format!("services/disks/{disk_name}")
    }
}
