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

use super::{Poller, PollingResult};
use gax::Result;
use std::future::Future;

/// Deletes disks on behalf of a [DiskDeletionPoller].
///
/// The management client implements this trait. Tests can provide their own
/// implementation.
pub trait DiskDeleter: Send + Sync {
    /// Makes one attempt to delete `disk_name`, waiting for the operation to
    /// complete.
    ///
    /// Implementations should report a disk that does not exist as a success.
    fn delete_disk_attempt(
        &self,
        disk_name: &str,
        delete_blob: bool,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Deletes a disk, retrying while the service reports it as in use.
///
/// Deleting a disk shortly after deleting the virtual machine that used it
/// fails, for a while, with a `BadRequest` error claiming the disk is still in
/// use by the (deleted) virtual machine. This poller re-issues the deletion
/// until it succeeds or fails with any other error.
#[derive(Clone, Debug)]
pub struct DiskDeletionPoller<D> {
    deleter: D,
    disk_name: String,
    delete_blob: bool,
    in_use: InUseMatcher,
}

impl<D> DiskDeletionPoller<D>
where
    D: DiskDeleter,
{
    pub fn new<T: Into<String>>(deleter: D, disk_name: T, delete_blob: bool) -> Self {
        let disk_name = disk_name.into();
        let in_use = InUseMatcher::new(&disk_name);
        Self {
            deleter,
            disk_name,
            delete_blob,
            in_use,
        }
    }

    pub fn disk_name(&self) -> &str {
        &self.disk_name
    }

    pub fn delete_blob(&self) -> bool {
        self.delete_blob
    }
}

impl<D> Poller for DiskDeletionPoller<D>
where
    D: DiskDeleter,
{
    type Output = ();

    async fn probe(&mut self) -> Result<()> {
        self.deleter
            .delete_disk_attempt(&self.disk_name, self.delete_blob)
            .await
    }

    fn is_done(&self, result: Result<()>) -> PollingResult<()> {
        match result {
            Ok(()) => PollingResult::Completed(Ok(())),
            Err(e) if self.in_use.is_match(&e.to_string()) => {
                tracing::debug!(disk = %self.disk_name, "disk is still in use, retrying deletion");
                PollingResult::PollingError(e)
            }
            Err(e) => PollingResult::Completed(Err(e)),
        }
    }
}

/// Returns true if `message` reports `disk_name` as in use by a virtual
/// machine.
///
/// # Example
/// ```
/// # use cloud_mgmt_lro::is_in_use_error;
/// let msg = "BadRequest - A disk with name d1 is currently in use by virtual machine vm1";
/// assert!(is_in_use_error(msg, "d1"));
/// assert!(!is_in_use_error(msg, "d2"));
/// ```
pub fn is_in_use_error(message: &str, disk_name: &str) -> bool {
    InUseMatcher::new(disk_name).is_match(message)
}

// Matches the in-use error for one disk. If the pattern cannot be compiled,
// e.g. the name exceeds the regex size limit, falls back to the literal
// prefix, which the pattern matches anyway.
#[derive(Clone, Debug)]
struct InUseMatcher {
    regex: Option<regex::Regex>,
    literal: String,
}

impl InUseMatcher {
    fn new(disk_name: &str) -> Self {
        let pattern = format!(
            "BadRequest - A disk with name {} is currently in use by virtual machine.*",
            regex::escape(disk_name)
        );
        let regex = regex::Regex::new(&pattern)
            .inspect_err(|e| {
                tracing::warn!(
                    disk = disk_name,
                    error = %e,
                    "cannot compile the disk in-use pattern, using a literal match"
                );
            })
            .ok();
        Self {
            regex,
            literal: in_use_literal(disk_name),
        }
    }

    fn is_match(&self, message: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(message),
            None => message.contains(&self.literal),
        }
    }
}

fn in_use_literal(disk_name: &str) -> String {
    format!("BadRequest - A disk with name {disk_name} is currently in use by virtual machine")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perform_polling;
    use gax::error::{Error, ServiceError};
    use std::error::Error as _;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use test_case::test_case;

    const DISK: &str = "gwacldiske5w7lkj";

    fn in_use(disk_name: &str) -> Error {
        let details = ServiceError::new(
            "BadRequest",
            format!(
                "A disk with name {disk_name} is currently in use by virtual machine gwaclrolemvo1yab running within hosted service gwacl-service, deployment gwacl-deployment."
            ),
        );
        Error::service_with_http_metadata(details, Some(400), None)
    }

    #[test_case(&format!("BadRequest - A disk with name {DISK} is currently in use by virtual machine foo"), DISK, true; "matching disk")]
    #[test_case(&format!("the service reports an error: BadRequest - A disk with name {DISK} is currently in use by virtual machine foo (http code 400: Bad Request)"), DISK, true; "embedded")]
    #[test_case(&format!("BadRequest - A disk with name {DISK} is currently in use by virtual machine foo"), "another-disk", false; "different disk")]
    #[test_case("BadRequest - A disk with name a.b is currently in use by virtual machine foo", "a.b", true; "escaped name")]
    #[test_case("BadRequest - A disk with name aXb is currently in use by virtual machine foo", "a.b", false; "escaped metacharacter")]
    #[test_case("some unrelated error", DISK, false; "unrelated")]
    #[test_case(&format!("ResourceNotFound - The disk with the specified name {DISK} does not exist."), DISK, false; "not found")]
    #[test_case(&format!("badrequest - a disk with name {DISK} is currently in use by virtual machine foo"), DISK, false; "case sensitive")]
    fn in_use_regex(message: &str, disk_name: &str, want: bool) {
        assert_eq!(is_in_use_error(message, disk_name), want, "{message}");
    }

    #[test]
    fn in_use_error_display_matches() {
        assert!(is_in_use_error(&in_use(DISK).to_string(), DISK));
        assert!(!is_in_use_error(&in_use("other").to_string(), DISK));
    }

    #[test]
    fn poller_compiles_pattern() {
        let poller = test_poller();
        assert!(poller.in_use.regex.is_some(), "{poller:?}");
        let message = in_use(DISK).to_string();
        assert!(poller.in_use.is_match(&message), "{message}");
    }

    #[test_case(&format!("BadRequest - A disk with name {DISK} is currently in use by virtual machine foo"), DISK, true; "matching disk")]
    #[test_case(&format!("BadRequest - A disk with name {DISK} is currently in use by virtual machine foo"), "another-disk", false; "different disk")]
    #[test_case("BadRequest - A disk with name aXb is currently in use by virtual machine foo", "a.b", false; "no metacharacters")]
    #[test_case("some unrelated error", DISK, false; "unrelated")]
    fn literal_fallback(message: &str, disk_name: &str, want: bool) {
        let matcher = InUseMatcher {
            regex: None,
            literal: in_use_literal(disk_name),
        };
        assert_eq!(matcher.is_match(message), want, "{message}");
    }

    #[test]
    fn literal_fallback_still_retries() {
        let poller = DiskDeletionPoller {
            in_use: InUseMatcher {
                regex: None,
                literal: in_use_literal(DISK),
            },
            ..test_poller()
        };
        let got = poller.is_done(Err(in_use(DISK)));
        assert!(matches!(got, PollingResult::PollingError(_)), "{got:?}");
        let got = poller.is_done(Err(in_use("another-disk")));
        assert!(matches!(got, PollingResult::Completed(Err(_))), "{got:?}");
    }

    // Fails with a pre-recorded sequence of errors, then succeeds.
    #[derive(Clone, Debug, Default)]
    struct FakeDeleter {
        calls: Arc<AtomicU32>,
        in_use_attempts: u32,
        last_args: Arc<std::sync::Mutex<Option<(String, bool)>>>,
    }

    impl DiskDeleter for FakeDeleter {
        async fn delete_disk_attempt(&self, disk_name: &str, delete_blob: bool) -> Result<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Ok(mut guard) = self.last_args.lock() {
                *guard = Some((disk_name.to_string(), delete_blob));
            }
            if n <= self.in_use_attempts {
                return Err(in_use(disk_name));
            }
            Ok(())
        }
    }

    fn test_poller() -> DiskDeletionPoller<FakeDeleter> {
        DiskDeletionPoller::new(FakeDeleter::default(), DISK, false)
    }

    #[test]
    fn is_done_success() {
        let got = test_poller().is_done(Ok(()));
        assert!(matches!(got, PollingResult::Completed(Ok(()))), "{got:?}");
    }

    #[test]
    fn is_done_in_use() {
        let got = test_poller().is_done(Err(in_use(DISK)));
        assert!(
            matches!(&got, PollingResult::PollingError(e) if e.http_status_code() == Some(400)),
            "{got:?}"
        );
    }

    #[test]
    fn is_done_in_use_other_disk() {
        let got = test_poller().is_done(Err(in_use("another-disk")));
        assert!(
            matches!(&got, PollingResult::Completed(Err(e)) if e.http_status_code() == Some(400)),
            "{got:?}"
        );
    }

    #[test]
    fn is_done_other_error() {
        let got = test_poller().is_done(Err(Error::io("connection refused")));
        assert!(
            matches!(&got, PollingResult::Completed(Err(e)) if e.is_io()),
            "{got:?}"
        );
    }

    #[test]
    fn is_done_is_pure() {
        let poller = test_poller();
        let inputs: Vec<fn() -> Result<()>> = vec![
            || Ok(()),
            || Err(in_use(DISK)),
            || Err(in_use("another-disk")),
            || Err(Error::io("connection refused")),
        ];
        for input in inputs {
            let first = format!("{:?}", poller.is_done(input()));
            let second = format!("{:?}", poller.is_done(input()));
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn probe_forwards_arguments() -> anyhow::Result<()> {
        let deleter = FakeDeleter::default();
        let mut poller = DiskDeletionPoller::new(deleter.clone(), DISK, true);
        assert_eq!(poller.disk_name(), DISK);
        assert!(poller.delete_blob());
        poller.probe().await?;
        let args = deleter.last_args.lock().map(|g| g.clone()).ok().flatten();
        assert_eq!(args, Some((DISK.to_string(), true)));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn retries_while_in_use() -> anyhow::Result<()> {
        let deleter = FakeDeleter {
            in_use_attempts: 3,
            ..Default::default()
        };
        let mut poller = DiskDeletionPoller::new(deleter.clone(), DISK, false);
        perform_polling(
            &mut poller,
            Duration::from_secs(10),
            Duration::from_secs(30 * 60),
        )
        .await?;
        assert_eq!(deleter.calls.load(Ordering::SeqCst), 4);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_in_use_error() {
        let deleter = FakeDeleter {
            in_use_attempts: u32::MAX,
            ..Default::default()
        };
        let mut poller = DiskDeletionPoller::new(deleter, DISK, false);
        let err = perform_polling(&mut poller, Duration::from_secs(10), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
        assert_eq!(
            err.to_string(),
            "polling timed out waiting for an asynchronous operation"
        );
        let last = err
            .source()
            .and_then(|e| e.downcast_ref::<crate::PollingTimeout>())
            .and_then(|t| t.last_error());
        assert!(
            matches!(last, Some(e) if is_in_use_error(&e.to_string(), DISK)),
            "{err:?}"
        );
    }
}
