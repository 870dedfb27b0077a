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

//! These tests use an HTTP server to verify the reqwest-based transport sends
//! the expected requests and returns non-2xx responses without error. They
//! also check that it resends requests answered with a retryable status.

#[cfg(test)]
mod tests {
    use cloud_mgmt_gax::http_client::{ReqwestTransport, Request, Transport};
    use cloud_mgmt_gax::options::ClientConfig;
    use cloud_mgmt_gax::retry_policy::RetryPolicy;
    use http::StatusCode;
    use httptest::cycle;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use scoped_env::ScopedEnv;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    type Result<T> = anyhow::Result<T>;

    const SUBSCRIPTION: &str = "sub-123";

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn exchange_success() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/sub-123/operations/op-1"),
                request::headers(contains(("x-ms-version", "2009-10-01"))),
            ])
            .respond_with(
                status_code(200)
                    .insert_header("x-ms-request-id", "req-1")
                    .body("<Operation/>"),
            ),
        );

        let transport = ReqwestTransport::new(&test_config(&server, RetryPolicy::none()))?;
        let response = transport
            .exchange(Request::get("operations/op-1", "2009-10-01"))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.request_id(), Some("req-1"));
        assert_eq!(response.body().as_ref(), b"<Operation/>");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn exchange_payload() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/sub-123/services/hostedservices"),
                request::headers(contains(("content-type", "application/xml"))),
                request::body("<CreateHostedService/>"),
            ])
            .respond_with(status_code(201)),
        );

        let transport = ReqwestTransport::new(&test_config(&server, RetryPolicy::none()))?;
        let request = Request::post("services/hostedservices", "2010-10-28")
            .with_payload("<CreateHostedService/>");
        let response = transport.exchange(request).await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn exchange_error_status_is_not_an_error() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("DELETE", "/sub-123/services/disks/d1"))
                .times(1)
                .respond_with(status_code(400).body(
                    "<Error><Code>BadRequest</Code><Message>uh-oh</Message></Error>",
                )),
        );

        let transport = ReqwestTransport::new(&test_config(&server, test_retry()))?;
        let response = transport
            .exchange(Request::delete("services/disks/d1", "2012-08-01"))
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = response.into_error();
        assert_eq!(error.service_error().map(|e| e.code()), Some("BadRequest"));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn exchange_retries_transient() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/sub-123/operations/op-1"))
                .times(3)
                .respond_with(cycle![
                    status_code(503).body("try-again"),
                    status_code(409).body("try-again"),
                    status_code(200).body("<Operation/>"),
                ]),
        );

        let transport = ReqwestTransport::new(&test_config(&server, test_retry()))?;
        let response = transport
            .exchange(Request::get("operations/op-1", "2009-10-01"))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn exchange_retry_exhausted() -> Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/sub-123/operations/op-1"))
                .times(3)
                .respond_with(status_code(503).body("try-again")),
        );

        let retry = test_retry().with_max_retries(2);
        let transport = ReqwestTransport::new(&test_config(&server, retry))?;
        let response = transport
            .exchange(Request::get("operations/op-1", "2009-10-01"))
            .await?;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn exchange_io_error() -> Result<()> {
        let config = ClientConfig {
            // Nothing listens on port 1.
            endpoint: "http://127.0.0.1:1".to_string(),
            subscription_id: SUBSCRIPTION.to_string(),
            retry_policy: RetryPolicy::none(),
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config)?;
        let err = transport
            .exchange(Request::get("operations/op-1", "2009-10-01"))
            .await
            .unwrap_err();
        assert!(err.is_io(), "{err:?}");
        Ok(())
    }

    // Captures the warnings emitted by this crate.
    #[derive(Clone, Default)]
    struct WarnCapture {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl<S: tracing::Subscriber> Layer<S> for WarnCapture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            if *metadata.level() == tracing::Level::WARN
                && metadata.target().starts_with("cloud_mgmt_gax")
            {
                self.events.lock().unwrap().push(metadata.name().to_string());
            }
        }
    }

    async fn retry_warnings(tracing: bool) -> Result<usize> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/sub-123/operations/op-1"))
                .times(2)
                .respond_with(cycle![
                    status_code(503).body("try-again"),
                    status_code(200).body("<Operation/>"),
                ]),
        );

        let capture = WarnCapture::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));
        let config = ClientConfig {
            tracing,
            ..test_config(&server, test_retry())
        };
        let transport = ReqwestTransport::new(&config)?;
        let response = transport
            .exchange(Request::get("operations/op-1", "2009-10-01"))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let count = capture.events.lock().unwrap().len();
        Ok(count)
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn retry_warning_with_tracing() -> Result<()> {
        let _e = ScopedEnv::remove("CLOUD_MGMT_LOGGING");
        assert_eq!(retry_warnings(true).await?, 1);
        Ok(())
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn retry_warning_without_tracing() -> Result<()> {
        let _e = ScopedEnv::remove("CLOUD_MGMT_LOGGING");
        assert_eq!(retry_warnings(false).await?, 0);
        Ok(())
    }

    fn test_retry() -> RetryPolicy {
        RetryPolicy::default().with_delay(Duration::from_millis(1))
    }

    fn test_config(server: &Server, retry_policy: RetryPolicy) -> ClientConfig {
        ClientConfig {
            endpoint: format!("http://{}", server.addr()),
            subscription_id: SUBSCRIPTION.to_string(),
            retry_policy,
            ..Default::default()
        }
    }
}
