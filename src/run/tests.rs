use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::check::{ContentObservation, ProbeObservation, StatusObservation};
use crate::config::ReportOptions;
use crate::error_handling::DispatchError;
use crate::initialization::init_probe_client;
use crate::sink::MetricsSink;

/// Answers every application with a canned status code, after an optional
/// per-application delay.
#[derive(Default)]
struct StubProbe {
    statuses: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl StubProbe {
    fn with_status(mut self, name: &str, status: u16) -> Self {
        self.statuses.insert(name.to_string(), status);
        self
    }

    fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }
}

impl Probe for StubProbe {
    async fn check(&self, application: &Application) -> CheckVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&application.name) {
            tokio::time::sleep(*delay).await;
        }
        let status_code = self
            .statuses
            .get(&application.name)
            .copied()
            .unwrap_or(application.expected_status_code);
        CheckVerdict::assemble(
            application,
            Ok(ProbeObservation {
                status: StatusObservation {
                    status_code,
                    ..Default::default()
                },
                content: ContentObservation::NotRequired,
            }),
            &ReportOptions::default(),
        )
    }
}

#[derive(Default)]
struct RecordingSink {
    recorded: Mutex<Vec<String>>,
    dispatched: Mutex<Vec<Vec<String>>>,
    fail_dispatch: bool,
}

impl RecordingSink {
    fn failing() -> Self {
        Self {
            fail_dispatch: true,
            ..Default::default()
        }
    }

    fn recorded(&self) -> Vec<String> {
        self.recorded.lock().expect("lock").clone()
    }

    fn dispatched(&self) -> Vec<Vec<String>> {
        self.dispatched.lock().expect("lock").clone()
    }
}

impl Sink for RecordingSink {
    fn record_failure(&self, verdict: &CheckVerdict) {
        self.recorded
            .lock()
            .expect("lock")
            .push(verdict.application.name.clone());
    }

    async fn dispatch(&self, failures: &[CheckVerdict]) -> Result<(), DispatchError> {
        self.dispatched
            .lock()
            .expect("lock")
            .push(failures.iter().map(|v| v.application.name.clone()).collect());
        if self.fail_dispatch {
            Err(DispatchError::SlackApi("channel_not_found".to_string()))
        } else {
            Ok(())
        }
    }
}

fn app(name: &str) -> Application {
    Application::new(name, format!("https://{name}.example.com"), 200)
}

#[tokio::test]
async fn test_unknown_target_fails_before_evaluation() {
    let apps = vec![app("a"), app("b")];
    let probe = StubProbe::default();
    let sink = RecordingSink::default();

    let err = run_checks(&apps, Some("missing"), &probe, &sink, 4)
        .await
        .expect_err("target is not declared");

    assert!(matches!(err, RunError::TargetNotFound(ref name) if name == "missing"));
    assert_eq!(err.to_string(), "app 'missing' not found in config file");
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    assert!(sink.dispatched().is_empty());
}

#[tokio::test]
async fn test_target_evaluates_first_match_only() {
    let apps = vec![app("a"), app("b"), app("b")];
    let probe = StubProbe::default().with_status("b", 500);
    let sink = RecordingSink::default();

    let report = run_checks(&apps, Some("b"), &probe, &sink, 4)
        .await
        .expect("run should succeed");

    assert_eq!(report.evaluated, 1);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    assert_eq!(sink.dispatched(), vec![vec!["b".to_string()]]);
}

#[tokio::test]
async fn test_empty_target_evaluates_everything() {
    let apps = vec![app("a"), app("b")];
    let probe = StubProbe::default().with_status("b", 500);
    let sink = RecordingSink::default();

    let report = run_checks(&apps, Some(""), &probe, &sink, 4)
        .await
        .expect("empty target is no filter");

    assert_eq!(report.evaluated, 2);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
    assert_eq!(sink.dispatched(), vec![vec!["b".to_string()]]);
}

#[tokio::test]
async fn test_all_passing_skips_dispatch() {
    let apps = vec![app("a"), app("b")];
    let probe = StubProbe::default();
    let sink = RecordingSink::default();

    let report = run_checks(&apps, None, &probe, &sink, 4)
        .await
        .expect("run should succeed");

    assert!(report.is_clean());
    assert_eq!(report.evaluated, 2);
    assert!(sink.recorded().is_empty());
    assert!(sink.dispatched().is_empty());
}

#[tokio::test]
async fn test_failures_keep_declaration_order() {
    // The first application finishes last.
    let apps = vec![app("slow"), app("ok"), app("fast")];
    let probe = StubProbe::default()
        .with_status("slow", 503)
        .with_status("fast", 404)
        .with_delay("slow", Duration::from_millis(100));
    let sink = RecordingSink::default();

    let report = run_checks(&apps, None, &probe, &sink, 3)
        .await
        .expect("run should succeed");

    let names: Vec<_> = report
        .failures
        .iter()
        .map(|v| v.application.name.as_str())
        .collect();
    assert_eq!(names, vec!["slow", "fast"]);
    assert_eq!(sink.recorded(), vec!["slow", "fast"]);
    assert_eq!(
        sink.dispatched(),
        vec![vec!["slow".to_string(), "fast".to_string()]]
    );
}

#[tokio::test]
async fn test_runs_are_idempotent() {
    let apps = vec![app("a"), app("b"), app("c")];
    let probe = StubProbe::default().with_status("b", 500);

    let first = run_checks(&apps, None, &probe, &RecordingSink::default(), 2)
        .await
        .expect("first run");
    let second = run_checks(&apps, None, &probe, &RecordingSink::default(), 2)
        .await
        .expect("second run");

    assert_eq!(first.failures, second.failures);
}

#[tokio::test]
async fn test_dispatch_error_is_run_error() {
    let apps = vec![app("a")];
    let probe = StubProbe::default().with_status("a", 500);
    let sink = RecordingSink::failing();

    let err = run_checks(&apps, None, &probe, &sink, 1)
        .await
        .expect_err("dispatch fails");
    assert!(matches!(err, RunError::Dispatch(DispatchError::SlackApi(_))));
}

#[tokio::test]
async fn test_zero_concurrency_still_evaluates() {
    let apps = vec![app("a"), app("b")];
    let probe = StubProbe::default();
    let report = run_checks(&apps, None, &probe, &RecordingSink::default(), 0)
        .await
        .expect("run should succeed");
    assert_eq!(report.evaluated, 2);
}

fn http_probe() -> HttpProbe {
    HttpProbe::new(
        init_probe_client("synthetic_checks_test/1.0").expect("client"),
        ReportOptions::default(),
    )
}

#[tokio::test]
async fn test_redirect_with_expected_location_passes() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;

    let mut application = Application::new("moved", format!("{}/old", server.uri()), 301);
    application.expected_location = "/new".to_string();
    let sink = RecordingSink::default();

    let report = run_checks(&[application], None, &http_probe(), &sink, 1)
        .await
        .expect("run should succeed");

    assert!(report.is_clean());
    assert!(sink.dispatched().is_empty());
}

#[tokio::test]
async fn test_unexpected_status_is_dispatched() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let application = Application::new("gone", server.uri(), 200);
    let sink = RecordingSink::default();

    let report = run_checks(&[application], None, &http_probe(), &sink, 1)
        .await
        .expect("run should succeed");

    assert_eq!(report.failures.len(), 1);
    assert!(!report.failures[0].status_ok);
    assert_eq!(report.failures[0].actual_status_code, 404);
    assert_eq!(sink.dispatched(), vec![vec!["gone".to_string()]]);
}

#[tokio::test]
async fn test_content_mismatch_after_redirect_fails() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/home"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Welcome"))
        .mount(&server)
        .await;

    let mut application = Application::new("portal", format!("{}/", server.uri()), 200);
    application.expected_content = "Login".to_string();
    let sink = RecordingSink::default();

    let report = run_checks(&[application], None, &http_probe(), &sink, 1)
        .await
        .expect("run should succeed");

    assert_eq!(report.failures.len(), 1);
    let verdict = &report.failures[0];
    assert!(verdict.status_ok);
    assert!(!verdict.content_ok);
    assert_eq!(verdict.actual_content, "Welcome");
    assert_eq!(sink.recorded(), vec!["portal"]);
}

#[tokio::test]
async fn test_metrics_sink_counts_then_flushes_once() {
    let gateway = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/metrics/job/monitoring"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&gateway)
        .await;

    let apps = vec![app("a"), app("b"), app("c")];
    let probe = StubProbe::default()
        .with_status("a", 500)
        .with_status("c", 502);
    let sink = MetricsSink::new(reqwest::Client::new(), Some(gateway.uri()), "monitoring", "dev");

    let report = run_checks(&apps, None, &probe, &sink, 2)
        .await
        .expect("run should succeed");

    assert_eq!(report.failures.len(), 2);
    assert_eq!(sink.counter().get("a"), 1);
    assert_eq!(sink.counter().get("b"), 0);
    assert_eq!(sink.counter().get("c"), 1);
}

#[tokio::test]
async fn test_metrics_flush_error_is_run_error() {
    let gateway = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&gateway)
        .await;

    let apps = vec![app("a"), app("b")];
    let probe = StubProbe::default()
        .with_status("a", 500)
        .with_status("b", 500);
    let sink = MetricsSink::new(reqwest::Client::new(), Some(gateway.uri()), "monitoring", "dev");

    let err = run_checks(&apps, None, &probe, &sink, 2)
        .await
        .expect_err("flush fails");

    assert!(matches!(
        err,
        RunError::Dispatch(DispatchError::MetricsPush { status: 503, .. })
    ));
    assert_eq!(sink.counter().get("a"), 1);
    assert_eq!(sink.counter().get("b"), 1);
}
