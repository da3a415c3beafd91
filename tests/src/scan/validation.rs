#![cfg(test)]
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tagscan_common::config::ScanConfig;
use tagscan_common::scanning::{FailureReason, ProbeOutcome, ProgressState};
use tagscan_core::discovery::DiscoveryService;
use tagscan_core::output::FAILED_HOSTS_FILE;
use tagscan_core::probe::HttpProber;
use tagscan_core::scanner::ValidationPolicy;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{endpoint_of, read_listing, tags_body, write_hosts};

/// Fails the first `failures` requests with a 500, then serves `models`.
async fn flaky_server(failures: u64, models: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(failures)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_body(models)))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn flaky_endpoint_is_confirmed_on_second_attempt() -> anyhow::Result<()> {
    let server = flaky_server(1, &["llama2"]).await;
    let cfg = ScanConfig::validation();
    let prober = HttpProber::new(&cfg)?;

    let policy = ValidationPolicy::RepeatedConfirmation {
        max_attempts: 3,
        check_models: false,
    };
    let result = policy
        .run(&prober, &endpoint_of(&server), Duration::from_secs(2))
        .await;

    assert_eq!(result.attempts_made, 2);
    assert_eq!(result.outcome, ProbeOutcome::success(["llama2"]));
    Ok(())
}

#[tokio::test]
async fn persistent_failure_exhausts_attempts() -> anyhow::Result<()> {
    let server = flaky_server(u64::MAX, &["never"]).await;
    let cfg = ScanConfig::validation();
    let prober = HttpProber::new(&cfg)?;

    let policy = ValidationPolicy::RepeatedConfirmation {
        max_attempts: 3,
        check_models: false,
    };
    let result = policy
        .run(&prober, &endpoint_of(&server), Duration::from_secs(2))
        .await;

    assert_eq!(result.attempts_made, 3);
    assert_eq!(
        result.outcome,
        ProbeOutcome::failure(FailureReason::BadResponse)
    );
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(3));
    Ok(())
}

#[tokio::test]
async fn validation_run_keeps_only_confirmed_endpoints() -> anyhow::Result<()> {
    let flaky = flaky_server(2, &["qwen2:7b"]).await;
    let broken = flaky_server(u64::MAX, &["never"]).await;

    let dir = tempfile::tempdir()?;
    let out = dir.path().join("valid_nodes");
    fs::create_dir_all(&out)?;
    fs::write(out.join("stale.txt"), "10.9.9.9:11434\n")?;

    let input = write_hosts(
        dir.path(),
        &[endpoint_of(&flaky).to_string(), endpoint_of(&broken).to_string()],
    );

    let mut cfg = ScanConfig::validation();
    cfg.request_timeout = Duration::from_secs(2);
    cfg.output_directory = out.clone();

    let service = DiscoveryService::new(cfg.clone(), Arc::new(HttpProber::new(&cfg)?));
    let (progress_tx, _progress_rx) = watch::channel(ProgressState::default());
    let outcome = service
        .perform_discovery(&input, CancellationToken::new(), progress_tx)
        .await?;

    assert_eq!(outcome.report.failed_count(), 1);
    assert_eq!(
        read_listing(&out.join("qwen2_7b.txt")),
        vec![endpoint_of(&flaky).to_string()]
    );
    assert!(!out.join("stale.txt").exists());
    assert!(!out.join(FAILED_HOSTS_FILE).exists());
    assert_eq!(generate_requests(&flaky).await, Vec::<String>::new());
    Ok(())
}

/// Models named in `/api/generate` requests received by `server`, in order.
async fn generate_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/api/generate")
        .filter_map(|request| {
            let body: serde_json::Value = serde_json::from_slice(&request.body).ok()?;
            Some(body["model"].as_str()?.to_string())
        })
        .collect()
}

/// Lists `listed` on `/api/tags`; generate requests succeed only for
/// `answering`, after `failures_first` server errors each.
async fn generating_server(listed: &[&str], answering: &[&str], failures_first: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_body(listed)))
        .mount(&server)
        .await;

    for model in answering {
        let request = json!({ "model": model, "prompt": "ping" });
        if failures_first > 0 {
            Mock::given(method("POST"))
                .and(path("/api/generate"))
                .and(body_partial_json(request.clone()))
                .respond_with(ResponseTemplate::new(500))
                .up_to_n_times(failures_first)
                .mount(&server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(request))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "pong" })))
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "model not found" })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn generate_check_drops_models_that_do_not_answer() -> anyhow::Result<()> {
    let server = generating_server(&["llama2", "mistral"], &["llama2"], 0).await;
    let endpoint = endpoint_of(&server);

    let dir = tempfile::tempdir()?;
    let out = dir.path().join("valid_nodes");
    let input = write_hosts(dir.path(), &[endpoint.to_string()]);

    let mut cfg = ScanConfig::validation();
    cfg.request_timeout = Duration::from_secs(2);
    cfg.output_directory = out.clone();
    cfg.generate_check = true;

    let service = DiscoveryService::new(cfg.clone(), Arc::new(HttpProber::new(&cfg)?));
    let (progress_tx, _progress_rx) = watch::channel(ProgressState::default());
    let outcome = service
        .perform_discovery(&input, CancellationToken::new(), progress_tx)
        .await?;

    assert_eq!(outcome.report.state.reachable, 1);
    assert_eq!(read_listing(&out.join("llama2.txt")), vec![endpoint.to_string()]);
    assert!(!out.join("mistral.txt").exists());
    assert_eq!(
        generate_requests(&server).await,
        vec!["llama2", "mistral", "mistral", "mistral"]
    );
    Ok(())
}

#[tokio::test]
async fn generate_check_retries_before_dropping_a_model() -> anyhow::Result<()> {
    let server = generating_server(&["phi3"], &["phi3"], 2).await;
    let prober = HttpProber::new(&ScanConfig::validation())?;

    let policy = ValidationPolicy::RepeatedConfirmation {
        max_attempts: 3,
        check_models: true,
    };
    let result = policy
        .run(&prober, &endpoint_of(&server), Duration::from_secs(2))
        .await;

    assert_eq!(result.attempts_made, 1);
    assert_eq!(result.outcome, ProbeOutcome::success(["phi3"]));
    assert_eq!(generate_requests(&server).await.len(), 3);
    Ok(())
}
