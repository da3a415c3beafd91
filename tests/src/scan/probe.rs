#![cfg(test)]
use std::time::Duration;

use tagscan_common::config::ScanConfig;
use tagscan_common::scanning::{FailureReason, ProbeOutcome, Prober};
use tagscan_core::probe::{HttpProber, MAX_BODY_BYTES};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::{closed_endpoint, endpoint_of, tags_body};

async fn probe_with(template: ResponseTemplate, timeout: Duration) -> ProbeOutcome {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(template)
        .mount(&server)
        .await;

    let prober = HttpProber::new(&ScanConfig::census()).unwrap();
    prober.probe(&endpoint_of(&server), timeout).await
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let template = ResponseTemplate::new(200)
        .set_body_json(tags_body(&["llama2"]))
        .set_delay(Duration::from_secs(3));

    let outcome = probe_with(template, Duration::from_millis(300)).await;
    assert_eq!(outcome, ProbeOutcome::failure(FailureReason::Timeout));
}

#[tokio::test]
async fn non_json_body_is_bad_response() {
    let template = ResponseTemplate::new(200).set_body_string("<html>It works!</html>");

    let outcome = probe_with(template, Duration::from_secs(2)).await;
    assert_eq!(outcome, ProbeOutcome::failure(FailureReason::BadResponse));
}

#[tokio::test]
async fn oversized_body_is_bad_response() {
    // Valid JSON padded with whitespace well past the body cap.
    let body = format!(
        "{}{}",
        tags_body(&["llama2"]),
        " ".repeat(2 * MAX_BODY_BYTES)
    );
    let template = ResponseTemplate::new(200).set_body_string(body);

    let outcome = probe_with(template, Duration::from_secs(5)).await;
    assert_eq!(outcome, ProbeOutcome::failure(FailureReason::BadResponse));
}

#[tokio::test]
async fn body_under_the_cap_is_accepted() {
    let body = format!("{}{}", tags_body(&["llama2"]), " ".repeat(MAX_BODY_BYTES / 2));
    let template = ResponseTemplate::new(200).set_body_string(body);

    let outcome = probe_with(template, Duration::from_secs(5)).await;
    assert_eq!(outcome, ProbeOutcome::success(["llama2"]));
}

#[tokio::test]
async fn missing_models_field_is_bad_response() {
    let template = ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "ok" }));

    let outcome = probe_with(template, Duration::from_secs(2)).await;
    assert_eq!(outcome, ProbeOutcome::failure(FailureReason::BadResponse));
}

#[tokio::test]
async fn not_found_is_bad_response() {
    let outcome = probe_with(ResponseTemplate::new(404), Duration::from_secs(2)).await;
    assert_eq!(outcome, ProbeOutcome::failure(FailureReason::BadResponse));
}

#[tokio::test]
async fn closed_port_is_connection_refused() {
    let prober = HttpProber::new(&ScanConfig::census()).unwrap();
    let outcome = prober
        .probe(&closed_endpoint(), Duration::from_secs(2))
        .await;
    assert_eq!(
        outcome,
        ProbeOutcome::failure(FailureReason::ConnectionRefused)
    );
}

#[tokio::test]
async fn requests_carry_the_configured_user_agent() {
    let cfg = ScanConfig::census();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(header("user-agent", cfg.user_agent.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_body(&["phi3"])))
        .mount(&server)
        .await;

    let prober = HttpProber::new(&cfg).unwrap();
    let outcome = prober
        .probe(&endpoint_of(&server), Duration::from_secs(2))
        .await;
    assert_eq!(outcome, ProbeOutcome::success(["phi3"]));
}
