//! HTTP probe client.
//!
//! Issues `GET /api/tags` against an endpoint and extracts the reported model
//! names. Every transport or decoding fault is folded into a
//! [`FailureReason`]; nothing escapes this module as an error.
//!
//! Response bodies are read chunk by chunk up to [`MAX_BODY_BYTES`]; anything
//! larger is a [`FailureReason::BadResponse`].

use std::collections::BTreeSet;
use std::error::Error as _;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tagscan_common::config::ScanConfig;
use tagscan_common::error::ScanError;
use tagscan_common::network::endpoint::Endpoint;
use tagscan_common::scanning::{FailureReason, ProbeOutcome, Prober};

/// Path that lists the models served by an endpoint.
pub const TAGS_PATH: &str = "/api/tags";

/// Path used to check that a listed model actually answers.
pub const GENERATE_PATH: &str = "/api/generate";

/// Largest tags body accepted from a host.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const CHECK_PROMPT: &str = "ping";

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// [`Prober`] backed by a shared, connection-pooling `reqwest` client.
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(cfg: &ScanConfig) -> Result<Self, ScanError> {
        let mut headers = header::HeaderMap::new();
        let user_agent = header::HeaderValue::from_str(&cfg.user_agent)
            .map_err(|e| ScanError::Client(e.to_string()))?;
        headers.insert(header::USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(cfg.request_timeout)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| ScanError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        let url = format!("{}{}", endpoint.base_url(), TAGS_PATH);

        let response = match self.client.get(&url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = classify_error(&e);
                debug!(%endpoint, %reason, error = %e, "probe request failed");
                return ProbeOutcome::failure(reason);
            }
        };

        if response.status() != StatusCode::OK {
            debug!(%endpoint, status = %response.status(), "probe returned non-200 status");
            return ProbeOutcome::failure(FailureReason::BadResponse);
        }

        let body = match read_capped(response, MAX_BODY_BYTES).await {
            Ok(body) => body,
            Err(reason) => {
                debug!(%endpoint, %reason, "reading probe body failed");
                return ProbeOutcome::failure(reason);
            }
        };

        match models_from_body(&body) {
            Ok(models) => {
                debug!(%endpoint, model_count = models.len(), "probe succeeded");
                ProbeOutcome::Success { models }
            }
            Err(reason) => {
                debug!(%endpoint, "probe body is not a model list");
                ProbeOutcome::failure(reason)
            }
        }
    }

    async fn check_model(&self, endpoint: &Endpoint, model: &str, timeout: Duration) -> bool {
        let url = format!("{}{}", endpoint.base_url(), GENERATE_PATH);
        let request = GenerateRequest {
            model,
            prompt: CHECK_PROMPT,
        };

        match self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => {
                debug!(%endpoint, model, status = %response.status(), "model check answered");
                response.status() == StatusCode::OK
            }
            Err(e) => {
                debug!(%endpoint, model, error = %e, "model check failed");
                false
            }
        }
    }
}

/// Reads the body of `response`, giving up once it grows past `limit` bytes.
async fn read_capped(mut response: Response, limit: usize) -> Result<Vec<u8>, FailureReason> {
    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(FailureReason::BadResponse);
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| classify_error(&e))? {
        if body.len() + chunk.len() > limit {
            return Err(FailureReason::BadResponse);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Decodes a tags body into a deduplicated set of model names.
///
/// Blank names are dropped; a missing `models` field or a non-JSON body is a
/// [`FailureReason::BadResponse`].
pub fn models_from_body(body: &[u8]) -> Result<BTreeSet<String>, FailureReason> {
    let tags: TagsResponse =
        serde_json::from_slice(body).map_err(|_| FailureReason::BadResponse)?;

    Ok(tags
        .models
        .into_iter()
        .map(|entry| entry.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

fn classify_error(err: &reqwest::Error) -> FailureReason {
    if err.is_timeout() {
        return FailureReason::Timeout;
    }
    if err.is_decode() || err.is_body() {
        return FailureReason::BadResponse;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            let reason = reason_for_io_kind(io_err.kind());
            if reason != FailureReason::Other {
                return reason;
            }
        }
        source = cause.source();
    }

    // Failed name lookups, TLS errors and unreachable networks.
    FailureReason::Other
}

fn reason_for_io_kind(kind: io::ErrorKind) -> FailureReason {
    match kind {
        io::ErrorKind::ConnectionRefused => FailureReason::ConnectionRefused,
        io::ErrorKind::TimedOut => FailureReason::Timeout,
        _ => FailureReason::Other,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
