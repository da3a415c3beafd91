#![cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use tagscan_common::config::ScanConfig;
use tagscan_common::scanning::ProgressState;
use tagscan_core::discovery::DiscoveryService;
use tagscan_core::output::FAILED_HOSTS_FILE;
use tagscan_core::probe::HttpProber;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::support::{closed_endpoint, endpoint_of, read_listing, tags_server, write_hosts};

/// Runs a census over two live servers, one closed port, a duplicate and a
/// malformed line, and checks every file the run leaves behind.
#[tokio::test]
async fn census_sorts_hosts_into_model_listings() -> anyhow::Result<()> {
    let first = tags_server(&["llama2", "mistral"]).await;
    let second = tags_server(&["llama2"]).await;
    let (a, b, dead) = (endpoint_of(&first), endpoint_of(&second), closed_endpoint());

    let dir = tempfile::tempdir()?;
    let input = write_hosts(
        dir.path(),
        &[
            format!("http://{a}/"),
            b.to_string(),
            String::new(),
            dead.to_string(),
            a.to_string(),
            "bad:port".to_string(),
        ],
    );

    let mut cfg = ScanConfig::census();
    cfg.request_timeout = Duration::from_secs(2);
    cfg.output_directory = dir.path().join("scan_results");

    let service = DiscoveryService::new(cfg.clone(), Arc::new(HttpProber::new(&cfg)?));
    let (progress_tx, progress_rx) = watch::channel(ProgressState::default());
    let outcome = service
        .perform_discovery(&input, CancellationToken::new(), progress_tx)
        .await?;

    assert_eq!(outcome.targets.len(), 3);
    assert_eq!(outcome.targets.duplicates, 1);
    assert_eq!(outcome.targets.malformed.len(), 1);
    assert_eq!(outcome.report.state.reachable, 2);
    assert!(outcome.writes.is_complete());
    assert!(progress_rx.borrow().is_done());

    let mut both = vec![a.clone(), b.clone()];
    both.sort();
    let expected: Vec<String> = both.iter().map(ToString::to_string).collect();

    let out = &cfg.output_directory;
    assert_eq!(read_listing(&out.join("llama2.txt")), expected);
    assert_eq!(read_listing(&out.join("mistral.txt")), vec![a.to_string()]);
    assert_eq!(
        read_listing(&out.join(FAILED_HOSTS_FILE)),
        vec![dead.to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn census_writes_empty_failure_listing_when_all_hosts_answer() -> anyhow::Result<()> {
    let server = tags_server(&[]).await;
    let dir = tempfile::tempdir()?;
    let input = write_hosts(dir.path(), &[endpoint_of(&server).to_string()]);

    let mut cfg = ScanConfig::census();
    cfg.output_directory = dir.path().join("scan_results");

    let service = DiscoveryService::new(cfg.clone(), Arc::new(HttpProber::new(&cfg)?));
    let (progress_tx, _progress_rx) = watch::channel(ProgressState::default());
    let outcome = service
        .perform_discovery(&input, CancellationToken::new(), progress_tx)
        .await?;

    assert_eq!(outcome.report.state.reachable, 1);
    assert_eq!(outcome.report.models_found(), 0);
    assert!(read_listing(&cfg.output_directory.join(FAILED_HOSTS_FILE)).is_empty());
    Ok(())
}
