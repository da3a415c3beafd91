use std::future::{self, Future};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::bail;
use colored::*;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::terminal::{colors, print, spinner};
use crate::tprint;
use tagscan_common::config::{ScanConfig, ScanMode};
use tagscan_common::scanning::ProgressState;
use tagscan_common::{error, success, warn};
use tagscan_core::discovery::{DiscoveryService, RunOutcome};
use tagscan_core::probe::HttpProber;

const MAX_LISTED_MODELS: usize = 15;
const MAX_LISTED_ENDPOINTS: usize = 3;

pub async fn scan(cfg: ScanConfig, input: &Path, q_level: u8) -> anyhow::Result<()> {
    cfg.validate()?;

    let prober = HttpProber::new(&cfg)?;
    let mode = cfg.mode;
    let service = DiscoveryService::new(cfg, Arc::new(prober));

    let stop = CancellationToken::new();
    listen_for_interrupt(stop.clone());

    let (progress_tx, progress_rx) = watch::channel(ProgressState::default());
    let sink = spinner::spawn_progress_sink(progress_rx, mode, q_level);

    let start_time: Instant = Instant::now();
    let outcome = service.perform_discovery(input, stop, progress_tx).await;
    let _ = sink.await;
    let outcome = outcome?;

    scan_ends(&outcome, service.config(), start_time.elapsed(), q_level);

    if !outcome.writes.is_complete() {
        bail!(
            "{} listing(s) could not be written",
            outcome.writes.failed.len()
        );
    }
    Ok(())
}

/// Cancels `stop` on Ctrl-C or SIGTERM. Both handlers are installed before
/// this returns.
fn listen_for_interrupt(stop: CancellationToken) {
    let terminate = terminate_signal();
    tokio::spawn(async move {
        tokio::select! {
            _ = ctrl_c() => {}
            _ = terminate => {}
        }
        warn!("Interrupt received, waiting for in-flight requests to settle...");
        stop.cancel();
    });
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {e}");
        future::pending::<()>().await;
    }
}

#[cfg(unix)]
fn terminate_signal() -> impl Future<Output = ()> + Send + 'static {
    use tokio::signal::unix::{SignalKind, signal};

    let stream = signal(SignalKind::terminate());
    async move {
        match stream {
            Ok(mut stream) => {
                if stream.recv().await.is_some() {
                    return;
                }
            }
            Err(e) => warn!("Cannot listen for SIGTERM: {e}"),
        }
        future::pending::<()>().await;
    }
}

#[cfg(not(unix))]
fn terminate_signal() -> impl Future<Output = ()> + Send + 'static {
    future::pending::<()>()
}

fn scan_ends(outcome: &RunOutcome, cfg: &ScanConfig, total_time: Duration, q_level: u8) {
    let report = &outcome.report;

    if report.interrupted() {
        warn!(
            "Run interrupted, {} host(s) were never probed",
            report.skipped
        );
    }
    for failure in &outcome.writes.failed {
        error!("{failure}");
    }

    if report.state.models_to_endpoints.is_empty() {
        print::header("no models found", q_level);
        if q_level == 0 {
            print::no_results();
        }
    } else if q_level == 0 {
        print::header("models", q_level);
        print_models(outcome);
    }

    print_summary(outcome, cfg, total_time, q_level);
}

fn print_models(outcome: &RunOutcome) {
    let mut models: Vec<_> = outcome.report.state.models_to_endpoints.iter().collect();
    models.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    for (idx, (model, endpoints)) in models.iter().take(MAX_LISTED_MODELS).enumerate() {
        print::tree_head(idx, model, endpoints.len());
        let mut shown: Vec<String> = endpoints
            .iter()
            .take(MAX_LISTED_ENDPOINTS)
            .map(ToString::to_string)
            .collect();
        if endpoints.len() > MAX_LISTED_ENDPOINTS {
            shown.push(format!("... {} more", endpoints.len() - MAX_LISTED_ENDPOINTS));
        }
        print::as_tree_one_level(&shown);
    }

    if models.len() > MAX_LISTED_MODELS {
        tprint!();
        print::print_status(format!(
            "{} more model(s) in the output directory",
            models.len() - MAX_LISTED_MODELS
        ));
    }
}

fn print_summary(outcome: &RunOutcome, cfg: &ScanConfig, total_time: Duration, q_level: u8) {
    let report = &outcome.report;
    let failed_label = match cfg.mode {
        ScanMode::Census => "Failed",
        ScanMode::Validation => "Rejected",
    };

    if q_level == 0 {
        print::header("summary", q_level);
        let keys = [
            "Hosts",
            "Reachable",
            "Models",
            failed_label,
            "Malformed",
            "Duplicates",
            "Output",
        ];
        print::set_key_width(keys);

        print::aligned_line("Hosts", report.total_hosts.to_string());
        print::aligned_line("Reachable", report.state.reachable.to_string());
        print::aligned_line(
            "Models",
            report.models_found().to_string().color(colors::MODEL),
        );
        print::aligned_line(
            failed_label,
            report.failed_count().to_string().color(colors::FAILURE),
        );
        print::aligned_line("Malformed", outcome.targets.malformed.len().to_string());
        print::aligned_line("Duplicates", outcome.targets.duplicates.to_string());
        print::aligned_line("Output", cfg.output_directory.display().to_string());
    }

    let models: ColoredString = format!("{} models", report.models_found()).bold().green();
    let hosts: ColoredString = format!("{} hosts", report.total_hosts).bold();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Scan Complete: {models} across {hosts} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match q_level {
        0 => {
            print::fat_separator();
            print::centerln(&output);
            print::end_of_program();
        }
        _ => {
            success!("{}", output);
        }
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
