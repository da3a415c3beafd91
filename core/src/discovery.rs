//! # Model Discovery Service
//!
//! Implements the end-to-end "scan a target list" use case.
//!
//! This service is responsible for loading the targets, probing them through a
//! [`Prober`], and persisting the categorized results.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use tagscan_common::config::ScanConfig;
use tagscan_common::error::ScanError;
use tagscan_common::scanning::{ProgressState, Prober};
use tagscan_common::{info, success};

use crate::input::{self, TargetList};
use crate::output::{OutputWriter, WriteReport};
use crate::scanner::{self, ScanReport};

/// Everything a caller needs to summarize a finished run.
#[derive(Debug)]
pub struct RunOutcome {
    pub targets: TargetList,
    pub report: ScanReport,
    pub writes: WriteReport,
}

/// Application Service for model discovery.
///
/// Orchestrates a run by:
/// 1. reading and normalizing the target file.
/// 2. preparing the output directory.
/// 3. delegating probing to [`scanner::perform_scan`].
/// 4. writing the listings.
pub struct DiscoveryService {
    config: ScanConfig,
    prober: Arc<dyn Prober>,
}

impl DiscoveryService {
    pub fn new(config: ScanConfig, prober: Arc<dyn Prober>) -> Self {
        Self { config, prober }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Runs a full scan of the targets listed in `input_path`.
    ///
    /// Fails only on setup problems: an unreadable input file or an output
    /// directory that cannot be created. Individual write failures are
    /// reported in [`RunOutcome::writes`].
    pub async fn perform_discovery(
        &self,
        input_path: &Path,
        stop: CancellationToken,
        progress: watch::Sender<ProgressState>,
    ) -> Result<RunOutcome, ScanError> {
        let targets = input::load_targets(input_path, self.config.default_port)?;
        info!(
            "{} target(s) loaded, {} duplicate(s) and {} malformed line(s) dropped",
            targets.len(),
            targets.duplicates,
            targets.malformed.len()
        );

        self.perform_discovery_on(targets, stop, progress).await
    }

    /// Same as [`perform_discovery`](Self::perform_discovery) for an already
    /// normalized target list.
    pub async fn perform_discovery_on(
        &self,
        targets: TargetList,
        stop: CancellationToken,
        progress: watch::Sender<ProgressState>,
    ) -> Result<RunOutcome, ScanError> {
        let writer = OutputWriter::new(&self.config.output_directory, self.config.mode);
        writer.prepare()?;

        let report = scanner::perform_scan(
            targets.endpoints.clone(),
            &self.config,
            Arc::clone(&self.prober),
            stop,
            progress,
        )
        .await;

        let writes = writer.write(&report.state);
        if writes.is_complete() {
            success!(
                "{} listing(s) written to {}",
                writes.written.len(),
                writer.root().display()
            );
        }

        Ok(RunOutcome {
            targets,
            report,
            writes,
        })
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
