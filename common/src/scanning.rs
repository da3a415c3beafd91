//! Probe outcomes and the [`Prober`] seam.
//!
//! High-level code depends on the [`Prober`] trait rather than on a concrete
//! HTTP client, so the confirmation policy and the scheduler can be driven by
//! stubs in tests.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::network::endpoint::Endpoint;

/// Why a probe did not produce a model list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    Timeout,
    ConnectionRefused,
    BadResponse,
    Other,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::Timeout => "timeout",
            FailureReason::ConnectionRefused => "connection refused",
            FailureReason::BadResponse => "bad response",
            FailureReason::Other => "other",
        };
        f.write_str(s)
    }
}

/// Result of one probe, or of a whole confirmation series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The endpoint answered with a model list. An empty set is valid.
    Success { models: BTreeSet<String> },
    Failure { reason: FailureReason },
}

impl ProbeOutcome {
    pub fn success<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProbeOutcome::Success {
            models: models.into_iter().map(Into::into).collect(),
        }
    }

    pub fn failure(reason: FailureReason) -> Self {
        ProbeOutcome::Failure { reason }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}

/// The settled outcome for one endpoint in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub endpoint: Endpoint,
    pub outcome: ProbeOutcome,
    /// Number of probe calls actually issued for this endpoint.
    pub attempts_made: u32,
}

/// Live counters published while a run is in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub completed: usize,
    pub total: usize,
    /// Number of distinct models discovered so far.
    pub models_found: usize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
            models_found: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Issues one request against an endpoint and reports what came back.
///
/// Implementations must never panic or return an error for network problems:
/// every fault is folded into [`ProbeOutcome::Failure`]. No retries happen at
/// this layer.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome;

    /// Asks `endpoint` to run `model` once. `true` only if it answered OK.
    async fn check_model(&self, endpoint: &Endpoint, model: &str, timeout: Duration) -> bool;
}
