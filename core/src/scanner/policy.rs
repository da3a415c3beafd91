//! Confirmation policies.
//!
//! A policy decides how many times an endpoint is probed before its outcome is
//! settled. The census scanner probes once; the validating scanner retries up
//! to `max_attempts` times and accepts the first success. The attempt loop is
//! an explicit [`Confirmation`] state machine so attempt accounting can be
//! tested without a network.
//!
//! With `check_models` set, a confirmed endpoint's models are then asked to
//! answer a generate request each, with the same attempt cap, and only the
//! ones that answer are kept.

use std::collections::BTreeSet;
use std::time::Duration;

use tagscan_common::config::{ScanConfig, ScanMode};
use tagscan_common::network::endpoint::Endpoint;
use tagscan_common::scanning::{FailureReason, ProbeOutcome, Prober, ScanResult};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// One probe; its outcome is final.
    SingleShot,
    /// Up to `max_attempts` sequential probes, stopping at the first success.
    RepeatedConfirmation { max_attempts: u32, check_models: bool },
}

impl ValidationPolicy {
    pub fn for_config(cfg: &ScanConfig) -> Self {
        match cfg.mode {
            ScanMode::Census => ValidationPolicy::SingleShot,
            ScanMode::Validation => ValidationPolicy::RepeatedConfirmation {
                max_attempts: cfg.confirmation_attempts.max(1),
                check_models: cfg.generate_check,
            },
        }
    }

    pub fn max_attempts(&self) -> u32 {
        match self {
            ValidationPolicy::SingleShot => 1,
            ValidationPolicy::RepeatedConfirmation { max_attempts, .. } => (*max_attempts).max(1),
        }
    }

    pub fn checks_models(&self) -> bool {
        matches!(
            self,
            ValidationPolicy::RepeatedConfirmation {
                check_models: true,
                ..
            }
        )
    }

    /// Probes `endpoint` until the policy settles and returns the final result.
    ///
    /// Attempts are strictly sequential. There is no deadline beyond the sum of
    /// the per-attempt timeouts.
    pub async fn run(
        &self,
        prober: &dyn Prober,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> ScanResult {
        let max_attempts = self.max_attempts();
        let mut state = Confirmation::start();

        while let Confirmation::Attempting { attempt, .. } = state {
            let outcome = prober.probe(endpoint, timeout).await;
            debug!(%endpoint, attempt, success = outcome.is_success(), "probe attempt finished");
            state = state.record(outcome, max_attempts);
        }

        let mut result = state.into_result(endpoint.clone());
        if let ProbeOutcome::Success { models } = &mut result.outcome {
            if self.checks_models() {
                let listed = std::mem::take(models);
                *models = answering_models(prober, endpoint, listed, max_attempts, timeout).await;
            }
        }
        result
    }
}

/// Keeps the models that answer a generate request within `max_attempts` tries.
pub async fn answering_models(
    prober: &dyn Prober,
    endpoint: &Endpoint,
    models: BTreeSet<String>,
    max_attempts: u32,
    timeout: Duration,
) -> BTreeSet<String> {
    let mut kept = BTreeSet::new();

    for model in models {
        let mut answered = false;
        for attempt in 1..=max_attempts.max(1) {
            if prober.check_model(endpoint, &model, timeout).await {
                answered = true;
                break;
            }
            debug!(%endpoint, %model, attempt, "model did not answer");
        }

        if answered {
            kept.insert(model);
        } else {
            debug!(%endpoint, %model, "model dropped after failed checks");
        }
    }

    kept
}

/// Per-endpoint confirmation progress.
///
/// `Pending -> Attempting(n) -> { Confirmed | Attempting(n + 1) | Exhausted }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Pending,
    Attempting {
        attempt: u32,
        last_failure: Option<FailureReason>,
    },
    Confirmed {
        models: BTreeSet<String>,
        attempts: u32,
    },
    Exhausted {
        reason: FailureReason,
        attempts: u32,
    },
}

impl Confirmation {
    /// A fresh series, ready to issue its first attempt.
    pub fn start() -> Self {
        Confirmation::Pending.advance()
    }

    fn advance(self) -> Self {
        match self {
            Confirmation::Pending => Confirmation::Attempting {
                attempt: 1,
                last_failure: None,
            },
            other => other,
        }
    }

    /// Applies the outcome of the attempt currently in flight.
    ///
    /// Recording into a terminal state leaves it unchanged.
    pub fn record(self, outcome: ProbeOutcome, max_attempts: u32) -> Self {
        let attempt = match self.advance() {
            Confirmation::Attempting { attempt, .. } => attempt,
            terminal => return terminal,
        };

        match outcome {
            ProbeOutcome::Success { models } => Confirmation::Confirmed {
                models,
                attempts: attempt,
            },
            ProbeOutcome::Failure { reason } if attempt >= max_attempts => {
                Confirmation::Exhausted {
                    reason,
                    attempts: attempt,
                }
            }
            ProbeOutcome::Failure { reason } => Confirmation::Attempting {
                attempt: attempt + 1,
                last_failure: Some(reason),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Confirmation::Confirmed { .. } | Confirmation::Exhausted { .. }
        )
    }

    /// Converts a terminal state into a [`ScanResult`].
    ///
    /// A non-terminal state yields the last observed failure, or `Other` if no
    /// attempt was made at all.
    pub fn into_result(self, endpoint: Endpoint) -> ScanResult {
        let (outcome, attempts_made) = match self {
            Confirmation::Confirmed { models, attempts } => {
                (ProbeOutcome::Success { models }, attempts)
            }
            Confirmation::Exhausted { reason, attempts } => {
                (ProbeOutcome::failure(reason), attempts)
            }
            Confirmation::Attempting {
                attempt,
                last_failure,
            } => (
                ProbeOutcome::failure(last_failure.unwrap_or(FailureReason::Other)),
                attempt.saturating_sub(1),
            ),
            Confirmation::Pending => (ProbeOutcome::failure(FailureReason::Other), 0),
        };

        ScanResult {
            endpoint,
            outcome,
            attempts_made,
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
