//! Fan-in of scan results.
//!
//! The [`Aggregator`] is owned by a single consumer: workers never touch it,
//! they only hand results over a channel. Failed endpoints are tracked in
//! both modes; whether they are written out is the output writer's call.

use std::collections::{BTreeMap, BTreeSet};

use tagscan_common::network::endpoint::Endpoint;
use tagscan_common::scanning::{ProbeOutcome, ProgressState, ScanResult};

/// Final, categorized view of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateState {
    pub models_to_endpoints: BTreeMap<String, BTreeSet<Endpoint>>,
    pub failed_endpoints: BTreeSet<Endpoint>,
    /// Endpoints that answered with a model list, including empty ones.
    pub reachable: usize,
}

impl AggregateState {
    pub fn models_found(&self) -> usize {
        self.models_to_endpoints.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed_endpoints.len()
    }
}

pub struct Aggregator {
    state: AggregateState,
    progress: ProgressState,
}

impl Aggregator {
    pub fn new(total: usize) -> Self {
        Self {
            state: AggregateState::default(),
            progress: ProgressState::new(total),
        }
    }

    /// Folds one result into the state. Re-adding a known endpoint is a no-op.
    pub fn consume(&mut self, result: ScanResult) {
        let ScanResult {
            endpoint, outcome, ..
        } = result;

        match outcome {
            ProbeOutcome::Success { models } => {
                self.state.reachable += 1;
                for model in models {
                    self.state
                        .models_to_endpoints
                        .entry(model)
                        .or_default()
                        .insert(endpoint.clone());
                }
            }
            ProbeOutcome::Failure { .. } => {
                self.state.failed_endpoints.insert(endpoint);
            }
        }

        self.progress.completed += 1;
        self.progress.models_found = self.state.models_found();
    }

    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    pub fn finish(self) -> AggregateState {
        self.state
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
