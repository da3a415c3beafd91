//! Stub probers shared by the unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tagscan_common::network::endpoint::Endpoint;
use tagscan_common::scanning::{FailureReason, ProbeOutcome, Prober};

/// Replays a fixed sequence of outcomes, one per call, regardless of endpoint.
pub struct ScriptedProber {
    script: Mutex<VecDeque<ProbeOutcome>>,
    calls: AtomicUsize,
}

impl ScriptedProber {
    pub fn new(script: Vec<ProbeOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, _endpoint: &Endpoint, _timeout: Duration) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ProbeOutcome::failure(FailureReason::Other))
    }

    async fn check_model(&self, _endpoint: &Endpoint, _model: &str, _timeout: Duration) -> bool {
        true
    }
}

/// Answers per endpoint from a lookup table; unknown endpoints time out.
///
/// Every call sleeps for `delay` and records the peak number of calls that
/// were in flight at the same time. Model checks pass unless the model was
/// registered with [`with_silent_models`](Self::with_silent_models).
pub struct TableProber {
    table: HashMap<Endpoint, ProbeOutcome>,
    silent_models: HashSet<String>,
    model_checks: AtomicUsize,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: Mutex<Vec<Endpoint>>,
}

impl TableProber {
    pub fn new(table: HashMap<Endpoint, ProbeOutcome>) -> Self {
        Self {
            table,
            silent_models: HashSet::new(),
            model_checks: AtomicUsize::new(0),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_silent_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.silent_models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn model_checks(&self) -> usize {
        self.model_checks.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for TableProber {
    async fn probe(&self, endpoint: &Endpoint, _timeout: Duration) -> ProbeOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(endpoint.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.table
            .get(endpoint)
            .cloned()
            .unwrap_or(ProbeOutcome::failure(FailureReason::Timeout))
    }

    async fn check_model(&self, _endpoint: &Endpoint, model: &str, _timeout: Duration) -> bool {
        self.model_checks.fetch_add(1, Ordering::SeqCst);
        !self.silent_models.contains(model)
    }
}
