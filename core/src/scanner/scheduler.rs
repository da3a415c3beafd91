//! Bounded-width worker pool.
//!
//! At most `width` confirmation policies run at once. Each settled endpoint is
//! forwarded to the results channel as soon as it completes, so the consumer
//! sees results in completion order and memory stays proportional to `width`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use tagscan_common::network::endpoint::Endpoint;
use tagscan_common::scanning::{FailureReason, ProbeOutcome, Prober, ScanResult};

use super::policy::ValidationPolicy;

/// What the scheduler did with its queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    /// Endpoints whose policy was started.
    pub dispatched: usize,
    /// Endpoints never started because the run was cancelled.
    pub skipped: usize,
}

/// Runs `policy` for every endpoint with at most `width` in flight.
///
/// Every dispatched endpoint yields exactly one [`ScanResult`] on `results`.
/// Once `stop` is cancelled no new endpoint is started; in-flight ones finish
/// or hit their timeout. If the consumer goes away the scheduler stops itself
/// without cancelling the caller's token.
pub async fn schedule(
    endpoints: Vec<Endpoint>,
    width: usize,
    policy: ValidationPolicy,
    prober: Arc<dyn Prober>,
    timeout: Duration,
    stop: CancellationToken,
    results: mpsc::Sender<ScanResult>,
) -> ScheduleSummary {
    let width = width.max(1);
    let stop = stop.child_token();
    let mut summary = ScheduleSummary::default();
    let mut queue = endpoints.into_iter();
    let mut workers: JoinSet<ScanResult> = JoinSet::new();
    let mut in_flight: HashMap<Id, Endpoint> = HashMap::with_capacity(width);

    loop {
        while workers.len() < width && !stop.is_cancelled() {
            let Some(endpoint) = queue.next() else {
                break;
            };

            let prober = Arc::clone(&prober);
            let target = endpoint.clone();
            let handle = workers.spawn(async move {
                policy.run(prober.as_ref(), &target, timeout).await
            });
            in_flight.insert(handle.id(), endpoint);
            summary.dispatched += 1;
        }

        let Some(joined) = workers.join_next_with_id().await else {
            break;
        };

        let result = match joined {
            Ok((id, result)) => {
                in_flight.remove(&id);
                result
            }
            Err(e) => {
                let Some(endpoint) = in_flight.remove(&e.id()) else {
                    error!("worker failed for an unknown endpoint: {e}");
                    continue;
                };
                error!(%endpoint, "worker failed: {e}");
                ScanResult {
                    endpoint,
                    outcome: ProbeOutcome::failure(FailureReason::Other),
                    attempts_made: 0,
                }
            }
        };

        if results.send(result).await.is_err() {
            debug!("result consumer went away, stopping scheduler");
            stop.cancel();
        }
    }

    summary.skipped = queue.count();
    if summary.skipped > 0 {
        debug!(skipped = summary.skipped, "scan interrupted before queue was drained");
    }
    summary
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
