//! The watch loop: fetch, match, notify, sleep, repeat.
//!
//! Every step is awaited in sequence; a slow notifier delays the next poll.
//! Nothing carries over between cycles, so a failed fetch just means no
//! alert this time around.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use acalert_core::matcher::{find_match, Alert, AlertTarget};
use acalert_core::types::FetchError;

use crate::fetch::SnapshotSource;
use crate::notify::{DispatchReport, NotifierSet};

/// What a single cycle ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    FetchFailed(FetchError),
    NoMatch { aircraft: usize },
    Alerted { alert: Alert, report: DispatchReport },
}

impl CycleOutcome {
    /// One-line description for the end-of-cycle log.
    pub fn summary(&self) -> String {
        match self {
            CycleOutcome::FetchFailed(e) => format!("fetch failed: {e}"),
            CycleOutcome::NoMatch { aircraft } => format!("{aircraft} aircraft, no match"),
            CycleOutcome::Alerted { alert, report } => format!(
                "alerted on {}: {} sent, {} skipped, {} failed",
                alert.record.hex.trim(),
                report.sent,
                report.skipped,
                report.failed
            ),
        }
    }
}

pub struct Watcher<S> {
    source: S,
    target: AlertTarget,
    notifiers: NotifierSet,
    interval: Duration,
}

impl<S: SnapshotSource> Watcher<S> {
    pub fn new(source: S, target: AlertTarget, notifiers: NotifierSet, interval: Duration) -> Self {
        Watcher {
            source,
            target,
            notifiers,
            interval,
        }
    }

    /// One `FETCHING` step. Never fails; errors are logged and returned as outcomes.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let snapshot = match self.source.fetch().await {
            Ok(s) => s,
            Err(e) => {
                error!(source = %self.source.describe(), "{e}");
                return CycleOutcome::FetchFailed(e);
            }
        };

        let Some(record) = find_match(&snapshot, &self.target) else {
            debug!(aircraft = snapshot.len(), "target not in snapshot");
            return CycleOutcome::NoMatch {
                aircraft: snapshot.len(),
            };
        };

        let alert = Alert::new(&self.target, record);
        warn!(hex = %record.hex.trim(), flight = %record.flight.trim(), "{}", alert.message);

        let report = self.notifiers.dispatch(&alert).await;
        CycleOutcome::Alerted { alert, report }
    }

    /// Poll forever. Ctrl-C ends the current sleep and returns.
    pub async fn run(&self) {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        };
        self.run_until(shutdown).await;
        info!("Stopped.");
    }

    /// Alternate cycles and sleeps until `shutdown` resolves.
    ///
    /// Shutdown is only observed while sleeping; a cycle in progress runs to
    /// completion.
    pub async fn run_until<F: Future<Output = ()>>(&self, shutdown: F) {
        info!(
            source = %self.source.describe(),
            target = self.target.label(),
            channels = ?self.notifiers.names(),
            "Starting aircraft monitoring"
        );
        tokio::pin!(shutdown);

        loop {
            let outcome = self.run_cycle().await;
            debug!("cycle done: {}", outcome.summary());

            info!("Waiting for {} seconds...", self.interval.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => break,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
