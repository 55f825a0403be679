//! Shared fixtures for in-crate tests: a throw-away HTTP peer, an in-memory
//! snapshot source, and a notifier that records what it was asked to send.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use acalert_core::matcher::Alert;
use acalert_core::snapshot::AircraftSnapshot;
use acalert_core::types::{FetchError, NotifyError};

use crate::fetch::SnapshotSource;
use crate::notify::{Delivery, Notifier};

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A localhost address with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Returns the same canned result on every fetch and counts calls.
pub struct StaticSource {
    result: Result<AircraftSnapshot, FetchError>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new(result: Result<AircraftSnapshot, FetchError>) -> Self {
        StaticSource {
            result,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for StaticSource {
    fn describe(&self) -> String {
        "static".into()
    }

    async fn fetch(&self) -> Result<AircraftSnapshot, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[async_trait]
impl<S: SnapshotSource> SnapshotSource for Arc<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn fetch(&self) -> Result<AircraftSnapshot, FetchError> {
        (**self).fetch().await
    }
}

/// Shared log of `(channel, message)` pairs, in delivery order.
pub type Deliveries = Arc<Mutex<Vec<(&'static str, String)>>>;

/// Notifier that appends each alert to a shared log and returns `outcome`.
pub struct RecordingNotifier {
    name: &'static str,
    outcome: Result<Delivery, NotifyError>,
    log: Deliveries,
}

impl RecordingNotifier {
    pub fn new(name: &'static str, log: &Deliveries) -> Self {
        Self::with_outcome(name, log, Ok(Delivery::Sent))
    }

    pub fn with_outcome(
        name: &'static str,
        log: &Deliveries,
        outcome: Result<Delivery, NotifyError>,
    ) -> Self {
        RecordingNotifier {
            name,
            outcome,
            log: Arc::clone(log),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn notify(&self, alert: &Alert) -> Result<Delivery, NotifyError> {
        self.log
            .lock()
            .unwrap()
            .push((self.name, alert.message.clone()));
        self.outcome.clone()
    }
}
