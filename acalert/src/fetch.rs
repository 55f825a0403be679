//! Aircraft-list retrieval from a local file or an HTTP(S) endpoint.
//!
//! The source is resolved fresh on every poll; nothing is cached.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use acalert_core::snapshot::{parse_snapshot, AircraftSnapshot};
use acalert_core::types::FetchError;

/// Where the aircraft list lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    Path(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` locations are URLs; anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::Path(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Anything the poll loop can pull a snapshot from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable location for log lines.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<AircraftSnapshot, FetchError>;
}

/// Reads the configured `DataSource` and parses it into a snapshot.
pub struct Fetcher {
    source: DataSource,
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(source: DataSource) -> Self {
        Fetcher {
            source,
            client: reqwest::Client::new(),
        }
    }

    async fn read_url(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }

    async fn read_path(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
            _ => FetchError::Io(format!("'{}': {e}", path.display())),
        })
    }
}

#[async_trait]
impl SnapshotSource for Fetcher {
    fn describe(&self) -> String {
        self.source.to_string()
    }

    async fn fetch(&self) -> Result<AircraftSnapshot, FetchError> {
        let bytes = match &self.source {
            DataSource::Url(url) => self.read_url(url).await?,
            DataSource::Path(path) => self.read_path(path).await?,
        };
        parse_snapshot(&bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
