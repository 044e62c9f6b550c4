//! Snapshot sources and the polling subscription that feeds the dashboard.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, info, warn};

use crate::config::{SourceConfig, auth_token_from};
use crate::event::Snapshot;
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::parser::parse_snapshot;

/// Anything that can produce a full snapshot of the event log.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot>;

    /// Short human-readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Reads the event log over the realtime database REST surface.
pub struct RealtimeDbSource<C> {
    client: C,
    url: String,
}

impl<C: HttpClient> RealtimeDbSource<C> {
    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl RealtimeDbSource<Box<dyn HttpClient>> {
    /// Builds a source for `config`, adding the `auth` parameter when a token is set.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(Self::with_auth(
            BasicClient::new()?,
            config.snapshot_url(),
            config.auth_token.clone(),
        ))
    }

    /// Wraps `client` in the database `auth` parameter when `auth_token` is set.
    pub fn with_auth<C: HttpClient + 'static>(
        client: C,
        url: impl Into<String>,
        auth_token: Option<String>,
    ) -> Self {
        let client: Box<dyn HttpClient> = match auth_token {
            Some(token) => Box::new(UrlParam::database_auth(client, token)),
            None => Box::new(client),
        };
        Self::new(client, url)
    }
}

#[async_trait]
impl<C: HttpClient> SnapshotSource for RealtimeDbSource<C> {
    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let bytes = fetch_bytes(&self.client, &self.url)
            .await
            .with_context(|| format!("fetching {}", self.url))?;
        debug!(bytes = bytes.len(), "Snapshot bytes received");
        parse_snapshot(&bytes)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads a JSON export of the event log from disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        parse_snapshot(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Picks a source for a CLI argument: `http://` and `https://` URLs go to the
/// database, anything else is a file path. Without an argument the configured
/// database is used. `WASTE_DB_AUTH` applies to explicit URLs too.
pub fn source_for(arg: Option<&str>) -> Result<Arc<dyn SnapshotSource>> {
    source_from(arg, |key| std::env::var(key).ok())
}

/// [`source_for`] with an explicit environment lookup.
pub fn source_from<F>(arg: Option<&str>, lookup: F) -> Result<Arc<dyn SnapshotSource>>
where
    F: Fn(&str) -> Option<String>,
{
    match arg {
        Some(url) if is_remote(url) => Ok(Arc::new(remote_source(BasicClient::new()?, url, &lookup))),
        Some(path) => Ok(Arc::new(FileSource::new(path))),
        None => {
            let config = SourceConfig::from_lookup(lookup)?;
            Ok(Arc::new(RealtimeDbSource::from_config(&config)?))
        }
    }
}

/// A database source for an explicit URL, authenticated from `lookup` like
/// the configured one.
fn remote_source<C, F>(client: C, url: &str, lookup: &F) -> RealtimeDbSource<Box<dyn HttpClient>>
where
    C: HttpClient + 'static,
    F: Fn(&str) -> Option<String>,
{
    RealtimeDbSource::with_auth(client, url, auth_token_from(lookup))
}

fn is_remote(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://")
}

const MIN_REFRESH: Duration = Duration::from_millis(10);

/// Handle to a running subscription. Dropping it also unsubscribes.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stops polling. The callback is not invoked again.
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Polls `source` every `refresh` and hands each new snapshot to `on_snapshot`.
///
/// The first fetch happens immediately. A snapshot whose events equal the
/// previously delivered one is not delivered again. Failed fetches are logged
/// and leave the last delivered snapshot current.
///
/// Must be called from within a tokio runtime.
pub fn subscribe<S, F>(source: Arc<S>, refresh: Duration, mut on_snapshot: F) -> Subscription
where
    S: SnapshotSource + ?Sized + 'static,
    F: FnMut(Arc<Snapshot>) + Send + 'static,
{
    let refresh = refresh.max(MIN_REFRESH);
    let span = tracing::info_span!("subscription", source = %source.describe());

    let handle = tokio::spawn(
        async move {
            let mut ticker = tokio::time::interval(refresh);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<Arc<Snapshot>> = None;

            info!(refresh_ms = refresh.as_millis() as u64, "Subscription started");

            loop {
                ticker.tick().await;

                let snapshot = match source.fetch_snapshot().await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!(error = %e, "Snapshot fetch failed, keeping previous snapshot");
                        continue;
                    }
                };

                if last.as_ref().is_some_and(|prev| prev.same_contents(&snapshot)) {
                    debug!("Snapshot unchanged");
                    continue;
                }

                debug!(events = snapshot.len(), "Delivering snapshot");
                let snapshot = Arc::new(snapshot);
                last = Some(Arc::clone(&snapshot));
                on_snapshot(snapshot);
            }
        }
        .instrument(span),
    );

    Subscription { handle }
}
