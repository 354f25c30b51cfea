use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use shared::{Error, Result};
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub target: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub connect_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Owns the process's one document-store handle and its lifecycle:
/// `Disconnected → Connecting → Connected`, plus `Disconnecting` on
/// shutdown. Constructed once at startup and injected into every component
/// that touches data.
///
/// Concurrent `connect` callers while an attempt is in flight await the
/// state transition on a watch channel; only one caller runs the attempt.
pub struct ConnectionManager {
    target: PathBuf,
    retry: RetryPolicy,
    inner: Mutex<Option<sled::Db>>,
    state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionManager {
    pub fn new(db_url: &str) -> Self {
        Self::with_retry_policy(db_url, RetryPolicy::default())
    }

    pub fn with_retry_policy(db_url: &str, retry: RetryPolicy) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            target: PathBuf::from(db_url),
            retry,
            inner: Mutex::new(None),
            state_tx,
        }
    }

    /// Idempotent connect. No-op when already connected; waiters piggyback
    /// on an in-flight attempt; otherwise this caller attempts with bounded
    /// retries and surfaces a fatal connection error once they are
    /// exhausted.
    pub async fn connect(&self) -> Result<()> {
        let mut rx = self.state_tx.subscribe();
        loop {
            let state = *rx.borrow_and_update();
            match state {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Connecting | ConnectionState::Disconnecting => {
                    rx.changed()
                        .await
                        .map_err(|_| Error::Connection("connection manager closed".into()))?;
                }
                ConnectionState::Disconnected => {
                    let mut guard = self.inner.lock().await;
                    // Someone else may have finished a transition while we
                    // waited for the lock.
                    if *self.state_tx.borrow() != ConnectionState::Disconnected {
                        drop(guard);
                        continue;
                    }
                    self.state_tx.send_replace(ConnectionState::Connecting);

                    match self.attempt_with_retries().await {
                        Ok(db) => {
                            *guard = Some(db);
                            self.state_tx.send_replace(ConnectionState::Connected);
                            info!(target = %self.target.display(), "document store connected");
                            return Ok(());
                        }
                        Err(err) => {
                            self.state_tx.send_replace(ConnectionState::Disconnected);
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    async fn attempt_with_retries(&self) -> Result<sled::Db> {
        let mut last_error = String::new();

        for attempt in 1..=self.retry.max_attempts {
            match tokio::time::timeout(self.retry.connect_timeout, open_store(self.target.clone()))
                .await
            {
                Ok(Ok(db)) => return Ok(db),
                Ok(Err(err)) => {
                    warn!(attempt, max = self.retry.max_attempts, %err, "store connection attempt failed");
                    last_error = err.to_string();
                }
                Err(_) => {
                    warn!(attempt, max = self.retry.max_attempts, "store connection attempt timed out");
                    last_error = "connection attempt timed out".to_string();
                }
            }
            if attempt < self.retry.max_attempts {
                tokio::time::sleep(self.retry.delay).await;
            }
        }

        Err(Error::Connection(format!(
            "store unreachable after {} attempts: {last_error}",
            self.retry.max_attempts
        )))
    }

    /// The live store handle; fails when not connected.
    pub async fn handle(&self) -> Result<sled::Db> {
        self.inner
            .lock()
            .await
            .clone()
            .ok_or_else(|| Error::Connection("document store is not connected".into()))
    }

    /// Current lifecycle state and connection target, for health checks.
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            state: *self.state_tx.borrow(),
            target: self.target.display().to_string(),
        }
    }

    /// Flush and close the store for graceful shutdown.
    pub async fn disconnect(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        if let Some(db) = guard.take() {
            self.state_tx.send_replace(ConnectionState::Disconnecting);
            let flushed = tokio::task::spawn_blocking(move || db.flush()).await;
            self.state_tx.send_replace(ConnectionState::Disconnected);
            info!(target = %self.target.display(), "document store disconnected");
            match flushed {
                Ok(Ok(_)) => {}
                Ok(Err(err)) => return Err(err.into()),
                Err(err) => return Err(Error::Storage(err.to_string())),
            }
        }
        Ok(())
    }
}

/// `sled::open` blocks on file I/O; run it off the async executor so the
/// establishment timeout can fire.
async fn open_store(path: PathBuf) -> Result<sled::Db> {
    tokio::task::spawn_blocking(move || {
        sled::Config::new()
            .path(&path)
            .mode(sled::Mode::HighThroughput)
            .flush_every_ms(Some(1000))
            .open()
    })
    .await
    .map_err(|err| Error::Connection(err.to_string()))?
    .map_err(|err| Error::Connection(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(10),
            connect_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let manager =
            ConnectionManager::with_retry_policy(dir.path().join("db").to_str().unwrap(), fast_retry());

        manager.connect().await.unwrap();
        manager.connect().await.unwrap();

        assert_eq!(manager.status().state, ConnectionState::Connected);
        assert!(manager.handle().await.is_ok());
    }

    #[tokio::test]
    async fn test_handle_fails_before_connect() {
        let dir = TempDir::new().unwrap();
        let manager =
            ConnectionManager::with_retry_policy(dir.path().join("db").to_str().unwrap(), fast_retry());

        assert_eq!(manager.status().state, ConnectionState::Disconnected);
        assert!(matches!(
            manager.handle().await,
            Err(Error::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_connection_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where a directory is needed makes every open fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let target = blocker.join("db");

        let manager =
            ConnectionManager::with_retry_policy(target.to_str().unwrap(), fast_retry());

        assert!(matches!(
            manager.connect().await,
            Err(Error::Connection(_))
        ));
        assert_eq!(manager.status().state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_attempt() {
        let dir = TempDir::new().unwrap();
        let manager = Arc::new(ConnectionManager::with_retry_policy(
            dir.path().join("db").to_str().unwrap(),
            fast_retry(),
        ));

        let a = tokio::spawn({
            let manager = manager.clone();
            async move { manager.connect().await }
        });
        let b = tokio::spawn({
            let manager = manager.clone();
            async move { manager.connect().await }
        });

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
        assert_eq!(manager.status().state, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_disconnect_releases_handle() {
        let dir = TempDir::new().unwrap();
        let manager =
            ConnectionManager::with_retry_policy(dir.path().join("db").to_str().unwrap(), fast_retry());

        manager.connect().await.unwrap();
        manager.disconnect().await.unwrap();

        assert_eq!(manager.status().state, ConnectionState::Disconnected);
        assert!(manager.handle().await.is_err());
    }

    #[tokio::test]
    async fn test_status_reports_target() {
        let manager = ConnectionManager::new("/var/lib/bazaar/db");
        assert_eq!(manager.status().target, "/var/lib/bazaar/db");
    }
}
