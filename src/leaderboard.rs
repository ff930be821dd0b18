/// Shared high-score table.
///
/// The game talks to the table through [`LeaderboardClient`], which wraps any
/// [`LeaderboardBackend`] with the behaviour the game loop relies on:
///
/// * every backend call runs on a worker thread and is raced against a
///   timeout, so a slow backend can never stall a frame;
/// * successful fetches are cached on disk and the cache is served whenever
///   the backend fails;
/// * with no cache, a failed fetch is retried a bounded number of times and
///   finally yields an empty table;
/// * submissions are fire-and-forget; failures are logged, never returned to
///   the caller.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::LeaderboardConfig;
use crate::error::{LeaderboardError, StorageError};
use crate::storage::{read_json, write_json};

/// Name recorded when a player did not give one.
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub wave: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
}

impl ScoreEntry {
    pub fn new(name: &str, score: u32, wave: u32, timestamp: u64) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() { ANONYMOUS } else { name }.to_string(),
            score,
            wave: wave.max(1),
            timestamp,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Sort descending by score and keep the best `limit` entries.  Ties keep
/// their original order.
pub fn top_scores(mut entries: Vec<ScoreEntry>, limit: usize) -> Vec<ScoreEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(limit);
    entries
}

// ── Backends ──────────────────────────────────────────────────────────────────

/// Where scores are actually stored.  Calls may block; the client keeps them
/// off the game thread.
pub trait LeaderboardBackend: Send + Sync {
    fn submit(&self, entry: &ScoreEntry) -> Result<(), LeaderboardError>;

    /// Up to `limit` entries; ordering is not required.
    fn fetch(&self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError>;
}

/// Scores kept as a JSON array in a single file.
pub struct FileLeaderboard {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLeaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<Vec<ScoreEntry>, StorageError> {
        match read_json::<Vec<ScoreEntry>>(&self.path)? {
            Some(entries) => Ok(entries),
            None => Ok(Vec::new()),
        }
    }
}

impl LeaderboardBackend for FileLeaderboard {
    fn submit(&self, entry: &ScoreEntry) -> Result<(), LeaderboardError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| LeaderboardError::Backend("leaderboard lock poisoned".to_string()))?;
        let mut entries = self.read_all()?;
        entries.push(entry.clone());
        write_json(&self.path, &entries)?;
        Ok(())
    }

    fn fetch(&self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        Ok(top_scores(self.read_all()?, limit))
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LeaderboardClient {
    backend: Arc<dyn LeaderboardBackend>,
    cache_path: Option<PathBuf>,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl LeaderboardClient {
    pub fn new(backend: Arc<dyn LeaderboardBackend>, config: &LeaderboardConfig) -> Self {
        Self {
            backend,
            cache_path: None,
            timeout: Duration::from_secs_f32(config.timeout_secs.max(0.0)),
            max_retries: config.max_retries,
            retry_delay: Duration::from_secs_f32(config.retry_delay_secs.max(0.0)),
        }
    }

    /// Keep the last successful fetch in `path` and serve it on failure.
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Best `limit` scores, highest first.
    ///
    /// Never fails: falls back to the cache, then retries, then returns an
    /// empty list.  Blocks the calling thread, so the game loop should use
    /// [`fetch_top_async`](Self::fetch_top_async) instead.
    pub fn fetch_top(&self, limit: usize) -> Vec<ScoreEntry> {
        for attempt in 0..=self.max_retries {
            match self.fetch_once(limit) {
                Ok(scores) => {
                    self.store_cache(&scores);
                    return scores;
                }
                Err(e) => {
                    log::warn!("leaderboard fetch failed (attempt {}): {e}", attempt + 1);
                    if let Some(cached) = self.load_cache() {
                        log::info!("serving {} cached leaderboard entries", cached.len());
                        return top_scores(cached, limit);
                    }
                    if attempt < self.max_retries {
                        thread::sleep(self.retry_delay);
                    }
                }
            }
        }
        log::warn!("leaderboard unavailable; giving up");
        Vec::new()
    }

    /// [`fetch_top`](Self::fetch_top) on a worker thread.  The result arrives
    /// on the returned channel exactly once.
    pub fn fetch_top_async(&self, limit: usize) -> Receiver<Vec<ScoreEntry>> {
        let (tx, rx) = mpsc::channel();
        let client = self.clone();
        thread::spawn(move || {
            // Receiver gone → nobody is waiting any more.
            let _ = tx.send(client.fetch_top(limit));
        });
        rx
    }

    /// Send a score without waiting for the backend.
    pub fn submit_score(&self, entry: ScoreEntry) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        thread::spawn(move || match backend.submit(&entry) {
            Ok(()) => log::info!("submitted score {} for {}", entry.score, entry.name),
            Err(e) => log::warn!("failed to submit score: {e}"),
        })
    }

    /// Submit `entry`, then fetch the refreshed table on the same worker.
    pub fn submit_then_fetch(&self, entry: ScoreEntry, limit: usize) -> Receiver<Vec<ScoreEntry>> {
        let (tx, rx) = mpsc::channel();
        let client = self.clone();
        thread::spawn(move || {
            if client.submit_score(entry).join().is_err() {
                log::warn!("score submission worker panicked");
            }
            let _ = tx.send(client.fetch_top(limit));
        });
        rx
    }

    fn fetch_once(&self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        let (tx, rx) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        thread::spawn(move || {
            let _ = tx.send(backend.fetch(limit));
        });
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result.map(|scores| top_scores(scores, limit)),
            Err(RecvTimeoutError::Timeout) => Err(LeaderboardError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(LeaderboardError::Unavailable),
        }
    }

    fn load_cache(&self) -> Option<Vec<ScoreEntry>> {
        let path = self.cache_path.as_ref()?;
        match read_json(path) {
            Ok(cached) => cached,
            Err(e) => {
                log::warn!("ignoring leaderboard cache: {e}");
                None
            }
        }
    }

    fn store_cache(&self, scores: &[ScoreEntry]) {
        if let Some(path) = &self.cache_path {
            if let Err(e) = write_json(path, scores) {
                log::warn!("could not cache leaderboard: {e}");
            }
        }
    }
}
