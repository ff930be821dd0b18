/// Local player profile: display name and personal best.
///
/// Stored as a small JSON document.  A missing or unreadable profile is
/// never fatal; the game simply starts from an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub player_name: String,
    pub personal_best: u32,
}

/// Result of comparing a finished game against the stored best.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersonalBest {
    /// The final score beat the previous best, which is reported.
    New { previous: u32 },
    /// An earlier best still stands.
    Standing(u32),
    /// No best recorded yet and the final score was zero.
    NoRecord,
}

pub struct ProfileStore {
    path: PathBuf,
    profile: Profile,
}

impl ProfileStore {
    /// Open the profile at `path`, falling back to an empty profile when the
    /// file is missing or corrupt.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let profile = match read_json::<Profile>(&path) {
            Ok(Some(profile)) => profile,
            Ok(None) => Profile::default(),
            Err(e) => {
                log::warn!("starting with an empty profile: {e}");
                Profile::default()
            }
        };
        Self { path, profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn player_name(&self) -> &str {
        &self.profile.player_name
    }

    pub fn personal_best(&self) -> u32 {
        self.profile.personal_best
    }

    /// Remember a new display name.  Blank names are ignored.
    pub fn set_player_name(&mut self, name: &str) -> Result<(), StorageError> {
        let name = name.trim();
        if name.is_empty() || name == self.profile.player_name {
            return Ok(());
        }
        self.profile.player_name = name.to_string();
        self.save()
    }

    /// Compare a finished game's score with the stored best, persisting it
    /// if it is a new record.
    pub fn record_final_score(&mut self, score: u32) -> Result<PersonalBest, StorageError> {
        let previous = self.profile.personal_best;
        if score > previous {
            self.profile.personal_best = score;
            self.save()?;
            Ok(PersonalBest::New { previous })
        } else if previous > 0 {
            Ok(PersonalBest::Standing(previous))
        } else {
            Ok(PersonalBest::NoRecord)
        }
    }

    fn save(&self) -> Result<(), StorageError> {
        write_json(&self.path, &self.profile)
    }
}

// ── JSON file helpers ─────────────────────────────────────────────────────────

/// Read a JSON file; `Ok(None)` when it does not exist.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, StorageError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StorageError> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let text = serde_json::to_string_pretty(value).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(io_err)
}

/// Per-user directory holding the profile, leaderboard and log file
/// (`$HOME/.arena_shooter`, or `./.arena_shooter` without a home).
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".arena_shooter")
}
