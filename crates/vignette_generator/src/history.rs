//! Stock photo usage history.
//!
//! Downloaded photo ids persist to a small JSON file so repeat runs do
//! not reuse the same imagery. The file keeps the most recent ids up to
//! a fixed capacity.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use vignette_error::{StorageError, VignetteResult};

/// Default number of photo ids retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    used_ids: Vec<u64>,
    max_history: usize,
}

/// Rolling record of stock photo ids already used by an account.
#[derive(Debug)]
pub struct StockPhotoHistory {
    path: PathBuf,
    used_ids: Vec<u64>,
    capacity: usize,
}

impl StockPhotoHistory {
    /// Load history from `path`, starting empty if the file is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        let (used_ids, capacity) = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<HistoryFile>(&raw) {
                Ok(file) => (file.used_ids, file.max_history.max(1)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed photo history");
                    (Vec::new(), DEFAULT_HISTORY_CAPACITY)
                }
            },
            Err(_) => (Vec::new(), DEFAULT_HISTORY_CAPACITY),
        };
        Self {
            path: path.to_path_buf(),
            used_ids: evict_oldest(used_ids, capacity),
            capacity,
        }
    }

    /// Whether `id` has been used recently.
    pub fn contains(&self, id: u64) -> bool {
        self.used_ids.contains(&id)
    }

    /// Record a newly downloaded photo id, evicting the oldest entries
    /// once capacity is exceeded.
    pub fn record(&mut self, id: u64) {
        self.used_ids.push(id);
        self.used_ids = evict_oldest(std::mem::take(&mut self.used_ids), self.capacity);
    }

    /// Filter `ids` down to those not yet in the history.
    pub fn fresh<'a, I>(&self, ids: I) -> Vec<u64>
    where
        I: IntoIterator<Item = &'a u64>,
    {
        let used: HashSet<u64> = self.used_ids.iter().copied().collect();
        ids.into_iter().copied().filter(|id| !used.contains(id)).collect()
    }

    /// Persist the history to disk.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self) -> VignetteResult<()> {
        let file = HistoryFile {
            used_ids: self.used_ids.clone(),
            max_history: self.capacity,
        };
        let raw = serde_json::to_string_pretty(&file)
            .map_err(|e| StorageError::new(format!("Failed to encode photo history: {e}")))?;
        std::fs::write(&self.path, raw).map_err(|e| {
            StorageError::new(format!(
                "Failed to write photo history {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(())
    }
}

/// Keep the most recent `capacity` ids, dropping from the front.
pub fn evict_oldest(mut ids: Vec<u64>, capacity: usize) -> Vec<u64> {
    if ids.len() > capacity {
        ids.drain(..ids.len() - capacity);
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evict_keeps_most_recent() {
        let ids = (1..=60).collect::<Vec<u64>>();
        let kept = evict_oldest(ids, 50);
        assert_eq!(kept.len(), 50);
        assert_eq!(kept.first(), Some(&11));
        assert_eq!(kept.last(), Some(&60));
    }

    #[test]
    fn evict_is_identity_under_capacity() {
        let ids = vec![1, 2, 3];
        assert_eq!(evict_oldest(ids.clone(), 50), ids);
    }

    #[test]
    fn history_is_bounded_after_many_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut history = StockPhotoHistory::load(&path);
        for id in 1..=120 {
            history.record(id);
        }
        assert!(!history.contains(70));
        assert!(history.contains(71));
        assert!(history.contains(120));
        let fresh = history.fresh([60, 100].iter());
        assert_eq!(fresh, vec![60]);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut history = StockPhotoHistory::load(&path);
        history.record(42);
        history.record(7);
        history.save().unwrap();

        let reloaded = StockPhotoHistory::load(&path);
        assert!(reloaded.contains(42));
        assert!(reloaded.contains(7));
        assert!(!reloaded.contains(99));
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json at all").unwrap();
        let history = StockPhotoHistory::load(&path);
        assert!(!history.contains(1));
    }
}
