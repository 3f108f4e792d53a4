//! Topic selection and duplicate tracking.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use vignette_core::BuiltinFormat;
use vignette_error::{StorageError, VignetteResult};

const TRACKER_VERSION: &str = "1.0";
const RECENT_WINDOW: usize = 5;

/// Words too common to count toward topic similarity.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "your", "that", "this", "how", "what", "when",
    "why", "who", "are", "was", "you", "can", "not", "but", "all", "get",
    "has", "have", "from", "they", "them", "their", "its", "our", "out",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TopicEntry {
    topic: String,
    generated_at: DateTime<Utc>,
    output_dir: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrackerFile {
    version: String,
    account: String,
    max_history_size: usize,
    topics: Vec<TopicEntry>,
}

/// Rolling per-account record of recently generated topics.
///
/// Newest entries sit at the front. Similarity checks compare a
/// candidate against the five most recent topics by Jaccard overlap of
/// their key terms.
#[derive(Debug)]
pub struct TopicTracker {
    path: PathBuf,
    account: String,
    max_history: usize,
    threshold: f64,
    entries: Vec<TopicEntry>,
}

impl TopicTracker {
    /// Load a tracker from `path`, starting empty if the file is
    /// missing or malformed.
    pub fn load(path: &Path, account: &str, max_history: usize, threshold: f64) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<TrackerFile>(&raw) {
                Ok(file) => file.topics,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed topic history");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self {
            path: path.to_path_buf(),
            account: account.to_string(),
            max_history: max_history.max(1),
            threshold,
            entries,
        }
    }

    /// Whether `topic` is too similar to any of the last five topics.
    /// Returns the matching prior topic when it is.
    pub fn similar_recent(&self, topic: &str) -> Option<String> {
        let candidate = key_terms(topic);
        if candidate.is_empty() {
            return None;
        }
        for entry in self.entries.iter().take(RECENT_WINDOW) {
            let prior = key_terms(&entry.topic);
            if jaccard(&candidate, &prior) >= self.threshold {
                return Some(entry.topic.clone());
            }
        }
        None
    }

    /// Record a generated topic at the front of the history and persist.
    ///
    /// # Errors
    ///
    /// Fails if the history file cannot be written.
    pub fn add_topic(&mut self, topic: &str, output_dir: &Path) -> VignetteResult<()> {
        self.entries.insert(
            0,
            TopicEntry {
                topic: topic.to_string(),
                generated_at: Utc::now(),
                output_dir: output_dir.display().to_string(),
            },
        );
        self.entries.truncate(self.max_history);
        let file = TrackerFile {
            version: TRACKER_VERSION.to_string(),
            account: self.account.clone(),
            max_history_size: self.max_history,
            topics: self.entries.clone(),
        };
        let raw = serde_json::to_string_pretty(&file)
            .map_err(|e| StorageError::new(format!("Failed to encode topic history: {e}")))?;
        std::fs::write(&self.path, raw).map_err(|e| {
            StorageError::new(format!(
                "Failed to write topic history {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(())
    }

    /// Number of tracked topics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key terms of a topic: lowercased words longer than two characters
/// with punctuation stripped and stopwords removed.
fn key_terms(topic: &str) -> HashSet<String> {
    topic
        .to_lowercase()
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_string()
        })
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// Pick a random content pillar and humanize it into a topic string.
pub fn random_topic(pillars: &[String]) -> Option<String> {
    let mut rng = rand::thread_rng();
    pillars
        .choose(&mut rng)
        .map(|pillar| pillar.replace('_', " "))
}

/// Choose a builtin format by scoring topic keywords.
///
/// Process-style phrases favor the step guide; trait and routine
/// phrases favor the habit list, which also wins ties.
pub fn determine_builtin_format(topic: &str) -> BuiltinFormat {
    let lower = topic.to_lowercase();

    if lower.contains("by age") || lower.contains("by month") {
        return BuiltinFormat::HabitList;
    }
    if lower.contains("how to") {
        return BuiltinFormat::StepGuide;
    }

    const STEP_KEYWORDS: &[&str] = &[
        "transition", "stop", "start", "teach", "introduce", "wean",
        "handle", "fix", "solve", "deal with", "get your",
    ];
    const HABIT_KEYWORDS: &[&str] = &[
        "habits", "signs", "things", "mistakes", "myths", "rules",
        "reasons", "ways", "ideas", "tips", "phrases", "routine",
    ];

    let step_score = STEP_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();
    let habit_score = HABIT_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();

    if step_score > habit_score {
        BuiltinFormat::StepGuide
    } else {
        BuiltinFormat::HabitList
    }
}
