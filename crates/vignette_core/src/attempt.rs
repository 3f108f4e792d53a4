//! Generation attempt bookkeeping.

use crate::{ScoreResult, Slide};

/// Transient record of one hook-quality loop iteration.
///
/// Exists only within a single `generate()` call; the orchestrator keeps at
/// most the current and the best-seen attempt and never persists either.
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    /// 1-based attempt number
    pub attempt_number: usize,
    /// Raw model output the slides were parsed from
    pub raw_model_output: String,
    /// Parsed slide list
    pub slides: Vec<Slide>,
    /// Optional caption surfaced by structured parsing
    pub caption: Option<String>,
    /// Hook score; `None` for the template strategy
    pub score: Option<ScoreResult>,
}

impl GenerationAttempt {
    /// Whether this attempt cleared the quality gate.
    ///
    /// Template-strategy attempts carry no score and always pass.
    pub fn passed(&self) -> bool {
        self.score.as_ref().map(|s| s.passed).unwrap_or(true)
    }

    /// Total hook score, zero when unscored.
    pub fn total(&self) -> u8 {
        self.score.as_ref().map(|s| s.total).unwrap_or(0)
    }
}
