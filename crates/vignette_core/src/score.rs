//! Hook quality score types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four fixed evaluation dimensions of hook quality.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Promises insight without revealing it
    CuriosityGap,
    /// Clear action or transformation
    Actionability,
    /// Tangible details: numbers, times, exact steps
    Specificity,
    /// Pattern interrupt that stops the scroll
    ScrollStop,
}

impl Dimension {
    /// Human-readable name for feedback lines ("Curiosity Gap").
    pub fn title(&self) -> String {
        self.to_string()
            .split('_')
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Letter grade derived from the total score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Grade {
    /// Total >= 18
    A,
    /// Total >= 16
    B,
    /// Total >= 14
    C,
    /// Everything below, including the word-ceiling hard gate
    F,
}

impl Grade {
    /// Map a total score (0-20) to a letter grade.
    ///
    /// # Examples
    ///
    /// ```
    /// use vignette_core::Grade;
    ///
    /// assert_eq!(Grade::from_total(19), Grade::A);
    /// assert_eq!(Grade::from_total(13), Grade::F);
    /// ```
    pub fn from_total(total: u8) -> Self {
        match total {
            18.. => Grade::A,
            16..=17 => Grade::B,
            14..=15 => Grade::C,
            _ => Grade::F,
        }
    }
}

/// Result of scoring one hook.
///
/// Derived purely from the input text plus the reference corpus; the only
/// side effect in the scorer is its read-through embedding cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Sum of the four dimension scores (0-20)
    pub total: u8,
    /// Per-dimension scores (0-5 each)
    pub dimensions: BTreeMap<Dimension, u8>,
    /// Letter grade for logs
    pub grade: Grade,
    /// Whether `total` met the caller-supplied minimum
    pub passed: bool,
    /// Feedback lines for the next prompt attempt
    pub feedback: Vec<String>,
}

impl ScoreResult {
    /// A zero score for a hook that failed the word-ceiling hard gate.
    ///
    /// `passed` is false regardless of the caller's minimum score.
    pub fn format_violation(feedback: String) -> Self {
        Self {
            total: 0,
            dimensions: BTreeMap::new(),
            grade: Grade::F,
            passed: false,
            feedback: vec![feedback],
        }
    }
}
