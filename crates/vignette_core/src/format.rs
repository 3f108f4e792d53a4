//! Content format registry.
//!
//! Built-in formats are the five proven carousel structures; cloned formats
//! are registered from account templates (derived from analysis of an
//! external viral post) and carry their own prompt template and slide-count
//! contract.

use serde::{Deserialize, Serialize};

/// How a format's model output is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputMode {
    /// The model is instructed to return a JSON object with a `slides` array
    Structured,
    /// Line-oriented text recovery
    Heuristic,
}

/// Hook generation strategy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum HookStrategy {
    /// Scored against the quality gate with bounded retries
    Viral,
    /// Single attempt from a fixed template, no scoring
    Template,
}

/// The five built-in carousel formats.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BuiltinFormat {
    /// Habit/tip list with conversational explanations
    HabitList,
    /// Step-by-step guide
    StepGuide,
    /// Exact phrases the viewer can use immediately
    Scripts,
    /// Simple, unglamorous habits with big impact
    BoringHabits,
    /// Outcome-focused how-to
    HowTo,
}

impl BuiltinFormat {
    /// Parsing strategy the format's prompt asks the model for.
    pub fn output_mode(&self) -> OutputMode {
        match self {
            BuiltinFormat::HabitList | BuiltinFormat::StepGuide => OutputMode::Heuristic,
            BuiltinFormat::Scripts | BuiltinFormat::BoringHabits | BuiltinFormat::HowTo => {
                OutputMode::Structured
            }
        }
    }

    /// Proven formats get a smaller retry budget: their prompts are already
    /// calibrated, so extra attempts rarely pay for themselves.
    pub fn is_proven(&self) -> bool {
        matches!(
            self,
            BuiltinFormat::Scripts | BuiltinFormat::BoringHabits | BuiltinFormat::HowTo
        )
    }

    /// Whether slides use stock photos instead of generated images.
    pub fn uses_stock_photos(&self) -> bool {
        self.is_proven()
    }

    /// Format-level stock photo search keywords, used by the broadened
    /// fallback query when the topic-specific search comes up short.
    pub fn stock_keywords(&self) -> &'static [&'static str] {
        match self {
            BuiltinFormat::Scripts => {
                &["parent comforting child", "toddler parent calm", "family gentle"]
            }
            BuiltinFormat::BoringHabits => {
                &["parent child peaceful", "morning routine", "family calm"]
            }
            BuiltinFormat::HowTo => {
                &["baby sleeping peaceful", "nursery calm", "parent baby gentle"]
            }
            BuiltinFormat::HabitList | BuiltinFormat::StepGuide => {
                &["parent child", "family authentic moment"]
            }
        }
    }

    /// Deterministic fallback hook when heuristic parsing finds none.
    pub fn fallback_hook(&self, topic: &str, num_items: usize) -> String {
        match self {
            BuiltinFormat::HabitList => {
                format!("{num_items} tips about {topic} that actually work")
            }
            BuiltinFormat::BoringHabits => {
                format!("{num_items} simple habits for {topic} that changed everything")
            }
            BuiltinFormat::Scripts => format!("what to say about {topic}"),
            BuiltinFormat::HowTo => format!("how to handle {topic}"),
            BuiltinFormat::StepGuide => format!("the {topic} guide that actually works"),
        }
    }
}

/// A format registered from an account's content templates.
///
/// Cloned formats carry their own slide-count contract and per-slide image
/// prompt templates (with `{topic}` substitution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClonedFormat {
    /// Registry name (lowercase identifier)
    pub name: String,
    /// Fixed slide count, overriding the caller's item count
    pub slide_count: usize,
    /// Full user-prompt template; `{topic}` is substituted at generation time
    pub prompt_template: String,
    /// Per-slide image prompt templates; padded or trimmed to `slide_count`
    #[serde(default)]
    pub image_prompt_templates: Vec<String>,
}

/// A resolved content format: built-in or cloned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentFormat {
    /// One of the five built-ins
    Builtin(BuiltinFormat),
    /// Account-registered cloned format
    Cloned(ClonedFormat),
}

impl ContentFormat {
    /// Registry name of the format.
    pub fn name(&self) -> String {
        match self {
            ContentFormat::Builtin(builtin) => builtin.to_string(),
            ContentFormat::Cloned(cloned) => cloned.name.clone(),
        }
    }

    /// Parsing strategy. Cloned formats always request structured output.
    pub fn output_mode(&self) -> OutputMode {
        match self {
            ContentFormat::Builtin(builtin) => builtin.output_mode(),
            ContentFormat::Cloned(_) => OutputMode::Structured,
        }
    }

    /// Whether this format acquires stock photos. Cloned formats always
    /// generate, using their own image prompt templates.
    pub fn uses_stock_photos(&self) -> bool {
        match self {
            ContentFormat::Builtin(builtin) => builtin.uses_stock_photos(),
            ContentFormat::Cloned(_) => false,
        }
    }

    /// Hook retry budget for a strategy.
    pub fn max_attempts(&self, strategy: HookStrategy) -> usize {
        match (strategy, self) {
            (HookStrategy::Template, _) => 1,
            (HookStrategy::Viral, ContentFormat::Builtin(builtin)) if builtin.is_proven() => 3,
            (HookStrategy::Viral, _) => 10,
        }
    }

    /// Deterministic fallback hook for heuristic recovery.
    pub fn fallback_hook(&self, topic: &str, num_items: usize) -> String {
        match self {
            ContentFormat::Builtin(builtin) => builtin.fallback_hook(topic, num_items),
            ContentFormat::Cloned(_) => format!("the {topic} guide that actually works"),
        }
    }

    /// Format-level stock keywords for the broadened fallback query.
    pub fn stock_keywords(&self) -> &'static [&'static str] {
        match self {
            ContentFormat::Builtin(builtin) => builtin.stock_keywords(),
            ContentFormat::Cloned(_) => &["authentic moment", "clean composition"],
        }
    }
}
