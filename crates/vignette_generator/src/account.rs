//! Account configuration.
//!
//! Brand voice, hashtag sets, quality thresholds, and output layout come
//! from a per-account TOML file, validated once at load time and treated
//! as immutable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vignette_core::{ClonedFormat, Dimension};
use vignette_error::{ConfigError, VignetteResult};

/// Brand voice and personality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandIdentity {
    /// Account persona type (e.g. `faceless_expert`)
    pub character_type: String,
    /// Brand personality description
    pub personality: String,
    /// Core value to the audience
    pub value_proposition: String,
    /// Voice characteristics, at least two
    pub voice_attributes: Vec<String>,
}

/// Hashtag usage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashtagStrategy {
    /// Always-used hashtags
    pub primary: Vec<String>,
    /// Rotating hashtags
    #[serde(default)]
    pub secondary: Vec<String>,
    /// Topic-category to hashtag-list map for topic-aware captions
    #[serde(default)]
    pub topic_hashtags: BTreeMap<String, Vec<String>>,
}

/// One slide color palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Background hex color (`#RRGGBB`)
    pub bg: String,
    /// Text hex color (`#RRGGBB`)
    pub text: String,
    /// Scheme name, unique within the account
    pub name: String,
}

/// Quality thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityOverrides {
    /// Minimum passing hook score (0-20)
    #[serde(default = "default_min_hook_score")]
    pub min_hook_score: u8,
    /// Word ceiling for the hook (5-50)
    #[serde(default = "default_max_words")]
    pub max_words_per_slide: usize,
}

fn default_min_hook_score() -> u8 {
    16
}

fn default_max_words() -> usize {
    20
}

impl Default for QualityOverrides {
    fn default() -> Self {
        Self {
            min_hook_score: default_min_hook_score(),
            max_words_per_slide: default_max_words(),
        }
    }
}

/// Carousel content strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselStrategy {
    /// Default format registry name; `None` selects by topic keywords
    #[serde(default)]
    pub format: Option<String>,
    /// Valid interior item count range
    #[serde(default = "default_count_range")]
    pub slide_count_range: (usize, usize),
    /// Default interior item count
    #[serde(default = "default_slide_count")]
    pub default_slide_count: usize,
}

fn default_count_range() -> (usize, usize) {
    (5, 10)
}

fn default_slide_count() -> usize {
    5
}

impl Default for CarouselStrategy {
    fn default() -> Self {
        Self {
            format: None,
            slide_count_range: default_count_range(),
            default_slide_count: default_slide_count(),
        }
    }
}

/// Output directory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base output directory, must be absolute
    pub base_directory: PathBuf,
}

/// Topic duplicate-tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTrackerConfig {
    /// Topics kept in the rolling history (1-100)
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Jaccard similarity above which a topic counts as a duplicate
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_max_history() -> usize {
    10
}

fn default_similarity_threshold() -> f64 {
    0.6
}

impl Default for TopicTrackerConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// Complete validated account configuration.
///
/// # Examples
///
/// ```rust,ignore
/// let config = AccountConfig::load(Path::new("accounts/dreamtime.toml"))?;
/// assert!(config.quality.min_hook_score <= 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account name: lowercase, alphanumeric and underscores, 3-50 chars
    pub account_name: String,
    /// Human-readable display name
    pub display_name: String,
    /// Brand voice
    pub brand_identity: BrandIdentity,
    /// Content topic pillars, at least five, unique
    pub content_pillars: Vec<String>,
    /// Color palettes, at least three, unique names
    pub color_schemes: Vec<ColorScheme>,
    /// Hashtag strategy
    pub hashtag_strategy: HashtagStrategy,
    /// Carousel strategy
    #[serde(default)]
    pub carousel_strategy: CarouselStrategy,
    /// Quality thresholds
    #[serde(default)]
    pub quality: QualityOverrides,
    /// Output layout
    pub output: OutputConfig,
    /// Topic tracker settings
    #[serde(default)]
    pub topic_tracker: TopicTrackerConfig,
    /// Text model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Cloned formats registered for this account
    #[serde(default)]
    pub cloned_formats: Vec<ClonedFormat>,
    /// Niche-specific scorer exemplars, prepended to the built-in corpus
    #[serde(default)]
    pub scoring_references: BTreeMap<Dimension, Vec<String>>,
}

fn default_model() -> String {
    "anthropic/claude-sonnet-4.5".to_string()
}

impl AccountConfig {
    /// Load and validate an account configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Fails on unreadable files, TOML syntax errors, or any validation
    /// constraint violation.
    pub fn load(path: &Path) -> VignetteResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: AccountConfig = toml::from_str(&raw).map_err(|e| {
            ConfigError::new(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every load-time constraint.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> VignetteResult<()> {
        if self.account_name.len() < 3
            || self.account_name.len() > 50
            || !self
                .account_name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ConfigError::new(
                "account_name must be 3-50 chars of lowercase alphanumerics and underscores",
            )
            .into());
        }

        if self.content_pillars.len() < 5 {
            return Err(ConfigError::new("content_pillars needs at least 5 entries").into());
        }
        let mut seen = std::collections::BTreeSet::new();
        for pillar in &self.content_pillars {
            if pillar.trim().is_empty() {
                return Err(ConfigError::new("content_pillars cannot contain empty strings").into());
            }
            if !seen.insert(pillar) {
                return Err(
                    ConfigError::new(format!("duplicate content pillar: {pillar}")).into(),
                );
            }
        }

        if self.color_schemes.len() < 3 {
            return Err(ConfigError::new("color_schemes needs at least 3 entries").into());
        }
        let mut names = std::collections::BTreeSet::new();
        for scheme in &self.color_schemes {
            for color in [&scheme.bg, &scheme.text] {
                if !is_hex_color(color) {
                    return Err(ConfigError::new(format!(
                        "color scheme '{}' has invalid hex color '{color}'",
                        scheme.name
                    ))
                    .into());
                }
            }
            if !names.insert(&scheme.name) {
                return Err(ConfigError::new(format!(
                    "duplicate color scheme name: {}",
                    scheme.name
                ))
                .into());
            }
        }

        if self.hashtag_strategy.primary.is_empty() {
            return Err(ConfigError::new("hashtag_strategy.primary cannot be empty").into());
        }

        if self.quality.min_hook_score > 20 {
            return Err(ConfigError::new("quality.min_hook_score must be 0-20").into());
        }
        if !(5..=50).contains(&self.quality.max_words_per_slide) {
            return Err(ConfigError::new("quality.max_words_per_slide must be 5-50").into());
        }

        let (low, high) = self.carousel_strategy.slide_count_range;
        if low > high {
            return Err(ConfigError::new("slide_count_range min must be <= max").into());
        }
        if !(low..=high).contains(&self.carousel_strategy.default_slide_count) {
            return Err(ConfigError::new(format!(
                "default_slide_count {} outside slide_count_range ({low}, {high})",
                self.carousel_strategy.default_slide_count
            ))
            .into());
        }

        if !self.output.base_directory.is_absolute() {
            return Err(ConfigError::new("output.base_directory must be an absolute path").into());
        }

        if !(1..=100).contains(&self.topic_tracker.max_history) {
            return Err(ConfigError::new("topic_tracker.max_history must be 1-100").into());
        }
        if !(0.0..=1.0).contains(&self.topic_tracker.similarity_threshold) {
            return Err(
                ConfigError::new("topic_tracker.similarity_threshold must be 0.0-1.0").into(),
            );
        }

        for cloned in &self.cloned_formats {
            if cloned.slide_count < 3 {
                return Err(ConfigError::new(format!(
                    "cloned format '{}' needs at least 3 slides",
                    cloned.name
                ))
                .into());
            }
            if !cloned.prompt_template.contains("{topic}") {
                return Err(ConfigError::new(format!(
                    "cloned format '{}' prompt_template must contain {{topic}}",
                    cloned.name
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Look up a registered cloned format by name.
    pub fn cloned_format(&self, name: &str) -> Option<&ClonedFormat> {
        self.cloned_formats.iter().find(|f| f.name == name)
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
