//! Carousel artifact types.

use crate::Slide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Machine-readable metadata written beside every carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ArtifactMeta {
    /// Account the carousel was generated for
    account: String,
    /// Topic string the generation started from
    topic: String,
    /// Format registry name
    format: String,
    /// Number of interior content items
    num_items: usize,
    /// Hook strategy used ("viral" or "template")
    hook_strategy: String,
    /// Generation timestamp
    timestamp: DateTime<Utc>,
    /// Directory the artifact set was written to
    output_dir: PathBuf,
}

impl ArtifactMeta {
    /// Create artifact metadata stamped with the current time.
    pub fn new(
        account: impl Into<String>,
        topic: impl Into<String>,
        format: impl Into<String>,
        num_items: usize,
        hook_strategy: impl Into<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            account: account.into(),
            topic: topic.into(),
            format: format.into(),
            num_items,
            hook_strategy: hook_strategy.into(),
            timestamp: Utc::now(),
            output_dir,
        }
    }
}

/// The output unit of one successful generation.
///
/// Written once to a date/topic-partitioned directory and never mutated;
/// regeneration produces a new artifact in a new directory. The serialized
/// form (`carousel_data.json`) is the canonical re-parseable record consumed
/// by downstream matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CarouselArtifact {
    /// Parsed slides, hook first, call-to-action last
    slides: Vec<Slide>,
    /// Rendered PNG paths in slide order
    rendered_image_paths: Vec<PathBuf>,
    /// Caption text including hashtags
    caption: String,
    /// The per-slide image prompts used (empty for stock mode)
    image_prompts: Vec<String>,
    /// Generation metadata
    meta: ArtifactMeta,
}

impl CarouselArtifact {
    /// Assemble an artifact from the pipeline's outputs.
    pub fn new(
        slides: Vec<Slide>,
        rendered_image_paths: Vec<PathBuf>,
        caption: String,
        image_prompts: Vec<String>,
        meta: ArtifactMeta,
    ) -> Self {
        Self {
            slides,
            rendered_image_paths,
            caption,
            image_prompts,
            meta,
        }
    }
}
