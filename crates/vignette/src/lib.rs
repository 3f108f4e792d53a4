//! Vignette - quality-gated social carousel generation.
//!
//! Vignette turns a topic and an account configuration into a finished
//! carousel: model-written slides gated by a semantic hook scorer,
//! one image per slide (synthesized with style continuity or pulled
//! from a stock provider), text composited onto each image, and the
//! whole artifact set persisted to a date-partitioned directory.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use vignette::{
//!     AccountConfig, CarouselGenerator, GenerateRequest, GeminiImageClient,
//!     GeminiImageModel, OpenRouterClient, PexelsClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AccountConfig::load(Path::new("accounts/dreamtime.toml"))?;
//!     let text = OpenRouterClient::new(std::env::var("OPENROUTER_API_KEY")?, &config.model);
//!     let embed = OpenRouterClient::new(std::env::var("OPENROUTER_API_KEY")?, &config.model);
//!     let images = GeminiImageClient::new(
//!         std::env::var("GEMINI_API_KEY")?,
//!         GeminiImageModel::Pro,
//!     );
//!
//!     let mut generator = CarouselGenerator::new(
//!         config,
//!         text,
//!         embed,
//!         Some(images),
//!         None::<PexelsClient>,
//!     )?;
//!     let artifact = generator.generate(&GenerateRequest::default()).await?;
//!     println!("Wrote {}", artifact.meta().output_dir().display());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Vignette is organized as a workspace with focused crates:
//!
//! - `vignette_error` - Error types
//! - `vignette_core` - Core data types (slides, formats, artifacts)
//! - `vignette_interface` - Service trait seams
//! - `vignette_models` - HTTP clients for the consumed services
//! - `vignette_scorer` - Semantic hook quality scoring
//! - `vignette_render` - Slide compositing
//! - `vignette_generator` - Parsing, acquisition, and the orchestrator
//!
//! This crate (`vignette`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use vignette_core::{
    ArtifactMeta, BuiltinFormat, CarouselArtifact, ChatMessage, ChatRequest, ClonedFormat,
    ContentFormat, Dimension, GenerationAttempt, Grade, HookStrategy, ImageAsset, ImageSource,
    OutputMode, Role, ScoreResult, Slide,
};
pub use vignette_error::{VignetteError, VignetteErrorKind, VignetteResult};
pub use vignette_generator::{
    AccountConfig, BrandIdentity, CarouselGenerator, CarouselStrategy, ColorScheme,
    GenerateRequest, HashtagStrategy, OutputConfig, QualityOverrides, StockPhotoHistory,
    TopicTracker, TopicTrackerConfig,
};
pub use vignette_interface::{
    EmbeddingModel, ImageSynthesizer, Orientation, StockPhoto, StockPhotoProvider, TextModel,
};
pub use vignette_models::{GeminiImageClient, GeminiImageModel, OpenRouterClient, PexelsClient};
pub use vignette_render::{Compositor, SLIDE_HEIGHT, SLIDE_WIDTH};
pub use vignette_scorer::HookScorer;
