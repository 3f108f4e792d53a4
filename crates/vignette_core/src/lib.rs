//! Core data types for the Vignette carousel generator.
//!
//! This crate provides the foundation data types used across the workspace:
//! slides, score results, image assets, carousel artifacts, chat requests,
//! and the content format registry.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod asset;
mod attempt;
mod chat;
mod format;
mod score;
mod slide;

pub use artifact::{ArtifactMeta, CarouselArtifact};
pub use asset::{ImageAsset, ImageSource};
pub use attempt::GenerationAttempt;
pub use chat::{ChatMessage, ChatRequest, Role};
pub use format::{BuiltinFormat, ClonedFormat, ContentFormat, HookStrategy, OutputMode};
pub use score::{Dimension, Grade, ScoreResult};
pub use slide::Slide;
