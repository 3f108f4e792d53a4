//! Trait seams for the external services Vignette consumes.
//!
//! The core pipeline never talks to a network client directly; it is generic
//! over these traits so tests can substitute deterministic implementations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{EmbeddingModel, ImageSynthesizer, StockPhotoProvider, TextModel};
pub use types::{Orientation, StockPhoto};
