//! Error types for the Vignette carousel generator.
//!
//! This crate provides the foundation error types used throughout the
//! Vignette workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enums define specific error conditions where the caller
//!   needs to discriminate (images, stock photos, generation stages)
//! - `*Error` structs wrap a message or kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use vignette_error::{VignetteResult, HttpError};
//!
//! fn fetch_data() -> VignetteResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod http;
mod image;
mod model;
mod render;
mod stock;
mod storage;

pub use config::ConfigError;
pub use error::{VignetteError, VignetteErrorKind, VignetteResult};
pub use generation::{GenerationError, GenerationStage};
pub use http::HttpError;
pub use image::{ImageError, ImageErrorKind};
pub use model::ModelError;
pub use render::RenderError;
pub use stock::{StockError, StockErrorKind};
pub use storage::StorageError;
