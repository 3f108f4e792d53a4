//! HTTP clients for the services Vignette consumes.
//!
//! Three thin reqwest clients, one per service contract:
//! - [`OpenRouterClient`]: chat completions and embeddings behind one key
//! - [`GeminiImageClient`]: image synthesis with reference-image continuity
//! - [`PexelsClient`]: stock photo search and download
//!
//! None of these retry: a timeout or non-2xx response is a hard failure for
//! that call, surfaced as a typed error. Retry policy lives only in the
//! generation orchestrator's hook-quality loop.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gemini;
mod openrouter;
mod pexels;

pub use gemini::{GeminiImageClient, GeminiImageModel};
pub use openrouter::OpenRouterClient;
pub use pexels::PexelsClient;
