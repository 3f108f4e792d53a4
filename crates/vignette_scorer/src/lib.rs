//! Semantic hook quality scoring.
//!
//! Hooks are scored by semantic similarity to curated reference exemplars
//! rather than keyword matching: for each of the four evaluation dimensions
//! the scorer takes the maximum cosine similarity between the hook and that
//! dimension's exemplars and maps it onto a 1-5 integer score through fixed
//! breakpoints. The word-count ceiling is a hard gate checked before the
//! embedding service is ever contacted.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod references;
mod scorer;

pub use references::default_references;
pub use scorer::HookScorer;
