//! Text model and embedding service error types.

/// Error from the chat completion or embedding service.
///
/// Network failures and non-2xx responses both surface here; the caller
/// (the generation orchestrator) decides whether to retry or fail fast.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Model Error: {} at line {} in {}", message, line, file)]
pub struct ModelError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ModelError {
    /// Create a new ModelError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
