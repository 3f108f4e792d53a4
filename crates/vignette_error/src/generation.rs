//! Generation pipeline error types.

/// The pipeline stage a generation request failed in.
///
/// A generation request either returns a complete artifact or fails with
/// an indication of which stage failed; batch callers use this to report
/// per-item failures without aborting the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationStage {
    /// Building or sending the content prompt
    #[display("prompting")]
    Prompting,
    /// Parsing the model response into slides
    #[display("parsing")]
    Parsing,
    /// Hook quality scoring
    #[display("scoring")]
    Scoring,
    /// Image acquisition (synthesis or stock)
    #[display("image acquisition")]
    Acquisition,
    /// Text compositing
    #[display("rendering")]
    Rendering,
    /// Writing the artifact set to disk
    #[display("persistence")]
    Persistence,
}

/// Generation error naming the failed stage, with source location.
///
/// # Examples
///
/// ```
/// use vignette_error::{GenerationError, GenerationStage};
///
/// let err = GenerationError::new(GenerationStage::Acquisition, "slide 3 declined");
/// assert!(format!("{}", err).contains("image acquisition"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation failed during {}: {} at line {} in {}", stage, message, line, file)]
pub struct GenerationError {
    /// The stage that failed
    pub stage: GenerationStage,
    /// Error message
    pub message: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(stage: GenerationStage, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            stage,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
