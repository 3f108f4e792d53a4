//! Image synthesis error types.

/// Image synthesis error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ImageErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// API request failed in transit
    #[display("Image synthesis request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Base64 decoding failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
    /// The service declined to produce an image (soft failure); fatal for
    /// the slide it was requested for
    #[display("Image synthesis declined for slide {}", slide)]
    Declined {
        /// 1-based slide index that failed
        slide: usize,
    },
}

/// Image synthesis error with source location tracking.
///
/// # Examples
///
/// ```
/// use vignette_error::{ImageError, ImageErrorKind};
///
/// let err = ImageError::new(ImageErrorKind::Declined { slide: 3 });
/// assert!(format!("{}", err).contains("slide 3"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Image Error: {} at line {} in {}", kind, line, file)]
pub struct ImageError {
    /// The kind of error that occurred
    pub kind: ImageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ImageError {
    /// Create a new ImageError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ImageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
