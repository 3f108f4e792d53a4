//! Stock photo acquisition error types.

/// Stock photo error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StockErrorKind {
    /// API key not found in environment
    #[display("PEXELS_API_KEY environment variable not set")]
    MissingApiKey,
    /// Search or download request failed in transit
    #[display("Stock photo request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// A photo listing did not carry the requested download size
    #[display("Photo {} has no '{}' download url", id, size)]
    MissingSize {
        /// Provider photo id
        id: u64,
        /// Requested size key
        size: String,
    },
    /// All fallback tiers exhausted without enough photos
    #[display("Only {} of {} photos available after all fallback queries", got, needed)]
    Insufficient {
        /// Photos actually acquired
        got: usize,
        /// Photos required for the carousel
        needed: usize,
    },
}

/// Stock photo error with source location tracking.
///
/// # Examples
///
/// ```
/// use vignette_error::{StockError, StockErrorKind};
///
/// let err = StockError::new(StockErrorKind::Insufficient { got: 3, needed: 7 });
/// assert!(format!("{}", err).contains("3 of 7"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Stock Photo Error: {} at line {} in {}", kind, line, file)]
pub struct StockError {
    /// The kind of error that occurred
    pub kind: StockErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StockError {
    /// Create a new StockError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StockErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
