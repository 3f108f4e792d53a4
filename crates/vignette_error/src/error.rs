//! Top-level error wrapper types.

use crate::{
    ConfigError, GenerationError, HttpError, ImageError, ModelError, RenderError, StockError,
    StorageError,
};

/// Discriminated union of every error domain in the workspace.
///
/// # Examples
///
/// ```
/// use vignette_error::{VignetteError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: VignetteError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VignetteErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// Account configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Chat completion / embedding service error
    #[from(ModelError)]
    Model(ModelError),
    /// Image synthesis error
    #[from(ImageError)]
    Image(ImageError),
    /// Stock photo error
    #[from(StockError)]
    Stock(StockError),
    /// Text compositing error
    #[from(RenderError)]
    Render(RenderError),
    /// Artifact persistence error
    #[from(StorageError)]
    Storage(StorageError),
    /// Pipeline stage error
    #[from(GenerationError)]
    Generation(GenerationError),
}

/// Vignette error with kind discrimination.
///
/// # Examples
///
/// ```
/// use vignette_error::{VignetteResult, ConfigError};
///
/// fn might_fail() -> VignetteResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vignette Error: {}", _0)]
pub struct VignetteError(Box<VignetteErrorKind>);

impl VignetteError {
    /// Create a new error from a kind.
    pub fn new(kind: VignetteErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VignetteErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to VignetteErrorKind
impl<T> From<T> for VignetteError
where
    T: Into<VignetteErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vignette operations.
///
/// # Examples
///
/// ```
/// use vignette_error::{VignetteResult, HttpError};
///
/// fn fetch_data() -> VignetteResult<String> {
///     Err(HttpError::new("404 Not Found"))?
/// }
/// ```
pub type VignetteResult<T> = std::result::Result<T, VignetteError>;
