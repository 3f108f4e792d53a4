//! Slide types.

use serde::{Deserialize, Serialize};

/// One slide of a carousel.
///
/// Slides are ordered: position 0 is always the hook, the last position is
/// always the call-to-action, interior positions are content items. A parsed
/// slide list always holds `item_count + 2` slides (cloned formats define
/// their own fixed count). Slides are immutable once parsed.
///
/// # Examples
///
/// ```
/// use vignette_core::Slide;
///
/// let slide = Slide::new("tip 1: call early morning only");
/// assert!(slide.text.starts_with("tip 1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slide {
    /// Text burned onto the rendered image
    pub text: String,
}

impl Slide {
    /// Create a slide from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Word count of the slide text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
